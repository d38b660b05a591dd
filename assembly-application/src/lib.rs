//! 装配追踪应用层（assembly-application）
//!
//! 以 CQRS 方式组织用例：命令/查询经进程内总线分发到处理器，
//! 总线统一完成访问检查与耗时日志；`AssemblyApi` 把全部过程汇总为一个门面。
//!
pub mod api;
pub mod clock;
pub mod command;
pub mod command_bus;
pub mod command_handler;
pub mod commands;
pub mod config;
pub mod context;
pub mod dto;
pub mod error;
pub mod inmemory_command_bus;
pub mod inmemory_query_bus;
mod middleware;
pub mod queries;
pub mod query;
pub mod query_bus;
pub mod query_handler;
pub mod store;

pub use api::AssemblyApi;
pub use inmemory_command_bus::InMemoryCommandBus;
pub use inmemory_query_bus::InMemoryQueryBus;
pub use store::InMemoryStore;
