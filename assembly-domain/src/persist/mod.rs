//! 持久化接口（persist）
//!
//! 只定义仓储协议，具体存储（内存、关系型数据库等）由上层实现并注入：
//! - 聚合仓储（`AggregateRepository`）：加载单件并在一个事务内写入台账与单件行；
//! - 产品、批次、单件与台账的读写仓储。
//!
mod aggregate_repository;
mod repositories;

pub use aggregate_repository::AggregateRepository;
pub use repositories::{BatchRepository, LedgerRepository, ProductRepository, UnitRepository};
