//! 装配追踪领域层（assembly-domain）
//!
//! 以 DDD 方式建模序列化产品的分批装配：
//! - 工序序列（`stage`）与值对象（`value_object`）；
//! - 单件聚合与推进引擎（`unit`），其事件即工序台账（`ledger`）；
//! - 单件进度（`progress`）、批次汇总（`batch`）与看板汇总（`dashboard`）等派生视图；
//! - 产品（`product`）与访问控制（`access`）；
//! - 仓储协议（`persist`）与聚合根编排器（`aggregate_root`）。
//!
//! 本 crate 不依赖具体存储与传输，所有派生视图都是对单件与台账的纯计算。
//!
pub mod access;
pub mod aggregate;
pub mod aggregate_root;
pub mod batch;
pub mod dashboard;
pub mod domain_event;
pub mod entity;
pub mod error;
pub mod ledger;
pub mod persist;
pub mod product;
pub mod progress;
pub mod stage;
pub mod unit;
pub mod value_object;
