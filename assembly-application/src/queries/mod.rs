//! 读用例：查询及其处理器
//!
//! 所有派生视图（进度、批次汇总、看板）都在读取时重新计算。
//!
mod batch;
mod dashboard;
mod product;
mod unit;

pub use batch::{GetAllBatches, GetBatchById, GetBatchHandler};
pub use dashboard::{
    DashboardHandler, GetProductionSummary, GetRejectionSummary, GetWipByStage,
};
pub use product::{GetAllProducts, GetProductById, ListProductOptions, ProductQueryHandler};
pub use unit::{GetAssemblyDetailsByUnitId, GetUnitProgressBySerial, UnitQueryHandler};
