//! 写用例：命令及其处理器
//!
mod batch;
mod product;
mod stage;

pub use batch::{AssignSerialNumbers, AssignSerialNumbersHandler, CreateBatch, CreateBatchHandler};
pub use product::{CreateProduct, CreateProductHandler, RenameProduct, RenameProductHandler};
pub use stage::{MarkStageComplete, MarkStageCompleteHandler, RejectStage, RejectStageHandler};
