use assembly_domain::batch::BatchView;
use assembly_domain::dashboard::{ProductionSummary, RejectionSummary, WipByStage};
use assembly_domain::ledger::StageLogEntry;
use assembly_domain::product::{Product, ProductOption};
use assembly_domain::progress::UnitProgress;
use assembly_domain::unit::SerializedItem;
use serde::Serialize;

/// 数据传输对象（DTO）
///
/// - 作为应用层的输出载体，面向接口/外部系统序列化友好（camelCase JSON）；
/// - 应保持只读特性与简洁结构，适配不同用例的返回需求。
pub trait Dto: Serialize + Send + Sync + 'static {}

impl<T: Dto> Dto for Vec<T> {}

impl Dto for SerializedItem {}
impl Dto for StageLogEntry {}
impl Dto for UnitProgress {}
impl Dto for BatchView {}
impl Dto for Product {}
impl Dto for ProductOption {}
impl Dto for ProductionSummary {}
impl Dto for RejectionSummary {}
impl Dto for WipByStage {}

/// 单件装配详情：单件、所属批次名称与完整台账（最旧在前）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitDetails {
    #[serde(flatten)]
    pub unit: SerializedItem,
    pub batch_name: String,
    pub stage_logs: Vec<StageLogEntry>,
}

impl Dto for UnitDetails {}
