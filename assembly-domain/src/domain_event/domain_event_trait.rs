use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;

/// 领域事件载荷需要满足的通用能力边界
pub trait DomainEvent:
    Clone + PartialEq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync
{
    /// 事件唯一标识
    fn event_id(&self) -> &str;

    /// 事件类型（形如 `UnitEvent.StageCompleted`）
    fn event_type(&self) -> &str;

    /// 事件载荷版本
    fn event_version(&self) -> usize {
        1
    }

    /// 事件对应的聚合版本（用于并发控制）
    fn aggregate_version(&self) -> usize;
}
