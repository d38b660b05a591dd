//! 领域事件（Domain Event）
//!
//! 定义事件载荷需要实现的最小接口（`DomainEvent`），以及将事件与元数据/上下文
//! 封装后的 `EventEnvelope`。台账条目由信封转换而来。

mod domain_event_trait;
mod event_context;
mod event_envelope;
mod metadata;

pub use domain_event_trait::DomainEvent;
pub use event_context::EventContext;
pub use event_envelope::EventEnvelope;
pub use metadata::Metadata;
