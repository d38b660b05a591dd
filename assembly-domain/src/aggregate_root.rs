//! 聚合根编排器（AggregateRoot）
//!
//! 封装"加载聚合 → 执行命令 → 应用事件 → 持久化事件"的标准流程，
//! 以仓储实现（`AggregateRepository`）为依赖，便于在应用层直接调用。
//!
use crate::{
    aggregate::Aggregate,
    domain_event::{DomainEvent, EventContext, EventEnvelope},
    entity::Entity,
    error::DomainError,
    persist::AggregateRepository,
};
use std::marker::PhantomData;

/// 面向应用层的聚合根编排器。
///
/// - `A`：聚合类型（实现 `Aggregate`）
/// - `R`：聚合仓储（实现 `AggregateRepository<A>`）
pub struct AggregateRoot<A, R>
where
    A: Aggregate,
    R: AggregateRepository<A>,
{
    repo: R,
    _marker: PhantomData<A>,
}

impl<A, R> AggregateRoot<A, R>
where
    A: Aggregate,
    A::Error: From<DomainError>,
    R: AggregateRepository<A>,
{
    /// 创建编排器实例
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            _marker: PhantomData,
        }
    }

    /// 执行聚合命令：
    /// 1. 加载聚合，不存在时返回 `NotFound`；
    /// 2. 执行命令得到新事件；
    /// 3. 应用事件到聚合状态；
    /// 4. 调用仓储持久化，返回更新后的聚合与事件信封。
    pub async fn execute(
        &self,
        aggregate_id: &A::Id,
        command: A::Command,
        context: EventContext,
    ) -> Result<(A, Vec<EventEnvelope<A>>), A::Error> {
        let mut aggregate = self.repo.load(aggregate_id).await?.ok_or_else(|| {
            DomainError::not_found(format!("{} {aggregate_id} not found", A::TYPE))
        })?;

        let events = aggregate.execute(command)?;

        for event in &events {
            aggregate.apply(event);
            tracing::debug!(
                aggregate_type = A::TYPE,
                aggregate_id = %aggregate_id,
                event_type = event.event_type(),
                version = aggregate.version(),
                "event applied"
            );
        }

        let envelopes = self.repo.save(&aggregate, events, context).await?;

        Ok((aggregate, envelopes))
    }
}
