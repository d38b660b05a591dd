//! 总线中间件：访问检查与耗时日志
//!
use crate::{context::AppContext, error::AppError};
use assembly_domain::access::{AccessPolicy, Action};
use std::time::Instant;
use tracing::Span;

/// 为一次分发创建日志 span
pub(crate) fn procedure_span(kind: &'static str, name: &'static str, ctx: &AppContext) -> Span {
    tracing::info_span!(
        "procedure",
        kind,
        name,
        correlation_id = ctx.correlation_id.as_deref().unwrap_or("-"),
        actor = ctx.actor_id().unwrap_or("-"),
    )
}

/// 在调用处理器之前检查调用方权限
pub(crate) fn authorize(
    policy: &dyn AccessPolicy,
    ctx: &AppContext,
    action: &Action,
) -> Result<(), AppError> {
    policy.check(ctx.actor.as_ref(), action).map_err(|denied| {
        tracing::warn!(%action, %denied, "access denied");
        AppError::from(denied)
    })
}

/// 记录处理结果与耗时
pub(crate) fn record<T>(name: &'static str, started: Instant, result: &Result<T, AppError>) {
    let elapsed_ms = started.elapsed().as_millis() as u64;
    match result {
        Ok(_) => tracing::info!(elapsed_ms, "{name} took {elapsed_ms}ms"),
        Err(err) => tracing::info!(elapsed_ms, kind = ?err.kind(), error = %err, "{name} failed after {elapsed_ms}ms"),
    }
}
