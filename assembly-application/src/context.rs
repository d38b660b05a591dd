use assembly_domain::access::Actor;
use assembly_domain::domain_event::EventContext;

/// 应用层上下文（Application Context）
///
/// 承载一次应用层调用（命令/查询）所需的横切信息：
/// - 调用方（`actor`）：由身份认证层解析，缺失时总线直接拒绝；
/// - 关联ID（`correlation_id`）：贯穿日志与台账条目，便于追踪一次请求。
///
/// 典型用法：
/// ```rust
/// use assembly_application::context::AppContext;
/// use assembly_domain::access::{Actor, Role};
///
/// let ctx = AppContext::authenticated(Actor::new("u-1", "Dana", Role::Operator))
///     .with_correlation_id("req-42");
/// assert_eq!(ctx.event_context().actor_id(), Some("u-1"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct AppContext {
    /// 已认证的调用方
    pub actor: Option<Actor>,
    /// 关联ID（可选）
    pub correlation_id: Option<String>,
}

impl AppContext {
    pub fn authenticated(actor: Actor) -> Self {
        Self {
            actor: Some(actor),
            correlation_id: None,
        }
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn actor_id(&self) -> Option<&str> {
        self.actor.as_ref().map(Actor::id)
    }

    /// 转换为写入事件信封的业务上下文
    pub fn event_context(&self) -> EventContext {
        EventContext::builder()
            .maybe_correlation_id(self.correlation_id.clone())
            .maybe_actor_id(self.actor.as_ref().map(|a| a.id().to_string()))
            .maybe_actor_role(self.actor.as_ref().map(|a| a.role().to_string()))
            .build()
    }
}
