use bon::Builder;
use serde::{Deserialize, Serialize};

/// 触发事件的业务上下文
///
/// `actor_id` 即写入台账的 `completedById`。
#[derive(Builder, Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventContext {
    /// 关联ID（一次请求内的所有事件共享）
    correlation_id: Option<String>,
    /// 触发事件的主体ID
    actor_id: Option<String>,
    /// 触发事件的主体角色
    actor_role: Option<String>,
}

impl EventContext {
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn actor_id(&self) -> Option<&str> {
        self.actor_id.as_deref()
    }

    pub fn actor_role(&self) -> Option<&str> {
        self.actor_role.as_deref()
    }
}
