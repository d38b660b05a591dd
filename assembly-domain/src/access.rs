//! 访问控制（Access Policy）
//!
//! 以规约组合（`and`/`or`/`not`）表达"哪个角色可以执行哪类操作"，
//! 由应用层总线在调用处理器之前统一检查。
//!
use crate::error::DomainError;
use crate::stage::AssemblyStage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// 角色
///
/// 声明顺序即权限高低：`Operator < Supervisor < Admin`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Operator,
    Supervisor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Operator => "OPERATOR",
            Self::Supervisor => "SUPERVISOR",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OPERATOR" => Ok(Self::Operator),
            "SUPERVISOR" => Ok(Self::Supervisor),
            "ADMIN" => Ok(Self::Admin),
            other => Err(DomainError::validation(format!("unknown role: {other}"))),
        }
    }
}

/// 已认证的调用方
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    id: String,
    name: String,
    role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

/// 需要授权的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ViewProduction,
    CompleteStage(AssemblyStage),
    RejectStage(AssemblyStage),
    ManageBatches,
    ManageProducts,
}

impl Action {
    pub fn stage(&self) -> Option<AssemblyStage> {
        match self {
            Self::CompleteStage(stage) | Self::RejectStage(stage) => Some(*stage),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ViewProduction => f.write_str("view_production"),
            Self::CompleteStage(stage) => write!(f, "complete_stage({stage})"),
            Self::RejectStage(stage) => write!(f, "reject_stage({stage})"),
            Self::ManageBatches => f.write_str("manage_batches"),
            Self::ManageProducts => f.write_str("manage_products"),
        }
    }
}

/// 授权失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessDenied {
    #[error("authentication required")]
    Unauthenticated,
    #[error("{role} {actor_id} may not {action}")]
    Forbidden {
        actor_id: String,
        role: Role,
        action: Action,
    },
}

/// 访问规则：对 (调用方, 操作) 的可组合谓词
pub trait AccessRule: Send + Sync {
    fn allows(&self, actor: &Actor, action: &Action) -> bool;

    fn and<R>(self, other: R) -> AndRule
    where
        Self: Sized + 'static,
        R: AccessRule + 'static,
    {
        AndRule {
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    fn or<R>(self, other: R) -> OrRule
    where
        Self: Sized + 'static,
        R: AccessRule + 'static,
    {
        OrRule {
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    fn not(self) -> NotRule
    where
        Self: Sized + 'static,
    {
        NotRule {
            inner: Box::new(self),
        }
    }
}

impl AccessRule for Box<dyn AccessRule> {
    fn allows(&self, actor: &Actor, action: &Action) -> bool {
        self.as_ref().allows(actor, action)
    }
}

pub struct AndRule {
    left: Box<dyn AccessRule>,
    right: Box<dyn AccessRule>,
}

impl AccessRule for AndRule {
    fn allows(&self, actor: &Actor, action: &Action) -> bool {
        self.left.allows(actor, action) && self.right.allows(actor, action)
    }
}

pub struct OrRule {
    left: Box<dyn AccessRule>,
    right: Box<dyn AccessRule>,
}

impl AccessRule for OrRule {
    fn allows(&self, actor: &Actor, action: &Action) -> bool {
        self.left.allows(actor, action) || self.right.allows(actor, action)
    }
}

pub struct NotRule {
    inner: Box<dyn AccessRule>,
}

impl AccessRule for NotRule {
    fn allows(&self, actor: &Actor, action: &Action) -> bool {
        !self.inner.allows(actor, action)
    }
}

/// 调用方角色不低于给定角色
pub struct RoleAtLeast(pub Role);

impl AccessRule for RoleAtLeast {
    fn allows(&self, actor: &Actor, _: &Action) -> bool {
        actor.role() >= self.0
    }
}

/// 只读的生产数据查询
pub struct Viewing;

impl AccessRule for Viewing {
    fn allows(&self, _: &Actor, action: &Action) -> bool {
        matches!(action, Action::ViewProduction)
    }
}

/// 工位上的完成/驳回操作
pub struct StageWork;

impl AccessRule for StageWork {
    fn allows(&self, _: &Actor, action: &Action) -> bool {
        action.stage().is_some()
    }
}

/// 批次维护
pub struct BatchManagement;

impl AccessRule for BatchManagement {
    fn allows(&self, _: &Actor, action: &Action) -> bool {
        matches!(action, Action::ManageBatches)
    }
}

/// 访问策略
pub trait AccessPolicy: Send + Sync {
    fn permits(&self, actor: &Actor, action: &Action) -> bool;

    fn check(&self, actor: Option<&Actor>, action: &Action) -> Result<(), AccessDenied> {
        let actor = actor.ok_or(AccessDenied::Unauthenticated)?;
        if self.permits(actor, action) {
            Ok(())
        } else {
            Err(AccessDenied::Forbidden {
                actor_id: actor.id().to_string(),
                role: actor.role(),
                action: *action,
            })
        }
    }
}

impl<P> AccessPolicy for Arc<P>
where
    P: AccessPolicy + ?Sized,
{
    fn permits(&self, actor: &Actor, action: &Action) -> bool {
        (**self).permits(actor, action)
    }
}

/// 任何已认证的调用方都可以执行任何操作
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthenticatedOnly;

impl AccessPolicy for AuthenticatedOnly {
    fn permits(&self, _: &Actor, _: &Action) -> bool {
        true
    }
}

/// 基于角色的策略
///
/// 默认规则：操作员可以查看并完成/驳回工序，主管另可维护批次，管理员不受限。
pub struct RolePolicy {
    rule: Box<dyn AccessRule>,
}

impl RolePolicy {
    pub fn with_rule(rule: impl AccessRule + 'static) -> Self {
        Self {
            rule: Box::new(rule),
        }
    }
}

impl Default for RolePolicy {
    fn default() -> Self {
        let floor = Viewing.or(StageWork).and(RoleAtLeast(Role::Operator));
        let supervisor = BatchManagement.and(RoleAtLeast(Role::Supervisor));
        Self::with_rule(floor.or(supervisor).or(RoleAtLeast(Role::Admin)))
    }
}

impl AccessPolicy for RolePolicy {
    fn permits(&self, actor: &Actor, action: &Action) -> bool {
        self.rule.allows(actor, action)
    }
}

/// 可配置的内置策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessPolicyKind {
    #[default]
    RoleBased,
    AuthenticatedOnly,
}

impl AccessPolicyKind {
    pub fn build(self) -> Arc<dyn AccessPolicy> {
        match self {
            Self::RoleBased => Arc::new(RolePolicy::default()),
            Self::AuthenticatedOnly => Arc::new(AuthenticatedOnly),
        }
    }
}
