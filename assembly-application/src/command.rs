use crate::dto::Dto;
use assembly_domain::access::Action;

/// 应用层命令（Command）
///
/// 表达"意图"的写操作请求，会修改领域状态，并返回写入后的结果视图。
/// - 与 [`Query`](crate::query::Query) 相对；
/// - `action` 声明执行该命令所需的权限，由总线在调用处理器前检查。
///
/// 关联常量：
/// - `NAME`：命令的稳定名称，用于日志、追踪与路由。避免依赖 `type_name::<T>()`。
pub trait Command: Send + Sync + 'static {
    /// 命令的稳定名称（建议常量字符串，不随重构变化）
    const NAME: &'static str;

    /// 命令执行成功后的返回值
    type Output: Dto;

    /// 执行该命令需要的权限
    fn action(&self) -> Action;
}
