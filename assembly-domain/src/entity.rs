//! 实体（Entity）基础抽象
//!
//! 为聚合与实体提供统一的标识（Id）与版本（optimistic locking）能力。
//!
use std::{fmt::Display, str::FromStr};

/// 具备唯一标识与版本的实体抽象
pub trait Entity: Send + Sync {
    /// 实体标识类型，要求可解析、可显示与可复制
    type Id: FromStr + Copy + Display + Send + Sync;

    /// 获取实体标识
    fn id(&self) -> &Self::Id;

    /// 获取当前版本（已应用的事件数，用于乐观锁）
    fn version(&self) -> usize;
}
