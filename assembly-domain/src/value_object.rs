//! 值对象（Value Object）与实体标识
//!
//! 无标识、以值相等为准的对象，用于封装不可变的概念性值与校验逻辑。
//! 所有值对象只能经由校验构造，持有即合法。
//!
use crate::error::{DomainError, DomainResult};
use assembly_macros::entity_id;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 值对象抽象
pub trait ValueObject {
    /// 业务校验失败时的错误类型
    type Error;

    /// 创建值对象时进行验证
    fn validate(&self) -> Result<(), Self::Error>;
}

/// 产品标识
#[entity_id]
pub struct ProductId(Uuid);

/// 批次标识
#[entity_id]
pub struct BatchId(Uuid);

/// 单件（序列化物品）标识
#[entity_id]
pub struct UnitId(Uuid);

/// 序列号长度
pub const SERIAL_LEN: usize = 5;

/// 序列号：全局唯一，恰为 5 位 ASCII 数字
///
/// ```
/// use assembly_domain::value_object::SerialNumber;
///
/// let sn = SerialNumber::parse("10010").unwrap();
/// assert_eq!(sn.as_str(), "10010");
/// assert!(SerialNumber::parse("1001").is_err());
/// assert!(SerialNumber::parse("1001a").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SerialNumber(String);

impl SerialNumber {
    pub fn parse(value: impl Into<String>) -> DomainResult<Self> {
        let sn = Self(value.into().trim().to_string());
        sn.validate()?;
        Ok(sn)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for SerialNumber {
    type Error = DomainError;

    fn validate(&self) -> Result<(), Self::Error> {
        if self.0.len() != SERIAL_LEN || !self.0.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::validation(format!(
                "serial number must be exactly {SERIAL_LEN} digits, got {:?}",
                self.0
            )));
        }
        Ok(())
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SerialNumber {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SerialNumber {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<SerialNumber> for String {
    fn from(value: SerialNumber) -> Self {
        value.0
    }
}

/// 驳回说明：去除首尾空白后不得为空
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RejectionNotes(String);

impl RejectionNotes {
    pub fn parse(value: impl Into<String>) -> DomainResult<Self> {
        let notes = Self(value.into().trim().to_string());
        notes.validate()?;
        Ok(notes)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for RejectionNotes {
    type Error = DomainError;

    fn validate(&self) -> Result<(), Self::Error> {
        if self.0.is_empty() {
            return Err(DomainError::validation("rejection notes are required"));
        }
        Ok(())
    }
}

impl TryFrom<String> for RejectionNotes {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<RejectionNotes> for String {
    fn from(value: RejectionNotes) -> Self {
        value.0
    }
}
