//! 装配追踪领域的过程宏
//!
//! 目前仅提供 `#[entity_id]`：为 `Uuid` 新类型生成实体标识所需的派生与转换，
//! 使 `ProductId`、`BatchId`、`UnitId` 等标识在类型层面互不混用。
//!
use proc_macro::TokenStream;

mod derives;
mod entity_id;

/// 实体标识宏
///
/// 仅支持包装 `Uuid` 的单字段 tuple struct，例如 `pub struct UnitId(Uuid);`：
/// - 合并派生：Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize
/// - 以 `#[serde(transparent)]` 序列化为裸 UUID 字符串
/// - 生成 `new/generate/as_uuid`、`Display`、`FromStr` 与双向 `From`
#[proc_macro_attribute]
pub fn entity_id(attr: TokenStream, item: TokenStream) -> TokenStream {
    entity_id::expand(attr, item)
}
