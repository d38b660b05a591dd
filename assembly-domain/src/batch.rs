//! 批次（Batch）与批次汇总（Batch Aggregator）
//!
//! 批次只保存创建时的目标信息；完成数、完成百分比与整体状态每次读取时
//! 由成员单件重新计算，从不持久化。
//!
use crate::entity::Entity;
use crate::error::{DomainError, DomainResult};
use crate::stage::AssemblyStage;
use crate::unit::{ItemStatus, SerializedItem};
use crate::value_object::{BatchId, ProductId, SerialNumber, UnitId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 批次整体状态（派生）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    #[default]
    Pending,
    InProgress,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    id: BatchId,
    product_id: ProductId,
    name: String,
    /// 目标数量，可以大于已登记的单件数
    quantity: u32,
    created_at: DateTime<Utc>,
}

impl Batch {
    pub fn create(
        id: BatchId,
        product_id: ProductId,
        name: &str,
        quantity: u32,
        at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("batch name is required"));
        }
        if quantity == 0 {
            return Err(DomainError::validation("batch quantity must be positive"));
        }

        Ok(Self {
            id,
            product_id,
            name: name.to_string(),
            quantity,
            created_at: at,
        })
    }

    pub fn id(&self) -> &BatchId {
        &self.id
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }
}

/// 创建批次时随附的序列号：数量必须与目标数量一致
pub fn validate_initial_serials(
    quantity: u32,
    serials: &[String],
) -> DomainResult<Vec<SerialNumber>> {
    if serials.len() != quantity as usize {
        return Err(DomainError::validation(format!(
            "the number of serial numbers ({}) must match the specified quantity ({quantity})",
            serials.len()
        )));
    }
    parse_unique(serials)
}

/// 向已有批次追加序列号：追加后总数不得超过目标数量
pub fn validate_additional_serials(
    quantity: u32,
    existing: usize,
    serials: &[String],
) -> DomainResult<Vec<SerialNumber>> {
    if serials.is_empty() {
        return Err(DomainError::validation("no serial numbers supplied"));
    }
    if existing + serials.len() > quantity as usize {
        return Err(DomainError::validation(format!(
            "batch holds {existing} of {quantity} units, cannot add {} more",
            serials.len()
        )));
    }
    parse_unique(serials)
}

fn parse_unique(serials: &[String]) -> DomainResult<Vec<SerialNumber>> {
    let parsed = serials
        .iter()
        .map(|s| SerialNumber::parse(s.as_str()))
        .collect::<DomainResult<Vec<_>>>()?;

    let mut seen = HashSet::new();
    let duplicates: Vec<&str> = parsed
        .iter()
        .filter(|sn| !seen.insert(sn.as_str()))
        .map(|sn| sn.as_str())
        .collect();
    if !duplicates.is_empty() {
        return Err(DomainError::validation(format!(
            "duplicate serial numbers in input: {}",
            duplicates.join(", ")
        )));
    }

    Ok(parsed)
}

/// round(100 × completed / quantity)，数量为 0 时为 0，结果不超过 100
pub fn progress_percent(completed: usize, quantity: u32) -> u8 {
    if quantity == 0 {
        return 0;
    }
    let q = u64::from(quantity);
    let c = completed as u64;
    // 四舍五入（.5 进位）
    let pct = (200 * c + q) / (2 * q);
    pct.min(100) as u8
}

/// 批次成员单件摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitSummary {
    pub id: UnitId,
    pub serial_number: SerialNumber,
    pub status: ItemStatus,
    pub current_stage: Option<AssemblyStage>,
}

impl From<&SerializedItem> for UnitSummary {
    fn from(unit: &SerializedItem) -> Self {
        Self {
            id: *unit.id(),
            serial_number: unit.serial_number().clone(),
            status: unit.status(),
            current_stage: unit.current_stage(),
        }
    }
}

/// 附带派生进度的批次视图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchView {
    #[serde(flatten)]
    pub batch: Batch,
    pub status: BatchStatus,
    pub completed_count: usize,
    pub progress_percent: u8,
    /// 按序列号升序排列
    pub serialized_items: Vec<UnitSummary>,
}

impl BatchView {
    pub fn compute<'a>(batch: Batch, units: impl IntoIterator<Item = &'a SerializedItem>) -> Self {
        let mut items: Vec<UnitSummary> = units
            .into_iter()
            .filter(|u| u.batch_id() == batch.id())
            .map(UnitSummary::from)
            .collect();
        items.sort_by(|a, b| a.serial_number.cmp(&b.serial_number));

        let completed_count = items
            .iter()
            .filter(|u| u.status == ItemStatus::Complete)
            .count();
        let started = items.iter().any(|u| u.status != ItemStatus::NotStarted);

        let status = if batch.quantity() > 0 && completed_count >= batch.quantity() as usize {
            BatchStatus::Complete
        } else if started {
            BatchStatus::InProgress
        } else {
            BatchStatus::Pending
        };

        Self {
            progress_percent: progress_percent(completed_count, batch.quantity()),
            batch,
            status,
            completed_count,
            serialized_items: items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Aggregate;
    use crate::stage::STAGE_SEQUENCE;
    use crate::unit::{CompletionPolicy, UnitCommand};

    fn batch(quantity: u32) -> Batch {
        Batch::create(
            BatchId::generate(),
            ProductId::generate(),
            "C9-2025W10",
            quantity,
            Utc::now(),
        )
        .unwrap()
    }

    fn unit_in(batch: &Batch, serial: &str) -> SerializedItem {
        SerializedItem::register(
            UnitId::generate(),
            *batch.id(),
            SerialNumber::parse(serial).unwrap(),
            Utc::now(),
        )
    }

    fn finish(unit: &mut SerializedItem) {
        for stage in STAGE_SEQUENCE {
            let events = unit
                .execute(UnitCommand::CompleteStage {
                    stage,
                    policy: CompletionPolicy::Strict,
                    at: Utc::now(),
                })
                .unwrap();
            for e in &events {
                unit.apply(e);
            }
        }
    }

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn percent_is_rounded_and_bounded() {
        assert_eq!(progress_percent(0, 0), 0);
        assert_eq!(progress_percent(5, 0), 0);
        assert_eq!(progress_percent(0, 3), 0);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(1, 2), 50);
        assert_eq!(progress_percent(1, 8), 13);
        assert_eq!(progress_percent(3, 3), 100);
        assert_eq!(progress_percent(9, 3), 100);
        for q in 0..20u32 {
            for c in 0..=(q as usize + 2) {
                assert!(progress_percent(c, q) <= 100);
            }
        }
    }

    #[test]
    fn create_validates_name_and_quantity() {
        let err = Batch::create(BatchId::generate(), ProductId::generate(), " ", 3, Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
        let err = Batch::create(BatchId::generate(), ProductId::generate(), "B", 0, Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[test]
    fn initial_serials_must_match_quantity() {
        let err = validate_initial_serials(2, &strings(&["10001", "10002", "10003"])).unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
        assert_eq!(
            validate_initial_serials(2, &strings(&["10001", "10002"]))
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn serials_must_be_unique_and_well_formed() {
        let err = validate_initial_serials(2, &strings(&["10001", "10001"])).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
        let err = validate_initial_serials(2, &strings(&["10001", "SN002"])).unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[test]
    fn additional_serials_respect_remaining_capacity() {
        assert!(validate_additional_serials(3, 0, &strings(&["10001"])).is_ok());
        assert!(validate_additional_serials(3, 2, &strings(&["10001", "10002"])).is_err());
        assert!(validate_additional_serials(3, 0, &[]).is_err());
    }

    #[test]
    fn empty_batch_view_is_pending_at_zero() {
        let view = BatchView::compute(batch(3), Vec::<&SerializedItem>::new());
        assert_eq!(view.completed_count, 0);
        assert_eq!(view.progress_percent, 0);
        assert_eq!(view.status, BatchStatus::Pending);
        assert!(view.serialized_items.is_empty());
    }

    #[test]
    fn view_counts_completed_units_and_sorts_by_serial() {
        let b = batch(3);
        let mut u1 = unit_in(&b, "30003");
        let u2 = unit_in(&b, "30001");
        let stranger = unit_in(&batch(1), "30002");
        finish(&mut u1);

        let view = BatchView::compute(b, [&u1, &u2, &stranger]);
        assert_eq!(view.completed_count, 1);
        assert_eq!(view.progress_percent, 33);
        assert_eq!(view.status, BatchStatus::InProgress);
        let serials: Vec<&str> = view
            .serialized_items
            .iter()
            .map(|u| u.serial_number.as_str())
            .collect();
        assert_eq!(serials, vec!["30001", "30003"]);
    }

    #[test]
    fn view_is_complete_when_every_target_unit_is_done() {
        let b = batch(1);
        let mut u = unit_in(&b, "40001");
        finish(&mut u);
        let view = BatchView::compute(b, [&u]);
        assert_eq!(view.status, BatchStatus::Complete);
        assert_eq!(view.progress_percent, 100);
    }

    #[test]
    fn view_flattens_batch_fields() {
        let view = BatchView::compute(batch(2), Vec::<&SerializedItem>::new());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["quantity"], 2);
        assert_eq!(json["completedCount"], 0);
        assert_eq!(json["progressPercent"], 0);
        assert_eq!(json["status"], "PENDING");
    }
}
