//! 工序台账（Stage Log Ledger）
//!
//! 只追加、不可修改的工序完成/驳回记录，是单件进度的唯一事实来源。
//! 条目由单件事件信封转换而来，也可以反向还原为事件以重放单件状态。
//!
use crate::aggregate::Aggregate;
use crate::domain_event::{DomainEvent, EventEnvelope};
use crate::entity::Entity;
use crate::error::{DomainError, DomainResult};
use crate::stage::AssemblyStage;
use crate::unit::{SerializedItem, UnitEvent};
use crate::value_object::{RejectionNotes, UnitId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 台账条目的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageOutcome {
    Complete,
    Rejected,
}

/// 台账条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageLogEntry {
    /// ULID，按时间有序
    id: String,
    unit_id: UnitId,
    /// 该单件的第几条台账（等于写入后的聚合版本）
    sequence: usize,
    stage: AssemblyStage,
    outcome: StageOutcome,
    completed_by_id: String,
    notes: Option<String>,
    timestamp: DateTime<Utc>,
    correlation_id: Option<String>,
}

impl StageLogEntry {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn unit_id(&self) -> &UnitId {
        &self.unit_id
    }

    pub fn sequence(&self) -> usize {
        self.sequence
    }

    pub fn stage(&self) -> AssemblyStage {
        self.stage
    }

    pub fn outcome(&self) -> StageOutcome {
        self.outcome
    }

    pub fn completed_by_id(&self) -> &str {
        &self.completed_by_id
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn timestamp(&self) -> &DateTime<Utc> {
        &self.timestamp
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn is_rejection(&self) -> bool {
        self.outcome == StageOutcome::Rejected
    }

    /// 还原为产生该条目的单件事件
    pub fn to_event(&self) -> DomainResult<UnitEvent> {
        Ok(match self.outcome {
            StageOutcome::Complete => UnitEvent::StageCompleted {
                id: self.id.clone(),
                aggregate_version: self.sequence,
                stage: self.stage,
                completed_at: self.timestamp,
            },
            StageOutcome::Rejected => UnitEvent::StageRejected {
                id: self.id.clone(),
                aggregate_version: self.sequence,
                stage: self.stage,
                notes: RejectionNotes::parse(self.notes.clone().unwrap_or_default())?,
                rejected_at: self.timestamp,
            },
        })
    }
}

impl TryFrom<&EventEnvelope<SerializedItem>> for StageLogEntry {
    type Error = DomainError;

    fn try_from(envelope: &EventEnvelope<SerializedItem>) -> Result<Self, Self::Error> {
        if envelope.metadata.aggregate_type() != SerializedItem::TYPE {
            return Err(DomainError::InvalidState {
                reason: format!(
                    "ledger only records {} events, got {}",
                    SerializedItem::TYPE,
                    envelope.metadata.aggregate_type()
                ),
            });
        }

        let completed_by_id = envelope
            .context
            .actor_id()
            .ok_or_else(|| DomainError::InvalidState {
                reason: "ledger entries require an acting user".to_string(),
            })?
            .to_string();

        let (outcome, notes) = match &envelope.payload {
            UnitEvent::StageCompleted { .. } => (StageOutcome::Complete, None),
            UnitEvent::StageRejected { notes, .. } => {
                (StageOutcome::Rejected, Some(notes.as_str().to_string()))
            }
        };

        Ok(Self {
            id: envelope.payload.event_id().to_string(),
            unit_id: envelope.metadata.aggregate_id().parse()?,
            sequence: envelope.payload.aggregate_version(),
            stage: envelope.payload.stage(),
            outcome,
            completed_by_id,
            notes,
            timestamp: *envelope.metadata.occurred_at(),
            correlation_id: envelope.context.correlation_id().map(str::to_string),
        })
    }
}

/// 将事件信封批量转换为台账条目
pub fn to_entries(envelopes: &[EventEnvelope<SerializedItem>]) -> DomainResult<Vec<StageLogEntry>> {
    envelopes.iter().map(StageLogEntry::try_from).collect()
}

/// 仅凭台账重放单件状态
///
/// 起点为单件刚登记时的状态；条目按 `sequence` 排序后逐条应用。
/// 持久化的单件行必须始终等于重放结果。
pub fn replay(unit: &SerializedItem, entries: &[StageLogEntry]) -> DomainResult<SerializedItem> {
    let mut own: Vec<&StageLogEntry> = entries
        .iter()
        .filter(|e| e.unit_id() == unit.id())
        .collect();
    own.sort_by_key(|e| e.sequence());

    let mut rebuilt = unit.as_registered();
    for entry in own {
        let expected = rebuilt.version() + 1;
        if entry.sequence() != expected {
            return Err(DomainError::VersionConflict {
                expected,
                actual: entry.sequence(),
            });
        }
        rebuilt.apply(&entry.to_event()?);
    }
    Ok(rebuilt)
}
