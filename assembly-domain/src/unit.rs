//! 单件推进引擎（Unit Progression Engine）
//!
//! 单件（序列化物品）是一个聚合：`execute` 只校验命令并产出台账事件，
//! `apply` 把事件投影为 `status`/`current_stage`。两者都是纯函数，
//! 由仓储在同一事务中写入台账条目与单件行。
//!
//! 状态机：`NOT_STARTED → IN_PROGRESS(stage) → COMPLETE`，只能沿工序序列前进；
//! 驳回只记账，不改变状态。
//!
use crate::aggregate::Aggregate;
use crate::domain_event::DomainEvent;
use crate::entity::Entity;
use crate::error::DomainError;
use crate::stage::{self, AssemblyStage};
use crate::value_object::{BatchId, RejectionNotes, SerialNumber, UnitId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 单件整体状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    #[default]
    NotStarted,
    InProgress,
    Complete,
}

/// 重复/乱序完成工序时的处理策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionPolicy {
    /// 只接受单件当前应完成的工序；已完成的单件拒绝继续完成
    #[default]
    Strict,
    /// 接受任意工序，重复完成会再次记账并再次推进
    Permissive,
}

/// 序列化物品（单件）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedItem {
    id: UnitId,
    version: usize,
    batch_id: BatchId,
    serial_number: SerialNumber,
    status: ItemStatus,
    current_stage: Option<AssemblyStage>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SerializedItem {
    /// 登记一个尚未开工的单件
    pub fn register(
        id: UnitId,
        batch_id: BatchId,
        serial_number: SerialNumber,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            version: 0,
            batch_id,
            serial_number,
            status: ItemStatus::NotStarted,
            current_stage: None,
            created_at: at,
            updated_at: at,
        }
    }

    pub fn batch_id(&self) -> &BatchId {
        &self.batch_id
    }

    pub fn serial_number(&self) -> &SerialNumber {
        &self.serial_number
    }

    pub fn status(&self) -> ItemStatus {
        self.status
    }

    pub fn current_stage(&self) -> Option<AssemblyStage> {
        self.current_stage
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    /// 最近一次状态变更时间（驳回不会更新）
    pub fn updated_at(&self) -> &DateTime<Utc> {
        &self.updated_at
    }

    /// 该单件接下来应完成的工序；已完成时为 `None`
    pub fn expected_stage(&self) -> Option<AssemblyStage> {
        match self.status {
            ItemStatus::Complete => None,
            _ => Some(self.current_stage.unwrap_or_else(stage::first_stage)),
        }
    }

    /// 回到刚登记时的状态，作为台账重放的起点
    pub(crate) fn as_registered(&self) -> Self {
        Self::register(
            self.id,
            self.batch_id,
            self.serial_number.clone(),
            self.created_at,
        )
    }

    fn next_version(&self) -> usize {
        self.version + 1
    }
}

impl Entity for SerializedItem {
    type Id = UnitId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> usize {
        self.version
    }
}

/// 单件命令
#[derive(Debug, Clone)]
pub enum UnitCommand {
    CompleteStage {
        stage: AssemblyStage,
        policy: CompletionPolicy,
        at: DateTime<Utc>,
    },
    RejectStage {
        stage: AssemblyStage,
        notes: RejectionNotes,
        at: DateTime<Utc>,
    },
}

/// 单件事件：每个事件对应一条台账条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UnitEvent {
    StageCompleted {
        id: String,
        aggregate_version: usize,
        stage: AssemblyStage,
        completed_at: DateTime<Utc>,
    },
    StageRejected {
        id: String,
        aggregate_version: usize,
        stage: AssemblyStage,
        notes: RejectionNotes,
        rejected_at: DateTime<Utc>,
    },
}

impl UnitEvent {
    pub fn stage(&self) -> AssemblyStage {
        match self {
            Self::StageCompleted { stage, .. } | Self::StageRejected { stage, .. } => *stage,
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::StageCompleted { completed_at, .. } => *completed_at,
            Self::StageRejected { rejected_at, .. } => *rejected_at,
        }
    }
}

impl DomainEvent for UnitEvent {
    fn event_id(&self) -> &str {
        match self {
            Self::StageCompleted { id, .. } | Self::StageRejected { id, .. } => id,
        }
    }

    fn event_type(&self) -> &str {
        match self {
            Self::StageCompleted { .. } => "UnitEvent.StageCompleted",
            Self::StageRejected { .. } => "UnitEvent.StageRejected",
        }
    }

    fn aggregate_version(&self) -> usize {
        match self {
            Self::StageCompleted {
                aggregate_version, ..
            }
            | Self::StageRejected {
                aggregate_version, ..
            } => *aggregate_version,
        }
    }
}

impl Aggregate for SerializedItem {
    const TYPE: &'static str = "serialized_item";

    type Command = UnitCommand;
    type Event = UnitEvent;
    type Error = DomainError;

    fn execute(&self, command: Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            UnitCommand::CompleteStage { stage, policy, at } => {
                if policy == CompletionPolicy::Strict {
                    match self.expected_stage() {
                        None => {
                            return Err(DomainError::InvalidState {
                                reason: format!(
                                    "unit {} is already complete",
                                    self.serial_number
                                ),
                            });
                        }
                        Some(expected) if expected != stage => {
                            return Err(DomainError::InvalidState {
                                reason: format!(
                                    "unit {} expects stage {expected}, got {stage}",
                                    self.serial_number
                                ),
                            });
                        }
                        Some(_) => {}
                    }
                }

                Ok(vec![UnitEvent::StageCompleted {
                    id: ulid::Ulid::new().to_string(),
                    aggregate_version: self.next_version(),
                    stage,
                    completed_at: at,
                }])
            }
            UnitCommand::RejectStage { stage, notes, at } => Ok(vec![UnitEvent::StageRejected {
                id: ulid::Ulid::new().to_string(),
                aggregate_version: self.next_version(),
                stage,
                notes,
                rejected_at: at,
            }]),
        }
    }

    fn apply(&mut self, event: &Self::Event) {
        match event {
            UnitEvent::StageCompleted {
                aggregate_version,
                stage,
                completed_at,
                ..
            } => {
                match stage::next_stage(*stage) {
                    None => {
                        self.status = ItemStatus::Complete;
                        self.current_stage = Some(*stage);
                    }
                    Some(next) => {
                        self.current_stage = Some(next);
                        if self.status != ItemStatus::Complete {
                            self.status = ItemStatus::InProgress;
                        }
                    }
                }
                self.updated_at = *completed_at;
                self.version = *aggregate_version;
            }
            UnitEvent::StageRejected {
                aggregate_version, ..
            } => {
                self.version = *aggregate_version;
            }
        }
    }
}
