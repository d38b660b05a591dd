//! 单件进度投影
//!
//! 每次读取时由单件与其台账重新计算，从不单独持久化。
//!
use crate::entity::Entity;
use crate::ledger::{StageLogEntry, StageOutcome};
use crate::stage::{AssemblyStage, STAGE_SEQUENCE};
use crate::unit::SerializedItem;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 单道工序的派生状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageState {
    Complete,
    InProgress,
    NotStarted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageProgress {
    pub stage: AssemblyStage,
    pub status: StageState,
}

/// 单件及其每道工序的状态（按工序序列排列，恒为 11 项）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitProgress {
    pub unit: SerializedItem,
    pub stages: Vec<StageProgress>,
}

impl UnitProgress {
    pub fn project(unit: SerializedItem, entries: &[StageLogEntry]) -> Self {
        let completed: HashSet<AssemblyStage> = entries
            .iter()
            .filter(|e| e.unit_id() == unit.id() && e.outcome() == StageOutcome::Complete)
            .map(|e| e.stage())
            .collect();

        let stages = STAGE_SEQUENCE
            .iter()
            .map(|stage| {
                let status = if completed.contains(stage) {
                    StageState::Complete
                } else if unit.current_stage() == Some(*stage) {
                    StageState::InProgress
                } else {
                    StageState::NotStarted
                };
                StageProgress {
                    stage: *stage,
                    status,
                }
            })
            .collect();

        Self { unit, stages }
    }

    pub fn status_of(&self, stage: AssemblyStage) -> Option<StageState> {
        self.stages
            .iter()
            .find(|p| p.stage == stage)
            .map(|p| p.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Aggregate;
    use crate::domain_event::{EventContext, EventEnvelope};
    use crate::ledger::StageLogEntry;
    use crate::unit::{CompletionPolicy, UnitCommand};
    use crate::value_object::{BatchId, RejectionNotes, SerialNumber, UnitId};
    use chrono::Utc;

    fn record(unit: &mut SerializedItem, command: UnitCommand) -> StageLogEntry {
        let event = unit.execute(command).unwrap().remove(0);
        unit.apply(&event);
        let ctx = EventContext::builder().actor_id("u-1".to_string()).build();
        let env = EventEnvelope::<SerializedItem>::new(unit.id(), event, ctx, Utc::now());
        StageLogEntry::try_from(&env).unwrap()
    }

    fn fresh() -> SerializedItem {
        SerializedItem::register(
            UnitId::generate(),
            BatchId::generate(),
            SerialNumber::parse("20001").unwrap(),
            Utc::now(),
        )
    }

    #[test]
    fn unstarted_unit_is_all_not_started() {
        let p = UnitProgress::project(fresh(), &[]);
        assert_eq!(p.stages.len(), 11);
        assert!(p.stages.iter().all(|s| s.status == StageState::NotStarted));
    }

    #[test]
    fn projection_marks_complete_current_and_pending() {
        let mut unit = fresh();
        let mut ledger = Vec::new();
        for stage in [AssemblyStage::LapAndClean, AssemblyStage::PinEjector] {
            ledger.push(record(
                &mut unit,
                UnitCommand::CompleteStage {
                    stage,
                    policy: CompletionPolicy::Strict,
                    at: Utc::now(),
                },
            ));
        }
        ledger.push(record(
            &mut unit,
            UnitCommand::RejectStage {
                stage: AssemblyStage::InstallExtractor,
                notes: RejectionNotes::parse("extractor tension").unwrap(),
                at: Utc::now(),
            },
        ));

        let p = UnitProgress::project(unit, &ledger);
        assert_eq!(p.status_of(AssemblyStage::LapAndClean), Some(StageState::Complete));
        assert_eq!(p.status_of(AssemblyStage::PinEjector), Some(StageState::Complete));
        // 驳回不算完成，当前工序仍显示为进行中
        assert_eq!(
            p.status_of(AssemblyStage::InstallExtractor),
            Some(StageState::InProgress)
        );
        assert_eq!(p.status_of(AssemblyStage::FitBarrel), Some(StageState::NotStarted));
    }

    #[test]
    fn entries_of_other_units_are_ignored() {
        let mut other = fresh();
        let foreign = record(
            &mut other,
            UnitCommand::CompleteStage {
                stage: AssemblyStage::LapAndClean,
                policy: CompletionPolicy::Strict,
                at: Utc::now(),
            },
        );
        let p = UnitProgress::project(fresh(), &[foreign]);
        assert_eq!(p.status_of(AssemblyStage::LapAndClean), Some(StageState::NotStarted));
    }

    #[test]
    fn stage_state_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&StageState::InProgress).unwrap(),
            "\"in_progress\""
        );
    }
}
