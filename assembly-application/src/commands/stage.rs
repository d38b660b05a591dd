use crate::clock::Clock;
use crate::command::Command;
use crate::command_handler::CommandHandler;
use crate::context::AppContext;
use crate::error::AppError;
use assembly_domain::access::Action;
use assembly_domain::aggregate_root::AggregateRoot;
use assembly_domain::error::DomainError;
use assembly_domain::ledger::StageLogEntry;
use assembly_domain::persist::AggregateRepository;
use assembly_domain::stage::AssemblyStage;
use assembly_domain::unit::{CompletionPolicy, SerializedItem, UnitCommand};
use assembly_domain::value_object::{RejectionNotes, UnitId};
use async_trait::async_trait;
use std::sync::Arc;

type UnitRoot = AggregateRoot<SerializedItem, Arc<dyn AggregateRepository<SerializedItem>>>;

/// 标记单件完成某道工序
#[derive(Debug, Clone)]
pub struct MarkStageComplete {
    pub unit_id: UnitId,
    pub stage: AssemblyStage,
}

impl Command for MarkStageComplete {
    const NAME: &'static str = "assembly.markStageComplete";
    type Output = SerializedItem;

    fn action(&self) -> Action {
        Action::CompleteStage(self.stage)
    }
}

pub struct MarkStageCompleteHandler {
    root: UnitRoot,
    clock: Arc<dyn Clock>,
    policy: CompletionPolicy,
}

impl MarkStageCompleteHandler {
    pub fn new(
        units: Arc<dyn AggregateRepository<SerializedItem>>,
        clock: Arc<dyn Clock>,
        policy: CompletionPolicy,
    ) -> Self {
        Self {
            root: AggregateRoot::new(units),
            clock,
            policy,
        }
    }
}

#[async_trait]
impl CommandHandler<MarkStageComplete> for MarkStageCompleteHandler {
    async fn handle(
        &self,
        ctx: &AppContext,
        cmd: MarkStageComplete,
    ) -> Result<SerializedItem, AppError> {
        let (unit, _) = self
            .root
            .execute(
                &cmd.unit_id,
                UnitCommand::CompleteStage {
                    stage: cmd.stage,
                    policy: self.policy,
                    at: self.clock.now(),
                },
                ctx.event_context(),
            )
            .await?;

        tracing::debug!(
            unit = %unit.serial_number(),
            stage = %cmd.stage,
            status = ?unit.status(),
            current_stage = ?unit.current_stage(),
            "stage completed"
        );
        Ok(unit)
    }
}

/// 驳回单件在某道工序上的结果
#[derive(Debug, Clone)]
pub struct RejectStage {
    pub unit_id: UnitId,
    pub stage: AssemblyStage,
    pub notes: String,
}

impl Command for RejectStage {
    const NAME: &'static str = "assembly.rejectStage";
    type Output = StageLogEntry;

    fn action(&self) -> Action {
        Action::RejectStage(self.stage)
    }
}

pub struct RejectStageHandler {
    root: UnitRoot,
    clock: Arc<dyn Clock>,
}

impl RejectStageHandler {
    pub fn new(units: Arc<dyn AggregateRepository<SerializedItem>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            root: AggregateRoot::new(units),
            clock,
        }
    }
}

#[async_trait]
impl CommandHandler<RejectStage> for RejectStageHandler {
    async fn handle(&self, ctx: &AppContext, cmd: RejectStage) -> Result<StageLogEntry, AppError> {
        // 先校验备注，空备注时不读取也不写入任何数据
        let notes = RejectionNotes::parse(cmd.notes)?;

        let (unit, envelopes) = self
            .root
            .execute(
                &cmd.unit_id,
                UnitCommand::RejectStage {
                    stage: cmd.stage,
                    notes,
                    at: self.clock.now(),
                },
                ctx.event_context(),
            )
            .await?;

        let envelope = envelopes.first().ok_or_else(|| DomainError::InvalidState {
            reason: "rejection produced no ledger entry".to_string(),
        })?;
        let entry = StageLogEntry::try_from(envelope)?;

        tracing::info!(
            unit = %unit.serial_number(),
            stage = %cmd.stage,
            notes = entry.notes().unwrap_or_default(),
            "stage rejected"
        );
        Ok(entry)
    }
}
