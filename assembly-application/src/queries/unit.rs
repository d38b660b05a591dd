use crate::context::AppContext;
use crate::dto::UnitDetails;
use crate::error::AppError;
use crate::query::Query;
use crate::query_handler::QueryHandler;
use assembly_domain::entity::Entity;
use assembly_domain::error::DomainError;
use assembly_domain::persist::{BatchRepository, LedgerRepository, UnitRepository};
use assembly_domain::progress::UnitProgress;
use assembly_domain::value_object::{SerialNumber, UnitId};
use async_trait::async_trait;
use std::sync::Arc;

/// 单件详情：单件、批次名称与全部台账（最旧在前）
#[derive(Debug, Clone)]
pub struct GetAssemblyDetailsByUnitId {
    pub unit_id: UnitId,
}

impl Query for GetAssemblyDetailsByUnitId {
    const NAME: &'static str = "assembly.getAssemblyDetailsByUnitId";
    type Dto = UnitDetails;
}

/// 按序列号查询单件的逐工序进度
#[derive(Debug, Clone)]
pub struct GetUnitProgressBySerial {
    pub serial_number: String,
}

impl Query for GetUnitProgressBySerial {
    const NAME: &'static str = "assembly.getUnitAssemblyProgressBySerial";
    type Dto = UnitProgress;
}

pub struct UnitQueryHandler {
    units: Arc<dyn UnitRepository>,
    batches: Arc<dyn BatchRepository>,
    ledger: Arc<dyn LedgerRepository>,
}

impl UnitQueryHandler {
    pub fn new(
        units: Arc<dyn UnitRepository>,
        batches: Arc<dyn BatchRepository>,
        ledger: Arc<dyn LedgerRepository>,
    ) -> Self {
        Self {
            units,
            batches,
            ledger,
        }
    }
}

#[async_trait]
impl QueryHandler<GetAssemblyDetailsByUnitId> for UnitQueryHandler {
    async fn handle(
        &self,
        _ctx: &AppContext,
        q: GetAssemblyDetailsByUnitId,
    ) -> Result<UnitDetails, AppError> {
        let unit = self
            .units
            .find_unit(&q.unit_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("unit {} not found", q.unit_id)))?;
        let batch = self
            .batches
            .find_batch(unit.batch_id())
            .await?
            .ok_or_else(|| DomainError::not_found(format!("batch {} not found", unit.batch_id())))?;
        let stage_logs = self.ledger.entries_for(&q.unit_id).await?;

        Ok(UnitDetails {
            unit,
            batch_name: batch.name().to_string(),
            stage_logs,
        })
    }
}

#[async_trait]
impl QueryHandler<GetUnitProgressBySerial> for UnitQueryHandler {
    async fn handle(
        &self,
        _ctx: &AppContext,
        q: GetUnitProgressBySerial,
    ) -> Result<UnitProgress, AppError> {
        let serial = SerialNumber::parse(q.serial_number)?;
        let unit = self
            .units
            .find_unit_by_serial(&serial)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("unit with serial {serial} not found")))?;
        let entries = self.ledger.entries_for(unit.id()).await?;

        Ok(UnitProgress::project(unit, &entries))
    }
}
