use crate::clock::Clock;
use crate::command::Command;
use crate::command_handler::CommandHandler;
use crate::context::AppContext;
use crate::error::AppError;
use assembly_domain::access::Action;
use assembly_domain::batch::{self, Batch, BatchView};
use assembly_domain::error::DomainError;
use assembly_domain::persist::{BatchRepository, ProductRepository, UnitRepository};
use assembly_domain::unit::SerializedItem;
use assembly_domain::value_object::{BatchId, ProductId, SerialNumber, UnitId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// 创建批次，可随附与目标数量一致的序列号
#[derive(Debug, Clone)]
pub struct CreateBatch {
    pub name: String,
    pub product_id: ProductId,
    pub quantity: u32,
    /// 为空或缺省时稍后再分配序列号
    pub serial_numbers: Option<Vec<String>>,
}

impl Command for CreateBatch {
    const NAME: &'static str = "batch.createBatch";
    type Output = BatchView;

    fn action(&self) -> Action {
        Action::ManageBatches
    }
}

fn register_units(batch_id: BatchId, serials: Vec<SerialNumber>, at: DateTime<Utc>) -> Vec<SerializedItem> {
    serials
        .into_iter()
        .map(|sn| SerializedItem::register(UnitId::generate(), batch_id, sn, at))
        .collect()
}

pub struct CreateBatchHandler {
    products: Arc<dyn ProductRepository>,
    batches: Arc<dyn BatchRepository>,
    clock: Arc<dyn Clock>,
}

impl CreateBatchHandler {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        batches: Arc<dyn BatchRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            products,
            batches,
            clock,
        }
    }
}

#[async_trait]
impl CommandHandler<CreateBatch> for CreateBatchHandler {
    async fn handle(&self, _ctx: &AppContext, cmd: CreateBatch) -> Result<BatchView, AppError> {
        let now = self.clock.now();
        let batch = Batch::create(BatchId::generate(), cmd.product_id, &cmd.name, cmd.quantity, now)?;

        if self.products.find_product(&cmd.product_id).await?.is_none() {
            return Err(DomainError::not_found(format!("product {} not found", cmd.product_id)).into());
        }

        let serials = match cmd.serial_numbers {
            Some(serials) if !serials.is_empty() => {
                batch::validate_initial_serials(cmd.quantity, &serials)?
            }
            _ => Vec::new(),
        };
        let units = register_units(*batch.id(), serials, now);

        self.batches.create_batch(batch.clone(), units.clone()).await?;

        tracing::info!(
            batch = %batch.id(),
            name = batch.name(),
            quantity = batch.quantity(),
            units = units.len(),
            "batch created"
        );
        Ok(BatchView::compute(batch, &units))
    }
}

/// 为已有批次追加序列号
#[derive(Debug, Clone)]
pub struct AssignSerialNumbers {
    pub batch_id: BatchId,
    pub serial_numbers: Vec<String>,
}

impl Command for AssignSerialNumbers {
    const NAME: &'static str = "batch.assignSerialNumbers";
    type Output = BatchView;

    fn action(&self) -> Action {
        Action::ManageBatches
    }
}

pub struct AssignSerialNumbersHandler {
    batches: Arc<dyn BatchRepository>,
    units: Arc<dyn UnitRepository>,
    clock: Arc<dyn Clock>,
}

impl AssignSerialNumbersHandler {
    pub fn new(
        batches: Arc<dyn BatchRepository>,
        units: Arc<dyn UnitRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            batches,
            units,
            clock,
        }
    }
}

#[async_trait]
impl CommandHandler<AssignSerialNumbers> for AssignSerialNumbersHandler {
    async fn handle(
        &self,
        _ctx: &AppContext,
        cmd: AssignSerialNumbers,
    ) -> Result<BatchView, AppError> {
        let batch = self
            .batches
            .find_batch(&cmd.batch_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("batch {} not found", cmd.batch_id)))?;

        let existing = self.units.units_in_batch(batch.id()).await?.len();
        let serials =
            batch::validate_additional_serials(batch.quantity(), existing, &cmd.serial_numbers)?;
        let added = serials.len();

        let units = register_units(*batch.id(), serials, self.clock.now());
        self.batches.add_units(batch.id(), units).await?;

        tracing::info!(batch = %batch.id(), added, "serial numbers assigned");

        let members = self.units.units_in_batch(batch.id()).await?;
        Ok(BatchView::compute(batch, &members))
    }
}
