use crate::context::AppContext;
use crate::error::AppError;
use crate::query::Query;
use crate::query_handler::QueryHandler;
use assembly_domain::batch::BatchView;
use assembly_domain::error::DomainError;
use assembly_domain::persist::{BatchRepository, UnitRepository};
use assembly_domain::value_object::BatchId;
use async_trait::async_trait;
use std::cmp::Reverse;
use std::sync::Arc;

/// 全部批次及其派生进度，最新创建的在前
#[derive(Debug, Clone, Copy)]
pub struct GetAllBatches;

impl Query for GetAllBatches {
    const NAME: &'static str = "batch.getAllBatches";
    type Dto = Vec<BatchView>;
}

#[derive(Debug, Clone, Copy)]
pub struct GetBatchById {
    pub batch_id: BatchId,
}

impl Query for GetBatchById {
    const NAME: &'static str = "batch.getBatchById";
    type Dto = BatchView;
}

pub struct GetBatchHandler {
    batches: Arc<dyn BatchRepository>,
    units: Arc<dyn UnitRepository>,
}

impl GetBatchHandler {
    pub fn new(batches: Arc<dyn BatchRepository>, units: Arc<dyn UnitRepository>) -> Self {
        Self { batches, units }
    }
}

#[async_trait]
impl QueryHandler<GetAllBatches> for GetBatchHandler {
    async fn handle(&self, _ctx: &AppContext, _q: GetAllBatches) -> Result<Vec<BatchView>, AppError> {
        let mut batches = self.batches.list_batches().await?;
        batches.sort_by_key(|b| Reverse(*b.created_at()));
        let units = self.units.all_units().await?;

        Ok(batches
            .into_iter()
            .map(|batch| BatchView::compute(batch, &units))
            .collect())
    }
}

#[async_trait]
impl QueryHandler<GetBatchById> for GetBatchHandler {
    async fn handle(&self, _ctx: &AppContext, q: GetBatchById) -> Result<BatchView, AppError> {
        let batch = self
            .batches
            .find_batch(&q.batch_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("batch {} not found", q.batch_id)))?;
        let units = self.units.units_in_batch(&q.batch_id).await?;

        Ok(BatchView::compute(batch, &units))
    }
}
