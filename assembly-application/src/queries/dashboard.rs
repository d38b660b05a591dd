use crate::clock::Clock;
use crate::context::AppContext;
use crate::error::AppError;
use crate::query::Query;
use crate::query_handler::QueryHandler;
use assembly_domain::dashboard::{
    self, ProductionSummary, RejectionSummary, TimePeriod, TimeWindow, WipByStage,
};
use assembly_domain::persist::{LedgerRepository, UnitRepository};
use async_trait::async_trait;
use chrono::FixedOffset;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default)]
pub struct GetProductionSummary {
    pub period: TimePeriod,
}

impl Query for GetProductionSummary {
    const NAME: &'static str = "dashboard.getProductionSummary";
    type Dto = ProductionSummary;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GetRejectionSummary {
    pub period: TimePeriod,
}

impl Query for GetRejectionSummary {
    const NAME: &'static str = "dashboard.getRejectionSummary";
    type Dto = RejectionSummary;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GetWipByStage;

impl Query for GetWipByStage {
    const NAME: &'static str = "dashboard.getWipByStage";
    type Dto = WipByStage;
}

pub struct DashboardHandler {
    units: Arc<dyn UnitRepository>,
    ledger: Arc<dyn LedgerRepository>,
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
}

impl DashboardHandler {
    pub fn new(
        units: Arc<dyn UnitRepository>,
        ledger: Arc<dyn LedgerRepository>,
        clock: Arc<dyn Clock>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            units,
            ledger,
            clock,
            offset,
        }
    }

    fn window(&self, period: TimePeriod) -> Option<TimeWindow> {
        let now = self.clock.now().with_timezone(&self.offset);
        let window = dashboard::resolve_window(period, now);
        tracing::debug!(%period, ?window, "time window resolved");
        window
    }
}

#[async_trait]
impl QueryHandler<GetProductionSummary> for DashboardHandler {
    async fn handle(
        &self,
        _ctx: &AppContext,
        q: GetProductionSummary,
    ) -> Result<ProductionSummary, AppError> {
        let window = self.window(q.period);
        let units = self.units.all_units().await?;
        Ok(ProductionSummary::compute(&units, window.as_ref()))
    }
}

#[async_trait]
impl QueryHandler<GetRejectionSummary> for DashboardHandler {
    async fn handle(
        &self,
        _ctx: &AppContext,
        q: GetRejectionSummary,
    ) -> Result<RejectionSummary, AppError> {
        let window = self.window(q.period);
        let entries = self.ledger.all_entries().await?;
        Ok(RejectionSummary::compute(&entries, window.as_ref()))
    }
}

#[async_trait]
impl QueryHandler<GetWipByStage> for DashboardHandler {
    async fn handle(&self, _ctx: &AppContext, _q: GetWipByStage) -> Result<WipByStage, AppError> {
        let units = self.units.all_units().await?;
        Ok(WipByStage::compute(&units))
    }
}
