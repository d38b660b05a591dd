//! RPC 门面（AssemblyApi）
//!
//! 每个对外过程对应一个异步方法，经由命令总线或查询总线分发；
//! 权限检查与耗时日志由总线完成。
//!
use crate::clock::{Clock, SystemClock};
use crate::command_bus::CommandBus;
use crate::commands::{
    AssignSerialNumbers, AssignSerialNumbersHandler, CreateBatch, CreateBatchHandler,
    CreateProduct, CreateProductHandler, MarkStageComplete, MarkStageCompleteHandler,
    RejectStage, RejectStageHandler, RenameProduct, RenameProductHandler,
};
use crate::config::AssemblyConfig;
use crate::context::AppContext;
use crate::dto::UnitDetails;
use crate::error::AppError;
use crate::inmemory_command_bus::InMemoryCommandBus;
use crate::inmemory_query_bus::InMemoryQueryBus;
use crate::queries::{
    DashboardHandler, GetAllBatches, GetAllProducts, GetAssemblyDetailsByUnitId, GetBatchById,
    GetBatchHandler, GetProductById, GetProductionSummary, GetRejectionSummary,
    GetUnitProgressBySerial, GetWipByStage, ListProductOptions, ProductQueryHandler,
    UnitQueryHandler,
};
use crate::query_bus::QueryBus;
use crate::store::InMemoryStore;
use assembly_domain::batch::BatchView;
use assembly_domain::dashboard::{ProductionSummary, RejectionSummary, TimePeriod, WipByStage};
use assembly_domain::ledger::StageLogEntry;
use assembly_domain::persist::{
    AggregateRepository, BatchRepository, LedgerRepository, ProductRepository, UnitRepository,
};
use assembly_domain::product::{NewProduct, Product, ProductOption};
use assembly_domain::progress::UnitProgress;
use assembly_domain::stage::AssemblyStage;
use assembly_domain::unit::SerializedItem;
use assembly_domain::value_object::{BatchId, ProductId, UnitId};
use std::sync::Arc;

pub struct AssemblyApi {
    commands: InMemoryCommandBus,
    queries: InMemoryQueryBus,
}

impl AssemblyApi {
    /// 以内存存储与系统时钟装配
    pub fn in_memory(config: &AssemblyConfig) -> Result<Self, AppError> {
        Self::new(config, Arc::new(InMemoryStore::new()), Arc::new(SystemClock))
    }

    /// 以任意实现了全部仓储协议的存储装配，并注册所有处理器
    pub fn new<S>(config: &AssemblyConfig, store: Arc<S>, clock: Arc<dyn Clock>) -> Result<Self, AppError>
    where
        S: AggregateRepository<SerializedItem>
            + ProductRepository
            + BatchRepository
            + UnitRepository
            + LedgerRepository
            + 'static,
    {
        let offset = config.utc_offset()?;
        let policy = config.access_policy.build();

        let aggregates: Arc<dyn AggregateRepository<SerializedItem>> = store.clone();
        let products: Arc<dyn ProductRepository> = store.clone();
        let batches: Arc<dyn BatchRepository> = store.clone();
        let units: Arc<dyn UnitRepository> = store.clone();
        let ledger: Arc<dyn LedgerRepository> = store;

        let commands = InMemoryCommandBus::new(policy.clone());
        commands.register::<MarkStageComplete, _>(Arc::new(MarkStageCompleteHandler::new(
            aggregates.clone(),
            clock.clone(),
            config.completion_policy,
        )))?;
        commands.register::<RejectStage, _>(Arc::new(RejectStageHandler::new(
            aggregates,
            clock.clone(),
        )))?;
        commands.register::<CreateBatch, _>(Arc::new(CreateBatchHandler::new(
            products.clone(),
            batches.clone(),
            clock.clone(),
        )))?;
        commands.register::<AssignSerialNumbers, _>(Arc::new(AssignSerialNumbersHandler::new(
            batches.clone(),
            units.clone(),
            clock.clone(),
        )))?;
        commands.register::<CreateProduct, _>(Arc::new(CreateProductHandler::new(
            products.clone(),
            clock.clone(),
        )))?;
        commands.register::<RenameProduct, _>(Arc::new(RenameProductHandler::new(
            products.clone(),
        )))?;

        let queries = InMemoryQueryBus::new(policy);
        let unit_queries = Arc::new(UnitQueryHandler::new(
            units.clone(),
            batches.clone(),
            ledger.clone(),
        ));
        queries.register::<GetAssemblyDetailsByUnitId, _>(unit_queries.clone())?;
        queries.register::<GetUnitProgressBySerial, _>(unit_queries)?;

        let batch_queries = Arc::new(GetBatchHandler::new(batches, units.clone()));
        queries.register::<GetAllBatches, _>(batch_queries.clone())?;
        queries.register::<GetBatchById, _>(batch_queries)?;

        let dashboard = Arc::new(DashboardHandler::new(units, ledger, clock, offset));
        queries.register::<GetProductionSummary, _>(dashboard.clone())?;
        queries.register::<GetRejectionSummary, _>(dashboard.clone())?;
        queries.register::<GetWipByStage, _>(dashboard)?;

        let product_queries = Arc::new(ProductQueryHandler::new(products));
        queries.register::<GetAllProducts, _>(product_queries.clone())?;
        queries.register::<GetProductById, _>(product_queries.clone())?;
        queries.register::<ListProductOptions, _>(product_queries)?;

        tracing::debug!(
            queries = ?queries.registered_queries(),
            completion_policy = ?config.completion_policy,
            access_policy = ?config.access_policy,
            "assembly api ready"
        );

        Ok(Self { commands, queries })
    }

    // --- assembly ---

    pub async fn get_assembly_details_by_unit_id(
        &self,
        ctx: &AppContext,
        unit_id: UnitId,
    ) -> Result<UnitDetails, AppError> {
        self.queries
            .dispatch(ctx, GetAssemblyDetailsByUnitId { unit_id })
            .await
    }

    pub async fn get_unit_assembly_progress_by_serial(
        &self,
        ctx: &AppContext,
        serial_number: impl Into<String>,
    ) -> Result<UnitProgress, AppError> {
        self.queries
            .dispatch(
                ctx,
                GetUnitProgressBySerial {
                    serial_number: serial_number.into(),
                },
            )
            .await
    }

    pub async fn mark_stage_complete(
        &self,
        ctx: &AppContext,
        unit_id: UnitId,
        stage: AssemblyStage,
    ) -> Result<SerializedItem, AppError> {
        self.commands
            .dispatch(ctx, MarkStageComplete { unit_id, stage })
            .await
    }

    pub async fn reject_stage(
        &self,
        ctx: &AppContext,
        unit_id: UnitId,
        stage: AssemblyStage,
        notes: impl Into<String>,
    ) -> Result<StageLogEntry, AppError> {
        self.commands
            .dispatch(
                ctx,
                RejectStage {
                    unit_id,
                    stage,
                    notes: notes.into(),
                },
            )
            .await
    }

    // --- batch ---

    pub async fn create_batch(
        &self,
        ctx: &AppContext,
        name: impl Into<String>,
        product_id: ProductId,
        quantity: u32,
        serial_numbers: Option<Vec<String>>,
    ) -> Result<BatchView, AppError> {
        self.commands
            .dispatch(
                ctx,
                CreateBatch {
                    name: name.into(),
                    product_id,
                    quantity,
                    serial_numbers,
                },
            )
            .await
    }

    pub async fn assign_serial_numbers(
        &self,
        ctx: &AppContext,
        batch_id: BatchId,
        serial_numbers: Vec<String>,
    ) -> Result<BatchView, AppError> {
        self.commands
            .dispatch(
                ctx,
                AssignSerialNumbers {
                    batch_id,
                    serial_numbers,
                },
            )
            .await
    }

    pub async fn get_all_batches(&self, ctx: &AppContext) -> Result<Vec<BatchView>, AppError> {
        self.queries.dispatch(ctx, GetAllBatches).await
    }

    pub async fn get_batch_by_id(
        &self,
        ctx: &AppContext,
        batch_id: BatchId,
    ) -> Result<BatchView, AppError> {
        self.queries.dispatch(ctx, GetBatchById { batch_id }).await
    }

    // --- dashboard ---

    pub async fn get_production_summary(
        &self,
        ctx: &AppContext,
        period: TimePeriod,
    ) -> Result<ProductionSummary, AppError> {
        self.queries
            .dispatch(ctx, GetProductionSummary { period })
            .await
    }

    pub async fn get_rejection_summary(
        &self,
        ctx: &AppContext,
        period: TimePeriod,
    ) -> Result<RejectionSummary, AppError> {
        self.queries
            .dispatch(ctx, GetRejectionSummary { period })
            .await
    }

    pub async fn get_wip_by_stage(&self, ctx: &AppContext) -> Result<WipByStage, AppError> {
        self.queries.dispatch(ctx, GetWipByStage).await
    }

    // --- product ---

    pub async fn create_product(
        &self,
        ctx: &AppContext,
        input: NewProduct,
    ) -> Result<Product, AppError> {
        self.commands.dispatch(ctx, CreateProduct(input)).await
    }

    pub async fn rename_product(
        &self,
        ctx: &AppContext,
        product_id: ProductId,
        name: impl Into<String>,
    ) -> Result<Product, AppError> {
        self.commands
            .dispatch(
                ctx,
                RenameProduct {
                    product_id,
                    name: name.into(),
                },
            )
            .await
    }

    pub async fn get_all_products(&self, ctx: &AppContext) -> Result<Vec<Product>, AppError> {
        self.queries.dispatch(ctx, GetAllProducts).await
    }

    pub async fn get_product_by_id(
        &self,
        ctx: &AppContext,
        product_id: ProductId,
    ) -> Result<Product, AppError> {
        self.queries
            .dispatch(ctx, GetProductById { product_id })
            .await
    }

    pub async fn list_product_options(
        &self,
        ctx: &AppContext,
    ) -> Result<Vec<ProductOption>, AppError> {
        self.queries.dispatch(ctx, ListProductOptions).await
    }
}
