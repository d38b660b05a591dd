use crate::batch::Batch;
use crate::error::DomainResult;
use crate::ledger::StageLogEntry;
use crate::product::Product;
use crate::unit::SerializedItem;
use crate::value_object::{BatchId, ProductId, SerialNumber, UnitId};
use async_trait::async_trait;

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn insert_product(&self, product: Product) -> DomainResult<()>;

    /// 覆盖已有产品，不存在时返回 `NotFound`
    async fn update_product(&self, product: Product) -> DomainResult<()>;

    async fn find_product(&self, id: &ProductId) -> DomainResult<Option<Product>>;

    async fn list_products(&self) -> DomainResult<Vec<Product>>;
}

#[async_trait]
pub trait BatchRepository: Send + Sync {
    /// 在一个事务内写入批次及其单件
    ///
    /// 产品不存在返回 `NotFound`；任一序列号已被占用返回 `Conflict`，此时不写入任何数据。
    async fn create_batch(&self, batch: Batch, units: Vec<SerializedItem>) -> DomainResult<()>;

    /// 向已有批次追加单件，校验规则同 `create_batch`，另外追加后的单件数不得超过目标数量
    async fn add_units(&self, batch_id: &BatchId, units: Vec<SerializedItem>) -> DomainResult<()>;

    async fn find_batch(&self, id: &BatchId) -> DomainResult<Option<Batch>>;

    async fn list_batches(&self) -> DomainResult<Vec<Batch>>;
}

#[async_trait]
pub trait UnitRepository: Send + Sync {
    async fn find_unit(&self, id: &UnitId) -> DomainResult<Option<SerializedItem>>;

    async fn find_unit_by_serial(&self, serial: &SerialNumber)
    -> DomainResult<Option<SerializedItem>>;

    async fn units_in_batch(&self, batch_id: &BatchId) -> DomainResult<Vec<SerializedItem>>;

    async fn all_units(&self) -> DomainResult<Vec<SerializedItem>>;
}

/// 台账只读视图；写入只经由 `AggregateRepository::save`
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// 该单件的全部条目，按写入顺序（最旧在前）
    async fn entries_for(&self, unit_id: &UnitId) -> DomainResult<Vec<StageLogEntry>>;

    async fn all_entries(&self) -> DomainResult<Vec<StageLogEntry>>;
}
