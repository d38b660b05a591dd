//! 内存事务存储（InMemoryStore）
//!
//! 所有表放在同一把 `tokio::sync::RwLock` 之后：每个写操作只获取一次写锁，
//! 先完成全部校验再写入，因此读者永远不会看到缺少对应单件更新的台账条目。
//!
use assembly_domain::batch::Batch;
use assembly_domain::domain_event::{EventContext, EventEnvelope};
use assembly_domain::entity::Entity;
use assembly_domain::error::{DomainError, DomainResult};
use assembly_domain::ledger::{self, StageLogEntry};
use assembly_domain::persist::{
    AggregateRepository, BatchRepository, LedgerRepository, ProductRepository, UnitRepository,
};
use assembly_domain::product::Product;
use assembly_domain::unit::{SerializedItem, UnitEvent};
use assembly_domain::value_object::{BatchId, ProductId, SerialNumber, UnitId};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    products: HashMap<ProductId, Product>,
    batches: HashMap<BatchId, Batch>,
    units: HashMap<UnitId, SerializedItem>,
    /// 序列号唯一索引
    serials: HashMap<SerialNumber, UnitId>,
    /// 追加顺序即写入顺序
    ledger: Vec<StageLogEntry>,
}

impl Tables {
    fn check_new_units(&self, batch_id: &BatchId, units: &[SerializedItem]) -> DomainResult<()> {
        if let Some(stray) = units.iter().find(|u| u.batch_id() != batch_id) {
            return Err(DomainError::validation(format!(
                "unit {} does not belong to batch {batch_id}",
                stray.serial_number()
            )));
        }

        let mut taken: Vec<&str> = units
            .iter()
            .map(|u| u.serial_number())
            .filter(|sn| self.serials.contains_key(*sn))
            .map(SerialNumber::as_str)
            .collect();
        if !taken.is_empty() {
            taken.sort_unstable();
            return Err(DomainError::conflict(format!(
                "serial numbers already exist: {}",
                taken.join(", ")
            )));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = units.iter().find(|u| !seen.insert(u.serial_number())) {
            return Err(DomainError::validation(format!(
                "duplicate serial number in input: {}",
                dup.serial_number()
            )));
        }
        Ok(())
    }

    fn insert_units(&mut self, units: Vec<SerializedItem>) {
        for unit in units {
            self.serials.insert(unit.serial_number().clone(), *unit.id());
            self.units.insert(*unit.id(), unit);
        }
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AggregateRepository<SerializedItem> for InMemoryStore {
    async fn load(&self, aggregate_id: &UnitId) -> DomainResult<Option<SerializedItem>> {
        Ok(self.tables.read().await.units.get(aggregate_id).cloned())
    }

    /// 台账追加与单件更新在同一把写锁内完成
    async fn save(
        &self,
        aggregate: &SerializedItem,
        events: Vec<UnitEvent>,
        context: EventContext,
    ) -> DomainResult<Vec<EventEnvelope<SerializedItem>>> {
        let envelopes: Vec<EventEnvelope<SerializedItem>> = events
            .into_iter()
            .map(|e| {
                let at = e.occurred_at();
                EventEnvelope::new(aggregate.id(), e, context.clone(), at)
            })
            .collect();
        if envelopes.is_empty() {
            return Ok(envelopes);
        }
        let entries = ledger::to_entries(&envelopes)?;

        let mut tables = self.tables.write().await;
        let stored = tables
            .units
            .get(aggregate.id())
            .ok_or_else(|| DomainError::not_found(format!("unit {} not found", aggregate.id())))?;

        let expected = aggregate
            .version()
            .checked_sub(envelopes.len())
            .ok_or_else(|| DomainError::InvalidState {
                reason: format!(
                    "unit {} at version {} cannot carry {} new events",
                    aggregate.id(),
                    aggregate.version(),
                    envelopes.len()
                ),
            })?;
        if stored.version() != expected {
            return Err(DomainError::VersionConflict {
                expected,
                actual: stored.version(),
            });
        }

        tables.ledger.extend(entries);
        tables.units.insert(*aggregate.id(), aggregate.clone());
        Ok(envelopes)
    }
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn insert_product(&self, product: Product) -> DomainResult<()> {
        let mut tables = self.tables.write().await;
        if tables.products.contains_key(product.id()) {
            return Err(DomainError::conflict(format!(
                "product {} already exists",
                product.id()
            )));
        }
        tables.products.insert(*product.id(), product);
        Ok(())
    }

    async fn update_product(&self, product: Product) -> DomainResult<()> {
        let mut tables = self.tables.write().await;
        match tables.products.get_mut(product.id()) {
            Some(slot) => {
                *slot = product;
                Ok(())
            }
            None => Err(DomainError::not_found(format!(
                "product {} not found",
                product.id()
            ))),
        }
    }

    async fn find_product(&self, id: &ProductId) -> DomainResult<Option<Product>> {
        Ok(self.tables.read().await.products.get(id).cloned())
    }

    async fn list_products(&self) -> DomainResult<Vec<Product>> {
        Ok(self.tables.read().await.products.values().cloned().collect())
    }
}

#[async_trait]
impl BatchRepository for InMemoryStore {
    async fn create_batch(&self, batch: Batch, units: Vec<SerializedItem>) -> DomainResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.products.contains_key(batch.product_id()) {
            return Err(DomainError::not_found(format!(
                "product {} not found",
                batch.product_id()
            )));
        }
        if tables.batches.contains_key(batch.id()) {
            return Err(DomainError::conflict(format!(
                "batch {} already exists",
                batch.id()
            )));
        }
        tables.check_new_units(batch.id(), &units)?;

        tables.batches.insert(*batch.id(), batch);
        tables.insert_units(units);
        Ok(())
    }

    async fn add_units(&self, batch_id: &BatchId, units: Vec<SerializedItem>) -> DomainResult<()> {
        let mut tables = self.tables.write().await;
        let quantity = tables
            .batches
            .get(batch_id)
            .map(Batch::quantity)
            .ok_or_else(|| DomainError::not_found(format!("batch {batch_id} not found")))?;

        let existing = tables
            .units
            .values()
            .filter(|u| u.batch_id() == batch_id)
            .count();
        if existing + units.len() > quantity as usize {
            return Err(DomainError::validation(format!(
                "batch holds {existing} of {quantity} units, cannot add {} more",
                units.len()
            )));
        }
        tables.check_new_units(batch_id, &units)?;

        tables.insert_units(units);
        Ok(())
    }

    async fn find_batch(&self, id: &BatchId) -> DomainResult<Option<Batch>> {
        Ok(self.tables.read().await.batches.get(id).cloned())
    }

    async fn list_batches(&self) -> DomainResult<Vec<Batch>> {
        Ok(self.tables.read().await.batches.values().cloned().collect())
    }
}

#[async_trait]
impl UnitRepository for InMemoryStore {
    async fn find_unit(&self, id: &UnitId) -> DomainResult<Option<SerializedItem>> {
        Ok(self.tables.read().await.units.get(id).cloned())
    }

    async fn find_unit_by_serial(
        &self,
        serial: &SerialNumber,
    ) -> DomainResult<Option<SerializedItem>> {
        let tables = self.tables.read().await;
        Ok(tables
            .serials
            .get(serial)
            .and_then(|id| tables.units.get(id))
            .cloned())
    }

    async fn units_in_batch(&self, batch_id: &BatchId) -> DomainResult<Vec<SerializedItem>> {
        Ok(self
            .tables
            .read()
            .await
            .units
            .values()
            .filter(|u| u.batch_id() == batch_id)
            .cloned()
            .collect())
    }

    async fn all_units(&self) -> DomainResult<Vec<SerializedItem>> {
        Ok(self.tables.read().await.units.values().cloned().collect())
    }
}

#[async_trait]
impl LedgerRepository for InMemoryStore {
    async fn entries_for(&self, unit_id: &UnitId) -> DomainResult<Vec<StageLogEntry>> {
        Ok(self
            .tables
            .read()
            .await
            .ledger
            .iter()
            .filter(|e| e.unit_id() == unit_id)
            .cloned()
            .collect())
    }

    async fn all_entries(&self) -> DomainResult<Vec<StageLogEntry>> {
        Ok(self.tables.read().await.ledger.clone())
    }
}
