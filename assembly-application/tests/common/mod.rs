#![allow(dead_code)]

use assembly_application::AssemblyApi;
use assembly_application::clock::FixedClock;
use assembly_application::config::AssemblyConfig;
use assembly_application::context::AppContext;
use assembly_application::store::InMemoryStore;
use assembly_domain::access::{Actor, Role};
use assembly_domain::product::{NewProduct, Product};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;

pub struct Harness {
    pub api: AssemblyApi,
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<FixedClock>,
}

/// 2025-03-05（周三）09:00 UTC
pub fn wednesday_morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 5, 9, 0, 0).unwrap()
}

pub fn harness() -> Harness {
    harness_with(AssemblyConfig::default())
}

pub fn harness_with(config: AssemblyConfig) -> Harness {
    let store = Arc::new(InMemoryStore::new());
    let clock = Arc::new(FixedClock::new(wednesday_morning()));
    let api = AssemblyApi::new(&config, store.clone(), clock.clone()).unwrap();
    Harness { api, store, clock }
}

pub fn admin() -> AppContext {
    AppContext::authenticated(Actor::new("admin-1", "Avery", Role::Admin))
        .with_correlation_id("test")
}

pub fn supervisor() -> AppContext {
    AppContext::authenticated(Actor::new("lead-1", "Sam", Role::Supervisor))
}

pub fn operator() -> AppContext {
    AppContext::authenticated(Actor::new("op-1", "Robin", Role::Operator))
}

pub fn serials(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

pub async fn product(h: &Harness) -> Product {
    h.api
        .create_product(
            &admin(),
            NewProduct::builder()
                .name("Compact 9")
                .model_number("C9-2025")
                .build(),
        )
        .await
        .unwrap()
}
