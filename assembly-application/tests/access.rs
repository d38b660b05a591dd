mod common;

use assembly_application::config::AssemblyConfig;
use assembly_application::context::AppContext;
use assembly_application::error::ErrorKind;
use assembly_domain::access::AccessPolicyKind;
use assembly_domain::dashboard::TimePeriod;
use assembly_domain::product::NewProduct;
use assembly_domain::stage::AssemblyStage;
use common::*;

#[tokio::test]
async fn every_procedure_requires_an_actor() {
    let h = harness();
    let anon = AppContext::default();

    let kinds = [
        h.api.get_all_batches(&anon).await.unwrap_err().kind(),
        h.api
            .get_production_summary(&anon, TimePeriod::Today)
            .await
            .unwrap_err()
            .kind(),
        h.api.get_wip_by_stage(&anon).await.unwrap_err().kind(),
        h.api.list_product_options(&anon).await.unwrap_err().kind(),
        h.api
            .get_unit_assembly_progress_by_serial(&anon, "10010")
            .await
            .unwrap_err()
            .kind(),
    ];
    assert!(kinds.iter().all(|k| *k == ErrorKind::Unauthorized));
}

#[tokio::test]
async fn roles_gate_management_procedures() -> anyhow::Result<()> {
    let h = harness();

    let err = h
        .api
        .create_product(
            &supervisor(),
            NewProduct::builder().name("X").model_number("X-1").build(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let p = product(&h).await;
    let err = h
        .api
        .create_batch(&operator(), "B", *p.id(), 1, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let view = h
        .api
        .create_batch(&supervisor(), "B", *p.id(), 1, Some(serials(&["70001"])))
        .await?;
    let unit_id = view.serialized_items[0].id;

    // 操作员可以在工位上完成与驳回
    h.api
        .mark_stage_complete(&operator(), unit_id, AssemblyStage::LapAndClean)
        .await?;
    h.api
        .reject_stage(&operator(), unit_id, AssemblyStage::PinEjector, "burr")
        .await?;
    assert!(h.api.get_all_products(&operator()).await.is_ok());
    Ok(())
}

#[tokio::test]
async fn authenticated_only_lets_any_actor_manage() -> anyhow::Result<()> {
    let h = harness_with(AssemblyConfig {
        access_policy: AccessPolicyKind::AuthenticatedOnly,
        ..AssemblyConfig::default()
    });
    let created = h
        .api
        .create_product(
            &operator(),
            NewProduct::builder().name("Compact 9").model_number("C9").build(),
        )
        .await?;
    h.api
        .create_batch(&operator(), "B", *created.id(), 1, None)
        .await?;

    let err = h
        .api
        .get_all_batches(&AppContext::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    Ok(())
}
