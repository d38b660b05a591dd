mod common;

use assembly_application::config::AssemblyConfig;
use assembly_domain::dashboard::TimePeriod;
use assembly_domain::stage::{AssemblyStage, STAGE_SEQUENCE};
use assembly_domain::unit::CompletionPolicy;
use assembly_domain::entity::Entity;
use assembly_domain::value_object::UnitId;
use chrono::{Duration, TimeZone, Utc};
use common::*;

async fn run(h: &Harness, unit: UnitId, stages: usize) {
    for stage in STAGE_SEQUENCE.iter().take(stages) {
        h.api
            .mark_stage_complete(&operator(), unit, *stage)
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn summaries_respect_time_windows() -> anyhow::Result<()> {
    let h = harness();
    let p = product(&h).await;
    let view = h
        .api
        .create_batch(
            &supervisor(),
            "W10",
            *p.id(),
            4,
            Some(serials(&["80001", "80002", "80003", "80004"])),
        )
        .await?;
    let ids: Vec<UnitId> = view.serialized_items.iter().map(|u| u.id).collect();

    // 上周五完成一件并驳回一次
    h.clock.set(Utc.with_ymd_and_hms(2025, 2, 28, 14, 0, 0).unwrap());
    run(&h, ids[0], 11).await;
    h.api
        .reject_stage(&operator(), ids[1], AssemblyStage::LapAndClean, "pitting")
        .await?;

    // 本周一完成一件
    h.clock.set(Utc.with_ymd_and_hms(2025, 3, 3, 10, 0, 0).unwrap());
    run(&h, ids[1], 11).await;

    // 今天：一件停在第三道工序，一次驳回
    h.clock.set(wednesday_morning());
    run(&h, ids[2], 2).await;
    h.api
        .reject_stage(&operator(), ids[2], AssemblyStage::InstallExtractor, "spring")
        .await?;

    let ctx = operator();
    let today = h.api.get_production_summary(&ctx, TimePeriod::Today).await?;
    assert_eq!(today.units_completed, 0);
    assert_eq!(today.units_in_progress, 1);

    let week = h
        .api
        .get_production_summary(&ctx, TimePeriod::ThisWeek)
        .await?;
    assert_eq!(week.units_completed, 1);

    let all = h.api.get_production_summary(&ctx, TimePeriod::AllTime).await?;
    assert_eq!(all.units_completed, 2);
    assert_eq!(all.units_in_progress, 1);

    let rejections = h.api.get_rejection_summary(&ctx, TimePeriod::Today).await?;
    assert_eq!(rejections.total_rejections, 1);
    assert_eq!(rejections.rejections_by_stage.len(), 11);
    let all_rejections = h
        .api
        .get_rejection_summary(&ctx, TimePeriod::AllTime)
        .await?;
    assert_eq!(all_rejections.total_rejections, 2);

    let wip = h.api.get_wip_by_stage(&ctx).await?;
    assert_eq!(wip.wip_by_stage.len(), 11);
    assert_eq!(wip.count_at(AssemblyStage::InstallExtractor), 1);
    assert_eq!(wip.wip_by_stage.iter().map(|c| c.count).sum::<usize>(), 1);
    Ok(())
}

#[tokio::test]
async fn sunday_still_counts_the_week_since_monday() -> anyhow::Result<()> {
    let h = harness();
    let p = product(&h).await;
    let view = h
        .api
        .create_batch(&supervisor(), "W10", *p.id(), 1, Some(serials(&["81001"])))
        .await?;

    h.clock.set(Utc.with_ymd_and_hms(2025, 3, 3, 8, 0, 0).unwrap());
    run(&h, view.serialized_items[0].id, 11).await;

    // 同一周的周日深夜
    h.clock.set(Utc.with_ymd_and_hms(2025, 3, 9, 23, 30, 0).unwrap());
    let week = h
        .api
        .get_production_summary(&operator(), TimePeriod::ThisWeek)
        .await?;
    assert_eq!(week.units_completed, 1);

    // 下周一零点之后不再计入
    h.clock.advance(Duration::hours(1));
    let week = h
        .api
        .get_production_summary(&operator(), TimePeriod::ThisWeek)
        .await?;
    assert_eq!(week.units_completed, 0);
    Ok(())
}

#[tokio::test]
async fn local_offset_moves_the_day_boundary() -> anyhow::Result<()> {
    // UTC+8：UTC 周三 09:00 是本地 17:00，UTC 周二 17:00 是本地周三 01:00
    let h = harness_with(AssemblyConfig {
        utc_offset_minutes: 8 * 60,
        ..AssemblyConfig::default()
    });
    let p = product(&h).await;
    let view = h
        .api
        .create_batch(&supervisor(), "B", *p.id(), 1, Some(serials(&["82001"])))
        .await?;

    h.clock.set(Utc.with_ymd_and_hms(2025, 3, 4, 17, 0, 0).unwrap());
    run(&h, view.serialized_items[0].id, 11).await;

    h.clock.set(wednesday_morning());
    let today = h
        .api
        .get_production_summary(&operator(), TimePeriod::Today)
        .await?;
    assert_eq!(today.units_completed, 1);
    Ok(())
}

#[tokio::test]
async fn permissive_policy_accepts_repeats_and_jumps() -> anyhow::Result<()> {
    let h = harness_with(AssemblyConfig {
        completion_policy: CompletionPolicy::Permissive,
        ..AssemblyConfig::default()
    });
    let p = product(&h).await;
    let view = h
        .api
        .create_batch(&supervisor(), "B", *p.id(), 1, Some(serials(&["83001"])))
        .await?;
    let id = view.serialized_items[0].id;

    h.api
        .mark_stage_complete(&operator(), id, AssemblyStage::LapAndClean)
        .await?;
    let unit = h
        .api
        .mark_stage_complete(&operator(), id, AssemblyStage::PinEjector)
        .await?;
    assert_eq!(unit.current_stage(), Some(AssemblyStage::InstallExtractor));
    let unit = h
        .api
        .mark_stage_complete(&operator(), id, AssemblyStage::PinEjector)
        .await?;
    assert_eq!(unit.current_stage(), Some(AssemblyStage::InstallExtractor));
    assert_eq!(unit.version(), 3);

    let unit = h
        .api
        .mark_stage_complete(&operator(), id, AssemblyStage::FunctionTest)
        .await?;
    assert_eq!(unit.current_stage(), Some(AssemblyStage::FinalQc));
    assert_eq!(h.api.get_assembly_details_by_unit_id(&operator(), id).await?.stage_logs.len(), 4);
    Ok(())
}
