//! 看板汇总（Dashboard Aggregator）
//!
//! 时间窗口解析是 `(时间段, 当前时刻)` 上的纯函数；产出、驳回与在制品
//! 三类汇总都是对单件与台账的只读计算，按工序的统计始终列出全部 11 道工序。
//!
use crate::error::DomainError;
use crate::ledger::StageLogEntry;
use crate::stage::{AssemblyStage, STAGE_SEQUENCE};
use crate::unit::{ItemStatus, SerializedItem};
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// 看板时间段
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimePeriod {
    Today,
    ThisWeek,
    #[default]
    AllTime,
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Today => "today",
            Self::ThisWeek => "this_week",
            Self::AllTime => "all_time",
        })
    }
}

impl FromStr for TimePeriod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "today" => Ok(Self::Today),
            "this_week" => Ok(Self::ThisWeek),
            "all_time" => Ok(Self::AllTime),
            other => Err(DomainError::validation(format!(
                "unknown time period: {other}"
            ))),
        }
    }
}

/// 半开时间区间 `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        self.start <= *at && *at < self.end
    }
}

fn within(window: Option<&TimeWindow>, at: &DateTime<Utc>) -> bool {
    window.is_none_or(|w| w.contains(at))
}

/// 将时间段解析为具体窗口，`AllTime` 返回 `None`（不过滤）
///
/// - `Today`：本地零点到次日零点；
/// - `ThisWeek`：本周一零点到下周一零点（周日所在的周从六天前的周一开始）。
///
/// 记录不会晚于当前时刻，因此开区间上界等价于"截至此刻"。
pub fn resolve_window(period: TimePeriod, now: DateTime<FixedOffset>) -> Option<TimeWindow> {
    let offset = *now.offset();
    let today = now.date_naive();

    let (first_day, days) = match period {
        TimePeriod::AllTime => return None,
        TimePeriod::Today => (today, 1),
        TimePeriod::ThisWeek => {
            let back = i64::from(now.weekday().num_days_from_monday());
            (today - Duration::days(back), 7)
        }
    };

    Some(TimeWindow {
        start: local_midnight(offset, first_day),
        end: local_midnight(offset, first_day + Duration::days(days)),
    })
}

fn local_midnight(offset: FixedOffset, day: NaiveDate) -> DateTime<Utc> {
    let local = day.and_time(NaiveTime::MIN);
    let utc = local - Duration::seconds(i64::from(offset.local_minus_utc()));
    Utc.from_utc_datetime(&utc)
}

/// 某道工序上的计数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageCount {
    pub stage: AssemblyStage,
    pub count: usize,
}

fn zero_filled(counts: &HashMap<AssemblyStage, usize>) -> Vec<StageCount> {
    STAGE_SEQUENCE
        .iter()
        .map(|stage| StageCount {
            stage: *stage,
            count: counts.get(stage).copied().unwrap_or(0),
        })
        .collect()
}

/// 产出汇总
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionSummary {
    /// 窗口内完成的单件数（按最近状态变更时间）
    pub units_completed: usize,
    /// 当前在制的单件数，与窗口无关
    pub units_in_progress: usize,
}

impl ProductionSummary {
    pub fn compute<'a>(
        units: impl IntoIterator<Item = &'a SerializedItem>,
        window: Option<&TimeWindow>,
    ) -> Self {
        units
            .into_iter()
            .fold(Self::default(), |mut acc, unit| match unit.status() {
                ItemStatus::Complete if within(window, unit.updated_at()) => {
                    acc.units_completed += 1;
                    acc
                }
                ItemStatus::InProgress => {
                    acc.units_in_progress += 1;
                    acc
                }
                _ => acc,
            })
    }
}

/// 驳回汇总
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectionSummary {
    pub total_rejections: usize,
    pub rejections_by_stage: Vec<StageCount>,
}

impl RejectionSummary {
    pub fn compute<'a>(
        entries: impl IntoIterator<Item = &'a StageLogEntry>,
        window: Option<&TimeWindow>,
    ) -> Self {
        let mut counts: HashMap<AssemblyStage, usize> = HashMap::new();
        let mut total = 0;
        for entry in entries
            .into_iter()
            .filter(|e| e.is_rejection() && within(window, e.timestamp()))
        {
            *counts.entry(entry.stage()).or_default() += 1;
            total += 1;
        }

        Self {
            total_rejections: total,
            rejections_by_stage: zero_filled(&counts),
        }
    }
}

/// 各工序在制品数量（当前快照，忽略时间窗口）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WipByStage {
    pub wip_by_stage: Vec<StageCount>,
}

impl WipByStage {
    pub fn compute<'a>(units: impl IntoIterator<Item = &'a SerializedItem>) -> Self {
        let mut counts: HashMap<AssemblyStage, usize> = HashMap::new();
        for unit in units
            .into_iter()
            .filter(|u| u.status() == ItemStatus::InProgress)
        {
            if let Some(stage) = unit.current_stage() {
                *counts.entry(stage).or_default() += 1;
            }
        }

        Self {
            wip_by_stage: zero_filled(&counts),
        }
    }

    pub fn count_at(&self, stage: AssemblyStage) -> usize {
        self.wip_by_stage
            .iter()
            .find(|c| c.stage == stage)
            .map(|c| c.count)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Aggregate;
    use crate::domain_event::{EventContext, EventEnvelope};
    use crate::entity::Entity;
    use crate::unit::{CompletionPolicy, UnitCommand};
    use crate::value_object::{BatchId, RejectionNotes, SerialNumber, UnitId};

    fn local(offset_hours: i32, y: i32, m: u32, d: u32, h: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(offset_hours * 3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, 15, 0)
            .unwrap()
    }

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn unit(serial: &str) -> SerializedItem {
        SerializedItem::register(
            UnitId::generate(),
            BatchId::generate(),
            SerialNumber::parse(serial).unwrap(),
            utc(2025, 1, 1, 0),
        )
    }

    fn advance(unit: &mut SerializedItem, stages: usize, at: DateTime<Utc>) {
        for stage in STAGE_SEQUENCE.iter().take(stages) {
            let events = unit
                .execute(UnitCommand::CompleteStage {
                    stage: *stage,
                    policy: CompletionPolicy::Strict,
                    at,
                })
                .unwrap();
            for e in &events {
                unit.apply(e);
            }
        }
    }

    fn rejection(unit: &SerializedItem, stage: AssemblyStage, at: DateTime<Utc>) -> StageLogEntry {
        let event = unit
            .execute(UnitCommand::RejectStage {
                stage,
                notes: RejectionNotes::parse("out of spec").unwrap(),
                at,
            })
            .unwrap()
            .remove(0);
        let ctx = EventContext::builder().actor_id("qa-1".to_string()).build();
        let env = EventEnvelope::<SerializedItem>::new(unit.id(), event, ctx, at);
        StageLogEntry::try_from(&env).unwrap()
    }

    #[test]
    fn period_parses_and_defaults_to_all_time() {
        assert_eq!("this_week".parse::<TimePeriod>().unwrap(), TimePeriod::ThisWeek);
        assert_eq!(TimePeriod::default(), TimePeriod::AllTime);
        assert!("yesterday".parse::<TimePeriod>().is_err());
        assert_eq!(
            serde_json::from_str::<TimePeriod>("\"today\"").unwrap(),
            TimePeriod::Today
        );
    }

    #[test]
    fn all_time_is_unbounded() {
        assert_eq!(resolve_window(TimePeriod::AllTime, local(0, 2025, 3, 5, 10)), None);
    }

    #[test]
    fn today_starts_at_local_midnight() {
        // 2025-03-05 10:15 +08:00
        let w = resolve_window(TimePeriod::Today, local(8, 2025, 3, 5, 10)).unwrap();
        assert_eq!(w.start, utc(2025, 3, 4, 16));
        assert_eq!(w.end, utc(2025, 3, 5, 16));
        assert!(w.contains(&utc(2025, 3, 5, 2)));
        assert!(!w.contains(&utc(2025, 3, 4, 15)));
    }

    #[test]
    fn week_starts_on_monday() {
        // 2025-03-05 是周三
        let w = resolve_window(TimePeriod::ThisWeek, local(0, 2025, 3, 5, 10)).unwrap();
        assert_eq!(w.start, utc(2025, 3, 3, 0));
        assert_eq!(w.end, utc(2025, 3, 10, 0));
    }

    #[test]
    fn sunday_belongs_to_the_week_that_began_six_days_earlier() {
        // 2025-03-09 是周日
        let w = resolve_window(TimePeriod::ThisWeek, local(0, 2025, 3, 9, 23)).unwrap();
        assert_eq!(w.start, utc(2025, 3, 3, 0));
        assert_eq!(w.end, utc(2025, 3, 10, 0));
        assert!(w.contains(&Utc.with_ymd_and_hms(2025, 3, 9, 23, 59, 59).unwrap()));
    }

    #[test]
    fn monday_starts_a_new_week() {
        let w = resolve_window(TimePeriod::ThisWeek, local(0, 2025, 3, 10, 0)).unwrap();
        assert_eq!(w.start, utc(2025, 3, 10, 0));
    }

    #[test]
    fn week_window_crosses_month_boundary() {
        // 2025-03-01 是周六
        let w = resolve_window(TimePeriod::ThisWeek, local(-5, 2025, 3, 1, 12)).unwrap();
        assert_eq!(w.start, utc(2025, 2, 24, 5));
        assert_eq!(w.end, utc(2025, 3, 3, 5));
    }

    #[test]
    fn production_summary_filters_completed_by_window_only() {
        let mut done_today = unit("10001");
        advance(&mut done_today, 11, utc(2025, 3, 5, 9));
        let mut done_last_week = unit("10002");
        advance(&mut done_last_week, 11, utc(2025, 2, 25, 9));
        let mut busy = unit("10003");
        advance(&mut busy, 3, utc(2025, 2, 20, 9));
        let idle = unit("10004");

        let units = [done_today, done_last_week, busy, idle];
        let today = resolve_window(TimePeriod::Today, local(0, 2025, 3, 5, 10)).unwrap();

        let s = ProductionSummary::compute(&units, Some(&today));
        assert_eq!(s.units_completed, 1);
        assert_eq!(s.units_in_progress, 1);

        let s = ProductionSummary::compute(&units, None);
        assert_eq!(s.units_completed, 2);
        assert_eq!(s.units_in_progress, 1);
    }

    #[test]
    fn rejection_summary_is_zero_filled_and_windowed() {
        let u = unit("10001");
        let entries = vec![
            rejection(&u, AssemblyStage::FitBarrel, utc(2025, 3, 5, 8)),
            rejection(&u, AssemblyStage::FitBarrel, utc(2025, 3, 5, 9)),
            rejection(&u, AssemblyStage::FinalQc, utc(2025, 3, 1, 9)),
        ];

        let s = RejectionSummary::compute(&entries, None);
        assert_eq!(s.total_rejections, 3);
        assert_eq!(s.rejections_by_stage.len(), 11);
        let count = |s: &RejectionSummary, stage| {
            s.rejections_by_stage
                .iter()
                .find(|c| c.stage == stage)
                .unwrap()
                .count
        };
        assert_eq!(count(&s, AssemblyStage::FitBarrel), 2);
        assert_eq!(count(&s, AssemblyStage::FinalQc), 1);
        assert_eq!(count(&s, AssemblyStage::LapAndClean), 0);

        let today = resolve_window(TimePeriod::Today, local(0, 2025, 3, 5, 10)).unwrap();
        let s = RejectionSummary::compute(&entries, Some(&today));
        assert_eq!(s.total_rejections, 2);
        assert_eq!(count(&s, AssemblyStage::FinalQc), 0);
        assert_eq!(s.rejections_by_stage.len(), 11);
    }

    #[test]
    fn empty_inputs_still_enumerate_every_stage() {
        let r = RejectionSummary::compute(Vec::<&StageLogEntry>::new(), None);
        assert_eq!(r.rejections_by_stage.len(), 11);
        assert!(r.rejections_by_stage.iter().all(|c| c.count == 0));

        let w = WipByStage::compute(Vec::<&SerializedItem>::new());
        assert_eq!(w.wip_by_stage.len(), 11);
        assert!(w.wip_by_stage.iter().all(|c| c.count == 0));
    }

    #[test]
    fn wip_counts_in_progress_units_by_current_stage() {
        let mut a = unit("10001");
        advance(&mut a, 2, utc(2025, 3, 5, 9));
        let mut b = unit("10002");
        advance(&mut b, 2, utc(2024, 1, 1, 9));
        let mut c = unit("10003");
        advance(&mut c, 5, utc(2025, 3, 5, 9));
        let mut done = unit("10004");
        advance(&mut done, 11, utc(2025, 3, 5, 9));
        let idle = unit("10005");

        let w = WipByStage::compute(&[a, b, c, done, idle]);
        assert_eq!(w.wip_by_stage.len(), 11);
        assert_eq!(w.count_at(AssemblyStage::InstallExtractor), 2);
        assert_eq!(w.count_at(AssemblyStage::BuildSlide), 1);
        assert_eq!(w.count_at(AssemblyStage::PackageAndSerialize), 0);
        let total: usize = w.wip_by_stage.iter().map(|c| c.count).sum();
        assert_eq!(total, 3);
    }
}
