//! 装配工序序列（Stage Sequence）
//!
//! 所有产品共享同一条固定的 11 道工序。顺序只由 [`STAGE_SEQUENCE`] 数组决定，
//! "下一道工序" 等推导均为该数组上的纯函数，不依赖枚举判别值。
//!
use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 装配工序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssemblyStage {
    LapAndClean,
    PinEjector,
    InstallExtractor,
    FitBarrel,
    TriggerAssembly,
    BuildSlide,
    AssembleLower,
    MateSlideFrame,
    FunctionTest,
    FinalQc,
    PackageAndSerialize,
}

/// 工序数量
pub const STAGE_COUNT: usize = 11;

/// 工序的合法推进顺序
pub const STAGE_SEQUENCE: [AssemblyStage; STAGE_COUNT] = [
    AssemblyStage::LapAndClean,
    AssemblyStage::PinEjector,
    AssemblyStage::InstallExtractor,
    AssemblyStage::FitBarrel,
    AssemblyStage::TriggerAssembly,
    AssemblyStage::BuildSlide,
    AssemblyStage::AssembleLower,
    AssemblyStage::MateSlideFrame,
    AssemblyStage::FunctionTest,
    AssemblyStage::FinalQc,
    AssemblyStage::PackageAndSerialize,
];

/// 工序在序列中的下标
pub fn position(stage: AssemblyStage) -> usize {
    // 序列覆盖全部变体，查找必然命中
    STAGE_SEQUENCE
        .iter()
        .position(|s| *s == stage)
        .unwrap_or(STAGE_COUNT - 1)
}

/// 紧随其后的工序；最后一道工序返回 `None`
pub fn next_stage(stage: AssemblyStage) -> Option<AssemblyStage> {
    STAGE_SEQUENCE.get(position(stage) + 1).copied()
}

pub fn first_stage() -> AssemblyStage {
    STAGE_SEQUENCE[0]
}

pub fn last_stage() -> AssemblyStage {
    STAGE_SEQUENCE[STAGE_COUNT - 1]
}

pub fn is_last(stage: AssemblyStage) -> bool {
    stage == last_stage()
}

impl AssemblyStage {
    /// 序列化名称（`SCREAMING_SNAKE_CASE`）
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LapAndClean => "LAP_AND_CLEAN",
            Self::PinEjector => "PIN_EJECTOR",
            Self::InstallExtractor => "INSTALL_EXTRACTOR",
            Self::FitBarrel => "FIT_BARREL",
            Self::TriggerAssembly => "TRIGGER_ASSEMBLY",
            Self::BuildSlide => "BUILD_SLIDE",
            Self::AssembleLower => "ASSEMBLE_LOWER",
            Self::MateSlideFrame => "MATE_SLIDE_FRAME",
            Self::FunctionTest => "FUNCTION_TEST",
            Self::FinalQc => "FINAL_QC",
            Self::PackageAndSerialize => "PACKAGE_AND_SERIALIZE",
        }
    }
}

impl fmt::Display for AssemblyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssemblyStage {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        STAGE_SEQUENCE
            .iter()
            .copied()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DomainError::validation(format!("unknown assembly stage: {wanted}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_has_eleven_distinct_stages() {
        let mut seen = std::collections::HashSet::new();
        for stage in STAGE_SEQUENCE {
            assert!(seen.insert(stage));
        }
        assert_eq!(seen.len(), 11);
    }

    #[test]
    fn next_stage_walks_the_array() {
        for (i, stage) in STAGE_SEQUENCE.iter().enumerate() {
            assert_eq!(position(*stage), i);
            assert_eq!(next_stage(*stage), STAGE_SEQUENCE.get(i + 1).copied());
        }
        assert_eq!(next_stage(AssemblyStage::FinalQc), Some(AssemblyStage::PackageAndSerialize));
        assert_eq!(next_stage(AssemblyStage::PackageAndSerialize), None);
    }

    #[test]
    fn first_and_last() {
        assert_eq!(first_stage(), AssemblyStage::LapAndClean);
        assert_eq!(last_stage(), AssemblyStage::PackageAndSerialize);
        assert!(is_last(AssemblyStage::PackageAndSerialize));
        assert!(!is_last(AssemblyStage::FinalQc));
    }

    #[test]
    fn display_parse_and_serde_agree() {
        for stage in STAGE_SEQUENCE {
            let shown = stage.to_string();
            assert_eq!(shown.parse::<AssemblyStage>().unwrap(), stage);
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(json, format!("\"{shown}\""));
        }
        assert_eq!(
            "fit_barrel".parse::<AssemblyStage>().unwrap(),
            AssemblyStage::FitBarrel
        );
    }

    #[test]
    fn unknown_stage_is_validation_error() {
        let err = "POLISH".parse::<AssemblyStage>().unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }
}
