//! 运行配置（AssemblyConfig）
//!
//! 以 TOML 文件提供，缺失的键使用默认值：
//!
//! ```toml
//! utc_offset_minutes = 480        # 看板"今天/本周"所用的本地时区
//! completion_policy = "strict"    # strict | permissive
//! access_policy = "role_based"    # role_based | authenticated_only
//! ```
//!
use crate::error::AppError;
use assembly_domain::access::AccessPolicyKind;
use assembly_domain::unit::CompletionPolicy;
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 指定配置文件路径的环境变量
pub const CONFIG_ENV: &str = "ASSEMBLY_CONFIG";

const MAX_OFFSET_MINUTES: i32 = 18 * 60;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssemblyConfig {
    /// 相对 UTC 的分钟偏移
    pub utc_offset_minutes: i32,
    pub completion_policy: CompletionPolicy,
    pub access_policy: AccessPolicyKind,
}

impl AssemblyConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, AppError> {
        let config: Self = toml::from_str(raw).map_err(|e| AppError::Config(e.to_string()))?;
        config.utc_offset()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml_str(&raw)?;
        tracing::debug!(path = %path.display(), ?config, "config loaded");
        Ok(config)
    }

    pub fn utc_offset(&self) -> Result<FixedOffset, AppError> {
        if self.utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(AppError::Config(format!(
                "utc_offset_minutes out of range: {}",
                self.utc_offset_minutes
            )));
        }
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            AppError::Config(format!(
                "invalid utc offset: {} minutes",
                self.utc_offset_minutes
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = AssemblyConfig::from_toml_str("").unwrap();
        assert_eq!(config, AssemblyConfig::default());
        assert_eq!(config.completion_policy, CompletionPolicy::Strict);
        assert_eq!(config.access_policy, AccessPolicyKind::RoleBased);
    }

    #[test]
    fn parses_every_key() {
        let config = AssemblyConfig::from_toml_str(
            r#"
            utc_offset_minutes = -300
            completion_policy = "permissive"
            access_policy = "authenticated_only"
            "#,
        )
        .unwrap();
        assert_eq!(config.utc_offset().unwrap().local_minus_utc(), -300 * 60);
        assert_eq!(config.completion_policy, CompletionPolicy::Permissive);
        assert_eq!(config.access_policy, AccessPolicyKind::AuthenticatedOnly);
    }

    #[test]
    fn rejects_unknown_keys_and_bad_offsets() {
        assert!(matches!(
            AssemblyConfig::from_toml_str("colour = \"red\""),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            AssemblyConfig::from_toml_str("utc_offset_minutes = 5000"),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            AssemblyConfig::from_toml_str("completion_policy = \"lenient\""),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = AssemblyConfig::load("/nonexistent/assembly.toml").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
