// SPDX-License-Identifier: MIT OR Apache-2.0
//! Configuration loading, validation, and merging for OrderFlow.
//!
//! This crate provides [`OrderFlowConfig`] — the top-level runtime settings
//! — together with helpers for loading from TOML files, merging overlays,
//! and producing advisory [`ConfigWarning`]s. Per-tenant behavior (synonym
//! tables, LLM budgets, detection/matching thresholds) lives in
//! [`TenantSettings`], one entry per tenant slug.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::collections::BTreeMap;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Errors that can occur during configuration loading or validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The requested configuration file was not found.
    #[error("config file not found: {path}")]
    FileNotFound {
        /// Path that was requested.
        path: String,
    },

    /// The file could not be parsed as valid TOML.
    #[error("failed to parse config: {reason}")]
    ParseError {
        /// Human-readable parse error detail.
        reason: String,
    },

    /// Semantic validation failed (one or more problems).
    #[error("config validation failed: {reasons:?}")]
    ValidationError {
        /// Individual validation failure messages.
        reasons: Vec<String>,
    },
}

/// Advisory-level issues that do not prevent operation but deserve
/// attention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A tenant has no daily AI cost budget configured; LLM calls for that
    /// tenant will never hit the budget gate (§4.4).
    NoBudgetConfigured {
        /// Tenant slug.
        tenant: String,
    },
    /// A tenant's auto-apply gap is unusually tight, which will produce
    /// many suggested-not-applied matches.
    TightAutoApplyGap {
        /// Tenant slug.
        tenant: String,
        /// Configured gap.
        gap: f64,
    },
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoBudgetConfigured { tenant } => {
                write!(f, "tenant '{tenant}' has no daily_ai_cost_budget_micros configured")
            }
            Self::TightAutoApplyGap { tenant, gap } => {
                write!(f, "tenant '{tenant}' auto_apply_match_gap is unusually tight ({gap})")
            }
        }
    }
}

/// Top-level runtime configuration for OrderFlow.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct OrderFlowConfig {
    /// Log level override (e.g. `"debug"`, `"info"`, `"warn"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Directory the ERP dropzone writer writes export files into.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dropzone_dir: Option<String>,

    /// Default maximum PDF page count above which the LLM budget gate
    /// aborts extraction (§4.4), unless a tenant overrides it.
    #[serde(default = "default_max_page_count")]
    pub default_max_page_count: u32,

    /// Per-tenant settings, keyed by tenant slug.
    #[serde(default)]
    pub tenants: BTreeMap<String, TenantSettings>,
}

fn default_max_page_count() -> u32 {
    20
}

impl Default for OrderFlowConfig {
    fn default() -> Self {
        Self {
            log_level: Some("info".into()),
            dropzone_dir: None,
            default_max_page_count: default_max_page_count(),
            tenants: BTreeMap::new(),
        }
    }
}

/// Per-tenant settings (§3 `[SUPPLEMENT] TenantSettings`): synonym tables,
/// thresholds, and the daily AI cost budget.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct TenantSettings {
    /// UoM synonym overrides, consulted before the closed-domain defaults
    /// (§4.5). Keys are lowercase, trimmed raw tokens; values are the
    /// canonical uppercase code, e.g. `"STK" -> "ST"`.
    #[serde(default)]
    pub uom_synonym_overrides: BTreeMap<String, String>,

    /// CSV header column synonym overrides, consulted before the
    /// closed-domain defaults (§4.5).
    #[serde(default)]
    pub csv_header_synonyms: BTreeMap<String, String>,

    /// Customer-number regex overrides, used by the customer detector's
    /// ERP-number signal (§4.8 S1) when a tenant's numbers don't follow the
    /// default pattern.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_number_regex: Option<String>,

    /// Daily AI cost budget, in micros of the tenant's billing currency
    /// (§4.4 budget gate, §4.7 dispatch).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_ai_cost_budget_micros: Option<i64>,

    /// Dimensionality of the embedding provider configured for this
    /// tenant (§4.9 S_emb).
    #[serde(default = "default_embedding_dimension")]
    pub embedding_dimension: usize,

    /// Customer auto-select threshold (§4.8), default 0.90.
    #[serde(default = "default_auto_select_customer_threshold")]
    pub auto_select_customer_threshold: f64,

    /// Customer auto-select gap (§4.8), default 0.07.
    #[serde(default = "default_auto_select_customer_gap")]
    pub auto_select_customer_gap: f64,

    /// Matcher auto-apply confidence threshold (§4.9), default 0.92.
    #[serde(default = "default_auto_apply_match_threshold")]
    pub auto_apply_match_threshold: f64,

    /// Matcher auto-apply gap (§4.9), default 0.10.
    #[serde(default = "default_auto_apply_match_gap")]
    pub auto_apply_match_gap: f64,
}

fn default_embedding_dimension() -> usize {
    384
}
fn default_auto_select_customer_threshold() -> f64 {
    0.90
}
fn default_auto_select_customer_gap() -> f64 {
    0.07
}
fn default_auto_apply_match_threshold() -> f64 {
    0.92
}
fn default_auto_apply_match_gap() -> f64 {
    0.10
}

impl Default for TenantSettings {
    fn default() -> Self {
        Self {
            uom_synonym_overrides: BTreeMap::new(),
            csv_header_synonyms: BTreeMap::new(),
            customer_number_regex: None,
            daily_ai_cost_budget_micros: None,
            embedding_dimension: default_embedding_dimension(),
            auto_select_customer_threshold: default_auto_select_customer_threshold(),
            auto_select_customer_gap: default_auto_select_customer_gap(),
            auto_apply_match_threshold: default_auto_apply_match_threshold(),
            auto_apply_match_gap: default_auto_apply_match_gap(),
        }
    }
}

/// Minimum allowed auto-apply gap before [`ConfigWarning::TightAutoApplyGap`]
/// is raised; below this a tenant will see far more SUGGESTED-not-applied
/// matches than intended.
const TIGHT_AUTO_APPLY_GAP_THRESHOLD: f64 = 0.02;

const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Load an [`OrderFlowConfig`] from an optional TOML file path.
///
/// * If `path` is `Some`, reads and parses the file.
/// * If `path` is `None`, returns [`OrderFlowConfig::default()`].
pub fn load_config(path: Option<&Path>) -> Result<OrderFlowConfig, ConfigError> {
    match path {
        Some(p) => {
            let content = std::fs::read_to_string(p)
                .map_err(|_| ConfigError::FileNotFound { path: p.display().to_string() })?;
            parse_toml(&content)
        }
        None => Ok(OrderFlowConfig::default()),
    }
}

/// Parse a TOML string into an [`OrderFlowConfig`].
pub fn parse_toml(content: &str) -> Result<OrderFlowConfig, ConfigError> {
    toml::from_str::<OrderFlowConfig>(content).map_err(|e| ConfigError::ParseError { reason: e.to_string() })
}

/// Validate a parsed configuration, returning advisory warnings.
///
/// Hard errors (invalid log level, thresholds out of `[0,1]`, negative
/// budgets) are returned as a [`ConfigError::ValidationError`]; soft issues
/// come back as warnings.
pub fn validate_config(config: &OrderFlowConfig) -> Result<Vec<ConfigWarning>, ConfigError> {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if let Some(ref level) = config.log_level {
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            errors.push(format!("invalid log_level '{level}'"));
        }
    }

    for (slug, tenant) in &config.tenants {
        if slug.is_empty() {
            errors.push("tenant slug must not be empty".to_string());
        }

        for (field, value) in [
            ("auto_select_customer_threshold", tenant.auto_select_customer_threshold),
            ("auto_select_customer_gap", tenant.auto_select_customer_gap),
            ("auto_apply_match_threshold", tenant.auto_apply_match_threshold),
            ("auto_apply_match_gap", tenant.auto_apply_match_gap),
        ] {
            if !(0.0..=1.0).contains(&value) {
                errors.push(format!("tenant '{slug}': {field} {value} out of range [0,1]"));
            }
        }

        if let Some(budget) = tenant.daily_ai_cost_budget_micros {
            if budget < 0 {
                errors.push(format!("tenant '{slug}': daily_ai_cost_budget_micros must not be negative"));
            }
        } else {
            warnings.push(ConfigWarning::NoBudgetConfigured { tenant: slug.clone() });
        }

        if tenant.embedding_dimension == 0 {
            errors.push(format!("tenant '{slug}': embedding_dimension must be greater than zero"));
        }

        if tenant.auto_apply_match_gap < TIGHT_AUTO_APPLY_GAP_THRESHOLD {
            warnings.push(ConfigWarning::TightAutoApplyGap { tenant: slug.clone(), gap: tenant.auto_apply_match_gap });
        }
    }

    if errors.is_empty() {
        Ok(warnings)
    } else {
        Err(ConfigError::ValidationError { reasons: errors })
    }
}

/// Merge two configurations. Values in `overlay` take precedence over
/// `base`; tenant maps are combined, with overlay entries winning whole
/// on slug collision (no per-field merge within a [`TenantSettings`]).
#[must_use]
pub fn merge_configs(base: OrderFlowConfig, overlay: OrderFlowConfig) -> OrderFlowConfig {
    let mut tenants = base.tenants;
    tenants.extend(overlay.tenants);
    OrderFlowConfig {
        log_level: overlay.log_level.or(base.log_level),
        dropzone_dir: overlay.dropzone_dir.or(base.dropzone_dir),
        default_max_page_count: overlay.default_max_page_count,
        tenants,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid_with_no_tenant_warnings() {
        let cfg = OrderFlowConfig::default();
        let warnings = validate_config(&cfg).expect("default config should be valid");
        assert!(warnings.is_empty());
    }

    #[test]
    fn default_config_has_sensible_defaults() {
        let cfg = OrderFlowConfig::default();
        assert_eq!(cfg.log_level.as_deref(), Some("info"));
        assert_eq!(cfg.default_max_page_count, 20);
        assert!(cfg.tenants.is_empty());
    }

    #[test]
    fn tenant_settings_defaults_match_spec_thresholds() {
        let settings = TenantSettings::default();
        assert_eq!(settings.auto_select_customer_threshold, 0.90);
        assert_eq!(settings.auto_select_customer_gap, 0.07);
        assert_eq!(settings.auto_apply_match_threshold, 0.92);
        assert_eq!(settings.auto_apply_match_gap, 0.10);
    }

    #[test]
    fn parse_valid_toml_string() {
        let toml = r#"
            log_level = "debug"
            dropzone_dir = "/srv/dropzone"

            [tenants.acme]
            daily_ai_cost_budget_micros = 500000
            embedding_dimension = 768
        "#;
        let cfg = parse_toml(toml).unwrap();
        assert_eq!(cfg.log_level.as_deref(), Some("debug"));
        assert_eq!(cfg.tenants["acme"].embedding_dimension, 768);
        assert_eq!(cfg.tenants["acme"].auto_apply_match_threshold, 0.92);
    }

    #[test]
    fn parse_invalid_toml_gives_parse_error() {
        let bad = "this is [not valid toml =";
        assert!(matches!(parse_toml(bad), Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn validation_catches_invalid_log_level() {
        let cfg = OrderFlowConfig { log_level: Some("verbose".into()), ..Default::default() };
        assert!(matches!(validate_config(&cfg), Err(ConfigError::ValidationError { .. })));
    }

    #[test]
    fn validation_catches_threshold_out_of_range() {
        let mut cfg = OrderFlowConfig::default();
        cfg.tenants.insert(
            "acme".into(),
            TenantSettings { auto_apply_match_threshold: 1.5, ..Default::default() },
        );
        let err = validate_config(&cfg).unwrap_err();
        match err {
            ConfigError::ValidationError { reasons } => {
                assert!(reasons.iter().any(|r| r.contains("auto_apply_match_threshold")));
            }
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }

    #[test]
    fn validation_catches_negative_budget() {
        let mut cfg = OrderFlowConfig::default();
        cfg.tenants.insert(
            "acme".into(),
            TenantSettings { daily_ai_cost_budget_micros: Some(-1), ..Default::default() },
        );
        assert!(matches!(validate_config(&cfg), Err(ConfigError::ValidationError { .. })));
    }

    #[test]
    fn validation_warns_on_missing_budget() {
        let mut cfg = OrderFlowConfig::default();
        cfg.tenants.insert("acme".into(), TenantSettings::default());
        let warnings = validate_config(&cfg).unwrap();
        assert!(warnings.iter().any(|w| matches!(w, ConfigWarning::NoBudgetConfigured { .. })));
    }

    #[test]
    fn validation_warns_on_tight_auto_apply_gap() {
        let mut cfg = OrderFlowConfig::default();
        cfg.tenants.insert(
            "acme".into(),
            TenantSettings {
                daily_ai_cost_budget_micros: Some(1),
                auto_apply_match_gap: 0.01,
                ..Default::default()
            },
        );
        let warnings = validate_config(&cfg).unwrap();
        assert!(warnings.iter().any(|w| matches!(w, ConfigWarning::TightAutoApplyGap { .. })));
    }

    #[test]
    fn merge_overlay_overrides_base_and_combines_tenants() {
        let mut base = OrderFlowConfig { log_level: Some("info".into()), ..Default::default() };
        base.tenants.insert("a".into(), TenantSettings::default());
        let mut overlay = OrderFlowConfig { log_level: Some("debug".into()), ..Default::default() };
        overlay.tenants.insert("b".into(), TenantSettings::default());

        let merged = merge_configs(base, overlay);
        assert_eq!(merged.log_level.as_deref(), Some("debug"));
        assert!(merged.tenants.contains_key("a"));
        assert!(merged.tenants.contains_key("b"));
    }

    #[test]
    fn merge_overlay_tenant_wins_whole_on_collision() {
        let mut base = OrderFlowConfig::default();
        base.tenants.insert("acme".into(), TenantSettings { embedding_dimension: 384, ..Default::default() });
        let mut overlay = OrderFlowConfig::default();
        overlay.tenants.insert("acme".into(), TenantSettings { embedding_dimension: 768, ..Default::default() });

        let merged = merge_configs(base, overlay);
        assert_eq!(merged.tenants["acme"].embedding_dimension, 768);
    }

    #[test]
    fn load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orderflow.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "log_level = \"warn\"").unwrap();
        let cfg = load_config(Some(&path)).unwrap();
        assert_eq!(cfg.log_level.as_deref(), Some("warn"));
    }

    #[test]
    fn load_missing_file_gives_file_not_found() {
        let err = load_config(Some(Path::new("/nonexistent/orderflow.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn load_none_returns_default() {
        let cfg = load_config(None).unwrap();
        assert_eq!(cfg.log_level.as_deref(), Some("info"));
    }

    #[test]
    fn toml_roundtrip() {
        let mut cfg = OrderFlowConfig { log_level: Some("debug".into()), ..Default::default() };
        cfg.tenants.insert("acme".into(), TenantSettings { embedding_dimension: 512, ..Default::default() });
        let serialized = toml::to_string(&cfg).unwrap();
        let deserialized: OrderFlowConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(cfg, deserialized);
    }
}
