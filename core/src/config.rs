//! Plan catalog and accrual schedule configuration.
//!
//! New plans are data, not code: drop a `plans.json` into the data
//! directory and the catalog picks it up at load time.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Static mapping from plan identifier to its daily profit rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanCatalog {
    plans: HashMap<String, f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct PlanCatalogFile {
    plans: HashMap<String, f64>,
}

impl PlanCatalog {
    /// Daily rate for `plan`. Total over any input: an unrecognized plan
    /// accrues nothing rather than failing.
    pub fn rate(&self, plan: &str) -> f64 {
        self.plans.get(plan).copied().unwrap_or(0.0)
    }

    pub fn plan_count(&self) -> usize {
        self.plans.len()
    }
}

impl Default for PlanCatalog {
    fn default() -> Self {
        Self {
            plans: [("silver".to_string(), 4.0), ("gold".to_string(), 20.0)].into(),
        }
    }
}

/// When the daily accrual sweep fires: a fixed wall-clock time anchored
/// to a fixed UTC offset. Defaults to local midnight at +05:00, the
/// operating region the platform accrues in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccrualConfig {
    pub fire_hour: u32,
    pub fire_minute: u32,
    pub utc_offset_minutes: i32,
}

impl Default for AccrualConfig {
    fn default() -> Self {
        Self {
            fire_hour: 0,
            fire_minute: 0,
            utc_offset_minutes: 5 * 60,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeskConfig {
    pub plans: PlanCatalog,
    pub accrual: AccrualConfig,
}

impl DeskConfig {
    /// Load configuration from `data_dir`. Absent files fall back to the
    /// built-in defaults; a malformed file is an error, not a fallback.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let mut config = Self::default();

        let plans_path = format!("{data_dir}/plans.json");
        if std::path::Path::new(&plans_path).exists() {
            let content = std::fs::read_to_string(&plans_path)
                .map_err(|e| anyhow::anyhow!("Cannot read {plans_path}: {e}"))?;
            let file: PlanCatalogFile = serde_json::from_str(&content)?;
            config.plans = PlanCatalog { plans: file.plans };
        }

        let accrual_path = format!("{data_dir}/accrual.json");
        if std::path::Path::new(&accrual_path).exists() {
            let content = std::fs::read_to_string(&accrual_path)
                .map_err(|e| anyhow::anyhow!("Cannot read {accrual_path}: {e}"))?;
            config.accrual = serde_json::from_str(&content)?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_silver_and_gold() {
        let catalog = PlanCatalog::default();
        assert_eq!(catalog.rate("silver"), 4.0);
        assert_eq!(catalog.rate("gold"), 20.0);
    }

    #[test]
    fn unknown_plan_resolves_to_zero() {
        let catalog = PlanCatalog::default();
        assert_eq!(catalog.rate("platinum"), 0.0);
        assert_eq!(catalog.rate(""), 0.0);
    }
}
