// ⚙️ Audit configuration
// Every field has a default, so a config file only needs the keys it changes

use crate::dataset::ColumnNames;
use crate::report::ReportOptions;
use crate::rules::RuleSet;
use crate::store::CatalogFormat;
use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// CSV header names
    pub columns: ColumnNames,

    /// Layout of the catalog file
    pub catalog_format: CatalogFormat,

    /// Rules file; built-in tables when absent
    pub rules_path: Option<PathBuf>,

    /// Tokens listed in the frequency section
    pub top_n: usize,

    /// Failing rows printed in the sample section
    pub sample_limit: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        let report = ReportOptions::default();
        AuditConfig {
            columns: ColumnNames::default(),
            catalog_format: CatalogFormat::default(),
            rules_path: None,
            top_n: report.top_n,
            sample_limit: report.sample_limit,
        }
    }
}

impl AuditConfig {
    /// Load config from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let mut config: AuditConfig =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;

        // Relative rules paths are resolved against the config file
        if let (Some(rules), Some(dir)) = (config.rules_path.as_ref(), path.as_ref().parent()) {
            if rules.is_relative() {
                config.rules_path = Some(dir.join(rules));
            }
        }

        debug!("Loaded config from {:?}: {:?}", path.as_ref(), config);
        Ok(config)
    }

    /// Config file if given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(AuditConfig::default()),
        }
    }

    pub fn rules(&self) -> Result<RuleSet> {
        match &self.rules_path {
            Some(path) => RuleSet::from_file(path),
            None => Ok(RuleSet::default()),
        }
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            top_n: self.top_n,
            sample_limit: self.sample_limit,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
