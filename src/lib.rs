// Name Audit - Core Library
// Residue detection for parsed names and credential catalog curation

pub mod normalize;
pub mod rules;
pub mod comparator;
pub mod catalog;
pub mod store;
pub mod dataset;
pub mod audit;
pub mod report;
pub mod config;

// Re-export commonly used types
pub use normalize::normalized_key;
pub use rules::{CompiledRules, RuleError, RuleSet};
pub use comparator::{Finding, FindingCategory, NameField, NameRow, RowComparator};
pub use catalog::{Catalog, CredentialToken, MergeOutcome};
pub use store::{load_candidates, CatalogFile, CatalogFormat, StoreError};
pub use dataset::{load_aligned, load_output_only, ColumnNames};
pub use audit::{
    AuditReport, Auditor, CredentialExample, MissingCredential, RowAudit, FIRST_DATA_ROW,
    MAX_CREDENTIAL_EXAMPLES,
};
pub use report::{render_json, render_merge, render_missing, render_text, ReportOptions};
pub use config::AuditConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
