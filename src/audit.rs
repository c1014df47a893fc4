// 📊 Auditor - drives the comparator over a dataset and tallies findings
// Rows are classified in parallel; counting is an order-independent fold

use crate::catalog::Catalog;
use crate::comparator::{Finding, FindingCategory, NameRow, RowComparator};
use crate::normalize::normalized_key;
use crate::rules::{RuleError, RuleSet};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};
use uuid::Uuid;

/// Data starts on row 2; row 1 is the CSV header
pub const FIRST_DATA_ROW: usize = 2;

/// Example rows kept per credential token
pub const MAX_CREDENTIAL_EXAMPLES: usize = 5;

// ============================================================================
// ROW AUDIT
// ============================================================================

/// A row that produced at least one finding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowAudit {
    pub row_index: usize,
    pub row: NameRow,
    pub findings: Vec<Finding>,
}

impl RowAudit {
    pub fn reasons(&self) -> Vec<String> {
        self.findings.iter().map(|f| f.describe()).collect()
    }
}

/// A row where a credential token was found, kept as evidence for curation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialExample {
    pub row_index: usize,
    pub original: String,
    pub last_name: String,
}

/// A credential token the catalog lacks, with its frequency and first rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingCredential {
    pub token: String,
    pub count: usize,
    pub examples: Vec<CredentialExample>,
}

// ============================================================================
// AUDIT REPORT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub total_rows: usize,
    pub total_findings: usize,
    pub by_category: BTreeMap<FindingCategory, usize>,
    /// Keyed by normalized extracted token, or category name when there is none
    pub token_counts: BTreeMap<String, usize>,
    /// Credential tokens only, keyed by normalized key
    pub credential_counts: BTreeMap<String, usize>,
    /// First rows each credential token was seen in, in row order
    pub credential_examples: BTreeMap<String, Vec<CredentialExample>>,
    pub failures: Vec<RowAudit>,
}

impl AuditReport {
    fn empty() -> Self {
        AuditReport {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            total_rows: 0,
            total_findings: 0,
            by_category: BTreeMap::new(),
            token_counts: BTreeMap::new(),
            credential_counts: BTreeMap::new(),
            credential_examples: BTreeMap::new(),
            failures: Vec::new(),
        }
    }

    fn record(&mut self, row: &NameRow, finding: &Finding) {
        self.total_findings += 1;
        *self.by_category.entry(finding.category).or_insert(0) += 1;
        *self.token_counts.entry(tally_key(finding)).or_insert(0) += 1;

        if finding.category == FindingCategory::CredentialResidue {
            if let Some(token) = &finding.extracted_token {
                let key = normalized_key(token);
                *self.credential_counts.entry(key.clone()).or_insert(0) += 1;

                let examples = self.credential_examples.entry(key).or_default();
                if examples.len() < MAX_CREDENTIAL_EXAMPLES {
                    examples.push(CredentialExample {
                        row_index: finding.row_index,
                        original: row.original().to_string(),
                        last_name: row.last_name().to_string(),
                    });
                }
            }
        }
    }

    pub fn rows_with_findings(&self) -> usize {
        self.failures.len()
    }

    /// Share of rows with at least one finding (0.0 for an empty dataset)
    pub fn failure_rate(&self) -> f64 {
        if self.total_rows == 0 {
            0.0
        } else {
            self.failures.len() as f64 / self.total_rows as f64
        }
    }

    pub fn category_count(&self, category: FindingCategory) -> usize {
        self.by_category.get(&category).copied().unwrap_or(0)
    }

    /// Most frequent tally keys, ties broken alphabetically
    pub fn top_tokens(&self, n: usize) -> Vec<(String, usize)> {
        sorted_by_count(&self.token_counts).into_iter().take(n).collect()
    }

    /// Distinct normalized credential tokens, sorted
    pub fn credential_tokens(&self) -> Vec<String> {
        self.credential_counts.keys().cloned().collect()
    }

    /// Credential tokens the catalog does not know yet, most frequent first
    pub fn missing_credentials(&self, catalog: &Catalog) -> Vec<MissingCredential> {
        let known = catalog.keys();
        sorted_by_count(&self.credential_counts)
            .into_iter()
            .filter(|(key, _)| !known.contains(key.as_str()))
            .map(|(token, count)| MissingCredential {
                examples: self
                    .credential_examples
                    .get(&token)
                    .cloned()
                    .unwrap_or_default(),
                token,
                count,
            })
            .collect()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} rows: {} with findings ({:.2}%), {} findings",
            self.total_rows,
            self.rows_with_findings(),
            self.failure_rate() * 100.0,
            self.total_findings
        )
    }
}

fn tally_key(finding: &Finding) -> String {
    match &finding.extracted_token {
        Some(token) => normalized_key(token),
        None => finding.category.name().to_string(),
    }
}

fn sorted_by_count(counts: &BTreeMap<String, usize>) -> Vec<(String, usize)> {
    let mut entries: Vec<(String, usize)> =
        counts.iter().map(|(k, v)| (k.clone(), *v)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries
}

// ============================================================================
// AUDITOR
// ============================================================================

pub struct Auditor {
    comparator: RowComparator,
}

impl Auditor {
    pub fn new(rules: &RuleSet) -> Result<Self, RuleError> {
        Ok(Auditor {
            comparator: RowComparator::new(rules)?,
        })
    }

    pub fn comparator(&self) -> &RowComparator {
        &self.comparator
    }

    /// Classify every row and tally the findings
    pub fn audit(&self, rows: &[NameRow]) -> AuditReport {
        info!("Auditing {} rows", rows.len());

        let per_row: Vec<Vec<Finding>> = rows
            .par_iter()
            .enumerate()
            .map(|(i, row)| self.comparator.compare(i + FIRST_DATA_ROW, row))
            .collect();

        let mut report = AuditReport::empty();
        report.total_rows = rows.len();

        for (row, findings) in rows.iter().zip(per_row) {
            if findings.is_empty() {
                continue;
            }
            for finding in &findings {
                report.record(row, finding);
            }
            let row_index = findings[0].row_index;
            debug!("Row {}: {} findings", row_index, findings.len());
            report.failures.push(RowAudit {
                row_index,
                row: row.clone(),
                findings,
            });
        }

        info!("Audit complete: {}", report.summary());
        report
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn auditor() -> Auditor {
        Auditor::new(&RuleSet::default()).unwrap()
    }

    fn sample_rows() -> Vec<NameRow> {
        vec![
            NameRow::new("Jane Doe, MBA", "Jane", "MBA"),
            NameRow::new("Maria Garcia-Lopez", "Maria", "Garcia-Lopez"),
            NameRow::new("Sam Lee, M.B.A.", "Sam", "Lee M.B.A."),
            NameRow::new("", "", ""),
            NameRow::new("Tom Reed PMI-ACP", "Tom", "PMI-ACP"),
            NameRow::new("Amy Business Coach", "Amy", "Business Coach"),
        ]
    }

    #[test]
    fn test_audit_counts() {
        let report = auditor().audit(&sample_rows());

        println!("Audit: {}", report.summary());

        assert_eq!(report.total_rows, 6);
        assert_eq!(report.rows_with_findings(), 5);
        assert_eq!(report.category_count(FindingCategory::EmptyName), 1);
        assert_eq!(report.category_count(FindingCategory::CredentialResidue), 3);
        assert_eq!(report.category_count(FindingCategory::MultiWordResidue), 2);
        assert_eq!(report.category_count(FindingCategory::JobTitleResidue), 1);
        assert_eq!(report.total_findings, 7);
    }

    #[test]
    fn test_row_indexes_start_after_header() {
        let report = auditor().audit(&sample_rows());

        let indexes: Vec<_> = report.failures.iter().map(|f| f.row_index).collect();
        assert_eq!(indexes, vec![2, 4, 5, 6, 7]);
    }

    #[test]
    fn test_tally_keys_normalized_with_category_fallback() {
        let report = auditor().audit(&sample_rows());

        assert_eq!(report.token_counts.get("MBA"), Some(&2));
        assert_eq!(report.token_counts.get("EmptyName"), Some(&1));
        assert_eq!(report.token_counts.get("BUSINESS COACH"), Some(&1));

        let top = report.top_tokens(1);
        assert_eq!(top, vec![("MBA".to_string(), 2)]);
    }

    #[test]
    fn test_credential_tokens_and_missing() {
        let report = auditor().audit(&sample_rows());

        assert_eq!(report.credential_tokens(), vec!["MBA", "PMI-ACP"]);

        let catalog = Catalog::from_literals(["M.B.A."]);
        let missing = report.missing_credentials(&catalog);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].token, "PMI-ACP");
        assert_eq!(missing[0].count, 1);
        assert_eq!(
            missing[0].examples,
            vec![CredentialExample {
                row_index: 6,
                original: "Tom Reed PMI-ACP".to_string(),
                last_name: "PMI-ACP".to_string(),
            }]
        );
    }

    #[test]
    fn test_credential_examples_capped_in_row_order() {
        let rows: Vec<NameRow> = (0..8)
            .map(|i| NameRow::new(format!("Person {}, MBA", i), "Person", "MBA"))
            .collect();

        let report = auditor().audit(&rows);

        assert_eq!(report.credential_counts.get("MBA"), Some(&8));
        let examples = &report.credential_examples["MBA"];
        assert_eq!(examples.len(), MAX_CREDENTIAL_EXAMPLES);
        let indexes: Vec<_> = examples.iter().map(|e| e.row_index).collect();
        assert_eq!(indexes, vec![2, 3, 4, 5, 6]);
        assert_eq!(examples[0].original, "Person 0, MBA");

        let missing = report.missing_credentials(&Catalog::new());
        assert_eq!(missing[0].examples.len(), MAX_CREDENTIAL_EXAMPLES);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let rows: Vec<NameRow> = sample_rows().into_iter().cycle().take(600).collect();
        let auditor = auditor();

        let report = auditor.audit(&rows);

        let sequential: usize = rows
            .iter()
            .enumerate()
            .map(|(i, row)| auditor.comparator().compare(i + FIRST_DATA_ROW, row).len())
            .sum();
        assert_eq!(report.total_findings, sequential);
        assert_eq!(report.category_count(FindingCategory::EmptyName), 100);
        assert!(report
            .failures
            .windows(2)
            .all(|w| w[0].row_index < w[1].row_index));
    }

    #[test]
    fn test_empty_dataset() {
        let report = auditor().audit(&[]);

        assert_eq!(report.total_rows, 0);
        assert_eq!(report.failure_rate(), 0.0);
        assert!(report.top_tokens(10).is_empty());
    }

    #[test]
    fn test_end_to_end_credential_into_catalog() {
        let report = auditor().audit(&[NameRow::new("Jane Doe, MBA", "Jane", "MBA")]);

        assert_eq!(report.total_findings, 1);
        let finding = &report.failures[0].findings[0];
        assert_eq!(finding.category, FindingCategory::CredentialResidue);
        assert_eq!(finding.extracted_token.as_deref(), Some("MBA"));

        let catalog = Catalog::from_literals(["CPA", "MD", "PhD"]);
        let outcome = catalog.merge(report.credential_tokens());

        assert_eq!(outcome.added, vec!["MBA"]);
        assert_eq!(outcome.catalog.literals(), vec!["CPA", "MBA", "MD", "PhD"]);
    }
}
