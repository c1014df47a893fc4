// ✅ Row Comparator - residue detection for one parsed name
// Compares the original full name against the normalizer's First/Last output

use crate::normalize::{comma_suffix_fragments, compact_fragment, last_word, words};
use crate::rules::{CompiledRules, RuleError, RuleSet};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// NAME ROW
// ============================================================================

/// One record under evaluation. Fields are compared trimmed, never rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRow {
    original: String,
    first_name: String,
    last_name: String,
}

impl NameRow {
    pub fn new(
        original: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        NameRow {
            original: original.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }
}

// ============================================================================
// FINDING
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FindingCategory {
    EmptyName,
    JobTitleResidue,
    EmojiResidue,
    TrailingHyphen,
    MultiWordResidue,
    CredentialResidue,
}

impl FindingCategory {
    pub fn name(&self) -> &'static str {
        match self {
            FindingCategory::EmptyName => "EmptyName",
            FindingCategory::JobTitleResidue => "JobTitleResidue",
            FindingCategory::EmojiResidue => "EmojiResidue",
            FindingCategory::TrailingHyphen => "TrailingHyphen",
            FindingCategory::MultiWordResidue => "MultiWordResidue",
            FindingCategory::CredentialResidue => "CredentialResidue",
        }
    }
}

impl fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which output field a finding refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameField {
    First,
    Last,
    Both,
}

impl NameField {
    pub fn name(&self) -> &'static str {
        match self {
            NameField::First => "first",
            NameField::Last => "last",
            NameField::Both => "both",
        }
    }
}

impl fmt::Display for NameField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// 1-based dataset position; the header is row 1
    pub row_index: usize,
    pub category: FindingCategory,
    pub field: NameField,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_token: Option<String>,
}

impl Finding {
    fn new(
        row_index: usize,
        category: FindingCategory,
        field: NameField,
        extracted_token: Option<String>,
    ) -> Self {
        Finding {
            row_index,
            category,
            field,
            extracted_token,
        }
    }

    /// Short reason label, e.g. `JobTitleResidue(last): Coach`
    pub fn describe(&self) -> String {
        match &self.extracted_token {
            Some(token) => format!("{}({}): {}", self.category, self.field, token),
            None => format!("{}({})", self.category, self.field),
        }
    }
}

// ============================================================================
// ROW COMPARATOR
// ============================================================================

pub struct RowComparator {
    rules: CompiledRules,
}

impl RowComparator {
    /// Compile the rule set; fails only on an invalid pattern
    pub fn new(rules: &RuleSet) -> Result<Self, RuleError> {
        Ok(RowComparator {
            rules: rules.compile()?,
        })
    }

    /// Classify one row. Findings come out in rule order:
    /// empty names, job titles, emoji, trailing hyphens, multi-word, credentials.
    pub fn compare(&self, row_index: usize, row: &NameRow) -> Vec<Finding> {
        let original = row.original.trim();
        let first = row.first_name.trim();
        let last = row.last_name.trim();

        let mut out = FindingSink::new(row_index);

        // Rule 1: Empty names
        match (first.is_empty(), last.is_empty()) {
            (true, true) => {
                out.push(FindingCategory::EmptyName, NameField::Both, None);
                return out.finish();
            }
            (true, false) => out.push(FindingCategory::EmptyName, NameField::First, None),
            (false, true) => out.push(FindingCategory::EmptyName, NameField::Last, None),
            (false, false) => {}
        }

        let fields = [(NameField::First, first), (NameField::Last, last)];

        // Rule 2: Job-title residue
        for (field, text) in fields {
            if let Some(keyword) = self.rules.find_job_title(text) {
                out.push(FindingCategory::JobTitleResidue, field, Some(keyword.to_string()));
            }
        }

        // Rule 3: Emoji / symbol residue
        for (field, text) in fields {
            if let Some(symbol) = self.rules.find_emoji(text) {
                out.push(FindingCategory::EmojiResidue, field, Some(symbol.to_string()));
            }
        }

        // Rule 4: Trailing hyphen
        for (field, text) in fields {
            if text.ends_with('-') {
                let token = last_word(text).unwrap_or(text);
                out.push(FindingCategory::TrailingHyphen, field, Some(token.to_string()));
            }
        }

        // Rule 5: Multi-word residue in the last name
        if is_multi_word_residue(last) {
            out.push(FindingCategory::MultiWordResidue, NameField::Last, Some(last.to_string()));
        }

        // Rule 6: Credential residue
        for token in self.credential_candidates(original, last) {
            out.push(FindingCategory::CredentialResidue, NameField::Last, Some(token));
        }

        out.finish()
    }

    /// Tokens from the original name that look like credentials left in the last name
    fn credential_candidates(&self, original: &str, last: &str) -> Vec<String> {
        if last.is_empty() || last == original {
            return Vec::new();
        }

        let mut candidates = Vec::new();

        // Whole last name: short all-caps or CAPS-CAPS
        if self.rules.is_credential(last) {
            candidates.push(last.to_string());
        }

        // Everything after the first comma of the original
        for fragment in comma_suffix_fragments(original) {
            let compact = compact_fragment(fragment);
            if self.rules.is_credential(&compact) {
                candidates.push(compact);
            }
        }

        // Optional: all-caps last word before the comma
        if self.rules.trailing_word_credentials() {
            let name_part = original.split(',').next().unwrap_or("");
            let name_words = words(name_part);
            if name_words.len() >= 2 {
                if let Some(word) = name_words.last() {
                    if self.rules.is_short_caps(word) {
                        candidates.push(word.to_string());
                    }
                }
            }
        }

        candidates
    }
}

/// Three or more words, or two words without a hyphen
fn is_multi_word_residue(last: &str) -> bool {
    match words(last).len() {
        0 | 1 => false,
        2 => !last.contains('-'),
        _ => true,
    }
}

/// Collects a row's findings, dropping repeats of (category, field, token)
struct FindingSink {
    row_index: usize,
    findings: Vec<Finding>,
}

impl FindingSink {
    fn new(row_index: usize) -> Self {
        FindingSink {
            row_index,
            findings: Vec::new(),
        }
    }

    fn push(&mut self, category: FindingCategory, field: NameField, token: Option<String>) {
        let seen = self.findings.iter().any(|f| {
            f.category == category && f.field == field && f.extracted_token == token
        });
        if !seen {
            self.findings
                .push(Finding::new(self.row_index, category, field, token));
        }
    }

    fn finish(self) -> Vec<Finding> {
        self.findings
    }
}

// ============================================================================
// TESTS
// ============================================================================
