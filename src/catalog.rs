// 📚 Credential Catalog - canonical, deduplicated, sorted token list
// Merging never inserts positionally: every merge re-sorts and re-dedups the whole list

use crate::normalize::normalized_key;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::{debug, warn};

// ============================================================================
// CREDENTIAL TOKEN
// ============================================================================

/// A catalog entry. Ordered by `(normalized_key, literal)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialToken {
    literal: String,
    normalized_key: String,
}

impl CredentialToken {
    pub fn new(literal: impl Into<String>) -> Self {
        let literal = literal.into();
        let normalized_key = normalized_key(&literal);
        CredentialToken {
            literal,
            normalized_key,
        }
    }

    /// Display form as stored, e.g. `"Ed.D."`
    pub fn literal(&self) -> &str {
        &self.literal
    }

    pub fn normalized_key(&self) -> &str {
        &self.normalized_key
    }
}

impl Ord for CredentialToken {
    fn cmp(&self, other: &Self) -> Ordering {
        self.normalized_key
            .cmp(&other.normalized_key)
            .then_with(|| self.literal.cmp(&other.literal))
    }
}

impl PartialOrd for CredentialToken {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ============================================================================
// MERGE OUTCOME
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeOutcome {
    /// Full catalog after the merge, sorted and unique by key
    pub catalog: Catalog,

    /// Candidates that were genuinely new, in the order supplied
    pub added: Vec<String>,

    /// Literals dropped because the incoming catalog already repeated their key
    pub collapsed: Vec<String>,
}

impl MergeOutcome {
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.collapsed.is_empty()
    }
}

// ============================================================================
// CATALOG
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    tokens: Vec<CredentialToken>,
}

impl Catalog {
    pub fn new() -> Self {
        Catalog { tokens: Vec::new() }
    }

    /// Build a catalog from stored literals, as loaded (no sorting, no dedup)
    pub fn from_literals<I, S>(literals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Catalog {
            tokens: literals.into_iter().map(CredentialToken::new).collect(),
        }
    }

    pub fn tokens(&self) -> &[CredentialToken] {
        &self.tokens
    }

    pub fn literals(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.literal()).collect()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Whether any entry shares the literal's normalized key
    pub fn contains(&self, literal: &str) -> bool {
        let key = normalized_key(literal);
        self.tokens.iter().any(|t| t.normalized_key == key)
    }

    /// Normalized keys of every entry
    pub fn keys(&self) -> HashSet<&str> {
        self.tokens.iter().map(|t| t.normalized_key()).collect()
    }

    /// Fold candidate literals into the catalog.
    ///
    /// Empty candidates and candidates whose key is already known (in the
    /// catalog or earlier in `candidates`) are dropped. The result is fully
    /// re-sorted; duplicate keys already present in `self` are collapsed to
    /// the first entry in sort order.
    pub fn merge<I, S>(&self, candidates: I) -> MergeOutcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut known: HashSet<String> = self
            .tokens
            .iter()
            .map(|t| t.normalized_key.clone())
            .collect();

        let mut added = Vec::new();
        let mut merged = self.tokens.clone();

        for candidate in candidates {
            let literal = candidate.as_ref().trim();
            let token = CredentialToken::new(literal);
            if token.normalized_key.is_empty() {
                continue;
            }
            if known.insert(token.normalized_key.clone()) {
                added.push(token.literal.clone());
                merged.push(token);
            } else {
                debug!("Skipping known credential {:?}", literal);
            }
        }

        merged.sort();

        let mut collapsed = Vec::new();
        let mut tokens: Vec<CredentialToken> = Vec::with_capacity(merged.len());
        for token in merged {
            match tokens.last() {
                Some(prev) if prev.normalized_key == token.normalized_key => {
                    warn!(
                        "Catalog repeats key {}: keeping {:?}, dropping {:?}",
                        token.normalized_key, prev.literal, token.literal
                    );
                    collapsed.push(token.literal);
                }
                _ => tokens.push(token),
            }
        }

        MergeOutcome {
            catalog: Catalog { tokens },
            added,
            collapsed,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const NO_CANDIDATES: [&str; 0] = [];

    #[test]
    fn test_token_ordering_uses_key_then_literal() {
        let mut tokens = vec![
            CredentialToken::new("MD"),
            CredentialToken::new("M.D."),
            CredentialToken::new("Ed.D."),
        ];
        tokens.sort();

        let literals: Vec<_> = tokens.iter().map(|t| t.literal()).collect();
        assert_eq!(literals, vec!["Ed.D.", "M.D.", "MD"]);
    }

    #[test]
    fn test_merge_empty_candidates_resorts() {
        let catalog = Catalog::from_literals(["PhD", "CPA", "MBA"]);

        let outcome = catalog.merge(NO_CANDIDATES);

        assert!(outcome.added.is_empty());
        assert!(outcome.collapsed.is_empty());
        assert!(!outcome.has_changes());
        assert_eq!(outcome.catalog.literals(), vec!["CPA", "MBA", "PhD"]);
    }

    #[test]
    fn test_merge_dedups_under_normalized_key() {
        let catalog = Catalog::from_literals(["CPA", "MD"]);

        let outcome = catalog.merge(["M.D.", "MD", "md"]);

        assert!(outcome.added.is_empty());
        assert_eq!(outcome.catalog.literals(), vec!["CPA", "MD"]);
    }

    #[test]
    fn test_merge_into_empty_catalog_sorts() {
        let outcome = Catalog::new().merge(["PhD", "MBA", "CPA"]);

        assert_eq!(outcome.catalog.literals(), vec!["CPA", "MBA", "PhD"]);
        assert_eq!(outcome.added, vec!["PhD", "MBA", "CPA"]);
    }

    #[test]
    fn test_merge_inserts_in_sorted_position() {
        let catalog = Catalog::from_literals(["CPA", "MD", "PhD"]);

        let outcome = catalog.merge(["MBA"]);

        assert_eq!(outcome.added, vec!["MBA"]);
        assert_eq!(outcome.catalog.literals(), vec!["CPA", "MBA", "MD", "PhD"]);
    }

    #[test]
    fn test_merge_drops_empty_candidates() {
        let outcome = Catalog::new().merge(["", "   ", ".", "RN"]);

        assert_eq!(outcome.added, vec!["RN"]);
        assert_eq!(outcome.catalog.len(), 1);
    }

    #[test]
    fn test_merge_repeated_candidate_added_once() {
        let outcome = Catalog::new().merge(["M.D.", "MD"]);

        assert_eq!(outcome.added, vec!["M.D."]);
        assert_eq!(outcome.catalog.literals(), vec!["M.D."]);
    }

    #[test]
    fn test_merge_collapses_malformed_catalog() {
        let catalog = Catalog::from_literals(["MD", "RN", "M.D."]);

        let outcome = catalog.merge(NO_CANDIDATES);

        assert_eq!(outcome.catalog.literals(), vec!["M.D.", "RN"]);
        assert_eq!(outcome.collapsed, vec!["MD"]);
        assert!(outcome.has_changes());
    }

    #[test]
    fn test_contains_uses_normalized_key() {
        let catalog = Catalog::from_literals(["Ed.D."]);

        assert!(catalog.contains("EDD"));
        assert!(catalog.contains("edd"));
        assert!(!catalog.contains("PhD"));
        assert!(catalog.keys().contains("EDD"));
    }
}
