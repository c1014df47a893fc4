// 🏷️ Residue Rules - Rules as Data
// Job-title keywords, emoji code points and credential matchers for the row comparator

use anyhow::{Context as AnyhowContext, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

// ============================================================================
// DEFAULT TABLES
// ============================================================================

const DEFAULT_JOB_KEYWORDS: &[&str] = &[
    "CEO", "CFO", "COO", "CTO", "President", "VP", "Vice President",
    "Director", "Manager", "Executive", "Founder", "Owner", "Partner",
    "Coach", "Consultant", "Specialist", "Analyst", "Coordinator",
    "Administrator", "Officer", "Leader", "Head", "Chief", "Principal",
    "Speaker", "Author", "Photographer", "Designer", "Developer",
    "Engineer", "Architect", "Strategist", "Advisor", "Expert",
];

/// Symbols that never belong in a personal name
const DEFAULT_EMOJI: &[char] = &[
    '\u{2022}',  // •
    '\u{270A}',  // ✊
    '\u{2764}',  // ❤
    '\u{FE0F}',  // variation selector-16
    '\u{2B50}',  // ⭐
    '\u{1F31F}', // 🌟
    '\u{1F4AA}', // 💪
    '\u{1F44D}', // 👍
    '\u{1F3AF}', // 🎯
    '\u{1F680}', // 🚀
    '\u{1F4A1}', // 💡
    '\u{1F525}', // 🔥
    '\u{26A1}',  // ⚡
    '\u{2728}',  // ✨
    '\u{1F308}', // 🌈
    '\u{1F389}', // 🎉
    '\u{1F38A}', // 🎊
    '\u{1F3C6}', // 🏆
    '\u{1F947}', // 🥇
];

const SHORT_CAPS: &str = r"^[A-Z]{2,10}$";
const HYPHENATED_CAPS: &str = r"^[A-Z]+-[A-Z]+$";

// ============================================================================
// ERRORS
// ============================================================================

/// Errors raised while compiling a rule set into matchers
#[derive(Error, Debug)]
pub enum RuleError {
    #[error("Invalid credential pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Rule set has no credential patterns")]
    NoCredentialPatterns,
}

// ============================================================================
// RULE SET
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    /// Professional-role words matched case-insensitively as whole words
    pub job_keywords: Vec<String>,

    /// Characters flagged as emoji/symbol residue
    pub emoji: Vec<char>,

    /// Anchored patterns a token must match to count as a credential
    pub credential_patterns: Vec<String>,

    /// Also treat an all-caps last word of the original name as a credential
    pub trailing_word_credentials: bool,
}

impl Default for RuleSet {
    fn default() -> Self {
        RuleSet {
            job_keywords: DEFAULT_JOB_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            emoji: DEFAULT_EMOJI.to_vec(),
            credential_patterns: vec![SHORT_CAPS.to_string(), HYPHENATED_CAPS.to_string()],
            trailing_word_credentials: false,
        }
    }
}

impl RuleSet {
    /// Load rules from JSON file; missing keys fall back to the defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read rules file: {:?}", path.as_ref()))?;

        let rules: RuleSet =
            serde_json::from_str(&content).context("Failed to parse rules JSON")?;

        Ok(rules)
    }

    /// Compile the tables into matchers
    pub fn compile(&self) -> Result<CompiledRules, RuleError> {
        let job_titles = compile_keywords(&self.job_keywords)?;

        if self.credential_patterns.is_empty() {
            return Err(RuleError::NoCredentialPatterns);
        }
        let credentials = self
            .credential_patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|source| RuleError::InvalidPattern {
                    pattern: p.clone(),
                    source,
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut emoji = self.emoji.clone();
        emoji.sort_unstable();
        emoji.dedup();

        Ok(CompiledRules {
            job_titles,
            emoji,
            credentials,
            short_caps: Regex::new(SHORT_CAPS).map_err(|source| RuleError::InvalidPattern {
                pattern: SHORT_CAPS.to_string(),
                source,
            })?,
            trailing_word_credentials: self.trailing_word_credentials,
        })
    }
}

/// One alternation, longest keyword first so "Vice President" wins over "President"
fn compile_keywords(keywords: &[String]) -> Result<Option<Regex>, RuleError> {
    let mut sorted: Vec<&str> = keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .collect();
    if sorted.is_empty() {
        return Ok(None);
    }
    sorted.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    sorted.dedup();

    let alternation = sorted
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(r"(?i)\b(?:{})\b", alternation);

    Regex::new(&pattern)
        .map(Some)
        .map_err(|source| RuleError::InvalidPattern { pattern, source })
}

// ============================================================================
// COMPILED RULES
// ============================================================================

/// Matchers built from a RuleSet, owned by the comparator
#[derive(Debug, Clone)]
pub struct CompiledRules {
    job_titles: Option<Regex>,
    emoji: Vec<char>,
    credentials: Vec<Regex>,
    short_caps: Regex,
    trailing_word_credentials: bool,
}

impl CompiledRules {
    /// First job-title keyword in the text, as written there
    pub fn find_job_title<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.job_titles
            .as_ref()
            .and_then(|re| re.find(text))
            .map(|m| m.as_str())
    }

    /// First emoji/symbol character in the text
    pub fn find_emoji(&self, text: &str) -> Option<char> {
        text.chars().find(|c| self.emoji.binary_search(c).is_ok())
    }

    /// Whether a whole token looks like a credential
    pub fn is_credential(&self, token: &str) -> bool {
        self.credentials.iter().any(|re| re.is_match(token))
    }

    /// Whether a word is a short all-caps token
    pub fn is_short_caps(&self, word: &str) -> bool {
        self.short_caps.is_match(word)
    }

    pub fn trailing_word_credentials(&self) -> bool {
        self.trailing_word_credentials
    }
}

// ============================================================================
// TESTS
// ============================================================================
