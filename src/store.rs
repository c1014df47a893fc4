// 💾 Catalog Store - load and rewrite the catalog region of a file
// Lines outside the catalog region are kept verbatim

use crate::catalog::Catalog;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Catalog marker {marker:?} not found in {path:?}")]
    MarkerNotFound { marker: String, path: PathBuf },

    #[error("Credential {literal:?} cannot be stored as a {format} catalog entry")]
    InvalidLiteral { literal: String, format: &'static str },
}

impl StoreError {
    /// Attach the file path to an error raised by `CatalogFile::parse`
    pub fn at(self, path: &Path) -> Self {
        match self {
            StoreError::MarkerNotFound { marker, .. } => StoreError::MarkerNotFound {
                marker,
                path: path.to_path_buf(),
            },
            other => other,
        }
    }
}

// ============================================================================
// FORMAT
// ============================================================================

/// How literals are laid out in the catalog file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogFormat {
    #[default]
    /// One literal per line. Blank and `#` lines before the first literal or
    /// after the last one are kept; blank and `#` lines in between are dropped.
    Plain,

    /// `  "LIT",` lines between the line holding `start_marker` and the line
    /// holding `end_marker`, e.g. a TypeScript `as const` array
    QuotedArray {
        start_marker: String,
        end_marker: String,
    },
}

impl CatalogFormat {
    pub fn name(&self) -> &'static str {
        match self {
            CatalogFormat::Plain => "plain",
            CatalogFormat::QuotedArray { .. } => "quoted array",
        }
    }

    /// Whether the literal survives a render/parse round trip in this layout
    pub fn can_store(&self, literal: &str) -> bool {
        if literal.is_empty() || literal.trim() != literal || literal.contains(['\n', '\r']) {
            return false;
        }
        match self {
            CatalogFormat::Plain => !literal.starts_with('#'),
            CatalogFormat::QuotedArray { .. } => !literal.contains(['"', '\\']),
        }
    }

    /// The layout of the normalizer's `ALL_CREDENTIALS` array
    pub fn typescript_const_array() -> Self {
        CatalogFormat::QuotedArray {
            start_marker: "export const ALL_CREDENTIALS = [".to_string(),
            end_marker: "] as const;".to_string(),
        }
    }
}

// ============================================================================
// CATALOG FILE
// ============================================================================

#[derive(Debug, Clone)]
pub struct CatalogFile {
    format: CatalogFormat,
    preamble: Vec<String>,
    literals: Vec<String>,
    epilogue: Vec<String>,
}

impl CatalogFile {
    /// Read a catalog file
    pub fn load(path: &Path, format: &CatalogFormat) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file: {:?}", path))?;

        let file = Self::parse(&content, format).map_err(|e| e.at(path))?;
        info!("Loaded {} credentials from {:?}", file.literals.len(), path);
        Ok(file)
    }

    /// Parse catalog text; used by `load` and by tests
    pub fn parse(content: &str, format: &CatalogFormat) -> Result<Self, StoreError> {
        let lines: Vec<String> = content.lines().map(str::to_string).collect();

        match format {
            CatalogFormat::Plain => Ok(Self::parse_plain(lines)),
            CatalogFormat::QuotedArray {
                start_marker,
                end_marker,
            } => Self::parse_quoted(lines, format, start_marker, end_marker),
        }
    }

    fn parse_plain(lines: Vec<String>) -> Self {
        let first = lines.iter().position(|l| is_plain_entry(l.as_str()));
        let last = lines.iter().rposition(|l| is_plain_entry(l.as_str()));

        match (first, last) {
            (Some(first), Some(last)) => CatalogFile {
                format: CatalogFormat::Plain,
                preamble: lines[..first].to_vec(),
                literals: lines[first..=last]
                    .iter()
                    .filter(|l| is_plain_entry(l.as_str()))
                    .map(|l| l.trim().to_string())
                    .collect(),
                epilogue: lines[last + 1..].to_vec(),
            },
            _ => CatalogFile {
                format: CatalogFormat::Plain,
                preamble: lines,
                literals: Vec::new(),
                epilogue: Vec::new(),
            },
        }
    }

    fn parse_quoted(
        lines: Vec<String>,
        format: &CatalogFormat,
        start_marker: &str,
        end_marker: &str,
    ) -> Result<Self, StoreError> {
        let start = lines
            .iter()
            .position(|l| l.contains(start_marker))
            .ok_or_else(|| StoreError::MarkerNotFound {
                marker: start_marker.to_string(),
                path: PathBuf::new(),
            })?;
        let end = lines[start + 1..]
            .iter()
            .position(|l| l.contains(end_marker))
            .map(|offset| start + 1 + offset)
            .ok_or_else(|| StoreError::MarkerNotFound {
                marker: end_marker.to_string(),
                path: PathBuf::new(),
            })?;

        let literals = lines[start + 1..end]
            .iter()
            .filter_map(|l| quoted_literal(l))
            .map(str::to_string)
            .collect();

        Ok(CatalogFile {
            format: format.clone(),
            preamble: lines[..=start].to_vec(),
            literals,
            epilogue: lines[end..].to_vec(),
        })
    }

    pub fn catalog(&self) -> Catalog {
        Catalog::from_literals(self.literals.iter().cloned())
    }

    pub fn literals(&self) -> &[String] {
        &self.literals
    }

    /// Replace the catalog region with the given catalog.
    /// Fails, leaving the file untouched, if a literal would not load back.
    pub fn replace(&mut self, catalog: &Catalog) -> Result<(), StoreError> {
        let literals = catalog.literals();
        if let Some(bad) = literals.iter().find(|lit| !self.format.can_store(lit)) {
            return Err(StoreError::InvalidLiteral {
                literal: bad.to_string(),
                format: self.format.name(),
            });
        }
        self.literals = literals.into_iter().map(str::to_string).collect();
        Ok(())
    }

    /// Full file text with the current catalog region
    pub fn render(&self) -> String {
        let region = self.literals.iter().map(|lit| match self.format {
            CatalogFormat::Plain => lit.clone(),
            CatalogFormat::QuotedArray { .. } => format!("  \"{}\",", lit),
        });

        let mut out: Vec<String> = self.preamble.clone();
        out.extend(region);
        out.extend(self.epilogue.iter().cloned());

        if out.is_empty() {
            return String::new();
        }
        let mut text = out.join("\n");
        text.push('\n');
        text
    }

    /// Overwrite the file with the rendered catalog
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.render())
            .with_context(|| format!("Failed to write catalog file: {:?}", path))?;
        info!("Wrote {} credentials to {:?}", self.literals.len(), path);
        Ok(())
    }
}

fn is_plain_entry(line: &str) -> bool {
    let t = line.trim();
    !t.is_empty() && !t.starts_with('#')
}

/// `  "Ed.D.",` -> `Ed.D.`
fn quoted_literal(line: &str) -> Option<&str> {
    let t = line.trim();
    let t = t.strip_suffix(',').unwrap_or(t).trim_end();
    let inner = t.strip_prefix('"')?.strip_suffix('"')?;
    if inner.is_empty() || inner.contains('"') {
        None
    } else {
        Some(inner)
    }
}

/// Read operator-supplied candidates: one per line, blanks and `#` comments skipped
pub fn load_candidates(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read candidates file: {:?}", path))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const TS_SOURCE: &str = "\
// credentials used by the normalizer
export const ALL_CREDENTIALS = [
  \"PhD\",
  \"CPA\",
  \"M.D.\",
] as const;

export type Credential = typeof ALL_CREDENTIALS[number];
";

    #[test]
    fn test_quoted_array_round_trip_preserves_surroundings() {
        let file = CatalogFile::parse(TS_SOURCE, &CatalogFormat::typescript_const_array()).unwrap();

        assert_eq!(file.literals(), &["PhD", "CPA", "M.D."]);
        assert_eq!(file.render(), TS_SOURCE);
    }

    #[test]
    fn test_quoted_array_replace_region() {
        let mut file =
            CatalogFile::parse(TS_SOURCE, &CatalogFormat::typescript_const_array()).unwrap();

        let outcome = file.catalog().merge(["MBA"]);
        file.replace(&outcome.catalog).unwrap();
        let text = file.render();

        assert!(text.starts_with("// credentials used by the normalizer\nexport const ALL_CREDENTIALS = [\n  \"CPA\",\n  \"MBA\",\n  \"M.D.\",\n  \"PhD\",\n] as const;\n"));
        assert!(text.ends_with("export type Credential = typeof ALL_CREDENTIALS[number];\n"));
    }

    #[test]
    fn test_quoted_array_rejects_embedded_quote() {
        let mut file =
            CatalogFile::parse(TS_SOURCE, &CatalogFormat::typescript_const_array()).unwrap();

        let outcome = file.catalog().merge(["A\"B"]);
        assert_eq!(outcome.added, vec!["A\"B"]);

        let err = file.replace(&outcome.catalog).unwrap_err();
        assert!(matches!(err, StoreError::InvalidLiteral { ref literal, .. } if literal == "A\"B"));

        // Region is left as loaded, so nothing is lost on the next read
        assert_eq!(file.render(), TS_SOURCE);
        let reloaded =
            CatalogFile::parse(&file.render(), &CatalogFormat::typescript_const_array()).unwrap();
        assert_eq!(reloaded.literals(), &["PhD", "CPA", "M.D."]);
    }

    #[test]
    fn test_stored_literals_load_back() {
        let mut file =
            CatalogFile::parse(TS_SOURCE, &CatalogFormat::typescript_const_array()).unwrap();

        let outcome = file.catalog().merge(["PMI-ACP", "Ed.D."]);
        file.replace(&outcome.catalog).unwrap();

        let reloaded =
            CatalogFile::parse(&file.render(), &CatalogFormat::typescript_const_array()).unwrap();
        assert_eq!(reloaded.catalog(), outcome.catalog);
    }

    #[test]
    fn test_can_store() {
        let ts = CatalogFormat::typescript_const_array();
        assert!(ts.can_store("Ed.D."));
        assert!(!ts.can_store("A\"B"));
        assert!(!ts.can_store("A\\B"));
        assert!(ts.can_store("# odd"));

        assert!(CatalogFormat::Plain.can_store("A\"B"));
        assert!(!CatalogFormat::Plain.can_store("#MD"));
        assert!(!CatalogFormat::Plain.can_store("M\nD"));
    }

    #[test]
    fn test_missing_marker() {
        let err = CatalogFile::parse("const X = [];\n", &CatalogFormat::typescript_const_array())
            .unwrap_err();
        let err = err.at(Path::new("creds.ts"));

        assert!(err.to_string().contains("ALL_CREDENTIALS"));
        assert!(err.to_string().contains("creds.ts"));
    }

    #[test]
    fn test_plain_keeps_header_and_footer() {
        let text = "# known credentials\n\nRN\nMD\n\n# end\n";
        let mut file = CatalogFile::parse(text, &CatalogFormat::Plain).unwrap();

        assert_eq!(file.literals(), &["RN", "MD"]);

        let outcome = file.catalog().merge(["CPA"]);
        file.replace(&outcome.catalog).unwrap();
        assert_eq!(file.render(), "# known credentials\n\nCPA\nMD\nRN\n\n# end\n");
    }

    #[test]
    fn test_plain_without_entries() {
        let file = CatalogFile::parse("# nothing yet\n", &CatalogFormat::Plain).unwrap();

        assert!(file.literals().is_empty());
        assert_eq!(file.render(), "# nothing yet\n");
    }

    #[test]
    fn test_quoted_literal() {
        assert_eq!(quoted_literal("  \"Ed.D.\","), Some("Ed.D."));
        assert_eq!(quoted_literal("\"MD\""), Some("MD"));
        assert_eq!(quoted_literal("  // comment"), None);
        assert_eq!(quoted_literal("  \"\","), None);
    }

    #[test]
    fn test_load_save_and_candidates() {
        let dir = tempfile::tempdir().unwrap();
        let catalog_path = dir.path().join("credentials.txt");
        let candidates_path = dir.path().join("candidates.txt");
        fs::write(&catalog_path, "MD\nRN\n").unwrap();
        fs::write(&candidates_path, "# filtered\nMBA\n\n  M.D.  \n").unwrap();

        let mut file = CatalogFile::load(&catalog_path, &CatalogFormat::Plain).unwrap();
        let candidates = load_candidates(&candidates_path).unwrap();
        assert_eq!(candidates, vec!["MBA", "M.D."]);

        let outcome = file.catalog().merge(&candidates);
        assert_eq!(outcome.added, vec!["MBA"]);

        file.replace(&outcome.catalog).unwrap();
        file.save(&catalog_path).unwrap();
        assert_eq!(fs::read_to_string(&catalog_path).unwrap(), "MBA\nMD\nRN\n");
    }

    #[test]
    fn test_format_from_json() {
        let format: CatalogFormat = serde_json::from_str(
            r#"{ "kind": "quoted_array", "start_marker": "[", "end_marker": "]" }"#,
        )
        .unwrap();
        assert!(matches!(format, CatalogFormat::QuotedArray { .. }));

        let plain: CatalogFormat = serde_json::from_str(r#"{ "kind": "plain" }"#).unwrap();
        assert_eq!(plain, CatalogFormat::Plain);
    }
}
