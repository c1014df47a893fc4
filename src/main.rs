use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use name_audit::{
    load_aligned, load_candidates, load_output_only, render_json, render_merge, render_missing,
    render_text, AuditConfig, Auditor, CatalogFile,
};

/// Audit a name normalizer's output and curate its credential catalog
#[derive(Parser, Debug)]
#[command(name = "name-audit", version)]
struct Cli {
    /// JSON config file (columns, catalog format, rules, report sizes)
    #[arg(long, global = true, env = "NAME_AUDIT_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Report every parsing failure in the normalizer's output
    Failures {
        /// Normalizer output CSV (First Name / Last Name)
        output: PathBuf,

        /// Source CSV holding the original names, aligned row by row
        #[arg(long)]
        source: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Also write the full report (every failing row) to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// List credentials left in last names that the catalog does not know
    Credentials {
        /// Source CSV holding the original names
        source: PathBuf,

        /// Normalizer output CSV
        output: PathBuf,

        /// Catalog file to check against
        #[arg(long)]
        catalog: PathBuf,

        /// Write the missing credentials, one per line, for `merge`
        #[arg(long)]
        candidates_out: Option<PathBuf>,
    },

    /// Merge a candidates file into the catalog and write it back
    Merge {
        /// Catalog file to update in place
        #[arg(long)]
        catalog: PathBuf,

        /// Candidate literals, one per line (# comments allowed)
        #[arg(long)]
        candidates: PathBuf,

        /// Show the result without writing the catalog
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = AuditConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Failures {
            output,
            source,
            json,
            report,
        } => run_failures(&config, &output, source.as_deref(), json, report.as_deref()),
        Commands::Credentials {
            source,
            output,
            catalog,
            candidates_out,
        } => run_credentials(&config, &source, &output, &catalog, candidates_out.as_deref()),
        Commands::Merge {
            catalog,
            candidates,
            dry_run,
        } => run_merge(&config, &catalog, &candidates, dry_run),
    }
}

fn run_failures(
    config: &AuditConfig,
    output: &Path,
    source: Option<&Path>,
    json: bool,
    report_path: Option<&Path>,
) -> Result<()> {
    let rows = match source {
        Some(source) => load_aligned(source, output, &config.columns)?,
        None => load_output_only(output, &config.columns)?,
    };

    let auditor = Auditor::new(&config.rules()?)?;
    let report = auditor.audit(&rows);

    if json {
        println!("{}", render_json(&report)?);
    } else {
        println!("{}", render_text(&report, &config.report_options()));
    }

    if let Some(path) = report_path {
        let mut options = config.report_options();
        options.sample_limit = report.failures.len();
        fs::write(path, render_text(&report, &options))
            .with_context(|| format!("Failed to write report: {:?}", path))?;
        println!("📄 Full report saved to: {}", path.display());
    }

    Ok(())
}

fn run_credentials(
    config: &AuditConfig,
    source: &Path,
    output: &Path,
    catalog_path: &Path,
    candidates_out: Option<&Path>,
) -> Result<()> {
    let catalog = CatalogFile::load(catalog_path, &config.catalog_format)?.catalog();
    println!("✅ Loaded {} existing credentials", catalog.len());

    let rows = load_aligned(source, output, &config.columns)?;
    let auditor = Auditor::new(&config.rules()?)?;
    let report = auditor.audit(&rows);

    let missing = report.missing_credentials(&catalog);
    println!("✅ Found {} unique missing credentials\n", missing.len());
    print!("{}", render_missing(&missing));

    if let Some(path) = candidates_out {
        let mut text: String = missing.iter().map(|m| format!("{}\n", m.token)).collect();
        if text.is_empty() {
            text.push_str("# no missing credentials\n");
        }
        fs::write(path, text).with_context(|| format!("Failed to write candidates: {:?}", path))?;
        println!("📄 Candidates written to: {}", path.display());
    }

    Ok(())
}

fn run_merge(config: &AuditConfig, catalog_path: &Path, candidates_path: &Path, dry_run: bool) -> Result<()> {
    let candidates = load_candidates(candidates_path)?;
    println!("✅ Loaded {} credentials to add", candidates.len());

    let mut file = CatalogFile::load(catalog_path, &config.catalog_format)?;
    let catalog = file.catalog();
    println!("✅ Found {} existing credentials\n", catalog.len());

    let outcome = catalog.merge(&candidates);
    print!("{}", render_merge(catalog.len(), &outcome));

    if outcome.catalog == catalog {
        println!("🎉 All credentials already exist! Nothing to add.");
        return Ok(());
    }

    if dry_run {
        info!("Dry run: {:?} left unchanged", catalog_path);
        println!("(dry run, catalog not written)");
        return Ok(());
    }

    file.replace(&outcome.catalog)
        .with_context(|| format!("Cannot write merged catalog to {:?}", catalog_path))?;
    file.save(catalog_path)?;
    println!("✅ Successfully updated {}", catalog_path.display());

    Ok(())
}
