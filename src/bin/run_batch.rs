//! Roll up one incentive batch and write every report as CSV
//!
//! Each report becomes a folder holding its metadata sheet and one CSV per
//! summary/detail tab. Coverage results are written next to them.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use incentive_rollup::coverage::{ContactDirectory, CoverageReport};
use incentive_rollup::report::{MetadataRow, ReportTab};
use incentive_rollup::{EngineConfig, Ledger, RollupEngine, TabScope, Table};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "run_batch")]
#[command(about = "Build manager rollup reports for one incentive batch", long_about = None)]
struct Args {
    /// Incentive ledger export
    #[arg(long)]
    ledger: PathBuf,

    /// Organizational hierarchy export
    #[arg(long)]
    hierarchy: PathBuf,

    /// Contact directory export; coverage is skipped without it
    #[arg(long)]
    directory: Option<PathBuf>,

    /// Newer directory export merged into --directory before coverage
    #[arg(long, requires = "directory")]
    directory_update: Option<PathBuf>,

    /// JSON engine configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Batch year, overrides the configuration
    #[arg(long)]
    year: Option<String>,

    /// Batch label ("Paid On Batch"), overrides the configuration
    #[arg(long)]
    batch: Option<String>,

    /// Group sub-level tabs by the whole downstream team
    #[arg(long, default_value_t = false)]
    team_scope: bool,

    #[arg(long, default_value = "rollup_output")]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let start = Instant::now();

    let mut config = match &args.config {
        Some(path) => EngineConfig::from_json_path(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(year) = &args.year {
        config.selection.year = year.clone();
    }
    if let Some(batch) = &args.batch {
        config.selection.batch_label = batch.clone();
    }
    if args.team_scope {
        config.tab_scope = TabScope::Team;
    }

    let hierarchy = Table::from_csv_path(&args.hierarchy)
        .with_context(|| format!("reading hierarchy {}", args.hierarchy.display()))?;
    let engine = RollupEngine::new(&hierarchy, config)?;
    println!(
        "Hierarchy: {} rows kept, {} dropped",
        engine.index().records().len(),
        engine.index().dropped().total()
    );

    let ledger = Ledger::from_csv_path(&args.ledger)
        .with_context(|| format!("reading ledger {}", args.ledger.display()))?;
    println!("Ledger: {} records", ledger.len());

    let directory = match &args.directory {
        Some(path) => Some(load_directory(path, args.directory_update.as_deref())?),
        None => None,
    };

    let output = engine.run(&ledger, directory.as_ref(), Utc::now())?;
    let selection = &engine.config().selection;
    if output.batch.is_empty() {
        for line in output.summary_lines() {
            println!("{}", line);
        }
        return Ok(());
    }

    let out_dir = args.output.join(format!(
        "{}_{}",
        selection.year_prefix(),
        incentive_rollup::report::naming::sanitize_component(&selection.batch_label)
    ));
    fs::create_dir_all(&out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    for report in &output.reports.manager_reports {
        let dir = out_dir.join(report.file_stem());
        write_report(&dir, &report.metadata(), &report.tabs())?;
    }
    if let Some(master) = &output.reports.master {
        write_report(&out_dir.join(master.file_stem()), &master.metadata(), &master.tabs())?;
    }

    write_rows(
        &out_dir.join("hierarchy_coverage.csv"),
        &["SalesPersonID", "In Hierarchy"],
        output
            .hierarchy_coverage
            .matched
            .iter()
            .map(|id| vec![id.clone(), "yes".into()])
            .chain(
                output
                    .hierarchy_coverage
                    .unmatched
                    .iter()
                    .map(|id| vec![id.clone(), "no".into()]),
            ),
    )?;
    if let Some(coverage) = &output.representative_coverage {
        write_coverage(&out_dir.join("rep_email_coverage.csv"), coverage)?;
    }
    if let Some(coverage) = &output.manager_coverage {
        write_coverage(&out_dir.join("manager_email_coverage.csv"), coverage)?;
    }

    println!();
    for line in output.summary_lines() {
        println!("{}", line);
    }

    println!("\nOutput written to {}", out_dir.display());
    println!("Total time: {:?}", start.elapsed());
    Ok(())
}

fn load_directory(path: &Path, update: Option<&Path>) -> Result<ContactDirectory> {
    let mut directory = ContactDirectory::from_csv_path(path)
        .with_context(|| format!("reading directory {}", path.display()))?;
    if let Some(update) = update {
        let newer = ContactDirectory::from_csv_path(update)
            .with_context(|| format!("reading directory update {}", update.display()))?;
        let added = directory.merge(newer);
        println!("Directory sync: {} new ids", added);
    }
    Ok(directory)
}

fn write_report(dir: &Path, metadata: &[MetadataRow], tabs: &[ReportTab]) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    write_rows(
        &dir.join("Summary.csv"),
        &["Metric", "Value"],
        metadata.iter().map(|(k, v)| vec![k.to_string(), v.clone()]),
    )?;
    for tab in tabs {
        let headers: Vec<&str> = tab.headers.iter().map(|h| h.as_str()).collect();
        write_rows(
            &dir.join(format!("{}.csv", tab.title)),
            &headers,
            tab.rows.iter().cloned(),
        )?;
    }
    Ok(())
}

fn write_coverage(path: &Path, coverage: &CoverageReport) -> Result<()> {
    write_rows(
        path,
        &["ID", "Name", "Level", "File", "Status", "Email", "Reason"],
        coverage.results.iter().map(|r| {
            vec![
                r.target.id.clone(),
                r.target.name.clone(),
                r.target.level.map(|l| l.code().to_string()).unwrap_or_default(),
                r.target.file_stem.clone(),
                format!("{:?}", r.status),
                r.email.clone().unwrap_or_default(),
                r.status.reason().unwrap_or_default().to_string(),
            ]
        }),
    )
}

fn write_rows(path: &Path, headers: &[&str], rows: impl Iterator<Item = Vec<String>>) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}
