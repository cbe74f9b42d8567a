//! List the batches available in an incentive ledger

use anyhow::{Context, Result};
use clap::Parser;
use incentive_rollup::ledger::{available_years, batches_for_year, select_batch};
use incentive_rollup::report::format_currency;
use incentive_rollup::{BatchSelection, Ledger};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "list_batches")]
#[command(about = "Show batch years and labels in an incentive ledger", long_about = None)]
struct Args {
    #[arg(long)]
    ledger: PathBuf,

    /// Only list batches of this year
    #[arg(long)]
    year: Option<String>,

    /// Print preview figures for every batch
    #[arg(long, default_value_t = false)]
    stats: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let ledger = Ledger::from_csv_path(&args.ledger)
        .with_context(|| format!("reading ledger {}", args.ledger.display()))?;

    let years = match &args.year {
        Some(year) => vec![year.clone()],
        None => available_years(&ledger),
    };
    if years.is_empty() {
        println!("No batches found in {}", args.ledger.display());
        return Ok(());
    }

    for year in &years {
        println!("{}", year);
        for label in batches_for_year(&ledger, year) {
            let selection = BatchSelection::new(year.clone(), label.clone());
            if args.stats {
                let stats = select_batch(&ledger, &selection).stats();
                let total = stats
                    .total_payout
                    .map(format_currency)
                    .unwrap_or_else(|| "overflow".to_string());
                println!(
                    "  {:<14} {:<10} Records: {:>6} | Unique Reps: {:>5} | Total Payout: {}",
                    label,
                    selection.display_month(),
                    stats.records,
                    stats.unique_reps,
                    total
                );
            } else {
                println!("  {:<14} {}", label, selection.display_month());
            }
        }
    }
    Ok(())
}
