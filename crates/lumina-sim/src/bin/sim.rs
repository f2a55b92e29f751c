#![forbid(unsafe_code)]

use anyhow::{Result, bail};
use lumina_sim::{CampaignConfig, run_campaign};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = CampaignConfig::default();
    let report = run_campaign(&config)?;

    println!(
        "campaign complete: seeds_run={} seeds_passed={} first_failure={:?}",
        report.seeds_run, report.seeds_passed, report.first_failure
    );

    if !report.all_passed() {
        for failure in &report.failures {
            eprintln!("seed {} diverged:", failure.seed);
            for detail in &failure.details {
                eprintln!("  {detail}");
            }
        }
        bail!("{} seed(s) diverged", report.failures.len());
    }
    Ok(())
}
