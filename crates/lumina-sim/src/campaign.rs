//! Campaign runner: many seeds, one verdict per seed.
//!
//! Runs the simulation across a seed range, collects failures, and names
//! the first failing seed so it can be replayed in isolation.

use std::ops::Range;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::network::FaultConfig;
use crate::sim::{SimulationConfig, Simulator};

/// Campaign-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignConfig {
    /// Seeds to execute, e.g. `0..50`.
    pub seed_range: Range<u64>,
    /// Clients per seed.
    pub client_count: usize,
    /// Active rounds per seed.
    pub rounds: u64,
    /// Event delivery delay bound in rounds.
    pub fault_max_delay: u64,
    /// Event duplication rate (percent).
    pub fault_duplicate_percent: u8,
    /// Per-round channel drop rate (percent).
    pub fault_disconnect_percent: u8,
    /// Rounds a dropped channel stays down.
    pub fault_reconnect_after: u64,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            seed_range: 0..50,
            client_count: 4,
            rounds: 60,
            fault_max_delay: 3,
            fault_duplicate_percent: 10,
            fault_disconnect_percent: 5,
            fault_reconnect_after: 4,
        }
    }
}

impl CampaignConfig {
    /// Build the per-seed simulation config.
    #[must_use]
    pub const fn sim_config_for_seed(&self, seed: u64) -> SimulationConfig {
        SimulationConfig {
            seed,
            client_count: self.client_count,
            rounds: self.rounds,
            faults: FaultConfig {
                max_delay_rounds: self.fault_max_delay,
                duplicate_rate_percent: self.fault_duplicate_percent,
                disconnect_rate_percent: self.fault_disconnect_percent,
                reconnect_after_rounds: self.fault_reconnect_after,
            },
            max_drain_rounds: 200,
        }
    }

    /// Validate before running.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty seed range or zero clients/rounds.
    pub fn validate(&self) -> Result<()> {
        if self.seed_range.is_empty() {
            bail!("seed_range must not be empty");
        }
        if self.client_count == 0 {
            bail!("client_count must be > 0");
        }
        if self.rounds == 0 {
            bail!("rounds must be > 0");
        }
        Ok(())
    }
}

/// One failed seed with its divergence details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedFailure {
    /// The failing seed, for replay.
    pub seed: u64,
    /// Divergences the oracle found.
    pub details: Vec<String>,
}

/// Aggregate outcome of a campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignReport {
    /// Seeds executed.
    pub seeds_run: usize,
    /// Seeds whose clients converged.
    pub seeds_passed: usize,
    /// First failing seed, for prioritized replay.
    pub first_failure: Option<u64>,
    /// Every failure with details.
    pub failures: Vec<SeedFailure>,
}

impl CampaignReport {
    /// True when every seed converged.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Run every seed in the campaign.
///
/// # Errors
///
/// Returns an error on invalid configuration or when a run cannot finish
/// (for example a network that never quiesces).
pub fn run_campaign(config: &CampaignConfig) -> Result<CampaignReport> {
    config.validate()?;

    let mut seeds_run = 0;
    let mut seeds_passed = 0;
    let mut first_failure = None;
    let mut failures = Vec::new();

    for seed in config.seed_range.clone() {
        seeds_run += 1;
        let mut simulator = Simulator::new(config.sim_config_for_seed(seed))?;
        let result = simulator.run()?;
        if result.convergence.converged {
            seeds_passed += 1;
        } else {
            warn!(seed, "seed diverged");
            if first_failure.is_none() {
                first_failure = Some(seed);
            }
            failures.push(SeedFailure {
                seed,
                details: result
                    .convergence
                    .mismatches
                    .iter()
                    .map(|m| format!("{}: {} ({})", m.client_id, m.task_id, m.detail))
                    .collect(),
            });
        }
    }

    info!(seeds_run, seeds_passed, "campaign complete");
    Ok(CampaignReport {
        seeds_run,
        seeds_passed,
        first_failure,
        failures,
    })
}
