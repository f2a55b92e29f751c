//! The round-based simulation loop.
//!
//! One round: the network advances and rolls faults, every client takes a
//! random action, the server handles all requests due this round in arrival
//! order and routes the resulting events, then every client pumps its
//! channel. After the configured rounds the network is calmed, everything
//! in flight drains, and the oracle checks convergence.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use lumina_core::model::{Project, User};

use crate::client::SimClient;
use crate::network::{FaultConfig, SimulatedNetwork};
use crate::oracle::{OracleReport, check_convergence};
use crate::rng::SimRng;
use crate::server::{Outbound, SimServer};

/// Parameters for one simulation run.
#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    /// Seed for both the action stream and the fault stream.
    pub seed: u64,
    /// Clients collaborating on the shared project.
    pub client_count: usize,
    /// Active rounds before the drain phase.
    pub rounds: u64,
    /// Network fault mix.
    pub faults: FaultConfig,
    /// Upper bound on drain rounds before giving up on quiescence.
    pub max_drain_rounds: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            client_count: 4,
            rounds: 60,
            faults: FaultConfig::chaos(),
            max_drain_rounds: 100,
        }
    }
}

/// What one run produced.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// The seed that produced this run (replayable).
    pub seed: u64,
    /// Requests the server accepted or rejected.
    pub requests_handled: u64,
    /// Events the server emitted (broadcasts plus directs).
    pub events_emitted: u64,
    /// Convergence check outcome.
    pub convergence: OracleReport,
}

/// Owns the whole simulated world for one seed.
#[derive(Debug)]
pub struct Simulator {
    config: SimulationConfig,
    server: Rc<RefCell<SimServer>>,
    network: Rc<RefCell<SimulatedNetwork>>,
    clients: Vec<SimClient>,
    rng: SimRng,
    requests_handled: u64,
    events_emitted: u64,
}

impl Simulator {
    /// Build the world: one project, `client_count` member users, each with
    /// a live client focused on the board.
    ///
    /// # Errors
    ///
    /// Fails on a zero client count or when a client cannot activate the
    /// shared project.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        if config.client_count == 0 {
            bail!("client_count must be > 0");
        }

        let users: Vec<User> = (1..=config.client_count)
            .map(|n| User {
                id: format!("u{n}"),
                name: format!("User {n}"),
                email: format!("u{n}@studio.test"),
                avatar: String::new(),
            })
            .collect();
        let project = Project {
            id: "p1".to_string(),
            name: "Shared Board".to_string(),
            description: "Simulation board".to_string(),
            owner_id: "u1".to_string(),
            members: users.iter().skip(1).map(|u| u.id.clone()).collect(),
            created_at: DateTime::UNIX_EPOCH,
            archived: false,
        };

        let server = Rc::new(RefCell::new(SimServer::new(
            users.clone(),
            vec![project.clone()],
        )));
        // Distinct streams: fault rolls must not depend on how many random
        // numbers the action policy consumed.
        let network = Rc::new(RefCell::new(SimulatedNetwork::new(
            config.faults,
            config.seed.wrapping_add(0x9E37_79B9_7F4A_7C15),
        )));

        let mut clients = Vec::with_capacity(users.len());
        for user in users {
            let id = user.id.clone();
            let client = SimClient::new(user, &project.id, &server, &network)
                .with_context(|| format!("building client '{id}'"))?;
            clients.push(client);
        }

        Ok(Self {
            config,
            server,
            network,
            clients,
            rng: SimRng::new(config.seed),
            requests_handled: 0,
            events_emitted: 0,
        })
    }

    /// Run to completion and check convergence.
    ///
    /// # Errors
    ///
    /// Fails when the network never quiesces within the drain budget.
    pub fn run(&mut self) -> Result<SimulationResult> {
        for round in 1..=self.config.rounds {
            self.network.borrow_mut().tick();
            for client in &mut self.clients {
                client.act(&mut self.rng, round);
            }
            self.serve(round);
            for client in &mut self.clients {
                client.pump();
            }
        }

        self.drain()?;

        let convergence = check_convergence(&self.server.borrow(), &self.clients);
        info!(
            seed = self.config.seed,
            requests = self.requests_handled,
            events = self.events_emitted,
            converged = convergence.converged,
            "simulation complete"
        );

        Ok(SimulationResult {
            seed: self.config.seed,
            requests_handled: self.requests_handled,
            events_emitted: self.events_emitted,
            convergence,
        })
    }

    /// Server side of a round: handle every due request, route the events.
    fn serve(&mut self, round: u64) {
        let due = self.network.borrow_mut().take_due_requests();
        let now = round_timestamp(round);
        for request in due {
            self.requests_handled += 1;
            let outbound = self.server.borrow_mut().handle(request, now);
            self.route(outbound);
        }
    }

    fn route(&mut self, outbound: Vec<Outbound>) {
        let mut network = self.network.borrow_mut();
        for item in outbound {
            self.events_emitted += 1;
            match item {
                Outbound::Room { project_id, event } => {
                    let room = format!("project:{project_id}");
                    for member in network.room_members(&room) {
                        network.push_event(&member, &event);
                    }
                }
                Outbound::Direct { user_id, event } => {
                    network.push_event(&user_id, &event);
                }
            }
        }
    }

    /// Calm the network and keep pumping until nothing is in flight and no
    /// client is still behind.
    fn drain(&mut self) -> Result<()> {
        self.network.borrow_mut().calm();

        for extra in 1..=self.config.max_drain_rounds {
            let round = self.config.rounds + extra;
            self.network.borrow_mut().tick();
            self.serve(round);
            let mut quiet = true;
            for client in &mut self.clients {
                let report = client.pump();
                if report.events_applied > 0 || report.resynced {
                    quiet = false;
                }
            }
            // Quiesced once nothing is in flight and every client has an
            // empty backlog and a fresh store.
            if quiet && self.network.borrow().idle() {
                debug!(extra, "network quiesced");
                return Ok(());
            }
        }
        bail!(
            "network failed to quiesce within {} drain rounds",
            self.config.max_drain_rounds
        )
    }
}

/// Deterministic wall clock: one second per round.
#[must_use]
pub(crate) fn round_timestamp(round: u64) -> DateTime<Utc> {
    let secs = i64::try_from(round).unwrap_or(i64::MAX);
    DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::{SimulationConfig, Simulator, round_timestamp};
    use crate::network::FaultConfig;

    #[test]
    fn faultless_run_converges() {
        let config = SimulationConfig {
            seed: 1,
            client_count: 3,
            rounds: 30,
            faults: FaultConfig::none(),
            max_drain_rounds: 50,
        };
        let mut sim = Simulator::new(config).expect("build");
        let result = sim.run().expect("run");
        assert!(result.convergence.converged, "{:?}", result.convergence.mismatches);
        assert!(result.requests_handled > 0);
    }

    #[test]
    fn zero_clients_is_rejected() {
        let config = SimulationConfig {
            client_count: 0,
            ..SimulationConfig::default()
        };
        assert!(Simulator::new(config).is_err());
    }

    #[test]
    fn round_timestamps_are_strictly_ordered() {
        assert!(round_timestamp(1) < round_timestamp(2));
    }
}
