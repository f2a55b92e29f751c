//! A simulated participant: a real `SyncClient` wired to the simulated
//! network, plus a random action policy.

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use lumina_core::config::SyncConfig;
use lumina_core::model::{Priority, TaskStatus, User};
use lumina_core::store::AppState;
use lumina_core::sync::{
    BoardSnapshot, ChannelPoll, ConnectionState, NewTask, PumpReport, SyncClient, Transport,
};

use crate::network::SimulatedNetwork;
use crate::rng::SimRng;
use crate::server::SimServer;
use crate::sim::round_timestamp;

/// Transport backed by the shared simulated network and server.
///
/// Channel traffic goes through [`SimulatedNetwork`] and is subject to its
/// faults; `fetch_board` models the REST path and reads the server
/// directly, so hydration and resync always see current canonical state.
#[derive(Debug)]
pub struct QueueTransport {
    client_id: String,
    server: Rc<RefCell<SimServer>>,
    network: Rc<RefCell<SimulatedNetwork>>,
}

impl QueueTransport {
    #[must_use]
    pub fn new(
        client_id: &str,
        server: Rc<RefCell<SimServer>>,
        network: Rc<RefCell<SimulatedNetwork>>,
    ) -> Self {
        network.borrow_mut().register(client_id);
        Self {
            client_id: client_id.to_string(),
            server,
            network,
        }
    }
}

impl Transport for QueueTransport {
    type Error = Infallible;

    fn join_room(&mut self, room: &str) -> Result<(), Infallible> {
        self.network.borrow_mut().join_room(&self.client_id, room);
        Ok(())
    }

    fn leave_room(&mut self, room: &str) -> Result<(), Infallible> {
        self.network.borrow_mut().leave_room(&self.client_id, room);
        Ok(())
    }

    fn send(&mut self, request: lumina_core::event::ClientRequest) -> Result<(), Infallible> {
        self.network.borrow_mut().submit(request);
        Ok(())
    }

    fn poll(&mut self) -> Result<ChannelPoll, Infallible> {
        Ok(self.network.borrow_mut().poll(&self.client_id))
    }

    fn fetch_board(&mut self, project_id: &str) -> Result<BoardSnapshot, Infallible> {
        Ok(BoardSnapshot {
            tasks: self.server.borrow().board(project_id),
        })
    }
}

/// One simulated user at their keyboard.
#[derive(Debug)]
pub struct SimClient {
    inner: SyncClient<QueueTransport>,
    user_id: String,
    project_id: String,
    member_pool: Vec<String>,
}

impl SimClient {
    /// Wire up a participant and focus them on the shared project.
    ///
    /// # Errors
    ///
    /// Fails when the project is unknown to the server.
    pub fn new(
        user: User,
        project_id: &str,
        server: &Rc<RefCell<SimServer>>,
        network: &Rc<RefCell<SimulatedNetwork>>,
    ) -> anyhow::Result<Self> {
        let user_id = user.id.clone();
        let transport = QueueTransport::new(&user_id, Rc::clone(server), Rc::clone(network));
        let mut inner = SyncClient::new(transport, SyncConfig::default(), user);

        let projects = server.borrow().projects();
        let member_pool = projects
            .iter()
            .find(|p| p.id == project_id)
            .map(|p| {
                let mut pool = p.members.clone();
                pool.push(p.owner_id.clone());
                pool
            })
            .unwrap_or_default();

        inner.hydrate_projects(projects);
        inner
            .activate_project(project_id)
            .map_err(|err| anyhow::anyhow!("activating '{project_id}': {err}"))?;

        Ok(Self {
            inner,
            user_id,
            project_id: project_id.to_string(),
            member_pool,
        })
    }

    /// The participant's user id (also their client id on the network).
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The held store snapshot.
    #[must_use]
    pub fn state(&self) -> &AppState {
        self.inner.state()
    }

    /// Current connection state.
    #[must_use]
    pub fn connection(&self) -> ConnectionState {
        self.inner.connection()
    }

    /// Drain the channel and reconcile. `Infallible` transport means pump
    /// itself cannot fail here.
    pub fn pump(&mut self) -> PumpReport {
        match self.inner.pump() {
            Ok(report) => {
                if report.events_applied > 0 || report.resynced {
                    trace!(
                        client = %self.user_id,
                        applied = report.events_applied,
                        resynced = report.resynced,
                        "pumped"
                    );
                }
                report
            }
            Err(err) => {
                debug!(client = %self.user_id, error = %err, "pump error");
                PumpReport::default()
            }
        }
    }

    /// Retry a failed resync, as the user would from the stale banner.
    pub fn retry_resync(&mut self) -> bool {
        self.inner.retry_resync()
    }

    /// Take one random action against the board. Locally rejected intents
    /// are fine; they model user attempts the UI would refuse.
    pub fn act(&mut self, rng: &mut SimRng, round: u64) {
        let at = round_timestamp(round);
        let roll = rng.below(100);
        let outcome = if roll < 20 {
            self.random_create(rng, at)
        } else if roll < 50 {
            self.random_move(rng)
        } else if roll < 65 {
            self.random_reassign(rng)
        } else if roll < 75 {
            self.random_priority(rng)
        } else if roll < 90 {
            self.random_comment(rng, at)
        } else {
            // Idle round: the user is just looking at the board.
            Ok(())
        };
        if let Err(reason) = outcome {
            debug!(client = %self.user_id, round, %reason, "action rejected");
        }
    }

    fn random_create(&mut self, rng: &mut SimRng, at: DateTime<Utc>) -> Result<(), String> {
        let priority = Priority::ALL[rng.index(Priority::ALL.len())];
        let assignee = self.random_assignee(rng);
        let intent = NewTask {
            title: format!("Task by {} at round {}", self.user_id, at.timestamp()),
            description: String::new(),
            priority: Some(priority),
            assignee_id: assignee,
            due_date: None,
            labels: vec![],
        };
        self.inner
            .create_task(intent, at)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    fn random_move(&mut self, rng: &mut SimRng) -> Result<(), String> {
        let Some(task_id) = self.random_task(rng) else {
            return Ok(());
        };
        let status = TaskStatus::ALL[rng.index(TaskStatus::ALL.len())];
        self.inner
            .move_task(&task_id, status)
            .map_err(|e| e.to_string())
    }

    fn random_reassign(&mut self, rng: &mut SimRng) -> Result<(), String> {
        let Some(task_id) = self.random_task(rng) else {
            return Ok(());
        };
        let assignee = self.random_assignee(rng);
        self.inner
            .reassign_task(&task_id, assignee.as_deref())
            .map_err(|e| e.to_string())
    }

    fn random_priority(&mut self, rng: &mut SimRng) -> Result<(), String> {
        let Some(task_id) = self.random_task(rng) else {
            return Ok(());
        };
        let priority = Priority::ALL[rng.index(Priority::ALL.len())];
        self.inner
            .set_priority(&task_id, priority)
            .map_err(|e| e.to_string())
    }

    fn random_comment(&mut self, rng: &mut SimRng, at: DateTime<Utc>) -> Result<(), String> {
        let Some(task_id) = self.random_task(rng) else {
            return Ok(());
        };
        self.inner
            .comment(&task_id, "looks good, one more pass", at)
            .map_err(|e| e.to_string())
    }

    fn random_task(&self, rng: &mut SimRng) -> Option<String> {
        let tasks = &self.inner.state().tasks;
        if tasks.is_empty() {
            return None;
        }
        Some(tasks[rng.index(tasks.len())].id.clone())
    }

    fn random_assignee(&self, rng: &mut SimRng) -> Option<String> {
        if self.member_pool.is_empty() || rng.chance(30) {
            return None;
        }
        Some(self.member_pool[rng.index(self.member_pool.len())].clone())
    }

    /// The project this participant is focused on.
    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }
}
