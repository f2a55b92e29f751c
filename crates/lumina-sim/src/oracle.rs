//! Convergence checking after quiescence.
//!
//! Once the network is drained, every client's held task set must equal the
//! server's canonical board. Notifications are excluded: resync refetches
//! tasks only, so a tray may legitimately have missed deliveries lost to a
//! downed link.

use tracing::error;

use lumina_core::model::Task;

use crate::client::SimClient;
use crate::server::SimServer;

/// One divergence between a client and canonical state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// The diverged client.
    pub client_id: String,
    /// The task in question.
    pub task_id: String,
    /// Human-readable description of the divergence.
    pub detail: String,
}

/// Outcome of a convergence check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleReport {
    /// True when every client matches the canonical board.
    pub converged: bool,
    /// Every divergence found, for failure diagnosis.
    pub mismatches: Vec<Mismatch>,
}

/// Compare each client's board to the server's canonical tasks.
#[must_use]
pub fn check_convergence(server: &SimServer, clients: &[SimClient]) -> OracleReport {
    let mut mismatches = Vec::new();

    for client in clients {
        let canonical: Vec<&Task> = server
            .tasks()
            .iter()
            .filter(|t| t.project_id == client.project_id())
            .collect();
        let held = &client.state().tasks;

        for want in &canonical {
            match held.iter().find(|t| t.id == want.id) {
                None => mismatches.push(Mismatch {
                    client_id: client.user_id().to_string(),
                    task_id: want.id.clone(),
                    detail: "task missing from client board".to_string(),
                }),
                Some(have) if have != *want => mismatches.push(Mismatch {
                    client_id: client.user_id().to_string(),
                    task_id: want.id.clone(),
                    detail: format!(
                        "held {:?}/{} differs from canonical {:?}/{}",
                        have.status, have.version, want.status, want.version
                    ),
                }),
                Some(_) => {}
            }
        }

        for have in held {
            if !canonical.iter().any(|t| t.id == have.id) {
                mismatches.push(Mismatch {
                    client_id: client.user_id().to_string(),
                    task_id: have.id.clone(),
                    detail: "client holds a task the server never accepted".to_string(),
                });
            }
        }
    }

    for mismatch in &mismatches {
        error!(
            client = %mismatch.client_id,
            task = %mismatch.task_id,
            detail = %mismatch.detail,
            "divergence"
        );
    }

    OracleReport {
        converged: mismatches.is_empty(),
        mismatches,
    }
}

#[cfg(test)]
mod tests {
    use super::check_convergence;
    use crate::server::SimServer;

    #[test]
    fn empty_world_is_converged() {
        let server = SimServer::new(vec![], vec![]);
        let report = check_convergence(&server, &[]);
        assert!(report.converged);
        assert!(report.mismatches.is_empty());
    }
}
