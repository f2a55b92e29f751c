//! The client store: single source of truth, mutated only through
//! [`reduce`].
//!
//! Every component reads from [`AppState`] and dispatches [`Action`]s;
//! nothing writes entity fields directly. `reduce` is a pure function
//! `(state, action) -> state`: it never observes wall-clock time or network
//! order beyond the versions carried in the action payloads, which is what
//! makes replay and multi-client convergence testable.
//!
//! Two reducer rules carry the correctness weight under concurrent edits:
//!
//! - `AddTask` is idempotent by id, because the same creation may arrive
//!   twice (local optimistic echo plus server broadcast).
//! - `UpdateTask` discards snapshots whose version does not supersede the
//!   held one (stale-write rejection). Discards are logged at debug and are
//!   otherwise silent.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Notification, Project, Task, User};

/// The whole client-visible state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    /// The signed-in user, if any.
    pub user: Option<User>,
    /// All projects visible to the user.
    pub projects: Vec<Project>,
    /// All known tasks across projects.
    pub tasks: Vec<Task>,
    /// Notification tray, in arrival order. Never deduplicated by content.
    pub notifications: Vec<Notification>,
    /// Which project's board is rendered. Pure UI focus.
    pub active_project_id: Option<String>,
    /// Hydration flag for the initial load.
    pub is_loading: bool,
}

impl AppState {
    /// Look up a task by id.
    #[must_use]
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Look up a project by id.
    #[must_use]
    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Tasks of the active project, in insertion order.
    #[must_use]
    pub fn active_tasks(&self) -> Vec<&Task> {
        match self.active_project_id.as_deref() {
            Some(active) => self.tasks.iter().filter(|t| t.project_id == active).collect(),
            None => vec![],
        }
    }
}

/// The enumerated set of state transitions. There is no other way to change
/// the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Replace the signed-in user (initial hydration / sign-out).
    SetUser(Option<User>),
    /// Full-replace the project list (initial hydration).
    SetProjects(Vec<Project>),
    /// Full-replace the task list (initial hydration and full resync).
    SetTasks(Vec<Task>),
    /// Append a task; no-op if a task with the same id is already held.
    AddTask(Task),
    /// Replace the task with a matching id iff the incoming version
    /// supersedes the held one; otherwise a logged no-op.
    UpdateTask(Task),
    /// Change which board is rendered. No effect on entity state.
    SetActiveProject(Option<String>),
    /// Toggle the hydration flag.
    SetLoading(bool),
    /// Append to the notification tray, in arrival order.
    AddNotification(Notification),
    /// Mark one notification read. Recipient-only by construction: the tray
    /// only ever holds the current user's notifications.
    MarkNotificationRead(String),
}

/// Apply one action to the state, producing the next state.
#[must_use]
pub fn reduce(state: &AppState, action: Action) -> AppState {
    let mut next = state.clone();
    match action {
        Action::SetUser(user) => {
            next.user = user;
            next.is_loading = false;
        }
        Action::SetProjects(projects) => next.projects = projects,
        Action::SetTasks(tasks) => next.tasks = tasks,
        Action::AddTask(task) => {
            if state.task(&task.id).is_some() {
                debug!(task = %task.id, "duplicate AddTask ignored");
            } else {
                next.tasks.push(task);
            }
        }
        Action::UpdateTask(task) => match state.task(&task.id) {
            Some(held) if task.version.supersedes(held.version) => {
                if let Some(slot) = next.tasks.iter_mut().find(|t| t.id == task.id) {
                    *slot = task;
                }
            }
            Some(held) => {
                debug!(
                    task = %task.id,
                    held = %held.version,
                    incoming = %task.version,
                    "stale write discarded"
                );
            }
            None => {
                debug!(task = %task.id, "UpdateTask for unknown task ignored");
            }
        },
        Action::SetActiveProject(id) => next.active_project_id = id,
        Action::SetLoading(loading) => next.is_loading = loading,
        Action::AddNotification(notification) => next.notifications.push(notification),
        Action::MarkNotificationRead(id) => {
            if let Some(n) = next.notifications.iter_mut().find(|n| n.id == id) {
                n.read = true;
            }
        }
    }
    next
}
