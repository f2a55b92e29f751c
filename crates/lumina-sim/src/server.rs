//! The authoritative server model.
//!
//! Serializes writes per entity by handling requests strictly in receipt
//! order, re-validates every mutation through the same workflow/service
//! rules the clients use, assigns canonical versions, and fans events out
//! to the project room plus direct notification deliveries.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use lumina_core::event::{ClientRequest, ServerEvent};
use lumina_core::model::{Notification, Project, Task, User, Version};
use lumina_core::notify;
use lumina_core::services;
use lumina_core::workflow;

/// One event leaving the server, with its routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Broadcast to every member of the project's room.
    Room {
        /// Owning project (the room is `project:{id}`).
        project_id: String,
        /// The canonical event.
        event: ServerEvent,
    },
    /// Direct delivery to exactly one user, never broadcast.
    Direct {
        /// Recipient user id.
        user_id: String,
        /// The `notification:new` event.
        event: ServerEvent,
    },
}

/// Authoritative board state. The canonical event stream for any given task
/// is totally ordered because requests are handled one at a time.
#[derive(Debug, Clone)]
pub struct SimServer {
    users: Vec<User>,
    projects: Vec<Project>,
    tasks: Vec<Task>,
    next_notification: u64,
}

impl SimServer {
    /// Build a server over a fixed user and project population.
    #[must_use]
    pub const fn new(users: Vec<User>, projects: Vec<Project>) -> Self {
        Self {
            users,
            projects,
            tasks: Vec::new(),
            next_notification: 0,
        }
    }

    /// The projects, for client hydration.
    #[must_use]
    pub fn projects(&self) -> Vec<Project> {
        self.projects.clone()
    }

    /// Full task set for one project: the resync payload.
    #[must_use]
    pub fn board(&self, project_id: &str) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect()
    }

    /// All canonical tasks (oracle access).
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Handle one request and produce the resulting outbound events.
    ///
    /// Invalid requests are logged and dropped: the origin client keeps its
    /// optimistic state until the next resync replaces it, which is the
    /// designed recovery path for unconfirmed mutations.
    pub fn handle(&mut self, request: ClientRequest, now: DateTime<Utc>) -> Vec<Outbound> {
        match self.apply(request, now) {
            Ok(outbound) => outbound,
            Err(reason) => {
                warn!(%reason, "request rejected");
                vec![]
            }
        }
    }

    fn apply(
        &mut self,
        request: ClientRequest,
        now: DateTime<Utc>,
    ) -> Result<Vec<Outbound>, String> {
        let actor = request.actor().to_string();
        let project = self
            .projects
            .iter()
            .find(|p| p.id == request.task().project_id)
            .cloned()
            .ok_or_else(|| format!("unknown project '{}'", request.task().project_id))?;

        match request {
            ClientRequest::CreateTask { actor: _, task } => {
                if self.find(&task.id).is_some() {
                    debug!(task = %task.id, "duplicate creation ignored");
                    return Ok(vec![]);
                }
                let draft = services::TaskDraft {
                    id: task.id,
                    title: task.title,
                    description: task.description,
                    priority: task.priority,
                    assignee_id: task.assignee_id,
                    due_date: task.due_date,
                    labels: task.labels,
                    created_at: task.created_at,
                };
                let (canonical, _descriptor) =
                    services::create_task(draft, &project, &actor, Version::Canonical(1))
                        .map_err(|e| e.to_string())?;
                self.tasks.push(canonical.clone());
                let event = ServerEvent::TaskCreated(canonical);
                Ok(self.route(event, None, &actor, &project.id, now))
            }

            ClientRequest::UpdateTask { actor: _, task: want } => {
                let held = self
                    .find(&want.id)
                    .cloned()
                    .ok_or_else(|| format!("unknown task '{}'", want.id))?;
                let version = Version::Canonical(held.version.number() + 1);

                // Re-run the desired end state through the workflow gates,
                // one operation per mutable facet.
                let (next, _) =
                    workflow::transition(&held, want.status, &actor, &project, version)
                        .map_err(|e| e.to_string())?;
                let (next, _) = workflow::reassign(
                    &next,
                    want.assignee_id.as_deref(),
                    &actor,
                    &project,
                    version,
                )
                .map_err(|e| e.to_string())?;
                let (mut next, _) =
                    workflow::change_priority(&next, want.priority, &actor, &project, version)
                        .map_err(|e| e.to_string())?;
                next.title = want.title;
                next.description = want.description;
                next.due_date = want.due_date;
                next.labels = want.labels;

                self.replace(next.clone());
                let event = ServerEvent::TaskUpdated(next);
                Ok(self.route(event, Some(&held), &actor, &project.id, now))
            }

            ClientRequest::CommentTask { actor: _, task: want } => {
                let held = self
                    .find(&want.id)
                    .cloned()
                    .ok_or_else(|| format!("unknown task '{}'", want.id))?;
                let comment = want
                    .comments
                    .last()
                    .ok_or_else(|| format!("comment request without comment on '{}'", want.id))?;
                if held.comments.iter().any(|c| c.id == comment.id) {
                    debug!(task = %want.id, comment = %comment.id, "duplicate comment ignored");
                    return Ok(vec![]);
                }
                let author = self
                    .users
                    .iter()
                    .find(|u| u.id == actor)
                    .cloned()
                    .ok_or_else(|| format!("unknown user '{actor}'"))?;
                let version = Version::Canonical(held.version.number() + 1);
                let (next, _descriptor) = services::append_comment(
                    &held,
                    &project,
                    &author,
                    &comment.id,
                    &comment.text,
                    comment.created_at,
                    version,
                )
                .map_err(|e| e.to_string())?;

                self.replace(next.clone());
                let event = ServerEvent::TaskCommented(next);
                Ok(self.route(event, Some(&held), &actor, &project.id, now))
            }
        }
    }

    /// Room broadcast plus the direct notification deliveries computed by
    /// fan-out.
    fn route(
        &mut self,
        event: ServerEvent,
        previous: Option<&Task>,
        actor: &str,
        project_id: &str,
        now: DateTime<Utc>,
    ) -> Vec<Outbound> {
        let mut outbound = vec![Outbound::Room {
            project_id: project_id.to_string(),
            event: event.clone(),
        }];
        for delivery in notify::fan_out(&event, previous, actor) {
            self.next_notification += 1;
            outbound.push(Outbound::Direct {
                user_id: delivery.recipient,
                event: ServerEvent::NotificationNew(Notification {
                    id: format!("n-{}", self.next_notification),
                    title: delivery.title,
                    message: delivery.message,
                    read: false,
                    timestamp: now,
                }),
            });
        }
        outbound
    }

    fn find(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    fn replace(&mut self, task: Task) {
        if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == task.id) {
            *slot = task;
        }
    }
}
