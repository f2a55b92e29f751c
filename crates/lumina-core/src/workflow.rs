//! Workflow state machine for task mutations.
//!
//! All four board states are mutually reachable by direct user action: the
//! board is a general directed graph, not an approval pipeline, because
//! creative workflows routinely move backward (REVIEW → IN_PROGRESS on
//! rejection). The only gates are project membership and the archived flag.
//!
//! Every operation is pure: it takes the current task snapshot, the owning
//! project (for membership checks), and the version to stamp on the result,
//! and returns a fresh snapshot plus an [`EventDescriptor`]. The caller
//! supplies the version because version allocation differs by side: clients
//! mint provisional counters, the server assigns canonical numbers.
//!
//! Concurrent transitions on the same task from two clients are *not*
//! resolved here: the server applies them in receipt order and broadcasts
//! the final canonical state; last-write-wins policy lives in the store.

use crate::error::ErrorCode;
use crate::event::{EntityKind, EventDescriptor, MutationKind};
use crate::model::{Priority, Project, Task, TaskStatus, Version};

/// Rejections raised locally, before any network call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    /// The actor is not a member of the task's project.
    #[error("user '{actor}' is not a member of project '{project_id}'")]
    NotAProjectMember {
        /// Acting user id.
        actor: String,
        /// The project the actor is not part of.
        project_id: String,
    },

    /// The proposed assignee is not a member of the task's project.
    #[error("assignee '{assignee}' is not a member of project '{project_id}'")]
    AssigneeNotMember {
        /// Proposed assignee id.
        assignee: String,
        /// The project the assignee is not part of.
        project_id: String,
    },

    /// The project is archived; its tasks are read-only.
    #[error("project '{project_id}' is archived; tasks are read-only")]
    ProjectArchived {
        /// The archived project.
        project_id: String,
    },

    /// The supplied project does not own the task. Caller bug.
    #[error("task '{task_id}' belongs to project '{expected}', not '{got}'")]
    WrongProject {
        /// The task in question.
        task_id: String,
        /// The task's actual owning project.
        expected: String,
        /// The project that was passed in.
        got: String,
    },
}

impl WorkflowError {
    /// The stable machine-readable code for this rejection.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotAProjectMember { .. } => ErrorCode::NotAProjectMember,
            Self::AssigneeNotMember { .. } => ErrorCode::AssigneeNotMember,
            Self::ProjectArchived { .. } => ErrorCode::ProjectArchived,
            Self::WrongProject { .. } => ErrorCode::InternalUnexpected,
        }
    }
}

/// Move a task to a new board column.
///
/// Succeeds iff the actor is a project member and the project is live. No
/// status pair is forbidden; re-dropping a card on its own column is a
/// successful (if uneventful) transition.
///
/// # Errors
///
/// Returns a [`WorkflowError`] when the actor is not a member, the project
/// is archived, or the project does not own the task.
pub fn transition(
    task: &Task,
    new_status: TaskStatus,
    actor: &str,
    project: &Project,
    version: Version,
) -> Result<(Task, EventDescriptor), WorkflowError> {
    guard_mutable(task, actor, project)?;

    let mut next = task.clone();
    next.status = new_status;
    next.version = version;
    Ok((next, updated_descriptor(task, version)))
}

/// Assign the task to a project member, or unassign with `None`.
///
/// # Errors
///
/// Returns a [`WorkflowError`] when the actor is not a member, the proposed
/// assignee is not a member, the project is archived, or the project does
/// not own the task.
pub fn reassign(
    task: &Task,
    new_assignee: Option<&str>,
    actor: &str,
    project: &Project,
    version: Version,
) -> Result<(Task, EventDescriptor), WorkflowError> {
    guard_mutable(task, actor, project)?;

    if let Some(assignee) = new_assignee {
        if !project.is_member(assignee) {
            return Err(WorkflowError::AssigneeNotMember {
                assignee: assignee.to_string(),
                project_id: project.id.clone(),
            });
        }
    }

    let mut next = task.clone();
    next.assignee_id = new_assignee.map(ToString::to_string);
    next.version = version;
    Ok((next, updated_descriptor(task, version)))
}

/// Change the display priority. Unconditional for any project member.
///
/// # Errors
///
/// Returns a [`WorkflowError`] when the actor is not a member, the project
/// is archived, or the project does not own the task.
pub fn change_priority(
    task: &Task,
    new_priority: Priority,
    actor: &str,
    project: &Project,
    version: Version,
) -> Result<(Task, EventDescriptor), WorkflowError> {
    guard_mutable(task, actor, project)?;

    let mut next = task.clone();
    next.priority = new_priority;
    next.version = version;
    Ok((next, updated_descriptor(task, version)))
}

/// Common gate for all task mutations: project ownership, archived flag,
/// actor membership.
fn guard_mutable(task: &Task, actor: &str, project: &Project) -> Result<(), WorkflowError> {
    if task.project_id != project.id {
        return Err(WorkflowError::WrongProject {
            task_id: task.id.clone(),
            expected: task.project_id.clone(),
            got: project.id.clone(),
        });
    }
    if project.archived {
        return Err(WorkflowError::ProjectArchived {
            project_id: project.id.clone(),
        });
    }
    if !project.is_member(actor) {
        return Err(WorkflowError::NotAProjectMember {
            actor: actor.to_string(),
            project_id: project.id.clone(),
        });
    }
    Ok(())
}

fn updated_descriptor(task: &Task, version: Version) -> EventDescriptor {
    EventDescriptor {
        entity: EntityKind::Task,
        id: task.id.clone(),
        kind: MutationKind::Updated,
        version,
    }
}

#[cfg(test)]
mod tests {
    use super::{WorkflowError, change_priority, reassign, transition};
    use crate::event::MutationKind;
    use crate::model::{Priority, Project, Task, TaskStatus, Version};
    use chrono::Utc;

    fn project() -> Project {
        Project {
            id: "p1".to_string(),
            name: "Brand Identity".to_string(),
            description: String::new(),
            owner_id: "u1".to_string(),
            members: vec!["u2".to_string()],
            created_at: Utc::now(),
            archived: false,
        }
    }

    fn task() -> Task {
        Task {
            id: "t1".to_string(),
            project_id: "p1".to_string(),
            title: "Logo Exploration".to_string(),
            description: String::new(),
            status: TaskStatus::Todo,
            priority: Priority::Medium,
            assignee_id: None,
            due_date: None,
            labels: vec![],
            comments: vec![],
            created_at: Utc::now(),
            version: Version::Canonical(1),
        }
    }

    #[test]
    fn any_status_pair_is_reachable() {
        let p = project();
        for from in TaskStatus::ALL {
            for to in TaskStatus::ALL {
                let mut t = task();
                t.status = from;
                let (next, descriptor) =
                    transition(&t, to, "u2", &p, Version::Canonical(2)).expect("permissive");
                assert_eq!(next.status, to);
                assert_eq!(descriptor.kind, MutationKind::Updated);
                assert_eq!(next.version, Version::Canonical(2));
            }
        }
    }

    #[test]
    fn backward_moves_are_allowed() {
        let mut t = task();
        t.status = TaskStatus::Review;
        let (next, _) = transition(&t, TaskStatus::InProgress, "u1", &project(), Version::Canonical(2))
            .expect("review rejection moves backward");
        assert_eq!(next.status, TaskStatus::InProgress);
    }

    #[test]
    fn non_members_cannot_transition() {
        let err = transition(&task(), TaskStatus::Done, "intruder", &project(), Version::Canonical(2))
            .expect_err("must reject");
        assert!(matches!(err, WorkflowError::NotAProjectMember { .. }));
    }

    #[test]
    fn snapshots_do_not_mutate_the_input() {
        let t = task();
        let (_, _) = transition(&t, TaskStatus::Done, "u1", &project(), Version::Canonical(2))
            .expect("transition");
        assert_eq!(t.status, TaskStatus::Todo);
        assert_eq!(t.version, Version::Canonical(1));
    }

    #[test]
    fn reassign_to_member_succeeds() {
        let (next, _) = reassign(&task(), Some("u2"), "u1", &project(), Version::Canonical(2))
            .expect("member assignee");
        assert_eq!(next.assignee_id.as_deref(), Some("u2"));
    }

    #[test]
    fn reassign_to_owner_succeeds() {
        // The owner counts as a member even when not listed.
        let (next, _) = reassign(&task(), Some("u1"), "u2", &project(), Version::Canonical(2))
            .expect("owner assignee");
        assert_eq!(next.assignee_id.as_deref(), Some("u1"));
    }

    #[test]
    fn reassign_to_outsider_fails() {
        let err = reassign(&task(), Some("u9"), "u1", &project(), Version::Canonical(2))
            .expect_err("must reject");
        assert_eq!(
            err,
            WorkflowError::AssigneeNotMember {
                assignee: "u9".to_string(),
                project_id: "p1".to_string(),
            }
        );
    }

    #[test]
    fn unassign_always_works_for_members() {
        let mut t = task();
        t.assignee_id = Some("u2".to_string());
        let (next, _) =
            reassign(&t, None, "u2", &project(), Version::Canonical(2)).expect("unassign");
        assert_eq!(next.assignee_id, None);
    }

    #[test]
    fn priority_change_is_unconditional_for_members() {
        let (next, _) = change_priority(&task(), Priority::Urgent, "u2", &project(), Version::Canonical(2))
            .expect("priority");
        assert_eq!(next.priority, Priority::Urgent);
    }

    #[test]
    fn archived_projects_are_read_only() {
        let mut p = project();
        p.archived = true;
        let err = transition(&task(), TaskStatus::Done, "u1", &p, Version::Canonical(2))
            .expect_err("must reject");
        assert!(matches!(err, WorkflowError::ProjectArchived { .. }));
    }

    #[test]
    fn wrong_project_is_rejected() {
        let mut p = project();
        p.id = "p2".to_string();
        let err = change_priority(&task(), Priority::Low, "u1", &p, Version::Canonical(2))
            .expect_err("must reject");
        assert!(matches!(err, WorkflowError::WrongProject { .. }));
    }
}
