//! Pure entity services: project and task construction, comment appends,
//! project archival.
//!
//! No side effects and no ambient inputs: ids, timestamps, and versions are
//! supplied by the caller (the sync layer on clients, the authoritative
//! server otherwise). Every operation is a pure transform producing a new
//! entity value plus an [`EventDescriptor`].

use chrono::{DateTime, Utc};

use crate::error::ErrorCode;
use crate::event::{EntityKind, EventDescriptor, MutationKind};
use crate::model::{Comment, Priority, Project, Task, TaskStatus, User, Version};

/// Rejections raised by entity services, locally and synchronously.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// Task creation or comment by a non-member.
    #[error("user '{actor}' is not a member of project '{project_id}'")]
    NotAProjectMember {
        /// Acting user id.
        actor: String,
        /// The project in question.
        project_id: String,
    },

    /// Initial assignee is not a project member.
    #[error("assignee '{assignee}' is not a member of project '{project_id}'")]
    AssigneeNotMember {
        /// Proposed assignee id.
        assignee: String,
        /// The project in question.
        project_id: String,
    },

    /// The target project is archived.
    #[error("project '{project_id}' is archived")]
    ProjectArchived {
        /// The archived project.
        project_id: String,
    },

    /// Comment text was empty or whitespace-only.
    #[error("comment text is empty")]
    EmptyComment,

    /// Only the owner may archive a project.
    #[error("user '{actor}' does not own project '{project_id}'")]
    NotProjectOwner {
        /// Acting user id.
        actor: String,
        /// The project in question.
        project_id: String,
    },
}

impl ServiceError {
    /// The stable machine-readable code for this rejection.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotAProjectMember { .. } | Self::NotProjectOwner { .. } => {
                ErrorCode::NotAProjectMember
            }
            Self::AssigneeNotMember { .. } => ErrorCode::AssigneeNotMember,
            Self::ProjectArchived { .. } => ErrorCode::ProjectArchived,
            Self::EmptyComment => ErrorCode::EmptyComment,
        }
    }
}

/// Caller-supplied fields for a new task. Everything else is fixed by the
/// creation rules (initial status is always `TODO`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    /// Id for the new task (client-minted so the optimistic entry and the
    /// canonical broadcast agree).
    pub id: String,
    /// Short title.
    pub title: String,
    /// Longer description.
    pub description: String,
    /// Display priority.
    pub priority: Priority,
    /// Optional initial assignee.
    pub assignee_id: Option<String>,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Free-text labels.
    pub labels: Vec<String>,
    /// Creation time, supplied by the caller.
    pub created_at: DateTime<Utc>,
}

/// Create a project owned by `owner_id`.
#[must_use]
pub fn create_project(
    id: &str,
    name: &str,
    description: &str,
    owner_id: &str,
    members: Vec<String>,
    created_at: DateTime<Utc>,
) -> (Project, EventDescriptor) {
    let project = Project {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        owner_id: owner_id.to_string(),
        members,
        created_at,
        archived: false,
    };
    let descriptor = EventDescriptor {
        entity: EntityKind::Project,
        id: project.id.clone(),
        kind: MutationKind::Created,
        version: Version::Canonical(1),
    };
    (project, descriptor)
}

/// Create a task in `project`. Initial status is always `TODO`.
///
/// # Errors
///
/// Returns a [`ServiceError`] when the actor is not a member, the project is
/// archived, or the initial assignee is not a member.
pub fn create_task(
    draft: TaskDraft,
    project: &Project,
    actor: &str,
    version: Version,
) -> Result<(Task, EventDescriptor), ServiceError> {
    if project.archived {
        return Err(ServiceError::ProjectArchived {
            project_id: project.id.clone(),
        });
    }
    if !project.is_member(actor) {
        return Err(ServiceError::NotAProjectMember {
            actor: actor.to_string(),
            project_id: project.id.clone(),
        });
    }
    if let Some(assignee) = draft.assignee_id.as_deref() {
        if !project.is_member(assignee) {
            return Err(ServiceError::AssigneeNotMember {
                assignee: assignee.to_string(),
                project_id: project.id.clone(),
            });
        }
    }

    let task = Task {
        id: draft.id,
        project_id: project.id.clone(),
        title: draft.title,
        description: draft.description,
        status: TaskStatus::Todo,
        priority: draft.priority,
        assignee_id: draft.assignee_id,
        due_date: draft.due_date,
        labels: draft.labels,
        comments: vec![],
        created_at: draft.created_at,
        version,
    };
    let descriptor = EventDescriptor {
        entity: EntityKind::Task,
        id: task.id.clone(),
        kind: MutationKind::Created,
        version,
    };
    Ok((task, descriptor))
}

/// Append a comment to `task`.
///
/// The author's display name is snapshotted into the comment; history is
/// never rewritten when users rename themselves.
///
/// # Errors
///
/// Returns a [`ServiceError`] when the text is empty, the author is not a
/// member, or the project is archived.
pub fn append_comment(
    task: &Task,
    project: &Project,
    author: &User,
    comment_id: &str,
    text: &str,
    created_at: DateTime<Utc>,
    version: Version,
) -> Result<(Task, EventDescriptor), ServiceError> {
    if project.archived {
        return Err(ServiceError::ProjectArchived {
            project_id: project.id.clone(),
        });
    }
    if !project.is_member(&author.id) {
        return Err(ServiceError::NotAProjectMember {
            actor: author.id.clone(),
            project_id: project.id.clone(),
        });
    }
    if text.trim().is_empty() {
        return Err(ServiceError::EmptyComment);
    }

    let mut next = task.clone();
    next.comments.push(Comment {
        id: comment_id.to_string(),
        user_id: author.id.clone(),
        user_name: author.name.clone(),
        text: text.to_string(),
        created_at,
    });
    next.version = version;

    let descriptor = EventDescriptor {
        entity: EntityKind::Task,
        id: next.id.clone(),
        kind: MutationKind::Commented,
        version,
    };
    Ok((next, descriptor))
}

/// Mark a project unavailable. Owner only; tasks referencing it become
/// read-only rather than being deleted.
///
/// # Errors
///
/// Returns [`ServiceError::NotProjectOwner`] for anyone but the owner.
pub fn archive_project(
    project: &Project,
    actor: &str,
    version: Version,
) -> Result<(Project, EventDescriptor), ServiceError> {
    if project.owner_id != actor {
        return Err(ServiceError::NotProjectOwner {
            actor: actor.to_string(),
            project_id: project.id.clone(),
        });
    }

    let mut next = project.clone();
    next.archived = true;
    let descriptor = EventDescriptor {
        entity: EntityKind::Project,
        id: next.id.clone(),
        kind: MutationKind::Updated,
        version,
    };
    Ok((next, descriptor))
}
