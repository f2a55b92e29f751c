//! Notification fan-out: from a canonical mutation event to the set of
//! affected users.
//!
//! Runs on the authoritative side, after an event has been accepted and
//! ordered. Each returned delivery becomes one `notification:new` sent
//! directly to the recipient, outside the project room. Delivery is
//! at-least-once; clients display duplicates in arrival order rather than
//! deduplicating, since a rare duplicate costs less than a missed alert.

use crate::event::ServerEvent;
use crate::model::Task;

/// One computed delivery: a notification addressed to a single user.
///
/// The server materializes the [`Notification`](crate::model::Notification)
/// entity (id, timestamp) at emission time; fan-out only decides who hears
/// about what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Recipient user id.
    pub recipient: String,
    /// Notification headline.
    pub title: String,
    /// Notification body.
    pub message: String,
}

/// Compute the deliveries for a canonical event.
///
/// `previous` is the task snapshot before the mutation (absent for
/// creations); `actor` is the user whose request produced the event. Actors
/// never notify themselves.
#[must_use]
pub fn fan_out(event: &ServerEvent, previous: Option<&Task>, actor: &str) -> Vec<Delivery> {
    match event {
        ServerEvent::TaskCreated(task) => assignment_delivery(task, None, actor),
        ServerEvent::TaskUpdated(task) => assignment_delivery(task, previous, actor),
        ServerEvent::TaskCommented(task) => comment_delivery(task, actor),
        // notification:new events are themselves deliveries; they fan out
        // to no one.
        ServerEvent::NotificationNew(_) => vec![],
    }
}

/// "Task assigned to you" — when the assignee is newly set to someone other
/// than the actor.
fn assignment_delivery(task: &Task, previous: Option<&Task>, actor: &str) -> Vec<Delivery> {
    let Some(assignee) = task.assignee_id.as_deref() else {
        return vec![];
    };
    if assignee == actor {
        return vec![];
    }
    let unchanged = previous.is_some_and(|p| p.assignee_id.as_deref() == Some(assignee));
    if unchanged {
        return vec![];
    }
    vec![Delivery {
        recipient: assignee.to_string(),
        title: "Task assigned to you".to_string(),
        message: task.title.clone(),
    }]
}

/// "Someone commented on your task" — to the assignee, unless they wrote
/// the comment themselves.
fn comment_delivery(task: &Task, actor: &str) -> Vec<Delivery> {
    let Some(assignee) = task.assignee_id.as_deref() else {
        return vec![];
    };
    if assignee == actor {
        return vec![];
    }
    let author = task
        .comments
        .last()
        .map_or_else(|| actor.to_string(), |c| c.user_name.clone());
    vec![Delivery {
        recipient: assignee.to_string(),
        title: "New comment on your task".to_string(),
        message: format!("{author} commented on \"{}\"", task.title),
    }]
}

#[cfg(test)]
mod tests {
    use super::fan_out;
    use crate::event::ServerEvent;
    use crate::model::{Comment, Priority, Task, TaskStatus, Version};
    use chrono::Utc;

    fn task(assignee: Option<&str>) -> Task {
        Task {
            id: "t9".to_string(),
            project_id: "p1".to_string(),
            title: "Logo Exploration".to_string(),
            description: String::new(),
            status: TaskStatus::Todo,
            priority: Priority::High,
            assignee_id: assignee.map(ToString::to_string),
            due_date: None,
            labels: vec![],
            comments: vec![],
            created_at: Utc::now(),
            version: Version::Canonical(2),
        }
    }

    #[test]
    fn assignment_notifies_exactly_the_assignee() {
        let event = ServerEvent::TaskUpdated(task(Some("u2")));
        let deliveries = fan_out(&event, Some(&task(None)), "u1");
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].recipient, "u2");
        assert_eq!(deliveries[0].title, "Task assigned to you");
    }

    #[test]
    fn self_assignment_is_silent() {
        let event = ServerEvent::TaskUpdated(task(Some("u1")));
        assert!(fan_out(&event, Some(&task(None)), "u1").is_empty());
    }

    #[test]
    fn unchanged_assignee_is_silent() {
        // A status or priority change keeps the assignee; no re-notification.
        let event = ServerEvent::TaskUpdated(task(Some("u2")));
        assert!(fan_out(&event, Some(&task(Some("u2"))), "u1").is_empty());
    }

    #[test]
    fn creation_with_assignee_notifies() {
        let event = ServerEvent::TaskCreated(task(Some("u3")));
        let deliveries = fan_out(&event, None, "u1");
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].recipient, "u3");
    }

    #[test]
    fn unassigned_tasks_notify_no_one() {
        assert!(fan_out(&ServerEvent::TaskCreated(task(None)), None, "u1").is_empty());
        assert!(fan_out(&ServerEvent::TaskCommented(task(None)), None, "u1").is_empty());
    }

    #[test]
    fn comments_notify_the_assignee_but_not_the_author() {
        let mut commented = task(Some("u2"));
        commented.comments.push(Comment {
            id: "c1".to_string(),
            user_id: "u1".to_string(),
            user_name: "Ada".to_string(),
            text: "thoughts?".to_string(),
            created_at: Utc::now(),
        });
        let event = ServerEvent::TaskCommented(commented);

        let deliveries = fan_out(&event, None, "u1");
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].recipient, "u2");
        assert!(deliveries[0].message.contains("Ada"));

        // Assignee commenting on their own task hears nothing.
        assert!(fan_out(&event, None, "u2").is_empty());
    }
}
