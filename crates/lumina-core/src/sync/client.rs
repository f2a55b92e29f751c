//! The sync client: optimistic local writes reconciled against canonical
//! server events.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::SyncConfig;
use crate::event::{ClientRequest, ServerEvent};
use crate::model::{Priority, Project, Task, TaskStatus, User, Version};
use crate::services::{self, ServiceError, TaskDraft};
use crate::store::{Action, AppState, reduce};
use crate::workflow::{self, WorkflowError};

use super::transport::{ChannelPoll, Transport};

/// Where the client stands relative to the canonical event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Channel up; canonical events are flowing.
    Connected,
    /// Channel lost; held state may be behind. Cleared by resync.
    Stale,
    /// A full refetch of the active project is in flight.
    Resyncing,
    /// Resync exhausted its attempt budget. Retryable via
    /// [`SyncClient::retry_resync`]; surfaced to the user as a banner, not
    /// an error.
    ResyncFailed,
}

/// Errors surfaced synchronously by sync operations.
///
/// Local validation failures never reach the network; transport failures
/// carry the transport's own error type.
#[derive(Debug, thiserror::Error)]
pub enum SyncError<E: std::fmt::Debug + std::fmt::Display> {
    /// A workflow rule rejected the mutation locally.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// An entity service rejected the mutation locally.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The named task is not in the store.
    #[error("unknown task '{0}'")]
    TaskNotFound(String),

    /// The named project is not in the store.
    #[error("unknown project '{0}'")]
    ProjectNotFound(String),

    /// No user is signed in; mutations need an actor.
    #[error("no user is signed in")]
    NotSignedIn,

    /// Task creation needs an active project to create into.
    #[error("no active project")]
    NoActiveProject,

    /// The transport failed to carry an operation.
    #[error("transport: {0}")]
    Transport(E),
}

/// Caller intent for a new task. The sync client mints the id, stamps the
/// provisional version, and fixes the initial status to `TODO`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewTask {
    /// Short title.
    pub title: String,
    /// Longer description.
    pub description: String,
    /// Display priority.
    pub priority: Option<Priority>,
    /// Optional initial assignee.
    pub assignee_id: Option<String>,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Free-text labels.
    pub labels: Vec<String>,
}

/// What one [`SyncClient::pump`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PumpReport {
    /// Canonical events reconciled into the store.
    pub events_applied: usize,
    /// Whether a full resync completed during this pump.
    pub resynced: bool,
}

/// One client's view of the board, kept consistent with the server and with
/// every other client in the room.
///
/// All entity state lives in the embedded [`AppState`] and changes only
/// through reducer actions; the client itself holds just the connection
/// bookkeeping and the provisional version counter.
#[derive(Debug)]
pub struct SyncClient<T: Transport> {
    state: AppState,
    transport: T,
    config: SyncConfig,
    conn: ConnectionState,
    backlog: VecDeque<ServerEvent>,
    next_provisional: u64,
    next_local_id: u64,
}

impl<T: Transport> SyncClient<T> {
    /// Create a client for a signed-in user.
    pub fn new(transport: T, config: SyncConfig, user: User) -> Self {
        let state = reduce(&AppState::default(), Action::SetUser(Some(user)));
        Self {
            state,
            transport,
            config,
            conn: ConnectionState::Connected,
            backlog: VecDeque::new(),
            next_provisional: 0,
            next_local_id: 0,
        }
    }

    /// The current store snapshot. Read-only; mutations go through the
    /// intent methods.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Current connection state.
    #[must_use]
    pub const fn connection(&self) -> ConnectionState {
        self.conn
    }

    /// The underlying transport (the simulator uses this to wire queues).
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable access to the underlying transport.
    pub const fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Replace the project list (initial hydration from
    /// `GET /api/v1/projects`).
    pub fn hydrate_projects(&mut self, projects: Vec<Project>) {
        self.dispatch(Action::SetProjects(projects));
    }

    /// Focus a project: join its room and hydrate its full task set.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ProjectNotFound`] for an unknown project and
    /// [`SyncError::Transport`] when the join or the initial fetch fails.
    pub fn activate_project(&mut self, project_id: &str) -> Result<(), SyncError<T::Error>> {
        let project = self
            .state
            .project(project_id)
            .cloned()
            .ok_or_else(|| SyncError::ProjectNotFound(project_id.to_string()))?;

        if let Some(previous) = self.state.active_project_id.clone() {
            self.leave_room_of(&previous)?;
        }

        self.dispatch(Action::SetLoading(true));
        self.transport
            .join_room(&project.room())
            .map_err(SyncError::Transport)?;
        let snapshot = self
            .transport
            .fetch_board(project_id)
            .map_err(SyncError::Transport)?;
        self.dispatch(Action::SetActiveProject(Some(project_id.to_string())));
        self.dispatch(Action::SetTasks(snapshot.tasks));
        self.dispatch(Action::SetLoading(false));
        Ok(())
    }

    /// Drop project focus and leave its room.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Transport`] when the leave cannot be delivered.
    pub fn deactivate_project(&mut self) -> Result<(), SyncError<T::Error>> {
        if let Some(previous) = self.state.active_project_id.clone() {
            self.leave_room_of(&previous)?;
        }
        self.dispatch(Action::SetActiveProject(None));
        Ok(())
    }

    /// Create a task in the active project. Returns the minted task id.
    ///
    /// The task is applied optimistically and the creation request is sent;
    /// the canonical `task:created` broadcast later replaces the optimistic
    /// entry (or, on the origin client, lands as an idempotent no-op if
    /// nothing changed server-side).
    ///
    /// # Errors
    ///
    /// Local validation errors ([`SyncError::Service`] and friends) are
    /// returned before anything is sent.
    pub fn create_task(
        &mut self,
        intent: NewTask,
        at: DateTime<Utc>,
    ) -> Result<String, SyncError<T::Error>> {
        let actor = self.signed_in_user()?;
        let project_id = self
            .state
            .active_project_id
            .clone()
            .ok_or(SyncError::NoActiveProject)?;
        let project = self
            .state
            .project(&project_id)
            .cloned()
            .ok_or_else(|| SyncError::ProjectNotFound(project_id.clone()))?;

        self.next_local_id += 1;
        let draft = TaskDraft {
            id: format!("t-{}-{}", actor.id, self.next_local_id),
            title: intent.title,
            description: intent.description,
            priority: intent.priority.unwrap_or(Priority::Medium),
            assignee_id: intent.assignee_id,
            due_date: intent.due_date,
            labels: intent.labels,
            created_at: at,
        };
        let version = self.mint_provisional();
        let (task, _descriptor) = services::create_task(draft, &project, &actor.id, version)?;
        let id = task.id.clone();

        self.dispatch(Action::AddTask(task.clone()));
        self.transport
            .send(ClientRequest::CreateTask {
                actor: actor.id,
                task,
            })
            .map_err(SyncError::Transport)?;
        Ok(id)
    }

    /// Drag a task to another column.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Workflow`] when the transition is rejected
    /// locally, before any network call.
    pub fn move_task(
        &mut self,
        task_id: &str,
        new_status: TaskStatus,
    ) -> Result<(), SyncError<T::Error>> {
        let (task, project, actor) = self.mutation_context(task_id)?;
        let version = self.mint_provisional();
        let (next, _descriptor) =
            workflow::transition(&task, new_status, &actor.id, &project, version)?;
        self.push_update(next, &actor.id)
    }

    /// Assign the task to a member, or unassign with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Workflow`] when the assignee is not a member of
    /// the task's project.
    pub fn reassign_task(
        &mut self,
        task_id: &str,
        new_assignee: Option<&str>,
    ) -> Result<(), SyncError<T::Error>> {
        let (task, project, actor) = self.mutation_context(task_id)?;
        let version = self.mint_provisional();
        let (next, _descriptor) =
            workflow::reassign(&task, new_assignee, &actor.id, &project, version)?;
        self.push_update(next, &actor.id)
    }

    /// Change the display priority.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Workflow`] when the actor is not a member.
    pub fn set_priority(
        &mut self,
        task_id: &str,
        new_priority: Priority,
    ) -> Result<(), SyncError<T::Error>> {
        let (task, project, actor) = self.mutation_context(task_id)?;
        let version = self.mint_provisional();
        let (next, _descriptor) =
            workflow::change_priority(&task, new_priority, &actor.id, &project, version)?;
        self.push_update(next, &actor.id)
    }

    /// Append a comment to a task.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Service`] for empty text or a non-member author.
    pub fn comment(
        &mut self,
        task_id: &str,
        text: &str,
        at: DateTime<Utc>,
    ) -> Result<(), SyncError<T::Error>> {
        let (task, project, actor) = self.mutation_context(task_id)?;
        self.next_local_id += 1;
        let comment_id = format!("c-{}-{}", actor.id, self.next_local_id);
        let version = self.mint_provisional();
        let (next, _descriptor) =
            services::append_comment(&task, &project, &actor, &comment_id, text, at, version)?;

        self.dispatch(Action::UpdateTask(next.clone()));
        self.transport
            .send(ClientRequest::CommentTask {
                actor: actor.id,
                task: next,
            })
            .map_err(SyncError::Transport)?;
        Ok(())
    }

    /// Mark a notification in the tray as read. Local-only: the tray is
    /// ephemeral and the read flag is the recipient's own.
    pub fn mark_notification_read(&mut self, notification_id: &str) {
        self.dispatch(Action::MarkNotificationRead(notification_id.to_string()));
    }

    /// Drain the channel and reconcile canonical events into the store.
    ///
    /// At most [`SyncConfig::max_events_per_pump`] events are applied per
    /// call; the remainder stays queued in order for the next pump. Detects
    /// disconnects (store goes stale) and runs the automatic full-resync
    /// recovery once the channel is back.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Transport`] only for channel faults that are
    /// not plain disconnects; a failed resync becomes the retryable
    /// [`ConnectionState::ResyncFailed`] state instead of an error.
    pub fn pump(&mut self) -> Result<PumpReport, SyncError<T::Error>> {
        let ChannelPoll { events, connected } =
            self.transport.poll().map_err(SyncError::Transport)?;
        self.backlog.extend(events);

        let mut report = PumpReport::default();
        while report.events_applied < self.config.max_events_per_pump {
            let Some(event) = self.backlog.pop_front() else {
                break;
            };
            self.reconcile(event);
            report.events_applied += 1;
        }

        if connected {
            if self.conn == ConnectionState::Stale {
                report.resynced = self.resync();
            }
        } else if self.conn == ConnectionState::Connected {
            warn!("channel disconnected; store marked stale");
            self.conn = ConnectionState::Stale;
        }

        Ok(report)
    }

    /// Explicit user-driven retry after [`ConnectionState::ResyncFailed`].
    /// Returns `true` once the store is confirmed fresh again.
    pub fn retry_resync(&mut self) -> bool {
        self.resync()
    }

    // -- internals ---------------------------------------------------------

    /// Apply a canonical event. Canonical versions always supersede
    /// optimistic state via the store's version rules.
    fn reconcile(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::TaskCreated(task)
            | ServerEvent::TaskUpdated(task)
            | ServerEvent::TaskCommented(task) => {
                if self.state.task(&task.id).is_some() {
                    self.dispatch(Action::UpdateTask(task));
                } else {
                    self.dispatch(Action::AddTask(task));
                }
            }
            ServerEvent::NotificationNew(notification) => {
                debug!(id = %notification.id, "notification received");
                self.dispatch(Action::AddNotification(notification));
            }
        }
    }

    /// Full refetch of the active project. Consumes the configured attempt
    /// budget, then escalates to [`ConnectionState::ResyncFailed`].
    fn resync(&mut self) -> bool {
        let Some(project_id) = self.state.active_project_id.clone() else {
            // Nothing to refetch without a focused board.
            self.conn = ConnectionState::Connected;
            return true;
        };
        let room = format!("project:{project_id}");

        self.conn = ConnectionState::Resyncing;
        for attempt in 1..=self.config.resync_attempts {
            if let Err(err) = self.transport.join_room(&room) {
                warn!(attempt, error = %err, "room rejoin failed");
                continue;
            }
            match self.transport.fetch_board(&project_id) {
                Ok(snapshot) => {
                    self.dispatch(Action::SetTasks(snapshot.tasks));
                    self.conn = ConnectionState::Connected;
                    info!(project = %project_id, attempt, "resync complete");
                    return true;
                }
                Err(err) => warn!(attempt, error = %err, "resync fetch failed"),
            }
        }

        warn!(project = %project_id, "resync attempts exhausted");
        self.conn = ConnectionState::ResyncFailed;
        false
    }

    fn dispatch(&mut self, action: Action) {
        self.state = reduce(&self.state, action);
    }

    fn mint_provisional(&mut self) -> Version {
        self.next_provisional += 1;
        Version::Provisional(self.next_provisional)
    }

    fn signed_in_user(&self) -> Result<User, SyncError<T::Error>> {
        self.state.user.clone().ok_or(SyncError::NotSignedIn)
    }

    /// Everything a task mutation needs: the held snapshot, its project,
    /// and the acting user.
    fn mutation_context(
        &self,
        task_id: &str,
    ) -> Result<(Task, Project, User), SyncError<T::Error>> {
        let actor = self.signed_in_user()?;
        let task = self
            .state
            .task(task_id)
            .cloned()
            .ok_or_else(|| SyncError::TaskNotFound(task_id.to_string()))?;
        let project = self
            .state
            .project(&task.project_id)
            .cloned()
            .ok_or_else(|| SyncError::ProjectNotFound(task.project_id.clone()))?;
        Ok((task, project, actor))
    }

    fn push_update(&mut self, next: Task, actor: &str) -> Result<(), SyncError<T::Error>> {
        self.dispatch(Action::UpdateTask(next.clone()));
        self.transport
            .send(ClientRequest::UpdateTask {
                actor: actor.to_string(),
                task: next,
            })
            .map_err(SyncError::Transport)
    }

    fn leave_room_of(&mut self, project_id: &str) -> Result<(), SyncError<T::Error>> {
        self.transport
            .leave_room(&format!("project:{project_id}"))
            .map_err(SyncError::Transport)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConnectionState, NewTask, SyncClient, SyncError};
    use crate::config::SyncConfig;
    use crate::event::{ClientRequest, ServerEvent};
    use crate::model::{Notification, Priority, Project, Task, TaskStatus, User, Version};
    use crate::sync::transport::{BoardSnapshot, ChannelPoll, Transport};
    use chrono::Utc;
    use std::collections::HashMap;

    /// Scriptable transport: queues in, queues out, togglable connectivity.
    #[derive(Debug, Default)]
    struct ScriptedTransport {
        joined: Vec<String>,
        left: Vec<String>,
        sent: Vec<ClientRequest>,
        inbox: Vec<ServerEvent>,
        disconnected: bool,
        boards: HashMap<String, Vec<Task>>,
        failing_fetches: u32,
    }

    impl Transport for ScriptedTransport {
        type Error = String;

        fn join_room(&mut self, room: &str) -> Result<(), String> {
            self.joined.push(room.to_string());
            Ok(())
        }

        fn leave_room(&mut self, room: &str) -> Result<(), String> {
            self.left.push(room.to_string());
            Ok(())
        }

        fn send(&mut self, request: ClientRequest) -> Result<(), String> {
            self.sent.push(request);
            Ok(())
        }

        fn poll(&mut self) -> Result<ChannelPoll, String> {
            Ok(ChannelPoll {
                events: std::mem::take(&mut self.inbox),
                connected: !self.disconnected,
            })
        }

        fn fetch_board(&mut self, project_id: &str) -> Result<BoardSnapshot, String> {
            if self.failing_fetches > 0 {
                self.failing_fetches -= 1;
                return Err("503 service unavailable".to_string());
            }
            Ok(BoardSnapshot {
                tasks: self.boards.get(project_id).cloned().unwrap_or_default(),
            })
        }
    }

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            name: "Ada".to_string(),
            email: format!("{id}@example.com"),
            avatar: String::new(),
        }
    }

    fn project() -> Project {
        Project {
            id: "p1".to_string(),
            name: "Zenith".to_string(),
            description: String::new(),
            owner_id: "u1".to_string(),
            members: vec!["u2".to_string()],
            created_at: Utc::now(),
            archived: false,
        }
    }

    fn canonical_task(id: &str, n: u64) -> Task {
        Task {
            id: id.to_string(),
            project_id: "p1".to_string(),
            title: "Logo Exploration".to_string(),
            description: String::new(),
            status: TaskStatus::Todo,
            priority: Priority::High,
            assignee_id: None,
            due_date: None,
            labels: vec![],
            comments: vec![],
            created_at: Utc::now(),
            version: Version::Canonical(n),
        }
    }

    fn client_on_board(tasks: Vec<Task>) -> SyncClient<ScriptedTransport> {
        let mut transport = ScriptedTransport::default();
        transport.boards.insert("p1".to_string(), tasks);
        let mut client = SyncClient::new(transport, SyncConfig::default(), user("u1"));
        client.hydrate_projects(vec![project()]);
        client.activate_project("p1").expect("activate");
        client
    }

    #[test]
    fn activation_joins_the_room_and_hydrates() {
        let client = client_on_board(vec![canonical_task("t1", 1)]);
        assert_eq!(client.transport().joined, ["project:p1"]);
        assert_eq!(client.state().tasks.len(), 1);
        assert_eq!(client.state().active_project_id.as_deref(), Some("p1"));
        assert!(!client.state().is_loading);
    }

    #[test]
    fn moves_apply_optimistically_and_send_one_request() {
        let mut client = client_on_board(vec![canonical_task("t1", 1)]);
        client.move_task("t1", TaskStatus::Review).expect("move");

        let held = client.state().task("t1").expect("held");
        assert_eq!(held.status, TaskStatus::Review);
        assert!(!held.version.is_canonical());

        assert_eq!(client.transport().sent.len(), 1);
        assert!(matches!(
            &client.transport().sent[0],
            ClientRequest::UpdateTask { actor, task } if actor == "u1" && task.id == "t1"
        ));
    }

    #[test]
    fn rejected_mutations_never_reach_the_network() {
        let mut client = client_on_board(vec![canonical_task("t1", 1)]);
        let before = client.state().clone();

        let err = client.reassign_task("t1", Some("outsider")).expect_err("reject");
        assert!(matches!(err, SyncError::Workflow(_)));
        assert_eq!(client.state(), &before);
        assert!(client.transport().sent.is_empty());
    }

    #[test]
    fn canonical_events_replace_optimistic_state() {
        let mut client = client_on_board(vec![canonical_task("t1", 1)]);
        client.move_task("t1", TaskStatus::Review).expect("move");

        // Server ordered a competing edit after ours: canonical version 3.
        let mut winner = canonical_task("t1", 3);
        winner.status = TaskStatus::InProgress;
        client.transport_mut().inbox.push(ServerEvent::TaskUpdated(winner));

        let report = client.pump().expect("pump");
        assert_eq!(report.events_applied, 1);
        let held = client.state().task("t1").expect("held");
        assert_eq!(held.status, TaskStatus::InProgress);
        assert_eq!(held.version, Version::Canonical(3));
    }

    #[test]
    fn create_then_canonical_echo_keeps_one_task() {
        let mut client = client_on_board(vec![]);
        let id = client
            .create_task(
                NewTask {
                    title: "Moodboard".to_string(),
                    ..NewTask::default()
                },
                Utc::now(),
            )
            .expect("create");

        assert_eq!(client.state().tasks.len(), 1);
        assert!(matches!(
            &client.transport().sent[0],
            ClientRequest::CreateTask { task, .. } if task.id == id
        ));

        let mut echo = canonical_task(&id, 1);
        echo.title = "Moodboard".to_string();
        client.transport_mut().inbox.push(ServerEvent::TaskCreated(echo));
        client.pump().expect("pump");

        assert_eq!(client.state().tasks.len(), 1);
        assert!(client.state().task(&id).expect("held").version.is_canonical());
    }

    #[test]
    fn events_beyond_the_pump_cap_wait_for_the_next_pump() {
        let mut transport = ScriptedTransport::default();
        transport.boards.insert("p1".to_string(), vec![]);
        let config = SyncConfig {
            resync_attempts: 2,
            max_events_per_pump: 2,
        };
        let mut client = SyncClient::new(transport, config, user("u1"));
        client.hydrate_projects(vec![project()]);
        client.activate_project("p1").expect("activate");

        for n in 1..=5 {
            client
                .transport_mut()
                .inbox
                .push(ServerEvent::TaskUpdated(canonical_task("t1", n)));
        }

        let mut applied = Vec::new();
        for _ in 0..4 {
            applied.push(client.pump().expect("pump").events_applied);
        }
        assert_eq!(applied, [2, 2, 1, 0]);
        assert_eq!(
            client.state().task("t1").expect("held").version,
            Version::Canonical(5)
        );
    }

    #[test]
    fn creating_without_an_active_project_fails() {
        let transport = ScriptedTransport::default();
        let mut client = SyncClient::new(transport, SyncConfig::default(), user("u1"));
        let err = client
            .create_task(NewTask::default(), Utc::now())
            .expect_err("no active project");
        assert!(matches!(err, SyncError::NoActiveProject));
    }

    #[test]
    fn disconnect_marks_stale_then_reconnect_resyncs() {
        let mut client = client_on_board(vec![canonical_task("t1", 1)]);

        client.transport_mut().disconnected = true;
        client.pump().expect("pump");
        assert_eq!(client.connection(), ConnectionState::Stale);

        // Server state moved on while we were away.
        client
            .transport_mut()
            .boards
            .insert("p1".to_string(), vec![canonical_task("t1", 7), canonical_task("t2", 1)]);
        client.transport_mut().disconnected = false;

        let report = client.pump().expect("pump");
        assert!(report.resynced);
        assert_eq!(client.connection(), ConnectionState::Connected);
        assert_eq!(client.state().tasks.len(), 2);
        assert_eq!(
            client.state().task("t1").expect("held").version,
            Version::Canonical(7)
        );
        // The room was rejoined for the fresh channel.
        assert_eq!(client.transport().joined.last().map(String::as_str), Some("project:p1"));
    }

    #[test]
    fn exhausted_resync_escalates_and_retry_recovers() {
        let mut client = client_on_board(vec![canonical_task("t1", 1)]);
        client.transport_mut().disconnected = true;
        client.pump().expect("pump");

        client.transport_mut().disconnected = false;
        client.transport_mut().failing_fetches = SyncConfig::default().resync_attempts;
        let report = client.pump().expect("pump");
        assert!(!report.resynced);
        assert_eq!(client.connection(), ConnectionState::ResyncFailed);

        // The user presses "retry" once the network is back.
        assert!(client.retry_resync());
        assert_eq!(client.connection(), ConnectionState::Connected);
    }

    #[test]
    fn notifications_land_in_the_tray() {
        let mut client = client_on_board(vec![]);
        client
            .transport_mut()
            .inbox
            .push(ServerEvent::NotificationNew(Notification {
                id: "n1".to_string(),
                title: "Task assigned to you".to_string(),
                message: String::new(),
                read: false,
                timestamp: Utc::now(),
            }));
        client.pump().expect("pump");

        assert_eq!(client.state().notifications.len(), 1);
        client.mark_notification_read("n1");
        assert!(client.state().notifications[0].read);
    }

    #[test]
    fn comments_are_optimistic_and_carry_the_author_snapshot() {
        let mut client = client_on_board(vec![canonical_task("t1", 1)]);
        client.comment("t1", "first pass done", Utc::now()).expect("comment");

        let held = client.state().task("t1").expect("held");
        assert_eq!(held.comments.len(), 1);
        assert_eq!(held.comments[0].user_name, "Ada");
        assert!(matches!(
            &client.transport().sent[0],
            ClientRequest::CommentTask { .. }
        ));
    }

    #[test]
    fn deactivation_leaves_the_room() {
        let mut client = client_on_board(vec![]);
        client.deactivate_project().expect("deactivate");
        assert_eq!(client.transport().left, ["project:p1"]);
        assert_eq!(client.state().active_project_id, None);
    }
}
