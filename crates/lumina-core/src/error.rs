use std::fmt;

/// Machine-readable error codes for client-side decision making.
///
/// Every error the engine can surface maps to one stable code, so UI layers
/// and logs can branch on the code without parsing message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    TaskNotFound,
    ProjectNotFound,
    NotAProjectMember,
    AssigneeNotMember,
    ProjectArchived,
    EmptyComment,
    StaleWriteRejected,
    ChannelDisconnected,
    ResyncFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::TaskNotFound => "E2001",
            Self::ProjectNotFound => "E2002",
            Self::NotAProjectMember => "E2003",
            Self::AssigneeNotMember => "E2004",
            Self::ProjectArchived => "E2005",
            Self::EmptyComment => "E2006",
            Self::StaleWriteRejected => "E3001",
            Self::ChannelDisconnected => "E4001",
            Self::ResyncFailed => "E4002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and banners.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::TaskNotFound => "Task not found",
            Self::ProjectNotFound => "Project not found",
            Self::NotAProjectMember => "Actor is not a project member",
            Self::AssigneeNotMember => "Assignee is not a project member",
            Self::ProjectArchived => "Project is archived",
            Self::EmptyComment => "Comment text is empty",
            Self::StaleWriteRejected => "Stale write discarded",
            Self::ChannelDisconnected => "Realtime channel disconnected",
            Self::ResyncFailed => "Full resync failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to the user.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::TaskNotFound | Self::ProjectNotFound => None,
            Self::NotAProjectMember => Some("Ask the project owner to add you as a member."),
            Self::AssigneeNotMember => Some("Only current project members can be assigned."),
            Self::ProjectArchived => Some("Tasks of an archived project are read-only."),
            Self::EmptyComment => Some("Write some text before posting."),
            Self::StaleWriteRejected => None,
            Self::ChannelDisconnected => Some("Reconnecting; the board will refresh itself."),
            Self::ResyncFailed => Some("Check your connection and retry."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
