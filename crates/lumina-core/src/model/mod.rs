//! Shared entity vocabulary for the board.
//!
//! These are passive data types: `User`, `Project`, `Task`, `Comment`,
//! `Notification`, plus the [`Version`] counter every task mutation carries.
//! All behavior (validation, transitions, reduction) lives in the
//! `workflow`, `services`, and `store` modules; nothing here touches clocks,
//! randomness, or I/O.

pub mod notification;
pub mod project;
pub mod task;
pub mod user;
pub mod version;

pub use notification::Notification;
pub use project::Project;
pub use task::{Comment, ParseEnumError, Priority, Task, TaskStatus};
pub use user::User;
pub use version::Version;
