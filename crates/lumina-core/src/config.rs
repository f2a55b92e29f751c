use serde::{Deserialize, Serialize};

/// Tuning knobs for the sync layer.
///
/// There is deliberately no file loading here: the engine persists no
/// client-side state, so configuration arrives from the embedding
/// application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// How many resync attempts to make after a disconnect before the
    /// client escalates to the retryable [`ResyncFailed`] state. The first
    /// attempt is the automatic recovery; anything beyond it is the
    /// "repeated failure" budget.
    ///
    /// [`ResyncFailed`]: crate::sync::ConnectionState::ResyncFailed
    #[serde(default = "default_resync_attempts")]
    pub resync_attempts: u32,

    /// Upper bound on events reconciled per pump, to keep a single pump
    /// from starving the UI thread after a long delivery gap.
    #[serde(default = "default_max_events_per_pump")]
    pub max_events_per_pump: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            resync_attempts: default_resync_attempts(),
            max_events_per_pump: default_max_events_per_pump(),
        }
    }
}

const fn default_resync_attempts() -> u32 {
    2
}

const fn default_max_events_per_pump() -> usize {
    64
}
