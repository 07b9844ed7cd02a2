//! Coordinator behaviour switches.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Query the cached owner before trusting it on toggle.
    pub verify_owner: bool,
    /// Scan all tabs for a stray PiP window when the cache says idle.
    pub scan_when_idle: bool,
    /// How long a state query may go unanswered before the tab counts as unreachable (ms).
    pub query_timeout_ms: u32,
    /// Hand PiP to the last playing tab when the user switches away from it.
    pub auto_pip_on_switch: bool,
    /// Mirror the owner into the session store.
    pub persist_owner: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            verify_owner: true,
            scan_when_idle: true,
            query_timeout_ms: 1500,
            auto_pip_on_switch: true,
            persist_owner: true,
        }
    }
}
