use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum EngineStatus {
    /// No fetch outstanding.
    Idle,
    Fetching,
    /// A cycle finished and is being published. Returns to `Idle` right after.
    Updated,
}

impl Default for EngineStatus {
    fn default() -> Self {
        EngineStatus::Idle
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineState {
    pub status: EngineStatus,
    /// Completed cycles, successful or not.
    pub cycles: u64,
    pub consecutive_failures: u32,
    pub last_success_at: Option<DateTime<Utc>>,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            status: EngineStatus::Idle,
            cycles: 0,
            consecutive_failures: 0,
            last_success_at: None,
        }
    }
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_fetch(&mut self) {
        self.status = EngineStatus::Fetching;
    }

    pub fn complete(&mut self, success: bool, now: DateTime<Utc>) {
        self.status = EngineStatus::Updated;
        self.cycles = self.cycles.saturating_add(1);
        if success {
            self.consecutive_failures = 0;
            self.last_success_at = Some(now);
        } else {
            self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        }
    }

    pub fn settle(&mut self) {
        self.status = EngineStatus::Idle;
    }
}
