// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types shared by the bridge and its hosts.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one bridged invocation in logs, from issue to host delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvocationId(pub Uuid);

impl InvocationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InvocationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for InvocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Leaderboard flavours. Exposed to the host as integer constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeaderboardKind {
    /// Never resets.
    Classic,
    /// Resets on a schedule.
    Recurring,
}

impl LeaderboardKind {
    /// Integer value registered with the host runtime.
    pub fn host_value(self) -> i64 {
        match self {
            Self::Classic => 0,
            Self::Recurring => 1,
        }
    }

    pub fn from_host_value(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Classic),
            1 => Some(Self::Recurring),
            _ => None,
        }
    }
}
