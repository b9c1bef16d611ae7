// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Host-facing game service facade.
//
// One method per bridged operation. Each method validates its host
// arguments, hands the native call to `Bridge::call` and describes how a
// successful payload becomes host values. Delivery rules live in the bridge.

mod achievements;
mod leaderboards;
mod players;
mod saved_games;

use std::sync::Arc;

use tracing::{info, instrument};

use crate::bridge::Bridge;
use crate::entity::LocalPlayer;
use crate::traits::GameKitService;

/// The object host scripts talk to.
#[derive(Clone)]
pub struct GameCenter {
    service: Arc<dyn GameKitService>,
    bridge: Bridge,
    local: LocalPlayer,
}

impl GameCenter {
    /// Bind `service` to the host through `bridge`.
    ///
    /// The local player is captured once here and shared by every operation
    /// that needs a default player.
    #[instrument(skip_all)]
    pub fn new(service: Arc<dyn GameKitService>, bridge: Bridge) -> Self {
        let local = LocalPlayer::wrap(service.local_player());
        info!(
            platform = service.platform_name(),
            authenticated = local.is_authenticated(),
            "game center bound"
        );
        Self {
            service,
            bridge,
            local,
        }
    }

    pub fn local_player(&self) -> &LocalPlayer {
        &self.local
    }

    pub fn platform_name(&self) -> &str {
        self.service.platform_name()
    }
}

impl std::fmt::Debug for GameCenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameCenter")
            .field("platform", &self.service.platform_name())
            .field("local", &self.local)
            .finish_non_exhaustive()
    }
}
