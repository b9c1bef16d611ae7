// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Entity wrappers: host objects that own exactly one native handle.
//
// Wrappers are created on demand (one per bridged result or host request)
// and never cached. Reads and writes go straight through to the native
// object, so two wrappers of the same object always agree.

mod achievement;
mod activity;
mod description;
mod image;
mod leaderboard;
mod player;
mod saved_game;

pub use achievement::{Achievement, AchievementRequest};
pub use activity::GameActivityDefinition;
pub use description::AchievementDescription;
pub use image::Image;
pub use leaderboard::{Leaderboard, LeaderboardSet};
pub use player::{LocalPlayer, Player};
pub use saved_game::SavedGame;

use kitbridge_core::BridgeError;

pub(crate) fn unknown_property(class: &'static str, property: &str) -> BridgeError {
    BridgeError::UnknownProperty {
        class,
        property: property.to_owned(),
    }
}

pub(crate) fn read_only_property(class: &'static str, property: &str) -> BridgeError {
    BridgeError::ReadOnlyProperty {
        class,
        property: property.to_owned(),
    }
}
