// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use std::any::Any;

use kitbridge_core::error::Result;
use kitbridge_core::marshal::ToVariant;
use kitbridge_core::{HostObject, Variant};

use super::unknown_property;
use crate::native::{LocalPlayerHandle, PlayerHandle, PlayerRecord};

const PLAYER_PROPERTIES: &[&str] = &["game_player_id", "team_player_id", "alias", "display_name"];

const LOCAL_PLAYER_PROPERTIES: &[&str] = &[
    "game_player_id",
    "team_player_id",
    "alias",
    "display_name",
    "is_authenticated",
    "is_underage",
    "is_multiplayer_gaming_restricted",
    "is_personalized_communication_restricted",
];

fn player_property(record: &PlayerRecord, property: &str) -> Option<Variant> {
    let value = match property {
        "game_player_id" => record.game_player_id.to_variant(),
        "team_player_id" => record.team_player_id.to_variant(),
        "alias" => record.alias.to_variant(),
        "display_name" => record.display_name.to_variant(),
        _ => return None,
    };
    Some(value)
}

/// Any player known to the platform.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    handle: PlayerHandle,
}

impl Player {
    pub const CLASS: &'static str = "GKPlayer";

    pub fn wrap(handle: PlayerHandle) -> Self {
        Self { handle }
    }

    pub fn native(&self) -> &PlayerHandle {
        &self.handle
    }

    pub fn same_native(&self, other: &Self) -> bool {
        self.handle.same_object(&other.handle)
    }

    pub fn game_player_id(&self) -> String {
        self.handle.read(|r| r.game_player_id.clone())
    }

    pub fn alias(&self) -> String {
        self.handle.read(|r| r.alias.clone())
    }

    pub fn display_name(&self) -> String {
        self.handle.read(|r| r.display_name.clone())
    }
}

impl HostObject for Player {
    fn class_name(&self) -> &'static str {
        Self::CLASS
    }

    fn property_list(&self) -> &'static [&'static str] {
        PLAYER_PROPERTIES
    }

    fn get(&self, property: &str) -> Result<Variant> {
        self.handle
            .read(|r| player_property(r, property))
            .ok_or_else(|| unknown_property(Self::CLASS, property))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The signed-in player on this device.
///
/// Created once at host startup from the native service and injected into
/// the operations that act on the player's behalf.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalPlayer {
    handle: LocalPlayerHandle,
}

impl LocalPlayer {
    pub const CLASS: &'static str = "GKLocalPlayer";

    pub fn wrap(handle: LocalPlayerHandle) -> Self {
        Self { handle }
    }

    pub fn native(&self) -> &LocalPlayerHandle {
        &self.handle
    }

    /// The local player viewed as a plain player.
    pub fn as_player(&self) -> Player {
        Player::wrap(self.handle.player.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.handle.status.read(|s| s.is_authenticated)
    }

    pub fn is_underage(&self) -> bool {
        self.handle.status.read(|s| s.is_underage)
    }
}

impl HostObject for LocalPlayer {
    fn class_name(&self) -> &'static str {
        Self::CLASS
    }

    fn property_list(&self) -> &'static [&'static str] {
        LOCAL_PLAYER_PROPERTIES
    }

    fn get(&self, property: &str) -> Result<Variant> {
        if let Some(value) = self.handle.player.read(|r| player_property(r, property)) {
            return Ok(value);
        }
        self.handle.status.read(|s| match property {
            "is_authenticated" => Ok(Variant::Bool(s.is_authenticated)),
            "is_underage" => Ok(Variant::Bool(s.is_underage)),
            "is_multiplayer_gaming_restricted" => {
                Ok(Variant::Bool(s.is_multiplayer_gaming_restricted))
            }
            "is_personalized_communication_restricted" => {
                Ok(Variant::Bool(s.is_personalized_communication_restricted))
            }
            other => Err(unknown_property(Self::CLASS, other)),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
