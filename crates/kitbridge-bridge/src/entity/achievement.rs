// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Achievement progress records. The only entity hosts can create themselves.

use std::any::Any;

use kitbridge_core::error::{BridgeError, Result};
use kitbridge_core::marshal::{FromVariant, ToVariant};
use kitbridge_core::{HostObject, Variant};

use super::{LocalPlayer, Player, read_only_property, unknown_property};
use crate::native::{AchievementHandle, AchievementRecord};

const PROPERTIES: &[&str] = &[
    "identifier",
    "player",
    "percent_complete",
    "is_completed",
    "shows_completion_banner",
    "last_reported_date",
];

/// Host-supplied parameters for a new achievement.
#[derive(Debug, Clone, Default)]
pub struct AchievementRequest {
    /// Required. Must contain something other than whitespace.
    pub identifier: Option<String>,
    /// Player the progress belongs to. Defaults to the local player.
    pub player: Option<Player>,
}

/// Progress toward one achievement for one player.
#[derive(Debug, Clone, PartialEq)]
pub struct Achievement {
    handle: AchievementHandle,
}

impl Achievement {
    pub const CLASS: &'static str = "GKAchievement";

    pub fn wrap(handle: AchievementHandle) -> Self {
        Self { handle }
    }

    /// Build a new native achievement from host parameters.
    ///
    /// Fails before anything native is created if the identifier is missing
    /// or blank.
    pub fn synthesize(request: AchievementRequest, local: &LocalPlayer) -> Result<Self> {
        let identifier = request
            .identifier
            .filter(|id| !id.trim().is_empty())
            .ok_or(BridgeError::MissingField("identifier"))?;
        let player = match request.player {
            Some(player) => player.native().clone(),
            None => local.native().player.clone(),
        };
        let record = AchievementRecord::new(identifier, Some(player));
        Ok(Self::wrap(AchievementHandle::new(record)))
    }

    /// `synthesize` with positional host arguments `(identifier, player)`.
    ///
    /// `player` may be nil, a `GKPlayer` or the `GKLocalPlayer`.
    pub fn from_host_args(identifier: &Variant, player: &Variant, local: &LocalPlayer) -> Result<Self> {
        let identifier = Option::<String>::from_variant(identifier)?;
        let player = match player {
            Variant::Nil => None,
            other => Some(
                other
                    .downcast::<Player>()
                    .or_else(|| other.downcast::<LocalPlayer>().map(|l| l.as_player()))
                    .ok_or(BridgeError::TypeMismatch {
                        expected: Player::CLASS,
                        found: other.type_name(),
                    })?,
            ),
        };
        Self::synthesize(AchievementRequest { identifier, player }, local)
    }

    pub fn native(&self) -> &AchievementHandle {
        &self.handle
    }

    pub fn same_native(&self, other: &Self) -> bool {
        self.handle.same_object(&other.handle)
    }

    pub fn identifier(&self) -> String {
        self.handle.read(|r| r.identifier.clone())
    }

    pub fn set_identifier(&self, identifier: impl Into<String>) {
        let identifier = identifier.into();
        self.handle.write(|r| r.identifier = identifier);
    }

    pub fn player(&self) -> Option<Player> {
        self.handle.read(|r| r.player.clone()).map(Player::wrap)
    }

    pub fn percent_complete(&self) -> f64 {
        self.handle.read(|r| r.percent_complete)
    }

    pub fn set_percent_complete(&self, percent: f64) {
        self.handle.write(|r| r.percent_complete = percent);
    }

    pub fn is_completed(&self) -> bool {
        self.handle.read(AchievementRecord::is_completed)
    }

    pub fn shows_completion_banner(&self) -> bool {
        self.handle.read(|r| r.shows_completion_banner)
    }

    pub fn set_shows_completion_banner(&self, shows: bool) {
        self.handle.write(|r| r.shows_completion_banner = shows);
    }
}

impl HostObject for Achievement {
    fn class_name(&self) -> &'static str {
        Self::CLASS
    }

    fn property_list(&self) -> &'static [&'static str] {
        PROPERTIES
    }

    fn get(&self, property: &str) -> Result<Variant> {
        match property {
            "identifier" => Ok(self.identifier().to_variant()),
            "player" => Ok(self.player().map(Variant::object).unwrap_or_default()),
            "percent_complete" => Ok(self.percent_complete().to_variant()),
            "is_completed" => Ok(self.is_completed().to_variant()),
            "shows_completion_banner" => Ok(self.shows_completion_banner().to_variant()),
            "last_reported_date" => Ok(self.handle.read(|r| r.last_reported_date.to_variant())),
            other => Err(unknown_property(Self::CLASS, other)),
        }
    }

    fn set(&self, property: &str, value: Variant) -> Result<()> {
        match property {
            "identifier" => self.set_identifier(String::from_variant(&value)?),
            "percent_complete" => self.set_percent_complete(f64::from_variant(&value)?),
            "shows_completion_banner" => {
                self.set_shows_completion_banner(bool::from_variant(&value)?)
            }
            other if PROPERTIES.contains(&other) => {
                return Err(read_only_property(Self::CLASS, other));
            }
            other => return Err(unknown_property(Self::CLASS, other)),
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
