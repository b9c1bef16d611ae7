// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use std::any::Any;

use kitbridge_core::error::Result;
use kitbridge_core::marshal::ToVariant;
use kitbridge_core::{HostObject, Variant};

use super::unknown_property;
use crate::native::{LeaderboardHandle, LeaderboardSetHandle};

const LEADERBOARD_PROPERTIES: &[&str] = &["base_leaderboard_id", "title", "type", "group_identifier"];

const SET_PROPERTIES: &[&str] = &["identifier", "title", "group_identifier"];

#[derive(Debug, Clone, PartialEq)]
pub struct Leaderboard {
    handle: LeaderboardHandle,
}

impl Leaderboard {
    pub const CLASS: &'static str = "GKLeaderboard";

    pub fn wrap(handle: LeaderboardHandle) -> Self {
        Self { handle }
    }

    pub fn native(&self) -> &LeaderboardHandle {
        &self.handle
    }

    pub fn base_leaderboard_id(&self) -> String {
        self.handle.read(|r| r.base_leaderboard_id.clone())
    }
}

impl HostObject for Leaderboard {
    fn class_name(&self) -> &'static str {
        Self::CLASS
    }

    fn property_list(&self) -> &'static [&'static str] {
        LEADERBOARD_PROPERTIES
    }

    fn get(&self, property: &str) -> Result<Variant> {
        self.handle.read(|r| match property {
            "base_leaderboard_id" => Ok(r.base_leaderboard_id.to_variant()),
            "title" => Ok(r.title.to_variant()),
            "type" => Ok(Variant::Int(r.kind.host_value())),
            "group_identifier" => Ok(r.group_identifier.to_variant()),
            other => Err(unknown_property(Self::CLASS, other)),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A named grouping of leaderboards.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardSet {
    handle: LeaderboardSetHandle,
}

impl LeaderboardSet {
    pub const CLASS: &'static str = "GKLeaderboardSet";

    pub fn wrap(handle: LeaderboardSetHandle) -> Self {
        Self { handle }
    }

    pub fn native(&self) -> &LeaderboardSetHandle {
        &self.handle
    }
}

impl HostObject for LeaderboardSet {
    fn class_name(&self) -> &'static str {
        Self::CLASS
    }

    fn property_list(&self) -> &'static [&'static str] {
        SET_PROPERTIES
    }

    fn get(&self, property: &str) -> Result<Variant> {
        self.handle.read(|r| match property {
            "identifier" => Ok(r.identifier.to_variant()),
            "title" => Ok(r.title.to_variant()),
            "group_identifier" => Ok(r.group_identifier.to_variant()),
            other => Err(unknown_property(Self::CLASS, other)),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
