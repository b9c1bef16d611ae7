// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use std::any::Any;

use kitbridge_core::error::Result;
use kitbridge_core::marshal::ToVariant;
use kitbridge_core::{HostObject, Variant};

use super::unknown_property;
use crate::native::AchievementDescriptionHandle;

const PROPERTIES: &[&str] = &[
    "identifier",
    "title",
    "unachieved_description",
    "achieved_description",
    "maximum_points",
    "is_hidden",
    "is_replayable",
    "group_identifier",
    "rarity_percent",
];

/// Read-only metadata for one achievement.
#[derive(Debug, Clone, PartialEq)]
pub struct AchievementDescription {
    handle: AchievementDescriptionHandle,
}

impl AchievementDescription {
    pub const CLASS: &'static str = "GKAchievementDescription";

    pub fn wrap(handle: AchievementDescriptionHandle) -> Self {
        Self { handle }
    }

    pub fn native(&self) -> &AchievementDescriptionHandle {
        &self.handle
    }

    pub fn identifier(&self) -> String {
        self.handle.read(|r| r.identifier.clone())
    }

    pub fn title(&self) -> String {
        self.handle.read(|r| r.title.clone())
    }
}

impl HostObject for AchievementDescription {
    fn class_name(&self) -> &'static str {
        Self::CLASS
    }

    fn property_list(&self) -> &'static [&'static str] {
        PROPERTIES
    }

    fn get(&self, property: &str) -> Result<Variant> {
        self.handle.read(|r| match property {
            "identifier" => Ok(r.identifier.to_variant()),
            "title" => Ok(r.title.to_variant()),
            "unachieved_description" => Ok(r.unachieved_description.to_variant()),
            "achieved_description" => Ok(r.achieved_description.to_variant()),
            "maximum_points" => Ok(r.maximum_points.to_variant()),
            "is_hidden" => Ok(r.is_hidden.to_variant()),
            "is_replayable" => Ok(r.is_replayable.to_variant()),
            // Absent stays nil, not "".
            "group_identifier" => Ok(r.group_identifier.to_variant()),
            "rarity_percent" => Ok(r.rarity_percent.to_variant()),
            other => Err(unknown_property(Self::CLASS, other)),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
