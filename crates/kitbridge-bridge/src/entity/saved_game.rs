// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use std::any::Any;

use kitbridge_core::error::Result;
use kitbridge_core::marshal::ToVariant;
use kitbridge_core::{HostObject, Variant};

use super::unknown_property;
use crate::native::SavedGameHandle;

const PROPERTIES: &[&str] = &["name", "device_name", "modification_date"];

/// Metadata for one cloud save. The bytes are fetched separately.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedGame {
    handle: SavedGameHandle,
}

impl SavedGame {
    pub const CLASS: &'static str = "GKSavedGame";

    pub fn wrap(handle: SavedGameHandle) -> Self {
        Self { handle }
    }

    pub fn native(&self) -> &SavedGameHandle {
        &self.handle
    }

    pub fn name(&self) -> String {
        self.handle.read(|r| r.name.clone())
    }
}

impl HostObject for SavedGame {
    fn class_name(&self) -> &'static str {
        Self::CLASS
    }

    fn property_list(&self) -> &'static [&'static str] {
        PROPERTIES
    }

    fn get(&self, property: &str) -> Result<Variant> {
        self.handle.read(|r| match property {
            "name" => Ok(r.name.to_variant()),
            "device_name" => Ok(r.device_name.to_variant()),
            "modification_date" => Ok(r.modification_date.to_variant()),
            other => Err(unknown_property(Self::CLASS, other)),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
