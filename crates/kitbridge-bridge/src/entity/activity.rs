// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use std::any::Any;

use kitbridge_core::error::Result;
use kitbridge_core::marshal::ToVariant;
use kitbridge_core::{Dictionary, HostObject, Variant};

use super::unknown_property;
use crate::native::GameActivityDefinitionHandle;

const PROPERTIES: &[&str] = &["title", "details", "default_properties"];

/// Read-only view of a game activity definition.
#[derive(Debug, Clone, PartialEq)]
pub struct GameActivityDefinition {
    handle: GameActivityDefinitionHandle,
}

impl GameActivityDefinition {
    pub const CLASS: &'static str = "GKGameActivityDefinition";

    pub fn wrap(handle: GameActivityDefinitionHandle) -> Self {
        Self { handle }
    }

    pub fn native(&self) -> &GameActivityDefinitionHandle {
        &self.handle
    }

    /// String-to-string mapping of the properties new activities start with.
    pub fn default_properties(&self) -> Dictionary {
        self.handle.read(|r| {
            r.default_properties
                .iter()
                .map(|(k, v)| (k.clone(), v.to_variant()))
                .collect()
        })
    }
}

impl HostObject for GameActivityDefinition {
    fn class_name(&self) -> &'static str {
        Self::CLASS
    }

    fn property_list(&self) -> &'static [&'static str] {
        PROPERTIES
    }

    fn get(&self, property: &str) -> Result<Variant> {
        match property {
            "title" => Ok(self.handle.read(|r| r.title.to_variant())),
            "details" => Ok(self.handle.read(|r| r.details.to_variant())),
            "default_properties" => Ok(Variant::Dictionary(self.default_properties())),
            other => Err(unknown_property(Self::CLASS, other)),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::GameActivityDefinitionRecord;
    use kitbridge_core::BridgeError;

    #[test]
    fn exposes_definition_fields() {
        let mut record = GameActivityDefinitionRecord {
            title: "Boss Rush".into(),
            details: "Defeat every boss".into(),
            ..Default::default()
        };
        record.default_properties.insert("level".into(), "7".into());
        let activity = GameActivityDefinition::wrap(GameActivityDefinitionHandle::new(record));

        assert_eq!(activity.get("title").expect("title"), Variant::String("Boss Rush".into()));
        let props = activity.get("default_properties").expect("properties");
        let props = props.as_dictionary().expect("mapping");
        assert_eq!(props.get("level"), Some(&Variant::String("7".into())));
    }

    #[test]
    fn empty_definition_has_empty_strings_and_mapping() {
        let activity = GameActivityDefinition::wrap(GameActivityDefinitionHandle::new(
            GameActivityDefinitionRecord::default(),
        ));
        assert_eq!(activity.get("details").expect("details"), Variant::String(String::new()));
        assert_eq!(
            activity.get("default_properties").expect("properties"),
            Variant::Dictionary(Dictionary::new())
        );
    }

    #[test]
    fn every_property_is_read_only() {
        let activity = GameActivityDefinition::wrap(GameActivityDefinitionHandle::new(
            GameActivityDefinitionRecord::default(),
        ));
        assert!(matches!(
            activity.set("title", Variant::String("x".into())),
            Err(BridgeError::ReadOnlyProperty { .. })
        ));
        assert!(matches!(
            activity.get("icon"),
            Err(BridgeError::UnknownProperty { .. })
        ));
    }
}
