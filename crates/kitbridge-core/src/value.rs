// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Host scripting value model.
//
// Everything the bridge hands to a host callback is a `Variant`. Host objects
// (entity wrappers, image resources) are reference-counted trait objects so a
// script holding one keeps the underlying native handle alive.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::error::{BridgeError, Result};

/// An object exposed to the host runtime with named properties.
pub trait HostObject: Send + Sync + fmt::Debug {
    /// Class name as registered with the host runtime.
    fn class_name(&self) -> &'static str;

    /// Every property the host may read, in declaration order.
    fn property_list(&self) -> &'static [&'static str];

    /// Read a property by name.
    fn get(&self, property: &str) -> Result<Variant>;

    /// Write a property by name.
    ///
    /// The default rejects every write: known properties are read-only,
    /// anything else is unknown.
    fn set(&self, property: &str, _value: Variant) -> Result<()> {
        if self.property_list().contains(&property) {
            Err(BridgeError::ReadOnlyProperty {
                class: self.class_name(),
                property: property.to_owned(),
            })
        } else {
            Err(BridgeError::UnknownProperty {
                class: self.class_name(),
                property: property.to_owned(),
            })
        }
    }

    /// Downcast support for host → native conversion.
    fn as_any(&self) -> &dyn Any;
}

/// Host byte buffer. Always an owned copy, never a view into native memory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PackedBytes(Vec<u8>);

impl PackedBytes {
    /// Copy `bytes` into a new host buffer.
    pub fn copy_from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for PackedBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

/// String-keyed host mapping. Key order is stable (sorted).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary(BTreeMap<String, Variant>);

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value` under `key`, replacing any previous entry.
    ///
    /// Inserting `Variant::Nil` makes the key present with a null value,
    /// which is distinct from the key being absent.
    pub fn insert(&mut self, key: impl Into<String>, value: Variant) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Variant> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Variant)> {
        self.0.iter()
    }
}

impl FromIterator<(String, Variant)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (String, Variant)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A value in the host scripting runtime.
#[derive(Debug, Clone, Default)]
pub enum Variant {
    /// Absence of a value. Also the bridged "no error".
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(PackedBytes),
    Array(Vec<Variant>),
    Dictionary(Dictionary),
    Object(Arc<dyn HostObject>),
}

impl Variant {
    /// Wrap a host object.
    pub fn object<T: HostObject + 'static>(object: T) -> Self {
        Self::Object(Arc::new(object))
    }

    /// Short type name used in mismatch errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Array(_) => "array",
            Self::Dictionary(_) => "dictionary",
            Self::Object(_) => "object",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b.as_slice()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Variant]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            Self::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    /// Clone out the host object if it is of type `T`.
    pub fn downcast<T: HostObject + Clone + 'static>(&self) -> Option<T> {
        match self {
            Self::Object(obj) => obj.as_any().downcast_ref::<T>().cloned(),
            _ => None,
        }
    }
}

impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Dictionary(a), Self::Dictionary(b)) => a == b,
            // Objects compare by reference, like the host runtime does.
            (Self::Object(a), Self::Object(b)) => std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
            _ => false,
        }
    }
}

impl Serialize for Variant {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Nil => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::String(s) => serializer.serialize_str(s),
            Self::Bytes(bytes) => {
                let mut seq = serializer.serialize_seq(Some(bytes.len()))?;
                for b in bytes.as_slice() {
                    seq.serialize_element(b)?;
                }
                seq.end()
            }
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Dictionary(dict) => dict.serialize(serializer),
            Self::Object(obj) => {
                // Properties that fail to read are left out of the dump.
                let properties: Dictionary = obj
                    .property_list()
                    .iter()
                    .filter_map(|name| obj.get(name).ok().map(|v| ((*name).to_owned(), v)))
                    .collect();
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("class", obj.class_name())?;
                map.serialize_entry("properties", &properties)?;
                map.end()
            }
        }
    }
}

impl Serialize for Dictionary {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Sample {
        name: String,
    }

    impl HostObject for Sample {
        fn class_name(&self) -> &'static str {
            "Sample"
        }

        fn property_list(&self) -> &'static [&'static str] {
            &["name"]
        }

        fn get(&self, property: &str) -> Result<Variant> {
            match property {
                "name" => Ok(Variant::String(self.name.clone())),
                other => Err(BridgeError::UnknownProperty {
                    class: "Sample",
                    property: other.to_owned(),
                }),
            }
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn nil_is_not_an_empty_string() {
        assert_ne!(Variant::Nil, Variant::String(String::new()));
        assert_ne!(Variant::Nil, Variant::Int(0));
    }

    #[test]
    fn absent_key_differs_from_null_key() {
        let mut dict = Dictionary::new();
        dict.insert("salt", Variant::Nil);
        assert!(dict.contains_key("salt"));
        assert!(!dict.contains_key("data"));
        assert_eq!(dict.get("salt"), Some(&Variant::Nil));
    }

    #[test]
    fn objects_compare_by_reference() {
        let a = Variant::object(Sample { name: "a".into() });
        let b = Variant::object(Sample { name: "a".into() });
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn downcast_returns_matching_type_only() {
        let v = Variant::object(Sample { name: "p".into() });
        assert_eq!(v.downcast::<Sample>().map(|p| p.name), Some("p".to_owned()));
        assert!(Variant::Int(3).downcast::<Sample>().is_none());
    }

    #[test]
    fn default_set_rejects_known_and_unknown_properties() {
        let sample = Sample { name: "p".into() };
        assert!(matches!(
            sample.set("name", Variant::Nil),
            Err(BridgeError::ReadOnlyProperty { .. })
        ));
        assert!(matches!(
            sample.set("colour", Variant::Nil),
            Err(BridgeError::UnknownProperty { .. })
        ));
    }

    #[test]
    fn serializes_objects_with_class_and_properties() {
        let mut dict = Dictionary::new();
        dict.insert("who", Variant::object(Sample { name: "p".into() }));
        dict.insert("raw", Variant::Bytes(PackedBytes::copy_from(&[1, 2])));
        dict.insert("none", Variant::Nil);

        let json = serde_json::to_value(Variant::Dictionary(dict)).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "none": null,
                "raw": [1, 2],
                "who": { "class": "Sample", "properties": { "name": "p" } }
            })
        );
    }
}
