// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Native error normalization.
//
// Whatever the native layer reports, the host sees one thing: `nil` on
// success, a non-empty human-readable string on failure. No classification
// (network vs. auth vs. permission) survives the boundary.

use std::fmt;

use crate::value::Variant;

/// Message used when a native error carries nothing printable at all.
pub const UNKNOWN_NATIVE_ERROR: &str = "unknown native error";

/// A failure object as reported by the native service layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeError {
    /// Error domain (e.g. `GKErrorDomain`).
    pub domain: String,
    /// Domain-specific numeric code.
    pub code: i64,
    /// Localized description supplied by the platform, if any.
    pub localized_description: Option<String>,
}

impl NativeError {
    pub fn new(domain: impl Into<String>, code: i64) -> Self {
        Self {
            domain: domain.into(),
            code,
            localized_description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.localized_description = Some(description.into());
        self
    }

    /// Stable, never-empty description of this error.
    pub fn description(&self) -> String {
        if let Some(text) = self
            .localized_description
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
        {
            return text.to_owned();
        }
        let domain = self.domain.trim();
        if domain.is_empty() {
            UNKNOWN_NATIVE_ERROR.to_owned()
        } else {
            format!("{domain} error {}", self.code)
        }
    }
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

impl std::error::Error for NativeError {}

/// Normalize an optional native error into the bridged representation.
///
/// `None` in, `None` out; otherwise a non-empty description.
pub fn normalize(error: Option<&NativeError>) -> Option<String> {
    error.map(NativeError::description)
}

/// The bridged error as a host value: `Nil` or `String`.
pub fn bridged_error_variant(error: Option<String>) -> Variant {
    match error {
        Some(message) => Variant::String(message),
        None => Variant::Nil,
    }
}
