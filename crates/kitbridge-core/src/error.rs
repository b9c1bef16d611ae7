// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Kitbridge.
//
// These are the hard failures only: rejected construction, bad host arguments,
// misuse of the host queue. Native operation failures never surface here;
// they travel to the host callback as a plain string.

use thiserror::Error;

/// Top-level error type for all Kitbridge operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    // -- Construction / host arguments --
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("value out of range for {0}")]
    OutOfRange(&'static str),

    #[error("unknown property `{property}` on {class}")]
    UnknownProperty {
        class: &'static str,
        property: String,
    },

    #[error("property `{property}` on {class} is read-only")]
    ReadOnlyProperty {
        class: &'static str,
        property: String,
    },

    // -- Host hand-off --
    #[error("host queue pumped from a thread other than its owner")]
    WrongThread,

    #[error("host queue is closed")]
    HostQueueClosed,

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BridgeError>;
