// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Kitbridge: Host value model, marshaling and error types shared across crates.

pub mod config;
pub mod error;
pub mod marshal;
pub mod normalize;
pub mod types;
pub mod value;

pub use config::BridgeConfig;
pub use error::BridgeError;
pub use normalize::{NativeError, normalize};
pub use types::*;
pub use value::{Dictionary, HostObject, PackedBytes, Variant};
