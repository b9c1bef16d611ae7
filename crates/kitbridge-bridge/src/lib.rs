// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Kitbridge: asynchronous bridge between a native game service and a
// single-threaded host scripting runtime.
//
// Native calls complete on arbitrary threads. `Bridge` turns each completion
// into exactly one host callback with a fixed argument layout, queued for
// the host thread. `GameCenter` is the host-facing surface; `traits` is the
// seam a platform implements.

pub mod bridge;
pub mod completion;
pub mod entity;
pub mod gamecenter;
pub mod host;
pub mod memory;
pub mod native;
pub mod operation;
pub mod traits;

#[cfg(target_os = "ios")]
pub mod ios;

#[cfg(not(target_os = "ios"))]
pub mod stub;

use std::sync::Arc;

pub use bridge::Bridge;
pub use gamecenter::GameCenter;
pub use host::{Callable, HostHandle, HostQueue};
pub use operation::{CallbackShape, Operation};

/// The native game service for the target operating system.
///
/// Off iOS this is the stub service, whose every call fails with an
/// "unavailable" error.
pub fn platform_service() -> Arc<dyn traits::GameKitService> {
    #[cfg(target_os = "ios")]
    {
        Arc::new(ios::IosService::new())
    }
    #[cfg(not(target_os = "ios"))]
    {
        Arc::new(stub::StubService::new())
    }
}
