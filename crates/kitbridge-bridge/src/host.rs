// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Hand-off from native completion threads to the host runtime's thread.
//
// Scripting runtimes are single-threaded. Native completions arrive on
// arbitrary threads, so they never call host code directly: they enqueue a
// `Deferred` call through a `HostHandle`, and the host runs it when it pumps
// its `HostQueue` from the thread that created it.

use std::fmt;
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, unbounded};
use kitbridge_core::error::{BridgeError, Result};
use kitbridge_core::{InvocationId, Variant};
use tracing::{debug, trace};

/// A host-side function reference, invoked at most once.
pub struct Callable {
    func: Box<dyn FnOnce(Vec<Variant>) + Send>,
}

impl Callable {
    pub fn new(func: impl FnOnce(Vec<Variant>) + Send + 'static) -> Self {
        Self {
            func: Box::new(func),
        }
    }

    /// Invoke with positional arguments. Consumes the handle.
    pub fn call(self, args: Vec<Variant>) {
        (self.func)(args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callable")
    }
}

/// A callback invocation waiting for the host thread.
#[derive(Debug)]
pub struct Deferred {
    pub invocation: InvocationId,
    pub operation: &'static str,
    pub callback: Callable,
    pub args: Vec<Variant>,
}

/// Host-thread end of the hand-off. Not shareable across threads.
pub struct HostQueue {
    owner: ThreadId,
    tx: Sender<Deferred>,
    rx: Receiver<Deferred>,
}

impl HostQueue {
    /// Create the queue on the host runtime's thread.
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            owner: thread::current().id(),
            tx,
            rx,
        }
    }

    /// A sendable handle that native threads use to enqueue calls.
    pub fn handle(&self) -> HostHandle {
        HostHandle {
            tx: self.tx.clone(),
        }
    }

    /// Number of calls waiting to run.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Run every call already queued. Returns how many ran.
    pub fn pump(&self) -> Result<usize> {
        self.require_owner()?;
        let mut ran = 0;
        while let Ok(deferred) = self.rx.try_recv() {
            run(deferred);
            ran += 1;
        }
        Ok(ran)
    }

    /// Run queued calls until `expected` have run or `timeout` elapses.
    pub fn pump_for(&self, expected: usize, timeout: Duration) -> Result<usize> {
        self.require_owner()?;
        let deadline = Instant::now() + timeout;
        let mut ran = 0;
        while ran < expected {
            let remaining = deadline.saturating_duration_since(Instant::now());
            // The queue holds a sender itself, so receiving can only time out.
            let Ok(deferred) = self.rx.recv_timeout(remaining) else {
                break;
            };
            run(deferred);
            ran += 1;
        }
        Ok(ran)
    }

    fn require_owner(&self) -> Result<()> {
        if thread::current().id() == self.owner {
            Ok(())
        } else {
            Err(BridgeError::WrongThread)
        }
    }
}

impl Default for HostQueue {
    fn default() -> Self {
        Self::new()
    }
}

fn run(deferred: Deferred) {
    trace!(
        invocation = %deferred.invocation,
        operation = deferred.operation,
        args = deferred.args.len(),
        "invoking host callback"
    );
    deferred.callback.call(deferred.args);
}

/// Sendable, cloneable producer side of a `HostQueue`.
#[derive(Clone)]
pub struct HostHandle {
    tx: Sender<Deferred>,
}

impl HostHandle {
    /// Queue a callback invocation for the host thread.
    pub fn defer(&self, deferred: Deferred) -> Result<()> {
        debug!(
            invocation = %deferred.invocation,
            operation = deferred.operation,
            "queued for host thread"
        );
        self.tx
            .send(deferred)
            .map_err(|_| BridgeError::HostQueueClosed)
    }
}

impl fmt::Debug for HostHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostHandle")
            .field("queued", &self.tx.len())
            .finish()
    }
}
