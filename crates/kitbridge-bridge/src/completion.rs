// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Native completion handlers.
//
// A `Completion` is what a native service implementation receives in place of
// a platform completion block. It settles at most once by construction
// (consumed on `complete`), and settles as `Dropped` if the native layer lets
// it go without firing, so the host callback can never be skipped.

use std::fmt;
use std::sync::{Arc, Mutex};

use kitbridge_core::NativeError;

/// How a native call ended.
#[derive(Debug)]
pub enum Settlement<T> {
    /// The platform invoked its completion. Either side may be absent, and
    /// occasionally both are present.
    Completed {
        payload: Option<T>,
        error: Option<NativeError>,
    },
    /// The handler was released without ever being invoked.
    Dropped,
}

type Handler<T> = Box<dyn FnOnce(Settlement<T>) + Send>;

/// Single-use completion handler for one native asynchronous call.
pub struct Completion<T> {
    handler: Option<Handler<T>>,
}

impl<T> Completion<T> {
    pub fn new(handler: impl FnOnce(Settlement<T>) + Send + 'static) -> Self {
        Self {
            handler: Some(Box::new(handler)),
        }
    }

    /// Deliver the platform's `(payload, error)` pair.
    pub fn complete(mut self, payload: Option<T>, error: Option<NativeError>) {
        if let Some(handler) = self.handler.take() {
            handler(Settlement::Completed { payload, error });
        }
    }

    pub fn succeed(self, payload: T) {
        self.complete(Some(payload), None);
    }

    pub fn fail(self, error: NativeError) {
        self.complete(None, Some(error));
    }

    /// Convert into a handle that tolerates being fired more than once.
    ///
    /// Platform blocks are callable any number of times; only the first
    /// firing reaches the host.
    pub fn into_shared(self) -> SharedCompletion<T> {
        SharedCompletion(Arc::new(Mutex::new(Some(self))))
    }
}

impl<T> Drop for Completion<T> {
    fn drop(&mut self) {
        if let Some(handler) = self.handler.take() {
            handler(Settlement::Dropped);
        }
    }
}

impl<T> fmt::Debug for Completion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("pending", &self.handler.is_some())
            .finish()
    }
}

/// Cloneable completion whose first `fire` wins.
pub struct SharedCompletion<T>(Arc<Mutex<Option<Completion<T>>>>);

impl<T> SharedCompletion<T> {
    /// Settle the completion. Returns `false` if it had already fired.
    pub fn fire(&self, payload: Option<T>, error: Option<NativeError>) -> bool {
        let taken = self.0.lock().expect("completion lock poisoned").take();
        match taken {
            Some(completion) => {
                completion.complete(payload, error);
                true
            }
            None => {
                tracing::debug!("native completion fired again, ignoring");
                false
            }
        }
    }
}

impl<T> Clone for SharedCompletion<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}
