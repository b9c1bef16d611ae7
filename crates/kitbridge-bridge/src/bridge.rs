// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The async bridge.
//
// `Bridge::call` is the only path from a native completion to a host
// callback. It owns the delivery rules so individual operations cannot get
// them wrong:
//
// - exactly one callback invocation per call (dropped completions included),
// - the callback's argument count and order come from `Operation::shape`,
// - an error always wins over a payload that arrived alongside it,
// - the callback runs on the host thread, never on the native one.

use std::sync::Arc;

use kitbridge_core::{BridgeConfig, InvocationId, Variant, normalize};
use tracing::{debug, error, info_span, warn};

use crate::completion::{Completion, Settlement};
use crate::host::{Callable, Deferred, HostHandle};
use crate::operation::Operation;

/// Result of marshaling a successful native payload: the host value, or a
/// failure message when the payload cannot be represented.
pub type Marshaled = std::result::Result<Variant, String>;

/// Stateless dispatcher shared by every bridged operation.
#[derive(Debug, Clone)]
pub struct Bridge {
    host: HostHandle,
    messages: Arc<Messages>,
}

#[derive(Debug)]
struct Messages {
    image_unavailable: String,
    dropped_completion: String,
}

impl Bridge {
    pub fn new(host: HostHandle, config: &BridgeConfig) -> Self {
        Self {
            host,
            messages: Arc::new(Messages {
                image_unavailable: config.image_unavailable_message.clone(),
                dropped_completion: config.dropped_completion_message.clone(),
            }),
        }
    }

    /// Message for a resource load that produced neither resource nor error.
    pub fn image_unavailable_message(&self) -> &str {
        &self.messages.image_unavailable
    }

    /// Issue one native asynchronous call and route its outcome to `callback`.
    ///
    /// `issue` receives the completion handler to pass to the native layer.
    /// `marshal` runs on the completion thread and only on the success path;
    /// it receives the payload exactly as the platform delivered it, which may
    /// be absent.
    pub fn call<T, I, M>(&self, operation: Operation, callback: Callable, issue: I, marshal: M)
    where
        T: Send + 'static,
        I: FnOnce(Completion<T>),
        M: FnOnce(Option<T>) -> Marshaled + Send + 'static,
    {
        let invocation = InvocationId::new();
        let span = info_span!(
            "bridge_call",
            operation = operation.name(),
            invocation = %invocation
        );
        let host = self.host.clone();
        let messages = Arc::clone(&self.messages);
        let completion_span = span.clone();
        let completion = Completion::new(move |settlement: Settlement<T>| {
            let _entered = completion_span.enter();
            let args = settle(operation, settlement, marshal, &messages);
            let deferred = Deferred {
                invocation,
                operation: operation.name(),
                callback,
                args,
            };
            if let Err(e) = host.defer(deferred) {
                warn!(error = %e, "host released the bridge before completion, dropping result");
            }
        });

        span.in_scope(|| {
            debug!("issuing native call");
            issue(completion);
        });
    }
}

/// Turn a native settlement into the operation's callback arguments.
fn settle<T, M>(
    operation: Operation,
    settlement: Settlement<T>,
    marshal: M,
    messages: &Messages,
) -> Vec<Variant>
where
    M: FnOnce(Option<T>) -> Marshaled,
{
    let shape = operation.shape();
    match settlement {
        Settlement::Dropped => {
            warn!("native completion dropped without firing");
            shape.failure_args(messages.dropped_completion.clone())
        }
        Settlement::Completed { payload, error } => {
            if let Some(message) = normalize(error.as_ref()) {
                if payload.is_some() {
                    warn!(
                        error = %message,
                        "native call returned payload and error, discarding payload"
                    );
                } else {
                    debug!(error = %message, "native call failed");
                }
                return shape.failure_args(message);
            }
            match marshal(payload) {
                Ok(value) if shape.accepts(&value) => {
                    debug!("native call succeeded");
                    shape.success_args(value)
                }
                Ok(value) => {
                    error!(
                        found = value.type_name(),
                        "marshaled payload does not match callback shape"
                    );
                    shape.failure_args(format!(
                        "{} produced a malformed {} payload",
                        operation.name(),
                        value.type_name()
                    ))
                }
                Err(message) => {
                    debug!(error = %message, "native payload unusable");
                    shape.failure_args(message)
                }
            }
        }
    }
}
