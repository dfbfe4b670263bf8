// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform call gateway.
//
// `invoke` checks the arguments against the descriptor, resolves the class
// and operation (memoized), calls the host, and checks the returned value
// against the declared return type. Resolution failures are never cached:
// the next call resolves again.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use jila_core::error::{BridgeError, Result};
use jila_core::types::{
    ArgValue, CallbackKind, ClassHandle, ObjectHandle, OperationDescriptor, OperationHandle,
    RequestId, ReturnValue, Signature,
};
use tracing::{debug, warn};

use crate::mailbox::Mailbox;
use crate::traits::HostPlatform;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct OperationKey {
    class: ClassHandle,
    name: String,
    signature: Signature,
}

#[derive(Debug, Default)]
struct ResolutionCache {
    classes: HashMap<String, ClassHandle>,
    operations: HashMap<OperationKey, OperationHandle>,
}

/// Resolves and invokes host operations on behalf of the application.
pub struct Gateway {
    host: Arc<dyn HostPlatform>,
    cache: Mutex<ResolutionCache>,
    mailbox: Mailbox,
}

impl Gateway {
    /// Wrap `host` and bind a fresh mailbox to its completion callbacks.
    pub fn new(host: Arc<dyn HostPlatform>) -> Self {
        let mailbox = Mailbox::new();
        host.bind_completions(mailbox.sink());
        tracing::info!(platform = host.platform_name(), "gateway bound to host");
        Self {
            host,
            cache: Mutex::new(ResolutionCache::default()),
            mailbox,
        }
    }

    pub fn host(&self) -> &dyn HostPlatform {
        self.host.as_ref()
    }

    /// Mailbox receiving completions for requests issued through
    /// [`Gateway::request`].
    pub fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    /// Synchronously invoke a host operation.
    pub fn invoke(&self, descriptor: &OperationDescriptor, args: &[ArgValue]) -> Result<ReturnValue> {
        descriptor.check_args(args).inspect_err(|e| {
            warn!(operation = %descriptor, error = %e, "rejected host call");
        })?;

        let (class, operation) = self.resolve(descriptor)?;

        let value = self
            .host
            .call(class, operation, descriptor, args)
            .inspect_err(|e| warn!(operation = %descriptor, error = %e, "host call failed"))?;

        if !value.conforms_to(&descriptor.signature.ret) {
            warn!(operation = %descriptor, actual = value.shape(), "host returned wrong shape");
            return Err(BridgeError::UnexpectedReturn {
                operation: descriptor.name.clone(),
                expected: descriptor.signature.ret.to_string(),
                actual: value.shape().into(),
            });
        }
        Ok(value)
    }

    /// Start a host operation whose result arrives later in the mailbox slot
    /// for `kind`.
    ///
    /// If the starting call fails the slot is not left pending.
    pub fn request(
        &self,
        kind: CallbackKind,
        descriptor: &OperationDescriptor,
        args: &[ArgValue],
    ) -> Result<RequestId> {
        let id = self.mailbox.begin(kind);
        match self.invoke(descriptor, args) {
            Ok(_) => {
                debug!(?kind, request = %id, operation = %descriptor.name, "async request started");
                Ok(id)
            }
            Err(e) => {
                self.mailbox.withdraw(kind, id);
                Err(e)
            }
        }
    }

    /// Release a host object returned by an earlier call.
    pub fn release(&self, object: ObjectHandle) -> Result<()> {
        self.host.release_object(object)
    }

    /// Forget every memoized resolution.
    pub fn invalidate(&self) {
        let mut cache = self.lock_cache();
        cache.classes.clear();
        cache.operations.clear();
        debug!("resolution cache cleared");
    }

    /// Number of memoized operation handles.
    pub fn cached_operations(&self) -> usize {
        self.lock_cache().operations.len()
    }

    fn lock_cache(&self) -> MutexGuard<'_, ResolutionCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn resolve(&self, descriptor: &OperationDescriptor) -> Result<(ClassHandle, OperationHandle)> {
        let mut cache = self.lock_cache();

        let class = match cache.classes.get(&descriptor.class) {
            Some(&class) => class,
            None => {
                let class = self.host.resolve_class(&descriptor.class).inspect_err(|e| {
                    warn!(class = %descriptor.class, error = %e, "class resolution failed");
                })?;
                debug!(class = %descriptor.class, "class resolved");
                cache.classes.insert(descriptor.class.clone(), class);
                class
            }
        };

        let key = OperationKey {
            class,
            name: descriptor.name.clone(),
            signature: descriptor.signature.clone(),
        };
        if let Some(&operation) = cache.operations.get(&key) {
            return Ok((class, operation));
        }

        let operation = self.host.resolve_operation(class, descriptor).inspect_err(|e| {
            warn!(operation = %descriptor, error = %e, "operation resolution failed");
        })?;
        debug!(operation = %descriptor, "operation resolved");
        cache.operations.insert(key, operation);
        Ok((class, operation))
    }
}
