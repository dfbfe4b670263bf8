// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The seam between the portable core and a concrete host platform.
//
// A host knows how to find classes and operations by name, call them with
// typed arguments, and hand asynchronous results back through a completion
// sink. Everything above this trait (memoization, argument checking,
// mailbox bookkeeping) lives in the gateway.

use jila_core::error::Result;
use jila_core::types::{
    ArgValue, ClassHandle, ObjectHandle, OperationDescriptor, OperationHandle, ReturnValue,
};

use crate::mailbox::CompletionSink;

/// A host platform that can resolve and invoke named operations.
///
/// Implementations must release every temporary host reference they create
/// inside a call before returning, on success and on error.
pub trait HostPlatform: Send + Sync {
    /// Human-readable platform name (e.g. "Android", "Desktop").
    fn platform_name(&self) -> &str;

    /// Phase one: look up the class implementing an operation.
    fn resolve_class(&self, class: &str) -> Result<ClassHandle>;

    /// Phase two: look up `descriptor.name` with exactly
    /// `descriptor.signature` on an already-resolved class.
    fn resolve_operation(
        &self,
        class: ClassHandle,
        descriptor: &OperationDescriptor,
    ) -> Result<OperationHandle>;

    /// Invoke a resolved operation on the host object.
    ///
    /// `args` have already been checked against the descriptor.
    fn call(
        &self,
        class: ClassHandle,
        operation: OperationHandle,
        descriptor: &OperationDescriptor,
        args: &[ArgValue],
    ) -> Result<ReturnValue>;

    /// Release a long-lived object reference returned by `call`.
    fn release_object(&self, object: ObjectHandle) -> Result<()>;

    /// Install the sink asynchronous completions are written into.
    /// A later call replaces the previous sink.
    fn bind_completions(&self, sink: CompletionSink);
}
