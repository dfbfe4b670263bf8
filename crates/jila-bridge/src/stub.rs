// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory host for tests, CI and the desktop runner.
//
// Operations are registered as closures under (class, name, signature).
// Every call that reaches a handler is appended to a journal, which is how
// tests observe host-side mutation. String arguments are wrapped in
// counted local references for the duration of the call so tests can check
// that nothing outlives it.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use jila_core::error::{BridgeError, Result};
use jila_core::types::{
    ArgValue, ClassHandle, Completion, ObjectHandle, OperationDescriptor, OperationHandle,
    ReturnValue, Signature,
};

use crate::capabilities::Capability;
use crate::mailbox::CompletionSink;
use crate::traits::HostPlatform;

/// Resource id the stub assigns to `ic_launcher`/`drawable`.
pub const STUB_ICON_ID: i32 = 0x7f08_0000;

type Handler = Arc<dyn Fn(&StubCall<'_>) -> Result<ReturnValue> + Send + Sync>;

struct Registered {
    class: ClassHandle,
    name: String,
    signature: Signature,
    handler: Handler,
}

/// A call that reached a registered handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostCall {
    pub operation: String,
    pub args: Vec<ArgValue>,
}

#[derive(Default)]
struct Inner {
    classes: Vec<String>,
    operations: Vec<Registered>,
    objects: HashMap<u32, String>,
    next_object: u32,
    journal: Vec<HostCall>,
    last_error: Option<String>,
}

/// Scriptable host platform.
pub struct StubHost {
    name: String,
    inner: Mutex<Inner>,
    sink: Mutex<Option<CompletionSink>>,
    class_lookups: AtomicUsize,
    operation_lookups: AtomicUsize,
    live_refs: Arc<AtomicUsize>,
}

impl Default for StubHost {
    fn default() -> Self {
        Self::new()
    }
}

impl StubHost {
    /// Empty host: no classes, no operations.
    pub fn new() -> Self {
        Self::named("Stub")
    }

    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            inner: Mutex::new(Inner::default()),
            sink: Mutex::new(None),
            class_lookups: AtomicUsize::new(0),
            operation_lookups: AtomicUsize::new(0),
            live_refs: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Host implementing the full capability surface on `host_class`.
    ///
    /// Handlers only record the call, except `listFiles` (reads the real
    /// filesystem), `getResId` (knows `ic_launcher`/`drawable`),
    /// `getApplicationContext` (hands out an object) and `getLastError`
    /// (returns whatever [`StubHost::set_last_error`] stored).
    pub fn with_capabilities(host_class: &str) -> Self {
        Self::new().register_capabilities(host_class)
    }

    /// Register the capability surface on `host_class` (see
    /// [`StubHost::with_capabilities`]).
    pub fn register_capabilities(self, host_class: &str) -> Self {
        for capability in Capability::ALL {
            let signature = capability.signature();
            match capability {
                Capability::ListFiles => {
                    self.register(host_class, capability.name(), signature, |call| {
                        let listing = list_dir(Path::new(call.str_arg(0)?), call.bool_arg(1)?)?;
                        Ok(ReturnValue::StrArray(listing))
                    })
                }
                Capability::ResolveResourceId => {
                    self.register(host_class, capability.name(), signature, |call| {
                        let id = match (call.str_arg(0)?, call.str_arg(1)?) {
                            ("ic_launcher", "drawable") => STUB_ICON_ID,
                            _ => 0,
                        };
                        Ok(ReturnValue::Int(id))
                    })
                }
                Capability::ApplicationContext => {
                    self.register(host_class, capability.name(), signature, |call| {
                        Ok(ReturnValue::Object(call.new_object("android.app.Application")))
                    })
                }
                Capability::LastHostError => {
                    self.register(host_class, capability.name(), signature, |call| {
                        Ok(ReturnValue::Str(call.last_error()))
                    })
                }
                Capability::PostNotification
                | Capability::CreateNotificationChannel
                | Capability::RequestPermission
                | Capability::OpenFolder => {
                    self.register(host_class, capability.name(), signature, |_| {
                        Ok(ReturnValue::Void)
                    })
                }
            }
        }
        self
    }

    /// Register (or replace) an operation.
    pub fn register<F>(&self, class: &str, name: &str, signature: Signature, handler: F)
    where
        F: Fn(&StubCall<'_>) -> Result<ReturnValue> + Send + Sync + 'static,
    {
        let mut inner = self.lock();
        let class = match inner.classes.iter().position(|c| c == class) {
            Some(index) => ClassHandle(index as u32),
            None => {
                inner.classes.push(class.to_owned());
                ClassHandle(inner.classes.len() as u32 - 1)
            }
        };
        let handler: Handler = Arc::new(handler);
        match inner
            .operations
            .iter_mut()
            .find(|op| op.class == class && op.name == name && op.signature == signature)
        {
            Some(existing) => existing.handler = handler,
            None => inner.operations.push(Registered {
                class,
                name: name.to_owned(),
                signature,
                handler,
            }),
        }
    }

    /// Deliver a completion through the bound sink, as a host callback
    /// thread would. Returns `false` when no sink is bound.
    pub fn complete(&self, completion: Completion) -> bool {
        match self.bound_sink() {
            Some(sink) => {
                sink.deliver(completion);
                true
            }
            None => {
                tracing::warn!(?completion, "completion dropped: no sink bound");
                false
            }
        }
    }

    /// Set the string `getLastError` reports.
    pub fn set_last_error(&self, error: Option<&str>) {
        self.lock().last_error = error.map(str::to_owned);
    }

    /// Calls that reached a handler, oldest first.
    pub fn journal(&self) -> Vec<HostCall> {
        self.lock().journal.clone()
    }

    /// Number of host objects currently held.
    pub fn live_objects(&self) -> usize {
        self.lock().objects.len()
    }

    /// Temporary references currently alive.
    pub fn live_refs(&self) -> usize {
        self.live_refs.load(Ordering::SeqCst)
    }

    pub fn class_lookups(&self) -> usize {
        self.class_lookups.load(Ordering::SeqCst)
    }

    pub fn operation_lookups(&self) -> usize {
        self.operation_lookups.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn bound_sink(&self) -> Option<CompletionSink> {
        self.sink
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl HostPlatform for StubHost {
    fn platform_name(&self) -> &str {
        &self.name
    }

    fn resolve_class(&self, class: &str) -> Result<ClassHandle> {
        self.class_lookups.fetch_add(1, Ordering::SeqCst);
        self.lock()
            .classes
            .iter()
            .position(|c| c == class)
            .map(|index| ClassHandle(index as u32))
            .ok_or_else(|| BridgeError::ClassNotFound {
                class: class.to_owned(),
                detail: "not registered with the stub host".into(),
            })
    }

    fn resolve_operation(
        &self,
        class: ClassHandle,
        descriptor: &OperationDescriptor,
    ) -> Result<OperationHandle> {
        self.operation_lookups.fetch_add(1, Ordering::SeqCst);
        self.lock()
            .operations
            .iter()
            .position(|op| {
                op.class == class
                    && op.name == descriptor.name
                    && op.signature == descriptor.signature
            })
            .map(|index| OperationHandle(index as u32))
            .ok_or_else(|| BridgeError::OperationNotFound {
                class: descriptor.class.clone(),
                operation: descriptor.name.clone(),
                signature: descriptor.signature.to_string(),
            })
    }

    fn call(
        &self,
        _class: ClassHandle,
        operation: OperationHandle,
        descriptor: &OperationDescriptor,
        args: &[ArgValue],
    ) -> Result<ReturnValue> {
        let handler = {
            let mut inner = self.lock();
            let handler = inner
                .operations
                .get(operation.0 as usize)
                .map(|op| Arc::clone(&op.handler))
                .ok_or_else(|| BridgeError::Invocation {
                    operation: descriptor.name.clone(),
                    message: format!("stale operation handle {}", operation.0),
                })?;
            inner.journal.push(HostCall {
                operation: descriptor.name.clone(),
                args: args.to_vec(),
            });
            handler
        };

        let _locals: Vec<LocalRef> = args
            .iter()
            .filter(|arg| matches!(arg, ArgValue::Str(_)))
            .map(|_| LocalRef::new(&self.live_refs))
            .collect();

        let call = StubCall {
            args,
            operation: &descriptor.name,
            host: self,
        };
        handler(&call)
    }

    fn release_object(&self, object: ObjectHandle) -> Result<()> {
        self.lock()
            .objects
            .remove(&object.0)
            .map(|_| ())
            .ok_or(BridgeError::UnknownObject(object))
    }

    fn bind_completions(&self, sink: CompletionSink) {
        *self.sink.lock().unwrap_or_else(PoisonError::into_inner) = Some(sink);
    }
}

/// View of one call handed to a stub handler.
pub struct StubCall<'a> {
    pub args: &'a [ArgValue],
    operation: &'a str,
    host: &'a StubHost,
}

impl StubCall<'_> {
    pub fn str_arg(&self, index: usize) -> Result<&str> {
        match self.args.get(index) {
            Some(ArgValue::Str(s)) => Ok(s),
            _ => Err(self.missing(index, "string")),
        }
    }

    pub fn int_arg(&self, index: usize) -> Result<i32> {
        match self.args.get(index) {
            Some(ArgValue::Int(v)) => Ok(*v),
            _ => Err(self.missing(index, "int")),
        }
    }

    pub fn bool_arg(&self, index: usize) -> Result<bool> {
        match self.args.get(index) {
            Some(ArgValue::Bool(v)) => Ok(*v),
            _ => Err(self.missing(index, "bool")),
        }
    }

    /// Sink for completions, if the host has been bound to a mailbox.
    pub fn sink(&self) -> Option<CompletionSink> {
        self.host.bound_sink()
    }

    /// Hand out a new long-lived host object.
    pub fn new_object(&self, label: &str) -> ObjectHandle {
        let mut inner = self.host.lock();
        inner.next_object += 1;
        let id = inner.next_object;
        inner.objects.insert(id, label.to_owned());
        ObjectHandle(id)
    }

    pub fn last_error(&self) -> Option<String> {
        self.host.lock().last_error.clone()
    }

    /// Temporary references alive on the host right now.
    pub fn live_refs(&self) -> usize {
        self.host.live_refs()
    }

    fn missing(&self, index: usize, expected: &str) -> BridgeError {
        BridgeError::Invocation {
            operation: self.operation.to_owned(),
            message: format!("argument {index} is not a {expected}"),
        }
    }
}

/// Counted stand-in for a host local reference.
struct LocalRef {
    live: Arc<AtomicUsize>,
}

impl LocalRef {
    fn new(live: &Arc<AtomicUsize>) -> Self {
        live.fetch_add(1, Ordering::SeqCst);
        Self {
            live: Arc::clone(live),
        }
    }
}

impl Drop for LocalRef {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// List a folder the way the host's `listFiles` does.
///
/// Non-recursive listings return every entry directly inside `dir`.
/// Recursive listings return every file beneath it. Paths are sorted.
/// A path that is not a directory yields `None`, the host's null.
pub fn list_dir(dir: &Path, recursive: bool) -> Result<Option<Vec<String>>> {
    if !dir.is_dir() {
        return Ok(None);
    }
    let mut out = Vec::new();
    if recursive {
        collect_files(dir, &mut out)?;
    } else {
        for entry in std::fs::read_dir(dir)? {
            out.push(entry?.path().to_string_lossy().into_owned());
        }
    }
    out.sort();
    Ok(Some(out))
}

fn collect_files(dir: &Path, out: &mut Vec<String>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path.to_string_lossy().into_owned());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Gateway;
    use jila_core::types::{ArgType, ReturnType};

    const HOST: &str = "dev/jila/JilaActivity";

    #[test]
    fn platform_name() {
        assert_eq!(StubHost::new().platform_name(), "Stub");
    }

    #[test]
    fn register_replaces_existing_handler() {
        let host = StubHost::new();
        let sig = Signature::new(vec![], ReturnType::Int);
        host.register(HOST, "answer", sig.clone(), |_| Ok(ReturnValue::Int(1)));
        host.register(HOST, "answer", sig.clone(), |_| Ok(ReturnValue::Int(42)));

        let gateway = Gateway::new(Arc::new(host));
        let value = gateway
            .invoke(&OperationDescriptor::new(HOST, "answer", sig), &[])
            .expect("invoke");
        assert_eq!(value, ReturnValue::Int(42));
    }

    #[test]
    fn overloads_are_distinct_operations() {
        let host = StubHost::new();
        host.register(HOST, "echo", Signature::new(vec![ArgType::Int], ReturnType::Int), |call| {
            Ok(ReturnValue::Int(call.int_arg(0)?))
        });
        host.register(HOST, "echo", Signature::new(vec![ArgType::Bool], ReturnType::Bool), |call| {
            Ok(ReturnValue::Bool(call.bool_arg(0)?))
        });
        let gateway = Gateway::new(Arc::new(host));

        let int_echo = OperationDescriptor::new(HOST, "echo", Signature::new(vec![ArgType::Int], ReturnType::Int));
        let bool_echo = OperationDescriptor::new(HOST, "echo", Signature::new(vec![ArgType::Bool], ReturnType::Bool));
        assert_eq!(gateway.invoke(&int_echo, &[5.into()]).expect("int"), ReturnValue::Int(5));
        assert_eq!(gateway.invoke(&bool_echo, &[true.into()]).expect("bool"), ReturnValue::Bool(true));
    }

    #[test]
    fn complete_without_sink_is_dropped() {
        let host = StubHost::new();
        assert!(!host.complete(Completion::FolderSelected { path: "/x".into() }));
    }

    #[test]
    fn release_unknown_object_fails() {
        let host = StubHost::new();
        let err = host.release_object(ObjectHandle(99)).unwrap_err();
        assert!(matches!(err, BridgeError::UnknownObject(ObjectHandle(99))));
    }

    #[test]
    fn list_dir_flat_and_recursive() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("b.txt"), "b").expect("write");
        std::fs::write(dir.path().join("a.txt"), "a").expect("write");
        std::fs::create_dir(dir.path().join("sub")).expect("mkdir");
        std::fs::write(dir.path().join("sub").join("c.txt"), "c").expect("write");

        let flat = list_dir(dir.path(), false).expect("list").expect("dir");
        let names: Vec<_> = flat
            .iter()
            .map(|p| Path::new(p).file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.txt", "b.txt", "sub"]);

        let deep = list_dir(dir.path(), true).expect("list").expect("dir");
        assert_eq!(deep.len(), 3);
        assert!(deep.iter().any(|p| p.ends_with("c.txt")));
        assert!(!deep.iter().any(|p| p.ends_with("sub")));
    }

    #[test]
    fn list_dir_of_missing_path_is_null() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(list_dir(&dir.path().join("nope"), false).expect("list"), None);
    }
}
