// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android host via JNI.
//
// Requires the Android NDK and targets `aarch64-linux-android` or
// `armv7-linux-androideabi`. Operations are instance methods on the host
// Activity subclass (default `dev.jila.JilaActivity`), which implements the
// capability surface in Java/Kotlin.
//
// ## Architecture notes
//
// Resolved classes are promoted to global references and resolved method
// ids are kept for the life of the process; the gateway hands out indices
// into these tables. Every call runs inside a JNI local frame, so argument
// strings, returned arrays and their elements are released when the frame
// pops, on success and on error. This matters on the render thread, which
// sits inside a native method that never returns to Java and would
// otherwise accumulate local references forever.
//
// Pending Java exceptions are described, cleared and turned into typed
// errors; they are never left pending across a call.
//
// Asynchronous results come back through the static native methods at the
// bottom of this file. The host Activity must declare:
//
//     private static native void nativeOnPermissionResult(String permission, boolean granted);
//     private static native void nativeOnFolderSelected(String path);

#![cfg(target_os = "android")]

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};

use jni::objects::{
    GlobalRef, JClass, JMethodID, JObject, JObjectArray, JString, JValueOwned,
};
use jni::signature::{Primitive, ReturnType as JniReturn};
use jni::sys::{jboolean, jvalue};
use jni::{AttachGuard, JNIEnv, JavaVM};

use jila_core::error::{BridgeError, Result};
use jila_core::types::{
    ArgValue, ClassHandle, Completion, ObjectHandle, OperationDescriptor, OperationHandle,
    ReturnType, ReturnValue,
};

use crate::mailbox::CompletionSink;
use crate::registry::Registry;
use crate::traits::HostPlatform;

/// Local references a call frame reserves beyond one per argument.
const FRAME_HEADROOM: i32 = 16;

/// Sink the JNI callbacks write into. JNI callbacks are free functions, so
/// this is the one piece of process-wide state in the bridge.
static COMPLETIONS: RwLock<Option<CompletionSink>> = RwLock::new(None);

/// Convenience: map any `jni::errors::Error` into `BridgeError::Bridge`.
fn jni_err(context: &str, e: jni::errors::Error) -> BridgeError {
    BridgeError::Bridge(format!("{context}: {e}"))
}

/// (class index, method name, JNI signature).
type MethodKey = (u32, String, String);

/// Entries live for the process. Resolving again after the gateway clears
/// its cache returns the existing entry.
#[derive(Default)]
struct Tables {
    classes: Registry<String, GlobalRef>,
    methods: Registry<MethodKey, JMethodID>,
    objects: HashMap<u32, GlobalRef>,
    next_object: u32,
}

/// Value converted inside a local frame. Objects leave the frame as global
/// references.
enum Converted {
    Value(ReturnValue),
    Object(GlobalRef),
    NullObject,
}

/// Android implementation of the host platform.
pub struct AndroidHost {
    vm: JavaVM,
    activity: GlobalRef,
    tables: Mutex<Tables>,
}

impl AndroidHost {
    /// Bind to the JavaVM and Activity published by the NDK glue.
    pub fn new() -> Result<Self> {
        let ctx = ndk_context::android_context();
        // SAFETY: `ctx.vm()` returns the `JavaVM*` set by the NDK glue code.
        // The pointer is guaranteed valid for the lifetime of the process.
        let vm = unsafe { JavaVM::from_raw(ctx.vm().cast()) }
            .map_err(|e| jni_err("failed to obtain JavaVM", e))?;

        let ptr = ctx.context();
        if ptr.is_null() {
            return Err(BridgeError::Bridge(
                "Android context is null: native activity not initialised".into(),
            ));
        }

        let activity = {
            let env = vm
                .attach_current_thread()
                .map_err(|e| jni_err("failed to attach JNI thread", e))?;
            // SAFETY: the NDK guarantees this pointer is a valid global jobject
            // for the hosting Activity. It is only borrowed here.
            let raw = unsafe { JObject::from_raw(ptr.cast()) };
            env.new_global_ref(&raw)
                .map_err(|e| jni_err("new_global_ref(activity)", e))?
        };

        tracing::info!("Android host bound to activity");
        Ok(Self {
            vm,
            activity,
            tables: Mutex::new(Tables::default()),
        })
    }

    fn env(&self) -> Result<AttachGuard<'_>> {
        self.vm
            .attach_current_thread()
            .map_err(|e| jni_err("failed to attach JNI thread", e))
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl HostPlatform for AndroidHost {
    fn platform_name(&self) -> &str {
        "Android"
    }

    fn resolve_class(&self, class: &str) -> Result<ClassHandle> {
        if let Some(index) = self.lock().classes.lookup(class) {
            return Ok(ClassHandle(index));
        }

        let mut env = self.env()?;
        let activity = &self.activity;

        let resolved = env.with_local_frame(4, |env| -> jni::errors::Result<Option<GlobalRef>> {
            let local = env.find_class(class)?;
            if !env.is_instance_of(activity, &local)? {
                return Ok(None);
            }
            env.new_global_ref(&local).map(Some)
        });

        let global = match resolved {
            Ok(Some(global)) => global,
            Ok(None) => {
                return Err(BridgeError::ClassNotFound {
                    class: class.to_owned(),
                    detail: "host activity is not an instance of this class".into(),
                });
            }
            Err(e) => {
                let detail = take_exception(&mut env).unwrap_or_else(|| e.to_string());
                return Err(BridgeError::ClassNotFound {
                    class: class.to_owned(),
                    detail,
                });
            }
        };

        let index = self.lock().classes.intern(class.to_owned(), global);
        Ok(ClassHandle(index))
    }

    fn resolve_operation(
        &self,
        class: ClassHandle,
        descriptor: &OperationDescriptor,
    ) -> Result<OperationHandle> {
        let signature = descriptor.signature.to_string();
        let key: MethodKey = (class.0, descriptor.name.clone(), signature.clone());

        let class_ref = {
            let tables = self.lock();
            if let Some(index) = tables.methods.lookup(&key) {
                return Ok(OperationHandle(index));
            }
            tables
                .classes
                .get(class.0)
                .cloned()
                .ok_or_else(|| BridgeError::Bridge(format!("stale class handle {}", class.0)))?
        };

        let mut env = self.env()?;
        let jclass = <&JClass>::from(class_ref.as_obj());

        match env.get_method_id(jclass, &descriptor.name, &signature) {
            Ok(method) => {
                let index = self.lock().methods.intern(key, method);
                Ok(OperationHandle(index))
            }
            Err(e) => {
                let detail = take_exception(&mut env).unwrap_or_else(|| e.to_string());
                tracing::debug!(operation = %descriptor, %detail, "GetMethodID failed");
                Err(BridgeError::OperationNotFound {
                    class: descriptor.class.clone(),
                    operation: descriptor.name.clone(),
                    signature,
                })
            }
        }
    }

    fn call(
        &self,
        _class: ClassHandle,
        operation: OperationHandle,
        descriptor: &OperationDescriptor,
        args: &[ArgValue],
    ) -> Result<ReturnValue> {
        let method = self
            .lock()
            .methods
            .get(operation.0)
            .copied()
            .ok_or_else(|| BridgeError::Bridge(format!("stale operation handle {}", operation.0)))?;

        let mut env = self.env()?;
        let activity = &self.activity;
        let ret = &descriptor.signature.ret;
        let capacity = args.len() as i32 + FRAME_HEADROOM;

        let outcome = env.with_local_frame(capacity, |env| -> jni::errors::Result<Converted> {
            let mut jargs: Vec<jvalue> = Vec::with_capacity(args.len());
            for arg in args {
                jargs.push(match arg {
                    ArgValue::Bool(b) => jvalue { z: jboolean::from(*b) },
                    ArgValue::Int(i) => jvalue { i: *i },
                    ArgValue::Str(s) => jvalue {
                        l: env.new_string(s)?.as_raw(),
                    },
                });
            }

            // SAFETY: `method` was resolved against exactly this signature on
            // a class the activity is an instance of, and the gateway has
            // checked `args` against the same signature.
            let value = unsafe { env.call_method_unchecked(activity, method, jni_return(ret), &jargs) }?;
            convert(env, ret, value)
        });

        let converted = match outcome {
            Ok(converted) => converted,
            Err(e) => {
                let message = take_exception(&mut env).unwrap_or_else(|| e.to_string());
                return Err(BridgeError::Invocation {
                    operation: descriptor.name.clone(),
                    message,
                });
            }
        };

        match converted {
            Converted::Value(value) => Ok(value),
            Converted::NullObject => Err(BridgeError::Invocation {
                operation: descriptor.name.clone(),
                message: "host returned null".into(),
            }),
            Converted::Object(global) => {
                let mut tables = self.lock();
                tables.next_object += 1;
                let id = tables.next_object;
                tables.objects.insert(id, global);
                Ok(ReturnValue::Object(ObjectHandle(id)))
            }
        }
    }

    fn release_object(&self, object: ObjectHandle) -> Result<()> {
        // Dropping the GlobalRef deletes it, attaching the thread if needed.
        self.lock()
            .objects
            .remove(&object.0)
            .map(drop)
            .ok_or(BridgeError::UnknownObject(object))
    }

    fn bind_completions(&self, sink: CompletionSink) {
        *COMPLETIONS.write().unwrap_or_else(PoisonError::into_inner) = Some(sink);
    }
}

fn jni_return(ret: &ReturnType) -> JniReturn {
    match ret {
        ReturnType::Void => JniReturn::Primitive(Primitive::Void),
        ReturnType::Bool => JniReturn::Primitive(Primitive::Boolean),
        ReturnType::Int => JniReturn::Primitive(Primitive::Int),
        ReturnType::StrArray => JniReturn::Array,
        ReturnType::Str | ReturnType::Object(_) => JniReturn::Object,
    }
}

/// Turn a raw JNI return into a `ReturnValue` while still inside the call's
/// local frame.
fn convert<'local>(
    env: &mut JNIEnv<'local>,
    ret: &ReturnType,
    value: JValueOwned<'local>,
) -> jni::errors::Result<Converted> {
    let converted = match ret {
        ReturnType::Void => {
            value.v()?;
            ReturnValue::Void
        }
        ReturnType::Bool => ReturnValue::Bool(value.z()?),
        ReturnType::Int => ReturnValue::Int(value.i()?),
        ReturnType::Str => {
            let obj = value.l()?;
            if obj.is_null() {
                ReturnValue::Str(None)
            } else {
                let text: String = env.get_string(&JString::from(obj))?.into();
                ReturnValue::Str(Some(text))
            }
        }
        ReturnType::StrArray => {
            let obj = value.l()?;
            if obj.is_null() {
                ReturnValue::StrArray(None)
            } else {
                let array = JObjectArray::from(obj);
                let len = env.get_array_length(&array)?;
                let mut items = Vec::with_capacity(len.max(0) as usize);
                for index in 0..len {
                    let element = env.get_object_array_element(&array, index)?;
                    if !element.is_null() {
                        let element = JString::from(element);
                        items.push(env.get_string(&element)?.into());
                        env.delete_local_ref(element)?;
                    }
                }
                ReturnValue::StrArray(Some(items))
            }
        }
        ReturnType::Object(_) => {
            let obj = value.l()?;
            if obj.is_null() {
                return Ok(Converted::NullObject);
            }
            return Ok(Converted::Object(env.new_global_ref(&obj)?));
        }
    };
    Ok(Converted::Value(converted))
}

/// Describe and clear a pending Java exception, returning its `toString()`.
fn take_exception(env: &mut JNIEnv<'_>) -> Option<String> {
    if !env.exception_check().unwrap_or(false) {
        return None;
    }
    let described = env.with_local_frame(4, |env| -> jni::errors::Result<String> {
        let throwable = env.exception_occurred()?;
        env.exception_clear()?;
        let text = env
            .call_method(&throwable, "toString", "()Ljava/lang/String;", &[])?
            .l()?;
        Ok(env.get_string(&JString::from(text))?.into())
    });
    // Whatever happened while describing, nothing may stay pending.
    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_clear();
    }
    described.ok()
}

fn deliver(completion: Completion) {
    let sink = COMPLETIONS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    match sink {
        Some(sink) => sink.deliver(completion),
        None => tracing::warn!(?completion, "completion dropped: no gateway bound"),
    }
}

// ---------------------------------------------------------------------------
// JNI callbacks from the host Activity
// ---------------------------------------------------------------------------

/// `JilaActivity.nativeOnPermissionResult(String, boolean)`.
#[unsafe(no_mangle)]
pub extern "system" fn Java_dev_jila_JilaActivity_nativeOnPermissionResult<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    permission: JString<'local>,
    granted: jboolean,
) {
    let permission: String = match env.get_string(&permission) {
        Ok(text) => text.into(),
        Err(e) => {
            tracing::warn!(error = %e, "unreadable permission name in callback");
            return;
        }
    };
    deliver(Completion::Permission {
        permission,
        granted: granted != 0,
    });
}

/// `JilaActivity.nativeOnFolderSelected(String)`.
#[unsafe(no_mangle)]
pub extern "system" fn Java_dev_jila_JilaActivity_nativeOnFolderSelected<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    path: JString<'local>,
) {
    match env.get_string(&path) {
        Ok(text) => deliver(Completion::FolderSelected { path: text.into() }),
        Err(e) => tracing::warn!(error = %e, "unreadable folder path in callback"),
    }
}
