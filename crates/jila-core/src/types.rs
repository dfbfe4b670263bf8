// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: operation descriptors, argument/return values, opaque
// host handles and asynchronous completions.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BridgeError, Result};

// ---------------------------------------------------------------------------
// Signatures
// ---------------------------------------------------------------------------

/// Parameter types a host operation may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArgType {
    Bool,
    Int,
    Str,
}

impl ArgType {
    /// JNI type code (`Z`, `I`, `Ljava/lang/String;`).
    pub fn jni_code(&self) -> &'static str {
        match self {
            Self::Bool => "Z",
            Self::Int => "I",
            Self::Str => "Ljava/lang/String;",
        }
    }
}

/// Return types a host operation may declare.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReturnType {
    Void,
    Bool,
    Int,
    /// A possibly-null string.
    Str,
    /// A possibly-null array of strings.
    StrArray,
    /// A host object of the given class (slash-separated, e.g.
    /// `android/content/Context`).
    Object(String),
}

impl fmt::Display for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => f.write_str("V"),
            Self::Bool => f.write_str("Z"),
            Self::Int => f.write_str("I"),
            Self::Str => f.write_str("Ljava/lang/String;"),
            Self::StrArray => f.write_str("[Ljava/lang/String;"),
            Self::Object(class) => write!(f, "L{class};"),
        }
    }
}

/// Ordered parameter list plus return type of a host operation.
///
/// `Display` renders the JNI method descriptor, which is also what the host
/// registers the operation under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    pub params: Vec<ArgType>,
    pub ret: ReturnType,
}

impl Signature {
    pub fn new(params: Vec<ArgType>, ret: ReturnType) -> Self {
        Self { params, ret }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for param in &self.params {
            f.write_str(param.jni_code())?;
        }
        write!(f, "){}", self.ret)
    }
}

/// Names one host capability: the class that implements it, the operation
/// name and its exact signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationDescriptor {
    pub class: String,
    pub name: String,
    pub signature: Signature,
}

impl OperationDescriptor {
    pub fn new(class: impl Into<String>, name: impl Into<String>, signature: Signature) -> Self {
        Self {
            class: class.into(),
            name: name.into(),
            signature,
        }
    }

    /// Check arity and types of `args` against the declared parameters.
    pub fn check_args(&self, args: &[ArgValue]) -> Result<()> {
        let params = &self.signature.params;
        if args.len() != params.len() {
            return Err(self.mismatch(format!(
                "expected {} argument(s), got {}",
                params.len(),
                args.len()
            )));
        }
        for (index, (arg, param)) in args.iter().zip(params).enumerate() {
            if arg.arg_type() != *param {
                return Err(self.mismatch(format!(
                    "argument {index} is {:?}, declared {:?}",
                    arg.arg_type(),
                    param
                )));
            }
        }
        Ok(())
    }

    fn mismatch(&self, detail: String) -> BridgeError {
        BridgeError::SignatureMismatch {
            operation: self.name.clone(),
            signature: self.signature.to_string(),
            detail,
        }
    }
}

impl fmt::Display for OperationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}{}", self.class, self.name, self.signature)
    }
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// A concrete argument passed to a host operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Bool(bool),
    Int(i32),
    Str(String),
}

impl ArgValue {
    pub fn arg_type(&self) -> ArgType {
        match self {
            Self::Bool(_) => ArgType::Bool,
            Self::Int(_) => ArgType::Int,
            Self::Str(_) => ArgType::Str,
        }
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for ArgValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// Value produced by a successful host call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnValue {
    Void,
    Bool(bool),
    Int(i32),
    Str(Option<String>),
    StrArray(Option<Vec<String>>),
    Object(ObjectHandle),
}

impl ReturnValue {
    /// Whether this value has the shape `ret` declares.
    pub fn conforms_to(&self, ret: &ReturnType) -> bool {
        matches!(
            (self, ret),
            (Self::Void, ReturnType::Void)
                | (Self::Bool(_), ReturnType::Bool)
                | (Self::Int(_), ReturnType::Int)
                | (Self::Str(_), ReturnType::Str)
                | (Self::StrArray(_), ReturnType::StrArray)
                | (Self::Object(_), ReturnType::Object(_))
        )
    }

    /// Short name of the value's shape, used in error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Str(_) => "string",
            Self::StrArray(_) => "string[]",
            Self::Object(_) => "object",
        }
    }

    pub fn into_int(self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_str(self) -> Option<Option<String>> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_str_array(self) -> Option<Option<Vec<String>>> {
        match self {
            Self::StrArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_object(self) -> Option<ObjectHandle> {
        match self {
            Self::Object(h) => Some(h),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Opaque host handles
// ---------------------------------------------------------------------------

/// Host-side class reference, valid for the lifetime of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassHandle(pub u32);

/// Host-side operation reference, valid for the lifetime of its class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationHandle(pub u32);

/// Host object promoted to a long-lived reference; must be released
/// through the host that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectHandle(pub u32);

impl fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Asynchronous completions
// ---------------------------------------------------------------------------

/// Identifier of one asynchronous request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kinds of host operations whose result arrives later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallbackKind {
    PermissionResult,
    FolderSelection,
}

impl CallbackKind {
    pub const ALL: [CallbackKind; 2] = [Self::PermissionResult, Self::FolderSelection];

    /// Stable slot index.
    pub fn index(&self) -> usize {
        match self {
            Self::PermissionResult => 0,
            Self::FolderSelection => 1,
        }
    }
}

/// A result delivered by the host outside the call that requested it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Completion {
    Permission { permission: String, granted: bool },
    FolderSelected { path: String },
}

impl Completion {
    pub fn kind(&self) -> CallbackKind {
        match self {
            Self::Permission { .. } => CallbackKind::PermissionResult,
            Self::FolderSelected { .. } => CallbackKind::FolderSelection,
        }
    }
}

// ---------------------------------------------------------------------------
// Notification payloads
// ---------------------------------------------------------------------------

/// Notification channel metadata registered with the host at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSpec {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// A named host resource, e.g. `ic_launcher` of type `drawable`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    pub name: String,
    pub kind: String,
}

/// Validated user-entered notification text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
}

impl NotificationContent {
    /// Reject blank title or body before anything reaches the host.
    pub fn new(title: &str, body: &str) -> Result<Self> {
        if title.trim().is_empty() {
            return Err(BridgeError::EmptyField { field: "title" });
        }
        if body.trim().is_empty() {
            return Err(BridgeError::EmptyField { field: "message" });
        }
        Ok(Self {
            title: title.to_owned(),
            body: body.to_owned(),
        })
    }
}
