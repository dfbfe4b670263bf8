// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The capability surface: the fixed set of host operations the app may
// invoke, each with the exact signature the host registers it under, plus
// typed wrappers that go through the gateway.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use jila_core::error::{BridgeError, Result};
use jila_core::types::{
    ArgType, ArgValue, CallbackKind, ChannelSpec, NotificationContent, ObjectHandle,
    OperationDescriptor, RequestId, ResourceRef, ReturnType, ReturnValue, Signature,
};
use tracing::{debug, info};

use crate::gateway::Gateway;

/// One named host operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    PostNotification,
    CreateNotificationChannel,
    RequestPermission,
    OpenFolder,
    ListFiles,
    ResolveResourceId,
    ApplicationContext,
    LastHostError,
}

impl Capability {
    pub const ALL: [Capability; 8] = [
        Self::PostNotification,
        Self::CreateNotificationChannel,
        Self::RequestPermission,
        Self::OpenFolder,
        Self::ListFiles,
        Self::ResolveResourceId,
        Self::ApplicationContext,
        Self::LastHostError,
    ];

    /// Method name on the host class.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PostNotification => "postNotification",
            Self::CreateNotificationChannel => "createNotificationChannel",
            Self::RequestPermission => "requestPermission",
            Self::OpenFolder => "openFolder",
            Self::ListFiles => "listFiles",
            Self::ResolveResourceId => "getResId",
            Self::ApplicationContext => "getApplicationContext",
            Self::LastHostError => "getLastError",
        }
    }

    pub fn signature(&self) -> Signature {
        use ArgType::{Bool, Int, Str};
        match self {
            Self::PostNotification => {
                Signature::new(vec![Str, Int, Str, Str, Int], ReturnType::Void)
            }
            Self::CreateNotificationChannel => Signature::new(vec![Str, Str, Str], ReturnType::Void),
            Self::RequestPermission => Signature::new(vec![Str], ReturnType::Void),
            Self::OpenFolder => Signature::new(vec![], ReturnType::Void),
            Self::ListFiles => Signature::new(vec![Str, Bool], ReturnType::StrArray),
            Self::ResolveResourceId => Signature::new(vec![Str, Str], ReturnType::Int),
            Self::ApplicationContext => Signature::new(
                vec![],
                ReturnType::Object("android/content/Context".into()),
            ),
            Self::LastHostError => Signature::new(vec![], ReturnType::Str),
        }
    }

    /// Descriptor for this capability on `host_class`.
    pub fn descriptor(&self, host_class: &str) -> OperationDescriptor {
        OperationDescriptor::new(host_class, self.name(), self.signature())
    }
}

/// Typed access to the capability surface.
pub struct Capabilities {
    gateway: Arc<Gateway>,
    host_class: String,
    resource_ids: Mutex<HashMap<ResourceRef, i32>>,
}

impl Capabilities {
    pub fn new(gateway: Arc<Gateway>, host_class: impl Into<String>) -> Self {
        Self {
            gateway,
            host_class: host_class.into(),
            resource_ids: Mutex::new(HashMap::new()),
        }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn host_class(&self) -> &str {
        &self.host_class
    }

    /// Post a notification on `channel`. Reusing `id` replaces the previous
    /// notification with that id.
    pub fn post_notification(
        &self,
        channel: &str,
        id: i32,
        content: &NotificationContent,
        icon: i32,
    ) -> Result<()> {
        self.invoke(
            Capability::PostNotification,
            &[
                channel.into(),
                id.into(),
                content.title.as_str().into(),
                content.body.as_str().into(),
                icon.into(),
            ],
        )?;
        info!(channel, id, "notification posted");
        Ok(())
    }

    pub fn create_notification_channel(&self, channel: &ChannelSpec) -> Result<()> {
        self.invoke(
            Capability::CreateNotificationChannel,
            &[
                channel.id.as_str().into(),
                channel.name.as_str().into(),
                channel.description.as_str().into(),
            ],
        )?;
        info!(channel = %channel.id, "notification channel created");
        Ok(())
    }

    /// Ask the host for a runtime permission. The answer arrives in the
    /// `PermissionResult` mailbox slot.
    pub fn request_permission(&self, permission: &str) -> Result<RequestId> {
        let descriptor = Capability::RequestPermission.descriptor(&self.host_class);
        self.gateway
            .request(CallbackKind::PermissionResult, &descriptor, &[permission.into()])
    }

    /// Open the system folder picker. The chosen path arrives in the
    /// `FolderSelection` mailbox slot; a cancelled picker never answers.
    pub fn open_folder_picker(&self) -> Result<RequestId> {
        let descriptor = Capability::OpenFolder.descriptor(&self.host_class);
        self.gateway
            .request(CallbackKind::FolderSelection, &descriptor, &[])
    }

    /// Paths inside `path`; `None` when the host answers null.
    pub fn list_files(&self, path: &str, recursive: bool) -> Result<Option<Vec<String>>> {
        let value = self.invoke(Capability::ListFiles, &[path.into(), recursive.into()])?;
        value
            .into_str_array()
            .ok_or_else(|| unexpected(Capability::ListFiles))
    }

    /// Numeric id of a host resource. Memoized per (name, type).
    pub fn resource_id(&self, resource: &ResourceRef) -> Result<i32> {
        let cached = self
            .resource_ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(resource)
            .copied();
        if let Some(id) = cached {
            return Ok(id);
        }
        let value = self.invoke(
            Capability::ResolveResourceId,
            &[resource.name.as_str().into(), resource.kind.as_str().into()],
        )?;
        let id = value
            .into_int()
            .ok_or_else(|| unexpected(Capability::ResolveResourceId))?;
        if id == 0 {
            return Err(BridgeError::Invocation {
                operation: Capability::ResolveResourceId.name().into(),
                message: format!("no {} resource named `{}`", resource.kind, resource.name),
            });
        }
        debug!(name = %resource.name, kind = %resource.kind, id, "resource id resolved");
        self.resource_ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(resource.clone(), id);
        Ok(id)
    }

    /// The application context object. Release it with
    /// [`Gateway::release`] when done.
    pub fn application_context(&self) -> Result<ObjectHandle> {
        let value = self.invoke(Capability::ApplicationContext, &[])?;
        value
            .into_object()
            .ok_or_else(|| unexpected(Capability::ApplicationContext))
    }

    /// The host's own description of its last failure, if any.
    pub fn last_host_error(&self) -> Result<Option<String>> {
        let value = self.invoke(Capability::LastHostError, &[])?;
        value
            .into_str()
            .ok_or_else(|| unexpected(Capability::LastHostError))
    }

    fn invoke(&self, capability: Capability, args: &[ArgValue]) -> Result<ReturnValue> {
        self.gateway
            .invoke(&capability.descriptor(&self.host_class), args)
    }
}

fn unexpected(capability: Capability) -> BridgeError {
    BridgeError::UnexpectedReturn {
        operation: capability.name().into(),
        expected: capability.signature().ret.to_string(),
        actual: "other".into(),
    }
}
