// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Desktop host for running the app outside Android.
//
// Built on the stub registry with real handlers where the desktop has an
// equivalent: notifications go to the log, the folder picker is a native
// dialog shown from its own thread, and runtime permissions are granted
// immediately because the desktop has none.

use jila_core::error::BridgeError;
use jila_core::types::{Completion, ReturnValue};
use tracing::{debug, info};

use crate::capabilities::Capability;
use crate::stub::StubHost;

/// Stub host with desktop handlers for the async and notification
/// capabilities.
pub fn desktop_host(host_class: &str) -> StubHost {
    let host = StubHost::named("Desktop").register_capabilities(host_class);

    host.register(
        host_class,
        Capability::PostNotification.name(),
        Capability::PostNotification.signature(),
        |call| {
            info!(
                channel = call.str_arg(0)?,
                id = call.int_arg(1)?,
                title = call.str_arg(2)?,
                body = call.str_arg(3)?,
                "notification"
            );
            Ok(ReturnValue::Void)
        },
    );

    host.register(
        host_class,
        Capability::RequestPermission.name(),
        Capability::RequestPermission.signature(),
        |call| {
            let permission = call.str_arg(0)?.to_owned();
            if let Some(sink) = call.sink() {
                debug!(%permission, "desktop grants runtime permissions");
                sink.deliver(Completion::Permission {
                    permission,
                    granted: true,
                });
            }
            Ok(ReturnValue::Void)
        },
    );

    host.register(
        host_class,
        Capability::OpenFolder.name(),
        Capability::OpenFolder.signature(),
        |call| {
            let sink = call.sink();
            std::thread::Builder::new()
                .name("folder-picker".into())
                .spawn(move || {
                    let picked = rfd::FileDialog::new()
                        .set_title("Open folder")
                        .pick_folder();
                    match (picked, sink) {
                        (Some(folder), Some(sink)) => sink.deliver(Completion::FolderSelected {
                            path: folder.to_string_lossy().into_owned(),
                        }),
                        (None, _) => debug!("folder picker cancelled"),
                        (Some(_), None) => debug!("folder picked but no sink bound"),
                    }
                })
                .map_err(|e| BridgeError::Invocation {
                    operation: Capability::OpenFolder.name().into(),
                    message: format!("failed to start picker thread: {e}"),
                })?;
            Ok(ReturnValue::Void)
        },
    );

    host
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use jila_core::types::{CallbackKind, NotificationContent, ResourceRef};

    use super::*;
    use crate::capabilities::Capabilities;
    use crate::gateway::Gateway;

    const HOST: &str = "dev/jila/JilaActivity";

    fn capabilities() -> Capabilities {
        let gateway = Arc::new(Gateway::new(Arc::new(desktop_host(HOST))));
        Capabilities::new(gateway, HOST)
    }

    #[test]
    fn permission_is_granted_immediately() {
        let caps = capabilities();
        let permission = "android.permission.POST_NOTIFICATIONS";

        let id = caps.request_permission(permission).expect("request");

        let mailbox = caps.gateway().mailbox();
        assert!(!mailbox.is_pending(CallbackKind::PermissionResult));
        let delivery = mailbox
            .poll(CallbackKind::PermissionResult)
            .expect("delivered during the request");
        assert_eq!(delivery.request, Some(id));
        assert_eq!(
            delivery.completion,
            Completion::Permission {
                permission: permission.into(),
                granted: true,
            }
        );
        assert!(mailbox.poll(CallbackKind::PermissionResult).is_none());
    }

    #[test]
    fn notification_is_accepted() {
        let caps = capabilities();
        let content = NotificationContent::new("Hello", "World").expect("valid");
        let icon = caps
            .resource_id(&ResourceRef {
                name: "ic_launcher".into(),
                kind: "drawable".into(),
            })
            .expect("icon");

        caps.post_notification("default", 1, &content, icon)
            .expect("post");
    }

    #[test]
    fn desktop_host_reports_its_name() {
        let gateway = Gateway::new(Arc::new(desktop_host(HOST)));
        assert_eq!(gateway.host().platform_name(), "Desktop");
    }
}
