// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Jila platform bridge.
//!
//! Native code talks to the host platform through a [`gateway::Gateway`]:
//! operations are named by class, method and signature, resolved once and
//! memoized, then invoked with typed arguments. Results the host delivers
//! later on its own thread land in the gateway's [`mailbox::Mailbox`], one
//! slot per callback kind, which the frame loop polls.
//!
//! Hosts:
//! - Android: JNI against the hosting Activity (`android`)
//! - Desktop/CI: stub registry with native dialogs (`desktop`)
//! - Tests: in-memory [`stub::StubHost`]

pub mod capabilities;
pub mod gateway;
pub mod mailbox;
mod registry;
pub mod stub;
pub mod traits;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(any(target_os = "ios", target_os = "android")))]
pub mod desktop;

use std::sync::Arc;

use jila_core::error::Result;

pub use capabilities::{Capabilities, Capability};
pub use gateway::Gateway;
pub use mailbox::{CompletionSink, Delivery, Mailbox};
pub use traits::HostPlatform;

/// The host implementation for the target operating system, serving
/// operations on `host_class`.
pub fn platform_host(host_class: &str) -> Result<Arc<dyn HostPlatform>> {
    #[cfg(target_os = "android")]
    {
        let _ = host_class;
        Ok(Arc::new(android::AndroidHost::new()?))
    }
    #[cfg(target_os = "ios")]
    {
        let _ = host_class;
        Err(jila_core::error::BridgeError::PlatformUnavailable)
    }
    #[cfg(not(any(target_os = "ios", target_os = "android")))]
    {
        Ok(Arc::new(desktop::desktop_host(host_class)))
    }
}
