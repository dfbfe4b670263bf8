// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer: loads the configuration, binds the host platform
// and exposes the capability surface to the frame loop.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use jila_bridge::{Capabilities, Gateway, HostPlatform, Mailbox};
use jila_core::AppConfig;
use jila_core::error::Result;
use tracing::{info, warn};

use super::data_dir;

/// Services the application loop uses. Built once at startup.
pub struct AppServices {
    config: AppConfig,
    config_path: Option<PathBuf>,
    capabilities: Capabilities,
}

impl AppServices {
    /// Load config from the data directory (or `$JILA_CONFIG`) and bind the
    /// host for this target.
    pub fn init() -> Result<Self> {
        let path = data_dir::config_path();
        info!(path = %path.display(), "initialising app services");

        let config = if path.exists() {
            AppConfig::load_or_default(&path)
        } else {
            let config = AppConfig::default();
            // First run: leave an editable copy of the defaults behind.
            if let Err(e) = config.save(&path) {
                warn!(path = %path.display(), error = %e, "could not write default config");
            }
            config
        };

        let host = jila_bridge::platform_host(&config.host_class)?;
        let mut services = Self::with_host(config, host);
        services.config_path = Some(path);
        Ok(services)
    }

    /// Services over an explicit host, with no config file behind them.
    pub fn with_host(config: AppConfig, host: Arc<dyn HostPlatform>) -> Self {
        let gateway = Arc::new(Gateway::new(host));
        let capabilities = Capabilities::new(gateway, config.host_class.clone());
        Self {
            config,
            config_path: None,
            capabilities,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// File the config was loaded from, if any.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn mailbox(&self) -> &Mailbox {
        self.capabilities.gateway().mailbox()
    }

    pub fn platform_name(&self) -> &str {
        self.capabilities.gateway().host().platform_name()
    }
}
