// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The application loop: Init -> Running -> Quitting.
//
// Each frame polls the mailbox, dispatches this frame's UI actions through
// the capability surface, and presents the panel. Everything runs on the
// caller's thread; only host completions arrive from elsewhere, through the
// mailbox.

use jila_core::error::Result;
use jila_core::human_errors;
use jila_core::types::{CallbackKind, Completion, NotificationContent, ObjectHandle};
use tracing::{debug, info, warn};

use crate::commands::Command;
use crate::services::app_services::AppServices;
use crate::state::{AppState, Phase, PermissionStatus};
use crate::surface::RenderSurface;

/// Input from the panel for a single frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    SetTitle(String),
    SetMessage(String),
    GrantPermission,
    GetError,
    PushNotification,
    OpenFolder,
    FirstItem,
}

/// Window and lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    Resized { width: u32, height: u32 },
    Quit,
}

pub struct App<S: RenderSurface> {
    services: AppServices,
    surface: S,
    state: AppState,
    context: Option<ObjectHandle>,
}

impl<S: RenderSurface> App<S> {
    /// Bring the app up. Any failure here is fatal.
    pub fn init(services: AppServices, surface: S) -> Result<Self> {
        let mut state = AppState::new(services.config());
        state.safe_area = surface.safe_area();
        state.dpi_scale = surface.display_scale();

        let caps = services.capabilities();
        let context = caps.application_context()?;
        if let Err(e) = caps.create_notification_channel(&services.config().channel) {
            // Don't leak the context on the way out.
            let _ = caps.gateway().release(context);
            return Err(e);
        }

        state.phase = Phase::Running;
        info!(
            platform = services.platform_name(),
            scale = state.dpi_scale,
            "application running"
        );
        Ok(Self {
            services,
            surface,
            state,
            context: Some(context),
        })
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    #[cfg(test)]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    #[cfg(test)]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Resized { width, height } => {
                self.surface.resize(width, height);
                self.state.safe_area = self.surface.safe_area();
                debug!(safe_area = ?self.state.safe_area, "safe area recomputed");
            }
            AppEvent::Quit => {
                if self.state.phase != Phase::Quitting {
                    info!("quit requested");
                    self.state.phase = Phase::Quitting;
                }
            }
        }
    }

    /// Run one frame from panel actions only.
    #[cfg(test)]
    pub fn iterate(&mut self, actions: &[UiAction]) -> Result<()> {
        self.step(actions.iter().cloned().map(Command::Action))
    }

    /// Run one frame. Commands are handled in arrival order; a quit stops
    /// the frame after everything before it has run, and the frame is still
    /// presented. Errors are render failures only; failed host calls end up
    /// on the panel's error line.
    pub fn step(&mut self, commands: impl IntoIterator<Item = Command>) -> Result<()> {
        if self.state.phase != Phase::Running {
            return Ok(());
        }

        for kind in CallbackKind::ALL {
            if let Some(delivery) = self.services.mailbox().poll(kind) {
                debug!(?kind, at = %delivery.delivered_at, "completion received");
                self.apply(delivery.completion);
            }
        }

        for command in commands {
            match command {
                Command::Action(action) => {
                    if let Err(e) = self.dispatch(&action) {
                        warn!(?action, error = %e, "action failed");
                        self.state.error = human_errors::describe(&e).inline();
                    }
                }
                Command::Event(event) => {
                    self.handle_event(event);
                    if self.state.phase == Phase::Quitting {
                        break;
                    }
                }
            }
        }

        self.surface.present(&self.state.view())
    }

    /// Release host resources and the surface.
    pub fn quit(mut self) {
        self.state.phase = Phase::Quitting;
        if let Some(context) = self.context.take() {
            if let Err(e) = self.services.capabilities().gateway().release(context) {
                warn!(error = %e, "failed to release application context");
            }
        }
        self.surface.close();
        info!("application stopped");
    }

    fn apply(&mut self, completion: Completion) {
        match completion {
            Completion::Permission {
                permission,
                granted,
            } => {
                info!(%permission, granted, "permission result");
                self.state.permission = Some(PermissionStatus {
                    permission,
                    granted,
                });
            }
            Completion::FolderSelected { path } => {
                info!(%path, "folder selected");
                self.state.folder_path = path;
            }
        }
    }

    fn dispatch(&mut self, action: &UiAction) -> Result<()> {
        let config = self.services.config();
        let caps = self.services.capabilities();
        match action {
            UiAction::SetTitle(text) => self.state.title.set(text),
            UiAction::SetMessage(text) => self.state.message.set(text),
            UiAction::GrantPermission => {
                caps.request_permission(&config.permission)?;
            }
            UiAction::GetError => {
                self.state.error = caps.last_host_error()?.unwrap_or_default();
            }
            UiAction::PushNotification => {
                let content =
                    NotificationContent::new(self.state.title.as_str(), self.state.message.as_str())?;
                let icon = caps.resource_id(&config.notification_icon)?;
                caps.post_notification(&config.channel.id, config.notification_id, &content, icon)?;
            }
            UiAction::OpenFolder => {
                caps.open_folder_picker()?;
            }
            UiAction::FirstItem => {
                if self.state.folder_path.is_empty() {
                    return Ok(());
                }
                let listing = caps.list_files(&self.state.folder_path, false)?;
                self.state.item = listing
                    .and_then(|files| files.into_iter().next())
                    .unwrap_or_default();
            }
        }
        Ok(())
    }
}

impl<S: RenderSurface> Drop for App<S> {
    fn drop(&mut self) {
        if let Some(context) = self.context.take() {
            let _ = self.services.capabilities().gateway().release(context);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use jila_bridge::stub::{HostCall, STUB_ICON_ID, StubHost};
    use jila_core::types::ArgValue;
    use jila_core::AppConfig;

    use super::*;
    use crate::surface::{HeadlessSurface, Insets, Rect};

    const HOST: &str = "dev/jila/JilaActivity";

    fn running() -> (Arc<StubHost>, App<HeadlessSurface>) {
        let host = Arc::new(StubHost::with_capabilities(HOST));
        let services = AppServices::with_host(AppConfig::default(), host.clone());
        let app = App::init(services, HeadlessSurface::new(1080, 2400, 2.0)).expect("init");
        (host, app)
    }

    fn calls_to(host: &StubHost, operation: &str) -> Vec<HostCall> {
        host.journal()
            .into_iter()
            .filter(|call| call.operation == operation)
            .collect()
    }

    fn line<'a>(app: &'a App<HeadlessSurface>, prefix: &str) -> Option<&'a str> {
        app.surface()
            .last_frame()?
            .lines
            .iter()
            .find(|l| l.starts_with(prefix))
            .map(String::as_str)
    }

    #[test]
    fn init_acquires_context_and_creates_default_channel() {
        let (host, app) = running();

        assert_eq!(app.phase(), Phase::Running);
        assert_eq!(host.live_objects(), 1);
        assert_eq!(
            calls_to(&host, "createNotificationChannel")[0].args,
            vec![
                ArgValue::from("default"),
                ArgValue::from("Default"),
                ArgValue::from("Default notification channel"),
            ]
        );
        assert_eq!(app.state().dpi_scale, 2.0);
    }

    #[test]
    fn init_fails_when_host_class_is_missing() {
        let host = Arc::new(StubHost::new());
        let services = AppServices::with_host(AppConfig::default(), host.clone());

        let err = App::init(services, HeadlessSurface::new(800, 600, 1.0))
            .err()
            .expect("init must fail");
        assert_eq!(err.kind(), jila_core::ErrorKind::Resolution);
        assert!(host.journal().is_empty());
    }

    #[test]
    fn failed_channel_creation_releases_context() {
        let host = Arc::new(StubHost::with_capabilities(HOST));
        host.register(
            HOST,
            "createNotificationChannel",
            jila_bridge::Capability::CreateNotificationChannel.signature(),
            |_| {
                Err(jila_core::BridgeError::Invocation {
                    operation: "createNotificationChannel".into(),
                    message: "java.lang.IllegalArgumentException".into(),
                })
            },
        );
        let services = AppServices::with_host(AppConfig::default(), host.clone());

        assert!(App::init(services, HeadlessSurface::new(800, 600, 1.0)).is_err());
        assert_eq!(host.live_objects(), 0);
    }

    #[test]
    fn empty_title_is_rejected_without_host_call() {
        let (host, mut app) = running();
        let before = host.journal().len();

        app.iterate(&[
            UiAction::SetTitle(String::new()),
            UiAction::SetMessage("Hi".into()),
            UiAction::PushNotification,
        ])
        .expect("frame");

        assert_eq!(host.journal().len(), before);
        assert_eq!(app.state().error, "Please enter a title.");
        assert_eq!(line(&app, "Error:"), Some("Error: Please enter a title."));
    }

    #[test]
    fn push_notification_posts_exact_arguments() {
        let (host, mut app) = running();

        app.iterate(&[
            UiAction::SetTitle("Hello".into()),
            UiAction::SetMessage("World".into()),
            UiAction::PushNotification,
        ])
        .expect("frame");

        assert_eq!(
            calls_to(&host, "postNotification"),
            vec![HostCall {
                operation: "postNotification".into(),
                args: vec![
                    "default".into(),
                    1.into(),
                    "Hello".into(),
                    "World".into(),
                    STUB_ICON_ID.into(),
                ],
            }]
        );
        assert!(app.state().error.is_empty());
    }

    #[test]
    fn icon_lookup_is_memoized_across_pushes() {
        let (host, mut app) = running();
        app.iterate(&[
            UiAction::SetTitle("Hello".into()),
            UiAction::SetMessage("World".into()),
        ])
        .expect("frame");

        for _ in 0..3 {
            app.iterate(&[UiAction::PushNotification]).expect("frame");
        }

        assert_eq!(calls_to(&host, "getResId").len(), 1);
        assert_eq!(calls_to(&host, "postNotification").len(), 3);
    }

    #[test]
    fn resize_is_used_by_the_next_render() {
        let host = Arc::new(StubHost::with_capabilities(HOST));
        let services = AppServices::with_host(AppConfig::default(), host);
        let surface = HeadlessSurface::new(1080, 2400, 2.0).with_insets(Insets {
            top: 100,
            bottom: 50,
            left: 0,
            right: 0,
        });
        let mut app = App::init(services, surface).expect("init");
        app.iterate(&[]).expect("frame");

        app.handle_event(AppEvent::Resized {
            width: 2400,
            height: 1080,
        });
        app.iterate(&[]).expect("frame");

        let rect = app.surface().last_frame().expect("frame").rect;
        assert_eq!(
            rect,
            Rect {
                x: 0,
                y: 100,
                w: 2400,
                h: 930
            }
        );
    }

    #[test]
    fn folder_selection_updates_path_on_next_frame() {
        let (host, mut app) = running();

        app.iterate(&[UiAction::OpenFolder]).expect("frame");
        assert!(app.state().folder_path.is_empty());

        host.complete(Completion::FolderSelected {
            path: "/storage/emulated/0/Download".into(),
        });
        app.iterate(&[]).expect("frame");

        assert_eq!(app.state().folder_path, "/storage/emulated/0/Download");
        assert_eq!(
            line(&app, "Current selected folder path:"),
            Some("Current selected folder path: /storage/emulated/0/Download")
        );
    }

    #[test]
    fn first_item_lists_the_selected_folder() {
        let (host, mut app) = running();
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("b.txt"), "b").expect("write");
        std::fs::write(dir.path().join("a.txt"), "a").expect("write");

        host.complete(Completion::FolderSelected {
            path: dir.path().to_string_lossy().into_owned(),
        });
        app.iterate(&[UiAction::FirstItem]).expect("frame");

        let expected = dir.path().join("a.txt").to_string_lossy().into_owned();
        assert_eq!(app.state().item, expected);
        let listing = calls_to(&host, "listFiles");
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].args[1], ArgValue::Bool(false));
    }

    #[test]
    fn first_item_without_folder_makes_no_call() {
        let (host, mut app) = running();
        app.iterate(&[UiAction::FirstItem]).expect("frame");
        assert!(calls_to(&host, "listFiles").is_empty());
    }

    #[test]
    fn first_item_in_empty_or_missing_folder_clears_item() {
        let (host, mut app) = running();
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("only.txt"), "x").expect("write");
        host.complete(Completion::FolderSelected {
            path: dir.path().to_string_lossy().into_owned(),
        });
        app.iterate(&[UiAction::FirstItem]).expect("frame");
        assert!(!app.state().item.is_empty());

        host.complete(Completion::FolderSelected {
            path: dir.path().join("gone").to_string_lossy().into_owned(),
        });
        app.iterate(&[UiAction::FirstItem]).expect("frame");
        assert!(app.state().item.is_empty());
    }

    #[test]
    fn permission_result_is_shown() {
        let (host, mut app) = running();

        app.iterate(&[UiAction::GrantPermission]).expect("frame");
        assert_eq!(
            calls_to(&host, "requestPermission")[0].args,
            vec![ArgValue::from("android.permission.POST_NOTIFICATIONS")]
        );

        host.complete(Completion::Permission {
            permission: "android.permission.POST_NOTIFICATIONS".into(),
            granted: true,
        });
        app.iterate(&[]).expect("frame");

        assert_eq!(
            line(&app, "Permission:"),
            Some("Permission: android.permission.POST_NOTIFICATIONS granted")
        );
    }

    #[test]
    fn get_error_shows_host_error_text() {
        let (host, mut app) = running();
        host.set_last_error(Some("NotificationManager unavailable"));

        app.iterate(&[UiAction::GetError]).expect("frame");
        assert_eq!(app.state().error, "NotificationManager unavailable");

        host.set_last_error(None);
        app.iterate(&[UiAction::GetError]).expect("frame");
        assert_eq!(app.state().error, "");
    }

    #[test]
    fn host_failure_is_shown_and_loop_continues() {
        let (host, mut app) = running();
        host.register(
            HOST,
            "postNotification",
            jila_bridge::Capability::PostNotification.signature(),
            |_| {
                Err(jila_core::BridgeError::Invocation {
                    operation: "postNotification".into(),
                    message: "java.lang.SecurityException: permission denied".into(),
                })
            },
        );

        app.iterate(&[
            UiAction::SetTitle("Hello".into()),
            UiAction::SetMessage("World".into()),
            UiAction::PushNotification,
        ])
        .expect("frame");

        assert!(app.state().error.starts_with("The system blocked this action."));
        assert_eq!(app.phase(), Phase::Running);
        assert_eq!(host.live_refs(), 0);
    }

    #[test]
    fn actions_before_quit_in_one_frame_still_run() {
        let (host, mut app) = running();

        let frame = ["title Hello", "message World", "push", "quit", "title Late"]
            .into_iter()
            .filter_map(crate::commands::parse);
        app.step(frame).expect("frame");

        assert_eq!(calls_to(&host, "postNotification").len(), 1);
        assert_eq!(app.phase(), Phase::Quitting);
        assert_eq!(app.state().title.as_str(), "Hello");
        assert_eq!(line(&app, "Title:"), Some("Title: Hello"));
    }

    #[test]
    fn commands_run_in_arrival_order() {
        let host = Arc::new(StubHost::with_capabilities(HOST));
        let services = AppServices::with_host(AppConfig::default(), host);
        let mut app = App::init(services, HeadlessSurface::new(800, 600, 1.0)).expect("init");

        app.step([
            Command::Action(UiAction::SetTitle("before".into())),
            Command::Event(AppEvent::Resized {
                width: 640,
                height: 480,
            }),
            Command::Action(UiAction::SetTitle("after".into())),
        ])
        .expect("frame");

        let frame = app.surface().last_frame().expect("frame");
        assert_eq!(frame.rect.w, 640);
        assert!(frame.lines.contains(&"Title: after".to_owned()));
    }

    #[test]
    fn repeated_quit_is_idempotent() {
        let (_host, mut app) = running();
        app.handle_event(AppEvent::Quit);
        app.handle_event(AppEvent::Quit);
        assert_eq!(app.phase(), Phase::Quitting);
        app.quit();
    }

    #[test]
    fn quit_releases_context_and_closes_surface() {
        let (host, mut app) = running();
        app.handle_event(AppEvent::Quit);
        assert_eq!(app.phase(), Phase::Quitting);

        // A quitting app renders nothing more.
        let presented = app.surface().presented();
        app.iterate(&[UiAction::GetError]).expect("frame");
        assert_eq!(app.surface().presented(), presented);

        app.quit();
        assert_eq!(host.live_objects(), 0);
    }

    #[test]
    fn dropped_app_releases_context() {
        let (host, app) = running();
        drop(app);
        assert_eq!(host.live_objects(), 0);
    }

    #[test]
    fn text_edits_touch_no_host_state() {
        let (host, mut app) = running();
        let before = host.journal().len();
        app.iterate(&[UiAction::SetTitle("x".repeat(70))]).expect("frame");
        assert_eq!(host.journal().len(), before);
        assert_eq!(app.state().title.as_str().chars().count(), 49);
    }
}
