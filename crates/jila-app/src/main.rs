// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Jila — notification, permission and folder demo over the platform bridge
//
// Entry point. Initialises logging and services, then runs the frame loop
// against a headless surface, driven by line commands on stdin.

mod app;
mod commands;
mod services;
mod state;
mod surface;

use std::io::BufRead;
use std::process::ExitCode;
use std::sync::mpsc::{self, TryRecvError};
use std::time::Duration;

use app::{App, AppEvent};
use commands::Command;
use services::app_services::AppServices;
use state::Phase;
use surface::HeadlessSurface;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Jila starting");

    let services = match AppServices::init() {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "failed to initialise services");
            return ExitCode::FAILURE;
        }
    };
    if let Some(path) = services.config_path() {
        tracing::debug!(path = %path.display(), "config source");
    }
    let frame_interval = Duration::from_millis(services.config().frame_interval_ms);

    let surface = HeadlessSurface::new(1280, 720, 1.0);
    let mut app = match App::init(services, surface) {
        Ok(app) => app,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            return ExitCode::FAILURE;
        }
    };

    let (tx, rx) = mpsc::channel();
    let reader = std::thread::Builder::new()
        .name("stdin-commands".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                match commands::parse(&line) {
                    Some(command) => {
                        if tx.send(command).is_err() {
                            return;
                        }
                    }
                    None if line.trim().is_empty() => {}
                    None => tracing::warn!(%line, "unknown command"),
                }
            }
            // Dropping `tx` at end of input disconnects the channel, which
            // the loop treats as a quit.
        });
    if let Err(e) = reader {
        tracing::error!(error = %e, "failed to start command reader");
        app.quit();
        return ExitCode::FAILURE;
    }

    let mut status = ExitCode::SUCCESS;
    loop {
        let mut frame = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(command) => frame.push(command),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    frame.push(Command::Event(AppEvent::Quit));
                    break;
                }
            }
        }
        if let Err(e) = app.step(frame) {
            tracing::error!(error = %e, "render failed");
            status = ExitCode::FAILURE;
            break;
        }
        if app.phase() == Phase::Quitting {
            break;
        }
        std::thread::sleep(frame_interval);
    }

    app.quit();
    status
}
