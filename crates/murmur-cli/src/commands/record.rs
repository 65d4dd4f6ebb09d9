//! Interactive recording session.
//!
//! The terminal is the collaborator layer here: it drives the controller
//! with `toggle()` on Enter/Space and renders the event stream as lines.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use murmur_core::{
    CaptureConfig, ControllerConfig, ControllerEvent, LifecycleState, OpenAiBackend,
    RecordingController, Settings, SettingsCredentials, SystemClipboard,
};

use crate::app;

enum KeyAction {
    Toggle,
    Quit,
}

pub async fn run() -> Result<()> {
    let settings = Settings::load();
    let capture = CaptureConfig::ffmpeg(&settings.input_backend, &settings.audio_codec);

    let report = app::probe_dependencies(&capture.binary, &std::env::temp_dir());
    if !report.available() {
        app::report_missing(&report);
    }

    let config = ControllerConfig {
        capture,
        deps_available: report.available(),
        ..ControllerConfig::default()
    };
    let backend = Arc::new(OpenAiBackend::new(settings.model.clone()));
    let (controller, mut events) = RecordingController::new(
        config,
        backend,
        Arc::new(SystemClipboard),
        Arc::new(SettingsCredentials),
    );

    // Render the controller's event stream. `\r\n` keeps lines aligned while
    // the key reader holds the terminal in raw mode.
    let renderer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                ControllerEvent::StateChanged(state) => {
                    print!("[{}]\r\n", state_label(state));
                }
                ControllerEvent::Notify(message) => print!("{message}\r\n"),
                ControllerEvent::SettingsRequested => {
                    print!("Run `murmur config --api-key <KEY>` to set your OpenAI API key.\r\n");
                }
            }
        }
    });

    print!("Press Enter to start or stop recording, q to quit.\r\n");
    loop {
        match tokio::task::spawn_blocking(read_key).await? {
            Ok(KeyAction::Toggle) => controller.toggle(),
            Ok(KeyAction::Quit) => break,
            Err(err) => {
                eprintln!("failed to read key: {err}");
                break;
            }
        }
    }

    controller.shutdown();
    // Give the final Idle event a moment to render before exiting.
    tokio::time::sleep(Duration::from_millis(50)).await;
    renderer.abort();
    Ok(())
}

fn state_label(state: LifecycleState) -> &'static str {
    match state {
        LifecycleState::Idle => "idle",
        LifecycleState::Recording => "recording",
        LifecycleState::Stopping => "stopping",
        LifecycleState::WaitingForFile => "finalizing audio",
        LifecycleState::Transcribing => "transcribing",
        LifecycleState::Polling => "waiting for result",
    }
}

/// Block until a key we care about arrives. Raw mode is held only for the
/// duration of the wait so notification lines render normally in between.
fn read_key() -> Result<KeyAction> {
    enable_raw_mode()?;
    let action = loop {
        match event::read()? {
            Event::Key(KeyEvent {
                code: KeyCode::Enter | KeyCode::Char(' '),
                ..
            }) => break KeyAction::Toggle,
            Event::Key(KeyEvent {
                code: KeyCode::Char('q') | KeyCode::Esc,
                ..
            }) => break KeyAction::Quit,
            Event::Key(KeyEvent {
                code: KeyCode::Char('c'),
                modifiers,
                ..
            }) if modifiers.contains(KeyModifiers::CONTROL) => break KeyAction::Quit,
            _ => {}
        }
    };
    disable_raw_mode()?;
    Ok(action)
}
