use crate::error::Result;
use crate::events::{EventBus, RecordingEvent};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Map a key to the host notification it stands for
pub(crate) fn event_for_key(code: KeyCode) -> Option<RecordingEvent> {
    match code {
        KeyCode::Char('r') => Some(RecordingEvent::recording_started()),
        KeyCode::Char('s') => Some(RecordingEvent::recording_stopped()),
        KeyCode::Char('c') => Some(RecordingEvent::ReloadSettings),
        KeyCode::Char('q') | KeyCode::Esc => {
            Some(RecordingEvent::shutdown("User requested via keyboard"))
        }
        _ => None,
    }
}

/// Keyboard bindings standing in for the recorder's start/stop buttons
pub struct KeyboardInputHandler {
    event_bus: Arc<EventBus>,
    cancellation_token: CancellationToken,
}

impl KeyboardInputHandler {
    /// Create a new keyboard input handler
    pub fn new(event_bus: Arc<EventBus>) -> Self {
        Self {
            event_bus,
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Start listening for keyboard input
    pub async fn start(&self) -> Result<()> {
        info!("Keyboard input active - r: start, s: stop, c: reload settings, q: quit");

        let event_bus = Arc::clone(&self.event_bus);
        let cancellation_token = self.cancellation_token.clone();
        let runtime_handle = Handle::current();

        task::spawn_blocking(move || {
            if let Err(e) = enable_raw_mode() {
                error!("Failed to enable raw mode for keyboard input: {}", e);
                return;
            }

            loop {
                if cancellation_token.is_cancelled() {
                    debug!("Keyboard input handler stopping");
                    break;
                }

                match event::poll(Duration::from_millis(100)) {
                    Ok(true) => {
                        let key_event = match event::read() {
                            Ok(Event::Key(key_event)) if key_event.kind == KeyEventKind::Press => {
                                key_event
                            }
                            _ => continue,
                        };

                        let Some(recording_event) = event_for_key(key_event.code) else {
                            debug!("Key pressed: {:?}", key_event.code);
                            continue;
                        };

                        let quit = matches!(
                            recording_event,
                            RecordingEvent::ShutdownRequested { .. }
                        );

                        let event_bus_clone = Arc::clone(&event_bus);
                        runtime_handle.spawn(async move {
                            if let Err(e) = event_bus_clone.publish(recording_event).await {
                                warn!("Failed to publish keyboard event: {}", e);
                            }
                        });

                        if quit {
                            break;
                        }
                    }
                    Ok(false) => {}
                    Err(e) => {
                        warn!("Error polling for keyboard events: {}", e);
                    }
                }
            }

            if let Err(e) = disable_raw_mode() {
                error!("Failed to disable raw mode: {}", e);
            } else {
                debug!("Raw mode disabled");
            }
        });

        Ok(())
    }

    /// Stop the keyboard input handler
    pub async fn stop(&self) -> Result<()> {
        info!("Stopping keyboard input handler");
        self.cancellation_token.cancel();

        // Give the task a moment to clean up and disable raw mode
        tokio::time::sleep(Duration::from_millis(200)).await;

        // Ensure raw mode is disabled even if the task didn't clean up properly
        let _ = disable_raw_mode();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bindings() {
        assert_eq!(
            event_for_key(KeyCode::Char('r')).map(|e| e.event_type()),
            Some("recording_started")
        );
        assert_eq!(
            event_for_key(KeyCode::Char('s')).map(|e| e.event_type()),
            Some("recording_stopped")
        );
        assert_eq!(
            event_for_key(KeyCode::Char('c')),
            Some(RecordingEvent::ReloadSettings)
        );
        assert_eq!(
            event_for_key(KeyCode::Esc).map(|e| e.event_type()),
            Some("shutdown_requested")
        );
        assert_eq!(event_for_key(KeyCode::Char('x')), None);
    }

    #[tokio::test]
    async fn test_keyboard_handler_stop() {
        let event_bus = Arc::new(EventBus::new(16));
        let handler = KeyboardInputHandler::new(event_bus);

        assert!(!handler.cancellation_token.is_cancelled());
        handler.stop().await.unwrap();
        assert!(handler.cancellation_token.is_cancelled());
    }
}
