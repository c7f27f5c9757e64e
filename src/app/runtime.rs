use super::{ControllerState, OrganizerController, ShutdownReason};
use crate::error::{EventBusError, Result};
use crate::keyboard_input::KeyboardInputHandler;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::{oneshot, Mutex};
use tracing::{info, warn};

impl OrganizerController {
    /// Dispatch host events until shutdown; returns the process exit code
    pub async fn run(&mut self) -> Result<i32> {
        info!("Recording organizer is running");

        // Subscribe before anything can publish
        let mut events = self.host.lifecycle_events();

        if self.keyboard_enabled {
            let handler = KeyboardInputHandler::new(Arc::clone(&self.event_bus));
            handler.start().await?;
            self.keyboard_handler = Some(handler);
        }

        let (shutdown_sender, mut shutdown_receiver) = oneshot::channel();
        self.setup_signal_handlers(shutdown_sender);
        self.state = ControllerState::Running;

        let reason = loop {
            tokio::select! {
                signalled = &mut shutdown_receiver => {
                    break signalled.unwrap_or_else(|_| {
                        ShutdownReason::Error("Signal channel closed unexpectedly".to_string())
                    });
                }
                received = events.recv() => match received {
                    Ok(event) => {
                        if let Some(reason) = self.process_event(&event) {
                            break reason;
                        }
                    }
                    Err(EventBusError::Lagged { skipped }) => {
                        warn!("Dropped {} host events; frame log may have gaps", skipped);
                    }
                    Err(e) => break ShutdownReason::Error(e.to_string()),
                }
            }
        };

        info!("Shutdown initiated: {:?}", reason);
        self.shutdown(reason).await
    }

    /// Set up signal handlers for graceful shutdown
    fn setup_signal_handlers(&self, shutdown_sender: oneshot::Sender<ShutdownReason>) {
        let shutdown_sender = Arc::new(Mutex::new(Some(shutdown_sender)));

        // Handle SIGTERM - Unix only
        #[cfg(unix)]
        {
            let shutdown_sender_sigterm = Arc::clone(&shutdown_sender);
            tokio::spawn(async move {
                let mut sigterm =
                    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                        Ok(sigterm) => sigterm,
                        Err(e) => {
                            warn!("Failed to register SIGTERM handler: {}", e);
                            return;
                        }
                    };

                if sigterm.recv().await.is_some() {
                    info!("Received SIGTERM signal");
                    if let Some(sender) = shutdown_sender_sigterm.lock().await.take() {
                        let _ = sender.send(ShutdownReason::Signal("SIGTERM".to_string()));
                    }
                }
            });
        }

        // Handle SIGINT (Ctrl+C) - Cross-platform
        let shutdown_sender_sigint = Arc::clone(&shutdown_sender);
        tokio::spawn(async move {
            if let Ok(()) = signal::ctrl_c().await {
                info!("Received SIGINT signal (Ctrl+C)");
                if let Some(sender) = shutdown_sender_sigint.lock().await.take() {
                    let _ = sender.send(ShutdownReason::Signal("SIGINT".to_string()));
                }
            }
        });
    }
}
