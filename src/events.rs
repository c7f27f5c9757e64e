use crate::error::EventBusError;
use std::time::SystemTime;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Notifications delivered by a recording host
#[derive(Debug, Clone, PartialEq)]
pub enum RecordingEvent {
    /// The host started writing a new recording
    RecordingStarted { timestamp: SystemTime },
    /// The host finished writing the current recording
    RecordingStopped { timestamp: SystemTime },
    /// Recurring timer callback, one per host frame while the timer is registered
    Tick,
    /// Operator asked for settings to be re-read
    ReloadSettings,
    /// Shutdown requested
    ShutdownRequested {
        timestamp: SystemTime,
        reason: String,
    },
}

impl RecordingEvent {
    pub fn recording_started() -> Self {
        RecordingEvent::RecordingStarted {
            timestamp: SystemTime::now(),
        }
    }

    pub fn recording_stopped() -> Self {
        RecordingEvent::RecordingStopped {
            timestamp: SystemTime::now(),
        }
    }

    pub fn shutdown<S: Into<String>>(reason: S) -> Self {
        RecordingEvent::ShutdownRequested {
            timestamp: SystemTime::now(),
            reason: reason.into(),
        }
    }

    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            RecordingEvent::RecordingStarted { .. } => "Recording started".to_string(),
            RecordingEvent::RecordingStopped { .. } => "Recording stopped".to_string(),
            RecordingEvent::Tick => "Tick".to_string(),
            RecordingEvent::ReloadSettings => "Settings reload requested".to_string(),
            RecordingEvent::ShutdownRequested { reason, .. } => {
                format!("Shutdown requested: {}", reason)
            }
        }
    }

    /// Get the event type as a string for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            RecordingEvent::RecordingStarted { .. } => "recording_started",
            RecordingEvent::RecordingStopped { .. } => "recording_stopped",
            RecordingEvent::Tick => "tick",
            RecordingEvent::ReloadSettings => "reload_settings",
            RecordingEvent::ShutdownRequested { .. } => "shutdown_requested",
        }
    }
}

/// Async event bus carrying host notifications to the controller
pub struct EventBus {
    sender: broadcast::Sender<RecordingEvent>,
}

impl EventBus {
    /// Create a new event bus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events and get a receiver
    pub fn subscribe(&self) -> broadcast::Receiver<RecordingEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all subscribers
    pub async fn publish(&self, event: RecordingEvent) -> Result<usize, EventBusError> {
        match &event {
            RecordingEvent::RecordingStarted { .. } | RecordingEvent::RecordingStopped { .. } => {
                info!("{}", event.description());
            }
            RecordingEvent::ShutdownRequested { reason, .. } => {
                info!("Shutdown requested: {}", reason);
            }
            // Ticks arrive once per frame
            RecordingEvent::Tick => {}
            RecordingEvent::ReloadSettings => {
                debug!("Event: {}", event.description());
            }
        }

        self.sender
            .send(event)
            .map_err(|e| EventBusError::PublishFailed {
                details: e.to_string(),
            })
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Check if there are any active subscribers
    pub fn has_subscribers(&self) -> bool {
        self.sender.receiver_count() > 0
    }
}

/// Event filter for selective event handling
#[derive(Debug, Clone)]
pub enum EventFilter {
    /// Accept all events
    All,
    /// Accept only specific event types
    EventTypes(Vec<&'static str>),
    /// Custom filter function
    Custom(fn(&RecordingEvent) -> bool),
}

impl EventFilter {
    /// Check if an event passes this filter
    pub fn matches(&self, event: &RecordingEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::EventTypes(types) => types.contains(&event.event_type()),
            EventFilter::Custom(filter_fn) => filter_fn(event),
        }
    }
}

/// Event receiver with filtering
pub struct EventReceiver {
    receiver: broadcast::Receiver<RecordingEvent>,
    filter: EventFilter,
    name: String,
}

impl EventReceiver {
    /// Create a new event receiver with a filter
    pub fn new(
        receiver: broadcast::Receiver<RecordingEvent>,
        filter: EventFilter,
        name: String,
    ) -> Self {
        Self {
            receiver,
            filter,
            name,
        }
    }

    /// Receive the next filtered event.
    ///
    /// A lagging receiver reports [`EventBusError::Lagged`] once and can keep
    /// receiving afterwards.
    pub async fn recv(&mut self) -> Result<RecordingEvent, EventBusError> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if self.filter.matches(&event) {
                        return Ok(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Receiver '{}' lagged behind by {} events", self.name, n);
                    return Err(EventBusError::Lagged { skipped: n });
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Event bus closed for receiver '{}'", self.name);
                    return Err(EventBusError::ChannelClosed);
                }
            }
        }
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&mut self) -> Result<Option<RecordingEvent>, EventBusError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.filter.matches(&event) {
                        return Ok(Some(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => {
                    return Ok(None);
                }
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    warn!("Receiver '{}' lagged behind by {} events", self.name, n);
                    return Err(EventBusError::Lagged { skipped: n });
                }
                Err(broadcast::error::TryRecvError::Closed) => {
                    debug!("Event bus closed for receiver '{}'", self.name);
                    return Err(EventBusError::ChannelClosed);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{timeout, Duration};

    #[tokio::test]
    async fn test_publish_and_receive() {
        let bus = EventBus::new(16);
        let mut receiver = bus.subscribe();

        let delivered = bus.publish(RecordingEvent::recording_started()).await.unwrap();
        assert_eq!(delivered, 1);

        let event = timeout(Duration::from_millis(100), receiver.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.event_type(), "recording_started");
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_fails() {
        let bus = EventBus::new(16);
        assert!(!bus.has_subscribers());

        let result = bus.publish(RecordingEvent::Tick).await;
        assert!(matches!(result, Err(EventBusError::PublishFailed { .. })));
    }

    #[tokio::test]
    async fn test_filtered_receiver_skips_other_events() {
        let bus = EventBus::new(16);
        let mut receiver = EventReceiver::new(
            bus.subscribe(),
            EventFilter::EventTypes(vec!["recording_stopped"]),
            "stop_only".to_string(),
        );

        bus.publish(RecordingEvent::Tick).await.unwrap();
        bus.publish(RecordingEvent::recording_stopped()).await.unwrap();

        let event = timeout(Duration::from_millis(100), receiver.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.event_type(), "recording_stopped");
        assert_eq!(receiver.try_recv().unwrap(), None);
    }

    #[tokio::test]
    async fn test_lagged_receiver_recovers() {
        let bus = EventBus::new(2);
        let mut receiver = EventReceiver::new(bus.subscribe(), EventFilter::All, "slow".to_string());

        for _ in 0..4 {
            bus.publish(RecordingEvent::Tick).await.unwrap();
        }

        assert_eq!(
            receiver.try_recv(),
            Err(EventBusError::Lagged { skipped: 2 })
        );
        assert_eq!(receiver.try_recv().unwrap(), Some(RecordingEvent::Tick));
    }

    #[test]
    fn test_custom_filter() {
        let filter = EventFilter::Custom(|event| matches!(event, RecordingEvent::Tick));
        assert!(filter.matches(&RecordingEvent::Tick));
        assert!(!filter.matches(&RecordingEvent::ReloadSettings));
        assert!(EventFilter::All.matches(&RecordingEvent::shutdown("test")));
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(
            RecordingEvent::shutdown("user").description(),
            "Shutdown requested: user"
        );
        assert_eq!(RecordingEvent::Tick.event_type(), "tick");
    }
}
