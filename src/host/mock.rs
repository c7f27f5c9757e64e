use super::{FrameRate, HostLogLevel, RecordingHost};
use crate::error::Result;
use crate::events::{EventBus, EventFilter, EventReceiver, RecordingEvent};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;

/// Host queries and commands observed by [`MockHost`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    LastRecordingPath,
    RecordingOutputPath,
    VideoFrameRate,
    LifecycleEvents,
    AddTickTimer,
    RemoveTickTimer,
    Log(HostLogLevel, String),
}

#[derive(Debug, Default)]
struct MockState {
    last_recording: Option<PathBuf>,
    output_path: Option<PathBuf>,
    frame_rate: FrameRate,
    timer_active: bool,
    calls: Vec<HostCall>,
}

/// In-memory host for testing without a recording application
pub struct MockHost {
    event_bus: Arc<EventBus>,
    state: Mutex<MockState>,
}

impl MockHost {
    /// Create a new mock host publishing on `event_bus`
    pub fn new(event_bus: Arc<EventBus>) -> Self {
        Self {
            event_bus,
            state: Mutex::new(MockState::default()),
        }
    }

    pub fn set_last_recording(&self, path: Option<PathBuf>) {
        self.state.lock().last_recording = path;
    }

    pub fn set_output_path(&self, path: Option<PathBuf>) {
        self.state.lock().output_path = path;
    }

    pub fn set_frame_rate(&self, frame_rate: FrameRate) {
        self.state.lock().frame_rate = frame_rate;
    }

    pub fn timer_active(&self) -> bool {
        self.state.lock().timer_active
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<HostCall> {
        self.state.lock().calls.clone()
    }

    /// Messages written to the host log at `level`
    pub fn logged(&self, level: HostLogLevel) -> Vec<String> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                HostCall::Log(logged_level, message) if *logged_level == level => {
                    Some(message.clone())
                }
                _ => None,
            })
            .collect()
    }

    /// Publish an event as if the host had raised it
    pub async fn emit(&self, event: RecordingEvent) -> Result<()> {
        self.event_bus.publish(event).await?;
        Ok(())
    }

    fn record(&self, call: HostCall) {
        self.state.lock().calls.push(call);
    }
}

impl RecordingHost for MockHost {
    fn last_recording_path(&self) -> Option<PathBuf> {
        let mut state = self.state.lock();
        state.calls.push(HostCall::LastRecordingPath);
        state.last_recording.clone()
    }

    fn recording_output_path(&self) -> Option<PathBuf> {
        let mut state = self.state.lock();
        state.calls.push(HostCall::RecordingOutputPath);
        state.output_path.clone()
    }

    fn video_frame_rate(&self) -> FrameRate {
        let mut state = self.state.lock();
        state.calls.push(HostCall::VideoFrameRate);
        state.frame_rate
    }

    fn lifecycle_events(&self) -> EventReceiver {
        self.record(HostCall::LifecycleEvents);
        EventReceiver::new(
            self.event_bus.subscribe(),
            EventFilter::All,
            "mock_host".to_string(),
        )
    }

    fn add_tick_timer(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.push(HostCall::AddTickTimer);
        state.timer_active = true;
        Ok(())
    }

    fn remove_tick_timer(&self) {
        let mut state = self.state.lock();
        state.calls.push(HostCall::RemoveTickTimer);
        state.timer_active = false;
    }

    fn log(&self, level: HostLogLevel, message: &str) {
        self.record(HostCall::Log(level, message.to_string()));
    }
}
