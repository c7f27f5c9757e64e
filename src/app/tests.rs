use super::*;
use crate::config::RecorgConfig;
use crate::events::{EventBus, RecordingEvent};
use crate::host::{HostLogLevel, MockHost, RecordingHost};
use crate::settings::RecordingSettings;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};

fn create_test_controller(recording_dir: &Path) -> (Arc<MockHost>, OrganizerController) {
    let event_bus = Arc::new(EventBus::new(64));
    let host = Arc::new(MockHost::new(Arc::clone(&event_bus)));
    host.set_output_path(Some(recording_dir.to_path_buf()));

    let mut config = RecorgConfig::default();
    config.recording = RecordingSettings::new(10, 4, 2, 1, 3);
    config.host.recording_dir = recording_dir.to_string_lossy().to_string();

    let controller = OrganizerController::new(
        config,
        Arc::clone(&host) as Arc<dyn RecordingHost>,
        event_bus,
    )
    .unwrap();
    (host, controller)
}

fn files_in(dir: &Path) -> Vec<std::path::PathBuf> {
    let mut files: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    files
}

#[test]
fn test_controller_rejects_invalid_settings() {
    let event_bus = Arc::new(EventBus::new(16));
    let host = Arc::new(MockHost::new(Arc::clone(&event_bus)));
    let mut config = RecorgConfig::default();
    config.recording.camera_id = 0;

    let result = OrganizerController::new(config, host as Arc<dyn RecordingHost>, event_bus);
    assert!(result.is_err());
}

#[test]
fn test_process_event_full_recording_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let (host, mut controller) = create_test_controller(dir.path());
    let source = dir.path().join("raw.mp4");

    assert_eq!(controller.process_event(&RecordingEvent::recording_started()), None);
    assert!(host.timer_active());

    fs::write(&source, b"video").unwrap();
    host.set_last_recording(Some(source.clone()));
    for _ in 0..3 {
        assert_eq!(controller.process_event(&RecordingEvent::Tick), None);
    }
    assert_eq!(controller.process_event(&RecordingEvent::recording_stopped()), None);

    assert!(!source.exists());
    assert!(!host.timer_active());

    let vid_dir = dir.path().join("W1/D3/vid");
    let videos = files_in(&vid_dir);
    assert_eq!(videos.len(), 1);
    let video_name = videos[0].file_name().unwrap().to_string_lossy().to_string();
    assert!(video_name.starts_with("C2_W1D3_REC4-10_"));

    let logs = files_in(&vid_dir.join("video_log"));
    assert_eq!(logs.len(), 1);
    assert_eq!(
        fs::read_to_string(&logs[0]).unwrap(),
        "frame,timestamp_ms\n0,0\n1,33\n2,66\n"
    );
}

#[test]
fn test_handler_failure_is_reported_to_host() {
    let dir = tempfile::tempdir().unwrap();
    let (host, mut controller) = create_test_controller(dir.path());
    host.set_last_recording(Some(dir.path().join("missing.mp4")));

    assert_eq!(controller.process_event(&RecordingEvent::recording_stopped()), None);
    assert_eq!(host.logged(HostLogLevel::Error).len(), 1);
}

#[test]
fn test_shutdown_event_ends_loop() {
    let dir = tempfile::tempdir().unwrap();
    let (_host, mut controller) = create_test_controller(dir.path());

    let reason = controller.process_event(&RecordingEvent::shutdown("test"));
    assert_eq!(reason, Some(ShutdownReason::UserRequest("test".to_string())));
}

#[test]
fn test_reload_settings_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("recorg.toml");
    fs::write(
        &config_path,
        "[recording]\nvid_total = 5\nvid_count = 2\ncamera_id = 6\nweek = 2\nday = 4\n",
    )
    .unwrap();

    let (host, controller) = create_test_controller(dir.path());
    let mut controller = controller.with_config_path(&config_path);

    assert_eq!(controller.process_event(&RecordingEvent::ReloadSettings), None);
    assert_eq!(
        *controller.organizer().settings(),
        RecordingSettings::new(5, 2, 6, 2, 4)
    );
    assert_eq!(controller.config().recording.camera_id, 6);

    fs::write(&config_path, "[recording]\ncamera_id = 12\n").unwrap();
    controller.process_event(&RecordingEvent::ReloadSettings);
    assert_eq!(controller.organizer().settings().camera_id, 6);
    assert_eq!(host.logged(HostLogLevel::Error).len(), 1);
}

#[test]
fn test_reload_without_config_path_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_host, mut controller) = create_test_controller(dir.path());
    assert!(controller.reload_settings().is_err());
}

#[tokio::test]
async fn test_run_until_shutdown_requested() {
    let dir = tempfile::tempdir().unwrap();
    let (host, mut controller) = create_test_controller(dir.path());
    let event_bus = controller.event_bus();

    let handle = tokio::spawn(async move {
        let exit_code = controller.run().await;
        (controller, exit_code)
    });

    timeout(Duration::from_secs(1), async {
        while event_bus.subscriber_count() == 0 {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();

    host.emit(RecordingEvent::recording_started()).await.unwrap();
    host.emit(RecordingEvent::Tick).await.unwrap();
    host.emit(RecordingEvent::Tick).await.unwrap();
    host.emit(RecordingEvent::shutdown("test finished")).await.unwrap();

    let (controller, exit_code) = timeout(Duration::from_secs(2), handle)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(exit_code.unwrap(), 0);
    assert_eq!(controller.state(), ControllerState::Stopped);
    assert!(!controller.organizer().is_logging());
    assert!(!host.timer_active());

    let logs = files_in(&dir.path().join("W1/D3/vid/video_log"));
    assert_eq!(logs.len(), 1);
    assert_eq!(
        fs::read_to_string(&logs[0]).unwrap(),
        "frame,timestamp_ms\n0,0\n1,33\n"
    );
}

#[test]
fn test_shutdown_reason_exit_codes() {
    assert_eq!(ShutdownReason::Signal("SIGINT".to_string()).exit_code(), 0);
    assert_eq!(ShutdownReason::UserRequest("q".to_string()).exit_code(), 0);
    assert_eq!(ShutdownReason::Error("bus closed".to_string()).exit_code(), 1);
}
