use crate::settings::{
    default_camera_id, default_day, default_vid_count, default_vid_total, default_week,
    RecordingSettings,
};
use crate::timestamp::{DEFAULT_TIMEZONE, MAX_CLOCK_OFFSET_MS};
use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RecorgConfig {
    pub recording: RecordingSettings,
    pub timestamp: TimestampConfig,
    pub host: HostConfig,
    pub system: SystemConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TimestampConfig {
    /// IANA timezone used for filename stamps
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Correction added to the system clock, in milliseconds
    #[serde(default = "default_clock_offset_ms")]
    pub clock_offset_ms: i64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct HostConfig {
    /// Directory the recorder writes finished files into
    #[serde(default = "default_recording_dir")]
    pub recording_dir: String,

    /// Frame rate numerator of the recorder's video output
    #[serde(default = "default_fps_numerator")]
    pub fps_numerator: u32,

    /// Frame rate denominator of the recorder's video output
    #[serde(default = "default_fps_denominator")]
    pub fps_denominator: u32,

    /// File extensions treated as recordings
    #[serde(default = "default_video_extensions")]
    pub video_extensions: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SystemConfig {
    /// Event bus capacity
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,
}

impl RecorgConfig {
    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            .set_default("recording.vid_total", default_vid_total())?
            .set_default("recording.vid_count", default_vid_count())?
            .set_default("recording.camera_id", default_camera_id())?
            .set_default("recording.week", default_week())?
            .set_default("recording.day", default_day())?
            .set_default("timestamp.timezone", default_timezone())?
            .set_default("timestamp.clock_offset_ms", default_clock_offset_ms())?
            .set_default("host.recording_dir", default_recording_dir())?
            .set_default("host.fps_numerator", default_fps_numerator())?
            .set_default("host.fps_denominator", default_fps_denominator())?
            .set_default("host.video_extensions", default_video_extensions())?
            .set_default(
                "system.event_bus_capacity",
                default_event_bus_capacity() as i64,
            )?
            // Add configuration file (optional)
            .add_source(File::with_name(&path_str).required(false))
            // RECORG_RECORDING__CAMERA_ID=3
            .add_source(
                Environment::with_prefix("RECORG")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: RecorgConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.recording
            .validate()
            .map_err(|e| ConfigError::Message(format!("Recording settings: {}", e)))?;

        if self.timestamp.timezone.parse::<Tz>().is_err() {
            return Err(ConfigError::Message(format!(
                "Unknown timestamp timezone '{}'",
                self.timestamp.timezone
            )));
        }

        if self.timestamp.clock_offset_ms.unsigned_abs() > MAX_CLOCK_OFFSET_MS as u64 {
            return Err(ConfigError::Message(format!(
                "Timestamp clock_offset_ms {} exceeds +/-{}",
                self.timestamp.clock_offset_ms, MAX_CLOCK_OFFSET_MS
            )));
        }

        if self.host.recording_dir.trim().is_empty() {
            return Err(ConfigError::Message(
                "Host recording_dir must not be empty".to_string(),
            ));
        }

        if self.host.fps_numerator == 0 || self.host.fps_denominator == 0 {
            return Err(ConfigError::Message(
                "Host fps numerator and denominator must be greater than 0".to_string(),
            ));
        }

        if self.host.video_extensions.is_empty() {
            return Err(ConfigError::Message(
                "Host video_extensions must list at least one extension".to_string(),
            ));
        }

        if self.system.event_bus_capacity == 0 {
            return Err(ConfigError::Message(
                "Event bus capacity must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for RecorgConfig {
    fn default() -> Self {
        Self {
            recording: RecordingSettings::default(),
            timestamp: TimestampConfig {
                timezone: default_timezone(),
                clock_offset_ms: default_clock_offset_ms(),
            },
            host: HostConfig {
                recording_dir: default_recording_dir(),
                fps_numerator: default_fps_numerator(),
                fps_denominator: default_fps_denominator(),
                video_extensions: default_video_extensions(),
            },
            system: SystemConfig {
                event_bus_capacity: default_event_bus_capacity(),
            },
        }
    }
}

// Default value functions
fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}
fn default_clock_offset_ms() -> i64 {
    0
}

fn default_recording_dir() -> String {
    "./recordings".to_string()
}
fn default_fps_numerator() -> u32 {
    30
}
fn default_fps_denominator() -> u32 {
    1
}
fn default_video_extensions() -> Vec<String> {
    vec!["mp4".to_string(), "mkv".to_string()]
}

fn default_event_bus_capacity() -> usize {
    256
}
