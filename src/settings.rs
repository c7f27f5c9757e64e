use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const VID_TOTAL_RANGE: RangeInclusive<u32> = 1..=100;
pub const VID_COUNT_RANGE: RangeInclusive<u32> = 1..=100;
/// Six cameras plus one backup
pub const CAMERA_ID_RANGE: RangeInclusive<u32> = 1..=7;
pub const WEEK_RANGE: RangeInclusive<u32> = 0..=4;
/// Day 0 is reserved for test runs
pub const DAY_RANGE: RangeInclusive<u32> = 0..=5;

/// Operator-supplied identifiers that name every recording and log file
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct RecordingSettings {
    /// Total number of recordings planned for the session
    #[serde(default = "default_vid_total")]
    pub vid_total: u32,

    /// Index of the current recording within the session
    #[serde(default = "default_vid_count")]
    pub vid_count: u32,

    /// Camera number
    #[serde(default = "default_camera_id")]
    pub camera_id: u32,

    /// Week number
    #[serde(default = "default_week")]
    pub week: u32,

    /// Day number within the week
    #[serde(default = "default_day")]
    pub day: u32,
}

impl RecordingSettings {
    pub fn new(vid_total: u32, vid_count: u32, camera_id: u32, week: u32, day: u32) -> Self {
        Self {
            vid_total,
            vid_count,
            camera_id,
            week,
            day,
        }
    }

    /// Check every field against its allowed range
    pub fn validate(&self) -> Result<(), SettingsError> {
        check_range("vid_total", self.vid_total, &VID_TOTAL_RANGE)?;
        check_range("vid_count", self.vid_count, &VID_COUNT_RANGE)?;
        check_range("camera_id", self.camera_id, &CAMERA_ID_RANGE)?;
        check_range("week", self.week, &WEEK_RANGE)?;
        check_range("day", self.day, &DAY_RANGE)?;
        Ok(())
    }

    /// `W<week>D<day>_REC<count>-<total>`, shared by video and log filenames
    pub fn session_tag(&self) -> String {
        format!(
            "W{}D{}_REC{}-{}",
            self.week, self.day, self.vid_count, self.vid_total
        )
    }

    pub fn week_dir_name(&self) -> String {
        format!("W{}", self.week)
    }

    pub fn day_dir_name(&self) -> String {
        format!("D{}", self.day)
    }
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            vid_total: default_vid_total(),
            vid_count: default_vid_count(),
            camera_id: default_camera_id(),
            week: default_week(),
            day: default_day(),
        }
    }
}

fn check_range(
    field: &'static str,
    value: u32,
    range: &RangeInclusive<u32>,
) -> Result<(), SettingsError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(SettingsError::OutOfRange {
            field,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}

pub(crate) fn default_vid_total() -> u32 {
    1
}
pub(crate) fn default_vid_count() -> u32 {
    1
}
pub(crate) fn default_camera_id() -> u32 {
    1
}
pub(crate) fn default_week() -> u32 {
    0
}
pub(crate) fn default_day() -> u32 {
    1
}
