use std::path::Path;

use log::{debug, warn};

use crate::pipeline::aggregate::{aggregate, DailyAggregate, WeeklySummary};
use crate::pipeline::error::PipelineError;
use crate::pipeline::recording::Recording;
use crate::pipeline::series::merge;

/// Channels chosen for one analysis run.
#[derive(Clone, Debug)]
pub struct ChannelSelection {
    pub ahi: String,
    pub pressure: String,
}

#[derive(Clone, Debug)]
pub struct Analysis {
    pub device: String,
    pub daily: DailyAggregate,
    pub weekly: WeeklySummary,
}

/// The whole pipeline as one pure call: open the recording, load both
/// channels, join on timestamps, aggregate. The file is opened once and
/// released when this returns, on every exit path.
///
/// Channels with differing sample rates fail fast instead of silently
/// joining to an empty table. A genuinely empty join (no overlapping
/// timestamps) is a valid-but-empty result, not an error.
pub fn analyze_recording(
    path: &Path,
    selection: &ChannelSelection,
) -> Result<Analysis, PipelineError> {
    let mut recording = Recording::open(path)?;

    let ahi_info = recording
        .info()
        .channel(&selection.ahi)
        .ok_or_else(|| PipelineError::ChannelNotFound(selection.ahi.clone()))?;
    let pressure_info = recording
        .info()
        .channel(&selection.pressure)
        .ok_or_else(|| PipelineError::ChannelNotFound(selection.pressure.clone()))?;
    if ahi_info.sample_rate_hz != pressure_info.sample_rate_hz {
        return Err(PipelineError::SampleRateMismatch {
            ahi_channel: selection.ahi.clone(),
            ahi_rate: ahi_info.sample_rate_hz,
            pressure_channel: selection.pressure.clone(),
            pressure_rate: pressure_info.sample_rate_hz,
        });
    }

    let ahi = recording.load_channel(&selection.ahi)?;
    let pressure = recording.load_channel(&selection.pressure)?;
    let merged = merge(&ahi, &pressure);
    debug!(
        "merged {} of {} '{}' samples with '{}'",
        merged.rows.len(),
        ahi.len(),
        selection.ahi,
        selection.pressure
    );
    if merged.rows.is_empty() {
        warn!(
            "channels '{}' and '{}' share no timestamps",
            selection.ahi, selection.pressure
        );
    }

    let (daily, weekly) = aggregate(&merged);
    Ok(Analysis {
        device: recording.info().device.clone(),
        daily,
        weekly,
    })
}
