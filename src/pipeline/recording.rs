use std::path::Path;

use chrono::NaiveDateTime;
use edfplus::EdfReader;
use log::debug;

use crate::pipeline::error::PipelineError;
use crate::pipeline::series::ChannelSeries;

/// One channel as reported by the recording header.
#[derive(Clone, Debug)]
pub struct ChannelInfo {
    pub label: String,
    pub sample_rate_hz: f64,
    pub sample_count: usize,
}

/// Metadata for one recording: device identifier (the EDF+ equipment field,
/// possibly empty), absolute start timestamp, and the ordered channel list.
/// Timestamps are naive; EDF start times carry no timezone.
#[derive(Clone, Debug)]
pub struct RecordingInfo {
    pub device: String,
    pub start: NaiveDateTime,
    pub channels: Vec<ChannelInfo>,
}

impl RecordingInfo {
    /// Exact, case-sensitive label lookup.
    pub fn channel(&self, label: &str) -> Option<&ChannelInfo> {
        self.channels.iter().find(|c| c.label == label)
    }

    pub fn channel_labels(&self) -> Vec<String> {
        self.channels.iter().map(|c| c.label.clone()).collect()
    }
}

/// An open recording. The underlying file is held for the lifetime of this
/// value and released on drop, on every exit path.
pub struct Recording {
    reader: EdfReader,
    info: RecordingInfo,
}

impl Recording {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let reader = EdfReader::open(path)?;
        let header = reader.header();
        let record_seconds = header.datarecord_duration as f64 / 10_000_000.0;
        let channels = header
            .signals
            .iter()
            .map(|signal| ChannelInfo {
                label: signal.label.clone(),
                sample_rate_hz: signal.samples_per_record as f64 / record_seconds,
                sample_count: signal.samples_in_file as usize,
            })
            .collect();
        let info = RecordingInfo {
            device: header.equipment.trim().to_string(),
            start: header.start_date.and_time(header.start_time),
            channels,
        };
        Ok(Self { reader, info })
    }

    pub fn info(&self) -> &RecordingInfo {
        &self.info
    }

    /// Reads every sample of the named channel and synthesizes its time axis.
    pub fn load_channel(&mut self, label: &str) -> Result<ChannelSeries, PipelineError> {
        let index = self
            .info
            .channels
            .iter()
            .position(|c| c.label == label)
            .ok_or_else(|| PipelineError::ChannelNotFound(label.to_string()))?;
        let channel = self.info.channels[index].clone();
        debug!(
            "loading channel '{}': {} samples at {} Hz",
            label, channel.sample_count, channel.sample_rate_hz
        );
        self.reader.rewind(index)?;
        let values = self.reader.read_physical_samples(index, channel.sample_count)?;
        ChannelSeries::from_samples(
            label.to_string(),
            self.info.start,
            channel.sample_rate_hz,
            values,
        )
    }
}

/// Metadata query that opens the file only for the duration of the call.
pub fn read_metadata<P: AsRef<Path>>(path: P) -> Result<RecordingInfo, PipelineError> {
    Ok(Recording::open(path)?.info.clone())
}
