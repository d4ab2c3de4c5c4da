use chrono::{Duration, NaiveDateTime};

use crate::pipeline::error::PipelineError;

/// One channel's samples with reconstructed absolute timestamps.
#[derive(Clone, Debug)]
pub struct ChannelSeries {
    pub label: String,
    pub sample_rate_hz: f64,
    pub points: Vec<SamplePoint>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplePoint {
    pub at: NaiveDateTime,
    pub value: f64,
}

impl ChannelSeries {
    /// Builds a series from raw samples, synthesizing one timestamp per sample
    /// as `start + i / sample_rate` seconds. No gap detection: a device that
    /// pauses recording still yields a contiguous time axis.
    pub fn from_samples(
        label: String,
        start: NaiveDateTime,
        sample_rate_hz: f64,
        values: Vec<f64>,
    ) -> Result<Self, PipelineError> {
        if sample_rate_hz <= 0.0 {
            return Err(PipelineError::InvalidSampleRate);
        }
        let points = values
            .into_iter()
            .enumerate()
            .map(|(i, value)| SamplePoint {
                at: start + sample_offset(i, sample_rate_hz),
                value,
            })
            .collect();
        Ok(Self {
            label,
            sample_rate_hz,
            points,
        })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

fn sample_offset(index: usize, sample_rate_hz: f64) -> Duration {
    Duration::microseconds((index as f64 * 1_000_000.0 / sample_rate_hz).round() as i64)
}

/// Inner join of the AHI and pressure series on exact timestamp equality.
#[derive(Clone, Debug)]
pub struct MergedTable {
    pub ahi_label: String,
    pub pressure_label: String,
    pub rows: Vec<MergedRow>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MergedRow {
    pub at: NaiveDateTime,
    pub ahi: f64,
    pub pressure: f64,
}

/// Order-preserving join; rows without a matching timestamp in the other
/// series are dropped. Both inputs have strictly increasing timestamps, so a
/// two-pointer scan suffices.
pub fn merge(ahi: &ChannelSeries, pressure: &ChannelSeries) -> MergedTable {
    let mut rows = Vec::with_capacity(ahi.len().min(pressure.len()));
    let (mut i, mut j) = (0, 0);
    while i < ahi.points.len() && j < pressure.points.len() {
        let a = &ahi.points[i];
        let p = &pressure.points[j];
        if a.at == p.at {
            rows.push(MergedRow {
                at: a.at,
                ahi: a.value,
                pressure: p.value,
            });
            i += 1;
            j += 1;
        } else if a.at < p.at {
            i += 1;
        } else {
            j += 1;
        }
    }
    MergedTable {
        ahi_label: ahi.label.clone(),
        pressure_label: pressure.label.clone(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(22, 0, 0)
            .unwrap()
    }

    #[test]
    fn timestamps_follow_start_plus_index_over_rate() {
        let rate = 256.0;
        let series =
            ChannelSeries::from_samples("AHI".into(), start(), rate, vec![0.0; 100]).unwrap();
        assert_eq!(series.len(), 100);
        for (i, point) in series.points.iter().enumerate() {
            let expected = start()
                + Duration::microseconds((i as f64 * 1_000_000.0 / rate).round() as i64);
            assert_eq!(point.at, expected);
        }
        for pair in series.points.windows(2) {
            assert!(pair[0].at < pair[1].at);
        }
    }

    #[test]
    fn one_hertz_timestamps_land_on_whole_seconds() {
        let series =
            ChannelSeries::from_samples("AHI".into(), start(), 1.0, vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(series.points[2].at, start() + Duration::seconds(2));
    }

    #[test]
    fn zero_rate_is_rejected() {
        let err = ChannelSeries::from_samples("AHI".into(), start(), 0.0, vec![1.0]).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidSampleRate));
    }

    #[test]
    fn merging_aligned_series_keeps_every_row() {
        let ahi =
            ChannelSeries::from_samples("AHI".into(), start(), 1.0, vec![1.0, 2.0, 3.0]).unwrap();
        let pressure =
            ChannelSeries::from_samples("MaskPress.95".into(), start(), 1.0, vec![8.0, 8.2, 8.4])
                .unwrap();
        let merged = merge(&ahi, &pressure);
        assert_eq!(merged.rows.len(), 3);
        assert_eq!(merged.rows[1].ahi, 2.0);
        assert_eq!(merged.rows[1].pressure, 8.2);
    }

    #[test]
    fn merging_disjoint_series_yields_no_rows() {
        let ahi = ChannelSeries::from_samples("AHI".into(), start(), 1.0, vec![1.0, 2.0]).unwrap();
        let offset = start() + Duration::milliseconds(500);
        let pressure =
            ChannelSeries::from_samples("MaskPress.95".into(), offset, 1.0, vec![8.0, 8.2])
                .unwrap();
        assert!(merge(&ahi, &pressure).rows.is_empty());
    }
}
