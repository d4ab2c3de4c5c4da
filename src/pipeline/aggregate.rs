use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};

use crate::pipeline::series::MergedTable;

/// One calendar day of merged samples, averaged per column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DailyRow {
    pub day: NaiveDate,
    pub ahi_mean: f64,
    pub pressure_mean: f64,
    /// The week's mean of daily pressure means, one decimal place, identical
    /// on every day belonging to the same Sunday-starting week.
    pub recommended_pressure: f64,
}

#[derive(Clone, Debug)]
pub struct DailyAggregate {
    pub ahi_label: String,
    pub pressure_label: String,
    pub rows: Vec<DailyRow>,
}

impl DailyAggregate {
    /// The most recent `n` days, or everything if fewer exist. No padding.
    pub fn last_days(&self, n: usize) -> &[DailyRow] {
        let skip = self.rows.len().saturating_sub(n);
        &self.rows[skip..]
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeeklyRow {
    /// The Sunday beginning the week.
    pub week_start: NaiveDate,
    pub recommended_pressure: f64,
    /// Percent change from the prior week's recommendation; 0 for the first week.
    pub change_pct: f64,
}

impl WeeklyRow {
    pub fn pressure_text(&self) -> String {
        format!("{:.1}", self.recommended_pressure)
    }

    pub fn change_text(&self) -> String {
        format!("{:.1}%", self.change_pct)
    }
}

#[derive(Clone, Debug, Default)]
pub struct WeeklySummary {
    pub rows: Vec<WeeklyRow>,
}

/// The Sunday on or before `day`; weeks run Sunday through Saturday.
pub fn week_start_sunday(day: NaiveDate) -> NaiveDate {
    day - Duration::days(day.weekday().num_days_from_sunday() as i64)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Collapses the merged table into per-day means, attaches the weekly
/// recommended pressure to every day, and builds the weekly summary.
/// An empty merged table produces empty outputs, not an error.
pub fn aggregate(merged: &MergedTable) -> (DailyAggregate, WeeklySummary) {
    let mut per_day: BTreeMap<NaiveDate, (f64, f64, usize)> = BTreeMap::new();
    for row in &merged.rows {
        let bucket = per_day.entry(row.at.date()).or_insert((0.0, 0.0, 0));
        bucket.0 += row.ahi;
        bucket.1 += row.pressure;
        bucket.2 += 1;
    }

    let mut rows: Vec<DailyRow> = per_day
        .into_iter()
        .map(|(day, (ahi_sum, pressure_sum, count))| DailyRow {
            day,
            ahi_mean: ahi_sum / count as f64,
            pressure_mean: pressure_sum / count as f64,
            recommended_pressure: 0.0,
        })
        .collect();

    let mut per_week: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for row in &rows {
        let bucket = per_week
            .entry(week_start_sunday(row.day))
            .or_insert((0.0, 0));
        bucket.0 += row.pressure_mean;
        bucket.1 += 1;
    }
    let recommended: BTreeMap<NaiveDate, f64> = per_week
        .into_iter()
        .map(|(week, (sum, count))| (week, round1(sum / count as f64)))
        .collect();

    for row in &mut rows {
        row.recommended_pressure = recommended[&week_start_sunday(row.day)];
    }

    let mut weekly = Vec::with_capacity(recommended.len());
    let mut prev: Option<f64> = None;
    for (&week_start, &pressure) in &recommended {
        let change_pct = match prev {
            Some(p) if p != 0.0 => round1((pressure - p) / p * 100.0),
            _ => 0.0,
        };
        weekly.push(WeeklyRow {
            week_start,
            recommended_pressure: pressure,
            change_pct,
        });
        prev = Some(pressure);
    }

    (
        DailyAggregate {
            ahi_label: merged.ahi_label.clone(),
            pressure_label: merged.pressure_label.clone(),
            rows,
        },
        WeeklySummary { rows: weekly },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::series::MergedRow;
    use chrono::{NaiveDateTime, Weekday};

    fn table(rows: Vec<MergedRow>) -> MergedTable {
        MergedTable {
            ahi_label: "AHI".into(),
            pressure_label: "MaskPress.95".into(),
            rows,
        }
    }

    fn at(date: NaiveDate, hour: u32) -> NaiveDateTime {
        date.and_hms_opt(hour, 0, 0).unwrap()
    }

    #[test]
    fn daily_mean_of_two_samples() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let merged = table(vec![
            MergedRow {
                at: at(day, 1),
                ahi: 4.0,
                pressure: 9.0,
            },
            MergedRow {
                at: at(day, 2),
                ahi: 6.0,
                pressure: 11.0,
            },
        ]);
        let (daily, _) = aggregate(&merged);
        assert_eq!(daily.rows.len(), 1);
        assert_eq!(daily.rows[0].ahi_mean, 5.0);
        assert_eq!(daily.rows[0].pressure_mean, 10.0);
    }

    #[test]
    fn weekly_recommendation_is_broadcast_to_every_day() {
        // Sunday-to-Saturday week with daily pressure means mixing 10, 12, 14.
        let sunday = NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();
        assert_eq!(sunday.weekday(), Weekday::Sun);
        let pressures = [10.0, 10.0, 12.0, 12.0, 12.0, 14.0, 14.0];
        let rows = pressures
            .iter()
            .enumerate()
            .map(|(i, &p)| MergedRow {
                at: at(sunday + Duration::days(i as i64), 12),
                ahi: 3.0,
                pressure: p,
            })
            .collect();
        let (daily, weekly) = aggregate(&table(rows));
        assert_eq!(daily.rows.len(), 7);
        for row in &daily.rows {
            assert_eq!(row.recommended_pressure, 12.0);
        }
        assert_eq!(weekly.rows.len(), 1);
        assert_eq!(weekly.rows[0].week_start, sunday);
        assert_eq!(weekly.rows[0].pressure_text(), "12.0");
        assert_eq!(weekly.rows[0].change_text(), "0.0%");
    }

    #[test]
    fn percent_change_renders_with_one_decimal() {
        let sunday = NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();
        let rows = (0..21)
            .map(|i| MergedRow {
                at: at(sunday + Duration::days(i), 12),
                ahi: 3.0,
                pressure: match i / 7 {
                    0 => 10.0,
                    1 => 12.0,
                    _ => 10.0,
                },
            })
            .collect();
        let (_, weekly) = aggregate(&table(rows));
        let texts: Vec<String> = weekly.rows.iter().map(|r| r.change_text()).collect();
        assert_eq!(texts, ["0.0%", "20.0%", "-16.7%"]);
    }

    #[test]
    fn two_sunday_aligned_weeks_collapse_to_two_summary_rows() {
        let sunday = NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();
        let rows = (0..14)
            .flat_map(|d| {
                (0..24).map(move |h| MergedRow {
                    at: at(sunday + Duration::days(d), h),
                    ahi: if h % 2 == 0 { 2.0 } else { 8.0 },
                    pressure: 8.0,
                })
            })
            .collect();
        let (daily, weekly) = aggregate(&table(rows));
        assert_eq!(daily.rows.len(), 14);
        assert_eq!(weekly.rows.len(), 2);
        assert_eq!(weekly.rows[1].change_text(), "0.0%");
        for row in &daily.rows {
            assert_eq!(row.ahi_mean, 5.0);
            assert_eq!(row.recommended_pressure, 8.0);
        }
    }

    #[test]
    fn last_days_window_never_pads() {
        let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let rows = (0..3)
            .map(|d| MergedRow {
                at: at(monday + Duration::days(d), 12),
                ahi: 1.0,
                pressure: 8.0,
            })
            .collect();
        let (daily, _) = aggregate(&table(rows));
        assert_eq!(daily.last_days(7).len(), 3);
        assert_eq!(daily.last_days(2).len(), 2);
        assert_eq!(daily.last_days(2)[0].day, monday + Duration::days(1));
    }

    #[test]
    fn empty_merge_produces_empty_tables() {
        let (daily, weekly) = aggregate(&table(Vec::new()));
        assert!(daily.is_empty());
        assert!(weekly.rows.is_empty());
    }

    #[test]
    fn week_starts_on_sunday() {
        let wednesday = NaiveDate::from_ymd_opt(2024, 3, 6).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();
        assert_eq!(week_start_sunday(wednesday), sunday);
        assert_eq!(week_start_sunday(sunday), sunday);
    }
}
