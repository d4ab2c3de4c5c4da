use std::io::Write;

use crate::pipeline::aggregate::DailyAggregate;
use crate::pipeline::error::PipelineError;

/// Serializes the daily aggregate: a Time column, one column per aggregated
/// channel, and the Recommended Pressure column. No extra index column.
pub fn write_daily_csv<W: Write>(out: W, daily: &DailyAggregate) -> Result<(), PipelineError> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record([
        "Time",
        daily.ahi_label.as_str(),
        daily.pressure_label.as_str(),
        "Recommended Pressure",
    ])?;
    for row in &daily.rows {
        writer.write_record([
            row.day.format("%Y-%m-%d").to_string(),
            row.ahi_mean.to_string(),
            row.pressure_mean.to_string(),
            format!("{:.1}", row.recommended_pressure),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
