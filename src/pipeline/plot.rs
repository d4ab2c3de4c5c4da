use std::io::Cursor;

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::prelude::*;

use crate::pipeline::aggregate::DailyRow;
use crate::pipeline::error::PipelineError;

/// Fixed horizontal reference drawn on the AHI chart; values below it are in
/// the clinically normal range.
pub const AHI_THRESHOLD: f64 = 5.0;

#[derive(Clone, Debug)]
pub struct ChartStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub line_color: RGBColor,
    pub threshold_color: RGBColor,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width: 900,
            height: 400,
            background: WHITE,
            line_color: BLUE,
            threshold_color: RED,
        }
    }
}

/// AHI over the charted days, with a dashed threshold line at 5.
pub fn render_ahi_png(rows: &[DailyRow], style: &ChartStyle) -> Result<Vec<u8>, PipelineError> {
    render_metric_png(
        rows,
        "AHI over last 7 days",
        "Recorded AHI",
        |row| row.ahi_mean,
        Some(AHI_THRESHOLD),
        style,
    )
}

/// Mask pressure over the charted days; no reference line.
pub fn render_pressure_png(rows: &[DailyRow], style: &ChartStyle) -> Result<Vec<u8>, PipelineError> {
    render_metric_png(
        rows,
        "Recorded Pressure over last 7 days",
        "Recorded Pressure (cmH2O)",
        |row| row.pressure_mean,
        None,
        style,
    )
}

fn render_metric_png(
    rows: &[DailyRow],
    caption: &str,
    y_label: &str,
    value: impl Fn(&DailyRow) -> f64,
    threshold: Option<f64>,
    style: &ChartStyle,
) -> Result<Vec<u8>, PipelineError> {
    if rows.is_empty() {
        return Err(PipelineError::Plot("no daily rows to chart".into()));
    }
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;

        let values: Vec<f64> = rows.iter().map(&value).collect();
        let mut y_min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let mut y_max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if let Some(t) = threshold {
            y_min = y_min.min(t);
            y_max = y_max.max(t);
        }
        if (y_max - y_min).abs() < f64::EPSILON {
            y_min -= 1.0;
            y_max += 1.0;
        }
        let pad = (y_max - y_min) * 0.1;
        let x_max = rows.len().saturating_sub(1) as f64;
        let x_range = if rows.len() == 1 { -0.5..0.5 } else { 0.0..x_max };

        let day_labels: Vec<String> = rows
            .iter()
            .map(|row| row.day.format("%b %d").to_string())
            .collect();

        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption(caption, ("sans-serif", 20).into_font())
            .set_label_area_size(LabelAreaPosition::Left, 55)
            .set_label_area_size(LabelAreaPosition::Bottom, 40)
            .build_cartesian_2d(x_range.clone(), (y_min - pad)..(y_max + pad))?;

        chart
            .configure_mesh()
            .light_line_style(&BLACK.mix(0.08))
            .x_labels(rows.len().min(7))
            .x_label_formatter(&|x: &f64| {
                day_labels
                    .get(x.round() as usize)
                    .cloned()
                    .unwrap_or_default()
            })
            .x_desc("Day")
            .y_desc(y_label)
            .draw()?;

        chart.draw_series(LineSeries::new(
            values.iter().enumerate().map(|(i, &v)| (i as f64, v)),
            &style.line_color,
        ))?;

        if let Some(t) = threshold {
            chart.draw_series(DashedLineSeries::new(
                [(x_range.start, t), (x_range.end, t)],
                6,
                4,
                style.threshold_color.into(),
            ))?;
        }
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}

fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, PipelineError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| PipelineError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
