use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read recording: {0}")]
    Recording(#[from] edfplus::EdfError),
    #[error("channel '{0}' not found in the recording")]
    ChannelNotFound(String),
    #[error("sample rate must be greater than zero")]
    InvalidSampleRate,
    #[error(
        "sample rate mismatch: '{ahi_channel}' runs at {ahi_rate} Hz but '{pressure_channel}' runs at {pressure_rate} Hz"
    )]
    SampleRateMismatch {
        ahi_channel: String,
        ahi_rate: f64,
        pressure_channel: String,
        pressure_rate: f64,
    },
    #[error("failed to load device profiles: {0}")]
    Profiles(String),
    #[error("failed to render chart: {0}")]
    Plot(String),
    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for PipelineError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        PipelineError::Plot(format!("{value:?}"))
    }
}

impl From<image::ImageError> for PipelineError {
    fn from(value: image::ImageError) -> Self {
        PipelineError::Plot(value.to_string())
    }
}
