pub mod aggregate;
pub mod devices;
pub mod error;
pub mod export;
pub mod plot;
pub mod recording;
pub mod series;
pub mod session;

pub use aggregate::{aggregate, DailyAggregate, DailyRow, WeeklyRow, WeeklySummary};
pub use devices::{builtin_profiles, load_profiles, resolve_defaults, ChannelDefaults, DeviceProfile};
pub use error::PipelineError;
pub use plot::{render_ahi_png, render_pressure_png, ChartStyle};
pub use recording::{read_metadata, ChannelInfo, Recording, RecordingInfo};
pub use series::{merge, ChannelSeries, MergedRow, MergedTable, SamplePoint};
pub use session::{analyze_recording, Analysis, ChannelSelection};
