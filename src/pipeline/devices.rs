use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::pipeline::error::PipelineError;

/// Channel-name defaults for one known device family.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct DeviceProfile {
    pub device: String,
    pub ahi_channel: String,
    pub pressure_channel: String,
}

/// Literal channel names assumed for devices without a profile.
pub const FALLBACK_AHI: &str = "AHI";
pub const FALLBACK_PRESSURE: &str = "MaskPress.95";

pub fn builtin_profiles() -> Vec<DeviceProfile> {
    vec![
        DeviceProfile {
            device: "ResMed AirSense 11".to_string(),
            ahi_channel: "AHI".to_string(),
            pressure_channel: "MaskPress.95".to_string(),
        },
        // The AirCurve family labels its mask-pressure analog plainly.
        DeviceProfile {
            device: "ResMed AirCurve 10".to_string(),
            ahi_channel: "AHI".to_string(),
            pressure_channel: "Pressure".to_string(),
        },
    ]
}

/// Additional profiles from a JSON array; callers list these ahead of the
/// built-ins so they take precedence.
pub fn load_profiles(path: &Path) -> Result<Vec<DeviceProfile>, PipelineError> {
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|e| PipelineError::Profiles(e.to_string()))
}

/// Default channel picks for one recording. A `None` slot means the resolved
/// name is absent from the recording and the user must choose explicitly.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChannelDefaults {
    pub ahi: Option<String>,
    pub pressure: Option<String>,
}

pub fn resolve_defaults(
    device_id: &str,
    available: &[String],
    profiles: &[DeviceProfile],
) -> ChannelDefaults {
    let (ahi, pressure) = match profiles.iter().find(|p| p.device == device_id) {
        Some(profile) => (profile.ahi_channel.as_str(), profile.pressure_channel.as_str()),
        None => (FALLBACK_AHI, FALLBACK_PRESSURE),
    };
    let present = |name: &str| {
        available
            .iter()
            .any(|label| label == name)
            .then(|| name.to_string())
    };
    ChannelDefaults {
        ahi: present(ahi),
        pressure: present(pressure),
    }
}
