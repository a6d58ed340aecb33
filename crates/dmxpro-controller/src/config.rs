use dmxpro_frame::WidgetPort;
use serde::{Deserialize, Deserializer};

use crate::error::{ControllerError, Result};
use crate::universe::MAX_CHANNELS;

/// Channels per universe unless configured otherwise.
pub const DEFAULT_DMX_SIZE: usize = MAX_CHANNELS;

/// Controller behaviour, fixed for the lifetime of a [`crate::Controller`].
///
/// Deserializes from JSON (or any serde format) with every field optional:
///
/// ```json
/// { "dmx_size": 24, "dynamic_submission": true, "output_port": 2 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerConfig {
    /// Number of channels in the universe, `1..=512`. Default: 512.
    pub dmx_size: usize,
    /// Submit after every mutating call unless the call says otherwise.
    /// Default: false.
    pub auto_submit: bool,
    /// Send only the span of channels that changed since the last
    /// submission. Default: false (always send the whole universe).
    pub dynamic_submission: bool,
    /// Widget output port the universe is sent on. Default: port 1.
    #[serde(deserialize_with = "deserialize_port")]
    pub output_port: WidgetPort,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            dmx_size: DEFAULT_DMX_SIZE,
            auto_submit: false,
            dynamic_submission: false,
            output_port: WidgetPort::Port1,
        }
    }
}

impl ControllerConfig {
    /// Check the configuration once, before a controller is built from it.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_CHANNELS).contains(&self.dmx_size) {
            return Err(ControllerError::InvalidConfig(format!(
                "dmx_size must be between 1 and {MAX_CHANNELS}, got {}",
                self.dmx_size
            )));
        }
        Ok(())
    }
}

fn deserialize_port<'de, D>(deserializer: D) -> std::result::Result<WidgetPort, D::Error>
where
    D: Deserializer<'de>,
{
    let number = u8::deserialize(deserializer)?;
    WidgetPort::from_number(number).ok_or_else(|| {
        serde::de::Error::custom(format!("output_port must be 1 or 2, got {number}"))
    })
}
