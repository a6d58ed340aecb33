//! Widget configuration requests.
//!
//! These are one-off exchanges outside the send-DMX path. Setting parameters
//! is write-only; queries need a reader on the same port and block until the
//! reply arrives or the transport times out.

use std::io::{Read, Write};
use std::ops::RangeInclusive;

use dmxpro_frame::label::GET_WIDGET_SERIAL_NUMBER;
use dmxpro_frame::{FrameError, FrameReader, FrameWriter, WidgetPort};
use tracing::debug;

use crate::controller::write_error;
use crate::error::{ControllerError, Result};

const BREAK_TIME_RANGE: RangeInclusive<u8> = 9..=127;
const MAB_TIME_RANGE: RangeInclusive<u8> = 1..=127;
const RATE_RANGE: RangeInclusive<u8> = 0..=40;
const MAX_USER_BYTES: usize = 512;

/// Output timing of a widget port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetParameters {
    /// Break time in 10.67 µs units, `9..=127`.
    pub break_time: u8,
    /// Mark-after-break time in 10.67 µs units, `1..=127`.
    pub mab_time: u8,
    /// Output rate in packets per second, `0..=40` (0 = as fast as possible).
    pub rate: u8,
    /// User configuration bytes stored on the widget.
    pub user_bytes: Vec<u8>,
}

impl Default for WidgetParameters {
    fn default() -> Self {
        Self {
            break_time: 9,
            mab_time: 1,
            rate: 40,
            user_bytes: Vec::new(),
        }
    }
}

impl WidgetParameters {
    /// Check every field against the range the widget accepts.
    pub fn validate(&self) -> Result<()> {
        check_range("break_time", self.break_time, &BREAK_TIME_RANGE)?;
        check_range("mab_time", self.mab_time, &MAB_TIME_RANGE)?;
        check_range("rate", self.rate, &RATE_RANGE)?;
        if self.user_bytes.len() > MAX_USER_BYTES {
            return Err(ControllerError::InvalidParameter(format!(
                "user_bytes must not be longer than {MAX_USER_BYTES} bytes, got {}",
                self.user_bytes.len()
            )));
        }
        Ok(())
    }

    fn encode(&self) -> Vec<u8> {
        let user_len = self.user_bytes.len() as u16;
        let mut payload = Vec::with_capacity(5 + self.user_bytes.len());
        payload.extend_from_slice(&user_len.to_le_bytes());
        payload.extend_from_slice(&[self.break_time, self.mab_time, self.rate]);
        payload.extend_from_slice(&self.user_bytes);
        payload
    }
}

fn check_range(name: &str, value: u8, range: &RangeInclusive<u8>) -> Result<()> {
    if range.contains(&value) {
        return Ok(());
    }
    Err(ControllerError::InvalidParameter(format!(
        "{name} must be between {} and {}, got {value}",
        range.start(),
        range.end()
    )))
}

/// Parameters reported by a widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetInfo {
    /// Firmware version, major in the high byte.
    pub firmware_version: u16,
    pub parameters: WidgetParameters,
}

impl WidgetInfo {
    /// Firmware version as `major.minor`.
    pub fn firmware(&self) -> String {
        let [minor, major] = self.firmware_version.to_le_bytes();
        format!("{major}.{minor}")
    }
}

/// Write a set widget parameters request for `port`.
pub fn set_port_widget_parameters<W: Write>(
    writer: &mut FrameWriter<W>,
    port: WidgetPort,
    params: &WidgetParameters,
) -> Result<()> {
    params.validate()?;
    writer
        .send(port.set_parameters_label(), &params.encode())
        .map_err(write_error)?;
    debug!(
        port = port.number(),
        break_time = params.break_time,
        mab_time = params.mab_time,
        rate = params.rate,
        "set widget parameters"
    );
    Ok(())
}

/// Ask the widget for the parameters of `port`, reading back up to
/// `user_bytes` bytes of user configuration.
pub fn request_widget_parameters<R: Read, W: Write>(
    reader: &mut FrameReader<R>,
    writer: &mut FrameWriter<W>,
    port: WidgetPort,
    user_bytes: u16,
) -> Result<WidgetInfo> {
    let label = port.get_parameters_label();
    writer
        .send(label, &user_bytes.to_le_bytes())
        .map_err(write_error)?;

    let frame = reader.read_frame_with_label(label)?;
    let payload = frame.payload.as_ref();
    if payload.len() < 5 {
        return Err(FrameError::MalformedFrame("widget parameters reply shorter than 5 bytes").into());
    }

    let info = WidgetInfo {
        firmware_version: u16::from_le_bytes([payload[0], payload[1]]),
        parameters: WidgetParameters {
            break_time: payload[2],
            mab_time: payload[3],
            rate: payload[4],
            user_bytes: payload[5..].to_vec(),
        },
    };
    debug!(port = port.number(), firmware = %info.firmware(), "read widget parameters");
    Ok(info)
}

/// Ask the widget for its serial number.
pub fn request_serial_number<R: Read, W: Write>(
    reader: &mut FrameReader<R>,
    writer: &mut FrameWriter<W>,
) -> Result<u32> {
    writer
        .send(GET_WIDGET_SERIAL_NUMBER, &[])
        .map_err(write_error)?;

    let frame = reader.read_frame_with_label(GET_WIDGET_SERIAL_NUMBER)?;
    let serial = decode_bcd_serial(frame.payload.as_ref())?;
    debug!(serial, "read widget serial number");
    Ok(serial)
}

// Four packed-BCD bytes, least significant pair first.
fn decode_bcd_serial(payload: &[u8]) -> Result<u32> {
    let bytes: [u8; 4] = payload
        .try_into()
        .map_err(|_| FrameError::MalformedFrame("serial number reply is not 4 bytes"))?;

    let mut serial = 0u32;
    for byte in bytes.iter().rev() {
        let (high, low) = (byte >> 4, byte & 0x0F);
        if high > 9 || low > 9 {
            return Err(FrameError::MalformedFrame("serial number is not BCD").into());
        }
        serial = serial * 100 + u32::from(high) * 10 + u32::from(low);
    }
    Ok(serial)
}
