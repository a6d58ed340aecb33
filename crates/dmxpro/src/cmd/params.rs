use std::time::Duration;

use dmxpro_controller::{
    request_serial_number, request_widget_parameters, set_port_widget_parameters,
    WidgetParameters,
};
use dmxpro_frame::{FrameConfig, FrameReader, FrameWriter};
use dmxpro_transport::{SerialConfig, SerialStream};
use serde::Serialize;
use tracing::info;

use crate::cmd::ParamsArgs;
use crate::exit::{controller_error, frame_error, transport_error, CliResult, SUCCESS};
use crate::output::{print_record, OutputFormat};

// Largest reply: a parameters header followed by a full user configuration
// block. Received-DMX frames from port 1 fit under it too.
const REPLY_MAX_PAYLOAD: usize = 5 + 512;

#[derive(Serialize)]
struct ParamsOutput {
    port: String,
    widget_port: u8,
    serial_number: u32,
    firmware: String,
    break_time: u8,
    mab_time: u8,
    rate: u8,
    user_bytes: Vec<u8>,
}

pub fn run(args: ParamsArgs, format: OutputFormat) -> CliResult<i32> {
    let port = args.target.resolve()?;
    let stream = SerialStream::open(&port, &SerialConfig::default())
        .map_err(|err| transport_error(&format!("open {port}"), err))?;
    let read_half = stream
        .try_clone()
        .map_err(|err| transport_error(&format!("clone {port}"), err))?;
    let frame_config = reply_frame_config(args.timeout);
    let mut writer = FrameWriter::with_config_serial(stream, frame_config.clone())
        .map_err(|err| frame_error(&format!("configure {port}"), err))?;
    let mut reader = FrameReader::with_config_serial(read_half, frame_config)
        .map_err(|err| frame_error(&format!("configure {port}"), err))?;

    if let Some(params) = requested_parameters(&args) {
        set_port_widget_parameters(&mut writer, args.output_port, &params)
            .map_err(|err| controller_error("set widget parameters", err))?;
        info!(port = %port, "widget parameters written");
    }

    let info =
        request_widget_parameters(&mut reader, &mut writer, args.output_port, args.user_bytes)
            .map_err(|err| controller_error("read widget parameters", err))?;
    let serial_number = request_serial_number(&mut reader, &mut writer)
        .map_err(|err| controller_error("read serial number", err))?;

    let out = ParamsOutput {
        port,
        widget_port: args.output_port.number(),
        serial_number,
        firmware: info.firmware(),
        break_time: info.parameters.break_time,
        mab_time: info.parameters.mab_time,
        rate: info.parameters.rate,
        user_bytes: info.parameters.user_bytes,
    };
    let fields = [
        ("port", out.port.clone()),
        ("widget_port", out.widget_port.to_string()),
        ("serial_number", format!("{:08}", out.serial_number)),
        ("firmware", out.firmware.clone()),
        ("break_time", out.break_time.to_string()),
        ("mab_time", out.mab_time.to_string()),
        ("rate", out.rate.to_string()),
        ("user_bytes", out.user_bytes.len().to_string()),
    ];
    print_record(&out, &fields, format);
    Ok(SUCCESS)
}

fn reply_frame_config(timeout_ms: u64) -> FrameConfig {
    FrameConfig {
        max_payload_size: REPLY_MAX_PAYLOAD,
        timeout: Some(Duration::from_millis(timeout_ms)),
    }
}

/// Parameters to write, if any timing flag was given. Unset fields keep
/// the widget defaults.
fn requested_parameters(args: &ParamsArgs) -> Option<WidgetParameters> {
    if args.break_time.is_none() && args.mab_time.is_none() && args.rate.is_none() {
        return None;
    }
    let defaults = WidgetParameters::default();
    Some(WidgetParameters {
        break_time: args.break_time.unwrap_or(defaults.break_time),
        mab_time: args.mab_time.unwrap_or(defaults.mab_time),
        rate: args.rate.unwrap_or(defaults.rate),
        user_bytes: Vec::new(),
    })
}
