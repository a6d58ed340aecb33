use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{Args, Subcommand};
use dmxpro_controller::{Controller, ControllerConfig};
use dmxpro_frame::WidgetPort;
use dmxpro_transport::{
    find_port_by_product_id, find_port_by_serial_number, SerialConfig, SerialStream,
};
use tracing::debug;

use crate::exit::{controller_error, transport_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod params;
pub mod ports;
pub mod set;
pub mod universe;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List serial ports and their USB descriptors.
    Ports,
    /// Set channels and send the universe once.
    Set(SetArgs),
    /// Set every channel to zero and send.
    #[command(alias = "blackout")]
    Clear(UniverseArgs),
    /// Set every channel to full and send.
    FullOn(UniverseArgs),
    /// Read (and optionally write) widget output parameters.
    Params(ParamsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Ports => ports::run(format),
        Command::Set(args) => set::run(args, format),
        Command::Clear(args) => universe::run(args, 0, format),
        Command::FullOn(args) => universe::run(args, u8::MAX, format),
        Command::Params(args) => params::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Which serial port the widget is on.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct TargetArgs {
    /// Serial port name (e.g. /dev/ttyUSB0, COM3).
    pub port: Option<String>,
    /// Find the widget by USB serial number.
    #[arg(long, value_name = "SERIAL")]
    pub serial: Option<String>,
    /// Find the widget by USB product id (decimal or 0x-prefixed hex).
    #[arg(long, value_name = "PID", value_parser = parse_product_id)]
    pub product_id: Option<u16>,
}

impl TargetArgs {
    pub fn resolve(&self) -> CliResult<String> {
        if let Some(port) = &self.port {
            return Ok(port.clone());
        }
        let found = if let Some(serial) = &self.serial {
            find_port_by_serial_number(serial)
        } else if let Some(pid) = self.product_id {
            find_port_by_product_id(pid)
        } else {
            return Err(CliError::new(USAGE, "no port, serial or product id given"));
        };
        let port = found.map_err(|err| transport_error("resolve port", err))?;
        debug!(port = %port, "resolved widget port");
        Ok(port)
    }
}

/// Controller settings shared by the universe commands.
#[derive(Args, Debug)]
pub struct ControllerArgs {
    /// JSON file with controller settings.
    #[arg(long, value_name = "FILE", env = "DMXPRO_CONFIG")]
    pub config: Option<PathBuf>,
    /// Number of channels to send, overriding the config file.
    #[arg(long, value_name = "N")]
    pub size: Option<usize>,
    /// Widget output port, overriding the config file.
    #[arg(long, value_name = "1|2", value_parser = parse_widget_port)]
    pub output_port: Option<WidgetPort>,
}

impl ControllerArgs {
    pub fn load(&self) -> CliResult<ControllerConfig> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => ControllerConfig::default(),
        };
        if let Some(size) = self.size {
            config.dmx_size = size;
        }
        if let Some(port) = self.output_port {
            config.output_port = port;
        }
        config
            .validate()
            .map_err(|err| controller_error("config", err))?;
        Ok(config)
    }
}

fn read_config(path: &Path) -> CliResult<ControllerConfig> {
    let text = std::fs::read_to_string(path).map_err(|err| {
        crate::exit::io_error(&format!("read config {}", path.display()), err)
    })?;
    serde_json::from_str(&text).map_err(|err| {
        CliError::new(
            crate::exit::DATA_INVALID,
            format!("parse config {}: {err}", path.display()),
        )
    })
}

/// Open the widget and build a controller for it.
pub fn open_controller(
    target: &TargetArgs,
    args: &ControllerArgs,
) -> CliResult<(String, Controller<SerialStream>)> {
    let config = args.load()?;
    let port = target.resolve()?;
    let controller = Controller::open(&port, &SerialConfig::default(), config)
        .map_err(|err| controller_error(&format!("open {port}"), err))?;
    Ok((port, controller))
}

#[derive(Args, Debug)]
pub struct SetArgs {
    #[command(flatten)]
    pub target: TargetArgs,
    #[command(flatten)]
    pub controller: ControllerArgs,
    /// Channel assignments as CHANNEL=VALUE (channels start at 1).
    #[arg(long = "channel", short = 'c', value_name = "CH=VAL", required = true)]
    pub channels: Vec<ChannelValue>,
}

#[derive(Args, Debug)]
pub struct UniverseArgs {
    #[command(flatten)]
    pub target: TargetArgs,
    #[command(flatten)]
    pub controller: ControllerArgs,
}

#[derive(Args, Debug)]
pub struct ParamsArgs {
    #[command(flatten)]
    pub target: TargetArgs,
    /// Widget port to query.
    #[arg(long, value_name = "1|2", default_value = "1", value_parser = parse_widget_port)]
    pub output_port: WidgetPort,
    /// Number of user configuration bytes to read back.
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub user_bytes: u16,
    /// How long to wait for each widget reply, in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 1000)]
    pub timeout: u64,
    /// Write a new break time (9-127) before reading.
    #[arg(long, value_name = "UNITS")]
    pub break_time: Option<u8>,
    /// Write a new mark-after-break time (1-127) before reading.
    #[arg(long, value_name = "UNITS")]
    pub mab_time: Option<u8>,
    /// Write a new output rate (0-40 packets/s) before reading.
    #[arg(long, value_name = "HZ")]
    pub rate: Option<u8>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// One `CHANNEL=VALUE` assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelValue {
    pub channel: usize,
    pub value: i64,
}

impl FromStr for ChannelValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (channel, value) = s
            .split_once('=')
            .ok_or_else(|| format!("expected CHANNEL=VALUE, got {s:?}"))?;
        let channel = channel
            .trim()
            .parse()
            .map_err(|_| format!("invalid channel {channel:?}"))?;
        let value = value
            .trim()
            .parse()
            .map_err(|_| format!("invalid value {value:?}"))?;
        Ok(Self { channel, value })
    }
}

fn parse_product_id(input: &str) -> Result<u16, String> {
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => input.parse(),
    };
    parsed.map_err(|_| format!("invalid product id {input:?}"))
}

fn parse_widget_port(input: &str) -> Result<WidgetPort, String> {
    input
        .parse::<u8>()
        .ok()
        .and_then(WidgetPort::from_number)
        .ok_or_else(|| format!("widget port must be 1 or 2, got {input:?}"))
}
