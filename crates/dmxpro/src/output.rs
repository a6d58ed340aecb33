use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use dmxpro_transport::PortDetails;
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
pub struct PortOutput {
    pub name: String,
    pub kind: &'static str,
    pub vid: Option<String>,
    pub pid: Option<String>,
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
}

impl From<&PortDetails> for PortOutput {
    fn from(port: &PortDetails) -> Self {
        Self {
            name: port.name.clone(),
            kind: port.kind.as_str(),
            vid: port.vid.map(hex_id),
            pid: port.pid.map(hex_id),
            serial_number: port.serial_number.clone(),
            manufacturer: port.manufacturer.clone(),
            product: port.product.clone(),
        }
    }
}

pub fn print_ports(ports: &[PortOutput], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(ports),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PORT", "TYPE", "VID", "PID", "SERIAL", "PRODUCT"]);
            for port in ports {
                table.add_row(vec![
                    port.name.clone(),
                    port.kind.to_string(),
                    or_dash(&port.vid),
                    or_dash(&port.pid),
                    or_dash(&port.serial_number),
                    or_dash(&port.product),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            if ports.is_empty() {
                println!("no serial ports found");
            }
            for port in ports {
                println!(
                    "{} type={} vid={} pid={} serial={} manufacturer={} product={}",
                    port.name,
                    port.kind,
                    or_dash(&port.vid),
                    or_dash(&port.pid),
                    or_dash(&port.serial_number),
                    or_dash(&port.manufacturer),
                    or_dash(&port.product),
                );
            }
        }
    }
}

/// Print one record: JSON as-is, otherwise as labelled `fields`.
pub fn print_record<T: Serialize>(value: &T, fields: &[(&str, String)], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for (name, value) in fields {
                table.add_row(vec![name.to_string(), value.clone()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let line = fields
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join(" ");
            println!("{line}");
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn hex_id(id: u16) -> String {
    format!("0x{id:04x}")
}

fn or_dash(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_string())
}
