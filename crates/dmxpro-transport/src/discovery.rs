//! Serial port discovery.
//!
//! Widgets enumerate as USB serial devices. Port names are not stable across
//! reboots or replugging, so callers usually look a widget up by its USB
//! serial number (unique per unit) or product id instead.

use std::fmt;

use serialport::{SerialPortInfo, SerialPortType};
use tracing::debug;

use crate::error::{Result, TransportError};

/// Bus a serial port is attached through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortKind {
    Usb,
    Pci,
    Bluetooth,
    Unknown,
}

impl PortKind {
    /// Lowercase name for display.
    pub fn as_str(self) -> &'static str {
        match self {
            PortKind::Usb => "usb",
            PortKind::Pci => "pci",
            PortKind::Bluetooth => "bluetooth",
            PortKind::Unknown => "unknown",
        }
    }
}

/// Descriptor attributes of one serial port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortDetails {
    /// Platform port identifier, usable with [`crate::SerialStream::open`].
    pub name: String,
    pub kind: PortKind,
    /// USB vendor id.
    pub vid: Option<u16>,
    /// USB product id.
    pub pid: Option<u16>,
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
}

impl PortDetails {
    /// Details for a port with no descriptor information.
    pub fn unknown(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PortKind::Unknown,
            vid: None,
            pid: None,
            serial_number: None,
            manufacturer: None,
            product: None,
        }
    }

    /// Returns true if this port's descriptor satisfies `query`.
    pub fn matches(&self, query: &PortQuery) -> bool {
        match query {
            PortQuery::SerialNumber(serial) => {
                self.serial_number.as_deref() == Some(serial.as_str())
            }
            PortQuery::ProductId(pid) => self.pid == Some(*pid),
        }
    }
}

impl From<SerialPortInfo> for PortDetails {
    fn from(info: SerialPortInfo) -> Self {
        let mut details = PortDetails::unknown(info.port_name);
        match info.port_type {
            SerialPortType::UsbPort(usb) => {
                details.kind = PortKind::Usb;
                details.vid = Some(usb.vid);
                details.pid = Some(usb.pid);
                details.serial_number = usb.serial_number;
                details.manufacturer = usb.manufacturer;
                details.product = usb.product;
            }
            SerialPortType::PciPort => details.kind = PortKind::Pci,
            SerialPortType::BluetoothPort => details.kind = PortKind::Bluetooth,
            SerialPortType::Unknown => {}
        }
        details
    }
}

/// Attribute a port is looked up by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortQuery {
    SerialNumber(String),
    ProductId(u16),
}

impl fmt::Display for PortQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortQuery::SerialNumber(serial) => write!(f, "serial number {serial}"),
            PortQuery::ProductId(pid) => write!(f, "product id {pid:#06x}"),
        }
    }
}

/// List every serial port the operating system reports.
pub fn list_ports() -> Result<Vec<PortDetails>> {
    let ports = serialport::available_ports().map_err(TransportError::Enumerate)?;
    debug!(count = ports.len(), "enumerated serial ports");
    Ok(ports.into_iter().map(PortDetails::from).collect())
}

/// Pick the first port in `ports` matching `query`.
///
/// Returns the port name, or `PortNotFound` if nothing matches.
pub fn find_port(ports: &[PortDetails], query: &PortQuery) -> Result<String> {
    ports
        .iter()
        .find(|port| port.matches(query))
        .map(|port| port.name.clone())
        .ok_or_else(|| TransportError::PortNotFound(query.clone()))
}

/// Find the port of the attached device with the given USB serial number.
pub fn find_port_by_serial_number(serial_number: &str) -> Result<String> {
    find_port(
        &list_ports()?,
        &PortQuery::SerialNumber(serial_number.to_string()),
    )
}

/// Find the port of the first attached device with the given USB product id.
pub fn find_port_by_product_id(product_id: u16) -> Result<String> {
    find_port(&list_ports()?, &PortQuery::ProductId(product_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usb(name: &str, pid: u16, serial: &str) -> PortDetails {
        PortDetails {
            kind: PortKind::Usb,
            vid: Some(0x0403),
            pid: Some(pid),
            serial_number: Some(serial.to_string()),
            manufacturer: Some("ENTTEC".to_string()),
            product: Some("DMX USB PRO".to_string()),
            ..PortDetails::unknown(name)
        }
    }

    #[test]
    fn find_by_serial_number() {
        let ports = vec![
            PortDetails::unknown("/dev/ttyS0"),
            usb("/dev/ttyUSB0", 0x6001, "EN055555"),
            usb("/dev/ttyUSB1", 0x6001, "EN099999"),
        ];

        let query = PortQuery::SerialNumber("EN099999".to_string());
        assert_eq!(find_port(&ports, &query).unwrap(), "/dev/ttyUSB1");
    }

    #[test]
    fn find_by_product_id_returns_first_match() {
        let ports = vec![
            usb("/dev/ttyUSB0", 0x6001, "A"),
            usb("/dev/ttyUSB1", 0x6001, "B"),
        ];

        let name = find_port(&ports, &PortQuery::ProductId(0x6001)).unwrap();
        assert_eq!(name, "/dev/ttyUSB0");
    }

    #[test]
    fn missing_port_is_port_not_found() {
        let ports = vec![PortDetails::unknown("/dev/ttyS0")];
        let err = find_port(&ports, &PortQuery::ProductId(0x6001)).unwrap_err();
        assert!(matches!(
            err,
            TransportError::PortNotFound(PortQuery::ProductId(0x6001))
        ));
        assert_eq!(
            err.to_string(),
            "no serial port found with product id 0x6001"
        );
    }

    #[test]
    fn ports_without_descriptor_never_match() {
        let port = PortDetails::unknown("/dev/ttyS0");
        assert!(!port.matches(&PortQuery::SerialNumber(String::new())));
        assert!(!port.matches(&PortQuery::ProductId(0)));
    }
}
