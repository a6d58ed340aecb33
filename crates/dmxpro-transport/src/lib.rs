//! Serial transport for DMX USB Pro widgets.
//!
//! Provides the byte channel the rest of dmxpro writes frames into:
//! - [`SerialStream`], a blocking `Read + Write` handle on an OS serial port
//! - port discovery by USB serial number or product id
//!
//! This is the lowest layer of dmxpro. Everything else builds on top of
//! `std::io::Write` (and, for device replies, `std::io::Read`), so any byte
//! sink can stand in for the serial port.

pub mod discovery;
pub mod error;
pub mod stream;

pub use discovery::{
    find_port, find_port_by_product_id, find_port_by_serial_number, list_ports, PortDetails,
    PortKind, PortQuery,
};
pub use error::{Result, TransportError};
pub use stream::{SerialConfig, SerialStream, DEFAULT_BAUD_RATE, DEFAULT_TIMEOUT};
