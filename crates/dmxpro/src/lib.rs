//! Drive Enttec DMX USB Pro widgets over USB serial.
//!
//! dmxpro keeps one DMX512 universe in memory and sends it to the widget as
//! framed send-DMX messages, optionally only the span of channels that
//! changed since the last send.
//!
//! # Crate Structure
//!
//! - [`transport`]: serial port access and widget discovery
//! - [`frame`]: the widget's `7E label len payload E7` message framing
//! - [`controller`]: universe state, change tracking and submission

/// Re-export transport types.
pub mod transport {
    pub use dmxpro_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use dmxpro_frame::*;
}

/// Re-export controller types.
pub mod controller {
    pub use dmxpro_controller::*;
}

pub use dmxpro_controller::{Controller, ControllerConfig, SubmitAfter};
