//! DMX universe control for Enttec DMX USB Pro widgets.
//!
//! This is the layer applications talk to. A [`Controller`] owns one
//! universe of channel values and one transport, and turns channel changes
//! into send-DMX frames, either the whole universe or only the span of
//! channels that changed since the last submission.

pub mod config;
pub mod controller;
pub mod error;
pub mod universe;
pub mod widget;

pub use config::{ControllerConfig, DEFAULT_DMX_SIZE};
pub use controller::{Controller, ControllerState, Submission, SubmitAfter};
pub use error::{ControllerError, Result};
pub use universe::{checked_value, ChannelRange, UniverseBuffer, DMX_START_CODE, MAX_CHANNELS};
pub use widget::{
    request_serial_number, request_widget_parameters, set_port_widget_parameters, WidgetInfo,
    WidgetParameters,
};
