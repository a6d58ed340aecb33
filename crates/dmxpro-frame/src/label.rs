//! Message labels.
//!
//! Labels up to 14 belong to the original widget API and address output
//! port 1. Mk2 widgets add a second DMX port whose requests use the
//! extended labels further down; those are only honoured after the Mk2
//! API key has been set on the widget.

/// Reply with (or request) the widget parameters of port 1.
pub const GET_WIDGET_PARAMETERS: u8 = 3;
/// Set the widget parameters of port 1.
pub const SET_WIDGET_PARAMETERS: u8 = 4;
/// DMX packet received on port 1.
pub const RECEIVED_DMX: u8 = 5;
/// Output-only send DMX packet on port 1.
pub const SEND_DMX: u8 = 6;
/// Send an RDM packet on port 1.
pub const SEND_RDM: u8 = 7;
/// Switch port 1 input to change-of-state reporting.
pub const RECEIVE_DMX_ON_CHANGE: u8 = 8;
/// Change-of-state packet received on port 1.
pub const RECEIVED_DMX_CHANGE_OF_STATE: u8 = 9;
/// Request (or reply with) the widget serial number.
pub const GET_WIDGET_SERIAL_NUMBER: u8 = 10;
/// Send an RDM discovery request on port 1.
pub const SEND_RDM_DISCOVERY: u8 = 11;
/// RDM controller receive timeout on port 1.
pub const RDM_CONTROLLER_RECEIVE_TIMEOUT: u8 = 12;
/// Unlock the Mk2 extended API.
pub const SET_API_KEY: u8 = 13;
/// Request (or reply with) the hardware version.
pub const QUERY_HARDWARE_VERSION: u8 = 14;

pub const RECEIVED_DMX_CHANGE_OF_STATE_PORT2: u8 = 22;
pub const RECEIVE_DMX_ON_CHANGE_PORT2: u8 = 128;
pub const SHOW_COMMAND: u8 = 129;
pub const SEND_DMX_PORT2: u8 = 132;
pub const SHOW_QUERY: u8 = 139;
pub const SET_WIDGET_PARAMETERS_PORT2: u8 = 156;
pub const SEND_MIDI: u8 = 191;
pub const GET_WIDGET_PARAMETERS_PORT2: u8 = 196;
pub const SET_PORT_ASSIGNMENT: u8 = 201;
pub const SHOW_READ: u8 = 203;
pub const SEND_RDM_DISCOVERY_PORT2: u8 = 208;
pub const RDM_CONTROLLER_RECEIVE_TIMEOUT_PORT2: u8 = 209;
pub const RECEIVED_DMX_PORT2: u8 = 210;
pub const GET_PORT_ASSIGNMENT: u8 = 220;
pub const RECEIVED_MIDI: u8 = 225;
pub const SEND_RDM_PORT2: u8 = 226;

/// DMX output port on the widget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WidgetPort {
    #[default]
    Port1,
    /// Second universe on Mk2 widgets.
    Port2,
}

impl WidgetPort {
    /// Label of the output-only send DMX request for this port.
    pub fn send_dmx_label(self) -> u8 {
        match self {
            WidgetPort::Port1 => SEND_DMX,
            WidgetPort::Port2 => SEND_DMX_PORT2,
        }
    }

    /// Label of the set widget parameters request for this port.
    pub fn set_parameters_label(self) -> u8 {
        match self {
            WidgetPort::Port1 => SET_WIDGET_PARAMETERS,
            WidgetPort::Port2 => SET_WIDGET_PARAMETERS_PORT2,
        }
    }

    /// Label of the get widget parameters request (and its reply) for this port.
    pub fn get_parameters_label(self) -> u8 {
        match self {
            WidgetPort::Port1 => GET_WIDGET_PARAMETERS,
            WidgetPort::Port2 => GET_WIDGET_PARAMETERS_PORT2,
        }
    }

    /// 1-based port number.
    pub fn number(self) -> u8 {
        match self {
            WidgetPort::Port1 => 1,
            WidgetPort::Port2 => 2,
        }
    }

    /// Port from its 1-based number.
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(WidgetPort::Port1),
            2 => Some(WidgetPort::Port2),
            _ => None,
        }
    }
}

/// Returns a human-readable name for a label.
pub fn label_name(label: u8) -> &'static str {
    match label {
        GET_WIDGET_PARAMETERS | GET_WIDGET_PARAMETERS_PORT2 => "GET_WIDGET_PARAMETERS",
        SET_WIDGET_PARAMETERS | SET_WIDGET_PARAMETERS_PORT2 => "SET_WIDGET_PARAMETERS",
        RECEIVED_DMX | RECEIVED_DMX_PORT2 => "RECEIVED_DMX",
        SEND_DMX | SEND_DMX_PORT2 => "SEND_DMX",
        SEND_RDM | SEND_RDM_PORT2 => "SEND_RDM",
        RECEIVE_DMX_ON_CHANGE | RECEIVE_DMX_ON_CHANGE_PORT2 => "RECEIVE_DMX_ON_CHANGE",
        RECEIVED_DMX_CHANGE_OF_STATE | RECEIVED_DMX_CHANGE_OF_STATE_PORT2 => {
            "RECEIVED_DMX_CHANGE_OF_STATE"
        }
        GET_WIDGET_SERIAL_NUMBER => "GET_WIDGET_SERIAL_NUMBER",
        SEND_RDM_DISCOVERY | SEND_RDM_DISCOVERY_PORT2 => "SEND_RDM_DISCOVERY",
        RDM_CONTROLLER_RECEIVE_TIMEOUT | RDM_CONTROLLER_RECEIVE_TIMEOUT_PORT2 => {
            "RDM_CONTROLLER_RECEIVE_TIMEOUT"
        }
        SET_API_KEY => "SET_API_KEY",
        QUERY_HARDWARE_VERSION => "QUERY_HARDWARE_VERSION",
        SHOW_COMMAND => "SHOW_COMMAND",
        SHOW_QUERY => "SHOW_QUERY",
        SHOW_READ => "SHOW_READ",
        SEND_MIDI => "SEND_MIDI",
        RECEIVED_MIDI => "RECEIVED_MIDI",
        SET_PORT_ASSIGNMENT => "SET_PORT_ASSIGNMENT",
        GET_PORT_ASSIGNMENT => "GET_PORT_ASSIGNMENT",
        _ => "UNKNOWN",
    }
}
