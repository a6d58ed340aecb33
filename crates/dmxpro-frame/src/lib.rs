//! Message framing for the Enttec DMX USB Pro widget protocol.
//!
//! Every message exchanged with the widget is framed with:
//! - a start delimiter `0x7E`
//! - a 1-byte label identifying the command
//! - a 2-byte little-endian payload length
//! - the payload, then an end delimiter `0xE7`
//!
//! Encoding is pure. [`FrameWriter`] and [`FrameReader`] move whole frames
//! over any `Write`/`Read` stream, so callers never deal with partial I/O.

pub mod codec;
pub mod error;
pub mod label;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_frame, decode_stream, encode_frame, Frame, FrameConfig, DEFAULT_MAX_PAYLOAD, END,
    HEADER_SIZE, MAX_PAYLOAD, MIN_FRAME_SIZE, START,
};
pub use error::{FrameError, Result};
pub use label::{label_name, WidgetPort};
pub use reader::FrameReader;
pub use writer::FrameWriter;
