use std::io::{ErrorKind, Write};

use dmxpro_frame::{FrameError, FrameWriter};
use dmxpro_transport::{SerialConfig, SerialStream};
use tracing::{debug, info};

use crate::config::ControllerConfig;
use crate::error::{ControllerError, Result};
use crate::universe::{checked_value, ChannelRange, UniverseBuffer, DMX_START_CODE};
use crate::widget::{set_port_widget_parameters, WidgetParameters};

/// Whether a mutating call submits afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmitAfter {
    /// Follow the controller's `auto_submit` setting.
    #[default]
    Configured,
    /// Submit, regardless of `auto_submit`.
    Always,
    /// Don't submit, regardless of `auto_submit`.
    Never,
}

impl SubmitAfter {
    fn resolve(self, auto_submit: bool) -> bool {
        match self {
            SubmitAfter::Configured => auto_submit,
            SubmitAfter::Always => true,
            SubmitAfter::Never => false,
        }
    }
}

impl From<Option<bool>> for SubmitAfter {
    fn from(value: Option<bool>) -> Self {
        match value {
            None => SubmitAfter::Configured,
            Some(true) => SubmitAfter::Always,
            Some(false) => SubmitAfter::Never,
        }
    }
}

impl From<bool> for SubmitAfter {
    fn from(value: bool) -> Self {
        Some(value).into()
    }
}

/// Whether the universe holds changes the widget hasn't been sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Dirty,
}

/// Outcome of a successful [`Controller::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// A send-DMX frame covering `range` went out; `bytes` is its wire size.
    Sent { range: ChannelRange, bytes: usize },
    /// Dynamic submission found nothing changed; nothing was written.
    Skipped,
}

/// Drives one DMX universe on one widget.
///
/// The controller owns its transport. It is not synchronized; share it
/// across threads only behind the caller's own lock.
pub struct Controller<W> {
    writer: FrameWriter<W>,
    universe: UniverseBuffer,
    config: ControllerConfig,
    payload: Vec<u8>,
}

impl Controller<SerialStream> {
    /// Open a widget on a serial port.
    pub fn open(port: &str, serial: &SerialConfig, config: ControllerConfig) -> Result<Self> {
        let stream = SerialStream::open(port, serial)?;
        info!(port, dmx_size = config.dmx_size, "opened dmx controller");
        Self::new(stream, config)
    }
}

impl<W: Write> Controller<W> {
    /// Build a controller over any byte sink.
    pub fn new(transport: W, config: ControllerConfig) -> Result<Self> {
        Self::with_writer(FrameWriter::new(transport), config)
    }

    /// Build a controller over an already configured frame writer.
    pub fn with_writer(writer: FrameWriter<W>, config: ControllerConfig) -> Result<Self> {
        config.validate()?;
        let universe = UniverseBuffer::new(config.dmx_size)?;
        Ok(Self {
            writer,
            universe,
            payload: Vec::with_capacity(config.dmx_size + 1),
            config,
        })
    }

    /// The configuration this controller was built with.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Number of channels in the universe.
    pub fn size(&self) -> usize {
        self.universe.size()
    }

    /// Current channel values, channel 1 first.
    pub fn channels(&self) -> &[u8] {
        self.universe.values()
    }

    /// Value of a 1-based channel.
    pub fn get_channel(&self, channel: usize) -> Result<u8> {
        self.universe.get(channel)
    }

    /// True while mutations are waiting to be submitted.
    pub fn is_dirty(&self) -> bool {
        self.universe.is_dirty()
    }

    /// `Dirty` while mutations are waiting to be submitted.
    pub fn state(&self) -> ControllerState {
        if self.is_dirty() {
            ControllerState::Dirty
        } else {
            ControllerState::Idle
        }
    }

    /// Set a 1-based channel, then submit according to `submit_after`.
    pub fn set_channel(
        &mut self,
        channel: usize,
        value: u8,
        submit_after: impl Into<SubmitAfter>,
    ) -> Result<()> {
        self.universe.set(channel, value)?;
        self.after_mutation(submit_after.into())
    }

    /// Like [`Controller::set_channel`], for values that still need a range check.
    pub fn set_channel_checked(
        &mut self,
        channel: usize,
        value: i64,
        submit_after: impl Into<SubmitAfter>,
    ) -> Result<()> {
        let value = checked_value(value)?;
        self.set_channel(channel, value, submit_after)
    }

    /// Set every channel to `value`.
    pub fn set_all_channels(
        &mut self,
        value: u8,
        submit_after: impl Into<SubmitAfter>,
    ) -> Result<()> {
        self.universe.fill(value);
        self.after_mutation(submit_after.into())
    }

    /// Set every channel to zero.
    pub fn clear_channels(&mut self, submit_after: impl Into<SubmitAfter>) -> Result<()> {
        self.set_all_channels(0, submit_after)
    }

    /// Set every channel to full.
    pub fn all_channels_on(&mut self, submit_after: impl Into<SubmitAfter>) -> Result<()> {
        self.set_all_channels(u8::MAX, submit_after)
    }

    /// Send the universe to the widget.
    ///
    /// With dynamic submission only the changed span is sent, and nothing at
    /// all if no channel changed. The submitted snapshot is updated only
    /// after the frame has been written; on error it is left as it was, so
    /// the next submit resends the same changes.
    pub fn submit(&mut self) -> Result<Submission> {
        if !self.config.dynamic_submission {
            return self.submit_full();
        }
        match self.universe.diff_range() {
            Some(range) => self.send_range(range),
            None => {
                self.universe.settle();
                debug!("no channel changes, skipping submission");
                Ok(Submission::Skipped)
            }
        }
    }

    /// Send the whole universe, whether or not dynamic submission is on.
    ///
    /// The controller can't know what a freshly opened widget is outputting,
    /// so this is the way to put a known state on the wire.
    pub fn submit_full(&mut self) -> Result<Submission> {
        let range = self.universe.full_range();
        self.send_range(range)
    }

    fn send_range(&mut self, range: ChannelRange) -> Result<Submission> {
        self.payload.clear();
        self.payload.push(DMX_START_CODE);
        self.payload.extend_from_slice(self.universe.slice(range));

        let label = self.config.output_port.send_dmx_label();
        let bytes = self
            .writer
            .send(label, &self.payload)
            .map_err(write_error)?;
        self.universe.commit(range);

        debug!(
            lo = range.lo(),
            hi = range.hi(),
            bytes,
            port = self.config.output_port.number(),
            "submitted dmx frame"
        );
        Ok(Submission::Sent { range, bytes })
    }

    /// Send widget timing parameters for the configured output port.
    pub fn set_widget_parameters(&mut self, params: &WidgetParameters) -> Result<()> {
        set_port_widget_parameters(&mut self.writer, self.config.output_port, params)
    }

    /// Borrow the underlying transport.
    pub fn get_ref(&self) -> &W {
        self.writer.get_ref()
    }

    /// Mutably borrow the underlying transport.
    pub fn get_mut(&mut self) -> &mut W {
        self.writer.get_mut()
    }

    /// Consume the controller and return the transport. Dropping it closes
    /// the port.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn after_mutation(&mut self, submit_after: SubmitAfter) -> Result<()> {
        if submit_after.resolve(self.config.auto_submit) {
            self.submit()?;
        }
        Ok(())
    }
}

pub(crate) fn write_error(err: FrameError) -> ControllerError {
    match err {
        FrameError::Io(io) => ControllerError::TransportWrite(io),
        FrameError::ConnectionClosed => {
            ControllerError::TransportWrite(std::io::Error::from(ErrorKind::WriteZero))
        }
        other => ControllerError::Frame(other),
    }
}

impl<W> std::fmt::Debug for Controller<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("config", &self.config)
            .field("dirty", &self.universe.is_dirty())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use dmxpro_frame::{decode_frame, WidgetPort};

    use super::*;

    /// Byte sink that can be told to fail its next writes.
    #[derive(Default)]
    struct FlakyTransport {
        failing: bool,
        data: Vec<u8>,
    }

    impl Write for FlakyTransport {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.failing {
                return Err(std::io::Error::from(ErrorKind::BrokenPipe));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn controller(config: ControllerConfig) -> Controller<Vec<u8>> {
        Controller::new(Vec::new(), config).unwrap()
    }

    fn dynamic() -> ControllerConfig {
        ControllerConfig {
            dynamic_submission: true,
            ..ControllerConfig::default()
        }
    }

    #[test]
    fn single_channel_dynamic_frame() {
        let mut ctl = controller(dynamic());
        ctl.set_channel(1, 255, SubmitAfter::Configured).unwrap();

        let outcome = ctl.submit().unwrap();
        assert_eq!(
            outcome,
            Submission::Sent {
                range: ChannelRange::new(0, 0),
                bytes: 7
            }
        );
        assert_eq!(
            ctl.get_ref().as_slice(),
            &[0x7E, 0x06, 0x02, 0x00, 0x00, 0xFF, 0xE7]
        );
    }

    #[test]
    fn dynamic_without_changes_writes_nothing() {
        let mut ctl = controller(dynamic());
        assert_eq!(ctl.submit().unwrap(), Submission::Skipped);
        assert!(ctl.get_ref().is_empty());
    }

    #[test]
    fn dynamic_submit_is_idempotent() {
        let mut ctl = controller(dynamic());
        ctl.set_channel(100, 1, SubmitAfter::Never).unwrap();

        assert!(matches!(ctl.submit().unwrap(), Submission::Sent { .. }));
        let written = ctl.get_ref().len();
        assert_eq!(ctl.submit().unwrap(), Submission::Skipped);
        assert_eq!(ctl.get_ref().len(), written);
    }

    #[test]
    fn dynamic_frame_carries_changed_span() {
        let mut ctl = controller(dynamic());
        ctl.set_channel(10, 0xAA, SubmitAfter::Never).unwrap();
        ctl.set_channel(12, 0xBB, SubmitAfter::Never).unwrap();
        ctl.submit().unwrap();

        let frame = decode_frame(ctl.get_ref()).unwrap();
        assert_eq!(frame.label, 6);
        assert_eq!(frame.payload.as_ref(), &[0x00, 0xAA, 0x00, 0xBB]);
    }

    #[test]
    fn small_universe_full_frame() {
        let mut ctl = controller(ControllerConfig {
            dmx_size: 4,
            ..ControllerConfig::default()
        });
        ctl.set_channel(4, 10, SubmitAfter::Never).unwrap();
        ctl.submit().unwrap();

        let wire = ctl.get_ref();
        assert_eq!(&wire[2..4], &[0x05, 0x00]);
        let frame = decode_frame(wire).unwrap();
        assert_eq!(frame.payload.as_ref(), &[0x00, 0x00, 0x00, 0x00, 0x0A]);
    }

    #[test]
    fn full_submission_always_sends_whole_universe() {
        for size in [1usize, 24, 512] {
            let mut ctl = controller(ControllerConfig {
                dmx_size: size,
                ..ControllerConfig::default()
            });
            ctl.set_channel(size, 3, SubmitAfter::Never).unwrap();
            ctl.set_channel(1, 9, SubmitAfter::Never).unwrap();
            ctl.submit().unwrap();
            // Unchanged universes are resent too.
            ctl.submit().unwrap();

            let wire = ctl.get_ref().clone();
            let frame_len = size + 1 + 5;
            assert_eq!(wire.len(), 2 * frame_len);
            for chunk in wire.chunks(frame_len) {
                let frame = decode_frame(chunk).unwrap();
                assert_eq!(frame.payload.len(), size + 1);
                assert_eq!(frame.payload[0], DMX_START_CODE);
                assert_eq!(&frame.payload[1..], ctl.channels());
            }
        }
    }

    #[test]
    fn boundary_channels_rejected() {
        let mut ctl = controller(ControllerConfig {
            dmx_size: 24,
            auto_submit: true,
            ..ControllerConfig::default()
        });
        for channel in [0, 25] {
            let err = ctl.set_channel(channel, 1, SubmitAfter::Configured).unwrap_err();
            assert!(matches!(
                err,
                ControllerError::ChannelOutOfRange { size: 24, .. }
            ));
        }
        assert!(ctl.get_ref().is_empty());
        assert_eq!(ctl.state(), ControllerState::Idle);
    }

    #[test]
    fn checked_values_rejected_before_mutation() {
        let mut ctl = controller(ControllerConfig::default());
        let err = ctl.set_channel_checked(1, 300, true).unwrap_err();
        assert!(matches!(err, ControllerError::ValueOutOfRange { value: 300 }));
        assert_eq!(ctl.get_channel(1).unwrap(), 0);
        assert!(ctl.get_ref().is_empty());

        ctl.set_channel_checked(1, 128, false).unwrap();
        assert_eq!(ctl.get_channel(1).unwrap(), 128);
    }

    #[test]
    fn invalid_size_rejected_at_construction() {
        let result = Controller::new(
            Vec::<u8>::new(),
            ControllerConfig {
                dmx_size: 0,
                ..ControllerConfig::default()
            },
        );
        assert!(matches!(result, Err(ControllerError::InvalidConfig(_))));
    }

    #[test]
    fn auto_submit_and_overrides() {
        let mut ctl = controller(ControllerConfig {
            dmx_size: 8,
            auto_submit: true,
            ..ControllerConfig::default()
        });

        ctl.set_channel(1, 1, SubmitAfter::Configured).unwrap();
        assert_eq!(ctl.get_ref().len(), 14);
        assert_eq!(ctl.state(), ControllerState::Idle);

        ctl.set_channel(2, 2, false).unwrap();
        assert_eq!(ctl.get_ref().len(), 14);
        assert_eq!(ctl.state(), ControllerState::Dirty);
        assert!(ctl.is_dirty());

        let mut manual = controller(ControllerConfig {
            dmx_size: 8,
            ..ControllerConfig::default()
        });
        manual.set_channel(1, 1, None::<bool>).unwrap();
        assert!(manual.get_ref().is_empty());
        manual.set_channel(1, 2, Some(true)).unwrap();
        assert_eq!(manual.get_ref().len(), 14);
    }

    #[test]
    fn whole_universe_operations() {
        let mut ctl = controller(ControllerConfig {
            dmx_size: 3,
            ..ControllerConfig::default()
        });

        ctl.all_channels_on(SubmitAfter::Never).unwrap();
        assert_eq!(ctl.channels(), &[255, 255, 255]);
        ctl.set_all_channels(7, SubmitAfter::Never).unwrap();
        assert_eq!(ctl.channels(), &[7, 7, 7]);
        ctl.clear_channels(SubmitAfter::Always).unwrap();
        assert_eq!(ctl.channels(), &[0, 0, 0]);
        assert_eq!(
            ctl.get_ref().as_slice(),
            &[0x7E, 0x06, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0xE7]
        );
    }

    #[test]
    fn failed_write_keeps_changes_pending() {
        let mut ctl = Controller::new(FlakyTransport::default(), dynamic()).unwrap();
        ctl.set_channel(5, 50, SubmitAfter::Never).unwrap();

        ctl.get_mut().failing = true;
        let err = ctl.submit().unwrap_err();
        assert!(matches!(err, ControllerError::TransportWrite(_)));
        assert_eq!(ctl.state(), ControllerState::Dirty);

        ctl.set_channel(9, 90, SubmitAfter::Never).unwrap();
        ctl.get_mut().failing = false;
        let outcome = ctl.submit().unwrap();
        assert_eq!(
            outcome,
            Submission::Sent {
                range: ChannelRange::new(4, 8),
                bytes: 5 + 6
            }
        );
        assert_eq!(ctl.state(), ControllerState::Idle);
        assert_eq!(ctl.submit().unwrap(), Submission::Skipped);
    }

    #[test]
    fn failed_auto_submit_surfaces_error() {
        let transport = FlakyTransport {
            failing: true,
            data: Vec::new(),
        };
        let mut ctl = Controller::new(
            transport,
            ControllerConfig {
                auto_submit: true,
                ..ControllerConfig::default()
            },
        )
        .unwrap();

        let err = ctl.set_channel(1, 1, SubmitAfter::Configured).unwrap_err();
        assert!(matches!(err, ControllerError::TransportWrite(_)));
        assert_eq!(ctl.get_channel(1).unwrap(), 1);
        assert_eq!(ctl.state(), ControllerState::Dirty);
    }

    #[test]
    fn second_port_uses_its_label() {
        let mut ctl = controller(ControllerConfig {
            dmx_size: 1,
            output_port: WidgetPort::Port2,
            ..ControllerConfig::default()
        });
        ctl.set_channel(1, 0x11, SubmitAfter::Always).unwrap();
        assert_eq!(
            ctl.get_ref().as_slice(),
            &[0x7E, 132, 0x02, 0x00, 0x00, 0x11, 0xE7]
        );
    }

    #[test]
    fn full_submit_ignores_dynamic_mode() {
        let mut ctl = controller(ControllerConfig {
            dmx_size: 4,
            ..dynamic()
        });
        // Nothing differs from the initial snapshot, yet the widget's
        // output is unknown.
        ctl.clear_channels(SubmitAfter::Never).unwrap();
        assert_eq!(ctl.submit().unwrap(), Submission::Skipped);

        let outcome = ctl.submit_full().unwrap();
        assert_eq!(
            outcome,
            Submission::Sent {
                range: ChannelRange::new(0, 3),
                bytes: 10
            }
        );
        assert_eq!(
            ctl.get_ref().as_slice(),
            &[0x7E, 0x06, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xE7]
        );
        assert_eq!(ctl.state(), ControllerState::Idle);
    }

    #[test]
    fn oversized_universe_for_frame_writer_stays_dirty() {
        let writer = FrameWriter::with_config(
            Vec::<u8>::new(),
            dmxpro_frame::FrameConfig {
                max_payload_size: 8,
                ..dmxpro_frame::FrameConfig::default()
            },
        );
        let mut ctl = Controller::with_writer(writer, ControllerConfig::default()).unwrap();
        ctl.set_channel(1, 1, SubmitAfter::Never).unwrap();

        let err = ctl.submit().unwrap_err();
        assert!(matches!(
            err,
            ControllerError::Frame(FrameError::FrameTooLarge { size: 513, max: 8 })
        ));
        assert!(ctl.get_ref().is_empty());
        assert_eq!(ctl.state(), ControllerState::Dirty);
    }

    #[test]
    fn widget_parameters_go_to_the_output_port() {
        let mut ctl = controller(ControllerConfig {
            output_port: WidgetPort::Port2,
            ..ControllerConfig::default()
        });
        ctl.set_widget_parameters(&WidgetParameters {
            rate: 25,
            ..WidgetParameters::default()
        })
        .unwrap();

        let frame = decode_frame(ctl.get_ref()).unwrap();
        assert_eq!(frame.label, 156);
        assert_eq!(frame.payload.as_ref(), &[0x00, 0x00, 9, 1, 25]);

        let err = ctl
            .set_widget_parameters(&WidgetParameters {
                break_time: 0,
                ..WidgetParameters::default()
            })
            .unwrap_err();
        assert!(matches!(err, ControllerError::InvalidParameter(_)));
    }

    #[test]
    fn submit_after_from_option() {
        assert_eq!(SubmitAfter::from(None::<bool>), SubmitAfter::Configured);
        assert_eq!(SubmitAfter::from(Some(true)), SubmitAfter::Always);
        assert_eq!(SubmitAfter::from(false), SubmitAfter::Never);
        assert!(SubmitAfter::Configured.resolve(true));
        assert!(!SubmitAfter::Configured.resolve(false));
        assert!(!SubmitAfter::Never.resolve(true));
    }
}
