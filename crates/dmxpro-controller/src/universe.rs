use std::ops::RangeInclusive;

use crate::error::{ControllerError, Result};

/// Start code leading every standard (dimmer data) DMX packet.
pub const DMX_START_CODE: u8 = 0x00;

/// Channels in a full DMX512 universe.
pub const MAX_CHANNELS: usize = 512;

/// Inclusive span of 0-based channel indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelRange {
    lo: usize,
    hi: usize,
}

impl ChannelRange {
    /// Span `lo..=hi`. Panics if `lo > hi`.
    pub(crate) fn new(lo: usize, hi: usize) -> Self {
        assert!(lo <= hi, "channel range {lo}..={hi} is inverted");
        Self { lo, hi }
    }

    /// First index in the span.
    pub fn lo(&self) -> usize {
        self.lo
    }

    /// Last index in the span.
    pub fn hi(&self) -> usize {
        self.hi
    }

    /// Number of channels covered. Never zero.
    pub fn len(&self) -> usize {
        self.hi - self.lo + 1
    }

    /// The span as 1-based channel numbers.
    pub fn channels(&self) -> RangeInclusive<usize> {
        self.lo + 1..=self.hi + 1
    }

    fn indices(&self) -> RangeInclusive<usize> {
        self.lo..=self.hi
    }
}

/// Convert a caller-supplied integer to a channel value.
pub fn checked_value(value: i64) -> Result<u8> {
    u8::try_from(value).map_err(|_| ControllerError::ValueOutOfRange { value })
}

/// Current and last-submitted channel values of one universe.
///
/// Channels are numbered from 1 at the API; index 0 of the arrays is
/// channel 1. Both arrays keep the size they were created with.
#[derive(Debug, Clone)]
pub struct UniverseBuffer {
    current: Vec<u8>,
    submitted: Vec<u8>,
    dirty: bool,
}

impl UniverseBuffer {
    /// A universe of `size` channels, all at zero.
    pub fn new(size: usize) -> Result<Self> {
        if !(1..=MAX_CHANNELS).contains(&size) {
            return Err(ControllerError::InvalidConfig(format!(
                "universe size must be between 1 and {MAX_CHANNELS}, got {size}"
            )));
        }
        Ok(Self {
            current: vec![0; size],
            submitted: vec![0; size],
            dirty: false,
        })
    }

    /// Number of channels.
    pub fn size(&self) -> usize {
        self.current.len()
    }

    /// Current channel values, channel 1 first.
    pub fn values(&self) -> &[u8] {
        &self.current
    }

    /// Current values within `range`.
    pub fn slice(&self, range: ChannelRange) -> &[u8] {
        &self.current[range.indices()]
    }

    /// Value of a 1-based channel.
    pub fn get(&self, channel: usize) -> Result<u8> {
        Ok(self.current[self.index(channel)?])
    }

    /// Set a 1-based channel. Nothing changes on error.
    pub fn set(&mut self, channel: usize, value: u8) -> Result<()> {
        let index = self.index(channel)?;
        self.current[index] = value;
        self.dirty = true;
        Ok(())
    }

    /// Set every channel to `value`.
    pub fn fill(&mut self, value: u8) {
        self.current.fill(value);
        self.dirty = true;
    }

    /// True if any channel was mutated since the last commit.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Smallest span covering every channel that differs from the last
    /// submission, or `None` if nothing differs.
    ///
    /// Unchanged channels inside the span are part of it.
    pub fn diff_range(&self) -> Option<ChannelRange> {
        let differs = |(now, then): (&u8, &u8)| now != then;
        let lo = self
            .current
            .iter()
            .zip(&self.submitted)
            .position(differs)?;
        let hi = self
            .current
            .iter()
            .zip(&self.submitted)
            .rposition(differs)?;
        Some(ChannelRange::new(lo, hi))
    }

    /// The whole universe.
    pub fn full_range(&self) -> ChannelRange {
        ChannelRange::new(0, self.size() - 1)
    }

    /// Record `range` as submitted. Call only once its frame has been written.
    pub fn commit(&mut self, range: ChannelRange) {
        let indices = range.indices();
        self.submitted[indices.clone()].copy_from_slice(&self.current[indices]);
        self.dirty = self.current != self.submitted;
    }

    /// Forget the pending-change flag when nothing differs from the last
    /// submission.
    pub(crate) fn settle(&mut self) {
        if self.current == self.submitted {
            self.dirty = false;
        }
    }

    fn index(&self, channel: usize) -> Result<usize> {
        if channel == 0 || channel > self.size() {
            return Err(ControllerError::ChannelOutOfRange {
                channel,
                size: self.size(),
            });
        }
        Ok(channel - 1)
    }
}
