use crate::errors::ChannelError;

pub mod iio;

/// Measurement type carried by a notification record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelType {
    Voltage,
    Other(u8),
}

impl From<u8> for ChannelType {
    fn from(raw: u8) -> Self {
        match raw {
            0 => Self::Voltage,
            other => Self::Other(other),
        }
    }
}

/// Kind of hardware event a notification record reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Threshold,
    Other(u8),
}

impl From<u8> for EventKind {
    fn from(raw: u8) -> Self {
        match raw {
            0 => Self::Threshold,
            other => Self::Other(other),
        }
    }
}

/// Direction of the level crossing that produced a notification record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Either,
    Rising,
    Falling,
    Other(u8),
}

impl From<u8> for Direction {
    fn from(raw: u8) -> Self {
        match raw {
            0 => Self::Either,
            1 => Self::Rising,
            2 => Self::Falling,
            other => Self::Other(other),
        }
    }
}

/// One crossing notification as delivered by the hardware event stream.
///
/// Records are delivered unfiltered: the device may share its event stream
/// between channels and event kinds, so consumers must select the records
/// they care about with [`ThresholdEvent::concerns`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdEvent {
    /// Channel index the record belongs to. Differential channels can carry
    /// a negative index, hence the signed type.
    pub channel: i32,
    pub channel_type: ChannelType,
    pub kind: EventKind,
    pub direction: Direction,
}

impl ThresholdEvent {
    /// Whether this record is a rising or falling threshold crossing on the
    /// given voltage channel. Anything else is noise from the shared stream.
    pub fn concerns(&self, channel: u32) -> bool {
        self.channel == channel as i32
            && self.channel_type == ChannelType::Voltage
            && self.kind == EventKind::Threshold
            && matches!(self.direction, Direction::Rising | Direction::Falling)
    }
}

/// Boundary to a single hardware ADC channel.
///
/// The handle is exclusively owned by its consumer. Threshold levels live on
/// the hardware side only: enabling or disabling an edge is fire-and-forget
/// configuration, never read back.
#[allow(async_fn_in_trait)]
pub trait AdcChannel: Send {
    /// Reads the current raw value of the channel.
    fn read_value(&mut self) -> Result<i32, ChannelError>;

    /// Programs and enables the rising-edge threshold at `level`.
    fn enable_upper_threshold(&mut self, level: i32) -> Result<(), ChannelError>;

    /// Disables the rising-edge threshold.
    fn disable_upper_threshold(&mut self) -> Result<(), ChannelError>;

    /// Programs and enables the falling-edge threshold at `level`.
    fn enable_lower_threshold(&mut self, level: i32) -> Result<(), ChannelError>;

    /// Disables the falling-edge threshold.
    fn disable_lower_threshold(&mut self) -> Result<(), ChannelError>;

    /// Waits for the next notification record.
    ///
    /// Cancel-safe: dropping the future loses no record. An error from here
    /// means the stream itself is broken and the channel is unusable.
    async fn next_event(&mut self) -> Result<ThresholdEvent, ChannelError>;
}
