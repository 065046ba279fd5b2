use std::io;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::channel::{AdcChannel, ChannelType, Direction, EventKind, ThresholdEvent};
use crate::errors::ChannelError;

#[derive(Debug, Default)]
struct MockChannelState {
    value: i32,
    reads: u32,
    edge_calls: u32,
    fail_reads: u32,
    fail_thresholds: bool,
    upper: Option<i32>,
    lower: Option<i32>,
}

/// Scriptable stand-in for a hardware channel.
///
/// The channel half implements [`AdcChannel`] and is handed to the code under
/// test; the [`MockChannelHandle`] half stays with the test to change the
/// value, inject notification records and observe the programmed edges.
#[derive(Debug)]
pub struct MockChannel {
    state: Arc<Mutex<MockChannelState>>,
    events: UnboundedReceiver<Result<ThresholdEvent, ChannelError>>,
}

#[derive(Debug, Clone)]
pub struct MockChannelHandle {
    state: Arc<Mutex<MockChannelState>>,
    events: UnboundedSender<Result<ThresholdEvent, ChannelError>>,
}

impl MockChannel {
    pub fn new(value: i32) -> (Self, MockChannelHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = Arc::new(Mutex::new(MockChannelState {
            value,
            ..Default::default()
        }));
        (
            Self {
                state: state.clone(),
                events: rx,
            },
            MockChannelHandle { state, events: tx },
        )
    }
}

impl MockChannelHandle {
    pub fn set_value(&self, value: i32) {
        self.state.lock().value = value;
    }

    /// Makes the next `count` value reads fail.
    pub fn fail_next_reads(&self, count: u32) {
        self.state.lock().fail_reads = count;
    }

    /// Makes every threshold enable/disable call fail (leaving the recorded
    /// edge state stale, as a real device would keep its old levels).
    pub fn fail_thresholds(&self, fail: bool) {
        self.state.lock().fail_thresholds = fail;
    }

    /// Currently programmed rising-edge level, `None` when disabled.
    pub fn upper(&self) -> Option<i32> {
        self.state.lock().upper
    }

    /// Currently programmed falling-edge level, `None` when disabled.
    pub fn lower(&self) -> Option<i32> {
        self.state.lock().lower
    }

    /// How many times the value was sampled.
    pub fn reads(&self) -> u32 {
        self.state.lock().reads
    }

    /// How many threshold enable/disable calls were attempted.
    pub fn edge_calls(&self) -> u32 {
        self.state.lock().edge_calls
    }

    pub fn send_event(&self, event: ThresholdEvent) {
        self.events.send(Ok(event)).ok();
    }

    /// Injects a voltage threshold crossing record for `channel`.
    pub fn send_crossing(&self, channel: u32, direction: Direction) {
        self.send_event(ThresholdEvent {
            channel: channel as i32,
            channel_type: ChannelType::Voltage,
            kind: EventKind::Threshold,
            direction,
        });
    }

    /// Breaks the event stream: the next wait returns a hard error.
    pub fn fail_stream(&self) {
        self.events.send(Err(ChannelError::Disconnected)).ok();
    }
}

impl MockChannel {
    fn edge(&self, edge: &'static str) -> Result<(), ChannelError> {
        let mut state = self.state.lock();
        state.edge_calls += 1;
        if state.fail_thresholds {
            return Err(ChannelError::ThresholdFailed {
                edge,
                source: io::Error::new(io::ErrorKind::PermissionDenied, "scripted failure"),
            });
        }
        Ok(())
    }
}

impl AdcChannel for MockChannel {
    fn read_value(&mut self) -> Result<i32, ChannelError> {
        let mut state = self.state.lock();
        state.reads += 1;
        if state.fail_reads > 0 {
            state.fail_reads -= 1;
            return Err(ChannelError::ReadFailed {
                info: "scripted failure".to_string(),
            });
        }
        Ok(state.value)
    }

    fn enable_upper_threshold(&mut self, level: i32) -> Result<(), ChannelError> {
        self.edge("upper")?;
        self.state.lock().upper = Some(level);
        Ok(())
    }

    fn disable_upper_threshold(&mut self) -> Result<(), ChannelError> {
        self.edge("upper")?;
        self.state.lock().upper = None;
        Ok(())
    }

    fn enable_lower_threshold(&mut self, level: i32) -> Result<(), ChannelError> {
        self.edge("lower")?;
        self.state.lock().lower = Some(level);
        Ok(())
    }

    fn disable_lower_threshold(&mut self) -> Result<(), ChannelError> {
        self.edge("lower")?;
        self.state.lock().lower = None;
        Ok(())
    }

    async fn next_event(&mut self) -> Result<ThresholdEvent, ChannelError> {
        match self.events.recv().await {
            Some(result) => result,
            None => Err(ChannelError::Disconnected),
        }
    }
}
