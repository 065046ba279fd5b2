use std::time::Duration;

use log::{error, warn};

use crate::callback::Callback;
use crate::channel::{AdcChannel, ThresholdEvent};
use crate::config::Config;
use crate::errors::Error;
use crate::monitor::debounce::DebounceTimer;

pub mod debounce;
pub mod thresholds;

/// What woke the loop up.
#[derive(Debug)]
enum Wake {
    Crossing(ThresholdEvent),
    TimerExpired,
}

/// Watches one channel and reports meaningful value changes to a callback.
///
/// The monitor owns both wake sources exclusively: the channel's crossing
/// stream and, when a timeout is configured, a [`DebounceTimer`] that forces
/// a periodic re-sample while the value sits between the limits.
#[derive(Debug)]
pub struct Monitor<C: AdcChannel, H: Callback> {
    config: Config,
    channel: C,
    callback: H,
}

impl<C: AdcChannel, H: Callback> Monitor<C, H> {
    pub fn new(config: Config, channel: C, callback: H) -> Self {
        Self {
            config,
            channel,
            callback,
        }
    }

    /// Runs the watch loop. There is no normal exit: the loop only ends on a
    /// broken event stream, and resources are released by drop on every path.
    pub async fn run(mut self) -> Result<(), Error> {
        let mut timer = (self.config.timeout > 0).then(DebounceTimer::new);

        // Establish the deadband and report the starting value even before
        // any crossing arrives. A failed first read is retried by whatever
        // wakes the loop next.
        let mut last_value = match thresholds::refresh(&self.config, &mut self.channel) {
            Ok(value) => {
                self.dispatch(value);
                Some(value)
            }
            Err(e) => {
                warn!("initial refresh failed: {}", e);
                None
            }
        };

        loop {
            let needs_refresh = match Self::wait(&mut self.channel, &mut timer).await? {
                Wake::Crossing(event) => event.concerns(self.config.channel),
                Wake::TimerExpired => true,
            };
            if !needs_refresh {
                continue;
            }

            let value = match thresholds::refresh(&self.config, &mut self.channel) {
                Ok(value) => value,
                Err(e) => {
                    warn!("refresh failed: {}", e);
                    continue;
                }
            };

            if last_value == Some(value) {
                // Unchanged value: no dispatch, and the timer is left alone.
                // After a timer wake-up this leaves nothing armed until the
                // hardware reports the next crossing.
                continue;
            }
            last_value = Some(value);
            self.dispatch(value);

            if let Some(timer) = timer.as_mut() {
                if value > self.config.min && value < self.config.max {
                    timer.arm(Duration::from_millis(self.config.timeout));
                } else {
                    // At a rail the outward hardware edge is disabled and the
                    // remaining edge covers the way back; no re-sample needed.
                    timer.disarm();
                }
            }
        }
    }

    /// The single suspension point: readiness of the crossing stream and,
    /// when armed, the debounce timer.
    async fn wait(channel: &mut C, timer: &mut Option<DebounceTimer>) -> Result<Wake, Error> {
        tokio::select! {
            event = channel.next_event() => Ok(Wake::Crossing(event?)),
            _ = expired(timer) => Ok(Wake::TimerExpired),
        }
    }

    fn dispatch(&mut self, value: i32) {
        if let Err(e) = self
            .callback
            .notify(value, self.config.min, self.config.max)
        {
            error!("{}", e);
        }
    }
}

async fn expired(timer: &mut Option<DebounceTimer>) {
    match timer {
        Some(timer) => timer.expired().await,
        None => std::future::pending().await,
    }
}
