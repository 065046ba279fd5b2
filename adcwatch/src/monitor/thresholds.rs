use log::{debug, error};

use crate::channel::AdcChannel;
use crate::config::Config;
use crate::errors::ChannelError;

/// Re-reads the channel and re-centers the hardware deadband around the
/// observed value.
///
/// The raw value is clamped into `[min, max]` (saturating, no wraparound) and
/// a band of `step` on each side is programmed as the new threshold levels,
/// so the hardware only reports genuine departures from the current value.
/// At a rail the outward edge is disabled entirely; otherwise the programmed
/// level is kept strictly inside the limits (`max - 1` / `min + 1`) so a
/// final crossing at the limit itself can still fire.
///
/// Edge programming is best-effort: a failure on one edge is logged and does
/// not block the other edge or the returned value. Only the value read itself
/// can fail.
pub fn refresh<C: AdcChannel>(config: &Config, channel: &mut C) -> Result<i32, ChannelError> {
    let raw = channel.read_value()?;
    let value = raw.clamp(config.min, config.max);

    let mut high = None;
    if value == config.max {
        if let Err(e) = channel.disable_upper_threshold() {
            error!("failed to disable upper threshold at {}: {}", value, e);
        }
    } else {
        let level = value.saturating_add(config.step).min(config.max - 1);
        high = Some(level);
        if let Err(e) = channel.enable_upper_threshold(level) {
            error!("failed to enable upper threshold {}: {}", level, e);
        }
    }

    let mut low = None;
    if value == config.min {
        if let Err(e) = channel.disable_lower_threshold() {
            error!("failed to disable lower threshold at {}: {}", value, e);
        }
    } else {
        let level = value.saturating_sub(config.step).max(config.min + 1);
        low = Some(level);
        if let Err(e) = channel.enable_lower_threshold(level) {
            error!("failed to enable lower threshold {}: {}", level, e);
        }
    }

    debug!(
        "value {} band [{:?}, {:?}] limits [{}, {}]",
        value, low, high, config.min, config.max
    );

    Ok(value)
}
