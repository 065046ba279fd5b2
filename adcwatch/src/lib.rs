//! Watch a single ADC channel and run a program when its value meaningfully
//! changes.
//!
//! The heavy lifting is done by the hardware: after every sample the
//! [`monitor::thresholds`] engine re-programs the channel's rising and
//! falling threshold levels to a deadband around the value it just saw, so
//! the kernel only wakes the process when the signal genuinely leaves that
//! band. The [`monitor::Monitor`] multiplexes those crossing notifications
//! with an optional [`monitor::debounce::DebounceTimer`] re-sample tick and
//! hands every distinct value to a [`callback::Callback`].
//!
//! The hardware boundary is the [`channel::AdcChannel`] trait;
//! [`channel::iio::IioChannel`] binds it to the Linux industrial-I/O sysfs
//! and chardev interfaces. Enable the `mocks` feature (tests do this
//! implicitly) for scriptable fakes of both collaborators.

pub mod callback;
pub mod channel;
pub mod config;
pub mod errors;
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;
pub mod monitor;
