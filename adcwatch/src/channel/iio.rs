use std::fs::{self, File};
use std::io;
use std::mem;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use std::path::{Path, PathBuf};

use log::{trace, warn};
use tokio::io::unix::AsyncFd;

use crate::channel::{AdcChannel, ThresholdEvent};
use crate::errors::ChannelError;

const SYSFS_BASE: &str = "/sys/bus/iio/devices";
const DEV_BASE: &str = "/dev";

/// `_IOR('i', 0x90, int)`: hands out the anonymous event descriptor of an
/// IIO character device.
const IIO_GET_EVENT_FD_IOCTL: libc::c_ulong = 0x8004_6990;

/// Wire format of one record on the event descriptor.
#[repr(C)]
struct EventRecord {
    id: u64,
    timestamp: i64,
}

/// An industrial-I/O voltage channel, bound through sysfs attributes for
/// value and threshold access and through the chardev event descriptor for
/// crossing notifications.
#[derive(Debug)]
pub struct IioChannel {
    channel: u32,
    sysfs: PathBuf,
    event_fd: AsyncFd<OwnedFd>,
}

impl IioChannel {
    /// Binds the given voltage channel on the first IIO device exposing
    /// threshold events for it.
    ///
    /// # Errors
    /// * `NoSuchChannel`: no device under the sysfs bus carries the channel.
    /// * `OpenFailed`: the chardev or its event descriptor cannot be acquired.
    pub fn open(channel: u32) -> Result<Self, ChannelError> {
        let sysfs = find_device(Path::new(SYSFS_BASE), channel)?;

        let device = sysfs.file_name().unwrap_or_default().to_os_string();
        let dev_path = Path::new(DEV_BASE).join(&device);
        let dev = File::open(&dev_path).map_err(|source| ChannelError::OpenFailed {
            path: dev_path.clone(),
            source,
        })?;

        let event_fd = event_descriptor(&dev, &dev_path)?;
        let event_fd = AsyncFd::new(event_fd).map_err(|source| ChannelError::OpenFailed {
            path: dev_path,
            source,
        })?;

        trace!(
            "channel {} bound to {} (events on {:?})",
            channel,
            sysfs.display(),
            device
        );

        Ok(Self {
            channel,
            sysfs,
            event_fd,
        })
    }

    fn value_attr(&self) -> PathBuf {
        self.sysfs
            .join(format!("in_voltage{}_raw", self.channel))
    }

    fn write_event_attr(
        &self,
        name: &str,
        value: &str,
        edge: &'static str,
    ) -> Result<(), ChannelError> {
        let path = self
            .sysfs
            .join("events")
            .join(format!("in_voltage{}_{}", self.channel, name));
        fs::write(path, value).map_err(|source| ChannelError::ThresholdFailed { edge, source })
    }

    /// Pulls one record off the event descriptor without blocking.
    ///
    /// `Ok(None)` means the descriptor was not actually readable (a spurious
    /// wake-up). Interrupted reads are retried here and never surface.
    fn read_record(&self) -> Result<Option<u64>, ChannelError> {
        let mut record: EventRecord = unsafe { mem::zeroed() };
        let expected = mem::size_of::<EventRecord>();
        loop {
            let n = unsafe {
                libc::read(
                    self.event_fd.get_ref().as_raw_fd(),
                    &mut record as *mut EventRecord as *mut libc::c_void,
                    expected,
                )
            };
            if n < 0 {
                let source = io::Error::last_os_error();
                match source.kind() {
                    io::ErrorKind::Interrupted => continue,
                    io::ErrorKind::WouldBlock => return Ok(None),
                    _ => return Err(ChannelError::EventStream { source }),
                }
            }
            if n as usize != expected {
                return Err(ChannelError::ShortRead {
                    received: n as usize,
                    expected,
                });
            }
            return Ok(Some(record.id));
        }
    }
}

impl AdcChannel for IioChannel {
    fn read_value(&mut self) -> Result<i32, ChannelError> {
        let path = self.value_attr();
        let raw = fs::read_to_string(&path).map_err(|e| ChannelError::ReadFailed {
            info: format!("{}: {}", path.display(), e),
        })?;
        raw.trim()
            .parse()
            .map_err(|e| ChannelError::ReadFailed {
                info: format!("{}: {}", path.display(), e),
            })
    }

    fn enable_upper_threshold(&mut self, level: i32) -> Result<(), ChannelError> {
        self.write_event_attr("thresh_rising_value", &level.to_string(), "upper")?;
        self.write_event_attr("thresh_rising_en", "1", "upper")
    }

    fn disable_upper_threshold(&mut self) -> Result<(), ChannelError> {
        self.write_event_attr("thresh_rising_en", "0", "upper")
    }

    fn enable_lower_threshold(&mut self, level: i32) -> Result<(), ChannelError> {
        self.write_event_attr("thresh_falling_value", &level.to_string(), "lower")?;
        self.write_event_attr("thresh_falling_en", "1", "lower")
    }

    fn disable_lower_threshold(&mut self) -> Result<(), ChannelError> {
        self.write_event_attr("thresh_falling_en", "0", "lower")
    }

    async fn next_event(&mut self) -> Result<ThresholdEvent, ChannelError> {
        loop {
            let mut guard =
                self.event_fd
                    .readable()
                    .await
                    .map_err(|source| ChannelError::EventStream { source })?;
            match self.read_record()? {
                Some(id) => return Ok(decode(id)),
                None => {
                    warn!("woken with nothing available on the event descriptor");
                    guard.clear_ready();
                }
            }
        }
    }
}

impl Drop for IioChannel {
    fn drop(&mut self) {
        trace!("channel {} released", self.channel);
    }
}

/// Scans the sysfs bus for the first device exposing rising-threshold events
/// on the given voltage channel.
fn find_device(base: &Path, channel: u32) -> Result<PathBuf, ChannelError> {
    let mut devices: Vec<PathBuf> = fs::read_dir(base)
        .map_err(|source| ChannelError::OpenFailed {
            path: base.to_path_buf(),
            source,
        })?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("iio:device"))
        })
        .collect();
    devices.sort();

    devices
        .into_iter()
        .find(|path| {
            path.join("events")
                .join(format!("in_voltage{}_thresh_rising_en", channel))
                .exists()
        })
        .ok_or(ChannelError::NoSuchChannel { channel })
}

/// Asks the chardev for its event descriptor and flips it to non-blocking so
/// readiness and reads can be decoupled.
fn event_descriptor(dev: &File, dev_path: &Path) -> Result<OwnedFd, ChannelError> {
    let open_failed = |source| ChannelError::OpenFailed {
        path: dev_path.to_path_buf(),
        source,
    };

    let mut fd: libc::c_int = -1;
    let ret = unsafe { libc::ioctl(dev.as_raw_fd(), IIO_GET_EVENT_FD_IOCTL, &mut fd) };
    if ret < 0 || fd < 0 {
        return Err(open_failed(io::Error::last_os_error()));
    }
    let owned = unsafe { OwnedFd::from_raw_fd(fd) };

    let flags = unsafe { libc::fcntl(owned.as_raw_fd(), libc::F_GETFL) };
    if flags < 0 {
        return Err(open_failed(io::Error::last_os_error()));
    }
    let ret = unsafe { libc::fcntl(owned.as_raw_fd(), libc::F_SETFL, flags | libc::O_NONBLOCK) };
    if ret < 0 {
        return Err(open_failed(io::Error::last_os_error()));
    }

    Ok(owned)
}

/// Unpacks the identifier word of an event record. Bit layout per the IIO
/// event interface: event kind in the top byte, direction below it, the
/// measurement type in bits 32..40 and the signed channel index at the
/// bottom.
fn decode(id: u64) -> ThresholdEvent {
    ThresholdEvent {
        channel: (id & 0xFFFF) as u16 as i16 as i32,
        channel_type: (((id >> 32) & 0xFF) as u8).into(),
        kind: (((id >> 56) & 0xFF) as u8).into(),
        direction: (((id >> 48) & 0x7F) as u8).into(),
    }
}
