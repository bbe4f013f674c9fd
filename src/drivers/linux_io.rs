//! Linux userspace bus access: IIO sysfs ADC, sysfs GPIO, `/dev/i2c-N`.
//!
//! Each type implements the matching `embedded-hal` 1.0 trait (or
//! [`AnalogInput`]) so the LCD and microphone drivers never see a path.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::{digital, i2c};
use log::{debug, warn};

use super::microphone::AnalogInput;

// ───────────────────────────────────────────────────────────────
// Errors
// ───────────────────────────────────────────────────────────────

/// An I/O failure on a Linux bus device.
#[derive(Debug)]
pub struct BusError(pub io::Error);

impl core::fmt::Display for BusError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "bus I/O: {}", self.0)
    }
}

impl std::error::Error for BusError {}

impl From<io::Error> for BusError {
    fn from(e: io::Error) -> Self {
        Self(e)
    }
}

impl digital::Error for BusError {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}

impl i2c::Error for BusError {
    fn kind(&self) -> i2c::ErrorKind {
        match self.0.raw_os_error() {
            Some(libc::ENXIO) | Some(libc::EREMOTEIO) => {
                i2c::ErrorKind::NoAcknowledge(i2c::NoAcknowledgeSource::Unknown)
            }
            Some(libc::EAGAIN) => i2c::ErrorKind::ArbitrationLoss,
            _ => i2c::ErrorKind::Other,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// IIO ADC channel
// ───────────────────────────────────────────────────────────────

/// One `in_voltageN_raw` attribute of an IIO device.
pub struct SysfsAdc {
    file: File,
    buf: String,
}

impl SysfsAdc {
    pub fn open(device: u8, channel: u8) -> io::Result<Self> {
        let path = PathBuf::from(format!(
            "/sys/bus/iio/devices/iio:device{device}/in_voltage{channel}_raw"
        ));
        Self::open_path(&path)
    }

    pub fn open_path(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        debug!("adc: opened {}", path.display());
        Ok(Self {
            file,
            buf: String::with_capacity(8),
        })
    }
}

impl AnalogInput for SysfsAdc {
    fn read_raw(&mut self) -> Option<u16> {
        self.buf.clear();
        let read = self
            .file
            .seek(SeekFrom::Start(0))
            .and_then(|_| self.file.read_to_string(&mut self.buf));
        match read {
            Ok(_) => self.buf.trim().parse().ok(),
            Err(e) => {
                debug!("adc: read failed: {e}");
                None
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// sysfs GPIO output
// ───────────────────────────────────────────────────────────────

const GPIO_ROOT: &str = "/sys/class/gpio";

/// A GPIO line exported through `/sys/class/gpio` and driven as an output.
pub struct SysfsGpio {
    value: File,
}

impl SysfsGpio {
    pub fn output(number: u32) -> io::Result<Self> {
        let dir = PathBuf::from(format!("{GPIO_ROOT}/gpio{number}"));
        if !dir.exists() {
            std::fs::write(format!("{GPIO_ROOT}/export"), number.to_string())?;
        }
        std::fs::write(dir.join("direction"), "out")?;
        let value = OpenOptions::new().write(true).open(dir.join("value"))?;
        debug!("gpio: {number} exported as output");
        Ok(Self { value })
    }

    fn write_level(&mut self, high: bool) -> Result<(), BusError> {
        self.value.seek(SeekFrom::Start(0))?;
        self.value.write_all(if high { b"1" } else { b"0" })?;
        Ok(())
    }
}

impl digital::ErrorType for SysfsGpio {
    type Error = BusError;
}

impl digital::OutputPin for SysfsGpio {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write_level(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write_level(true)
    }
}

// ───────────────────────────────────────────────────────────────
// i2c-dev bus
// ───────────────────────────────────────────────────────────────

/// `ioctl` request selecting the target address (linux/i2c-dev.h).
const I2C_SLAVE: u64 = 0x0703;

/// A `/dev/i2c-N` character device.
pub struct I2cDev {
    file: File,
    addressed: Option<u8>,
}

impl I2cDev {
    pub fn open(bus: u8) -> io::Result<Self> {
        let path = format!("/dev/i2c-{bus}");
        let file = OpenOptions::new().read(true).write(true).open(&path)?;
        debug!("i2c: opened {path}");
        Ok(Self {
            file,
            addressed: None,
        })
    }

    fn select(&mut self, address: u8) -> Result<(), BusError> {
        if self.addressed == Some(address) {
            return Ok(());
        }
        // SAFETY: the fd is valid for the lifetime of `self.file`, and
        // I2C_SLAVE takes the 7-bit address by value.
        let rc = unsafe {
            libc::ioctl(
                self.file.as_raw_fd(),
                I2C_SLAVE as _,
                libc::c_ulong::from(address),
            )
        };
        if rc < 0 {
            self.addressed = None;
            return Err(BusError(io::Error::last_os_error()));
        }
        self.addressed = Some(address);
        Ok(())
    }
}

impl i2c::ErrorType for I2cDev {
    type Error = BusError;
}

impl i2c::I2c for I2cDev {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [i2c::Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.select(address)?;
        for op in operations {
            match op {
                i2c::Operation::Write(bytes) => self.file.write_all(bytes)?,
                i2c::Operation::Read(buf) => self.file.read_exact(buf)?,
            }
        }
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Delay
// ───────────────────────────────────────────────────────────────

/// Blocking delay on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}

/// Open a GPIO output, logging which pin failed.
pub fn gpio_output(number: u32) -> io::Result<SysfsGpio> {
    SysfsGpio::output(number).inspect_err(|e| warn!("gpio: cannot export {number}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::Error as _;

    #[test]
    fn adc_reads_and_rereads_attribute() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in_voltage0_raw");
        std::fs::write(&path, "512\n").unwrap();

        let mut adc = SysfsAdc::open_path(&path).unwrap();
        assert_eq!(adc.read_raw(), Some(512));

        std::fs::write(&path, "7\n").unwrap();
        assert_eq!(adc.read_raw(), Some(7));
    }

    #[test]
    fn adc_garbage_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in_voltage0_raw");
        std::fs::write(&path, "busy").unwrap();
        let mut adc = SysfsAdc::open_path(&path).unwrap();
        assert_eq!(adc.read_raw(), None);
    }

    #[test]
    fn missing_adc_is_an_open_error() {
        assert!(SysfsAdc::open_path(Path::new("/nonexistent/in_voltage9_raw")).is_err());
    }

    #[test]
    fn nack_maps_to_no_acknowledge() {
        let e = BusError(io::Error::from_raw_os_error(libc::ENXIO));
        assert!(matches!(e.kind(), i2c::ErrorKind::NoAcknowledge(_)));
    }
}
