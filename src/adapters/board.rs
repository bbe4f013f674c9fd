//! Board-kit adapters — bridge the microphone and LCD drivers to [`BoardPort`].
//!
//! | Kit      | Sensor               | Display                    | Indicator         |
//! |----------|----------------------|----------------------------|-------------------|
//! | Grove    | sound sensor on A0   | JHD1313M1 over I2C         | RGB backlight     |
//! | DFRobot  | microphone on A3     | LCD keypad shield (4-bit)  | none (no-op)      |
//!
//! Both adapters are generic over their buses so tests can drive them with
//! in-memory fakes; [`build_board`] wires the Linux implementations.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;
use log::{info, warn};

use crate::app::ports::{BoardPort, Indicator};
use crate::config::{BoardKind, SystemConfig};
use crate::drivers::jhd1313m1::Jhd1313m1;
use crate::drivers::lcdks::Lcdks;
use crate::drivers::linux_io::{gpio_output, I2cDev, StdDelay, SysfsAdc, SysfsGpio};
use crate::drivers::microphone::{AnalogInput, Microphone};
use crate::error::InitError;
use crate::pins;

// ───────────────────────────────────────────────────────────────
// Grove
// ───────────────────────────────────────────────────────────────

pub struct GroveBoard<A, I, D> {
    mic: Microphone<A>,
    lcd: Jhd1313m1<I, D>,
}

impl<A: AnalogInput, I: I2c, D: DelayNs> GroveBoard<A, I, D> {
    pub fn new(mic: Microphone<A>, lcd: Jhd1313m1<I, D>) -> Self {
        Self { mic, lcd }
    }
}

impl<A: AnalogInput, I: I2c, D: DelayNs> BoardPort for GroveBoard<A, I, D> {
    fn init(&mut self, config: &SystemConfig) -> Result<(), InitError> {
        self.lcd.init().map_err(|e| {
            warn!("grove: LCD init failed: {e:?}");
            InitError::Display("JHD1313M1 did not acknowledge init")
        })?;
        info!("grove: ready on i2c-{}", config.i2c_bus);
        Ok(())
    }

    fn set_indicator(&mut self, colour: Indicator) {
        let (r, g, b) = colour.rgb();
        if let Err(e) = self.lcd.set_rgb(r, g, b) {
            warn!("grove: backlight write failed: {e:?}");
        }
    }

    fn set_display(&mut self, text: &str, line: u8) {
        if let Err(e) = self.lcd.write_line(line.min(pins::LCD_ROWS - 1), text) {
            warn!("grove: LCD write failed: {e:?}");
        }
    }

    fn sample_noise(&mut self, threshold: u32) -> Option<u32> {
        self.mic.sample(threshold)
    }
}

// ───────────────────────────────────────────────────────────────
// DFRobot
// ───────────────────────────────────────────────────────────────

pub struct DfRobotBoard<A, P, D> {
    mic: Microphone<A>,
    lcd: Lcdks<P, D>,
}

impl<A: AnalogInput, P: OutputPin, D: DelayNs> DfRobotBoard<A, P, D> {
    pub fn new(mic: Microphone<A>, lcd: Lcdks<P, D>) -> Self {
        Self { mic, lcd }
    }
}

impl<A: AnalogInput, P: OutputPin, D: DelayNs> BoardPort for DfRobotBoard<A, P, D> {
    fn init(&mut self, _config: &SystemConfig) -> Result<(), InitError> {
        self.lcd.init().map_err(|e| {
            warn!("dfrobot: LCD init failed: {e:?}");
            InitError::Display("LCD keypad shield init failed")
        })?;
        info!("dfrobot: ready");
        Ok(())
    }

    /// The shield's backlight has no colour control.
    fn set_indicator(&mut self, _colour: Indicator) {}

    fn set_display(&mut self, text: &str, line: u8) {
        if let Err(e) = self.lcd.write_line(line.min(pins::LCD_ROWS - 1), text) {
            warn!("dfrobot: LCD write failed: {e:?}");
        }
    }

    fn sample_noise(&mut self, threshold: u32) -> Option<u32> {
        self.mic.sample(threshold)
    }
}

// ───────────────────────────────────────────────────────────────
// Factory
// ───────────────────────────────────────────────────────────────

/// Owned board behind the port, as handed to the controller loop.
pub type DynBoard = Box<dyn BoardPort + Send>;

/// Open the Linux buses for `config.kit` and run the board's init.
pub fn build_board(config: &SystemConfig) -> Result<DynBoard, InitError> {
    let mut board: DynBoard = match config.kit {
        BoardKind::Grove => {
            let mic = open_mic(config, pins::GROVE_MIC_AIN)?;
            let bus = I2cDev::open(config.i2c_bus)
                .map_err(|e| InitError::I2cBus(format!("/dev/i2c-{}: {e}", config.i2c_bus)))?;
            let lcd = Jhd1313m1::new(bus, StdDelay, pins::GROVE_LCD_ADDR, pins::GROVE_RGB_ADDR);
            Box::new(GroveBoard::new(mic, lcd))
        }
        BoardKind::Dfrobot => {
            let mic = open_mic(config, pins::DFROBOT_MIC_AIN)?;
            let lcd = Lcdks::new(
                open_pin(pins::LCDKS_RS)?,
                open_pin(pins::LCDKS_EN)?,
                [
                    open_pin(pins::LCDKS_D4)?,
                    open_pin(pins::LCDKS_D5)?,
                    open_pin(pins::LCDKS_D6)?,
                    open_pin(pins::LCDKS_D7)?,
                ],
                StdDelay,
            );
            Box::new(DfRobotBoard::new(mic, lcd))
        }
    };
    board.init(config)?;
    Ok(board)
}

fn open_mic(config: &SystemConfig, channel: u8) -> Result<Microphone<SysfsAdc>, InitError> {
    let adc = SysfsAdc::open(config.iio_device, channel).map_err(|e| {
        InitError::AdcUnavailable(format!(
            "iio:device{} in_voltage{channel}_raw: {e}",
            config.iio_device
        ))
    })?;
    Ok(Microphone::new(adc, config.mic_burst_samples))
}

fn open_pin(number: u32) -> Result<SysfsGpio, InitError> {
    gpio_output(number).map_err(|e| InitError::Gpio(format!("gpio{number}: {e}")))
}
