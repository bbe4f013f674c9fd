//! JHD1313M1 RGB-backlit 16x2 character LCD (Grove LCD RGB Backlight).
//!
//! Two devices share one I2C bus:
//!
//! | Address | Chip      | Role                               |
//! |---------|-----------|------------------------------------|
//! | `0x3E`  | AiP31068L | HD44780-compatible text controller |
//! | `0x62`  | PCA9633   | 4-channel PWM backlight            |
//!
//! Text-controller writes are two bytes: a control byte (`0x80` command,
//! `0x40` data) followed by the payload.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use super::fit_line;

// ── Text controller commands ─────────────────────────────────

const CTRL_COMMAND: u8 = 0x80;
const CTRL_DATA: u8 = 0x40;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_LEFT: u8 = 0x06;
const CMD_DISPLAY_ON: u8 = 0x0C;
const CMD_FUNCTION_2LINE: u8 = 0x28;
const CMD_SET_DDRAM: u8 = 0x80;
const ROW_OFFSET: u8 = 0x40;

// ── PCA9633 registers ────────────────────────────────────────

const REG_MODE1: u8 = 0x00;
const REG_MODE2: u8 = 0x01;
const REG_BLUE: u8 = 0x02;
const REG_GREEN: u8 = 0x03;
const REG_RED: u8 = 0x04;
const REG_LEDOUT: u8 = 0x08;
/// All four outputs under individual PWM control.
const LEDOUT_PWM_ALL: u8 = 0xAA;

pub struct Jhd1313m1<I, D> {
    i2c: I,
    delay: D,
    lcd_addr: u8,
    rgb_addr: u8,
}

impl<I: I2c, D: DelayNs> Jhd1313m1<I, D> {
    pub fn new(i2c: I, delay: D, lcd_addr: u8, rgb_addr: u8) -> Self {
        Self {
            i2c,
            delay,
            lcd_addr,
            rgb_addr,
        }
    }

    /// Power-on sequence for both chips.  Leaves the screen cleared and
    /// the backlight off.
    pub fn init(&mut self) -> Result<(), I::Error> {
        self.delay.delay_ms(50);
        self.command(CMD_FUNCTION_2LINE)?;
        self.delay.delay_us(4500);
        self.command(CMD_FUNCTION_2LINE)?;
        self.delay.delay_us(150);
        self.command(CMD_DISPLAY_ON)?;
        self.clear()?;
        self.command(CMD_ENTRY_LEFT)?;

        self.i2c.write(self.rgb_addr, &[REG_MODE1, 0x00])?;
        self.i2c.write(self.rgb_addr, &[REG_MODE2, 0x00])?;
        self.i2c.write(self.rgb_addr, &[REG_LEDOUT, LEDOUT_PWM_ALL])?;
        self.set_rgb(0, 0, 0)
    }

    pub fn clear(&mut self) -> Result<(), I::Error> {
        self.command(CMD_CLEAR)?;
        self.delay.delay_ms(2);
        Ok(())
    }

    pub fn set_rgb(&mut self, r: u8, g: u8, b: u8) -> Result<(), I::Error> {
        self.i2c.write(self.rgb_addr, &[REG_RED, r])?;
        self.i2c.write(self.rgb_addr, &[REG_GREEN, g])?;
        self.i2c.write(self.rgb_addr, &[REG_BLUE, b])
    }

    pub fn set_cursor(&mut self, row: u8, col: u8) -> Result<(), I::Error> {
        let offset = if row == 0 { col } else { col + ROW_OFFSET };
        self.command(CMD_SET_DDRAM | offset)
    }

    /// Overwrite `row` with `text`, padded with spaces to the full width.
    pub fn write_line(&mut self, row: u8, text: &str) -> Result<(), I::Error> {
        self.set_cursor(row, 0)?;
        for byte in fit_line(text).bytes() {
            self.i2c.write(self.lcd_addr, &[CTRL_DATA, byte])?;
        }
        Ok(())
    }

    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }

    fn command(&mut self, cmd: u8) -> Result<(), I::Error> {
        self.i2c.write(self.lcd_addr, &[CTRL_COMMAND, cmd])
    }
}
