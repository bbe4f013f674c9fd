//! HD44780 16x2 LCD in 4-bit mode (DFRobot LCD keypad shield).
//!
//! Six GPIO outputs: register select, enable, and the upper data nibble
//! D4..D7.  The R/W line is tied low on the shield, so every transfer is
//! a timed write.  The shield has no controllable backlight colour.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use super::fit_line;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_LEFT: u8 = 0x06;
const CMD_DISPLAY_ON: u8 = 0x0C;
const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
const CMD_SET_DDRAM: u8 = 0x80;
const ROW_OFFSET: u8 = 0x40;

pub struct Lcdks<P, D> {
    rs: P,
    en: P,
    data: [P; 4],
    delay: D,
}

impl<P: OutputPin, D: DelayNs> Lcdks<P, D> {
    /// `data` is D4, D5, D6, D7 in that order.
    pub fn new(rs: P, en: P, data: [P; 4], delay: D) -> Self {
        Self { rs, en, data, delay }
    }

    /// Datasheet 4-bit initialisation by instruction.
    pub fn init(&mut self) -> Result<(), P::Error> {
        self.delay.delay_ms(50);
        self.rs.set_low()?;
        self.en.set_low()?;

        for wait_us in [4500, 4500, 150] {
            self.write_nibble(0x03)?;
            self.delay.delay_us(wait_us);
        }
        self.write_nibble(0x02)?;

        self.command(CMD_FUNCTION_4BIT_2LINE)?;
        self.command(CMD_DISPLAY_ON)?;
        self.clear()?;
        self.command(CMD_ENTRY_LEFT)
    }

    pub fn clear(&mut self) -> Result<(), P::Error> {
        self.command(CMD_CLEAR)?;
        self.delay.delay_ms(2);
        Ok(())
    }

    pub fn set_cursor(&mut self, row: u8, col: u8) -> Result<(), P::Error> {
        let offset = if row == 0 { col } else { col + ROW_OFFSET };
        self.command(CMD_SET_DDRAM | offset)
    }

    /// Overwrite `row` with `text`, padded with spaces to the full width.
    pub fn write_line(&mut self, row: u8, text: &str) -> Result<(), P::Error> {
        self.set_cursor(row, 0)?;
        self.rs.set_high()?;
        for byte in fit_line(text).bytes() {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    fn command(&mut self, cmd: u8) -> Result<(), P::Error> {
        self.rs.set_low()?;
        self.write_byte(cmd)
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), P::Error> {
        self.write_nibble(byte >> 4)?;
        self.write_nibble(byte & 0x0F)?;
        self.delay.delay_us(40);
        Ok(())
    }

    fn write_nibble(&mut self, nibble: u8) -> Result<(), P::Error> {
        for (bit, pin) in self.data.iter_mut().enumerate() {
            if nibble & (1 << bit) != 0 {
                pin.set_high()?;
            } else {
                pin.set_low()?;
            }
        }
        // Latch on the falling edge of EN.
        self.en.set_high()?;
        self.delay.delay_us(1);
        self.en.set_low()?;
        self.delay.delay_us(1);
        Ok(())
    }
}
