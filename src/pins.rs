//! Pin and bus assignments for the supported board kits.
//!
//! Single source of truth: the board adapters reference this module rather
//! than hard-coding pin numbers.  Values match the kit wiring guides.

// ---------------------------------------------------------------------------
// Grove starter kit
// ---------------------------------------------------------------------------

/// Grove sound sensor — analog input A0.
pub const GROVE_MIC_AIN: u8 = 0;
/// JHD1313M1 character controller (AiP31068L) on the I2C bus.
pub const GROVE_LCD_ADDR: u8 = 0x3E;
/// JHD1313M1 backlight controller (PCA9633) on the same bus.
pub const GROVE_RGB_ADDR: u8 = 0x62;

// ---------------------------------------------------------------------------
// DFRobot starter kit
// ---------------------------------------------------------------------------

/// Analog microphone — analog input A3.
pub const DFROBOT_MIC_AIN: u8 = 3;

/// LCD keypad shield, HD44780 in 4-bit mode.
pub const LCDKS_RS: u32 = 8;
pub const LCDKS_EN: u32 = 9;
pub const LCDKS_D4: u32 = 4;
pub const LCDKS_D5: u32 = 5;
pub const LCDKS_D6: u32 = 6;
pub const LCDKS_D7: u32 = 7;

// ---------------------------------------------------------------------------
// Display geometry (both kits)
// ---------------------------------------------------------------------------

pub const LCD_COLS: usize = 16;
pub const LCD_ROWS: u8 = 2;
