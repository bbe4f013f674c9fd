//! Peripheral drivers and Linux bus access.

pub mod jhd1313m1;
pub mod lcdks;
pub mod linux_io;
pub mod microphone;

use heapless::String;

use crate::pins::LCD_COLS;

/// Fit `text` to one LCD row: truncate to the column count, pad with
/// spaces, and replace characters the HD44780 ROM cannot show with `?`.
pub fn fit_line(text: &str) -> String<LCD_COLS> {
    let mut line = String::new();
    for ch in text.chars().take(LCD_COLS) {
        let ch = if ch.is_ascii() && !ch.is_ascii_control() { ch } else { '?' };
        let _ = line.push(ch);
    }
    while line.len() < LCD_COLS {
        let _ = line.push(' ');
    }
    line
}
