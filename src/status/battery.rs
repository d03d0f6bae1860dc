//! Battery level classification and SAADC conversion.

use crate::config::{
    ADC_FULL_SCALE_MV, ADC_RESOLUTION, BATTERY_DIVIDER_DEN, BATTERY_DIVIDER_NUM,
    BATTERY_EMPTY_MV, BATTERY_FULL_ABOVE, BATTERY_FULL_MV, BATTERY_ONE_ABOVE,
    BATTERY_THREE_ABOVE, BATTERY_TWO_ABOVE,
};

/// Battery indicator shown at the right of the top bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BatteryGlyph {
    Full,
    Three,
    Two,
    One,
    Empty,
}

impl BatteryGlyph {
    /// Number of filled cells drawn inside the battery outline.
    pub fn cells(self) -> u8 {
        match self {
            BatteryGlyph::Full => 4,
            BatteryGlyph::Three => 3,
            BatteryGlyph::Two => 2,
            BatteryGlyph::One => 1,
            BatteryGlyph::Empty => 0,
        }
    }
}

/// Clamp a reported state of charge into `0..=100`.
pub fn clamp_percent(percent: u8) -> u8 {
    percent.min(100)
}

/// Five-step level glyph. Thresholds are strict, so 80/60/40/20 land in
/// the lower bucket.
pub fn classify_battery(percent: u8) -> BatteryGlyph {
    let percent = clamp_percent(percent);
    if percent > BATTERY_FULL_ABOVE {
        BatteryGlyph::Full
    } else if percent > BATTERY_THREE_ABOVE {
        BatteryGlyph::Three
    } else if percent > BATTERY_TWO_ABOVE {
        BatteryGlyph::Two
    } else if percent > BATTERY_ONE_ABOVE {
        BatteryGlyph::One
    } else {
        BatteryGlyph::Empty
    }
}

/// Convert a raw 12-bit SAADC sample on the sense pin to battery millivolts.
///
/// Negative samples (offset noise near 0 V) read as 0 mV.
pub fn millivolts_from_raw(raw: i16) -> u16 {
    let raw = raw.max(0) as u32;
    let pin_mv = raw * ADC_FULL_SCALE_MV / ADC_RESOLUTION;
    let bat_mv = pin_mv * BATTERY_DIVIDER_NUM / BATTERY_DIVIDER_DEN;
    bat_mv.min(u16::MAX as u32) as u16
}

/// Linear Li-ion discharge approximation between the empty and full voltages.
pub fn percent_from_millivolts(mv: u16) -> u8 {
    if mv >= BATTERY_FULL_MV {
        return 100;
    }
    if mv <= BATTERY_EMPTY_MV {
        return 0;
    }
    let span = (BATTERY_FULL_MV - BATTERY_EMPTY_MV) as u32;
    ((mv - BATTERY_EMPTY_MV) as u32 * 100 / span) as u8
}
