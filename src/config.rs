//! Application-wide constants and compile-time configuration.
//!
//! Display geometry, refresh timing, battery calibration and BLE
//! identity live here so they can be tuned in one place.

// Display

/// SSD1306 panel width (pixels).
pub const SCREEN_WIDTH: u32 = 128;

/// SSD1306 panel height (pixels).
pub const SCREEN_HEIGHT: u32 = 64;

/// Height of the top status bar holding the icons and the date.
pub const TOP_BAR_HEIGHT: u32 = 16;

/// Horizontal inset of the connection and battery glyphs from the bar edges.
pub const ICON_INSET: i32 = 2;

/// Vertical offset of the clock label below the screen centre.
pub const CLOCK_OFFSET_Y: i32 = 8;

/// Placeholder shown in the date label until the host supplies one.
pub const DEFAULT_DATE_TEXT: &str = "27/10/2025";

/// Maximum number of nodes the status scene can hold.
/// Screen + top bar + 3 bar items + clock = 6; two spare.
pub const SCENE_CAPACITY: usize = 8;

/// Maximum bytes of text a single label can hold.
pub const LABEL_TEXT_CAPACITY: usize = 16;

// Refresh timing

/// Clock label refresh period (ms).
pub const CLOCK_REFRESH_MS: u64 = 1000;

/// Depth of the status event queue between producers and the widget task.
pub const STATUS_EVENT_QUEUE: usize = 8;

// Battery

/// Percentages strictly above these pick the full / 3 / 2 / 1 cell glyph.
pub const BATTERY_FULL_ABOVE: u8 = 80;
pub const BATTERY_THREE_ABOVE: u8 = 60;
pub const BATTERY_TWO_ABOVE: u8 = 40;
pub const BATTERY_ONE_ABOVE: u8 = 20;

/// Li-ion cell voltage treated as 100 % (mV).
pub const BATTERY_FULL_MV: u16 = 4200;

/// Li-ion cell voltage treated as 0 % (mV).
pub const BATTERY_EMPTY_MV: u16 = 3450;

/// SAADC full-scale input with gain 1/6 and the 0.6 V internal reference (mV).
pub const ADC_FULL_SCALE_MV: u32 = 3600;

/// SAADC resolution (12-bit).
pub const ADC_RESOLUTION: u32 = 4096;

/// Battery resistor divider: V_bat = V_pin * NUM / DEN.
pub const BATTERY_DIVIDER_NUM: u32 = 2;
pub const BATTERY_DIVIDER_DEN: u32 = 1;

/// Interval between battery samples (seconds).
pub const BATTERY_SAMPLE_SECS: u64 = 60;

// BLE

/// Advertised device name.
pub const BLE_DEVICE_NAME: &str = "kbd-status";

// GPIO pin assignments (nRF52840-DK defaults)
//
//   I²C SDA        → P0.26
//   I²C SCL        → P0.27
//   Battery sense  → P0.04 (AIN2)
