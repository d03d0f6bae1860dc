//! Status model - what the widget shows and where it reads it from.
//!
//! The classifiers and the clock formatter are pure functions; the
//! widget combines them with a [`StatusSource`] into a [`DisplayState`].

pub mod battery;
pub mod clock;
pub mod connection;

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use heapless::String;

use crate::config::{DEFAULT_DATE_TEXT, LABEL_TEXT_CAPACITY};
use clock::ClockText;

/// Live state queries the widget refreshes from.
///
/// Implemented by the firmware on top of [`SharedStatus`] and the
/// uptime counter, and by fakes in tests.
pub trait StatusSource {
    /// Whether the keyboard is powered over USB.
    fn usb_powered(&self) -> bool;

    /// Whether the active BLE profile has a connected central.
    fn ble_connected(&self) -> bool;

    /// Battery state of charge. Values above 100 are clamped by the widget.
    fn battery_percent(&self) -> u8;

    /// Milliseconds since boot.
    fn uptime_millis(&self) -> i64;
}

/// Notifications that drive widget refreshes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusEvent {
    /// Periodic clock tick.
    Tick,
    /// USB power or BLE link state changed.
    ConnectionChanged,
    /// Battery state of charge changed.
    BatteryChanged,
}

/// Snapshot of everything the widget currently displays.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayState {
    pub connected: bool,
    pub battery_percent: u8,
    pub clock_text: ClockText,
    pub date_text: String<LABEL_TEXT_CAPACITY>,
}

impl DisplayState {
    /// Placeholder values shown before the first refresh.
    pub fn placeholder() -> Self {
        Self {
            connected: false,
            battery_percent: 0,
            clock_text: clock::format_clock(0),
            date_text: truncated(DEFAULT_DATE_TEXT),
        }
    }
}

impl Default for DisplayState {
    fn default() -> Self {
        Self::placeholder()
    }
}

/// Copy `text` into a label-sized string, dropping whatever does not fit.
pub fn truncated(text: &str) -> String<LABEL_TEXT_CAPACITY> {
    let mut out = String::new();
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// Lock-free store written by the drivers and read by the widget.
///
/// Setters return `true` only when the value actually changed so that
/// producers emit one notification per transition.
pub struct SharedStatus {
    usb_powered: AtomicBool,
    ble_connected: AtomicBool,
    battery_percent: AtomicU8,
}

impl SharedStatus {
    pub const fn new() -> Self {
        Self {
            usb_powered: AtomicBool::new(false),
            ble_connected: AtomicBool::new(false),
            battery_percent: AtomicU8::new(0),
        }
    }

    pub fn set_usb_powered(&self, powered: bool) -> bool {
        self.usb_powered.swap(powered, Ordering::Relaxed) != powered
    }

    pub fn set_ble_connected(&self, connected: bool) -> bool {
        self.ble_connected.swap(connected, Ordering::Relaxed) != connected
    }

    pub fn set_battery_percent(&self, percent: u8) -> bool {
        self.battery_percent.swap(percent, Ordering::Relaxed) != percent
    }

    pub fn usb_powered(&self) -> bool {
        self.usb_powered.load(Ordering::Relaxed)
    }

    pub fn ble_connected(&self) -> bool {
        self.ble_connected.load(Ordering::Relaxed)
    }

    pub fn battery_percent(&self) -> u8 {
        self.battery_percent.load(Ordering::Relaxed)
    }
}

impl Default for SharedStatus {
    fn default() -> Self {
        Self::new()
    }
}
