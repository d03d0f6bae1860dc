//! Unified error type for kbd-status.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Scene
    /// The scene has no free node slot left.
    SceneFull,

    /// A node handle does not refer to a live node.
    UnknownNode,

    // Display
    /// I²C transaction to the display failed.
    Display,

    // BLE
    /// The SoftDevice could not be brought up or the GATT server registered.
    BleNotAvailable,

    /// Advertising stopped before a central connected.
    Advertise,

    /// A GATT attribute write failed.
    Gatt,
}
