/// Connection indicator shown at the left of the top bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectionGlyph {
    Connected,
    /// Rendered blank.
    Disconnected,
}

/// USB power and a BLE link both count as connected.
pub fn classify_connection(usb_powered: bool, ble_connected: bool) -> ConnectionGlyph {
    if usb_powered || ble_connected {
        ConnectionGlyph::Connected
    } else {
        ConnectionGlyph::Disconnected
    }
}
