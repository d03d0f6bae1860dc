//! User interface subsystem - status widget on a retained-mode scene.
//!
//! The widget builds a small node tree on a [`surface::Surface`], mutates
//! label content in place on refresh, and the firmware renders the
//! [`scene::Scene`] to the SSD1306 whenever it is dirty.
//!
//! ## Components
//!
//! - **Surface**: retained-mode node API (containers, labels, styling)
//! - **Scene**: fixed-capacity surface rendered with `embedded-graphics`
//! - **Widget**: connection glyph, date, battery glyph and clock
//! - **Schedule**: cooperative one-second refresh timer

pub mod glyphs;
pub mod scene;
pub mod schedule;
pub mod surface;
pub mod widget;

#[cfg(test)]
mod tests;

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::pixelcolor::BinaryColor;

use crate::status::battery::BatteryGlyph;
use crate::status::connection::ConnectionGlyph;

/// Placement of a node inside its parent's bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Align {
    #[default]
    TopLeft,
    TopMid,
    LeftMid,
    Center,
    RightMid,
}

/// Label font.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FontSize {
    #[default]
    Regular,
    /// Clock face.
    Large,
}

impl FontSize {
    pub fn mono(self) -> &'static MonoFont<'static> {
        match self {
            FontSize::Regular => &FONT_6X10,
            FontSize::Large => &profont::PROFONT_24_POINT,
        }
    }
}

/// Visual style of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeStyle {
    /// Text and glyph colour.
    pub color: BinaryColor,
    /// `None` is a transparent background.
    pub background: Option<BinaryColor>,
    pub border_width: u32,
    pub padding: u32,
}

impl NodeStyle {
    /// White-on-transparent, no border, no padding.
    pub const PLAIN: Self = Self {
        color: BinaryColor::On,
        background: None,
        border_width: 0,
        padding: 0,
    };

    /// Opaque black background.
    pub const SCREEN: Self = Self {
        color: BinaryColor::On,
        background: Some(BinaryColor::Off),
        border_width: 0,
        padding: 0,
    };
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self::PLAIN
    }
}

/// Icon content of a label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Symbol {
    Connection(ConnectionGlyph),
    Battery(BatteryGlyph),
}
