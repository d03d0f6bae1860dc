//! Connection and battery icons drawn from primitives.
//!
//! The mono fonts carry no icon set, so glyphs are small fixed-size
//! drawings: three rising signal bars for a live link, an outline with
//! up to four cells for the battery. A disconnected link draws nothing
//! but keeps its footprint so the bar layout does not shift.

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

use super::Symbol;
use crate::status::battery::BatteryGlyph;
use crate::status::connection::ConnectionGlyph;

const SIGNAL_SIZE: Size = Size::new(11, 9);
const SIGNAL_BAR_WIDTH: u32 = 3;
const SIGNAL_BAR_STEP: i32 = 4;

const BATTERY_SIZE: Size = Size::new(16, 8);
const BATTERY_BODY: Size = Size::new(14, 8);
const BATTERY_NUB: Size = Size::new(2, 4);
const BATTERY_CELL: Size = Size::new(2, 4);
const BATTERY_CELL_STEP: i32 = 3;

/// Footprint of a glyph in pixels.
pub fn glyph_size(symbol: Symbol) -> Size {
    match symbol {
        Symbol::Connection(_) => SIGNAL_SIZE,
        Symbol::Battery(_) => BATTERY_SIZE,
    }
}

/// Draw `symbol` with its top-left corner at `origin`.
pub fn draw_glyph<D>(
    display: &mut D,
    symbol: Symbol,
    origin: Point,
    color: BinaryColor,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    match symbol {
        Symbol::Connection(glyph) => draw_signal(display, glyph, origin, color),
        Symbol::Battery(glyph) => draw_battery(display, glyph, origin, color),
    }
}

fn draw_signal<D>(
    display: &mut D,
    glyph: ConnectionGlyph,
    origin: Point,
    color: BinaryColor,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    if glyph == ConnectionGlyph::Disconnected {
        return Ok(());
    }

    let fill = PrimitiveStyle::with_fill(color);
    for bar in 0..3u32 {
        let height = 3 * (bar + 1);
        let top_left = origin
            + Point::new(
                bar as i32 * SIGNAL_BAR_STEP,
                (SIGNAL_SIZE.height - height) as i32,
            );
        Rectangle::new(top_left, Size::new(SIGNAL_BAR_WIDTH, height))
            .into_styled(fill)
            .draw(display)?;
    }
    Ok(())
}

fn draw_battery<D>(
    display: &mut D,
    glyph: BatteryGlyph,
    origin: Point,
    color: BinaryColor,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    Rectangle::new(origin, BATTERY_BODY)
        .into_styled(PrimitiveStyle::with_stroke(color, 1))
        .draw(display)?;

    let nub_origin = origin
        + Point::new(
            BATTERY_BODY.width as i32,
            ((BATTERY_BODY.height - BATTERY_NUB.height) / 2) as i32,
        );
    let fill = PrimitiveStyle::with_fill(color);
    Rectangle::new(nub_origin, BATTERY_NUB)
        .into_styled(fill)
        .draw(display)?;

    for cell in 0..glyph.cells() {
        let top_left = origin + Point::new(2 + cell as i32 * BATTERY_CELL_STEP, 2);
        Rectangle::new(top_left, BATTERY_CELL)
            .into_styled(fill)
            .draw(display)?;
    }
    Ok(())
}
