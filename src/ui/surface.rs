//! Retained-mode surface the widget draws into.
//!
//! Nodes persist between frames and are mutated in place. Creating a
//! node can fail (the backing store is bounded); setters on a node that
//! no longer exists are ignored.

use embedded_graphics::geometry::{Point, Size};

use super::{Align, FontSize, NodeStyle, Symbol};
use crate::error::Error;

pub trait Surface {
    /// Opaque node handle.
    type Handle: Copy + PartialEq;

    /// Create a fixed-size container under `parent`.
    fn create_container(&mut self, parent: Self::Handle, size: Size) -> Result<Self::Handle, Error>;

    /// Create an empty label under `parent`, sized by its content.
    fn create_label(&mut self, parent: Self::Handle) -> Result<Self::Handle, Error>;

    /// Place `node` inside its parent, then shift it by `offset`.
    fn align(&mut self, node: Self::Handle, align: Align, offset: Point);

    fn set_style(&mut self, node: Self::Handle, style: NodeStyle);

    fn set_font(&mut self, node: Self::Handle, font: FontSize);

    fn set_text(&mut self, node: Self::Handle, text: &str);

    fn set_symbol(&mut self, node: Self::Handle, symbol: Symbol);

    /// Remove `node` and everything under it. The handles become invalid.
    fn remove(&mut self, node: Self::Handle);
}
