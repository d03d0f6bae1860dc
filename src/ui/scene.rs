//! Fixed-capacity retained-mode scene rendered with `embedded-graphics`.
//!
//! Node 0 is the root and covers the whole panel. Every other node is
//! placed by aligning it inside its parent's bounds; labels size
//! themselves from their content. Rendering walks the tree from the
//! root so parents always paint before their children.

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use heapless::{String, Vec};

use super::glyphs::{draw_glyph, glyph_size};
use super::surface::Surface;
use super::{Align, FontSize, NodeStyle, Symbol};
use crate::config::LABEL_TEXT_CAPACITY;
use crate::error::Error;
use crate::status::truncated;

/// Handle to a scene node.
///
/// Slots are recycled after [`Surface::remove`]; the generation makes a
/// handle to the old occupant stop matching once its slot is reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NodeId {
    index: usize,
    generation: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Kind {
    Container(Size),
    Label,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Content {
    Empty,
    Text(String<LABEL_TEXT_CAPACITY>),
    Symbol(Symbol),
}

#[derive(Clone, Debug)]
struct Node {
    parent: Option<NodeId>,
    kind: Kind,
    content: Content,
    align: Align,
    offset: Point,
    style: NodeStyle,
    font: FontSize,
    generation: u32,
    live: bool,
}

impl Node {
    fn new(parent: Option<NodeId>, kind: Kind, generation: u32) -> Self {
        Self {
            parent,
            kind,
            content: Content::Empty,
            align: Align::TopLeft,
            offset: Point::zero(),
            style: NodeStyle::PLAIN,
            font: FontSize::Regular,
            generation,
            live: true,
        }
    }
}

pub struct Scene<const N: usize> {
    nodes: Vec<Node, N>,
    dirty: bool,
}

impl<const N: usize> Scene<N> {
    /// Create a scene whose root spans `size`.
    pub fn new(size: Size) -> Self {
        let mut nodes = Vec::new();
        let _ = nodes.push(Node::new(None, Kind::Container(size), 0));
        Self { nodes, dirty: true }
    }

    pub fn root(&self) -> NodeId {
        NodeId {
            index: 0,
            generation: 0,
        }
    }

    /// Whether anything changed since the last [`Scene::mark_clean`].
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn is_live(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn live_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.live).count()
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id)?.content {
            Content::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn symbol(&self, id: NodeId) -> Option<Symbol> {
        match self.node(id)?.content {
            Content::Symbol(symbol) => Some(symbol),
            _ => None,
        }
    }

    /// Absolute on-screen rectangle of a live node.
    pub fn bounds(&self, id: NodeId) -> Option<Rectangle> {
        let node = self.node(id)?;
        let size = self.node_size(node);
        match node.parent {
            None => Some(Rectangle::new(Point::zero(), size)),
            Some(parent) => {
                let outer = self.bounds(parent)?;
                let top_left = place(outer, size, node.align) + node.offset;
                Some(Rectangle::new(top_left, size))
            }
        }
    }

    /// Draw every live node onto `display`.
    pub fn render<D>(&self, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        self.draw_subtree(display, self.root())
    }

    fn draw_subtree<D>(&self, display: &mut D, id: NodeId) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        self.draw_node(display, id)?;
        for (index, child) in self.nodes.iter().enumerate() {
            if child.live && child.parent == Some(id) {
                let child_id = NodeId {
                    index,
                    generation: child.generation,
                };
                self.draw_subtree(display, child_id)?;
            }
        }
        Ok(())
    }

    fn draw_node<D>(&self, display: &mut D, id: NodeId) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let (Some(node), Some(bounds)) = (self.node(id), self.bounds(id)) else {
            return Ok(());
        };
        let style = node.style;

        if let Some(background) = style.background {
            bounds
                .into_styled(PrimitiveStyle::with_fill(background))
                .draw(display)?;
        }
        if style.border_width > 0 {
            bounds
                .into_styled(PrimitiveStyle::with_stroke(style.color, style.border_width))
                .draw(display)?;
        }

        let inner = bounds.top_left + Point::new(style.padding as i32, style.padding as i32);
        match &node.content {
            Content::Empty => {}
            Content::Text(text) => {
                let text_style = MonoTextStyle::new(node.font.mono(), style.color);
                Text::with_baseline(text.as_str(), inner, text_style, Baseline::Top)
                    .draw(display)?;
            }
            Content::Symbol(symbol) => draw_glyph(display, *symbol, inner, style.color)?,
        }
        Ok(())
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes
            .get(id.index)
            .filter(|n| n.live && n.generation == id.generation)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes
            .get_mut(id.index)
            .filter(|n| n.live && n.generation == id.generation)
    }

    fn node_size(&self, node: &Node) -> Size {
        match node.kind {
            Kind::Container(size) => size,
            Kind::Label => {
                let content = match &node.content {
                    Content::Empty => Size::zero(),
                    Content::Text(text) => text_size(node.font, text.as_str()),
                    Content::Symbol(symbol) => glyph_size(*symbol),
                };
                content + Size::new(node.style.padding * 2, node.style.padding * 2)
            }
        }
    }

    fn insert(&mut self, parent: NodeId, kind: Kind) -> Result<NodeId, Error> {
        if !self.is_live(parent) {
            return Err(Error::UnknownNode);
        }
        let id = match self.nodes.iter().position(|n| !n.live) {
            Some(index) => {
                let generation = self.nodes[index].generation.wrapping_add(1);
                self.nodes[index] = Node::new(Some(parent), kind, generation);
                NodeId { index, generation }
            }
            None => {
                let node = Node::new(Some(parent), kind, 0);
                self.nodes.push(node).map_err(|_| Error::SceneFull)?;
                NodeId {
                    index: self.nodes.len() - 1,
                    generation: 0,
                }
            }
        };
        self.dirty = true;
        Ok(id)
    }

    /// Apply `f` to a live node and flag the scene dirty if it changed.
    fn update<F>(&mut self, id: NodeId, f: F)
    where
        F: FnOnce(&mut Node) -> bool,
    {
        let changed = match self.node_mut(id) {
            Some(node) => f(node),
            None => false,
        };
        self.dirty |= changed;
    }
}

impl<const N: usize> Surface for Scene<N> {
    type Handle = NodeId;

    fn create_container(&mut self, parent: NodeId, size: Size) -> Result<NodeId, Error> {
        self.insert(parent, Kind::Container(size))
    }

    fn create_label(&mut self, parent: NodeId) -> Result<NodeId, Error> {
        self.insert(parent, Kind::Label)
    }

    fn align(&mut self, node: NodeId, align: Align, offset: Point) {
        self.update(node, |n| {
            let changed = n.align != align || n.offset != offset;
            n.align = align;
            n.offset = offset;
            changed
        });
    }

    fn set_style(&mut self, node: NodeId, style: NodeStyle) {
        self.update(node, |n| {
            let changed = n.style != style;
            n.style = style;
            changed
        });
    }

    fn set_font(&mut self, node: NodeId, font: FontSize) {
        self.update(node, |n| {
            let changed = n.font != font;
            n.font = font;
            changed
        });
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        let content = Content::Text(truncated(text));
        self.update(node, |n| {
            let changed = n.content != content;
            n.content = content;
            changed
        });
    }

    fn set_symbol(&mut self, node: NodeId, symbol: Symbol) {
        let content = Content::Symbol(symbol);
        self.update(node, |n| {
            let changed = n.content != content;
            n.content = content;
            changed
        });
    }

    fn remove(&mut self, node: NodeId) {
        if node == self.root() || !self.is_live(node) {
            return;
        }
        self.nodes[node.index].live = false;

        // Sweep orphans until the subtree is gone.
        loop {
            let mut removed = false;
            for index in 0..self.nodes.len() {
                let orphaned = match self.nodes[index].parent {
                    Some(parent) => self.nodes[index].live && !self.is_live(parent),
                    None => false,
                };
                if orphaned {
                    self.nodes[index].live = false;
                    removed = true;
                }
            }
            if !removed {
                break;
            }
        }
        self.dirty = true;
    }
}

fn text_size(font: FontSize, text: &str) -> Size {
    let mono = font.mono();
    let chars = text.chars().count() as u32;
    if chars == 0 {
        return Size::new(0, mono.character_size.height);
    }
    let width = chars * mono.character_size.width + (chars - 1) * mono.character_spacing;
    Size::new(width, mono.character_size.height)
}

fn place(outer: Rectangle, size: Size, align: Align) -> Point {
    let free_w = outer.size.width as i32 - size.width as i32;
    let free_h = outer.size.height as i32 - size.height as i32;
    let (dx, dy) = match align {
        Align::TopLeft => (0, 0),
        Align::TopMid => (free_w / 2, 0),
        Align::LeftMid => (0, free_h / 2),
        Align::Center => (free_w / 2, free_h / 2),
        Align::RightMid => (free_w, free_h / 2),
    };
    outer.top_left + Point::new(dx, dy)
}
