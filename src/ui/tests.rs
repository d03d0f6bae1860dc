//! Unit tests for the scene, the refresh timer and the status widget.
//!
//! These tests run on the host against an in-memory framebuffer and a
//! fake status source.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use super::scene::{NodeId, Scene};
use super::schedule::RefreshTimer;
use super::surface::Surface;
use super::widget::StatusWidget;
use super::{Align, NodeStyle, Symbol};
use crate::config::{DEFAULT_DATE_TEXT, SCENE_CAPACITY, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::error::Error;
use crate::status::battery::BatteryGlyph;
use crate::status::connection::ConnectionGlyph;
use crate::status::{StatusEvent, StatusSource};

const PANEL: Size = Size::new(SCREEN_WIDTH, SCREEN_HEIGHT);

type StatusScene = Scene<SCENE_CAPACITY>;

#[derive(Clone, Copy, Default)]
struct FakeSource {
    usb: bool,
    ble: bool,
    battery: u8,
    uptime_ms: i64,
}

impl StatusSource for FakeSource {
    fn usb_powered(&self) -> bool {
        self.usb
    }

    fn ble_connected(&self) -> bool {
        self.ble
    }

    fn battery_percent(&self) -> u8 {
        self.battery
    }

    fn uptime_millis(&self) -> i64 {
        self.uptime_ms
    }
}

struct Framebuffer {
    pixels: [[bool; SCREEN_WIDTH as usize]; SCREEN_HEIGHT as usize],
}

impl Framebuffer {
    fn new() -> Self {
        Self {
            pixels: [[false; SCREEN_WIDTH as usize]; SCREEN_HEIGHT as usize],
        }
    }

    fn lit_in(&self, area: Rectangle) -> usize {
        area.points()
            .filter(|p| p.x >= 0 && p.y >= 0)
            .filter(|p| (p.x as u32) < SCREEN_WIDTH && (p.y as u32) < SCREEN_HEIGHT)
            .filter(|p| self.pixels[p.y as usize][p.x as usize])
            .count()
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        PANEL
    }
}

impl DrawTarget for Framebuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0 && point.y >= 0 {
                let (x, y) = (point.x as usize, point.y as usize);
                if x < SCREEN_WIDTH as usize && y < SCREEN_HEIGHT as usize {
                    self.pixels[y][x] = color.is_on();
                }
            }
        }
        Ok(())
    }
}

fn initialized(source: &FakeSource) -> (StatusScene, StatusWidget<StatusScene>) {
    let mut scene = StatusScene::new(PANEL);
    let mut widget = StatusWidget::new();
    let root = scene.root();
    assert!(widget.initialize(&mut scene, root, source).is_some());
    (scene, widget)
}

// ═══════════════════════════════════════════════════════════════════════════
// Scene Tests
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn scene_root_spans_panel() {
    let scene = StatusScene::new(PANEL);
    assert_eq!(scene.bounds(scene.root()), Some(Rectangle::new(Point::zero(), PANEL)));
    assert_eq!(scene.live_count(), 1);
}

#[test]
fn scene_reports_full() {
    let mut scene: Scene<3> = Scene::new(PANEL);
    let root = scene.root();
    assert!(scene.create_label(root).is_ok());
    assert!(scene.create_label(root).is_ok());
    assert_eq!(scene.create_label(root), Err(Error::SceneFull));
}

#[test]
fn scene_rejects_dead_parent() {
    let mut scene = StatusScene::new(PANEL);
    let root = scene.root();
    let bar = scene.create_container(root, Size::new(128, 16)).unwrap();
    scene.remove(bar);
    assert_eq!(scene.create_label(bar), Err(Error::UnknownNode));
}

#[test]
fn scene_remove_drops_subtree_and_reuses_slots() {
    let mut scene: Scene<4> = Scene::new(PANEL);
    let root = scene.root();
    let bar = scene.create_container(root, Size::new(128, 16)).unwrap();
    let inner = scene.create_container(bar, Size::new(20, 10)).unwrap();
    let label = scene.create_label(inner).unwrap();
    assert_eq!(scene.live_count(), 4);

    scene.remove(bar);
    assert_eq!(scene.live_count(), 1);
    assert!(!scene.is_live(label));
    assert!(scene.bounds(inner).is_none());

    // Freed slots are available again.
    assert!(scene.create_label(root).is_ok());
    assert!(scene.create_label(root).is_ok());
    assert!(scene.create_label(root).is_ok());
}

#[test]
fn scene_root_cannot_be_removed() {
    let mut scene = StatusScene::new(PANEL);
    let root = scene.root();
    scene.remove(root);
    assert!(scene.is_live(root));
}

#[test]
fn scene_dirty_only_on_real_change() {
    let mut scene = StatusScene::new(PANEL);
    let root = scene.root();
    let label = scene.create_label(root).unwrap();
    scene.set_text(label, "12:00");
    scene.mark_clean();

    scene.set_text(label, "12:00");
    assert!(!scene.is_dirty());

    scene.set_text(label, "12:01");
    assert!(scene.is_dirty());
}

#[test]
fn scene_ignores_setters_on_dead_nodes() {
    let mut scene = StatusScene::new(PANEL);
    let root = scene.root();
    let label = scene.create_label(root).unwrap();
    scene.remove(label);
    scene.mark_clean();

    scene.set_text(label, "gone");
    scene.set_symbol(label, Symbol::Battery(BatteryGlyph::Full));
    assert!(!scene.is_dirty());
    assert_eq!(scene.text(label), None);
}

#[test]
fn scene_stale_handle_cannot_touch_reused_slot() {
    let mut scene = StatusScene::new(PANEL);
    let root = scene.root();
    let old = scene.create_label(root).unwrap();
    scene.remove(old);

    let fresh = scene.create_label(root).unwrap();
    assert_ne!(old, fresh);
    scene.set_text(fresh, "fresh");
    scene.mark_clean();

    scene.set_text(old, "stale");
    scene.set_symbol(old, Symbol::Battery(BatteryGlyph::Full));
    scene.remove(old);
    assert!(!scene.is_dirty());
    assert!(scene.is_live(fresh));
    assert!(!scene.is_live(old));
    assert_eq!(scene.text(fresh), Some("fresh"));
    assert_eq!(scene.text(old), None);
}

#[test]
fn scene_truncates_long_text() {
    let mut scene = StatusScene::new(PANEL);
    let root = scene.root();
    let label = scene.create_label(root).unwrap();
    scene.set_text(label, "0123456789abcdefXYZ");
    assert_eq!(scene.text(label), Some("0123456789abcdef"));
}

#[test]
fn scene_aligns_inside_parent() {
    let mut scene = StatusScene::new(PANEL);
    let root = scene.root();
    let bar = scene.create_container(root, Size::new(128, 16)).unwrap();
    scene.align(bar, Align::TopMid, Point::zero());

    let left = scene.create_label(bar).unwrap();
    scene.align(left, Align::LeftMid, Point::new(2, 0));
    scene.set_symbol(left, Symbol::Connection(ConnectionGlyph::Connected));

    let right = scene.create_label(bar).unwrap();
    scene.align(right, Align::RightMid, Point::new(-2, 0));
    scene.set_symbol(right, Symbol::Battery(BatteryGlyph::Two));

    let center = scene.create_label(bar).unwrap();
    scene.align(center, Align::Center, Point::zero());
    scene.set_text(center, "27/10/2025");

    assert_eq!(
        scene.bounds(left),
        Some(Rectangle::new(Point::new(2, 3), Size::new(11, 9)))
    );
    assert_eq!(
        scene.bounds(right),
        Some(Rectangle::new(Point::new(110, 4), Size::new(16, 8)))
    );
    // 10 chars of 6×10.
    assert_eq!(
        scene.bounds(center),
        Some(Rectangle::new(Point::new(34, 3), Size::new(60, 10)))
    );
}

#[test]
fn scene_padding_grows_label() {
    let mut scene = StatusScene::new(PANEL);
    let root = scene.root();
    let label = scene.create_label(root).unwrap();
    scene.set_text(label, "ab");
    scene.set_style(
        label,
        NodeStyle {
            padding: 3,
            border_width: 1,
            ..NodeStyle::PLAIN
        },
    );
    assert_eq!(scene.bounds(label).map(|r| r.size), Some(Size::new(18, 16)));

    let mut fb = Framebuffer::new();
    scene.render(&mut fb).unwrap();
    // Border corner is lit.
    assert!(fb.pixels[0][0]);
}

// ═══════════════════════════════════════════════════════════════════════════
// Refresh Timer Tests
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn timer_disarmed_never_fires() {
    let mut timer = RefreshTimer::new(1000);
    assert!(!timer.is_armed());
    assert!(!timer.poll(u64::MAX));
    assert_eq!(timer.next_deadline(), None);
}

#[test]
fn timer_fires_once_per_period() {
    let mut timer = RefreshTimer::new(1000);
    timer.start(500);
    assert_eq!(timer.next_deadline(), Some(1500));
    assert!(!timer.poll(1499));
    assert!(timer.poll(1500));
    assert!(!timer.poll(1500));
    assert_eq!(timer.next_deadline(), Some(2500));
}

#[test]
fn timer_late_poll_rearms_from_now() {
    let mut timer = RefreshTimer::new(1000);
    timer.start(0);
    assert!(timer.poll(3700));
    assert_eq!(timer.next_deadline(), Some(4700));
}

#[test]
fn timer_cancel_stops_firing() {
    let mut timer = RefreshTimer::new(1000);
    timer.start(0);
    timer.cancel();
    assert!(!timer.poll(10_000));
    assert!(!timer.is_armed());
}

// ═══════════════════════════════════════════════════════════════════════════
// Widget Tests
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn widget_initialize_fills_every_element() {
    let source = FakeSource {
        ble: true,
        battery: 45,
        uptime_ms: 3_661_000,
        ..Default::default()
    };
    let (scene, widget) = initialized(&source);

    assert!(widget.is_initialized());
    assert_eq!(scene.live_count(), 7);
    assert_eq!(
        scene.symbol(widget.connection_icon().unwrap()),
        Some(Symbol::Connection(ConnectionGlyph::Connected))
    );
    assert_eq!(
        scene.symbol(widget.battery_icon().unwrap()),
        Some(Symbol::Battery(BatteryGlyph::Two))
    );
    assert_eq!(scene.text(widget.date_label().unwrap()), Some(DEFAULT_DATE_TEXT));
    assert_eq!(scene.text(widget.time_label().unwrap()), Some("01:01"));

    let state = widget.state();
    assert!(state.connected);
    assert_eq!(state.battery_percent, 45);
    assert_eq!(state.clock_text.as_str(), "01:01");
}

#[test]
fn widget_initialize_twice_returns_same_screen() {
    let source = FakeSource::default();
    let (mut scene, mut widget) = initialized(&source);
    let first = widget.screen();
    let root = scene.root();
    assert_eq!(widget.initialize(&mut scene, root, &source), first);
    assert_eq!(scene.live_count(), 7);
}

#[test]
fn widget_layout_matches_panel() {
    let source = FakeSource {
        usb: true,
        battery: 90,
        ..Default::default()
    };
    let (scene, widget) = initialized(&source);

    let conn = scene.bounds(widget.connection_icon().unwrap()).unwrap();
    let batt = scene.bounds(widget.battery_icon().unwrap()).unwrap();
    let date = scene.bounds(widget.date_label().unwrap()).unwrap();
    let clock = scene.bounds(widget.time_label().unwrap()).unwrap();

    assert_eq!(conn.top_left, Point::new(2, 3));
    assert_eq!(batt.top_left, Point::new(110, 4));
    assert_eq!(date.top_left, Point::new(34, 3));

    // Clock is horizontally centred and sits below the top bar.
    let left_margin = clock.top_left.x;
    let right_margin = SCREEN_WIDTH as i32 - (left_margin + clock.size.width as i32);
    assert!((left_margin - right_margin).abs() <= 1);
    assert!(clock.top_left.y >= 16);
}

#[test]
fn widget_refresh_before_initialize_is_noop() {
    let mut scene = StatusScene::new(PANEL);
    let mut widget: StatusWidget<StatusScene> = StatusWidget::new();
    let source = FakeSource {
        usb: true,
        battery: 100,
        uptime_ms: 120_000,
        ..Default::default()
    };
    scene.mark_clean();

    assert!(!widget.refresh_time(&mut scene, &source));
    assert!(!widget.refresh_connection(&mut scene, &source));
    assert!(!widget.refresh_battery(&mut scene, &source));
    assert!(!widget.poll(&mut scene, &source));
    assert!(!scene.is_dirty());
    assert_eq!(widget.state().clock_text.as_str(), "00:00");
    assert_eq!(widget.next_deadline(), None);
}

#[test]
fn widget_refresh_is_idempotent() {
    let mut source = FakeSource {
        battery: 70,
        uptime_ms: 60_000,
        ..Default::default()
    };
    let (mut scene, mut widget) = initialized(&source);
    source.usb = true;

    assert!(widget.refresh_connection(&mut scene, &source));
    let after_first = scene.symbol(widget.connection_icon().unwrap());
    scene.mark_clean();

    assert!(!widget.refresh_connection(&mut scene, &source));
    assert!(!widget.refresh_battery(&mut scene, &source));
    assert!(!widget.refresh_time(&mut scene, &source));
    assert_eq!(scene.symbol(widget.connection_icon().unwrap()), after_first);
    assert!(!scene.is_dirty());
}

#[test]
fn widget_handle_dispatches_events() {
    let mut source = FakeSource::default();
    let (mut scene, mut widget) = initialized(&source);

    source.battery = 95;
    assert!(widget.handle(StatusEvent::BatteryChanged, &mut scene, &source));
    source.ble = true;
    assert!(widget.handle(StatusEvent::ConnectionChanged, &mut scene, &source));
    source.uptime_ms = 7_200_000;
    assert!(widget.handle(StatusEvent::Tick, &mut scene, &source));

    assert_eq!(scene.text(widget.time_label().unwrap()), Some("02:00"));
    assert_eq!(
        scene.symbol(widget.battery_icon().unwrap()),
        Some(Symbol::Battery(BatteryGlyph::Full))
    );
}

#[test]
fn widget_battery_change_within_bucket_is_not_a_display_change() {
    let mut source = FakeSource {
        battery: 45,
        ..Default::default()
    };
    let (mut scene, mut widget) = initialized(&source);
    source.battery = 55;
    assert!(!widget.refresh_battery(&mut scene, &source));
    assert_eq!(widget.state().battery_percent, 55);
}

#[test]
fn widget_clamps_implausible_battery() {
    let source = FakeSource {
        battery: 230,
        ..Default::default()
    };
    let (scene, widget) = initialized(&source);
    assert_eq!(widget.state().battery_percent, 100);
    assert_eq!(
        scene.symbol(widget.battery_icon().unwrap()),
        Some(Symbol::Battery(BatteryGlyph::Full))
    );
}

#[test]
fn widget_poll_follows_clock_timer() {
    let mut source = FakeSource::default();
    let (mut scene, mut widget) = initialized(&source);
    assert_eq!(widget.next_deadline(), Some(1000));

    source.uptime_ms = 999;
    assert!(!widget.poll(&mut scene, &source));
    assert_eq!(widget.next_deadline(), Some(1000));

    // Fires, but the minute has not rolled over yet.
    source.uptime_ms = 1000;
    assert!(!widget.poll(&mut scene, &source));
    assert_eq!(widget.next_deadline(), Some(2000));

    source.uptime_ms = 60_000;
    assert!(widget.poll(&mut scene, &source));
    assert_eq!(scene.text(widget.time_label().unwrap()), Some("00:01"));
    assert_eq!(widget.next_deadline(), Some(61_000));
}

#[test]
fn widget_set_date_updates_label() {
    let source = FakeSource::default();
    let (mut scene, mut widget) = initialized(&source);
    assert!(widget.set_date(&mut scene, "01/01/2026"));
    assert!(!widget.set_date(&mut scene, "01/01/2026"));
    assert_eq!(scene.text(widget.date_label().unwrap()), Some("01/01/2026"));
    assert_eq!(widget.state().date_text.as_str(), "01/01/2026");
}

#[test]
fn widget_teardown_removes_nodes_and_stops_timer() {
    let mut source = FakeSource::default();
    let (mut scene, mut widget) = initialized(&source);
    let time_label = widget.time_label().unwrap();

    widget.teardown(&mut scene);
    assert!(!widget.is_initialized());
    assert_eq!(scene.live_count(), 1);
    assert!(!scene.is_live(time_label));
    assert_eq!(widget.next_deadline(), None);

    source.uptime_ms = 120_000;
    assert!(!widget.poll(&mut scene, &source));
    assert!(!widget.refresh_time(&mut scene, &source));
}

#[test]
fn widget_survives_partial_creation() {
    // Root + screen + top bar only; every label fails.
    let mut scene: Scene<3> = Scene::new(PANEL);
    let mut widget = StatusWidget::new();
    let source = FakeSource {
        usb: true,
        battery: 50,
        uptime_ms: 60_000,
        ..Default::default()
    };
    let root = scene.root();

    assert!(widget.initialize(&mut scene, root, &source).is_some());
    assert_eq!(widget.time_label(), None);
    assert_eq!(widget.battery_icon(), None);
    assert!(!widget.refresh_time(&mut scene, &source));
    assert!(!widget.refresh_battery(&mut scene, &source));
}

#[test]
fn widget_without_room_for_screen_stays_uninitialized() {
    let mut scene: Scene<1> = Scene::new(PANEL);
    let mut widget = StatusWidget::new();
    let root = scene.root();
    assert_eq!(widget.initialize(&mut scene, root, &FakeSource::default()), None);
    assert!(!widget.is_initialized());
}

// ═══════════════════════════════════════════════════════════════════════════
// Rendering Tests
// ═══════════════════════════════════════════════════════════════════════════

fn lit_pixels(source: &FakeSource, node: fn(&StatusWidget<StatusScene>) -> Option<NodeId>) -> usize {
    let (scene, widget) = initialized(source);
    let mut fb = Framebuffer::new();
    scene.render(&mut fb).unwrap();
    let area = scene.bounds(node(&widget).unwrap()).unwrap();
    fb.lit_in(area)
}

#[test]
fn render_battery_fill_tracks_level() {
    let full = lit_pixels(&FakeSource { battery: 100, ..Default::default() }, |w| w.battery_icon());
    let two = lit_pixels(&FakeSource { battery: 50, ..Default::default() }, |w| w.battery_icon());
    let empty = lit_pixels(&FakeSource { battery: 5, ..Default::default() }, |w| w.battery_icon());

    // Each cell is 2×4 pixels.
    assert_eq!(full - two, 16);
    assert_eq!(two - empty, 16);
    assert!(empty > 0, "outline is always drawn");
}

#[test]
fn render_disconnected_is_blank() {
    let disconnected = lit_pixels(&FakeSource::default(), |w| w.connection_icon());
    let connected = lit_pixels(&FakeSource { ble: true, ..Default::default() }, |w| w.connection_icon());
    assert_eq!(disconnected, 0);
    // Bars of 3, 6 and 9 pixels, 3 wide.
    assert_eq!(connected, 54);
}

#[test]
fn render_clock_draws_text() {
    let clock = lit_pixels(&FakeSource::default(), |w| w.time_label());
    assert!(clock > 0);
}
