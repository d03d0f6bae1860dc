//! Status widget - connection glyph, date, battery glyph and uptime clock.
//!
//! Layout on the 128×64 panel:
//!
//! ```text
//! ┌────────────────────────────┐
//! │ ▂▄▆     27/10/2025    [▮▮] │  ← 16 px top bar
//! │                            │
//! │           12:34            │  ← large clock, centre + 8 px
//! └────────────────────────────┘
//! ```
//!
//! The widget owns its node handles and a [`DisplayState`] snapshot.
//! Every refresh recomputes from a [`StatusSource`] and pushes into one
//! node; an absent node turns the refresh into a no-op.

use embedded_graphics::geometry::{Point, Size};

use super::schedule::RefreshTimer;
use super::surface::Surface;
use super::{Align, FontSize, NodeStyle, Symbol};
use crate::config::{
    CLOCK_OFFSET_Y, CLOCK_REFRESH_MS, ICON_INSET, SCREEN_HEIGHT, SCREEN_WIDTH, TOP_BAR_HEIGHT,
};
use crate::status::battery::{clamp_percent, classify_battery};
use crate::status::clock::format_clock;
use crate::status::connection::{classify_connection, ConnectionGlyph};
use crate::status::{truncated, DisplayState, StatusEvent, StatusSource};

#[derive(Clone, Copy)]
struct Handles<H> {
    screen: H,
    connection_icon: Option<H>,
    date_label: Option<H>,
    battery_icon: Option<H>,
    time_label: Option<H>,
}

pub struct StatusWidget<S: Surface> {
    handles: Option<Handles<S::Handle>>,
    state: DisplayState,
    timer: RefreshTimer,
}

impl<S: Surface> StatusWidget<S> {
    /// Create an uninitialized widget holding placeholder state.
    pub fn new() -> Self {
        Self {
            handles: None,
            state: DisplayState::placeholder(),
            timer: RefreshTimer::new(CLOCK_REFRESH_MS),
        }
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.handles.is_some()
    }

    /// Screen container handle, once initialized.
    pub fn screen(&self) -> Option<S::Handle> {
        self.handles.as_ref().map(|h| h.screen)
    }

    pub fn connection_icon(&self) -> Option<S::Handle> {
        self.handles.as_ref().and_then(|h| h.connection_icon)
    }

    pub fn date_label(&self) -> Option<S::Handle> {
        self.handles.as_ref().and_then(|h| h.date_label)
    }

    pub fn battery_icon(&self) -> Option<S::Handle> {
        self.handles.as_ref().and_then(|h| h.battery_icon)
    }

    pub fn time_label(&self) -> Option<S::Handle> {
        self.handles.as_ref().and_then(|h| h.time_label)
    }

    /// Build the node tree under `parent`, fill it from `source` and arm
    /// the clock timer.
    ///
    /// Returns the screen container, or `None` when the surface could not
    /// even create that. Calling it again returns the existing screen.
    pub fn initialize<Src: StatusSource>(
        &mut self,
        surface: &mut S,
        parent: S::Handle,
        source: &Src,
    ) -> Option<S::Handle> {
        if let Some(handles) = &self.handles {
            return Some(handles.screen);
        }

        let screen = match surface.create_container(parent, Size::new(SCREEN_WIDTH, SCREEN_HEIGHT)) {
            Ok(screen) => screen,
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Status screen not created: {}", _e);
                return None;
            }
        };
        surface.set_style(screen, NodeStyle::SCREEN);

        let top_bar = surface
            .create_container(screen, Size::new(SCREEN_WIDTH, TOP_BAR_HEIGHT))
            .ok();
        if let Some(bar) = top_bar {
            surface.align(bar, Align::TopMid, Point::zero());
            surface.set_style(bar, NodeStyle::PLAIN);
        }

        let connection_icon =
            top_bar.and_then(|bar| place_label(surface, bar, Align::LeftMid, Point::new(ICON_INSET, 0)));
        let date_label = top_bar.and_then(|bar| place_label(surface, bar, Align::Center, Point::zero()));
        let battery_icon =
            top_bar.and_then(|bar| place_label(surface, bar, Align::RightMid, Point::new(-ICON_INSET, 0)));

        let time_label = place_label(surface, screen, Align::Center, Point::new(0, CLOCK_OFFSET_Y));
        if let Some(label) = time_label {
            surface.set_font(label, FontSize::Large);
        }

        self.handles = Some(Handles {
            screen,
            connection_icon,
            date_label,
            battery_icon,
            time_label,
        });

        if let Some(label) = date_label {
            surface.set_text(label, self.state.date_text.as_str());
        }
        self.refresh_connection(surface, source);
        self.refresh_battery(surface, source);
        self.refresh_time(surface, source);

        self.timer.start(uptime(source));
        Some(screen)
    }

    /// Push the uptime clock. Returns `true` if the text changed.
    pub fn refresh_time<Src: StatusSource>(&mut self, surface: &mut S, source: &Src) -> bool {
        let Some(label) = self.time_label() else {
            return false;
        };

        let text = format_clock(source.uptime_millis());
        surface.set_text(label, text.as_str());

        let changed = self.state.clock_text != text;
        self.state.clock_text = text;
        changed
    }

    /// Push the connection glyph. Returns `true` if the glyph changed.
    pub fn refresh_connection<Src: StatusSource>(&mut self, surface: &mut S, source: &Src) -> bool {
        let Some(icon) = self.connection_icon() else {
            return false;
        };

        let glyph = classify_connection(source.usb_powered(), source.ble_connected());
        surface.set_symbol(icon, Symbol::Connection(glyph));

        let connected = glyph == ConnectionGlyph::Connected;
        let changed = self.state.connected != connected;
        if changed {
            #[cfg(feature = "defmt")]
            defmt::debug!("Status: connection {}", glyph);
        }
        self.state.connected = connected;
        changed
    }

    /// Push the battery glyph. Returns `true` if the glyph changed.
    pub fn refresh_battery<Src: StatusSource>(&mut self, surface: &mut S, source: &Src) -> bool {
        let Some(icon) = self.battery_icon() else {
            return false;
        };

        let percent = clamp_percent(source.battery_percent());
        let glyph = classify_battery(percent);
        surface.set_symbol(icon, Symbol::Battery(glyph));

        let changed = classify_battery(self.state.battery_percent) != glyph;
        if changed {
            #[cfg(feature = "defmt")]
            defmt::debug!("Status: battery {}% -> {}", percent, glyph);
        }
        self.state.battery_percent = percent;
        changed
    }

    /// Replace the date label text.
    pub fn set_date(&mut self, surface: &mut S, text: &str) -> bool {
        let date = truncated(text);
        let changed = self.state.date_text != date;
        if let Some(label) = self.date_label() {
            surface.set_text(label, date.as_str());
        }
        self.state.date_text = date;
        changed
    }

    pub fn on_tick<Src: StatusSource>(&mut self, surface: &mut S, source: &Src) -> bool {
        self.refresh_time(surface, source)
    }

    pub fn on_connection_changed<Src: StatusSource>(&mut self, surface: &mut S, source: &Src) -> bool {
        self.refresh_connection(surface, source)
    }

    pub fn on_battery_changed<Src: StatusSource>(&mut self, surface: &mut S, source: &Src) -> bool {
        self.refresh_battery(surface, source)
    }

    /// Dispatch a notification to the matching observer.
    pub fn handle<Src: StatusSource>(&mut self, event: StatusEvent, surface: &mut S, source: &Src) -> bool {
        match event {
            StatusEvent::Tick => self.on_tick(surface, source),
            StatusEvent::ConnectionChanged => self.on_connection_changed(surface, source),
            StatusEvent::BatteryChanged => self.on_battery_changed(surface, source),
        }
    }

    /// Uptime (ms) at which the clock next needs a refresh.
    pub fn next_deadline(&self) -> Option<u64> {
        self.timer.next_deadline()
    }

    /// Run the clock timer; refreshes the clock when it is due.
    pub fn poll<Src: StatusSource>(&mut self, surface: &mut S, source: &Src) -> bool {
        if self.timer.poll(uptime(source)) {
            self.on_tick(surface, source)
        } else {
            false
        }
    }

    /// Cancel the clock timer and remove the widget from the surface.
    pub fn teardown(&mut self, surface: &mut S) {
        self.timer.cancel();
        if let Some(handles) = self.handles.take() {
            surface.remove(handles.screen);
        }
    }
}

impl<S: Surface> Default for StatusWidget<S> {
    fn default() -> Self {
        Self::new()
    }
}

fn uptime<Src: StatusSource>(source: &Src) -> u64 {
    source.uptime_millis().max(0) as u64
}

fn place_label<S: Surface>(
    surface: &mut S,
    parent: S::Handle,
    align: Align,
    offset: Point,
) -> Option<S::Handle> {
    match surface.create_label(parent) {
        Ok(label) => {
            surface.align(label, align, offset);
            surface.set_style(label, NodeStyle::PLAIN);
            Some(label)
        }
        Err(_e) => {
            #[cfg(feature = "defmt")]
            defmt::warn!("Status label not created: {}", _e);
            None
        }
    }
}
