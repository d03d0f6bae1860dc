//! Host-testable library for kbd-status.
//!
//! Holds the pure status logic (classifiers, uptime clock, battery
//! conversion), the status widget and the retained-mode scene it draws
//! into. None of it touches hardware, so it builds and tests on the host.
//!
//! Usage: `cargo test --lib`
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main]
//! and adds the SSD1306, SoftDevice and SAADC wiring on top of this crate.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod error;
pub mod status;
pub mod ui;

pub use error::Error;
pub use status::{DisplayState, SharedStatus, StatusEvent, StatusSource};
pub use ui::scene::{NodeId, Scene};
pub use ui::widget::StatusWidget;

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests - status logic
// ═══════════════════════════════════════════════════════════════════════════
