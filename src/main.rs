//! kbd-status firmware for nRF52840.
//!
//! Drives the 128×64 SSD1306 status screen of a wireless keyboard:
//! link glyph, date, battery glyph and an uptime clock.
//!
//! # Tasks
//!
//! - **main**: owns the scene and the widget; sleeps until the clock
//!   deadline or a status event, refreshes, then flushes if dirty
//! - **softdevice**: runs the SoftDevice and turns USB power SoC events
//!   into connection notifications
//! - **ble**: advertises the Battery Service and tracks the link
//! - **battery**: samples the cell voltage over SAADC

#![no_std]
#![no_main]

mod ble;
mod display;
mod power;

use defmt::{info, unwrap, warn};
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_nrf::interrupt::{self, InterruptExt, Priority};
use embassy_nrf::{bind_interrupts, peripherals, saadc, twim};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Instant, Timer};
use embedded_graphics::geometry::Size;
use kbd_status::config::{SCENE_CAPACITY, SCREEN_HEIGHT, SCREEN_WIDTH, STATUS_EVENT_QUEUE};
use kbd_status::{Scene, SharedStatus, StatusEvent, StatusSource, StatusWidget};
use {defmt_rtt as _, panic_probe as _};

bind_interrupts!(pub struct Irqs {
    SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0 => twim::InterruptHandler<peripherals::TWISPI0>;
    SAADC => saadc::InterruptHandler;
});

/// Link and battery state written by the driver tasks.
pub static STATUS: SharedStatus = SharedStatus::new();

/// Change notifications for the widget task.
static STATUS_EVENTS: Channel<CriticalSectionRawMutex, StatusEvent, STATUS_EVENT_QUEUE> =
    Channel::new();

/// Queue a notification without blocking. A full queue already holds
/// refreshes that will read the latest state.
pub fn notify(event: StatusEvent) {
    if STATUS_EVENTS.try_send(event).is_err() {
        warn!("Status queue full, dropped {}", event);
    }
}

/// Live state as seen by the widget.
struct LiveStatus;

impl StatusSource for LiveStatus {
    fn usb_powered(&self) -> bool {
        STATUS.usb_powered()
    }

    fn ble_connected(&self) -> bool {
        STATUS.ble_connected()
    }

    fn battery_percent(&self) -> u8 {
        STATUS.battery_percent()
    }

    fn uptime_millis(&self) -> i64 {
        Instant::now().as_millis() as i64
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("kbd-status starting");

    // SoftDevice reserves priorities 0, 1 and 4.
    let mut config = embassy_nrf::config::Config::default();
    config.gpiote_interrupt_priority = Priority::P2;
    config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(config);

    let sd = ble::enable_softdevice();
    let server = unwrap!(ble::init_server(sd));
    power::enable_usb_events();
    let sd = &*sd;

    unwrap!(spawner.spawn(ble::softdevice_task(sd)));
    unwrap!(spawner.spawn(ble::peripheral_task(sd, server)));

    // Driver constructors enable their IRQs at P0, which the SoftDevice owns.
    interrupt::SAADC.set_priority(Priority::P3);
    interrupt::SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0.set_priority(Priority::P3);

    let adc = power::init_battery_adc(p.SAADC, p.P0_04);
    unwrap!(spawner.spawn(power::battery_task(adc, server)));

    let i2c = twim::Twim::new(p.TWISPI0, Irqs, p.P0_26, p.P0_27, twim::Config::default());
    let mut oled = match display::init(i2c) {
        Ok(oled) => oled,
        Err(e) => {
            warn!("Display init failed: {}", e);
            loop {
                Timer::after_secs(60).await;
            }
        }
    };

    let mut scene: Scene<SCENE_CAPACITY> = Scene::new(Size::new(SCREEN_WIDTH, SCREEN_HEIGHT));
    let mut widget = StatusWidget::new();
    let root = scene.root();
    if widget.initialize(&mut scene, root, &LiveStatus).is_none() {
        warn!("Status widget could not be created");
    }

    loop {
        if let Err(e) = display::present(&mut oled, &mut scene) {
            warn!("Display flush failed: {}", e);
        }

        let deadline = widget
            .next_deadline()
            .map(Instant::from_millis)
            .unwrap_or(Instant::MAX);

        match select(Timer::at(deadline), STATUS_EVENTS.receive()).await {
            Either::First(()) => {
                widget.poll(&mut scene, &LiveStatus);
            }
            Either::Second(event) => {
                widget.handle(event, &mut scene, &LiveStatus);
            }
        }
    }
}
