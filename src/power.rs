//! Power sensing - USB VBUS presence and battery state of charge.
//!
//! USB presence comes from the SoftDevice's POWER SoC events (the
//! SoftDevice owns the POWER peripheral). The battery is sampled on
//! P0.04 through a resistor divider every `BATTERY_SAMPLE_SECS`.

use defmt::info;
use embassy_nrf::peripherals;
use embassy_nrf::saadc::{self, Saadc};
use embassy_time::{Duration, Timer};
use kbd_status::config::BATTERY_SAMPLE_SECS;
use kbd_status::status::battery::{millivolts_from_raw, percent_from_millivolts};
use kbd_status::StatusEvent;
use nrf_softdevice::{raw, SocEvent};

use crate::ble::{self, Server};
use crate::{notify, Irqs, STATUS};

/// VBUSDETECT bit of POWER.USBREGSTATUS.
const USBREGSTATUS_VBUSDETECT: u32 = 1;

/// Ask the SoftDevice for USB detect/remove events and latch the
/// current VBUS state.
pub fn enable_usb_events() {
    let mut regstatus: u32 = 0;
    unsafe {
        raw::sd_power_usbdetected_enable(1);
        raw::sd_power_usbremoved_enable(1);
        raw::sd_power_usbregstatus_get(&mut regstatus);
    }
    let powered = regstatus & USBREGSTATUS_VBUSDETECT != 0;
    info!("Power: usb_powered={} at boot", powered);
    STATUS.set_usb_powered(powered);
}

/// SoftDevice SoC event hook.
pub fn on_soc_event(event: SocEvent) {
    let powered = match event {
        SocEvent::PowerUsbDetected => true,
        SocEvent::PowerUsbRemoved => false,
        _ => return,
    };
    if STATUS.set_usb_powered(powered) {
        info!("Power: usb_powered={}", powered);
        notify(StatusEvent::ConnectionChanged);
    }
}

/// Single-channel SAADC on the battery sense pin.
pub fn init_battery_adc(
    adc: peripherals::SAADC,
    pin: peripherals::P0_04,
) -> Saadc<'static, 1> {
    let channel = saadc::ChannelConfig::single_ended(pin);
    Saadc::new(adc, Irqs, saadc::Config::default(), [channel])
}

#[embassy_executor::task]
pub async fn battery_task(mut adc: Saadc<'static, 1>, server: &'static Server) -> ! {
    adc.calibrate().await;
    let mut sample = [0i16; 1];

    loop {
        adc.sample(&mut sample).await;
        let mv = millivolts_from_raw(sample[0]);
        let percent = percent_from_millivolts(mv);

        if STATUS.set_battery_percent(percent) {
            info!("Battery: {} mV ({}%)", mv, percent);
            notify(StatusEvent::BatteryChanged);
            ble::publish_battery(server, percent);
        }

        Timer::after(Duration::from_secs(BATTERY_SAMPLE_SECS)).await;
    }
}
