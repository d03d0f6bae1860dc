//! Bluetooth Low Energy subsystem.
//!
//! This module drives the Nordic SoftDevice S140 in **Peripheral** role:
//!
//! 1. **SoftDevice runner** - services the stack and forwards SoC
//!    (power) events to the power module.
//! 2. **Advertiser** - advertises the Battery Service (0x180F) and
//!    accepts one central at a time.
//! 3. **Link tracking** - writes the connection state into the shared
//!    status and notifies the widget on every transition.

use core::cell::RefCell;
use core::mem;

use defmt::{debug, info, warn};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::Timer;
use kbd_status::config::BLE_DEVICE_NAME;
use kbd_status::{Error, StatusEvent};
use nrf_softdevice::ble::advertisement_builder::{
    Flag, LegacyAdvertisementBuilder, LegacyAdvertisementPayload, ServiceList, ServiceUuid16,
};
use nrf_softdevice::ble::{gatt_server, peripheral, Connection};
use nrf_softdevice::{raw, Softdevice};
use static_cell::StaticCell;

use crate::{notify, power, STATUS};

#[nrf_softdevice::gatt_service(uuid = "180f")]
pub struct BatteryService {
    #[characteristic(uuid = "2a19", read, notify)]
    battery_level: u8,
}

#[nrf_softdevice::gatt_server]
pub struct Server {
    bas: BatteryService,
}

static SERVER: StaticCell<Server> = StaticCell::new();

static ADV_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .flags(&[Flag::GeneralDiscovery, Flag::LE_Only])
    .services_16(ServiceList::Complete, &[ServiceUuid16::BATTERY])
    .full_name(BLE_DEVICE_NAME)
    .build();

static SCAN_DATA: [u8; 0] = [];

/// The connected central, if any.
static LINK: Mutex<CriticalSectionRawMutex, RefCell<Option<Connection>>> =
    Mutex::new(RefCell::new(None));

/// Bring up the SoftDevice for a single peripheral link.
pub fn enable_softdevice() -> &'static mut Softdevice {
    let config = nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: 23 }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: BLE_DEVICE_NAME.as_ptr() as _,
            current_len: BLE_DEVICE_NAME.len() as u16,
            max_len: BLE_DEVICE_NAME.len() as u16,
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    };
    Softdevice::enable(&config)
}

/// Register the GATT server. Must run before the SoftDevice task starts.
pub fn init_server(sd: &mut Softdevice) -> Result<&'static Server, Error> {
    let server = Server::new(sd).map_err(|_| Error::BleNotAvailable)?;
    Ok(SERVER.init(server))
}

#[embassy_executor::task]
pub async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run_with_callback(power::on_soc_event).await
}

/// Mirror the measured battery level into the Battery Level characteristic
/// and notify the connected central.
pub fn publish_battery(server: &Server, percent: u8) {
    if server.bas.battery_level_set(&percent).is_err() {
        warn!("BLE: {}", Error::Gatt);
    }

    let Some(conn) = LINK.lock(|link| link.borrow().clone()) else {
        return;
    };
    // Fails until the central enables notifications.
    if server.bas.battery_level_notify(&conn, &percent).is_err() {
        debug!("BLE: battery notify skipped");
    }
}

async fn advertise(sd: &'static Softdevice) -> Result<Connection, Error> {
    let config = peripheral::Config::default();
    let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
        adv_data: &ADV_DATA,
        scan_data: &SCAN_DATA,
    };
    peripheral::advertise_connectable(sd, adv, &config)
        .await
        .map_err(|_| Error::Advertise)
}

fn set_link(connected: bool) {
    if STATUS.set_ble_connected(connected) {
        info!("BLE: connected={}", connected);
        notify(StatusEvent::ConnectionChanged);
    }
}

#[embassy_executor::task]
pub async fn peripheral_task(sd: &'static Softdevice, server: &'static Server) -> ! {
    publish_battery(server, STATUS.battery_percent());

    loop {
        let conn = match advertise(sd).await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("BLE: {}", e);
                Timer::after_secs(1).await;
                continue;
            }
        };

        LINK.lock(|link| *link.borrow_mut() = Some(conn.clone()));
        set_link(true);
        // Runs until the central disconnects.
        let _ = gatt_server::run(&conn, server, |_| {}).await;
        LINK.lock(|link| *link.borrow_mut() = None);
        set_link(false);
    }
}
