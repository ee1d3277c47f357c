//! # Time Sync Task
//! Keeps the RTC on UTC using a time API reached over wifi.
//!
//! The task joins the network, asks the time API for the current unix time, writes it to
//! the RTC and leaves the network again. It repeats every few hours, and after a short
//! pause when anything fails. Until the first sync succeeds the RTC is not running and the
//! control loop shows that time is unavailable.
//!
//! # populate constants SSID and PASSWORD
//! `config/wifi_config.json`:
//! ```json
//! {
//!     "ssid": "some_ssid_here",
//!     "password": "some_password_here"
//! }
//! ```
//!
//! # populate constant TIME_SERVER_URL
//! `config/time_api.json`; the answer must carry a `unixtime` field:
//! ```json
//! {
//!     "baseurl": "http://worldtimeapi.org/api",
//!     "path": "/timezone/Etc/UTC"
//! }
//! ```
//! The timezone is not taken from the API, it is set on the device.

include!(concat!(env!("OUT_DIR"), "/wifi_secrets.rs"));
include!(concat!(env!("OUT_DIR"), "/time_api_config.rs"));

use crate::task::clock::set_utc;
use crate::task::resources::{Irqs, WifiResources};
use cyw43::JoinOptions;
use cyw43_pio::{DEFAULT_CLOCK_DIVIDER, PioSpi};
use defmt::{Debug2Format, Format, error, info, unwrap, warn};
use embassy_executor::Spawner;
use embassy_net::{
    Config, DhcpConfig, Stack, StackResources, dns,
    tcp::client::{TcpClient, TcpClientState},
};
use embassy_rp::clocks::RoscRng;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{DMA_CH0, PIO0};
use embassy_rp::pio::Pio;
use embassy_time::{Duration, Timer, with_timeout};
use rand::RngCore;
use reqwless::client::HttpClient;
use reqwless::request::Method;
use serde::Deserialize;
use static_cell::StaticCell;

/// Pause between two successful syncs
const REFRESH_AFTER: Duration = Duration::from_secs(6 * 60 * 60);

/// Pause after a failed attempt
const RETRY_AFTER: Duration = Duration::from_secs(30);

/// Limit for joining the network
const JOIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Limit for getting an address by DHCP
const DHCP_TIMEOUT: Duration = Duration::from_secs(10);

/// Why a sync attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
enum SyncError {
    /// Joining the network timed out
    JoinTimeout,
    /// The access point refused the join
    JoinFailed,
    /// No DHCP lease in time
    DhcpTimeout,
    /// The HTTP request could not be made or sent
    Request,
    /// The body was not the expected JSON
    Parse,
    /// The RTC refused the time
    Rtc,
}

/// The part of the API answer we use
#[derive(Deserialize)]
struct ApiResponse {
    unixtime: i64,
}

#[embassy_executor::task]
async fn cyw43_task(
    runner: cyw43::Runner<'static, Output<'static>, PioSpi<'static, PIO0, 0, DMA_CH0>>,
) -> ! {
    runner.run().await
}

#[embassy_executor::task]
async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}

#[embassy_executor::task]
pub async fn time_sync(spawner: Spawner, r: WifiResources) {
    info!("Time sync task started");

    let pwr = Output::new(r.pwr_pin, Level::Low);
    let cs = Output::new(r.cs_pin, Level::High);
    let mut pio = Pio::new(r.pio_sm, Irqs);
    let spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        r.dio_pin,
        r.clk_pin,
        r.dma_ch,
    );

    // the wifi firmware is flashed separately, see README
    let fw = unsafe { core::slice::from_raw_parts(0x1010_0000 as *const u8, 230_321) };
    let clm = unsafe { core::slice::from_raw_parts(0x1014_0000 as *const u8, 4752) };

    static STATE: StaticCell<cyw43::State> = StaticCell::new();
    let state = STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, fw).await;
    unwrap!(spawner.spawn(cyw43_task(runner)));

    control.init(clm).await;
    control
        .set_power_management(cyw43::PowerManagementMode::PowerSave)
        .await;

    let mut dhcp = DhcpConfig::default();
    dhcp.hostname = "medibox".try_into().ok();
    let config = Config::dhcpv4(dhcp);

    let seed = RoscRng.next_u64();

    static RESOURCES: StaticCell<StackResources<5>> = StaticCell::new();
    let (stack, runner) = embassy_net::new(
        net_device,
        config,
        RESOURCES.init(StackResources::<5>::new()),
        seed,
    );
    unwrap!(spawner.spawn(net_task(runner)));

    loop {
        let result = sync_once(&mut control, stack).await;
        control.leave().await;

        let pause = match result {
            Ok(unix) => {
                info!("RTC set to unix time {}", unix);
                REFRESH_AFTER
            }
            Err(e) => {
                error!(
                    "time sync failed: {}, retrying in {} s",
                    e,
                    RETRY_AFTER.as_secs()
                );
                RETRY_AFTER
            }
        };
        Timer::after(pause).await;
    }
}

/// Join, fetch the time and write it to the RTC. The caller leaves the network.
async fn sync_once(
    control: &mut cyw43::Control<'static>,
    stack: Stack<'static>,
) -> Result<i64, SyncError> {
    info!("Joining network {}", SSID);
    let join = control.join(SSID, JoinOptions::new(PASSWORD.as_bytes()));
    match with_timeout(JOIN_TIMEOUT, join).await {
        Ok(Ok(())) => info!("Connected to wifi"),
        Ok(Err(e)) => {
            warn!("join failed: {}", Debug2Format(&e));
            return Err(SyncError::JoinFailed);
        }
        Err(_) => return Err(SyncError::JoinTimeout),
    }

    with_timeout(DHCP_TIMEOUT, stack.wait_config_up())
        .await
        .map_err(|_| SyncError::DhcpTimeout)?;

    let unix = fetch_unix_time(stack).await?;
    set_utc(unix).await.map_err(|e| {
        warn!("RTC rejected time: {}", Debug2Format(&e));
        SyncError::Rtc
    })?;
    Ok(unix)
}

/// GET the time API and read `unixtime` from the answer
async fn fetch_unix_time(stack: Stack<'static>) -> Result<i64, SyncError> {
    let mut rx_buffer = [0; 4096];

    let client_state = TcpClientState::<1, 1024, 1024>::new();
    let tcp_client = TcpClient::new(stack, &client_state);
    let dns_client = dns::DnsSocket::new(stack);
    let mut http_client = HttpClient::new(&tcp_client, &dns_client);

    let mut request = http_client
        .request(Method::GET, TIME_SERVER_URL)
        .await
        .map_err(|e| {
            warn!("request failed: {}", Debug2Format(&e));
            SyncError::Request
        })?;
    let response = request.send(&mut rx_buffer).await.map_err(|e| {
        warn!("send failed: {}", Debug2Format(&e));
        SyncError::Request
    })?;
    let body = response.body().read_to_end().await.map_err(|e| {
        warn!("reading body failed: {}", Debug2Format(&e));
        SyncError::Request
    })?;

    let (parsed, _used) = serde_json_core::de::from_slice::<ApiResponse>(body).map_err(|e| {
        warn!("unexpected body: {}", Debug2Format(&e));
        SyncError::Parse
    })?;
    Ok(parsed.unixtime)
}
