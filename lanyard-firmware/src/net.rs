//! Network collaborators
//!
//! - [`HttpVersionSource`]: GET of the remote version descriptor (reqwless)
//! - [`SntpClock`]: wall clock set from an SNTP server (sntpc)
//!
//! Both expect the connectivity gate to have brought the link up first.

use core::net::{IpAddr, SocketAddr};

use defmt::*;
use embassy_net::dns::{DnsQueryType, DnsSocket};
use embassy_net::tcp::client::{TcpClient, TcpClientState};
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::Stack;
use embassy_time::{with_timeout, Duration, Instant};
use heapless::String;
use lanyard_hal::{Clock, ClockError, FetchError, VersionSource};
use portable_atomic::{AtomicU64, Ordering};
use reqwless::client::HttpClient;
use reqwless::request::Method;
use sntpc::{get_time, NtpContext, NtpTimestampGenerator};

/// Longest accepted version URL
pub const MAX_URL_LEN: usize = 96;

/// Buffer for response headers plus body
const HTTP_RX_LEN: usize = 2048;

/// Concurrent sockets, TX and RX buffer sizes for the HTTP client
pub type HttpState = TcpClientState<1, 1024, 1024>;

const NTP_SERVER: &str = "pool.ntp.org";
const NTP_PORT: u16 = 123;
const NTP_LOCAL_PORT: u16 = 50123;
const NTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Unix seconds at boot, 0 while unset
static UNIX_AT_BOOT: AtomicU64 = AtomicU64::new(0);

/// Current Unix time, 0 if the clock was never set
pub fn unix_time() -> u64 {
    match UNIX_AT_BOOT.load(Ordering::Relaxed) {
        0 => 0,
        base => base + Instant::now().as_secs(),
    }
}

/// Remote version descriptor over plain HTTP
pub struct HttpVersionSource {
    stack: Stack<'static>,
    state: &'static HttpState,
    url: String<MAX_URL_LEN>,
}

impl HttpVersionSource {
    pub fn new(stack: Stack<'static>, state: &'static HttpState, url: String<MAX_URL_LEN>) -> Self {
        Self { stack, state, url }
    }
}

impl VersionSource for HttpVersionSource {
    async fn fetch(&mut self, buffer: &mut [u8]) -> Result<usize, FetchError> {
        let tcp = TcpClient::new(self.stack, self.state);
        let dns = DnsSocket::new(self.stack);
        let mut client = HttpClient::new(&tcp, &dns);

        let mut rx = [0u8; HTTP_RX_LEN];
        let mut request = client
            .request(Method::GET, self.url.as_str())
            .await
            .map_err(|e| {
                warn!("Version request to {} failed: {:?}", self.url.as_str(), e);
                FetchError::Connect
            })?;
        let response = request.send(&mut rx).await.map_err(|e| {
            warn!("Version request failed: {:?}", e);
            FetchError::Transfer
        })?;

        let status = response.status;
        if !status.is_successful() {
            return Err(FetchError::Status(status.0));
        }

        let body = response.body().read_to_end().await.map_err(|e| match e {
            reqwless::Error::BufferTooSmall => FetchError::TooLarge,
            _ => FetchError::Transfer,
        })?;
        if body.len() > buffer.len() {
            return Err(FetchError::TooLarge);
        }
        buffer[..body.len()].copy_from_slice(body);
        debug!("Version descriptor: {} bytes", body.len());
        Ok(body.len())
    }
}

/// Unix seconds at boot given a server time and the uptime it was read at
fn boot_epoch(server_secs: u64, uptime_secs: u64) -> u64 {
    server_secs.saturating_sub(uptime_secs)
}

/// Local transmit timestamps for SNTP, from our current idea of Unix time
#[derive(Debug, Clone, Copy, Default)]
struct UptimeStamp {
    micros: u64,
}

impl NtpTimestampGenerator for UptimeStamp {
    fn init(&mut self) {
        let uptime = Instant::now().as_micros();
        self.micros = UNIX_AT_BOOT.load(Ordering::Relaxed) * 1_000_000 + uptime;
    }

    fn timestamp_sec(&self) -> u64 {
        self.micros / 1_000_000
    }

    fn timestamp_subsec_micros(&self) -> u32 {
        (self.micros % 1_000_000) as u32
    }
}

/// SNTP-backed [`Clock`]
pub struct SntpClock {
    stack: Stack<'static>,
}

impl SntpClock {
    pub fn new(stack: Stack<'static>) -> Self {
        Self { stack }
    }

    async fn query(&mut self) -> Result<u64, ClockError> {
        let server = self
            .stack
            .dns_query(NTP_SERVER, DnsQueryType::A)
            .await
            .ok()
            .and_then(|addrs| addrs.first().copied())
            .ok_or(ClockError::Network)?;

        let mut rx_meta = [PacketMetadata::EMPTY; 1];
        let mut tx_meta = [PacketMetadata::EMPTY; 1];
        let mut rx_buf = [0u8; 128];
        let mut tx_buf = [0u8; 128];
        let mut socket = UdpSocket::new(
            self.stack,
            &mut rx_meta,
            &mut rx_buf,
            &mut tx_meta,
            &mut tx_buf,
        );
        socket.bind(NTP_LOCAL_PORT).map_err(|_| ClockError::Network)?;

        let addr = SocketAddr::new(IpAddr::from(server), NTP_PORT);
        let context = NtpContext::new(UptimeStamp::default());
        let time = with_timeout(NTP_TIMEOUT, get_time(addr, &socket, context))
            .await
            .map_err(|_| ClockError::Network)?
            .map_err(|e| {
                warn!("SNTP exchange failed: {}", Debug2Format(&e));
                ClockError::InvalidResponse
            })?;

        Ok(u64::from(time.sec()))
    }
}

impl Clock for SntpClock {
    fn unix_time(&mut self) -> u64 {
        unix_time()
    }

    async fn sync(&mut self) -> Result<(), ClockError> {
        let now = self.query().await?;
        UNIX_AT_BOOT.store(boot_epoch(now, Instant::now().as_secs()), Ordering::Relaxed);
        info!("Clock set to {}", now);
        Ok(())
    }
}
