//! In-memory doubles for the hardware traits and service sources

use core::cell::Cell;
use std::string::String;
use std::vec::Vec;

use embedded_hal_async::delay::DelayNs;
use lanyard_hal::{
    Canvas, CanvasError, Clock, ClockError, ConfigStore, FetchError, Font, Monotonic, PowerSense,
    Radio, Refresh, StoreError, VersionSource,
};

use crate::services::registry::MAX_ENTRIES;
use crate::services::{EntryPoints, Fault, LoadError, Service, ServiceName, ServiceSource};

/// Configuration store backed by a vector
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Vec<(String, String, Vec<u8>)>,
    failing: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, namespace: &str, key: &str, value: &[u8]) {
        self.entries
            .retain(|(ns, k, _)| !(ns == namespace && k == key));
        self.entries
            .push((namespace.into(), key.into(), value.to_vec()));
    }

    /// Make every read fail with a storage error
    pub fn fail_reads(&mut self, failing: bool) {
        self.failing = failing;
    }

    pub fn raw(&self, namespace: &str, key: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(ns, k, _)| ns == namespace && k == key)
            .map(|(_, _, v)| v.as_slice())
    }
}

impl ConfigStore for MemoryStore {
    async fn read(
        &mut self,
        namespace: &str,
        key: &str,
        buffer: &mut [u8],
    ) -> Result<usize, StoreError> {
        if self.failing {
            return Err(StoreError::Storage);
        }
        let value = self.raw(namespace, key).ok_or(StoreError::NotFound)?;
        if value.len() > buffer.len() {
            return Err(StoreError::BufferTooSmall);
        }
        buffer[..value.len()].copy_from_slice(value);
        Ok(value.len())
    }

    async fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StoreError> {
        self.insert(namespace, key, data);
        Ok(())
    }
}

/// Radio whose link comes up after a scripted number of polls
#[derive(Debug, Default)]
pub struct ScriptedRadio {
    connect_after: Option<u32>,
    reject: bool,
    stall: bool,
    active: bool,
    connecting: bool,
    connected: bool,
    polls: u32,
    pub connect_calls: u32,
    pub last_ssid: String,
    pub last_had_password: bool,
}

impl ScriptedRadio {
    /// Link never comes up
    pub fn never() -> Self {
        Self::default()
    }

    /// Link is up on poll `polls + 1` after connecting
    pub fn after_polls(polls: u32) -> Self {
        Self {
            connect_after: Some(polls),
            ..Self::default()
        }
    }

    /// Join never finishes, like an access point that stays silent
    pub fn stalling() -> Self {
        Self {
            stall: true,
            ..Self::default()
        }
    }

    /// Connection attempts fail to start
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }
}

impl Radio for ScriptedRadio {
    type Error = ();

    async fn set_active(&mut self, active: bool) {
        self.active = active;
        if !active {
            self.connecting = false;
            self.connected = false;
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }

    async fn connect(&mut self, ssid: &str, password: Option<&str>) -> Result<(), ()> {
        self.connect_calls += 1;
        self.last_ssid = ssid.into();
        self.last_had_password = password.is_some();
        if self.reject || !self.active {
            return Err(());
        }
        if self.stall {
            core::future::pending::<()>().await;
        }
        self.connecting = true;
        self.polls = 0;
        Ok(())
    }

    fn is_connected(&mut self) -> bool {
        if self.connecting && !self.connected {
            self.polls += 1;
            if matches!(self.connect_after, Some(after) if self.polls > after) {
                self.connected = true;
                self.connecting = false;
            }
        }
        self.connected
    }
}

/// Delay that only counts
#[derive(Debug, Default)]
pub struct CountingDelay {
    pub calls: u32,
    pub total_ms: u64,
}

impl CountingDelay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DelayNs for CountingDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.calls += 1;
        self.total_ms += u64::from(ns) / 1_000_000;
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.calls += 1;
        self.total_ms += u64::from(ms);
    }
}

/// Fixed power readings
#[derive(Debug)]
pub struct FakePower {
    battery_mv: u16,
    external_mv: u16,
    charging: bool,
    pub external_reads: u32,
}

impl FakePower {
    pub fn new(battery_mv: u16, external_mv: u16, charging: bool) -> Self {
        Self {
            battery_mv,
            external_mv,
            charging,
            external_reads: 0,
        }
    }
}

impl PowerSense for FakePower {
    fn battery_millivolts(&mut self) -> u16 {
        self.battery_mv
    }

    fn external_millivolts(&mut self) -> u16 {
        self.external_reads += 1;
        self.external_mv
    }

    fn is_charging(&mut self) -> bool {
        self.charging
    }
}

/// Version endpoint with a canned reply
#[derive(Debug)]
pub struct FixedVersion {
    reply: Result<Vec<u8>, FetchError>,
    pub fetches: u32,
}

impl FixedVersion {
    pub fn body(body: &[u8]) -> Self {
        Self {
            reply: Ok(body.to_vec()),
            fetches: 0,
        }
    }

    pub fn failing(error: FetchError) -> Self {
        Self {
            reply: Err(error),
            fetches: 0,
        }
    }
}

impl VersionSource for FixedVersion {
    async fn fetch(&mut self, buffer: &mut [u8]) -> Result<usize, FetchError> {
        self.fetches += 1;
        let body = self.reply.as_ref().map_err(|e| *e)?;
        if body.len() > buffer.len() {
            return Err(FetchError::TooLarge);
        }
        buffer[..body.len()].copy_from_slice(body);
        Ok(body.len())
    }
}

/// Hand-driven monotonic and wall clock
#[derive(Debug)]
pub struct ManualClock {
    now_ms: Cell<u64>,
    unix: Cell<u64>,
    sync_to: Option<u64>,
    pub sync_calls: u32,
}

impl ManualClock {
    pub fn new(now_ms: u64) -> Self {
        Self {
            now_ms: Cell::new(now_ms),
            unix: Cell::new(0),
            sync_to: None,
            sync_calls: 0,
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }

    pub fn set_unix(&self, seconds: u64) {
        self.unix.set(seconds);
    }

    /// Make `sync` succeed and set the wall clock to `seconds`
    pub fn sync_to(&mut self, seconds: u64) {
        self.sync_to = Some(seconds);
    }
}

impl Monotonic for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }
}

impl Clock for ManualClock {
    fn unix_time(&mut self) -> u64 {
        self.unix.get()
    }

    async fn sync(&mut self) -> Result<(), ClockError> {
        self.sync_calls += 1;
        let seconds = self.sync_to.ok_or(ClockError::Network)?;
        self.unix.set(seconds);
        Ok(())
    }
}

/// A recorded drawing call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Clear,
    Text(i32, i32, String, Font),
    Outline(i32, i32, u32, u32),
    Fill(i32, i32, u32, u32),
    Flush(Refresh),
}

impl Op {
    pub fn text(x: i32, y: i32, text: &str, font: Font) -> Self {
        Op::Text(x, y, text.into(), font)
    }
}

/// Canvas that records every call
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub ops: Vec<Op>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Text(_, _, text, _) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Position and font of the first occurrence of `needle`
    pub fn text_at(&self, needle: &str) -> Option<(i32, i32, Font)> {
        self.ops.iter().find_map(|op| match op {
            Op::Text(x, y, text, font) if text == needle => Some((*x, *y, *font)),
            _ => None,
        })
    }

    pub fn flushes(&self) -> Vec<Refresh> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Flush(refresh) => Some(*refresh),
                _ => None,
            })
            .collect()
    }
}

impl Canvas for RecordingCanvas {
    fn clear(&mut self) {
        self.ops.push(Op::Clear);
    }

    fn text(&mut self, x: i32, y: i32, text: &str, font: Font) {
        self.ops.push(Op::text(x, y, text, font));
    }

    fn text_width(&self, text: &str, font: Font) -> u32 {
        let advance = match font {
            Font::Small => 6,
            Font::Regular => 9,
            Font::Title => 12,
            Font::Large => 20,
        };
        text.chars().count() as u32 * advance
    }

    fn outline(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.ops.push(Op::Outline(x, y, width, height));
    }

    fn fill(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.ops.push(Op::Fill(x, y, width, height));
    }

    fn flush(&mut self, refresh: Refresh) -> Result<(), CanvasError> {
        self.ops.push(Op::Flush(refresh));
        Ok(())
    }

    fn width(&self) -> u32 {
        296
    }
}

/// Service with scripted behaviour and call counters
#[derive(Debug, Clone)]
pub struct ScriptedService {
    label: String,
    entry_points: EntryPoints,
    setup_fault: Option<Fault>,
    loop_fault: Option<Fault>,
    stay_awake: bool,
    draw_result: Result<i32, Fault>,
    pub setup_calls: u32,
    pub loop_calls: u32,
    pub last_countdown: Option<i16>,
    pub last_origin: Option<(i32, i32)>,
}

impl ScriptedService {
    pub fn new(entry_points: EntryPoints) -> Self {
        Self {
            label: String::new(),
            entry_points,
            setup_fault: None,
            loop_fault: None,
            stay_awake: false,
            draw_result: Ok(0),
            setup_calls: 0,
            loop_calls: 0,
            last_countdown: None,
            last_origin: None,
        }
    }

    pub fn failing_setup(mut self, fault: Fault) -> Self {
        self.setup_fault = Some(fault);
        self
    }

    pub fn failing_loop(mut self, fault: Fault) -> Self {
        self.loop_fault = Some(fault);
        self
    }

    pub fn staying_awake(mut self) -> Self {
        self.stay_awake = true;
        self
    }

    pub fn drawing(mut self, height: i32) -> Self {
        self.draw_result = Ok(height);
        self
    }

    pub fn failing_draw(mut self, fault: Fault) -> Self {
        self.draw_result = Err(fault);
        self
    }
}

impl Service for ScriptedService {
    fn setup(&mut self) -> Result<(), Fault> {
        self.setup_calls += 1;
        self.setup_fault.map_or(Ok(()), Err)
    }

    fn entry_points(&self) -> EntryPoints {
        self.entry_points
    }

    fn run_loop(&mut self, sleep_countdown: i16) -> Result<bool, Fault> {
        self.loop_calls += 1;
        self.last_countdown = Some(sleep_countdown);
        self.loop_fault.map_or(Ok(self.stay_awake), Err)
    }

    fn draw<C: Canvas>(&mut self, canvas: &mut C, x: i32, y: i32) -> Result<i32, Fault> {
        self.last_origin = Some((x, y));
        canvas.text(x, y, &self.label, Font::Small);
        self.draw_result
    }
}

struct SourceEntry {
    name: String,
    manifest: Option<String>,
    service: Option<ScriptedService>,
}

/// Service source listing scripted entries in insertion order
#[derive(Default)]
pub struct ScriptedSource {
    entries: Vec<SourceEntry>,
    root_missing: bool,
    pub loads: Vec<String>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn missing_root() -> Self {
        Self {
            root_missing: true,
            ..Self::default()
        }
    }

    pub fn with(self, name: &str, manifest: &str, service: ScriptedService) -> Self {
        self.entry(name, Some(manifest), Some(service))
    }

    pub fn without_code(self, name: &str, manifest: &str) -> Self {
        self.entry(name, Some(manifest), None)
    }

    pub fn without_manifest(self, name: &str, service: ScriptedService) -> Self {
        self.entry(name, None, Some(service))
    }

    fn entry(
        mut self,
        name: &str,
        manifest: Option<&str>,
        service: Option<ScriptedService>,
    ) -> Self {
        self.entries.push(SourceEntry {
            name: name.into(),
            manifest: manifest.map(Into::into),
            service,
        });
        self
    }

    fn find(&self, name: &str) -> Option<&SourceEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

impl ServiceSource for ScriptedSource {
    type Service = ScriptedService;

    fn list(&mut self) -> Result<heapless::Vec<ServiceName, MAX_ENTRIES>, LoadError> {
        if self.root_missing {
            return Err(LoadError::RootMissing);
        }
        Ok(self
            .entries
            .iter()
            .map(|e| ServiceName::try_from(e.name.as_str()).unwrap())
            .collect())
    }

    fn manifest(&mut self, name: &str, buffer: &mut [u8]) -> Result<usize, LoadError> {
        let manifest = self
            .find(name)
            .and_then(|e| e.manifest.as_ref())
            .ok_or(LoadError::NotFound)?;
        if manifest.len() > buffer.len() {
            return Err(LoadError::TooLarge);
        }
        buffer[..manifest.len()].copy_from_slice(manifest.as_bytes());
        Ok(manifest.len())
    }

    fn load(&mut self, name: &str) -> Result<ScriptedService, LoadError> {
        self.loads.push(name.into());
        let mut service = self
            .find(name)
            .and_then(|e| e.service.clone())
            .ok_or(LoadError::NotFound)?;
        service.label = name.into();
        Ok(service)
    }
}

/// Manifest JSON for API version 1
pub fn manifest(wifi_setup: bool, run_loop: bool, draw: bool) -> String {
    std::format!(
        r#"{{"apiVersion":1,"wifi":{{"setup":{},"loop":false}},"rtc":false,"loop":{},"draw":{}}}"#,
        wifi_setup,
        run_loop,
        draw
    )
}
