use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub reservation: ReservationConfig,
    #[serde(default)]
    pub events: EventsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReservationConfig {
    #[serde(default = "default_seat_count")]
    pub seat_count: u32,
    #[serde(default = "default_lease_duration_ms")]
    pub lease_duration_ms: u64,
    #[serde(default = "default_sweep_interval_ms")]
    pub sweep_interval_ms: u64,
    /// Slack added to each per-claim timer so it never fires ahead of the deadline
    #[serde(default = "default_expiry_grace_ms")]
    pub expiry_grace_ms: u64,
    #[serde(default = "default_per_claim_timers")]
    pub per_claim_timers: bool,
}

impl ReservationConfig {
    pub fn lease_duration(&self) -> Duration {
        Duration::from_millis(self.lease_duration_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    pub fn expiry_grace(&self) -> Duration {
        Duration::from_millis(self.expiry_grace_ms)
    }
}

impl Default for ReservationConfig {
    fn default() -> Self {
        Self {
            seat_count: default_seat_count(),
            lease_duration_ms: default_lease_duration_ms(),
            sweep_interval_ms: default_sweep_interval_ms(),
            expiry_grace_ms: default_expiry_grace_ms(),
            per_claim_timers: default_per_claim_timers(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EventsConfig {
    /// Capacity of the seat event broadcast channel
    #[serde(default = "default_event_buffer")]
    pub buffer: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self { buffer: default_event_buffer() }
    }
}

fn default_port() -> u16 { 3000 }
fn default_seat_count() -> u32 { 50 }
fn default_lease_duration_ms() -> u64 { 60_000 }
fn default_sweep_interval_ms() -> u64 { 5_000 }
fn default_expiry_grace_ms() -> u64 { 5 }
fn default_per_claim_timers() -> bool { true }
fn default_event_buffer() -> usize { 100 }

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Every key has a default, so even the base file is optional
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `SEATLOCK__RESERVATION__LEASE_DURATION_MS=5000`
            .add_source(config::Environment::with_prefix("SEATLOCK").separator("__"))
            .build()?;

        let config: Config = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let r = &self.reservation;
        if r.seat_count == 0 {
            return Err(config::ConfigError::Message("reservation.seat_count must be at least 1".into()));
        }
        if r.lease_duration_ms == 0 {
            return Err(config::ConfigError::Message("reservation.lease_duration_ms must be positive".into()));
        }
        if r.sweep_interval_ms == 0 {
            return Err(config::ConfigError::Message("reservation.sweep_interval_ms must be positive".into()));
        }
        if self.events.buffer == 0 {
            return Err(config::ConfigError::Message("events.buffer must be at least 1".into()));
        }
        Ok(())
    }
}
