use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::Utc;
use tokio::{
    sync::{watch, Mutex, OwnedMutexGuard},
    task::JoinHandle,
    time,
};

use crate::{
    accessory::{last_updated_label, ReadingSubscriber},
    config::EngineConfig,
    fetch::{FetchResult, Fetcher, Measurement},
    models::PollutantReading,
};

use super::{poller::Poller, EngineState, EngineStatus};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

type Published = Option<Arc<PollutantReading>>;

/// Owns the fetch → convert → classify → publish cycle for one station.
///
/// At most one cycle runs at a time. `start()` while a cycle is in flight is
/// a no-op; `get_current()` while a cycle is in flight waits for that cycle's
/// reading instead of issuing a second request.
pub struct PollingEngine<F: Fetcher> {
    config: Arc<EngineConfig>,
    fetcher: Arc<F>,
    subscriber: Arc<dyn ReadingSubscriber>,
    state: Arc<Mutex<EngineState>>,
    cycle_gate: Arc<Mutex<()>>,
    readings: Arc<watch::Sender<Published>>,
    poller: Arc<Mutex<Option<Poller>>>,
}

impl<F: Fetcher> Clone for PollingEngine<F> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            fetcher: self.fetcher.clone(),
            subscriber: self.subscriber.clone(),
            state: self.state.clone(),
            cycle_gate: self.cycle_gate.clone(),
            readings: self.readings.clone(),
            poller: self.poller.clone(),
        }
    }
}

impl<F: Fetcher> PollingEngine<F> {
    pub fn new(config: EngineConfig, fetcher: F, subscriber: Arc<dyn ReadingSubscriber>) -> Self {
        let (readings, _) = watch::channel(None);

        log_debug!(
            "Polling is {} for station {}",
            if config.polling { "enabled" } else { "disabled" },
            config.station
        );

        Self {
            config: Arc::new(config),
            fetcher: Arc::new(fetcher),
            subscriber,
            state: Arc::new(Mutex::new(EngineState::new())),
            cycle_gate: Arc::new(Mutex::new(())),
            readings: Arc::new(readings),
            poller: Arc::new(Mutex::new(None)),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run one cycle now. Returns `None` without fetching if a cycle is
    /// already in flight.
    pub async fn start(&self) -> Option<Arc<PollutantReading>> {
        match self.cycle_gate.clone().try_lock_owned() {
            Ok(gate) => Some(self.join_cycle(self.spawn_cycle(gate)).await),
            Err(_) => {
                log_debug!("start() ignored, a fetch is already in flight");
                None
            }
        }
    }

    /// On-demand read: always a full cycle, never a cached value. Joins the
    /// in-flight cycle if there is one.
    pub async fn get_current(&self) -> Arc<PollutantReading> {
        let seen = self.latest();

        let gate = match self.cycle_gate.clone().try_lock_owned() {
            Ok(gate) => gate,
            Err(_) => {
                log_debug!("joining in-flight fetch");
                let gate = self.cycle_gate.clone().lock_owned().await;
                match self.latest() {
                    Some(joined) if !same_reading(seen.as_ref(), &joined) => return joined,
                    // The in-flight cycle had already published before we looked.
                    _ => gate,
                }
            }
        };

        self.join_cycle(self.spawn_cycle(gate)).await
    }

    /// Last published reading, if any cycle has completed.
    pub fn latest(&self) -> Option<Arc<PollutantReading>> {
        self.readings.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Published> {
        self.readings.subscribe()
    }

    pub async fn status(&self) -> EngineStatus {
        self.state.lock().await.status
    }

    pub async fn snapshot(&self) -> EngineState {
        self.state.lock().await.clone()
    }

    pub async fn is_polling(&self) -> bool {
        self.poller.lock().await.is_some()
    }

    /// Spawn the polling task when polling is configured. Without polling,
    /// nothing is scheduled and cycles only happen on request.
    pub async fn start_polling(&self) -> Result<()> {
        if !self.config.polling {
            log_debug!("polling disabled, fetching on demand only");
            return Ok(());
        }

        let mut poller = self.poller.lock().await;
        if poller.is_some() {
            bail!("polling already active");
        }

        *poller = Some(Poller::spawn(self.clone(), self.config.interval));
        Ok(())
    }

    pub async fn shutdown(&self) -> Result<()> {
        let poller = self.poller.lock().await.take();
        match poller {
            Some(poller) => poller.stop().await,
            None => Ok(()),
        }
    }

    /// The cycle runs on its own task so it always finishes and publishes,
    /// even if the caller stops waiting.
    fn spawn_cycle(&self, gate: OwnedMutexGuard<()>) -> JoinHandle<Arc<PollutantReading>> {
        let engine = self.clone();
        tokio::spawn(async move { engine.run_cycle(gate).await })
    }

    async fn join_cycle(&self, cycle: JoinHandle<Arc<PollutantReading>>) -> Arc<PollutantReading> {
        match cycle.await {
            Ok(reading) => reading,
            Err(err) => {
                log_error!("fetch cycle task failed: {err}");
                self.state.lock().await.settle();
                Arc::new(PollutantReading::inactive(self.latest().as_deref()))
            }
        }
    }

    async fn run_cycle(&self, _gate: OwnedMutexGuard<()>) -> Arc<PollutantReading> {
        self.state.lock().await.begin_fetch();

        let timeout = self.config.request_timeout;
        let fetch = self.fetcher.fetch(&self.config.station, &self.config.api_key);
        let outcome = match time::timeout(timeout, fetch).await {
            Ok(outcome) => outcome,
            Err(_) => FetchResult::TransportError(format!(
                "no response within {}ms",
                timeout.as_millis()
            )),
        };

        let reading = match outcome {
            FetchResult::Success(measurement) => {
                let reading = PollutantReading::from_measurement(&measurement);
                self.log_measurement(&measurement, &reading);
                reading
            }
            FetchResult::HttpError(status) => {
                log_error!("Response: {status}");
                PollutantReading::inactive(self.latest().as_deref())
            }
            FetchResult::TransportError(cause) => {
                log_error!("Unknown error: {cause}");
                PollutantReading::inactive(self.latest().as_deref())
            }
            FetchResult::MalformedData(reason) => {
                log_error!("Malformed response: {reason}");
                PollutantReading::inactive(self.latest().as_deref())
            }
        };

        let reading = Arc::new(reading);
        {
            let mut state = self.state.lock().await;
            state.complete(reading.active, Utc::now());
            if state.consecutive_failures > 0 {
                log_warn!(
                    "station {} inactive after {} failed cycle(s)",
                    self.config.station,
                    state.consecutive_failures
                );
            }
        }

        self.publish(&reading);
        self.state.lock().await.settle();
        reading
    }

    fn publish(&self, reading: &Arc<PollutantReading>) {
        self.readings.send_replace(Some(reading.clone()));

        let display_name = self
            .config
            .show_last_updated
            .then(|| last_updated_label(reading.observed_at));
        if let Some(name) = &display_name {
            log_debug!("change title => {name}");
        }

        self.subscriber.publish(reading, display_name.as_deref());
    }

    fn log_measurement(&self, measurement: &Measurement, reading: &PollutantReading) {
        log_debug!(
            "Time is: {}",
            measurement.record.data_time.as_deref().unwrap_or("-")
        );

        match measurement.station_name.as_deref() {
            Some(name) if name != self.config.station => {
                log_warn!(
                    "service answered for station {name}, configured {}",
                    self.config.station
                );
            }
            Some(name) => log_debug!("Station is: {name}"),
            None => log_debug!("Station name missing from response"),
        }

        match reading.aqi_index {
            Some(index) => log_debug!("Current aqi value is: {index}, grade {}", reading.grade),
            None => log_info!("composite index not reported, grade unknown"),
        }

        let fields = [
            ("PM10", reading.pm10),
            ("PM25", reading.pm25),
            ("Ozone", reading.ozone),
            ("NO2", reading.nitrogen_dioxide),
            ("SO2", reading.sulphur_dioxide),
            ("CO", reading.carbon_monoxide),
        ];
        for (label, value) in fields {
            if let Some(value) = value {
                log_debug!("Current {label} density is: {value}");
            }
        }
    }
}

fn same_reading(seen: Option<&Arc<PollutantReading>>, current: &Arc<PollutantReading>) -> bool {
    seen.is_some_and(|seen| Arc::ptr_eq(seen, current))
}
