//! Worker lifecycle controller: endpoint creation, pump wiring, teardown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Result};
use channel::{endpoint_pair, DriverEndpoint};
use engine_native::{EngineHandle, EngineSpawner};
use log::warn;
use messenger::{LifecycleHooks, Messenger, MessengerConfig, NoopHooks};
use parking_lot::Mutex;

/// Teardown reason used by [`EngineDriver::terminate`].
const TERMINATED_REASON: &str = "terminated";
/// Teardown reason used when the channel dies without a terminate call.
const CHANNEL_CLOSED_REASON: &str = "engine channel closed";

/// Tuning knobs for the driver.
#[derive(Clone, Copy, Debug)]
pub struct DriverConfig {
    /// Deadline applied independently to every request.
    pub request_timeout: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            request_timeout: MessengerConfig::DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Owns the engine channel lifecycle and the messenger attached to it.
pub struct EngineDriver {
    pub(crate) messenger: Arc<Messenger>,
    hooks: Arc<dyn LifecycleHooks>,
    spawner: Arc<dyn EngineSpawner>,
    worker: Mutex<Option<Worker>>,
    ready: Arc<AtomicBool>,
}

impl std::fmt::Debug for EngineDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineDriver")
            .field("ready", &self.ready)
            .finish_non_exhaustive()
    }
}

struct Worker {
    engine: EngineHandle,
    pump: thread::JoinHandle<()>,
    /// Set before an intentional teardown so the pump does not treat the
    /// resulting disconnect as a channel failure.
    closing: Arc<AtomicBool>,
}

impl EngineDriver {
    pub fn builder() -> EngineDriverBuilder {
        EngineDriverBuilder::new()
    }

    /// Creates the channel endpoint and spawns the engine. Idempotent: when a
    /// worker is already live this does nothing.
    pub fn init(&self) {
        let mut slot = self.worker.lock();
        if slot.is_some() {
            return;
        }

        let (driver_endpoint, engine_endpoint) = endpoint_pair();
        let DriverEndpoint {
            requests,
            responses,
        } = driver_endpoint;

        let engine = self.spawner.spawn(engine_endpoint);
        self.messenger.attach(requests);

        let closing = Arc::new(AtomicBool::new(false));
        let pump = {
            let messenger = Arc::clone(&self.messenger);
            let hooks = Arc::clone(&self.hooks);
            let ready = Arc::clone(&self.ready);
            let closing = Arc::clone(&closing);
            thread::Builder::new()
                .name("engine-pump".into())
                .spawn(move || {
                    while let Ok(envelope) = responses.recv() {
                        messenger.handle_message(envelope);
                    }
                    if !closing.load(Ordering::Acquire) {
                        warn!("{CHANNEL_CLOSED_REASON}; rejecting pending requests");
                        ready.store(false, Ordering::Release);
                        messenger.detach();
                        messenger.cleanup(CHANNEL_CLOSED_REASON);
                        hooks.on_channel_error(CHANNEL_CLOSED_REASON);
                    }
                })
                .expect("spawn pump thread")
        };

        self.ready.store(true, Ordering::Release);
        *slot = Some(Worker {
            engine,
            pump,
            closing,
        });
    }

    /// Destroys the endpoint, rejects every in-flight request so no caller
    /// hangs, and joins the engine and pump threads. Safe to call when no
    /// worker exists.
    pub fn terminate(&self) {
        let worker = self.worker.lock().take();
        let Some(worker) = worker else {
            self.messenger.cleanup(TERMINATED_REASON);
            return;
        };

        worker.closing.store(true, Ordering::Release);
        self.ready.store(false, Ordering::Release);
        // Dropping the request sender ends the engine loop; the engine's
        // reply sender drop then ends the pump.
        self.messenger.detach();
        self.messenger.cleanup(TERMINATED_REASON);
        worker.engine.join();
        let _ = worker.pump.join();
    }

    /// Whether a live endpoint is accepting calls.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Number of calls currently awaiting a terminal envelope.
    pub fn pending_requests(&self) -> usize {
        self.messenger.pending_requests()
    }
}

impl Drop for EngineDriver {
    fn drop(&mut self) {
        self.terminate();
    }
}

/// Assembles an [`EngineDriver`] from its collaborators.
pub struct EngineDriverBuilder {
    spawner: Option<Arc<dyn EngineSpawner>>,
    config: DriverConfig,
    hooks: Option<Arc<dyn LifecycleHooks>>,
}

impl EngineDriverBuilder {
    pub fn new() -> Self {
        Self {
            spawner: None,
            config: DriverConfig::default(),
            hooks: None,
        }
    }

    pub fn spawner(mut self, spawner: Arc<dyn EngineSpawner>) -> Self {
        self.spawner = Some(spawner);
        self
    }

    pub fn config(mut self, config: DriverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn LifecycleHooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    pub fn build(self) -> Result<EngineDriver> {
        let spawner = self.spawner.ok_or_else(|| anyhow!("missing engine spawner"))?;
        let hooks = self.hooks.unwrap_or_else(|| Arc::new(NoopHooks));
        let messenger = Arc::new(Messenger::new(
            MessengerConfig {
                request_timeout: self.config.request_timeout,
            },
            Arc::clone(&hooks),
        ));
        Ok(EngineDriver {
            messenger,
            hooks,
            spawner,
            worker: Mutex::new(None),
            ready: Arc::new(AtomicBool::new(false)),
        })
    }
}

impl Default for EngineDriverBuilder {
    fn default() -> Self {
        Self::new()
    }
}
