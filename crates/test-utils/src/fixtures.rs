use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use assetdag::dag::{Task, TaskGraph};
use assetdag::errors::{AssetdagError, Result};
use assetdag::pipeline::{Asset, Clock};
use assetdag::sink::NotificationSink;
use assetdag::transform::Transform;
use assetdag::types::BoxFuture;

/// Sink that remembers every notification.
#[derive(Debug, Default)]
pub struct RecordingSink {
    notified: Mutex<Vec<Vec<PathBuf>>>,
    reloads: AtomicUsize,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn notifications(&self) -> Vec<Vec<PathBuf>> {
        self.notified.lock().unwrap().clone()
    }

    pub fn reloads(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, changed: &[PathBuf]) {
        self.notified.lock().unwrap().push(changed.to_vec());
    }

    fn reload(&self) {
        self.reloads.fetch_add(1, Ordering::SeqCst);
    }
}

/// Clock the test moves by hand.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<SystemTime>,
}

impl ManualClock {
    pub fn new(start: SystemTime) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(start),
        })
    }

    pub fn set(&self, now: SystemTime) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        *self.now.lock().unwrap()
    }
}

/// Transform that records the paths it saw and optionally fails.
#[derive(Debug, Default)]
pub struct ScriptedTransform {
    name: String,
    fail: Mutex<bool>,
    seen: Mutex<Vec<Vec<String>>>,
}

impl ScriptedTransform {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            ..Self::default()
        })
    }

    pub fn failing(name: &str) -> Arc<Self> {
        let transform = Self::new(name);
        transform.set_failing(true);
        transform
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    /// Relative paths of the assets handed to each call.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.seen.lock().unwrap().clone()
    }
}

impl Transform for ScriptedTransform {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, assets: Vec<Asset>) -> BoxFuture<'_, anyhow::Result<Vec<Asset>>> {
        Box::pin(async move {
            self.seen
                .lock()
                .unwrap()
                .push(assets.iter().map(|a| a.path_str()).collect());
            if *self.fail.lock().unwrap() {
                anyhow::bail!("{} exploded", self.name);
            }
            Ok(assets)
        })
    }
}

/// Shared log of `start:<name>` / `end:<name>` entries.
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Leaf task that logs its start and end, optionally sleeping in between and
/// optionally failing. Tracks how many of its invocations overlap.
#[derive(Debug)]
pub struct RecordingTask {
    name: String,
    log: EventLog,
    delay: Duration,
    fail: bool,
    active: AtomicUsize,
    max_active: AtomicUsize,
    runs: AtomicUsize,
}

impl RecordingTask {
    pub fn new(name: &str, log: &EventLog) -> Self {
        Self {
            name: name.to_string(),
            log: Arc::clone(log),
            delay: Duration::ZERO,
            fail: false,
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            runs: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously running invocations observed.
    pub fn max_concurrent(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

impl Task for RecordingTask {
    fn run<'a>(&'a self, _graph: &'a Arc<TaskGraph>) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(active, Ordering::SeqCst);
            self.runs.fetch_add(1, Ordering::SeqCst);
            self.log.lock().unwrap().push(format!("start:{}", self.name));

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            self.log.lock().unwrap().push(format!("end:{}", self.name));
            self.active.fetch_sub(1, Ordering::SeqCst);

            if self.fail {
                Err(AssetdagError::TaskFailed {
                    task: self.name.clone(),
                    reason: "scripted failure".to_string(),
                })
            } else {
                Ok(())
            }
        })
    }

    fn describe(&self) -> String {
        format!("recording task {}", self.name)
    }
}
