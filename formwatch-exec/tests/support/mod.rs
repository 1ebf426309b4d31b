#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use formwatch_core::{parse_document_str, validate_document, DocumentFormat, MonitorDocument};
use formwatch_exec::browser::{BrowserError, BrowserLauncher, BrowserSession, ElementState, Page};
use formwatch_exec::executor::{Event, EventSink};
use formwatch_exec::notify::{Notifier, NotifyError};
use formwatch_store::{FingerprintStore, StoreError};
use tokio::time::Instant;

pub fn document(yaml: &str) -> MonitorDocument {
    let doc = parse_document_str(yaml, DocumentFormat::Yaml)
        .expect("test document parses")
        .document;
    validate_document(&doc).expect("test document validates");
    doc
}

pub fn visible(text: &str) -> ElementState {
    ElementState {
        present: true,
        visible: true,
        enabled: true,
        text: Some(text.to_string()),
        value: None,
        html: Some(text.to_string()),
    }
}

pub fn field() -> ElementState {
    ElementState {
        present: true,
        visible: true,
        enabled: true,
        text: Some(String::new()),
        value: Some(String::new()),
        html: Some(String::new()),
    }
}

/// A state change to `selector` applied `after` the triggering action.
#[derive(Debug, Clone)]
pub struct Reaction {
    pub selector: String,
    pub after: Duration,
    pub state: Option<ElementState>,
}

/// How a fake page behaves. Each launched session gets its own copy.
#[derive(Debug, Clone, Default)]
pub struct PageScript {
    pub initial: HashMap<String, ElementState>,
    pub reactions: HashMap<String, Vec<Reaction>>,
    pub action_errors: HashMap<String, BrowserError>,
    pub hang_on: Vec<String>,
    pub navigation_error: Option<BrowserError>,
}

impl PageScript {
    pub fn with(mut self, selector: &str, state: ElementState) -> Self {
        self.initial.insert(selector.to_string(), state);
        self
    }

    /// Acting on `trigger` sets `selector` to `state` (or removes it) after `after`.
    pub fn on(mut self, trigger: &str, selector: &str, after: Duration, state: Option<ElementState>) -> Self {
        self.reactions.entry(trigger.to_string()).or_default().push(Reaction {
            selector: selector.to_string(),
            after,
            state,
        });
        self
    }

    pub fn failing(mut self, selector: &str, err: BrowserError) -> Self {
        self.action_errors.insert(selector.to_string(), err);
        self
    }

    pub fn hanging(mut self, selector: &str) -> Self {
        self.hang_on.push(selector.to_string());
        self
    }
}

#[derive(Default)]
pub struct Counters {
    pub launches: AtomicUsize,
    pub pages: AtomicUsize,
    pub closes: AtomicUsize,
}

impl Counters {
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

pub struct FakeLauncher {
    scripts: Mutex<VecDeque<PageScript>>,
    launch_error: Option<BrowserError>,
    pub counters: Arc<Counters>,
    pub actions: Arc<Mutex<Vec<String>>>,
}

impl FakeLauncher {
    /// Each launch takes the next script; the last one repeats.
    pub fn new(scripts: Vec<PageScript>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            launch_error: None,
            counters: Arc::new(Counters::default()),
            actions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(err: BrowserError) -> Self {
        let mut l = Self::new(vec![PageScript::default()]);
        l.launch_error = Some(err);
        l
    }

    pub fn actions(&self) -> Vec<String> {
        self.actions.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, BrowserError> {
        self.counters.launches.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = &self.launch_error {
            return Err(e.clone());
        }
        let script = {
            let mut scripts = self.scripts.lock().unwrap();
            if scripts.len() > 1 {
                scripts.pop_front().unwrap_or_default()
            } else {
                scripts.front().cloned().unwrap_or_default()
            }
        };
        Ok(Box::new(FakeSession {
            script,
            counters: self.counters.clone(),
            actions: self.actions.clone(),
        }))
    }
}

pub struct FakeSession {
    script: PageScript,
    counters: Arc<Counters>,
    actions: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn new_page(&self, url: &str) -> Result<Box<dyn Page>, BrowserError> {
        if let Some(e) = &self.script.navigation_error {
            return Err(e.clone());
        }
        self.counters.pages.fetch_add(1, Ordering::SeqCst);
        self.actions.lock().unwrap().push(format!("goto {url}"));
        Ok(Box::new(FakePage::new(self.script.clone(), self.actions.clone())))
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakePage {
    script: PageScript,
    dom: Mutex<HashMap<String, ElementState>>,
    pending: Mutex<Vec<(Instant, Reaction)>>,
    actions: Arc<Mutex<Vec<String>>>,
}

impl FakePage {
    pub fn new(script: PageScript, actions: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            dom: Mutex::new(script.initial.clone()),
            script,
            pending: Mutex::new(Vec::new()),
            actions,
        }
    }

    pub fn standalone(script: PageScript) -> Self {
        Self::new(script, Arc::new(Mutex::new(Vec::new())))
    }

    fn settle(&self) {
        let now = Instant::now();
        let mut pending = self.pending.lock().unwrap();
        let mut dom = self.dom.lock().unwrap();
        pending.sort_by_key(|(at, _)| *at);
        pending.retain(|(at, r)| {
            if *at > now {
                return true;
            }
            match &r.state {
                Some(s) => dom.insert(r.selector.clone(), s.clone()),
                None => dom.remove(&r.selector),
            };
            false
        });
    }

    async fn act(&self, selector: &str, log: String) -> Result<(), BrowserError> {
        self.actions.lock().unwrap().push(log);
        if self.script.hang_on.iter().any(|s| s == selector) {
            std::future::pending::<()>().await;
        }
        if let Some(e) = self.script.action_errors.get(selector) {
            return Err(e.clone());
        }
        self.settle();
        if !self.dom.lock().unwrap().get(selector).is_some_and(|s| s.present) {
            return Err(BrowserError::ElementNotFound(selector.to_string()));
        }
        let now = Instant::now();
        if let Some(reactions) = self.script.reactions.get(selector) {
            let mut pending = self.pending.lock().unwrap();
            for r in reactions {
                pending.push((now + r.after, r.clone()));
            }
        }
        Ok(())
    }

    fn set_value(&self, selector: &str, value: &str) {
        if let Some(state) = self.dom.lock().unwrap().get_mut(selector) {
            state.value = Some(value.to_string());
        }
    }
}

#[async_trait]
impl Page for FakePage {
    async fn click(&self, selector: &str) -> Result<(), BrowserError> {
        self.act(selector, format!("click {selector}")).await
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<(), BrowserError> {
        self.act(selector, format!("fill {selector}={value}")).await?;
        self.set_value(selector, value);
        Ok(())
    }

    async fn select_option(&self, selector: &str, value: &str) -> Result<(), BrowserError> {
        self.act(selector, format!("select {selector}={value}")).await?;
        self.set_value(selector, value);
        Ok(())
    }

    async fn locate(&self, selector: &str) -> Result<ElementState, BrowserError> {
        self.settle();
        Ok(self
            .dom
            .lock()
            .unwrap()
            .get(selector)
            .cloned()
            .unwrap_or_else(ElementState::absent))
    }

    async fn screenshot(&self, path: &Path) -> Result<(), BrowserError> {
        std::fs::write(path, b"png").map_err(|e| BrowserError::Protocol(e.to_string()))?;
        self.actions
            .lock()
            .unwrap()
            .push(format!("screenshot {}", path.display()));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<String>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        self.messages.lock().unwrap().push(message.to_string());
        if self.fail {
            return Err(NotifyError::Status {
                status: 500,
                body: "upstream unavailable".to_string(),
            });
        }
        Ok(())
    }
}

/// Accepts the message and never finishes delivering it.
#[derive(Default)]
pub struct StalledNotifier {
    pub started: AtomicUsize,
}

#[async_trait]
impl Notifier for StalledNotifier {
    async fn send(&self, _message: &str) -> Result<(), NotifyError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        std::future::pending::<()>().await;
        Ok(())
    }
}

/// Store that is always down.
pub struct BrokenStore;

#[async_trait]
impl FingerprintStore for BrokenStore {
    async fn check_and_set(&self, _fingerprint: &str, _ttl: Duration) -> Result<bool, StoreError> {
        Err(StoreError::Database("connection refused".to_string()))
    }

    async fn release(&self, _fingerprint: &str) -> Result<(), StoreError> {
        Err(StoreError::Database("connection refused".to_string()))
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<Event>>,
}

impl RecordingSink {
    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|e| e.name()).collect()
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn emit(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn temp_path(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}
