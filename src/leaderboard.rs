//! Remote leaderboard with local fallback
//!
//! Requests run off the frame loop (a worker thread natively, a
//! `spawn_local` future in the browser) and post their outcome to a
//! crossbeam inbox. The host drains the inbox between frames; outcomes only
//! ever touch the leaderboard display list, never the simulation.
//!
//! Native builds talk HTTP through `ureq`; the browser uses `fetch`.

use crossbeam_channel::{Receiver, Sender};
use serde_json::Value;

use crate::error::LeaderboardError;
use crate::highscores::{HighScores, LeaderboardRow, MAX_HIGH_SCORES, sanitize_rows};

/// Environment variable (native) / window global (web) holding the endpoint
pub const ENDPOINT_VAR: &str = "DODGE_LEADERBOARD_ENDPOINT";

/// Remote requests are abandoned after this long
pub const DEFAULT_TIMEOUT_MS: u32 = 1800;

/// Remote leaderboard configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardConfig {
    /// Base URL; `None` disables remote calls
    pub endpoint: Option<String>,
    pub timeout_ms: u32,
    /// Rows requested from `/top`
    pub limit: usize,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            limit: MAX_HIGH_SCORES,
        }
    }
}

impl LeaderboardConfig {
    pub fn with_endpoint(endpoint: &str) -> Self {
        let endpoint = endpoint.trim();
        Self {
            endpoint: (!endpoint.is_empty()).then(|| endpoint.to_string()),
            ..Default::default()
        }
    }

    /// Read the endpoint from the environment
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Self {
        Self::with_endpoint(&std::env::var(ENDPOINT_VAR).unwrap_or_default())
    }

    /// Read the endpoint from `window.DODGE_LEADERBOARD_ENDPOINT`
    #[cfg(target_arch = "wasm32")]
    pub fn from_env() -> Self {
        let endpoint = web_sys::window()
            .and_then(|w| js_sys::Reflect::get(&w, &ENDPOINT_VAR.into()).ok())
            .and_then(|v| v.as_string())
            .unwrap_or_default();
        Self::with_endpoint(&endpoint)
    }

    /// Endpoint without a trailing slash
    pub fn base_url(&self) -> Option<&str> {
        self.endpoint.as_deref().map(|e| e.trim_end_matches('/'))
    }

    pub fn top_url(&self) -> Option<String> {
        self.base_url()
            .map(|base| format!("{}/top?limit={}", base, self.limit))
    }

    pub fn submit_url(&self) -> Option<String> {
        self.base_url().map(|base| format!("{}/submit", base))
    }
}

/// Transport for the remote leaderboard
pub trait RemoteLeaderboard: Send + Sync {
    /// Fetch the raw `/top` body
    fn fetch_top(&self, config: &LeaderboardConfig) -> Result<Value, LeaderboardError>;
    /// Post one row to `/submit`
    fn submit(&self, config: &LeaderboardConfig, row: &LeaderboardRow)
    -> Result<(), LeaderboardError>;
}

/// Backend used when no endpoint is configured: every call reports
/// `NotConfigured`, so the local leaderboard stays authoritative
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineLeaderboard;

impl RemoteLeaderboard for OfflineLeaderboard {
    fn fetch_top(&self, _config: &LeaderboardConfig) -> Result<Value, LeaderboardError> {
        Err(LeaderboardError::NotConfigured)
    }

    fn submit(
        &self,
        _config: &LeaderboardConfig,
        _row: &LeaderboardRow,
    ) -> Result<(), LeaderboardError> {
        Err(LeaderboardError::NotConfigured)
    }
}

/// Outcome of a background leaderboard request
#[derive(Debug)]
pub enum LeaderboardUpdate {
    /// Fresh rows from the server
    Remote(Vec<LeaderboardRow>),
    /// Remote unavailable; show the local board instead
    Fallback(LeaderboardError),
    /// A submission finished; `remote_ok` false means it must be kept locally
    Submitted { row: LeaderboardRow, remote_ok: bool },
}

/// Parse a `/top` response body
pub fn parse_top(body: &Value) -> Result<Vec<LeaderboardRow>, LeaderboardError> {
    sanitize_rows(body).ok_or_else(|| LeaderboardError::Malformed("expected a JSON array".into()))
}

/// Leaderboard display state plus the inbox for background results
pub struct LeaderboardService {
    config: LeaderboardConfig,
    #[cfg(not(target_arch = "wasm32"))]
    backend: std::sync::Arc<dyn RemoteLeaderboard>,
    sender: Sender<LeaderboardUpdate>,
    receiver: Receiver<LeaderboardUpdate>,
    /// Rows currently shown (remote when reachable, else local)
    display: Vec<LeaderboardRow>,
    in_flight: usize,
}

impl LeaderboardService {
    /// Service using the platform transport: HTTP when an endpoint is set
    pub fn new(config: LeaderboardConfig) -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        #[cfg(not(target_arch = "wasm32"))]
        let backend: std::sync::Arc<dyn RemoteLeaderboard> = if config.endpoint.is_some() {
            log::info!("Remote leaderboard at {}", config.base_url().unwrap_or_default());
            std::sync::Arc::new(http::HttpLeaderboard::new(config.timeout_ms))
        } else {
            std::sync::Arc::new(OfflineLeaderboard)
        };
        Self {
            config,
            #[cfg(not(target_arch = "wasm32"))]
            backend,
            sender,
            receiver,
            display: Vec::new(),
            in_flight: 0,
        }
    }

    /// Service with a custom transport
    #[cfg(not(target_arch = "wasm32"))]
    pub fn with_backend(config: LeaderboardConfig, backend: std::sync::Arc<dyn RemoteLeaderboard>) -> Self {
        Self {
            backend,
            ..Self::new(config)
        }
    }

    pub fn config(&self) -> &LeaderboardConfig {
        &self.config
    }

    /// Rows to display
    pub fn rows(&self) -> &[LeaderboardRow] {
        &self.display
    }

    /// Show the local board until a remote answer arrives
    pub fn show_local(&mut self, local: &HighScores) {
        self.display = local.entries.clone();
    }

    /// Requests started but not yet drained
    pub fn pending(&self) -> usize {
        self.in_flight
    }

    /// Start fetching the remote top list
    pub fn refresh(&mut self) {
        if self.config.endpoint.is_none() {
            // Answer immediately; no request to wait for
            self.post(LeaderboardUpdate::Fallback(LeaderboardError::NotConfigured));
            return;
        }
        self.in_flight += 1;
        self.spawn_fetch();
    }

    /// Submit a score. Without a reachable server the row lands on the
    /// local board when the outcome is drained.
    pub fn submit(&mut self, name: &str, score: u64, date_key: &str) -> LeaderboardRow {
        let row = LeaderboardRow::new(name, score, date_key);
        if self.config.endpoint.is_none() {
            self.post(LeaderboardUpdate::Submitted {
                row: row.clone(),
                remote_ok: false,
            });
        } else {
            self.in_flight += 1;
            self.spawn_submit(row.clone());
        }
        row
    }

    fn post(&mut self, update: LeaderboardUpdate) {
        self.in_flight += 1;
        // The receiver lives in self, so the channel is never disconnected
        let _ = self.sender.send(update);
    }

    /// Apply every finished request. Returns true if anything arrived.
    /// Failed submissions are stored in `local`, which the caller persists.
    pub fn drain(&mut self, local: &mut HighScores) -> bool {
        let mut changed = false;
        while let Ok(update) = self.receiver.try_recv() {
            self.apply(update, local);
            changed = true;
        }
        changed
    }

    /// Block until every in-flight request has been applied (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn wait_idle(&mut self, local: &mut HighScores) {
        while self.in_flight > 0 {
            match self.receiver.recv() {
                Ok(update) => self.apply(update, local),
                Err(_) => break,
            }
        }
    }

    fn apply(&mut self, update: LeaderboardUpdate, local: &mut HighScores) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match update {
            LeaderboardUpdate::Remote(rows) => {
                log::info!("Remote leaderboard: {} rows", rows.len());
                self.display = rows;
            }
            LeaderboardUpdate::Fallback(LeaderboardError::NotConfigured) => {
                log::debug!("Using local leaderboard");
                self.display = local.entries.clone();
            }
            LeaderboardUpdate::Fallback(e) => {
                log::warn!("Remote leaderboard unavailable ({}), using local", e);
                self.display = local.entries.clone();
            }
            LeaderboardUpdate::Submitted { row, remote_ok } => {
                if !remote_ok {
                    local.add(row);
                }
                log::info!("Score submitted (remote: {})", remote_ok);
                self.refresh();
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn spawn_fetch(&self) {
        let backend = self.backend.clone();
        let config = self.config.clone();
        let sender = self.sender.clone();
        std::thread::spawn(move || {
            let update = match backend.fetch_top(&config).and_then(|body| parse_top(&body)) {
                Ok(rows) => LeaderboardUpdate::Remote(rows),
                Err(e) => LeaderboardUpdate::Fallback(e),
            };
            let _ = sender.send(update);
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn spawn_submit(&self, row: LeaderboardRow) {
        let backend = self.backend.clone();
        let config = self.config.clone();
        let sender = self.sender.clone();
        std::thread::spawn(move || {
            let remote_ok = match backend.submit(&config, &row) {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("Remote submit failed: {}", e);
                    false
                }
            };
            let _ = sender.send(LeaderboardUpdate::Submitted { row, remote_ok });
        });
    }

    #[cfg(target_arch = "wasm32")]
    fn spawn_fetch(&self) {
        let config = self.config.clone();
        let sender = self.sender.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let update = match web::fetch_top(&config).await.and_then(|body| parse_top(&body)) {
                Ok(rows) => LeaderboardUpdate::Remote(rows),
                Err(e) => LeaderboardUpdate::Fallback(e),
            };
            let _ = sender.send(update);
        });
    }

    #[cfg(target_arch = "wasm32")]
    fn spawn_submit(&self, row: LeaderboardRow) {
        let config = self.config.clone();
        let sender = self.sender.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let remote_ok = match web::submit(&config, &row).await {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("Remote submit failed: {}", e);
                    false
                }
            };
            let _ = sender.send(LeaderboardUpdate::Submitted { row, remote_ok });
        });
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use http::HttpLeaderboard;

/// Blocking HTTP transport, run on the service's worker threads
#[cfg(not(target_arch = "wasm32"))]
mod http {
    use std::io::ErrorKind;
    use std::time::Duration;

    use serde_json::Value;

    use super::{LeaderboardConfig, RemoteLeaderboard};
    use crate::error::LeaderboardError;
    use crate::highscores::LeaderboardRow;

    /// `ureq` client with the request timeout baked into the agent
    pub struct HttpLeaderboard {
        agent: ureq::Agent,
        timeout_ms: u32,
    }

    impl HttpLeaderboard {
        pub fn new(timeout_ms: u32) -> Self {
            let agent = ureq::AgentBuilder::new()
                .timeout(Duration::from_millis(u64::from(timeout_ms)))
                .build();
            Self { agent, timeout_ms }
        }

        fn map_error(&self, e: ureq::Error) -> LeaderboardError {
            match e {
                ureq::Error::Status(code, _) => LeaderboardError::Status(code),
                ureq::Error::Transport(t) => {
                    let timed_out = std::error::Error::source(&t)
                        .and_then(|src| src.downcast_ref::<std::io::Error>())
                        .is_some_and(|io| {
                            matches!(io.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock)
                        });
                    if timed_out {
                        LeaderboardError::Timeout(self.timeout_ms)
                    } else {
                        LeaderboardError::Transport(t.to_string())
                    }
                }
            }
        }
    }

    impl RemoteLeaderboard for HttpLeaderboard {
        fn fetch_top(&self, config: &LeaderboardConfig) -> Result<Value, LeaderboardError> {
            let url = config.top_url().ok_or(LeaderboardError::NotConfigured)?;
            let response = self
                .agent
                .get(&url)
                .call()
                .map_err(|e| self.map_error(e))?;
            response
                .into_json::<Value>()
                .map_err(|e| LeaderboardError::Malformed(e.to_string()))
        }

        fn submit(
            &self,
            config: &LeaderboardConfig,
            row: &LeaderboardRow,
        ) -> Result<(), LeaderboardError> {
            let url = config.submit_url().ok_or(LeaderboardError::NotConfigured)?;
            self.agent
                .post(&url)
                .send_json(row)
                .map_err(|e| self.map_error(e))?;
            Ok(())
        }
    }
}

/// Browser `fetch` transport
#[cfg(target_arch = "wasm32")]
mod web {
    use serde_json::Value;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{AbortController, Headers, Request, RequestInit, RequestMode, Response};

    use super::LeaderboardConfig;
    use crate::error::LeaderboardError;
    use crate::highscores::LeaderboardRow;

    fn transport(e: JsValue) -> LeaderboardError {
        LeaderboardError::Transport(format!("{:?}", e))
    }

    /// Send `request`, aborting after the configured timeout
    async fn send(request: Request, timeout_ms: u32, controller: AbortController) -> Result<Response, LeaderboardError> {
        let window = web_sys::window().ok_or(LeaderboardError::Transport("no window".into()))?;

        let abort = Closure::once(move || controller.abort());
        let timer = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                abort.as_ref().unchecked_ref(),
                timeout_ms as i32,
            )
            .map_err(transport)?;

        let result = JsFuture::from(window.fetch_with_request(&request)).await;
        window.clear_timeout_with_handle(timer);
        drop(abort);

        let response: Response = result
            .map_err(|e| {
                let aborted = e
                    .dyn_ref::<js_sys::Error>()
                    .map(|err| err.name() == "AbortError")
                    .unwrap_or(false);
                if aborted {
                    LeaderboardError::Timeout(timeout_ms)
                } else {
                    transport(e)
                }
            })?
            .dyn_into()
            .map_err(transport)?;

        if !response.ok() {
            return Err(LeaderboardError::Status(response.status()));
        }
        Ok(response)
    }

    pub async fn fetch_top(config: &LeaderboardConfig) -> Result<Value, LeaderboardError> {
        let url = config.top_url().ok_or(LeaderboardError::NotConfigured)?;
        let controller = AbortController::new().map_err(transport)?;

        let init = RequestInit::new();
        init.set_method("GET");
        init.set_mode(RequestMode::Cors);
        init.set_signal(Some(&controller.signal()));
        let request = Request::new_with_str_and_init(&url, &init).map_err(transport)?;

        let response = send(request, config.timeout_ms, controller).await?;
        let text = JsFuture::from(response.text().map_err(transport)?)
            .await
            .map_err(transport)?
            .as_string()
            .unwrap_or_default();
        serde_json::from_str(&text).map_err(|e| LeaderboardError::Malformed(e.to_string()))
    }

    pub async fn submit(config: &LeaderboardConfig, row: &LeaderboardRow) -> Result<(), LeaderboardError> {
        let url = config.submit_url().ok_or(LeaderboardError::NotConfigured)?;
        let body = serde_json::to_string(row).map_err(|e| LeaderboardError::Malformed(e.to_string()))?;
        let controller = AbortController::new().map_err(transport)?;

        let headers = Headers::new().map_err(transport)?;
        headers
            .set("Content-Type", "application/json")
            .map_err(transport)?;

        let init = RequestInit::new();
        init.set_method("POST");
        init.set_mode(RequestMode::Cors);
        init.set_headers(&headers);
        init.set_body(&JsValue::from_str(&body));
        init.set_signal(Some(&controller.signal()));
        let request = Request::new_with_str_and_init(&url, &init).map_err(transport)?;

        send(request, config.timeout_ms, controller).await?;
        Ok(())
    }
}
