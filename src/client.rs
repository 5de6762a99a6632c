//! # Client — Cached API Access
//!
//! Front-ends talk to the server through [`ApiClient`], which keeps the last
//! response of each GET keyed by endpoint path (`/stats`, `/objectives`).
//! A successful mutation drops the key it affects so the next read refetches;
//! a failed mutation leaves the cache alone. There are no optimistic updates
//! and no retries beyond what the transport does.
//!
//! The HTTP details sit behind the [`Transport`] trait so the caching rules can
//! be exercised without a server.

use crate::db::{Objective, Stats, StatsUpdate};
use crate::progression::Category;
use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

pub const STATS_PATH: &str = "/stats";
pub const OBJECTIVES_PATH: &str = "/objectives";

/// Request/response access to the `/api` endpoints.
///
/// Paths are relative to the API root. Non-2xx responses are errors carrying
/// the server's message.
pub trait Transport {
    fn get(&self, path: &str) -> Result<Value>;
    fn post(&self, path: &str, body: Option<&Value>) -> Result<Value>;
}

/// [`Transport`] over HTTP using a blocking `ureq` agent.
pub struct HttpTransport {
    api_root: String,
    agent: ureq::Agent,
}

impl HttpTransport {
    /// `base_url` is the server origin, e.g. `http://localhost:5000`.
    pub fn new(base_url: &str) -> Self {
        let agent = ureq::Agent::new_with_config(
            ureq::config::Config::builder()
                .http_status_as_error(false)
                .timeout_connect(Some(Duration::from_secs(5)))
                .build(),
        );
        HttpTransport {
            api_root: format!("{}/api", base_url.trim_end_matches('/')),
            agent,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_root, path)
    }

    fn read(
        path: &str,
        mut response: ureq::http::Response<ureq::Body>,
    ) -> Result<Value> {
        let status = response.status();
        if status.is_success() {
            let body: Value = response.body_mut().read_json().with_context(|| {
                format!("{} {}: unreadable response body", status.as_u16(), path)
            })?;
            return Ok(body);
        }
        // Error bodies are best-effort; fall back to the status text
        let body: Value = response.body_mut().read_json().unwrap_or(Value::Null);
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| status.to_string());
        Err(anyhow!("{} {}: {}", status.as_u16(), path, message))
    }
}

impl Transport for HttpTransport {
    fn get(&self, path: &str) -> Result<Value> {
        let response = self.agent.get(&self.url(path)).call()?;
        Self::read(path, response)
    }

    fn post(&self, path: &str, body: Option<&Value>) -> Result<Value> {
        let request = self.agent.post(&self.url(path));
        let response = match body {
            Some(json) => request.send_json(json)?,
            None => request.send_empty()?,
        };
        Self::read(path, response)
    }
}

fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct ApiClient<T: Transport = HttpTransport> {
    transport: T,
    cache: Mutex<HashMap<String, Value>>,
}

impl ApiClient<HttpTransport> {
    pub fn connect(base_url: &str) -> Self {
        ApiClient::new(HttpTransport::new(base_url))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        ApiClient {
            transport,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_cached(&self, path: &str) -> bool {
        lock_or_recover(&self.cache).contains_key(path)
    }

    pub fn invalidate(&self, path: &str) {
        if lock_or_recover(&self.cache).remove(path).is_some() {
            debug!(path, "cache invalidated");
        }
    }

    fn query(&self, path: &str) -> Result<Value> {
        if let Some(hit) = lock_or_recover(&self.cache).get(path) {
            return Ok(hit.clone());
        }
        let fresh = self.transport.get(path)?;
        lock_or_recover(&self.cache).insert(path.to_string(), fresh.clone());
        Ok(fresh)
    }

    fn mutate(&self, path: &str, body: Option<&Value>, invalidates: &str) -> Result<Value> {
        let response = self.transport.post(path, body)?;
        self.invalidate(invalidates);
        Ok(response)
    }

    pub fn stats(&self) -> Result<Stats> {
        Ok(serde_json::from_value(self.query(STATS_PATH)?)?)
    }

    pub fn objectives(&self) -> Result<Vec<Objective>> {
        Ok(serde_json::from_value(self.query(OBJECTIVES_PATH)?)?)
    }

    pub fn update_stats(&self, update: &StatsUpdate) -> Result<Stats> {
        let body = serde_json::to_value(update)?;
        let response = self.mutate(STATS_PATH, Some(&body), STATS_PATH)?;
        Ok(serde_json::from_value(response)?)
    }

    /// Add `delta` (possibly negative) to one category's current XP.
    ///
    /// The target value is sent as-is; the server clamps it at zero.
    pub fn add_xp(&self, category: Category, delta: i32) -> Result<Stats> {
        let current = self.stats()?.xp(category);
        let target = current.saturating_add(delta);
        self.update_stats(&StatsUpdate::single(category, target))
    }

    pub fn add_objective(&self, text: &str) -> Result<Objective> {
        let body = serde_json::json!({ "text": text });
        let response = self.mutate(OBJECTIVES_PATH, Some(&body), OBJECTIVES_PATH)?;
        Ok(serde_json::from_value(response)?)
    }

    pub fn toggle_objective(&self, id: i32) -> Result<Objective> {
        let path = format!("{}/{}/toggle", OBJECTIVES_PATH, id);
        let response = self.mutate(&path, None, OBJECTIVES_PATH)?;
        Ok(serde_json::from_value(response)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use serde_json::json;
    use std::cell::RefCell;

    /// In-memory server double that records every call.
    struct FakeTransport {
        stats: RefCell<Value>,
        objectives: RefCell<Vec<Value>>,
        calls: RefCell<Vec<String>>,
        fail_posts: bool,
    }

    impl FakeTransport {
        fn new() -> Self {
            FakeTransport {
                stats: RefCell::new(json!({
                    "id": 1, "healthXP": 40, "financeXP": 0, "deenXP": 0, "intellectXP": 0
                })),
                objectives: RefCell::new(Vec::new()),
                calls: RefCell::new(Vec::new()),
                fail_posts: false,
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl Transport for FakeTransport {
        fn get(&self, path: &str) -> Result<Value> {
            self.calls.borrow_mut().push(format!("GET {}", path));
            match path {
                STATS_PATH => Ok(self.stats.borrow().clone()),
                OBJECTIVES_PATH => Ok(Value::Array(self.objectives.borrow().clone())),
                _ => bail!("404 {}: not found", path),
            }
        }

        fn post(&self, path: &str, body: Option<&Value>) -> Result<Value> {
            self.calls.borrow_mut().push(format!("POST {}", path));
            if self.fail_posts {
                bail!("500 {}: storage error", path);
            }
            match (path, body) {
                (STATS_PATH, Some(Value::Object(fields))) => {
                    let mut stats = self.stats.borrow_mut();
                    for (key, value) in fields {
                        let v = value.as_i64().unwrap_or(0).max(0);
                        stats[key.as_str()] = json!(v);
                    }
                    Ok(stats.clone())
                }
                (OBJECTIVES_PATH, Some(body)) => {
                    let mut objectives = self.objectives.borrow_mut();
                    let created = json!({
                        "id": objectives.len() + 1,
                        "text": body["text"],
                        "completed": false,
                        "createdAt": "2025-01-02T09:00:00Z",
                    });
                    objectives.push(created.clone());
                    Ok(created)
                }
                (toggle, None) if toggle.ends_with("/toggle") => {
                    let id: usize = toggle
                        .trim_start_matches("/objectives/")
                        .trim_end_matches("/toggle")
                        .parse()?;
                    let mut objectives = self.objectives.borrow_mut();
                    let Some(objective) = objectives.get_mut(id - 1) else {
                        bail!("404 {}: objective {} not found", toggle, id);
                    };
                    let done = objective["completed"].as_bool().unwrap_or(false);
                    objective["completed"] = json!(!done);
                    Ok(objective.clone())
                }
                _ => bail!("400 {}: bad request", path),
            }
        }
    }

    #[test]
    fn repeated_reads_hit_the_cache() {
        let client = ApiClient::new(FakeTransport::new());
        assert_eq!(client.stats().unwrap().health_xp, 40);
        assert_eq!(client.stats().unwrap().health_xp, 40);
        assert_eq!(client.transport.calls(), ["GET /stats"]);
        assert!(client.is_cached(STATS_PATH));
    }

    #[test]
    fn stats_update_invalidates_only_stats() {
        let client = ApiClient::new(FakeTransport::new());
        client.stats().unwrap();
        client.objectives().unwrap();

        client
            .update_stats(&StatsUpdate::single(Category::Deen, 15))
            .unwrap();
        assert!(!client.is_cached(STATS_PATH));
        assert!(client.is_cached(OBJECTIVES_PATH));

        assert_eq!(client.stats().unwrap().deen_xp, 15);
        assert_eq!(
            client.transport.calls(),
            ["GET /stats", "GET /objectives", "POST /stats", "GET /stats"]
        );
    }

    #[test]
    fn add_xp_sends_current_plus_delta() {
        let client = ApiClient::new(FakeTransport::new());
        let stats = client.add_xp(Category::Health, 25).unwrap();
        assert_eq!(stats.health_xp, 65);
    }

    #[test]
    fn add_xp_below_zero_relies_on_server_clamp() {
        let client = ApiClient::new(FakeTransport::new());
        let stats = client.add_xp(Category::Health, -100).unwrap();
        assert_eq!(stats.health_xp, 0);
    }

    #[test]
    fn add_objective_invalidates_objectives_only() {
        let client = ApiClient::new(FakeTransport::new());
        client.stats().unwrap();
        assert!(client.objectives().unwrap().is_empty());

        let created = client.add_objective("Buy milk").unwrap();
        assert_eq!(created.text, "Buy milk");
        assert!(!created.completed);
        assert!(client.is_cached(STATS_PATH));
        assert!(!client.is_cached(OBJECTIVES_PATH));

        let listed = client.objectives().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].text, "Buy milk");
    }

    #[test]
    fn toggle_posts_without_body_and_refetches() {
        let client = ApiClient::new(FakeTransport::new());
        client.add_objective("Read").unwrap();
        client.objectives().unwrap();

        let toggled = client.toggle_objective(1).unwrap();
        assert!(toggled.completed);
        assert!(!client.is_cached(OBJECTIVES_PATH));
        assert!(client.objectives().unwrap()[0].completed);
        assert!(client
            .transport
            .calls()
            .contains(&"POST /objectives/1/toggle".to_string()));
    }

    #[test]
    fn failed_mutation_keeps_cache() {
        let mut transport = FakeTransport::new();
        transport.fail_posts = true;
        let client = ApiClient::new(transport);
        client.stats().unwrap();

        let err = client
            .update_stats(&StatsUpdate::single(Category::Health, 1))
            .unwrap_err();
        assert!(err.to_string().contains("storage error"));
        assert!(client.is_cached(STATS_PATH));
    }

    #[test]
    fn toggle_unknown_id_surfaces_error() {
        let client = ApiClient::new(FakeTransport::new());
        let err = client.toggle_objective(99).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn http_transport_builds_api_urls() {
        let transport = HttpTransport::new("http://localhost:5000/");
        assert_eq!(
            transport.url(STATS_PATH),
            "http://localhost:5000/api/stats"
        );
    }

    fn response(status: u16, body: &str) -> ureq::http::Response<ureq::Body> {
        ureq::http::Response::builder()
            .status(status)
            .body(ureq::Body::builder().mime_type("application/json").data(body))
            .unwrap()
    }

    #[test]
    fn success_body_is_returned() {
        let value = HttpTransport::read(STATS_PATH, response(200, r#"{"healthXP": 3}"#)).unwrap();
        assert_eq!(value["healthXP"], 3);
    }

    #[test]
    fn undecodable_success_body_is_an_error() {
        let err = HttpTransport::read(STATS_PATH, response(200, "<html>")).unwrap_err();
        assert!(err.to_string().contains("200 /stats: unreadable response body"));
    }

    #[test]
    fn error_body_message_is_surfaced() {
        let err = HttpTransport::read(
            "/objectives/9/toggle",
            response(404, r#"{"error": "objective 9 not found"}"#),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "404 /objectives/9/toggle: objective 9 not found"
        );
    }

    #[test]
    fn unreadable_error_body_falls_back_to_status() {
        let err = HttpTransport::read(STATS_PATH, response(500, "")).unwrap_err();
        assert_eq!(err.to_string(), "500 /stats: 500 Internal Server Error");
    }
}
