//! In-memory stand-in for the grid service
//!
//! `FakeGridService` implements [`HttpTransport`] without touching the
//! network:
//! - every request is recorded for later assertions
//! - scripted responses are replayed in order
//! - with a file list configured, `get_grids` pages and `file/remove` are
//!   simulated from that list

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::endpoint::HttpMethod;
use crate::error::{GridError, Result};
use crate::models::GridFile;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

#[derive(Default)]
pub struct FakeGridService {
    requests: Mutex<Vec<HttpRequest>>,
    scripted: Mutex<VecDeque<Result<HttpResponse>>>,
    files: Mutex<Option<Vec<GridFile>>>,
    /// Reported instead of the real file count when set
    count_override: Mutex<Option<u64>>,
}

impl FakeGridService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the listing and removal endpoints over these files
    pub fn with_files(files: Vec<GridFile>) -> Self {
        let fake = Self::new();
        *fake.files.lock().unwrap() = Some(files);
        fake
    }

    /// Make listing pages report `count` regardless of the real file count
    pub fn report_count(&self, count: u64) {
        *self.count_override.lock().unwrap() = Some(count);
    }

    pub fn respond_json(&self, status: u16, body: Value) {
        self.push(Ok(HttpResponse::new(status, body.to_string())));
    }

    pub fn respond_raw(&self, status: u16, body: impl Into<String>) {
        self.push(Ok(HttpResponse::new(status, body)));
    }

    pub fn fail_with(&self, error: GridError) {
        self.push(Err(error));
    }

    fn push(&self, response: Result<HttpResponse>) {
        self.scripted.lock().unwrap().push_back(response);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Requests whose URL contains `fragment`
    pub fn requests_to(&self, fragment: &str) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url.contains(fragment))
            .cloned()
            .collect()
    }

    /// Files still present in the simulated listing
    pub fn files(&self) -> Vec<GridFile> {
        self.files.lock().unwrap().clone().unwrap_or_default()
    }

    fn simulate(&self, request: &HttpRequest) -> Option<HttpResponse> {
        let mut guard = self.files.lock().unwrap();
        let files = guard.as_mut()?;

        if request.method == HttpMethod::Get && request.url.contains("/grid/get_grids") {
            let start = query_param(&request.url, "startIndex")?;
            let end = query_param(&request.url, "endIndex")?;
            let count = self
                .count_override
                .lock()
                .unwrap()
                .unwrap_or(files.len() as u64);
            let page: Vec<&GridFile> = files
                .iter()
                .skip(start.saturating_sub(1) as usize)
                .take((end + 1).saturating_sub(start) as usize)
                .collect();
            let body = json!({ "count": count, "files": page });
            return Some(HttpResponse::new(200, body.to_string()));
        }

        if request.method == HttpMethod::Delete && request.url.ends_with("/file/remove") {
            let id = request
                .body
                .as_ref()
                .and_then(|b| b.get("id"))
                .and_then(Value::as_str)?
                .to_string();
            let before = files.len();
            files.retain(|f| f.id != id);
            return Some(if files.len() < before {
                HttpResponse::new(200, json!({ "message": "removed" }).to_string())
            } else {
                not_found("File not found")
            });
        }

        None
    }
}

fn query_param(url: &str, name: &str) -> Option<u64> {
    let url = reqwest::Url::parse(url).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == name)
        .and_then(|(_, value)| value.parse().ok())
}

fn not_found(message: &str) -> HttpResponse {
    HttpResponse::new(
        404,
        json!({ "err": { "message": message, "statusCode": 404 } }).to_string(),
    )
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl HttpTransport for FakeGridService {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(scripted) = self.scripted.lock().unwrap().pop_front() {
            return scripted;
        }
        if let Some(response) = self.simulate(&request) {
            return Ok(response);
        }
        Ok(not_found("No scripted response"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(url: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers: vec![],
            body: None,
        }
    }

    #[tokio::test]
    async fn test_scripted_responses_replay_in_order() {
        let fake = FakeGridService::new();
        fake.respond_json(200, json!({ "n": 1 }));
        fake.respond_raw(500, "boom");

        let first = fake.send(get("http://x/a")).await.unwrap();
        let second = fake.send(get("http://x/b")).await.unwrap();
        let third = fake.send(get("http://x/c")).await.unwrap();

        assert_eq!(first.status, 200);
        assert_eq!(second, HttpResponse::new(500, "boom"));
        assert_eq!(third.status, 404);
        assert_eq!(fake.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_listing_pages_are_sliced() {
        let files = (1..=12)
            .map(|i| GridFile::new(format!("f{i}"), format!("g{i}")))
            .collect();
        let fake = FakeGridService::with_files(files);

        let response = fake
            .send(get(
                "http://x/APIServices/api/grid/get_grids?startIndex=11&endIndex=20",
            ))
            .await
            .unwrap();
        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["count"], 12);
        assert_eq!(body["files"].as_array().unwrap().len(), 2);
        assert_eq!(body["files"][0]["id"], "f11");
    }

    #[tokio::test]
    async fn test_reported_count_overrides_file_count() {
        let fake = FakeGridService::with_files(vec![GridFile::new("f1", "g1")]);
        fake.report_count(25);

        let response = fake
            .send(get(
                "http://x/APIServices/api/grid/get_grids?startIndex=1&endIndex=10",
            ))
            .await
            .unwrap();
        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["count"], 25);
        assert_eq!(body["files"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_query_param() {
        let url = "http://x/get_grids?startIndex=21&endIndex=30";
        assert_eq!(query_param(url, "startIndex"), Some(21));
        assert_eq!(query_param(url, "endIndex"), Some(30));
        assert_eq!(query_param(url, "missing"), None);
        assert_eq!(query_param("not a url", "startIndex"), None);
    }
}
