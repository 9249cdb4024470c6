//! In-memory fakes for the upstream seams.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::{FetchError, FetchResult};
use crate::probe::LinkChecker;
use crate::wiki::{QueryParams, WikiApi};

/// Scripted [`WikiApi`]: serves canned query pages per `prop`, in order, and
/// records every call.
#[derive(Default)]
pub struct FakeWikiApi {
    summary: Option<Value>,
    pages: HashMap<String, Vec<Value>>,
    fail_after: HashMap<String, usize>,
    panic_on: HashSet<String>,
    summary_calls: Mutex<Vec<String>>,
    query_calls: Mutex<Vec<QueryParams>>,
}

impl FakeWikiApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_summary(mut self, summary: Value) -> Self {
        self.summary = Some(summary);
        self
    }

    pub fn with_pages(mut self, prop: &str, pages: Vec<Value>) -> Self {
        self.pages.insert(prop.to_string(), pages);
        self
    }

    /// Every request for `prop` after the first `served` ones fails with HTTP 502.
    pub fn failing_after(mut self, prop: &str, served: usize) -> Self {
        self.fail_after.insert(prop.to_string(), served);
        self
    }

    /// A summary request for `title` panics instead of answering.
    pub fn panicking_on(mut self, title: &str) -> Self {
        self.panic_on.insert(title.to_string());
        self
    }

    pub fn summary_calls(&self) -> Vec<String> {
        self.summary_calls.lock().unwrap().clone()
    }

    pub fn query_calls(&self) -> Vec<QueryParams> {
        self.query_calls.lock().unwrap().clone()
    }
}

fn status(url: &str, code: u16) -> FetchError {
    FetchError::Status {
        url: url.to_string(),
        status: reqwest::StatusCode::from_u16(code).unwrap(),
    }
}

#[async_trait]
impl WikiApi for FakeWikiApi {
    async fn summary(&self, title: &str) -> FetchResult<Value> {
        self.summary_calls.lock().unwrap().push(title.to_string());
        if self.panic_on.contains(title) {
            panic!("summary handler crashed for {title}");
        }
        self.summary.clone().ok_or_else(|| status("fake://summary", 404))
    }

    async fn query(&self, params: &QueryParams) -> FetchResult<Value> {
        let prop = params.get("prop").cloned().unwrap_or_default();
        let served = {
            let mut calls = self.query_calls.lock().unwrap();
            let served = calls
                .iter()
                .filter(|p| p.get("prop") == Some(&prop))
                .count();
            calls.push(params.clone());
            served
        };

        if self.fail_after.get(&prop).is_some_and(|limit| served >= *limit) {
            return Err(status("fake://api.php", 502));
        }

        Ok(self
            .pages
            .get(&prop)
            .and_then(|pages| pages.get(served))
            .cloned()
            .unwrap_or_else(|| json!({ "batchcomplete": true })))
    }
}

/// One action API response holding `items` under `list_key` of the first page.
pub fn query_page(list_key: &str, items: Value, cont: Option<Value>) -> Value {
    let mut page = json!({ "pageid": 1, "ns": 0, "title": "Fake" });
    page[list_key] = items;
    let mut response = json!({ "query": { "pages": [page] } });
    if let Some(cont) = cont {
        response["continue"] = cont;
    }
    response
}

/// [`LinkChecker`] that reports a fixed set of URLs as broken.
#[derive(Default)]
pub struct FakeLinkChecker {
    broken: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeLinkChecker {
    pub fn new<I, S>(broken: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            broken: broken.into_iter().map(Into::into).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LinkChecker for FakeLinkChecker {
    async fn is_broken(&self, url: &str) -> bool {
        self.calls.lock().unwrap().push(url.to_string());
        self.broken.contains(url)
    }
}
