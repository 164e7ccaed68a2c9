//! Deterministic test double for the page renderer: no browser, no
//! network. Registered pages render instantly, everything else fails the
//! way a dead navigation would, and every visit is recorded in order.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use crate::renderer::{PageRenderer, RenderRequest};

#[derive(Default)]
pub struct StaticRenderer {
    pages: HashMap<String, String>,
    failures: HashSet<String>,
    visits: Mutex<Vec<String>>,
}

impl StaticRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    /// Register a URL that fails on navigation even though it is known.
    pub fn with_failure(mut self, url: &str) -> Self {
        self.failures.insert(url.to_string());
        self
    }

    /// Every rendered URL, in visit order.
    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageRenderer for StaticRenderer {
    async fn render(&self, url: &str, _req: &RenderRequest) -> Result<String> {
        self.visits.lock().unwrap().push(url.to_string());

        if self.failures.contains(url) {
            anyhow::bail!("simulated navigation failure for {url}");
        }
        match self.pages.get(url) {
            Some(html) => Ok(html.clone()),
            None => anyhow::bail!("no page registered for {url}"),
        }
    }

    fn name(&self) -> &str {
        "static"
    }
}
