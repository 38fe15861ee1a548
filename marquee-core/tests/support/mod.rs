//! Scripted page sources for window cache tests.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use marquee_core::contracts::page_source::PageSource;
use marquee_core::model::{PageIndex, PageResponse};
use tokio::sync::Notify;

/// Item ids encode their origin: `page * 1000 + position`.
pub fn item(page: u32, position: u32) -> u32 {
    page * 1000 + position
}

pub fn page_of(item: u32) -> u32 {
    item / 1000
}

#[derive(Default)]
struct Script {
    sizes: HashMap<u32, usize>,
    failures: HashMap<u32, VecDeque<String>>,
    gates: HashMap<u32, Arc<Notify>>,
    calls: Vec<u32>,
}

/// In-memory catalogue with per-page failure injection and completion gates.
#[derive(Default)]
pub struct ScriptedSource {
    script: Mutex<Script>,
}

impl ScriptedSource {
    /// `pages` full pages of `page_size` items; later pages come back empty.
    pub fn full_pages(pages: u32, page_size: usize) -> Arc<Self> {
        let source = Self::default();
        {
            let mut script = source.script.lock().unwrap();
            for page in 1..=pages {
                script.sizes.insert(page, page_size);
            }
        }
        Arc::new(source)
    }

    pub fn set_page_len(&self, page: u32, len: usize) {
        self.script.lock().unwrap().sizes.insert(page, len);
    }

    /// Next fetch of `page` fails with `message`; later fetches succeed.
    pub fn fail_once(&self, page: u32, message: &str) {
        self.script
            .lock()
            .unwrap()
            .failures
            .entry(page)
            .or_default()
            .push_back(message.to_string());
    }

    /// Hold fetches of `page` until the returned gate is notified.
    pub fn gate(&self, page: u32) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.script
            .lock()
            .unwrap()
            .gates
            .insert(page, gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<u32> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn calls_for(&self, page: u32) -> usize {
        self.calls().into_iter().filter(|p| *p == page).count()
    }

    pub async fn wait_for_calls(&self, count: usize) {
        while self.calls().len() < count {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl PageSource for ScriptedSource {
    type Item = u32;

    async fn fetch_page(
        &self,
        page: PageIndex,
        page_size: usize,
    ) -> anyhow::Result<PageResponse<u32>> {
        let page = page.get();
        let gate = {
            let mut script = self.script.lock().unwrap();
            script.calls.push(page);
            script.gates.get(&page).cloned()
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let mut script = self.script.lock().unwrap();
        if let Some(message) =
            script.failures.get_mut(&page).and_then(VecDeque::pop_front)
        {
            anyhow::bail!(message);
        }
        let len = script.sizes.get(&page).copied().unwrap_or(0).min(page_size);
        Ok(PageResponse::new(
            (0..len as u32).map(|position| item(page, position)).collect(),
        ))
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}
