//! Scripted in-memory [`BrowserSurface`] for driving the pipeline without a
//! browser.
//!
//! Nodes live in an arena and are addressed by index. Document-level queries
//! are answered from a selector map, card queries from the revealed card
//! batches, and element-scoped queries from each node's children. Reading the
//! height probe after a scroll reveals the next card batch, which is how the
//! real results feed behaves.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

use mapscrape_core::{FieldRole, SelectorTable};
use mapscrape_scraper::{scripts, BrowserSurface, Scope, ScraperError};
use serde_json::Value;

pub type NodeId = usize;

/// Page height used per revealed batch.
pub const BATCH_HEIGHT: i64 = 1_000;

pub fn pattern(role: FieldRole) -> String {
    SelectorTable::default().patterns(role)[0].clone()
}

#[derive(Debug, Clone)]
pub enum HeightModel {
    /// Every probe reads the same value.
    Constant(i64),
    /// Probes pop values in order; the last one repeats.
    Scripted(VecDeque<i64>),
    /// A probe after a scroll reveals the next batch; height is
    /// `BATCH_HEIGHT` per revealed batch.
    LazyBatches,
}

#[derive(Debug, Default)]
struct Node {
    text: String,
    attrs: HashMap<String, String>,
    children: HashMap<String, Vec<NodeId>>,
}

#[derive(Debug)]
struct Inner {
    nodes: Vec<Node>,
    document: HashMap<String, Vec<NodeId>>,
    card_pattern: String,
    batches: Vec<Vec<NodeId>>,
    revealed: usize,
    height: HeightModel,
    last_height: i64,
    scrolled_since_probe: bool,
    failing_patterns: HashSet<String>,
    failing_text: HashSet<NodeId>,
    details: HashMap<NodeId, HashMap<String, Vec<NodeId>>>,
    open_detail: Option<NodeId>,
    scripts_fail: bool,
    unreachable: bool,
    scripts: Vec<String>,
    clicks: Vec<NodeId>,
    pauses: Vec<Duration>,
    probes: usize,
}

pub struct FakeSurface {
    probe: String,
    inner: RefCell<Inner>,
}

impl Default for FakeSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeSurface {
    /// A results page with the root container present, no cards, and lazily
    /// loading batches.
    pub fn new() -> Self {
        let table = SelectorTable::default();
        let surface = Self {
            probe: scripts::height_probe(table.patterns(FieldRole::Feed)),
            inner: RefCell::new(Inner {
                nodes: Vec::new(),
                document: HashMap::new(),
                card_pattern: pattern(FieldRole::ResultCard),
                batches: Vec::new(),
                revealed: 1,
                height: HeightModel::LazyBatches,
                last_height: 0,
                scrolled_since_probe: false,
                failing_patterns: HashSet::new(),
                failing_text: HashSet::new(),
                details: HashMap::new(),
                open_detail: None,
                scripts_fail: false,
                unreachable: false,
                scripts: Vec::new(),
                clicks: Vec::new(),
                pauses: Vec::new(),
                probes: 0,
            }),
        };
        let root = surface.node("");
        surface.on_document(&pattern(FieldRole::RootContainer), root);
        surface
    }

    /// A page where the root container never appears.
    pub fn without_root() -> Self {
        let surface = Self::new();
        surface.inner.borrow_mut().document.clear();
        surface
    }

    pub fn node(&self, text: &str) -> NodeId {
        let mut inner = self.inner.borrow_mut();
        inner.nodes.push(Node {
            text: text.to_owned(),
            ..Node::default()
        });
        inner.nodes.len() - 1
    }

    pub fn set_attr(&self, node: NodeId, name: &str, value: &str) {
        self.inner.borrow_mut().nodes[node]
            .attrs
            .insert(name.to_owned(), value.to_owned());
    }

    pub fn add_child(&self, parent: NodeId, pattern: &str, child: NodeId) {
        self.inner.borrow_mut().nodes[parent]
            .children
            .entry(pattern.to_owned())
            .or_default()
            .push(child);
    }

    /// Adds a child node under `role`'s first pattern and returns it.
    pub fn child(&self, parent: NodeId, role: FieldRole, text: &str) -> NodeId {
        let child = self.node(text);
        self.add_child(parent, &pattern(role), child);
        child
    }

    pub fn on_document(&self, pattern: &str, node: NodeId) {
        self.inner
            .borrow_mut()
            .document
            .entry(pattern.to_owned())
            .or_default()
            .push(node);
    }

    /// Answers card queries from `pattern` instead of the first result-card
    /// pattern.
    pub fn serve_cards_at(&self, pattern: &str) {
        self.inner.borrow_mut().card_pattern = pattern.to_owned();
    }

    /// A card whose text is its name and whose name element carries `name`.
    pub fn business_card(&self, name: &str) -> NodeId {
        let card = self.node(name);
        self.child(card, FieldRole::Name, name);
        card
    }

    /// A card with no name element and no text.
    pub fn nameless_card(&self) -> NodeId {
        self.node("")
    }

    pub fn push_batch(&self, cards: Vec<NodeId>) {
        self.inner.borrow_mut().batches.push(cards);
    }

    /// Pushes a batch of `count` named cards, numbering from `start`.
    pub fn push_named_batch(&self, start: usize, count: usize) -> Vec<NodeId> {
        let cards: Vec<NodeId> = (start..start + count)
            .map(|n| self.business_card(&format!("Business {n}")))
            .collect();
        self.push_batch(cards.clone());
        cards
    }

    pub fn set_height(&self, model: HeightModel) {
        self.inner.borrow_mut().height = model;
    }

    /// Document matches that appear once `card` is clicked.
    pub fn add_detail(&self, card: NodeId, pattern: &str, node: NodeId) {
        self.inner
            .borrow_mut()
            .details
            .entry(card)
            .or_default()
            .entry(pattern.to_owned())
            .or_default()
            .push(node);
    }

    pub fn fail_pattern(&self, pattern: &str) {
        self.inner
            .borrow_mut()
            .failing_patterns
            .insert(pattern.to_owned());
    }

    pub fn fail_text_of(&self, node: NodeId) {
        self.inner.borrow_mut().failing_text.insert(node);
    }

    /// Every script evaluation fails from now on.
    pub fn fail_scripts(&self) {
        self.inner.borrow_mut().scripts_fail = true;
    }

    /// Every call fails from now on.
    pub fn go_unreachable(&self) {
        self.inner.borrow_mut().unreachable = true;
    }

    pub fn scripts(&self) -> Vec<String> {
        self.inner.borrow().scripts.clone()
    }

    pub fn clicks(&self) -> Vec<NodeId> {
        self.inner.borrow().clicks.clone()
    }

    pub fn pauses(&self) -> Vec<Duration> {
        self.inner.borrow().pauses.clone()
    }

    pub fn probe_count(&self) -> usize {
        self.inner.borrow().probes
    }

    pub fn scripts_containing(&self, needle: &str) -> usize {
        self.inner
            .borrow()
            .scripts
            .iter()
            .filter(|s| s.contains(needle))
            .count()
    }

    fn check_reachable(&self) -> Result<(), ScraperError> {
        if self.inner.borrow().unreachable {
            return Err(ScraperError::Browser("surface unreachable".to_owned()));
        }
        Ok(())
    }

    fn read_height(inner: &mut Inner) -> i64 {
        inner.probes += 1;
        let scrolled = std::mem::take(&mut inner.scrolled_since_probe);
        let height = match &mut inner.height {
            HeightModel::Constant(h) => *h,
            HeightModel::Scripted(values) => {
                if values.len() > 1 {
                    values.pop_front().unwrap_or(inner.last_height)
                } else {
                    values.front().copied().unwrap_or(inner.last_height)
                }
            }
            HeightModel::LazyBatches => {
                if scrolled && inner.revealed < inner.batches.len() {
                    inner.revealed += 1;
                }
                BATCH_HEIGHT * i64::try_from(inner.revealed.max(1)).unwrap()
            }
        };
        inner.last_height = height;
        height
    }
}

impl BrowserSurface for FakeSurface {
    type Element = NodeId;

    async fn query_all(
        &self,
        scope: Scope<'_, NodeId>,
        pattern: &str,
    ) -> Result<Vec<NodeId>, ScraperError> {
        self.check_reachable()?;
        let inner = self.inner.borrow();
        if inner.failing_patterns.contains(pattern) {
            return Err(ScraperError::Browser(format!("query failed: {pattern}")));
        }
        let found = match scope {
            Scope::Within(node) => inner.nodes[*node]
                .children
                .get(pattern)
                .cloned()
                .unwrap_or_default(),
            Scope::Document if pattern == inner.card_pattern => inner
                .batches
                .iter()
                .take(inner.revealed)
                .flatten()
                .copied()
                .collect(),
            Scope::Document => {
                let detail = inner
                    .open_detail
                    .and_then(|card| inner.details.get(&card))
                    .and_then(|view| view.get(pattern));
                detail
                    .or_else(|| inner.document.get(pattern))
                    .cloned()
                    .unwrap_or_default()
            }
        };
        Ok(found)
    }

    async fn text(&self, element: &NodeId) -> Result<String, ScraperError> {
        self.check_reachable()?;
        let inner = self.inner.borrow();
        if inner.failing_text.contains(element) {
            return Err(ScraperError::Browser("node detached".to_owned()));
        }
        Ok(inner.nodes[*element].text.clone())
    }

    async fn attribute(&self, element: &NodeId, name: &str) -> Result<Option<String>, ScraperError> {
        self.check_reachable()?;
        Ok(self.inner.borrow().nodes[*element].attrs.get(name).cloned())
    }

    async fn click(&self, element: &NodeId) -> Result<(), ScraperError> {
        self.check_reachable()?;
        let mut inner = self.inner.borrow_mut();
        inner.clicks.push(*element);
        inner.open_detail = inner.details.contains_key(element).then_some(*element);
        Ok(())
    }

    async fn run_script(&self, code: &str) -> Result<Value, ScraperError> {
        self.check_reachable()?;
        let mut inner = self.inner.borrow_mut();
        inner.scripts.push(code.to_owned());
        if inner.scripts_fail {
            return Err(ScraperError::Browser("script evaluation failed".to_owned()));
        }
        if code == self.probe {
            return Ok(Value::from(Self::read_height(&mut inner)));
        }
        inner.scrolled_since_probe = true;
        Ok(Value::Bool(true))
    }

    async fn pause(&self, duration: Duration) {
        self.inner.borrow_mut().pauses.push(duration);
    }
}
