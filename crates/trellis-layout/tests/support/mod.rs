//! Test support fixtures for the arbitration integration tests.
//!
//! [`Panel`] is a minimal container in the shape a widget toolkit would
//! provide: it registers children with their metrics, records the
//! rectangles layout dispatches to it, and exposes nested panels through
//! the capability probe so recursion gets exercised for real.

// Not every test file uses every fixture helper.
#![allow(dead_code)]

use trellis_core::Rect;
use trellis_layout::{ContainerMetrics, ElementMetrics, GridMetrics, LayoutContainer};

/// Initialize test logging once; repeat calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// A child at the collaborator boundary: either a leaf or a nested panel.
pub enum Child {
    Block,
    Panel(Panel),
}

/// A container fixture that records everything layout tells it.
pub struct Panel {
    metrics: ContainerMetrics,
    children: Vec<(Child, ElementMetrics)>,
    rects: Vec<Rect>,
    /// `(start, size)` per column, captured from the grid notification.
    pub grid_columns: Vec<(i32, i32)>,
    /// `(start, size)` per row, captured from the grid notification.
    pub grid_rows: Vec<(i32, i32)>,
}

impl Panel {
    pub fn new(metrics: ContainerMetrics) -> Self {
        Self {
            metrics,
            children: Vec::new(),
            rects: Vec::new(),
            grid_columns: Vec::new(),
            grid_rows: Vec::new(),
        }
    }

    /// Register a child; returns its index.
    pub fn add(&mut self, child: Child, metrics: ElementMetrics) -> usize {
        self.children.push((child, metrics));
        self.rects.push(Rect::ZERO);
        self.children.len() - 1
    }

    /// Register a leaf block; returns its index.
    pub fn add_block(&mut self, metrics: ElementMetrics) -> usize {
        self.add(Child::Block, metrics)
    }

    /// The rectangle layout dispatched for the child at `index`.
    pub fn rect(&self, index: usize) -> Rect {
        self.rects[index]
    }

    /// All dispatched rectangles, in registration order.
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    /// The nested panel at `index`; panics if the child is a leaf.
    pub fn panel(&self, index: usize) -> &Panel {
        match &self.children[index].0 {
            Child::Panel(panel) => panel,
            Child::Block => panic!("child {index} is not a panel"),
        }
    }
}

impl LayoutContainer for Panel {
    fn child_count(&self) -> usize {
        self.children.len()
    }

    fn child_metrics(&self, index: usize) -> ElementMetrics {
        self.children
            .get(index)
            .map_or(ElementMetrics::EMPTY, |(_, metrics)| *metrics)
    }

    fn container_metrics(&self) -> ContainerMetrics {
        self.metrics
    }

    fn set_child_rect(&mut self, index: usize, rect: Rect) {
        self.rects[index] = rect;
    }

    fn set_grid_metrics(&mut self, metrics: &GridMetrics) {
        self.grid_columns = metrics
            .columns()
            .tracks()
            .iter()
            .map(|t| (t.start, t.size))
            .collect();
        self.grid_rows = metrics
            .rows()
            .tracks()
            .iter()
            .map(|t| (t.start, t.size))
            .collect();
    }

    fn child_container_mut(&mut self, index: usize) -> Option<&mut dyn LayoutContainer> {
        match &mut self.children[index].0 {
            Child::Panel(panel) => Some(panel),
            Child::Block => None,
        }
    }
}
