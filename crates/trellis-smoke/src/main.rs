//! Trellis Smoke Harness
//!
//! Exercises the arbitration engine with a scripted application-style
//! layout: a packed header, a percent-constrained sidebar, a spanned
//! toolbar, and a nested content grid. The same tree is solved at several
//! region sizes to shake out instability under re-layout; every dispatched
//! rectangle and the resolved grid lines are logged.

use tracing::{debug, info};
use trellis_core::{Alignment, GrowType, Rect, Size, UnitContext};
use trellis_layout::{solve, ContainerMetrics, ElementMetrics, GridMetrics, LayoutContainer};

/// Parse command line arguments
struct Args {
    width: i32,
    height: i32,
    remove_collisions: bool,
}

impl Args {
    fn parse() -> Self {
        let mut args = std::env::args().skip(1);
        let mut width = 960i32;
        let mut height = 540i32;
        let mut remove_collisions = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--width" => {
                    if let Some(val) = args.next() {
                        width = val.parse().unwrap_or(960);
                    }
                }
                "--height" => {
                    if let Some(val) = args.next() {
                        height = val.parse().unwrap_or(540);
                    }
                }
                "--remove-collisions" => {
                    remove_collisions = true;
                }
                _ => {}
            }
        }

        Self {
            width,
            height,
            remove_collisions,
        }
    }
}

/// A child of a [`Panel`], tagged at the collaborator boundary.
enum Child {
    Block(&'static str),
    Panel(Panel),
}

/// A container widget: registered children with their metrics, plus the
/// rectangles the last layout pass dispatched.
struct Panel {
    name: &'static str,
    metrics: ContainerMetrics,
    children: Vec<(Child, ElementMetrics)>,
    rects: Vec<Rect>,
    grid_lines: Vec<i32>,
}

impl Panel {
    fn new(name: &'static str, metrics: ContainerMetrics) -> Self {
        Self {
            name,
            metrics,
            children: Vec::new(),
            rects: Vec::new(),
            grid_lines: Vec::new(),
        }
    }

    fn add(&mut self, child: Child, metrics: ElementMetrics) {
        self.children.push((child, metrics));
        self.rects.push(Rect::ZERO);
    }

    fn report(&self) {
        debug!(panel = self.name, columns = ?self.grid_lines, "grid lines");
        for (index, (child, _)) in self.children.iter().enumerate() {
            let rect = self.rects[index];
            match child {
                Child::Block(name) => {
                    info!(
                        name,
                        x = rect.x,
                        y = rect.y,
                        width = rect.width,
                        height = rect.height,
                        "block"
                    );
                }
                Child::Panel(panel) => {
                    info!(
                        name = panel.name,
                        x = rect.x,
                        y = rect.y,
                        width = rect.width,
                        height = rect.height,
                        "panel"
                    );
                    panel.report();
                }
            }
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
        self.grid_lines = metrics.columns().tracks().iter().map(|t| t.start).collect();
    }

    fn child_container_mut(&mut self, index: usize) -> Option<&mut dyn LayoutContainer> {
        match &mut self.children[index].0 {
            Child::Panel(panel) => Some(panel),
            Child::Block(_) => None,
        }
    }
}

/// Build the scripted application layout.
///
/// Chrome sizes are styled in points and ems, the way a styling layer
/// would hand them over, and resolved to pixels before they reach the
/// solver.
fn build_tree(units: &UnitContext) -> Panel {
    let mut root = Panel::new("root", ContainerMetrics::new().with_cell_padding(4));

    // Header: packed to its minimum height, logo centered
    let mut header = ElementMetrics::spanning(0, 0, 2, 1);
    header.add_min_height(units.to_pixels(Size::points(36)));
    root.add(Child::Block("header"), header);

    let mut logo = ElementMetrics::new(0, 1);
    logo.add_min_width(64);
    logo.add_min_height(64);
    logo.horizontal_grow = GrowType::Pack;
    logo.horizontal_alignment = Alignment::Center;
    root.add(Child::Block("logo"), logo);

    // Sidebar: at least a quarter of the window, never less than 10em
    let mut sidebar = ElementMetrics::new(0, 2);
    sidebar.add_min_percent_width(25);
    sidebar.add_min_width(units.to_pixels(Size::ems(10)));
    root.add(Child::Block("sidebar"), sidebar);

    // Content: a nested two-by-two card grid with collapsed margins
    let mut content = Panel::new(
        "content",
        ContainerMetrics::new()
            .with_cell_padding(8)
            .with_collapse_margins(true),
    );
    for (name, x, y) in [
        ("card-a", 0, 0),
        ("card-b", 1, 0),
        ("card-c", 0, 1),
        ("card-d", 1, 1),
    ] {
        let mut card = ElementMetrics::new(x, y);
        card.set_padding(2);
        content.add(Child::Block(name), card);
    }
    root.add(Child::Panel(content), ElementMetrics::spanning(1, 1, 1, 2));

    // Status bar: packed low strip aligned to the trailing edge
    let mut status = ElementMetrics::spanning(0, 3, 2, 1);
    status.add_min_height(units.to_pixels(Size::ems(2)));
    status.vertical_grow = GrowType::Pack;
    status.vertical_alignment = Alignment::Trailing;
    root.add(Child::Block("status"), status);

    root
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let units = UnitContext::new(16.0, 4.0 / 3.0, args.width);
    let mut root = build_tree(&units);

    // Solve the same tree at a few sizes; geometry must stay stable and
    // deterministic under re-layout.
    let sizes = [
        (args.width, args.height),
        (args.width / 2, args.height / 2),
        (args.width, args.height),
    ];
    for (width, height) in sizes {
        info!(width, height, "solving");
        solve(&mut root, 0, 0, width, height, args.remove_collisions);
        root.report();
    }
}
