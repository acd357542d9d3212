//! The arbitration procedure: turns a container's declared metrics into
//! absolute rectangles, recursing into children that are themselves
//! containers.
//!
//! One invocation builds one fresh [`GridMetrics`], resolves it, and
//! dispatches exactly one rectangle per child. Children are visited in
//! registration order, so identical inputs always produce identical
//! geometry.

use tracing::{debug, trace};

use trellis_core::{Alignment, GrowType, Rect};

use crate::grid::{relative_px, GridMetrics};
use crate::metrics::ElementMetrics;
use crate::LayoutContainer;

/// Arbitrate geometry for `container`'s children within the region
/// `(x, y)..(x + width, y + height)`.
///
/// Every registered child receives exactly one
/// [`LayoutContainer::set_child_rect`] call. Children excluded by their
/// placement (negative cell coordinates), or pruned by the collision
/// policy when `remove_collisions` is set, receive the zero rectangle.
/// Children that expose a nested container are solved recursively with
/// their own rectangle as the new region.
///
/// Over-constrained axes are not clipped: the resolved total may exceed
/// the requested extent, and the deficit is logged rather than reported
/// as an error.
pub fn solve(
    container: &mut dyn LayoutContainer,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    remove_collisions: bool,
) {
    let container_metrics = container.container_metrics();
    let child_count = container.child_count();

    // Grow the grid over every child's cell and span before any sizing
    // runs, so margins land on the right edges.
    let mut grid = GridMetrics::new(container_metrics);
    let mut children = Vec::with_capacity(child_count);
    for index in 0..child_count {
        let metrics = container.child_metrics(index);
        if !metrics.is_excluded() {
            let last_x = metrics.cell_x + metrics.cells_x.max(1) - 1;
            let last_y = metrics.cell_y + metrics.cells_y.max(1) - 1;
            grid.ensure_extent(last_x as usize, last_y as usize);
        }
        children.push(metrics);
    }

    let collided = if remove_collisions {
        find_collisions(&grid, &children)
    } else {
        vec![false; children.len()]
    };

    for (index, metrics) in children.iter().enumerate() {
        if !collided[index] {
            grid.merge_element(metrics);
        }
    }

    let (column_deficit, row_deficit) = grid.resolve(width, height);
    if column_deficit > 0 || row_deficit > 0 {
        debug!(
            column_deficit,
            row_deficit, width, height, "grid minimums exceed the requested extent"
        );
    }

    container.set_grid_metrics(&grid);

    for (index, metrics) in children.iter().enumerate() {
        if metrics.is_excluded() || collided[index] {
            container.set_child_rect(index, Rect::ZERO);
            continue;
        }

        let rect = arbitrate_child(&grid, metrics, x, y, width, height);
        trace!(index, ?rect, "arbitrated child");
        container.set_child_rect(index, rect);

        if let Some(nested) = container.child_container_mut(index) {
            solve(
                nested,
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                remove_collisions,
            );
        }
    }
}

/// Compute one child's rectangle from the resolved grid.
fn arbitrate_child(
    grid: &GridMetrics,
    metrics: &ElementMetrics,
    origin_x: i32,
    origin_y: i32,
    width: i32,
    height: i32,
) -> Rect {
    let container_metrics = grid.container_metrics();

    let first_x = metrics.cell_x as usize;
    let first_y = metrics.cell_y as usize;
    let last_x = first_x + metrics.cells_x.max(1) as usize - 1;
    let last_y = first_y + metrics.cells_y.max(1) as usize - 1;

    // The outer cell rectangle covers the full spanned range, first track
    // through last track inclusive.
    let cell_x = origin_x + grid.cell_left(first_x);
    let cell_y = origin_y + grid.cell_top(first_y);
    let cell_width = grid.cell_left(last_x) + grid.cell_width(last_x) - grid.cell_left(first_x);
    let cell_height = grid.cell_top(last_y) + grid.cell_height(last_y) - grid.cell_top(first_y);

    // Cell padding is full at the grid boundary and halved on interior
    // edges, then combined with the element's own padding.
    let mut pad_left = container_metrics.cell_padding;
    if first_x > 0 {
        pad_left /= 2;
    }
    let mut pad_top = container_metrics.cell_padding;
    if first_y > 0 {
        pad_top /= 2;
    }
    let mut pad_right = container_metrics.cell_padding;
    if last_x < grid.width() - 1 {
        pad_right /= 2;
    }
    let mut pad_bottom = container_metrics.cell_padding;
    if last_y < grid.height() - 1 {
        pad_bottom /= 2;
    }

    let own = metrics.padding;
    if container_metrics.collapse_margins {
        pad_left = pad_left.max(own.left);
        pad_top = pad_top.max(own.top);
        pad_right = pad_right.max(own.right);
        pad_bottom = pad_bottom.max(own.bottom);
    } else {
        pad_left += own.left;
        pad_top += own.top;
        pad_right += own.right;
        pad_bottom += own.bottom;
    }

    // The available box: the largest rectangle the element may occupy.
    let mut elem_x = cell_x + pad_left;
    let mut elem_y = cell_y + pad_top;
    let mut elem_width = cell_width - (pad_left + pad_right);
    let mut elem_height = cell_height - (pad_top + pad_bottom);

    if metrics.horizontal_grow == GrowType::Pack {
        let preferred = preferred_size(metrics.fixed_min_x, metrics.relative_min_x, width);
        if preferred < elem_width {
            elem_x += alignment_offset(metrics.horizontal_alignment, elem_width, preferred);
            elem_width = preferred;
        }
    }

    if metrics.vertical_grow == GrowType::Pack {
        let preferred = preferred_size(metrics.fixed_min_y, metrics.relative_min_y, height);
        if preferred < elem_height {
            elem_y += alignment_offset(metrics.vertical_alignment, elem_height, preferred);
            elem_height = preferred;
        }
    }

    Rect::new(elem_x, elem_y, elem_width, elem_height)
}

/// A packed element's preferred size: the larger of its fixed minimum and
/// its relative minimum resolved against the requested total extent.
/// Unset minimums count as zero, so a packed element with no declared
/// minimum collapses.
fn preferred_size(fixed_min: i32, relative_min: i32, total: i32) -> i32 {
    let relative = if relative_min > 0 {
        relative_px(relative_min, total)
    } else {
        0
    };
    fixed_min.max(0).max(relative)
}

/// Offset of a packed element from the leading edge of its available box.
fn alignment_offset(alignment: Alignment, available: i32, preferred: i32) -> i32 {
    match alignment {
        Alignment::Leading => 0,
        Alignment::Center => available / 2 - preferred / 2,
        Alignment::Trailing => available - preferred,
    }
}

/// First-registered-wins collision pruning: scan children in registration
/// order, claiming cells in an occupancy map over the final grid extent;
/// any element overlapping an already-claimed cell is excluded outright
/// and claims nothing.
fn find_collisions(grid: &GridMetrics, children: &[ElementMetrics]) -> Vec<bool> {
    let width = grid.width();
    let mut claimed = vec![false; width * grid.height()];
    let mut collided = vec![false; children.len()];

    for (index, metrics) in children.iter().enumerate() {
        if metrics.is_excluded() {
            continue;
        }
        let first_x = metrics.cell_x as usize;
        let first_y = metrics.cell_y as usize;
        let span_x = metrics.cells_x.max(1) as usize;
        let span_y = metrics.cells_y.max(1) as usize;

        let mut cells = (0..span_y).flat_map(|dy| (0..span_x).map(move |dx| (dx, dy)));
        if cells.any(|(dx, dy)| claimed[(first_y + dy) * width + (first_x + dx)]) {
            collided[index] = true;
            continue;
        }
        for dy in 0..span_y {
            for dx in 0..span_x {
                claimed[(first_y + dy) * width + (first_x + dx)] = true;
            }
        }
    }

    collided
}
