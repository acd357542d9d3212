//! Declared layout metrics: what a container and its children ask for,
//! before arbitration turns the requests into geometry.

use trellis_core::{Alignment, GrowType, Insets};

/// Container-level layout metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContainerMetrics {
    /// Spacing the container reserves between and around grid cells, in
    /// pixels, independent of any element's own padding.
    pub cell_padding: i32,
    /// Combine cell padding and element padding by `max()` instead of
    /// summing them.
    pub collapse_margins: bool,
}

impl ContainerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cell_padding(mut self, amount: i32) -> Self {
        self.cell_padding = amount;
        self
    }

    pub fn with_collapse_margins(mut self, collapse: bool) -> Self {
        self.collapse_margins = collapse;
        self
    }
}

/// Per-child layout metrics: grid placement, padding, grow policy,
/// alignment, and minimum-size constraints.
///
/// Minimums are monotonic: the setters only ever raise them, so when
/// several sources constrain the same element the largest minimum wins
/// regardless of the order they arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementMetrics {
    /// The X coordinate, in cells, of the child element. Negative means
    /// the element is excluded from layout and receives a zero rectangle.
    pub cell_x: i32,
    /// The Y coordinate, in cells, of the child element. Negative means
    /// the element is excluded from layout and receives a zero rectangle.
    pub cell_y: i32,
    /// The number of cells wide the child element occupies (usually 1).
    pub cells_x: i32,
    /// The number of cells high the child element occupies (usually 1).
    pub cells_y: i32,
    /// Space there must be between the element and the borders of its cell.
    pub padding: Insets,
    pub horizontal_grow: GrowType,
    pub vertical_grow: GrowType,
    pub horizontal_alignment: Alignment,
    pub vertical_alignment: Alignment,
    /// Pixels wide the element is not allowed to shrink below. −1 = unset.
    pub fixed_min_x: i32,
    /// Percent of *total container width* the element is not allowed to
    /// shrink below. −1 = unset.
    pub relative_min_x: i32,
    /// Pixels tall the element is not allowed to shrink below. −1 = unset.
    pub fixed_min_y: i32,
    /// Percent of *total container height* the element is not allowed to
    /// shrink below. −1 = unset.
    pub relative_min_y: i32,
}

impl ElementMetrics {
    /// Metrics for an element that takes no part in layout. Returned by
    /// containers for lookup misses.
    pub const EMPTY: ElementMetrics = ElementMetrics::spanning(-1, -1, 0, 0);

    /// Metrics for a single-cell element at the given cell coordinates.
    pub const fn new(cell_x: i32, cell_y: i32) -> Self {
        Self::spanning(cell_x, cell_y, 1, 1)
    }

    /// Metrics for an element spanning a block of cells.
    pub const fn spanning(cell_x: i32, cell_y: i32, cells_x: i32, cells_y: i32) -> Self {
        Self {
            cell_x,
            cell_y,
            cells_x,
            cells_y,
            padding: Insets::ZERO,
            horizontal_grow: GrowType::Fill,
            vertical_grow: GrowType::Fill,
            horizontal_alignment: Alignment::Center,
            vertical_alignment: Alignment::Center,
            fixed_min_x: -1,
            relative_min_x: -1,
            fixed_min_y: -1,
            relative_min_y: -1,
        }
    }

    /// Insets all four sides of the element inwards from its cell borders.
    pub fn set_padding(&mut self, amount: i32) {
        self.padding = Insets::uniform(amount);
    }

    /// Constrain the element to be at least `amount` pixels wide.
    pub fn add_min_width(&mut self, amount: i32) {
        self.fixed_min_x = self.fixed_min_x.max(amount);
    }

    /// Constrain the element to be at least `amount` pixels tall.
    pub fn add_min_height(&mut self, amount: i32) {
        self.fixed_min_y = self.fixed_min_y.max(amount);
    }

    /// Constrain the element to at least `percent` of the container width.
    pub fn add_min_percent_width(&mut self, percent: i32) {
        self.relative_min_x = self.relative_min_x.max(percent);
    }

    /// Constrain the element to at least `percent` of the container height.
    pub fn add_min_percent_height(&mut self, percent: i32) {
        self.relative_min_y = self.relative_min_y.max(percent);
    }

    /// Whether this element is excluded from layout by its placement.
    pub fn is_excluded(&self) -> bool {
        self.cell_x < 0 || self.cell_y < 0
    }
}

impl Default for ElementMetrics {
    fn default() -> Self {
        Self::new(0, 0)
    }
}
