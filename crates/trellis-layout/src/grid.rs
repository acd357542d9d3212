//! Grid constraint state and the per-axis sizing passes.
//!
//! [`GridMetrics`] accumulates per-track and per-span size requirements
//! for one container, then resolves them into concrete sizes and start
//! offsets on demand. Tracks are index-addressed values owned by their
//! axis and scoped to a single layout invocation, so no state is shared
//! between passes except through the axis itself.
//!
//! Pass order is fixed and load-bearing:
//!
//! 1. [`AxisMetrics::resolve_initial`]: declared minimums become sizes
//! 2. [`AxisMetrics::apply_span_constraints`]: multi-span shortfalls
//! 3. [`AxisMetrics::stretch_unconstrained`]: leftover to free tracks
//! 4. [`AxisMetrics::stretch_equally`]: residual to every track
//! 5. [`AxisMetrics::recalc_starts`]: prefix-sum positions
//! 6. [`AxisMetrics::stretch_last`]: exact-fill correction, strictly last

use tracing::trace;

use crate::metrics::{ContainerMetrics, ElementMetrics};

/// Resolve an integer percentage of `total`, truncating toward zero.
pub(crate) fn relative_px(percent: i32, total: i32) -> i32 {
    ((i64::from(percent) * i64::from(total)) / 100) as i32
}

// ==================== Tracks and constraints ====================

/// Size and position state for one row or column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Track {
    /// Largest declared fixed minimum, in pixels. Zero or less = unset.
    pub fixed_min: i32,
    /// Largest declared relative minimum, in percent of the axis extent.
    /// Zero or less = unset.
    pub relative_min: i32,
    /// Set once a multi-span constraint covers this track, which excludes
    /// it from the unconstrained stretching pass.
    pub span_constrained: bool,
    /// Resolved size in pixels.
    pub size: i32,
    /// Resolved start offset in pixels: the running sum of every earlier
    /// track's size, recomputed wholesale by [`AxisMetrics::recalc_starts`].
    pub start: i32,
}

impl Track {
    /// A track no element has declared any size requirement for.
    fn is_unconstrained(&self) -> bool {
        !self.span_constrained && self.fixed_min <= 0 && self.relative_min <= 0
    }
}

/// A minimum that applies to the *sum* of `span` consecutive tracks,
/// not to any single one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanConstraint {
    /// Index of the first covered track.
    pub index: usize,
    /// Number of covered tracks, always at least 2.
    pub span: usize,
    pub fixed_min: i32,
    pub relative_min: i32,
}

// ==================== One axis ====================

/// One axis worth of tracks plus the span constraints that cover them.
///
/// The track list only ever grows, and every track below the current
/// extent is default-initialized before any sizing pass runs.
#[derive(Debug, Clone)]
pub struct AxisMetrics {
    tracks: Vec<Track>,
    constraints: Vec<SpanConstraint>,
}

impl AxisMetrics {
    fn new() -> Self {
        Self {
            tracks: vec![Track::default()],
            constraints: Vec::new(),
        }
    }

    /// Number of tracks on this axis. Always at least 1.
    pub fn count(&self) -> usize {
        self.tracks.len()
    }

    /// The track at `index`, if it is within the current extent.
    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// All tracks on this axis, for grid-line rendering and inspection.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Recorded span constraints on this axis.
    pub fn constraints(&self) -> &[SpanConstraint] {
        &self.constraints
    }

    /// Sum of all resolved track sizes.
    pub fn total(&self) -> i32 {
        self.tracks.iter().map(|t| t.size).sum()
    }

    /// Grows the axis to cover `index`. Never shrinks.
    fn ensure(&mut self, index: usize) {
        if index >= self.tracks.len() {
            self.tracks.resize(index + 1, Track::default());
        }
    }

    /// Fold a single-span element's minimums into one track.
    ///
    /// Cell padding contributed here is halved at edges interior to the
    /// grid and full at the grid boundary, then added to the fixed minimum
    /// before the `max()` merge. The relative minimum merges bare.
    fn merge_single(&mut self, index: usize, fixed: i32, relative: i32, cell_padding: i32) {
        let extent = self.tracks.len();
        let mut leading = cell_padding;
        if index > 0 {
            leading /= 2;
        }
        let mut trailing = cell_padding;
        if index < extent - 1 {
            trailing /= 2;
        }

        let track = &mut self.tracks[index];
        if fixed > 0 {
            track.fixed_min = track.fixed_min.max(fixed + leading + trailing);
        }
        track.relative_min = track.relative_min.max(relative);
    }

    /// Record a multi-span element's minimums as a [`SpanConstraint`] and
    /// flag every covered track. An element with no declared minimum
    /// records nothing.
    fn merge_span(&mut self, index: usize, span: usize, fixed: i32, relative: i32) {
        if fixed <= 0 && relative <= 0 {
            return;
        }
        self.constraints.push(SpanConstraint {
            index,
            span,
            fixed_min: fixed,
            relative_min: relative,
        });
        for track in &mut self.tracks[index..index + span] {
            track.span_constrained = true;
        }
    }

    /// Pass 1: resolve each track's declared minimums into an initial size.
    ///
    /// `size = max(fixed + 2·cell_padding, relative% · total + 2·cell_padding)`,
    /// taking unset requirements as zero.
    pub fn resolve_initial(&mut self, total: i32, cell_padding: i32) {
        for track in &mut self.tracks {
            let fixed = if track.fixed_min > 0 {
                track.fixed_min + cell_padding * 2
            } else {
                0
            };
            let relative = if track.relative_min > 0 {
                relative_px(track.relative_min, total) + cell_padding * 2
            } else {
                0
            };
            track.size = fixed.max(relative);
        }
    }

    /// Pass 2: grow spanned tracks until each span constraint's covered
    /// sum meets its target.
    ///
    /// The shortfall is distributed by truncating division; the remainder
    /// is dropped and reappears, if at all, in the last-track correction.
    pub fn apply_span_constraints(&mut self, total: i32, cell_padding: i32) {
        for i in 0..self.constraints.len() {
            let constraint = self.constraints[i];
            self.apply_span_constraint(constraint, total, cell_padding);
        }
    }

    fn apply_span_constraint(&mut self, constraint: SpanConstraint, total: i32, cell_padding: i32) {
        let last = constraint.index + constraint.span - 1;
        if last >= self.tracks.len() {
            // Reaches past the grid: inert, not an error
            return;
        }

        let fixed = if constraint.fixed_min > 0 {
            constraint.fixed_min + cell_padding * 2
        } else {
            0
        };
        let relative = if constraint.relative_min > 0 {
            relative_px(constraint.relative_min, total) + cell_padding * 2
        } else {
            0
        };
        let target = fixed.max(relative);
        if target == 0 {
            return;
        }

        let covered = &mut self.tracks[constraint.index..=last];
        let existing: i32 = covered.iter().map(|t| t.size).sum();
        let shortfall = target - existing;
        if shortfall <= 0 {
            return;
        }

        let per_track = shortfall / constraint.span as i32;
        trace!(
            index = constraint.index,
            span = constraint.span,
            shortfall,
            per_track,
            "distributing span shortfall"
        );
        for track in covered {
            track.size += per_track;
        }
    }

    /// Pass 3: distribute leftover space evenly across tracks that carry
    /// no requirement at all.
    ///
    /// Returns the deficit magnitude when declared sizes already exceed
    /// `total`; the tracks keep their over-budget sizes, and clipping,
    /// if any, is the caller's policy.
    pub fn stretch_unconstrained(&mut self, total: i32) -> i32 {
        let mut leftover = total;
        let mut eligible: i32 = 0;
        for track in &self.tracks {
            leftover -= track.size;
            if track.is_unconstrained() {
                eligible += 1;
            }
        }

        if leftover <= 0 {
            return -leftover;
        }
        if eligible == 0 {
            return 0;
        }

        let per_track = leftover / eligible;
        for track in self.tracks.iter_mut().filter(|t| t.is_unconstrained()) {
            track.size += per_track;
        }
        0
    }

    /// Pass 4: distribute the remaining residue evenly across *all*
    /// tracks. A negative leftover is a no-op: over-constrained axes
    /// overflow rather than producing negative sizes.
    pub fn stretch_equally(&mut self, total: i32) {
        let leftover = total - self.total();
        if leftover <= 0 {
            return;
        }

        let per_track = leftover / self.tracks.len() as i32;
        for track in &mut self.tracks {
            track.size += per_track;
        }
    }

    /// Pass 5: prefix-sum sizes into start offsets, wholesale.
    pub fn recalc_starts(&mut self) {
        let mut position = 0;
        for track in &mut self.tracks {
            track.start = position;
            position += track.size;
        }
    }

    /// Pass 6: force the final track to end exactly at `total`, absorbing
    /// any rounding shortfall from the truncating divisions. Only grows;
    /// an over-budget axis is left overflowing.
    pub fn stretch_last(&mut self, total: i32) {
        if let Some(track) = self.tracks.last_mut() {
            if track.start + track.size < total {
                track.size = total - track.start;
            }
        }
    }
}

// ==================== The grid ====================

/// Arbitrated grid sizes and positions for one container, built fresh per
/// layout invocation.
#[derive(Debug, Clone)]
pub struct GridMetrics {
    columns: AxisMetrics,
    rows: AxisMetrics,
    metrics: ContainerMetrics,
}

impl GridMetrics {
    /// A 1×1 grid carrying the given container-level metrics.
    pub fn new(metrics: ContainerMetrics) -> Self {
        Self {
            columns: AxisMetrics::new(),
            rows: AxisMetrics::new(),
            metrics,
        }
    }

    /// Grid width in cells.
    pub fn width(&self) -> usize {
        self.columns.count()
    }

    /// Grid height in cells.
    pub fn height(&self) -> usize {
        self.rows.count()
    }

    /// Column-axis state, for grid-line rendering and inspection.
    pub fn columns(&self) -> &AxisMetrics {
        &self.columns
    }

    /// Row-axis state, for grid-line rendering and inspection.
    pub fn rows(&self) -> &AxisMetrics {
        &self.rows
    }

    /// The container-level metrics this grid was built with.
    pub fn container_metrics(&self) -> ContainerMetrics {
        self.metrics
    }

    /// Enlarges the grid if necessary to contain the given cell
    /// coordinates. Never shrinks.
    pub fn ensure_extent(&mut self, x: usize, y: usize) {
        self.columns.ensure(x);
        self.rows.ensure(y);
    }

    /// Merge one element's declared constraints into the grid.
    ///
    /// Excluded elements and elements reaching past the current extent
    /// merge nothing. A 1-span axis folds into its track by `max()`; a
    /// multi-span axis with a declared minimum records a span constraint.
    pub fn merge_element(&mut self, element: &ElementMetrics) {
        if element.is_excluded() {
            return;
        }
        let x = element.cell_x as usize;
        let y = element.cell_y as usize;
        let span_x = element.cells_x.max(1) as usize;
        let span_y = element.cells_y.max(1) as usize;
        if x + span_x - 1 >= self.width() || y + span_y - 1 >= self.height() {
            return;
        }

        let cell_padding = self.metrics.cell_padding;
        if span_x > 1 {
            self.columns
                .merge_span(x, span_x, element.fixed_min_x, element.relative_min_x);
        } else {
            self.columns
                .merge_single(x, element.fixed_min_x, element.relative_min_x, cell_padding);
        }
        if span_y > 1 {
            self.rows
                .merge_span(y, span_y, element.fixed_min_y, element.relative_min_y);
        } else {
            self.rows
                .merge_single(y, element.fixed_min_y, element.relative_min_y, cell_padding);
        }
    }

    /// Resolve both axes into final sizes and starts, in the fixed pass
    /// order. Returns the (column, row) deficits reported by the
    /// unconstrained stretch, nonzero when the axis is over budget.
    pub fn resolve(&mut self, width: i32, height: i32) -> (i32, i32) {
        let cell_padding = self.metrics.cell_padding;
        let column_deficit = Self::resolve_axis(&mut self.columns, width, cell_padding);
        let row_deficit = Self::resolve_axis(&mut self.rows, height, cell_padding);
        (column_deficit, row_deficit)
    }

    fn resolve_axis(axis: &mut AxisMetrics, total: i32, cell_padding: i32) -> i32 {
        axis.resolve_initial(total, cell_padding);
        axis.apply_span_constraints(total, cell_padding);
        let deficit = axis.stretch_unconstrained(total);
        axis.stretch_equally(total);
        axis.recalc_starts();
        axis.stretch_last(total);
        deficit
    }

    /// Resolved width of column `x`, or 0 if out of bounds.
    pub fn cell_width(&self, x: usize) -> i32 {
        self.columns.track(x).map_or(0, |t| t.size)
    }

    /// Resolved height of row `y`, or 0 if out of bounds.
    pub fn cell_height(&self, y: usize) -> i32 {
        self.rows.track(y).map_or(0, |t| t.size)
    }

    /// Resolved left edge of column `x`, or 0 if out of bounds.
    pub fn cell_left(&self, x: usize) -> i32 {
        self.columns.track(x).map_or(0, |t| t.start)
    }

    /// Resolved top edge of row `y`, or 0 if out of bounds.
    pub fn cell_top(&self, y: usize) -> i32 {
        self.rows.track(y).map_or(0, |t| t.start)
    }

    /// Sum of all resolved column sizes. Strict callers compare this
    /// against the requested width to detect an infeasible layout.
    pub fn total_width(&self) -> i32 {
        self.columns.total()
    }

    /// Sum of all resolved row sizes. Strict callers compare this against
    /// the requested height to detect an infeasible layout.
    pub fn total_height(&self) -> i32 {
        self.rows.total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis_with(tracks: usize) -> AxisMetrics {
        let mut axis = AxisMetrics::new();
        axis.ensure(tracks - 1);
        axis
    }

    #[test]
    fn test_extent_only_grows() {
        let mut grid = GridMetrics::new(ContainerMetrics::new());
        assert_eq!((grid.width(), grid.height()), (1, 1));

        grid.ensure_extent(3, 1);
        assert_eq!((grid.width(), grid.height()), (4, 2));

        // Smaller request never shrinks
        grid.ensure_extent(0, 0);
        assert_eq!((grid.width(), grid.height()), (4, 2));

        // Newly exposed tracks are zero-initialized
        assert_eq!(grid.columns().track(3), Some(&Track::default()));
    }

    #[test]
    fn test_merge_is_monotonic_and_order_independent() {
        let mut forward = GridMetrics::new(ContainerMetrics::new());
        let mut reverse = GridMetrics::new(ContainerMetrics::new());

        let mut small = ElementMetrics::new(0, 0);
        small.add_min_width(40);
        let mut large = ElementMetrics::new(0, 0);
        large.add_min_width(90);

        forward.merge_element(&small);
        forward.merge_element(&large);
        reverse.merge_element(&large);
        reverse.merge_element(&small);

        assert_eq!(forward.columns().track(0).unwrap().fixed_min, 90);
        assert_eq!(reverse.columns().track(0).unwrap().fixed_min, 90);
    }

    #[test]
    fn test_merge_halves_interior_cell_padding() {
        let metrics = ContainerMetrics::new().with_cell_padding(8);
        let mut grid = GridMetrics::new(metrics);
        grid.ensure_extent(2, 0);

        let mut first = ElementMetrics::new(0, 0);
        first.add_min_width(100);
        let mut middle = ElementMetrics::new(1, 0);
        middle.add_min_width(100);
        let mut last = ElementMetrics::new(2, 0);
        last.add_min_width(100);
        grid.merge_element(&first);
        grid.merge_element(&middle);
        grid.merge_element(&last);

        // Boundary edge keeps full padding, interior edge is halved
        assert_eq!(grid.columns().track(0).unwrap().fixed_min, 100 + 8 + 4);
        assert_eq!(grid.columns().track(1).unwrap().fixed_min, 100 + 4 + 4);
        assert_eq!(grid.columns().track(2).unwrap().fixed_min, 100 + 4 + 8);
    }

    #[test]
    fn test_merge_interior_test_is_per_axis() {
        // A 3-wide, 1-tall grid: the single row is both first and last on
        // its own axis, so its padding must stay full on both edges.
        let metrics = ContainerMetrics::new().with_cell_padding(8);
        let mut grid = GridMetrics::new(metrics);
        grid.ensure_extent(2, 0);

        let mut element = ElementMetrics::new(1, 0);
        element.add_min_height(50);
        grid.merge_element(&element);

        assert_eq!(grid.rows().track(0).unwrap().fixed_min, 50 + 8 + 8);
    }

    #[test]
    fn test_multi_span_records_constraint_and_flags_tracks() {
        let mut grid = GridMetrics::new(ContainerMetrics::new());
        grid.ensure_extent(3, 0);

        let mut element = ElementMetrics::spanning(1, 0, 2, 1);
        element.add_min_width(100);
        grid.merge_element(&element);

        let constraints = grid.columns().constraints();
        assert_eq!(constraints.len(), 1);
        assert_eq!(constraints[0].index, 1);
        assert_eq!(constraints[0].span, 2);
        assert_eq!(constraints[0].fixed_min, 100);

        assert!(!grid.columns().track(0).unwrap().span_constrained);
        assert!(grid.columns().track(1).unwrap().span_constrained);
        assert!(grid.columns().track(2).unwrap().span_constrained);
        assert!(!grid.columns().track(3).unwrap().span_constrained);
    }

    #[test]
    fn test_multi_span_without_minimum_records_nothing() {
        let mut grid = GridMetrics::new(ContainerMetrics::new());
        grid.ensure_extent(2, 0);

        grid.merge_element(&ElementMetrics::spanning(0, 0, 3, 1));

        assert!(grid.columns().constraints().is_empty());
        assert!(!grid.columns().track(0).unwrap().span_constrained);
    }

    #[test]
    fn test_resolve_initial_takes_larger_of_fixed_and_relative() {
        let mut axis = axis_with(2);
        axis.tracks[0].fixed_min = 80;
        axis.tracks[0].relative_min = 10; // 10% of 400 = 40, loses to 80
        axis.tracks[1].relative_min = 50; // 50% of 400 = 200

        axis.resolve_initial(400, 0);

        assert_eq!(axis.tracks[0].size, 80);
        assert_eq!(axis.tracks[1].size, 200);
    }

    #[test]
    fn test_span_shortfall_distributes_evenly() {
        // Two columns at 40 each, spanned by a 100px minimum: each gains
        // (100 - 80) / 2 = 10.
        let mut axis = axis_with(2);
        axis.tracks[0].size = 40;
        axis.tracks[1].size = 40;
        axis.constraints.push(SpanConstraint {
            index: 0,
            span: 2,
            fixed_min: 100,
            relative_min: -1,
        });

        axis.apply_span_constraints(400, 0);

        assert_eq!(axis.tracks[0].size, 50);
        assert_eq!(axis.tracks[1].size, 50);
    }

    #[test]
    fn test_span_shortfall_remainder_is_dropped() {
        let mut axis = axis_with(3);
        axis.constraints.push(SpanConstraint {
            index: 0,
            span: 3,
            fixed_min: 100,
            relative_min: -1,
        });

        axis.apply_span_constraints(400, 0);

        // 100 / 3 truncates to 33; the remainder is absorbed later by the
        // last-track correction, not here
        assert_eq!(axis.tracks.iter().map(|t| t.size).sum::<i32>(), 99);
    }

    #[test]
    fn test_span_past_extent_is_inert() {
        let mut axis = axis_with(2);
        axis.constraints.push(SpanConstraint {
            index: 1,
            span: 2,
            fixed_min: 100,
            relative_min: -1,
        });

        axis.apply_span_constraints(400, 0);

        assert_eq!(axis.tracks[0].size, 0);
        assert_eq!(axis.tracks[1].size, 0);
    }

    #[test]
    fn test_satisfied_span_changes_nothing() {
        let mut axis = axis_with(2);
        axis.tracks[0].size = 60;
        axis.tracks[1].size = 60;
        axis.constraints.push(SpanConstraint {
            index: 0,
            span: 2,
            fixed_min: 100,
            relative_min: -1,
        });

        axis.apply_span_constraints(400, 0);

        assert_eq!(axis.tracks[0].size, 60);
        assert_eq!(axis.tracks[1].size, 60);
    }

    #[test]
    fn test_unconstrained_stretch_skips_constrained_tracks() {
        let mut axis = axis_with(3);
        axis.tracks[0].fixed_min = 100;
        axis.tracks[0].size = 100;
        axis.tracks[1].span_constrained = true;

        let deficit = axis.stretch_unconstrained(400);

        // Only track 2 is unconstrained; it takes all 300 leftover
        assert_eq!(deficit, 0);
        assert_eq!(axis.tracks[1].size, 0);
        assert_eq!(axis.tracks[2].size, 300);
    }

    #[test]
    fn test_unconstrained_stretch_reports_deficit() {
        let mut axis = axis_with(2);
        axis.tracks[0].size = 300;
        axis.tracks[1].size = 200;

        let deficit = axis.stretch_unconstrained(400);

        assert_eq!(deficit, 100);
        // Over-budget sizes are kept, not clipped
        assert_eq!(axis.tracks[0].size, 300);
        assert_eq!(axis.tracks[1].size, 200);
    }

    #[test]
    fn test_equal_stretch_feeds_every_track() {
        let mut axis = axis_with(2);
        axis.tracks[0].size = 100;
        axis.tracks[1].size = 100;

        axis.stretch_equally(260);

        assert_eq!(axis.tracks[0].size, 130);
        assert_eq!(axis.tracks[1].size, 130);
    }

    #[test]
    fn test_equal_stretch_clamps_negative_leftover() {
        let mut axis = axis_with(2);
        axis.tracks[0].size = 300;
        axis.tracks[1].size = 200;

        axis.stretch_equally(400);

        assert_eq!(axis.tracks[0].size, 300);
        assert_eq!(axis.tracks[1].size, 200);
    }

    #[test]
    fn test_starts_are_exact_prefix_sums() {
        let mut axis = axis_with(3);
        axis.tracks[0].size = 50;
        axis.tracks[1].size = 70;
        axis.tracks[2].size = 30;

        axis.recalc_starts();

        assert_eq!(axis.tracks[0].start, 0);
        assert_eq!(axis.tracks[1].start, 50);
        assert_eq!(axis.tracks[2].start, 120);
    }

    #[test]
    fn test_last_track_absorbs_rounding_shortfall() {
        let mut axis = axis_with(3);
        for track in &mut axis.tracks {
            track.size = 33;
        }
        axis.recalc_starts();

        axis.stretch_last(100);

        assert_eq!(axis.tracks[2].size, 34);
        assert_eq!(axis.total(), 100);
    }

    #[test]
    fn test_last_track_never_shrinks_an_overflow() {
        let mut axis = axis_with(2);
        axis.tracks[0].size = 300;
        axis.tracks[1].size = 200;
        axis.recalc_starts();

        axis.stretch_last(400);

        assert_eq!(axis.tracks[1].size, 200);
        assert_eq!(axis.total(), 500);
    }

    #[test]
    fn test_resolve_fills_exactly_for_any_track_count() {
        for columns in 1..=9 {
            let mut grid = GridMetrics::new(ContainerMetrics::new());
            grid.ensure_extent(columns - 1, 0);

            grid.resolve(1000, 600);

            assert_eq!(grid.total_width(), 1000, "{columns} columns");
            assert_eq!(grid.total_height(), 600);
        }
    }

    #[test]
    fn test_resolve_does_not_starve_declared_tracks() {
        // One fixed column plus two free ones: the free tracks split the
        // leftover from the unconstrained pass before the equal pass runs.
        let metrics = ContainerMetrics::new();
        let mut grid = GridMetrics::new(metrics);
        grid.ensure_extent(2, 0);
        let mut fixed = ElementMetrics::new(0, 0);
        fixed.add_min_width(400);
        grid.merge_element(&fixed);

        grid.resolve(1000, 100);

        assert_eq!(grid.cell_width(0), 400);
        assert_eq!(grid.cell_width(1), 300);
        assert_eq!(grid.cell_width(2), 300);
        assert_eq!(grid.total_width(), 1000);
    }

    #[test]
    fn test_out_of_bounds_accessors_return_zero() {
        let mut grid = GridMetrics::new(ContainerMetrics::new());
        grid.resolve(100, 100);

        assert_eq!(grid.cell_width(5), 0);
        assert_eq!(grid.cell_left(5), 0);
        assert_eq!(grid.cell_height(1), 0);
        assert_eq!(grid.cell_top(1), 0);
    }
}
