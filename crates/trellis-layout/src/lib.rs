//! # Trellis Layout
//!
//! Grid constraint-arbitration engine for the Trellis toolkit: given a
//! container's children and their declared constraints, produce an exact
//! integer-pixel rectangle for every child, recursing into children that
//! are themselves containers.
//!
//! ## Design Goals
//!
//! 1. **Deterministic arbitration**: identical inputs produce identical
//!    geometry; conflicts resolve by `max()` merge and truncating
//!    division, never by error
//! 2. **Exact fill**: resolved track sizes sum exactly to the requested
//!    extent whenever the constraints fit
//! 3. **Single pass**: one invocation builds, resolves, and discards one
//!    grid; no caching, no shared state between invocations
//! 4. **Thin collaborator seam**: containers supply metrics and receive
//!    geometry through one index-addressed trait
//!
//! The solver absorbs every conflict into geometry rather than raising
//! it: over-constrained grids overflow the requested region, constraints
//! reaching past the grid are skipped, and callers that need stricter
//! behavior compare [`GridMetrics::total_width`]/[`GridMetrics::total_height`]
//! against the extent they asked for.

pub mod grid;
pub mod metrics;
pub mod solve;

pub use grid::{AxisMetrics, GridMetrics, SpanConstraint, Track};
pub use metrics::{ContainerMetrics, ElementMetrics};
pub use solve::solve;

use trellis_core::Rect;

/// The collaborator seam: a container whose children can be arbitrated.
///
/// Children are addressed by registration index, which is also the order
/// the solver visits them in. That order matters when collision pruning
/// is on, where the first-registered claimant of a cell wins.
pub trait LayoutContainer {
    /// Number of children registered for layout.
    fn child_count(&self) -> usize;

    /// Declared layout metrics for the child at `index`. Containers
    /// return [`ElementMetrics::EMPTY`] for children they cannot place.
    fn child_metrics(&self, index: usize) -> ElementMetrics;

    /// Container-level metrics: cell padding and margin-collapse policy.
    fn container_metrics(&self) -> ContainerMetrics;

    /// Receive the arbitrated geometry for the child at `index`. Invoked
    /// exactly once per child per layout pass.
    fn set_child_rect(&mut self, index: usize, rect: Rect);

    /// Receive the resolved grid geometry, in case the container draws
    /// grid lines or debug overlays. Most containers ignore this.
    fn set_grid_metrics(&mut self, _metrics: &GridMetrics) {}

    /// Capability probe: the child at `index` as a nested container, if
    /// it is one. The solver recurses into whatever this returns.
    fn child_container_mut(&mut self, _index: usize) -> Option<&mut dyn LayoutContainer> {
        None
    }
}
