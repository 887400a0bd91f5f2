//! Snap-to-item offset calculation for fling landings.
//!
//! Given a snapshot of the visible items, finds the scroll offset that aligns
//! the nearest item with an anchor position in the viewport, biased by the
//! fling direction. The snapshot is consumed, never retained; the calculation
//! is a pure function of its inputs.

use crate::geometry::Offset;
use crate::scrollable::Orientation;

/// Information about a single visible item in a scrolling list.
#[derive(Clone, Debug)]
pub struct ListItemInfo {
    /// Index of the item in the data source.
    pub index: usize,
    /// Offset of the item from the start of the viewport, in the main axis.
    pub offset: f32,
    /// Size of the item in the main axis.
    pub size: f32,
}

/// Snapshot of the currently visible items in a scrolling list.
#[derive(Clone, Debug, Default)]
pub struct ListLayoutInfo {
    /// Information about each visible item, in layout order.
    pub visible_items: Vec<ListItemInfo>,
    /// Total number of items in the list.
    pub total_items_count: usize,
    /// Size of the viewport in the main axis.
    pub viewport_size: f32,
    /// Content padding before the first item.
    pub before_content_padding: f32,
    /// Content padding after the last item.
    pub after_content_padding: f32,
}

/// Anchor policy: where in the viewport a snapped item should land.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SnapPosition {
    /// Item start aligned with the content area start.
    Start,
    /// Item centered in the content area.
    #[default]
    Center,
    /// Item end aligned with the content area end.
    End,
}

impl SnapPosition {
    /// Desired item position inside the viewport for this anchor.
    ///
    /// The content area is the viewport minus leading and trailing content
    /// padding. `item_index` and `item_count` are unused by the built-in
    /// anchors but part of the policy surface, matching the layout snapshot.
    pub fn position(
        &self,
        viewport_size: f32,
        item_size: f32,
        before_content_padding: f32,
        after_content_padding: f32,
        item_index: usize,
        item_count: usize,
    ) -> f32 {
        let _ = (item_index, item_count);
        let content_size = viewport_size - before_content_padding - after_content_padding;
        match self {
            SnapPosition::Start => 0.0,
            SnapPosition::Center => (content_size - item_size) / 2.0,
            SnapPosition::End => content_size - item_size,
        }
    }
}

/// Scroll offset that lands the fling on an item boundary.
///
/// Scans the visible items for the one closest to the anchor on the side the
/// fling is moving toward: forward flings (`velocity > 0`) pick the nearest
/// item at or after the anchor, everything else the nearest at or before. An
/// item sitting exactly on the anchor satisfies both directions. Returns
/// `f32::INFINITY` / `f32::NEG_INFINITY` when no candidate exists on the
/// requested side; callers must treat the sentinel as "no snap target", not
/// as an offset.
pub fn calculate_snap_offset(
    layout: &ListLayoutInfo,
    snap_position: SnapPosition,
    velocity: f32,
) -> f32 {
    let mut lower_bound_offset = f32::NEG_INFINITY;
    let mut upper_bound_offset = f32::INFINITY;

    for item in &layout.visible_items {
        let desired_distance = snap_position.position(
            layout.viewport_size,
            item.size,
            layout.before_content_padding,
            layout.after_content_padding,
            item.index,
            layout.total_items_count,
        );
        let offset = item.offset - desired_distance;

        // Closest item at or before the anchor.
        if offset <= 0.0 && offset > lower_bound_offset {
            lower_bound_offset = offset;
        }

        // Closest item at or after the anchor.
        if offset >= 0.0 && offset < upper_bound_offset {
            upper_bound_offset = offset;
        }
    }

    if velocity > 0.0 {
        upper_bound_offset
    } else {
        lower_bound_offset
    }
}

/// Direction hint for the fling-decay approach phase: the sign of the
/// velocity, zero included. The approach never needs a magnitude; the decay
/// itself runs in the content's fling animation.
pub fn calculate_approach_offset(velocity: f32, decay_offset: f32) -> f32 {
    let _ = decay_offset;
    if velocity == 0.0 {
        0.0
    } else {
        velocity.signum()
    }
}

/// Snap calculations over a live layout source.
pub trait SnapLayoutInfoProvider {
    fn calculate_approach_offset(&self, velocity: f32, decay_offset: f32) -> f32;
    fn calculate_snap_offset(&self, velocity: f32) -> f32;
}

/// [`SnapLayoutInfoProvider`] backed by a layout-snapshot source, typically a
/// closure reading a list state. A fresh snapshot is taken on every query.
pub struct ListSnapLayoutInfoProvider<L>
where
    L: Fn() -> ListLayoutInfo,
{
    layout: L,
    snap_position: SnapPosition,
}

impl<L> ListSnapLayoutInfoProvider<L>
where
    L: Fn() -> ListLayoutInfo,
{
    pub fn new(layout: L) -> Self {
        Self {
            layout,
            snap_position: SnapPosition::default(),
        }
    }

    pub fn with_snap_position(mut self, snap_position: SnapPosition) -> Self {
        self.snap_position = snap_position;
        self
    }
}

impl<L> SnapLayoutInfoProvider for ListSnapLayoutInfoProvider<L>
where
    L: Fn() -> ListLayoutInfo,
{
    fn calculate_approach_offset(&self, velocity: f32, decay_offset: f32) -> f32 {
        calculate_approach_offset(velocity, decay_offset)
    }

    fn calculate_snap_offset(&self, velocity: f32) -> f32 {
        let layout = (self.layout)();
        if layout.visible_items.is_empty() {
            log::warn!("snap query with no visible items; returning sentinel");
        }
        calculate_snap_offset(&layout, self.snap_position, velocity)
    }
}

/// Convenience for applying a scalar snap offset to a 2D scroll delta.
pub fn snap_offset_as_delta(offset: f32, orientation: Orientation) -> Offset {
    match orientation {
        Orientation::Horizontal => Offset::new(offset, 0.0),
        Orientation::Vertical => Offset::new(0.0, offset),
    }
}

#[cfg(test)]
#[path = "tests/snap_tests.rs"]
mod tests;
