//! Foundation elements for Overscrolled: the dampened overscroll engine and
//! the snap-to-item offset calculator.
//!
//! Both components are consumed by an external presentation layer. The engine
//! turns drag deltas and fling velocities into a dampened offset, progress
//! notifications, and a spring settle-back; the snap calculator turns a
//! visible-item layout snapshot and a fling direction into an item-aligned
//! landing offset.

pub mod geometry;
pub mod overscroll;
pub mod scrollable;
pub mod snap;

pub use geometry::{Offset, Velocity};
pub use overscroll::{
    GesturePhase, OverscrollEffect, OverscrollHandler, ACTIVATION_FRACTION, DAMPENING_MULTIPLIER,
};
pub use scrollable::{Orientation, ScrollSource};
pub use snap::{
    calculate_approach_offset, calculate_snap_offset, ListItemInfo, ListLayoutInfo,
    ListSnapLayoutInfoProvider, SnapLayoutInfoProvider, SnapPosition,
};

pub mod prelude {
    pub use crate::geometry::{Offset, Velocity};
    pub use crate::overscroll::{GesturePhase, OverscrollEffect, OverscrollHandler};
    pub use crate::scrollable::{Orientation, ScrollSource};
    pub use crate::snap::{
        calculate_snap_offset, ListItemInfo, ListLayoutInfo, SnapLayoutInfoProvider, SnapPosition,
    };
}
