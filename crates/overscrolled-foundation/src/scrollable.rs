//! Scroll vocabulary shared by the overscroll engine and the snap calculator.

/// Orientation for scrolling - horizontal or vertical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Classifies where a scroll delta came from.
///
/// Only deltas produced by direct user dragging are eligible for overscroll
/// capture; everything else (programmatic scrolls, nested fling remainders)
/// passes straight through to the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollSource {
    /// Delta produced by the user's pointer or touch drag.
    UserInput,
    /// Delta produced by anything else, e.g. `scroll_to` calls or animations.
    SideEffect,
}
