//! Animation system for Overscrolled
//!
//! Provides the physics-based spring animation that settles overscroll back
//! to rest, and the `Animatable` value holder that drives it frame by frame.
//!
//! Note: This module uses camelCase for method names (animateTo, snapTo) to
//! maintain 1:1 API parity with Jetpack Compose.

#![allow(non_snake_case)]

pub mod animatable;
pub mod spring;

pub use animatable::Animatable;
pub use spring::{Lerp, SpringScalar, SpringSpec};

pub mod prelude {
    pub use crate::animatable::Animatable;
    pub use crate::spring::{Lerp, SpringScalar, SpringSpec};
}
