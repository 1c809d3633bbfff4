//! Layered animation blending for 2D skeletal armatures.
//!
//! An [`Armature`] pairs a [`Skeleton`] with an [`Animation`] controller. Clips fade in and
//! out across layers and groups; every tick the controller hands each layer the weight the
//! layers below left unused, and each bone blends what it received before resolving its
//! world transform. A [`WorldClock`] ticks any number of [`Animatable`] targets from a single
//! time source.
//!
//! Asset parsing and rendering live outside this crate.

#![forbid(unsafe_code)]

mod error;
mod geometry;
mod model;
mod runtime;

pub use error::*;
pub use geometry::*;
pub use model::*;
pub use runtime::*;


#[cfg(test)]
mod model_tests;
