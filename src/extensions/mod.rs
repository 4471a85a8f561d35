// Copyright 2025 Cowboy AI, LLC.

//! Optional composition extensions
//!
//! Both extensions are ordinary templates: compose one in and its hook runs
//! on every later composition or construction that includes it.
//!
//! - [`collision`]: forbid or defer same-name method collisions
//! - [`required`]: promise members that must exist by instantiation time

pub mod collision;
pub mod required;

pub use collision::{collision, defer_collision, forbid_collision, CollisionPolicy, COLLISION_KEY};
pub use required::{require, required, Requirements, REQUIRED_KEY};
