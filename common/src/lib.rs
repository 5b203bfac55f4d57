//! Common utilities for the orbital visualizer
//!
//! This crate provides the shared graphics setup and the orbit camera used
//! by the volumetric orbital viewer.

pub mod graphics;
pub mod camera;

pub use graphics::*;
pub use camera::*;
