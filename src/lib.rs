//! Sinew - procedural full-body character animation
//!
//! Synthesizes a biped pose every frame from sparse run-time signals
//! instead of playing authored clips. Deterministic, frame-rate
//! independent, one animator per character.

pub mod animator;
pub mod core;
pub mod math;
pub mod pool;
pub mod pose;
pub mod stages;
