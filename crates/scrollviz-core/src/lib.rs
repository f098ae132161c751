#![forbid(unsafe_code)]

//! Core: host-driven animation timing and canvas geometry.

pub mod animation;
pub mod geometry;
