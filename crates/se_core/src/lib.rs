//! Toolkit-free client state: input tracking, the fixed-step clock, rotate
//! timelines, and the globe view with its interaction model.

pub mod animation;
pub mod config;
pub mod globe;
pub mod input;
pub mod time;
