#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

//! Sense-of-control action planner.
//!
//! An agent sits at a fixed screen position while an obstacle field scrolls
//! past it. Each decision step the occupancy grid is pooled into kernels,
//! unreachable kernels are discarded, and an action goal is chosen by fusing a
//! top-down (cognitive) pick with a bottom-up saliency map. Two confidence
//! scalars track how much control the agent believes it has.

pub mod simulation;
