//! Perceptual field: from raw occupancy to reachable action possibilities.
//!
//! This module provides:
//! - Block-mean pooling of the occupancy grid into kernels
//! - Thresholding and occlusion of kernels into an action field
//! - Kernel density saliency of free space

pub mod action_field;
pub mod convolution;
pub mod saliency;

pub use action_field::{generate_action_field, ActionField};
pub use convolution::{convolve, KernelCell, KernelGrid, OccupancyGrid};
pub use saliency::SaliencyMap;
