//! Multi-modal capabilities for the Machi framework.
//!
//! This module groups audio and image generation/processing functionality.

pub mod audio;
pub mod image;


