//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and operations
//! - Stable id types and handle maps
//! - Countdown timers driven by frame delta-time
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod time;
pub mod logging;
