//! Scanner session management module
//!
//! This module contains:
//! - Scanner state shown by the view
//! - The controller implementing start/stop/result handling
//! - Message types for scanner interactions
//! - Keyboard shortcuts

pub mod controller;
pub mod messages;
pub mod shortcuts;
pub mod state;
