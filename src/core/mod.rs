//! Core application module
//!
//! Application entry point and Cosmic Application implementation

pub mod app;
