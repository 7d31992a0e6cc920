//! Scanner window widgets

pub mod scanner_view;
