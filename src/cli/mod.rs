//! CLI interface: terminal rendering
//!
//! # Components
//! - `display.rs`: Coloured rendering of corrections and run totals

pub mod display;

pub use display::Display;
