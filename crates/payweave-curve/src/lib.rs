//! Payweave Curve — piecewise-linear liquidity curves.
//!
//! This crate provides:
//! - [`Point`] — one `(x, y)` pair of a curve: amount sent, amount delivered.
//! - [`LiquidityCurve`] — a non-decreasing piecewise-linear exchange-rate
//!   curve with forward/reverse evaluation, a pointwise-maximum `combine`,
//!   sequential `join` composition, y-shifting, and point-capped
//!   simplification.

pub mod curve;
mod segment;

// Re-exports for convenience.
pub use curve::{LiquidityCurve, Point};
