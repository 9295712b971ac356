//! Renderers for evaluation artifacts
//!
//! Charts are written as standalone SVG documents and the failure report as
//! a self-contained HTML page. Every renderer takes an already computed
//! metric and returns the document as a string.

pub mod confusion;
pub mod curves;
pub mod failures;
pub mod pr_curve;
mod svg;

/// Escape text for embedding in HTML or SVG
pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
