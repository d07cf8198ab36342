//! Terminal UI components.
//!
//! The screen is split into the control panel (diagram source plus option
//! fields) and the preview, with a status line underneath.

mod overlays;
mod panel;
mod render;
mod status;

pub use render::{panel_divider_column, panel_width_cols, preview_area, render, split_columns};

#[cfg(test)]
mod tests;
