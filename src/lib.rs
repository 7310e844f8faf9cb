//! Find vacant lots in a geospatial vector dataset and plot them.
//!
//! [`lots::find_lots`] loads a file, checks it has `geometry` and status
//! columns, normalises geometries and keeps the records whose status
//! matches. [`viz::visualize`] shows the result in a native window.

pub mod app;
pub mod color;
pub mod data;
pub mod error;
pub mod lots;
pub mod state;
pub mod ui;
pub mod viz;
