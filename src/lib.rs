//! World demographics dashboard
//!
//! Coordination core for a multi-view dashboard over UN World Population
//! Prospects data: a 3D globe plus ten linked analytical views kept in sync
//! through a named-channel event dispatcher (brushing and linking).
//!
//! The core is platform-agnostic. The browser front end (`wasm` feature)
//! paints view scenes with egui; the CLI (`cli` feature) drives the same
//! [`dashboard::Dashboard`] from text commands.

pub mod config;
pub mod core;
pub mod dashboard;
pub mod time;
pub mod views;

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
mod app;
#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
mod theme;
#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
mod web;

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub use web::start;
