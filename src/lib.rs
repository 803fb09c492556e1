//! IdentiForge Core - Deterministic Identicon Compiler
//!
//! # The Four Laws (Non-Negotiable)
//! 1. Input Is Identity
//! 2. Same Input, Same Pixels
//! 3. Blank Is Valid
//! 4. Manifests Enable Reproduction

pub mod grid;
pub mod hashing;
pub mod pipeline;
pub mod render;

pub use grid::{build_grid, discard_odd_cells, Cell, GRID_WIDTH};
pub use hashing::{compute_manifest_hash, canonical_json, encode_hex, expand_digest};
pub use pipeline::{render, verify_manifest, Identicon, IdenticonManifest, PipelineError};
pub use render::{pixel_map, rasterize, select_color, CellRect, Rgb, CANVAS_SIZE, CELL_SIZE};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const MIN_ENGINE_VERSION: &str = "1.0.0";
