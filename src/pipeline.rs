//! Identicon Pipeline - Single Entry Point
//!
//! CRITICAL: render MUST select the color before any drawing. No bypass.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use image::RgbImage;
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::{self, Cell};
use crate::hashing::{compute_manifest_hash, encode_hex, expand_digest, sha256_hex};
use crate::render::{self, CellRect, Rgb, CANVAS_SIZE};
use crate::{ENGINE_VERSION, MIN_ENGINE_VERSION};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Digest too short for color selection: got {0} bytes, need 3")]
    DigestTooShort(usize),

    #[error("Image encoding error: {0}")]
    Encode(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Manifest verification failed: {0}")]
    VerificationFailed(String),

    #[error("Manifest requires engine >= {0}, current is {1}")]
    EngineVersionMismatch(String, String),
}

/// A fully rendered identicon: every intermediate the pipeline produced,
/// assembled into one value. Nothing here outlives the invocation unless
/// the caller keeps it.
#[derive(Debug, Clone)]
pub struct Identicon {
    pub input: String,
    pub digest: Vec<u8>,
    pub color: Rgb,
    /// Surviving cells after the parity filter, original indices intact.
    pub cells: Vec<Cell>,
    /// One pixel rectangle per surviving cell, in the same order.
    pub pixel_map: Vec<CellRect>,
    pub canvas: RgbImage,
}

/// Manifest of one render, sufficient to reproduce and audit it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdenticonManifest {
    pub input: String,
    pub engine_version: String,
    pub engine_min_version: String,
    pub created_at: DateTime<Utc>,
    pub digest_hex: String,
    pub color: [u8; 3],
    pub visible_cells: usize,
    pub canvas_size: [u32; 2],
    pub export: ExportedPng,
    pub manifest_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedPng {
    pub filename: String,
    pub format: String,
    pub size: [u32; 2],
    pub data_base64: String,
    pub hash: String,
}

/// Run the whole pipeline for one input string.
///
/// The stages run in fixed order: digest expansion, color selection, grid
/// building, parity filtering, pixel mapping, raster fill. Color selection
/// runs before any drawing so a malformed digest fails before a canvas
/// exists.
pub fn render(input: &str) -> Result<Identicon, PipelineError> {
    let digest = expand_digest(input.as_bytes());

    let color = render::select_color(&digest)?;

    let cells = grid::discard_odd_cells(grid::build_grid(&digest));
    let pixel_map = render::pixel_map(&cells);
    let canvas = render::rasterize(color, &pixel_map);

    debug!(
        "rendered {} visible cells from {} input bytes",
        cells.len(),
        input.len()
    );

    Ok(Identicon {
        input: input.to_string(),
        digest,
        color,
        cells,
        pixel_map,
        canvas,
    })
}

impl Identicon {
    /// Output filename derived from the input string.
    pub fn png_filename(&self) -> String {
        format!("{}.png", self.input)
    }

    /// Encode the canvas to PNG bytes.
    pub fn encode_png(&self) -> Result<Vec<u8>, PipelineError> {
        render::encode_png(&self.canvas)
    }

    /// Write `<input>.png` into `out_dir`, overwriting any existing file.
    ///
    /// A failure here is an I/O failure only; the in-memory render stays
    /// valid and the caller may retry without recomputing.
    pub fn save(&self, out_dir: &Path) -> Result<PathBuf, PipelineError> {
        let bytes = self.encode_png()?;
        let path = out_dir.join(self.png_filename());
        fs::write(&path, &bytes)?;
        Ok(path)
    }

    /// Build the reproduction manifest for this render.
    pub fn manifest(&self) -> Result<IdenticonManifest, PipelineError> {
        let png = self.encode_png()?;

        let mut manifest = IdenticonManifest {
            input: self.input.clone(),
            engine_version: ENGINE_VERSION.to_string(),
            engine_min_version: MIN_ENGINE_VERSION.to_string(),
            created_at: Utc::now(),
            digest_hex: encode_hex(&self.digest),
            color: self.color.to_array(),
            visible_cells: self.cells.len(),
            canvas_size: [CANVAS_SIZE, CANVAS_SIZE],
            export: ExportedPng {
                filename: self.png_filename(),
                format: "png".to_string(),
                size: [CANVAS_SIZE, CANVAS_SIZE],
                data_base64: base64::Engine::encode(
                    &base64::engine::general_purpose::STANDARD,
                    &png,
                ),
                hash: sha256_hex(&png),
            },
            manifest_hash: String::new(), // Computed after
        };

        manifest.manifest_hash = compute_manifest_hash(&manifest)?;

        Ok(manifest)
    }
}

/// Check a manifest against the running engine and re-render its input.
///
/// Three gates, in order: engine version compatibility, manifest hash
/// integrity, and full reproduction (digest and PNG content hash of a
/// fresh render must match the recorded ones).
pub fn verify_manifest(manifest: &IdenticonManifest) -> Result<(), PipelineError> {
    check_engine_version(manifest)?;

    let mut unhashed = manifest.clone();
    unhashed.manifest_hash = String::new();
    let expected = compute_manifest_hash(&unhashed)?;
    if expected != manifest.manifest_hash {
        return Err(PipelineError::VerificationFailed(format!(
            "manifest hash mismatch: recorded {}, recomputed {}",
            manifest.manifest_hash, expected
        )));
    }

    let identicon = render(&manifest.input)?;
    let digest_hex = encode_hex(&identicon.digest);
    if digest_hex != manifest.digest_hex {
        return Err(PipelineError::VerificationFailed(format!(
            "digest mismatch for input {:?}: recorded {}, recomputed {}",
            manifest.input, manifest.digest_hex, digest_hex
        )));
    }

    let png = identicon.encode_png()?;
    let png_hash = sha256_hex(&png);
    if png_hash != manifest.export.hash {
        return Err(PipelineError::VerificationFailed(format!(
            "render hash mismatch for input {:?}: recorded {}, recomputed {}",
            manifest.input, manifest.export.hash, png_hash
        )));
    }

    Ok(())
}

fn check_engine_version(manifest: &IdenticonManifest) -> Result<(), PipelineError> {
    let engine_ver = semver::Version::parse(ENGINE_VERSION)
        .map_err(|_| PipelineError::VerificationFailed("Invalid engine version".into()))?;
    let min_ver = semver::Version::parse(&manifest.engine_min_version).map_err(|_| {
        PipelineError::VerificationFailed("Invalid manifest min version".into())
    })?;

    if engine_ver < min_ver {
        return Err(PipelineError::EngineVersionMismatch(
            manifest.engine_min_version.clone(),
            ENGINE_VERSION.to_string(),
        ));
    }

    Ok(())
}
