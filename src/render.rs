//! Raster System - Color Selection, Pixel Mapping, Canvas Fill
//!
//! Decodes surviving cell indices back into pixel rectangles and fills them
//! on a fixed 300x300 canvas. No anti-aliasing, no transparency, solid
//! overwrite only.

use std::io::Cursor;

use image::{ImageFormat, RgbImage};

use crate::grid::{Cell, GRID_WIDTH};
use crate::pipeline::PipelineError;

/// Edge length of one grid cell in pixels.
pub const CELL_SIZE: u32 = 60;

/// Edge length of the square canvas in pixels.
pub const CANVAS_SIZE: u32 = GRID_WIDTH as u32 * CELL_SIZE;

const BACKGROUND: image::Rgb<u8> = image::Rgb([255, 255, 255]);

/// The fill color derived from the digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// One cell's footprint on the canvas, in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub top_left: (u32, u32),
    pub bottom_right: (u32, u32),
}

/// Take the first three digest bytes as the fill color.
///
/// A digest shorter than 3 bytes is a configuration error, not a render
/// input: fail fast rather than substitute a default color.
pub fn select_color(digest: &[u8]) -> Result<Rgb, PipelineError> {
    if digest.len() < 3 {
        return Err(PipelineError::DigestTooShort(digest.len()));
    }
    Ok(Rgb {
        r: digest[0],
        g: digest[1],
        b: digest[2],
    })
}

/// Decode each surviving cell's row-major index into its pixel rectangle.
///
/// Inverse of the numbering assigned at grid construction:
/// `column = index % GRID_WIDTH`, `row = index / GRID_WIDTH`.
pub fn pixel_map(cells: &[Cell]) -> Vec<CellRect> {
    cells
        .iter()
        .map(|cell| {
            let column = (cell.index % GRID_WIDTH) as u32;
            let row = (cell.index / GRID_WIDTH) as u32;
            let top_left = (column * CELL_SIZE, row * CELL_SIZE);
            CellRect {
                top_left,
                bottom_right: (top_left.0 + CELL_SIZE, top_left.1 + CELL_SIZE),
            }
        })
        .collect()
}

/// Fill each rectangle with the solid color on a white canvas.
///
/// Rectangle bounds are inclusive; edges shared with the canvas border are
/// clamped, and fills overlapping at shared cell edges overwrite.
pub fn rasterize(color: Rgb, rects: &[CellRect]) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(CANVAS_SIZE, CANVAS_SIZE, BACKGROUND);
    let fill = image::Rgb(color.to_array());
    for rect in rects {
        let x_end = rect.bottom_right.0.min(canvas.width() - 1);
        let y_end = rect.bottom_right.1.min(canvas.height() - 1);
        for y in rect.top_left.1..=y_end {
            for x in rect.top_left.0..=x_end {
                canvas.put_pixel(x, y, fill);
            }
        }
    }
    canvas
}

/// Encode the canvas to PNG bytes. Persistence stays with the caller.
pub fn encode_png(canvas: &RgbImage) -> Result<Vec<u8>, PipelineError> {
    let mut bytes = Vec::new();
    canvas.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_is_first_three_bytes() {
        let color = select_color(&[252, 63, 249, 142]).unwrap();
        assert_eq!(color, Rgb { r: 252, g: 63, b: 249 });
    }

    #[test]
    fn test_short_digest_fails_fast() {
        let err = select_color(&[1, 2]).unwrap_err();
        assert!(matches!(err, PipelineError::DigestTooShort(2)));
    }

    #[test]
    fn test_pixel_map_decodes_row_major_indices() {
        let cells: Vec<Cell> = [0usize, 1, 5, 24]
            .iter()
            .map(|&index| Cell { value: 0, index })
            .collect();
        let rects = pixel_map(&cells);

        assert_eq!(rects[0].top_left, (0, 0));
        assert_eq!(rects[0].bottom_right, (60, 60));
        assert_eq!(rects[1].top_left, (60, 0));
        assert_eq!(rects[2].top_left, (0, 60));
        assert_eq!(rects[3].top_left, (240, 240));
        assert_eq!(rects[3].bottom_right, (300, 300));
    }

    #[test]
    fn test_rasterize_fills_only_mapped_cells() {
        let color = Rgb { r: 10, g: 20, b: 30 };
        let rects = pixel_map(&[Cell { value: 0, index: 0 }]);
        let canvas = rasterize(color, &rects);

        assert_eq!(canvas.dimensions(), (CANVAS_SIZE, CANVAS_SIZE));
        assert_eq!(*canvas.get_pixel(0, 0), image::Rgb([10, 20, 30]));
        assert_eq!(*canvas.get_pixel(59, 59), image::Rgb([10, 20, 30]));
        // Opposite corner stays background
        assert_eq!(*canvas.get_pixel(299, 299), image::Rgb([255, 255, 255]));
    }

    #[test]
    fn test_rasterize_clamps_at_canvas_edge() {
        let color = Rgb { r: 1, g: 2, b: 3 };
        let rects = pixel_map(&[Cell { value: 0, index: 24 }]);
        let canvas = rasterize(color, &rects);
        assert_eq!(*canvas.get_pixel(299, 299), image::Rgb([1, 2, 3]));
    }

    #[test]
    fn test_empty_map_renders_blank_canvas() {
        let canvas = rasterize(Rgb { r: 0, g: 0, b: 0 }, &[]);
        assert!(canvas.pixels().all(|p| *p == image::Rgb([255, 255, 255])));
    }

    #[test]
    fn test_encode_png_magic_bytes() {
        let canvas = rasterize(Rgb { r: 0, g: 0, b: 0 }, &[]);
        let bytes = encode_png(&canvas).unwrap();
        assert_eq!(&bytes[..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}
