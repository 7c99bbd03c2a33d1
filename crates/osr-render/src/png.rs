//! ---
//! osr_section: "05-report-rendering"
//! osr_subsection: "module"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Heatmap and table rendering for regression reports."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
//! SVG rasterisation through resvg, using the host's installed fonts.

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use resvg::{tiny_skia, usvg};
use tracing::debug;

use crate::errors::{RenderError, Result};

/// Turns SVG documents into PNG files with one shared font database.
pub struct Rasterizer {
    options: usvg::Options<'static>,
}

impl Rasterizer {
    pub fn new(fontdb: usvg::fontdb::Database, font_family: &str) -> Self {
        Self {
            options: usvg::Options {
                font_family: font_family.to_owned(),
                fontdb: Arc::new(fontdb),
                ..usvg::Options::default()
            },
        }
    }

    /// Scans the host's fonts once; reuse the result for every panel of a report.
    pub fn with_system_fonts(font_family: &str) -> Self {
        let mut fontdb = usvg::fontdb::Database::new();
        fontdb.load_system_fonts();
        debug!(faces = fontdb.len(), "loaded system fonts");
        Self::new(fontdb, font_family)
    }

    /// Rasterise `svg` to PNG bytes `width_px` wide, keeping the aspect ratio.
    pub fn to_png(&self, svg: &str, width_px: u32) -> Result<Vec<u8>> {
        let tree = usvg::Tree::from_str(svg, &self.options)
            .map_err(|e| RenderError::Svg(e.to_string()))?;

        let size = tree.size();
        let scale = width_px as f32 / size.width();
        let height_px = (size.height() * scale).ceil() as u32;

        let mut pixmap = tiny_skia::Pixmap::new(width_px, height_px).ok_or(RenderError::Pixmap {
            width: width_px,
            height: height_px,
        })?;
        pixmap.fill(tiny_skia::Color::WHITE);
        resvg::render(
            &tree,
            tiny_skia::Transform::from_scale(scale, scale),
            &mut pixmap.as_mut(),
        );

        pixmap
            .encode_png()
            .map_err(|e| RenderError::Encode(e.to_string()))
    }

    pub fn write_png(&self, svg: &str, width_px: u32, path: &Path) -> Result<()> {
        let bytes = self.to_png(svg, width_px)?;
        fs::write(path, bytes).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl fmt::Debug for Rasterizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rasterizer")
            .field("font_family", &self.options.font_family)
            .field("faces", &self.options.fontdb.len())
            .finish()
    }
}
