//! Terminal preview of the rendered diagram.
//!
//! The surface's SVG is rasterized to the pixel width of the preview pane
//! and handed to `ratatui-image`, which picks the best graphics protocol
//! the terminal supports (falling back to half-block characters).

use std::time::Duration;

use ratatui_image::picker::Picker;
#[cfg(unix)]
use ratatui_image::picker::cap_parser::QueryStdioOptions;
use ratatui_image::protocol::StatefulProtocol;

use crate::export::{ExportError, rasterize_to_width};

const PICKER_QUERY_TIMEOUT_MS: u64 = 250;

/// A rasterized diagram ready to draw, tagged with the surface revision and
/// pane width it was built for.
pub struct PreviewImage {
    pub protocol: StatefulProtocol,
    pub revision: u64,
    pub width_cols: u16,
    pub height_rows: u16,
}

impl std::fmt::Debug for PreviewImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewImage")
            .field("revision", &self.revision)
            .field("width_cols", &self.width_cols)
            .field("height_rows", &self.height_rows)
            .finish_non_exhaustive()
    }
}

/// Create a picker for the current terminal. Must run before the terminal
/// enters raw mode, since it queries stdio.
pub fn create_picker(force_half_cell: bool) -> Option<Picker> {
    if force_half_cell {
        crate::perf::log_event("preview.create_picker", "protocol=halfblocks forced");
        return Some(Picker::halfblocks());
    }

    // The stdio capability query can hang some Windows consoles.
    #[cfg(not(unix))]
    {
        return Some(Picker::halfblocks());
    }

    #[cfg(unix)]
    {
        let mut options = QueryStdioOptions::default();
        options.timeout = Duration::from_millis(PICKER_QUERY_TIMEOUT_MS);
        let picker = Picker::from_query_stdio_with_options(options)
            .unwrap_or_else(|_| Picker::halfblocks());
        crate::perf::log_event(
            "preview.create_picker",
            format!("protocol={:?}", picker.protocol_type()),
        );
        Some(picker)
    }
}

/// Rasterize `svg` to fill `width_cols` terminal columns.
///
/// # Errors
///
/// Returns an error if the SVG cannot be decoded or has no area.
pub fn build_preview(
    picker: &Picker,
    svg: &str,
    revision: u64,
    width_cols: u16,
) -> Result<PreviewImage, ExportError> {
    let _scope = crate::perf::scope("preview.build");
    let (cell_width, cell_height) = picker.font_size();
    let width_px = u32::from(width_cols.max(1)) * u32::from(cell_width.max(1));
    let image = rasterize_to_width(svg, width_px)?;
    let height_rows = image.height().div_ceil(u32::from(cell_height.max(1)));
    let height_rows = u16::try_from(height_rows).unwrap_or(u16::MAX);
    crate::perf::log_event(
        "preview.build",
        format!(
            "revision={revision} cols={width_cols} rows={height_rows} px={}x{}",
            image.width(),
            image.height()
        ),
    );
    Ok(PreviewImage {
        protocol: picker.new_resize_protocol(image),
        revision,
        width_cols,
        height_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="100"><rect width="200" height="100" fill="#0000ff"/></svg>"##;

    #[test]
    fn test_build_preview_sizes_to_pane_width() {
        let picker = Picker::halfblocks();
        let (cell_width, cell_height) = picker.font_size();
        let preview = build_preview(&picker, WIDE, 3, 40).unwrap();

        let width_px = 40 * u32::from(cell_width);
        let expected_rows = (width_px / 2).div_ceil(u32::from(cell_height));
        assert_eq!(preview.revision, 3);
        assert_eq!(preview.width_cols, 40);
        // Float scaling may round the last pixel row up.
        let rows = u32::from(preview.height_rows);
        assert!(rows == expected_rows || rows == expected_rows + 1, "rows={rows}");
    }

    #[test]
    fn test_build_preview_rejects_invalid_svg() {
        let picker = Picker::halfblocks();
        assert!(build_preview(&picker, "<svg", 1, 40).is_err());
    }
}
