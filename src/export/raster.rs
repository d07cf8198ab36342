//! SVG rasterization with `resvg`.

use std::io::Cursor;
use std::sync::{Arc, LazyLock};

use image::{DynamicImage, ImageFormat, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{self, fontdb};

use super::ExportError;

static FONTS: LazyLock<Arc<fontdb::Database>> = LazyLock::new(|| {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    Arc::new(db)
});

/// Parse SVG text into a render tree ("decode").
///
/// # Errors
///
/// Returns [`ExportError::Decode`] when the markup is not valid SVG.
pub fn decode_svg(svg: &str) -> Result<usvg::Tree, ExportError> {
    let opts = usvg::Options {
        fontdb: Arc::clone(&FONTS),
        ..Default::default()
    };
    usvg::Tree::from_str(svg, &opts).map_err(|err| ExportError::Decode(err.to_string()))
}

/// Draw an SVG at `scale` times its natural size.
///
/// # Errors
///
/// Returns an error if the SVG cannot be decoded or has no area.
pub fn rasterize_svg(svg: &str, scale: f32) -> Result<RgbaImage, ExportError> {
    render_tree(&decode_svg(svg)?, scale)
}

fn render_tree(tree: &usvg::Tree, scale: f32) -> Result<RgbaImage, ExportError> {
    let size = tree.size();

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let width = (size.width() * scale).ceil() as u32;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let height = (size.height() * scale).ceil() as u32;
    if width == 0 || height == 0 {
        return Err(ExportError::EmptyImage);
    }

    let mut pixmap = Pixmap::new(width, height).ok_or(ExportError::EmptyImage)?;
    resvg::render(tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    // tiny-skia stores premultiplied alpha; image expects straight alpha.
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        rgba.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }
    RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| ExportError::Encode("pixel buffer does not match image size".to_string()))
}

/// Draw an SVG so that its width is `target_width_px`, keeping aspect ratio.
///
/// # Errors
///
/// Returns an error if the SVG cannot be decoded or has no area.
pub fn rasterize_to_width(svg: &str, target_width_px: u32) -> Result<DynamicImage, ExportError> {
    let tree = decode_svg(svg)?;
    let natural_width = tree.size().width();
    if natural_width <= 0.0 {
        return Err(ExportError::EmptyImage);
    }
    #[allow(clippy::cast_precision_loss)]
    let scale = target_width_px as f32 / natural_width;
    render_tree(&tree, scale).map(DynamicImage::ImageRgba8)
}

/// Encode an image as PNG bytes.
///
/// # Errors
///
/// Returns [`ExportError::Encode`] if the encoder fails.
pub fn encode_png(image: RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|err| ExportError::Encode(err.to_string()))?;
    Ok(bytes)
}
