//! Export of the displayed diagram as SVG or PNG.
//!
//! Exporting is split in two so the expensive half can run off the UI
//! thread: [`prepare`] checks the surface and serializes the vector node
//! synchronously, then [`ExportJob::run`] produces the file bytes.

mod raster;
mod sink;

pub use raster::{decode_svg, encode_png, rasterize_svg, rasterize_to_width};
pub use sink::{DirectorySink, DownloadSink};

use std::fmt;
use std::path::PathBuf;

use crate::surface::DisplaySurface;

pub const SVG_FILE_NAME: &str = "mermaid-diagram.svg";
pub const PNG_FILE_NAME: &str = "mermaid-diagram.png";
pub const SVG_MIME_TYPE: &str = "image/svg+xml;charset=utf-8";
pub const PNG_MIME_TYPE: &str = "image/png";

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Svg,
    Png,
}

impl ExportFormat {
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Svg => SVG_FILE_NAME,
            Self::Png => PNG_FILE_NAME,
        }
    }

    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Svg => SVG_MIME_TYPE,
            Self::Png => PNG_MIME_TYPE,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Svg => "SVG",
            Self::Png => "PNG",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("no diagram to export")]
    NoDiagram,
    #[error("could not decode diagram image: {0}")]
    Decode(String),
    #[error("could not encode image: {0}")]
    Encode(String),
    #[error("diagram image is empty")]
    EmptyImage,
    #[error("could not save file: {0}")]
    Write(#[from] std::io::Error),
}

/// A serialized diagram waiting to be turned into file bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportJob {
    format: ExportFormat,
    svg: String,
}

/// A finished file, ready for a [`DownloadSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

impl ExportedFile {
    pub const fn file_name(&self) -> &'static str {
        self.format.file_name()
    }

    pub const fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Hand the file to `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Write`] if the sink fails.
    pub fn deliver(&self, sink: &dyn DownloadSink) -> Result<PathBuf, ExportError> {
        Ok(sink.download_file(&self.bytes, self.file_name(), self.mime_type())?)
    }
}

/// Check that a diagram is displayed and serialize its vector node.
///
/// # Errors
///
/// Returns [`ExportError::NoDiagram`] when the surface holds no `<svg>`
/// element (blank, or showing the fallback text).
pub fn prepare(surface: &DisplaySurface, format: ExportFormat) -> Result<ExportJob, ExportError> {
    let svg = surface.vector_node().ok_or(ExportError::NoDiagram)?;
    Ok(ExportJob {
        format,
        svg: svg.to_string(),
    })
}

impl ExportJob {
    pub const fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn svg(&self) -> &str {
        &self.svg
    }

    /// Produce the file bytes. PNG output decodes the SVG, draws it at its
    /// natural size and encodes the result; both steps must succeed.
    ///
    /// # Errors
    ///
    /// Returns a decode, empty-image or encode error for PNG output.
    pub fn run(self) -> Result<ExportedFile, ExportError> {
        let _scope = crate::perf::scope("export.run");
        let bytes = match self.format {
            ExportFormat::Svg => self.svg.into_bytes(),
            ExportFormat::Png => encode_png(rasterize_svg(&self.svg, 1.0)?)?,
        };
        crate::perf::log_event(
            "export.ready",
            format!("format={} bytes={}", self.format, bytes.len()),
        );
        Ok(ExportedFile {
            format: self.format,
            bytes,
        })
    }
}

/// Prepare, run and deliver in one call.
///
/// # Errors
///
/// Returns the first [`ExportError`] encountered; the sink is only touched
/// once the file bytes exist.
pub fn export(
    surface: &DisplaySurface,
    format: ExportFormat,
    sink: &dyn DownloadSink,
) -> Result<PathBuf, ExportError> {
    prepare(surface, format)?.run()?.deliver(sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io;

    #[derive(Default)]
    struct RecordingSink {
        files: RefCell<Vec<(Vec<u8>, String, String)>>,
    }

    impl DownloadSink for RecordingSink {
        fn download_file(
            &self,
            bytes: &[u8],
            suggested_name: &str,
            mime_type: &str,
        ) -> io::Result<PathBuf> {
            self.files.borrow_mut().push((
                bytes.to_vec(),
                suggested_name.to_string(),
                mime_type.to_string(),
            ));
            Ok(PathBuf::from(suggested_name))
        }
    }

    const SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="30" height="10"><rect width="30" height="10" fill="#00f"/></svg>"##;

    fn rendered_surface(markup: &str) -> DisplaySurface {
        let mut surface = DisplaySurface::new();
        surface.show_markup(markup.to_string());
        surface
    }

    #[test]
    fn test_export_without_diagram_fails_and_downloads_nothing() {
        let sink = RecordingSink::default();
        let err = export(&DisplaySurface::new(), ExportFormat::Svg, &sink).unwrap_err();
        assert!(matches!(err, ExportError::NoDiagram));
        assert_eq!(err.to_string(), "no diagram to export");
        assert!(sink.files.borrow().is_empty());
    }

    #[test]
    fn test_export_of_fallback_text_fails() {
        let mut surface = DisplaySurface::new();
        surface.show_fallback("not a diagram".to_string());
        let sink = RecordingSink::default();
        assert!(matches!(
            export(&surface, ExportFormat::Png, &sink),
            Err(ExportError::NoDiagram)
        ));
        assert!(sink.files.borrow().is_empty());
    }

    #[test]
    fn test_svg_export_uses_fixed_name_and_mime() {
        let sink = RecordingSink::default();
        let surface = rendered_surface(&format!("<div>{SVG}</div>"));
        let path = export(&surface, ExportFormat::Svg, &sink).unwrap();

        assert_eq!(path, PathBuf::from("mermaid-diagram.svg"));
        let files = sink.files.borrow();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].0, SVG.as_bytes());
        assert_eq!(files[0].2, "image/svg+xml;charset=utf-8");
    }

    #[test]
    fn test_png_export_draws_at_natural_size() {
        let sink = RecordingSink::default();
        export(&rendered_surface(SVG), ExportFormat::Png, &sink).unwrap();

        let files = sink.files.borrow();
        assert_eq!(files[0].1, "mermaid-diagram.png");
        assert_eq!(files[0].2, "image/png");
        let decoded = image::load_from_memory(&files[0].0).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (30, 10));
    }

    #[test]
    fn test_png_export_surfaces_decode_errors() {
        let sink = RecordingSink::default();
        let broken = rendered_surface("<svg><g></svg>");
        let err = export(&broken, ExportFormat::Png, &sink).unwrap_err();
        assert!(matches!(err, ExportError::Decode(_)));
        assert!(sink.files.borrow().is_empty());
    }
}
