#![forbid(unsafe_code)]

//! `popyramid` renders population pyramids headlessly: an `Age,Males,Females` CSV goes in,
//! an SVG (or PNG/JPG/PDF) chart comes out.
//!
//! # Features
//!
//! - `render`: enable layout + SVG rendering (`popyramid::render`)
//! - `raster`: enable PNG/JPG/PDF output via pure-Rust SVG rasterization/conversion

pub use popyramid_core::*;

#[cfg(feature = "render")]
pub mod render {
    pub use popyramid_render::model::PyramidLayout;
    pub use popyramid_render::svg::SvgRenderOptions;
    pub use popyramid_render::text::{DeterministicTextMeasurer, TextMeasurer};
    pub use popyramid_render::{
        HoverTracker, LayoutOptions, Tooltip, TooltipSnapshot, layout_pyramid,
    };

    use popyramid_core::Dataset;
    use popyramid_core::geom::Point;
    use std::path::Path;
    use std::time::Duration;

    #[cfg(feature = "raster")]
    pub mod raster;

    #[derive(Debug, thiserror::Error)]
    pub enum HeadlessError {
        #[error(transparent)]
        Load(#[from] popyramid_core::Error),
        #[error(transparent)]
        Render(#[from] popyramid_render::Error),
    }

    pub type Result<T> = std::result::Result<T, HeadlessError>;

    /// Converts an arbitrary string into a conservative SVG `id` token, so several charts
    /// can be inlined into one page without colliding.
    ///
    /// This helper:
    /// - trims whitespace
    /// - replaces unsupported characters with `-`
    /// - ensures the id starts with an ASCII letter by prefixing `p-` when needed
    pub fn sanitize_svg_id(raw: &str) -> String {
        let raw = raw.trim();
        if raw.is_empty() {
            return "p-untitled".to_string();
        }

        let mut out = String::with_capacity(raw.len() + 4);
        for ch in raw.chars() {
            let ok = ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == ':' || ch == '.';
            out.push(if ok { ch } else { '-' });
        }

        let starts_ok = out.chars().next().is_some_and(|c| c.is_ascii_alphabetic());
        if !starts_ok {
            out.insert_str(0, "p-");
        }

        while out.contains("--") {
            out = out.replace("--", "-");
        }
        let out = out.trim_matches('-');
        if out.is_empty() || out == "p" {
            return "p-untitled".to_string();
        }
        out.to_string()
    }

    pub fn layout_dataset_sync(dataset: &Dataset, options: &LayoutOptions) -> Result<PyramidLayout> {
        Ok(layout_pyramid(dataset, &options.config)?)
    }

    pub fn layout_sync(path: impl AsRef<Path>, options: &LayoutOptions) -> Result<PyramidLayout> {
        let dataset = popyramid_core::load_dataset(path)?;
        layout_dataset_sync(&dataset, options)
    }

    pub fn render_layout_svg(
        layout: &PyramidLayout,
        measurer: &dyn TextMeasurer,
        svg_options: &SvgRenderOptions,
    ) -> Result<String> {
        Ok(popyramid_render::svg::render_pyramid_svg(
            layout,
            measurer,
            svg_options,
        )?)
    }

    pub fn render_dataset_svg_sync(
        dataset: &Dataset,
        layout_options: &LayoutOptions,
        svg_options: &SvgRenderOptions,
    ) -> Result<String> {
        let layout = layout_dataset_sync(dataset, layout_options)?;
        render_layout_svg(&layout, layout_options.text_measurer.as_ref(), svg_options)
    }

    /// Synchronous load + layout + SVG helper.
    pub fn render_svg_sync(
        path: impl AsRef<Path>,
        layout_options: &LayoutOptions,
        svg_options: &SvgRenderOptions,
    ) -> Result<String> {
        let dataset = popyramid_core::load_dataset(path)?;
        render_dataset_svg_sync(&dataset, layout_options, svg_options)
    }

    /// Like [`render_svg_sync`], but a file that cannot be loaded yields the empty chart frame
    /// (axes and captions without bars) instead of an error.
    ///
    /// Invalid configuration is still an error.
    pub fn render_svg_or_placeholder(
        path: impl AsRef<Path>,
        layout_options: &LayoutOptions,
        svg_options: &SvgRenderOptions,
    ) -> Result<String> {
        let path = path.as_ref();
        let dataset = match popyramid_core::load_dataset(path) {
            Ok(dataset) => dataset,
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to load pyramid data; rendering empty chart"
                );
                Dataset::empty(path.display().to_string())
            }
        };
        render_dataset_svg_sync(&dataset, layout_options, svg_options)
    }

    /// Tooltip as it looks once the fade-in has finished, with the pointer resting at
    /// `pointer` (SVG canvas coordinates). `None` when no bar is under the pointer.
    pub fn settled_hover(layout: &PyramidLayout, pointer: Point) -> Option<TooltipSnapshot> {
        let mut tooltip = Tooltip::new(&layout.tooltip_style);
        let mut tracker = HoverTracker::new();
        tracker.pointer_moved(layout, &mut tooltip, pointer, Duration::ZERO);
        tracker.hovered()?;
        tooltip.snapshot(tooltip.fade())
    }

    /// Bundles the options for repeated headless rendering.
    #[derive(Clone, Default)]
    pub struct HeadlessRenderer {
        pub layout: LayoutOptions,
        pub svg: SvgRenderOptions,
    }

    impl HeadlessRenderer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_config(mut self, config: popyramid_core::LayoutConfig) -> Self {
            self.layout = self.layout.with_config(config);
            self
        }

        pub fn layout_sync(&self, path: impl AsRef<Path>) -> Result<PyramidLayout> {
            layout_sync(path, &self.layout)
        }

        pub fn render_svg_sync(&self, path: impl AsRef<Path>) -> Result<String> {
            render_svg_sync(path, &self.layout, &self.svg)
        }

        pub fn render_svg_sync_with(
            &self,
            path: impl AsRef<Path>,
            svg: &SvgRenderOptions,
        ) -> Result<String> {
            render_svg_sync(path, &self.layout, svg)
        }

        pub fn render_svg_sync_with_diagram_id(
            &self,
            path: impl AsRef<Path>,
            diagram_id: &str,
        ) -> Result<String> {
            let mut svg = self.svg.clone();
            svg.diagram_id = Some(sanitize_svg_id(diagram_id));
            self.render_svg_sync_with(path, &svg)
        }

        #[cfg(feature = "raster")]
        pub fn render_png_sync(
            &self,
            path: impl AsRef<Path>,
            raster: &raster::RasterOptions,
        ) -> raster::Result<Vec<u8>> {
            raster::render_png_sync(path, &self.layout, &self.svg, raster)
        }

        #[cfg(feature = "raster")]
        pub fn render_jpeg_sync(
            &self,
            path: impl AsRef<Path>,
            raster: &raster::RasterOptions,
        ) -> raster::Result<Vec<u8>> {
            raster::render_jpeg_sync(path, &self.layout, &self.svg, raster)
        }

        #[cfg(feature = "raster")]
        pub fn render_pdf_sync(&self, path: impl AsRef<Path>) -> raster::Result<Vec<u8>> {
            raster::render_pdf_sync(path, &self.layout, &self.svg)
        }
    }

}
