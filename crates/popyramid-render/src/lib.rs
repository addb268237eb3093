#![forbid(unsafe_code)]

pub mod format;
pub mod model;
pub mod pyramid;
pub mod scale;
pub mod svg;
pub mod text;
pub mod tooltip;

pub use crate::model::PyramidLayout;
pub use crate::pyramid::layout_pyramid;
pub use crate::tooltip::{HoverEvent, HoverTracker, Tooltip, TooltipSnapshot};

use crate::text::{DeterministicTextMeasurer, TextMeasurer};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] popyramid_core::Error),
    #[error("invalid layout: {message}")]
    InvalidLayout { message: String },
    #[error("layout JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone)]
pub struct LayoutOptions {
    pub config: popyramid_core::LayoutConfig,
    pub text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            config: popyramid_core::LayoutConfig::default(),
            text_measurer: Arc::new(DeterministicTextMeasurer::default()),
        }
    }
}

impl LayoutOptions {
    pub fn with_config(mut self, config: popyramid_core::LayoutConfig) -> Self {
        self.config = config;
        self
    }
}

/// Lays out `dataset` and serializes the marks, for debugging and snapshot tests.
pub fn layout_json(
    dataset: &popyramid_core::Dataset,
    config: &popyramid_core::LayoutConfig,
    pretty: bool,
) -> Result<String> {
    let layout = layout_pyramid(dataset, config)?;
    let json = if pretty {
        serde_json::to_string_pretty(&layout)?
    } else {
        serde_json::to_string(&layout)?
    };
    Ok(json)
}
