#![forbid(unsafe_code)]

//! Population pyramid data model (headless).
//!
//! - [`load_dataset`] reads the `Age,Males,Females` CSV into an ordered [`Dataset`]
//! - [`LayoutConfig`] holds the fixed pixel geometry of one chart
//! - counts are coerced leniently: a malformed cell becomes `NaN`, never an error

pub mod config;
pub mod error;
pub mod geom;
pub mod load;
pub mod model;
pub mod number;

pub use config::{CaptionPlacement, LayoutConfig, Margins, TooltipStyle};
pub use error::{Error, Result};
pub use load::{load_dataset, parse_dataset, read_dataset};
pub use model::{AgeBandRecord, Dataset};
