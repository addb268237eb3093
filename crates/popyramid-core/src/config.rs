use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 30.0,
            right: 10.0,
            bottom: 25.0,
            left: 10.0,
        }
    }
}

/// Where the "Male Population" / "Female Population" captions sit inside their groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionPlacement {
    /// `y = 30`, just under the top of the plot.
    #[default]
    Top,
    /// `y = h - 7`, just above the axes.
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TooltipStyle {
    pub background: String,
    pub text_color: String,
    pub border_radius: f64,
    pub padding: f64,
    pub font_size: f64,
    pub fade_ms: u64,
    /// Fixed vertical position of the tooltip box; pointer movement only moves it sideways.
    pub top: f64,
}

impl Default for TooltipStyle {
    fn default() -> Self {
        Self {
            background: "purple".to_string(),
            text_color: "white".to_string(),
            border_radius: 5.0,
            padding: 10.0,
            font_size: 16.0,
            fade_ms: 200,
            top: 0.0,
        }
    }
}

/// Largest tick density (`plotWidth / tickSpacing`) a config may request.
pub const MAX_TICK_COUNT: f64 = 10_000.0;

/// Pixel geometry and styling of a pyramid chart. Fixed for the lifetime of one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub width: f64,
    pub height: f64,
    pub margin: Margins,
    pub centre_spacing: f64,
    pub band_padding: f64,
    /// One axis tick is requested per this many pixels of plot width.
    pub tick_spacing: f64,
    pub axis_offset: f64,
    pub caption_placement: CaptionPlacement,
    pub male_color: String,
    pub female_color: String,
    pub interactive: bool,
    pub label_every: usize,
    pub terminal_label: String,
    pub tooltip: TooltipStyle,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::interactive_preset()
    }
}

impl LayoutConfig {
    /// Chart with the hover tooltip, captions at the top.
    pub fn interactive_preset() -> Self {
        Self {
            width: 1400.0,
            height: 680.0,
            margin: Margins::default(),
            centre_spacing: 65.0,
            band_padding: 0.1,
            tick_spacing: 80.0,
            axis_offset: 3.0,
            caption_placement: CaptionPlacement::Top,
            male_color: "Aqua".to_string(),
            female_color: "LightPink".to_string(),
            interactive: true,
            label_every: 5,
            terminal_label: "90+".to_string(),
            tooltip: TooltipStyle::default(),
        }
    }

    /// Static chart: narrower centre column, captions above the axes.
    pub fn static_preset() -> Self {
        Self {
            centre_spacing: 25.0,
            caption_placement: CaptionPlacement::Bottom,
            interactive: false,
            ..Self::interactive_preset()
        }
    }

    /// Plot area width (`w`).
    pub fn plot_width(&self) -> f64 {
        self.width - self.margin.left - self.margin.right
    }

    /// Plot area height (`h`).
    pub fn plot_height(&self) -> f64 {
        self.height - self.margin.top - self.margin.bottom
    }

    /// Width available to each side of the pyramid. Never negative.
    pub fn half_width(&self) -> f64 {
        ((self.plot_width() - self.centre_spacing) / 2.0).max(0.0)
    }

    pub fn caption_y(&self) -> f64 {
        match self.caption_placement {
            CaptionPlacement::Top => 30.0,
            CaptionPlacement::Bottom => self.plot_height() - 7.0,
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::interactive_preset().merged_with(&value)
    }

    /// Overlays a (partial) JSON object onto this config and validates the result.
    pub fn merged_with(&self, overrides: &Value) -> Result<Self> {
        let mut base = serde_json::to_value(self)?;
        deep_merge_value(&mut base, overrides);
        let cfg: Self = serde_json::from_value(base)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Sets one value by dotted camelCase path (e.g. `margin.top`).
    pub fn with_value(&self, dotted_path: &str, value: Value) -> Result<Self> {
        let mut patch = Value::Object(Map::new());
        set_value(&mut patch, dotted_path, value);
        self.merged_with(&patch)
    }

    pub fn validate(&self) -> Result<()> {
        let geometry = [
            ("width", self.width),
            ("height", self.height),
            ("margin.top", self.margin.top),
            ("margin.right", self.margin.right),
            ("margin.bottom", self.margin.bottom),
            ("margin.left", self.margin.left),
            ("centreSpacing", self.centre_spacing),
            ("axisOffset", self.axis_offset),
            ("tooltip.borderRadius", self.tooltip.border_radius),
            ("tooltip.padding", self.tooltip.padding),
            ("tooltip.fontSize", self.tooltip.font_size),
        ];
        for (key, v) in geometry {
            if !v.is_finite() || v < 0.0 {
                return Err(invalid(format!("{key} must be a finite, non-negative number")));
            }
        }
        if !self.tooltip.top.is_finite() {
            return Err(invalid("tooltip.top must be finite".to_string()));
        }
        if !(0.0..1.0).contains(&self.band_padding) {
            return Err(invalid("bandPadding must be in [0, 1)".to_string()));
        }
        if self.plot_width() < 0.0 {
            return Err(invalid(
                "margin.left + margin.right must not exceed width".to_string(),
            ));
        }
        if self.plot_height() < 0.0 {
            return Err(invalid(
                "margin.top + margin.bottom must not exceed height".to_string(),
            ));
        }
        if !(self.tick_spacing.is_finite() && self.tick_spacing > 0.0) {
            return Err(invalid("tickSpacing must be positive".to_string()));
        }
        if self.plot_width() / self.tick_spacing > MAX_TICK_COUNT {
            return Err(invalid(format!(
                "tickSpacing {} requests more than {MAX_TICK_COUNT} ticks",
                self.tick_spacing
            )));
        }
        if self.label_every == 0 {
            return Err(invalid("labelEvery must be at least 1".to_string()));
        }
        for (key, color) in [
            ("maleColor", &self.male_color),
            ("femaleColor", &self.female_color),
            ("tooltip.background", &self.tooltip.background),
            ("tooltip.textColor", &self.tooltip.text_color),
        ] {
            if svgtypes::Color::from_str(&color.to_ascii_lowercase()).is_err() {
                return Err(invalid(format!("{key}: unrecognized color {color:?}")));
            }
        }
        Ok(())
    }
}

fn invalid(message: String) -> Error {
    Error::InvalidConfig { message }
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}

fn set_value(root: &mut Value, dotted_path: &str, value: Value) {
    if !root.is_object() {
        *root = Value::Object(Map::new());
    }
    let Value::Object(root) = root else {
        return;
    };
    let mut cur: &mut Map<String, Value> = root;
    let mut segments = dotted_path.split('.').peekable();
    while let Some(seg) = segments.next() {
        if segments.peek().is_none() {
            cur.insert(seg.to_string(), value);
            return;
        }
        let slot = cur
            .entry(seg)
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let Some(next) = slot.as_object_mut() else {
            return;
        };
        cur = next;
    }
}
