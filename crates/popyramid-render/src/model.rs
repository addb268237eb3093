use popyramid_core::TooltipStyle;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_str(self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

/// Pre-rendered hover summary for one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipContent {
    pub age: String,
    pub lines: Vec<String>,
}

impl TooltipContent {
    /// The lines joined the way the chart page injects them into the tooltip element.
    pub fn to_html(&self) -> String {
        self.lines.join("</br>")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarMark {
    /// Row index in the dataset.
    pub index: usize,
    pub sex: Sex,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<TooltipContent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextMark {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub anchor: Option<TextAnchor>,
    #[serde(default)]
    pub bold: bool,
    pub class: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisTick {
    pub value: f64,
    /// Tick position along the axis, already shifted by the crisp-edge offset.
    pub x: f64,
    pub label: String,
}

/// A bottom axis in d3 `axisBottom` geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisLayout {
    /// Vertical offset of the axis inside its group.
    pub y: f64,
    #[serde(rename = "domainPath")]
    pub domain_path: String,
    #[serde(rename = "tickSize")]
    pub tick_size: f64,
    #[serde(rename = "labelY")]
    pub label_y: f64,
    pub ticks: Vec<AxisTick>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkGroup {
    pub class: String,
    pub origin: LayoutPoint,
    #[serde(default)]
    pub bars: Vec<BarMark>,
    #[serde(default)]
    pub texts: Vec<TextMark>,
    #[serde(default)]
    pub axis: Option<AxisLayout>,
}

impl MarkGroup {
    pub(crate) fn new(class: &str, origin: LayoutPoint) -> Self {
        Self {
            class: class.to_string(),
            origin,
            bars: Vec::new(),
            texts: Vec::new(),
            axis: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PyramidLayout {
    pub width: f64,
    pub height: f64,
    #[serde(rename = "plotWidth")]
    pub plot_width: f64,
    #[serde(rename = "plotHeight")]
    pub plot_height: f64,
    #[serde(rename = "halfWidth")]
    pub half_width: f64,
    #[serde(rename = "centreSpacing")]
    pub centre_spacing: f64,
    #[serde(rename = "maxCount")]
    pub max_count: Option<f64>,
    pub interactive: bool,
    pub male: MarkGroup,
    pub female: MarkGroup,
    pub labels: MarkGroup,
    #[serde(rename = "tooltipStyle")]
    pub tooltip_style: TooltipStyle,
}

impl PyramidLayout {
    /// Data-bound marks: bars plus centre labels. The "Age" header is not counted.
    pub fn mark_count(&self) -> usize {
        self.male.bars.len()
            + self.female.bars.len()
            + self
                .labels
                .texts
                .iter()
                .filter(|t| t.class == "age-label")
                .count()
    }

    pub fn bars(&self) -> impl Iterator<Item = (&MarkGroup, &BarMark)> {
        [&self.male, &self.female]
            .into_iter()
            .flat_map(|g| g.bars.iter().map(move |b| (g, b)))
    }

    /// Centre label texts in record order.
    pub fn age_labels(&self) -> Vec<&str> {
        self.labels
            .texts
            .iter()
            .filter(|t| t.class == "age-label")
            .map(|t| t.text.as_str())
            .collect()
    }
}
