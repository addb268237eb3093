//! SVG serialization of a [`PyramidLayout`].
//!
//! The markup follows what d3 produces for the chart page: one `<g>` per group translated
//! to its origin, `<rect>` bars, `<text>` labels and `axisBottom`-style axes. An optional
//! tooltip overlay draws the hover box as it looks at one instant.

mod util;

use crate::model::{AxisLayout, MarkGroup, PyramidLayout, TextMark};
use crate::text::{TextMeasurer, TextStyle};
use crate::tooltip::TooltipSnapshot;
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use util::{escape_xml_into, fmt, translate};

const DEFAULT_DIAGRAM_ID: &str = "chart";
const AXIS_FONT_SIZE: f64 = 10.0;
const AXIS_FONT_FAMILY: &str = "sans-serif";

#[derive(Debug, Clone, Default)]
pub struct SvgRenderOptions {
    /// Root element id. Defaults to `chart`.
    pub diagram_id: Option<String>,
    /// Tooltip overlay to draw on top of the chart.
    pub tooltip: Option<TooltipSnapshot>,
    /// Fill for a full-size background rect. No rect is drawn when unset.
    pub background: Option<String>,
}

#[derive(Debug, Clone)]
struct Node {
    tag: &'static str,
    attrs: BTreeMap<&'static str, String>,
    text: Option<String>,
    children: Vec<usize>,
}

fn node(tag: &'static str) -> Node {
    Node {
        tag,
        attrs: BTreeMap::new(),
        text: None,
        children: Vec::new(),
    }
}

impl Node {
    fn attr(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.attrs.insert(key, value.into());
        self
    }

    fn num(self, key: &'static str, value: f64) -> Self {
        self.attr(key, fmt(value))
    }

    fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }
}

fn push_child(arena: &mut Vec<Node>, parent: usize, child: Node) -> usize {
    let id = arena.len();
    arena.push(child);
    arena[parent].children.push(id);
    id
}

fn render_node(out: &mut String, arena: &[Node], id: usize) {
    let n = &arena[id];
    out.push('<');
    out.push_str(n.tag);
    for (k, v) in &n.attrs {
        let _ = write!(out, r#" {k}=""#);
        escape_xml_into(out, v);
        out.push('"');
    }
    if n.children.is_empty() && n.text.as_deref().unwrap_or("").is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    if let Some(t) = n.text.as_deref() {
        escape_xml_into(out, t);
    }
    for c in &n.children {
        render_node(out, arena, *c);
    }
    let _ = write!(out, "</{}>", n.tag);
}

fn text_node(t: &TextMark) -> Node {
    let mut n = node("text")
        .attr("class", t.class.as_str())
        .num("x", t.x)
        .num("y", t.y)
        .text(&t.text);
    if let Some(anchor) = t.anchor {
        n = n.attr("text-anchor", anchor.as_str());
    }
    if t.bold {
        n = n.attr("font-weight", "bold");
    }
    n
}

fn push_axis(arena: &mut Vec<Node>, parent: usize, axis: &AxisLayout) {
    let g = push_child(
        arena,
        parent,
        node("g")
            .attr("class", "axis")
            .attr("transform", translate(0.0, axis.y))
            .attr("fill", "none")
            .num("font-size", AXIS_FONT_SIZE)
            .attr("font-family", AXIS_FONT_FAMILY)
            .attr("text-anchor", "middle"),
    );
    push_child(
        arena,
        g,
        node("path")
            .attr("class", "domain")
            .attr("stroke", "currentColor")
            .attr("d", axis.domain_path.as_str()),
    );
    for tick in &axis.ticks {
        let t = push_child(
            arena,
            g,
            node("g")
                .attr("class", "tick")
                .attr("opacity", "1")
                .attr("transform", translate(tick.x, 0.0)),
        );
        push_child(
            arena,
            t,
            node("line")
                .attr("stroke", "currentColor")
                .num("y2", axis.tick_size),
        );
        push_child(
            arena,
            t,
            node("text")
                .attr("fill", "currentColor")
                .num("y", axis.label_y)
                .attr("dy", "0.71em")
                .text(&tick.label),
        );
    }
}

fn push_group(arena: &mut Vec<Node>, parent: usize, group: &MarkGroup) {
    let g = push_child(
        arena,
        parent,
        node("g")
            .attr("class", group.class.as_str())
            .attr("transform", translate(group.origin.x, group.origin.y)),
    );
    for bar in &group.bars {
        let mut rect = node("rect")
            .attr("class", "bar")
            .num("x", bar.x)
            .num("y", bar.y)
            .num("width", bar.width)
            .num("height", bar.height)
            .attr("fill", bar.fill.as_str());
        if let Some(tip) = bar.tooltip.as_ref() {
            rect = rect.attr("data-age", tip.age.as_str());
        }
        push_child(arena, g, rect);
    }
    for t in &group.texts {
        push_child(arena, g, text_node(t));
    }
    if let Some(axis) = group.axis.as_ref() {
        push_axis(arena, g, axis);
    }
}

fn push_tooltip(
    arena: &mut Vec<Node>,
    parent: usize,
    layout: &PyramidLayout,
    snapshot: &TooltipSnapshot,
    measurer: &dyn TextMeasurer,
) {
    let style = &layout.tooltip_style;
    let text_style = TextStyle {
        font_size: style.font_size,
        ..Default::default()
    };
    let line_height = measurer.measure("", &text_style).height;

    let width = snapshot
        .lines
        .iter()
        .map(|l| measurer.measure(l, &text_style).width)
        .fold(0.0_f64, f64::max)
        + 2.0 * style.padding;
    let height = snapshot.lines.len() as f64 * line_height + 2.0 * style.padding;

    let g = push_child(
        arena,
        parent,
        node("g")
            .attr("class", "tooltip")
            .num("opacity", snapshot.opacity)
            .attr("transform", translate(snapshot.x, snapshot.y)),
    );
    push_child(
        arena,
        g,
        node("rect")
            .num("width", width)
            .num("height", height)
            .num("rx", style.border_radius)
            .num("ry", style.border_radius)
            .attr("fill", style.background.as_str()),
    );
    let text = push_child(
        arena,
        g,
        node("text")
            .attr("fill", style.text_color.as_str())
            .num("font-size", style.font_size),
    );
    for (i, line) in snapshot.lines.iter().enumerate() {
        let baseline = style.padding + style.font_size + i as f64 * line_height;
        push_child(
            arena,
            text,
            node("tspan")
                .num("x", style.padding)
                .num("y", baseline)
                .text(line),
        );
    }
}

pub fn render_pyramid_svg(
    layout: &PyramidLayout,
    measurer: &dyn TextMeasurer,
    options: &SvgRenderOptions,
) -> Result<String> {
    if !(layout.width.is_finite() && layout.height.is_finite()) {
        return Err(Error::InvalidLayout {
            message: format!("non-finite canvas {}x{}", layout.width, layout.height),
        });
    }

    let diagram_id = options.diagram_id.as_deref().unwrap_or(DEFAULT_DIAGRAM_ID);
    let mut arena = vec![
        node("svg")
            .attr("xmlns", "http://www.w3.org/2000/svg")
            .attr("id", diagram_id)
            .num("width", layout.width)
            .num("height", layout.height)
            .attr(
                "viewBox",
                format!("0 0 {} {}", fmt(layout.width), fmt(layout.height)),
            ),
    ];
    let root = 0;

    if let Some(bg) = options.background.as_deref() {
        push_child(
            &mut arena,
            root,
            node("rect")
                .attr("class", "background")
                .num("width", layout.width)
                .num("height", layout.height)
                .attr("fill", bg),
        );
    }

    push_group(&mut arena, root, &layout.male);
    push_group(&mut arena, root, &layout.female);
    push_group(&mut arena, root, &layout.labels);

    if let Some(snapshot) = options.tooltip.as_ref() {
        if layout.interactive {
            push_tooltip(&mut arena, root, layout, snapshot, measurer);
        } else {
            tracing::debug!(diagram_id, "tooltip overlay ignored for static layout");
        }
    }

    let mut out = String::new();
    render_node(&mut out, &arena, root);
    tracing::debug!(
        diagram_id,
        nodes = arena.len(),
        bytes = out.len(),
        "pyramid svg rendered"
    );
    Ok(out)
}
