use popyramid_core::geom::point;
use popyramid_core::{Dataset, LayoutConfig, load_dataset};
use popyramid_render::layout_pyramid;
use popyramid_render::svg::{SvgRenderOptions, render_pyramid_svg};
use popyramid_render::text::DeterministicTextMeasurer;
use popyramid_render::{HoverTracker, Tooltip};
use std::path::PathBuf;
use std::time::Duration;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn mydata() -> Dataset {
    load_dataset(workspace_root().join("fixtures").join("mydata.csv")).expect("fixture")
}

fn group<'a, 'i>(doc: &'a roxmltree::Document<'i>, class: &str) -> roxmltree::Node<'a, 'i> {
    doc.root_element()
        .children()
        .find(|n| n.has_tag_name("g") && n.attribute("class") == Some(class))
        .unwrap_or_else(|| panic!("missing group {class}"))
}

#[test]
fn pyramid_svg_renders_groups_bars_and_axes() {
    let layout = layout_pyramid(&mydata(), &LayoutConfig::default()).expect("layout");
    let svg = render_pyramid_svg(
        &layout,
        &DeterministicTextMeasurer::default(),
        &SvgRenderOptions::default(),
    )
    .expect("svg");

    let doc = roxmltree::Document::parse(&svg).expect("well-formed svg");
    let root = doc.root_element();
    assert_eq!(root.attribute("id"), Some("chart"));
    assert_eq!(root.attribute("width"), Some("1400"));
    assert_eq!(root.attribute("viewBox"), Some("0 0 1400 680"));

    let male = group(&doc, "male");
    assert_eq!(male.attribute("transform"), Some("translate(10,30)"));
    let bars = male
        .descendants()
        .filter(|n| n.has_tag_name("rect") && n.attribute("class") == Some("bar"))
        .count();
    assert_eq!(bars, 91);

    let female = group(&doc, "female");
    assert_eq!(female.attribute("transform"), Some("translate(732.5,30)"));
    let axis = female
        .children()
        .find(|n| n.attribute("class") == Some("axis"))
        .expect("axis");
    assert_eq!(axis.attribute("transform"), Some("translate(0,628)"));
    assert_eq!(axis.attribute("font-size"), Some("10"));
    let tick_labels: Vec<&str> = axis
        .descendants()
        .filter(|n| n.has_tag_name("text"))
        .filter_map(|n| n.text())
        .collect();
    assert_eq!(tick_labels.first(), Some(&"0k"));
    assert_eq!(tick_labels.last(), Some(&"34k"));

    let labels = group(&doc, "labels");
    let header = labels
        .children()
        .find(|n| n.text() == Some("Age"))
        .expect("age header");
    assert_eq!(header.attribute("font-weight"), Some("bold"));
    assert_eq!(header.attribute("y"), Some("-14"));
    assert!(labels.children().any(|n| n.text() == Some("90+")));

    assert!(!svg.contains("class=\"tooltip\""));
}

#[test]
fn custom_id_and_background() {
    let layout = layout_pyramid(&Dataset::empty("none"), &LayoutConfig::default()).expect("layout");
    let svg = render_pyramid_svg(
        &layout,
        &DeterministicTextMeasurer::default(),
        &SvgRenderOptions {
            diagram_id: Some("pyr-1".to_string()),
            background: Some("white".to_string()),
            ..Default::default()
        },
    )
    .expect("svg");
    let doc = roxmltree::Document::parse(&svg).expect("well-formed svg");
    assert_eq!(doc.root_element().attribute("id"), Some("pyr-1"));
    let first = doc
        .root_element()
        .first_element_child()
        .expect("background");
    assert_eq!(first.attribute("class"), Some("background"));
    assert_eq!(first.attribute("fill"), Some("white"));
    assert!(
        !doc.descendants()
            .any(|n| n.attribute("class") == Some("bar"))
    );
}

#[test]
fn hovered_tooltip_overlay() {
    let layout = layout_pyramid(&mydata(), &LayoutConfig::default()).expect("layout");
    let mut tooltip = Tooltip::new(&layout.tooltip_style);
    let mut tracker = HoverTracker::new();

    // Inner end of the male bar of the bottom row.
    let bar = &layout.male.bars[0];
    let pointer = point(
        layout.male.origin.x + layout.half_width - 1.0,
        layout.male.origin.y + bar.y + bar.height / 2.0,
    );
    tracker.pointer_moved(&layout, &mut tooltip, pointer, Duration::ZERO);
    let snapshot = tooltip
        .snapshot(Duration::from_millis(500))
        .expect("snapshot");

    let svg = render_pyramid_svg(
        &layout,
        &DeterministicTextMeasurer::default(),
        &SvgRenderOptions {
            tooltip: Some(snapshot),
            ..Default::default()
        },
    )
    .expect("svg");
    let doc = roxmltree::Document::parse(&svg).expect("well-formed svg");
    let tip = group(&doc, "tooltip");
    assert_eq!(tip.attribute("opacity"), Some("1"));
    let rect = tip.first_element_child().expect("box");
    assert_eq!(rect.attribute("fill"), Some("purple"));
    assert_eq!(rect.attribute("rx"), Some("5"));
    let lines: Vec<&str> = tip
        .descendants()
        .filter(|n| n.has_tag_name("tspan"))
        .filter_map(|n| n.text())
        .collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "Age: 0");
    assert!(lines[1].starts_with("Males:"));
    assert!(lines[2].starts_with("Females:"));
}

#[test]
fn static_layout_ignores_tooltip_overlay() {
    let layout = layout_pyramid(&mydata(), &LayoutConfig::static_preset()).expect("layout");
    let svg = render_pyramid_svg(
        &layout,
        &DeterministicTextMeasurer::default(),
        &SvgRenderOptions {
            tooltip: Some(popyramid_render::TooltipSnapshot {
                opacity: 1.0,
                x: 0.0,
                y: 0.0,
                lines: vec!["Age: 0".to_string()],
            }),
            ..Default::default()
        },
    )
    .expect("svg");
    assert!(!svg.contains("class=\"tooltip\""));
}
