use popyramid_core::geom::point;
use popyramid_core::{LayoutConfig, parse_dataset};
use popyramid_render::model::{PyramidLayout, Sex};
use popyramid_render::{HoverEvent, HoverTracker, Tooltip, layout_pyramid};
use std::time::Duration;

fn layout(config: &LayoutConfig) -> PyramidLayout {
    let ds = parse_dataset("two-rows", "Age,Males,Females\n0-4,100,90\n90+,10,5\n").expect("parse");
    layout_pyramid(&ds, config).expect("layout")
}

fn over_female_bar(layout: &PyramidLayout, index: usize) -> popyramid_core::geom::Point {
    let bar = &layout.female.bars[index];
    point(
        layout.female.origin.x + 1.0,
        layout.female.origin.y + bar.y + bar.height / 2.0,
    )
}

#[test]
fn enter_shows_record_summary() {
    let layout = layout(&LayoutConfig::default());
    let mut tooltip = Tooltip::new(&layout.tooltip_style);
    let mut tracker = HoverTracker::new();

    let t0 = Duration::from_millis(50);
    let events = tracker.pointer_moved(&layout, &mut tooltip, over_female_bar(&layout, 0), t0);
    assert_eq!(
        events,
        vec![
            HoverEvent::Enter {
                sex: Sex::Female,
                index: 0
            },
            HoverEvent::Move {
                sex: Sex::Female,
                index: 0
            },
        ]
    );

    let state = tooltip.state();
    assert!(state.visible);
    assert_eq!(tooltip.target_opacity(), 1.0);
    assert_eq!(tooltip.fade(), Duration::from_millis(200));
    let content = state.content.as_ref().expect("content");
    assert_eq!(content.lines[0], "Age: 0-4");
    assert!(content.lines[1].starts_with("Males:"));
    assert!(content.lines[2].starts_with("Females:"));
    assert_eq!(tooltip.opacity_at(t0 + Duration::from_millis(200)), 1.0);
}

#[test]
fn leave_fades_out_and_keeps_content() {
    let layout = layout(&LayoutConfig::default());
    let mut tooltip = Tooltip::new(&layout.tooltip_style);
    let mut tracker = HoverTracker::new();

    tracker.pointer_moved(&layout, &mut tooltip, over_female_bar(&layout, 0), Duration::ZERO);
    let left = tracker.pointer_left(&mut tooltip, Duration::from_millis(400));
    assert_eq!(
        left,
        Some(HoverEvent::Leave {
            sex: Sex::Female,
            index: 0
        })
    );
    assert!(!tooltip.state().visible);
    assert_eq!(tooltip.target_opacity(), 0.0);
    assert_eq!(tooltip.opacity_at(Duration::from_millis(600)), 0.0);
    assert!(tooltip.state().content.is_some());
    assert_eq!(tracker.pointer_left(&mut tooltip, Duration::from_millis(700)), None);
}

#[test]
fn move_tracks_half_the_pointer_x() {
    let layout = layout(&LayoutConfig::default());
    let mut tooltip = Tooltip::new(&layout.tooltip_style);
    let mut tracker = HoverTracker::new();

    let start = over_female_bar(&layout, 0);
    tracker.pointer_moved(&layout, &mut tooltip, start, Duration::ZERO);
    let pointer = point(800.0, start.y);
    tracker.pointer_moved(&layout, &mut tooltip, pointer, Duration::from_millis(10));
    assert_eq!(tooltip.state().position.x, 400.0);
    assert_eq!(tooltip.state().position.y, 0.0);

    tooltip.hover_move(point(400.0, 999.0));
    assert_eq!(tooltip.state().position.x, 200.0);
    assert_eq!(tooltip.state().position.y, 0.0);
}

#[test]
fn crossing_bars_leaves_then_enters() {
    let layout = layout(&LayoutConfig::default());
    let mut tooltip = Tooltip::new(&layout.tooltip_style);
    let mut tracker = HoverTracker::new();

    tracker.pointer_moved(&layout, &mut tooltip, over_female_bar(&layout, 0), Duration::ZERO);
    let events = tracker.pointer_moved(
        &layout,
        &mut tooltip,
        over_female_bar(&layout, 1),
        Duration::from_millis(100),
    );
    assert_eq!(
        events[..2],
        [
            HoverEvent::Leave {
                sex: Sex::Female,
                index: 0
            },
            HoverEvent::Enter {
                sex: Sex::Female,
                index: 1
            },
        ]
    );
    assert_eq!(
        tooltip.state().content.as_ref().map(|c| c.age.as_str()),
        Some("90+")
    );
    assert_eq!(tooltip.target_opacity(), 1.0);
}

#[test]
fn pointer_over_gap_hits_nothing() {
    let layout = layout(&LayoutConfig::default());
    let mut tooltip = Tooltip::new(&layout.tooltip_style);
    let mut tracker = HoverTracker::new();

    // Centre label column between the two halves.
    let gap = point(layout.labels.origin.x + 30.0, 300.0);
    assert!(
        tracker
            .pointer_moved(&layout, &mut tooltip, gap, Duration::ZERO)
            .is_empty()
    );
    assert!(tooltip.snapshot(Duration::ZERO).is_none());
}

#[test]
fn static_layout_has_no_hover() {
    let layout = layout(&LayoutConfig::static_preset());
    let mut tooltip = Tooltip::new(&layout.tooltip_style);
    let mut tracker = HoverTracker::new();
    let events =
        tracker.pointer_moved(&layout, &mut tooltip, over_female_bar(&layout, 0), Duration::ZERO);
    assert!(events.is_empty());
    assert_eq!(tracker.hovered(), None);
}
