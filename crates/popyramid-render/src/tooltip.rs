//! Hover tooltip: one floating box per chart, driven by pointer events on bars.
//!
//! - enter: content replaced, fade in
//! - move: box follows the pointer horizontally at half the pointer's x; it is never moved
//!   vertically
//! - leave: fade out, content kept

use crate::model::{BarMark, LayoutPoint, PyramidLayout, Sex, TooltipContent};
use crate::scale::ScalePair;
use popyramid_core::geom::{Point, vector};
use popyramid_core::number::js_number_to_string;
use popyramid_core::{AgeBandRecord, TooltipStyle};
use serde::Serialize;
use std::time::Duration;

impl TooltipContent {
    /// `Age: <age>`, `Males:<px>`, `Females:<px>`.
    ///
    /// The male/female lines show the scaled bar widths in pixels, not the raw counts.
    pub fn for_record(record: &AgeBandRecord, scales: &ScalePair) -> Self {
        let males = scales.male_scale.apply(record.male_pop);
        let females = scales.female_scale.apply(record.female_pop);
        Self {
            age: record.age.clone(),
            lines: vec![
                format!("Age: {}", record.age),
                format!("Males:{}", js_number_to_string(males)),
                format!("Females:{}", js_number_to_string(females)),
            ],
        }
    }
}

// d3-ease `easeCubicInOut`, the default transition easing.
fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OpacityTransition {
    pub from: f64,
    pub to: f64,
    pub start: Duration,
    pub duration: Duration,
}

impl OpacityTransition {
    pub fn end(&self) -> Duration {
        self.start + self.duration
    }

    pub fn value_at(&self, at: Duration) -> f64 {
        if self.duration.is_zero() || at >= self.end() {
            return self.to;
        }
        if at <= self.start {
            return self.from;
        }
        let t = (at - self.start).as_secs_f64() / self.duration.as_secs_f64();
        self.from + (self.to - self.from) * ease_cubic_in_out(t)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipState {
    pub visible: bool,
    /// Opacity when the last transition started.
    pub opacity: f64,
    pub transition: Option<OpacityTransition>,
    pub content: Option<TooltipContent>,
    pub position: LayoutPoint,
}

/// What a renderer needs to draw the tooltip at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipSnapshot {
    pub opacity: f64,
    pub x: f64,
    pub y: f64,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Tooltip {
    state: TooltipState,
    fade: Duration,
}

impl Tooltip {
    pub fn new(style: &TooltipStyle) -> Self {
        Self {
            state: TooltipState {
                visible: false,
                opacity: 0.0,
                transition: None,
                content: None,
                position: LayoutPoint {
                    x: 0.0,
                    y: style.top,
                },
            },
            fade: Duration::from_millis(style.fade_ms),
        }
    }

    pub fn state(&self) -> &TooltipState {
        &self.state
    }

    pub fn fade(&self) -> Duration {
        self.fade
    }

    pub fn opacity_at(&self, at: Duration) -> f64 {
        self.state
            .transition
            .map_or(self.state.opacity, |t| t.value_at(at))
    }

    /// Opacity the tooltip is heading to (1 while hovered, 0 after leaving).
    pub fn target_opacity(&self) -> f64 {
        self.state
            .transition
            .map_or(self.state.opacity, |t| t.to)
    }

    // A new fade starts from wherever the previous one had got to.
    fn fade_to(&mut self, to: f64, at: Duration) {
        let from = self.opacity_at(at);
        self.state.opacity = from;
        self.state.transition = Some(OpacityTransition {
            from,
            to,
            start: at,
            duration: self.fade,
        });
    }

    pub fn hover_enter(&mut self, content: TooltipContent, at: Duration) {
        self.state.content = Some(content);
        self.state.visible = true;
        self.fade_to(1.0, at);
    }

    pub fn hover_move(&mut self, pointer: Point) {
        self.state.position.x = pointer.x / 2.0;
    }

    pub fn hover_leave(&mut self, at: Duration) {
        self.state.visible = false;
        self.fade_to(0.0, at);
    }

    /// `None` until the tooltip has been shown once.
    pub fn snapshot(&self, at: Duration) -> Option<TooltipSnapshot> {
        let content = self.state.content.as_ref()?;
        Some(TooltipSnapshot {
            opacity: self.opacity_at(at),
            x: self.state.position.x,
            y: self.state.position.y,
            lines: content.lines.clone(),
        })
    }
}

/// Bar under `pointer` (SVG canvas coordinates). Zero-width bars are never hit.
pub fn hit_test(layout: &PyramidLayout, pointer: Point) -> Option<&BarMark> {
    layout.bars().find_map(|(group, bar)| {
        let local = pointer - vector(group.origin.x, group.origin.y);
        let inside = local.x >= bar.x
            && local.x < bar.x + bar.width
            && local.y >= bar.y
            && local.y < bar.y + bar.height;
        inside.then_some(bar)
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverEvent {
    Enter { sex: Sex, index: usize },
    Move { sex: Sex, index: usize },
    Leave { sex: Sex, index: usize },
}

/// Turns raw pointer positions into per-bar enter/move/leave events.
#[derive(Debug, Clone, Default)]
pub struct HoverTracker {
    hovered: Option<(Sex, usize)>,
}

impl HoverTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered(&self) -> Option<(Sex, usize)> {
        self.hovered
    }

    pub fn pointer_moved(
        &mut self,
        layout: &PyramidLayout,
        tooltip: &mut Tooltip,
        pointer: Point,
        at: Duration,
    ) -> Vec<HoverEvent> {
        if !layout.interactive {
            return Vec::new();
        }

        let hit = hit_test(layout, pointer);
        let hit_key = hit.map(|b| (b.sex, b.index));
        let mut events = Vec::new();

        if hit_key != self.hovered {
            if let Some((sex, index)) = self.hovered.take() {
                tooltip.hover_leave(at);
                events.push(HoverEvent::Leave { sex, index });
            }
            if let Some(bar) = hit {
                if let Some(content) = bar.tooltip.clone() {
                    tooltip.hover_enter(content, at);
                }
                events.push(HoverEvent::Enter {
                    sex: bar.sex,
                    index: bar.index,
                });
                self.hovered = hit_key;
            }
        }

        if let Some((sex, index)) = self.hovered {
            tooltip.hover_move(pointer);
            events.push(HoverEvent::Move { sex, index });
        }
        events
    }

    pub fn pointer_left(&mut self, tooltip: &mut Tooltip, at: Duration) -> Option<HoverEvent> {
        let (sex, index) = self.hovered.take()?;
        tooltip.hover_leave(at);
        Some(HoverEvent::Leave { sex, index })
    }
}
