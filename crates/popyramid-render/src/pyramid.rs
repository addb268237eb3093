use crate::Result;
use crate::model::{
    AxisLayout, AxisTick, BarMark, LayoutPoint, MarkGroup, PyramidLayout, Sex, TextAnchor,
    TextMark, TooltipContent,
};
use crate::scale::{LinearScale, ScalePair};
use popyramid_core::number::js_number_to_string;
use popyramid_core::{Dataset, LayoutConfig};

/// d3 draws axes half a pixel off the grid so 1px lines stay crisp.
const AXIS_OFFSET: f64 = 0.5;
const TICK_SIZE: f64 = 6.0;
const TICK_PADDING: f64 = 3.0;
const AGE_HEADER_Y: f64 = -14.0;

fn pt(x: f64, y: f64) -> LayoutPoint {
    LayoutPoint { x, y }
}

// NaN counts and negative values collapse to zero-width bars.
fn bar_width(scaled: f64) -> f64 {
    if scaled.is_finite() { scaled.max(0.0) } else { 0.0 }
}

/// Text of the centre label for row `index` of `len` rows.
///
/// The last row always shows the terminal label; other rows show their age every
/// `label_every` rows and stay blank otherwise. A `label_every` of `0` labels no row but the
/// last.
pub fn centre_label_text<'a>(
    index: usize,
    len: usize,
    age: &'a str,
    config: &'a LayoutConfig,
) -> &'a str {
    if index + 1 == len {
        &config.terminal_label
    } else if index.checked_rem(config.label_every) == Some(0) {
        age
    } else {
        ""
    }
}

fn bottom_axis(scale: &LinearScale, tick_count: f64, y: f64, has_data: bool) -> AxisLayout {
    let (r0, r1) = scale.range();
    let domain_path = format!(
        "M{},{}V{}H{}V{}",
        js_number_to_string(r0 + AXIS_OFFSET),
        js_number_to_string(TICK_SIZE),
        js_number_to_string(AXIS_OFFSET),
        js_number_to_string(r1 + AXIS_OFFSET),
        js_number_to_string(TICK_SIZE),
    );

    let ticks = if has_data {
        let format = scale.tick_format(tick_count);
        scale
            .ticks(tick_count)
            .into_iter()
            .map(|value| AxisTick {
                value,
                x: scale.apply(value) + AXIS_OFFSET,
                label: format.format(value),
            })
            .collect()
    } else {
        Vec::new()
    };

    AxisLayout {
        y,
        domain_path,
        tick_size: TICK_SIZE,
        label_y: TICK_SIZE + TICK_PADDING,
        ticks,
    }
}

/// Maps every record to its bars and centre label and lays out axes and captions.
///
/// Bar and text coordinates are relative to their group's origin.
pub fn layout_pyramid(dataset: &Dataset, config: &LayoutConfig) -> Result<PyramidLayout> {
    config.validate()?;

    let scales = ScalePair::compute(config, dataset);
    let half_width = scales.half_width;
    let plot_height = config.plot_height();
    let bandwidth = scales.age_scale.bandwidth();
    let margin = config.margin;

    let mut male = MarkGroup::new("male", pt(margin.left, margin.top));
    let mut female = MarkGroup::new(
        "female",
        pt(margin.left + half_width + config.centre_spacing, margin.top),
    );
    let mut labels = MarkGroup::new("labels", pt(margin.left + half_width, margin.top));

    let len = dataset.len();
    for (index, record) in dataset.records().iter().enumerate() {
        let Some(y) = scales.age_scale.apply(&record.age) else {
            continue;
        };
        let tooltip = config
            .interactive
            .then(|| TooltipContent::for_record(record, &scales));

        let male_width = bar_width(scales.male_scale.apply(record.male_pop));
        male.bars.push(BarMark {
            index,
            sex: Sex::Male,
            x: half_width - male_width,
            y,
            width: male_width,
            height: bandwidth,
            fill: config.male_color.clone(),
            tooltip: tooltip.clone(),
        });

        female.bars.push(BarMark {
            index,
            sex: Sex::Female,
            x: 0.0,
            y,
            width: bar_width(scales.female_scale.apply(record.female_pop)),
            height: bandwidth,
            fill: config.female_color.clone(),
            tooltip,
        });

        labels.texts.push(TextMark {
            text: centre_label_text(index, len, &record.age, config).to_string(),
            x: config.centre_spacing / 2.0,
            y: y + bandwidth / 2.0,
            anchor: Some(TextAnchor::Middle),
            bold: false,
            class: "age-label".to_string(),
        });
    }

    let tick_count = config.plot_width() / config.tick_spacing;
    let axis_y = plot_height + config.axis_offset;
    let has_data = scales.max_count.is_some();
    female.axis = Some(bottom_axis(&scales.female_scale, tick_count, axis_y, has_data));
    male.axis = Some(bottom_axis(
        &scales.male_scale_reversed,
        tick_count,
        axis_y,
        has_data,
    ));

    labels.texts.push(TextMark {
        text: "Age".to_string(),
        x: config.centre_spacing / 2.0,
        y: AGE_HEADER_Y,
        anchor: None,
        bold: true,
        class: "age-header".to_string(),
    });

    let caption_y = config.caption_y();
    female.texts.push(TextMark {
        text: "Female Population".to_string(),
        x: half_width,
        y: caption_y,
        anchor: Some(TextAnchor::End),
        bold: false,
        class: "caption".to_string(),
    });
    male.texts.push(TextMark {
        text: "Male Population".to_string(),
        x: 0.0,
        y: caption_y,
        anchor: Some(TextAnchor::Start),
        bold: false,
        class: "caption".to_string(),
    });

    tracing::debug!(
        source = %dataset.source,
        rows = len,
        max_count = ?scales.max_count,
        half_width,
        bandwidth,
        "pyramid layout computed"
    );

    Ok(PyramidLayout {
        width: config.width,
        height: config.height,
        plot_width: config.plot_width(),
        plot_height,
        half_width,
        centre_spacing: config.centre_spacing,
        max_count: scales.max_count,
        interactive: config.interactive,
        male,
        female,
        labels,
        tooltip_style: config.tooltip.clone(),
    })
}
