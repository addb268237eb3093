use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: Option<String>,
    pub font_size: f64,
    pub font_weight: Option<String>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: None,
            font_size: 16.0,
            font_weight: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub line_count: usize,
}

pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics;
}

/// Font-free measurer: every column is a fixed fraction of the font size, wide glyphs
/// count as two columns.
#[derive(Debug, Clone, Default)]
pub struct DeterministicTextMeasurer {
    pub char_width_factor: f64,
    pub line_height_factor: f64,
}

impl DeterministicTextMeasurer {
    pub fn line_height(&self, font_size: f64) -> f64 {
        let factor = if self.line_height_factor == 0.0 {
            1.2
        } else {
            self.line_height_factor
        };
        font_size.max(1.0) * factor
    }
}

impl TextMeasurer for DeterministicTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let char_width_factor = if self.char_width_factor == 0.0 {
            0.6
        } else {
            self.char_width_factor
        };
        let font_size = style.font_size.max(1.0);

        let mut columns = 0usize;
        let mut line_count = 0usize;
        for line in text.split('\n') {
            columns = columns.max(UnicodeWidthStr::width(line));
            line_count += 1;
        }

        TextMetrics {
            width: columns as f64 * font_size * char_width_factor,
            height: line_count as f64 * self.line_height(font_size),
            line_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measures_widest_line() {
        let m = DeterministicTextMeasurer::default();
        let style = TextStyle {
            font_size: 10.0,
            ..Default::default()
        };
        let metrics = m.measure("Age: 0\nFemales:123", &style);
        assert_eq!(metrics.line_count, 2);
        assert_eq!(metrics.width, 11.0 * 10.0 * 0.6);
        assert_eq!(metrics.height, 2.0 * 12.0);
    }

    #[test]
    fn wide_glyphs_take_two_columns() {
        let m = DeterministicTextMeasurer::default();
        let narrow = m.measure("ab", &TextStyle::default()).width;
        let wide = m.measure("年", &TextStyle::default()).width;
        assert_eq!(narrow, wide);
    }
}
