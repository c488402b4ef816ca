//! Two-column transcript layout.
//!
//! [`layout_transcript`] is a pure function: given the accumulated chunks,
//! the surface geometry and a font-metrics source, it produces the absolute
//! position of every word plus an overflow flag.  It is recomputed from
//! scratch every frame — nothing here caches or mutates, which keeps the
//! render path trivially deterministic and easy to test with mock metrics.
//!
//! The algorithm fills the left column top-to-bottom with greedy word wrap,
//! switches to the right column when the left one runs out of vertical
//! space, and reports overflow once the right column is exhausted too.
//! Every chunk ends with a forced line break so fragments stay visually
//! separated.

use egui::Color32;

use crate::session::TextChunk;

// ---------------------------------------------------------------------------
// Font metrics
// ---------------------------------------------------------------------------

/// Text measurements the layout needs from the rendering backend.
///
/// The egui app implements this on top of `Fonts::layout_no_wrap`; tests use
/// a fixed-width mock.
pub trait FontMetrics {
    /// Rendered width of `word` in points.
    fn word_width(&self, word: &str) -> f32;
    /// Width of a single space between words.
    fn space_width(&self) -> f32;
    /// Vertical advance from one line to the next.
    fn line_height(&self) -> f32;
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// The drawable surface carved into margins, a person area and two text
/// columns.
///
/// ```text
/// ┌─────────────────────────────────────────────┐
/// │ margin                                      │
/// │  ┌─────────┐ ┌────────┐ ┌─────────┐         │
/// │  │ left    │ │ person │ │ right   │         │
/// │  │ column  │ │ area   │ │ column  │         │
/// │  └─────────┘ └────────┘ └─────────┘         │
/// │ margin                                      │
/// └─────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutGeometry {
    pub surface_width: f32,
    pub surface_height: f32,
    pub margin: f32,
    pub person_area_width: f32,
}

impl LayoutGeometry {
    /// Width of each text column: what remains after the person area and
    /// both margins, split in two.
    pub fn column_width(&self) -> f32 {
        (self.surface_width - self.person_area_width - 2.0 * self.margin) / 2.0
    }

    /// Left edge of the left column.
    pub fn left_column_x(&self) -> f32 {
        self.margin
    }

    /// Left edge of the right column.
    pub fn right_column_x(&self) -> f32 {
        self.surface_width - self.margin - self.column_width()
    }

    /// Bottom boundary below which no line may start.
    pub fn bottom_limit(&self) -> f32 {
        self.surface_height - self.margin
    }
}

// ---------------------------------------------------------------------------
// Layout result
// ---------------------------------------------------------------------------

/// One positioned word, ready for the painter.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub word: String,
    pub color: Color32,
    /// Left edge of the word.
    pub x: f32,
    /// Top edge of the word's line.
    pub y: f32,
}

/// All word placements plus whether the text no longer fits.
#[derive(Debug, Clone, Default)]
pub struct LayoutResult {
    pub placements: Vec<Placement>,
    /// Set once both columns are exhausted.  Words past that point are not
    /// placed; the caller ends the session instead.
    pub overflow: bool,
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// Internal fill state: which column we are in and where the next word goes.
struct Cursor {
    /// Left edge of the current column.
    col_x: f32,
    /// Top of the current line.
    col_y: f32,
    /// X position for the next word on the current line.
    line_x: f32,
    in_right_column: bool,
    overflow: bool,
}

impl Cursor {
    fn new(geometry: &LayoutGeometry) -> Self {
        Self {
            col_x: geometry.left_column_x(),
            col_y: geometry.margin,
            line_x: geometry.left_column_x(),
            in_right_column: false,
            overflow: false,
        }
    }

    /// Move to the next line, switching to the right column (and from there
    /// to overflow) when the current column has no vertical space left.
    fn line_break(&mut self, geometry: &LayoutGeometry, line_height: f32) {
        self.col_y += line_height;
        if self.col_y + line_height > geometry.bottom_limit() {
            if self.in_right_column {
                self.overflow = true;
            } else {
                self.in_right_column = true;
                self.col_x = geometry.right_column_x();
                self.col_y = geometry.margin;
            }
        }
        self.line_x = self.col_x;
    }
}

// ---------------------------------------------------------------------------
// layout_transcript
// ---------------------------------------------------------------------------

/// Place every word of `chunks` into the two-column geometry.
///
/// Pure and deterministic: identical inputs always yield identical output.
/// Once overflow is hit, remaining words are skipped and
/// [`LayoutResult::overflow`] is set.
pub fn layout_transcript(
    chunks: &[TextChunk],
    geometry: &LayoutGeometry,
    metrics: &dyn FontMetrics,
) -> LayoutResult {
    let line_height = metrics.line_height();
    let space = metrics.space_width();
    let mut cursor = Cursor::new(geometry);
    let mut result = LayoutResult::default();

    for chunk in chunks {
        for token in &chunk.words {
            if cursor.overflow {
                result.overflow = true;
                return result;
            }
            let width = metrics.word_width(&token.word);
            if cursor.line_x + width > cursor.col_x + geometry.column_width()
                && cursor.line_x > cursor.col_x
            {
                cursor.line_break(geometry, line_height);
                if cursor.overflow {
                    result.overflow = true;
                    return result;
                }
            }
            result.placements.push(Placement {
                word: token.word.clone(),
                color: token.color,
                x: cursor.line_x,
                y: cursor.col_y,
            });
            cursor.line_x += width + space;
        }
        // Forced break between chunks keeps fragments on separate lines.
        if !chunk.words.is_empty() {
            cursor.line_break(geometry, line_height);
            if cursor.overflow {
                result.overflow = true;
                return result;
            }
        }
    }

    result.overflow = cursor.overflow;
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::WordToken;

    /// Fixed measurements: every word is 30 wide, spaces are 10, lines are
    /// 20 tall.  With the 100-wide columns below, two words fit per line
    /// (the third would start at x-offset 80 and run to 110), and each
    /// column holds eight 20-tall lines between margin 20 and the bottom
    /// limit 180.
    struct FixedMetrics;

    impl FontMetrics for FixedMetrics {
        fn word_width(&self, _word: &str) -> f32 {
            30.0
        }
        fn space_width(&self) -> f32 {
            10.0
        }
        fn line_height(&self) -> f32 {
            20.0
        }
    }

    fn geometry() -> LayoutGeometry {
        // column_width = (300 - 60 - 2*20) / 2 = 100
        LayoutGeometry {
            surface_width: 300.0,
            surface_height: 200.0,
            margin: 20.0,
            person_area_width: 60.0,
        }
    }

    fn chunk(words: &[&str]) -> TextChunk {
        TextChunk {
            words: words
                .iter()
                .map(|w| WordToken {
                    word: w.to_string(),
                    color: Color32::BLACK,
                })
                .collect(),
        }
    }

    #[test]
    fn geometry_splits_remaining_width_in_two() {
        let g = geometry();
        assert_eq!(g.column_width(), 100.0);
        assert_eq!(g.left_column_x(), 20.0);
        assert_eq!(g.right_column_x(), 180.0);
    }

    #[test]
    fn words_flow_left_to_right_on_one_line() {
        let result = layout_transcript(&[chunk(&["a", "b"])], &geometry(), &FixedMetrics);
        assert_eq!(result.placements.len(), 2);
        assert_eq!(result.placements[0].x, 20.0);
        assert_eq!(result.placements[0].y, 20.0);
        assert_eq!(result.placements[1].x, 60.0);
        assert_eq!(result.placements[1].y, 20.0);
        assert!(!result.overflow);
    }

    #[test]
    fn third_word_wraps_to_next_line() {
        // Two 30-wide words fill the 100-wide column; the third must wrap.
        let result =
            layout_transcript(&[chunk(&["a", "b", "c", "d"])], &geometry(), &FixedMetrics);
        assert_eq!(result.placements[1].y, 20.0);
        assert_eq!(result.placements[2].x, 20.0);
        assert_eq!(result.placements[2].y, 40.0);
        assert_eq!(result.placements[3].x, 60.0);
        assert_eq!(result.placements[3].y, 40.0);
    }

    #[test]
    fn each_chunk_forces_a_line_break() {
        let result = layout_transcript(
            &[chunk(&["a"]), chunk(&["b"])],
            &geometry(),
            &FixedMetrics,
        );
        assert_eq!(result.placements[0].y, 20.0);
        assert_eq!(result.placements[1].y, 40.0);
        assert_eq!(result.placements[1].x, 20.0);
    }

    #[test]
    fn left_column_exhaustion_switches_to_right_column() {
        // Lines start at y = 20, 40, …, 160 (a line starting at 180 would
        // cross the bottom limit).  Eight single-word chunks fill the left
        // column; the ninth starts the right column at the top.
        let chunks: Vec<TextChunk> = (0..9).map(|_| chunk(&["w"])).collect();
        let result = layout_transcript(&chunks, &geometry(), &FixedMetrics);

        assert_eq!(result.placements.len(), 9);
        let last = &result.placements[8];
        assert_eq!(last.x, 180.0);
        assert_eq!(last.y, 20.0);
        assert!(!result.overflow);
    }

    #[test]
    fn cursor_resets_to_new_column_after_chunk_break_switch() {
        // Fill the left column, then send a multi-word chunk into the right
        // column: its words must start at the right column's left edge, not
        // at a stale left-column x.
        let mut chunks: Vec<TextChunk> = (0..8).map(|_| chunk(&["w"])).collect();
        chunks.push(chunk(&["x", "y"]));
        let result = layout_transcript(&chunks, &geometry(), &FixedMetrics);

        let x_word = &result.placements[8];
        assert_eq!(x_word.x, 180.0);
        assert_eq!(x_word.y, 20.0);
        let y_word = &result.placements[9];
        assert_eq!(y_word.x, 220.0);
        assert_eq!(y_word.y, 20.0);
    }

    #[test]
    fn overflow_when_both_columns_are_full() {
        // Eight lines per column, sixteen single-word chunks fill both; the
        // seventeenth has nowhere to go.
        let chunks: Vec<TextChunk> = (0..17).map(|_| chunk(&["w"])).collect();
        let result = layout_transcript(&chunks, &geometry(), &FixedMetrics);

        assert!(result.overflow);
        assert!(result.placements.len() < 17);
    }

    #[test]
    fn layout_is_deterministic() {
        let chunks = vec![chunk(&["one", "two", "three"]), chunk(&["four"])];
        let a = layout_transcript(&chunks, &geometry(), &FixedMetrics);
        let b = layout_transcript(&chunks, &geometry(), &FixedMetrics);
        assert_eq!(a.placements, b.placements);
        assert_eq!(a.overflow, b.overflow);
    }

    #[test]
    fn empty_transcript_places_nothing() {
        let result = layout_transcript(&[], &geometry(), &FixedMetrics);
        assert!(result.placements.is_empty());
        assert!(!result.overflow);
    }
}
