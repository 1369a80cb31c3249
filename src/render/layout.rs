//! Pure layout math for social cards.
//!
//! Everything here is computed from the canvas size and the entry's text;
//! no pixels are touched, so the geometry is unit testable on its own.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐  canvas (background)
//! │  ┌────────────────────────────────┬───────┐  │
//! │  │▌ ███████████████████           │       │  │  card + border,
//! │  │▌ ██████████                    │ cover │  │  offset shadow,
//! │  │▌                               │ panel │  │  accent stripe
//! │  │▌ ▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒            │       │  │  title / description
//! │  │▌ [rust] [wasm] [cli]     ▓▓▓▓▓ │       │  │  chips / byline
//! │  └────────────────────────────────┴───────┘  │
//! │    └──────────── shadow ───────────────┘     │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Text is laid out as one block per wrapped line, its width proportional to
//! the line's character count.

/// An axis-aligned rectangle in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Shrink by `by` pixels on every side.
    pub fn inset(&self, by: u32) -> Self {
        Self {
            x: self.x + by,
            y: self.y + by,
            width: self.width.saturating_sub(2 * by),
            height: self.height.saturating_sub(2 * by),
        }
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// The text content a card lays out.
#[derive(Debug, Clone, Copy)]
pub struct CardText<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub labels: &'a [String],
    pub byline: Option<&'a str>,
    pub has_cover: bool,
}

/// Positions of every element on the card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardLayout {
    pub shadow: Rect,
    pub card: Rect,
    pub border: u32,
    pub accent: Rect,
    pub cover: Option<Rect>,
    pub title: Vec<Rect>,
    pub description: Vec<Rect>,
    pub chips: Vec<Rect>,
    pub byline: Option<Rect>,
}

const TITLE_MAX_LINES: usize = 3;
const DESCRIPTION_MAX_LINES: usize = 2;
const MAX_CHIPS: usize = 6;
const ELLIPSIS: char = '\u{2026}';

/// Approximate advance of one glyph for a font size, in pixels.
fn glyph_width(font_size: u32) -> u32 {
    (font_size * 11 / 20).max(1)
}

/// Greedy word wrap by character count.
///
/// Words longer than a line are cut. When the text needs more than
/// `max_lines`, the last kept line ends with an ellipsis.
pub fn wrap_words(text: &str, max_chars: usize, max_lines: usize) -> Vec<String> {
    if max_chars == 0 || max_lines == 0 {
        return Vec::new();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word: String = word.chars().take(max_chars).collect();
        let word_len = word.chars().count();

        if current_len == 0 {
            current = word;
            current_len = word_len;
        } else if current_len + 1 + word_len <= max_chars {
            current.push(' ');
            current.push_str(&word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current = word;
            current_len = word_len;
        }
    }
    if current_len > 0 {
        lines.push(current);
    }

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            let keep = last.chars().count().min(max_chars.saturating_sub(1));
            let mut truncated: String = last.chars().take(keep).collect();
            truncated = truncated.trim_end().to_string();
            truncated.push(ELLIPSIS);
            *last = truncated;
        }
    }

    lines
}

/// One block per wrapped line, stacked from `top`.
fn text_blocks(
    lines: &[String],
    x: u32,
    top: u32,
    max_width: u32,
    font_size: u32,
) -> Vec<Rect> {
    let line_height = font_size * 5 / 4;
    let bar_height = (font_size * 7 / 10).max(1);
    let advance = glyph_width(font_size);
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let chars = line.chars().count() as u32;
            Rect::new(
                x,
                top + i as u32 * line_height + (line_height - bar_height) / 2,
                (chars * advance).min(max_width),
                bar_height,
            )
        })
        .collect()
}

/// Lay out a card of `width × height` pixels.
pub fn compute_layout(width: u32, height: u32, text: &CardText<'_>) -> CardLayout {
    let margin = width / 24;
    let shadow_offset = (width / 100).max(2);
    let border = (width / 300).max(2);

    let card = Rect::new(
        margin,
        margin,
        width.saturating_sub(2 * margin + shadow_offset),
        height.saturating_sub(2 * margin + shadow_offset),
    );
    let shadow = Rect::new(
        card.x + shadow_offset,
        card.y + shadow_offset,
        card.width,
        card.height,
    );
    let inner = card.inset(border);

    let accent = Rect::new(inner.x, inner.y, (width / 80).max(2), inner.height);

    let cover = text.has_cover.then(|| {
        let panel_width = inner.width * 2 / 5;
        Rect::new(
            inner.right() - panel_width,
            inner.y,
            panel_width,
            inner.height,
        )
    });

    let padding = width / 20;
    let text_x = accent.right() + padding;
    let text_right = cover.map(|c| c.x).unwrap_or(inner.right()).saturating_sub(padding);
    let text_width = text_right.saturating_sub(text_x);

    let title_size = (height / 10).max(8);
    let title_lines = wrap_words(
        text.title,
        (text_width / glyph_width(title_size)) as usize,
        TITLE_MAX_LINES,
    );
    let title_top = inner.y + padding;
    let title = text_blocks(&title_lines, text_x, title_top, text_width, title_size);

    let description_size = (height / 24).max(6);
    let description_lines = wrap_words(
        text.description,
        (text_width / glyph_width(description_size)) as usize,
        DESCRIPTION_MAX_LINES,
    );
    let description_top =
        title_top + title_lines.len() as u32 * (title_size * 5 / 4) + description_size;
    let description = text_blocks(
        &description_lines,
        text_x,
        description_top,
        text_width,
        description_size,
    );

    let chip_size = (height / 30).max(6);
    let chip_height = chip_size * 2;
    let chip_padding = chip_size;
    let chip_gap = chip_size / 2 + 2;
    let chip_y = inner.bottom().saturating_sub(padding + chip_height);

    let byline = text.byline.filter(|b| !b.trim().is_empty()).map(|b| {
        let byline_width = (b.chars().count() as u32 * glyph_width(chip_size)).min(text_width / 3);
        Rect::new(
            text_right.saturating_sub(byline_width),
            chip_y + (chip_height - chip_size) / 2,
            byline_width,
            chip_size,
        )
    });
    let chips_right = byline
        .map(|b| b.x.saturating_sub(chip_gap))
        .unwrap_or(text_right);

    let mut chips = Vec::new();
    let mut chip_x = text_x;
    for label in text.labels.iter().take(MAX_CHIPS) {
        let chip_width = label.chars().count() as u32 * glyph_width(chip_size) + 2 * chip_padding;
        if chip_x + chip_width > chips_right {
            break;
        }
        chips.push(Rect::new(chip_x, chip_y, chip_width, chip_height));
        chip_x += chip_width + chip_gap;
    }

    CardLayout {
        shadow,
        card,
        border,
        accent,
        cover,
        title,
        description,
        chips,
        byline,
    }
}
