//! Text cards: a slide's title, body and notes drawn onto a blank canvas.
//!
//! Decks without a native rasterizer (PPTX) get a readable stand-in image
//! so the composition stage always has a background.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::command::ToolCommand;
use crate::tools::ToolRegistry;

const MARGIN: u32 = 60;

/// What to draw and how large.
#[derive(Debug, Clone)]
pub struct TextCard {
    pub slide_number: u32,
    pub title: String,
    pub body: String,
    pub notes: String,
    pub width: u32,
    pub height: u32,
    pub font_file: Option<PathBuf>,
    pub title_size: u32,
    pub body_size: u32,
    pub notes_size: u32,
}

impl TextCard {
    /// Characters per line that fit at `font_size`.
    fn columns(&self, font_size: u32) -> usize {
        let usable = self.width.saturating_sub(2 * MARGIN) as f32;
        ((usable / (font_size.max(1) as f32 * 0.55)) as usize).max(10)
    }
}

/// Greedy word wrap to at most `width` characters per line.
///
/// Existing line breaks are kept; a single word longer than `width` gets a
/// line of its own.
pub fn wrap_text(text: &str, width: usize) -> String {
    let mut out = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > width {
                out.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        out.push(line);
    }
    out.join("\n")
}

/// Escape a path for use as a filtergraph option value.
fn filter_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "\\\\")
        .replace(':', "\\:")
        .replace('\'', "\\'")
}

fn drawtext(card: &TextCard, textfile: &Path, size: u32, x: &str, y: u32) -> String {
    let mut filter = format!(
        "drawtext=textfile='{}':fontsize={size}:fontcolor=black:x={x}:y={y}",
        filter_path(textfile)
    );
    if let Some(ref font) = card.font_file {
        filter.push_str(&format!(":fontfile='{}'", filter_path(font)));
    }
    filter
}

/// Render `card` as a PNG at `output`.
///
/// Text goes through `textfile=` so slide content never needs filtergraph
/// escaping. The text files live in `scratch` only for the duration of the
/// call.
pub async fn render_text_card(
    tools: &ToolRegistry,
    card: &TextCard,
    scratch: &Path,
    timeout: Duration,
    output: &Path,
) -> sc_core::Result<()> {
    let ffmpeg = tools.require("ffmpeg")?;
    std::fs::create_dir_all(scratch)?;

    let mut held = Vec::new();
    let mut write_text = |text: &str| -> sc_core::Result<PathBuf> {
        let mut file = tempfile::Builder::new()
            .prefix("card_")
            .suffix(".txt")
            .tempfile_in(scratch)?;
        file.write_all(text.as_bytes())?;
        file.flush()?;
        let path = file.path().to_path_buf();
        held.push(file);
        Ok(path)
    };

    let mut filters = Vec::new();
    let mut y = MARGIN;

    let label = write_text(&format!("Slide {}", card.slide_number))?;
    filters.push(drawtext(card, &label, card.notes_size, "w-tw-60", MARGIN / 2));

    if !card.title.trim().is_empty() {
        let title = wrap_text(card.title.trim(), card.columns(card.title_size));
        let lines = title.lines().count() as u32;
        let path = write_text(&title)?;
        filters.push(drawtext(card, &path, card.title_size, "60", y));
        y += lines * card.title_size * 3 / 2 + card.title_size;
    }

    if !card.body.trim().is_empty() {
        let body = wrap_text(card.body.trim(), card.columns(card.body_size));
        let lines = body.lines().count() as u32;
        let path = write_text(&body)?;
        filters.push(drawtext(card, &path, card.body_size, "60", y));
        y += lines * card.body_size * 3 / 2 + card.body_size;
    }

    if !card.notes.trim().is_empty() && y < card.height.saturating_sub(MARGIN) {
        let notes = wrap_text(
            &format!("Notes: {}", card.notes.trim()),
            card.columns(card.notes_size),
        );
        let path = write_text(&notes)?;
        filters.push(drawtext(card, &path, card.notes_size, "60", y));
    }

    let mut cmd = ToolCommand::new(ffmpeg.path.clone());
    cmd.args(["-y", "-f", "lavfi", "-i"]);
    cmd.arg(format!("color=c=white:s={}x{}:d=1", card.width, card.height));
    cmd.arg("-vf").arg(filters.join(","));
    cmd.args(["-frames:v", "1"]);
    cmd.arg(output.to_string_lossy().as_ref());
    cmd.timeout(timeout);
    cmd.execute().await?;

    drop(held);

    if !sc_core::is_present(output) {
        return Err(sc_core::Error::tool(
            "ffmpeg",
            format!("text card not rendered: {}", output.display()),
        ));
    }
    Ok(())
}
