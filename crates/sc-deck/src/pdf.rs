//! PDF decks: one slide per page.

use std::path::Path;
use std::time::Duration;

use sc_av::actions::pdf_page_texts;
use sc_av::ToolRegistry;
use sc_core::Slide;

/// Read every page of `path` as a slide titled `Page N`.
///
/// PDFs carry no speaker notes.
pub async fn read_pdf(
    tools: &ToolRegistry,
    path: &Path,
    content: bool,
    timeout: Duration,
) -> sc_core::Result<Vec<Slide>> {
    let pages = pdf_page_texts(tools, path, timeout)
        .await
        .map_err(|e| match e {
            sc_core::Error::Tool { tool, message } => sc_core::Error::Input(format!(
                "cannot read presentation {}: {tool}: {message}",
                path.display()
            )),
            other => other,
        })?;
    Ok(pages_to_slides(pages, content))
}

fn pages_to_slides(pages: Vec<String>, content: bool) -> Vec<Slide> {
    pages
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let n = i as u32 + 1;
            let body = if content { text } else { String::new() };
            Slide::new(n, format!("Page {n}"), body, "")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_become_numbered_slides() {
        let slides = pages_to_slides(vec!["Intro".into(), "".into()], true);
        assert_eq!(slides.len(), 2);
        assert_eq!(slides[0].title, "Page 1");
        assert_eq!(slides[0].content, "Intro");
        assert_eq!(slides[1].title, "Page 2");
        assert!(slides[1].speaker_notes.is_empty());
    }

    #[test]
    fn content_switch_drops_page_text() {
        let slides = pages_to_slides(vec!["Intro".into()], false);
        assert!(slides[0].content.is_empty());
    }

    #[tokio::test]
    async fn missing_pdftotext_is_an_input_error() {
        let err = read_pdf(
            &ToolRegistry::default(),
            Path::new("deck.pdf"),
            true,
            Duration::from_secs(1),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, sc_core::Error::Input(_)));
    }
}
