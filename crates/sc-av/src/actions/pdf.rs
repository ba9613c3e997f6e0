//! PDF text extraction and page rasterization with poppler.

use std::path::Path;
use std::time::Duration;

use crate::command::ToolCommand;
use crate::tools::ToolRegistry;

/// Text of every page of `pdf`, in page order.
pub async fn pdf_page_texts(
    tools: &ToolRegistry,
    pdf: &Path,
    timeout: Duration,
) -> sc_core::Result<Vec<String>> {
    let pdftotext = tools.require("pdftotext")?;
    let output = ToolCommand::new(pdftotext.path.clone())
        .arg("-layout")
        .arg(pdf.to_string_lossy().as_ref())
        .arg("-")
        .timeout(timeout)
        .execute()
        .await?;
    Ok(split_pages(&output.stdout))
}

/// Split pdftotext output on form feeds.
///
/// pdftotext terminates every page with `\x0c`, so the empty piece after the
/// last one is dropped.
pub fn split_pages(text: &str) -> Vec<String> {
    let mut pages: Vec<String> = text
        .split('\x0c')
        .map(|p| p.trim().to_string())
        .collect();
    if text.ends_with('\x0c') || pages.last().is_some_and(|p| p.is_empty()) {
        pages.pop();
    }
    pages
}

/// Render page `page` (1-based) of `pdf` as a PNG at `output`.
pub async fn rasterize_pdf_page(
    tools: &ToolRegistry,
    pdf: &Path,
    page: u32,
    (width, height): (u32, u32),
    timeout: Duration,
    output: &Path,
) -> sc_core::Result<()> {
    let pdftoppm = tools.require("pdftoppm")?;

    // pdftoppm appends `.png` to the prefix it is given.
    let prefix = output.with_extension("");

    let mut cmd = ToolCommand::new(pdftoppm.path.clone());
    cmd.args(["-png", "-singlefile"]);
    cmd.arg("-f").arg(page.to_string());
    cmd.arg("-l").arg(page.to_string());
    cmd.arg("-scale-to-x").arg(width.to_string());
    cmd.arg("-scale-to-y").arg(height.to_string());
    cmd.arg(pdf.to_string_lossy().as_ref());
    cmd.arg(prefix.to_string_lossy().as_ref());
    cmd.timeout(timeout);
    cmd.execute().await?;

    if !sc_core::is_present(output) {
        return Err(sc_core::Error::tool(
            "pdftoppm",
            format!("page {page} not rendered to {}", output.display()),
        ));
    }
    Ok(())
}
