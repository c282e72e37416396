//! Standalone HTML export

use std::fmt::Write as _;
use std::path::Path;

use crate::asciicast::Reader;
use crate::error::Result;
use crate::export::transform::emulate_to;
use crate::render::render_svg;
use crate::theme::Theme;

/// Write a self-contained HTML page embedding the final frame as inline SVG.
pub(crate) fn export_html(
    source: &Path,
    output: &Path,
    theme: &Theme,
    title_override: Option<&str>,
) -> Result<()> {
    let duration = Reader::open(source)?.info()?.duration;
    let (term, header) = emulate_to(source, duration)?;
    let title = title_override
        .map(str::to_string)
        .or(header.title)
        .unwrap_or_else(|| {
            source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "recording".to_string())
        });
    let svg = render_svg(term.rows(), Some(&title), theme);

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    let _ = write!(html, "<title>{}</title>\n", escape_html(&title));
    html.push_str("<style>\n");
    let _ = write!(
        html,
        "body {{ background-color: {}; margin: 0; display: flex; \
         justify-content: center; align-items: center; min-height: 100vh; }}\n",
        theme.background.css()
    );
    html.push_str("</style>\n</head>\n<body>\n");
    html.push_str(&svg);
    html.push_str("</body>\n</html>\n");

    std::fs::write(output, html)?;
    Ok(())
}

fn escape_html(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '&' => "&amp;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&#39;".to_string(),
            _ => c.to_string(),
        })
        .collect()
}
