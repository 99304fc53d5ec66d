//! HTML for highlighted code blocks and Twoslash annotations.

use std::fmt::Write as _;

use html_escape::{encode_double_quoted_attribute, encode_text};

use super::{
  checker::{CheckReport, Diagnostic},
  markup::TwoslashSample,
};
use crate::{
  syntax::{DEFAULT_THEME, SyntaxManager, SyntaxResult},
  utils::slugify,
};

/// Render an ordinary fenced block.
///
/// # Errors
///
/// Returns an error if highlighting fails.
pub fn render_code(
  manager: &SyntaxManager,
  code: &str,
  language: &str,
  theme: Option<&str>,
) -> SyntaxResult<String> {
  let lines = manager.highlight_lines(code, language, theme)?;
  let mut html = open_pre(manager, language, theme, false);
  for line in &lines {
    push_line(&mut html, line);
  }
  close_pre(&mut html);
  Ok(html)
}

/// Render a Twoslash sample with the diagnostics and query answers that
/// should be shown.
///
/// Only displayed lines are rendered; annotations on lines hidden by a cut are
/// dropped. Queries without an answer in `report` get no popover.
///
/// # Errors
///
/// Returns an error if highlighting fails.
pub fn render_twoslash(
  manager: &SyntaxManager,
  sample: &TwoslashSample,
  report: &CheckReport,
  theme: Option<&str>,
) -> SyntaxResult<String> {
  let code = sample.display_code();
  let lines = manager.highlight_lines(&code, &sample.language, theme)?;
  let mut html = open_pre(manager, &sample.language, theme, true);

  for (offset, line) in lines.iter().enumerate() {
    let source_line = sample.display_start + offset;
    push_line(&mut html, line);

    for diagnostic in report
      .diagnostics
      .iter()
      .filter(|d| d.line == source_line)
    {
      push_error(&mut html, diagnostic);
    }

    for query in sample.queries.iter().filter(|q| q.line == source_line) {
      match report.answers.iter().find(|answer| &answer.query == query) {
        Some(answer) => push_query(&mut html, query.column, &answer.text),
        None => {
          log::debug!(
            "No answer for the query at {}:{}; leaving it out",
            query.line + 1,
            query.column + 1
          );
        },
      }
    }
  }

  close_pre(&mut html);
  Ok(html)
}

/// Wrap one or more rendered blocks in a fragment container.
#[must_use]
pub fn wrap_fragment(blocks: &str) -> String {
  format!("<div class=\"shiki-twoslash-fragment\">{blocks}</div>")
}

fn open_pre(
  manager: &SyntaxManager,
  language: &str,
  theme: Option<&str>,
  twoslash: bool,
) -> String {
  let theme_name = manager.resolve_theme(theme).unwrap_or(DEFAULT_THEME);
  let mut html = format!("<pre class=\"shiki {}", slugify(theme_name));
  if twoslash {
    html.push_str(" twoslash lsp");
  }
  html.push('"');
  if let Some(style) = manager.theme_style(theme) {
    let _ = write!(
      html,
      " style=\"{}\"",
      encode_double_quoted_attribute(&style)
    );
  }
  let _ = write!(
    html,
    "><div class=\"language-id\">{}</div><div class=\"code-container\"><code>",
    encode_text(language)
  );
  html
}

fn close_pre(html: &mut String) {
  html.push_str("</code></div></pre>");
}

fn push_line(html: &mut String, line: &str) {
  let _ = write!(html, "<div class=\"line\">{line}</div>");
}

fn push_error(html: &mut String, diagnostic: &Diagnostic) {
  let message = encode_text(&diagnostic.message);
  let _ = write!(
    html,
    "<span class=\"error\"><span>{message}</span><span \
     class=\"code\">{}</span></span><span \
     class=\"error-behind\">{message}</span>",
    diagnostic.code
  );
}

fn push_query(html: &mut String, column: usize, text: &str) {
  let _ = write!(
    html,
    "<div class=\"meta-line\"><span class=\"popover-prefix\">{}</span><span \
     class=\"popover\"><div class=\"arrow\"></div>{}</span></div>",
    " ".repeat(column),
    encode_text(text)
  );
}
