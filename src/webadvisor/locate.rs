//! Locating elements in WebAdvisor pages.
//!
//! Nothing here extracts record fields; these functions only find the
//! elements the extractor reads. WebAdvisor ids carry positional suffixes
//! (`LIST_VAR1_3`, `SEC_SHORT_TITLE_12`), so columns are matched by id
//! fragment rather than exact id.

use html_scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

use super::errors::{Result, WebAdvisorError};

static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());
static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static WITH_ID: LazyLock<Selector> = LazyLock::new(|| Selector::parse("[id]").unwrap());

/// First string literal passed to `window.open(...)`, single or double quoted.
static WINDOW_OPEN_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r#"window\.open\(\s*(?:'([^']*)'|"([^"]*)")"#).unwrap()
});

/// One column of a results table: elements of `tag` whose id contains `id_contains`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagSpec {
    pub tag: &'static str,
    pub id_contains: &'static str,
}

impl TagSpec {
    pub const fn new(tag: &'static str, id_contains: &'static str) -> Self {
        Self { tag, id_contains }
    }
}

/// Href of the first link whose visible text contains `search`.
///
/// Case-sensitive, document order. Anchors without an `href` are skipped.
pub fn find_link(search: &str, document: &Html) -> Result<String> {
    document
        .select(&ANCHOR)
        .filter(|a| a.text().collect::<String>().contains(search))
        .find_map(|a| a.attr("href"))
        .map(str::to_string)
        .ok_or_else(|| WebAdvisorError::not_found(format!("link containing '{search}'")))
}

/// Pull the relative URL out of a title link's `onclick` handler.
///
/// Titles open their detail page with something like
/// `window.open('?TOKENIDX=..&TYPE=M&CLONE=Y','WSS', ...)`; only the first
/// argument matters.
pub fn parse_redirect_target(onclick: &str) -> Result<String> {
    let caps = WINDOW_OPEN_RE
        .captures(onclick)
        .ok_or_else(|| WebAdvisorError::mismatch(format!("no window.open call in '{onclick}'")))?;

    Ok(caps
        .get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default())
}

/// Collect each column's elements and zip them into rows.
///
/// The i-th element of every column together form one row. The portal always
/// renders complete rows, so columns of different lengths mean the layout has
/// changed and the whole page is rejected rather than silently truncated.
pub fn locate_tag_groups<'a>(
    root: ElementRef<'a>,
    specs: &[TagSpec],
) -> Result<Vec<Vec<ElementRef<'a>>>> {
    let mut columns = Vec::with_capacity(specs.len());
    for spec in specs {
        let selector = Selector::parse(spec.tag)
            .map_err(|e| WebAdvisorError::selector(spec.tag, e))?;
        let column: Vec<ElementRef<'a>> = root
            .select(&selector)
            .filter(|el| {
                el.value()
                    .id()
                    .is_some_and(|id| id.contains(spec.id_contains))
            })
            .collect();
        columns.push(column);
    }

    let Some(rows) = columns.first().map(Vec::len) else {
        return Ok(Vec::new());
    };

    if columns.iter().any(|column| column.len() != rows) {
        let lengths = specs
            .iter()
            .zip(&columns)
            .map(|(spec, column)| format!("{}={}", spec.id_contains, column.len()))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(WebAdvisorError::mismatch(format!(
            "tag groups differ in length ({lengths})"
        )));
    }

    Ok((0..rows)
        .map(|i| columns.iter().map(|column| column[i]).collect())
        .collect())
}

/// The `<table summary="...">` a results view renders into.
pub fn find_table<'a>(document: &'a Html, summary: &str) -> Result<ElementRef<'a>> {
    document
        .select(&TABLE)
        .find(|t| t.attr("summary") == Some(summary))
        .ok_or_else(|| WebAdvisorError::not_found(format!("table with summary '{summary}'")))
}

/// First element with exactly this id.
pub fn find_by_id<'a>(document: &'a Html, id: &str) -> Result<ElementRef<'a>> {
    document
        .select(&WITH_ID)
        .find(|el| el.value().id() == Some(id))
        .ok_or_else(|| WebAdvisorError::not_found(format!("element #{id}")))
}

/// First element matching a column spec.
pub fn find_tag<'a>(document: &'a Html, spec: TagSpec) -> Result<ElementRef<'a>> {
    let groups = locate_tag_groups(document.root_element(), &[spec])?;
    groups
        .into_iter()
        .next()
        .and_then(|row| row.into_iter().next())
        .ok_or_else(|| {
            WebAdvisorError::not_found(format!(
                "<{}> with id containing '{}'",
                spec.tag, spec.id_contains
            ))
        })
}

/// First element matching a CSS selector, if any.
pub fn select_first<'a>(document: &'a Html, selector: &Selector) -> Option<ElementRef<'a>> {
    document.select(selector).next()
}

/// All text under an element, trimmed.
pub fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}
