//! Turning located result rows into [`Section`] records.

use async_trait::async_trait;
use html_scraper::{ElementRef, Html};
use tracing::{debug, trace};
use url::Url;

use super::errors::{Result, WebAdvisorError};
use super::locate::{
    TagSpec, element_text, find_by_id, find_table, find_tag, locate_tag_groups,
    parse_redirect_target,
};
use super::models::Section;
use super::page::Page;
use super::query::delete_query;

/// Section search results: short title, then status, meeting, faculty, capacity, credits.
const SECTION_COLUMNS: [TagSpec; 6] = [
    TagSpec::new("a", "SEC_SHORT_TITLE"),
    TagSpec::new("p", "LIST_VAR1"),
    TagSpec::new("p", "SEC_MEETING_INFO"),
    TagSpec::new("p", "SEC_FACULTY_INFO"),
    TagSpec::new("p", "LIST_VAR5"),
    TagSpec::new("p", "SEC_MIN_CRED"),
];

/// Class schedule: short title, then meeting, credits, start date.
const SCHEDULE_COLUMNS: [TagSpec; 4] = [
    TagSpec::new("a", "LIST_VAR6"),
    TagSpec::new("p", "LIST_VAR12"),
    TagSpec::new("p", "LIST_VAR8"),
    TagSpec::new("p", "DATE_LIST_VAR1"),
];

const SCHEDULE_TABLE: &str = "Schedule";
const DESCRIPTION_ID: &str = "VAR3";
const FACULTY_COLUMN: TagSpec = TagSpec::new("p", "LIST_VAR7");

/// Source of course detail pages.
///
/// Detail fetches are the only point where extraction needs the network; the
/// session implements this, tests hand back canned pages.
#[async_trait]
pub trait DetailFetcher: Send {
    async fn fetch_detail_page(&mut self, url: &Url) -> Result<Page>;
}

/// Text pulled out of one located row, detached from the parsed document.
#[derive(Debug)]
struct RawRow {
    title: String,
    onclick: Option<String>,
    cells: Vec<String>,
}

impl RawRow {
    fn from_elements(elements: &[ElementRef<'_>]) -> Option<Self> {
        let (title, cells) = elements.split_first()?;
        Some(Self {
            title: element_text(*title),
            onclick: title.attr("onclick").map(str::to_string),
            cells: cells.iter().map(|el| element_text(*el)).collect(),
        })
    }

    fn cells<const N: usize>(&self) -> Result<[String; N]> {
        self.cells.clone().try_into().map_err(|cells: Vec<String>| {
            WebAdvisorError::mismatch(format!("expected {N} cells, found {}", cells.len()))
        })
    }

    fn detail_url(&self, page_url: &Url) -> Result<Url> {
        let onclick = self.onclick.as_deref().ok_or_else(|| {
            WebAdvisorError::mismatch(format!("title '{}' has no onclick handler", self.title))
        })?;
        detail_url(page_url, onclick)
    }
}

fn collect_rows(root: ElementRef<'_>, specs: &[TagSpec]) -> Result<Vec<RawRow>> {
    Ok(locate_tag_groups(root, specs)?
        .iter()
        .filter_map(|row| RawRow::from_elements(row))
        .collect())
}

/// Parse `"SUB-NUM-SEC (LEVEL) Title words"`.
///
/// The identity token runs up to the first space; the first word after it is
/// the level code and the rest is the title. Unparseable numerics leave the
/// number and section empty instead of failing.
pub fn section_from_short_title(text: &str) -> Section {
    let text = text.trim();
    let (identity, rest) = text.split_once(' ').unwrap_or((text, ""));
    let mut section = Section::parse(identity);

    let rest = rest.trim();
    section.title = match rest.split_once(' ') {
        Some((_level, title)) => title.trim().to_string(),
        None => rest.to_string(),
    };
    section
}

/// Where a title link's detail window points.
///
/// The `window.open` target is resolved against the page it was found on and
/// its `CLONE` parameter removed so the portal serves the page inline.
pub fn detail_url(page_url: &Url, onclick: &str) -> Result<Url> {
    let target = parse_redirect_target(onclick)?;
    let url = page_url.join(&target)?;
    delete_query(&url, "CLONE")
}

fn description(document: &Html) -> Result<String> {
    find_by_id(document, DESCRIPTION_ID).map(element_text)
}

fn faculty(document: &Html) -> Result<String> {
    find_tag(document, FACULTY_COLUMN).map(element_text)
}

/// Sections from a section-search results page, in page order.
///
/// With `detailed`, each row's detail page is fetched, one after another, for
/// its description.
pub async fn grab_section_rows<F>(page: &Page, detailed: bool, fetcher: &mut F) -> Result<Vec<Section>>
where
    F: DetailFetcher + ?Sized,
{
    let rows = {
        let document = page.document();
        collect_rows(document.root_element(), &SECTION_COLUMNS)?
    };
    debug!(rows = rows.len(), detailed, "Located section rows");

    let mut sections = Vec::with_capacity(rows.len());
    for row in rows {
        let mut section = section_from_short_title(&row.title);
        let [status, meeting, faculty, capacity, credits] = row.cells()?;
        section.status = status;
        section.meeting = meeting;
        section.faculty = faculty;
        section.capacity = capacity;
        section.credits = credits;

        if detailed {
            let url = row.detail_url(&page.url)?;
            let detail_page = fetcher.fetch_detail_page(&url).await?;
            section.detail = Some(description(&detail_page.document())?);
        }

        trace!(section = %section.section_string(), "Extracted section row");
        sections.push(section);
    }

    Ok(sections)
}

/// Sections from the student's class schedule table, in page order.
///
/// The schedule view has no faculty or description column. With
/// `get_faculty`, each row's detail page is fetched to fill in both.
pub async fn grab_schedule_rows<F>(
    page: &Page,
    get_faculty: bool,
    fetcher: &mut F,
) -> Result<Vec<Section>>
where
    F: DetailFetcher + ?Sized,
{
    let rows = {
        let document = page.document();
        let table = find_table(&document, SCHEDULE_TABLE)?;
        collect_rows(table, &SCHEDULE_COLUMNS)?
    };
    debug!(rows = rows.len(), get_faculty, "Located schedule rows");

    let mut sections = Vec::with_capacity(rows.len());
    for row in rows {
        let mut section = section_from_short_title(&row.title);
        let [meeting, credits, start_date] = row.cells()?;
        section.meeting = meeting;
        section.credits = credits;
        section.start_date = start_date;

        if get_faculty {
            let url = row.detail_url(&page.url)?;
            let detail_page = fetcher.fetch_detail_page(&url).await?;
            let document = detail_page.document();
            section.faculty = faculty(&document)?;
            section.detail = Some(description(&document)?);
        }

        trace!(section = %section.section_string(), "Extracted schedule row");
        sections.push(section);
    }

    Ok(sections)
}
