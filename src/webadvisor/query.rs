//! Single-parameter edits on absolute URLs.
//!
//! WebAdvisor keeps its navigation state in the query string, so edits must
//! leave every other pair exactly as the portal wrote it. Both functions work
//! on the raw `&`-separated segments and only re-encode the pair they touch.

use std::borrow::Cow;
use url::{Url, form_urlencoded};

use super::errors::{Result, WebAdvisorError};

/// Decoded name of a raw `name=value` query segment.
fn segment_name(segment: &str) -> Option<Cow<'_, str>> {
    form_urlencoded::parse(segment.as_bytes())
        .next()
        .map(|(name, _)| name)
}

/// Raw segments in order. Empty segments (`a=1&&b=2`) are kept so the
/// untouched part of the query survives a rewrite unchanged.
fn raw_segments(url: &Url) -> impl Iterator<Item = &str> {
    url.query()
        .filter(|query| !query.is_empty())
        .into_iter()
        .flat_map(|query| query.split('&'))
}

fn with_segments(url: &Url, segments: &[Cow<'_, str>]) -> Url {
    let mut edited = url.clone();
    if segments.iter().all(|segment| segment.is_empty()) {
        edited.set_query(None);
    } else {
        edited.set_query(Some(&segments.join("&")));
    }
    edited
}

/// Set `name` to `value`, overwriting any previous occurrence.
///
/// The first occurrence is replaced in place and later duplicates are dropped;
/// an absent parameter is appended.
pub fn set_query(url: &Url, name: &str, value: &str) -> Url {
    let pair = form_urlencoded::Serializer::new(String::new())
        .append_pair(name, value)
        .finish();

    let mut segments: Vec<Cow<'_, str>> = Vec::new();
    let mut replaced = false;
    for segment in raw_segments(url) {
        if segment_name(segment).as_deref() != Some(name) {
            segments.push(Cow::Borrowed(segment));
        } else if !replaced {
            segments.push(Cow::Owned(pair.clone()));
            replaced = true;
        }
    }
    if !replaced {
        segments.push(Cow::Owned(pair));
    }

    with_segments(url, &segments)
}

/// Remove every occurrence of `name`. Unlike setting it to `""`, the key
/// disappears entirely. Fails when the parameter is not present.
pub fn delete_query(url: &Url, name: &str) -> Result<Url> {
    let before = raw_segments(url).count();
    let segments: Vec<Cow<'_, str>> = raw_segments(url)
        .filter(|segment| segment_name(segment).as_deref() != Some(name))
        .map(Cow::Borrowed)
        .collect();

    if segments.len() == before {
        return Err(WebAdvisorError::not_found(format!(
            "query parameter '{name}' in {url}"
        )));
    }

    Ok(with_segments(url, &segments))
}
