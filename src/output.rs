//! Rendering sections for the terminal.

use std::io::{self, Write};

use crate::cli::FilterArgs;
use crate::webadvisor::Section;

const WRAP_WIDTH: usize = 70;

impl FilterArgs {
    /// Whether a section passes the course-number bounds.
    ///
    /// Sections without a numeric course number only pass when no bound is set.
    pub fn keeps(&self, section: &Section) -> bool {
        if self.greater.is_none() && self.less.is_none() {
            return true;
        }
        let Some(number) = section.course_number() else {
            return false;
        };
        self.greater.is_none_or(|min| number >= min) && self.less.is_none_or(|max| number <= max)
    }

    fn any_column(&self) -> bool {
        self.section || self.title || self.faculty || self.meeting || self.credits || self.capacity
    }

    /// One output line for a section: the selected columns, space separated.
    pub fn render_line(&self, section: &Section) -> String {
        let id = section.section_string();
        if !self.any_column() {
            return [id.as_str(), section.title.as_str(), section.faculty.as_str()].join(" ");
        }

        let columns = [
            (self.section, id.as_str()),
            (self.title, section.title.as_str()),
            (self.faculty, section.faculty.as_str()),
            (self.meeting, section.meeting.as_str()),
            (self.credits, section.credits.as_str()),
            (self.capacity, section.capacity.as_str()),
        ];
        columns
            .iter()
            .filter(|(selected, _)| *selected)
            .map(|(_, value)| *value)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Greedy word wrap at `width` columns.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Print the sections that pass `filter`, as text or as a JSON array.
pub fn print_sections(
    out: &mut impl Write,
    sections: &[Section],
    filter: &FilterArgs,
    json: bool,
) -> io::Result<()> {
    let kept: Vec<&Section> = sections.iter().filter(|s| filter.keeps(s)).collect();

    if json {
        serde_json::to_writer_pretty(&mut *out, &kept)?;
        writeln!(out)?;
        return Ok(());
    }

    for section in kept {
        writeln!(out, "{}", filter.render_line(section))?;
        if filter.verbose
            && let Some(detail) = &section.detail
        {
            for line in wrap(detail, WRAP_WIDTH) {
                writeln!(out, "{line}")?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}
