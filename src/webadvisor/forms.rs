//! Hand-built POST payloads.
//!
//! WebAdvisor forms are positional: a field's meaning comes from its name
//! (`VAR4`, `LIST.VAR2_3`) rather than anything self-describing, and a missing
//! hidden field usually sends the portal back to its home page without an
//! error. Every form carries `RETURN.URL`, the page it was submitted from.

use super::models::Section;

pub type Form = Vec<(String, String)>;

/// Search matrix columns: subject, number, section, level.
const MATRIX_COLUMNS: usize = 4;

/// The portal rejects a one-row matrix, so at least this many rows are declared.
const MIN_MATRIX_ROWS: usize = 2;

fn field(name: impl Into<String>, value: impl Into<String>) -> (String, String) {
    (name.into(), value.into())
}

pub fn login_form(username: &str, password: &str, return_url: &str) -> Form {
    vec![
        field("USER.NAME", username),
        field("CURR.PWD", password),
        field("RETURN.URL", return_url),
    ]
}

pub fn term_form(term: &str, return_url: &str) -> Form {
    vec![field("VAR4", term), field("RETURN.URL", return_url)]
}

/// Section search for `term`, one matrix row per section.
///
/// The matrix is `LIST.VAR{column}_{row}`, both 1-based, with every column's
/// row count declared in `LIST.VAR{column}_MAX`.
pub fn section_search_form(term: &str, sections: &[Section], return_url: &str) -> Form {
    let rows = sections.len().max(MIN_MATRIX_ROWS).to_string();

    let mut form = vec![field("VAR1", term)];
    for column in 1..=MATRIX_COLUMNS {
        form.push(field(format!("LIST.VAR{column}_MAX"), rows.as_str()));
    }
    form.push(field("RETURN.URL", return_url));
    form.push(field("LIST.VAR1_CONTROLLER", "LIST.VAR1"));
    form.push(field(
        "LIST.VAR1_MEMBERS",
        "LIST.VAR1*LIST.VAR2*LIST.VAR3*LIST.VAR4",
    ));

    for (row, section) in (1..).zip(sections) {
        for (column, value) in (1..).zip(section.columns()) {
            form.push(field(format!("LIST.VAR{column}_{row}"), value));
        }
    }

    form
}

#[cfg(test)]
mod tests {
    use super::*;

    const RETURN_URL: &str = "https://wa.example.edu/WebAdvisor/WebAdvisor?TOKENIDX=1&SS=1";

    fn value<'a>(form: &'a Form, name: &str) -> Option<&'a str> {
        form.iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_login_form_fields() {
        let form = login_form("jdoe", "hunter2", RETURN_URL);
        assert_eq!(value(&form, "USER.NAME"), Some("jdoe"));
        assert_eq!(value(&form, "CURR.PWD"), Some("hunter2"));
        assert_eq!(value(&form, "RETURN.URL"), Some(RETURN_URL));
        assert_eq!(form.len(), 3);
    }

    #[test]
    fn test_term_form_fields() {
        let form = term_form("FA15R", RETURN_URL);
        assert_eq!(form, vec![field("VAR4", "FA15R"), field("RETURN.URL", RETURN_URL)]);
    }

    #[test]
    fn test_single_section_declares_two_rows() {
        let mut section = Section::parse("MAT-241-001");
        section.level = "UG".to_string();
        let form = section_search_form("FA15R", &[section], RETURN_URL);

        assert_eq!(value(&form, "VAR1"), Some("FA15R"));
        for column in 1..=4 {
            assert_eq!(value(&form, &format!("LIST.VAR{column}_MAX")), Some("2"));
        }
        assert_eq!(value(&form, "LIST.VAR1_1"), Some("MAT"));
        assert_eq!(value(&form, "LIST.VAR2_1"), Some("241"));
        assert_eq!(value(&form, "LIST.VAR3_1"), Some("001"));
        assert_eq!(value(&form, "LIST.VAR4_1"), Some("UG"));
        assert_eq!(value(&form, "LIST.VAR1_2"), None, "second row is declared but empty");
        assert_eq!(value(&form, "LIST.VAR1_CONTROLLER"), Some("LIST.VAR1"));
        assert_eq!(
            value(&form, "LIST.VAR1_MEMBERS"),
            Some("LIST.VAR1*LIST.VAR2*LIST.VAR3*LIST.VAR4")
        );
        assert_eq!(value(&form, "RETURN.URL"), Some(RETURN_URL));
    }

    #[test]
    fn test_many_sections_declare_their_count() {
        let sections: Vec<Section> = ["MAT-241-001", "ENG-101", "HIS", "PHY-101L-010"]
            .into_iter()
            .map(Section::parse)
            .collect();
        let form = section_search_form("SP16R", &sections, RETURN_URL);

        assert_eq!(value(&form, "LIST.VAR3_MAX"), Some("4"));
        assert_eq!(value(&form, "LIST.VAR1_3"), Some("HIS"));
        assert_eq!(value(&form, "LIST.VAR2_3"), Some(""));
        assert_eq!(value(&form, "LIST.VAR3_2"), Some(""));
        assert_eq!(value(&form, "LIST.VAR2_4"), Some("101"));
        // VAR1 + 4 MAX + RETURN.URL + CONTROLLER + MEMBERS + 4 rows * 4 columns
        assert_eq!(form.len(), 8 + 16);
    }

    #[test]
    fn test_no_sections_still_declares_minimum() {
        let form = section_search_form("FA15R", &[], RETURN_URL);
        assert_eq!(value(&form, "LIST.VAR1_MAX"), Some("2"));
        assert!(!form.iter().any(|(n, _)| n.starts_with("LIST.VAR1_1")));
    }
}
