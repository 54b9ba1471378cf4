//! WebAdvisor session engine and scrapers.

pub mod errors;
pub mod extract;
pub mod forms;
pub mod locate;
pub mod models;
pub mod page;
pub mod query;
pub mod session;

pub use errors::{Result, WebAdvisorError};
pub use extract::{DetailFetcher, section_from_short_title};
pub use models::Section;
pub use page::Page;
pub use session::{LoginOutcome, SessionOptions, WebAdvisor};
