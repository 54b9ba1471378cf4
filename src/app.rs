//! Drives a session through the portal for each command.

use anyhow::Context;
use std::io;
use std::process::ExitCode;
use tracing::info;

use crate::cli::{Args, Command};
use crate::config::{Config, Deployment};
use crate::output::print_sections;
use crate::webadvisor::{LoginOutcome, Section, SessionOptions, WebAdvisor};

/// Link label that leads from the home page to the login form.
const LOGIN_LINK: &str = "Log In";

pub struct App {
    args: Args,
    config: Config,
}

impl App {
    pub fn new(args: Args, config: Config) -> Self {
        Self { args, config }
    }

    pub async fn run(self) -> anyhow::Result<ExitCode> {
        let (name, deployment) = self.config.deployment(self.args.deployment.as_deref())?;
        let options = SessionOptions {
            verify: deployment.verify,
            timeout: self.config.timeout,
        };

        info!(deployment = name, url = deployment.url.as_str(), "Connecting to WebAdvisor");
        let mut session = WebAdvisor::connect(&deployment.url, options)
            .await
            .with_context(|| format!("Failed to open a session with {name}"))?;
        info!(
            deployment = name,
            verify_tls = session.verifies_tls(),
            "Session established"
        );

        let sections = match &self.args.command {
            Command::Search { filter, sections } => {
                self.search(&mut session, deployment, sections, filter.verbose)
                    .await?
            }
            Command::Schedule {
                filter,
                user,
                password,
            } => {
                let get_faculty = filter.faculty || filter.verbose;
                match self
                    .schedule(&mut session, deployment, user, password, get_faculty)
                    .await?
                {
                    Some(sections) => sections,
                    None => return Ok(ExitCode::FAILURE),
                }
            }
        };

        info!(count = sections.len(), "Scraped sections");
        print_sections(
            &mut io::stdout().lock(),
            &sections,
            self.args.command.filter(),
            self.args.json,
        )
        .context("Failed to write output")?;

        Ok(ExitCode::SUCCESS)
    }

    async fn search(
        &self,
        session: &mut WebAdvisor,
        deployment: &Deployment,
        filters: &[String],
        detailed: bool,
    ) -> anyhow::Result<Vec<Section>> {
        walk(session, &deployment.to_section).await?;

        let filters: Vec<Section> = filters.iter().map(|s| Section::parse(s)).collect();
        session
            .section_search(&self.args.term, &filters)
            .await
            .context("Section search request failed")?;

        session
            .grab_section_rows(detailed)
            .await
            .context("Failed to read section search results")
    }

    /// `None` when the portal rejects the credentials.
    async fn schedule(
        &self,
        session: &mut WebAdvisor,
        deployment: &Deployment,
        user: &str,
        password: &str,
        get_faculty: bool,
    ) -> anyhow::Result<Option<Vec<Section>>> {
        walk(session, &[LOGIN_LINK.to_string()]).await?;

        if let LoginOutcome::Rejected { message } = session.login(user, password).await? {
            eprintln!("Login failed: {message}");
            return Ok(None);
        }

        walk(session, &deployment.to_schedule).await?;
        session
            .select_term(&self.args.term)
            .await
            .context("Term selection request failed")?;

        session
            .grab_schedule_rows(get_faculty)
            .await
            .context("Failed to read class schedule")
            .map(Some)
    }
}

/// Follow a configured sequence of link labels.
async fn walk(session: &mut WebAdvisor, labels: &[String]) -> anyhow::Result<()> {
    for label in labels {
        session
            .follow_link(label)
            .await
            .with_context(|| format!("Navigation failed at link '{label}'"))?;
    }
    Ok(())
}
