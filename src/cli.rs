use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_COMMIT_SHORT"), ")");

/// Command-line front end for WebAdvisor student portals.
#[derive(Debug, Parser)]
#[command(
    name = "webadvisor",
    version = VERSION,
    about,
    after_help = "WebAdvisor is fragile. If a command stops working, check the deployment's \
                  link labels in webadvisor.toml against what the portal currently shows."
)]
pub struct Args {
    /// Deployment to use (a key under [deployments] in the config file)
    #[arg(short = 'u', long = "url", global = true, value_name = "DEPLOYMENT")]
    pub deployment: Option<String>,

    /// Term code, e.g. FA15R
    #[arg(short = 'r', long, global = true, default_value = "FA15R")]
    pub term: String,

    /// Config file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = TracingFormat::Pretty)]
    pub tracing: TracingFormat,

    /// Print sections as a JSON array instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up course sections
    Search {
        #[command(flatten)]
        filter: FilterArgs,

        /// Sections in the form SUB-NUM-SEC, e.g. MAT-241-001 (NUM and SEC may be omitted)
        #[arg(required = true, value_name = "SEC")]
        sections: Vec<String>,
    },
    /// Show your own class schedule (requires login)
    Schedule {
        #[command(flatten)]
        filter: FilterArgs,

        #[arg(long, env = "WEBADVISOR_USER")]
        user: String,

        #[arg(long, env = "WEBADVISOR_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

impl Command {
    pub fn filter(&self) -> &FilterArgs {
        match self {
            Self::Search { filter, .. } | Self::Schedule { filter, .. } => filter,
        }
    }
}

/// Row filters and column switches. With no column switch set, the section
/// id, title and faculty are printed.
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct FilterArgs {
    /// Only report sections with course number >= N
    #[arg(short, long, value_name = "N", conflicts_with = "less")]
    pub greater: Option<u32>,

    /// Only report sections with course number <= N
    #[arg(short, long, value_name = "N")]
    pub less: Option<u32>,

    /// Print section faculty
    #[arg(short, long)]
    pub faculty: bool,

    /// Print section title
    #[arg(short, long)]
    pub title: bool,

    /// Print section meetings
    #[arg(short, long)]
    pub meeting: bool,

    /// Print the section id
    #[arg(short, long)]
    pub section: bool,

    /// Print section capacity
    #[arg(short, long)]
    pub capacity: bool,

    /// Print section credits
    #[arg(short = 'k', long)]
    pub credits: bool,

    /// Fetch and print course descriptions (one extra request per row)
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TracingFormat {
    Pretty,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_search_arguments() {
        let args = Args::try_parse_from([
            "webadvisor", "search", "-u", "wa.example.edu", "-r", "SP16R", "-g", "200", "-v",
            "MAT-241-001", "ENG-101",
        ])
        .unwrap();

        assert_eq!(args.deployment.as_deref(), Some("wa.example.edu"));
        assert_eq!(args.term, "SP16R");
        match &args.command {
            Command::Search { filter, sections } => {
                assert_eq!(filter.greater, Some(200));
                assert!(filter.verbose);
                assert_eq!(sections, &["MAT-241-001", "ENG-101"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_greater_and_less_conflict() {
        let result = Args::try_parse_from(["webadvisor", "search", "-g", "100", "-l", "300", "MAT"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_search_requires_sections() {
        assert!(Args::try_parse_from(["webadvisor", "search"]).is_err());
    }

    #[test]
    fn test_schedule_credentials_from_flags() {
        let args = Args::try_parse_from([
            "webadvisor", "schedule", "--user", "jdoe", "--password", "hunter2", "-f",
        ])
        .unwrap();
        match args.command {
            Command::Schedule { user, password, filter } => {
                assert_eq!(user, "jdoe");
                assert_eq!(password, "hunter2");
                assert!(filter.faculty);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
