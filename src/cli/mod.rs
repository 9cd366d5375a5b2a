//! Command-line interface.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::link::LinkArgs;
use commands::serve::ServeArgs;

/// Relay that keeps GitHub and Redmine issues linked through webhooks
#[derive(Parser, Debug)]
#[command(name = "issue-relay", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to relay.yaml in the working directory)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the webhook server
    Serve(ServeArgs),
    /// Apply database migrations and exit
    Migrate,
    /// Inspect issue links
    Link(LinkArgs),
}

/// Print a command failure and exit with status 1.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({
            "error": err.to_string(),
            "causes": err.chain().skip(1).map(ToString::to_string).collect::<Vec<_>>(),
        });
        eprintln!("{body}");
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use commands::link::LinkCommands;

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from([
            "issue-relay",
            "serve",
            "--host",
            "127.0.0.1",
            "--port",
            "8080",
            "--config",
            "custom.yaml",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("custom.yaml")));
        let Commands::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(args.port, Some(8080));
    }

    #[test]
    fn test_parse_link_show_by_github() {
        let cli = Cli::try_parse_from([
            "issue-relay",
            "--json",
            "link",
            "show",
            "--github-id",
            "70",
            "--repo",
            "livelaps-api",
        ])
        .unwrap();

        assert!(cli.json);
        let Commands::Link(LinkArgs {
            command: LinkCommands::Show(show),
        }) = cli.command
        else {
            panic!("expected link show");
        };
        assert_eq!(show.github_id, Some(70));
        assert_eq!(show.repo.as_deref(), Some("livelaps-api"));
        assert_eq!(show.redmine_id, None);
    }

    #[test]
    fn test_link_show_rejects_mixed_keys() {
        assert!(Cli::try_parse_from([
            "issue-relay",
            "link",
            "show",
            "--github-id",
            "70",
            "--repo",
            "livelaps-api",
            "--redmine-id",
            "4",
        ])
        .is_err());

        // A GitHub number is only unique within its repository.
        assert!(Cli::try_parse_from(["issue-relay", "link", "show", "--github-id", "70"]).is_err());
        assert!(Cli::try_parse_from(["issue-relay", "link", "show"]).is_err());
    }

    #[test]
    fn test_link_list_default_limit() {
        let cli = Cli::try_parse_from(["issue-relay", "link", "list"]).unwrap();
        let Commands::Link(LinkArgs {
            command: LinkCommands::List { limit },
        }) = cli.command
        else {
            panic!("expected link list");
        };
        assert_eq!(limit, 20);
    }
}
