//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Browse billing customers page by page
#[derive(Parser, Debug)]
#[command(name = "billing-customers")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// GraphQL endpoint (overrides the config file)
    #[arg(short, long, global = true)]
    pub endpoint: Option<String>,

    /// Records per page (overrides the config file)
    #[arg(short, long, global = true)]
    pub page_size: Option<u32>,

    /// Output format
    #[arg(short, long, global = true, default_value = "pretty")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load pages and print the accumulated list
    List {
        /// Number of pages to load
        #[arg(long, default_value = "1", conflicts_with = "all")]
        pages: usize,

        /// Load until there are no more pages
        #[arg(long)]
        all: bool,
    },

    /// Interactively load more pages (Enter = load more, q = quit)
    Browse,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON document with customers and pagination info
    Json,
    /// Human-readable list
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_defaults() {
        let cli = Cli::try_parse_from(["billing-customers", "list"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::List {
                pages: 1,
                all: false
            }
        ));
        assert_eq!(cli.format, OutputFormat::Pretty);
        assert!(cli.endpoint.is_none());
    }

    #[test]
    fn test_parse_global_overrides() {
        let cli = Cli::try_parse_from([
            "billing-customers",
            "list",
            "--all",
            "--endpoint",
            "http://localhost:4000/graphql",
            "--page-size",
            "10",
            "--format",
            "json",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::List { all: true, .. }));
        assert_eq!(
            cli.endpoint.as_deref(),
            Some("http://localhost:4000/graphql")
        );
        assert_eq!(cli.page_size, Some(10));
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_pages_conflicts_with_all() {
        let result = Cli::try_parse_from(["billing-customers", "list", "--pages", "3", "--all"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_browse() {
        let cli = Cli::try_parse_from(["billing-customers", "-v", "browse"]).unwrap();
        assert!(matches!(cli.command, Commands::Browse));
        assert!(cli.verbose);
    }
}
