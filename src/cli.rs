use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "sonicfg")]
#[command(version)]
#[command(about = "Declarative configuration for SONiC switches over RESTCONF", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v info, -vv requests, -vvv bodies)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: ~/.config/sonicfg/config.toml)
    #[arg(long, global = true, env = "SONICFG_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the current configuration of resources
    Facts(FactsArgs),

    /// Preview the operations a document would send
    Diff(DiffArgs),

    /// Make the device match a document
    Apply(ApplyArgs),

    /// List supported resources or show the fields of one
    Resources {
        /// Resource to describe
        name: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Device connection
// ============================================================================

#[derive(Args, Debug, Default, Clone)]
pub struct ConnectionArgs {
    /// Switch management address
    #[arg(long, env = "SONIC_HOST")]
    pub host: Option<String>,

    /// RESTCONF port (default: 443)
    #[arg(long)]
    pub port: Option<u16>,

    /// Username for basic authentication
    #[arg(short, long, env = "SONIC_USERNAME")]
    pub username: Option<String>,

    /// Password for basic authentication
    #[arg(short, long, env = "SONIC_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Verify the switch TLS certificate
    #[arg(long)]
    pub verify_tls: bool,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Work against a saved snapshot file instead of a switch (wins over --host)
    #[arg(long, value_name = "SNAPSHOT")]
    pub offline: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

// ============================================================================
// Commands
// ============================================================================

#[derive(Args)]
pub struct FactsArgs {
    /// Resources to read (default: all)
    pub resources: Vec<String>,

    /// Print the raw device tree instead of normalized facts
    #[arg(long)]
    pub raw: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

#[derive(Args)]
pub struct DiffArgs {
    /// Desired-state document (YAML, TOML or JSON)
    pub document: PathBuf,

    /// Also print the predicted before/after config
    #[arg(long)]
    pub full: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Desired-state document (YAML, TOML or JSON)
    pub document: PathBuf,

    /// Compute and simulate the operations without sending them
    #[arg(long)]
    pub check: bool,

    /// Skip confirmation prompts
    #[arg(short, long)]
    pub yes: bool,

    /// Write the run report to a file (format from the extension)
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Write the resulting tree back to the --offline snapshot
    #[arg(long, requires = "offline")]
    pub save: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_apply_args() {
        let cli = Cli::try_parse_from([
            "sonicfg", "-vv", "apply", "site.yaml", "--host", "10.0.0.1", "--check", "--yes",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Apply(args) => {
                assert_eq!(args.document, PathBuf::from("site.yaml"));
                assert_eq!(args.connection.host.as_deref(), Some("10.0.0.1"));
                assert!(args.check);
                assert!(args.yes);
            }
            _ => panic!("expected apply"),
        }
    }

    #[test]
    fn test_facts_args() {
        let cli = Cli::try_parse_from(["sonicfg", "facts", "ssh", "stp", "--raw", "-f", "json", "--offline", "snap.json"])
            .unwrap();
        match cli.command {
            Command::Facts(args) => {
                assert_eq!(args.resources, vec!["ssh", "stp"]);
                assert!(args.raw);
                assert_eq!(args.format, OutputFormat::Json);
                assert_eq!(args.connection.offline, Some(PathBuf::from("snap.json")));
            }
            _ => panic!("expected facts"),
        }
    }

    #[test]
    fn test_save_requires_offline() {
        assert!(Cli::try_parse_from(["sonicfg", "apply", "site.yaml", "--save"]).is_err());
        assert!(
            Cli::try_parse_from(["sonicfg", "apply", "site.yaml", "--save", "--offline", "snap.json"]).is_ok()
        );
    }
}
