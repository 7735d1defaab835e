//! git-staging - group forwarded package PRs into staging PRs
//!
//! CLI binary for Gitea, GitHub and GitLab.

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use git_staging::group::GroupRequest;
use git_staging::types::{Platform, PrRef};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cli;

use cli::style::Stylize;

#[derive(Parser)]
#[command(name = "git-staging")]
#[command(about = "Group forwarded package PRs into staging PRs - Gitea, GitHub & GitLab")]
#[command(version)]
struct Cli {
    /// Forge type (detected from the host when omitted)
    #[arg(long, global = true, value_enum)]
    platform: Option<PlatformArg>,

    /// Forge host, e.g. src.example.org
    #[arg(long, global = true)]
    host: Option<String>,

    /// Configuration file (defaults to <config dir>/git-staging/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum PlatformArg {
    Gitea,
    Github,
    Gitlab,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Gitea => Self::Gitea,
            PlatformArg::Github => Self::GitHub,
            PlatformArg::Gitlab => Self::GitLab,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Group forwarded PRs into a staging PR
    Group {
        /// Forwarded PRs (owner/repo#number)
        #[arg(required = true, value_name = "PR")]
        prs: Vec<PrRef>,

        /// Title for the staging PR
        #[arg(long)]
        title: String,

        /// Branch for a new staging PR
        #[arg(long)]
        branch: Option<String>,

        /// Existing staging PR to add to (owner/repo#number)
        #[arg(long)]
        grouped_pr: Option<PrRef>,

        /// Directory holding the project clone
        #[arg(long)]
        workdir: PathBuf,

        /// Push the staging branch to this fork (owner/repo)
        #[arg(long)]
        fork: Option<String>,

        /// Ignore the backlog label and overwrite an existing branch
        #[arg(long)]
        force: bool,

        /// Dry run - show what would be done without making changes
        #[arg(long)]
        dry_run: bool,
    },

    /// Authentication management
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Test authentication
    Test,
    /// Show authentication setup instructions
    Setup,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let options = cli::GlobalOptions {
        platform: cli.platform.map(Platform::from),
        host: cli.host,
        config: cli.config,
    };

    match cli.command {
        Commands::Group {
            prs,
            title,
            branch,
            grouped_pr,
            workdir,
            fork,
            force,
            dry_run,
        } => {
            let request = GroupRequest {
                forwarding: prs,
                title,
                branch,
                grouped_pr,
                workdir,
                fork,
                force,
                dry_run,
            };
            cli::run_group(&options, &request).await?;
        }
        Commands::Auth { action } => match action {
            AuthAction::Test => cli::run_auth_test(&options).await?,
            AuthAction::Setup => cli::run_auth_setup(&options),
        },
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            anstream::eprintln!("{}: {e:#}", "error".error());
            ExitCode::FAILURE
        }
    }
}
