// jdm/src/cli.rs
//! Defines the command-line argument structure using clap.
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use jdm_common::error::{JdmError, Result};
use jdm_common::{Config, RepositoryLayout};
use jdm_core::{LocalRepository, LocalResolver};

pub mod import;
pub mod list;
pub mod resolve;
pub mod verify;

use crate::cli::import::ImportArgs;
use crate::cli::list::List;
use crate::cli::resolve::ResolveArgs;
use crate::cli::verify::Verify;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, name = "jdm", bin_name = "jdm")]
#[command(propagate_version = true)]
pub struct CliArgs {
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve dependencies locally and copy them into the destination
    Import(ImportArgs),
    /// Show where a dependency resolves to and its checksum
    Resolve(ResolveArgs),
    /// List artifacts imported into the destination
    List(List),
    /// Re-check checksums of imported artifacts
    Verify(Verify),
}

impl Command {
    pub fn run(&self, config: &Config) -> Result<()> {
        match self {
            Self::Import(command) => command.run(config),
            Self::Resolve(command) => command.run(config),
            Self::List(command) => command.run(config),
            Self::Verify(command) => command.run(config),
        }
    }
}

/// Local repository roots to search, shared by `import` and `resolve`.
#[derive(Args, Debug, Default)]
pub struct RepoArgs {
    /// Maven-layout repository to search (repeatable; defaults to JDM_LOCAL_REPO)
    #[arg(long = "repo", value_name = "DIR")]
    pub repos: Vec<PathBuf>,

    /// Directory of `artifact-version.jar` files to search (repeatable)
    #[arg(long = "flat-repo", value_name = "DIR")]
    pub flat_repos: Vec<PathBuf>,
}

impl RepoArgs {
    /// Maven roots come first, then flat roots. Without any flags the
    /// configured local repository is used.
    pub fn resolver(&self, config: &Config) -> LocalResolver {
        let mut repositories: Vec<LocalRepository> = self
            .repos
            .iter()
            .map(LocalRepository::maven)
            .chain(self.flat_repos.iter().map(LocalRepository::flat))
            .collect();
        if repositories.is_empty() {
            repositories.push(LocalRepository::maven(config.local_repository()));
        }
        LocalResolver::new(repositories)
    }
}

pub fn parse_layout(raw: &str) -> std::result::Result<RepositoryLayout, String> {
    raw.parse().map_err(|e: JdmError| e.to_string())
}
