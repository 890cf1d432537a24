// jdm/src/cli/import.rs
use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use jdm_common::error::{JdmError, Result};
use jdm_common::{Config, Descriptor, ImportRequest, Manifest, RepositoryLayout};
use jdm_core::{ImportOutcome, Importer};
use jdm_net::RemoteRepository;
use tracing::{debug, instrument};

use crate::cli::{parse_layout, RepoArgs};

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Dependencies as group:artifact:version
    #[arg(required_unless_present = "manifest", value_name = "DESCRIPTOR")]
    coordinates: Vec<String>,

    /// TOML or JSON manifest listing dependencies
    #[arg(long, short, value_name = "FILE")]
    manifest: Option<PathBuf>,

    #[command(flatten)]
    repos: RepoArgs,

    /// Directory to import into (defaults to JDM_DEST, then ./lib)
    #[arg(long, value_name = "DIR")]
    dest: Option<PathBuf>,

    /// Destination layout: flat or maven
    #[arg(long, value_parser = parse_layout)]
    layout: Option<RepositoryLayout>,

    /// Download artifacts missing locally from the remote repository
    #[arg(long)]
    remote: bool,

    /// Remote repository base URL (implies --remote)
    #[arg(long, value_name = "URL")]
    remote_url: Option<String>,

    /// Expected SHA-256 of the artifact (single descriptor only)
    #[arg(long, value_name = "HEX")]
    sha256: Option<String>,

    /// Copy even if an identical file is already present
    #[arg(long)]
    force: bool,
}

impl ImportArgs {
    #[instrument(skip(self, config), fields(targets = ?self.coordinates))]
    pub fn run(&self, config: &Config) -> Result<()> {
        if self.sha256.is_some() && self.coordinates.len() != 1 {
            return Err(JdmError::Config(
                "--sha256 requires exactly one descriptor".to_string(),
            ));
        }

        let mut config = config.clone();
        let mut requests = Vec::new();

        if let Some(path) = &self.manifest {
            let manifest = Manifest::load(path)?;
            config.apply_manifest(&manifest.repository);
            requests.extend(manifest.requests()?);
        }

        for raw in &self.coordinates {
            let descriptor: Descriptor = raw.parse()?;
            let request = match &self.sha256 {
                Some(sha) => ImportRequest::pinned(descriptor, sha)?,
                None => ImportRequest::new(descriptor),
            };
            requests.push(request);
        }

        if let Some(dest) = &self.dest {
            config.dest_dir = dest.clone();
        }
        if let Some(layout) = self.layout {
            config.dest_layout = layout;
        }
        if let Some(url) = &self.remote_url {
            config.remote_url = jdm_common::config::normalize_remote_url(url);
        }

        let mut resolver = self.repos.resolver(&config);
        if self.remote || self.remote_url.is_some() {
            resolver = resolver.with_remote(RemoteRepository::new(&config.remote_url)?);
        }
        let importer = Importer::new(config.dest_dir(), config.dest_layout).with_force(self.force);
        debug!(
            "Importing {} dependencies into {} ({})",
            requests.len(),
            importer.dest().display(),
            importer.layout()
        );

        if requests.is_empty() {
            println!("{}", "Nothing to import".yellow());
            return Ok(());
        }

        let imported = importer.resolve_and_import(&resolver, &requests, |imported| {
            let status = match imported.outcome {
                ImportOutcome::Copied | ImportOutcome::Replaced => imported.outcome.to_string().green(),
                ImportOutcome::AlreadyPresent => imported.outcome.to_string().dimmed(),
            };
            println!(
                "{}{} {} -> {}",
                "==> ".bold().blue(),
                status,
                imported.descriptor.to_string().bold(),
                imported.path.display()
            );
        })?;
        let copied = imported
            .iter()
            .filter(|i| i.outcome != ImportOutcome::AlreadyPresent)
            .count();

        println!(
            "{}",
            format!(
                "{} of {} dependencies copied into {}",
                copied,
                requests.len(),
                importer.dest().display()
            )
            .bold()
        );
        Ok(())
    }
}
