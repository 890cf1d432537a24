// jdm/src/cli/resolve.rs
use clap::Args;
use colored::Colorize;
use jdm_common::error::Result;
use jdm_common::{Config, Descriptor};

use crate::cli::RepoArgs;

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Dependency as group:artifact:version
    #[arg(value_name = "DESCRIPTOR")]
    coordinate: String,

    #[command(flatten)]
    repos: RepoArgs,
}

impl ResolveArgs {
    pub fn run(&self, config: &Config) -> Result<()> {
        let descriptor: Descriptor = self.coordinate.parse()?;
        let resolved = self.repos.resolver(config).resolve(&descriptor)?;

        println!("{}{}", "==> ".bold().blue(), resolved.descriptor.to_string().bold());
        println!("  {:<9}{}", "path:", resolved.path.display());
        println!("  {:<9}{}", "sha256:", resolved.checksum);
        match &resolved.expected_sha256 {
            Some(expected) => println!("  {:<9}{}", "expected:", expected),
            None => println!("  {:<9}{}", "expected:", "none".dimmed()),
        }

        resolved.verify()
    }
}
