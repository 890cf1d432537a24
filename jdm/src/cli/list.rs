use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use jdm_common::error::Result;
use jdm_common::Config;
use jdm_core::ImportRecord;
use prettytable::{format, Cell, Row, Table};

#[derive(Args, Debug)]
pub struct List {
    /// Destination directory to inspect (defaults to JDM_DEST, then ./lib)
    #[arg(long, value_name = "DIR")]
    pub dest: Option<PathBuf>,
}

impl List {
    pub fn run(&self, config: &Config) -> Result<()> {
        let dest = self.dest.clone().unwrap_or_else(|| config.dest_dir().to_path_buf());
        let record = ImportRecord::load(&dest)?;
        let untracked = record.untracked_jars(&dest);

        if record.is_empty() && untracked.is_empty() {
            println!("{}", format!("0 artifacts imported into {}", dest.display()).yellow());
            return Ok(());
        }

        if !record.is_empty() {
            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
            table.add_row(Row::new(vec![
                Cell::new("Dependency").style_spec("b"),
                Cell::new("Path").style_spec("b"),
                Cell::new("SHA-256").style_spec("b"),
                Cell::new("Imported").style_spec("b"),
            ]));
            for (descriptor, entry) in &record.artifacts {
                table.add_row(Row::new(vec![
                    Cell::new(&descriptor.to_string()).style_spec("Fb"),
                    Cell::new(&entry.path.display().to_string()),
                    Cell::new(entry.sha256.get(..12).unwrap_or(&entry.sha256)),
                    Cell::new(&entry.imported_at.format("%Y-%m-%d %H:%M").to_string()),
                ]));
            }
            table.printstd();
        }

        for path in &untracked {
            println!("{} {}", "untracked:".yellow(), path.display());
        }

        println!(
            "{}",
            format!(
                "{} artifacts imported into {}",
                record.artifacts.len(),
                dest.display()
            )
            .bold()
        );
        Ok(())
    }
}
