use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use jdm_common::error::{JdmError, Result};
use jdm_common::Config;
use jdm_core::{ImportRecord, VerifyStatus};
use prettytable::{format, Cell, Row, Table};

#[derive(Args, Debug)]
pub struct Verify {
    /// Destination directory to verify (defaults to JDM_DEST, then ./lib)
    #[arg(long, value_name = "DIR")]
    pub dest: Option<PathBuf>,
}

impl Verify {
    pub fn run(&self, config: &Config) -> Result<()> {
        let dest = self.dest.clone().unwrap_or_else(|| config.dest_dir().to_path_buf());
        let reports = ImportRecord::load(&dest)?.verify(&dest)?;

        if reports.is_empty() {
            println!("{}", format!("Nothing recorded in {}", dest.display()).yellow());
            return Ok(());
        }

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
        table.add_row(Row::new(vec![
            Cell::new("Dependency").style_spec("b"),
            Cell::new("Status").style_spec("b"),
            Cell::new("Path").style_spec("b"),
        ]));
        let mut failed = 0usize;
        for report in &reports {
            let status = match &report.status {
                VerifyStatus::Ok => Cell::new("ok").style_spec("Fg"),
                VerifyStatus::Missing => {
                    failed += 1;
                    Cell::new("missing").style_spec("Fr")
                }
                VerifyStatus::Modified { .. } => {
                    failed += 1;
                    Cell::new("modified").style_spec("Fr")
                }
            };
            table.add_row(Row::new(vec![
                Cell::new(&report.descriptor.to_string()).style_spec("Fb"),
                status,
                Cell::new(&report.path.display().to_string()),
            ]));
        }
        table.printstd();

        if failed > 0 {
            return Err(JdmError::Verification(format!(
                "{failed} of {} artifacts in {} failed verification",
                reports.len(),
                dest.display()
            )));
        }
        println!("{}", format!("{} artifacts verified", reports.len()).bold());
        Ok(())
    }
}
