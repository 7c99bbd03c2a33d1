//! ---
//! osr_section: "06-command-line"
//! osr_subsection: "binary"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Command line front end for regression result analysis."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};
use osr_common::AppConfig;
use osr_compat::CompatibilityMatrix;

use crate::context::load_compat_matrix;

#[derive(Debug, Subcommand)]
pub enum CompatCommand {
    /// Print the compatibility matrix.
    Show(ShowArgs),
    /// Download the matrix again and rewrite the cache.
    Refresh,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Print JSON instead of a table.
    #[arg(long)]
    json: bool,
}

pub fn run(command: CompatCommand, config: &AppConfig) -> Result<()> {
    match command {
        CompatCommand::Show(args) => {
            let matrix = load_compat_matrix(&config.compat)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&matrix)?);
            } else {
                print!("{}", render_table(&matrix));
            }
        }
        CompatCommand::Refresh => {
            if config.compat.offline {
                return Err(anyhow!("cannot refresh the compatibility matrix while offline"));
            }
            let matrix = load_compat_matrix(&config.compat)?;
            match &config.compat.cache_path {
                Some(path) => println!("{} versions cached in {}", matrix.len(), path.display()),
                None => println!("{} versions fetched (no cache path configured)", matrix.len()),
            }
        }
    }
    Ok(())
}

fn render_table(matrix: &CompatibilityMatrix) -> String {
    let mut out = format!("{:<12} {:<10} {:<12} {}\n", "OpenStudio", "E+", "Released", "Docker");
    for row in matrix.rows() {
        out.push_str(&format!(
            "{:<12} {:<10} {:<12} {}\n",
            row.openstudio,
            row.energyplus,
            row.released.map(|d| d.to_string()).unwrap_or_default(),
            if row.has_docker { "yes" } else { "" }
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use osr_compat::CompatibilityRow;

    #[test]
    fn table_lists_every_row() {
        let mut row = CompatibilityRow::new("3.7.0", "23.2.0");
        row.has_docker = true;
        let table = render_table(&CompatibilityMatrix::new(vec![
            row,
            CompatibilityRow::new("3.6.1", "23.1.0"),
        ]));
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("3.7.0"));
        assert!(lines[1].ends_with("yes"));
    }
}
