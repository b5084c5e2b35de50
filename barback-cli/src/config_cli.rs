//! Configuration commands

use anyhow::Result;
use clap::Subcommand;
use std::path::Path;

use barback_core::BarbackConfig;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[clap(long)]
        force: bool,
    },
}

impl ConfigCommand {
    pub fn execute(self, override_path: Option<&Path>) -> Result<()> {
        let path = match override_path {
            Some(path) => path.to_path_buf(),
            None => BarbackConfig::default_path()?,
        };

        match self {
            ConfigCommand::Show => {
                let config = BarbackConfig::load_from_path(&path)?;
                print!("{}", config.to_yaml()?);
            }
            ConfigCommand::Path => println!("{}", path.display()),
            ConfigCommand::Init { force } => init_config(&path, force)?,
        }

        Ok(())
    }
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    BarbackConfig::default().save_to_path(path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
