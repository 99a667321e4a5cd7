//! Command-line interface for checking `login` directive blocks.

use crate::error::Error;
use clap::{Parser, Subcommand};
use loginsrv_axum::{Chain, construct};
use loginsrv_directive::{
    DIRECTIVE, FieldRegistry, LoginConfig, ProcessEnv, SecretProvider, parse, setup,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Check loginsrv `login` directive blocks.
#[derive(Parser, Debug)]
#[command(name = "loginsrv-check", version, about)]
pub struct App {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the directives accepted inside a `login` block.
    Fields {
        /// Also list the directives reserved for the host server.
        #[arg(long)]
        all: bool,
    },
    /// Run setup on a configuration file and print the bound configuration.
    Check {
        /// Configuration file containing `login` blocks.
        file: PathBuf,
    },
}

/// Bound configuration of one `login` block.
#[derive(Serialize, Debug)]
pub struct Mount {
    pub path: String,
    pub config: LoginConfig,
}

/// An unknown sub-directive that setup skipped.
#[derive(Serialize, Debug)]
pub struct Skipped {
    pub name: String,
    pub args: Vec<String>,
    pub position: String,
}

/// Outcome of checking a configuration file.
#[derive(Serialize, Debug, Default)]
pub struct Report {
    pub mounts: Vec<Mount>,
    pub skipped: Vec<Skipped>,
}

impl App {
    /// Parse CLI arguments and execute the corresponding command.
    pub fn run() -> Result<(), Error> {
        let app = App::parse();

        match app.command {
            Command::Fields { all } => {
                let registry = if all {
                    FieldRegistry::all()
                } else {
                    FieldRegistry::for_directive()
                };
                for field in registry.fields() {
                    println!("{:<26} {:<9} {}", field.name(), field.kind(), field.usage());
                }
            }
            Command::Check { file } => {
                let source = std::fs::read_to_string(&file)?;
                let report = check(&file.display().to_string(), &source, &ProcessEnv::default())?;
                for directive in &report.skipped {
                    warn!(
                        directive = %directive.name,
                        position = %directive.position,
                        "skipped unknown directive"
                    );
                }
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }

        Ok(())
    }
}

/// Run setup over `source` and collect what each `login` block mounts,
/// along with the sub-directives it skipped.
pub fn check<P>(file: &str, source: &str, secrets: &P) -> Result<Report, Error>
where
    P: SecretProvider + ?Sized,
{
    let blocks = parse(file, source)?;
    debug!(file, blocks = blocks.len(), "parsed configuration");
    if !blocks.iter().any(|b| b.is(DIRECTIVE)) {
        return Err(Error::NoDirective(DIRECTIVE));
    }

    let mut chain = Chain::default();
    let skipped = setup(blocks, secrets, &construct, &mut chain)?;
    debug!(mounts = chain.len(), skipped = skipped.len(), "setup finished");

    Ok(Report {
        mounts: chain
            .mounts()
            .map(|(path, handler)| Mount {
                path: path.to_owned(),
                config: handler.config().clone(),
            })
            .collect(),
        skipped: skipped
            .into_iter()
            .map(|d| Skipped {
                position: d.position.to_string(),
                name: d.name,
                args: d.args,
            })
            .collect(),
    })
}
