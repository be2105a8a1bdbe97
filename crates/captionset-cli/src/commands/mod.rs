use crate::commands::{cat::CatArgs, inspect::InspectArgs};

pub mod cat;
pub mod inspect;

/// Subcommands for capset.
#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Convert caption tokens to vocab indices, or back.
    Cat(CatArgs),

    /// Load a dataset and print corpus statistics.
    Inspect(InspectArgs),
}

impl Commands {
    /// Run the subcommand.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            Commands::Cat(cmd) => cmd.run(),
            Commands::Inspect(cmd) => cmd.run(),
        }
    }
}
