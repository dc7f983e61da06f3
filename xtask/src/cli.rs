use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(about = "Tavern utilities - trunk must be installed")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(about = "Build the frontend and run the server")]
    Launch {
        /// Extra arguments passed to tavern-launcher
        #[arg(last = true)]
        args: Vec<String>,
    },
    #[command(about = "Build a release bundle into ./Tavern")]
    Dist { target_triple: Option<String> },
}
