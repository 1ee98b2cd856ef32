use clap::{Args, Subcommand};

mod sweep;

#[derive(Debug, Args)]
pub(crate) struct SchoolCommand {
    #[command(subcommand)]
    command: SchoolSubcommand,
}

#[derive(Debug, Subcommand)]
enum SchoolSubcommand {
    /// Mark schools whose subscription has lapsed as unpaid
    Sweep(sweep::SweepArgs),
}

pub(crate) async fn run(command: SchoolCommand) -> Result<(), String> {
    match command.command {
        SchoolSubcommand::Sweep(args) => sweep::run(args).await,
    }
}
