use clap::{Args, Subcommand};

mod list;
mod set;

#[derive(Debug, Args)]
pub(crate) struct PlanCommand {
    #[command(subcommand)]
    command: PlanSubcommand,
}

#[derive(Debug, Subcommand)]
enum PlanSubcommand {
    Set(set::SetPlanArgs),
    List(list::ListPlansArgs),
}

pub(crate) async fn run(command: PlanCommand) -> Result<(), String> {
    match command.command {
        PlanSubcommand::Set(args) => set::run(args).await,
        PlanSubcommand::List(args) => list::run(args).await,
    }
}
