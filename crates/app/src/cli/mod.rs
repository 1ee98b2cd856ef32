use clap::{Parser, Subcommand};

mod db;
mod plan;
mod school;

#[derive(Debug, Parser)]
#[command(name = "scholarlink-app", about = "ScholarLink operator CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    Plan(plan::PlanCommand),
    School(school::SchoolCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Db(command) => db::run(command).await,
            Commands::Plan(command) => plan::run(command).await,
            Commands::School(command) => school::run(command).await,
        }
    }
}
