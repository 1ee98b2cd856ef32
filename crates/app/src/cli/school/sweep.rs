use clap::Args;
use jiff::Timestamp;
use scholarlink_app::{
    database,
    domain::schools::{PgSchoolsRepository, SchoolsRepository},
};

#[derive(Debug, Args)]
pub(crate) struct SweepArgs {
    /// Treat this instant as "now" instead of the current time
    #[arg(long)]
    at: Option<Timestamp>,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: SweepArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let now = args.at.unwrap_or_else(Timestamp::now);

    let expired = PgSchoolsRepository::new(pool)
        .expire_subscriptions(now)
        .await
        .map_err(|error| format!("failed to expire subscriptions: {error}"))?;

    println!("schools_expired: {expired}");

    Ok(())
}
