use clap::Args;
use scholarlink_app::{
    database,
    domain::subscriptions::{PgPlansRepository, PlansRepository},
};

#[derive(Debug, Args)]
pub(crate) struct ListPlansArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: ListPlansArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let plans = PgPlansRepository::new(pool)
        .list_plans()
        .await
        .map_err(|error| format!("failed to list plans: {error}"))?;

    if plans.is_empty() {
        println!("no plans configured");
        return Ok(());
    }

    for plan in plans {
        println!("payment_type: {}", plan.payment_type);
        println!("amount: {} {}", plan.amount, plan.currency);
        println!("period_days: {}", plan.period_days);
        println!("updated_at: {}", plan.updated_at);
        println!();
    }

    Ok(())
}
