use clap::Args;
use scholarlink_app::{
    database,
    domain::subscriptions::{
        PgPlansRepository, PlansRepository,
        records::{NewPlan, PaymentType},
    },
};

#[derive(Debug, Args)]
pub(crate) struct SetPlanArgs {
    /// Payment type the price applies to
    #[arg(long, default_value = "subscription")]
    payment_type: PaymentType,

    /// Price in the currency's minor unit (kobo for NGN)
    #[arg(long)]
    amount: i64,

    /// ISO 4217 currency code
    #[arg(long, default_value = "NGN")]
    currency: String,

    /// Days of access a successful payment buys
    #[arg(long, default_value_t = 365)]
    period_days: i32,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: SetPlanArgs) -> Result<(), String> {
    let plan = NewPlan {
        payment_type: args.payment_type,
        amount: args.amount,
        currency: args.currency,
        period_days: args.period_days,
    }
    .validated()
    .map_err(|error| format!("invalid plan: {error}"))?;

    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let plan = PgPlansRepository::new(pool)
        .upsert_plan(plan)
        .await
        .map_err(|error| format!("failed to save plan: {error}"))?;

    println!("payment_type: {}", plan.payment_type);
    println!("amount: {} {}", plan.amount, plan.currency);
    println!("period_days: {}", plan.period_days);

    Ok(())
}
