//! Scheduler Config

use clap::Args;
use jiff::civil::Time;

/// Daily subscription expiry sweep settings.
#[derive(Debug, Args)]
pub struct SchedulerConfig {
    /// Run the expiry sweep in this process
    #[arg(long, env = "EXPIRY_SWEEP_ENABLED", default_value_t = true)]
    pub expiry_sweep_enabled: bool,

    /// UTC wall-clock time the sweep runs at
    #[arg(long, env = "EXPIRY_SWEEP_AT", default_value = "00:00:00")]
    pub expiry_sweep_at: Time,
}
