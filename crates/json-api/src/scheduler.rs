//! Daily subscription expiry sweep.

use std::{sync::Arc, time::Duration};

use jiff::{Timestamp, civil::Time, tz::TimeZone};
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

use scholarlink_app::domain::subscriptions::SubscriptionsService;

use crate::observability::counters;

/// Retry delay when the next run time cannot be computed.
const FALLBACK_DELAY: Duration = Duration::from_secs(60 * 60);

/// First UTC instant strictly after `now` whose wall-clock time is `at`.
pub(crate) fn next_run_after(now: Timestamp, at: Time) -> Result<Timestamp, jiff::Error> {
    let today = now.to_zoned(TimeZone::UTC).date();
    let candidate = today.to_datetime(at).to_zoned(TimeZone::UTC)?.timestamp();

    if candidate > now {
        return Ok(candidate);
    }

    Ok(today
        .tomorrow()?
        .to_datetime(at)
        .to_zoned(TimeZone::UTC)?
        .timestamp())
}

/// Run the sweep once, returning how many schools lost their paid status.
#[instrument(name = "scheduler.expiry_sweep", skip(subscriptions))]
pub(crate) async fn sweep(subscriptions: &dyn SubscriptionsService, now: Timestamp) -> Option<u64> {
    match subscriptions.expire_subscriptions(now).await {
        Ok(expired) => {
            counters::schools_expired(expired);
            info!(expired, "expired school subscriptions");

            Some(expired)
        }
        Err(sweep_error) => {
            error!(error = %sweep_error, "subscription expiry sweep failed");

            None
        }
    }
}

/// Sleep until each daily run time, then sweep.
pub(crate) fn spawn(subscriptions: Arc<dyn SubscriptionsService>, at: Time) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let now = Timestamp::now();

            let delay = match next_run_after(now, at) {
                Ok(next) => {
                    info!(next_run = %next, "scheduled subscription expiry sweep");

                    Duration::try_from(now.duration_until(next)).unwrap_or(FALLBACK_DELAY)
                }
                Err(schedule_error) => {
                    error!(error = %schedule_error, "failed to compute next sweep time");

                    FALLBACK_DELAY
                }
            };

            tokio::time::sleep(delay).await;

            // Result is logged and counted inside.
            sweep(subscriptions.as_ref(), Timestamp::now()).await;
        }
    })
}
