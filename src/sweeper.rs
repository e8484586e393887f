use std::sync::Arc;
use std::time::Duration;

use time::{Date, OffsetDateTime, UtcOffset};
use tracing::{info, warn};

use crate::engine::{Engine, EngineError};
use crate::model::{BucketCounts, ReturnBucket};
use crate::observability::{EQUIPMENT_IN_FIELD, SWEEPS_TOTAL};

/// Today's calendar date in the reference offset.
pub fn today(offset: UtcOffset) -> Date {
    OffsetDateTime::now_utc().to_offset(offset).date()
}

/// One availability pass: refresh the in-field gauges and flag overdue returns.
pub async fn sweep_once(engine: &Engine, as_of: Date) -> Result<BucketCounts, EngineError> {
    let report = engine.field_report(as_of).await?;
    for bucket in ReturnBucket::ALL {
        metrics::gauge!(EQUIPMENT_IN_FIELD, "bucket" => bucket.as_str())
            .set(report.counts.get(bucket) as f64);
    }
    for row in report
        .rows
        .iter()
        .filter(|r| r.bucket == ReturnBucket::Expired)
    {
        warn!(
            "overdue return: order {} ({}) product {} \"{}\" was due {} ({} days ago)",
            row.order_id,
            row.order_project,
            row.product_id,
            row.product_name,
            row.end_date,
            -row.days_remaining
        );
    }
    Ok(report.counts)
}

/// Background task that periodically recomputes equipment in the field.
pub async fn run_sweeper(engine: Arc<Engine>, every: Duration, offset: UtcOffset) {
    let mut interval = tokio::time::interval(every);
    loop {
        interval.tick().await;
        let as_of = today(offset);
        match sweep_once(&engine, as_of).await {
            Ok(counts) => {
                metrics::counter!(SWEEPS_TOTAL, "status" => "ok").increment(1);
                info!(
                    "sweep {as_of}: {} lines out ({} expired, {} critical, {} warning, {} active)",
                    counts.total(),
                    counts.expired,
                    counts.critical,
                    counts.warning,
                    counts.active
                );
            }
            Err(e) => {
                // Next tick retries with a fresh snapshot
                metrics::counter!(SWEEPS_TOTAL, "status" => "error").increment(1);
                tracing::error!("sweep {as_of} failed: {e}");
            }
        }
    }
}
