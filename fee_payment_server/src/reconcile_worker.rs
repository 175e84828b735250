use std::time::Duration;

use fee_payment_engine::ReconcileReport;
use log::*;
use tokio::task::JoinHandle;

use crate::server::ServerFulfillmentApi;

/// Starts the reconciliation worker, which finishes fulfillments whose receipt could not be rendered or emailed.
/// Do not await the returned JoinHandle, as it will run indefinitely.
///
/// The API must share its `ReferenceLocks` with the request handlers, so that a retry never races a live request for
/// the same reference.
pub fn start_reconcile_worker(api: ServerFulfillmentApi, interval: Duration, max_attempts: i64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        info!("🕰️ Reconciliation worker started. Checking for stalled fulfillments every {}s", interval.as_secs());
        loop {
            timer.tick().await;
            trace!("🕰️ Running reconciliation job");
            match api.resume_stalled(max_attempts).await {
                Ok(report) if report.is_empty() => trace!("🕰️ No stalled fulfillments"),
                Ok(report) => info!("🕰️ {}", summarize(&report)),
                Err(e) => error!("🕰️ Error running reconciliation job: {e}"),
            }
        }
    })
}

fn summarize(report: &ReconcileReport) -> String {
    let mut summary = format!("{} stalled fulfillment(s) completed", report.completed.len());
    if !report.completed.is_empty() {
        summary.push_str(&format!(" [{}]", report.completed.join(", ")));
    }
    if !report.failed.is_empty() {
        let failed = report.failed.iter().map(|(r, reason)| format!("{r}: {reason}")).collect::<Vec<_>>().join("; ");
        summary.push_str(&format!(", {} still failing [{failed}]", report.failed.len()));
    }
    summary
}
