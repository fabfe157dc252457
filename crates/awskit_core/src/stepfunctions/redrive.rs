//! Sequential redrive of listed executions with optional batch pacing.

use std::time::Duration;

use crate::stepfunctions::arn::execution_id;
use crate::stepfunctions::executions::{Execution, ExecutionEngine};

/// Pacing policy: sleep `sleep_secs` before each batch of `batch_size`
/// executions after the first. A batch size of zero disables pacing.
#[derive(Debug, Clone, Copy)]
pub struct RedrivePolicy {
    pub sleep_secs: u64,
    pub batch_size: usize,
}

/// What a redrive run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RedriveSummary {
    pub redriven: usize,
    pub failed: usize,
    pub pauses: usize,
}

/// Redrives `executions` in order, echoing each one by its short id (or
/// `N/A` when the ARN does not parse). A failed redrive is echoed and
/// skipped; the loop always runs to the end.
///
/// Redrives are sequential on purpose: pacing only means anything when
/// nothing runs ahead of the sleep.
pub async fn redrive_executions(
    engine: &impl ExecutionEngine,
    executions: &[Execution],
    policy: &RedrivePolicy,
) -> RedriveSummary {
    let mut summary = RedriveSummary::default();
    for (index, execution) in executions.iter().enumerate() {
        if policy.batch_size > 0 && index > 0 && index % policy.batch_size == 0 {
            println!("Sleeping for {} seconds...", policy.sleep_secs);
            summary.pauses += 1;
            tokio::time::sleep(Duration::from_secs(policy.sleep_secs)).await;
        }
        let id = execution_id(&execution.arn).unwrap_or_else(|| "N/A".to_string());
        println!("Redriving execution: {id}");
        match engine.redrive(&execution.arn).await {
            Ok(()) => summary.redriven += 1,
            Err(err) => {
                println!("Error redriving execution {id}: {err}");
                summary.failed += 1;
            }
        }
    }
    summary
}
