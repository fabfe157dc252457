//! Execution listing within a bounded date window.

use async_trait::async_trait;
use aws_sdk_sfn::error::DisplayErrorContext;
use chrono::format::{Parsed, StrftimeItems};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::error::Error;
use crate::stepfunctions::arn::validate_state_machine_arn;

/// Redrive eligibility retention ceiling, in days.
pub const MAX_WINDOW_DAYS: i64 = 14;

/// Accepted datetime layouts, tried in order. Seconds and fractions are
/// optional (`%.f` consumes nothing when absent); `T` and space separators
/// are interchangeable.
const DATETIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%d %H:%M:%S%.fZ",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Hour-only layouts, which need `Parsed` with the minute pinned to zero:
/// chrono's datetime parser treats a missing minute as incomplete.
const HOUR_LAYOUTS: &[&str] = &["%Y-%m-%dT%H", "%Y-%m-%d %H"];

/// Parses a date or datetime string as UTC.
///
/// Accepts the layouts above plus hour-only `%Y-%m-%dT%H` and `%Y-%m-%d %H`,
/// `%Y-%m-%d`, `%Y-%m`, and bare `%Y`; omitted fields default to their
/// minimum. Input is matched as-is; padded strings fail.
pub fn parse_datetime(input: &str) -> Result<DateTime<Utc>, Error> {
    for layout in DATETIME_LAYOUTS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(input, layout) {
            return Ok(datetime.and_utc());
        }
    }
    if let Some(datetime) = parse_hour_precision(input) {
        return Ok(datetime.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    parse_partial_date(input).ok_or_else(|| Error::UnparsableDate(input.to_string()))
}

fn parse_hour_precision(input: &str) -> Option<NaiveDateTime> {
    for layout in HOUR_LAYOUTS {
        let mut parsed = Parsed::new();
        if chrono::format::parse(&mut parsed, input, StrftimeItems::new(layout)).is_err() {
            continue;
        }
        if parsed.set_minute(0).is_err() {
            continue;
        }
        if let (Ok(date), Ok(time)) = (parsed.to_naive_date(), parsed.to_naive_time()) {
            return Some(date.and_time(time));
        }
    }
    None
}

/// `%Y-%m` and bare `%Y`, which chrono cannot parse into a date on its own.
fn parse_partial_date(input: &str) -> Option<DateTime<Utc>> {
    let mut parts = input.splitn(2, '-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u32 = match parts.next() {
        Some(month) => month.parse().ok()?,
        None => 1,
    };
    let date = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(date.and_time(NaiveTime::MIN).and_utc())
}

/// Inclusive start/stop bounds for execution listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub stop: DateTime<Utc>,
}

impl DateWindow {
    /// Resolves explicit bounds against the eligibility window ending now.
    ///
    /// Defaults: start = now - `MAX_WINDOW_DAYS`, stop = now. Invariant:
    /// `now - max_days <= start <= stop <= now`.
    pub fn resolve(
        start: Option<DateTime<Utc>>,
        stop: Option<DateTime<Utc>>,
    ) -> Result<Self, Error> {
        Self::resolve_at(Utc::now(), start, stop)
    }

    /// `resolve` against an explicit `now`, so the invariant is testable.
    pub fn resolve_at(
        now: DateTime<Utc>,
        start: Option<DateTime<Utc>>,
        stop: Option<DateTime<Utc>>,
    ) -> Result<Self, Error> {
        let oldest = now - Duration::days(MAX_WINDOW_DAYS);
        let start = start.unwrap_or(oldest);
        let stop = stop.unwrap_or(now);
        log::debug!("Execution window: {start} to {stop}");
        if oldest <= start && start <= stop && stop <= now {
            Ok(Self { start, stop })
        } else {
            Err(Error::DateWindow {
                max_days: MAX_WINDOW_DAYS,
            })
        }
    }
}

/// Execution status values used for listing filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    Running,
    Succeeded,
    Failed,
    TimedOut,
    Aborted,
    PendingRedrive,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::TimedOut => "TIMED_OUT",
            Self::Aborted => "ABORTED",
            Self::PendingRedrive => "PENDING_REDRIVE",
        }
    }

    fn to_api(self) -> aws_sdk_sfn::types::ExecutionStatus {
        use aws_sdk_sfn::types::ExecutionStatus as Api;
        match self {
            Self::Running => Api::Running,
            Self::Succeeded => Api::Succeeded,
            Self::Failed => Api::Failed,
            Self::TimedOut => Api::TimedOut,
            Self::Aborted => Api::Aborted,
            Self::PendingRedrive => Api::PendingRedrive,
        }
    }

    fn from_api(status: &aws_sdk_sfn::types::ExecutionStatus) -> Option<Self> {
        use aws_sdk_sfn::types::ExecutionStatus as Api;
        match status {
            Api::Running => Some(Self::Running),
            Api::Succeeded => Some(Self::Succeeded),
            Api::Failed => Some(Self::Failed),
            Api::TimedOut => Some(Self::TimedOut),
            Api::Aborted => Some(Self::Aborted),
            Api::PendingRedrive => Some(Self::PendingRedrive),
            _ => None,
        }
    }
}

/// One execution of a state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub arn: String,
    pub started_at: DateTime<Utc>,
    pub status: ExecutionStatus,
}

/// One page of an execution listing, most recent first.
#[derive(Debug, Clone, Default)]
pub struct ExecutionPage {
    pub executions: Vec<Execution>,
    pub next_token: Option<String>,
}

/// Raw remote execution-engine surface: one page of a status-filtered
/// listing, and a single redrive call.
#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    async fn execution_page(
        &self,
        state_machine_arn: &str,
        status: ExecutionStatus,
        next_token: Option<String>,
    ) -> Result<ExecutionPage, Error>;

    async fn redrive(&self, execution_arn: &str) -> Result<(), Error>;
}

/// `ExecutionEngine` backed by the real Step Functions API.
pub struct SfnExecutionEngine {
    client: aws_sdk_sfn::Client,
}

impl SfnExecutionEngine {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_sfn::Client::new(config),
        }
    }
}

#[async_trait]
impl ExecutionEngine for SfnExecutionEngine {
    async fn execution_page(
        &self,
        state_machine_arn: &str,
        status: ExecutionStatus,
        next_token: Option<String>,
    ) -> Result<ExecutionPage, Error> {
        let output = self
            .client
            .list_executions()
            .state_machine_arn(state_machine_arn)
            .status_filter(status.to_api())
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| Error::api("ListExecutions", DisplayErrorContext(&e)))?;
        let mut executions = Vec::new();
        for item in output.executions() {
            let start = item.start_date();
            let Some(started_at) = DateTime::from_timestamp(start.secs(), start.subsec_nanos())
            else {
                log::warn!(
                    "Skipping execution with out-of-range start date: {}",
                    item.execution_arn()
                );
                continue;
            };
            executions.push(Execution {
                arn: item.execution_arn().to_string(),
                started_at,
                // The SDK enum is non-exhaustive; the listing is always
                // status-filtered, so unknowns inherit the filter value.
                status: ExecutionStatus::from_api(item.status()).unwrap_or(status),
            });
        }
        Ok(ExecutionPage {
            executions,
            next_token: output.next_token().map(str::to_string),
        })
    }

    async fn redrive(&self, execution_arn: &str) -> Result<(), Error> {
        self.client
            .redrive_execution()
            .execution_arn(execution_arn)
            .send()
            .await
            .map_err(|e| Error::api("RedriveExecution", DisplayErrorContext(&e)))?;
        Ok(())
    }
}

/// Lists executions of `state_machine_arn` with the given status that
/// started inside `window`, most recent first.
///
/// Relies on the API returning executions in descending start-time order:
/// pagination stops at the first execution older than the window start.
/// Executions newer than the stop bound are skipped without ending the
/// walk.
pub async fn list_executions(
    engine: &impl ExecutionEngine,
    state_machine_arn: &str,
    status: ExecutionStatus,
    window: &DateWindow,
) -> Result<Vec<Execution>, Error> {
    validate_state_machine_arn(state_machine_arn)?;
    let mut executions = Vec::new();
    let mut next_token = None;
    loop {
        let page = engine
            .execution_page(state_machine_arn, status, next_token)
            .await?;
        for execution in page.executions {
            if execution.started_at > window.stop {
                log::debug!("Skipping execution newer than stop date: {}", execution.arn);
                continue;
            }
            if execution.started_at < window.start {
                // Descending order: everything after this is older still.
                return Ok(executions);
            }
            executions.push(execution);
        }
        match page.next_token {
            Some(token) => next_token = Some(token),
            None => return Ok(executions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{failed_execution, FakeExecutionEngine, TEST_MACHINE_ARN};

    fn utc(s: &str) -> DateTime<Utc> {
        parse_datetime(s).expect("test datetime")
    }

    #[test]
    fn parses_full_datetimes() {
        for input in [
            "2023-01-15T10:30:00.123Z",
            "2023-01-15 10:30:00.123Z",
            "2023-01-15T10:30:00",
            "2023-01-15 10:30:00",
            "2023-01-15T10:30",
            "2023-01-15 10:30",
        ] {
            let parsed = parse_datetime(input).expect("parse");
            assert_eq!(
                parsed.date_naive(),
                NaiveDate::from_ymd_opt(2023, 1, 15).expect("date"),
                "input: {input}"
            );
        }
    }

    #[test]
    fn parses_partial_dates_with_defaults() {
        assert_eq!(utc("2023-01-15"), utc("2023-01-15 00:00:00"));
        assert_eq!(utc("2023-05"), utc("2023-05-01 00:00:00"));
        assert_eq!(utc("2023"), utc("2023-01-01 00:00:00"));
    }

    #[test]
    fn parses_hour_only_datetimes() {
        assert_eq!(utc("2023-01-15T10"), utc("2023-01-15 10:00:00"));
        assert_eq!(utc("2023-01-15 10"), utc("2023-01-15 10:00:00"));
    }

    #[test]
    fn padded_input_is_rejected() {
        let err = parse_datetime(" 2023-01-15").expect_err("leading padding");
        assert!(matches!(err, Error::UnparsableDate(input) if input == " 2023-01-15"));
        assert!(parse_datetime("2023-01-15 ").is_err(), "trailing padding");
        assert!(parse_datetime(" 2023").is_err());
    }

    #[test]
    fn unparsable_dates_report_the_input() {
        let err = parse_datetime("last tuesday").expect_err("gibberish");
        assert_eq!(err.to_string(), "Could not parse date time: last tuesday");
        assert!(parse_datetime("2023-13").is_err(), "month out of range");
        assert!(parse_datetime("").is_err());
    }

    #[test]
    fn window_defaults_to_the_last_fourteen_days() {
        let now = utc("2023-06-15 12:00:00");
        let window = DateWindow::resolve_at(now, None, None).expect("resolve");

        assert_eq!(window.stop, now);
        assert_eq!(window.start, now - Duration::days(14));
    }

    #[test]
    fn window_accepts_explicit_bounds_inside_the_limit() {
        let now = utc("2023-06-15 12:00:00");
        let window =
            DateWindow::resolve_at(now, Some(utc("2023-06-10")), Some(utc("2023-06-12")))
                .expect("resolve");

        assert_eq!(window.start, utc("2023-06-10"));
        assert_eq!(window.stop, utc("2023-06-12"));
    }

    #[test]
    fn window_rejects_start_older_than_the_limit() {
        let now = utc("2023-06-15 12:00:00");
        let err = DateWindow::resolve_at(now, Some(utc("2023-01-01")), None)
            .expect_err("start too old");
        assert!(err.to_string().contains("within the last 14 days"));
    }

    #[test]
    fn window_rejects_start_after_stop() {
        let now = utc("2023-06-15 12:00:00");
        let err =
            DateWindow::resolve_at(now, Some(utc("2023-06-12")), Some(utc("2023-06-10")))
                .expect_err("start after stop");
        assert!(matches!(err, Error::DateWindow { max_days: 14 }));
    }

    #[test]
    fn window_rejects_stop_in_the_future() {
        let now = utc("2023-06-15 12:00:00");
        let err = DateWindow::resolve_at(now, None, Some(utc("2023-06-16")))
            .expect_err("stop in the future");
        assert!(matches!(err, Error::DateWindow { .. }));
    }

    #[tokio::test]
    async fn lister_rejects_bad_arns_before_any_request() {
        let engine = FakeExecutionEngine::new(vec![vec![]]);
        let window = DateWindow::resolve_at(utc("2023-06-15"), None, None).expect("window");

        let err = list_executions(&engine, "not-an-arn", ExecutionStatus::Failed, &window)
            .await
            .expect_err("bad arn");

        assert!(matches!(err, Error::InvalidArn(_)));
        assert_eq!(engine.pages_served(), 0);
    }

    #[tokio::test]
    async fn lister_stops_at_the_first_execution_older_than_start() {
        let window = DateWindow {
            start: utc("2023-06-10"),
            stop: utc("2023-06-14"),
        };
        let engine = FakeExecutionEngine::new(vec![
            vec![
                failed_execution("aa11", utc("2023-06-13")),
                failed_execution("bb22", utc("2023-06-09")),
            ],
            // Never requested: the first page already crossed the start.
            vec![failed_execution("cc33", utc("2023-06-08"))],
        ]);

        let executions = list_executions(
            &engine,
            TEST_MACHINE_ARN,
            ExecutionStatus::Failed,
            &window,
        )
        .await
        .expect("list");

        assert_eq!(executions.len(), 1);
        assert!(executions[0].arn.ends_with("aa11"));
        assert_eq!(engine.pages_served(), 1);
    }

    #[tokio::test]
    async fn lister_skips_executions_newer_than_stop_and_keeps_walking() {
        let window = DateWindow {
            start: utc("2023-06-10"),
            stop: utc("2023-06-12"),
        };
        let engine = FakeExecutionEngine::new(vec![
            vec![
                failed_execution("aa11", utc("2023-06-14")),
                failed_execution("bb22", utc("2023-06-11")),
            ],
            vec![failed_execution("cc33", utc("2023-06-10"))],
        ]);

        let executions = list_executions(
            &engine,
            TEST_MACHINE_ARN,
            ExecutionStatus::Failed,
            &window,
        )
        .await
        .expect("list");

        let ids: Vec<&str> = executions.iter().map(|e| e.arn.as_str()).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids[0].ends_with("bb22"));
        assert!(ids[1].ends_with("cc33"));
        assert_eq!(engine.pages_served(), 2);
    }

    #[tokio::test]
    async fn lister_returns_empty_when_no_executions_match() {
        let window = DateWindow {
            start: utc("2023-06-10"),
            stop: utc("2023-06-12"),
        };
        let engine = FakeExecutionEngine::new(vec![vec![]]);

        let executions = list_executions(
            &engine,
            TEST_MACHINE_ARN,
            ExecutionStatus::Failed,
            &window,
        )
        .await
        .expect("list");

        assert!(executions.is_empty());
    }
}
