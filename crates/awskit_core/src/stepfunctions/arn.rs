//! ARN validation for state machines and executions.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::Error;

static STATE_MACHINE_ARN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^arn:aws:states:(?P<region>[a-z0-9-]+):(?P<account_id>[0-9]+):stateMachine:(?P<name>[a-zA-Z0-9-_]+)$",
    )
    .expect("state machine arn regex is valid")
});

static EXECUTION_ARN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^arn:aws:states:(?P<region>[a-z0-9-]+):(?P<account_id>[0-9]+):execution:(?P<name>[a-zA-Z0-9-_]+):(?P<id>[a-f0-9-]+)$",
    )
    .expect("execution arn regex is valid")
});

/// Ensures `arn` denotes a state machine. Execution ARNs (and anything
/// else) are rejected with the offending string in the message.
pub fn validate_state_machine_arn(arn: &str) -> Result<(), Error> {
    if STATE_MACHINE_ARN.is_match(arn) {
        Ok(())
    } else {
        Err(Error::InvalidArn(arn.to_string()))
    }
}

/// Extracts the short execution id from an execution ARN, for display.
/// Returns `None` when the ARN does not match; callers show a placeholder.
pub fn execution_id(arn: &str) -> Option<String> {
    EXECUTION_ARN
        .captures(arn)
        .map(|captures| captures["id"].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MACHINE: &str = "arn:aws:states:us-east-1:123456789012:stateMachine:test-state-machine";
    const EXECUTION: &str = "arn:aws:states:us-east-1:123456789012:execution:test-state-machine:4e911a4e-71be-4de6-9f41-43a19001e3a8";

    #[test]
    fn accepts_a_state_machine_arn() {
        assert!(validate_state_machine_arn(MACHINE).is_ok());
    }

    #[test]
    fn rejects_an_execution_arn_as_a_machine_arn() {
        let err = validate_state_machine_arn(EXECUTION).expect_err("execution arn");
        assert_eq!(err.to_string(), format!("Invalid ARN: {EXECUTION}"));
    }

    #[test]
    fn rejects_malformed_arns() {
        for arn in [
            "",
            "arn:aws:states:us-east-1:123456789012:stateMachine:",
            "arn:aws:states:us-east-1:not-an-account:stateMachine:machine",
            "arn:aws:lambda:us-east-1:123456789012:function:machine",
            "arn:aws:states:us-east-1:123456789012:stateMachine:bad name",
        ] {
            assert!(validate_state_machine_arn(arn).is_err(), "arn: {arn}");
        }
    }

    #[test]
    fn extracts_the_execution_id() {
        assert_eq!(
            execution_id(EXECUTION).as_deref(),
            Some("4e911a4e-71be-4de6-9f41-43a19001e3a8")
        );
    }

    #[test]
    fn non_uuid_execution_names_fall_back_to_none() {
        // The id segment only admits hex and dashes.
        let arn = "arn:aws:states:us-east-1:123456789012:execution:machine:deploy-run";
        assert_eq!(execution_id(arn), None);
        assert_eq!(execution_id(MACHINE), None);
    }
}
