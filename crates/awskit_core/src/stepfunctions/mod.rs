pub mod arn;
pub mod executions;
pub mod redrive;

pub use arn::{execution_id, validate_state_machine_arn};
pub use executions::{
    list_executions, parse_datetime, DateWindow, Execution, ExecutionEngine, ExecutionPage,
    ExecutionStatus, SfnExecutionEngine, MAX_WINDOW_DAYS,
};
pub use redrive::{redrive_executions, RedrivePolicy, RedriveSummary};
