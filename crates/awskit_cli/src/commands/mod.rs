pub mod ssm;
pub mod stepfunctions;
