//! Test helpers for common test setup and utilities.
//!
//! Provides in-memory implementations of the remote seams so flows can be
//! exercised without touching AWS, plus small fixture builders shared
//! across test files.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Error;
use crate::ssm::store::{NamePage, Parameter, ParameterKind, ParameterStore};
use crate::stepfunctions::executions::{
    Execution, ExecutionEngine, ExecutionPage, ExecutionStatus,
};

/// A valid state-machine ARN used across test files for consistency.
pub const TEST_MACHINE_ARN: &str =
    "arn:aws:states:us-east-1:123456789012:stateMachine:test-state-machine";

/// Builds a FAILED execution of the test state machine. The id should be
/// hex-and-dashes so the display-id extraction sees it.
pub fn failed_execution(id: &str, started_at: DateTime<Utc>) -> Execution {
    Execution {
        arn: format!(
            "arn:aws:states:us-east-1:123456789012:execution:test-state-machine:{id}"
        ),
        started_at,
        status: ExecutionStatus::Failed,
    }
}

/// `ParameterStore` over a sorted map, with scripted failures and small
/// pages so pagination paths get exercised.
///
/// Like the real store, `put` without overwrite fails on an existing name,
/// and names scripted via `fail_on` fail their get/put/delete calls.
pub struct InMemoryParameterStore {
    parameters: Mutex<BTreeMap<String, Parameter>>,
    fail_names: BTreeSet<String>,
    nameless_records: usize,
    page_size: usize,
    deleted: Mutex<Vec<String>>,
    pages_served: AtomicUsize,
}

impl InMemoryParameterStore {
    pub fn new() -> Self {
        Self {
            parameters: Mutex::new(BTreeMap::new()),
            fail_names: BTreeSet::new(),
            nameless_records: 0,
            page_size: 10,
            deleted: Mutex::new(Vec::new()),
            pages_served: AtomicUsize::new(0),
        }
    }

    pub fn with_parameters<I>(parameters: I) -> Self
    where
        I: IntoIterator<Item = Parameter>,
    {
        let store = Self::new();
        for parameter in parameters {
            store
                .parameters
                .lock()
                .expect("poisoned mutex")
                .insert(parameter.name.clone(), parameter);
        }
        store
    }

    /// Seeds one String parameter.
    pub fn insert(&self, name: &str, value: &str) {
        self.parameters.lock().expect("poisoned mutex").insert(
            name.to_string(),
            Parameter::new(name, value, ParameterKind::String),
        );
    }

    /// Scripts get/put/delete failures for `name`.
    pub fn fail_on(mut self, name: &str) -> Self {
        self.fail_names.insert(name.to_string());
        self
    }

    /// Shrinks listing pages to force multi-page walks.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Injects records with no name into the first listing page.
    pub fn with_nameless_records(mut self, count: usize) -> Self {
        self.nameless_records = count;
        self
    }

    pub fn parameter(&self, name: &str) -> Option<Parameter> {
        self.parameters
            .lock()
            .expect("poisoned mutex")
            .get(name)
            .cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.parameters
            .lock()
            .expect("poisoned mutex")
            .keys()
            .cloned()
            .collect()
    }

    /// Names deleted so far, in call order.
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().expect("poisoned mutex").clone()
    }

    pub fn pages_served(&self) -> usize {
        self.pages_served.load(Ordering::SeqCst)
    }

    fn check_scripted_failure(&self, operation: &'static str, name: &str) -> Result<(), Error> {
        if self.fail_names.contains(name) {
            Err(Error::api(operation, format!("scripted failure for '{name}'")))
        } else {
            Ok(())
        }
    }
}

impl Default for InMemoryParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ParameterStore for InMemoryParameterStore {
    async fn name_page(
        &self,
        begins_with: &str,
        next_token: Option<String>,
    ) -> Result<NamePage, Error> {
        self.pages_served.fetch_add(1, Ordering::SeqCst);
        let mut names: Vec<Option<String>> = (0..self.nameless_records).map(|_| None).collect();
        names.extend(
            self.parameters
                .lock()
                .expect("poisoned mutex")
                .keys()
                .filter(|name| name.starts_with(begins_with))
                .cloned()
                .map(Some),
        );
        let offset: usize = match next_token {
            Some(token) => token
                .parse()
                .map_err(|_| Error::api("DescribeParameters", "bad continuation token"))?,
            None => 0,
        };
        let total = names.len();
        let page: Vec<Option<String>> =
            names.into_iter().skip(offset).take(self.page_size).collect();
        let end = offset + page.len();
        let next_token = (end < total).then(|| end.to_string());
        Ok(NamePage {
            names: page,
            next_token,
        })
    }

    async fn get(&self, name: &str) -> Result<Parameter, Error> {
        self.check_scripted_failure("GetParameter", name)?;
        self.parameter(name)
            .ok_or_else(|| Error::api("GetParameter", format!("ParameterNotFound: '{name}'")))
    }

    async fn put(&self, parameter: &Parameter, overwrite: bool) -> Result<(), Error> {
        self.check_scripted_failure("PutParameter", &parameter.name)?;
        let mut parameters = self.parameters.lock().expect("poisoned mutex");
        if !overwrite && parameters.contains_key(&parameter.name) {
            return Err(Error::api(
                "PutParameter",
                format!("ParameterAlreadyExists: '{}'", parameter.name),
            ));
        }
        parameters.insert(parameter.name.clone(), parameter.clone());
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), Error> {
        self.check_scripted_failure("DeleteParameter", name)?;
        let removed = self
            .parameters
            .lock()
            .expect("poisoned mutex")
            .remove(name);
        if removed.is_none() {
            return Err(Error::api(
                "DeleteParameter",
                format!("ParameterNotFound: '{name}'"),
            ));
        }
        self.deleted
            .lock()
            .expect("poisoned mutex")
            .push(name.to_string());
        Ok(())
    }
}

/// `ExecutionEngine` serving scripted listing pages and capturing redrive
/// calls. Page tokens are page indexes; the walk token chain is wired
/// automatically.
pub struct FakeExecutionEngine {
    pages: Vec<Vec<Execution>>,
    fail_arns: BTreeSet<String>,
    redriven: Mutex<Vec<String>>,
    pages_served: AtomicUsize,
}

impl FakeExecutionEngine {
    pub fn new(pages: Vec<Vec<Execution>>) -> Self {
        Self {
            pages,
            fail_arns: BTreeSet::new(),
            redriven: Mutex::new(Vec::new()),
            pages_served: AtomicUsize::new(0),
        }
    }

    pub fn single_page(executions: Vec<Execution>) -> Self {
        Self::new(vec![executions])
    }

    /// Scripts redrive failures for `arn`.
    pub fn fail_on(mut self, arn: &str) -> Self {
        self.fail_arns.insert(arn.to_string());
        self
    }

    /// Execution ARNs redriven so far, in call order.
    pub fn redriven(&self) -> Vec<String> {
        self.redriven.lock().expect("poisoned mutex").clone()
    }

    pub fn pages_served(&self) -> usize {
        self.pages_served.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExecutionEngine for FakeExecutionEngine {
    async fn execution_page(
        &self,
        _state_machine_arn: &str,
        _status: ExecutionStatus,
        next_token: Option<String>,
    ) -> Result<ExecutionPage, Error> {
        self.pages_served.fetch_add(1, Ordering::SeqCst);
        let index: usize = match next_token {
            Some(token) => token
                .parse()
                .map_err(|_| Error::api("ListExecutions", "bad continuation token"))?,
            None => 0,
        };
        let executions = self.pages.get(index).cloned().unwrap_or_default();
        let next_token = (index + 1 < self.pages.len()).then(|| (index + 1).to_string());
        Ok(ExecutionPage {
            executions,
            next_token,
        })
    }

    async fn redrive(&self, execution_arn: &str) -> Result<(), Error> {
        self.redriven
            .lock()
            .expect("poisoned mutex")
            .push(execution_arn.to_string());
        if self.fail_arns.contains(execution_arn) {
            return Err(Error::api(
                "RedriveExecution",
                format!("scripted failure for '{execution_arn}'"),
            ));
        }
        Ok(())
    }
}
