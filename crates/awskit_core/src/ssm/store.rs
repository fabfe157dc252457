//! Parameter-store access: the `ParameterStore` seam, its SSM-backed
//! implementation, and the bulk operations built on top of it.

use std::collections::BTreeSet;

use async_trait::async_trait;
use aws_sdk_ssm::error::DisplayErrorContext;
use aws_sdk_ssm::types::{ParameterStringFilter, ParameterType};
use futures::stream::{self, StreamExt};

use crate::error::Error;
use crate::ssm::absolute_prefix;

/// AWS maximum page size for `DescribeParameters`.
const MAX_PAGE_SIZE: i32 = 50;

/// Cap on concurrent in-flight requests during bulk fetch and create.
const MAX_IN_FLIGHT: usize = 16;

/// The kind of a parameter record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    String,
    StringList,
    SecureString,
}

impl ParameterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "String",
            Self::StringList => "StringList",
            Self::SecureString => "SecureString",
        }
    }
}

/// One parameter record. Identity is the name; copying produces a new
/// record rather than mutating this one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub value: String,
    pub kind: ParameterKind,
}

impl Parameter {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        kind: ParameterKind,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            kind,
        }
    }
}

/// One page of a begins-with name listing.
#[derive(Debug, Default)]
pub struct NamePage {
    /// Names as returned by the API; a record can lack one.
    pub names: Vec<Option<String>>,
    pub next_token: Option<String>,
}

/// Raw remote parameter-store surface, one method per API call.
///
/// Bulk behavior (pagination, fan-out, failure tolerance) lives in the free
/// functions below so it can be exercised against in-memory fakes.
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// One page of names under `begins_with`.
    async fn name_page(
        &self,
        begins_with: &str,
        next_token: Option<String>,
    ) -> Result<NamePage, Error>;

    /// The full record for one parameter.
    async fn get(&self, name: &str) -> Result<Parameter, Error>;

    /// Creates or, when `overwrite` is set, replaces one parameter.
    async fn put(&self, parameter: &Parameter, overwrite: bool) -> Result<(), Error>;

    /// Deletes one parameter.
    async fn delete(&self, name: &str) -> Result<(), Error>;
}

/// `ParameterStore` backed by the real SSM API.
pub struct SsmParameterStore {
    client: aws_sdk_ssm::Client,
}

impl SsmParameterStore {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_ssm::Client::new(config),
        }
    }
}

#[async_trait]
impl ParameterStore for SsmParameterStore {
    async fn name_page(
        &self,
        begins_with: &str,
        next_token: Option<String>,
    ) -> Result<NamePage, Error> {
        let filter = ParameterStringFilter::builder()
            .key("Name")
            .option("BeginsWith")
            .values(begins_with)
            .build()
            .map_err(|e| Error::api("DescribeParameters", e))?;
        let output = self
            .client
            .describe_parameters()
            .max_results(MAX_PAGE_SIZE)
            .parameter_filters(filter)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| Error::api("DescribeParameters", DisplayErrorContext(&e)))?;
        Ok(NamePage {
            names: output
                .parameters()
                .iter()
                .map(|record| record.name().map(str::to_string))
                .collect(),
            next_token: output.next_token().map(str::to_string),
        })
    }

    async fn get(&self, name: &str) -> Result<Parameter, Error> {
        let output = self
            .client
            .get_parameter()
            .name(name)
            .send()
            .await
            .map_err(|e| Error::api("GetParameter", DisplayErrorContext(&e)))?;
        let record = output
            .parameter()
            .ok_or_else(|| Error::api("GetParameter", "empty response"))?;
        match (record.name(), record.value(), record.r#type()) {
            (Some(name), Some(value), Some(kind)) => {
                Ok(Parameter::new(name, value, kind_from_api(kind)))
            }
            _ => Err(Error::api(
                "GetParameter",
                format!("incomplete record for '{name}'"),
            )),
        }
    }

    async fn put(&self, parameter: &Parameter, overwrite: bool) -> Result<(), Error> {
        self.client
            .put_parameter()
            .name(parameter.name.as_str())
            .value(parameter.value.as_str())
            .r#type(kind_to_api(parameter.kind))
            .overwrite(overwrite)
            .send()
            .await
            .map_err(|e| Error::api("PutParameter", DisplayErrorContext(&e)))?;
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), Error> {
        self.client
            .delete_parameter()
            .name(name)
            .send()
            .await
            .map_err(|e| Error::api("DeleteParameter", DisplayErrorContext(&e)))?;
        Ok(())
    }
}

fn kind_from_api(kind: &ParameterType) -> ParameterKind {
    match kind {
        ParameterType::StringList => ParameterKind::StringList,
        ParameterType::SecureString => ParameterKind::SecureString,
        // The SDK enum is non-exhaustive; plain String is the safe reading.
        _ => ParameterKind::String,
    }
}

fn kind_to_api(kind: ParameterKind) -> ParameterType {
    match kind {
        ParameterKind::String => ParameterType::String,
        ParameterKind::StringList => ParameterType::StringList,
        ParameterKind::SecureString => ParameterType::SecureString,
    }
}

/// Lists every parameter name under `prefix`, walking all continuation
/// tokens. Records without a name are skipped with a warning.
pub async fn list_parameter_names(
    store: &impl ParameterStore,
    prefix: &str,
) -> Result<BTreeSet<String>, Error> {
    let begins_with = absolute_prefix(prefix);
    let mut names = BTreeSet::new();
    let mut next_token = None;
    let mut page = 1u32;
    loop {
        log::info!("Getting parameters page {page:02}");
        let result = store.name_page(&begins_with, next_token).await?;
        for name in result.names {
            match name {
                Some(name) => {
                    names.insert(name);
                }
                None => log::warn!("Skipping parameter record with no name"),
            }
        }
        match result.next_token {
            Some(token) => next_token = Some(token),
            None => break,
        }
        page += 1;
    }
    Ok(names)
}

/// Fetches the full records for every parameter under `prefix`.
///
/// Fetches run concurrently with a fixed in-flight cap. A record that fails
/// to fetch (or comes back incomplete) is logged and dropped rather than
/// failing the batch; the order of the result is not significant.
pub async fn fetch_parameters(
    store: &impl ParameterStore,
    prefix: &str,
) -> Result<Vec<Parameter>, Error> {
    let names = list_parameter_names(store, prefix).await?;
    log::info!("Fetching {} parameters under {}", names.len(), absolute_prefix(prefix));
    let results: Vec<Result<Parameter, (String, Error)>> = stream::iter(names)
        .map(|name| async move {
            match store.get(&name).await {
                Ok(parameter) => Ok(parameter),
                Err(err) => Err((name, err)),
            }
        })
        .buffer_unordered(MAX_IN_FLIGHT)
        .collect()
        .await;
    let mut parameters = Vec::new();
    for result in results {
        match result {
            Ok(parameter) => parameters.push(parameter),
            Err((name, err)) => log::error!("Error fetching parameter {name}: {err}"),
        }
    }
    Ok(parameters)
}

/// Creates every record, concurrently bounded, echoing each one.
///
/// Not atomic: a failed put is echoed and the rest proceed. Returns the
/// number of records actually created.
pub async fn create_parameters(
    store: &impl ParameterStore,
    parameters: &[Parameter],
    overwrite: bool,
) -> usize {
    let outcomes: Vec<bool> = stream::iter(parameters)
        .map(|parameter| async move {
            println!("Creating parameter: {}", parameter.name);
            match store.put(parameter, overwrite).await {
                Ok(()) => true,
                Err(err) => {
                    println!("Error creating parameter {}: {}", parameter.name, err);
                    false
                }
            }
        })
        .buffer_unordered(MAX_IN_FLIGHT)
        .collect()
        .await;
    outcomes.into_iter().filter(|created| *created).count()
}

/// Deletes the given names in order, echoing each one. A failure aborts the
/// remaining deletions.
pub async fn delete_parameters(
    store: &impl ParameterStore,
    names: &[String],
) -> Result<(), Error> {
    for name in names {
        println!("Deleting parameter: {name}");
        store.delete(name).await?;
    }
    Ok(())
}
