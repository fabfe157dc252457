pub mod plan;
pub mod store;
pub mod template;

pub use plan::{plan_copy, unused_parameters, ValueRewrite};
pub use store::{
    create_parameters, delete_parameters, fetch_parameters, list_parameter_names, NamePage,
    Parameter, ParameterKind, ParameterStore, SsmParameterStore,
};
pub use template::referenced_parameters;

/// Joins a path prefix and a captured template suffix into an absolute
/// parameter name, tolerating stray slashes on either side.
pub fn join_parameter_path(prefix: &str, suffix: &str) -> String {
    format!("/{}/{}", prefix.trim_matches('/'), suffix.trim_matches('/'))
}

/// The `/{prefix}/` form used by begins-with listing filters. The trailing
/// slash keeps siblings like `/app2` out of a listing scoped to `/app`.
pub fn absolute_prefix(prefix: &str) -> String {
    format!("/{}/", prefix.trim_matches('/'))
}
