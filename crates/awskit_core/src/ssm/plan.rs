//! Pure planning for delete-unused and copy. No I/O here: callers feed
//! listings in and display or execute the plans that come out.

use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Error;
use crate::ssm::store::Parameter;

static REWRITE_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^s/(.*)/(.*)/$").expect("rewrite rule regex is valid"));

/// A `s/PATTERN/REPLACEMENT/` value substitution applied during copy.
///
/// The pattern is a full regular expression and the substitution hits every
/// occurrence in a value. Parsing is greedy on the pattern side, so
/// `s/a/b/c/` reads as pattern `a/b`, replacement `c`.
#[derive(Debug, Clone)]
pub struct ValueRewrite {
    pattern: Regex,
    replacement: String,
}

impl ValueRewrite {
    pub fn apply(&self, value: &str) -> String {
        self.pattern
            .replace_all(value, self.replacement.as_str())
            .into_owned()
    }
}

impl FromStr for ValueRewrite {
    type Err = Error;

    fn from_str(rule: &str) -> Result<Self, Self::Err> {
        let captures = REWRITE_RULE
            .captures(rule)
            .ok_or_else(|| Error::MalformedRewrite(rule.to_string()))?;
        let pattern = Regex::new(&captures[1]).map_err(|source| Error::RewritePattern {
            pattern: captures[1].to_string(),
            source,
        })?;
        Ok(Self {
            pattern,
            replacement: captures[2].to_string(),
        })
    }
}

/// Names present in the store but not referenced by the template, sorted
/// ascending. Callers print and delete in exactly this order.
pub fn unused_parameters(
    remote: &BTreeSet<String>,
    referenced: &BTreeSet<String>,
) -> Vec<String> {
    remote.difference(referenced).cloned().collect()
}

/// Builds the copy batch: remaps each source name onto the destination,
/// applies the optional value rewrite, and drops records whose target
/// already exists unless `overwrite` is set. Sorted by target name.
///
/// The remap is deliberately a literal substring replacement: any
/// occurrence of `source` in the name is rewritten, not just a leading
/// path component.
pub fn plan_copy(
    parameters: Vec<Parameter>,
    existing: &BTreeSet<String>,
    source: &str,
    destination: &str,
    rewrite: Option<&ValueRewrite>,
    overwrite: bool,
) -> Vec<Parameter> {
    let mut batch = Vec::new();
    for parameter in parameters {
        let name = parameter.name.replace(source, destination);
        if !overwrite && existing.contains(&name) {
            log::debug!("Skipping existing parameter: {name}");
            continue;
        }
        let value = match rewrite {
            Some(rule) => rule.apply(&parameter.value),
            None => parameter.value,
        };
        batch.push(Parameter {
            name,
            value,
            kind: parameter.kind,
        });
    }
    batch.sort_by(|a, b| a.name.cmp(&b.name));
    batch
}
