//! Extracts SSM parameter references from CloudFormation/SAM templates.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Error;
use crate::ssm::join_parameter_path;

/// Matches `{{resolve:ssm:/${AWS::StackName}<suffix>}}` dynamic references,
/// tolerating a space inside the braces and an optional trailing `+`.
static SSM_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{ ?resolve:ssm:/\$\{AWS::StackName\}(/.+) ?\}\+?\}")
        .expect("ssm reference regex is valid")
});

static TEMPLATE_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.ya?ml$").expect("template extension regex is valid"));

/// Returns every parameter name referenced from `template_path` via an SSM
/// dynamic reference, joined under `prefix`.
///
/// The template is scanned line by line against the reference pattern; no
/// YAML parsing is involved, so references inside comments count too. A
/// template with no references yields an empty set.
pub fn referenced_parameters(template_path: &str, prefix: &str) -> Result<BTreeSet<String>, Error> {
    if !TEMPLATE_EXTENSION.is_match(template_path) {
        return Err(Error::TemplateExtension);
    }
    log::info!("Reading parameters from template file: {template_path}");
    let file = File::open(template_path).map_err(|source| Error::TemplateRead {
        path: template_path.to_string(),
        source,
    })?;
    let mut names = BTreeSet::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|source| Error::TemplateRead {
            path: template_path.to_string(),
            source,
        })?;
        for capture in SSM_REFERENCE.captures_iter(&line) {
            names.insert(join_parameter_path(prefix, &capture[1]));
        }
    }
    log::debug!("Template references {} parameters", names.len());
    Ok(names)
}
