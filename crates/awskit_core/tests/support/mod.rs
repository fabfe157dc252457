#![allow(dead_code)]

use std::fs;

use awskit_core::ssm::{Parameter, ParameterKind};
use awskit_core::test_helpers::InMemoryParameterStore;

/// Parameter fixture shared by the SSM flow tests: three records under the
/// `/test1/source/` subtree, one of them a SecureString.
pub fn seeded_source_store() -> InMemoryParameterStore {
    InMemoryParameterStore::with_parameters([
        Parameter::new("/test1/source/param1", "value1", ParameterKind::String),
        Parameter::new("/test1/source/param2", "value2", ParameterKind::String),
        Parameter::new(
            "/test1/source/param3",
            "value3",
            ParameterKind::SecureString,
        ),
    ])
}

/// Writes a SAM-style template referencing `param1` and `param2` under the
/// stack prefix, and returns its path.
pub fn write_source_template(dir: &tempfile::TempDir) -> String {
    let content = r#"AWSTemplateFormatVersion: '2010-09-09'
Transform: AWS::Serverless-2016-10-31
Resources:
  Function:
    Type: AWS::Serverless::Function
    Properties:
      Environment:
        Variables:
          PARAM1: !Sub '{{resolve:ssm:/${AWS::StackName}/source/param1}}'
          PARAM2: '{{resolve:ssm:/${AWS::StackName}/source/param2}}'
"#;
    let path = dir.path().join("template.yaml");
    fs::write(&path, content).expect("write template file");
    path.to_str().expect("utf8 path").to_string()
}
