use std::{io::BufRead, path::{Path, PathBuf}};

use anyhow::bail;
use itertools::Itertools;
use serde::{de::{Error, Visitor}, Deserialize};

/// Expected outcome of a single line: the printed value, or the error message.
#[derive(Debug, Clone, PartialEq)]
pub struct TestEvaluationResult(Result<String, String>);

impl From<TestEvaluationResult> for Result<String, String> {
    fn from(value: TestEvaluationResult) -> Self {
        value.0
    }
}

struct TestEvaluationResultVisitor {}

impl<'de> Deserialize<'de> for TestEvaluationResult {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: serde::Deserializer<'de> {

        deserializer.deserialize_map(TestEvaluationResultVisitor {})
    }
}

impl<'de> Visitor<'de> for TestEvaluationResultVisitor {
    type Value = TestEvaluationResult;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(formatter, "A structure containing the boolean key 'ok'. If it's okay, contains the key 'output', otherwise the key 'error'")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: serde::de::MapAccess<'de>, {

        if map.next_key::<String>()? != Some("ok".to_owned()) {
            return Err(A::Error::custom("First key should be 'ok'"))
        }

        let ok: bool = map.next_value()?;
        let expected_key = if ok { "output" } else { "error" };
        if map.next_key::<String>()?.as_ref()
            .ok_or(A::Error::custom("Must have two keys"))? != expected_key
        {
            return Err(A::Error::custom(format!("Second key should be '{}'", expected_key)))
        }

        let text: String = map.next_value()?;
        let result = TestEvaluationResult(if ok { Ok(text) } else { Err(text) });

        if map.next_key::<String>()?.is_some() {
            return Err(A::Error::custom("Only two keys should be present"));
        }

        Ok(result)
    }
}

fn load_input_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<String>> {
    let source = std::fs::read(path)?;
    Ok(source.lines().collect::<Result<Vec<String>, _>>()?)
}

fn load_output_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<TestEvaluationResult>> {
    let source = std::fs::read(path)?;
    let result: Vec<TestEvaluationResult> = serde_json::from_slice(&source)?;
    Ok(result)
}

pub fn load_test_pair(testcase: &str) -> anyhow::Result<Vec<(String, TestEvaluationResult)>> {
    if !all_testcases().any(|name| name == testcase) { bail!("Unknown testcase {}", testcase); }

    let base_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let input = load_input_file(base_path.join("test_inputs").join(format!("{}.lisp", testcase)))?;
    let output = load_output_file(base_path.join("test_outputs").join(format!("{}.json", testcase)))?;

    if input.len() != output.len() { bail!("Input and output of testcase {} does not match", testcase); }
    Ok(input.into_iter().zip(output).collect_vec())
}

pub fn all_testcases() -> impl Iterator<Item = &'static str> {
    [
        "arithmetic", "comparison", "lists", "definitions", "functions",
        "variadic", "scoping", "conditionals", "recursion", "strings", "errors",
    ].into_iter()
}
