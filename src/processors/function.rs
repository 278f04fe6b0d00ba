use super::ProcessingOutcome;
use crate::request::Payload;
use log::{debug, error};
use serde::Serialize;
use serde_json::Value;
use std::{
    collections::BTreeMap,
    error::Error as StdError,
    fmt::{self, Write},
};
use thiserror::Error;

/// The value a function in the chain can return.
pub enum FunctionValue {
    /// `true` is recorded, `false` fails the chain.
    Flag(bool),
    /// Recorded as-is.
    Text(String),
    /// Recorded as its displayed form.
    Other(Box<dyn fmt::Display + Send + Sync>),
}

impl From<bool> for FunctionValue {
    fn from(value: bool) -> Self {
        FunctionValue::Flag(value)
    }
}

impl From<String> for FunctionValue {
    fn from(value: String) -> Self {
        FunctionValue::Text(value)
    }
}

impl From<&str> for FunctionValue {
    fn from(value: &str) -> Self {
        FunctionValue::Text(value.to_string())
    }
}

pub type FunctionError = Box<dyn StdError + Send + Sync>;
pub type FunctionResult = Result<FunctionValue, FunctionError>;

type Function = dyn Fn(&Payload) -> FunctionResult + Send + Sync;

/// A named function that validates or transforms the payload.
pub struct FunctionEntry {
    name: String,
    function: Box<Function>,
}

impl FunctionEntry {
    pub fn new<F>(name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&Payload) -> FunctionResult + Send + Sync + 'static,
    {
        FunctionEntry {
            name: name.into(),
            function: Box::new(function),
        }
    }

    /// A function that checks that the field (a dot-separated path, e.g. `repository.name`)
    /// equals the expected value. A missing field is an error.
    pub fn field_equals(field: impl Into<String>, expected: impl Into<String>) -> Self {
        let field = field.into();
        let expected = expected.into();
        FunctionEntry::new(field.clone(), move |payload: &Payload| {
            let value = lookup(payload, &field)
                .ok_or_else(|| FunctionError::from(format!("field {field} is missing")))?;
            let actual = match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            Ok(FunctionValue::Flag(actual == expected))
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

fn lookup<'a>(payload: &'a Payload, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let first = payload.get(parts.next()?)?;
    parts.try_fold(first, |value, part| value.get(part))
}

/// A recorded result in the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
enum FunctionOutput {
    Flag(bool),
    Text(String),
}

/// A custom error describing why the chain could not produce an output.
#[derive(Debug, Error)]
pub enum FunctionChainError {
    /// The returned value failed while it was displayed.
    #[error("Function {0} returned a value that cannot be displayed")]
    Undisplayable(String),
    #[error("Cannot serialize the output: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Runs every function on the payload in order and collects the results by name.
///
/// A function returning `false` or an error fails the chain, but the following
/// functions still run. The output is a JSON object, returned with 400 if any of
/// the functions failed and with 200 otherwise.
pub struct FunctionChainProcessor {
    functions: Vec<FunctionEntry>,
}

impl FunctionChainProcessor {
    pub fn new(functions: Vec<FunctionEntry>) -> Self {
        FunctionChainProcessor { functions }
    }

    fn run_inner(&self, payload: &Payload) -> Result<(bool, String), FunctionChainError> {
        let mut failed = false;
        let mut output: BTreeMap<&str, FunctionOutput> = BTreeMap::new();

        for entry in &self.functions {
            let name = entry.name();
            match (entry.function)(payload) {
                Ok(FunctionValue::Flag(true)) => {
                    debug!("Function {name} returned true.");
                    output.insert(name, FunctionOutput::Flag(true));
                }
                Ok(FunctionValue::Flag(false)) => {
                    error!("Function {name} returned false.");
                    failed = true;
                }
                Ok(FunctionValue::Text(text)) => {
                    debug!("Function {name} returned a string.");
                    output.insert(name, FunctionOutput::Text(text));
                }
                Ok(FunctionValue::Other(value)) => {
                    let mut text = String::new();
                    write!(text, "{value}")
                        .map_err(|_| FunctionChainError::Undisplayable(name.to_string()))?;
                    debug!("Function {name} returned a value.");
                    output.insert(name, FunctionOutput::Text(text));
                }
                Err(err) => {
                    error!("Function {name} failed: {err}.");
                    failed = true;
                    output.insert(name, FunctionOutput::Text(err.to_string()));
                }
            }
        }

        Ok((failed, serde_json::to_string(&output)?))
    }

    pub fn process(&self, payload: &Payload) -> ProcessingOutcome {
        match self.run_inner(payload) {
            Ok((true, output)) => ProcessingOutcome::new(400, output),
            Ok((false, output)) => ProcessingOutcome::new(200, output),
            Err(err) => {
                error!("{err}.");
                ProcessingOutcome::new(500, err.to_string())
            }
        }
    }
}
