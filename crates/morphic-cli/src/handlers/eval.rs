//! Eval command handler

use crate::cli::EvalArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use morphic_core::{CallArgs, Value};
use serde::Serialize;

/// Type name given to JSON objects passed as records
const RECORD_TYPE_NAME: &str = "Record";

#[derive(Debug, Serialize)]
struct EvalReport {
    closure: String,
    result: serde_json::Value,
}

/// Handle the eval command
pub fn handle_eval(args: EvalArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let call_args = parse_call_args(&args.args, &args.kwargs, args.as_maps)?;
    let closure = super::load_converter(&args.plan_file, config)?;

    tracing::debug!(
        positional = call_args.positional.len(),
        keyword = call_args.keyword.len(),
        "calling {}",
        closure
    );
    let result = closure.call(call_args)?;

    if output.is_human() {
        output.writeln(&result.to_string())
    } else {
        output.data(&EvalReport {
            closure: closure.name().to_string(),
            result: result.to_json(),
        })
    }
}

/// Build call arguments from a JSON array and a JSON object
pub(crate) fn parse_call_args(args: &str, kwargs: &str, as_maps: bool) -> Result<CallArgs> {
    let convert = |json: serde_json::Value| {
        if as_maps {
            Value::from_json(json)
        } else {
            Value::from_json_as_records(json, RECORD_TYPE_NAME)
        }
    };

    let positional = match serde_json::from_str::<serde_json::Value>(args)? {
        serde_json::Value::Array(items) => items.into_iter().map(convert).collect(),
        other => {
            return Err(Error::invalid_args(format!(
                "--args must be a JSON array, got {}",
                other
            )))
        }
    };
    let keyword = match serde_json::from_str::<serde_json::Value>(kwargs)? {
        serde_json::Value::Object(map) => map.into_iter().map(|(k, v)| (k, convert(v))).collect(),
        other => {
            return Err(Error::invalid_args(format!(
                "--kwargs must be a JSON object, got {}",
                other
            )))
        }
    };

    Ok(CallArgs { positional, keyword })
}
