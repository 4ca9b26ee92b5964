//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

mod completions;
mod config;
mod eval;
mod functions;
mod render;

pub use completions::handle_completions;
pub use config::handle_config;
pub use eval::handle_eval;
pub use functions::handle_functions;
pub use render::handle_render;

use crate::config::Config;
use crate::error::Result;
use crate::plan_file::PlanFile;
use morphic_core::{Closure, FunctionRegistry, Resolver};
use std::path::Path;

/// Load a plan file, resolve its conversion through a provider chain and
/// load the synthesized closure
pub(crate) fn load_converter(path: &Path, config: &Config) -> Result<Closure> {
    let file = PlanFile::from_path(path)?;
    let registry = FunctionRegistry::with_builtins();

    let request = file.request()?;
    let resolver = Resolver::with_config(
        file.provider_chain(&registry, &request.target)?,
        config.engine.clone(),
    )?;
    tracing::info!(
        plan_file = %path.display(),
        target = %request.target,
        "resolving conversion"
    );
    Ok(resolver.produce_converter(request)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use morphic_core::CallArgs;
    use morphic_core::Value;
    use tempfile::TempDir;

    #[test]
    fn test_load_converter_from_json_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plan.json");
        std::fs::write(
            &path,
            r#"{"signature": ["s"], "plan": {"call": {"function": "str_strip", "args": [{"positional": {"param": "s"}}]}}}"#,
        )
        .unwrap();

        let closure = load_converter(&path, &Config::default()).unwrap();
        assert_eq!(closure.source(), "def broaching_closure(s):\n    return str_strip(s)\n");
        assert_eq!(
            closure.call(CallArgs::positional([Value::from("  hi ")])).unwrap(),
            Value::from("hi")
        );
    }

    #[test]
    fn test_load_converter_honors_engine_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plan.yaml");
        std::fs::write(&path, "signature: [x]\nplan: { param: x }\n").unwrap();

        let mut config = Config::default();
        config.engine.synthesis.closure_name = "convert".to_string();
        let closure = load_converter(&path, &config).unwrap();
        assert_eq!(closure.source(), "def convert(x):\n    return x\n");
    }

    #[test]
    fn test_load_converter_missing_file() {
        let err = load_converter(Path::new("/nonexistent/plan.yaml"), &Config::default()).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }
}
