//! Declarative plan documents
//!
//! A plan file names a target signature and a plan tree whose calls refer
//! to the built-in function registry:
//!
//! ```yaml
//! target: UserDto
//! signature:
//!   - user
//!   - { name: extra, kind: var_keyword }
//! plan:
//!   call:
//!     function: make_dict
//!     args:
//!       - keyword: { key: name, value: { call: { function: str_upper, args: [ { positional: { attr: { target: { param: user }, name: name } } } ] } } }
//!       - unpack_mapping: { param: extra }
//! ```

use crate::error::{Error, Result};
use morphic_core::codegen::{Accessor, Parameter, ParameterKind, Plan, PlanArg, Signature};
use morphic_core::provider::{Answer, ConversionRequest, RequestChecker, RequestKind, StaticProvider};
use morphic_core::{FunctionRegistry, ProviderChain, TypeRef, Value};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Type name used when a plan file leaves `source` or `target` out
pub const DEFAULT_TYPE_NAME: &str = "object";

/// Parsed plan document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanFile {
    /// Type converted from
    #[serde(default)]
    pub source: Option<String>,

    /// Type converted to; the conversion request is keyed on it
    #[serde(default)]
    pub target: Option<String>,

    /// Parameters of the closure, in order
    pub signature: Vec<ParameterEntry>,

    /// Return annotation shown on the signature
    #[serde(default)]
    pub returns: Option<String>,

    pub plan: PlanSpec,
}

/// A parameter given either by bare name or in full
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterEntry {
    Name(String),
    Full(ParameterSpec),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(default)]
    pub kind: KindSpec,
    #[serde(default)]
    pub annotation: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindSpec {
    PositionalOnly,
    #[default]
    PositionalOrKeyword,
    VarPositional,
    KeywordOnly,
    VarKeyword,
}

/// One node of the plan tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanSpec {
    Param(String),
    Constant(serde_json::Value),
    Call {
        function: String,
        #[serde(default)]
        args: Vec<ArgSpec>,
    },
    Attr {
        target: Box<PlanSpec>,
        name: String,
    },
    Item {
        target: Box<PlanSpec>,
        key: serde_json::Value,
    },
    Getter {
        target: Box<PlanSpec>,
        function: String,
    },
}

/// One argument slot of a call node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgSpec {
    Positional(PlanSpec),
    Keyword { key: String, value: PlanSpec },
    Unpack(PlanSpec),
    UnpackMapping(PlanSpec),
}

impl From<KindSpec> for ParameterKind {
    fn from(kind: KindSpec) -> Self {
        match kind {
            KindSpec::PositionalOnly => ParameterKind::PositionalOnly,
            KindSpec::PositionalOrKeyword => ParameterKind::PositionalOrKeyword,
            KindSpec::VarPositional => ParameterKind::VarPositional,
            KindSpec::KeywordOnly => ParameterKind::KeywordOnly,
            KindSpec::VarKeyword => ParameterKind::VarKeyword,
        }
    }
}

impl PlanFile {
    /// Read and parse a plan file; `.yaml`/`.yml` files are YAML, anything
    /// else is JSON
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        );
        Self::parse(&content, is_yaml, path)
    }

    /// Parse plan file content. The document is first read into a JSON
    /// tree so YAML and JSON share one schema.
    pub fn parse(content: &str, is_yaml: bool, path: &Path) -> Result<Self> {
        let document: serde_json::Value = if is_yaml {
            serde_yaml::from_str(content).map_err(|_| Error::InvalidFormat {
                path: path.to_path_buf(),
                expected: "YAML".to_string(),
            })?
        } else {
            serde_json::from_str(content).map_err(|_| Error::InvalidFormat {
                path: path.to_path_buf(),
                expected: "JSON".to_string(),
            })?
        };

        serde_json::from_value(document).map_err(|e| Error::PlanFile {
            path: PathBuf::from(path),
            message: e.to_string(),
        })
    }

    /// Build the target signature
    pub fn signature(&self) -> Result<Signature> {
        let params = self
            .signature
            .iter()
            .map(|entry| match entry {
                ParameterEntry::Name(name) => Parameter::positional(name.as_str()),
                ParameterEntry::Full(spec) => {
                    let param = Parameter::new(spec.name.as_str(), spec.kind.into());
                    match &spec.annotation {
                        Some(annotation) => param.with_annotation(annotation.as_str()),
                        None => param,
                    }
                }
            })
            .collect();

        let signature = Signature::new(params)?;
        Ok(match &self.returns {
            Some(annotation) => signature.with_return_annotation(annotation.as_str()),
            None => signature,
        })
    }

    /// Build the plan tree, resolving function names against `registry`
    pub fn plan(&self, registry: &FunctionRegistry) -> Result<Plan> {
        build_plan(&self.plan, registry)
    }

    /// Conversion request answered by this file's plan
    pub fn request(&self) -> Result<ConversionRequest> {
        Ok(ConversionRequest {
            source: type_named(self.source.as_deref()),
            target: type_named(self.target.as_deref()),
            signature: self.signature()?,
        })
    }

    /// Provider chain holding a single provider that answers conversion
    /// requests for `target` with this file's plan. Types compare by
    /// identity, so `target` must be the type carried by the request.
    pub fn provider_chain(&self, registry: &FunctionRegistry, target: &TypeRef) -> Result<ProviderChain> {
        let plan = self.plan(registry)?;
        let provider = StaticProvider::builder("plan-file")
            .action(RequestKind::Conversion, move |_, _| Ok(Answer::Plan(plan.clone())))
            .build()?;
        let checker = RequestChecker::subclass(target.clone())
            .and(RequestChecker::kind(RequestKind::Conversion));
        Ok(ProviderChain::new().with_checked(checker, provider))
    }
}

fn type_named(name: Option<&str>) -> TypeRef {
    TypeRef::named(name.unwrap_or(DEFAULT_TYPE_NAME))
}

fn lookup(registry: &FunctionRegistry, name: &str) -> Result<morphic_core::Function> {
    registry
        .get(name)
        .cloned()
        .ok_or_else(|| Error::UnknownFunction {
            name: name.to_string(),
        })
}

fn build_plan(spec: &PlanSpec, registry: &FunctionRegistry) -> Result<Plan> {
    Ok(match spec {
        PlanSpec::Param(name) => Plan::param(name.as_str()),
        PlanSpec::Constant(json) => Plan::constant(Value::from_json(json.clone())),
        PlanSpec::Call { function, args } => {
            let func = lookup(registry, function)?;
            let args = args
                .iter()
                .map(|arg| build_arg(arg, registry))
                .collect::<Result<Vec<_>>>()?;
            Plan::call(func, args)
        }
        PlanSpec::Attr { target, name } => Plan::attr(build_plan(target, registry)?, name.as_str()),
        PlanSpec::Item { target, key } => {
            Plan::item(build_plan(target, registry)?, Value::from_json(key.clone()))
        }
        PlanSpec::Getter { target, function } => Plan::access(
            build_plan(target, registry)?,
            Accessor::Getter(lookup(registry, function)?),
        ),
    })
}

fn build_arg(spec: &ArgSpec, registry: &FunctionRegistry) -> Result<PlanArg> {
    Ok(match spec {
        ArgSpec::Positional(element) => PlanArg::positional(build_plan(element, registry)?),
        ArgSpec::Keyword { key, value } => PlanArg::keyword(key.as_str(), build_plan(value, registry)?),
        ArgSpec::Unpack(element) => PlanArg::UnpackIterable(build_plan(element, registry)?),
        ArgSpec::UnpackMapping(element) => PlanArg::UnpackMapping(build_plan(element, registry)?),
    })
}
