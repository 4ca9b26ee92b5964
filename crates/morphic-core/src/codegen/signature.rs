//! Call signatures of synthesized closures
//!
//! Copyright (c) 2025 Morphic Team
//! Licensed under the Apache-2.0 license

use super::error::CodegenError;
use super::syntax::is_identifier;
use crate::error::EvalError;
use crate::function::CallArgs;
use crate::value::Value;
use std::fmt;

/// How a parameter receives its argument. Variants are declared in the only
/// order they may appear in a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParameterKind {
    PositionalOnly,
    PositionalOrKeyword,
    /// `*args`
    VarPositional,
    KeywordOnly,
    /// `**kwargs`
    VarKeyword,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub kind: ParameterKind,
    /// Free-form annotation, kept on the signature but never emitted
    pub annotation: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            kind,
            annotation: None,
        }
    }

    /// Positional-or-keyword parameter
    pub fn positional(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::PositionalOrKeyword)
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    fn accepts_keyword(&self) -> bool {
        matches!(
            self.kind,
            ParameterKind::PositionalOrKeyword | ParameterKind::KeywordOnly
        )
    }

    fn is_variadic(&self) -> bool {
        matches!(
            self.kind,
            ParameterKind::VarPositional | ParameterKind::VarKeyword
        )
    }
}

/// A validated, ordered parameter list with an optional return annotation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Signature {
    params: Vec<Parameter>,
    return_annotation: Option<String>,
}

impl Signature {
    /// Build a signature, checking identifier syntax, uniqueness and kind
    /// ordering
    pub fn new(params: Vec<Parameter>) -> Result<Self, CodegenError> {
        let mut previous: Option<ParameterKind> = None;
        for (i, param) in params.iter().enumerate() {
            if !is_identifier(&param.name) {
                return Err(CodegenError::invalid_signature(format!(
                    "'{}' is not a valid parameter name",
                    param.name
                )));
            }
            if params[..i].iter().any(|p| p.name == param.name) {
                return Err(CodegenError::invalid_signature(format!(
                    "duplicate parameter '{}'",
                    param.name
                )));
            }
            if let Some(prev) = previous {
                let repeated_variadic = prev == param.kind && param.is_variadic();
                if prev > param.kind || repeated_variadic {
                    return Err(CodegenError::invalid_signature(format!(
                        "parameter '{}' ({:?}) cannot follow a {:?} parameter",
                        param.name, param.kind, prev
                    )));
                }
            }
            previous = Some(param.kind);
        }
        Ok(Self {
            params,
            return_annotation: None,
        })
    }

    /// Signature made of positional-or-keyword parameters only
    pub fn positional<I, S>(names: I) -> Result<Self, CodegenError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(names.into_iter().map(Parameter::positional).collect())
    }

    pub fn with_return_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.return_annotation = Some(annotation.into());
        self
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    pub fn return_annotation(&self) -> Option<&str> {
        self.return_annotation.as_deref()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| p.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Render the parameter list in emitted form, without annotations
    pub fn render_parameters(&self) -> String {
        self.render(false)
    }

    fn render(&self, annotated: bool) -> String {
        let has_var_positional = self
            .params
            .iter()
            .any(|p| p.kind == ParameterKind::VarPositional);
        let mut parts: Vec<String> = Vec::with_capacity(self.params.len() + 2);
        let mut keyword_marker_written = has_var_positional;

        for (i, param) in self.params.iter().enumerate() {
            if param.kind == ParameterKind::KeywordOnly && !keyword_marker_written {
                parts.push("*".to_string());
                keyword_marker_written = true;
            }
            let mut text = match param.kind {
                ParameterKind::VarPositional => format!("*{}", param.name),
                ParameterKind::VarKeyword => format!("**{}", param.name),
                _ => param.name.clone(),
            };
            if annotated {
                if let Some(annotation) = &param.annotation {
                    text.push_str(": ");
                    text.push_str(annotation);
                }
            }
            parts.push(text);

            let next_kind = self.params.get(i + 1).map(|p| p.kind);
            if param.kind == ParameterKind::PositionalOnly
                && next_kind != Some(ParameterKind::PositionalOnly)
            {
                parts.push("/".to_string());
            }
        }
        format!("({})", parts.join(", "))
    }

    /// Bind call arguments to parameter names, in declaration order.
    ///
    /// Surplus positionals go to `*args` as a tuple, unknown keywords to
    /// `**kwargs` as a map with string keys.
    pub fn bind(&self, args: CallArgs) -> Result<Vec<(String, Value)>, EvalError> {
        let mut slots: Vec<Option<Value>> = vec![None; self.params.len()];
        let mut extra_positional = Vec::new();
        let mut extra_keyword = Vec::new();

        let positional_slots: Vec<usize> = self
            .params
            .iter()
            .enumerate()
            .filter(|(_, p)| p.kind <= ParameterKind::PositionalOrKeyword)
            .map(|(i, _)| i)
            .collect();
        let var_positional = self
            .params
            .iter()
            .position(|p| p.kind == ParameterKind::VarPositional);
        let var_keyword = self
            .params
            .iter()
            .position(|p| p.kind == ParameterKind::VarKeyword);

        let found = args.positional.len();
        for (i, value) in args.positional.into_iter().enumerate() {
            match positional_slots.get(i) {
                Some(&slot) => slots[slot] = Some(value),
                None if var_positional.is_some() => extra_positional.push(value),
                None => {
                    return Err(EvalError::TooManyPositional {
                        expected: positional_slots.len(),
                        found,
                    })
                }
            }
        }

        for (name, value) in args.keyword {
            let slot = self
                .params
                .iter()
                .position(|p| p.name == name && p.accepts_keyword());
            match slot {
                Some(slot) if slots[slot].is_some() => {
                    return Err(EvalError::DuplicateArgument { name })
                }
                Some(slot) => slots[slot] = Some(value),
                None if var_keyword.is_some() => {
                    if extra_keyword.iter().any(|(k, _): &(Value, Value)| k.as_str() == Some(&name)) {
                        return Err(EvalError::DuplicateArgument { name });
                    }
                    extra_keyword.push((Value::Str(name), value));
                }
                None => return Err(EvalError::UnexpectedArgument { name }),
            }
        }

        if let Some(slot) = var_positional {
            slots[slot] = Some(Value::Tuple(extra_positional));
        }
        if let Some(slot) = var_keyword {
            slots[slot] = Some(Value::Map(extra_keyword));
        }

        self.params
            .iter()
            .zip(slots)
            .map(|(param, slot)| {
                slot.map(|value| (param.name.clone(), value))
                    .ok_or_else(|| EvalError::MissingArgument {
                        name: param.name.clone(),
                    })
            })
            .collect()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(true))?;
        if let Some(annotation) = &self.return_annotation {
            write!(f, " -> {}", annotation)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ParameterKind::*;

    fn full() -> Signature {
        Signature::new(vec![
            Parameter::new("a", PositionalOnly),
            Parameter::new("b", PositionalOrKeyword).with_annotation("int"),
            Parameter::new("args", VarPositional),
            Parameter::new("c", KeywordOnly),
            Parameter::new("kwargs", VarKeyword),
        ])
        .unwrap()
    }

    #[test]
    fn test_render_strips_annotations() {
        let sig = full().with_return_annotation("str");
        assert_eq!(sig.render_parameters(), "(a, /, b, *args, c, **kwargs)");
        assert_eq!(sig.to_string(), "(a, /, b: int, *args, c, **kwargs) -> str");
    }

    #[test]
    fn test_render_inserts_keyword_marker() {
        let sig = Signature::new(vec![
            Parameter::positional("x"),
            Parameter::new("y", KeywordOnly),
        ])
        .unwrap();
        assert_eq!(sig.render_parameters(), "(x, *, y)");
    }

    #[test]
    fn test_validation() {
        assert!(Signature::positional(["x", "x"]).is_err());
        assert!(Signature::positional(["123bad"]).is_err());
        assert!(Signature::positional(["class"]).is_err());
        assert!(Signature::new(vec![
            Parameter::new("k", KeywordOnly),
            Parameter::positional("x"),
        ])
        .is_err());
        assert!(Signature::new(vec![
            Parameter::new("a", VarPositional),
            Parameter::new("b", VarPositional),
        ])
        .is_err());
        assert!(Signature::positional(Vec::<String>::new()).is_ok());
    }

    #[test]
    fn test_bind_distributes_arguments() {
        let args = CallArgs::positional([Value::from(1), Value::from(2), Value::from(3)])
            .with_keyword("c", 4)
            .with_keyword("d", 5);
        let bound = full().bind(args).unwrap();
        assert_eq!(
            bound,
            vec![
                ("a".to_string(), Value::from(1)),
                ("b".to_string(), Value::from(2)),
                ("args".to_string(), Value::Tuple(vec![Value::from(3)])),
                ("c".to_string(), Value::from(4)),
                ("kwargs".to_string(), Value::Map(vec![(Value::from("d"), Value::from(5))])),
            ]
        );
    }

    #[test]
    fn test_bind_errors() {
        let sig = Signature::positional(["x", "y"]).unwrap();
        assert_eq!(
            sig.bind(CallArgs::positional([Value::from(1)])),
            Err(EvalError::MissingArgument { name: "y".to_string() })
        );
        assert_eq!(
            sig.bind(CallArgs::positional([Value::from(1)]).with_keyword("x", 2)),
            Err(EvalError::DuplicateArgument { name: "x".to_string() })
        );
        assert_eq!(
            sig.bind(CallArgs::new().with_keyword("z", 2)),
            Err(EvalError::UnexpectedArgument { name: "z".to_string() })
        );
        assert_eq!(
            sig.bind(CallArgs::positional([Value::from(1), Value::from(2), Value::from(3)])),
            Err(EvalError::TooManyPositional { expected: 2, found: 3 })
        );
    }

    #[test]
    fn test_positional_only_rejects_keyword() {
        let sig = Signature::new(vec![Parameter::new("a", PositionalOnly)]).unwrap();
        assert_eq!(
            sig.bind(CallArgs::new().with_keyword("a", 1)),
            Err(EvalError::UnexpectedArgument { name: "a".to_string() })
        );
    }
}
