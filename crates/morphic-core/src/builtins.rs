//! Registry of named built-in functions
//!
//! Plans built from declarative documents reference callables by name; the
//! registry resolves those names to shared [`Function`] values so that two
//! references to the same name are the same function.

use crate::error::EvalError;
use crate::function::{CallArgs, Function};
use crate::value::Value;
use std::collections::BTreeMap;

/// Named functions available to declarative plans
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: BTreeMap<String, Function>,
}

impl FunctionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with the built-in functions
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Function::identity());
        registry.register(string_method("str_upper", str::to_uppercase));
        registry.register(string_method("str_lower", str::to_lowercase));
        registry.register(string_method("str_strip", |s| s.trim().to_string()));
        registry.register(Function::new("len", |args| {
            let value = args.single("len")?;
            let len = match &value {
                Value::Str(s) => s.chars().count(),
                Value::List(items) | Value::Tuple(items) => items.len(),
                Value::Map(entries) => entries.len(),
                other => {
                    return Err(EvalError::type_mismatch(
                        "sized value",
                        other.type_name(),
                        "len()",
                    ))
                }
            };
            Ok(Value::Int(len as i64))
        }));
        registry.register(Function::new("to_str", |args| {
            let value = args.single("to_str")?;
            Ok(match value {
                Value::Str(s) => Value::Str(s),
                other => Value::Str(other.to_string()),
            })
        }));
        registry.register(Function::new("to_int", |args| {
            let value = args.single("to_int")?;
            match &value {
                Value::Int(_) => Ok(value),
                Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
                Value::Float(f) if f.is_finite() => Ok(Value::Int(f.trunc() as i64)),
                Value::Str(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Value::Int)
                    .map_err(|e| EvalError::function("to_int", e)),
                other => Err(EvalError::type_mismatch("number or str", other.type_name(), "to_int()")),
            }
        }));
        registry.register(Function::new("to_float", |args| {
            let value = args.single("to_float")?;
            match &value {
                Value::Float(_) => Ok(value),
                Value::Int(n) => Ok(Value::Float(*n as f64)),
                Value::Str(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(Value::Float)
                    .map_err(|e| EvalError::function("to_float", e)),
                other => Err(EvalError::type_mismatch("number or str", other.type_name(), "to_float()")),
            }
        }));
        registry.register(Function::new("concat", |args| {
            let mut joined = String::new();
            for value in args.positional {
                match value {
                    Value::Str(s) => joined.push_str(&s),
                    other => joined.push_str(&other.to_string()),
                }
            }
            Ok(Value::Str(joined))
        }));
        registry.register(Function::new("make_list", |args| {
            if let Some((name, _)) = args.keyword.first() {
                return Err(EvalError::UnexpectedArgument { name: name.clone() });
            }
            Ok(Value::List(args.positional))
        }));
        registry.register(Function::new("make_tuple", |args| Ok(Value::Tuple(args.positional))));
        registry.register(Function::new("make_dict", |args: CallArgs| {
            if !args.positional.is_empty() {
                return Err(EvalError::Arity {
                    function: "make_dict".to_string(),
                    expected: 0,
                    found: args.positional.len(),
                });
            }
            Ok(Value::Map(
                args.keyword
                    .into_iter()
                    .map(|(k, v)| (Value::Str(k), v))
                    .collect(),
            ))
        }));
        registry
    }

    /// Register a named function, replacing any previous entry with that name.
    /// Anonymous functions cannot be registered and are ignored.
    pub fn register(&mut self, function: Function) -> &mut Self {
        match function.name() {
            Some(name) => {
                self.functions.insert(name.to_string(), function);
            }
            None => tracing::warn!("ignoring registration of an anonymous function"),
        }
        self
    }

    /// Register a function under an explicit alias
    pub fn register_as(&mut self, alias: impl Into<String>, function: Function) -> &mut Self {
        self.functions.insert(alias.into(), function);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

fn string_method(name: &'static str, op: fn(&str) -> String) -> Function {
    Function::new(name, move |args| match args.single(name)? {
        Value::Str(s) => Ok(Value::Str(op(&s))),
        other => Err(EvalError::type_mismatch("str", other.type_name(), format!("{}()", name))),
    })
}
