//! Callable values
//!
//! A [`Function`] is either the designated identity function, which the
//! synthesizer recognizes and optimizes away, or a native Rust closure.

use crate::error::EvalError;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Signature of native function bodies
pub type NativeFn = dyn Fn(CallArgs) -> Result<Value, EvalError> + Send + Sync;

/// Name carried by [`Function::identity`]
pub const IDENTITY_NAME: &str = "identity";

/// Arguments of a single call, in source order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    pub positional: Vec<Value>,
    pub keyword: Vec<(String, Value)>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn positional(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            positional: values.into_iter().collect(),
            keyword: Vec::new(),
        }
    }

    pub fn with_keyword(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.push((name.into(), value.into()));
        self
    }

    /// Take exactly one positional argument and no keywords
    pub fn single(self, function: &str) -> Result<Value, EvalError> {
        if let Some((name, _)) = self.keyword.first() {
            return Err(EvalError::UnexpectedArgument { name: name.clone() });
        }
        match <[Value; 1]>::try_from(self.positional) {
            Ok([value]) => Ok(value),
            Err(values) => Err(EvalError::Arity {
                function: function.to_string(),
                expected: 1,
                found: values.len(),
            }),
        }
    }
}

#[derive(Clone)]
enum FunctionBody {
    Identity,
    Native(Arc<NativeFn>),
}

/// A named or anonymous callable value
#[derive(Clone)]
pub struct Function {
    name: Option<Arc<str>>,
    body: FunctionBody,
}

impl Function {
    /// Create a named native function
    pub fn new<F>(name: impl AsRef<str>, body: F) -> Self
    where
        F: Fn(CallArgs) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        Self {
            name: Some(Arc::from(name.as_ref())),
            body: FunctionBody::Native(Arc::new(body)),
        }
    }

    /// Create a native function without a declared name
    pub fn anonymous<F>(body: F) -> Self
    where
        F: Fn(CallArgs) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        Self {
            name: None,
            body: FunctionBody::Native(Arc::new(body)),
        }
    }

    /// The designated identity function; calls with a single positional
    /// argument to it are removed during synthesis
    pub fn identity() -> Self {
        Self {
            name: Some(Arc::from(IDENTITY_NAME)),
            body: FunctionBody::Identity,
        }
    }

    /// Anonymous getter performing `target[key]`
    pub fn item_getter(key: Value) -> Self {
        Self::anonymous(move |args| args.single("itemgetter")?.get_item(&key))
    }

    /// Anonymous getter performing `target.name`
    pub fn attr_getter(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::anonymous(move |args| args.single("attrgetter")?.get_attr(&name))
    }

    /// Chain single-argument functions left to right
    pub fn compose(functions: Vec<Function>) -> Self {
        if functions.iter().all(Function::is_identity) {
            return Self::identity();
        }
        Self::anonymous(move |args| {
            let mut value = args.single("composition")?;
            for function in &functions {
                value = function.call(CallArgs::positional([value]))?;
            }
            Ok(value)
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_identity(&self) -> bool {
        matches!(self.body, FunctionBody::Identity)
    }

    /// Identity comparison: all identity functions are the same function,
    /// native functions are the same only when they share a body
    pub fn is_same(&self, other: &Function) -> bool {
        match (&self.body, &other.body) {
            (FunctionBody::Identity, FunctionBody::Identity) => true,
            (FunctionBody::Native(a), FunctionBody::Native(b)) => {
                Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
            }
            _ => false,
        }
    }

    pub fn call(&self, args: CallArgs) -> Result<Value, EvalError> {
        match &self.body {
            FunctionBody::Identity => args.single(IDENTITY_NAME),
            FunctionBody::Native(body) => body(args),
        }
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.is_same(other)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name())
            .field("identity", &self.is_identity())
            .finish()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "<function {}>", name),
            None => f.write_str("<function>"),
        }
    }
}
