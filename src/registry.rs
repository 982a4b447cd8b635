//! # Function Registry
//!
//! A process-wide mapping from function names (possibly multi-word, e.g.
//! `date and time of birth`) to callable bindings. Two binding kinds exist:
//!
//! - **Invocation**: a host-defined [`Invocation`] trait object, optionally
//!   carrying an [`InputSchema`] that is validated before every call.
//!   Invocations self-register at link time through `inventory`.
//! - **Host function**: a plain function pointer registered at startup.
//!
//! The registry is an explicit value threaded into the evaluator; [`global`]
//! is the thin process-wide wrapper most callers use. Registration happens at
//! program startup; [`Registry::clear`] exists for test isolation.

use crate::error::EvalError;
use crate::value::Value;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

/// Arguments to a registered function: exactly one of the two forms.
#[derive(Debug, Clone, PartialEq)]
pub enum Arguments {
    Positional(Vec<Value>),
    Named(IndexMap<String, Value>),
}

impl Arguments {
    pub fn empty() -> Arguments {
        Arguments::Positional(Vec::new())
    }

    pub fn len(&self) -> usize {
        match self {
            Arguments::Positional(values) => values.len(),
            Arguments::Named(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch an argument by position or, in named form, by name.
    pub fn get(&self, index: usize, name: &str) -> Option<&Value> {
        match self {
            Arguments::Positional(values) => values.get(index),
            Arguments::Named(map) => map.get(name),
        }
    }
}

/// Declared type of a schema field, matched against value variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Number,
    String,
    Bool,
    Date,
    Time,
    DateTime,
    List,
    Context,
    Range,
    Any,
}

impl TypeTag {
    fn name(self) -> &'static str {
        match self {
            TypeTag::Number => "number",
            TypeTag::String => "string",
            TypeTag::Bool => "boolean",
            TypeTag::Date => "date",
            TypeTag::Time => "time",
            TypeTag::DateTime => "date and time",
            TypeTag::List => "list",
            TypeTag::Context => "context",
            TypeTag::Range => "range",
            TypeTag::Any => "any",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            TypeTag::Number => matches!(value, Value::Number(_)),
            TypeTag::String => matches!(value, Value::Str(_)),
            TypeTag::Bool => matches!(value, Value::Bool(_)),
            TypeTag::Date => matches!(value, Value::Date(_)),
            TypeTag::Time => matches!(value, Value::Time(_)),
            TypeTag::DateTime => matches!(value, Value::DateTime(_)),
            TypeTag::List => matches!(value, Value::List(_)),
            TypeTag::Context => matches!(value, Value::Context(_)),
            TypeTag::Range => matches!(value, Value::Range(_)),
            TypeTag::Any => true,
        }
    }
}

/// One declared input of an invocation.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub ty: TypeTag,
    pub required: bool,
}

/// Declarative input schema for an invocation: field names with types, and an
/// optional ordering used to map positional arguments onto field names.
#[derive(Debug, Clone, Copy)]
pub struct InputSchema {
    pub fields: &'static [Field],
    pub ordering: Option<&'static [&'static str]>,
}

impl InputSchema {
    /// Validate arguments against the schema. Positional arguments are
    /// zipped onto the ordering (absent ordering means no positional
    /// validation); excess positional arguments fail. Named arguments not
    /// declared as fields are ignored and passed through.
    pub fn validate(&self, args: &Arguments) -> Result<(), EvalError> {
        if args.is_empty() {
            return Ok(());
        }
        match args {
            Arguments::Positional(values) => {
                let Some(ordering) = self.ordering else {
                    return Ok(());
                };
                if values.len() > ordering.len() {
                    return Err(EvalError::validation(format!(
                        "too many arguments: expected at most {}, got {}",
                        ordering.len(),
                        values.len()
                    )));
                }
                let params: Vec<(&str, &Value)> =
                    ordering.iter().zip(values).map(|(n, v)| (*n, v)).collect();
                self.check_fields(&params)
            }
            Arguments::Named(map) => {
                let params: Vec<(&str, &Value)> =
                    map.iter().map(|(k, v)| (k.as_str(), v)).collect();
                self.check_fields(&params)
            }
        }
    }

    fn check_fields(&self, params: &[(&str, &Value)]) -> Result<(), EvalError> {
        for field in self.fields {
            match params.iter().find(|(name, _)| *name == field.name) {
                Some((_, value)) => {
                    if !field.ty.matches(value) {
                        return Err(EvalError::validation(format!(
                            "input {:?} expects {}, got {}",
                            field.name,
                            field.ty.name(),
                            value.type_name()
                        )));
                    }
                }
                None if field.required => {
                    return Err(EvalError::validation(format!(
                        "missing required input {:?}",
                        field.name
                    )));
                }
                None => {}
            }
        }
        Ok(())
    }
}

/// A host-defined callable with a declared name and optional input schema.
pub trait Invocation: Send + Sync {
    /// Schema validated before every call; `None` skips validation.
    fn inputs(&self) -> Option<&InputSchema> {
        None
    }

    fn invoke(&self, args: Arguments) -> Result<Value, EvalError>;
}

/// An inventory submission: a named invocation collected into the global
/// registry the first time it is built.
pub struct RegisteredInvocation {
    pub name: &'static str,
    pub invocation: &'static dyn Invocation,
}

inventory::collect!(RegisteredInvocation);

/// A plain host function registered under a name.
pub type HostFn = fn(Arguments) -> Result<Value, EvalError>;

/// A registry entry: an invocation trait object or a host function pointer.
#[derive(Clone, Copy)]
pub enum FunctionBinding {
    Invocation(&'static dyn Invocation),
    Host(HostFn),
}

impl FunctionBinding {
    /// Invoke the binding. Invocations validate their schema first.
    pub fn call(&self, args: Arguments) -> Result<Value, EvalError> {
        match self {
            FunctionBinding::Invocation(invocation) => {
                if let Some(schema) = invocation.inputs() {
                    schema.validate(&args)?;
                }
                invocation.invoke(args)
            }
            FunctionBinding::Host(func) => func(args),
        }
    }
}

/// The function registry: a name→binding mapping.
#[derive(Default)]
pub struct Registry {
    funcs: HashMap<String, FunctionBinding>,
}

impl Registry {
    /// An empty registry
    pub fn new() -> Registry {
        Registry::default()
    }

    /// Build a registry from every `inventory`-submitted invocation.
    /// A duplicate name is a programming error and fatal.
    pub fn with_submitted() -> Registry {
        let mut registry = Registry::new();
        for entry in inventory::iter::<RegisteredInvocation> {
            if registry
                .funcs
                .insert(entry.name.to_string(), FunctionBinding::Invocation(entry.invocation))
                .is_some()
            {
                panic!("function register error: duplicate registration for {:?}", entry.name);
            }
        }
        registry
    }

    pub fn register_invocation(
        &mut self,
        name: &str,
        invocation: &'static dyn Invocation,
    ) -> Result<(), EvalError> {
        self.insert(name, FunctionBinding::Invocation(invocation))
    }

    pub fn register_host_fn(&mut self, name: &str, func: HostFn) -> Result<(), EvalError> {
        self.insert(name, FunctionBinding::Host(func))
    }

    /// Bulk registration of host functions; any name collision fails the
    /// whole call.
    pub fn register_host_fns(&mut self, funcs: &[(&str, HostFn)]) -> Result<(), EvalError> {
        for (name, func) in funcs {
            self.register_host_fn(name, *func)?;
        }
        Ok(())
    }

    fn insert(&mut self, name: &str, binding: FunctionBinding) -> Result<(), EvalError> {
        if self.funcs.contains_key(name) {
            return Err(EvalError::validation(format!(
                "function register error: {:?} is already registered",
                name
            )));
        }
        self.funcs.insert(name.to_string(), binding);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&FunctionBinding> {
        self.funcs.get(name)
    }

    /// Empties the registry. Teardown hook for test isolation.
    pub fn clear(&mut self) {
        self.funcs.clear();
    }
}

/// The process-wide registry, built on first access from all
/// `inventory`-submitted invocations.
pub fn global() -> &'static RwLock<Registry> {
    static REGISTRY: OnceLock<RwLock<Registry>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(Registry::with_submitted()))
}
