//! Values exchanged between route modules.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::http::Handler;

/// A value a module exports or a context carries.
#[derive(Clone, Default)]
pub enum Value {
    /// Absent or discarded.
    #[default]
    Null,
    /// Plain data (flags, settings, the environment map).
    Data(serde_json::Value),
    /// A request handler.
    Handler(Handler),
    /// Any shared typed value: pools, clients, helper structs.
    Shared(Arc<dyn Any + Send + Sync>),
}

impl Value {
    pub fn shared<T: Any + Send + Sync>(value: T) -> Self {
        Value::Shared(Arc::new(value))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Handler(_))
    }

    pub fn as_data(&self) -> Option<&serde_json::Value> {
        match self {
            Value::Data(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_handler(&self) -> Option<&Handler> {
        match self {
            Value::Handler(handler) => Some(handler),
            _ => None,
        }
    }

    pub fn into_handler(self) -> Option<Handler> {
        match self {
            Value::Handler(handler) => Some(handler),
            _ => None,
        }
    }

    /// Typed view of a `Shared` value.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match self {
            Value::Shared(shared) => shared.clone().downcast::<T>().ok(),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Data(_) => "data",
            Value::Handler(_) => "handler",
            Value::Shared(_) => "shared value",
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Data(data) => f.debug_tuple("Data").field(data).finish(),
            Value::Handler(handler) => f.debug_tuple("Handler").field(handler).finish(),
            Value::Shared(_) => f.write_str("Shared(..)"),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(data: serde_json::Value) -> Self {
        Value::Data(data)
    }
}

impl From<Handler> for Value {
    fn from(handler: Handler) -> Self {
        Value::Handler(handler)
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Data(flag.into())
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Data(text.into())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Data(text.into())
    }
}

impl From<i64> for Value {
    fn from(number: i64) -> Self {
        Value::Data(number.into())
    }
}
