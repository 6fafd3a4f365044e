//! Boundary types shared with the script interpreter, event manager, and
//! object runtime.
//!
//! The interpreter, event manager, and object runtime live outside this
//! crate; these types are the shape their data takes when it crosses a
//! hook boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A script-level value.
///
/// Values are owned; a hook that returns one transfers ownership to the
/// receiver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Val(serde_json::Value);

impl Val {
    /// Create a value from any JSON-representable payload.
    pub fn new(data: impl Into<serde_json::Value>) -> Self {
        Self(data.into())
    }

    /// The nil value.
    pub fn nil() -> Self {
        Self(serde_json::Value::Null)
    }

    /// Borrow the underlying payload.
    pub fn data(&self) -> &serde_json::Value {
        &self.0
    }

    /// Consume the value, yielding its payload.
    pub fn into_data(self) -> serde_json::Value {
        self.0
    }
}

impl From<serde_json::Value> for Val {
    fn from(data: serde_json::Value) -> Self {
        Self(data)
    }
}

impl fmt::Display for Val {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An argument list for a function call or event.
pub type ValList = Vec<Val>;

/// Identity of a script-level function, event handler body, or hook body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Func {
    name: String,
}

impl Func {
    /// Create a function identity from its fully qualified name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The fully qualified function name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Identity of the interpreter call frame a function executes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Frame {
    depth: u32,
}

impl Frame {
    /// Create a frame identity at the given call depth.
    pub fn new(depth: u32) -> Self {
        Self { depth }
    }

    /// Call depth of this frame.
    pub fn depth(&self) -> u32 {
        self.depth
    }
}

/// An event about to be queued for later execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    name: String,
    args: ValList,
}

impl Event {
    /// Create an event for the named handler with its argument values.
    pub fn new(name: impl Into<String>, args: ValList) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// The handler name the event targets.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The event's argument values.
    pub fn args(&self) -> &[Val] {
        &self.args
    }

    /// Mutable access to the argument values.
    pub fn args_mut(&mut self) -> &mut ValList {
        &mut self.args
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event {}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")
    }
}

/// Identity token for an object managed by the object runtime.
///
/// By the time a destruction notification carries one of these, the object
/// behind it is already gone; the token is only good for identity
/// comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjToken(u64);

impl ObjToken {
    /// Wrap a raw object identity.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw identity value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Kind of an externally visible script-level item a plugin declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptItemKind {
    Function,
    Event,
    Constant,
    Global,
    Type,
}

impl fmt::Display for ScriptItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function => write!(f, "function"),
            Self::Event => write!(f, "event"),
            Self::Constant => write!(f, "constant"),
            Self::Global => write!(f, "global"),
            Self::Type => write!(f, "type"),
        }
    }
}

/// Declarative record of a script-level item a plugin provides.
///
/// Purely informational: declaring an item does not register it with the
/// interpreter, the plugin does that separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptItem {
    id: String,
    kind: ScriptItemKind,
}

impl ScriptItem {
    /// Create an item record from its fully qualified id and kind.
    pub fn new(id: impl Into<String>, kind: ScriptItemKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }

    /// The fully qualified script-level id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The item's kind.
    pub fn kind(&self) -> ScriptItemKind {
        self.kind
    }
}

impl fmt::Display for ScriptItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.id)
    }
}
