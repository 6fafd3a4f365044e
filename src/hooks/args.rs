//! Uniform hook arguments passed to meta hooks.

use std::fmt;

use crate::hooks::types::FuncResult;
use crate::script::{Event, Frame, Func, ObjToken, Val};

/// One argument of a hook invocation, as seen by meta hooks.
///
/// Reference variants borrow from the objects the dispatcher was handed;
/// the list never outlives the hook pass it was built for. `FuncResult` is
/// the one owning variant: it carries the value a handled call produced.
///
/// Accessing the payload through the wrong accessor is a programming fault
/// and panics; consumers who want compile-time totality can `match`
/// exhaustively instead.
#[derive(Debug, Clone)]
pub enum HookArgument<'a> {
    Bool(bool),
    Double(f64),
    Event(&'a Event),
    Frame(&'a Frame),
    Func(&'a Func),
    FuncResult(FuncResult),
    Int(i64),
    String(String),
    Val(&'a Val),
    ValList(&'a [Val]),
    Void,
    Ptr(ObjToken),
}

/// The uniform argument list the dispatcher builds from a hook's actual
/// parameters.
pub type HookArgumentList<'a> = Vec<HookArgument<'a>>;

impl<'a> HookArgument<'a> {
    /// Name of the argument's tag, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Double(_) => "double",
            Self::Event(_) => "event",
            Self::Frame(_) => "frame",
            Self::Func(_) => "func",
            Self::FuncResult(_) => "func_result",
            Self::Int(_) => "int",
            Self::String(_) => "string",
            Self::Val(_) => "val",
            Self::ValList(_) => "val_list",
            Self::Void => "void",
            Self::Ptr(_) => "ptr",
        }
    }

    /// The boolean payload. The tag must match.
    pub fn as_bool(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            other => mismatch("bool", other),
        }
    }

    /// The double payload. The tag must match.
    pub fn as_double(&self) -> f64 {
        match self {
            Self::Double(d) => *d,
            other => mismatch("double", other),
        }
    }

    /// The event payload. The tag must match.
    pub fn as_event(&self) -> &'a Event {
        match self {
            Self::Event(e) => *e,
            other => mismatch("event", other),
        }
    }

    /// The frame payload. The tag must match.
    pub fn as_frame(&self) -> &'a Frame {
        match self {
            Self::Frame(fr) => *fr,
            other => mismatch("frame", other),
        }
    }

    /// The function payload. The tag must match.
    pub fn as_func(&self) -> &'a Func {
        match self {
            Self::Func(fu) => *fu,
            other => mismatch("func", other),
        }
    }

    /// The function-result payload. The tag must match.
    pub fn as_func_result(&self) -> &FuncResult {
        match self {
            Self::FuncResult(r) => r,
            other => mismatch("func_result", other),
        }
    }

    /// The integer payload. The tag must match.
    pub fn as_int(&self) -> i64 {
        match self {
            Self::Int(i) => *i,
            other => mismatch("int", other),
        }
    }

    /// The string payload. The tag must match.
    pub fn as_str(&self) -> &str {
        match self {
            Self::String(s) => s,
            other => mismatch("string", other),
        }
    }

    /// The value payload. The tag must match.
    pub fn as_val(&self) -> &'a Val {
        match self {
            Self::Val(v) => *v,
            other => mismatch("val", other),
        }
    }

    /// The value-list payload. The tag must match.
    pub fn as_val_list(&self) -> &'a [Val] {
        match self {
            Self::ValList(vs) => *vs,
            other => mismatch("val_list", other),
        }
    }

    /// The object token payload. The tag must match.
    pub fn as_ptr(&self) -> ObjToken {
        match self {
            Self::Ptr(t) => *t,
            other => mismatch("ptr", other),
        }
    }
}

fn mismatch(expected: &str, found: &HookArgument<'_>) -> ! {
    panic!(
        "hook argument type mismatch: expected {expected}, found {}",
        found.type_name()
    );
}

impl fmt::Display for HookArgument<'_> {
    /// Deterministic diagnostic rendering. Not round-trippable.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Double(d) => write!(f, "{d}"),
            Self::Event(e) => write!(f, "{e}"),
            Self::Frame(fr) => write!(f, "<frame depth {}>", fr.depth()),
            Self::Func(fu) => write!(f, "function {fu}"),
            Self::FuncResult(FuncResult::Unhandled) => write!(f, "<no result>"),
            Self::FuncResult(FuncResult::Handled(v)) => write!(f, "{v}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Val(v) => write!(f, "{v}"),
            Self::ValList(vs) => {
                write!(f, "(")?;
                for (i, v) in vs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, ")")
            }
            Self::Void => write!(f, "<void>"),
            Self::Ptr(t) => write!(f, "{t}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::ValList;

    #[test]
    fn test_accessors() {
        assert!(HookArgument::Bool(true).as_bool());
        assert_eq!(HookArgument::Int(-3).as_int(), -3);
        assert_eq!(HookArgument::String("x.sn".into()).as_str(), "x.sn");
        assert_eq!(HookArgument::Ptr(ObjToken::new(9)).as_ptr(), ObjToken::new(9));

        let func = Func::new("Example::hello");
        assert_eq!(HookArgument::Func(&func).as_func().name(), "Example::hello");

        let result = FuncResult::handled(Val::new(1));
        assert!(HookArgument::FuncResult(result).as_func_result().is_handled());
    }

    #[test]
    #[should_panic(expected = "hook argument type mismatch")]
    fn test_wrong_tag_is_a_fault() {
        HookArgument::Int(1).as_bool();
    }

    #[test]
    fn test_display() {
        assert_eq!(HookArgument::Void.to_string(), "<void>");
        assert_eq!(HookArgument::Bool(false).to_string(), "false");
        assert_eq!(
            HookArgument::FuncResult(FuncResult::Unhandled).to_string(),
            "<no result>"
        );

        let vals: ValList = vec![Val::new(1), Val::new("a")];
        assert_eq!(HookArgument::ValList(&vals).to_string(), "(1, \"a\")");

        let ev = Event::new("seine_ping", vec![Val::new(2)]);
        assert_eq!(HookArgument::Event(&ev).to_string(), "event seine_ping(2)");
    }
}
