//! Components: named capabilities plugins contribute to engine subsystems.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The engine subsystem a component plugs into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    /// Protocol analyzer
    Analyzer,
    /// File content analyzer
    FileAnalyzer,
    /// Log output writer
    LogWriter,
    /// Input stream reader
    InputReader,
    /// Packet or timer I/O source
    IoSource,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Analyzer => write!(f, "analyzer"),
            Self::FileAnalyzer => write!(f, "file analyzer"),
            Self::LogWriter => write!(f, "log writer"),
            Self::InputReader => write!(f, "input reader"),
            Self::IoSource => write!(f, "I/O source"),
        }
    }
}

/// A self-contained capability a plugin contributes to one engine
/// subsystem.
///
/// The plugin exclusively owns every component it registers; callers only
/// ever see shared handles to the registered set.
pub trait Component: Send + Sync {
    /// The subsystem this component belongs to.
    fn kind(&self) -> ComponentKind;

    /// The component's name, unique within its subsystem.
    fn name(&self) -> &str;

    /// One-line diagnostic rendering.
    fn describe(&self) -> String {
        format!("[{}] {}", self.kind(), self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestAnalyzer;

    impl Component for TestAnalyzer {
        fn kind(&self) -> ComponentKind {
            ComponentKind::Analyzer
        }

        fn name(&self) -> &str {
            "RPC"
        }
    }

    #[test]
    fn test_describe_default() {
        assert_eq!(TestAnalyzer.describe(), "[analyzer] RPC");
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ComponentKind::LogWriter.to_string(), "log writer");
    }
}
