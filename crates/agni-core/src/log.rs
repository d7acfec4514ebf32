use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::CoreError;

/// Log severities in increasing order of urgency, matching `spec.md` §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Panic,
    Fatal,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Panic => "PANIC",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// `/admin/log/setlevel?level=...`: fatal and panic clamp to ERROR when
    /// used as a *filter threshold*, per `spec.md` §4.3's route table.
    pub fn clamp_for_filter(self) -> LogLevel {
        match self {
            LogLevel::Fatal | LogLevel::Panic => LogLevel::Error,
            other => other,
        }
    }
}

impl FromStr for LogLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "panic" => Ok(LogLevel::Panic),
            "fatal" => Ok(LogLevel::Fatal),
            other => Err(CoreError::InvalidLogLevel(other.to_string())),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry handed to the logger sink: text plus a level. Routing to
/// the error/warn/info/debug sink happens per `spec.md` §4.2.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogMessage {
    pub text: String,
    pub level: LogLevel,
}

impl LogMessage {
    pub fn new(level: LogLevel, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level,
        }
    }

    /// PANIC entries are prefixed in the rendered line, per `spec.md` §4.2
    /// ("PANIC prefixed with `**PANIC**`").
    pub fn rendered_text(&self) -> String {
        if self.level == LogLevel::Panic {
            format!("**PANIC** {}", self.text)
        } else {
            self.text.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Warn".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("ERROR".parse::<LogLevel>().unwrap(), LogLevel::Error);
    }

    #[test]
    fn rejects_unknown_level() {
        assert!("trace".parse::<LogLevel>().is_err());
    }

    #[test]
    fn fatal_and_panic_clamp_to_error() {
        assert_eq!(LogLevel::Fatal.clamp_for_filter(), LogLevel::Error);
        assert_eq!(LogLevel::Panic.clamp_for_filter(), LogLevel::Error);
        assert_eq!(LogLevel::Warn.clamp_for_filter(), LogLevel::Warn);
    }

    #[test]
    fn panic_messages_get_prefixed() {
        let msg = LogMessage::new(LogLevel::Panic, "boom");
        assert_eq!(msg.rendered_text(), "**PANIC** boom");
    }
}
