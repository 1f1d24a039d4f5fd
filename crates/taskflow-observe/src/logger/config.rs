use std::io::IsTerminal;

use crate::logger::{error::LoggerError, format::LoggerFormat};

pub const ENV_LOG_LEVEL: &str = "TASKFLOW_LOG";
pub const ENV_LOG_FORMAT: &str = "TASKFLOW_LOG_FORMAT";

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// `EnvFilter` directive, e.g. `info` or `taskflow_core=debug`.
    pub level: String,
    pub with_targets: bool,
    /// Include the runtime thread name, handy when following individual workers.
    pub with_thread_names: bool,
    /// Emit an event with busy/idle timings when an instrumented span closes.
    pub span_timings: bool,
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        let use_color = cfg!(test) || std::io::stdout().is_terminal();
        Self {
            format: LoggerFormat::Text,
            level: "info".to_string(),
            with_targets: true,
            with_thread_names: false,
            span_timings: false,
            use_color,
        }
    }
}

impl LoggerConfig {
    /// Defaults overridden by `TASKFLOW_LOG` and `TASKFLOW_LOG_FORMAT`.
    pub fn from_env() -> Result<Self, LoggerError> {
        let mut cfg = Self::default();
        if let Ok(level) = std::env::var(ENV_LOG_LEVEL) {
            cfg.level = level;
        }
        if let Ok(format) = std::env::var(ENV_LOG_FORMAT) {
            cfg.format = format.parse()?;
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = LoggerConfig::default();
        assert_eq!(cfg.format, LoggerFormat::Text);
        assert_eq!(cfg.level, "info");
        assert!(cfg.with_targets);
        assert!(!cfg.span_timings);
        assert!(cfg.use_color);
    }
}
