use time::{UtcOffset, format_description::well_known::Rfc3339};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, format::FmtSpan, time::OffsetTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::logger::{config::LoggerConfig, error::LoggerError, format::LoggerFormat};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Build the registry for `cfg` and install it as the global default.
pub(crate) fn install(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    let filter = mk_filter(&cfg.level)?;
    tracing_subscriber::registry()
        .with(mk_layer(cfg))
        .with(filter)
        .try_init()
        .map_err(classify)
}

fn mk_layer(cfg: &LoggerConfig) -> BoxedLayer {
    let spans = if cfg.span_timings {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    match cfg.format {
        LoggerFormat::Text => fmt::layer()
            .with_ansi(cfg.use_color)
            .with_target(cfg.with_targets)
            .with_thread_names(cfg.with_thread_names)
            .with_span_events(spans)
            .with_timer(local_rfc3339())
            .boxed(),
        LoggerFormat::Json => fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_ansi(false)
            .with_target(cfg.with_targets)
            .with_thread_names(cfg.with_thread_names)
            .with_span_events(spans)
            .with_timer(local_rfc3339())
            .boxed(),
    }
}

fn mk_filter(level: &str) -> Result<EnvFilter, LoggerError> {
    EnvFilter::try_new(level).map_err(|_| LoggerError::InvalidLogLevel(level.to_string()))
}

fn local_rfc3339() -> OffsetTime<Rfc3339> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetTime::new(offset, Rfc3339)
}

fn classify(e: impl std::fmt::Display) -> LoggerError {
    let s = e.to_string();
    if s.contains("global default") || s.contains("SetGlobalDefaultError") {
        LoggerError::AlreadyInitialized
    } else {
        LoggerError::InitializationFailed(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::fmt::{format::Writer, time::FormatTime};

    #[test]
    fn invalid_level_is_reported() {
        let cfg = LoggerConfig {
            level: "taskflow=verbose".to_string(),
            ..Default::default()
        };
        assert_eq!(
            install(&cfg),
            Err(LoggerError::InvalidLogLevel("taskflow=verbose".to_string()))
        );
    }

    #[test]
    fn second_install_fails() {
        let cfg = LoggerConfig {
            level: "debug".to_string(),
            format: LoggerFormat::Json,
            ..Default::default()
        };
        let first = install(&cfg);
        let second = install(&LoggerConfig::default());

        // Another test in this binary may have installed a subscriber first.
        assert!(first.is_ok() || first == Err(LoggerError::AlreadyInitialized));
        assert_eq!(second, Err(LoggerError::AlreadyInitialized));
    }

    #[test]
    fn unrelated_errors_are_kept_verbatim() {
        assert_eq!(
            classify("boom"),
            LoggerError::InitializationFailed("boom".to_string())
        );
    }

    #[test]
    fn timestamps_are_rfc3339() {
        let mut out = String::new();
        local_rfc3339()
            .format_time(&mut Writer::new(&mut out))
            .unwrap();

        let (date, rest) = out.split_once('T').unwrap();
        assert_eq!(date.len(), 10);
        assert!(rest.ends_with('Z') || rest.contains('+') || rest.contains('-'));
    }

    #[test]
    fn both_formats_build_a_layer() {
        for format in [LoggerFormat::Text, LoggerFormat::Json] {
            let cfg = LoggerConfig {
                format,
                span_timings: true,
                ..Default::default()
            };
            let _layer = mk_layer(&cfg);
        }
    }
}
