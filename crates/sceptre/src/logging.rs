use colored::{ColoredString, Colorize};
use std::{
    fmt,
    time::{Duration, SystemTimeError},
};
use tracing::{Event, Subscriber};
use tracing_subscriber::{
    fmt::{FmtContext, FormatEvent, FormatFields, format},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

/// Colour thresholds for durations: below the yellow threshold durations are dimmed, above the red one they are red.
pub struct FormatElapsedTimeOptions {
    pub(crate) sec_yellow_threshold: u64,
    pub(crate) sec_red_threshold: u64,
    pub(crate) millis_yellow_threshold: Option<u128>,
    pub(crate) millis_red_threshold: Option<u128>,
}

impl Default for FormatElapsedTimeOptions {
    fn default() -> Self {
        Self {
            sec_yellow_threshold: 1,
            sec_red_threshold: 2,
            millis_yellow_threshold: Some(100),
            millis_red_threshold: Some(500),
        }
    }
}

impl FormatElapsedTimeOptions {
    /// Thresholds for server startup, which is expected to take a bit longer than a request.
    pub fn default_startup() -> Self {
        Self {
            millis_yellow_threshold: Some(500),
            millis_red_threshold: Some(1000),
            ..Default::default()
        }
    }
}

pub fn format_elapsed_time(
    elapsed: Result<Duration, SystemTimeError>,
    options: &FormatElapsedTimeOptions,
) -> Result<ColoredString, SystemTimeError> {
    let elapsed = elapsed?;

    let result = match elapsed.as_secs() {
        secs if secs > 60 => {
            let mins = secs / 60;
            let secs = secs % 60;
            format!("{}m{}s", mins, secs).red()
        }
        secs if secs > options.sec_red_threshold => format!("{}s", secs).red(),
        secs if secs > options.sec_yellow_threshold => format!("{}s", secs).yellow(),
        secs if secs > 0 => format!("{}s", secs).dimmed(),
        _ => match elapsed.as_millis() {
            millis
                if options
                    .millis_red_threshold
                    .is_some_and(|threshold| millis > threshold) =>
            {
                format!("{}ms", millis).red()
            }
            millis
                if options
                    .millis_yellow_threshold
                    .is_some_and(|threshold| millis > threshold) =>
            {
                format!("{}ms", millis).yellow()
            }
            millis if millis > 0 => format!("{}ms", millis).dimmed(),
            _ => format!("{}μs", elapsed.as_micros()).dimmed(),
        },
    };

    Ok(result)
}

/// Formats events as `HH:MM:SS name message`. Events named `SKIP_FORMAT` are printed as-is.
pub struct EventLoggerFormatter;

impl<S, N> FormatEvent<S, N> for EventLoggerFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        if std::env::args().any(|arg| arg == "--quiet") {
            return Ok(());
        }

        if event.metadata().name() == "SKIP_FORMAT" {
            ctx.field_format().format_fields(writer.by_ref(), event)?;
            return writeln!(writer);
        }

        let timestamp = chrono::Local::now().format("%H:%M:%S").to_string().dimmed();
        let event_name = event.metadata().name();

        // Unnamed events get a name like `event src/lib.rs:12`, which is just noise here
        let event_name = if event_name.starts_with("event ") {
            ""
        } else {
            event_name
        };

        let event_name = match *event.metadata().level() {
            tracing::Level::ERROR => event_name.to_ascii_lowercase().bold().bright_red(),
            tracing::Level::WARN => event_name.to_ascii_lowercase().bold().yellow(),
            _ => event_name.to_ascii_lowercase().bold().bright_yellow(),
        };

        write!(
            writer,
            "{}{} ",
            timestamp,
            if event_name.is_empty() {
                String::new()
            } else {
                format!(" {}", event_name)
            }
        )?;

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

/// Installs a global subscriber using [`EventLoggerFormatter`], logging `app` and Sceptre at `info` level.
/// `RUST_LOG` takes precedence over the default filter.
pub fn init_logging(app: &str) {
    let tracing_formatter = tracing_subscriber::fmt::layer().event_format(EventLoggerFormatter);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{app}=info,sceptre=info,tower_http=info").into()
            }),
        )
        .with(tracing_formatter)
        .init();
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{FormatElapsedTimeOptions, format_elapsed_time};

    fn plain(duration: Duration, options: &FormatElapsedTimeOptions) -> String {
        colored::control::set_override(false);
        format_elapsed_time(Ok(duration), options).unwrap().to_string()
    }

    #[test]
    fn test_format_elapsed_time_units() {
        let options = FormatElapsedTimeOptions::default();

        assert_eq!(plain(Duration::from_micros(250), &options), "250μs");
        assert_eq!(plain(Duration::from_millis(42), &options), "42ms");
        assert_eq!(plain(Duration::from_secs(3), &options), "3s");
        assert_eq!(plain(Duration::from_secs(125), &options), "2m5s");
    }
}
