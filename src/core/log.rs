/*
 * SPDX-FileCopyrightText: 2025 Sven Shi
 * SPDX-License-Identifier: GPL-3.0-or-later
 */

//! Logging setup with a custom event formatter.
//!
//! Console output is always enabled; file output is optional and
//! non-blocking. The returned guard must be kept alive to flush logs on
//! shutdown.

use crate::config::LogConfig;
use chrono::Local;
use std::fmt;
use tracing::{Event, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::{format, FmtContext, FormatEvent, FormatFields, FormattedFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as fmt_layer, EnvFilter, Registry};

pub struct ChainDnsLogFormatter;

impl<S, N> FormatEvent<S, N> for ChainDnsLogFormatter
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
        let metadata = event.metadata();
        write!(
            &mut writer,
            "{} {} {}",
            Local::now().format("%FT%T%.6f"),
            metadata.level(),
            metadata.target()
        )?;

        if let Some(line) = metadata.line() {
            write!(&mut writer, ":{line}")?;
        }

        // Format all the spans in the event's span context.
        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, ":{}", span.name())?;

                let ext = span.extensions();
                let fields = &ext
                    .get::<FormattedFields<N>>()
                    .expect("will never be `None`");

                if !fields.is_empty() {
                    write!(writer, "{{{fields}}}")?;
                }
            }
        }

        write!(writer, ":")?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| {
        eprintln!("invalid log level '{level}', defaulting to 'info'");
        EnvFilter::new("info")
    })
}

/// Initialize the logging system with console and optional file output.
///
/// Returns a WorkerGuard that must be kept alive to ensure log flushing.
pub fn init_log(log: &LogConfig) -> WorkerGuard {
    let (file_writer, guard) = if let Some(ref file_path) = log.file {
        let path = std::path::Path::new(file_path);
        let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
        let file_name = path
            .file_name()
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| "chaindns.log".into());
        let file_appender = tracing_appender::rolling::never(dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        (Some(non_blocking), Some(guard))
    } else {
        (None, None)
    };

    let console_layer = fmt_layer::layer()
        .event_format(ChainDnsLogFormatter)
        .with_writer(std::io::stdout);

    let file_layer = file_writer.map(|writer| {
        fmt_layer::layer()
            .event_format(ChainDnsLogFormatter)
            .with_writer(writer)
    });

    let filter = build_filter(&log.level);
    let subscriber = Registry::default().with(filter).with(console_layer);

    if let Some(file_layer) = file_layer {
        subscriber.with(file_layer).init();
    } else {
        subscriber.init();
    }

    // Dummy guard when no file logging is configured
    guard.unwrap_or_else(|| tracing_appender::non_blocking(std::io::sink()).1)
}

#[cfg(test)]
mod tests {
    use super::build_filter;

    #[test]
    fn filter_accepts_levels_and_directives() {
        build_filter("debug");
        build_filter("warn,chaindns=trace");
    }

    #[test]
    fn filter_falls_back_on_garbage() {
        // must not panic
        build_filter("!!nonsense!!");
    }
}
