use time::macros::format_description;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[doc(hidden)]
pub use tracing as __tracing;

/// Builds the filter for `init_logger`. `RUST_LOG` wins over the configured level.
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Installs the global compact subscriber. Safe to call more than once; only the
/// first call takes effect.
pub fn init_logger(default_level: &str) {
    let time_format =
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:2]");

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_timer(fmt::time::LocalTime::new(time_format))
                .with_target(false)
                .with_level(true)
                .with_thread_names(false)
                .with_line_number(false)
                .with_file(false)
                .compact(),
        )
        .with(env_filter(default_level))
        .try_init();
}

/// Runs `$body`, logging how long it took under `$label`.
#[macro_export]
macro_rules! timeit {
    ($label:expr, $body:block) => {{
        let __start = std::time::Instant::now();
        let __out = $body;
        $crate::__tracing::info!(
            elapsed_ms = __start.elapsed().as_millis() as u64,
            "{} finished",
            $label
        );
        __out
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn timeit_returns_block_value() {
        let value = crate::timeit!("sum", { 20 + 22 });
        assert_eq!(value, 42);
    }

    #[test]
    fn init_logger_is_idempotent() {
        super::init_logger("debug");
        super::init_logger("info");
    }
}
