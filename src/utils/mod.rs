pub mod build_info;

use std::sync::Once;

use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

const CRATE_TARGET: &str = "scenario_core";
const DEFAULT_DIRECTIVE: &str = "scenario_core=info";

/// Initializes the global tracing subscriber once.
///
/// Filter precedence: `RUST_LOG`, then `directive` (usually the configured
/// `log_level`), then `scenario_core=info`.
pub fn init_tracing(directive: Option<&str>) {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let configured = directive.map(str::trim).filter(|raw| !raw.is_empty());
            match configured.map(scoped_directive) {
                Some(scoped) => EnvFilter::try_new(&scoped).unwrap_or_else(|err| {
                    eprintln!("ignoring log directive `{scoped}`: {err}");
                    EnvFilter::new(DEFAULT_DIRECTIVE)
                }),
                None => EnvFilter::new(DEFAULT_DIRECTIVE),
            }
        });

        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

/// A bare level such as `debug` applies to this crate only; full directives pass
/// through unchanged.
pub fn scoped_directive(raw: &str) -> String {
    match raw.parse::<LevelFilter>() {
        Ok(_) => format!("{CRATE_TARGET}={}", raw.to_ascii_lowercase()),
        Err(_) => raw.to_string(),
    }
}
