use std::io::Write as _;

use colored::Colorize;
use env_logger::Env;
use qjudge_core::style::ColorTheme;

/// Logs to stderr at `warn` unless `RUST_LOG` says otherwise.
pub fn init() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .format(|buf, record| {
            let level = record.level();
            let label = format!("[{}]", level).color(level.color()).bold();
            writeln!(buf, "{} {}", label, record.args())
        })
        .init();
}
