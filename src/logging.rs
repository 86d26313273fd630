use log::LevelFilter;
use std::io::Write;

/// Console output for both tools: `[INFO] ...`, `[WARN] ...` on stdout,
/// colored by level. `RUST_LOG` takes precedence over `verbose`.
pub fn init_logger(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // a second init (e.g. from tests) is not an error worth reporting
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(env_logger::Target::Stdout)
        .format(|buf, record| {
            let style = buf.default_level_style(record.level());
            writeln!(
                buf,
                "{style}[{}]{style:#} {}",
                record.level(),
                record.args()
            )
        })
        .try_init();
}
