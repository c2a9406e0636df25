//! Console logging setup.

use std::io::Write;

use env_logger::fmt::{Color, Formatter};
use log::{Level, LevelFilter, Record};

/// How chatty the console should be when `RUST_LOG` is not set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

impl Verbosity {
    pub fn from_flags(quiet: bool, verbose: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => Verbosity::Quiet,
            (false, true) => Verbosity::Verbose,
            (false, false) => Verbosity::Normal,
        }
    }

    fn level_filter(self) -> LevelFilter {
        match self {
            Verbosity::Quiet => LevelFilter::Warn,
            Verbosity::Normal => LevelFilter::Info,
            Verbosity::Verbose => LevelFilter::Debug,
        }
    }
}

/// Install the global logger. Safe to call more than once; later calls are
/// ignored.
pub fn setup_logger(verbosity: Verbosity) {
    let mut builder = env_logger::Builder::new();

    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_env("RUST_LOG");
    } else {
        builder.filter(Some(env!("CARGO_CRATE_NAME")), verbosity.level_filter());
        // Other crates stay silent
        builder.filter(None, LevelFilter::Off);
    }

    builder.format(|buf: &mut Formatter, record: &Record| {
        let mut level_style = buf.style();
        match record.level() {
            Level::Error => level_style.set_color(Color::Red).set_bold(true),
            Level::Warn => level_style.set_color(Color::Yellow).set_bold(true),
            Level::Info => level_style.set_color(Color::Green).set_bold(true),
            Level::Debug => level_style.set_color(Color::Blue).set_bold(true),
            Level::Trace => level_style.set_color(Color::White),
        };

        writeln!(
            buf,
            "{} {}",
            level_style.value(format!("{:<5}", record.level())),
            record.args()
        )
    });

    let _ = builder.try_init();
}
