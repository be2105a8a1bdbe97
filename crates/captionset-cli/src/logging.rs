use stderrlog::{LogLevelNum, Timestamp};

/// The verbosity before any `-v` flags: warnings and errors.
pub const DEFAULT_VERBOSITY: u8 = 2;

/// The highest verbosity (trace).
const MAX_VERBOSITY: u8 = 5;

/// Logging setup arg group.
#[derive(clap::Args, Debug)]
pub struct LogArgs {
    /// Silence log messages; overrides `-v`.
    #[clap(short, long, global = true)]
    pub quiet: bool,

    /// Raise the log level once per flag (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Prefix log lines with a timestamp.
    #[clap(long, global = true)]
    pub ts: bool,
}

impl LogArgs {
    /// The effective verbosity, counting up from `base`; 0 is off.
    fn verbosity(
        &self,
        base: u8,
    ) -> u8 {
        if self.quiet {
            0
        } else {
            base.saturating_add(self.verbose).min(MAX_VERBOSITY)
        }
    }

    fn level(&self) -> LogLevelNum {
        match self.verbosity(DEFAULT_VERBOSITY) {
            0 => LogLevelNum::Off,
            1 => LogLevelNum::Error,
            2 => LogLevelNum::Warn,
            3 => LogLevelNum::Info,
            4 => LogLevelNum::Debug,
            _ => LogLevelNum::Trace,
        }
    }

    /// Initialize the global stderr logger for this tool and the library.
    pub fn setup_logging(&self) -> Result<(), Box<dyn std::error::Error>> {
        stderrlog::new()
            .module("captionset")
            .module("capset")
            .verbosity(self.level())
            .timestamp(if self.ts {
                Timestamp::Second
            } else {
                Timestamp::Off
            })
            .init()?;

        Ok(())
    }
}
