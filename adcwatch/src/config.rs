use std::path::PathBuf;

use clap::Parser;
use log::debug;

use crate::errors::Error;

/// Monitor an ADC channel and run EXECUTABLE when its input changes.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "adcwatch",
    version,
    after_help = "EXECUTABLE will be called like this:\n\n    EXECUTABLE <adc value> <min> <max>\n"
)]
pub struct Config {
    /// ADC channel to monitor.
    #[arg(short, long, default_value_t = 2)]
    pub channel: u32,

    /// Lower limit to monitor. ADC values below this limit will only trigger
    /// EXECUTABLE once, until the channel goes above the limit again. The real
    /// lower threshold is increased by --step.
    #[arg(short = 'l', long, default_value_t = 10, value_parser = clap::value_parser!(i32).range(0..))]
    pub min: i32,

    /// Upper limit to monitor. ADC values above this limit will only trigger
    /// EXECUTABLE once, until the channel goes below the limit again.
    #[arg(short = 'u', long, default_value_t = 0x7FF, value_parser = clap::value_parser!(i32).range(0..))]
    pub max: i32,

    /// How much the ADC input value is allowed to change before EXECUTABLE is
    /// called again.
    #[arg(short, long, default_value_t = 10, value_parser = clap::value_parser!(i32).range(0..))]
    pub step: i32,

    /// Check the ADC value again after this many milliseconds. The timer is
    /// not restarted if the value is unchanged. 0 disables the re-check.
    #[arg(short, long, default_value_t = 200)]
    pub timeout: u64,

    /// Be a bit more verbose.
    #[arg(short, long)]
    pub verbose: bool,

    /// Program to run when the monitored value changes.
    #[arg(value_name = "EXECUTABLE")]
    pub executable: PathBuf,
}

impl Config {
    /// Checks the invariants clap cannot express.
    pub fn validate(&self) -> Result<(), Error> {
        if self.min > self.max {
            return Err(Error::ConfigError {
                info: format!("min ({}) must not exceed max ({})", self.min, self.max),
            });
        }
        Ok(())
    }

    /// Logs the effective settings. The lower cutoff shown is the first level
    /// the hardware can actually report, since the lower edge sits at
    /// `min + step` right after a refresh at `min`.
    pub fn log_options(&self) {
        debug!(
            "options: channel={} min={} (effective low: {}) max={} step={} timeout={}ms executable={}",
            self.channel,
            self.min,
            self.min + self.step,
            self.max,
            self.step,
            self.timeout,
            self.executable.display(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::try_parse_from(["adcwatch", "/usr/bin/true"]).unwrap();
        assert_eq!(config.channel, 2);
        assert_eq!(config.min, 10);
        assert_eq!(config.max, 0x7FF);
        assert_eq!(config.step, 10);
        assert_eq!(config.timeout, 200);
        assert!(!config.verbose);
        assert_eq!(config.executable, PathBuf::from("/usr/bin/true"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_all_options() {
        let config = Config::try_parse_from([
            "adcwatch", "-c", "3", "--min", "0", "--max", "100", "-s", "5", "-t", "0", "-v",
            "./on-change.sh",
        ])
        .unwrap();
        assert_eq!(config.channel, 3);
        assert_eq!(config.min, 0);
        assert_eq!(config.max, 100);
        assert_eq!(config.step, 5);
        assert_eq!(config.timeout, 0);
        assert!(config.verbose);
        assert_eq!(config.executable, PathBuf::from("./on-change.sh"));
    }

    #[test]
    fn test_config_requires_executable() {
        let result = Config::try_parse_from(["adcwatch"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_rejects_negative_numbers() {
        assert!(Config::try_parse_from(["adcwatch", "--min", "-1", "x"]).is_err());
        assert!(Config::try_parse_from(["adcwatch", "--max", "-20", "x"]).is_err());
        assert!(Config::try_parse_from(["adcwatch", "--step", "-5", "x"]).is_err());
    }

    #[test]
    fn test_config_rejects_inverted_limits() {
        let config =
            Config::try_parse_from(["adcwatch", "--min", "50", "--max", "10", "x"]).unwrap();
        let error = config.validate().unwrap_err();
        assert_eq!(
            format!("{}", error),
            "Configuration error: min (50) must not exceed max (10)."
        );
    }
}
