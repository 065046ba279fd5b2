use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use log::error;
use tracing_subscriber::EnvFilter;

use adcwatch::callback::CommandCallback;
use adcwatch::channel::iio::IioChannel;
use adcwatch::config::Config;
use adcwatch::errors::Error;
use adcwatch::monitor::Monitor;

#[cfg(not(tarpaulin_include))]
fn main() -> ExitCode {
    let config = Config::parse();
    if let Err(e) = config.validate() {
        Config::command()
            .error(clap::error::ErrorKind::ValueValidation, e.to_string())
            .exit();
    }

    init_logging(config.verbose);
    config.log_options();

    // The watch loop has no normal exit: reaching this point means a fatal
    // resource or stream error.
    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(tarpaulin_include))]
#[tokio::main(flavor = "current_thread")]
async fn run(config: Config) -> Result<(), Error> {
    let channel = IioChannel::open(config.channel)?;
    let callback = CommandCallback::new(&config.executable);
    Monitor::new(config, channel, callback).run().await
}

fn init_logging(verbose: bool) {
    let default = if verbose { "adcwatch=debug" } else { "adcwatch=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
