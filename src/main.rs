use std::io;
use std::process;

use anyhow::Context;
use log::debug;
use structopt::StructOpt;

use hexflash::{Error, Locator, Platform, SystemPorts};

mod cli;

fn flash(opts: cli::Opts) -> Result<(), anyhow::Error> {
    let platform = Platform::host();
    let settings = opts.into_settings();

    debug!("Running on {:?} with {:?}", platform, settings);

    let ports = SystemPorts::detect(platform);
    let locator = Locator::from_env(platform);

    let stdin = io::stdin();
    let stdout = io::stdout();

    hexflash::run(
        &settings,
        &ports,
        &locator,
        &mut stdin.lock(),
        &mut stdout.lock(),
    )
    .with_context(|| format!("Could not flash with {:?}", settings.target))
}

/// Returns the message to show the user for `err` and the process exit code to use.
///
/// The context is only for the debug log, the first `Error` in the chain decides both.
fn failure(err: &anyhow::Error) -> (String, i32) {
    match err.chain().find_map(|cause| cause.downcast_ref::<Error>()) {
        Some(err) => (err.to_string(), err.exit_code()),
        None => (format!("{:#}", err), 1),
    }
}

fn main() {
    // Create a logger with a timestamp, silent unless RUST_LOG says otherwise
    pretty_env_logger::init_timed();

    // Parse the command-line arguments
    let opts = cli::Opts::from_args();

    if let Err(err) = flash(opts) {
        debug!("{:?}", err);

        let (message, code) = failure(&err);

        println!("{}", message);
        process::exit(code);
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;

    #[test]
    fn it_should_exit_with_the_flasher_exit_code() {
        let err = Err::<(), _>(Error::FlashFailed(5))
            .context("Could not flash with m2560")
            .unwrap_err();

        assert_eq!(failure(&err), ("Flashing failed. Exit code: 5".to_string(), 5));
    }

    #[test]
    fn it_should_exit_with_one_when_cancelled() {
        let err = anyhow::Error::new(Error::Cancelled).context("Could not flash");

        assert_eq!(failure(&err), ("Cancelled by user.".to_string(), 1));
    }

    #[test]
    fn it_should_exit_with_one_for_other_errors() {
        let err = anyhow!("no terminal").context("Could not flash");

        assert_eq!(failure(&err), ("Could not flash: no terminal".to_string(), 1));
    }
}
