//! Assembly and execution of the avrdude command line

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;

use crate::locate::FlasherLocation;
use crate::Error;

/// Part number of the ATmega2560.
pub const DEFAULT_PART: &str = "m2560";
/// Programmer id of the Arduino Mega (Wiring) bootloader.
pub const DEFAULT_PROGRAMMER: &str = "wiring";
/// Baud rate the bootloader listens on.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// The microcontroller being flashed and how to talk to its bootloader.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Target {
    pub part: String,
    pub programmer: String,
    pub baud_rate: u32,
}

impl Default for Target {
    fn default() -> Self {
        Target {
            part: DEFAULT_PART.to_string(),
            programmer: DEFAULT_PROGRAMMER.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
        }
    }
}

/// A fully assembled avrdude command.
#[derive(Clone, Debug)]
pub struct Invocation {
    program: PathBuf,
    args: Vec<OsString>,
}

impl Invocation {
    /// Builds the command that writes `image` to the flash of `target` through `port`.
    ///
    /// The configuration file is passed with `-C` only when one was found, otherwise avrdude uses
    /// its built-in default.
    pub fn new(
        location: &FlasherLocation,
        target: &Target,
        port: &str,
        image: &Path,
    ) -> Invocation {
        let mut args: Vec<OsString> = Vec::with_capacity(12);

        if let Some(config) = &location.config {
            args.push("-C".into());
            args.push(config.into());
        }

        let mut operation = OsString::from("flash:w:");
        operation.push(image);
        operation.push(":i");

        args.push("-p".into());
        args.push(target.part.as_str().into());
        args.push("-c".into());
        args.push(target.programmer.as_str().into());
        args.push("-P".into());
        args.push(port.into());
        args.push("-b".into());
        args.push(target.baud_rate.to_string().into());
        // Skip the signature and fuse safety checks
        args.push("-D".into());
        args.push("-U".into());
        args.push(operation);

        Invocation {
            program: location.executable.clone(),
            args,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Runs the command with inherited stdio and waits for it to exit.
    ///
    /// A non-zero exit is returned as `Error::FlashFailed` with the exit code.
    pub fn run(&self) -> Result<(), Error> {
        debug!("Running {:?} {:?}", self.program, self.args);

        let status = Command::new(self.program())
            .args(self.args())
            .status()
            .map_err(|source| Error::Spawn {
                path: self.program.clone(),
                source,
            })?;

        debug!("avrdude exited with {}", status);

        if status.success() {
            return Ok(());
        }

        match status.code() {
            Some(code) => Err(Error::FlashFailed(code)),
            None => Err(Error::Terminated),
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;

        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(config: Option<&str>) -> FlasherLocation {
        FlasherLocation {
            executable: PathBuf::from("/usr/bin/avrdude"),
            config: config.map(PathBuf::from),
        }
    }

    #[test]
    fn it_should_build_the_command_without_a_config() {
        let invocation = Invocation::new(
            &location(None),
            &Target::default(),
            "/dev/ttyACM0",
            Path::new("sensor_box.hex"),
        );

        assert_eq!(invocation.program(), Path::new("/usr/bin/avrdude"));
        assert!(!invocation.args().iter().any(|arg| arg == "-C"));
        assert_eq!(
            invocation.to_string(),
            "/usr/bin/avrdude -p m2560 -c wiring -P /dev/ttyACM0 -b 115200 -D -U flash:w:sensor_box.hex:i"
        );
    }

    #[test]
    fn it_should_put_the_config_right_after_the_executable() {
        let invocation = Invocation::new(
            &location(Some("/etc/avrdude.conf")),
            &Target::default(),
            "COM4",
            Path::new("blink.hex"),
        );

        assert_eq!(invocation.args()[0], "-C");
        assert_eq!(invocation.args()[1], "/etc/avrdude.conf");
        assert_eq!(
            invocation.to_string(),
            "/usr/bin/avrdude -C /etc/avrdude.conf -p m2560 -c wiring -P COM4 -b 115200 -D -U flash:w:blink.hex:i"
        );
    }

    #[test]
    fn it_should_use_the_given_target() {
        let target = Target {
            part: "m328p".to_string(),
            programmer: "arduino".to_string(),
            baud_rate: 57_600,
        };
        let invocation = Invocation::new(&location(None), &target, "COM3", Path::new("a.hex"));

        assert_eq!(
            invocation.to_string(),
            "/usr/bin/avrdude -p m328p -c arduino -P COM3 -b 57600 -D -U flash:w:a.hex:i"
        );
    }

    #[test]
    fn it_should_report_a_missing_executable() {
        let dir = tempfile::tempdir().unwrap();
        let location = FlasherLocation {
            executable: dir.path().join("avrdude"),
            config: None,
        };
        let invocation = Invocation::new(&location, &Target::default(), "COM3", Path::new("a.hex"));

        assert!(matches!(invocation.run(), Err(Error::Spawn { .. })));
    }
}
