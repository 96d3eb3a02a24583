use std::path::PathBuf;

use structopt::StructOpt;

use hexflash::invoke::{DEFAULT_BAUD_RATE, DEFAULT_PART, DEFAULT_PROGRAMMER};
use hexflash::{Settings, Target};

#[derive(StructOpt, Debug)]
#[structopt(about = "Flash an Intel HEX image to an AVR board with avrdude")]
pub struct Opts {
    /// The image to flash instead of choosing one from the current directory
    pub image: Option<PathBuf>,

    /// The serial device to flash through instead of choosing one
    #[structopt(env = "SERIAL_PORT", short = "p", long = "port")]
    pub serial_port: Option<String>,
    /// The baud rate of the bootloader
    #[structopt(
        env = "BAUD_RATE",
        short = "b",
        long = "baud-rate",
        default_value = "115200"
    )]
    pub baud_rate: u32,
    /// The avrdude part number of the microcontroller
    #[structopt(env = "AVR_PART", short = "m", long = "part", default_value = "m2560")]
    pub part: String,
    /// The avrdude programmer id
    #[structopt(
        env = "AVR_PROGRAMMER",
        short = "c",
        long = "programmer",
        default_value = "wiring"
    )]
    pub programmer: String,
    /// Path to the avrdude executable instead of searching for it
    #[structopt(env = "AVRDUDE", long = "avrdude")]
    pub avrdude: Option<PathBuf>,
    /// Path to the avrdude configuration file instead of searching for it
    #[structopt(env = "AVRDUDE_CONF", short = "C", long = "config")]
    pub config: Option<PathBuf>,
    /// Print the avrdude command without running it
    #[structopt(long = "dry-run")]
    pub dry_run: bool,
}

impl Opts {
    pub fn into_settings(self) -> Settings {
        Settings {
            image: self.image,
            port: self.serial_port,
            flasher: self.avrdude,
            config: self.config,
            target: Target {
                part: self.part,
                programmer: self.programmer,
                baud_rate: self.baud_rate,
            },
            dry_run: self.dry_run,
            ..Settings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_should_default_to_the_mega_target() {
        let opts = Opts::from_iter_safe(vec!["hexflash"]).unwrap();
        let settings = opts.into_settings();

        assert_eq!(settings.target.part, DEFAULT_PART);
        assert_eq!(settings.target.programmer, DEFAULT_PROGRAMMER);
        assert_eq!(settings.target.baud_rate, DEFAULT_BAUD_RATE);
        assert!(!settings.dry_run);
    }

    #[test]
    fn it_should_accept_overrides() {
        let opts = Opts::from_iter_safe(vec![
            "hexflash",
            "-p",
            "COM7",
            "-b",
            "57600",
            "--dry-run",
            "blink.hex",
        ])
        .unwrap();
        let settings = opts.into_settings();

        assert_eq!(settings.port.as_deref(), Some("COM7"));
        assert_eq!(settings.target.baud_rate, 57_600);
        assert_eq!(settings.image, Some(PathBuf::from("blink.hex")));
        assert!(settings.dry_run);
    }
}
