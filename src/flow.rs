//! The interactive flashing sequence: image, port, flasher, invocation

use std::io::{BufRead, Write};
use std::path::PathBuf;

use log::info;

use crate::chooser::choose_port;
use crate::image::find_images;
use crate::invoke::{Invocation, Target};
use crate::locate::{FlasherLocation, Locator};
use crate::ports::EnumeratePorts;
use crate::select::choose_from_list;
use crate::Error;

/// What to flash and how. Every `None` is resolved interactively or by lookup.
#[derive(Clone, Debug)]
pub struct Settings {
    /// Directory scanned for images when no image is given
    pub image_dir: PathBuf,
    pub image: Option<PathBuf>,
    pub port: Option<String>,
    /// Explicit avrdude executable, bypassing the lookup
    pub flasher: Option<PathBuf>,
    /// Explicit avrdude configuration file
    pub config: Option<PathBuf>,
    pub target: Target,
    /// Print the command without running it
    pub dry_run: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            image_dir: PathBuf::from("."),
            image: None,
            port: None,
            flasher: None,
            config: None,
            target: Target::default(),
            dry_run: false,
        }
    }
}

/// Runs the whole sequence, prompting on `input` and `output` for anything `settings` leaves open.
pub fn run<P, R, W>(
    settings: &Settings,
    ports: &P,
    locator: &Locator,
    input: &mut R,
    output: &mut W,
) -> Result<(), Error>
where
    P: EnumeratePorts + ?Sized,
    R: BufRead,
    W: Write,
{
    let image = match &settings.image {
        Some(image) => image.clone(),
        None => {
            let images = find_images(&settings.image_dir)?;

            choose_from_list(&images, "Choose a .hex file:", input, output)?
                .ok_or(Error::NoImage)?
                .path()
                .to_path_buf()
        }
    };

    info!("Using image {}", image.display());

    let port = match &settings.port {
        Some(port) => port.clone(),
        None => choose_port(ports, input, output)?.ok_or(Error::Cancelled)?,
    };

    info!("Using port {}", port);

    let mut location = match &settings.flasher {
        Some(executable) => FlasherLocation::at(executable),
        None => locator.locate(),
    }
    .ok_or(Error::FlasherNotFound)?;

    if let Some(config) = &settings.config {
        location.config = Some(config.clone());
    }

    let invocation = Invocation::new(&location, &settings.target, &port, &image);

    info!("Using avrdude at {}", invocation.program().display());

    writeln!(output, "Starting flash...")?;
    writeln!(output, "{}", invocation)?;
    output.flush()?;

    if settings.dry_run {
        return Ok(());
    }

    invocation.run()?;

    writeln!(output, "Done.")?;

    Ok(())
}
