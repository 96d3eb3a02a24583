//! Lookup of the avrdude executable and its configuration file

use std::env;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use directories::BaseDirs;
use log::{debug, trace};

use crate::pathglob;
use crate::platform::Platform;

/// File name of the avrdude configuration file.
pub const CONFIG_FILE_NAME: &str = "avrdude.conf";

/// A well-known installation location of avrdude.
#[derive(Copy, Clone, Debug)]
enum Location {
    /// Relative to the user's home directory
    Home(&'static str),
    /// Absolute path
    Fixed(&'static str),
}

const WINDOWS_LOCATIONS: &[Location] = &[
    Location::Home("AppData/Local/Arduino15/packages/arduino/tools/avrdude/*/bin/avrdude.exe"),
    Location::Home(".platformio/packages/tool-avrdude/avrdude.exe"),
    Location::Fixed(r"C:\Program Files (x86)\Arduino\hardware\tools\avr\bin\avrdude.exe"),
    Location::Fixed(r"C:\Program Files\Arduino\hardware\tools\avr\bin\avrdude.exe"),
];

const MACOS_LOCATIONS: &[Location] = &[
    Location::Home("Library/Arduino15/packages/arduino/tools/avrdude/*/bin/avrdude"),
    Location::Home(".platformio/packages/tool-avrdude/avrdude"),
    Location::Fixed("/Applications/Arduino.app/Contents/Java/hardware/tools/avr/bin/avrdude"),
];

const UNIX_LOCATIONS: &[Location] = &[
    Location::Home(".arduino15/packages/arduino/tools/avrdude/*/bin/avrdude"),
    Location::Home(".platformio/packages/tool-avrdude/avrdude"),
    Location::Fixed("/usr/bin/avrdude"),
    Location::Fixed("/usr/local/bin/avrdude"),
];

/// Resolved avrdude executable, together with its configuration file if one was found.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FlasherLocation {
    pub executable: PathBuf,
    pub config: Option<PathBuf>,
}

impl FlasherLocation {
    /// Uses `executable` as the flasher if it is a regular file, resolving its configuration file.
    pub fn at<P: Into<PathBuf>>(executable: P) -> Option<FlasherLocation> {
        let executable = executable.into();

        if !executable.is_file() {
            return None;
        }

        let config = find_config(&executable);

        Some(FlasherLocation { executable, config })
    }
}

/// Finds avrdude on the executable search path or in the well-known installation locations.
#[derive(Clone, Debug)]
pub struct Locator {
    platform: Platform,
    search_path: Option<OsString>,
    home: Option<PathBuf>,
}

impl Locator {
    pub fn new(
        platform: Platform,
        search_path: Option<OsString>,
        home: Option<PathBuf>,
    ) -> Locator {
        Locator {
            platform,
            search_path,
            home,
        }
    }

    /// Creates a locator using the process' `PATH` and the user's home directory.
    pub fn from_env(platform: Platform) -> Locator {
        let home = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());

        Locator::new(platform, env::var_os("PATH"), home)
    }

    /// Returns the first avrdude found, preferring the search path.
    pub fn locate(&self) -> Option<FlasherLocation> {
        if let Some(executable) = self.find_on_search_path() {
            debug!("Found {} on the search path", executable.display());

            let config = find_config(&executable);

            return Some(FlasherLocation { executable, config });
        }

        let executable = self.candidates().into_iter().find(|path| {
            trace!("Probing {}", path.display());
            path.is_file()
        })?;

        debug!("Found {} in a well-known location", executable.display());

        let config = find_config(&executable);

        Some(FlasherLocation { executable, config })
    }

    /// Searches each directory of the search path for an executable avrdude.
    pub fn find_on_search_path(&self) -> Option<PathBuf> {
        let search_path = self.search_path.as_ref()?;
        let file_name = self.platform.flasher_file_name();

        env::split_paths(search_path)
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(|dir| dir.join(file_name))
            .find(|path| is_executable(path))
    }

    /// Expands the well-known installation locations of this platform, in priority order.
    pub fn candidates(&self) -> Vec<PathBuf> {
        let locations = match self.platform {
            Platform::Windows => WINDOWS_LOCATIONS,
            Platform::MacOs => MACOS_LOCATIONS,
            Platform::Unix => UNIX_LOCATIONS,
        };

        locations
            .iter()
            .filter_map(|location| match *location {
                Location::Home(relative) => self.home.as_ref().map(|home| home.join(relative)),
                Location::Fixed(path) => Some(PathBuf::from(path)),
            })
            .flat_map(pathglob::expand)
            .collect()
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Looks for the configuration file next to `executable`, in `../etc/` and in `..`.
///
/// Returns the first one that exists as an absolute path.
pub fn find_config(executable: &Path) -> Option<PathBuf> {
    let base = executable.parent().unwrap_or_else(|| Path::new(""));
    let candidates = [
        base.join(CONFIG_FILE_NAME),
        base.join("..").join("etc").join(CONFIG_FILE_NAME),
        base.join("..").join(CONFIG_FILE_NAME),
    ];

    let config = candidates.iter().find(|path| path.is_file())?;

    debug!("Using configuration file {}", config.display());

    Some(absolute(config))
}

/// Makes `path` absolute and folds `.` and `..` components without touching the filesystem.
fn absolute(path: &Path) -> PathBuf {
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match env::current_dir() {
            Ok(dir) => dir.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }

    normalized
}
