//! Serial port enumeration
//!
//! Ports are listed through the serialport crate when the `device-listing` feature is enabled and
//! it reports anything. Otherwise a platform fallback is used: the registry on Windows, device
//! node patterns everywhere else.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::debug;

use crate::pathglob;
use crate::platform::Platform;

/// Directory holding the device nodes on Unix-like systems.
pub const DEVICE_DIR: &str = "/dev";

/// Device node name patterns for USB and vendor serial adapters on Linux and macOS.
pub const DEVICE_PATTERNS: &[&str] = &[
    "ttyUSB*",
    "ttyACM*",
    "tty.usb*",
    "tty.wchusbserial*",
    "tty.serial*",
];

/// PowerShell expression printing the values of the active serial port registry key, one per line.
const SERIALCOMM_QUERY: &str = "(Get-ItemProperty -Path 'HKLM:\\HARDWARE\\DEVICEMAP\\SERIALCOMM' | \
     Select-Object -Property * -ExcludeProperty PSPath,PSParentPath,PSChildName,PSDrive,PSProvider).\
     PSObject.Properties.Value";

/// Shell used to run [`SERIALCOMM_QUERY`].
pub const REGISTRY_SHELL: &str = "powershell";

/// Number of synthetic `COMn` names produced when nothing else works on Windows.
const MAX_COM_PORT: u32 = 256;

/// Something that can produce a fresh snapshot of serial port labels.
pub trait EnumeratePorts {
    /// Returns the current port labels, best effort. An empty list means nothing was found.
    fn enumerate(&self) -> Vec<String>;
}

/// Formats a port label as `<device> - <description>`, or the bare device name.
pub fn format_label(device: &str, description: Option<&str>) -> String {
    match description {
        Some(description) if !description.is_empty() => format!("{} - {}", device, description),
        _ => device.to_string(),
    }
}

/// Structured device listing backed by the serialport crate.
#[derive(Copy, Clone, Debug)]
pub struct DeviceListing {
    _private: (),
}

impl DeviceListing {
    /// Returns the device listing if this build supports it.
    pub fn available() -> Option<DeviceListing> {
        if cfg!(feature = "device-listing") {
            Some(DeviceListing { _private: () })
        } else {
            None
        }
    }

    #[cfg(feature = "device-listing")]
    pub fn list(&self) -> Vec<String> {
        use serialport::SerialPortType;

        let ports = match serialport::available_ports() {
            Ok(ports) => ports,
            Err(err) => {
                debug!("Serial port listing unavailable: {}", err);
                return Vec::new();
            }
        };

        ports
            .into_iter()
            .map(|port| {
                let description = match port.port_type {
                    SerialPortType::UsbPort(info) => info.product.or(info.manufacturer),
                    _ => None,
                };

                format_label(&port.port_name, description.as_deref())
            })
            .collect()
    }

    #[cfg(not(feature = "device-listing"))]
    pub fn list(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Platform specific strategy used when the device listing is absent or empty.
#[derive(Clone, Debug)]
pub enum Fallback {
    /// Query the Windows registry through `shell`, then synthesize `COM1` to `COM256`
    Registry { shell: PathBuf },
    /// Match device node path patterns
    DeviceGlob(Vec<PathBuf>),
}

impl Fallback {
    pub fn for_platform(platform: Platform) -> Fallback {
        match platform {
            Platform::Windows => Fallback::Registry {
                shell: PathBuf::from(REGISTRY_SHELL),
            },
            Platform::MacOs | Platform::Unix => Fallback::device_glob_in(DEVICE_DIR),
        }
    }

    /// The [`DEVICE_PATTERNS`] rooted at `dir`.
    pub fn device_glob_in<P: AsRef<Path>>(dir: P) -> Fallback {
        Fallback::DeviceGlob(
            DEVICE_PATTERNS
                .iter()
                .map(|pattern| dir.as_ref().join(pattern))
                .collect(),
        )
    }

    pub fn enumerate(&self) -> Vec<String> {
        match self {
            Fallback::Registry { shell } => query_registry(shell).unwrap_or_else(|| {
                debug!("Registry query failed, listing COM1 to COM{}", MAX_COM_PORT);
                synthetic_com_ports()
            }),
            Fallback::DeviceGlob(patterns) => glob_devices(patterns),
        }
    }
}

/// Returns the sorted, deduplicated union of the paths matching `patterns`.
fn glob_devices(patterns: &[PathBuf]) -> Vec<String> {
    let devices: BTreeSet<String> = patterns
        .iter()
        .flat_map(pathglob::expand)
        .map(|path| path.to_string_lossy().into_owned())
        .collect();

    devices.into_iter().collect()
}

fn query_registry(shell: &Path) -> Option<Vec<String>> {
    let output = Command::new(shell)
        .args(&["-NoProfile", "-Command", SERIALCOMM_QUERY])
        .stderr(Stdio::null())
        .output();

    let output = match output {
        Ok(output) if output.status.success() => output,
        Ok(output) => {
            debug!("Registry query exited with {}", output.status);
            return None;
        }
        Err(err) => {
            debug!("Could not run registry query: {}", err);
            return None;
        }
    };

    let ports = parse_registry_output(&String::from_utf8_lossy(&output.stdout));

    if ports.is_empty() {
        None
    } else {
        Some(ports)
    }
}

/// Splits the registry query output into port names, skipping blank lines.
fn parse_registry_output(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

fn synthetic_com_ports() -> Vec<String> {
    (1..=MAX_COM_PORT).map(|n| format!("COM{}", n)).collect()
}

/// Port enumeration of the running system.
#[derive(Clone, Debug)]
pub struct SystemPorts {
    listing: Option<DeviceListing>,
    fallback: Fallback,
}

impl SystemPorts {
    pub fn new(listing: Option<DeviceListing>, fallback: Fallback) -> SystemPorts {
        SystemPorts { listing, fallback }
    }

    /// Resolves the enumeration strategies for `platform`.
    pub fn detect(platform: Platform) -> SystemPorts {
        let listing = DeviceListing::available();

        debug!(
            "Device listing {}, fallback for {:?}",
            if listing.is_some() { "available" } else { "unavailable" },
            platform
        );

        SystemPorts::new(listing, Fallback::for_platform(platform))
    }
}

impl EnumeratePorts for SystemPorts {
    fn enumerate(&self) -> Vec<String> {
        if let Some(listing) = &self.listing {
            let ports = listing.list();

            if !ports.is_empty() {
                return ports;
            }

            debug!("Device listing found no ports, using fallback");
        }

        self.fallback.enumerate()
    }
}
