/// Host operating system family, used to pick port enumeration and flasher lookup strategies.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Platform {
    Windows,
    MacOs,
    /// Linux and the other Unix-likes
    Unix,
}

impl Platform {
    /// Returns the platform this binary was built for.
    pub fn host() -> Platform {
        if cfg!(windows) {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Unix
        }
    }

    /// File name of the avrdude executable on this platform.
    pub fn flasher_file_name(self) -> &'static str {
        match self {
            Platform::Windows => "avrdude.exe",
            Platform::MacOs | Platform::Unix => "avrdude",
        }
    }
}
