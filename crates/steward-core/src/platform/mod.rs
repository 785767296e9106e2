#[cfg(target_os = "windows")]
pub mod windows;

use crate::error::Error;
use std::fs::Metadata;
use std::path::Path;
use std::process::Command;
use tracing::debug;

#[cfg(target_os = "windows")]
pub fn is_hidden(path: &Path, metadata: &Metadata) -> bool {
    windows::is_hidden(path, metadata)
}

/// Dot-files are hidden on unix-likes.
#[cfg(not(target_os = "windows"))]
pub fn is_hidden(path: &Path, _metadata: &Metadata) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

/// Hands a path to whatever the desktop considers its default application.
pub trait FileOpener: Send + Sync {
    fn open_with_default_application(&self, path: &Path) -> Result<(), Error>;
}

/// Spawns a platform launcher command and does not wait for it.
#[derive(Debug, Clone)]
pub struct CommandOpener {
    program: &'static str,
    args: &'static [&'static str],
}

impl FileOpener for CommandOpener {
    fn open_with_default_application(&self, path: &Path) -> Result<(), Error> {
        debug!("Launching {} {:?} {}", self.program, self.args, path.display());
        Command::new(self.program)
            .args(self.args)
            .arg(path)
            .spawn()?;
        Ok(())
    }
}

/// Pick the launcher for the current target once, at startup.
pub fn system_opener() -> Result<Box<dyn FileOpener>, Error> {
    launcher_for(std::env::consts::OS)
        .map(|opener| Box::new(opener) as Box<dyn FileOpener>)
        .ok_or_else(|| Error::UnsupportedPlatform(std::env::consts::OS.to_string()))
}

fn launcher_for(os: &str) -> Option<CommandOpener> {
    match os {
        "windows" => Some(CommandOpener {
            program: "cmd",
            // `start` takes its first quoted argument as a window title.
            args: &["/c", "start", ""],
        }),
        "macos" => Some(CommandOpener {
            program: "open",
            args: &[],
        }),
        "linux" | "freebsd" | "openbsd" | "netbsd" | "dragonfly" => Some(CommandOpener {
            program: "xdg-open",
            args: &[],
        }),
        _ => None,
    }
}
