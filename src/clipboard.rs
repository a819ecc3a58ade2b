/*!
 * Clipboard support for catdir
 *
 * The stream is meant to travel through copy and paste, so serialization
 * can copy its output and reconstruction can read its input straight from
 * the system clipboard. Providers are external commands detected on PATH.
 */

use std::env;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use thiserror::Error;

/// Error type for clipboard operations
#[derive(Error, Debug)]
pub enum ClipboardError {
    /// Failed to execute the command
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// No suitable clipboard mechanism was found
    #[error("No suitable clipboard mechanism found")]
    NoClipboardFound,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for clipboard operations
pub type Result<T> = std::result::Result<T, ClipboardError>;

/// Trait for clipboard operations
pub trait Clipboard {
    /// Copy bytes to the clipboard
    fn copy(&self, content: &[u8]) -> Result<()>;

    /// Read the clipboard contents
    fn paste(&self) -> Result<Vec<u8>>;
}

/// Available clipboard providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardProvider {
    /// tmux paste buffer
    Tmux,
    /// Wayland clipboard
    Wayland,
    /// X11 clipboard with xclip
    Xclip,
    /// X11 clipboard with xsel
    Xsel,
    /// macOS clipboard
    MacOS,
    /// Windows clipboard (via WSL)
    Wsl,
}

impl ClipboardProvider {
    /// Command and arguments used to copy
    fn copy_command(&self) -> (&'static str, Vec<&'static str>) {
        match self {
            Self::Tmux => ("tmux", vec!["load-buffer", "-w", "-"]),
            Self::Wayland => ("wl-copy", vec![]),
            Self::Xclip => ("xclip", vec!["-selection", "clipboard", "-in"]),
            Self::Xsel => ("xsel", vec!["-b", "-i"]),
            Self::MacOS => ("pbcopy", vec![]),
            Self::Wsl => ("clip.exe", vec![]),
        }
    }

    /// Command and arguments used to paste
    fn paste_command(&self) -> (&'static str, Vec<&'static str>) {
        match self {
            Self::Tmux => ("tmux", vec!["save-buffer", "-"]),
            Self::Wayland => ("wl-paste", vec!["--no-newline"]),
            Self::Xclip => ("xclip", vec!["-selection", "clipboard", "-out"]),
            Self::Xsel => ("xsel", vec!["-b", "-o"]),
            Self::MacOS => ("pbpaste", vec![]),
            Self::Wsl => ("powershell.exe", vec!["-NoProfile", "-Command", "Get-Clipboard -Raw"]),
        }
    }

    /// Whether the provider's commands are installed and usable here
    fn is_available(&self) -> bool {
        match self {
            Self::Tmux => env::var_os("TMUX").is_some() && command_exists("tmux"),
            Self::Wayland => {
                env::var_os("WAYLAND_DISPLAY").is_some()
                    && command_exists("wl-copy")
                    && command_exists("wl-paste")
            }
            Self::Xclip => env::var_os("DISPLAY").is_some() && command_exists("xclip"),
            Self::Xsel => env::var_os("DISPLAY").is_some() && command_exists("xsel"),
            Self::MacOS => cfg!(target_os = "macos") && command_exists("pbcopy"),
            Self::Wsl => env::var_os("WSL_DISTRO_NAME").is_some() && command_exists("clip.exe"),
        }
    }
}

impl Clipboard for ClipboardProvider {
    fn copy(&self, content: &[u8]) -> Result<()> {
        let (cmd, args) = self.copy_command();
        let mut child = Command::new(cmd)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .map_err(|e| ClipboardError::CommandFailed(format!("Failed to spawn {}: {}", cmd, e)))?;

        let stdin = child.stdin.as_mut().ok_or_else(|| {
            ClipboardError::CommandFailed(format!("Failed to open stdin for {}", cmd))
        })?;
        stdin.write_all(content)?;
        drop(child.stdin.take());

        let status = child.wait()?;
        if status.success() {
            Ok(())
        } else {
            Err(ClipboardError::CommandFailed(format!(
                "{} exited with status: {}",
                cmd, status
            )))
        }
    }

    fn paste(&self) -> Result<Vec<u8>> {
        let (cmd, args) = self.paste_command();
        let output = Command::new(cmd)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ClipboardError::CommandFailed(format!("Failed to spawn {}: {}", cmd, e)))?;

        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(ClipboardError::CommandFailed(format!(
                "{} exited with status: {}",
                cmd, output.status
            )))
        }
    }
}

/// Providers in order of preference
const PROVIDERS: [ClipboardProvider; 6] = [
    ClipboardProvider::Tmux,
    ClipboardProvider::MacOS,
    ClipboardProvider::Wsl,
    ClipboardProvider::Wayland,
    ClipboardProvider::Xsel,
    ClipboardProvider::Xclip,
];

/// First clipboard provider usable on this system
pub fn detect_provider() -> Result<ClipboardProvider> {
    PROVIDERS
        .iter()
        .copied()
        .find(ClipboardProvider::is_available)
        .ok_or(ClipboardError::NoClipboardFound)
}

/// Copy bytes to the detected clipboard
pub fn copy_to_clipboard(content: &[u8]) -> Result<()> {
    let provider = detect_provider()?;
    log::debug!("Copying {} bytes with {:?}", content.len(), provider);
    provider.copy(content)
}

/// Read the detected clipboard
pub fn paste_from_clipboard() -> Result<Vec<u8>> {
    let provider = detect_provider()?;
    log::debug!("Pasting with {:?}", provider);
    provider.paste()
}

/// Check if a command exists on PATH
pub fn command_exists(command: &str) -> bool {
    let Some(paths) = env::var_os("PATH") else {
        return false;
    };
    env::split_paths(&paths).any(|dir| is_executable(&dir.join(command)))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_exists() {
        assert!(command_exists("sh"));
        assert!(!command_exists("nonexistentcommandxyz"));
    }

    #[test]
    fn test_every_provider_has_both_directions() {
        for provider in PROVIDERS {
            assert!(!provider.copy_command().0.is_empty());
            assert!(!provider.paste_command().0.is_empty());
        }
    }

    #[test]
    #[ignore] // Needs a running tmux session
    fn test_tmux_round_trip() {
        if !ClipboardProvider::Tmux.is_available() {
            return;
        }
        let text = b"catdir clipboard round trip";
        ClipboardProvider::Tmux.copy(text).unwrap();
        assert_eq!(ClipboardProvider::Tmux.paste().unwrap(), text);
    }
}
