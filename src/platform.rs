//! Platform detection utilities

use crate::{Result, SpeakwaveError};
use log::{debug, error, warn};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// Detect if running in WSL (Windows Subsystem for Linux)
///
/// Checks for WSL-specific indicators in /proc/version and environment variables.
pub fn is_wsl() -> bool {
    // Check for WSL-specific indicators in /proc/version
    if let Ok(contents) = fs::read_to_string("/proc/version") {
        let lower = contents.to_lowercase();
        if lower.contains("microsoft") || lower.contains("wsl") {
            return true;
        }
    }

    // Check for WSL environment variable
    std::env::var("WSL_DISTRO_NAME").is_ok()
}

/// True when Windows speech services are reachable (native Windows or WSL interop)
pub fn has_windows_speech() -> bool {
    cfg!(target_os = "windows") || is_wsl()
}

/// Return the first candidate that runs successfully with `probe_args`
///
/// Used to locate external engines (espeak-ng, PowerShell, ffmpeg) before
/// committing to a backend.
pub fn find_program(candidates: &[&str], probe_args: &[&str]) -> Option<String> {
    for candidate in candidates {
        let status = Command::new(candidate)
            .args(probe_args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(status) if status.success() => return Some(candidate.to_string()),
            Ok(status) => debug!("{} exited with {}", candidate, status),
            Err(e) => debug!("{} not runnable: {}", candidate, e),
        }
    }
    None
}

/// Run a speech engine with `input` on its stdin and collect its output
///
/// If the text cannot be written the child is killed and reaped before the
/// error is returned, so no zombie is left behind.
pub fn run_with_input(command: &mut Command, input: &[u8], name: &str) -> Result<Output> {
    let mut child = command.stdin(Stdio::piped()).spawn().map_err(|e| {
        error!("Failed to spawn {}: {}", name, e);
        SpeakwaveError::Synthesis(format!("Failed to start {}: {}", name, e))
    })?;

    if let Some(mut stdin) = child.stdin.take() {
        if let Err(e) = stdin.write_all(input) {
            drop(stdin);
            if let Err(kill_err) = child.kill() {
                debug!("{} already gone: {}", name, kill_err);
            }
            if let Err(wait_err) = child.wait() {
                warn!("Failed to reap {}: {}", name, wait_err);
            }
            return Err(SpeakwaveError::Synthesis(format!(
                "Failed to send text: {}",
                e
            )));
        }
        // stdin is closed here so the engine sees end of input
    }

    child
        .wait_with_output()
        .map_err(|e| SpeakwaveError::Synthesis(format!("{} did not finish: {}", name, e)))
}

/// Translate a path so a Windows-side process can open it
///
/// Under WSL this asks `wslpath -w`; everywhere else the path is returned as is.
pub fn to_host_path(path: &Path) -> PathBuf {
    if !is_wsl() {
        return path.to_path_buf();
    }

    match Command::new("wslpath").arg("-w").arg(path).output() {
        Ok(output) if output.status.success() => {
            let converted = String::from_utf8_lossy(&output.stdout).trim().to_string();
            debug!("wslpath: {} -> {}", path.display(), converted);
            PathBuf::from(converted)
        }
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_wsl() {
        // This test just verifies the function doesn't panic
        // The actual result depends on the platform
        let _ = is_wsl();
    }

    #[test]
    fn test_find_program_missing() {
        assert_eq!(
            find_program(&["speakwave-definitely-not-installed"], &["--version"]),
            None
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_run_with_input_collects_output() {
        let mut cmd = Command::new("cat");
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        let output = run_with_input(&mut cmd, "héllo wörld".as_bytes(), "cat").unwrap();
        assert!(output.status.success());
        assert_eq!(output.stdout, "héllo wörld".as_bytes());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_with_input_reaps_child_that_ignores_stdin() {
        // `true` exits without reading, so a large write hits a closed pipe
        let mut cmd = Command::new("true");
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
        let input = vec![b'a'; 1 << 20];
        match run_with_input(&mut cmd, &input, "true") {
            Err(SpeakwaveError::Synthesis(msg)) => assert!(msg.starts_with("Failed to send text")),
            other => panic!("expected a send failure, got {:?}", other.map(|o| o.status)),
        }
    }

    #[test]
    fn test_run_with_input_missing_program() {
        let mut cmd = Command::new("speakwave-definitely-not-installed");
        match run_with_input(&mut cmd, b"hi", "nothing") {
            Err(SpeakwaveError::Synthesis(msg)) => assert!(msg.starts_with("Failed to start nothing")),
            other => panic!("expected a start failure, got {:?}", other.map(|o| o.status)),
        }
    }

    #[test]
    fn test_to_host_path_outside_wsl() {
        if !is_wsl() {
            let path = Path::new("/tmp/speech.wav");
            assert_eq!(to_host_path(path), path.to_path_buf());
        }
    }
}
