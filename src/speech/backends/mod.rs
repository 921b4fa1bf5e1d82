//! Speech synthesis backends

// espeak-ng writing WAV files (Linux, macOS with Homebrew, WSL)
pub mod espeak;

// Windows SAPI through PowerShell (Windows and WSL)
pub mod sapi;

// Any configured external program (gtts-cli by default)
pub mod command;
