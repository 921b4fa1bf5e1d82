//! Windows TTS backend using SAPI (System.Speech.Synthesis)
//!
//! Works on native Windows and from WSL through PowerShell interop. Each
//! request runs a short PowerShell script that points the synthesizer at a
//! WAV file and reads the text from stdin.
//!
//! SAPI has no plain pitch property, so this backend reports pitch as
//! unsupported and the pitch control stays disabled.

use crate::platform::{find_program, run_with_input, to_host_path};
use crate::speech::{AudioAsset, AudioFormat, SpeechRequest, Synthesizer, VoiceSelector};
use crate::{Result, SpeakwaveError};
use log::debug;
use std::path::Path;
use std::process::{Command, Stdio};

/// Windows SAPI backend
pub struct SapiSynth {
    /// Path to powershell.exe
    powershell_path: String,
}

impl SapiSynth {
    /// Create a new Windows SAPI synthesizer
    ///
    /// Verifies PowerShell is available and can load System.Speech
    pub fn new() -> Result<Self> {
        debug!("Creating Windows SAPI backend");

        let powershell_path = Self::find_powershell()?;
        debug!("Found PowerShell at: {}", powershell_path);

        Self::test_sapi(&powershell_path)?;

        Ok(Self { powershell_path })
    }

    /// Find PowerShell executable (native or WSL interop)
    fn find_powershell() -> Result<String> {
        find_program(
            &[
                "powershell.exe",
                "/mnt/c/Windows/System32/WindowsPowerShell/v1.0/powershell.exe",
            ],
            &["-NoProfile", "-Command", "$PSVersionTable.PSVersion"],
        )
        .ok_or_else(|| {
            SpeakwaveError::Synthesis(
                "PowerShell not found. WSL interop may not be enabled.".to_string(),
            )
        })
    }

    /// Test that Windows SAPI is available
    fn test_sapi(powershell_path: &str) -> Result<()> {
        let output = Command::new(powershell_path)
            .arg("-NoProfile")
            .arg("-NonInteractive")
            .arg("-Command")
            .arg("Add-Type -AssemblyName System.Speech")
            .output()
            .map_err(|e| SpeakwaveError::Synthesis(format!("Failed to test SAPI: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SpeakwaveError::Synthesis(format!(
                "Windows SAPI not available: {}",
                stderr.trim()
            )));
        }

        debug!("Windows SAPI test successful");
        Ok(())
    }

    /// Convert a speed percentage (50-200) to SAPI rate (-10 to 10)
    fn speed_to_sapi_rate(speed: u16) -> i32 {
        let rate = (speed as f32 - 100.0) / 10.0;
        (rate.round() as i32).clamp(-10, 10)
    }

    /// SAPI gender hint for a voice type
    ///
    /// There is no robotic SAPI voice; it falls back to the male voice.
    fn gender_hint(voice: VoiceSelector) -> &'static str {
        match voice {
            VoiceSelector::Female => "Female",
            VoiceSelector::Male | VoiceSelector::Robotic => "Male",
        }
    }

    /// Quote a value as a PowerShell single-quoted string literal
    fn quote(value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    /// PowerShell script that renders stdin into `output`
    fn build_script(request: &SpeechRequest, output: &str) -> String {
        format!(
            r#"
Add-Type -AssemblyName System.Speech
$synth = New-Object System.Speech.Synthesis.SpeechSynthesizer
try {{
    $synth.SelectVoiceByHints([System.Speech.Synthesis.VoiceGender]::{gender})
}} catch {{ }}
$synth.Rate = {rate}
$synth.SetOutputToWaveFile({output})
[Console]::InputEncoding = [System.Text.Encoding]::UTF8
$text = [Console]::In.ReadToEnd()
$synth.Speak($text)
$synth.SetOutputToNull()
$synth.Dispose()
"#,
            gender = Self::gender_hint(request.voice()),
            rate = Self::speed_to_sapi_rate(request.speed()),
            output = Self::quote(output),
        )
    }
}

impl Synthesizer for SapiSynth {
    fn name(&self) -> &str {
        "Windows SAPI"
    }

    fn output_format(&self) -> AudioFormat {
        AudioFormat::Wav
    }

    fn supports_pitch(&self) -> bool {
        false
    }

    fn synthesize(&self, request: &SpeechRequest, output: &Path) -> Result<AudioAsset> {
        let host_output = to_host_path(output);
        let script = Self::build_script(request, &host_output.to_string_lossy());
        debug!(
            "Running SAPI script for {} chars into {}",
            request.text().len(),
            host_output.display()
        );

        let mut cmd = Command::new(&self.powershell_path);
        cmd.arg("-NoProfile")
            .arg("-NonInteractive")
            .arg("-Command")
            .arg(script)
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        let result = run_with_input(&mut cmd, request.text().as_bytes(), "PowerShell")?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(SpeakwaveError::Synthesis(format!(
                "SAPI synthesis failed: {}",
                stderr.trim()
            )));
        }

        Ok(AudioAsset::new(output, AudioFormat::Wav, request.clone()))
    }
}
