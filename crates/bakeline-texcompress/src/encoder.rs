//! External block-compression encoder subprocess.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use crate::error::{CompressError, CompressResult};
use crate::plan::BlockFormat;

/// Environment variable naming the encoder executable.
pub const ENCODER_ENV: &str = "BAKELINE_ENCODER";

/// Executable looked up on `PATH` when nothing else is configured.
pub const DEFAULT_ENCODER: &str = "kram";

/// Default timeout for one encode (2 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for the encoder.
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    /// Path to the encoder executable.
    pub encoder_path: Option<PathBuf>,
    /// Timeout for a single image.
    pub timeout: Duration,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            encoder_path: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl EncoderConfig {
    /// Sets the encoder executable path.
    pub fn encoder_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.encoder_path = Some(path.into());
        self
    }

    /// Sets the timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Finds the encoder: configured path, then `BAKELINE_ENCODER`, then `PATH`.
    pub fn find_encoder(&self) -> CompressResult<PathBuf> {
        if let Some(ref path) = self.encoder_path {
            if path.exists() {
                return Ok(path.clone());
            }
        }

        if let Ok(path) = std::env::var(ENCODER_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Ok(path);
            }
        }

        which::which(DEFAULT_ENCODER).map_err(|_| CompressError::EncoderNotFound)
    }
}

/// Arguments for encoding `input` into `output`.
pub fn encode_args(input: &Path, output: &Path, format: BlockFormat) -> Vec<String> {
    vec![
        "encode".to_string(),
        "-type".to_string(),
        "2d".to_string(),
        "-f".to_string(),
        format.as_str().to_string(),
        "-mipmin".to_string(),
        "2".to_string(),
        "-zstd".to_string(),
        "0".to_string(),
        "-i".to_string(),
        input.display().to_string(),
        "-o".to_string(),
        output.display().to_string(),
    ]
}

/// Why a single encode did not produce output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeFailure {
    /// Exited unsuccessfully.
    Failed { exit_code: i32, stderr: String },
    /// Killed after the timeout.
    TimedOut { timeout_secs: u64 },
}

impl std::fmt::Display for EncodeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodeFailure::Failed { exit_code, stderr } => {
                write!(f, "encoder exited with code {}", exit_code)?;
                if !stderr.trim().is_empty() {
                    write!(f, ": {}", stderr.trim())?;
                }
                Ok(())
            }
            EncodeFailure::TimedOut { timeout_secs } => {
                write!(f, "encoder timed out after {} seconds", timeout_secs)
            }
        }
    }
}

/// Runs the encoder once. Spawn errors are fatal; a failed encode is not.
pub fn run_encoder(
    encoder: &Path,
    input: &Path,
    output: &Path,
    format: BlockFormat,
    timeout: Duration,
) -> CompressResult<Result<(), EncodeFailure>> {
    let mut cmd = Command::new(encoder);
    cmd.args(encode_args(input, output, format));
    // Only stderr is kept; a filled stdout pipe could stall the encoder.
    cmd.stdout(Stdio::null()).stderr(Stdio::piped());

    let child = cmd.spawn().map_err(|source| CompressError::SpawnFailed {
        path: encoder.to_path_buf(),
        source,
    })?;
    let Some((status, stderr)) = wait_with_timeout(child, timeout).map_err(|source| {
        CompressError::SpawnFailed {
            path: encoder.to_path_buf(),
            source,
        }
    })?
    else {
        return Ok(Err(EncodeFailure::TimedOut {
            timeout_secs: timeout.as_secs(),
        }));
    };

    if !status.success() {
        return Ok(Err(EncodeFailure::Failed {
            exit_code: status.code().unwrap_or(-1),
            stderr,
        }));
    }
    Ok(Ok(()))
}

/// Waits for `child`, killing it after `timeout`. `None` means it timed out.
fn wait_with_timeout(
    mut child: Child,
    timeout: Duration,
) -> std::io::Result<Option<(ExitStatus, String)>> {
    let start = Instant::now();

    let status = loop {
        match child.try_wait()? {
            Some(status) => break status,
            None => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Ok(None);
                }
                std::thread::sleep(Duration::from_millis(20));
            }
        }
    };

    let mut stderr = String::new();
    if let Some(mut err) = child.stderr.take() {
        let _ = err.read_to_string(&mut stderr);
    }
    Ok(Some((status, stderr)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_config_builder() {
        let config = EncoderConfig::default()
            .encoder_path("/opt/kram/kram")
            .timeout_secs(30);
        assert_eq!(config.encoder_path, Some(PathBuf::from("/opt/kram/kram")));
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_encode_args() {
        let args = encode_args(Path::new("in/a.png"), Path::new("in/a.ktx2"), BlockFormat::Bc7);
        assert_eq!(
            args.join(" "),
            "encode -type 2d -f bc7 -mipmin 2 -zstd 0 -i in/a.png -o in/a.ktx2"
        );
    }

    #[test]
    fn test_configured_path_wins() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = EncoderConfig::default().encoder_path(file.path());
        assert_eq!(config.find_encoder().unwrap(), file.path());
    }

    #[cfg(unix)]
    #[test]
    fn test_wait_with_timeout_captures_stderr() {
        let child = Command::new("sh")
            .args(["-c", "echo broken 1>&2; exit 3"])
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();
        let (status, stderr) = wait_with_timeout(child, Duration::from_secs(5))
            .unwrap()
            .unwrap();
        assert_eq!(status.code(), Some(3));
        assert!(stderr.contains("broken"));
    }

    #[cfg(unix)]
    #[test]
    fn test_wait_with_timeout_kills() {
        let child = Command::new("sh")
            .args(["-c", "sleep 5"])
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();
        assert!(wait_with_timeout(child, Duration::from_millis(100))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_failure_display() {
        let failure = EncodeFailure::Failed {
            exit_code: 1,
            stderr: "bad png\n".into(),
        };
        assert_eq!(failure.to_string(), "encoder exited with code 1: bad png");
    }
}
