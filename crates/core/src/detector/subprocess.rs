use std::{
    io::{BufRead, BufReader},
    path::PathBuf,
    process::{Child, ChildStdout, Command, Stdio},
};

use crate::{config::DetectorConfig, GestureTreeError, Result};

use super::{wire, DetectionResult, LandmarkDetector};

/// How to launch the external detector process.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Default for DetectorCommand {
    fn default() -> Self {
        Self {
            program: PathBuf::from("python3"),
            args: vec!["scripts/hand_detect.py".to_string()],
        }
    }
}

/// Hand-landmark detector running as a child process.
///
/// The child owns the webcam. It prints `READY` once its model is loaded and
/// then one JSON line per processed camera image.
pub struct SubprocessDetector {
    process: Child,
    stdout: BufReader<ChildStdout>,
    closed: bool,
}

impl SubprocessDetector {
    /// Starts the process and waits for its ready signal. Any failure before
    /// the signal is reported as [`GestureTreeError::DetectorUnavailable`].
    pub fn spawn(command: &DetectorCommand, config: &DetectorConfig) -> Result<Self> {
        tracing::info!(program = %command.program.display(), "starting hand landmark detector");

        let mut process = Command::new(&command.program)
            .args(&command.args)
            .args(config.to_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|err| {
                GestureTreeError::DetectorUnavailable(format!(
                    "failed to start `{}`: {err}",
                    command.program.display()
                ))
            })?;

        let Some(stdout) = process.stdout.take() else {
            let _ = process.kill();
            return Err(GestureTreeError::DetectorUnavailable(
                "detector stdout was not captured".to_string(),
            ));
        };
        let mut stdout = BufReader::new(stdout);

        let mut ready = String::new();
        let handshake = stdout.read_line(&mut ready);
        if !matches!(&handshake, Ok(n) if *n > 0) || ready.trim() != "READY" {
            let _ = process.kill();
            let _ = process.wait();
            let reason = match handshake {
                Err(err) => format!("failed to read ready signal: {err}"),
                Ok(0) => "detector exited before signalling ready".to_string(),
                Ok(_) => format!("unexpected ready signal `{}`", ready.trim()),
            };
            return Err(GestureTreeError::DetectorUnavailable(reason));
        }

        tracing::info!("hand landmark detector ready");
        Ok(Self {
            process,
            stdout,
            closed: false,
        })
    }
}

impl LandmarkDetector for SubprocessDetector {
    fn next_result(&mut self) -> Result<Option<DetectionResult>> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.stdout.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match wire::parse_line(trimmed) {
                Ok(result) => return Ok(Some(result)),
                Err(err) => tracing::warn!(%err, "skipping unreadable detector line"),
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if self.process.try_wait()?.is_none() {
            self.process.kill()?;
        }
        self.process.wait()?;
        tracing::info!("hand landmark detector closed");
        Ok(())
    }
}

impl Drop for SubprocessDetector {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
