use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    thread,
    time::{Duration, Instant},
};

use crate::Result;

use super::{wire, DetectionResult, LandmarkDetector};

/// Plays back detector output recorded as JSON lines.
///
/// When `paced` is set, lines with a `t` field are held back until that many
/// seconds have passed since the first read.
pub struct ReplayDetector<R> {
    reader: R,
    paced: bool,
    started: Option<Instant>,
    line_number: usize,
}

impl ReplayDetector<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>, paced: bool) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(BufReader::new(file), paced))
    }
}

impl<R: BufRead> ReplayDetector<R> {
    pub fn new(reader: R, paced: bool) -> Self {
        Self {
            reader,
            paced,
            started: None,
            line_number: 0,
        }
    }

    /// Sleeps until `timestamp` seconds after the first paced line. Returns
    /// false without waiting when the timestamp is not a usable duration.
    fn wait_until(&mut self, timestamp: f32) -> bool {
        let Ok(offset) = Duration::try_from_secs_f32(timestamp.max(0.0)) else {
            return false;
        };
        let started = *self.started.get_or_insert_with(Instant::now);
        let Some(due) = started.checked_add(offset) else {
            return false;
        };
        let now = Instant::now();
        if due > now {
            thread::sleep(due - now);
        }
        true
    }
}

impl<R: BufRead + Send + 'static> LandmarkDetector for ReplayDetector<R> {
    fn next_result(&mut self) -> Result<Option<DetectionResult>> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match wire::parse_line(trimmed) {
                Ok(result) => {
                    if let (true, Some(timestamp)) = (self.paced, result.timestamp) {
                        if !self.wait_until(timestamp) {
                            tracing::warn!(
                                line = self.line_number,
                                timestamp,
                                "skipping replay line with unusable timestamp"
                            );
                            continue;
                        }
                    }
                    return Ok(Some(result));
                }
                Err(err) => {
                    tracing::warn!(line = self.line_number, %err, "skipping unreadable replay line")
                }
            }
        }
    }
}

/// Reads a whole replay source into memory, skipping unreadable lines.
pub fn read_all<R: BufRead + Send + 'static>(reader: R) -> Result<Vec<DetectionResult>> {
    let mut replay = ReplayDetector::new(reader, false);
    let mut results = Vec::new();
    while let Some(result) = replay.next_result()? {
        results.push(result);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const RECORDING: &str = r#"
# recorded with scripts/hand_detect.py
{"t":0.0,"hands":[]}
{"t":0.5,"hands":[]}
oops
{"t":1.0,"hands":[]}
"#;

    #[test]
    fn yields_lines_in_order_then_ends() {
        let results = read_all(Cursor::new(RECORDING)).unwrap();
        let times: Vec<_> = results.iter().map(|r| r.timestamp).collect();
        assert_eq!(times, vec![Some(0.0), Some(0.5), Some(1.0)]);
    }

    #[test]
    fn paced_replay_waits_for_timestamps() {
        let mut replay = ReplayDetector::new(Cursor::new("{\"t\":0.05,\"hands\":[]}\n"), true);
        let start = Instant::now();
        assert!(replay.next_result().unwrap().is_some());
        assert!(start.elapsed() >= Duration::from_millis(45));
        assert!(replay.next_result().unwrap().is_none());
    }

    #[test]
    fn paced_replay_skips_unusable_timestamps() {
        let recording = "{\"t\":1e40,\"hands\":[]}\n{\"t\":0.0,\"hands\":[]}\n";
        let mut replay = ReplayDetector::new(Cursor::new(recording), true);
        let result = replay.next_result().unwrap().unwrap();
        assert_eq!(result.timestamp, Some(0.0));
        assert!(replay.next_result().unwrap().is_none());
    }
}
