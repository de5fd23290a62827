use serde::{Deserialize, Serialize};

use crate::{
    gesture::{Landmark, LandmarkFrame},
    Result,
};

use super::DetectionResult;

/// One line of detector output as JSON.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct WireResult {
    /// Seconds since the detector started. Only replay files carry it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<f32>,
    #[serde(default)]
    pub hands: Vec<WireHand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WireHand {
    pub landmarks: Vec<Landmark>,
    #[serde(default)]
    pub score: Option<f32>,
    #[serde(default)]
    pub handedness: Option<String>,
}

/// Parses a single JSON line emitted by a detector.
///
/// A line that reports a detector-side error is treated as a frame without a
/// hand. Hands with the wrong number of landmarks are dropped.
pub fn parse_line(line: &str) -> Result<DetectionResult> {
    let wire: WireResult = serde_json::from_str(line)?;

    if let Some(error) = wire.error {
        tracing::warn!(%error, "detector reported an error");
        return Ok(DetectionResult {
            timestamp: wire.t,
            hands: Vec::new(),
        });
    }

    let mut hands = Vec::with_capacity(wire.hands.len());
    for hand in wire.hands {
        match LandmarkFrame::from_slice(&hand.landmarks) {
            Ok(frame) => {
                tracing::trace!(
                    handedness = hand.handedness.as_deref().unwrap_or("unknown"),
                    score = hand.score.unwrap_or(1.0),
                    "hand detected"
                );
                hands.push(frame);
            }
            Err(err) => tracing::warn!(%err, "dropping malformed hand"),
        }
    }

    Ok(DetectionResult {
        timestamp: wire.t,
        hands,
    })
}

/// Encodes a result in the same line format [`parse_line`] reads.
pub fn encode_line(result: &DetectionResult) -> Result<String> {
    let wire = WireResult {
        t: result.timestamp,
        hands: result
            .hands
            .iter()
            .map(|frame| WireHand {
                landmarks: frame.landmarks().to_vec(),
                score: None,
                handedness: None,
            })
            .collect(),
        error: None,
    };
    Ok(serde_json::to_string(&wire)?)
}
