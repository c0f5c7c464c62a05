//! Optional reporting of controller internals.

use log::debug;
#[cfg(feature = "debug")]
use serde_json::json;

/// Receives diagnostic text from a controller. Reports never affect control decisions.
pub trait TelemetrySink {
    /// Reports a line of text on the given channel.
    fn report(&mut self, channel: usize, text: &str);

    /// Whether reports are consumed at all. Controllers skip formatting when not.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Discards all reports.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullTelemetry;

impl TelemetrySink for NullTelemetry {
    fn report(&mut self, _channel: usize, _text: &str) {}

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Forwards reports to the `log` facade at debug level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogTelemetry;

impl TelemetrySink for LogTelemetry {
    fn report(&mut self, channel: usize, text: &str) {
        debug!(target: "track_pilot::telemetry", "[{}] {}", channel, text);
    }
}

/// Collects the reports of each frame as JSON.
#[cfg(feature = "debug")]
#[derive(Clone, Debug, Default)]
pub struct FrameRecorder {
    frame: Vec<serde_json::Value>,
}

#[cfg(feature = "debug")]
impl FrameRecorder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Takes the reports collected since the last call as a JSON array.
    pub fn take_frame(&mut self) -> serde_json::Value {
        json!(std::mem::take(&mut self.frame))
    }
}

#[cfg(feature = "debug")]
impl TelemetrySink for FrameRecorder {
    fn report(&mut self, channel: usize, text: &str) {
        self.frame.push(json!({
            "channel": channel,
            "text": text,
        }))
    }
}

#[cfg(all(test, feature = "debug"))]
mod test {
    use super::*;

    #[test]
    fn frame_recorder_collects_reports() {
        let mut recorder = FrameRecorder::new();
        recorder.report(0, "NORMAL");
        recorder.report(1, "steering 0.00");
        let frame = recorder.take_frame();
        assert_eq!(frame.as_array().unwrap().len(), 2);
        assert_eq!(frame[0]["text"], "NORMAL");
        assert!(recorder.take_frame().as_array().unwrap().is_empty());
    }
}
