use std::time::Duration;

/// Forwards progress values that are finite, clamped to `[0, 1]` and strictly increasing.
pub(crate) struct ProgressTracker<'a> {
    emit: &'a mut dyn FnMut(f64),
    last: Option<f64>,
}

impl<'a> ProgressTracker<'a> {
    pub(crate) fn new(emit: &'a mut dyn FnMut(f64)) -> Self {
        Self { emit, last: None }
    }

    pub(crate) fn update(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        let value = value.clamp(0.0, 1.0);
        if self.last.is_some_and(|last| value <= last) {
            return;
        }
        self.last = Some(value);
        (self.emit)(value);
    }

    pub(crate) fn last(&self) -> Option<f64> {
        self.last
    }
}

/// Reads `ffmpeg -progress` key/value lines.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct FfmpegProgressParser {
    duration_us: Option<f64>,
}

impl FfmpegProgressParser {
    pub(crate) fn new(expected: Option<Duration>) -> Self {
        let duration_us = expected
            .map(|d| d.as_secs_f64() * 1_000_000.0)
            .filter(|us| *us > 0.0);
        Self { duration_us }
    }

    /// Fraction done for one line, when the line carries one.
    pub(crate) fn parse_line(&self, line: &str) -> Option<f64> {
        let (key, value) = line.trim().split_once('=')?;
        match key.trim() {
            "progress" if value.trim() == "end" => Some(1.0),
            // ffmpeg reports microseconds under both keys.
            "out_time_us" | "out_time_ms" => {
                let us: f64 = value.trim().parse().ok()?;
                let total = self.duration_us?;
                (us >= 0.0).then(|| us / total)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transcode/progress.rs"]
mod tests;
