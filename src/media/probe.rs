use std::path::Path;
use std::process::Command;
use std::time::Duration;

use anyhow::Context as _;
use serde::Deserialize;

use crate::foundation::error::{GlyphreelError, GlyphreelResult};

#[derive(Debug, Default, Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    #[serde(default)]
    format: Option<ProbeFormat>,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeFormat {
    #[serde(default)]
    duration: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeStream {
    #[serde(default)]
    codec_type: Option<String>,
    #[serde(default)]
    duration: Option<String>,
    #[serde(default)]
    nb_read_packets: Option<String>,
    #[serde(default)]
    avg_frame_rate: Option<String>,
    #[serde(default)]
    r_frame_rate: Option<String>,
}

fn positive_secs(raw: Option<&str>) -> Option<Duration> {
    let secs: f64 = raw?.trim().parse().ok()?;
    if secs > 0.0 {
        Duration::try_from_secs_f64(secs).ok()
    } else {
        None
    }
}

fn frame_rate(raw: Option<&str>) -> Option<f64> {
    let (num, den) = raw?.split_once('/')?;
    let num: f64 = num.trim().parse().ok()?;
    let den: f64 = den.trim().parse().ok()?;
    let rate = num / den;
    (rate.is_finite() && rate > 0.0).then_some(rate)
}

/// Duration out of `ffprobe -of json` output.
///
/// Streamed WebM carries no duration header, so a counted packet total over the frame rate is
/// used when neither the container nor the video stream reports one.
pub(crate) fn parse_probe_duration(json: &[u8]) -> GlyphreelResult<Duration> {
    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| GlyphreelError::serde(format!("ffprobe json parse failed: {e}")))?;

    if let Some(d) = positive_secs(parsed.format.as_ref().and_then(|f| f.duration.as_deref())) {
        return Ok(d);
    }
    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| GlyphreelError::validation("no video stream found"))?;
    if let Some(d) = positive_secs(video.duration.as_deref()) {
        return Ok(d);
    }

    let packets: u64 = video
        .nb_read_packets
        .as_deref()
        .and_then(|p| p.trim().parse().ok())
        .filter(|p| *p > 0)
        .ok_or_else(|| GlyphreelError::validation("ffprobe reported no duration or packets"))?;
    let rate = frame_rate(video.avg_frame_rate.as_deref())
        .or_else(|| frame_rate(video.r_frame_rate.as_deref()))
        .ok_or_else(|| GlyphreelError::validation("ffprobe reported no frame rate"))?;
    Duration::try_from_secs_f64(packets as f64 / rate)
        .map_err(|e| GlyphreelError::validation(format!("probed duration out of range: {e}")))
}

/// Probe the playing time of a clip on disk through `ffprobe`.
pub fn probe_duration(path: &Path) -> GlyphreelResult<Duration> {
    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-count_packets",
            "-show_entries",
            "format=duration:stream=codec_type,duration,nb_read_packets,avg_frame_rate,r_frame_rate",
            "-of",
            "json",
        ])
        .arg(path)
        .output()
        .context("failed to run ffprobe")?;
    if !out.status.success() {
        return Err(GlyphreelError::validation(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    parse_probe_duration(&out.stdout)
}

#[cfg(test)]
#[path = "../../tests/unit/media/probe.rs"]
mod tests;
