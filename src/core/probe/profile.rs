//! Stream compatibility analysis.
//!
//! Pure classification over parsed ffprobe data: nothing here touches the
//! filesystem or a subprocess.
//!
//! ## Compatibility Targets
//! - Video: HEVC tagged `hvc1` (required for device thumbnails), SDR only
//! - Audio: AAC
//! - Container: MOV

use super::{ProbeOutput, ProbeStream};

/// Transfer characteristics that explicitly signal HDR
const HDR_TRANSFERS: [&str; 2] = ["smpte2084", "arib-std-b67"];

/// Wide-gamut primaries required for the bit-depth HDR heuristic
const WIDE_GAMUT_PRIMARIES: [&str; 2] = ["bt2020", "bt2020nc"];

/// Per-file compatibility flags derived from stream metadata
///
/// If a file carries more than one stream of a type, the last one inspected
/// wins - callers are expected to feed single-video/single-audio files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamAssessment {
    /// Video must be re-encoded (not hvc1, HDR, or no video stream found)
    pub video_codec_needed: bool,
    /// The video codec itself was wrong (drives the "video codec" reason)
    pub video_not_hvc1: bool,
    /// HDR content must be tone-mapped to SDR
    pub hdr_to_sdr_needed: bool,
    /// Audio must be re-encoded to AAC
    pub audio_codec_needed: bool,
    /// Channel count to preserve through a conversion
    pub audio_channels: u32,
}

impl Default for StreamAssessment {
    fn default() -> Self {
        // No streams seen yet: assume both need re-encoding. A file with no
        // video stream at all still gets a convert decision.
        Self {
            video_codec_needed: true,
            video_not_hvc1: false,
            hdr_to_sdr_needed: false,
            audio_codec_needed: true,
            audio_channels: 2,
        }
    }
}

/// Inspect every stream and derive the compatibility flags.
pub fn assess(output: &ProbeOutput) -> StreamAssessment {
    let mut assessment = StreamAssessment::default();

    for stream in &output.streams {
        match stream.codec_type.as_deref() {
            Some("video") => {
                let hvc1 = is_hvc1(stream);
                let hdr = is_hdr(stream);
                assessment.video_codec_needed = !(hvc1 && !hdr);
                assessment.video_not_hvc1 = !hvc1;
                assessment.hdr_to_sdr_needed = hdr;
            }
            Some("audio") => {
                assessment.audio_codec_needed = stream.codec_name.as_deref() != Some("aac");
                assessment.audio_channels = stream.channels.unwrap_or(2);
            }
            _ => {}
        }
    }

    assessment
}

/// True for HEVC streams carrying the `hvc1` codec tag.
///
/// The codec name is compared exactly as ffprobe reports it; only the tag
/// string is case-folded.
pub fn is_hvc1(stream: &ProbeStream) -> bool {
    stream.codec_name.as_deref() == Some("hevc")
        && stream
            .codec_tag_string
            .as_deref()
            .is_some_and(|tag| tag.to_lowercase() == "hvc1")
}

/// HDR detection, evaluated in fixed order with the first hit winning:
/// 1. an explicit HDR transfer function (`color_transfer`, falling back to
///    `color_trc`),
/// 2. a Dolby Vision pixel format,
/// 3. 10-bit+ depth combined with wide-gamut primaries.
pub fn is_hdr(stream: &ProbeStream) -> bool {
    let transfer = stream
        .color_transfer
        .as_deref()
        .filter(|t| !t.is_empty())
        .or(stream.color_trc.as_deref())
        .unwrap_or("")
        .to_lowercase();
    if HDR_TRANSFERS.contains(&transfer.as_str()) {
        return true;
    }

    let pix_fmt = stream.pix_fmt.as_deref().unwrap_or("").to_lowercase();
    if pix_fmt.contains("dovi") {
        return true;
    }

    let primaries = stream
        .color_primaries
        .as_deref()
        .unwrap_or("")
        .to_lowercase();
    if ["10", "12", "16"].iter().any(|bits| pix_fmt.contains(bits))
        && WIDE_GAMUT_PRIMARIES.contains(&primaries.as_str())
    {
        return true;
    }

    false
}

/// Containers other than MOV need a remux
pub fn container_needs_remux(extension: &str) -> bool {
    !extension.eq_ignore_ascii_case("mov")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video_stream(codec: &str, tag: &str) -> ProbeStream {
        ProbeStream {
            codec_type: Some("video".to_string()),
            codec_name: Some(codec.to_string()),
            codec_tag_string: Some(tag.to_string()),
            ..Default::default()
        }
    }

    fn audio_stream(codec: &str, channels: Option<u32>) -> ProbeStream {
        ProbeStream {
            codec_type: Some("audio".to_string()),
            codec_name: Some(codec.to_string()),
            channels,
            ..Default::default()
        }
    }

    #[test]
    fn hvc1_requires_hevc_and_tag() {
        assert!(is_hvc1(&video_stream("hevc", "hvc1")));
        assert!(is_hvc1(&video_stream("hevc", "HVC1")));
        assert!(!is_hvc1(&video_stream("hevc", "hev1")));
        assert!(!is_hvc1(&video_stream("h264", "hvc1")));
    }

    #[test]
    fn hdr_from_explicit_transfer() {
        let mut stream = video_stream("hevc", "hvc1");
        stream.color_transfer = Some("smpte2084".to_string());
        assert!(is_hdr(&stream));

        stream.color_transfer = Some("ARIB-STD-B67".to_string());
        assert!(is_hdr(&stream));
    }

    #[test]
    fn hdr_transfer_falls_back_to_color_trc() {
        let mut stream = video_stream("hevc", "hvc1");
        stream.color_trc = Some("smpte2084".to_string());
        assert!(is_hdr(&stream));
    }

    #[test]
    fn hdr_from_dolby_vision_pix_fmt() {
        let mut stream = video_stream("hevc", "hvc1");
        stream.pix_fmt = Some("dovi_yuv420p10le".to_string());
        assert!(is_hdr(&stream));
    }

    #[test]
    fn hdr_from_deep_bits_and_wide_gamut() {
        let mut stream = video_stream("hevc", "hvc1");
        stream.pix_fmt = Some("yuv420p10le".to_string());
        stream.color_primaries = Some("bt2020".to_string());
        assert!(is_hdr(&stream));
    }

    #[test]
    fn deep_bits_without_wide_gamut_is_sdr() {
        let mut stream = video_stream("hevc", "hvc1");
        stream.pix_fmt = Some("yuv420p10le".to_string());
        stream.color_primaries = Some("bt709".to_string());
        assert!(!is_hdr(&stream));
    }

    #[test]
    fn eight_bit_bt2020_is_sdr() {
        let mut stream = video_stream("hevc", "hvc1");
        stream.pix_fmt = Some("yuv420p".to_string());
        stream.color_primaries = Some("bt2020".to_string());
        assert!(!is_hdr(&stream));
    }

    #[test]
    fn compatible_streams_need_nothing() {
        let output = ProbeOutput {
            streams: vec![video_stream("hevc", "hvc1"), audio_stream("aac", Some(2))],
            format: None,
        };
        let assessment = assess(&output);
        assert!(!assessment.video_codec_needed);
        assert!(!assessment.audio_codec_needed);
        assert!(!assessment.hdr_to_sdr_needed);
        assert_eq!(assessment.audio_channels, 2);
    }

    #[test]
    fn h264_video_needs_reencode() {
        let output = ProbeOutput {
            streams: vec![video_stream("h264", "avc1"), audio_stream("aac", Some(2))],
            format: None,
        };
        let assessment = assess(&output);
        assert!(assessment.video_codec_needed);
        assert!(assessment.video_not_hvc1);
        assert!(!assessment.hdr_to_sdr_needed);
    }

    #[test]
    fn hdr_hvc1_still_needs_reencode() {
        let mut stream = video_stream("hevc", "hvc1");
        stream.color_transfer = Some("smpte2084".to_string());
        let output = ProbeOutput {
            streams: vec![stream, audio_stream("aac", Some(2))],
            format: None,
        };
        let assessment = assess(&output);
        assert!(assessment.video_codec_needed);
        assert!(!assessment.video_not_hvc1);
        assert!(assessment.hdr_to_sdr_needed);
    }

    #[test]
    fn mono_audio_channel_count_is_preserved() {
        let output = ProbeOutput {
            streams: vec![audio_stream("pcm_s16le", Some(1))],
            format: None,
        };
        let assessment = assess(&output);
        assert!(assessment.audio_codec_needed);
        assert_eq!(assessment.audio_channels, 1);
    }

    #[test]
    fn missing_channels_defaults_to_stereo() {
        let output = ProbeOutput {
            streams: vec![audio_stream("mp3", None)],
            format: None,
        };
        assert_eq!(assess(&output).audio_channels, 2);
    }

    #[test]
    fn no_streams_at_all_needs_everything() {
        let assessment = assess(&ProbeOutput::default());
        assert!(assessment.video_codec_needed);
        assert!(assessment.audio_codec_needed);
    }

    #[test]
    fn container_rule_is_case_insensitive() {
        assert!(!container_needs_remux("mov"));
        assert!(!container_needs_remux("MOV"));
        assert!(container_needs_remux("mp4"));
        assert!(container_needs_remux("mkv"));
    }
}
