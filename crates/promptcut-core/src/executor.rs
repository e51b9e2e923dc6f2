//! Edit Executor Module
//!
//! Turns a validated operation descriptor plus the current video handle into
//! a new handle. Each operation kind maps to exactly one ffmpeg invocation,
//! built by a pure planning step so the descriptor-to-command translation is
//! testable without ffmpeg installed. The input file is never modified; every
//! transform writes a new file and the prior handle stays valid for undo.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::descriptor::{MirrorAxis, Operation, OperationDescriptor};
use crate::error::{EditError, EditResult};
use crate::ffmpeg::{FFmpegRunner, MediaInfo};
use crate::handle::VideoHandle;
use crate::position::Position;

// =============================================================================
// Outcome
// =============================================================================

/// Result of executing one operation
#[derive(Clone, Debug)]
pub enum TransformOutcome {
    /// The transform produced a new video handle (pushed to history).
    NewHandle(VideoHandle),
    /// The operation wrote a side output (e.g. an extracted audio file);
    /// the video handle and the history are unchanged.
    SideOutput(PathBuf),
}

// =============================================================================
// Planning
// =============================================================================

/// Everything the pure planner needs to build an argument vector
#[derive(Debug)]
pub struct PlanContext<'a> {
    /// Input video file
    pub input: &'a Path,
    /// Output file the command must write
    pub output: &'a Path,
    /// Probed metadata of the input
    pub media: &'a MediaInfo,
    /// Encoder thread count
    pub threads: usize,
    /// Probed metadata of the secondary video (picture-in-picture)
    pub secondary: Option<&'a MediaInfo>,
    /// Probed metadata of appended clips, in order (concat)
    pub appended: &'a [(PathBuf, MediaInfo)],
}

fn s(x: impl Into<String>) -> String {
    x.into()
}

/// Builds the ffmpeg argument vector for an operation. Pure: no filesystem
/// or subprocess access.
pub fn plan(op: &Operation, ctx: &PlanContext<'_>) -> EditResult<Vec<String>> {
    let input = ctx.input.to_string_lossy().to_string();
    let output = ctx.output.to_string_lossy().to_string();
    let duration = ctx.media.duration_sec;
    let has_audio = ctx.media.has_audio();

    let mut args: Vec<String> = Vec::new();

    match op {
        Operation::Trim(p) => {
            args.extend([s("-i"), input, s("-ss"), format_sec(p.start_sec)]);
            if let Some(end) = p.end_sec {
                args.extend([s("-to"), format_sec(end)]);
            }
            args.extend(encode_tail(ctx.threads, has_audio));
        }

        Operation::ChangeSpeed(p) => {
            args.extend([s("-i"), input]);
            if has_audio {
                args.extend([
                    s("-filter_complex"),
                    format!(
                        "[0:v]setpts=PTS/{factor}[v];[0:a]{atempo}[a]",
                        factor = p.factor,
                        atempo = atempo_chain(p.factor)
                    ),
                    s("-map"),
                    s("[v]"),
                    s("-map"),
                    s("[a]"),
                ]);
            } else {
                args.extend([s("-vf"), format!("setpts=PTS/{}", p.factor)]);
            }
            args.extend(encode_tail(ctx.threads, has_audio));
        }

        Operation::AddText(p) => {
            let window = p.duration_sec.unwrap_or(duration - p.start_sec);
            let end = (p.start_sec + window).min(duration);
            let (x, y) = Position::parse(&p.position)?.drawtext_expr();

            let mut drawtext = format!(
                "drawtext=text='{}':fontsize={}:fontcolor={}:x={}:y={}:\
                 borderw=2:bordercolor=black:enable='between(t,{},{})'",
                escape_drawtext(&p.text),
                p.font_size,
                p.color,
                x,
                y,
                format_sec(p.start_sec),
                format_sec(end),
            );
            if let Some(font) = &p.font {
                drawtext.push_str(&format!(":fontfile='{}'", escape_drawtext(font)));
            }

            args.extend([s("-i"), input, s("-vf"), drawtext]);
            args.extend(encode_tail(ctx.threads, has_audio));
        }

        Operation::MuteAudio => {
            args.extend([s("-i"), input, s("-c:v"), s("copy"), s("-an"), s("-y"), output]);
            return Ok(args);
        }

        Operation::AdjustVolume(p) => {
            args.extend([
                s("-i"),
                input,
                s("-c:v"),
                s("copy"),
                s("-filter:a"),
                format!("volume={}", p.factor),
                s("-c:a"),
                s("aac"),
                s("-y"),
                output,
            ]);
            return Ok(args);
        }

        Operation::NormalizeAudio => {
            args.extend([
                s("-i"),
                input,
                s("-c:v"),
                s("copy"),
                s("-filter:a"),
                s("loudnorm"),
                s("-c:a"),
                s("aac"),
                s("-y"),
                output,
            ]);
            return Ok(args);
        }

        Operation::Grayscale => {
            args.extend([s("-i"), input, s("-vf"), s("hue=s=0")]);
            args.extend(encode_tail(ctx.threads, has_audio));
        }

        Operation::InvertColors => {
            args.extend([s("-i"), input, s("-vf"), s("negate")]);
            args.extend(encode_tail(ctx.threads, has_audio));
        }

        Operation::GammaCorrect(p) => {
            args.extend([s("-i"), input, s("-vf"), format!("eq=gamma={}", p.gamma)]);
            args.extend(encode_tail(ctx.threads, has_audio));
        }

        Operation::Blur(p) => {
            args.extend([s("-i"), input, s("-vf"), format!("boxblur={}", p.radius)]);
            args.extend(encode_tail(ctx.threads, has_audio));
        }

        Operation::Rotate(p) => {
            args.extend([s("-i"), input, s("-vf"), rotate_filter(p.degrees)]);
            args.extend(encode_tail(ctx.threads, has_audio));
        }

        Operation::Mirror(p) => {
            let filter = match p.axis {
                MirrorAxis::Horizontal => "hflip",
                MirrorAxis::Vertical => "vflip",
            };
            args.extend([s("-i"), input, s("-vf"), s(filter)]);
            args.extend(encode_tail(ctx.threads, has_audio));
        }

        Operation::FadeIn(p) => {
            args.extend([
                s("-i"),
                input,
                s("-vf"),
                format!("fade=t=in:st=0:d={}", format_sec(p.duration_sec)),
            ]);
            if has_audio {
                args.extend([
                    s("-af"),
                    format!("afade=t=in:st=0:d={}", format_sec(p.duration_sec)),
                ]);
            }
            args.extend(encode_tail(ctx.threads, has_audio));
        }

        Operation::FadeOut(p) => {
            let st = (duration - p.duration_sec).max(0.0);
            args.extend([
                s("-i"),
                input,
                s("-vf"),
                format!(
                    "fade=t=out:st={}:d={}",
                    format_sec(st),
                    format_sec(p.duration_sec)
                ),
            ]);
            if has_audio {
                args.extend([
                    s("-af"),
                    format!(
                        "afade=t=out:st={}:d={}",
                        format_sec(st),
                        format_sec(p.duration_sec)
                    ),
                ]);
            }
            args.extend(encode_tail(ctx.threads, has_audio));
        }

        Operation::ExtractAudio(_) => {
            args.extend([
                s("-i"),
                input,
                s("-vn"),
                s("-acodec"),
                s("libmp3lame"),
                s("-q:a"),
                s("2"),
                s("-y"),
                output,
            ]);
            return Ok(args);
        }

        Operation::AddBackgroundMusic(p) => {
            args.extend([s("-i"), input]);
            if p.loop_music {
                args.extend([s("-stream_loop"), s("-1")]);
            }
            args.extend([s("-i"), p.music_path.clone()]);

            let delay_ms = (p.offset_sec * 1000.0).round() as u64;
            let music_chain = format!("volume={},adelay={}:all=1", p.volume, delay_ms);
            let filter = if has_audio {
                format!(
                    "[1:a]{}[m];[0:a][m]amix=inputs=2:duration=first:dropout_transition=2[a]",
                    music_chain
                )
            } else {
                format!("[1:a]{}[a]", music_chain)
            };

            args.extend([
                s("-filter_complex"),
                filter,
                s("-map"),
                s("0:v"),
                s("-map"),
                s("[a]"),
                s("-c:v"),
                s("copy"),
                s("-c:a"),
                s("aac"),
                s("-t"),
                format_sec(duration),
                s("-y"),
                output,
            ]);
            return Ok(args);
        }

        Operation::ImageOverlay(p) => {
            let (_, frame_h) = ctx.media.resolution().unwrap_or((1920, 1080));
            let overlay_h = ((frame_h as f64) * p.scale).round().max(1.0) as u32;
            let window = p.duration_sec.unwrap_or(duration - p.start_sec);
            let end = (p.start_sec + window).min(duration);
            let (x, y) = Position::parse(&p.position)?.overlay_expr();

            args.extend([s("-i"), input, s("-i"), p.image_path.clone()]);
            args.extend([
                s("-filter_complex"),
                format!(
                    "[1:v]scale=-1:{h},format=rgba,colorchannelmixer=aa={a}[ov];\
                     [0:v][ov]overlay={x}:{y}:enable='between(t,{s0},{s1})'[v]",
                    h = overlay_h,
                    a = p.opacity,
                    x = x,
                    y = y,
                    s0 = format_sec(p.start_sec),
                    s1 = format_sec(end),
                ),
                s("-map"),
                s("[v]"),
            ]);
            if has_audio {
                args.extend([s("-map"), s("0:a"), s("-c:a"), s("copy")]);
            }
            args.extend(video_encode_tail(ctx.threads));
        }

        Operation::PictureInPicture(p) => {
            let (frame_w, _) = ctx.media.resolution().unwrap_or((1920, 1080));
            let pip_w = ((frame_w as f64) * p.scale).round().max(2.0) as u32;
            // Keep even for yuv420p.
            let pip_w = pip_w - pip_w % 2;

            let secondary_duration = ctx
                .secondary
                .map(|m| m.duration_sec)
                .unwrap_or(duration - p.start_sec);
            let window = p
                .duration_sec
                .unwrap_or_else(|| secondary_duration.min(duration - p.start_sec));
            let end = (p.start_sec + window).min(duration);
            let (x, y) = Position::parse(&p.position)?.overlay_expr();

            args.extend([s("-i"), input, s("-i"), p.video_path.clone()]);
            args.extend([
                s("-filter_complex"),
                format!(
                    "[1:v]scale={w}:-2[pip];\
                     [0:v][pip]overlay={x}:{y}:enable='between(t,{s0},{s1})'[v]",
                    w = pip_w,
                    x = x,
                    y = y,
                    s0 = format_sec(p.start_sec),
                    s1 = format_sec(end),
                ),
                s("-map"),
                s("[v]"),
            ]);
            if has_audio {
                args.extend([s("-map"), s("0:a"), s("-c:a"), s("copy")]);
            }
            args.extend(video_encode_tail(ctx.threads));
        }

        Operation::Concat(p) => {
            // The graph maps [{i}:a] for every input when the main clip has
            // audio, so a silent appended clip is a validation failure here
            // rather than an opaque ffmpeg error later.
            if has_audio {
                for (path, media) in ctx.appended {
                    if !media.has_audio() {
                        return Err(EditError::ValidationError(format!(
                            "{} has no audio track but the main video does",
                            path.display()
                        )));
                    }
                }
            }

            let (w, h) = ctx.media.resolution().unwrap_or((1920, 1080));
            let total = 1 + p.paths.len();

            args.extend([s("-i"), input]);
            for path in &p.paths {
                args.extend([s("-i"), path.clone()]);
            }

            // Scale every input to the main resolution so the concat filter
            // accepts them.
            let mut filter = String::new();
            let mut pads = String::new();
            for i in 0..total {
                filter.push_str(&format!(
                    "[{i}:v]scale={w}:{h}:force_original_aspect_ratio=decrease,\
                     pad={w}:{h}:(ow-iw)/2:(oh-ih)/2,setsar=1[v{i}];",
                ));
                pads.push_str(&format!("[v{i}]"));
                if has_audio {
                    pads.push_str(&format!("[{i}:a]"));
                }
            }
            filter.push_str(&format!(
                "{pads}concat=n={total}:v=1:a={a}[v]{atail}",
                a = if has_audio { 1 } else { 0 },
                atail = if has_audio { "[a]" } else { "" },
            ));

            args.extend([s("-filter_complex"), filter, s("-map"), s("[v]")]);
            if has_audio {
                args.extend([s("-map"), s("[a]"), s("-c:a"), s("aac")]);
            }
            args.extend(video_encode_tail(ctx.threads));
        }
    }

    args.push(output);
    Ok(args)
}

/// Shared encoding arguments; the caller appends the output path.
fn encode_tail(threads: usize, has_audio: bool) -> Vec<String> {
    let mut tail = vec![
        s("-c:v"),
        s("libx264"),
        s("-preset"),
        s("medium"),
        s("-crf"),
        s("23"),
    ];
    if has_audio {
        tail.extend([s("-c:a"), s("aac")]);
    }
    tail.extend([s("-threads"), threads.to_string(), s("-y")]);
    tail
}

/// Video-only encoding arguments for filter_complex graphs that map audio
/// explicitly.
fn video_encode_tail(threads: usize) -> Vec<String> {
    vec![
        s("-c:v"),
        s("libx264"),
        s("-preset"),
        s("medium"),
        s("-crf"),
        s("23"),
        s("-threads"),
        threads.to_string(),
        s("-y"),
    ]
}

/// `atempo` only accepts factors in [0.5, 2.0] per stage; larger changes are
/// chained.
fn atempo_chain(factor: f64) -> String {
    let mut stages: Vec<String> = Vec::new();
    let mut remaining = factor;
    while remaining > 2.0 {
        stages.push(s("atempo=2.0"));
        remaining /= 2.0;
    }
    while remaining < 0.5 {
        stages.push(s("atempo=0.5"));
        remaining /= 0.5;
    }
    stages.push(format!("atempo={}", remaining));
    stages.join(",")
}

fn rotate_filter(degrees: f64) -> String {
    let normalized = degrees.rem_euclid(360.0);
    if (normalized - 90.0).abs() < f64::EPSILON {
        s("transpose=1")
    } else if (normalized - 180.0).abs() < f64::EPSILON {
        s("transpose=1,transpose=1")
    } else if (normalized - 270.0).abs() < f64::EPSILON {
        s("transpose=2")
    } else {
        let radians = normalized.to_radians();
        format!(
            "rotate={r}:ow=rotw({r}):oh=roth({r})",
            r = format_sec(radians)
        )
    }
}

fn format_sec(value: f64) -> String {
    format!("{:.3}", value)
}

/// Escapes text for ffmpeg's drawtext filter.
fn escape_drawtext(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace(':', "\\:")
        .replace('%', "\\%")
}

// =============================================================================
// Executor
// =============================================================================

/// Executes validated operation descriptors through ffmpeg
#[derive(Clone)]
pub struct EditExecutor {
    runner: FFmpegRunner,
}

impl EditExecutor {
    /// Creates an executor on a detected ffmpeg installation.
    pub fn new(runner: FFmpegRunner) -> Self {
        Self { runner }
    }

    /// The underlying runner (shared with the preview driver).
    pub fn runner(&self) -> &FFmpegRunner {
        &self.runner
    }

    /// Applies one operation to the current handle. Writes into `output_dir`
    /// and returns a new handle; the input handle is untouched either way.
    pub async fn execute(
        &self,
        descriptor: &OperationDescriptor,
        current: &VideoHandle,
        output_dir: &Path,
        edit_index: usize,
    ) -> EditResult<TransformOutcome> {
        if !descriptor.validated {
            return Err(EditError::Internal(
                "Executor received an unvalidated descriptor".to_string(),
            ));
        }
        if !current.exists() {
            return Err(EditError::FileNotFound(
                current.path.display().to_string(),
            ));
        }

        descriptor.validate_against_duration(current.duration_sec())?;
        self.check_audio_requirements(descriptor, current)?;
        self.check_input_files(descriptor)?;

        let output = self.output_path(descriptor, current, output_dir, edit_index);
        let secondary = self.probe_secondary(descriptor).await?;
        let appended = self.probe_appended(descriptor).await?;

        let ctx = PlanContext {
            input: &current.path,
            output: &output,
            media: &current.media,
            threads: num_cpus::get(),
            secondary: secondary.as_ref(),
            appended: &appended,
        };
        let args = plan(&descriptor.op, &ctx)?;

        info!(
            kind = %descriptor.kind(),
            input = %current.path.display(),
            output = %output.display(),
            "Executing edit"
        );
        self.runner.run_transform(&args).await?;

        if matches!(descriptor.op, Operation::ExtractAudio(_)) {
            return Ok(TransformOutcome::SideOutput(output));
        }

        let media = self.runner.probe(&output).await?;
        Ok(TransformOutcome::NewHandle(VideoHandle::new(output, media)))
    }

    fn output_path(
        &self,
        descriptor: &OperationDescriptor,
        current: &VideoHandle,
        output_dir: &Path,
        edit_index: usize,
    ) -> PathBuf {
        if let Operation::ExtractAudio(p) = &descriptor.op {
            // Side outputs must outlive the session, so they stay out of the
            // scratch dir; relative names resolve against the working
            // directory.
            let name = p.output.clone().unwrap_or_else(|| {
                let stem = current
                    .path
                    .file_stem()
                    .map(|x| x.to_string_lossy().to_string())
                    .unwrap_or_else(|| "video".to_string());
                format!("{}_audio.mp3", stem)
            });
            return PathBuf::from(name);
        }
        output_dir.join(current.derived_file_name(edit_index, descriptor.kind().as_str()))
    }

    /// Operations that touch the audio track need one to exist.
    fn check_audio_requirements(
        &self,
        descriptor: &OperationDescriptor,
        current: &VideoHandle,
    ) -> EditResult<()> {
        let needs_audio = matches!(
            descriptor.op,
            Operation::AdjustVolume(_) | Operation::NormalizeAudio | Operation::ExtractAudio(_)
        );
        if needs_audio && !current.media.has_audio() {
            return Err(EditError::ValidationError(
                "The video has no audio track".to_string(),
            ));
        }
        Ok(())
    }

    /// Side-input files must exist before ffmpeg is spawned.
    fn check_input_files(&self, descriptor: &OperationDescriptor) -> EditResult<()> {
        let paths: Vec<&str> = match &descriptor.op {
            Operation::AddBackgroundMusic(p) => vec![&p.music_path],
            Operation::ImageOverlay(p) => vec![&p.image_path],
            Operation::PictureInPicture(p) => vec![&p.video_path],
            Operation::Concat(p) => p.paths.iter().map(String::as_str).collect(),
            Operation::AddText(p) => p.font.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        };
        for path in paths {
            if !Path::new(path).exists() {
                return Err(EditError::FileNotFound(path.to_string()));
            }
        }
        Ok(())
    }

    async fn probe_secondary(
        &self,
        descriptor: &OperationDescriptor,
    ) -> EditResult<Option<MediaInfo>> {
        if let Operation::PictureInPicture(p) = &descriptor.op {
            let media = self.runner.probe(Path::new(&p.video_path)).await?;
            return Ok(Some(media));
        }
        Ok(None)
    }

    async fn probe_appended(
        &self,
        descriptor: &OperationDescriptor,
    ) -> EditResult<Vec<(PathBuf, MediaInfo)>> {
        let mut out = Vec::new();
        if let Operation::Concat(p) = &descriptor.op {
            for path in &p.paths {
                let path = PathBuf::from(path);
                let media = self.runner.probe(&path).await?;
                if media.video.is_none() {
                    return Err(EditError::UnsupportedFormat(format!(
                        "{} has no video stream",
                        path.display()
                    )));
                }
                out.push((path, media));
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::OperationDescriptor;
    use crate::ffmpeg::{AudioStreamInfo, VideoStreamInfo};
    use serde_json::json;

    fn media(duration_sec: f64, with_audio: bool) -> MediaInfo {
        MediaInfo {
            duration_sec,
            video: Some(VideoStreamInfo {
                width: 1920,
                height: 1080,
                fps: 30.0,
                codec: "h264".to_string(),
            }),
            audio: with_audio.then(|| AudioStreamInfo {
                sample_rate: 48000,
                channels: 2,
                codec: "aac".to_string(),
            }),
            format: "mp4".to_string(),
            size_bytes: 0,
        }
    }

    fn plan_for(op_json: serde_json::Value, media: &MediaInfo) -> Vec<String> {
        let descriptor = OperationDescriptor::from_ai_value(op_json).unwrap();
        let ctx = PlanContext {
            input: Path::new("/in/clip.mp4"),
            output: Path::new("/out/clip_edit_001.mp4"),
            media,
            threads: 4,
            secondary: None,
            appended: &[],
        };
        plan(&descriptor.op, &ctx).unwrap()
    }

    fn find_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .map(String::as_str)
    }

    #[test]
    fn test_plan_trim_keeps_start_to_end() {
        let media = media(20.0, true);
        let args = plan_for(json!({"action": "trim", "start_sec": 5.0}), &media);

        assert_eq!(find_value(&args, "-ss"), Some("5.000"));
        assert!(!args.contains(&"-to".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("/out/clip_edit_001.mp4"));

        let args = plan_for(
            json!({"action": "trim", "start_sec": 2.0, "end_sec": 8.0}),
            &media,
        );
        assert_eq!(find_value(&args, "-ss"), Some("2.000"));
        assert_eq!(find_value(&args, "-to"), Some("8.000"));
    }

    #[test]
    fn test_plan_change_speed_scales_audio_tempo() {
        let args = plan_for(json!({"action": "change_speed", "factor": 4.0}), &media(10.0, true));
        let filter = find_value(&args, "-filter_complex").unwrap();
        assert!(filter.contains("setpts=PTS/4"));
        assert!(filter.contains("atempo=2.0,atempo=2"));

        // No audio stream: plain video filter, no filter_complex.
        let args = plan_for(json!({"action": "change_speed", "factor": 2.0}), &media(10.0, false));
        assert!(find_value(&args, "-filter_complex").is_none());
        assert_eq!(find_value(&args, "-vf"), Some("setpts=PTS/2"));
    }

    #[test]
    fn test_atempo_chain_stays_in_range() {
        assert_eq!(atempo_chain(2.0), "atempo=2");
        assert_eq!(atempo_chain(8.0), "atempo=2.0,atempo=2.0,atempo=2");
        assert_eq!(atempo_chain(0.25), "atempo=0.5,atempo=0.5");
        assert_eq!(atempo_chain(1.5), "atempo=1.5");
    }

    #[test]
    fn test_plan_add_text_centers_and_windows() {
        let args = plan_for(
            json!({
                "action": "add_text",
                "text": "Hello: world",
                "start_sec": 2.0,
                "duration_sec": 3.0
            }),
            &media(20.0, true),
        );
        let vf = find_value(&args, "-vf").unwrap();
        assert!(vf.contains("drawtext"));
        assert!(vf.contains("Hello\\: world"));
        assert!(vf.contains("x=(w-text_w)/2"));
        assert!(vf.contains("y=(h-text_h)/2"));
        assert!(vf.contains("between(t,2.000,5.000)"));
        assert!(vf.contains("fontsize=36"));
        assert!(vf.contains("fontcolor=white"));
    }

    #[test]
    fn test_plan_add_text_defaults_to_remainder() {
        let args = plan_for(
            json!({"action": "add_text", "text": "Hi", "start_sec": 5.0}),
            &media(20.0, true),
        );
        let vf = find_value(&args, "-vf").unwrap();
        assert!(vf.contains("between(t,5.000,20.000)"));
    }

    #[test]
    fn test_plan_mute_audio_copies_video() {
        let args = plan_for(json!({"action": "mute_audio"}), &media(10.0, true));
        assert!(args.contains(&"-an".to_string()));
        assert_eq!(find_value(&args, "-c:v"), Some("copy"));
    }

    #[test]
    fn test_plan_fade_out_starts_before_end() {
        let args = plan_for(
            json!({"action": "fade_out", "duration_sec": 2.0}),
            &media(10.0, true),
        );
        assert_eq!(find_value(&args, "-vf"), Some("fade=t=out:st=8.000:d=2.000"));
        assert_eq!(find_value(&args, "-af"), Some("afade=t=out:st=8.000:d=2.000"));
    }

    #[test]
    fn test_plan_rotate_right_angles_use_transpose() {
        let media = media(10.0, false);
        let args = plan_for(json!({"action": "rotate", "degrees": 90.0}), &media);
        assert_eq!(find_value(&args, "-vf"), Some("transpose=1"));

        let args = plan_for(json!({"action": "rotate", "degrees": -90.0}), &media);
        assert_eq!(find_value(&args, "-vf"), Some("transpose=2"));

        let args = plan_for(json!({"action": "rotate", "degrees": 45.0}), &media);
        assert!(find_value(&args, "-vf").unwrap().starts_with("rotate="));
    }

    #[test]
    fn test_plan_image_overlay_scales_to_frame_height() {
        let args = plan_for(
            json!({"action": "image_overlay", "image_path": "/tmp/logo.png", "scale": 0.1}),
            &media(10.0, true),
        );
        let filter = find_value(&args, "-filter_complex").unwrap();
        // 10% of 1080 = 108 px tall
        assert!(filter.contains("scale=-1:108"));
        assert!(filter.contains("colorchannelmixer=aa=0.8"));
        // default position bottom_right
        assert!(filter.contains("overlay=W-w-10:H-h-10"));
        // main audio passes through untouched
        assert!(args.windows(2).any(|w| w[0] == "-map" && w[1] == "0:a"));
    }

    #[test]
    fn test_plan_picture_in_picture_quarter_width() {
        let descriptor = OperationDescriptor::from_ai_value(
            json!({"action": "picture_in_picture", "video_path": "/tmp/inset.mp4"}),
        )
        .unwrap();
        let main = media(20.0, true);
        let inset = media(6.0, true);
        let ctx = PlanContext {
            input: Path::new("/in/clip.mp4"),
            output: Path::new("/out/out.mp4"),
            media: &main,
            threads: 4,
            secondary: Some(&inset),
            appended: &[],
        };
        let args = plan(&descriptor.op, &ctx).unwrap();
        let filter = find_value(&args, "-filter_complex").unwrap();
        // 25% of 1920 = 480 px wide
        assert!(filter.contains("scale=480:-2"));
        // window bounded by the inset's 6s duration
        assert!(filter.contains("between(t,0.000,6.000)"));
        // default position top_right
        assert!(filter.contains("overlay=W-w-10:10"));
    }

    #[test]
    fn test_plan_concat_normalizes_inputs() {
        let descriptor = OperationDescriptor::from_ai_value(
            json!({"action": "concat", "paths": ["/tmp/b.mp4", "/tmp/c.mp4"]}),
        )
        .unwrap();
        let main = media(20.0, true);
        let appended = vec![
            (PathBuf::from("/tmp/b.mp4"), media(5.0, true)),
            (PathBuf::from("/tmp/c.mp4"), media(3.0, true)),
        ];
        let ctx = PlanContext {
            input: Path::new("/in/a.mp4"),
            output: Path::new("/out/out.mp4"),
            media: &main,
            threads: 4,
            secondary: None,
            appended: &appended,
        };
        let args = plan(&descriptor.op, &ctx).unwrap();
        assert_eq!(args.iter().filter(|a| *a == "-i").count(), 3);
        let filter = find_value(&args, "-filter_complex").unwrap();
        assert!(filter.contains("concat=n=3:v=1:a=1"));
        assert!(filter.contains("scale=1920:1080"));
    }

    #[test]
    fn test_extract_audio_default_output_outside_scratch() {
        use crate::ffmpeg::FFmpegInfo;

        let executor = EditExecutor::new(FFmpegRunner::new(FFmpegInfo {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            version: "test".to_string(),
        }));
        let descriptor =
            OperationDescriptor::from_ai_value(json!({"action": "extract_audio"})).unwrap();
        let handle = VideoHandle::new(PathBuf::from("/videos/clip.mp4"), media(10.0, true));

        let out = executor.output_path(&descriptor, &handle, Path::new("/scratch"), 1);
        assert_eq!(out, PathBuf::from("clip_audio.mp3"));
        assert!(!out.starts_with("/scratch"));
    }

    #[test]
    fn test_plan_concat_rejects_silent_appended_clip() {
        let descriptor = OperationDescriptor::from_ai_value(
            json!({"action": "concat", "paths": ["/tmp/b.mp4", "/tmp/silent.mp4"]}),
        )
        .unwrap();
        let main = media(20.0, true);
        let appended = vec![
            (PathBuf::from("/tmp/b.mp4"), media(5.0, true)),
            (PathBuf::from("/tmp/silent.mp4"), media(3.0, false)),
        ];
        let ctx = PlanContext {
            input: Path::new("/in/a.mp4"),
            output: Path::new("/out/out.mp4"),
            media: &main,
            threads: 4,
            secondary: None,
            appended: &appended,
        };
        let err = plan(&descriptor.op, &ctx).unwrap_err();
        assert!(matches!(err, EditError::ValidationError(_)));
        assert!(err.to_string().contains("silent.mp4"));

        // A silent main clip does not care about appended audio.
        let silent_main = media(20.0, false);
        let ctx = PlanContext {
            input: Path::new("/in/a.mp4"),
            output: Path::new("/out/out.mp4"),
            media: &silent_main,
            threads: 4,
            secondary: None,
            appended: &appended,
        };
        let args = plan(&descriptor.op, &ctx).unwrap();
        let filter = find_value(&args, "-filter_complex").unwrap();
        assert!(filter.contains("concat=n=3:v=1:a=0"));
    }

    #[test]
    fn test_plan_background_music_mixes_under_audio() {
        let args = plan_for(
            json!({
                "action": "add_background_music",
                "music_path": "/tmp/song.mp3",
                "volume": 0.5,
                "offset_sec": 2.0,
                "loop_music": true
            }),
            &media(30.0, true),
        );
        assert!(args.windows(2).any(|w| w[0] == "-stream_loop" && w[1] == "-1"));
        let filter = find_value(&args, "-filter_complex").unwrap();
        assert!(filter.contains("volume=0.5"));
        assert!(filter.contains("adelay=2000:all=1"));
        assert!(filter.contains("amix=inputs=2:duration=first"));
        // output clamped to the main video's length
        assert_eq!(find_value(&args, "-t"), Some("30.000"));
    }

    #[test]
    fn test_plan_extract_audio_is_audio_only() {
        let args = plan_for(json!({"action": "extract_audio"}), &media(10.0, true));
        assert!(args.contains(&"-vn".to_string()));
        assert_eq!(find_value(&args, "-acodec"), Some("libmp3lame"));
    }

    #[test]
    fn test_escape_drawtext() {
        assert_eq!(escape_drawtext("a:b'c"), "a\\:b\\'c");
        assert_eq!(escape_drawtext("50%"), "50\\%");
    }
}
