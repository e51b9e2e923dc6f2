//! Operation Descriptor Module
//!
//! Typed, validated form of an edit operation. The AI service's structured
//! response is decoded here as a strict tagged union: the `action` field
//! selects the operation kind, every variant's parameter struct carries
//! `deny_unknown_fields`, and unknown kinds are rejected rather than ignored.
//! Range checks never clamp; out-of-range values are errors.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EditError, EditResult};
use crate::position::Position;
use crate::registry::OperationKind;

// =============================================================================
// Parameter Structs
// =============================================================================

/// Parameters for `trim`. The kept range is `[start_sec, end_sec)`, so
/// "cut the first 5 seconds" means `start_sec = 5` with no `end_sec`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrimParams {
    pub start_sec: f64,
    #[serde(default)]
    pub end_sec: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChangeSpeedParams {
    pub factor: f64,
}

fn default_font_size() -> u32 {
    36
}

fn default_color() -> String {
    "white".to_string()
}

fn default_text_position() -> String {
    "center".to_string()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddTextParams {
    pub text: String,
    #[serde(default)]
    pub start_sec: f64,
    #[serde(default)]
    pub duration_sec: Option<f64>,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_text_position")]
    pub position: String,
    #[serde(default)]
    pub font: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdjustVolumeParams {
    pub factor: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GammaCorrectParams {
    pub gamma: f64,
}

fn default_blur_radius() -> f64 {
    2.0
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlurParams {
    #[serde(default = "default_blur_radius")]
    pub radius: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RotateParams {
    pub degrees: f64,
}

/// Mirror axis
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MirrorAxis {
    Horizontal,
    Vertical,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MirrorParams {
    pub axis: MirrorAxis,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FadeParams {
    pub duration_sec: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractAudioParams {
    #[serde(default)]
    pub output: Option<String>,
}

fn default_music_volume() -> f64 {
    0.3
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddBackgroundMusicParams {
    pub music_path: String,
    #[serde(default = "default_music_volume")]
    pub volume: f64,
    #[serde(default)]
    pub offset_sec: f64,
    #[serde(default)]
    pub loop_music: bool,
}

fn default_image_position() -> String {
    "bottom_right".to_string()
}

fn default_image_scale() -> f64 {
    0.1
}

fn default_opacity() -> f64 {
    0.8
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageOverlayParams {
    pub image_path: String,
    #[serde(default = "default_image_position")]
    pub position: String,
    #[serde(default = "default_image_scale")]
    pub scale: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub start_sec: f64,
    #[serde(default)]
    pub duration_sec: Option<f64>,
}

fn default_pip_position() -> String {
    "top_right".to_string()
}

fn default_pip_scale() -> f64 {
    0.25
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PictureInPictureParams {
    pub video_path: String,
    #[serde(default = "default_pip_position")]
    pub position: String,
    #[serde(default = "default_pip_scale")]
    pub scale: f64,
    #[serde(default)]
    pub start_sec: f64,
    #[serde(default)]
    pub duration_sec: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConcatParams {
    pub paths: Vec<String>,
}

// =============================================================================
// Operation
// =============================================================================

/// A fully typed edit operation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    Trim(TrimParams),
    ChangeSpeed(ChangeSpeedParams),
    AddText(AddTextParams),
    MuteAudio,
    AdjustVolume(AdjustVolumeParams),
    NormalizeAudio,
    Grayscale,
    InvertColors,
    GammaCorrect(GammaCorrectParams),
    Blur(BlurParams),
    Rotate(RotateParams),
    Mirror(MirrorParams),
    FadeIn(FadeParams),
    FadeOut(FadeParams),
    ExtractAudio(ExtractAudioParams),
    AddBackgroundMusic(AddBackgroundMusicParams),
    ImageOverlay(ImageOverlayParams),
    PictureInPicture(PictureInPictureParams),
    Concat(ConcatParams),
}

impl Operation {
    /// The operation kind this operation belongs to.
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Trim(_) => OperationKind::Trim,
            Operation::ChangeSpeed(_) => OperationKind::ChangeSpeed,
            Operation::AddText(_) => OperationKind::AddText,
            Operation::MuteAudio => OperationKind::MuteAudio,
            Operation::AdjustVolume(_) => OperationKind::AdjustVolume,
            Operation::NormalizeAudio => OperationKind::NormalizeAudio,
            Operation::Grayscale => OperationKind::Grayscale,
            Operation::InvertColors => OperationKind::InvertColors,
            Operation::GammaCorrect(_) => OperationKind::GammaCorrect,
            Operation::Blur(_) => OperationKind::Blur,
            Operation::Rotate(_) => OperationKind::Rotate,
            Operation::Mirror(_) => OperationKind::Mirror,
            Operation::FadeIn(_) => OperationKind::FadeIn,
            Operation::FadeOut(_) => OperationKind::FadeOut,
            Operation::ExtractAudio(_) => OperationKind::ExtractAudio,
            Operation::AddBackgroundMusic(_) => OperationKind::AddBackgroundMusic,
            Operation::ImageOverlay(_) => OperationKind::ImageOverlay,
            Operation::PictureInPicture(_) => OperationKind::PictureInPicture,
            Operation::Concat(_) => OperationKind::Concat,
        }
    }
}

// =============================================================================
// Operation Descriptor
// =============================================================================

/// Validated operation descriptor, produced by the prompt interpreter and
/// consumed by the edit executor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    /// The typed operation
    pub op: Operation,
    /// Whether schema validation has passed
    pub validated: bool,
}

impl OperationDescriptor {
    /// Decodes an AI response object into a descriptor and runs schema
    /// validation.
    ///
    /// The input must be a JSON object with an `action` tag naming one of the
    /// registered operation kinds; all other fields are the operation's
    /// parameters. Unknown actions, unknown fields, type mismatches, missing
    /// required fields and out-of-range values are all rejected here, never
    /// partially applied.
    pub fn from_ai_value(value: Value) -> EditResult<Self> {
        let mut object = match value {
            Value::Object(map) => map,
            other => {
                return Err(EditError::AiResponseMalformed(format!(
                    "Expected a JSON object, got {}",
                    json_type_name(&other)
                )))
            }
        };

        let action = match object.remove("action") {
            Some(Value::String(s)) => s,
            Some(other) => {
                return Err(EditError::AiResponseMalformed(format!(
                    "\"action\" must be a string, got {}",
                    json_type_name(&other)
                )))
            }
            None => {
                return Err(EditError::AiResponseMalformed(
                    "Response is missing the \"action\" field".to_string(),
                ))
            }
        };

        // The model signals an unsupported request explicitly.
        if action == "unsupported" || action == "error" {
            let reason = object
                .get("reason")
                .or_else(|| object.get("message"))
                .and_then(|v| v.as_str())
                .unwrap_or("no matching operation")
                .to_string();
            return Err(EditError::Unsupported(reason));
        }

        let kind: OperationKind = action
            .parse()
            .map_err(|_| EditError::UnknownOperation(action.clone()))?;

        let params = Value::Object(object);
        let op = decode_params(kind, params)?;

        let mut descriptor = Self {
            op,
            validated: false,
        };
        descriptor.validate_schema()?;
        descriptor.validated = true;
        Ok(descriptor)
    }

    /// Builds a descriptor directly from a typed operation (shell/test path),
    /// running the same schema validation as the AI path.
    pub fn from_operation(op: Operation) -> EditResult<Self> {
        let mut descriptor = Self {
            op,
            validated: false,
        };
        descriptor.validate_schema()?;
        descriptor.validated = true;
        Ok(descriptor)
    }

    /// The operation kind.
    pub fn kind(&self) -> OperationKind {
        self.op.kind()
    }

    /// Schema validation: pure range and format checks that need no video
    /// metadata. Rejects, never clamps.
    fn validate_schema(&self) -> EditResult<()> {
        match &self.op {
            Operation::Trim(p) => {
                require_non_negative("start_sec", p.start_sec)?;
                if let Some(end) = p.end_sec {
                    if end <= p.start_sec {
                        return Err(EditError::InvalidTimeRange(p.start_sec, end));
                    }
                }
            }
            Operation::ChangeSpeed(p) => {
                require_positive("factor", p.factor)?;
                require_in_range("factor", p.factor, 0.0, 100.0)?;
            }
            Operation::AddText(p) => {
                if p.text.trim().is_empty() {
                    return Err(EditError::ValidationError(
                        "Text content is required".to_string(),
                    ));
                }
                require_non_negative("start_sec", p.start_sec)?;
                if let Some(d) = p.duration_sec {
                    require_positive("duration_sec", d)?;
                }
                if p.font_size == 0 {
                    return Err(EditError::ValidationError(
                        "font_size must be greater than zero".to_string(),
                    ));
                }
                validate_color(&p.color)?;
                Position::parse(&p.position)?;
            }
            Operation::MuteAudio
            | Operation::NormalizeAudio
            | Operation::Grayscale
            | Operation::InvertColors => {}
            Operation::AdjustVolume(p) => {
                require_in_range("factor", p.factor, 0.0, 10.0)?;
            }
            Operation::GammaCorrect(p) => {
                require_positive("gamma", p.gamma)?;
                require_in_range("gamma", p.gamma, 0.0, 10.0)?;
            }
            Operation::Blur(p) => {
                require_in_range("radius", p.radius, 0.0, 50.0)?;
            }
            Operation::Rotate(p) => {
                if !p.degrees.is_finite() {
                    return Err(EditError::ValidationError(
                        "degrees must be a finite number".to_string(),
                    ));
                }
            }
            Operation::Mirror(_) => {}
            Operation::FadeIn(p) | Operation::FadeOut(p) => {
                require_positive("duration_sec", p.duration_sec)?;
            }
            Operation::ExtractAudio(_) => {}
            Operation::AddBackgroundMusic(p) => {
                if p.music_path.trim().is_empty() {
                    return Err(EditError::ValidationError(
                        "music_path is required".to_string(),
                    ));
                }
                require_in_range("volume", p.volume, 0.0, 10.0)?;
                require_non_negative("offset_sec", p.offset_sec)?;
            }
            Operation::ImageOverlay(p) => {
                if p.image_path.trim().is_empty() {
                    return Err(EditError::ValidationError(
                        "image_path is required".to_string(),
                    ));
                }
                Position::parse(&p.position)?;
                require_positive("scale", p.scale)?;
                require_in_range("scale", p.scale, 0.0, 1.0)?;
                require_positive("opacity", p.opacity)?;
                require_in_range("opacity", p.opacity, 0.0, 1.0)?;
                require_non_negative("start_sec", p.start_sec)?;
                if let Some(d) = p.duration_sec {
                    require_positive("duration_sec", d)?;
                }
            }
            Operation::PictureInPicture(p) => {
                if p.video_path.trim().is_empty() {
                    return Err(EditError::ValidationError(
                        "video_path is required".to_string(),
                    ));
                }
                Position::parse(&p.position)?;
                require_positive("scale", p.scale)?;
                require_in_range("scale", p.scale, 0.0, 1.0)?;
                require_non_negative("start_sec", p.start_sec)?;
                if let Some(d) = p.duration_sec {
                    require_positive("duration_sec", d)?;
                }
            }
            Operation::Concat(p) => {
                if p.paths.is_empty() {
                    return Err(EditError::ValidationError(
                        "paths must contain at least one video".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Metadata-dependent validation against the current video's duration.
    /// Applied by the executor before any transform is spawned.
    pub fn validate_against_duration(&self, duration_sec: f64) -> EditResult<()> {
        match &self.op {
            Operation::Trim(p) => {
                if p.start_sec >= duration_sec {
                    return Err(EditError::ValidationError(format!(
                        "Trim start {}s is beyond the video duration {}s",
                        p.start_sec, duration_sec
                    )));
                }
                if let Some(end) = p.end_sec {
                    if end > duration_sec {
                        return Err(EditError::ValidationError(format!(
                            "Trim end {}s is beyond the video duration {}s",
                            end, duration_sec
                        )));
                    }
                }
            }
            Operation::AddText(AddTextParams { start_sec, .. })
            | Operation::ImageOverlay(ImageOverlayParams { start_sec, .. })
            | Operation::PictureInPicture(PictureInPictureParams { start_sec, .. }) => {
                if *start_sec >= duration_sec {
                    return Err(EditError::ValidationError(format!(
                        "Overlay start {}s is beyond the video duration {}s",
                        start_sec, duration_sec
                    )));
                }
            }
            Operation::FadeIn(p) | Operation::FadeOut(p) => {
                if p.duration_sec > duration_sec {
                    return Err(EditError::ValidationError(format!(
                        "Fade duration {}s exceeds the video duration {}s",
                        p.duration_sec, duration_sec
                    )));
                }
            }
            _ => {}
        }
        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn decode_params(kind: OperationKind, params: Value) -> EditResult<Operation> {
    fn decode<T: serde::de::DeserializeOwned>(
        kind: OperationKind,
        params: Value,
    ) -> EditResult<T> {
        serde_json::from_value(params)
            .map_err(|e| EditError::ValidationError(format!("Invalid {} parameters: {}", kind, e)))
    }

    fn decode_empty(kind: OperationKind, params: &Value) -> EditResult<()> {
        match params.as_object() {
            Some(map) if map.is_empty() => Ok(()),
            Some(map) => {
                let extra: Vec<&str> = map.keys().map(String::as_str).collect();
                Err(EditError::ValidationError(format!(
                    "{} takes no parameters, got: {}",
                    kind,
                    extra.join(", ")
                )))
            }
            None => Ok(()),
        }
    }

    Ok(match kind {
        OperationKind::Trim => Operation::Trim(decode(kind, params)?),
        OperationKind::ChangeSpeed => Operation::ChangeSpeed(decode(kind, params)?),
        OperationKind::AddText => Operation::AddText(decode(kind, params)?),
        OperationKind::MuteAudio => {
            decode_empty(kind, &params)?;
            Operation::MuteAudio
        }
        OperationKind::AdjustVolume => Operation::AdjustVolume(decode(kind, params)?),
        OperationKind::NormalizeAudio => {
            decode_empty(kind, &params)?;
            Operation::NormalizeAudio
        }
        OperationKind::Grayscale => {
            decode_empty(kind, &params)?;
            Operation::Grayscale
        }
        OperationKind::InvertColors => {
            decode_empty(kind, &params)?;
            Operation::InvertColors
        }
        OperationKind::GammaCorrect => Operation::GammaCorrect(decode(kind, params)?),
        OperationKind::Blur => Operation::Blur(decode(kind, params)?),
        OperationKind::Rotate => Operation::Rotate(decode(kind, params)?),
        OperationKind::Mirror => Operation::Mirror(decode(kind, params)?),
        OperationKind::FadeIn => Operation::FadeIn(decode(kind, params)?),
        OperationKind::FadeOut => Operation::FadeOut(decode(kind, params)?),
        OperationKind::ExtractAudio => Operation::ExtractAudio(decode(kind, params)?),
        OperationKind::AddBackgroundMusic => Operation::AddBackgroundMusic(decode(kind, params)?),
        OperationKind::ImageOverlay => Operation::ImageOverlay(decode(kind, params)?),
        OperationKind::PictureInPicture => Operation::PictureInPicture(decode(kind, params)?),
        OperationKind::Concat => Operation::Concat(decode(kind, params)?),
    })
}

fn require_non_negative(name: &str, value: f64) -> EditResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(EditError::ValidationError(format!(
            "{} must be a non-negative number, got {}",
            name, value
        )));
    }
    Ok(())
}

fn require_positive(name: &str, value: f64) -> EditResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(EditError::ValidationError(format!(
            "{} must be greater than zero, got {}",
            name, value
        )));
    }
    Ok(())
}

fn require_in_range(name: &str, value: f64, min: f64, max: f64) -> EditResult<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(EditError::ValidationError(format!(
            "{} out of range: {} (expected {} to {})",
            name, value, min, max
        )));
    }
    Ok(())
}

fn validate_color(color: &str) -> EditResult<()> {
    let color = color.trim();
    if color.is_empty() {
        return Err(EditError::ValidationError(
            "color must not be empty".to_string(),
        ));
    }
    if let Some(hex) = color.strip_prefix('#') {
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(EditError::ValidationError(format!(
                "Invalid hex color: {}",
                color
            )));
        }
    } else if !color.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(EditError::ValidationError(format!(
            "Invalid color name: {}",
            color
        )));
    }
    Ok(())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureClass;
    use serde_json::json;

    #[test]
    fn test_decode_trim() {
        let descriptor =
            OperationDescriptor::from_ai_value(json!({"action": "trim", "start_sec": 5.0}))
                .unwrap();
        assert!(descriptor.validated);
        assert_eq!(descriptor.kind(), OperationKind::Trim);
        assert_eq!(
            descriptor.op,
            Operation::Trim(TrimParams {
                start_sec: 5.0,
                end_sec: None
            })
        );
    }

    #[test]
    fn test_decode_add_text_defaults() {
        let descriptor = OperationDescriptor::from_ai_value(
            json!({"action": "add_text", "text": "Hello"}),
        )
        .unwrap();
        match descriptor.op {
            Operation::AddText(p) => {
                assert_eq!(p.font_size, 36);
                assert_eq!(p.color, "white");
                assert_eq!(p.position, "center");
                assert_eq!(p.start_sec, 0.0);
                assert!(p.duration_sec.is_none());
            }
            other => panic!("unexpected operation: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_action_rejected() {
        let err = OperationDescriptor::from_ai_value(
            json!({"action": "translate_audio", "language": "fr"}),
        )
        .unwrap_err();
        assert!(matches!(err, EditError::UnknownOperation(_)));
        assert_eq!(err.class(), FailureClass::Interpretation);
    }

    #[test]
    fn test_unsupported_action_carries_reason() {
        let err = OperationDescriptor::from_ai_value(
            json!({"action": "unsupported", "reason": "cannot translate audio"}),
        )
        .unwrap_err();
        match err {
            EditError::Unsupported(reason) => assert!(reason.contains("translate")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = OperationDescriptor::from_ai_value(
            json!({"action": "trim", "start_sec": 1.0, "speed": 2.0}),
        )
        .unwrap_err();
        assert_eq!(err.class(), FailureClass::Validation);
    }

    #[test]
    fn test_missing_required_field_rejected() {
        let err =
            OperationDescriptor::from_ai_value(json!({"action": "change_speed"})).unwrap_err();
        assert_eq!(err.class(), FailureClass::Validation);
    }

    #[test]
    fn test_out_of_range_rejected_not_clamped() {
        // position percentage 150 must be rejected, never clamped
        let err = OperationDescriptor::from_ai_value(
            json!({"action": "add_text", "text": "Hi", "position": "150%,50%"}),
        )
        .unwrap_err();
        assert_eq!(err.class(), FailureClass::Validation);

        let err = OperationDescriptor::from_ai_value(
            json!({"action": "change_speed", "factor": 0.0}),
        )
        .unwrap_err();
        assert_eq!(err.class(), FailureClass::Validation);

        let err = OperationDescriptor::from_ai_value(
            json!({"action": "adjust_volume", "factor": 11.0}),
        )
        .unwrap_err();
        assert_eq!(err.class(), FailureClass::Validation);
    }

    #[test]
    fn test_trim_range_must_be_increasing() {
        let err = OperationDescriptor::from_ai_value(
            json!({"action": "trim", "start_sec": 5.0, "end_sec": 2.0}),
        )
        .unwrap_err();
        assert!(matches!(err, EditError::InvalidTimeRange(_, _)));
    }

    #[test]
    fn test_bare_operation_takes_no_params() {
        assert!(OperationDescriptor::from_ai_value(json!({"action": "mute_audio"})).is_ok());

        let err = OperationDescriptor::from_ai_value(
            json!({"action": "mute_audio", "factor": 0.5}),
        )
        .unwrap_err();
        assert_eq!(err.class(), FailureClass::Validation);
    }

    #[test]
    fn test_mirror_axis_strict() {
        let descriptor = OperationDescriptor::from_ai_value(
            json!({"action": "mirror", "axis": "horizontal"}),
        )
        .unwrap();
        assert_eq!(
            descriptor.op,
            Operation::Mirror(MirrorParams {
                axis: MirrorAxis::Horizontal
            })
        );

        assert!(OperationDescriptor::from_ai_value(
            json!({"action": "mirror", "axis": "diagonal"})
        )
        .is_err());
    }

    #[test]
    fn test_missing_action_is_interpretation_failure() {
        let err = OperationDescriptor::from_ai_value(json!({"start_sec": 5.0})).unwrap_err();
        assert_eq!(err.class(), FailureClass::Interpretation);
    }

    #[test]
    fn test_validate_against_duration() {
        let descriptor =
            OperationDescriptor::from_ai_value(json!({"action": "trim", "start_sec": 25.0}))
                .unwrap();
        assert!(descriptor.validate_against_duration(20.0).is_err());

        let descriptor = OperationDescriptor::from_ai_value(
            json!({"action": "trim", "start_sec": 5.0, "end_sec": 30.0}),
        )
        .unwrap();
        assert!(descriptor.validate_against_duration(20.0).is_err());
        assert!(descriptor.validate_against_duration(40.0).is_ok());

        let descriptor = OperationDescriptor::from_ai_value(
            json!({"action": "fade_out", "duration_sec": 30.0}),
        )
        .unwrap();
        assert!(descriptor.validate_against_duration(20.0).is_err());
    }

    #[test]
    fn test_color_validation() {
        assert!(validate_color("white").is_ok());
        assert!(validate_color("#ff8800").is_ok());
        assert!(validate_color("#ff88").is_err());
        assert!(validate_color("").is_err());
        assert!(validate_color("red; rm -rf").is_err());
    }
}
