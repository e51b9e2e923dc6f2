//! Operation Registry Module
//!
//! Static catalog of the supported edit operations. Each operation kind
//! carries a fixed parameter schema (name, type, default, constraint) used
//! for two things: rendering the catalog into the prompt interpreter's call
//! context, and presenting the menu to the shell. No mutation after startup.
//!
//! The authoritative range checks live on the typed parameter structs in
//! [`crate::descriptor`]; the schema here is the human/model-facing rendering
//! of the same contract.

use serde::{Deserialize, Serialize};

// =============================================================================
// Operation Kind
// =============================================================================

/// All supported edit operation kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Trim,
    ChangeSpeed,
    AddText,
    MuteAudio,
    AdjustVolume,
    NormalizeAudio,
    Grayscale,
    InvertColors,
    GammaCorrect,
    Blur,
    Rotate,
    Mirror,
    FadeIn,
    FadeOut,
    ExtractAudio,
    AddBackgroundMusic,
    ImageOverlay,
    PictureInPicture,
    Concat,
}

impl OperationKind {
    /// All kinds in catalog order.
    pub const ALL: &'static [OperationKind] = &[
        OperationKind::Trim,
        OperationKind::ChangeSpeed,
        OperationKind::AddText,
        OperationKind::MuteAudio,
        OperationKind::AdjustVolume,
        OperationKind::NormalizeAudio,
        OperationKind::Grayscale,
        OperationKind::InvertColors,
        OperationKind::GammaCorrect,
        OperationKind::Blur,
        OperationKind::Rotate,
        OperationKind::Mirror,
        OperationKind::FadeIn,
        OperationKind::FadeOut,
        OperationKind::ExtractAudio,
        OperationKind::AddBackgroundMusic,
        OperationKind::ImageOverlay,
        OperationKind::PictureInPicture,
        OperationKind::Concat,
    ];

    /// Wire name used in the AI response's `action` tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Trim => "trim",
            OperationKind::ChangeSpeed => "change_speed",
            OperationKind::AddText => "add_text",
            OperationKind::MuteAudio => "mute_audio",
            OperationKind::AdjustVolume => "adjust_volume",
            OperationKind::NormalizeAudio => "normalize_audio",
            OperationKind::Grayscale => "grayscale",
            OperationKind::InvertColors => "invert_colors",
            OperationKind::GammaCorrect => "gamma_correct",
            OperationKind::Blur => "blur",
            OperationKind::Rotate => "rotate",
            OperationKind::Mirror => "mirror",
            OperationKind::FadeIn => "fade_in",
            OperationKind::FadeOut => "fade_out",
            OperationKind::ExtractAudio => "extract_audio",
            OperationKind::AddBackgroundMusic => "add_background_music",
            OperationKind::ImageOverlay => "image_overlay",
            OperationKind::PictureInPicture => "picture_in_picture",
            OperationKind::Concat => "concat",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OperationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OperationKind::ALL
            .iter()
            .find(|k| k.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Unknown operation kind: {}", s))
    }
}

// =============================================================================
// Parameter Schema
// =============================================================================

/// Parameter value type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    Number,
    Integer,
    Boolean,
    Text,
    Path,
    PathList,
    Position,
}

/// Schema for a single operation parameter
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamSpec {
    /// Wire name of the parameter
    pub name: &'static str,
    /// Value type
    pub param_type: ParamType,
    /// Whether the parameter must be present
    pub required: bool,
    /// Default rendered for the catalog (required params have none)
    pub default: Option<&'static str>,
    /// Constraint description rendered for the catalog (range, grammar)
    pub constraint: Option<&'static str>,
}

impl ParamSpec {
    const fn required(name: &'static str, param_type: ParamType, constraint: &'static str) -> Self {
        Self {
            name,
            param_type,
            required: true,
            default: None,
            constraint: Some(constraint),
        }
    }

    const fn optional(
        name: &'static str,
        param_type: ParamType,
        default: &'static str,
        constraint: &'static str,
    ) -> Self {
        Self {
            name,
            param_type,
            required: false,
            default: Some(default),
            constraint: Some(constraint),
        }
    }
}

/// Schema for one operation kind
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationSchema {
    /// Operation kind
    pub kind: OperationKind,
    /// One-line effect description
    pub summary: &'static str,
    /// Parameter schemas
    pub params: &'static [ParamSpec],
}

// =============================================================================
// Registry
// =============================================================================

const POSITION_GRAMMAR: &str =
    "anchor keyword (center/left/right/top/bottom/top_left/top_right/bottom_left/bottom_right) \
     or \"X,Y\" pair of percentages in [0,100] (e.g. \"25%,75%\") or absolute pixels";

static CATALOG: &[OperationSchema] = &[
    OperationSchema {
        kind: OperationKind::Trim,
        summary: "Keep the range [start_sec, end_sec) of the video; the new duration is end - start",
        params: &[
            ParamSpec::required("start_sec", ParamType::Number, ">= 0, < video duration"),
            ParamSpec::optional("end_sec", ParamType::Number, "video end", "> start_sec, <= video duration"),
        ],
    },
    OperationSchema {
        kind: OperationKind::ChangeSpeed,
        summary: "Speed the video up or down; duration scales by 1/factor and audio tempo follows",
        params: &[ParamSpec::required("factor", ParamType::Number, "> 0, <= 100")],
    },
    OperationSchema {
        kind: OperationKind::AddText,
        summary: "Overlay a text caption for the given time window",
        params: &[
            ParamSpec::required("text", ParamType::Text, "non-empty"),
            ParamSpec::optional("start_sec", ParamType::Number, "0", ">= 0, < video duration"),
            ParamSpec::optional("duration_sec", ParamType::Number, "remainder of video", "> 0"),
            ParamSpec::optional("font_size", ParamType::Integer, "36", "> 0"),
            ParamSpec::optional("color", ParamType::Text, "white", "color name or hex like #rrggbb"),
            ParamSpec::optional("position", ParamType::Position, "center", POSITION_GRAMMAR),
            ParamSpec::optional("font", ParamType::Path, "built-in font", "path to a font file"),
        ],
    },
    OperationSchema {
        kind: OperationKind::MuteAudio,
        summary: "Remove the audio track",
        params: &[],
    },
    OperationSchema {
        kind: OperationKind::AdjustVolume,
        summary: "Scale the audio volume by a factor",
        params: &[ParamSpec::required("factor", ParamType::Number, ">= 0, <= 10")],
    },
    OperationSchema {
        kind: OperationKind::NormalizeAudio,
        summary: "Normalize audio loudness",
        params: &[],
    },
    OperationSchema {
        kind: OperationKind::Grayscale,
        summary: "Convert the video to black and white",
        params: &[],
    },
    OperationSchema {
        kind: OperationKind::InvertColors,
        summary: "Invert (negate) the video colors",
        params: &[],
    },
    OperationSchema {
        kind: OperationKind::GammaCorrect,
        summary: "Apply gamma correction (gamma < 1 darkens, > 1 brightens)",
        params: &[ParamSpec::required("gamma", ParamType::Number, "> 0, <= 10")],
    },
    OperationSchema {
        kind: OperationKind::Blur,
        summary: "Blur the video",
        params: &[ParamSpec::optional("radius", ParamType::Number, "2", ">= 0, <= 50")],
    },
    OperationSchema {
        kind: OperationKind::Rotate,
        summary: "Rotate the video by the given angle; the canvas expands to fit",
        params: &[ParamSpec::required("degrees", ParamType::Number, "commonly 90/180/270, any angle accepted")],
    },
    OperationSchema {
        kind: OperationKind::Mirror,
        summary: "Flip the video along an axis",
        params: &[ParamSpec::required("axis", ParamType::Text, "\"horizontal\" or \"vertical\"")],
    },
    OperationSchema {
        kind: OperationKind::FadeIn,
        summary: "Fade video and audio in from black/silence",
        params: &[ParamSpec::required("duration_sec", ParamType::Number, "> 0, <= video duration")],
    },
    OperationSchema {
        kind: OperationKind::FadeOut,
        summary: "Fade video and audio out to black/silence at the end",
        params: &[ParamSpec::required("duration_sec", ParamType::Number, "> 0, <= video duration")],
    },
    OperationSchema {
        kind: OperationKind::ExtractAudio,
        summary: "Write the audio track to a file; the video itself is unchanged",
        params: &[ParamSpec::optional("output", ParamType::Path, "<video>_audio.mp3", "output file name")],
    },
    OperationSchema {
        kind: OperationKind::AddBackgroundMusic,
        summary: "Mix a music file under the existing audio",
        params: &[
            ParamSpec::required("music_path", ParamType::Path, "existing audio file"),
            ParamSpec::optional("volume", ParamType::Number, "0.3", ">= 0, <= 10"),
            ParamSpec::optional("offset_sec", ParamType::Number, "0", ">= 0"),
            ParamSpec::optional("loop_music", ParamType::Boolean, "false", "loop to fill the video"),
        ],
    },
    OperationSchema {
        kind: OperationKind::ImageOverlay,
        summary: "Overlay an image (watermark/logo) for the given time window",
        params: &[
            ParamSpec::required("image_path", ParamType::Path, "existing image file"),
            ParamSpec::optional("position", ParamType::Position, "bottom_right", POSITION_GRAMMAR),
            ParamSpec::optional("scale", ParamType::Number, "0.1", "fraction of frame height, > 0, <= 1"),
            ParamSpec::optional("opacity", ParamType::Number, "0.8", "> 0, <= 1"),
            ParamSpec::optional("start_sec", ParamType::Number, "0", ">= 0, < video duration"),
            ParamSpec::optional("duration_sec", ParamType::Number, "remainder of video", "> 0"),
        ],
    },
    OperationSchema {
        kind: OperationKind::PictureInPicture,
        summary: "Inset another video over the main video",
        params: &[
            ParamSpec::required("video_path", ParamType::Path, "existing video file"),
            ParamSpec::optional("position", ParamType::Position, "top_right", POSITION_GRAMMAR),
            ParamSpec::optional("scale", ParamType::Number, "0.25", "fraction of frame width, > 0, <= 1"),
            ParamSpec::optional("start_sec", ParamType::Number, "0", ">= 0, < video duration"),
            ParamSpec::optional("duration_sec", ParamType::Number, "overlay remainder", "> 0"),
        ],
    },
    OperationSchema {
        kind: OperationKind::Concat,
        summary: "Append one or more clips after the current video",
        params: &[ParamSpec::required("paths", ParamType::PathList, "non-empty list of video files")],
    },
];

/// Looks up the schema for an operation kind.
pub fn lookup(kind: OperationKind) -> &'static OperationSchema {
    // CATALOG covers every variant of OperationKind.
    CATALOG
        .iter()
        .find(|s| s.kind == kind)
        .unwrap_or_else(|| unreachable!("operation kind missing from catalog: {}", kind))
}

/// Returns the full catalog in presentation order.
pub fn catalog() -> &'static [OperationSchema] {
    CATALOG
}

/// Renders the catalog as plain text for the prompt interpreter's call
/// context.
pub fn render_catalog() -> String {
    let mut out = String::new();
    for (i, schema) in CATALOG.iter().enumerate() {
        out.push_str(&format!("{}. \"{}\": {}\n", i + 1, schema.kind, schema.summary));
        for param in schema.params {
            let requirement = if param.required {
                "required".to_string()
            } else {
                format!("optional, default {}", param.default.unwrap_or("none"))
            };
            out.push_str(&format!(
                "   - {} ({:?}, {}{})\n",
                param.name,
                param.param_type,
                requirement,
                param
                    .constraint
                    .map(|c| format!("; {}", c))
                    .unwrap_or_default(),
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_catalog_covers_all_kinds() {
        assert_eq!(CATALOG.len(), OperationKind::ALL.len());
        for kind in OperationKind::ALL {
            assert_eq!(lookup(*kind).kind, *kind);
        }
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in OperationKind::ALL {
            assert_eq!(OperationKind::from_str(kind.as_str()).unwrap(), *kind);
        }
        assert!(OperationKind::from_str("translate_audio").is_err());
    }

    #[test]
    fn test_required_params_have_no_default() {
        for schema in CATALOG {
            for param in schema.params {
                if param.required {
                    assert!(
                        param.default.is_none(),
                        "{}.{} is required but has a default",
                        schema.kind,
                        param.name
                    );
                }
            }
        }
    }

    #[test]
    fn test_render_catalog_mentions_every_kind() {
        let rendered = render_catalog();
        for kind in OperationKind::ALL {
            assert!(rendered.contains(kind.as_str()), "missing {}", kind);
        }
        assert!(rendered.contains("start_sec"));
        assert!(rendered.contains("bottom_right"));
    }
}
