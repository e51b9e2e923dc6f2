//! Overlay Position Grammar
//!
//! Parses the position parameter shared by text, image and picture-in-picture
//! overlays. Accepted forms:
//! - anchor keywords: `center`, `left`, `right`, `top`, `bottom`,
//!   `top_left`, `top_right`, `bottom_left`, `bottom_right`
//! - a coordinate pair `"X,Y"` where each member is a percentage of the
//!   frame dimension (`"25%"`) or an absolute pixel offset (`"120"`)
//!
//! Unknown keywords and percentages outside [0,100] are validation failures;
//! nothing is clamped or silently corrected.

use crate::error::{EditError, EditResult};

/// Margin in pixels for edge-anchored keywords.
const EDGE_MARGIN: f64 = 10.0;

/// Anchor keyword positions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    Center,
    Left,
    Right,
    Top,
    Bottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// A single coordinate: percentage of the frame dimension or absolute pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Coord {
    Percent(f64),
    Pixels(f64),
}

impl Coord {
    fn parse(s: &str) -> EditResult<Self> {
        let s = s.trim();
        if let Some(pct) = s.strip_suffix('%') {
            let value: f64 = pct.trim().parse().map_err(|_| {
                EditError::ValidationError(format!("Invalid percentage coordinate: {}", s))
            })?;
            if !(0.0..=100.0).contains(&value) {
                return Err(EditError::ValidationError(format!(
                    "Position percentage out of range [0,100]: {}",
                    value
                )));
            }
            Ok(Coord::Percent(value))
        } else {
            let value: f64 = s.parse().map_err(|_| {
                EditError::ValidationError(format!("Invalid pixel coordinate: {}", s))
            })?;
            if value < 0.0 {
                return Err(EditError::ValidationError(format!(
                    "Pixel coordinate must be non-negative: {}",
                    value
                )));
            }
            Ok(Coord::Pixels(value))
        }
    }

    fn resolve(&self, frame_dim: f64) -> f64 {
        match self {
            Coord::Percent(p) => frame_dim * p / 100.0,
            Coord::Pixels(px) => *px,
        }
    }
}

/// Parsed overlay position
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Position {
    Keyword(Anchor),
    Coords(Coord, Coord),
}

impl Position {
    /// Parses a position string. Rejects unknown keywords instead of falling
    /// back to center.
    pub fn parse(s: &str) -> EditResult<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        let anchor = match normalized.as_str() {
            "center" | "middle" => Some(Anchor::Center),
            "left" => Some(Anchor::Left),
            "right" => Some(Anchor::Right),
            "top" => Some(Anchor::Top),
            "bottom" => Some(Anchor::Bottom),
            "top_left" | "top-left" => Some(Anchor::TopLeft),
            "top_right" | "top-right" => Some(Anchor::TopRight),
            "bottom_left" | "bottom-left" => Some(Anchor::BottomLeft),
            "bottom_right" | "bottom-right" => Some(Anchor::BottomRight),
            _ => None,
        };
        if let Some(anchor) = anchor {
            return Ok(Position::Keyword(anchor));
        }

        if let Some((x, y)) = normalized.split_once(',') {
            return Ok(Position::Coords(Coord::parse(x)?, Coord::parse(y)?));
        }

        Err(EditError::ValidationError(format!(
            "Unknown position: {:?} (expected an anchor keyword or \"X,Y\")",
            s
        )))
    }

    /// Resolves the top-left corner in pixels for an element of the given
    /// size placed on the given frame. Pure, used by the executor and tests.
    pub fn resolve_px(
        &self,
        frame_w: f64,
        frame_h: f64,
        elem_w: f64,
        elem_h: f64,
    ) -> (f64, f64) {
        match self {
            Position::Keyword(anchor) => {
                let center_x = (frame_w - elem_w) / 2.0;
                let center_y = (frame_h - elem_h) / 2.0;
                let left = EDGE_MARGIN;
                let right = frame_w - elem_w - EDGE_MARGIN;
                let top = EDGE_MARGIN;
                let bottom = frame_h - elem_h - EDGE_MARGIN;
                match anchor {
                    Anchor::Center => (center_x, center_y),
                    Anchor::Left => (left, center_y),
                    Anchor::Right => (right, center_y),
                    Anchor::Top => (center_x, top),
                    Anchor::Bottom => (center_x, bottom),
                    Anchor::TopLeft => (left, top),
                    Anchor::TopRight => (right, top),
                    Anchor::BottomLeft => (left, bottom),
                    Anchor::BottomRight => (right, bottom),
                }
            }
            Position::Coords(x, y) => (x.resolve(frame_w), y.resolve(frame_h)),
        }
    }

    /// FFmpeg expression pair for the `overlay` filter (overlay dimensions
    /// are available to the filter as `w`/`h`, frame dimensions as `W`/`H`).
    pub fn overlay_expr(&self) -> (String, String) {
        match self {
            Position::Keyword(anchor) => {
                let center_x = "(W-w)/2".to_string();
                let center_y = "(H-h)/2".to_string();
                let left = format!("{}", EDGE_MARGIN);
                let right = format!("W-w-{}", EDGE_MARGIN);
                let top = format!("{}", EDGE_MARGIN);
                let bottom = format!("H-h-{}", EDGE_MARGIN);
                match anchor {
                    Anchor::Center => (center_x, center_y),
                    Anchor::Left => (left, center_y),
                    Anchor::Right => (right, center_y),
                    Anchor::Top => (center_x, top),
                    Anchor::Bottom => (center_x, bottom),
                    Anchor::TopLeft => (left, top),
                    Anchor::TopRight => (right, top),
                    Anchor::BottomLeft => (left, bottom),
                    Anchor::BottomRight => (right, bottom),
                }
            }
            Position::Coords(x, y) => {
                let xe = match x {
                    Coord::Percent(p) => format!("W*{:.4}", p / 100.0),
                    Coord::Pixels(px) => format!("{}", px),
                };
                let ye = match y {
                    Coord::Percent(p) => format!("H*{:.4}", p / 100.0),
                    Coord::Pixels(px) => format!("{}", px),
                };
                (xe, ye)
            }
        }
    }

    /// FFmpeg expression pair for the `drawtext` filter (text dimensions are
    /// `text_w`/`text_h`, frame dimensions are `w`/`h`).
    pub fn drawtext_expr(&self) -> (String, String) {
        let (x, y) = self.overlay_expr();
        let x = x.replace('W', "w").replace("w-w", "w-text_w");
        let y = y.replace('H', "h").replace("h-h", "h-text_h");
        (x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keywords() {
        assert_eq!(Position::parse("center").unwrap(), Position::Keyword(Anchor::Center));
        assert_eq!(
            Position::parse("Bottom_Right").unwrap(),
            Position::Keyword(Anchor::BottomRight)
        );
        assert_eq!(
            Position::parse("top-left").unwrap(),
            Position::Keyword(Anchor::TopLeft)
        );
    }

    #[test]
    fn test_parse_coordinate_pairs() {
        assert_eq!(
            Position::parse("25%, 75%").unwrap(),
            Position::Coords(Coord::Percent(25.0), Coord::Percent(75.0))
        );
        assert_eq!(
            Position::parse("120,340").unwrap(),
            Position::Coords(Coord::Pixels(120.0), Coord::Pixels(340.0))
        );
    }

    #[test]
    fn test_unknown_keyword_rejected() {
        // Not clamped and not defaulted to center.
        let err = Position::parse("somewhere").unwrap_err();
        assert!(matches!(err, EditError::ValidationError(_)));
    }

    #[test]
    fn test_percentage_out_of_range_rejected() {
        let err = Position::parse("150%,50%").unwrap_err();
        assert!(err.to_string().contains("150"));

        assert!(Position::parse("-5%,0%").is_err());
    }

    #[test]
    fn test_center_on_full_hd_frame() {
        // Bounding-box center lands at (960, 540) +- half the text extent.
        let pos = Position::parse("center").unwrap();
        let (x, y) = pos.resolve_px(1920.0, 1080.0, 400.0, 80.0);
        assert_eq!(x + 200.0, 960.0);
        assert_eq!(y + 40.0, 540.0);
    }

    #[test]
    fn test_percent_resolution() {
        let pos = Position::parse("25%,50%").unwrap();
        let (x, y) = pos.resolve_px(1920.0, 1080.0, 0.0, 0.0);
        assert_eq!(x, 480.0);
        assert_eq!(y, 540.0);
    }

    #[test]
    fn test_overlay_expressions() {
        let (x, y) = Position::parse("center").unwrap().overlay_expr();
        assert_eq!(x, "(W-w)/2");
        assert_eq!(y, "(H-h)/2");

        let (x, y) = Position::parse("bottom_right").unwrap().overlay_expr();
        assert_eq!(x, "W-w-10");
        assert_eq!(y, "H-h-10");
    }
}
