//! Hour-indexed imagery frames.

use foundation::math::Rectangle;
use scene::imagery::ImageryProvider;
use thiserror::Error;

use crate::placeholder;

/// Tokens replaced with the zero-padded hour of day.
pub const HOUR_TOKENS: [&str; 2] = ["hour", "h"];
/// Tokens that mark a template as a tiled provider; left for the tile fetcher.
pub const TILE_TOKENS: [&str; 5] = ["x", "y", "z", "s", "reverseY"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageryError {
    #[error("malformed imagery template {template:?}: {reason}")]
    MalformedTemplate { template: String, reason: String },
    #[error("failed to synthesize placeholder frame: {0}")]
    Placeholder(String),
}

/// A resolved frame, ready to become an imagery layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameSource {
    SingleImage { url: String },
    Tiled { template: String },
    Placeholder { data_uri: String },
}

impl FrameSource {
    pub fn url(&self) -> &str {
        match self {
            FrameSource::SingleImage { url } => url,
            FrameSource::Tiled { template } => template,
            FrameSource::Placeholder { data_uri } => data_uri,
        }
    }

    pub fn is_tiled(&self) -> bool {
        matches!(self, FrameSource::Tiled { .. })
    }

    pub fn to_provider(&self, rectangle: Rectangle) -> ImageryProvider {
        match self {
            FrameSource::Tiled { template } => ImageryProvider::UrlTemplate {
                template: template.clone(),
                rectangle,
            },
            FrameSource::SingleImage { url } | FrameSource::Placeholder { data_uri: url } => {
                ImageryProvider::SingleTile {
                    url: url.clone(),
                    rectangle,
                }
            }
        }
    }
}

/// Maps any hour index (negative included) to `0..24`.
pub fn hour_of_day(hour_index: i64) -> u32 {
    hour_index.rem_euclid(24) as u32
}

/// Builds the frame for `hour_index`.
///
/// With a template, hour tokens are substituted and tile tokens decide
/// between a tiled and a single-image provider. Without one, a placeholder
/// image is synthesized.
pub fn frame_for(hour_index: i64, template: Option<&str>) -> Result<FrameSource, ImageryError> {
    let hour = hour_of_day(hour_index);
    match template.map(str::trim).filter(|t| !t.is_empty()) {
        Some(template) => {
            let (url, tiled) = expand_template(template, hour)?;
            Ok(if tiled {
                FrameSource::Tiled { template: url }
            } else {
                FrameSource::SingleImage { url }
            })
        }
        None => Ok(FrameSource::Placeholder {
            data_uri: placeholder::placeholder_data_uri(hour)?,
        }),
    }
}

/// Substitutes hour tokens; returns the expanded string and whether any tile
/// token was present.
fn expand_template(template: &str, hour: u32) -> Result<(String, bool), ImageryError> {
    let malformed = |reason: String| ImageryError::MalformedTemplate {
        template: template.to_string(),
        reason,
    };

    let mut out = String::with_capacity(template.len());
    let mut tiled = false;
    let mut rest = template;
    while let Some(open) = rest.find(['{', '}']) {
        if rest.as_bytes()[open] == b'}' {
            return Err(malformed(format!("unmatched '}}' at byte {}", template.len() - rest.len() + open)));
        }
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after
            .find(['{', '}'])
            .filter(|i| after.as_bytes()[*i] == b'}')
            .ok_or_else(|| malformed("unclosed '{'".to_string()))?;
        let token = &after[..close];

        if HOUR_TOKENS.contains(&token) {
            out.push_str(&format!("{hour:02}"));
        } else if TILE_TOKENS.contains(&token) {
            tiled = true;
            out.push('{');
            out.push_str(token);
            out.push('}');
        } else {
            return Err(malformed(format!("unknown token {{{token}}}")));
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok((out, tiled))
}

#[cfg(test)]
mod tests {
    use super::{FrameSource, ImageryError, frame_for, hour_of_day};
    use foundation::math::Rectangle;
    use scene::imagery::ImageryProvider;

    #[test]
    fn substitutes_zero_padded_hour_mod_24() {
        for h in [-25_i64, -1, 0, 3, 9, 23, 24, 27, 1_000] {
            let frame = frame_for(h, Some("https://tiles/{hour}.png")).unwrap();
            let expected = format!("https://tiles/{:02}.png", h.rem_euclid(24));
            assert_eq!(frame, FrameSource::SingleImage { url: expected });
        }
    }

    #[test]
    fn short_hour_token_and_tile_tokens() {
        let frame = frame_for(5, Some("https://{s}.host/{h}/{z}/{x}/{reverseY}.png")).unwrap();
        assert_eq!(
            frame,
            FrameSource::Tiled {
                template: "https://{s}.host/05/{z}/{x}/{reverseY}.png".to_string()
            }
        );
        assert!(matches!(
            frame.to_provider(Rectangle::WORLD),
            ImageryProvider::UrlTemplate { .. }
        ));
    }

    #[test]
    fn malformed_templates_are_rejected() {
        for bad in ["https://x/{hour.png", "https://x/hour}.png", "https://x/{day}.png", "{{hour}}"] {
            assert!(
                matches!(frame_for(1, Some(bad)), Err(ImageryError::MalformedTemplate { .. })),
                "{bad}"
            );
        }
    }

    #[test]
    fn missing_or_blank_template_synthesizes_placeholder() {
        for template in [None, Some("  ")] {
            let frame = frame_for(7, template).unwrap();
            assert!(frame.url().starts_with("data:image/png;base64,"));
        }
    }

    #[test]
    fn hour_of_day_wraps_negatives() {
        assert_eq!(hour_of_day(-1), 23);
        assert_eq!(hour_of_day(48), 0);
    }
}
