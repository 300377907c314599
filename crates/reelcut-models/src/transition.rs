//! Transition effects used between consecutive subclips.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default video crossfade duration in seconds.
pub const DEFAULT_FADE_DURATION: f64 = 0.30;

macro_rules! transitions {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// Available transition effects.
        ///
        /// Every variant except [`Transition::None`] maps to an FFmpeg `xfade`
        /// transition of the same name. `None` joins subclips with hard cuts.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum Transition {
            /// Hard cuts, no blending
            None,
            #[default]
            $($variant,)+
        }

        impl Transition {
            /// All crossfade transitions understood by `xfade`.
            pub const XFADE: &'static [Transition] = &[$(Transition::$variant,)+];

            /// Returns the effect name as passed to `xfade=transition=`.
            pub fn as_str(&self) -> &'static str {
                match self {
                    Transition::None => "none",
                    $(Transition::$variant => $name,)+
                }
            }
        }

        impl FromStr for Transition {
            type Err = TransitionParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    "none" | "cut" => Ok(Transition::None),
                    $($name => Ok(Transition::$variant),)+
                    _ => Err(TransitionParseError(s.to_string())),
                }
            }
        }
    };
}

transitions! {
    Fade => "fade",
    WipeLeft => "wipeleft",
    WipeRight => "wiperight",
    WipeUp => "wipeup",
    WipeDown => "wipedown",
    SlideLeft => "slideleft",
    SlideRight => "slideright",
    SlideUp => "slideup",
    SlideDown => "slidedown",
    CircleCrop => "circlecrop",
    RectCrop => "rectcrop",
    Distance => "distance",
    FadeBlack => "fadeblack",
    FadeWhite => "fadewhite",
    Radial => "radial",
    SmoothLeft => "smoothleft",
    SmoothRight => "smoothright",
    SmoothUp => "smoothup",
    SmoothDown => "smoothdown",
    CircleOpen => "circleopen",
    CircleClose => "circleclose",
    VertOpen => "vertopen",
    VertClose => "vertclose",
    HorzOpen => "horzopen",
    HorzClose => "horzclose",
    Dissolve => "dissolve",
    Pixelize => "pixelize",
    DiagTl => "diagtl",
    DiagTr => "diagtr",
    DiagBl => "diagbl",
    DiagBr => "diagbr",
    HlSlice => "hlslice",
    HrSlice => "hrslice",
    VuSlice => "vuslice",
    VdSlice => "vdslice",
    HBlur => "hblur",
    FadeGrays => "fadegrays",
    WipeTl => "wipetl",
    WipeTr => "wipetr",
    WipeBl => "wipebl",
    WipeBr => "wipebr",
    SqueezeH => "squeezeh",
    SqueezeV => "squeezev",
}

impl Transition {
    /// Whether consecutive clips are blended rather than hard-cut.
    pub fn is_crossfade(&self) -> bool {
        !matches!(self, Transition::None)
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("Unknown transition '{0}', expected none or one of: {names}", names = xfade_names())]
pub struct TransitionParseError(String);

fn xfade_names() -> String {
    Transition::XFADE
        .iter()
        .map(Transition::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Transition effect plus crossfade timing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitionSpec {
    /// Effect applied between consecutive clips
    pub transition: Transition,
    /// Video crossfade duration in seconds
    pub fade_duration: f64,
}

impl TransitionSpec {
    pub fn new(transition: Transition, fade_duration: f64) -> Self {
        Self {
            transition,
            fade_duration,
        }
    }

    /// Audio crossfade window: a full symmetric overlap, twice the video fade.
    pub fn audio_fade_duration(&self) -> f64 {
        self.fade_duration * 2.0
    }
}

impl Default for TransitionSpec {
    fn default() -> Self {
        Self::new(Transition::default(), DEFAULT_FADE_DURATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_names_round_trip() {
        for transition in Transition::XFADE {
            let parsed: Transition = transition.as_str().parse().unwrap();
            assert_eq!(parsed, *transition);
        }
        assert_eq!(Transition::XFADE.len(), 43);
    }

    #[test]
    fn test_transition_parse() {
        assert_eq!("FADE".parse::<Transition>().unwrap(), Transition::Fade);
        assert_eq!("cut".parse::<Transition>().unwrap(), Transition::None);
        let err = "sparkle".parse::<Transition>().unwrap_err().to_string();
        assert!(err.starts_with("Unknown transition 'sparkle'"));
        assert!(err.contains("fade, wipeleft,"));
        assert!(err.ends_with("squeezeh, squeezev"));
    }

    #[test]
    fn test_transition_serde_uses_xfade_names() {
        let json = serde_json::to_string(&Transition::WipeLeft).unwrap();
        assert_eq!(json, "\"wipeleft\"");
        let parsed: Transition = serde_json::from_str("\"fadeblack\"").unwrap();
        assert_eq!(parsed, Transition::FadeBlack);
    }

    #[test]
    fn test_default_spec() {
        let spec = TransitionSpec::default();
        assert_eq!(spec.transition, Transition::Fade);
        assert!((spec.fade_duration - 0.30).abs() < f64::EPSILON);
        assert!((spec.audio_fade_duration() - 0.60).abs() < f64::EPSILON);
        assert!(spec.transition.is_crossfade());
        assert!(!Transition::None.is_crossfade());
    }
}
