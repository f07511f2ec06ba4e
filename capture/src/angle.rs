use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of angles a complete photo set holds
pub const ANGLE_COUNT: usize = 4;

/// Shown on the intro screen before the camera is requested.
pub const CAPTURE_GUIDELINES: [&str; 4] = [
    "Remove your glasses: Works best without makeup.",
    "Pull your hair back.",
    "Face the camera and keep your expression neutral.",
    "Stay in a well-lighted environment: preferably with natural light.",
];

/// One of the required head orientations, in capture order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Angle {
    Front,
    Right,
    Left,
    Closeup,
}

/// Outline drawn over the live preview to position the face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuideOverlay {
    FaceOval,
    RightProfile,
    LeftProfile,
    CloseupFrame,
}

impl GuideOverlay {
    pub fn css_class(&self) -> &'static str {
        match self {
            GuideOverlay::FaceOval => "guide-face-oval",
            GuideOverlay::RightProfile => "guide-profile-right",
            GuideOverlay::LeftProfile => "guide-profile-left",
            GuideOverlay::CloseupFrame => "guide-closeup",
        }
    }
}

impl Angle {
    pub const ALL: [Angle; ANGLE_COUNT] = [Angle::Front, Angle::Right, Angle::Left, Angle::Closeup];

    pub fn index(&self) -> usize {
        match self {
            Angle::Front => 0,
            Angle::Right => 1,
            Angle::Left => 2,
            Angle::Closeup => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Angle> {
        Angle::ALL.get(index).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Angle::Front => "front",
            Angle::Right => "right",
            Angle::Left => "left",
            Angle::Closeup => "closeup",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Angle::Front => "Front",
            Angle::Right => "Right Profile",
            Angle::Left => "Left Profile",
            Angle::Closeup => "Close-up",
        }
    }

    pub fn instruction(&self) -> &'static str {
        match self {
            Angle::Front => "Look straight at the camera and keep your expression neutral.",
            Angle::Right => "Slowly turn your head to the left so the right side of your face fills the outline.",
            Angle::Left => "Slowly turn your head to the right so the left side of your face fills the outline.",
            Angle::Closeup => "Move closer so your cheeks and forehead fill the frame.",
        }
    }

    pub fn guide(&self) -> GuideOverlay {
        match self {
            Angle::Front => GuideOverlay::FaceOval,
            Angle::Right => GuideOverlay::RightProfile,
            Angle::Left => GuideOverlay::LeftProfile,
            Angle::Closeup => GuideOverlay::CloseupFrame,
        }
    }

    /// Key under which the review handoff stores this angle, e.g. `photo_front`.
    pub fn storage_key(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.as_str())
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Angle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "front" => Ok(Angle::Front),
            "right" => Ok(Angle::Right),
            "left" => Ok(Angle::Left),
            "closeup" => Ok(Angle::Closeup),
            other => Err(format!("unknown angle: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_matches_index() {
        for (i, angle) in Angle::ALL.iter().enumerate() {
            assert_eq!(angle.index(), i);
            assert_eq!(Angle::from_index(i), Some(*angle));
        }
        assert_eq!(Angle::from_index(ANGLE_COUNT), None);
    }

    #[test]
    fn test_storage_keys() {
        let keys: Vec<String> = Angle::ALL.iter().map(|a| a.storage_key("photo_")).collect();
        assert_eq!(keys, ["photo_front", "photo_right", "photo_left", "photo_closeup"]);
    }

    #[test]
    fn test_parse_round_trip() {
        for angle in Angle::ALL {
            assert_eq!(angle.to_string().parse::<Angle>(), Ok(angle));
        }
        assert!("profile".parse::<Angle>().is_err());
    }

    #[test]
    fn test_serde_uses_ids() {
        let json = serde_json::to_string(&Angle::Closeup).unwrap();
        assert_eq!(json, "\"closeup\"");
    }
}
