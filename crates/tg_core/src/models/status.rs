//! Categorical values carried by events and shots.
//!
//! Each enum round-trips through the lowercase snake_case tag stored in tables.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

macro_rules! tagged_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $tag:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Tag as stored in the `type_`/`result`/... columns.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $tag),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($tag => Ok($name::$variant),)+
                    other => Err(CoreError::NotFound(format!(
                        "unknown {} tag `{}`",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }
    };
}

tagged_enum! {
    /// Event type tag (`type_` column).
    EventType {
        Shot => "shot",
        Pass => "pass",
        Carry => "carry",
        Dribble => "dribble",
        Pressure => "pressure",
        BallRecovery => "ball_recovery",
        Clearance => "clearance",
        Interception => "interception",
        Foul => "foul",
    }
}

tagged_enum! {
    ShotResult {
        Goal => "goal",
        Saved => "saved",
        Missed => "missed",
        Post => "post",
        Blocked => "blocked",
        OwnGoal => "own_goal",
    }
}

tagged_enum! {
    BodyPart {
        RightFoot => "right_foot",
        LeftFoot => "left_foot",
        Head => "head",
        Other => "other",
    }
}

tagged_enum! {
    /// Play pattern leading to a shot.
    ShotPattern {
        OpenPlay => "open_play",
        FreeKick => "free_kick",
        Corner => "corner",
        Penalty => "penalty",
        ThrowIn => "throw_in",
        KickOff => "kick_off",
    }
}

tagged_enum! {
    /// Match period.
    Period {
        FirstHalf => "first_half",
        SecondHalf => "second_half",
        FirstExtra => "first_extra",
        SecondExtra => "second_extra",
        PenaltyShootout => "penalty_shootout",
    }
}

impl Period {
    /// Period from its 1-based provider number (1 = first half ... 5 = shootout).
    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.get(usize::from(number).checked_sub(1)?).copied()
    }
}

impl ShotResult {
    pub fn is_goal(&self) -> bool {
        matches!(self, ShotResult::Goal)
    }
}
