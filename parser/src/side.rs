use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum_macros::EnumString;

use crate::error::{Error, Result};

/// The two opposing roles in a round. Roles swap between halves of a match,
/// so a side says nothing about a player's fixed identity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString,
)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[strum(serialize = "T")]
    Attacker,
    #[strum(serialize = "CT")]
    Defender,
}

impl Side {
    /// Team number used by demo tick tables.
    pub const ATTACKER_TEAM_NUM: i64 = 2;
    pub const DEFENDER_TEAM_NUM: i64 = 3;

    /// Maps a record side token (`"T"` / `"CT"`) to a side. Anything else is
    /// rejected rather than defaulted.
    pub fn from_token(token: &str) -> Result<Side> {
        Side::from_str(token).map_err(|_| Error::UnknownSide(token.to_string()))
    }

    pub fn from_team_num(team_num: i64) -> Result<Side> {
        match team_num {
            Self::ATTACKER_TEAM_NUM => Ok(Side::Attacker),
            Self::DEFENDER_TEAM_NUM => Ok(Side::Defender),
            other => Err(Error::UnknownTeamNumber(other)),
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::Attacker => Side::Defender,
            Side::Defender => Side::Attacker,
        }
    }

    /// Feature-name prefix for this side, e.g. `attacker_hp`.
    pub fn prefix(self) -> &'static str {
        match self {
            Side::Attacker => "attacker",
            Side::Defender => "defender",
        }
    }

    /// Prefix used for whole-team aggregates, e.g. `attackers_hp`.
    pub fn team_prefix(self) -> &'static str {
        match self {
            Side::Attacker => "attackers",
            Side::Defender => "defenders",
        }
    }

    pub const BOTH: [Side; 2] = [Side::Attacker, Side::Defender];
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}
