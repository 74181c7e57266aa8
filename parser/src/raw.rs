//! Serde view of a parsed match-record document, as produced by the demo
//! parsing service. These types mirror the document one-to-one; the
//! structured model in [`crate::game`] is built from them.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGame {
    pub map_name: String,
    pub parser_parameters: RawParserParameters,
    #[serde(default)]
    pub game_rounds: Vec<RawRound>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawParserParameters {
    /// Ticks between two recorded frames.
    pub parse_rate: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRound {
    /// 1-based
    pub round_num: usize,
    #[serde(default)]
    pub kills: Vec<RawKill>,
    #[serde(default)]
    pub frames: Vec<RawFrame>,
    pub t_side: RawRoster,
    pub ct_side: RawRoster,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRoster {
    #[serde(default)]
    pub players: Vec<RawRosterPlayer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRosterPlayer {
    #[serde(rename = "steamID")]
    pub steam_id: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawKill {
    pub tick: i64,
    #[serde(rename = "attackerSteamID")]
    pub attacker_steam_id: Option<u64>,
    #[serde(rename = "victimSteamID")]
    pub victim_steam_id: u64,
    pub attacker_side: Option<String>,
    pub victim_side: String,
    #[serde(rename = "assisterSteamID")]
    pub assister_steam_id: Option<u64>,
    #[serde(default)]
    pub is_suicide: bool,
    #[serde(default)]
    pub is_teamkill: bool,
    #[serde(default)]
    pub is_trade: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawFrame {
    pub tick: i64,
    pub t: RawTeamFrame,
    pub ct: RawTeamFrame,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTeamFrame {
    #[serde(default)]
    pub players: Vec<RawPlayerFrame>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPlayerFrame {
    #[serde(rename = "steamID")]
    pub steam_id: u64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub velocity_x: f64,
    pub velocity_y: f64,
    pub velocity_z: f64,
    /// Degrees in [0, 360)
    pub view_x: f64,
    /// Degrees in [0, 360)
    pub view_y: f64,
    pub hp: i64,
    pub armor: i64,
    pub active_weapon: String,
    pub is_blinded: bool,
    pub is_airborne: bool,
    pub is_ducking: bool,
    pub is_standing: bool,
    pub is_scoped: bool,
    pub is_walking: bool,
    pub equipment_value: i64,
    pub cash: i64,
    pub has_helmet: bool,
}
