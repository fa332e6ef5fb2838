//! Typed payloads of the FPL API endpoints.
//!
//! Records are validated at decode time: string-typed numbers (`form`,
//! `selected_by_percent`, ...) land in [`Decimal`], difficulty ratings must be
//! within 1..=5, and unknown positions or statuses are rejected.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Playing position (`element_type` 1..=4 in the API).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Position {
    pub const ALL: [Position; 4] = [
        Position::Goalkeeper,
        Position::Defender,
        Position::Midfielder,
        Position::Forward,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "GKP",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Forward => "FWD",
        }
    }

    /// Parse a position label, case-insensitive ("mid", "FWD", ...).
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(label.trim()))
    }
}

impl TryFrom<u8> for Position {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Position::Goalkeeper),
            2 => Ok(Position::Defender),
            3 => Ok(Position::Midfielder),
            4 => Ok(Position::Forward),
            other => Err(format!("unknown element_type {}", other)),
        }
    }
}

impl From<Position> for u8 {
    fn from(value: Position) -> Self {
        match value {
            Position::Goalkeeper => 1,
            Position::Defender => 2,
            Position::Midfielder => 3,
            Position::Forward => 4,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Availability status flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerStatus {
    #[serde(rename = "a")]
    Available,
    #[serde(rename = "i")]
    Injured,
    #[serde(rename = "d")]
    Doubtful,
    #[serde(rename = "s")]
    Suspended,
    /// `u` (left the club) and `n` (ineligible, e.g. on loan)
    #[serde(rename = "u", alias = "n")]
    Unavailable,
}

impl PlayerStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, PlayerStatus::Available)
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlayerStatus::Available => "Available",
            PlayerStatus::Injured => "Injured",
            PlayerStatus::Doubtful => "Doubtful",
            PlayerStatus::Suspended => "Suspended",
            PlayerStatus::Unavailable => "Unavailable",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            PlayerStatus::Available => "a",
            PlayerStatus::Injured => "i",
            PlayerStatus::Doubtful => "d",
            PlayerStatus::Suspended => "s",
            PlayerStatus::Unavailable => "u",
        }
    }
}

/// Fixture difficulty rating, always within 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Difficulty(u8);

impl Difficulty {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Rating used when a team has no fixture to rate.
    pub const NEUTRAL: Difficulty = Difficulty(3);

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Difficulty(value))
        } else {
            Err(format!("difficulty {} outside 1..=5", value))
        }
    }
}

impl From<Difficulty> for u8 {
    fn from(value: Difficulty) -> Self {
        value.0
    }
}

impl From<Difficulty> for Decimal {
    fn from(value: Difficulty) -> Self {
        Decimal::from(value.0)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `/bootstrap-static/` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapStatic {
    pub events: Vec<Gameweek>,
    pub teams: Vec<RawTeam>,
    pub elements: Vec<RawPlayer>,
}

impl BootstrapStatic {
    pub fn current_gameweek(&self) -> Option<u32> {
        self.events.iter().find(|e| e.is_current).map(|e| e.id)
    }

    pub fn next_gameweek(&self) -> Option<u32> {
        self.events.iter().find(|e| e.is_next).map(|e| e.id)
    }
}

/// Gameweek ("event") in the season calendar.
#[derive(Debug, Clone, Deserialize)]
pub struct Gameweek {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub deadline_time: Option<String>,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub is_next: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTeam {
    pub id: u32,
    pub name: String,
    pub short_name: String,
}

/// Player ("element") as published by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPlayer {
    pub id: u32,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub second_name: String,
    pub web_name: String,
    pub team: u32,
    pub element_type: Position,
    /// Price in tenths (e.g. 70 = 7.0)
    pub now_cost: i32,
    pub total_points: i32,
    /// Decimal string, e.g. "5.2"
    pub form: Decimal,
    pub points_per_game: Decimal,
    /// Ownership percentage as a decimal string
    pub selected_by_percent: Decimal,
    pub status: PlayerStatus,
    #[serde(default)]
    pub news: String,
    #[serde(default)]
    pub minutes: u32,
    #[serde(default)]
    pub goals_scored: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub clean_sheets: u32,
    #[serde(default)]
    pub bonus: u32,
    /// Price change since season start, in tenths
    #[serde(default)]
    pub cost_change_start: i32,
}

/// Entry of the `/fixtures/` list.
#[derive(Debug, Clone, Deserialize)]
pub struct RawFixture {
    pub id: u32,
    /// `None` while the fixture is unscheduled
    pub event: Option<u32>,
    pub team_h: u32,
    pub team_a: u32,
    pub team_h_difficulty: Difficulty,
    pub team_a_difficulty: Difficulty,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub team_h_score: Option<u32>,
    #[serde(default)]
    pub team_a_score: Option<u32>,
    #[serde(default)]
    pub kickoff_time: Option<String>,
}

/// `/element-summary/{id}/` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerSummary {
    #[serde(default)]
    pub fixtures: Vec<SummaryFixture>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

/// Upcoming fixture from a player's point of view.
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryFixture {
    pub id: u32,
    pub event: Option<u32>,
    pub team_h: u32,
    pub team_a: u32,
    pub is_home: bool,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub kickoff_time: Option<String>,
}

/// One past appearance in the current season.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryEntry {
    pub fixture: u32,
    pub opponent_team: u32,
    pub round: u32,
    pub was_home: bool,
    pub total_points: i32,
    #[serde(default)]
    pub minutes: u32,
    #[serde(default)]
    pub goals_scored: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub bonus: u32,
    #[serde(default)]
    pub kickoff_time: Option<String>,
}

/// `/event/{gw}/live/` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LiveGameweek {
    pub elements: Vec<LiveElement>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LiveElement {
    pub id: u32,
    pub stats: LiveStats,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LiveStats {
    pub minutes: u32,
    pub goals_scored: u32,
    pub assists: u32,
    pub clean_sheets: u32,
    pub bonus: u32,
    pub total_points: i32,
}
