//! Scoring and filtering over the player and fixture tables.
//!
//! Every ranking is deterministic: equal scores fall back to ascending
//! player id (team id for team rankings).

pub mod fixtures;
pub mod players;
pub mod transfers;

use std::cmp::Ordering;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::client::FplError;
use crate::models::Position;
use crate::tables::{Player, TableError};

pub use fixtures::{
    BlankGameweek, DoubleGameweek, FixtureAnalyzer, FixtureDifficulty, Ticker, TickerRow,
};
pub use players::{Differential, PlayerAnalyzer, PlayerDetails, PriceChanges};
pub use transfers::{
    CaptainPick, ChipStrategy, ChipThresholds, Replacement, SellCandidate, TransferAdvisor,
    TransferTarget, WildcardAdvice,
};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    FetchError(#[from] FplError),

    #[error(transparent)]
    TableError(#[from] TableError),

    #[error("Player {0} not found")]
    PlayerNotFound(u32),
}

/// Optional position and price cap applied before scoring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerFilter {
    pub position: Option<Position>,
    /// Inclusive upper bound on price
    pub max_price: Option<Decimal>,
}

impl PlayerFilter {
    pub fn position(position: Position) -> Self {
        Self {
            position: Some(position),
            max_price: None,
        }
    }

    pub fn with_max_price(mut self, max_price: Decimal) -> Self {
        self.max_price = Some(max_price);
        self
    }

    pub fn matches(&self, player: &Player) -> bool {
        self.position.map_or(true, |p| player.position == p)
            && self.max_price.map_or(true, |max| player.price <= max)
    }
}

/// Highest score first, ties by ascending id.
pub(crate) fn by_score_desc(a: (Decimal, u32), b: (Decimal, u32)) -> Ordering {
    b.0.cmp(&a.0).then(a.1.cmp(&b.1))
}

#[cfg(test)]
pub(crate) mod testdata {
    //! A five-team league shared by the analysis tests.
    //!
    //! EVE (id 5) has no fixtures at all. CHE and LIV play twice in GW12;
    //! BRE and CHE blank in GW13.

    use serde_json::{json, Value};

    use crate::models::{BootstrapStatic, RawFixture};

    pub fn bootstrap_json() -> Value {
        json!({
            "events": [
                {"id": 10, "name": "Gameweek 10", "finished": true, "is_current": false, "is_next": false},
                {"id": 11, "name": "Gameweek 11", "finished": false, "is_current": true, "is_next": false},
                {"id": 12, "name": "Gameweek 12", "finished": false, "is_current": false, "is_next": true},
                {"id": 13, "name": "Gameweek 13", "finished": false, "is_current": false, "is_next": false}
            ],
            "teams": [
                {"id": 1, "name": "Arsenal", "short_name": "ARS"},
                {"id": 2, "name": "Brentford", "short_name": "BRE"},
                {"id": 3, "name": "Chelsea", "short_name": "CHE"},
                {"id": 4, "name": "Liverpool", "short_name": "LIV"},
                {"id": 5, "name": "Everton", "short_name": "EVE"}
            ],
            "elements": [
                player(1, "Bukayo", "Saka", 1, 3, 100, 120, "7.0", "6.0", "40.0", "a", 3),
                player(2, "Bryan", "Mbeumo", 2, 3, 75, 110, "8.0", "5.5", "25.0", "a", 5),
                player(3, "Cole", "Palmer", 3, 3, 105, 130, "6.5", "6.8", "50.0", "i", -2),
                player(4, "Mohamed", "Salah", 4, 3, 130, 150, "9.0", "7.9", "60.0", "a", 3),
                player(5, "David", "Raya", 1, 1, 55, 70, "4.0", "4.0", "12.0", "a", 0),
                player(6, "Mark", "Flekken", 2, 1, 45, 45, "3.0", "2.8", "3.0", "a", -1),
                player(7, "Levi", "Colwill", 3, 2, 45, 40, "5.0", "3.0", "4.5", "a", 0),
                player(8, "Jarrad", "Branthwaite", 5, 2, 40, 25, "5.0", "2.0", "2.0", "a", 0),
                player(9, "Yoane", "Wissa", 2, 4, 60, 18, "2.0", "2.5", "1.5", "d", -4),
                player(10, "Darwin", "Nunez", 4, 4, 75, 0, "0.0", "0.0", "11.0", "u", -5)
            ]
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn player(
        id: u32,
        first: &str,
        second: &str,
        team: u32,
        element_type: u8,
        now_cost: i32,
        total_points: i32,
        form: &str,
        ppg: &str,
        ownership: &str,
        status: &str,
        cost_change: i32,
    ) -> Value {
        json!({
            "id": id, "first_name": first, "second_name": second, "web_name": second,
            "team": team, "element_type": element_type, "now_cost": now_cost,
            "total_points": total_points, "form": form, "points_per_game": ppg,
            "selected_by_percent": ownership, "status": status,
            "news": if status == "a" { "" } else { "Knee injury - 75% chance of playing" },
            "minutes": 900, "goals_scored": 4, "assists": 3, "clean_sheets": 2, "bonus": 6,
            "cost_change_start": cost_change
        })
    }

    pub fn fixtures_json() -> Value {
        json!([
            fixture(1, Some(10), 1, 2, 2, 4, true),
            fixture(2, Some(10), 3, 4, 3, 3, true),
            fixture(3, Some(11), 1, 3, 2, 4, false),
            fixture(4, Some(11), 4, 2, 3, 3, false),
            fixture(5, Some(12), 2, 1, 2, 4, false),
            fixture(6, Some(12), 3, 4, 3, 3, false),
            fixture(7, Some(12), 4, 3, 3, 3, false),
            fixture(8, Some(13), 1, 4, 3, 4, false),
            fixture(9, None, 2, 3, 3, 3, false)
        ])
    }

    fn fixture(id: u32, event: Option<u32>, h: u32, a: u32, hd: u8, ad: u8, finished: bool) -> Value {
        let (home_score, away_score) = if finished { (Some(2), Some(1)) } else { (None, None) };
        json!({
            "id": id, "event": event, "team_h": h, "team_a": a,
            "team_h_difficulty": hd, "team_a_difficulty": ad, "finished": finished,
            "team_h_score": home_score, "team_a_score": away_score,
            "kickoff_time": event.map(|gw| format!("2026-11-{:02}T15:00:00Z", gw))
        })
    }

    pub fn bootstrap() -> BootstrapStatic {
        serde_json::from_value(bootstrap_json()).unwrap()
    }

    pub fn fixtures() -> Vec<RawFixture> {
        serde_json::from_value(fixtures_json()).unwrap()
    }
}
