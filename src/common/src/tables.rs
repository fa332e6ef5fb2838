//! Denormalized player and fixture tables built from decoded API payloads.

use std::collections::HashMap;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{BootstrapStatic, Difficulty, PlayerStatus, Position, RawFixture, RawTeam};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("Player {player} references unknown team {team}")]
    UnknownPlayerTeam { player: u32, team: u32 },

    #[error("Fixture {fixture} references unknown team {team}")]
    UnknownFixtureTeam { fixture: u32, team: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub id: u32,
    pub name: String,
    pub short_name: String,
}

/// One row of the player table.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: u32,
    pub first_name: String,
    pub second_name: String,
    pub web_name: String,
    pub team_id: u32,
    pub team_name: String,
    pub team_short: String,
    pub position: Position,
    /// `now_cost / 10`
    pub price: Decimal,
    pub total_points: i32,
    pub form: Decimal,
    pub points_per_game: Decimal,
    /// Ownership percentage
    pub ownership: Decimal,
    pub status: PlayerStatus,
    pub news: String,
    pub minutes: u32,
    pub goals_scored: u32,
    pub assists: u32,
    pub clean_sheets: u32,
    pub bonus: u32,
    /// Price change since season start
    pub price_change: Decimal,
    /// `total_points / price` rounded to 2 places; `None` when the price is not positive
    pub points_per_price: Option<Decimal>,
}

impl Player {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.second_name)
            .trim()
            .to_string()
    }

    pub fn is_available(&self) -> bool {
        self.status.is_available()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Venue {
    Home,
    Away,
}

impl Venue {
    pub fn label(&self) -> &'static str {
        match self {
            Venue::Home => "H",
            Venue::Away => "A",
        }
    }
}

/// One row of the fixture table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    pub id: u32,
    pub gameweek: Option<u32>,
    pub home_team: u32,
    pub away_team: u32,
    pub home_name: String,
    pub away_name: String,
    pub home_short: String,
    pub away_short: String,
    pub home_difficulty: Difficulty,
    pub away_difficulty: Difficulty,
    pub finished: bool,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub kickoff_time: Option<String>,
}

/// A fixture seen from one side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamFixture {
    pub fixture_id: u32,
    pub gameweek: Option<u32>,
    pub opponent: String,
    pub venue: Venue,
    pub difficulty: Difficulty,
}

impl TeamFixture {
    /// `OPP(H)` style label.
    pub fn short_label(&self) -> String {
        format!("{}({})", self.opponent, self.venue.label())
    }

    /// `OPP(H)[2]` style label.
    pub fn ticker_label(&self) -> String {
        format!("{}[{}]", self.short_label(), self.difficulty)
    }
}

impl Fixture {
    pub fn involves(&self, team_id: u32) -> bool {
        self.home_team == team_id || self.away_team == team_id
    }

    /// Opponent, venue and difficulty from `team_id`'s side.
    pub fn for_team(&self, team_id: u32) -> Option<TeamFixture> {
        let (opponent, venue, difficulty) = if self.home_team == team_id {
            (&self.away_short, Venue::Home, self.home_difficulty)
        } else if self.away_team == team_id {
            (&self.home_short, Venue::Away, self.away_difficulty)
        } else {
            return None;
        };

        Some(TeamFixture {
            fixture_id: self.id,
            gameweek: self.gameweek,
            opponent: opponent.clone(),
            venue,
            difficulty,
        })
    }

    /// `2 - 1` once finished.
    pub fn score_label(&self) -> Option<String> {
        match (self.home_score, self.away_score) {
            (Some(h), Some(a)) => Some(format!("{} - {}", h, a)),
            _ => None,
        }
    }
}

pub fn build_teams(raw: &[RawTeam]) -> Vec<Team> {
    raw.iter()
        .map(|t| Team {
            id: t.id,
            name: t.name.clone(),
            short_name: t.short_name.clone(),
        })
        .collect()
}

fn team_index(teams: &[Team]) -> HashMap<u32, &Team> {
    teams.iter().map(|t| (t.id, t)).collect()
}

/// Price in currency units from the API's tenths.
pub fn price_from_tenths(tenths: i32) -> Decimal {
    Decimal::new(i64::from(tenths), 1)
}

/// `total_points / price`, rounded to 2 places.
pub fn points_per_price(total_points: i32, price: Decimal) -> Option<Decimal> {
    if price <= Decimal::ZERO {
        return None;
    }
    Some((Decimal::from(total_points) / price).round_dp(2))
}

/// Join players with their team and derive price fields.
pub fn build_player_table(bootstrap: &BootstrapStatic) -> Result<Vec<Player>, TableError> {
    let teams = build_teams(&bootstrap.teams);
    let by_id = team_index(&teams);

    bootstrap
        .elements
        .iter()
        .map(|raw| {
            let team = by_id
                .get(&raw.team)
                .ok_or(TableError::UnknownPlayerTeam {
                    player: raw.id,
                    team: raw.team,
                })?;
            let price = price_from_tenths(raw.now_cost);

            Ok(Player {
                id: raw.id,
                first_name: raw.first_name.clone(),
                second_name: raw.second_name.clone(),
                web_name: raw.web_name.clone(),
                team_id: team.id,
                team_name: team.name.clone(),
                team_short: team.short_name.clone(),
                position: raw.element_type,
                price,
                total_points: raw.total_points,
                form: raw.form,
                points_per_game: raw.points_per_game,
                ownership: raw.selected_by_percent,
                status: raw.status,
                news: raw.news.clone(),
                minutes: raw.minutes,
                goals_scored: raw.goals_scored,
                assists: raw.assists,
                clean_sheets: raw.clean_sheets,
                bonus: raw.bonus,
                price_change: price_from_tenths(raw.cost_change_start),
                points_per_price: points_per_price(raw.total_points, price),
            })
        })
        .collect()
}

/// Join fixtures with both teams' names.
pub fn build_fixture_table(
    fixtures: &[RawFixture],
    teams: &[Team],
) -> Result<Vec<Fixture>, TableError> {
    let by_id = team_index(teams);
    let lookup = |fixture: u32, team: u32| {
        by_id
            .get(&team)
            .copied()
            .ok_or(TableError::UnknownFixtureTeam { fixture, team })
    };

    fixtures
        .iter()
        .map(|raw| {
            let home = lookup(raw.id, raw.team_h)?;
            let away = lookup(raw.id, raw.team_a)?;

            Ok(Fixture {
                id: raw.id,
                gameweek: raw.event,
                home_team: home.id,
                away_team: away.id,
                home_name: home.name.clone(),
                away_name: away.name.clone(),
                home_short: home.short_name.clone(),
                away_short: away.short_name.clone(),
                home_difficulty: raw.team_h_difficulty,
                away_difficulty: raw.team_a_difficulty,
                finished: raw.finished,
                home_score: raw.team_h_score,
                away_score: raw.team_a_score,
                kickoff_time: raw.kickoff_time.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn bootstrap(elements: serde_json::Value) -> BootstrapStatic {
        serde_json::from_value(json!({
            "events": [],
            "teams": [
                {"id": 1, "name": "Team A", "short_name": "AAA"},
                {"id": 2, "name": "Team B", "short_name": "BBB"}
            ],
            "elements": elements
        }))
        .unwrap()
    }

    fn element(id: u32, team: u32, now_cost: i32, total_points: i32) -> serde_json::Value {
        json!({
            "id": id, "first_name": "First", "second_name": "Last", "web_name": "Last",
            "team": team, "element_type": 2, "now_cost": now_cost,
            "total_points": total_points, "form": "3.0", "points_per_game": "2.5",
            "selected_by_percent": "8.4", "status": "a", "cost_change_start": -2
        })
    }

    #[test]
    fn test_points_per_price_example() {
        let players = build_player_table(&bootstrap(json!([element(1, 1, 70, 60)]))).unwrap();

        assert_eq!(players.len(), 1);
        let player = &players[0];
        assert_eq!(player.price, dec!(7.0));
        assert_eq!(player.points_per_price, Some(dec!(8.57)));
        assert_eq!(player.team_name, "Team A");
        assert_eq!(player.team_short, "AAA");
        assert_eq!(player.position, Position::Defender);
        assert_eq!(player.price_change, dec!(-0.2));
        assert_eq!(player.full_name(), "First Last");
    }

    #[test]
    fn test_zero_price_has_no_points_per_price() {
        let players = build_player_table(&bootstrap(json!([element(1, 2, 0, 10)]))).unwrap();
        assert_eq!(players[0].points_per_price, None);
    }

    #[test]
    fn test_player_table_is_deterministic() {
        let raw = bootstrap(json!([element(1, 1, 70, 60), element(2, 2, 45, 33)]));

        let first = build_player_table(&raw).unwrap();
        let second = build_player_table(&raw).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_team_is_rejected() {
        let err = build_player_table(&bootstrap(json!([element(9, 42, 50, 10)]))).unwrap_err();
        assert_eq!(err, TableError::UnknownPlayerTeam { player: 9, team: 42 });
    }

    #[test]
    fn test_fixture_table_joins_team_labels() {
        let teams = build_teams(&bootstrap(json!([])).teams);
        let raw: Vec<RawFixture> = serde_json::from_value(json!([
            {"id": 10, "event": 5, "team_h": 2, "team_a": 1,
             "team_h_difficulty": 3, "team_a_difficulty": 4,
             "finished": true, "team_h_score": 2, "team_a_score": 1}
        ]))
        .unwrap();

        let fixtures = build_fixture_table(&raw, &teams).unwrap();
        let fixture = &fixtures[0];

        assert_eq!(fixture.home_short, "BBB");
        assert_eq!(fixture.away_name, "Team A");
        assert_eq!(fixture.score_label().as_deref(), Some("2 - 1"));

        let away_view = fixture.for_team(1).unwrap();
        assert_eq!(away_view.opponent, "BBB");
        assert_eq!(away_view.venue, Venue::Away);
        assert_eq!(away_view.difficulty.value(), 4);
        assert_eq!(away_view.ticker_label(), "BBB(A)[4]");

        assert!(fixture.for_team(3).is_none());
    }

    #[test]
    fn test_fixture_with_unknown_team_is_rejected() {
        let teams = build_teams(&bootstrap(json!([])).teams);
        let raw: Vec<RawFixture> = serde_json::from_value(json!([
            {"id": 11, "event": 5, "team_h": 1, "team_a": 20,
             "team_h_difficulty": 3, "team_a_difficulty": 3, "finished": false}
        ]))
        .unwrap();

        assert_eq!(
            build_fixture_table(&raw, &teams).unwrap_err(),
            TableError::UnknownFixtureTeam { fixture: 11, team: 20 }
        );
    }
}
