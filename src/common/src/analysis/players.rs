//! Player rankings: form, value, differentials, injuries and price moves.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{info, warn};

use crate::client::FplClient;
use crate::models::{BootstrapStatic, PlayerSummary, Position};
use crate::tables::{build_player_table, build_teams, Player, TableError, Team};

use super::{by_score_desc, AnalysisError, PlayerFilter};

/// Ownership cap for a differential pick, in percent.
pub const DEFAULT_MAX_OWNERSHIP: Decimal = dec!(5.0);

/// Minimum season points for a differential pick.
pub const DEFAULT_MIN_POINTS: i32 = 20;

const PRICE_CHANGE_LIMIT: usize = 10;

/// Low-ownership pick with its `points_per_price * form` score.
#[derive(Debug, Clone, PartialEq)]
pub struct Differential {
    pub player: Player,
    pub score: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceChanges {
    pub risers: Vec<Player>,
    pub fallers: Vec<Player>,
}

/// Player record plus the fetched history and upcoming fixtures.
#[derive(Debug, Clone)]
pub struct PlayerDetails {
    pub player: Player,
    /// `None` when the summary could not be fetched
    pub summary: Option<PlayerSummary>,
}

pub struct PlayerAnalyzer {
    teams: Vec<Team>,
    players: Vec<Player>,
}

impl PlayerAnalyzer {
    pub async fn load(client: &FplClient) -> Result<Self, AnalysisError> {
        let bootstrap = client.get_bootstrap_static().await?;
        let analyzer = Self::from_bootstrap(&bootstrap)?;
        info!(
            "Loaded {} players across {} teams",
            analyzer.players.len(),
            analyzer.teams.len()
        );
        Ok(analyzer)
    }

    pub fn from_bootstrap(bootstrap: &BootstrapStatic) -> Result<Self, TableError> {
        Ok(Self {
            teams: build_teams(&bootstrap.teams),
            players: build_player_table(bootstrap)?,
        })
    }

    /// Drop the client cache and rebuild from fresh data.
    pub async fn refresh(&mut self, client: &FplClient) -> Result<(), AnalysisError> {
        client.clear_cache().await;
        *self = Self::load(client).await?;
        Ok(())
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn find(&self, player_id: u32) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn get(&self, player_id: u32) -> Result<&Player, AnalysisError> {
        self.find(player_id)
            .ok_or(AnalysisError::PlayerNotFound(player_id))
    }

    fn available(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_available())
    }

    /// Available players by form, highest first.
    pub fn top_form(&self, n: usize, position: Option<Position>) -> Vec<Player> {
        let mut rows: Vec<&Player> = self
            .available()
            .filter(|p| position.map_or(true, |pos| p.position == pos))
            .collect();
        rows.sort_by(|a, b| by_score_desc((a.form, a.id), (b.form, b.id)));
        rows.into_iter().take(n).cloned().collect()
    }

    /// Available players with points, by points per price.
    pub fn best_value(&self, n: usize, filter: &PlayerFilter) -> Vec<Player> {
        let mut rows: Vec<(&Player, Decimal)> = self
            .available()
            .filter(|p| p.total_points > 0 && filter.matches(p))
            .filter_map(|p| p.points_per_price.map(|ppp| (p, ppp)))
            .collect();
        rows.sort_by(|a, b| by_score_desc((a.1, a.0.id), (b.1, b.0.id)));
        rows.into_iter().take(n).map(|(p, _)| p.clone()).collect()
    }

    pub fn differentials(
        &self,
        n: usize,
        max_ownership: Decimal,
        min_points: i32,
    ) -> Vec<Differential> {
        let mut rows: Vec<Differential> = self
            .available()
            .filter(|p| p.ownership <= max_ownership && p.total_points >= min_points)
            .filter_map(|p| {
                let ppp = p.points_per_price?;
                Some(Differential {
                    player: p.clone(),
                    score: (ppp * p.form).round_dp(2),
                })
            })
            .collect();
        rows.sort_by(|a, b| by_score_desc((a.score, a.player.id), (b.score, b.player.id)));
        rows.truncate(n);
        rows
    }

    /// Players in the order requested; unknown ids are skipped.
    pub fn compare(&self, player_ids: &[u32]) -> Vec<Player> {
        player_ids
            .iter()
            .filter_map(|id| self.find(*id))
            .cloned()
            .collect()
    }

    /// Squad of every team whose name or short code contains `team`, by points.
    pub fn by_team(&self, team: &str) -> Vec<Player> {
        let needle = team.trim().to_lowercase();
        by_points(self.players.iter().filter(|p| {
            p.team_name.to_lowercase().contains(&needle)
                || p.team_short.to_lowercase().contains(&needle)
        }))
    }

    /// Squad of exactly one team, by points.
    pub fn by_team_id(&self, team_id: u32) -> Vec<Player> {
        by_points(self.players.iter().filter(|p| p.team_id == team_id))
    }

    /// Biggest risers and fallers since the season start.
    pub fn price_changes(&self) -> PriceChanges {
        let mut risers: Vec<&Player> = self
            .players
            .iter()
            .filter(|p| p.price_change > Decimal::ZERO)
            .collect();
        risers.sort_by(|a, b| by_score_desc((a.price_change, a.id), (b.price_change, b.id)));

        let mut fallers: Vec<&Player> = self
            .players
            .iter()
            .filter(|p| p.price_change < Decimal::ZERO)
            .collect();
        fallers.sort_by(|a, b| a.price_change.cmp(&b.price_change).then(a.id.cmp(&b.id)));

        PriceChanges {
            risers: risers.into_iter().take(PRICE_CHANGE_LIMIT).cloned().collect(),
            fallers: fallers.into_iter().take(PRICE_CHANGE_LIMIT).cloned().collect(),
        }
    }

    /// Every player not flagged available, most owned first.
    pub fn injury_list(&self) -> Vec<Player> {
        let mut rows: Vec<&Player> = self.players.iter().filter(|p| !p.is_available()).collect();
        rows.sort_by(|a, b| by_score_desc((a.ownership, a.id), (b.ownership, b.id)));
        rows.into_iter().cloned().collect()
    }

    /// Player record with history; a failed summary fetch is logged and omitted.
    pub async fn player_details(
        &self,
        client: &FplClient,
        player_id: u32,
    ) -> Result<PlayerDetails, AnalysisError> {
        let player = self.get(player_id)?.clone();

        let summary = match client.get_player_summary(player_id).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!("No summary for player {}: {}", player_id, e);
                None
            }
        };

        Ok(PlayerDetails { player, summary })
    }
}

fn by_points<'a>(players: impl Iterator<Item = &'a Player>) -> Vec<Player> {
    let mut rows: Vec<&Player> = players.collect();
    rows.sort_by(|a, b| {
        by_score_desc(
            (Decimal::from(a.total_points), a.id),
            (Decimal::from(b.total_points), b.id),
        )
    });
    rows.into_iter().cloned().collect()
}
