//! Transfer, captaincy and chip advice built on both analyzers.

use std::collections::{BTreeSet, HashMap};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::client::FplClient;
use crate::models::{Difficulty, Position};
use crate::tables::Player;

use super::fixtures::FixtureAnalyzer;
use super::players::PlayerAnalyzer;
use super::{by_score_desc, AnalysisError, PlayerFilter};

/// Fixtures looked ahead when scoring transfers and the wildcard.
pub const FIXTURE_HORIZON: usize = 5;

/// Default lower price bound for premium options.
pub const DEFAULT_PREMIUM_PRICE: Decimal = dec!(10.0);

const TARGET_MIN_POINTS: i32 = 20;
const SELL_MIN_OWNERSHIP: Decimal = dec!(10);
const CAPTAIN_MIN_OWNERSHIP: Decimal = dec!(15);
const REPLACEMENT_POOL: usize = 15;
const REPLACEMENT_LIMIT: usize = 10;
const BEST_FIXTURE_TEAMS: usize = 3;

/// Opponent label when a team has no next fixture.
pub const UNKNOWN_OPPONENT: &str = "unknown";

#[derive(Debug, Clone, PartialEq)]
pub struct TransferTarget {
    pub player: Player,
    /// Average difficulty of the next fixtures, neutral without data
    pub fixture_difficulty: Decimal,
    pub score: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SellCandidate {
    pub player: Player,
    pub fixture_difficulty: Decimal,
    pub score: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptainPick {
    pub player: Player,
    pub opponent: String,
    pub difficulty: Difficulty,
    pub score: Decimal,
}

/// Transfer target compared against the outgoing player.
#[derive(Debug, Clone, PartialEq)]
pub struct Replacement {
    pub target: TransferTarget,
    pub price_diff: Decimal,
    pub form_diff: Decimal,
}

/// League-average difficulty bounds for wildcard advice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipThresholds {
    /// Above this, many teams face tough runs
    pub tough: Decimal,
    /// Below this, many teams face easy runs
    pub easy: Decimal,
}

impl Default for ChipThresholds {
    fn default() -> Self {
        Self {
            tough: dec!(3.5),
            easy: dec!(2.5),
        }
    }
}

impl ChipThresholds {
    pub fn assess(&self, league_average: Option<Decimal>) -> WildcardAdvice {
        match league_average {
            Some(avg) if avg > self.tough => WildcardAdvice::Consider,
            Some(avg) if avg < self.easy => WildcardAdvice::GoodTime,
            _ => WildcardAdvice::Neutral,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WildcardAdvice {
    Consider,
    GoodTime,
    Neutral,
}

impl WildcardAdvice {
    pub fn message(&self) -> &'static str {
        match self {
            WildcardAdvice::Consider => "Consider Wildcard - many teams have tough fixtures",
            WildcardAdvice::GoodTime => "Good time for Wildcard - many teams have easy fixtures",
            WildcardAdvice::Neutral => "Neutral - no strong signal for Wildcard",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChipStrategy {
    pub current_gameweek: Option<u32>,
    pub league_average_difficulty: Option<Decimal>,
    pub wildcard: WildcardAdvice,
    pub bench_boost_gameweeks: Vec<u32>,
    pub triple_captain_gameweeks: Vec<u32>,
    pub free_hit_gameweeks: Vec<u32>,
    pub best_fixture_teams: Vec<String>,
}

pub struct TransferAdvisor {
    players: PlayerAnalyzer,
    fixtures: FixtureAnalyzer,
    thresholds: ChipThresholds,
}

impl TransferAdvisor {
    pub fn new(players: PlayerAnalyzer, fixtures: FixtureAnalyzer) -> Self {
        Self {
            players,
            fixtures,
            thresholds: ChipThresholds::default(),
        }
    }

    pub async fn load(client: &FplClient) -> Result<Self, AnalysisError> {
        let players = PlayerAnalyzer::load(client).await?;
        let fixtures = FixtureAnalyzer::load(client).await?;
        Ok(Self::new(players, fixtures))
    }

    pub fn with_thresholds(mut self, thresholds: ChipThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Drop the client cache and rebuild both tables.
    ///
    /// On error both tables are left as they were.
    pub async fn refresh(&mut self, client: &FplClient) -> Result<(), AnalysisError> {
        client.clear_cache().await;
        let players = PlayerAnalyzer::load(client).await?;
        let fixtures = FixtureAnalyzer::load(client).await?;
        self.players = players;
        self.fixtures = fixtures;
        Ok(())
    }

    pub fn players(&self) -> &PlayerAnalyzer {
        &self.players
    }

    pub fn fixtures(&self) -> &FixtureAnalyzer {
        &self.fixtures
    }

    /// Average difficulty per team over the horizon, neutral without data.
    fn fixture_difficulties<'a>(
        &self,
        players: impl Iterator<Item = &'a Player>,
    ) -> HashMap<u32, Decimal> {
        let mut by_team = HashMap::new();
        for player in players {
            by_team.entry(player.team_id).or_insert_with(|| {
                let outlook = self.fixtures.difficulty(player.team_id, FIXTURE_HORIZON);
                if outlook.has_data() {
                    outlook.avg_difficulty
                } else {
                    Decimal::from(Difficulty::NEUTRAL)
                }
            });
        }
        by_team
    }

    /// `form*4 + points_per_price*0.3 + (5 - difficulty)*3` over available
    /// players with more than 20 points.
    pub fn transfer_targets(&self, filter: &PlayerFilter, n: usize) -> Vec<TransferTarget> {
        let pool: Vec<&Player> = self
            .players
            .players()
            .iter()
            .filter(|p| p.is_available() && p.total_points > TARGET_MIN_POINTS)
            .filter(|p| filter.matches(p))
            .collect();
        let difficulties = self.fixture_difficulties(pool.iter().copied());

        let mut rows: Vec<TransferTarget> = pool
            .into_iter()
            .filter_map(|p| {
                let ppp = p.points_per_price?;
                let difficulty = difficulties
                    .get(&p.team_id)
                    .copied()
                    .unwrap_or(Decimal::from(Difficulty::NEUTRAL));
                let score = p.form * dec!(4) + ppp * dec!(0.3) + (dec!(5) - difficulty) * dec!(3);
                Some(TransferTarget {
                    player: p.clone(),
                    fixture_difficulty: difficulty,
                    score: score.round_dp(2),
                })
            })
            .collect();
        rows.sort_by(|a, b| by_score_desc((a.score, a.player.id), (b.score, b.player.id)));
        rows.truncate(n);
        rows
    }

    /// `(5 - form)*2 + difficulty*2 + price*0.5`, times 1.5 when unavailable,
    /// over players owned by more than 10%.
    pub fn transfer_out(&self, n: usize) -> Vec<SellCandidate> {
        let pool: Vec<&Player> = self
            .players
            .players()
            .iter()
            .filter(|p| p.ownership > SELL_MIN_OWNERSHIP)
            .collect();
        let difficulties = self.fixture_difficulties(pool.iter().copied());

        let mut rows: Vec<SellCandidate> = pool
            .into_iter()
            .map(|p| {
                let difficulty = difficulties
                    .get(&p.team_id)
                    .copied()
                    .unwrap_or(Decimal::from(Difficulty::NEUTRAL));
                let mut score =
                    (dec!(5) - p.form) * dec!(2) + difficulty * dec!(2) + p.price * dec!(0.5);
                if !p.is_available() {
                    score *= dec!(1.5);
                }
                SellCandidate {
                    player: p.clone(),
                    fixture_difficulty: difficulty,
                    score: score.round_dp(2),
                }
            })
            .collect();
        rows.sort_by(|a, b| by_score_desc((a.score, a.player.id), (b.score, b.player.id)));
        rows.truncate(n);
        rows
    }

    /// `form*5 + (5 - next difficulty)*4 + points_per_game` over available
    /// players owned by more than 15%.
    pub fn captaincy_picks(&self, n: usize) -> Vec<CaptainPick> {
        let mut rows: Vec<CaptainPick> = self
            .players
            .players()
            .iter()
            .filter(|p| p.is_available() && p.ownership > CAPTAIN_MIN_OWNERSHIP)
            .map(|p| {
                let (opponent, difficulty) = match self.fixtures.next_fixture(p.team_id) {
                    Some(next) => (next.opponent, next.difficulty),
                    None => (UNKNOWN_OPPONENT.to_string(), Difficulty::NEUTRAL),
                };
                let score = p.form * dec!(5)
                    + (dec!(5) - Decimal::from(difficulty)) * dec!(4)
                    + p.points_per_game;
                CaptainPick {
                    player: p.clone(),
                    opponent,
                    difficulty,
                    score: score.round_dp(2),
                }
            })
            .collect();
        rows.sort_by(|a, b| by_score_desc((a.score, a.player.id), (b.score, b.player.id)));
        rows.truncate(n);
        rows
    }

    pub fn chip_strategy(&self) -> ChipStrategy {
        let double_gameweeks: Vec<u32> = self
            .fixtures
            .double_gameweeks()
            .into_iter()
            .map(|d| d.gameweek)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let free_hit_gameweeks: Vec<u32> = self
            .fixtures
            .blank_gameweeks()
            .into_iter()
            .map(|b| b.gameweek)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let league_average = self.fixtures.league_average_difficulty(FIXTURE_HORIZON);

        ChipStrategy {
            current_gameweek: self.fixtures.current_gameweek(),
            league_average_difficulty: league_average,
            wildcard: self.thresholds.assess(league_average),
            bench_boost_gameweeks: double_gameweeks.clone(),
            triple_captain_gameweeks: double_gameweeks,
            free_hit_gameweeks,
            best_fixture_teams: self
                .fixtures
                .best_fixtures(FIXTURE_HORIZON)
                .into_iter()
                .take(BEST_FIXTURE_TEAMS)
                .map(|t| t.team_short)
                .collect(),
        }
    }

    /// Transfer targets affordable with `budget`, compared to the player
    /// going out.
    pub fn suggest_replacements(
        &self,
        player_out_id: u32,
        budget: Decimal,
        same_position: bool,
    ) -> Result<Vec<Replacement>, AnalysisError> {
        let out = self.players.get(player_out_id)?;
        let filter = PlayerFilter {
            position: same_position.then_some(out.position),
            max_price: Some(budget),
        };

        Ok(self
            .transfer_targets(&filter, REPLACEMENT_POOL)
            .into_iter()
            .filter(|t| t.player.id != out.id)
            .take(REPLACEMENT_LIMIT)
            .map(|target| Replacement {
                price_diff: (target.player.price - out.price).round_dp(1),
                form_diff: (target.player.form - out.form).round_dp(2),
                target,
            })
            .collect())
    }

    pub fn budget_options(
        &self,
        position: Position,
        max_price: Decimal,
        n: usize,
    ) -> Vec<TransferTarget> {
        self.transfer_targets(&PlayerFilter::position(position).with_max_price(max_price), n)
    }

    /// Available players at or above `min_price`, by form then points.
    pub fn premium_options(&self, position: Position, min_price: Decimal, n: usize) -> Vec<Player> {
        let mut rows: Vec<&Player> = self
            .players
            .players()
            .iter()
            .filter(|p| p.is_available() && p.position == position && p.price >= min_price)
            .collect();
        rows.sort_by(|a, b| {
            b.form
                .cmp(&a.form)
                .then(b.total_points.cmp(&a.total_points))
                .then(a.id.cmp(&b.id))
        });
        rows.into_iter().take(n).cloned().collect()
    }
}
