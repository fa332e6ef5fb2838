//! Fixture difficulty, double/blank gameweeks and the fixture ticker.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use tracing::info;

use crate::client::FplClient;
use crate::models::{BootstrapStatic, RawFixture};
use crate::tables::{build_fixture_table, build_teams, Fixture, TableError, Team, TeamFixture};

use super::AnalysisError;

/// Difficulty outlook of one team over its next fixtures.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureDifficulty {
    pub team_id: u32,
    pub team_name: String,
    pub team_short: String,
    /// Mean difficulty rounded to 2 places; zero without fixtures
    pub avg_difficulty: Decimal,
    pub total_difficulty: u32,
    pub fixtures: Vec<TeamFixture>,
}

impl FixtureDifficulty {
    /// A zero average means "no fixtures", not "easiest run".
    pub fn has_data(&self) -> bool {
        !self.fixtures.is_empty()
    }

    /// `OPP(H) OPP(A) ...`
    pub fn summary(&self) -> String {
        self.fixtures
            .iter()
            .map(|f| f.short_label())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoubleGameweek {
    pub gameweek: u32,
    pub team_id: u32,
    pub team_short: String,
    pub fixtures: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlankGameweek {
    pub gameweek: u32,
    pub team_id: u32,
    pub team_short: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerRow {
    pub team_id: u32,
    pub team_short: String,
    /// One cell per ticker gameweek; empty for a blank
    pub cells: Vec<Vec<TeamFixture>>,
}

/// Every team's fixtures laid out per gameweek.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticker {
    pub gameweeks: Vec<u32>,
    pub rows: Vec<TickerRow>,
}

pub struct FixtureAnalyzer {
    teams: Vec<Team>,
    fixtures: Vec<Fixture>,
    current_gameweek: Option<u32>,
}

impl FixtureAnalyzer {
    pub async fn load(client: &FplClient) -> Result<Self, AnalysisError> {
        let bootstrap = client.get_bootstrap_static().await?;
        let fixtures = client.get_fixtures().await?;
        let analyzer = Self::from_raw(&bootstrap, &fixtures)?;
        info!(
            "Loaded {} fixtures for {} teams",
            analyzer.fixtures.len(),
            analyzer.teams.len()
        );
        Ok(analyzer)
    }

    pub fn from_raw(
        bootstrap: &BootstrapStatic,
        fixtures: &[RawFixture],
    ) -> Result<Self, TableError> {
        let teams = build_teams(&bootstrap.teams);
        let fixtures = build_fixture_table(fixtures, &teams)?;
        Ok(Self {
            teams,
            fixtures,
            current_gameweek: bootstrap.current_gameweek(),
        })
    }

    /// Drop the client cache and rebuild from fresh data.
    pub async fn refresh(&mut self, client: &FplClient) -> Result<(), AnalysisError> {
        client.clear_cache().await;
        *self = Self::load(client).await?;
        Ok(())
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    pub fn current_gameweek(&self) -> Option<u32> {
        self.current_gameweek
    }

    /// Resolve a team by short code or name, exact match first, then by
    /// name fragment (lowest id wins).
    pub fn find_team(&self, query: &str) -> Option<&Team> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        let needle = query.to_lowercase();

        self.teams
            .iter()
            .find(|t| t.short_name.eq_ignore_ascii_case(query) || t.name.eq_ignore_ascii_case(query))
            .or_else(|| {
                self.teams
                    .iter()
                    .filter(|t| t.name.to_lowercase().contains(&needle))
                    .min_by_key(|t| t.id)
            })
    }

    fn team(&self, team_id: u32) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == team_id)
    }

    /// Next `n` unfinished fixtures of a team; unscheduled ones sort last.
    pub fn upcoming_for_team(&self, team_id: u32, n: usize) -> Vec<&Fixture> {
        let mut rows: Vec<&Fixture> = self
            .fixtures
            .iter()
            .filter(|f| !f.finished && f.involves(team_id))
            .collect();
        rows.sort_by_key(|f| (f.gameweek.is_none(), f.gameweek, f.kickoff_time.clone(), f.id));
        rows.truncate(n);
        rows
    }

    /// The team's next fixture, from its own side.
    pub fn next_fixture(&self, team_id: u32) -> Option<TeamFixture> {
        self.upcoming_for_team(team_id, 1)
            .first()
            .and_then(|f| f.for_team(team_id))
    }

    /// Average difficulty of the next `n` fixtures from the team's side.
    pub fn difficulty(&self, team_id: u32, n: usize) -> FixtureDifficulty {
        let fixtures: Vec<TeamFixture> = self
            .upcoming_for_team(team_id, n)
            .into_iter()
            .filter_map(|f| f.for_team(team_id))
            .collect();

        let total_difficulty: u32 = fixtures.iter().map(|f| u32::from(f.difficulty.value())).sum();
        let avg_difficulty = if fixtures.is_empty() {
            Decimal::ZERO
        } else {
            (Decimal::from(total_difficulty) / Decimal::from(fixtures.len())).round_dp(2)
        };

        let (team_name, team_short) = self
            .team(team_id)
            .map(|t| (t.name.clone(), t.short_name.clone()))
            .unwrap_or_default();

        FixtureDifficulty {
            team_id,
            team_name,
            team_short,
            avg_difficulty,
            total_difficulty,
            fixtures,
        }
    }

    fn ranked(&self, n: usize) -> Vec<FixtureDifficulty> {
        self.teams
            .iter()
            .map(|t| self.difficulty(t.id, n))
            .filter(FixtureDifficulty::has_data)
            .collect()
    }

    /// Teams with data by ascending average difficulty over `n` fixtures.
    pub fn best_fixtures(&self, n: usize) -> Vec<FixtureDifficulty> {
        let mut rows = self.ranked(n);
        rows.sort_by(|a, b| {
            a.avg_difficulty
                .cmp(&b.avg_difficulty)
                .then(a.team_id.cmp(&b.team_id))
        });
        rows
    }

    /// Teams with data by descending average difficulty over `n` fixtures.
    pub fn worst_fixtures(&self, n: usize) -> Vec<FixtureDifficulty> {
        let mut rows = self.ranked(n);
        rows.sort_by(|a, b| {
            b.avg_difficulty
                .cmp(&a.avg_difficulty)
                .then(a.team_id.cmp(&b.team_id))
        });
        rows
    }

    /// League-wide mean of the teams' averages, `None` when no team has data.
    pub fn league_average_difficulty(&self, n: usize) -> Option<Decimal> {
        let rows = self.ranked(n);
        if rows.is_empty() {
            return None;
        }
        let sum: Decimal = rows.iter().map(|r| r.avg_difficulty).sum();
        Some((sum / Decimal::from(rows.len())).round_dp(2))
    }

    pub fn gameweek_fixtures(&self, gameweek: u32) -> Vec<&Fixture> {
        let mut rows: Vec<&Fixture> = self
            .fixtures
            .iter()
            .filter(|f| f.gameweek == Some(gameweek))
            .collect();
        rows.sort_by_key(|f| (f.kickoff_time.clone(), f.id));
        rows
    }

    /// Difficulty outlook for several teams, easiest first; teams without
    /// data go last.
    pub fn compare(&self, team_ids: &[u32], n: usize) -> Vec<FixtureDifficulty> {
        let mut rows: Vec<FixtureDifficulty> =
            team_ids.iter().map(|id| self.difficulty(*id, n)).collect();
        rows.sort_by(|a, b| {
            b.has_data()
                .cmp(&a.has_data())
                .then(a.avg_difficulty.cmp(&b.avg_difficulty))
                .then(a.team_id.cmp(&b.team_id))
        });
        rows
    }

    /// Fixture count per (gameweek, team) over unfinished scheduled fixtures.
    fn upcoming_counts(&self) -> BTreeMap<u32, BTreeMap<u32, usize>> {
        let mut counts: BTreeMap<u32, BTreeMap<u32, usize>> = BTreeMap::new();
        for fixture in self.fixtures.iter().filter(|f| !f.finished) {
            let Some(gameweek) = fixture.gameweek else {
                continue;
            };
            let per_team = counts.entry(gameweek).or_default();
            *per_team.entry(fixture.home_team).or_default() += 1;
            *per_team.entry(fixture.away_team).or_default() += 1;
        }
        counts
    }

    /// Teams with more than one fixture in an upcoming gameweek.
    pub fn double_gameweeks(&self) -> Vec<DoubleGameweek> {
        let counts = self.upcoming_counts();
        let mut rows = Vec::new();
        for (gameweek, per_team) in &counts {
            for team in &self.teams {
                let fixtures = per_team.get(&team.id).copied().unwrap_or(0);
                if fixtures > 1 {
                    rows.push(DoubleGameweek {
                        gameweek: *gameweek,
                        team_id: team.id,
                        team_short: team.short_name.clone(),
                        fixtures,
                    });
                }
            }
        }
        rows
    }

    /// Teams without a fixture in an upcoming gameweek others play in.
    pub fn blank_gameweeks(&self) -> Vec<BlankGameweek> {
        let counts = self.upcoming_counts();
        let mut rows = Vec::new();
        for (gameweek, per_team) in &counts {
            for team in self.teams.iter().filter(|t| !per_team.contains_key(&t.id)) {
                rows.push(BlankGameweek {
                    gameweek: *gameweek,
                    team_id: team.id,
                    team_short: team.short_name.clone(),
                });
            }
        }
        rows
    }

    /// Earliest gameweek that still has an unfinished fixture.
    pub fn next_unplayed_gameweek(&self) -> Option<u32> {
        self.fixtures
            .iter()
            .filter(|f| !f.finished)
            .filter_map(|f| f.gameweek)
            .min()
    }

    /// `n` gameweeks from the next unplayed one, one row per team.
    pub fn ticker(&self, n: usize) -> Ticker {
        let scheduled: BTreeSet<u32> = self.fixtures.iter().filter_map(|f| f.gameweek).collect();
        let gameweeks: Vec<u32> = match self.next_unplayed_gameweek() {
            Some(start) => scheduled.range(start..).copied().take(n).collect(),
            None => Vec::new(),
        };

        let rows = self
            .teams
            .iter()
            .map(|team| TickerRow {
                team_id: team.id,
                team_short: team.short_name.clone(),
                cells: gameweeks
                    .iter()
                    .map(|gw| {
                        self.gameweek_fixtures(*gw)
                            .into_iter()
                            .filter_map(|f| f.for_team(team.id))
                            .collect()
                    })
                    .collect(),
            })
            .collect();

        Ticker { gameweeks, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::testdata;
    use crate::client::MockTransport;
    use crate::tables::Venue;
    use crate::Config;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn analyzer() -> FixtureAnalyzer {
        FixtureAnalyzer::from_raw(&testdata::bootstrap(), &testdata::fixtures()).unwrap()
    }

    fn shorts(rows: &[FixtureDifficulty]) -> Vec<&str> {
        rows.iter().map(|r| r.team_short.as_str()).collect()
    }

    #[test]
    fn test_home_and_away_difficulty_average() {
        let analyzer = analyzer();

        let outlook = analyzer.difficulty(1, 2);

        assert_eq!(outlook.avg_difficulty, dec!(3.0));
        assert_eq!(outlook.total_difficulty, 6);
        assert_eq!(outlook.fixtures.len(), 2);
        assert_eq!(outlook.fixtures[0].venue, Venue::Home);
        assert_eq!(outlook.fixtures[0].opponent, "CHE");
        assert_eq!(outlook.fixtures[1].venue, Venue::Away);
        assert_eq!(outlook.fixtures[1].difficulty.value(), 4);
        assert_eq!(outlook.summary(), "CHE(H) BRE(A)");
    }

    #[test]
    fn test_team_without_fixtures_has_no_data() {
        let outlook = analyzer().difficulty(5, 5);

        assert!(!outlook.has_data());
        assert_eq!(outlook.avg_difficulty, Decimal::ZERO);
        assert_eq!(outlook.team_short, "EVE");
    }

    #[test]
    fn test_upcoming_fixtures_put_unscheduled_last() {
        let analyzer = analyzer();

        let ids: Vec<u32> = analyzer
            .upcoming_for_team(2, 5)
            .iter()
            .map(|f| f.id)
            .collect();

        // Finished GW10 fixture skipped
        assert_eq!(ids, vec![4, 5, 9]);
        assert_eq!(analyzer.upcoming_for_team(2, 1).len(), 1);
    }

    #[test]
    fn test_best_and_worst_fixtures_exclude_teams_without_data() {
        let analyzer = analyzer();

        let best = analyzer.best_fixtures(5);
        let worst = analyzer.worst_fixtures(5);

        assert_eq!(shorts(&best), vec!["BRE", "ARS", "CHE", "LIV"]);
        assert_eq!(best[0].avg_difficulty, dec!(2.67));
        // CHE and LIV tie on 3.25
        assert_eq!(shorts(&worst), vec!["CHE", "LIV", "ARS", "BRE"]);
    }

    #[test]
    fn test_league_average_difficulty() {
        assert_eq!(analyzer().league_average_difficulty(5), Some(dec!(3.04)));

        let empty = FixtureAnalyzer::from_raw(&testdata::bootstrap(), &[]).unwrap();
        assert_eq!(empty.league_average_difficulty(5), None);
    }

    #[test]
    fn test_double_gameweek_only_reports_that_gameweek() {
        let doubles = analyzer().double_gameweeks();

        assert_eq!(
            doubles,
            vec![
                DoubleGameweek { gameweek: 12, team_id: 3, team_short: "CHE".into(), fixtures: 2 },
                DoubleGameweek { gameweek: 12, team_id: 4, team_short: "LIV".into(), fixtures: 2 },
            ]
        );
    }

    #[test]
    fn test_blank_gameweeks() {
        let blanks: Vec<(u32, String)> = analyzer()
            .blank_gameweeks()
            .into_iter()
            .map(|b| (b.gameweek, b.team_short))
            .collect();

        assert_eq!(
            blanks,
            vec![
                (11, "EVE".to_string()),
                (12, "EVE".to_string()),
                (13, "BRE".to_string()),
                (13, "CHE".to_string()),
                (13, "EVE".to_string()),
            ]
        );
    }

    #[test]
    fn test_blank_requires_other_teams_to_play() {
        let fixtures: Vec<RawFixture> = serde_json::from_value(json!([
            {"id": 1, "event": 20, "team_h": 1, "team_a": 2,
             "team_h_difficulty": 3, "team_a_difficulty": 3, "finished": false}
        ]))
        .unwrap();
        let analyzer = FixtureAnalyzer::from_raw(&testdata::bootstrap(), &fixtures).unwrap();

        let blanks = analyzer.blank_gameweeks();

        // Only GW20 has fixtures; no other gameweek can be blank
        assert!(blanks.iter().all(|b| b.gameweek == 20));
        assert_eq!(blanks.len(), 3);
        assert!(analyzer.double_gameweeks().is_empty());
    }

    #[test]
    fn test_gameweek_fixtures() {
        let analyzer = analyzer();
        let ids: Vec<u32> = analyzer.gameweek_fixtures(12).iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![5, 6, 7]);
        assert!(analyzer.gameweek_fixtures(30).is_empty());
    }

    #[test]
    fn test_compare_puts_teams_without_data_last() {
        let rows = analyzer().compare(&[5, 4, 2], 5);
        assert_eq!(shorts(&rows), vec!["BRE", "LIV", "EVE"]);
    }

    #[test]
    fn test_find_team() {
        let analyzer = analyzer();
        assert_eq!(analyzer.find_team("liv").map(|t| t.id), Some(4));
        assert_eq!(analyzer.find_team("Chelsea").map(|t| t.id), Some(3));
        assert_eq!(analyzer.find_team("ford").map(|t| t.id), Some(2));
        assert!(analyzer.find_team("Spurs").is_none());
        assert!(analyzer.find_team("  ").is_none());
    }

    #[test]
    fn test_ticker_cells() {
        let ticker = analyzer().ticker(3);

        assert_eq!(ticker.gameweeks, vec![11, 12, 13]);
        assert_eq!(ticker.rows.len(), 5);

        let labels = |row: &TickerRow| -> Vec<Vec<String>> {
            row.cells
                .iter()
                .map(|cell| cell.iter().map(|f| f.ticker_label()).collect())
                .collect()
        };

        assert_eq!(
            labels(&ticker.rows[0]),
            vec![vec!["CHE(H)[2]"], vec!["BRE(A)[4]"], vec!["LIV(H)[3]"]]
        );
        // Double in GW12, blank in GW13
        assert_eq!(
            labels(&ticker.rows[2]),
            vec![
                vec!["ARS(A)[4]".to_string()],
                vec!["LIV(H)[3]".to_string(), "LIV(A)[3]".to_string()],
                vec![],
            ]
        );
        assert!(ticker.rows[4].cells.iter().all(Vec::is_empty));
    }

    #[test]
    fn test_next_fixture() {
        let analyzer = analyzer();
        let next = analyzer.next_fixture(4).unwrap();
        assert_eq!(next.short_label(), "BRE(H)");
        assert!(analyzer.next_fixture(5).is_none());
        assert_eq!(analyzer.current_gameweek(), Some(11));
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_fetches_bootstrap_and_fixtures() {
        let mut mock = MockTransport::new();
        mock.expect_get()
            .withf(|url| url.ends_with("/bootstrap-static/"))
            .times(1)
            .returning(|_| Ok(testdata::bootstrap_json().to_string()));
        mock.expect_get()
            .withf(|url| url.ends_with("/fixtures/"))
            .times(1)
            .returning(|_| Ok(testdata::fixtures_json().to_string()));
        let client = FplClient::with_transport(Box::new(mock), &Config::default());

        let analyzer = FixtureAnalyzer::load(&client).await.unwrap();

        assert_eq!(analyzer.fixtures().len(), 9);
        assert_eq!(analyzer.teams().len(), 5);
    }
}
