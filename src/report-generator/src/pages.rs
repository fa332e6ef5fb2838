//! The four report pages and writing them to disk.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use tracing::info;

use common::analysis::{FixtureDifficulty, Ticker};
use common::tables::Player;
use common::{PlayerFilter, TransferAdvisor};

use crate::render::{definition_list, stat_card, Page, Section, Table};

/// Knobs shared by every page.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Rows per ranking table
    pub top: usize,
    /// Price cap for the best-value table
    pub max_price: Decimal,
    /// Fixtures/gameweeks looked ahead
    pub horizon: usize,
}

fn price(value: Decimal) -> String {
    format!("{:.1}", value)
}

fn optional(value: Option<Decimal>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}

fn gameweek_list(gameweeks: &[u32]) -> String {
    if gameweeks.is_empty() {
        return "None identified".to_string();
    }
    gameweeks
        .iter()
        .map(|gw| gw.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn player_cells(player: &Player) -> Vec<String> {
    vec![
        player.web_name.clone(),
        player.team_short.clone(),
        player.position.to_string(),
        price(player.price),
    ]
}

pub fn dashboard(advisor: &TransferAdvisor) -> Page {
    let players = advisor.players();
    let fixtures = advisor.fixtures();
    let current = fixtures.current_gameweek().unwrap_or(1);

    let stats = [
        stat_card("Players Analyzed", &players.players().len().to_string()),
        stat_card("Teams Tracked", &players.teams().len().to_string()),
        stat_card("Fixtures", &fixtures.fixtures().len().to_string()),
        stat_card("Current GW", &current.to_string()),
    ];

    let mut reports = Table::new(&["Report", "File", "Description"]);
    reports.row(vec![
        "Player Analysis".to_string(),
        "players.html".to_string(),
        "Top form players, best value picks and differentials".to_string(),
    ]);
    reports.row(vec![
        "Fixture Analysis".to_string(),
        "fixtures.html".to_string(),
        "Best and worst runs of fixtures and the fixture ticker".to_string(),
    ]);
    reports.row(vec![
        "Transfer Recommendations".to_string(),
        "transfers.html".to_string(),
        "Transfer targets, sell candidates, captaincy and chips".to_string(),
    ]);

    Page {
        file_name: "index.html",
        title: "FPL Analysis Dashboard".to_string(),
        tagline: "Fantasy Premier League statistics and recommendations".to_string(),
        sections: vec![
            Section::new(
                "Season Overview",
                "",
                format!("<div class=\"stats-grid\">{}</div>", stats.join("\n")),
            ),
            Section::new("Available Reports", "", reports.render()),
        ],
    }
}

pub fn players_page(advisor: &TransferAdvisor, options: &ReportOptions) -> Page {
    let analyzer = advisor.players();

    let mut form = Table::new(&["Player", "Team", "Pos", "Price", "Form", "Points", "PPG", "Owned %"]);
    for p in analyzer.top_form(options.top, None) {
        let mut cells = player_cells(&p);
        cells.extend([
            p.form.to_string(),
            p.total_points.to_string(),
            p.points_per_game.to_string(),
            p.ownership.to_string(),
        ]);
        form.row(cells);
    }

    let filter = PlayerFilter::default().with_max_price(options.max_price);
    let mut value = Table::new(&["Player", "Team", "Pos", "Price", "Points", "Pts/Price", "Form"]);
    for p in analyzer.best_value(options.top, &filter) {
        let mut cells = player_cells(&p);
        cells.extend([
            p.total_points.to_string(),
            optional(p.points_per_price),
            p.form.to_string(),
        ]);
        value.row(cells);
    }

    let mut differentials =
        Table::new(&["Player", "Team", "Pos", "Price", "Points", "Form", "Owned %", "Score"]);
    for d in analyzer.differentials(
        options.top,
        common::analysis::players::DEFAULT_MAX_OWNERSHIP,
        common::analysis::players::DEFAULT_MIN_POINTS,
    ) {
        let mut cells = player_cells(&d.player);
        cells.extend([
            d.player.total_points.to_string(),
            d.player.form.to_string(),
            d.player.ownership.to_string(),
            format!("{:.2}", d.score),
        ]);
        differentials.row(cells);
    }

    Page {
        file_name: "players.html",
        title: "Player Analysis".to_string(),
        tagline: "Top performers, value picks and differentials".to_string(),
        sections: vec![
            Section::new(
                "Top Form Players",
                "Available players in the best current form.",
                form.render(),
            ),
            Section::new(
                format!("Best Value Players (up to {})", price(options.max_price)),
                "Available players with the most points per unit of price.",
                value.render(),
            ),
            Section::new(
                "Differential Picks",
                "Owned by 5% or fewer managers with at least 20 points.",
                differentials.render(),
            ),
        ],
    }
}

fn difficulty_table(rows: &[FixtureDifficulty], top: usize) -> Table {
    let mut table = Table::new(&["Team", "Name", "Avg Difficulty", "Fixtures"]);
    for row in rows.iter().take(top) {
        table.row(vec![
            row.team_short.clone(),
            row.team_name.clone(),
            format!("{:.2}", row.avg_difficulty),
            row.summary(),
        ]);
    }
    table
}

fn ticker_table(ticker: &Ticker) -> Table {
    let mut headers = vec!["Team".to_string()];
    headers.extend(ticker.gameweeks.iter().map(|gw| format!("GW{}", gw)));
    let headers: Vec<&str> = headers.iter().map(String::as_str).collect();

    let mut table = Table::new(&headers);
    for row in &ticker.rows {
        let mut cells = vec![row.team_short.clone()];
        cells.extend(row.cells.iter().map(|cell| {
            if cell.is_empty() {
                "-".to_string()
            } else {
                cell.iter()
                    .map(|f| f.ticker_label())
                    .collect::<Vec<_>>()
                    .join(" + ")
            }
        }));
        table.row(cells);
    }
    table
}

pub fn fixtures_page(advisor: &TransferAdvisor, options: &ReportOptions) -> Page {
    let analyzer = advisor.fixtures();

    let best = analyzer.best_fixtures(options.horizon);
    let worst = analyzer.worst_fixtures(options.horizon);
    let ticker = analyzer.ticker(options.horizon);

    Page {
        file_name: "fixtures.html",
        title: "Fixture Analysis".to_string(),
        tagline: "Upcoming fixtures and difficulty ratings".to_string(),
        sections: vec![
            Section::new(
                format!("Best Upcoming Fixtures (next {})", options.horizon),
                "Teams with the easiest fixtures ahead.",
                difficulty_table(&best, options.top).render(),
            ),
            Section::new(
                format!("Worst Upcoming Fixtures (next {})", options.horizon),
                "Teams with the toughest fixtures ahead.",
                difficulty_table(&worst, options.top).render(),
            ),
            Section::new(
                "Fixture Ticker",
                "Opponent, H/A and [difficulty] per gameweek; - marks a blank.",
                ticker_table(&ticker).render(),
            ),
        ],
    }
}

pub fn transfers_page(advisor: &TransferAdvisor, options: &ReportOptions) -> Page {
    let mut targets = Table::new(&["Player", "Team", "Pos", "Price", "Form", "Pts/Price", "Fixtures", "Score"]);
    for t in advisor.transfer_targets(&PlayerFilter::default(), options.top) {
        let mut cells = player_cells(&t.player);
        cells.extend([
            t.player.form.to_string(),
            optional(t.player.points_per_price),
            format!("{:.2}", t.fixture_difficulty),
            format!("{:.2}", t.score),
        ]);
        targets.row(cells);
    }

    let mut sells = Table::new(&["Player", "Team", "Pos", "Price", "Form", "Status", "Owned %", "Fixtures", "Score"]);
    for s in advisor.transfer_out(options.top) {
        let mut cells = player_cells(&s.player);
        cells.extend([
            s.player.form.to_string(),
            s.player.status.label().to_string(),
            s.player.ownership.to_string(),
            format!("{:.2}", s.fixture_difficulty),
            format!("{:.2}", s.score),
        ]);
        sells.row(cells);
    }

    let mut captains = Table::new(&["Player", "Team", "Pos", "Price", "Opponent", "Difficulty", "Form", "Score"]);
    for c in advisor.captaincy_picks(options.top) {
        let mut cells = player_cells(&c.player);
        cells.extend([
            c.opponent.clone(),
            c.difficulty.to_string(),
            c.player.form.to_string(),
            format!("{:.2}", c.score),
        ]);
        captains.row(cells);
    }

    let chips = advisor.chip_strategy();
    let chip_items = [
        (
            "Current Gameweek",
            chips
                .current_gameweek
                .map_or_else(|| "-".to_string(), |gw| gw.to_string()),
        ),
        ("Wildcard", chips.wildcard.message().to_string()),
        (
            "League Avg Difficulty",
            optional(chips.league_average_difficulty),
        ),
        ("Best Fixture Teams", chips.best_fixture_teams.join(", ")),
        ("Bench Boost GWs", gameweek_list(&chips.bench_boost_gameweeks)),
        ("Triple Captain GWs", gameweek_list(&chips.triple_captain_gameweeks)),
        ("Free Hit GWs", gameweek_list(&chips.free_hit_gameweeks)),
    ];

    Page {
        file_name: "transfers.html",
        title: "Transfer Recommendations".to_string(),
        tagline: "Transfer targets, sell candidates and captaincy picks".to_string(),
        sections: vec![
            Section::new(
                "Top Transfer Targets",
                "Form, value and upcoming fixtures combined.",
                targets.render(),
            ),
            Section::new(
                "Transfer Out Candidates",
                "Widely owned players with poor form, tough fixtures or availability doubts.",
                sells.render(),
            ),
            Section::new(
                "Captain Picks",
                "Ranked on form, next opponent and points per game.",
                captains.render(),
            ),
            Section::new("Chip Strategy", "", definition_list(&chip_items)),
        ],
    }
}

pub fn build_all(advisor: &TransferAdvisor, options: &ReportOptions) -> Vec<Page> {
    vec![
        dashboard(advisor),
        players_page(advisor, options),
        fixtures_page(advisor, options),
        transfers_page(advisor, options),
    ]
}

/// Render every page into `out_dir`, creating it if needed.
pub fn write_reports(out_dir: &Path, pages: &[Page], generated_at: &str) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;

    let mut written = Vec::with_capacity(pages.len());
    for page in pages {
        let path = out_dir.join(page.file_name);
        fs::write(&path, page.render(generated_at))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Report generated: {}", path.display());
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::models::{BootstrapStatic, RawFixture};
    use common::{FixtureAnalyzer, PlayerAnalyzer};
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn advisor() -> TransferAdvisor {
        let bootstrap: BootstrapStatic = serde_json::from_value(json!({
            "events": [
                {"id": 7, "name": "Gameweek 7", "finished": false, "is_current": true, "is_next": false}
            ],
            "teams": [
                {"id": 1, "name": "Brighton & Hove Albion", "short_name": "BHA"},
                {"id": 2, "name": "Fulham", "short_name": "FUL"}
            ],
            "elements": [
                {"id": 1, "web_name": "Mitoma", "team": 1, "element_type": 3, "now_cost": 65,
                 "total_points": 52, "form": "6.0", "points_per_game": "5.2",
                 "selected_by_percent": "18.0", "status": "a", "cost_change_start": 1},
                {"id": 2, "web_name": "O'Brien <GK>", "team": 2, "element_type": 1, "now_cost": 45,
                 "total_points": 30, "form": "4.0", "points_per_game": "3.0",
                 "selected_by_percent": "2.5", "status": "a"},
                {"id": 3, "web_name": "Jimenez", "team": 2, "element_type": 4, "now_cost": 55,
                 "total_points": 22, "form": "1.0", "points_per_game": "2.2",
                 "selected_by_percent": "12.0", "status": "d"}
            ]
        }))
        .unwrap();
        let fixtures: Vec<RawFixture> = serde_json::from_value(json!([
            {"id": 1, "event": 7, "team_h": 1, "team_a": 2,
             "team_h_difficulty": 2, "team_a_difficulty": 3, "finished": false},
            {"id": 2, "event": 8, "team_h": 2, "team_a": 1,
             "team_h_difficulty": 3, "team_a_difficulty": 4, "finished": false}
        ]))
        .unwrap();

        TransferAdvisor::new(
            PlayerAnalyzer::from_bootstrap(&bootstrap).unwrap(),
            FixtureAnalyzer::from_raw(&bootstrap, &fixtures).unwrap(),
        )
    }

    fn options() -> ReportOptions {
        ReportOptions {
            top: 10,
            max_price: dec!(7.0),
            horizon: 5,
        }
    }

    #[test]
    fn test_dashboard_counts() {
        let html = dashboard(&advisor()).render("now");

        assert!(html.contains("<h3>Players Analyzed</h3><div class=\"value\">3</div>"));
        assert!(html.contains("<h3>Teams Tracked</h3><div class=\"value\">2</div>"));
        assert!(html.contains("<h3>Fixtures</h3><div class=\"value\">2</div>"));
        assert!(html.contains("<h3>Current GW</h3><div class=\"value\">7</div>"));
    }

    #[test]
    fn test_players_page_escapes_names() {
        let html = players_page(&advisor(), &options()).render("now");

        assert!(html.contains("O&#39;Brien &lt;GK&gt;"));
        assert!(!html.contains("<GK>"));
        assert!(html.contains("Best Value Players (up to 7.0)"));
        // Differential: 30 / 4.5 = 6.67 points per price, times form 4.0
        assert!(html.contains("<td>26.68</td>"));
    }

    #[test]
    fn test_fixtures_page_ticker() {
        let html = fixtures_page(&advisor(), &options()).render("now");

        assert!(html.contains("<th>GW7</th><th>GW8</th>"));
        assert!(html.contains("<td>BHA</td><td>FUL(H)[2]</td><td>FUL(A)[4]</td>"));
        assert!(html.contains("Brighton &amp; Hove Albion"));
    }

    #[test]
    fn test_transfers_page_chip_strategy() {
        let html = transfers_page(&advisor(), &options()).render("now");

        assert!(html.contains("<li><strong>Current Gameweek:</strong> 7</li>"));
        assert!(html.contains("<li><strong>Free Hit GWs:</strong> None identified</li>"));
        assert!(html.contains("Neutral - no strong signal for Wildcard"));
        assert!(html.contains("<td>Doubtful</td>"));
    }

    #[test]
    fn test_write_reports_creates_four_files() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("reports");

        let pages = build_all(&advisor(), &options());
        let written = write_reports(&out_dir, &pages, "2026-10-16 09:30:00").unwrap();

        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["index.html", "players.html", "fixtures.html", "transfers.html"]
        );
        for path in &written {
            let html = fs::read_to_string(path).unwrap();
            assert!(html.contains("Generated: 2026-10-16 09:30:00"));
        }
    }
}
