//! Ad-hoc FPL queries printed to stdout.
//!
//! Usage:
//!   fpl-check player 328                 # Player details, history and fixtures
//!   fpl-check team arsenal               # Squad sorted by points
//!   fpl-check fixtures liv --n 6         # Fixture difficulty for one team
//!   fpl-check ticker --gameweeks 8       # Fixture ticker for every team
//!   fpl-check replace 328 --budget 8.5   # Replacement suggestions
//!   fpl-check chips                      # Chip strategy

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::info;

use common::analysis::players::{DEFAULT_MAX_OWNERSHIP, DEFAULT_MIN_POINTS};
use common::analysis::transfers::DEFAULT_PREMIUM_PRICE;
use common::tables::Player;
use common::{Config, FplClient, Position, Team, TransferAdvisor};

#[derive(Parser, Debug)]
#[command(name = "fpl-check")]
#[command(about = "Query FPL player, fixture and transfer analysis")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Player details with recent history and upcoming fixtures
    Player { id: u32 },
    /// Squad of a team, by points
    Team { name: String },
    /// Compare players side by side
    Compare {
        #[arg(required = true)]
        ids: Vec<u32>,
    },
    /// Players flagged injured, doubtful, suspended or unavailable
    Injuries,
    /// Biggest price risers and fallers since season start
    Prices,
    /// Fixture difficulty for one or more teams
    Fixtures {
        #[arg(required = true)]
        teams: Vec<String>,
        /// Fixtures to look ahead
        #[arg(long, default_value = "5")]
        n: usize,
    },
    /// All fixtures of a gameweek
    Gameweek { gameweek: u32 },
    /// Fixture ticker for every team
    Ticker {
        #[arg(long, default_value = "8")]
        gameweeks: usize,
    },
    /// Double and blank gameweeks
    Doubles,
    /// Live points for a gameweek
    Live {
        gameweek: u32,
        #[arg(long, default_value = "10")]
        top: usize,
    },
    /// Replacements for a player within a budget
    Replace {
        id: u32,
        #[arg(long)]
        budget: Decimal,
        /// Allow any position
        #[arg(long)]
        any_position: bool,
    },
    /// Best transfer targets up to a price
    Budget {
        #[arg(value_parser = parse_position)]
        position: Position,
        max_price: Decimal,
        #[arg(long, default_value = "5")]
        n: usize,
    },
    /// In-form players from a minimum price
    Premium {
        #[arg(value_parser = parse_position)]
        position: Position,
        #[arg(long, default_value_t = DEFAULT_PREMIUM_PRICE)]
        min_price: Decimal,
        #[arg(long, default_value = "5")]
        n: usize,
    },
    /// Chip strategy, differentials and captaincy
    Chips,
    /// Response cache contents
    Cache,
}

fn parse_position(value: &str) -> Result<Position, String> {
    Position::from_label(value).ok_or_else(|| format!("unknown position '{}' (GKP, DEF, MID, FWD)", value))
}

fn header(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{}", title);
    println!("{}", "=".repeat(60));
}

fn print_players(players: &[Player]) {
    println!(
        "  {:<18} {:<4} {:<4} {:>6} {:>5} {:>6} {:>8}",
        "Player", "Team", "Pos", "Price", "Form", "Points", "Owned %"
    );
    for p in players {
        println!(
            "  {:<18} {:<4} {:<4} {:>6.1} {:>5} {:>6} {:>8}",
            p.web_name, p.team_short, p.position, p.price, p.form, p.total_points, p.ownership
        );
    }
    if players.is_empty() {
        println!("  (none)");
    }
}

fn resolve_team<'a>(advisor: &'a TransferAdvisor, query: &str) -> Result<&'a Team> {
    match advisor.fixtures().find_team(query) {
        Some(team) => Ok(team),
        None => bail!("No team matches '{}'", query),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fpl_check=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    let client = FplClient::new(&config).context("Failed to create FPL client")?;
    let advisor = TransferAdvisor::load(&client)
        .await
        .context("Failed to load FPL data")?;
    info!("Data loaded");

    match cli.command {
        Command::Player { id } => {
            let details = advisor.players().player_details(&client, id).await?;
            let p = &details.player;
            header(&format!("{} ({})", p.full_name(), p.web_name));
            println!("  Team:          {}", p.team_name);
            println!("  Position:      {}", p.position);
            println!("  Price:         {:.1}", p.price);
            println!("  Status:        {}", p.status.label());
            if !p.news.is_empty() {
                println!("  News:          {}", p.news);
            }
            println!("  Points:        {} ({} per game)", p.total_points, p.points_per_game);
            println!("  Form:          {}", p.form);
            println!("  Ownership:     {}%", p.ownership);
            match p.points_per_price {
                Some(ppp) => println!("  Pts/Price:     {}", ppp),
                None => println!("  Pts/Price:     -"),
            }
            println!(
                "  Season:        {} min, {} G, {} A, {} CS, {} bonus",
                p.minutes, p.goals_scored, p.assists, p.clean_sheets, p.bonus
            );

            match details.summary {
                Some(summary) => {
                    let short = |team_id: u32| {
                        advisor
                            .players()
                            .teams()
                            .iter()
                            .find(|t| t.id == team_id)
                            .map_or("?", |t| t.short_name.as_str())
                    };
                    println!("\n  Recent matches:");
                    for h in summary.history.iter().rev().take(5) {
                        println!(
                            "    GW{:<3} {}({}) {:>3} pts {:>3} min",
                            h.round,
                            short(h.opponent_team),
                            if h.was_home { "H" } else { "A" },
                            h.total_points,
                            h.minutes
                        );
                    }
                    println!("\n  Upcoming:");
                    for f in summary.fixtures.iter().take(5) {
                        let gw = f.event.map_or_else(|| "TBC".to_string(), |gw| gw.to_string());
                        let opponent = if f.is_home { f.team_a } else { f.team_h };
                        println!(
                            "    GW{:<3} {}({}) [{}]",
                            gw,
                            short(opponent),
                            if f.is_home { "H" } else { "A" },
                            f.difficulty
                        );
                    }
                }
                None => println!("\n  (history unavailable)"),
            }
        }

        Command::Team { name } => {
            let team = resolve_team(&advisor, &name)?;
            header(&format!("{} squad", team.name));
            print_players(&advisor.players().by_team_id(team.id));
        }

        Command::Compare { ids } => {
            let players = advisor.players().compare(&ids);
            header("Player comparison");
            println!(
                "  {:<18} {:<4} {:>6} {:>6} {:>5} {:>5} {:>6} {:>3} {:>3} {:>3} {:>5}",
                "Player", "Team", "Price", "Points", "PPG", "Form", "Min", "G", "A", "CS", "Bonus"
            );
            for p in &players {
                println!(
                    "  {:<18} {:<4} {:>6.1} {:>6} {:>5} {:>5} {:>6} {:>3} {:>3} {:>3} {:>5}",
                    p.web_name,
                    p.team_short,
                    p.price,
                    p.total_points,
                    p.points_per_game,
                    p.form,
                    p.minutes,
                    p.goals_scored,
                    p.assists,
                    p.clean_sheets,
                    p.bonus
                );
            }
            let missing: Vec<u32> = ids
                .iter()
                .copied()
                .filter(|id| !players.iter().any(|p| p.id == *id))
                .collect();
            if !missing.is_empty() {
                println!("  Unknown ids: {:?}", missing);
            }
        }

        Command::Injuries => {
            header("Injury and availability list");
            for p in advisor.players().injury_list() {
                println!(
                    "  {:<18} {:<4} {:<11} {:>6}%  {}",
                    p.web_name,
                    p.team_short,
                    p.status.label(),
                    p.ownership,
                    p.news
                );
            }
        }

        Command::Prices => {
            let changes = advisor.players().price_changes();
            header("Price risers");
            for p in &changes.risers {
                println!("  {:<18} {:<4} {:>6.1} (+{:.1})", p.web_name, p.team_short, p.price, p.price_change);
            }
            header("Price fallers");
            for p in &changes.fallers {
                println!("  {:<18} {:<4} {:>6.1} ({:.1})", p.web_name, p.team_short, p.price, p.price_change);
            }
        }

        Command::Fixtures { teams, n } => {
            let mut ids = Vec::with_capacity(teams.len());
            for query in &teams {
                ids.push(resolve_team(&advisor, query)?.id);
            }
            header(&format!("Fixture difficulty (next {})", n));
            for outlook in advisor.fixtures().compare(&ids, n) {
                if !outlook.has_data() {
                    println!("  {:<4} no upcoming fixtures", outlook.team_short);
                    continue;
                }
                println!(
                    "  {:<4} avg {:.2} (total {})",
                    outlook.team_short, outlook.avg_difficulty, outlook.total_difficulty
                );
                for f in &outlook.fixtures {
                    let gw = f.gameweek.map_or_else(|| "TBC".to_string(), |gw| gw.to_string());
                    println!("       GW{:<3} {}", gw, f.ticker_label());
                }
            }
        }

        Command::Gameweek { gameweek } => {
            header(&format!("Gameweek {} fixtures", gameweek));
            let fixtures = advisor.fixtures().gameweek_fixtures(gameweek);
            if fixtures.is_empty() {
                println!("  (no fixtures)");
            }
            for f in fixtures {
                let result = f.score_label().unwrap_or_else(|| "v".to_string());
                println!(
                    "  {:>22} [{}] {:^7} [{}] {:<22}",
                    f.home_name, f.home_difficulty, result, f.away_difficulty, f.away_name
                );
            }
        }

        Command::Ticker { gameweeks } => {
            let ticker = advisor.fixtures().ticker(gameweeks);
            header("Fixture ticker");
            print!("  {:<5}", "Team");
            for gw in &ticker.gameweeks {
                print!(" {:<14}", format!("GW{}", gw));
            }
            println!();
            for row in &ticker.rows {
                print!("  {:<5}", row.team_short);
                for cell in &row.cells {
                    let label = if cell.is_empty() {
                        "-".to_string()
                    } else {
                        cell.iter().map(|f| f.ticker_label()).collect::<Vec<_>>().join("+")
                    };
                    print!(" {:<14}", label);
                }
                println!();
            }
        }

        Command::Doubles => {
            let fixtures = advisor.fixtures();
            header("Double gameweeks");
            let doubles = fixtures.double_gameweeks();
            if doubles.is_empty() {
                println!("  None found");
            }
            for d in doubles {
                println!("  GW{:<3} {:<4} {} fixtures", d.gameweek, d.team_short, d.fixtures);
            }
            header("Blank gameweeks");
            let blanks = fixtures.blank_gameweeks();
            if blanks.is_empty() {
                println!("  None found");
            }
            for b in blanks {
                println!("  GW{:<3} {}", b.gameweek, b.team_short);
            }
        }

        Command::Live { gameweek, top } => {
            let live = client
                .get_live_gameweek(gameweek)
                .await
                .with_context(|| format!("Failed to fetch live data for gameweek {}", gameweek))?;
            let mut elements = live.elements;
            elements.sort_by(|a, b| {
                b.stats
                    .total_points
                    .cmp(&a.stats.total_points)
                    .then(a.id.cmp(&b.id))
            });
            header(&format!("Gameweek {} live points", gameweek));
            for e in elements.iter().take(top) {
                let name = advisor
                    .players()
                    .find(e.id)
                    .map_or_else(|| format!("#{}", e.id), |p| p.web_name.clone());
                println!(
                    "  {:<18} {:>3} pts {:>3} min {} G {} A {} bonus",
                    name, e.stats.total_points, e.stats.minutes, e.stats.goals_scored, e.stats.assists, e.stats.bonus
                );
            }
        }

        Command::Replace { id, budget, any_position } => {
            let out = advisor.players().get(id)?;
            header(&format!("Replacements for {} (budget {:.1})", out.web_name, budget));
            let replacements = advisor.suggest_replacements(id, budget, !any_position)?;
            if replacements.is_empty() {
                println!("  (none within budget)");
            }
            for r in replacements {
                let p = &r.target.player;
                println!(
                    "  {:<18} {:<4} {:<4} {:>6.1} ({:+.1})  form {} ({:+.2})  score {:.2}",
                    p.web_name, p.team_short, p.position, p.price, r.price_diff, p.form, r.form_diff, r.target.score
                );
            }
        }

        Command::Budget { position, max_price, n } => {
            header(&format!("Budget {} options up to {:.1}", position, max_price));
            for t in advisor.budget_options(position, max_price, n) {
                let p = &t.player;
                println!(
                    "  {:<18} {:<4} {:>6.1}  form {:>4}  score {:.2}",
                    p.web_name, p.team_short, p.price, p.form, t.score
                );
            }
        }

        Command::Premium { position, min_price, n } => {
            header(&format!("Premium {} options from {:.1}", position, min_price));
            print_players(&advisor.premium_options(position, min_price, n));
        }

        Command::Chips => {
            let chips = advisor.chip_strategy();
            let list = |gws: &[u32]| {
                if gws.is_empty() {
                    "None identified".to_string()
                } else {
                    gws.iter().map(|g| g.to_string()).collect::<Vec<_>>().join(", ")
                }
            };
            header("Chip strategy");
            println!(
                "  Current gameweek:   {}",
                chips.current_gameweek.map_or_else(|| "-".to_string(), |g| g.to_string())
            );
            println!("  Wildcard:           {}", chips.wildcard.message());
            if let Some(avg) = chips.league_average_difficulty {
                println!("  League avg diff:    {:.2}", avg);
            }
            println!("  Best fixture teams: {}", chips.best_fixture_teams.join(", "));
            println!("  Bench Boost GWs:    {}", list(&chips.bench_boost_gameweeks));
            println!("  Triple Captain GWs: {}", list(&chips.triple_captain_gameweeks));
            println!("  Free Hit GWs:       {}", list(&chips.free_hit_gameweeks));

            header("Captain picks");
            for c in advisor.captaincy_picks(5) {
                println!(
                    "  {:<18} vs {:<7} [{}] score {:.2}",
                    c.player.web_name, c.opponent, c.difficulty, c.score
                );
            }

            header("Differentials");
            let differentials =
                advisor
                    .players()
                    .differentials(5, DEFAULT_MAX_OWNERSHIP, DEFAULT_MIN_POINTS);
            for d in differentials {
                println!(
                    "  {:<18} {:<4} owned {:>5}%  score {:.2}",
                    d.player.web_name, d.player.team_short, d.player.ownership, d.score
                );
            }
        }

        Command::Cache => {
            let info = client.cache_info().await;
            header("Response cache");
            println!("  Entries: {}", info.cached_endpoints);
            println!("  TTL:     {}s", info.cache_duration.as_secs());
            for endpoint in &info.endpoints {
                println!("    {}", endpoint);
            }
        }
    }

    Ok(())
}
