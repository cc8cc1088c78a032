use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::DateTime;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use party_tracker::analysis::summarize_matches;
use party_tracker::config::AppConfig;
use party_tracker::dashboard::{DashboardLoader, PartyReport, PlayerOverview};
use party_tracker::gateway::RequestGateway;
use party_tracker::heroes::HeroCatalog;
use party_tracker::models::{AccountId, MatchDetail, MatchId, PartyGroup, Side};
use party_tracker::parse_duration;

#[derive(Parser)]
#[command(name = "party-tracker")]
#[command(about = "Party and match statistics from the public Dota 2 stats API")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./party-tracker.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Print results as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Override the upstream base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Override the minimum request spacing (e.g. "250ms", "1s")
    #[arg(long)]
    min_interval: Option<String>,

    /// Override the throttle penalty (e.g. "5s")
    #[arg(long)]
    throttle_penalty: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Profile, win/loss and recent-match totals
    Player { account_id: AccountId },

    /// Party breakdown of recent matches
    Parties {
        account_id: AccountId,

        /// Show the matches of each party
        #[arg(long)]
        matches: bool,
    },

    /// Full detail of one match
    Match { match_id: MatchId },

    /// Players the subject has played with
    Peers {
        account_id: AccountId,

        /// Max rows to print
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Per-hero record of a player
    PlayerHeroes {
        account_id: AccountId,

        /// Max rows to print
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Global hero list
    Heroes,

    /// Recent professional matches
    ProMatches {
        /// Max rows to print
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Aggregate counters of a player
    Counts { account_id: AccountId },

    /// Ask the upstream to re-parse a match
    Parse { match_id: MatchId },
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(url) = &cli.base_url {
        config.api.base_url = url.clone();
    }
    if let Some(raw) = &cli.min_interval {
        let Some(interval) = parse_duration(raw) else {
            bail!("Invalid --min-interval: {}", raw);
        };
        config.api.min_request_interval_ms = interval.as_millis() as u64;
    }
    if let Some(raw) = &cli.throttle_penalty {
        let Some(penalty) = parse_duration(raw) else {
            bail!("Invalid --throttle-penalty: {}", raw);
        };
        config.api.throttle_penalty_ms = penalty.as_millis() as u64;
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::debug!("Starting party-tracker v{}", env!("CARGO_PKG_VERSION"));

    let gateway = RequestGateway::new(config.gateway_config())?;
    let loader = DashboardLoader::new(gateway.clone());

    match cli.command {
        Commands::Player { account_id } => {
            let overview = loader.player_overview(account_id).await;
            if cli.json {
                print_json(&overview)?;
            } else {
                print_overview(&overview);
            }
        }
        Commands::Parties {
            account_id,
            matches,
        } => {
            let report = loader.party_report(account_id).await;
            let heroes = loader.heroes().catalog(&gateway).await;
            if cli.json {
                print_json(&report)?;
            } else {
                print_parties(&report, &heroes, matches);
            }
        }
        Commands::Match { match_id } => match gateway.match_detail(match_id).await {
            Some(detail) if cli.json => print_json(&detail)?,
            Some(detail) => {
                let heroes = loader.heroes().catalog(&gateway).await;
                print_match(&detail, &heroes);
            }
            None => println!("Match {} not found", match_id),
        },
        Commands::Peers { account_id, limit } => {
            let peers = gateway.player_peers(account_id).await;
            if cli.json {
                print_json(&peers)?;
            } else if peers.is_empty() {
                println!("No data");
            } else {
                println!("{:<12} {:<24} {:>6} {:>8}", "ACCOUNT", "NAME", "WITH", "WR");
                for peer in peers.iter().take(limit) {
                    println!(
                        "{:<12} {:<24} {:>6} {:>7.1}%",
                        peer.account_id,
                        truncate(&peer.personaname, 24),
                        peer.with_games,
                        peer.with_win_rate() * 100.0
                    );
                }
            }
        }
        Commands::PlayerHeroes { account_id, limit } => {
            let stats = gateway.player_heroes(account_id).await;
            if cli.json {
                print_json(&stats)?;
            } else if stats.is_empty() {
                println!("No data");
            } else {
                let heroes = loader.heroes().catalog(&gateway).await;
                println!("{:<24} {:>6} {:>8}", "HERO", "GAMES", "WR");
                for s in stats.iter().filter(|s| s.games > 0).take(limit) {
                    println!(
                        "{:<24} {:>6} {:>7.1}%",
                        heroes.hero_name(s.hero_id),
                        s.games,
                        s.win_rate() * 100.0
                    );
                }
            }
        }
        Commands::Heroes => {
            let heroes = gateway.global_heroes().await;
            if cli.json {
                print_json(&heroes)?;
            } else if heroes.is_empty() {
                println!("No data");
            } else {
                for h in &heroes {
                    println!(
                        "{:>4} {:<24} {:<4} {:<7} {}",
                        h.hero.id,
                        h.hero.localized_name,
                        h.hero.primary_attr,
                        h.hero.attack_type,
                        h.hero.roles.join(", ")
                    );
                }
            }
        }
        Commands::ProMatches { limit } => {
            let matches = gateway.pro_matches().await;
            if cli.json {
                print_json(&matches)?;
            } else if matches.is_empty() {
                println!("No data");
            } else {
                for m in matches.iter().take(limit) {
                    println!(
                        "{:<12} {:>3}-{:<3} {} vs {} ({}) winner: {}",
                        m.match_id,
                        m.radiant_score,
                        m.dire_score,
                        m.radiant_name,
                        m.dire_name,
                        m.league_name,
                        m.winner_name()
                    );
                }
            }
        }
        Commands::Counts { account_id } => match gateway.player_counts(account_id).await {
            Some(counts) => print_json(&counts)?,
            None => println!("No data"),
        },
        Commands::Parse { match_id } => {
            gateway.request_match_parse(match_id).await?;
            println!("Parse requested for match {}", match_id);
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

fn print_overview(overview: &PlayerOverview) {
    let Some(info) = overview.profile.as_ref().and_then(|p| p.profile.as_ref()) else {
        println!("Subject not found: {}", overview.account_id);
        return;
    };

    println!("\n=== {} ===", info.personaname.as_deref().unwrap_or("Unknown"));
    if let Some(country) = &info.loccountrycode {
        println!("Location:        {}", country);
    }
    if let Some(url) = &info.profileurl {
        println!("Profile:         {}", url);
    }

    let wl = overview.win_loss.unwrap_or_default();
    println!("Wins:            {}", wl.win);
    println!("Losses:          {}", wl.lose);
    println!("Win rate:        {:.1}%", wl.win_rate() * 100.0);

    if overview.matches.is_empty() {
        println!("\nNo recent matches");
        return;
    }

    let totals = summarize_matches(&overview.matches);
    println!("Recent matches:  {}", totals.matches);
    println!("Average KDA:     {:.2}", totals.average_kda);
    println!("Average length:  {:.0} min", totals.average_duration_minutes);
}

fn party_label(party: &PartyGroup) -> String {
    if party.is_solo() {
        "[solo]".to_string()
    } else {
        party
            .teammates
            .iter()
            .map(|t| t.personaname.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn print_parties(report: &PartyReport, heroes: &HeroCatalog, show_matches: bool) {
    if report.parties.is_empty() {
        println!("No data");
        return;
    }

    println!(
        "\n=== Parties ({} matches, {} skipped, {:?}) ===",
        report.analyzed.len(),
        report.skipped,
        report.duration
    );
    println!("{:>7} {:>4} {:>4} {:>7}  MEMBERS", "MATCHES", "W", "L", "WR");
    for party in &report.parties {
        println!(
            "{:>7} {:>4} {:>4} {:>6.0}%  {}",
            party.matches.len(),
            party.wins,
            party.losses,
            party.win_rate() * 100.0,
            party_label(party)
        );
        if show_matches {
            for m in &party.matches {
                println!(
                    "        {:<12} {:<5} {:<20} {}/{}/{}",
                    m.summary.match_id,
                    m.result,
                    m.played_hero_name,
                    m.summary.kills,
                    m.summary.deaths,
                    m.summary.assists
                );
            }
        }
    }

    if let Some(best) = report.best_party() {
        println!(
            "\nBest party: {:.0}% WR ({}W - {}L over {} matches)",
            best.win_rate() * 100.0,
            best.wins,
            best.losses,
            best.matches.len()
        );
        for mate in &best.teammates {
            println!(
                "  {} (mostly {})",
                mate.personaname,
                heroes.hero_name(mate.most_played_hero_id)
            );
        }
    }
}

fn print_match(detail: &MatchDetail, heroes: &HeroCatalog) {
    let started = DateTime::from_timestamp(detail.start_time, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_default();

    println!("\n=== Match {} ===", detail.match_id);
    println!("Started:   {}", started);
    println!(
        "Duration:  {}:{:02}",
        detail.duration / 60,
        detail.duration % 60
    );
    println!(
        "Score:     Radiant {} - {} Dire ({} victory)",
        detail.radiant_score,
        detail.dire_score,
        detail.winner()
    );

    for side in [Side::Radiant, Side::Dire] {
        println!("\n{}", side);
        for p in detail.players_on(side) {
            let name = match (&p.personaname, p.account_id) {
                (Some(name), _) => name.clone(),
                (None, Some(id)) => format!("Unknown ({})", id),
                (None, None) => "Anonymous".to_string(),
            };
            println!(
                "  {:<20} {:<20} {:>2}/{:>2}/{:>2}  {:>4} GPM {:>4} XPM {:>6} DMG",
                truncate(&name, 20),
                heroes.hero_name(p.hero_id),
                p.kills,
                p.deaths,
                p.assists,
                p.gold_per_min,
                p.xp_per_min,
                p.hero_damage
            );
        }
    }
}
