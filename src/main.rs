use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use moonlight_tools::{
    app::{self, AppState},
    domain::{
        ranking::DEFAULT_DISPLAY_LIMIT, AuctionQuote, CraftRequest, CraftingReport, Inventory,
        Material, Mission, MissionBoard, MissionSort, PriceTable, DEFAULT_PARTY_SIZE,
        PARTY_SIZES,
    },
    infra::recent_store::{load_recent, JsonFileStore, MemoryStore, RecentToolsStore},
    util::{
        format::{format_gold, format_relative, now_millis},
        input::{parse_amount, parse_optional_amount, parse_quantity},
        version::{banner, version_label},
    },
};

#[derive(Parser)]
#[command(name = "moonlight-tools")]
#[command(about = "Lost Ark calculators and the page server that hosts them")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the calculator pages and JSON API
    Serve {
        #[arg(long, env = "HOST", default_value = "0.0.0.0")]
        host: IpAddr,

        #[arg(short, long, env = "PORT", default_value_t = 3000)]
        port: u16,

        /// Directory for the recently-used tools file
        #[arg(long, env = "MOONLIGHT_DATA_DIR")]
        data_dir: Option<PathBuf>,

        /// Keep the recently-used list in memory only
        #[arg(long)]
        no_persist: bool,
    },

    /// Find the cheapest way to source materials for Abidos timber crafts
    Craft {
        /// Number of crafts (1-40, default 30)
        #[arg(short, long, default_value = "30")]
        count: String,

        /// Great-success bonus in percent
        #[arg(short, long, default_value = "0")]
        bonus: String,

        /// Price per 100 timber
        #[arg(long, default_value = "")]
        price_wood: String,
        /// Price per 100 tender timber
        #[arg(long, default_value = "")]
        price_soft: String,
        /// Price per 100 sturdy timber
        #[arg(long, default_value = "")]
        price_sturdy: String,
        /// Price per 100 Abidos timber
        #[arg(long, default_value = "")]
        price_abidos: String,

        #[arg(long, default_value = "")]
        held_wood: String,
        #[arg(long, default_value = "")]
        held_soft: String,
        #[arg(long, default_value = "")]
        held_sturdy: String,
        #[arg(long, default_value = "")]
        held_abidos: String,
        #[arg(long, default_value = "")]
        held_dust: String,

        /// Show every combination instead of the top few
        #[arg(short, long)]
        all: bool,

        /// Print each combination's purchase steps
        #[arg(short, long)]
        verbose: bool,
    },

    /// Break-even and suggested bids for a party auction
    Auction {
        /// Market sale price
        price: String,

        /// Party size (4, 8 or 16 in game)
        #[arg(short, long, default_value_t = DEFAULT_PARTY_SIZE)]
        party: u32,

        /// Bid to compare against break-even
        #[arg(short, long)]
        bid: Option<String>,
    },

    /// Rank dispatch missions by efficiency
    Dispatch {
        /// Mission as `reward,activity,time`; repeat for each mission
        #[arg(short, long = "mission", required = true)]
        missions: Vec<String>,

        #[arg(short, long, value_enum, default_value_t = SortKey::Time)]
        sort: SortKey,
    },

    /// List recently used tools
    Recent {
        #[arg(long, env = "MOONLIGHT_DATA_DIR")]
        data_dir: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortKey {
    Time,
    Activity,
    Overall,
}

impl From<SortKey> for MissionSort {
    fn from(key: SortKey) -> Self {
        match key {
            SortKey::Time => MissionSort::RewardPerTime,
            SortKey::Activity => MissionSort::RewardPerActivity,
            SortKey::Overall => MissionSort::Overall,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            data_dir,
            no_persist,
        } => {
            let store = open_store(data_dir, no_persist)?;
            let state = AppState::new(store);
            let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;
            tracing::info!(target: "server", "{}", banner());
            runtime.block_on(app::serve(SocketAddr::new(host, port), state))?;
        }

        Commands::Craft {
            count,
            bonus,
            price_wood,
            price_soft,
            price_sturdy,
            price_abidos,
            held_wood,
            held_soft,
            held_sturdy,
            held_abidos,
            held_dust,
            all,
            verbose,
        } => {
            let count = u32::try_from(parse_quantity(&count)).unwrap_or(u32::MAX);
            let request = CraftRequest::new(count, parse_amount(&bonus));
            let prices = PriceTable {
                wood: parse_amount(&price_wood),
                soft_wood: parse_amount(&price_soft),
                sturdy_wood: parse_amount(&price_sturdy),
                abidos_wood: parse_amount(&price_abidos),
            };
            let inventory = Inventory {
                wood: parse_quantity(&held_wood),
                soft_wood: parse_quantity(&held_soft),
                sturdy_wood: parse_quantity(&held_sturdy),
                abidos_wood: parse_quantity(&held_abidos),
                dust: parse_quantity(&held_dust),
            };
            print_crafting(&CraftingReport::build(request, inventory, &prices), all, verbose);
        }

        Commands::Auction { price, party, bid } => {
            let Some(quote) = AuctionQuote::new(parse_amount(&price), party) else {
                println!("Enter a market price above zero.");
                return Ok(());
            };
            if !PARTY_SIZES.contains(&party) {
                println!("Note: {party} is not a standard party size (4, 8 or 16).");
            }
            print!("{quote}");

            if let Some(analysis) = bid.as_deref().and_then(|b| quote.analyze_bid(parse_amount(b))) {
                println!();
                println!("Bid {}: {}", format_gold(analysis.bid), analysis.outcome.label());
                println!("  Your share:   {}", format_gold(analysis.my_share));
                println!("  Others' share: {}", format_gold(analysis.others_share));
                println!("  Margin to break-even: {}", format_gold(analysis.difference));
            }
        }

        Commands::Dispatch { missions, sort } => {
            let board = MissionBoard::from_missions(
                missions.iter().map(String::as_str).map(parse_mission).collect(),
            );
            print_dispatch(&board, sort.into());
        }

        Commands::Recent { data_dir } => {
            let store = open_store(data_dir, false)?;
            let now = now_millis();
            let recent = load_recent(store.as_ref(), now);
            if recent.is_empty() {
                println!("No tools used in the last 7 days.");
            }
            for entry in recent.entries() {
                println!(
                    "{} {:<24} {:<18} {}",
                    entry.icon,
                    entry.name,
                    entry.url,
                    format_relative(entry.last_visited, now)
                );
            }
        }
    }

    Ok(())
}

fn open_store(data_dir: Option<PathBuf>, no_persist: bool) -> Result<Arc<dyn RecentToolsStore>> {
    if no_persist {
        return Ok(Arc::new(MemoryStore::default()));
    }
    let store = match data_dir {
        Some(dir) => JsonFileStore::in_dir(&dir),
        None => JsonFileStore::in_default_dir().context("no data directory; pass --data-dir")?,
    };
    tracing::debug!(target: "recent_tools", path = %store.path().display(), "using file store");
    Ok(Arc::new(store))
}

/// `reward,activity,time`; missing or empty fields leave the mission incomplete.
fn parse_mission(raw: &str) -> Mission {
    let mut fields = raw.split(',').map(str::trim).map(parse_optional_amount);
    Mission {
        reward: fields.next().flatten(),
        activity: fields.next().flatten(),
        time: fields.next().flatten(),
        ..Mission::blank()
    }
}

fn print_crafting(report: &CraftingReport, all: bool, verbose: bool) {
    let needed = &report.total_needed;
    println!(
        "{} crafts (bonus {}%) need: {} {} / {} {} / {} {}",
        report.request.count,
        report.request.bonus_rate,
        Material::Wood,
        needed.wood,
        Material::SoftWood,
        needed.soft_wood,
        Material::AbidosWood,
        needed.abidos_wood,
    );
    println!(
        "Cheapest powder source: {} ({} per 100 powder)",
        report.best_dust_source.origin.material(),
        format_gold(report.best_dust_source.cost_per_100_dust)
    );
    println!();

    if !report.has_valid_method() {
        println!("No valid sourcing method for these inputs.");
        return;
    }

    let shown = if all {
        &report.combinations[..]
    } else {
        report.top(DEFAULT_DISPLAY_LIMIT)
    };

    println!("{:<3} {:<44} {:>12} {:>10} {:>8}", "", "Method", "Cost", "Per item", "Units");
    println!("{}", "-".repeat(81));
    for ranked in shown {
        let result = &ranked.result;
        println!(
            "{:<3} {:<44} {:>12} {:>10} {:>8}",
            if ranked.is_cheapest { "★" } else { "" },
            result.title,
            format_gold(result.cost),
            format_gold(result.cost_per_item),
            ranked.total_purchased(),
        );
        if verbose {
            for step in &result.steps {
                println!("      {step}");
            }
        }
        for warning in &result.warnings {
            println!("      ! {warning}");
        }
    }

    if !all && report.combinations.len() > shown.len() {
        println!("… {} more (use --all)", report.combinations.len() - shown.len());
    }
}

fn print_dispatch(board: &MissionBoard, sort: MissionSort) {
    println!(
        "{} of {} missions complete, sorted by {}",
        board.complete_count(),
        board.missions().len(),
        sort.label()
    );
    println!(
        "{:>8} {:>8} {:>8} {:>10} {:>12} {:>8}",
        "Reward", "Activity", "Time", "Per time", "Per activity", "Overall"
    );
    let show = |v: Option<f64>| v.map(format_gold).unwrap_or_else(|| "-".to_string());
    for ranked in board.ranked(sort) {
        let mission = &ranked.mission;
        match ranked.metrics {
            Some(m) => println!(
                "{:>8} {:>8} {:>8} {:>7} #{} {:>9} #{} {:>5.1} #{}",
                show(mission.reward),
                show(mission.activity),
                show(mission.time),
                format_gold(m.reward_per_time),
                m.rank_by_time,
                format_gold(m.reward_per_activity),
                m.rank_by_activity,
                m.overall_score,
                m.rank_by_overall,
            ),
            None => println!(
                "{:>8} {:>8} {:>8}   (incomplete)",
                show(mission.reward),
                show(mission.activity),
                show(mission.time)
            ),
        }
    }
    tracing::debug!(target: "dispatch", version = %version_label(), "ranked missions");
}
