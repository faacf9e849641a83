//! Terminal front end for the fruit jar
//!
//! Usage:
//!     cargo run --bin fruitjar-cli -- [--catalog <path|url>] [--capacity 15] [--group-by Family]
//!
//! Without `--catalog` the bundled demo catalog is used. Logs go to stderr,
//! filtered by RUST_LOG (default `fruitjar=info`).

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Parser;
use fruitjar::aggregate::format_share;
use fruitjar::{
    AddOutcome, BatchAddOutcome, BatchPolicy, ConfirmOutcome, FruitJarApi, FruitJarStore,
    GroupKey, JarConfig, NutrientKind, DEFAULT_JAR_CAPACITY, DEFAULT_LABEL_THRESHOLD_PERCENT,
};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "fruitjar=info";
const BAR_WIDTH: f64 = 40.0;

#[derive(Debug, Parser)]
#[command(name = "fruitjar-cli", about = "Browse fruits and fill a jar")]
struct Args {
    /// Catalog JSON file or http(s) URL
    #[arg(long)]
    catalog: Option<String>,

    #[arg(long, default_value_t = DEFAULT_JAR_CAPACITY as u64)]
    capacity: u64,

    /// Initial grouping for `list`: None, Family, Order or Genus
    #[arg(long, default_value = "None")]
    group_by: GroupKey,

    /// Batch adds evict the oldest fruits instead of stopping at the first overflow
    #[arg(long)]
    evict_silently: bool,

    /// Shares below this percentage are not labelled in `chart`
    #[arg(long, default_value_t = DEFAULT_LABEL_THRESHOLD_PERCENT)]
    label_threshold: f64,
}

#[derive(Debug, PartialEq)]
enum Command {
    List(Option<GroupKey>),
    Add(String),
    AddAll(GroupKey, String),
    Confirm,
    Cancel,
    Jar,
    Chart(NutrientKind),
    Stats(GroupKey, NutrientKind),
    Clear,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let parse_key = |s: &str| s.parse::<GroupKey>().map_err(|e| e.to_string());
    let parse_nutrient = |s: &str| {
        if s.is_empty() {
            Ok(NutrientKind::Calories)
        } else {
            s.parse::<NutrientKind>().map_err(|e| e.to_string())
        }
    };

    match head.to_ascii_lowercase().as_str() {
        "list" | "ls" if rest.is_empty() => Ok(Command::List(None)),
        "list" | "ls" => Ok(Command::List(Some(parse_key(rest)?))),
        "add" if !rest.is_empty() => Ok(Command::Add(rest.to_string())),
        "add-all" => {
            let (key, label) = rest
                .split_once(char::is_whitespace)
                .ok_or("usage: add-all <key> <label>")?;
            Ok(Command::AddAll(parse_key(key)?, label.trim().to_string()))
        }
        "confirm" | "y" | "yes" => Ok(Command::Confirm),
        "cancel" | "n" | "no" => Ok(Command::Cancel),
        "jar" => Ok(Command::Jar),
        "chart" => Ok(Command::Chart(parse_nutrient(rest)?)),
        "stats" => {
            let (key, nutrient) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            Ok(Command::Stats(parse_key(key)?, parse_nutrient(nutrient.trim())?))
        }
        "clear" => Ok(Command::Clear),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        _ => Err(format!("unknown command: {line} (try `help`)")),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  list [None|Family|Order|Genus]   show the catalog, optionally grouped");
    println!("  add <name|id>                    put a fruit in the jar");
    println!("  add-all <key> <label>            put a whole group in the jar");
    println!("  confirm | cancel                 resolve a full-jar prompt");
    println!("  jar                              show the jar");
    println!("  chart [nutrient]                 nutrient shares of the jar (default calories)");
    println!("  stats <key> [nutrient]           per-group totals of the jar");
    println!("  clear                            empty the jar");
    println!("  quit");
}

struct Session {
    store: FruitJarStore,
    group_by: GroupKey,
}

impl Session {
    fn find_fruit(&self, query: &str) -> Option<fruitjar::Fruit> {
        if let Ok(id) = query.parse::<i64>() {
            return self.store.fruit_by_id(id);
        }
        self.store
            .catalog()
            .into_iter()
            .find(|f| f.name.eq_ignore_ascii_case(query))
    }

    fn list(&mut self, key: Option<GroupKey>) {
        if let Some(key) = key {
            self.group_by = key;
        }
        let view = self.store.group_catalog(self.group_by);
        if view.groups.iter().all(|g| g.fruits.is_empty()) {
            println!("No fruits available");
            return;
        }
        for group in view.groups {
            let label = if group.label.is_empty() { "(unclassified)" } else { group.label.as_str() };
            println!("{} ({})", label, group.count);
            for fruit in &group.fruits {
                println!(
                    "  [{:>3}] {:<16} {:>6} calories per 100g",
                    fruit.id, fruit.name, fruit.nutritions.calories
                );
            }
        }
    }

    fn show_jar(&self) {
        let snapshot = self.store.jar_snapshot();
        println!("Your jar: {}", snapshot.summary);
        if snapshot.fruits.is_empty() {
            println!("  No fruits yet. Add some fruits to the jar.");
        }
        for (i, fruit) in snapshot.fruits.iter().enumerate() {
            println!("  {:>2}. {}", i + 1, fruit.name);
        }
        println!("Total: {} calories", snapshot.total_calories);
        if let Some(pending) = snapshot.pending {
            println!("Pending: {} (confirm or cancel)", pending.name);
        }
    }

    fn chart(&self, nutrient: NutrientKind) {
        let aggregate = self.store.jar_aggregate(nutrient);
        if aggregate.total <= 0.0 {
            println!("Nothing to chart for {nutrient}.");
            return;
        }
        println!("Total {}: {}", nutrient, aggregate.total);
        for entry in aggregate.entries {
            let bar_len = entry.share.map(|s| (s / 100.0 * BAR_WIDTH).round() as usize).unwrap_or(0);
            println!(
                "  {:<16} {:>7} {:<40} {}",
                entry.fruit.name,
                entry.value,
                "#".repeat(bar_len),
                entry.share_label.unwrap_or_default()
            );
        }
    }

    fn stats(&self, key: GroupKey, nutrient: NutrientKind) {
        for stat in self.store.jar_group_stats(key, nutrient) {
            let share = stat.share.map(format_share).unwrap_or_else(|| "-".to_string());
            println!("  {:<20} {:>3} fruits {:>8} {} {}", stat.label, stat.count, stat.total, nutrient, share);
        }
    }

    fn report_add(&self, outcome: AddOutcome) {
        match outcome {
            AddOutcome::Added { fruit } => {
                println!("Added {} ({})", fruit.name, self.store.jar_snapshot().summary)
            }
            AddOutcome::ConfirmationRequired { pending } => self.report_pending(&pending.name),
        }
    }

    fn report_pending(&self, name: &str) {
        let capacity = self.store.jar_snapshot().capacity;
        println!(
            "The jar is full ({capacity} fruits). Replace the oldest fruit with {name}? [confirm/cancel]"
        );
    }

    fn report_batch(&self, outcome: BatchAddOutcome) {
        println!("Added {} fruits", outcome.added.len());
        if !outcome.evicted.is_empty() {
            let names: Vec<&str> = outcome.evicted.iter().map(|f| f.name.as_str()).collect();
            println!("Evicted: {}", names.join(", "));
        }
        if let Some(pending) = outcome.pending {
            if !outcome.deferred.is_empty() {
                println!("{} more fruits were not added", outcome.deferred.len());
            }
            self.report_pending(&pending.name);
        }
    }

    /// Returns false when the session should end
    fn run(&mut self, command: Command) -> bool {
        match command {
            Command::List(key) => self.list(key),
            Command::Add(query) => match self.find_fruit(&query) {
                Some(fruit) => {
                    let outcome = self.store.request_add(fruit);
                    self.report_add(outcome);
                }
                None => println!("No fruit named {query}"),
            },
            Command::AddAll(key, label) => {
                let group = self
                    .store
                    .group_catalog(key)
                    .groups
                    .into_iter()
                    .find(|g| g.is_batch_addable && g.label.eq_ignore_ascii_case(&label));
                match group {
                    Some(group) => {
                        let outcome = self.store.add_all(group.fruits);
                        self.report_batch(outcome);
                    }
                    None => println!("No {key} group named {label}"),
                }
            }
            Command::Confirm => match self.store.confirm_pending_add() {
                ConfirmOutcome::NothingPending => println!("Nothing to confirm"),
                ConfirmOutcome::Added { fruit } => println!("Added {}", fruit.name),
                ConfirmOutcome::Displaced { evicted, added } => {
                    println!("Replaced {} with {}", evicted.name, added.name)
                }
            },
            Command::Cancel => match self.store.cancel_pending_add() {
                Some(fruit) => println!("Kept the jar as is ({} not added)", fruit.name),
                None => println!("Nothing to cancel"),
            },
            Command::Jar => self.show_jar(),
            Command::Chart(nutrient) => self.chart(nutrient),
            Command::Stats(key, nutrient) => self.stats(key, nutrient),
            Command::Clear => {
                self.store.clear_jar();
                println!("Jar emptied");
            }
            Command::Help => print_help(),
            Command::Quit => return false,
        }
        true
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let store = FruitJarStore::new(JarConfig {
        capacity: args.capacity,
        label_threshold_percent: args.label_threshold,
        batch_policy: if args.evict_silently {
            BatchPolicy::EvictSilently
        } else {
            BatchPolicy::StopAtOverflow
        },
    })
    .context("Invalid jar configuration")?;

    // A failed load leaves an empty catalog; the session still starts
    let loaded = match &args.catalog {
        Some(location) if location.starts_with("http://") || location.starts_with("https://") => {
            store.load_catalog_from_url(location.clone()).await
        }
        Some(path) => store.load_catalog_from_path(path.clone()).await,
        None => store.load_demo_catalog(),
    };
    if let Err(e) = loaded {
        eprintln!("Error loading fruits: {e}");
    }

    let mut session = Session {
        store,
        group_by: args.group_by,
    };
    session.list(None);
    println!("Type `help` for commands.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Ok(command) => {
                if !session.run(command) {
                    break;
                }
            }
            Err(message) => println!("{message}"),
        }
    }
    Ok(())
}
