use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

use votenight::banner::{BannerInfo, print_banner, print_goodbye};
use votenight::catalog::Catalog;
use votenight::catalog::omdb::{API_KEY_ENV, OmdbCatalog};
use votenight::chat::console::Console;
use votenight::config::{self, Config, KEY_BOT_NAME, KEY_CLEAR_POLICY, KEY_OMDB_API_KEY, KEY_PREFIX};
use votenight::consts::{DEFAULT_BOT_NAME, DEFAULT_PREFIX, DEFAULT_USER, default_db_path};
use votenight::engine::{ClearPolicy, VoteEngine};
use votenight::logging;
use votenight::router::Router;
use votenight::store::SqliteStore;

#[derive(Parser)]
#[command(name = "votenight", version, about = "Pick tonight's movie by vote.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// SQLite database path (use :memory: for a throwaway session)
    #[arg(short, long)]
    db: Option<String>,

    /// Single-character command prefix
    #[arg(short, long)]
    prefix: Option<char>,

    /// Name the bot answers to in @mentions
    #[arg(long)]
    bot_name: Option<String>,

    /// Who lines without an "@name:" prefix are sent as
    #[arg(short, long, default_value = DEFAULT_USER)]
    user: String,

    /// Members allowed to run privileged commands (repeatable)
    #[arg(short, long = "admin")]
    admins: Vec<String>,

    /// Which movies clear removes: all, or voted-only
    #[arg(long)]
    clear_policy: Option<ClearPolicy>,

    /// OMDb API key (overrides the stored key and OMDB_API_KEY)
    #[arg(long)]
    omdb_key: Option<String>,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Handle a single message and exit (non-interactive)
    #[arg(short, long)]
    run: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Store the OMDb API key in the database
    SetKey {
        /// The API key
        key: String,
    },
    /// Remove the stored OMDb API key
    ForgetKey,
    /// Show or edit persisted settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print one setting, or all of them
    Get { key: Option<String> },
    /// Store a setting (prefix, bot_name, clear_policy)
    Set { key: String, value: String },
    /// Remove a stored setting
    Unset { key: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    let db_path = resolve_db_path(cli.db.as_deref())?;
    let settings = Config::open(&db_path)?;

    // Handle subcommands
    if let Some(command) = &cli.command {
        return handle_command(command, &settings);
    }

    let prefix = match cli.prefix {
        Some(p) => {
            config::validate(KEY_PREFIX, &p.to_string())?;
            p
        }
        None => settings.get_parsed(KEY_PREFIX)?.unwrap_or(DEFAULT_PREFIX),
    };
    let bot_name = match cli.bot_name {
        Some(name) => name,
        None => settings
            .get(KEY_BOT_NAME)?
            .unwrap_or_else(|| DEFAULT_BOT_NAME.to_string()),
    };
    let clear_policy = match cli.clear_policy {
        Some(policy) => policy,
        None => settings.get_parsed(KEY_CLEAR_POLICY)?.unwrap_or_default(),
    };

    let api_key = match cli.omdb_key {
        Some(key) => key,
        None => match settings.api_key(API_KEY_ENV)? {
            Some(key) => key,
            None => bail!(
                "no OMDb API key: pass --omdb-key, run `votenight set-key <KEY>`, or set {API_KEY_ENV}"
            ),
        },
    };
    let catalog: Arc<dyn Catalog> = Arc::new(OmdbCatalog::new(api_key)?);

    let store = Arc::new(
        SqliteStore::open(&db_path)
            .with_context(|| format!("failed to open vote database at {db_path}"))?,
    );
    let engine = Arc::new(VoteEngine::new(store).with_clear_policy(clear_policy));
    let router = Router::new(engine, catalog.clone())
        .with_prefix(prefix)
        .with_bot_name(bot_name);
    let console = Console::new(cli.user.clone(), cli.admins.clone());

    info!(db = %db_path, %prefix, bot = router.bot_name(), "bot ready");

    // Single message mode
    if let Some(line) = cli.run {
        let message = console.message(&line);
        router.handle(&message, &console).await?;
        return Ok(());
    }

    let memory_label = if db_path == ":memory:" {
        "ephemeral"
    } else {
        db_path.as_str()
    };
    let policy_label = clear_policy.to_string();
    print_banner(&BannerInfo {
        database: memory_label,
        catalog: catalog.name(),
        prefix,
        bot_name: router.bot_name(),
        clear_policy: &policy_label,
        user: &cli.user,
    });

    // REPL — async stdin so Ctrl+C is caught at the prompt too
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("\n> ");
        io::stdout().flush()?;

        let line = tokio::select! {
            result = lines.next_line() => {
                match result {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        // Ctrl+D (EOF)
                        println!();
                        break;
                    }
                    Err(e) => {
                        eprintln!("input error: {}", e);
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        };

        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text == "quit" || text == "exit" {
            break;
        }

        let message = console.message(text);
        if let Err(e) = router.handle(&message, &console).await {
            error!(error = %e, "failed to deliver reply");
        }
    }

    print_goodbye();
    Ok(())
}

fn resolve_db_path(flag: Option<&str>) -> Result<String> {
    if let Some(path) = flag {
        return Ok(path.to_string());
    }
    let path = default_db_path().context("cannot determine home directory; pass --db")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    path_to_string(&path)
}

fn path_to_string(path: &Path) -> Result<String> {
    path.to_str()
        .map(str::to_string)
        .with_context(|| format!("database path is not valid UTF-8: {}", path.display()))
}

fn handle_command(command: &Command, settings: &Config) -> Result<()> {
    match command {
        Command::SetKey { key } => {
            if key.trim().is_empty() {
                bail!("API key is empty");
            }
            settings.set(KEY_OMDB_API_KEY, key.trim())?;
            println!("✓ OMDb API key saved.");
        }
        Command::ForgetKey => {
            settings.remove(KEY_OMDB_API_KEY)?;
            println!("✓ OMDb API key removed.");
        }
        Command::Config { action } => match action {
            ConfigAction::Get { key: Some(key) } => match settings.get(key)? {
                Some(value) if key == KEY_OMDB_API_KEY => println!("{key} = {}", mask(&value)),
                Some(value) => println!("{key} = {value}"),
                None => println!("{key} is not set"),
            },
            ConfigAction::Get { key: None } => {
                let entries = settings.entries()?;
                if entries.is_empty() {
                    println!("no settings stored");
                }
                for (key, value) in entries {
                    if key == KEY_OMDB_API_KEY {
                        println!("{key} = {}", mask(&value));
                    } else {
                        println!("{key} = {value}");
                    }
                }
            }
            ConfigAction::Set { key, value } => {
                config::validate(key, value)?;
                settings.set(key, value)?;
                println!("✓ {key} = {value}");
            }
            ConfigAction::Unset { key } => {
                settings.remove(key)?;
                println!("✓ {key} removed");
            }
        },
    }
    Ok(())
}

/// Show only the last four characters of a secret, none of a short one.
fn mask(secret: &str) -> String {
    if secret.chars().count() <= 8 {
        return "****".to_string();
    }
    let tail: String = secret
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("****{tail}")
}
