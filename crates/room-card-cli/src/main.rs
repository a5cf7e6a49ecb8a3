//! Room card command line tool
//!
//! Validates a card configuration and renders it against a file of entity
//! states, printing the resulting view model as JSON.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use room_card::{ComponentRegistry, RoomCard};
use room_card_config::{collect_child_card_types, load_config_file};
use room_card_core::{EntityState, Hass, HassUser, States};
use serde::Deserialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Validate and render room card configurations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration and list what it depends on
    Check {
        /// Card configuration (YAML or JSON)
        config: PathBuf,
    },
    /// Render a configuration against one set of states
    Render {
        config: PathBuf,
        /// Entity states: a list of state objects or a map keyed by entity id
        #[arg(short, long)]
        states: PathBuf,
        /// Current user as JSON
        #[arg(short, long)]
        user: Option<PathBuf>,
        #[arg(long)]
        pretty: bool,
    },
    /// Push a sequence of state sets and report which ones trigger a render
    Replay {
        config: PathBuf,
        /// A JSON list of state sets, pushed in order
        #[arg(short, long)]
        states: PathBuf,
    },
}

/// Every child component is treated as already registered
struct StaticRegistry;

#[async_trait]
impl ComponentRegistry for StaticRegistry {
    async fn when_defined(&self, component: &str) {
        debug!(component, "Component available");
    }
}

/// States as the host exports them
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StatesFile {
    List(Vec<EntityState>),
    Map(std::collections::HashMap<String, EntityState>),
}

impl From<StatesFile> for States {
    fn from(file: StatesFile) -> Self {
        match file {
            StatesFile::List(list) => list.into_iter().collect(),
            StatesFile::Map(map) => map.into_values().collect(),
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

fn load_states(path: &Path) -> Result<States> {
    Ok(read_json::<StatesFile>(path)?.into())
}

async fn configured_card(path: &Path) -> Result<RoomCard> {
    let config = load_config_file(path)?;
    let mut card = RoomCard::new();
    card.set_config(config, &StaticRegistry).await?;
    Ok(card)
}

fn check(path: &Path) -> Result<()> {
    let config = load_config_file(path)?;

    let components = collect_child_card_types(config.cards.as_deref().unwrap_or_default());
    info!(
        entities = config.entity_ids.len(),
        components = components.len(),
        "Configuration is valid"
    );

    for id in &config.entity_ids {
        println!("entity    {}", id);
    }
    for component in &components {
        println!("component {}", component);
    }
    Ok(())
}

async fn render(config: &Path, states: &Path, user: Option<&Path>, pretty: bool) -> Result<()> {
    let mut card = configured_card(config).await?;

    let mut hass = Hass::new(load_states(states)?);
    if let Some(user) = user {
        hass = hass.with_user(read_json::<HassUser>(user)?);
    }
    card.set_hass(hass);

    let view = card.render()?;
    let output = if pretty {
        serde_json::to_string_pretty(&view)?
    } else {
        serde_json::to_string(&view)?
    };
    println!("{}", output);
    Ok(())
}

async fn replay(config: &Path, states: &Path) -> Result<()> {
    let mut card = configured_card(config).await?;
    let sets: Vec<StatesFile> = read_json(states)?;

    for (index, set) in sets.into_iter().enumerate() {
        let changed = card.set_hass(Hass::new(set.into()));
        if card.should_update() {
            let view = card.render()?;
            println!("{} changed={} {}", index, changed, serde_json::to_string(&view)?);
        } else {
            println!("{} changed={}", index, changed);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { config } => check(&config),
        Commands::Render {
            config,
            states,
            user,
            pretty,
        } => render(&config, &states, user.as_deref(), pretty).await,
        Commands::Replay { config, states } => replay(&config, &states).await,
    }
}
