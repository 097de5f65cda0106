//! Entity Lookup CLI
//!
//! Searches for entities matching a query, loads the top hit, and prints
//! its description and every claim with resolved labels.
//!
//! Usage:
//!   cargo run --bin wd_lookup -- "douglas adams"
//!   cargo run --bin wd_lookup -- --id Q42
//!   WIKIDATA_LANGUAGE=de cargo run --bin wd_lookup -- berlin

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wikidata_explorer::{format_claim_value, ClientConfig, EntityKind, LabelCache, WikidataClient};

#[derive(Parser, Debug)]
#[command(name = "wd_lookup")]
#[command(about = "Search Wikidata and print the top entity with its claims")]
struct Args {
    /// Search text, or an entity id with --id
    query: String,

    /// Treat the query as an entity id and skip the search step
    #[arg(long)]
    id: bool,

    /// Search properties instead of items
    #[arg(long)]
    properties: bool,

    /// Maximum number of search hits to list
    #[arg(long, default_value_t = 5)]
    hits: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wikidata_explorer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = ClientConfig::from_env().context("invalid configuration")?;
    let language = config.language.clone();
    let client = Arc::new(WikidataClient::new(config)?);
    let cache = LabelCache::new(client.clone());

    let entity_id = if args.id {
        args.query.clone()
    } else {
        let kind = args.properties.then_some(EntityKind::Property);
        let envelope = client
            .search_entities(&args.query, kind, 0, args.hits)
            .await
            .context("search failed")?;
        if envelope.search.is_empty() {
            println!("No matches for {:?}", args.query);
            return Ok(());
        }

        println!("Matches for {:?}:", args.query);
        for hit in &envelope.search {
            match &hit.description {
                Some(description) => {
                    println!("  {:>10}  {} - {}", hit.id, hit.display_label(), description)
                }
                None => println!("  {:>10}  {}", hit.id, hit.display_label()),
            }
        }
        println!();
        envelope.search[0].id.clone()
    };

    let entity = client
        .get_entity(&entity_id)
        .await
        .with_context(|| format!("failed to load {entity_id}"))?;

    cache
        .insert_many([(
            entity.id.clone(),
            entity.display_label(&language).to_string(),
        )])
        .await;
    let referenced: Vec<String> = entity.referenced_ids().into_iter().collect();
    let labels = cache.resolve(&referenced).await;

    println!("{} ({})", entity.display_label(&language), entity.id);
    if let Some(description) = entity.description(&language) {
        println!("{description}");
    }
    println!();

    for property in entity.ordered_properties() {
        let property_label = labels
            .get(property)
            .cloned()
            .unwrap_or_else(|| property.to_string());
        for claim in entity.claims_for(property) {
            println!("{property_label}: {}", format_claim_value(claim, &labels));
        }
    }

    Ok(())
}
