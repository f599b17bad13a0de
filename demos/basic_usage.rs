//! Basic usage example for the Research Digest library.
//!
//! Builds a research digest for one query and saves the markdown export.
//! Set GROQ_API_KEY to get AI analyses; without it those fields degrade.

use research_digest::aggregator::{export_document, Aggregator};
use research_digest::config::get_config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Defaults plus API keys from the environment
    let config = get_config();
    let aggregator = Aggregator::from_config(&config).with_limit(3);

    let query = "graph neural networks";
    println!("Researching \"{}\"...", query);

    let bundle = aggregator.build_bundle(query).await?;

    for (i, paper) in bundle.papers().iter().enumerate() {
        println!("\n{}. {}", i + 1, paper.title);
        println!("   Authors: {}", paper.author_line());
        println!("   Published: {}", paper.published_iso());
    }

    let analysis = bundle.analysis();
    println!("\nKeywords: {}", analysis.keywords.join(", "));
    if !analysis.is_complete() {
        println!("Unavailable analyses: {:?}", analysis.degraded);
    }

    match bundle.citation_info().citations() {
        Some(n) => println!("Lead paper citations: {}", n),
        None => println!("Citation data unavailable"),
    }

    let path = export_document(&bundle).write_to_dir(std::path::Path::new("."))?;
    println!("\nSaved {}", path.display());

    Ok(())
}
