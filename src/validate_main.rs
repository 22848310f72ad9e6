use std::sync::Arc;

use anyhow::Context;

use f1gpt_backend::core::config::{AppPaths, AppSettings, ConfigService};
use f1gpt_backend::core::logging;
use f1gpt_backend::diagnostics::{self, QueryCheck, SMOKE_QUERIES};
use f1gpt_backend::rag::RagService;
use f1gpt_backend::state::{build_embedder, open_store};

const SMOKE_RUNS: usize = 3;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let smoke = std::env::args().skip(1).any(|arg| arg == "--smoke");

    let paths = Arc::new(AppPaths::new());
    logging::init(&paths, "validate.log");

    let config = ConfigService::new(paths.clone());
    let settings = AppSettings::from_config(&config.load_config()?);

    println!("Validating F1 RAG pipeline");

    let service = match build_embedder(&settings.embedding) {
        Some(embedder) => {
            let store = open_store(&paths, &settings)
                .await
                .context("Failed to open vector store")?;
            println!("1. Configuration: ok ({})", store.db_path().display());
            Some(RagService::new(embedder, store))
        }
        None => {
            println!("1. Configuration: embedding.base_url is not set");
            println!("   Set embedding.base_url in config.yml or secrets.yaml and point it at an");
            println!("   OpenAI-compatible embedding server, then run f1gpt-seed.");
            None
        }
    };

    let report = diagnostics::validate(service.as_ref()).await;

    if report.configured {
        if report.healthy {
            println!("2. Health check: ok");
        } else {
            println!("2. Health check: failed");
            println!("   Check that the embedding server is reachable and serves the configured model,");
            println!("   and that the knowledge base has been seeded with f1gpt-seed.");
        }
    }

    if let Some(sample) = &report.sample {
        println!("3. Sample query: {:?}", sample.query);
        print_summary(sample);
        if sample.is_meaningful() {
            println!("   Preview: {}...", sample.preview());
        } else {
            println!("   Warning: answer looks too short: {:?}", sample.answer);
        }
    } else if let Some(error) = &report.error {
        println!("3. Sample query failed: {}", error);
    }

    if !report.passed() {
        anyhow::bail!("RAG pipeline validation failed");
    }
    println!("RAG pipeline validation PASSED");

    if smoke {
        if let Some(service) = &service {
            run_smoke_queries(service).await?;
        }
    }

    Ok(())
}

async fn run_smoke_queries(service: &RagService) -> anyhow::Result<()> {
    for (index, query) in SMOKE_QUERIES.iter().take(SMOKE_RUNS).enumerate() {
        println!();
        println!("Query {}: {}", index + 1, query);

        let check = diagnostics::run_query(service, query)
            .await
            .with_context(|| format!("Smoke query failed: {}", query))?;

        print_summary(&check);
        println!("   Answer:\n{}", check.answer);
        if !check.sources.is_empty() {
            println!("   Sources:");
            for (n, source) in check.sources.iter().enumerate() {
                println!("     {}. {}", n + 1, source);
            }
        }
        for (similarity, snippet) in &check.top_snippets {
            println!("   [{:.3}] {}...", similarity, snippet);
        }
    }
    Ok(())
}

fn print_summary(check: &QueryCheck) {
    println!("   Time: {}ms", check.elapsed.as_millis());
    println!("   Confidence: {:.1}%", check.confidence * 100.0);
    println!("   Retrieved docs: {}", check.retrieved);
    println!("   Sources: {}", check.sources.len());
}
