use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use budget_coach::api::{self, AppState};
use budget_coach::cli::{Cli, Commands};
use budget_coach::config::{self, Config};
use budget_coach::models::generation::GenerationRequest;
use budget_coach::models::persona::{Persona, SAMPLE_INPUT};
use budget_coach::session::Session;
use budget_coach::upstream::Upstream;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "budget_coach=debug,tower_http=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cfg = config::load()?;
    let args = Cli::parse();

    let result = match args.command {
        Some(Commands::Serve { port }) => {
            let port = port.unwrap_or(cfg.port);
            run_server(cfg, port).await
        }
        Some(Commands::Ask {
            persona,
            max_tokens,
            temperature,
            sample,
            input,
        }) => run_ask(cfg, persona, max_tokens, temperature, sample, input).await,
        Some(Commands::Check) => run_check(cfg).await,
        None => {
            let port = cfg.port;
            run_server(cfg, port).await
        }
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

async fn run_server(cfg: Config, port: u16) -> anyhow::Result<()> {
    let upstream = Arc::new(Upstream::from_config(&cfg)?);
    let state = Arc::new(AppState::new(cfg, upstream));
    let app = api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Budget Coach listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Configuration problems are printed, never fatal: the session reports them
/// again in place of an answer.
fn print_warnings(cfg: &Config) {
    for w in cfg.warnings() {
        eprintln!("⚠️  {}", w);
    }
}

async fn run_ask(
    cfg: Config,
    persona: Persona,
    max_tokens: u32,
    temperature: f64,
    sample: bool,
    input: Option<String>,
) -> anyhow::Result<()> {
    print_warnings(&cfg);

    let input = match (sample, input) {
        (true, _) => SAMPLE_INPUT.to_string(),
        (false, Some(text)) if !text.trim().is_empty() => text,
        _ => anyhow::bail!("describe your financial situation, or pass --sample"),
    };

    let mut session = Session::new(Arc::new(Upstream::from_config(&cfg)?));
    let request = GenerationRequest::for_persona(persona, &input, max_tokens, temperature);
    let answer = session.answer(&request).await;
    println!("{}", answer);
    Ok(())
}

async fn run_check(cfg: Config) -> anyhow::Result<()> {
    print_warnings(&cfg);

    let mut session = Session::new(Arc::new(Upstream::from_config(&cfg)?));
    match session.test_connection().await {
        Ok(message) => println!("{}", message),
        Err(e) => println!("{}", e.display_message()),
    }
    Ok(())
}
