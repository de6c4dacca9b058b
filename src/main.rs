mod adapters;
mod config;
mod domain;
mod error;
mod pipeline;
mod ports;
mod stages;
mod utils;

use adapters::services::llm::OpenAIService;
use adapters::storage::FileSystemOutput;
use anyhow::Context;
use clap::Parser;
use config::Cli;
use domain::models::Meeting;
use stages::StageContext;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use utils::credentials::EnvCredentials;
use utils::input_file;

/// Load every input up front so bad input fails before any API call
async fn load_inputs(cli: &Cli) -> anyhow::Result<Vec<(PathBuf, Meeting)>> {
    match &cli.input {
        Some(path) => {
            let meeting = input_file::load_meeting(path)
                .await
                .with_context(|| format!("Failed to load {}", path.display()))?;
            Ok(vec![(path.clone(), meeting)])
        }
        None => {
            let mut inputs = Vec::new();
            for path in input_file::discover_templates(&cli.templates_dir).await? {
                let meeting = input_file::load_template(&path)
                    .await
                    .with_context(|| format!("Failed to load template {}", path.display()))?;
                inputs.push((path, meeting));
            }
            Ok(inputs)
        }
    }
}

/// Build the stage context around the configured service
fn build_context(cli: &Cli) -> anyhow::Result<StageContext> {
    let credentials = EnvCredentials::new(&cli.api_key_var);
    let mut service = OpenAIService::from_credentials(&credentials)?;
    if let Some(base) = &cli.api_base {
        service = service.with_base_url(base);
    }

    let mut ctx = StageContext::new(Arc::new(service));
    ctx.llm = cli.llm_config();
    ctx.image = cli.image_config();
    ctx.links = cli.link_policy();
    ctx.image_policy = cli.image_policy();
    ctx.diagnostics = cli.diagnostics();
    Ok(ctx)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let inputs = load_inputs(&cli).await?;
    let ctx = build_context(&cli)?;
    let output = FileSystemOutput::new(&cli.output_dir);

    for (path, meeting) in inputs {
        let written = pipeline::enrich_and_write(&ctx, &output, meeting)
            .await
            .with_context(|| format!("Failed to enrich {}", path.display()))?;
        log::info!("Enriched {} -> {}", path.display(), written.display());
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
