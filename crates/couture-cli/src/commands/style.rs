use anyhow::{Context, Result, bail};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

use couture_application::workflow::WorkflowOptions;
use couture_application::{RequestOutcome, StylingWorkflow};
use couture_core::catalog::StylingCatalog;
use couture_core::config::AppConfig;
use couture_core::outfit::{OutfitCategory, OutfitKind};
use couture_infrastructure::config_service::resolve_api_key;
use couture_infrastructure::{FileImageSource, ImageExporter};
use couture_interaction::GeminiGateway;

use crate::parse_kind;

#[derive(Args)]
pub struct StyleArgs {
    /// Full-body photo to style
    #[arg(long)]
    image: PathBuf,

    /// Season, e.g. "Summer" (see `couture presets`)
    #[arg(long)]
    season: String,

    /// Occasion, e.g. "Party Look" (see `couture presets`)
    #[arg(long)]
    occasion: String,

    /// Ask for the long-form stylist dossier
    #[arg(long)]
    in_depth: bool,

    /// Render a virtual try-on for this category
    #[arg(long, value_parser = parse_kind)]
    try_on: Option<OutfitKind>,

    /// Variation to try on, counted from 1
    #[arg(long, default_value_t = 1, requires = "try_on")]
    variation: usize,

    /// Write rendered images to this directory
    #[arg(long, requires = "try_on")]
    export: Option<PathBuf>,

    /// Save rendered images to favorites
    #[arg(long, requires = "try_on")]
    favorite: bool,

    /// Print the final session snapshot as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(config: &AppConfig, args: StyleArgs) -> Result<()> {
    let catalog = StylingCatalog::from_config(&config.styling);
    let season = catalog
        .resolve_season(&args.season)
        .context("season must not be empty")?;
    let occasion = catalog
        .resolve_occasion(&args.occasion)
        .context("occasion must not be empty")?;

    let api_key = resolve_api_key(config)?;
    let gateway = GeminiGateway::from_config(&config.gemini, api_key)?;
    let options = WorkflowOptions {
        in_depth: args.in_depth || config.styling.in_depth,
    };
    let workflow = Arc::new(StylingWorkflow::with_options(Arc::new(gateway), options));
    let progress = spawn_progress(&workflow);

    workflow.begin().await?;
    let source = FileImageSource::new(&args.image);
    if let Err(e) = workflow.upload_image(&source).await {
        return Err(failure(&workflow, e.into()).await);
    }
    workflow.select_season(&season).await?;
    if let Err(e) = workflow.select_occasion(&occasion).await {
        return Err(failure(&workflow, e.into()).await);
    }

    let snapshot = workflow.snapshot().await;
    print_suggestions(&snapshot.suggestions);

    if let Some(kind) = args.try_on {
        if args.variation == 0 {
            bail!("--variation is counted from 1");
        }
        let index = args.variation - 1;

        workflow.open_try_on(kind, index).await?;
        println!();
        println!("Rendering {kind} look {} ...", args.variation);

        match workflow.request_active_variation().await? {
            RequestOutcome::Failed(message) => bail!(message),
            outcome => tracing::debug!(?outcome, "Try-on request resolved"),
        }

        let images = workflow.variation_view(kind, index).await?.images().to_vec();
        println!("{} image(s) rendered", images.len());

        let export_dir = args.export.or_else(|| config.storage.export_dir.clone());
        if let Some(dir) = export_dir {
            let exporter = ImageExporter::new(dir);
            for (i, image) in images.iter().enumerate() {
                let path = exporter.export(kind, i, image).await?;
                println!("  saved {}", path.display());
            }
        }

        if args.favorite {
            let favorites = super::favorites(config).await?;
            let mut saved = 0;
            for image in &images {
                if favorites.add(image.clone()).await {
                    saved += 1;
                }
            }
            println!("{saved} of {} image(s) added to favorites", images.len());
        }
    }

    if args.json {
        let snapshot = workflow.snapshot().await;
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }

    progress.abort();
    Ok(())
}

/// Logs every state change the workflow publishes.
fn spawn_progress(workflow: &Arc<StylingWorkflow>) -> tokio::task::JoinHandle<()> {
    let mut rx = workflow.subscribe();
    tokio::spawn(async move {
        let mut last = rx.borrow_and_update().state;
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().state;
            if state != last {
                tracing::info!(state = %state, "Workflow state");
                last = state;
            }
        }
    })
}

async fn failure(workflow: &StylingWorkflow, cause: anyhow::Error) -> anyhow::Error {
    match workflow.snapshot().await.last_error {
        Some(message) => cause.context(message),
        None => cause,
    }
}

fn print_suggestions(categories: &[OutfitCategory]) {
    for category in categories {
        println!();
        println!("== {} ==", category.kind);
        for (i, variation) in category.variations.iter().enumerate() {
            println!("{}. {}", i + 1, variation.description);
            for item in &variation.items {
                println!("   - {item}");
            }
        }
    }
}
