//! Headless dataset preview.
//!
//! Renders every image of a dataset with its stored annotations to PNG files
//! and prints dataset summaries. No predictor is loaded.
//!
//! ```bash
//! salt-preview --dataset data/ --categories cat,dog info
//! salt-preview --config salt.json render --output preview/ --contour
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use salt::config::{EditorConfig, LogLevel};
use salt::editor::{Layers, compose, open_dataset};
use salt::render::{DisplayStyle, Frame, PointColors, Renderer};
use salt::store::{CocoDatasetStore, DatasetStore, load_rgb};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "salt-preview")]
#[command(version)]
#[command(about = "Preview a segmentation dataset and its COCO annotations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (JSON)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Dataset root holding images/ and embeddings/
    #[arg(long, short, global = true)]
    dataset: Option<PathBuf>,

    /// Annotation file, defaults to <dataset>/annotations.json
    #[arg(long, global = true)]
    annotations: Option<PathBuf>,

    /// Category names for a dataset without an annotation file
    #[arg(long, global = true, value_delimiter = ',')]
    categories: Option<Vec<String>>,

    /// Log verbosity, overrides the config file
    #[arg(long, global = true, value_enum)]
    log_level: Option<LogLevel>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write one PNG per image with its annotations drawn
    Render {
        /// Output directory
        #[arg(long, short)]
        output: PathBuf,

        /// Draw outlines instead of filled masks
        #[arg(long)]
        contour: bool,

        /// Hide category labels
        #[arg(long)]
        no_labels: bool,

        /// Transparency steps from the configured value, negative for more opaque
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        transparency_steps: i32,
    },

    /// Print images, categories and annotation counts
    Info,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .parse_default_env()
        .init();

    let result = match &cli.command {
        Commands::Render {
            output,
            contour,
            no_labels,
            transparency_steps,
        } => {
            let mut style = config.style.to_style();
            if *contour && !style.contour_mode() {
                style.toggle_contour_mode();
            }
            if *no_labels && style.show_labels() {
                style.toggle_labels();
            }
            step_transparency(&mut style, *transparency_steps);
            render(&config, style, output)
        }
        Commands::Info => info(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Config file values with command-line overrides applied.
fn resolve_config(cli: &Cli) -> CliResult<EditorConfig> {
    let mut config = match &cli.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };
    if let Some(dataset) = &cli.dataset {
        config.dataset_path = dataset.clone();
    }
    if config.dataset_path.as_os_str().is_empty() {
        return Err("no dataset given, use --dataset or --config".into());
    }
    if let Some(annotations) = &cli.annotations {
        config.annotations_path = Some(annotations.clone());
    }
    if let Some(categories) = &cli.categories {
        config.categories = Some(categories.clone());
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    Ok(config)
}

fn step_transparency(style: &mut DisplayStyle, steps: i32) {
    for _ in 0..steps.unsigned_abs() {
        if steps > 0 {
            style.increase_transparency();
        } else {
            style.decrease_transparency();
        }
    }
}

fn render(config: &EditorConfig, style: DisplayStyle, output: &Path) -> CliResult<()> {
    let store = open_dataset(config)?;
    std::fs::create_dir_all(output)?;
    let renderer = Renderer::new(style);
    log::info!("Rendering {} images to {:?}", store.num_images(), output);

    for index in 0..store.num_images() {
        let path = store.image_path(index)?;
        let frame = Frame::from_rgb(&load_rgb(path)?);
        let (annotations, colors) = store.annotations_for(index)?;

        let layers = Layers {
            base: &frame,
            categories: store.categories(),
            annotations: Some((&annotations[..], &colors[..])),
            points: &[],
            labels: &[],
            prediction: None,
            point_colors: PointColors::default(),
            point_radius: config.point_radius,
        };
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| format!("image_{index}"));
        let target = output.join(format!("{stem}.png"));
        compose(&renderer, &layers).save(&target)?;
        log::debug!("{}/{}: {:?}", index + 1, store.num_images(), target);
    }

    println!("Rendered {} images to {}", store.num_images(), output.display());
    Ok(())
}

fn info(config: &EditorConfig) -> CliResult<()> {
    let store: CocoDatasetStore = open_dataset(config)?;
    let annotations = store.all_annotations();

    println!("Dataset:     {}", config.dataset_path.display());
    println!("Annotations: {}", store.annotations_path().display());
    println!("Images:      {}", store.num_images());
    println!("Objects:     {}", annotations.len());
    println!("Categories:");
    for category in store.categories() {
        let count = annotations
            .iter()
            .filter(|a| a.category_id == category.id)
            .count();
        println!("  {:>3} {:<24} {}", category.id, category.name, count);
    }
    Ok(())
}
