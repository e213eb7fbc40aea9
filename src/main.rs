use clap::{Parser, Subcommand};
use rgenai_studio::{
    logger::{self, LogLevel, LogPreset, LoggerConfig},
    select_images, AppMode, AspectRatio, CancelFlag, Config, GeminiStudio, GenerationOptions,
    ImagePayload, ProductCategory, StyleSelection, BANNER_STYLES,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "rgenai-studio", version, about = "Generate product photos and banners with Gemini")]
struct Cli {
    /// Logger preset (standard, development, production)
    #[arg(long, global = true, default_value = "standard")]
    log_preset: LogPreset,

    /// Log level (trace, debug, info, warn, error), overrides the preset
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Emit JSON log lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate up to four variations from product photos
    Generate {
        #[arg(long, default_value = "photo")]
        mode: AppMode,

        /// Style id, see `styles`
        #[arg(long)]
        style: String,

        /// Product category slug, e.g. food, drinks, body_wash
        #[arg(long, default_value = "food")]
        category: ProductCategory,

        /// 1:1, 4:5, 8:3, 3:2, 9:16 or 16:9
        #[arg(long, default_value = "1:1")]
        ratio: AspectRatio,

        #[arg(long)]
        description: String,

        /// Index of the image to use in photo mode
        #[arg(long)]
        select: Option<usize>,

        /// Output directory (defaults to STUDIO_OUTPUT_DIR or ./generated)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Number of variations to request (1-4)
        #[arg(long)]
        count: Option<usize>,

        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
    /// List the available styles, categories and aspect ratios
    Styles,
}

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    let cli = Cli::parse();

    let mut logger_config = LoggerConfig::from_preset(cli.log_preset);
    if let Some(level) = cli.log_level {
        logger_config = logger_config.with_level(level);
    }
    if cli.json_logs {
        logger_config = logger_config.with_json_output(true);
    }
    if let Err(e) = logger::init_with_config(logger_config) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }
    if !dotenv_loaded {
        log::debug!("No .env file found, using process environment");
    }

    match cli.command {
        Command::Styles => {
            print_catalogs();
            ExitCode::SUCCESS
        }
        Command::Generate {
            mode,
            style,
            category,
            ratio,
            description,
            select,
            out,
            count,
            images,
        } => {
            let mut config = Config::from_env();
            if let Some(out) = out {
                config = config.with_output_dir(out);
            }
            if let Some(count) = count {
                config.policy = config.policy.with_target_count(count);
            }

            match generate(&config, mode, &style, category, ratio, description, select, images).await {
                Ok(code) => code,
                Err(e) => {
                    log::error!("{}", e);
                    eprintln!("{}", e.user_message());
                    ExitCode::FAILURE
                }
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn generate(
    config: &Config,
    mode: AppMode,
    style_id: &str,
    category: ProductCategory,
    ratio: AspectRatio,
    description: String,
    select: Option<usize>,
    paths: Vec<PathBuf>,
) -> rgenai_studio::Result<ExitCode> {
    logger::log_config_info(config);

    let style = StyleSelection::find(mode, style_id).ok_or_else(|| {
        rgenai_studio::StudioError::InvalidInput(format!(
            "no {} style with id '{}', run `rgenai-studio styles`",
            mode, style_id
        ))
    })?;

    let uploads = paths
        .iter()
        .map(ImagePayload::from_path)
        .collect::<rgenai_studio::Result<Vec<_>>>()?;
    let images = select_images(mode, uploads, select)?;

    let studio = GeminiStudio::from_config(config)?;

    let cancel = CancelFlag::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, finishing with what has been generated so far");
            on_interrupt.cancel();
            // The handler stays installed, so a second Ctrl-C must exit explicitly.
            if tokio::signal::ctrl_c().await.is_ok() {
                log::error!("Interrupted again, exiting");
                std::process::exit(130);
            }
        }
    });

    let outcome = studio
        .generate_variations_with_cancel(
            GenerationOptions {
                description,
                category,
                style,
                aspect_ratio: ratio,
                images,
            },
            cancel,
        )
        .await?;

    for (index, image) in outcome.images.iter().enumerate() {
        let stem = format!("proshot-{}-{}", mode, index + 1);
        let path = image.save(&config.output_dir, &stem)?;
        println!("{}", path.display());
    }

    match outcome.advisory() {
        Some(advisory) => {
            log::warn!("{}", advisory);
            eprintln!("{}", advisory);
        }
        None => log::info!("✅ All {} variations generated", outcome.len()),
    }
    Ok(ExitCode::SUCCESS)
}

fn print_catalogs() {
    println!("Photo styles (--mode photo):");
    for (category, styles) in rgenai_studio::photo_styles_by_category() {
        println!("  {}", category);
        for style in styles {
            println!("    {:<18} {}", style.id, style.label);
        }
    }

    println!("\nBanner styles (--mode banner):");
    for style in BANNER_STYLES.iter() {
        println!("    {:<18} {}", style.id, style.label);
    }

    println!("\nCategories (--category):");
    for category in ProductCategory::ALL {
        println!("    {:<18} {}", category.slug(), category);
    }

    println!("\nAspect ratios (--ratio):");
    for ratio in AspectRatio::ALL {
        println!("    {:<18} sent as {}", ratio.label(), ratio.service_ratio());
    }
}
