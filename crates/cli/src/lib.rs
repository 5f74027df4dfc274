use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use textcad_inference::{
    CorpusStore, JsonFileStore, MemoryStore, ShapeExample, ShapeParameters, ShapeService,
};
use textcad_protocol::{serialize_json, serialize_json_pretty, ParseTextResponse, RetrainResponse};

mod config;
mod http_api;

pub use config::Settings;
pub use http_api::{build_router, HttpState};

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "textcad")]
#[command(about = "Turn short text descriptions into 3D primitives", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (JSON or TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the text-to-shape API over HTTP (POST /parse-text, GET /health, POST /retrain)
    ServeHttp(ServeArgs),

    /// Parse one phrase and print the resulting objects
    Parse(ParseArgs),

    /// Append a training example, retrain and save the corpus
    Retrain(RetrainArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Bind address (default 127.0.0.1:5000, env: TEXTCAD_BIND)
    #[arg(long)]
    bind: Option<String>,

    /// Corpus file (default training_data.json, env: TEXTCAD_CORPUS)
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// Keep retrained examples in memory only
    #[arg(long)]
    no_persist: bool,
}

#[derive(Args)]
struct ParseArgs {
    /// Phrase to parse, e.g. "red sphere and 2 cubes"
    text: String,

    /// Output the HTTP response body as JSON
    #[arg(long)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Corpus file
    #[arg(long)]
    corpus: Option<PathBuf>,
}

#[derive(Args)]
struct RetrainArgs {
    /// Inline JSON training example (mutually exclusive with --file)
    #[arg(long, conflicts_with = "file")]
    example: Option<String>,

    /// Path to a file containing one JSON training example
    #[arg(long)]
    file: Option<PathBuf>,

    /// Corpus file
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// Output the HTTP response body as JSON
    #[arg(long)]
    json: bool,
}

pub async fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();

    // stdout is reserved for JSON when it is requested
    let json_output = match &cli.command {
        Commands::Parse(args) => args.json,
        Commands::Retrain(args) => args.json,
        Commands::ServeHttp(_) => false,
    };
    if json_output {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let mut settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::ServeHttp(args) => {
            if let Some(bind) = args.bind {
                settings.bind = bind;
            }
            if let Some(corpus) = args.corpus {
                settings.corpus_path = corpus;
            }
            if args.no_persist {
                settings.persist = false;
            }
            settings.validate()?;
            serve_http(settings).await?;
        }
        Commands::Parse(args) => {
            if let Some(corpus) = &args.corpus {
                settings.corpus_path.clone_from(corpus);
            }
            settings.validate()?;
            run_parse(args, &settings).await?;
        }
        Commands::Retrain(args) => {
            if let Some(corpus) = &args.corpus {
                settings.corpus_path.clone_from(corpus);
            }
            settings.validate()?;
            run_retrain(args, &settings).await?;
        }
    }

    Ok(())
}

async fn open_service(settings: &Settings) -> Result<ShapeService> {
    let file_store = JsonFileStore::new(&settings.corpus_path);
    let store: Arc<dyn CorpusStore> = if settings.persist {
        Arc::new(file_store)
    } else {
        // start from the file, but never write it back
        match file_store.load().await {
            Ok(Some(corpus)) => Arc::new(MemoryStore::with_corpus(corpus)),
            Ok(None) => Arc::new(MemoryStore::new()),
            Err(err) => {
                log::warn!(
                    "Ignoring unreadable corpus at {}: {err}",
                    settings.corpus_path.display()
                );
                Arc::new(MemoryStore::new())
            }
        }
    };

    ShapeService::open(store, settings.inference.clone())
        .await
        .context("Failed to start the shape service")
}

async fn run_parse(args: ParseArgs, settings: &Settings) -> Result<()> {
    if args.text.trim().is_empty() {
        anyhow::bail!("{}", textcad_protocol::NO_TEXT_PROVIDED);
    }

    let service = open_service(settings).await?;
    let outcome = service.parse(&args.text);
    let response = ParseTextResponse::new(outcome.objects, outcome.ml_powered);

    if args.json {
        let output = if args.pretty {
            serialize_json_pretty(&response)?
        } else {
            serialize_json(&response)?
        };
        print_stdout(&output)?;
    } else {
        print_stdout(&render_scene(&response))?;
    }
    Ok(())
}

async fn run_retrain(args: RetrainArgs, settings: &Settings) -> Result<()> {
    let example = read_example(&args)?;

    let mut service = open_service(settings).await?;
    let total = service
        .retrain(example)
        .await
        .context("Failed to retrain")?;

    if args.json {
        print_stdout(&serialize_json(&RetrainResponse::retrained(total))?)?;
    } else {
        let target = if settings.persist {
            settings.corpus_path.display().to_string()
        } else {
            "not persisted".to_string()
        };
        print_stdout(&format!("Retrained on {total} examples ({target})"))?;
    }
    Ok(())
}

fn read_example(args: &RetrainArgs) -> Result<Option<ShapeExample>> {
    let raw = if let Some(raw) = &args.example {
        raw.clone()
    } else if let Some(path) = &args.file {
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read example from {}", path.display()))?
    } else {
        return Ok(None);
    };

    let example = serde_json::from_str(&raw).context("Invalid JSON passed to --example/--file")?;
    Ok(Some(example))
}

fn render_scene(response: &ParseTextResponse) -> String {
    let mode = if response.ml_powered { "model" } else { "rules" };
    let mut lines = vec![format!("{} ({mode})", response.interpretation)];
    lines.extend(
        response
            .objects
            .iter()
            .enumerate()
            .map(|(idx, object)| render_object(idx + 1, object)),
    );
    lines.join("\n")
}

fn render_object(number: usize, object: &ShapeParameters) -> String {
    format!(
        "{number:>2}. {:<8} size={:.2} radius={:.2} height={:.2} color=#{:06x} at ({:.2}, {:.2}, {:.2}) confidence={:.2}",
        object.shape.as_str(),
        object.size,
        object.radius,
        object.height,
        object.color,
        object.position.x,
        object.position.y,
        object.position.z,
        object.confidence,
    )
}

async fn serve_http(settings: Settings) -> Result<()> {
    let service = open_service(&settings).await?;
    let app = build_router(HttpState::new(service), settings.max_body_bytes);

    let listener = tokio::net::TcpListener::bind(&settings.bind)
        .await
        .with_context(|| format!("Failed to bind {}", settings.bind))?;
    let local_addr = listener.local_addr()?;
    let base_url = format!("http://{local_addr}");
    log::info!("Listening on {local_addr}");

    print_stdout(&format!("Serving text-to-shape API: {base_url}/parse-text"))?;
    print_stdout(&format!("Health endpoint: {base_url}/health"))?;
    if !settings.persist {
        print_stdout("Persistence disabled (--no-persist): retrained examples stay in memory")?;
    }
    print_stdout(&format!(
        "Try: curl -X POST {base_url}/parse-text -H 'Content-Type: application/json' -d '{{\"text\": \"red sphere and 2 cubes\"}}'"
    ))?;
    axum::serve(listener, app).await?;
    Ok(())
}
