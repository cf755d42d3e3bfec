//! Mentor - Error Diagnosis & Curriculum Progress Engine
//!
//! Command-line entry point: diagnose captured error text (or a screenshot),
//! mark curriculum tasks complete, and inspect progress.

use clap::{Parser, Subcommand};
use mentor_core::{
    error::Result, CompletionSink, Curriculum, DiagnosisEngine, ErrorReport, FallbackClassifier,
    LinearTaskClassifier, LogSink, MentorConfig, ModuleCompletionEvent, ProgressStore,
    ProgressTracker, RemoteEmbeddingService, SolutionCatalog, TesseractExtractor, TextExtractor,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mentor", version, about = "Error diagnosis and curriculum progress engine")]
struct Cli {
    /// Configuration file (defaults to ./mentor.toml when present)
    #[arg(long, env = "MENTOR_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Diagnose an error from text or a screenshot
    Diagnose {
        /// Error text to diagnose
        text: Option<String>,

        /// Screenshot to run OCR on instead of direct text
        #[arg(long, conflicts_with = "text")]
        image: Option<PathBuf>,
    },

    /// Mark a curriculum task complete (or incomplete with --undo)
    Mark {
        /// Task name, as listed in the curriculum
        task: String,

        /// Mark the task incomplete instead
        #[arg(long)]
        undo: bool,
    },

    /// Show per-module completion status
    Progress,

    /// List curriculum modules
    Modules,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::new(format!(
        "mentor={},mentor_core={}",
        level.as_str().to_lowercase(),
        level.as_str().to_lowercase()
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr) // Logs to stderr, results to stdout
        .init();

    debug!("Mentor v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = MentorConfig::load(cli.config.as_deref())?;
    let curriculum = Arc::new(Curriculum::load(&config.curriculum_path)?);

    match cli.command {
        Commands::Diagnose { text, image } => {
            let engine = build_engine(&config, Arc::clone(&curriculum))?;

            let report = match (text, image) {
                (_, Some(path)) => {
                    let extractor = TesseractExtractor::default();
                    ErrorReport::ocr(extractor.extract_text(&path).await?)
                }
                (Some(text), None) => ErrorReport::direct(text),
                (None, None) => ErrorReport::direct(read_stdin()?),
            };

            let diagnosis = engine.diagnose(report).await;

            println!("Error Type: {}", diagnosis.classification);
            println!("Solution Steps:");
            for step in &diagnosis.remediation {
                println!("  {}", step);
            }
            if let Some(task) = &diagnosis.task {
                println!(
                    "Related Task: {} (module: {})",
                    task.task_name, task.module_name
                );
            }
        }

        Commands::Mark { task, undo } => {
            let store = ProgressStore::new(&config.progress_path);
            let tracker =
                ProgressTracker::new(Arc::clone(&curriculum), store, config.completion_policy)?;

            let event = tracker.mark(&task, !undo).await?;
            println!(
                "Task '{}' marked {}",
                task,
                if undo { "incomplete" } else { "complete" }
            );

            if let Some(event) = event {
                LogSink.notify(&event);
                print_completion(&event);
            }
        }

        Commands::Progress => {
            let store = ProgressStore::new(&config.progress_path);
            let tracker =
                ProgressTracker::new(Arc::clone(&curriculum), store, config.completion_policy)?;
            let state = tracker.snapshot().await;

            if curriculum.is_empty() {
                println!("Curriculum is empty.");
            }
            for module in curriculum.modules() {
                let done = module
                    .steps
                    .iter()
                    .filter(|s| state.get(*s).copied().unwrap_or(false))
                    .count();
                println!(
                    "{} [{}/{}]{}",
                    module.name,
                    done,
                    module.steps.len(),
                    if done == module.steps.len() { " ✓" } else { "" }
                );
                for step in &module.steps {
                    let mark = if state.get(step).copied().unwrap_or(false) {
                        "x"
                    } else {
                        " "
                    };
                    println!("  [{}] {}", mark, step);
                }
            }
        }

        Commands::Modules => {
            if curriculum.is_empty() {
                println!("Curriculum is empty.");
            }
            for module in curriculum.modules() {
                println!(
                    "{}: {} (difficulty: {}, reward: {})",
                    module.name, module.short_explanation, module.difficulty, module.reward
                );
            }
        }
    }

    Ok(())
}

/// Assemble the engine, wiring the fallback stage only when its
/// collaborators are available. Fallback trouble at startup is never fatal:
/// unresolved reports then classify as Unknown.
fn build_engine(config: &MentorConfig, curriculum: Arc<Curriculum>) -> Result<DiagnosisEngine> {
    let catalog = match &config.catalog_path {
        Some(path) => SolutionCatalog::from_file(path)?,
        None => SolutionCatalog::builtin(),
    };

    let fallback = build_fallback(config);
    Ok(DiagnosisEngine::new(catalog, curriculum, fallback))
}

fn build_fallback(config: &MentorConfig) -> Option<FallbackClassifier> {
    if !config.fallback.enabled {
        debug!("fallback classifier disabled by configuration");
        return None;
    }

    let Some(model_path) = &config.model_path else {
        debug!("no classifier artifact configured, running rules-only");
        return None;
    };

    let model = match LinearTaskClassifier::load(model_path) {
        Ok(model) => Arc::new(model),
        Err(e) => {
            warn!("fallback disabled: {}", e);
            return None;
        }
    };

    let embeddings = match RemoteEmbeddingService::new(config.embedding.clone()) {
        Ok(service) => Arc::new(service),
        Err(e) => {
            warn!("fallback disabled: {}", e);
            return None;
        }
    };

    Some(FallbackClassifier::new(embeddings, model, &config.fallback))
}

fn print_completion(event: &ModuleCompletionEvent) {
    println!();
    println!("Module Completed: {}", event.module_name);
    println!("  {}", event.short_explanation);
    println!("  Reward: {}", event.reward);
    println!("  Difficulty: {}", event.difficulty);
    match &event.next_module {
        Some(next) => println!("  Next: {} ({})", next.module_name, next.short_explanation),
        None => println!("  Next: none, curriculum finished!"),
    }
}

fn read_stdin() -> Result<String> {
    use std::io::Read;
    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}
