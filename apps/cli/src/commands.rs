//! CLI command definitions, routing, and tracing setup.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use docqa_core::{DocumentStore, QaOrchestrator};
use docqa_ingest::LoadedText;
use docqa_openrouter::{OpenRouterGenerator, OpenRouterSettings};
use docqa_shared::{
    AppConfig, EvaluatedAnswer, EvaluationOutcome, Question, init_config, init_config_at,
    load_config, load_config_from, validate_api_key,
};
use serde::Serialize;
use tracing::info;

use crate::progress::with_spinner;
use crate::session::Session;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// DocQA: ask questions about a document and test your understanding of it.
#[derive(Parser)]
#[command(
    name = "docqa",
    version,
    about = "Summarize a text document, answer questions about it, and quiz yourself on it.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.docqa/docqa.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured OpenRouter model.
    #[arg(long, global = true)]
    pub model: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Summarize the opening of a document in a few sentences.
    Summarize {
        /// Text document (.txt, .text, .md).
        file: PathBuf,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Answer a question about a document, with a supporting excerpt.
    Ask {
        /// Text document (.txt, .text, .md).
        file: PathBuf,

        /// The question to answer.
        question: String,

        #[arg(long)]
        json: bool,
    },

    /// Generate comprehension questions for a document.
    Challenge {
        /// Text document (.txt, .text, .md).
        file: PathBuf,

        /// Number of questions (at most 3 are returned). Defaults to `qa.question_count`.
        #[arg(short = 'n', long)]
        count: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// Grade an answer to a generated question, selected by 0-based index.
    ///
    /// Questions are regenerated for this call, so the question at an index
    /// may differ from the one `challenge` printed earlier.
    Evaluate {
        /// Text document (.txt, .text, .md).
        file: PathBuf,

        /// 0-based question index.
        #[arg(long, allow_negative_numbers = true)]
        question_id: i64,

        /// Your answer.
        #[arg(long)]
        answer: String,

        #[arg(long)]
        json: bool,
    },

    /// Load a document and work with it interactively.
    Session {
        /// Text document (.txt, .text, .md).
        file: PathBuf,
    },

    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a default config file to ~/.docqa/docqa.toml (or the --config path).
    Init,
    /// Print the resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize the tracing subscriber based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "docqa=info",
        1 => "docqa=debug",
        _ => "docqa=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so command output on stdout stays pipeable.
    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    // `config init` must work even when the current file does not load.
    if let Command::Config {
        action: ConfigAction::Init,
    } = cli.command
    {
        return cmd_config_init(cli.config.as_deref());
    }

    let config = resolve_config(cli.config.as_deref(), cli.model.as_deref())?;

    match cli.command {
        Command::Summarize { file, json } => cmd_summarize(&config, &file, json).await,
        Command::Ask {
            file,
            question,
            json,
        } => cmd_ask(&config, &file, &question, json).await,
        Command::Challenge { file, count, json } => {
            let count = count.unwrap_or(config.qa.question_count);
            cmd_challenge(&config, &file, count, json).await
        }
        Command::Evaluate {
            file,
            question_id,
            answer,
            json,
        } => cmd_evaluate(&config, &file, question_id, &answer, json).await,
        Command::Session { file } => cmd_session(&config, &file).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(cli.config.as_deref()),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

/// Load the config file (explicit path or default location) and apply flag overrides.
fn resolve_config(path: Option<&Path>, model: Option<&str>) -> Result<AppConfig> {
    let mut config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    if let Some(model) = model {
        config.openrouter.model = model.to_string();
    }
    Ok(config)
}

fn build_orchestrator(config: &AppConfig) -> Result<QaOrchestrator> {
    validate_api_key(config)?;
    let settings = OpenRouterSettings::from_config(&config.openrouter)?;
    let generator = OpenRouterGenerator::new(settings)?;
    info!(model = %config.openrouter.model, chunk_size = config.qa.chunk_size, "generator ready");
    Ok(QaOrchestrator::from_config(Arc::new(generator), &config.qa))
}

fn load_document(file: &Path) -> Result<LoadedText> {
    Ok(docqa_ingest::load_file(file)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct SummaryOutput<'a> {
    file_name: &'a str,
    summary: &'a str,
}

async fn cmd_summarize(config: &AppConfig, file: &Path, json: bool) -> Result<()> {
    let doc = load_document(file)?;
    let orchestrator = build_orchestrator(config)?;

    let summary = with_spinner("Summarizing", orchestrator.summarize(&doc.text)).await?;

    if json {
        print_json(&SummaryOutput {
            file_name: &doc.file_name,
            summary: &summary,
        })
    } else {
        println!("{summary}");
        Ok(())
    }
}

async fn cmd_ask(config: &AppConfig, file: &Path, question: &str, json: bool) -> Result<()> {
    let doc = load_document(file)?;
    let orchestrator = build_orchestrator(config)?;

    let answer = with_spinner("Answering", orchestrator.answer(&doc.text, question)).await?;

    if json {
        print_json(&answer)
    } else {
        println!("Answer: {}", answer.answer);
        println!("Support: {}", answer.support);
        Ok(())
    }
}

async fn cmd_challenge(config: &AppConfig, file: &Path, count: usize, json: bool) -> Result<()> {
    let doc = load_document(file)?;
    let orchestrator = build_orchestrator(config)?;

    let questions = with_spinner(
        "Generating questions",
        orchestrator.generate_questions(&doc.text, count),
    )
    .await?;
    let questions = Question::numbered(questions);

    if json {
        return print_json(&questions);
    }
    if questions.is_empty() {
        println!("No questions could be generated from this document.");
    }
    // `evaluate --question-id` takes the 0-based index shown in brackets.
    for question in &questions {
        println!("[{}] {}", question.index, question.text);
    }
    Ok(())
}

async fn cmd_evaluate(
    config: &AppConfig,
    file: &Path,
    question_id: i64,
    answer: &str,
    json: bool,
) -> Result<()> {
    let doc = load_document(file)?;
    let orchestrator = build_orchestrator(config)?;

    let outcome = with_spinner(
        "Evaluating",
        orchestrator.evaluate(&doc.text, question_id, answer),
    )
    .await?;

    if json {
        return print_json(&outcome);
    }
    match outcome {
        EvaluationOutcome::Evaluated(evaluated) => {
            write_evaluation(&mut io::stdout(), &evaluated)?;
            Ok(())
        }
        EvaluationOutcome::InvalidQuestion(invalid) => {
            Err(eyre!("{} (question id {question_id})", invalid.error))
        }
    }
}

pub(crate) fn write_evaluation(out: &mut impl Write, evaluated: &EvaluatedAnswer) -> io::Result<()> {
    writeln!(out, "Question: {}", evaluated.question)?;
    writeln!(out, "Your answer: {}", evaluated.user_answer)?;
    writeln!(out, "Score: {}/5", evaluated.evaluation.score)?;
    writeln!(out, "Evaluation: {}", evaluated.evaluation.evaluation)?;
    writeln!(out, "Ideal answer: {}", evaluated.evaluation.ideal_answer)
}

async fn cmd_session(config: &AppConfig, file: &Path) -> Result<()> {
    let loaded = load_document(file)?;
    let orchestrator = build_orchestrator(config)?;

    let store = DocumentStore::new();
    let doc = store.insert(&loaded.file_name, loaded.text)?;
    println!("Loaded {} ({} chars) as {}", doc.file_name(), doc.text().chars().count(), doc.id());

    let summary = with_spinner("Summarizing", orchestrator.summarize(doc.text())).await?;
    println!("\n{summary}\n");

    let mut session = Session::new(orchestrator, doc, config.qa.question_count);
    session.run_stdin().await
}

fn cmd_config_init(path: Option<&Path>) -> Result<()> {
    let path = match path {
        Some(path) => init_config_at(path)?,
        None => init_config()?,
    };
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_evaluate_with_negative_index() {
        let cli = Cli::try_parse_from([
            "docqa",
            "evaluate",
            "notes.txt",
            "--question-id",
            "-1",
            "--answer",
            "ATP",
        ])
        .unwrap();
        match cli.command {
            Command::Evaluate { question_id, .. } => assert_eq!(question_id, -1),
            _ => panic!("expected evaluate"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "docqa",
            "challenge",
            "notes.txt",
            "-n",
            "2",
            "--model",
            "openai/gpt-4o-mini",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.model.as_deref(), Some("openai/gpt-4o-mini"));
        assert!(matches!(cli.command, Command::Challenge { count: Some(2), .. }));
    }

    #[test]
    fn resolve_config_applies_model_override() {
        let path = std::env::temp_dir().join(format!("docqa-cli-{}.toml", std::process::id()));
        std::fs::write(&path, "[qa]\nchunk_size = 500\n").unwrap();

        let config = resolve_config(Some(&path), Some("anthropic/claude-3-haiku")).unwrap();
        assert_eq!(config.qa.chunk_size, 500);
        assert_eq!(config.openrouter.model, "anthropic/claude-3-haiku");

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn config_init_resets_unloadable_config() {
        let path = std::env::temp_dir().join(format!("docqa-cli-init-{}.toml", std::process::id()));
        std::fs::write(&path, "[qa]\nchunk_size = 0\n").unwrap();
        let path_arg = path.to_string_lossy().into_owned();

        let cli = Cli::try_parse_from(["docqa", "--config", &path_arg, "config", "init"]).unwrap();
        run(cli).await.expect("config init ignores the broken file");

        let config = resolve_config(Some(&path), None).expect("reset config loads");
        assert_eq!(config.qa.chunk_size, 2000);
        assert_eq!(config.qa.question_count, 3);

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn config_show_still_reports_broken_config() {
        let path = std::env::temp_dir().join(format!("docqa-cli-show-{}.toml", std::process::id()));
        std::fs::write(&path, "[qa]\nchunk_size = 0\n").unwrap();
        let path_arg = path.to_string_lossy().into_owned();

        let cli = Cli::try_parse_from(["docqa", "--config", &path_arg, "config", "show"]).unwrap();
        let err = run(cli).await.unwrap_err();
        assert!(err.to_string().contains("chunk_size"), "{err}");

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn resolve_config_reports_missing_file() {
        let missing = Path::new("/nonexistent/docqa/config.toml");
        assert!(resolve_config(Some(missing), None).is_err());
    }
}
