use std::io::IsTerminal;
use std::io::Write as _;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use miette::{Context, IntoDiagnostic, Result};

use chorus_core::{ChorusConfig, ChorusError, OutputFormat};
use chorus_index::chunker::split_lines;
use chorus_index::embedding::EmbeddingClient;
use chorus_index::retrieval::Retriever;
use chorus_index::store::VectorStore;

#[derive(Parser)]
#[command(
    name = "chorus",
    version,
    about = "Retrieval-augmented code understanding",
    long_about = "Chorus indexes a codebase into a remote vector store and answers\n\
                   questions about it, grounding every response in the retrieved code.\n\n\
                   Examples:\n  \
                     chorus run                      Ingest the source file, then ask one question\n  \
                     chorus ingest --file code.txt   (Re)build the vector index from a file\n  \
                     chorus ask 'how does auth work' Ask a question against the existing index\n  \
                     chorus chat                     Interactive explanation loop\n  \
                     chorus doctor                   Check setup and environment"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .chorus.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text  Human-readable output (default)\n  \
                         json  Machine-readable JSON"
    )]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,

    /// When to use colors
    #[arg(long, global = true, default_value = "auto")]
    color: ColorChoice,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest the configured source file, then answer one question
    #[command(long_about = "Run the full batch pipeline.\n\n\
        Reads the source file, splits it into line-oriented chunks, rebuilds the\n\
        vector index, then prompts for a question and writes the grounded answer\n\
        to the artifact file.\n\n\
        Examples:\n  chorus run\n  chorus run --file processed_code_output.txt --out answer.md")]
    Run {
        /// Source file to ingest (default: pipeline.source_path from config)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Artifact file for the answer (default: pipeline.artifact_path)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Rebuild the vector index from a source file
    #[command(long_about = "Rebuild the vector index from a source file.\n\n\
        Clears the remote index, then chunks, embeds, and upserts the file's\n\
        contents. A chunk that fails to embed or upsert is logged and skipped.\n\n\
        Examples:\n  chorus ingest\n  chorus ingest --file code.txt")]
    Ingest {
        /// Source file to ingest (default: pipeline.source_path from config)
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Ask a question against the existing index
    #[command(long_about = "Ask a question against the existing index.\n\n\
        Embeds the query, retrieves the most similar chunks, and generates a\n\
        grounded answer. The answer is also written to the artifact file.\n\n\
        Examples:\n  chorus ask 'how does the chunker handle long lines?'\n  chorus ask 'where is retry logic?' --out answer.md")]
    Ask {
        /// The question to answer
        query: String,

        /// Artifact file for the answer (default: pipeline.artifact_path)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Interactive loop explaining retrieved code for each prompt
    #[command(long_about = "Interactive explanation loop.\n\n\
        For each prompt, retrieves the most similar chunks and explains each one\n\
        independently. Type 'exit' to quit. A failed round is reported and the\n\
        loop continues.\n\n\
        Example:\n  chorus chat")]
    Chat,
    /// Create a default .chorus.toml configuration file
    #[command(long_about = "Create a default .chorus.toml configuration file.\n\n\
        Generates a commented-out template with all available options.\n\
        Fails if .chorus.toml already exists.")]
    Init,
    /// Check your Chorus setup and environment
    #[command(long_about = "Check your Chorus setup and environment.\n\n\
        Runs diagnostics for the config file, embedding/index/LLM API keys, and\n\
        the configured source file. Use --format json for machine-readable output.")]
    Doctor,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Clone, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    /// Auto-detect based on terminal
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

fn print_welcome(use_color: bool) {
    let version = env!("CARGO_PKG_VERSION");

    if use_color {
        println!("\x1b[1m\x1b[33m♪\x1b[0m \x1b[1mchorus\x1b[0m v{version} — ask questions, get answers grounded in your code\n");

        println!("Quick start:");
        println!("  \x1b[36mchorus init\x1b[0m                   Create a .chorus.toml config file");
        println!("  \x1b[36mchorus ingest --file code.txt\x1b[0m Build the vector index");
        println!("  \x1b[36mchorus ask 'how does X work'\x1b[0m  Ask a grounded question\n");

        println!("All commands:");
        println!("  \x1b[32mrun\x1b[0m     Full pipeline: ingest, then answer one question");
        println!("  \x1b[32mingest\x1b[0m  Rebuild the vector index from a source file");
        println!("  \x1b[32mask\x1b[0m     Answer a question against the existing index");
        println!("  \x1b[32mchat\x1b[0m    Interactive explanation loop");
        println!("  \x1b[32mdoctor\x1b[0m  Check your setup and environment");
        println!("  \x1b[32minit\x1b[0m    Create default configuration\n");
    } else {
        println!("chorus v{version} — ask questions, get answers grounded in your code\n");

        println!("Quick start:");
        println!("  chorus init                   Create a .chorus.toml config file");
        println!("  chorus ingest --file code.txt Build the vector index");
        println!("  chorus ask 'how does X work'  Ask a grounded question\n");

        println!("All commands:");
        println!("  run     Full pipeline: ingest, then answer one question");
        println!("  ingest  Rebuild the vector index from a source file");
        println!("  ask     Answer a question against the existing index");
        println!("  chat    Interactive explanation loop");
        println!("  doctor  Check your setup and environment");
        println!("  init    Create default configuration\n");
    }

    println!("Run 'chorus <command> --help' for details.");
}

fn read_source_input(file: &Option<PathBuf>, config: &ChorusConfig) -> Result<String> {
    let path = file
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.pipeline.source_path));
    if !path.exists() {
        miette::bail!(miette::miette!(
            help = "Set pipeline.source_path in .chorus.toml or pass --file <path>",
            "Source file not found: {}",
            path.display()
        ));
    }
    std::fs::read_to_string(&path)
        .into_diagnostic()
        .wrap_err(format!("reading {}", path.display()))
}

fn prompt_line(prompt: &str) -> Result<Option<String>> {
    print!("{prompt}");
    std::io::stdout().flush().into_diagnostic()?;
    let mut line = String::new();
    let n = std::io::stdin()
        .read_line(&mut line)
        .into_diagnostic()
        .wrap_err("reading stdin")?;
    if n == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn check_embedding_key(config: &ChorusConfig) -> Result<()> {
    if config.embedding.api_key.is_none() && std::env::var("OPENAI_API_KEY").is_err() {
        miette::bail!(miette::miette!(
            help = "Set OPENAI_API_KEY or add api_key in your .chorus.toml under [embedding]",
            "No API key configured for embedding provider '{}'",
            config.embedding.provider
        ));
    }
    Ok(())
}

fn check_index_key(config: &ChorusConfig) -> Result<()> {
    if config.index.api_key.is_none() && std::env::var("PINECONE_API_KEY").is_err() {
        miette::bail!(miette::miette!(
            help = "Set PINECONE_API_KEY or add api_key in your .chorus.toml under [index]",
            "No API key configured for the vector index"
        ));
    }
    Ok(())
}

fn check_llm_key(config: &ChorusConfig) -> Result<()> {
    if config.llm.api_key.is_none() && std::env::var("OPENAI_API_KEY").is_err() {
        miette::bail!(miette::miette!(
            help = "Set OPENAI_API_KEY or add api_key in your .chorus.toml under [llm]",
            "No API key configured for LLM provider '{}'",
            config.llm.provider
        ));
    }
    Ok(())
}

/// Build the retrieval service with a resolved index host.
async fn build_retriever(config: &ChorusConfig) -> Result<Retriever> {
    check_embedding_key(config)?;
    check_index_key(config)?;

    let embedding = EmbeddingClient::with_config(&config.embedding).into_diagnostic()?;
    let mut store =
        VectorStore::with_config(&config.index, config.embedding.dimensions).into_diagnostic()?;
    store.ensure_index().await.into_diagnostic()?;
    Ok(Retriever::new(
        embedding,
        store,
        config.index.max_metadata_chars,
    ))
}

fn make_spinner(message: &'static str) -> Option<indicatif::ProgressBar> {
    if !std::io::stderr().is_terminal() {
        return None;
    }
    let pb = indicatif::ProgressBar::new_spinner();
    pb.set_style(
        indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})").unwrap(),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(120));
    Some(pb)
}

async fn run_ingest(
    config: &ChorusConfig,
    file: &Option<PathBuf>,
    format: OutputFormat,
    verbose: bool,
) -> Result<Retriever> {
    let code = read_source_input(file, config)?;
    let chunks = split_lines(&code, config.chunking.max_chunk_size);
    if verbose {
        eprintln!("split source into {} chunks", chunks.len());
    }

    let retriever = build_retriever(config).await?;
    eprintln!(
        "Ingesting {} chunks into index '{}' ...",
        chunks.len(),
        retriever.store().index_name(),
    );
    let stats = retriever.ingest(&chunks).await.into_diagnostic()?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats).into_diagnostic()?);
        }
        OutputFormat::Text => {
            eprintln!("Ingested {} chunks ({} failed)", stats.upserted, stats.failed);
        }
    }

    Ok(retriever)
}

async fn run_ask(
    config: &ChorusConfig,
    retriever: &Retriever,
    query: &str,
    out: &Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    check_llm_key(config)?;
    let llm = chorus_answer::llm::LlmClient::new(&config.llm).into_diagnostic()?;

    let matches = retriever
        .retrieve(query, config.index.top_k)
        .await
        .into_diagnostic()?;

    let spinner = make_spinner("Generating answer...");
    let answer = match chorus_answer::generate::answer(&llm, query, &matches).await {
        Ok(answer) => {
            if let Some(pb) = spinner {
                pb.finish_with_message("Done");
            }
            answer
        }
        Err(ChorusError::NoContext) => {
            if let Some(pb) = spinner {
                pb.finish_with_message("No context");
            }
            miette::bail!(miette::miette!(
                help = "Ingest code first with 'chorus ingest', or rephrase the question",
                "No relevant code snippets retrieved for the query"
            ));
        }
        Err(e) => {
            if let Some(pb) = spinner {
                pb.finish_with_message("Failed");
            }
            return Err(e).into_diagnostic();
        }
    };

    let artifact_path = out
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.pipeline.artifact_path));
    chorus_answer::artifact::write_artifact(&answer, &artifact_path).into_diagnostic()?;
    eprintln!("Wrote answer to {}", artifact_path.display());

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "query": answer.query,
                    "text": answer.text,
                    "artifact": artifact_path,
                }))
                .into_diagnostic()?
            );
        }
        OutputFormat::Text => {
            println!("{}", answer.to_markdown());
        }
    }

    Ok(())
}

async fn run_chat(config: &ChorusConfig) -> Result<()> {
    check_llm_key(config)?;
    let retriever = build_retriever(config).await?;
    let llm = chorus_answer::llm::LlmClient::new(&config.llm).into_diagnostic()?;

    loop {
        let Some(prompt) = prompt_line("Enter your custom prompt (or 'exit' to quit): ")? else {
            break;
        };
        if prompt.eq_ignore_ascii_case("exit") {
            break;
        }
        if prompt.is_empty() {
            continue;
        }

        let matches = match retriever.retrieve(&prompt, config.index.top_k).await {
            Ok(matches) => matches,
            Err(e) => {
                eprintln!("error: retrieval failed: {e}");
                continue;
            }
        };

        let chunks: Vec<String> = matches.into_iter().filter_map(|m| m.code).collect();
        if chunks.is_empty() {
            println!("No relevant code snippets retrieved.");
            continue;
        }

        let sections = chorus_answer::generate::explain_chunks(&llm, &chunks).await;
        if sections.is_empty() {
            eprintln!("error: no chunk could be analyzed this round");
            continue;
        }
        for section in sections {
            println!("{section}");
        }
    }

    Ok(())
}

#[derive(serde::Serialize)]
struct CheckResult {
    name: &'static str,
    status: &'static str,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

impl CheckResult {
    fn pass(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: "pass",
            detail: detail.into(),
            hint: None,
        }
    }

    fn fail(name: &'static str, detail: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            name,
            status: "fail",
            detail: detail.into(),
            hint: Some(hint.into()),
        }
    }

    fn info(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: "info",
            detail: detail.into(),
            hint: None,
        }
    }

    fn symbol(&self) -> &'static str {
        match self.status {
            "pass" => "\u{2713}",
            "fail" => "\u{2717}",
            _ => "~",
        }
    }

    fn colored_symbol(&self) -> String {
        match self.status {
            "pass" => "\x1b[32m\u{2713}\x1b[0m".into(),
            "fail" => "\x1b[31m\u{2717}\x1b[0m".into(),
            _ => "\x1b[33m~\x1b[0m".into(),
        }
    }
}

fn run_doctor(config: &ChorusConfig, format: OutputFormat, use_color: bool) -> Result<()> {
    let mut checks: Vec<CheckResult> = Vec::new();

    // 1. Config file
    let config_path = std::path::Path::new(".chorus.toml");
    if config_path.exists() {
        checks.push(CheckResult::pass("config_file", ".chorus.toml found"));
    } else {
        checks.push(CheckResult::fail(
            "config_file",
            ".chorus.toml not found",
            "run 'chorus init' to create a default config",
        ));
    }

    // 2. Embedding provider + API key
    checks.push(CheckResult::pass(
        "embedding_provider",
        format!(
            "{} (model: {}, {} dims)",
            config.embedding.provider, config.embedding.model, config.embedding.dimensions
        ),
    ));
    if config.embedding.api_key.is_some() || std::env::var("OPENAI_API_KEY").is_ok() {
        checks.push(CheckResult::pass("embedding_api_key", "OPENAI_API_KEY set"));
    } else {
        checks.push(CheckResult::fail(
            "embedding_api_key",
            "OPENAI_API_KEY not set",
            "export OPENAI_API_KEY=... or set api_key in .chorus.toml [embedding]",
        ));
    }

    // 3. Vector index + API key
    checks.push(CheckResult::pass(
        "vector_index",
        format!(
            "{} ({}, {}/{})",
            config.index.name, config.index.metric, config.index.cloud, config.index.region
        ),
    ));
    if config.index.api_key.is_some() || std::env::var("PINECONE_API_KEY").is_ok() {
        checks.push(CheckResult::pass("index_api_key", "PINECONE_API_KEY set"));
    } else {
        checks.push(CheckResult::fail(
            "index_api_key",
            "PINECONE_API_KEY not set",
            "export PINECONE_API_KEY=... or set api_key in .chorus.toml [index]",
        ));
    }

    // 4. LLM provider + API key
    checks.push(CheckResult::pass(
        "llm_provider",
        format!("{} (model: {})", config.llm.provider, config.llm.model),
    ));
    if config.llm.api_key.is_some() || std::env::var("OPENAI_API_KEY").is_ok() {
        checks.push(CheckResult::pass("llm_api_key", "OPENAI_API_KEY set"));
    } else {
        checks.push(CheckResult::fail(
            "llm_api_key",
            "OPENAI_API_KEY not set",
            "export OPENAI_API_KEY=... or set api_key in .chorus.toml [llm]",
        ));
    }

    // 5. Source file
    let source_path = std::path::Path::new(&config.pipeline.source_path);
    if source_path.exists() {
        let size = std::fs::metadata(source_path).map(|m| m.len()).unwrap_or(0);
        checks.push(CheckResult::pass(
            "source_file",
            format!("{} ({size} bytes)", source_path.display()),
        ));
    } else {
        checks.push(CheckResult::info(
            "source_file",
            format!(
                "{} not found (pass --file to ingest/run)",
                source_path.display()
            ),
        ));
    }

    // Output
    match format {
        OutputFormat::Json => {
            let version = env!("CARGO_PKG_VERSION");
            let json = serde_json::json!({
                "version": version,
                "checks": checks,
            });
            println!("{}", serde_json::to_string_pretty(&json).into_diagnostic()?);
        }
        OutputFormat::Text => {
            let version = env!("CARGO_PKG_VERSION");
            println!("Chorus v{version} — Environment Check\n");

            for check in &checks {
                let sym = if use_color {
                    check.colored_symbol()
                } else {
                    check.symbol().to_string()
                };
                let label = check.name.replace('_', " ");
                println!("  {sym} {label:<20} {}", check.detail);
                if let Some(hint) = &check.hint {
                    println!("    hint: {hint}");
                }
            }

            let passed = checks.iter().filter(|c| c.status == "pass").count();
            let failed = checks.iter().filter(|c| c.status == "fail").count();
            let info = checks.iter().filter(|c| c.status == "info").count();
            println!("\n{passed} checks passed, {failed} failed, {info} info");
        }
    }

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# Chorus Configuration

[embedding]
# provider = "openai"
# model = "text-embedding-3-small"
# dimensions = 1536
# max_input_chars = 4000
# api_key = "sk-..."

[index]
# name = "code-embeddings"
# metric = "euclidean"
# cloud = "aws"
# region = "us-east-1"
# top_k = 5
# max_metadata_chars = 4000
# api_key = "pcsk-..."

[chunking]
# max_chunk_size = 500

[llm]
# provider = "openai"
# model = "gpt-4o-mini"
# max_tokens = 16000

[pipeline]
# source_path = "processed_code_output.txt"
# artifact_path = "gpt_response.md"
"#;

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ChorusConfig::from_file(path).into_diagnostic()?,
        None => {
            let default_path = std::path::Path::new(".chorus.toml");
            if default_path.exists() {
                ChorusConfig::from_file(default_path).into_diagnostic()?
            } else {
                ChorusConfig::default()
            }
        }
    };

    let use_color = match cli.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    };

    if cli.verbose {
        eprintln!("format: {}", cli.format);
        eprintln!(
            "embedding: {} ({} dims), index: {}, llm: {}",
            config.embedding.model, config.embedding.dimensions, config.index.name, config.llm.model,
        );
    }

    match cli.command {
        None => {
            print_welcome(use_color);
            return Ok(());
        }
        Some(Command::Run { ref file, ref out }) => {
            let retriever = run_ingest(&config, file, cli.format, cli.verbose).await?;
            let Some(query) = prompt_line("Enter your prompt: ")? else {
                miette::bail!("No prompt provided");
            };
            if query.is_empty() {
                miette::bail!("No prompt provided");
            }
            run_ask(&config, &retriever, &query, out, cli.format).await?;
        }
        Some(Command::Ingest { ref file }) => {
            run_ingest(&config, file, cli.format, cli.verbose).await?;
        }
        Some(Command::Ask { ref query, ref out }) => {
            let retriever = build_retriever(&config).await?;
            run_ask(&config, &retriever, query, out, cli.format).await?;
        }
        Some(Command::Chat) => {
            run_chat(&config).await?;
        }
        Some(Command::Init) => {
            let path = std::path::Path::new(".chorus.toml");
            if path.exists() {
                miette::bail!(".chorus.toml already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created .chorus.toml with default configuration");
        }
        Some(Command::Doctor) => {
            run_doctor(&config, cli.format, use_color)?;
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "chorus", &mut std::io::stdout());
        }
    }

    Ok(())
}
