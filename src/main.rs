use lawbot::cli::{Cli, Commands, ConfigAction};
use lawbot::config::Config;
use lawbot::error::{LawbotError, Result};
use lawbot::generation::ConversationTurn;
use lawbot::service::RagService;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse_args();

    match cli.command {
        Commands::Ask { question, json } => {
            cmd_ask(cli.config, &question, json).await?;
        }
        Commands::Chat => {
            cmd_chat(cli.config).await?;
        }
        Commands::Status => {
            cmd_status(cli.config)?;
        }
        Commands::Config { action } => {
            cmd_config(cli.config, action)?;
        }
    }

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lawbot=info"));

    fmt().with_env_filter(filter).with_target(false).init();
}

async fn load_service(config_path: Option<std::path::PathBuf>) -> Result<RagService> {
    let config = load_config(config_path)?;
    let service = RagService::new(config);

    tracing::info!("Loading pipeline, this may take a while on first run...");
    if let Err(e) = service.load().await {
        // the service stays NotReady; surface the cause to the operator
        tracing::error!("Failed to load RAG pipeline: {}", e);
    }
    Ok(service)
}

async fn cmd_ask(config_path: Option<std::path::PathBuf>, question: &str, json: bool) -> Result<()> {
    let service = load_service(config_path).await?;
    let response = service.ask(question, &[]).await;

    if json {
        let rendered = serde_json::to_string_pretty(&response).map_err(|e| LawbotError::Json {
            source: e,
            context: "Failed to serialize response".to_string(),
        })?;
        println!("{}", rendered);
        return Ok(());
    }

    println!("{}", response.answer);
    if !response.sources.is_empty() {
        println!("\nNguồn trích dẫn:");
        for source in &response.sources {
            println!("  - {}", source.citation());
        }
    }
    Ok(())
}

async fn cmd_chat(config_path: Option<std::path::PathBuf>) -> Result<()> {
    let service = load_service(config_path).await?;
    let mut history: Vec<ConversationTurn> = Vec::new();

    println!("Lawbot - hỏi đáp Luật Giao thông đường bộ (gõ 'exit' để thoát)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"\n> ").await.map_err(|e| LawbotError::Io {
            source: e,
            context: "Failed to write prompt".to_string(),
        })?;
        stdout.flush().await.map_err(|e| LawbotError::Io {
            source: e,
            context: "Failed to flush stdout".to_string(),
        })?;

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                return Err(LawbotError::Io {
                    source: e,
                    context: "Failed to read question".to_string(),
                })
            }
        };

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            break;
        }

        let response = service.ask(question, &history).await;
        println!("{}", response.answer);
        for source in &response.sources {
            println!("  [{}]", source.citation());
        }

        // chat history lives only for this process; session persistence
        // belongs to the serving layer
        history.push(ConversationTurn::new(question, response.answer.clone()));
    }

    Ok(())
}

fn cmd_status(config_path: Option<std::path::PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;

    println!("Lawbot Status");
    println!("=============");
    println!("\nEmbedding model: {}", config.embedding.model);
    println!("Reranker model:  {}", config.reranker.model);
    println!("Generation:      {} via {}", config.generation.model, config.generation.base_url);

    let passages_path = config.storage.passages_path();
    if passages_path.exists() {
        match lawbot::corpus::PassageStore::load(&passages_path) {
            Ok(store) => println!("\nPassage data:    {} passages ({:?})", store.len(), passages_path),
            Err(e) => println!("\nPassage data:    INVALID ({})", e),
        }
    } else {
        println!("\nPassage data:    MISSING ({:?})", passages_path);
        println!("Run the ingestion job to produce the passage collection.");
    }

    let embeddings_path = config.storage.embeddings_path();
    if embeddings_path.exists() {
        println!("Embedding cache: present ({:?})", embeddings_path);
    } else {
        println!("Embedding cache: absent (will be built on next load)");
    }

    let api_key_set = std::env::var(&config.generation.api_key_env).is_ok();
    println!(
        "API key ({}): {}",
        config.generation.api_key_env,
        if api_key_set { "set" } else { "NOT SET" }
    );

    Ok(())
}

fn cmd_config(config_path: Option<std::path::PathBuf>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(config_path)?;
            let json = serde_json::to_string_pretty(&config).map_err(|e| LawbotError::Json {
                source: e,
                context: "Failed to serialize config".to_string(),
            })?;
            println!("{}", json);
        }
        ConfigAction::Validate { file } => {
            let path = match file {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let config = Config::load(&path)?;
            println!("✓ Configuration is valid");
            println!("  Schema version: {}", config.meta.schema_version);
        }
        ConfigAction::Init { force } => {
            let path = Config::default_path()?;

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| LawbotError::Io {
                    source: e,
                    context: format!("Failed to create config directory: {:?}", parent),
                })?;
            }

            let config = Config::default();
            config.save(&path)?;
            println!("✓ Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn load_config(config_path: Option<std::path::PathBuf>) -> Result<Config> {
    let path = match config_path {
        Some(path) => path,
        None => Config::default_path()?,
    };

    if !path.exists() {
        tracing::warn!(
            "Config file not found, using defaults. Run 'lawbot config init' to create one."
        );
        return Ok(Config::default());
    }

    Config::load(&path)
}
