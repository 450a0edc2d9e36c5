use memroute::cli::{self, chat, init, output::Output, Cli, Commands};
use memroute::config::{LoggingConfig, MemrouteConfig};
use memroute::conversation::ConversationApp;
use memroute::llm::LLMClient;
use memroute::types::{AppError, Result};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = cli.output();

    if let Err(e) = run(cli, &output).await {
        output.error(&format!("Error: {}", e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &Output) -> Result<()> {
    // init doesn't need a configuration to exist
    if let Some(Commands::Init {
        path,
        force,
        provider,
    }) = &cli.command
    {
        let config = init::InitConfig {
            path: path.clone(),
            force: *force,
            provider: *provider,
        };
        return match init::run(config, output) {
            init::InitResult::Success | init::InitResult::AlreadyExists => Ok(()),
            init::InitResult::Error(e) => Err(AppError::Internal(e)),
        };
    }

    let config = MemrouteConfig::load_or_default(&cli.config)?;
    init_tracing(&config.logging, cli.verbose);

    match cli.command {
        Some(Commands::Config { validate }) => {
            if cli::show_config(&config, &cli.config, validate, output) {
                Ok(())
            } else {
                Err(AppError::Configuration(
                    "configuration validation failed".to_string(),
                ))
            }
        }
        Some(Commands::Ask {
            message,
            session,
            user,
        }) => {
            let app = build_app(&config, user).await?;
            chat::ask(&app, &session, &message, output).await?;
            Ok(())
        }
        Some(Commands::Chat { session, user }) => {
            let app = build_app(&config, user).await?;
            chat::run_chat(&app, &session, output).await
        }
        None => {
            let app = build_app(&config, None).await?;
            chat::run_chat(&app, cli::DEFAULT_SESSION, output).await
        }
        Some(Commands::Init { .. }) => Ok(()),
    }
}

async fn build_app(config: &MemrouteConfig, user: Option<String>) -> Result<ConversationApp> {
    let provider = config.provider()?;
    tracing::debug!(
        provider = provider.name(),
        model = provider.model(),
        "Creating LLM client"
    );
    let llm: Arc<dyn LLMClient> = Arc::from(provider.create_client().await?);

    ConversationApp::builder(llm)
        .namespace(config.memory.namespace.clone())
        .user_id(user.unwrap_or_else(|| config.memory.user_id.clone()))
        .recursion_limit(config.memory.recursion_limit)
        .build()
}

fn init_tracing(logging: &LoggingConfig, verbose: bool) {
    let default_level = if verbose {
        "memroute=debug".to_string()
    } else {
        logging.level.clone()
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Logs go to stderr so replies on stdout stay clean
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
