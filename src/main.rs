use clap::Parser;
use finterm_api::RestApi;
use finterm_core::OverlapPolicy;
use finterm_services::catalog::{DEFAULT_COLLECTION_NAME, DEFAULT_EMBEDDING_MODEL};
use finterm_services::config::{DEFAULT_EMBEDDING_URL, DEFAULT_NER_URL, DEFAULT_OLLAMA_URL, DEFAULT_OPENAI_URL};
use finterm_services::{EmbeddingProvider, ServiceConfig, Services};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn, Level};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Financial NLP service
#[derive(Parser, Debug)]
#[command(name = "finterm")]
#[command(about = "Financial entity recognition and term standardization service", long_about = None)]
struct Args {
    /// Address to bind the HTTP API to
    #[arg(long, env = "FINTERM_HOST", default_value = "127.0.0.1")]
    host: String,

    /// HTTP API port
    #[arg(long, env = "FINTERM_HTTP_PORT", default_value_t = 8000)]
    http_port: u16,

    /// Log level, overridden by RUST_LOG when set
    #[arg(long, env = "FINTERM_LOG", default_value = "info")]
    log_level: String,

    /// Token-classification endpoint
    #[arg(long, env = "FINTERM_NER_URL", default_value = DEFAULT_NER_URL)]
    ner_url: String,

    #[arg(long, env = "OLLAMA_HOST", default_value = DEFAULT_OLLAMA_URL)]
    ollama_url: String,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_OPENAI_URL)]
    openai_url: String,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// text-embeddings-inference endpoint
    #[arg(long, env = "FINTERM_EMBEDDING_URL", default_value = DEFAULT_EMBEDDING_URL)]
    embedding_url: String,

    /// huggingface, openai, bedrock or hashing
    #[arg(long, env = "FINTERM_EMBEDDING_PROVIDER", default_value = "huggingface")]
    embedding_provider: EmbeddingProvider,

    #[arg(long, env = "FINTERM_EMBEDDING_MODEL", default_value = DEFAULT_EMBEDDING_MODEL)]
    embedding_model: String,

    /// Header-less CSV of `term_name,term_type` rows to seed the term index from
    #[arg(long, env = "FINTERM_TERMS_FILE")]
    terms_file: Option<PathBuf>,

    #[arg(long, env = "FINTERM_COLLECTION", default_value = DEFAULT_COLLECTION_NAME)]
    collection_name: String,

    /// compatible keeps spans that start inside an accepted span but end after it; strict drops them
    #[arg(long, env = "FINTERM_OVERLAP_POLICY", default_value = "compatible")]
    overlap_policy: OverlapPolicy,

    /// Timeout for calls to the recognizer, embedding and LLM backends
    #[arg(long, env = "FINTERM_REQUEST_TIMEOUT", default_value_t = 60)]
    request_timeout_secs: u64,
}

impl Args {
    fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            ner_url: self.ner_url.clone(),
            ollama_url: self.ollama_url.clone(),
            openai_url: self.openai_url.clone(),
            openai_api_key: self.openai_api_key.clone(),
            embedding_url: self.embedding_url.clone(),
            embedding_provider: self.embedding_provider,
            embedding_model: self.embedding_model.clone(),
            terms_file: self.terms_file.clone(),
            collection_name: self.collection_name.clone(),
            overlap_policy: self.overlap_policy,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder();
    match EnvFilter::try_from_default_env() {
        Ok(filter) => builder.with_env_filter(filter).finish().try_init()?,
        Err(_) => builder.with_max_level(log_level).finish().try_init()?,
    }

    info!("Starting finterm v{}", env!("CARGO_PKG_VERSION"));
    info!("NER endpoint: {}", args.ner_url);
    info!("Embedding: {} ({})", args.embedding_model, args.embedding_provider.as_str());
    info!("Overlap policy: {:?}", args.overlap_policy);

    let services = Arc::new(Services::from_config(args.service_config())?);

    match services.seed_terms().await {
        Ok(Some(index)) => info!("Term index '{}' loaded with {} terms", index.name(), index.count()),
        Ok(None) => warn!("No terms file configured, /api/std answers 404 until an index is loaded"),
        Err(e) => error!("Failed to seed term index: {}", e),
    }

    let host = args.host.clone();
    let http_port = args.http_port;
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on {}:{}", host, http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(services, &host, http_port).await {
                error!("HTTP server error: {}", e);
            }
        })
    });

    info!("finterm started successfully");
    info!("HTTP API: http://{}:{}/", args.host, args.http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}
