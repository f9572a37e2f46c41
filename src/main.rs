use anyhow::{Context, Result};
use borealis_mcp::config::{find_config_file, load_config, Config, Transport};
use borealis_mcp::dataverse::{institutions, DataverseClient};
use borealis_mcp::mcp::gateway::{self, TokenAuth};
use borealis_mcp::mcp::server::McpServer;
use borealis_mcp::models::{ItemType, SearchRequest, SortMode, DEFAULT_FILE_LIMIT};
use borealis_mcp::operations;
use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Borealis MCP - Search and read research data from the Borealis Dataverse
#[derive(Parser, Debug)]
#[command(name = "borealis-mcp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "MCP server and CLI for the Borealis Dataverse research data repository", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Show all environment variables
    #[arg(long, global = true)]
    env: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Sort order for search results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SortField {
    /// Server-side relevance ranking
    Relevance,
    /// Newest first
    Date,
    /// Alphabetical
    Name,
}

impl From<SortField> for SortMode {
    fn from(field: SortField) -> Self {
        match field {
            SortField::Relevance => SortMode::Relevance,
            SortField::Date => SortMode::Date,
            SortField::Name => SortMode::Name,
        }
    }
}

/// Kind of search result
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Kind {
    Dataset,
    Dataverse,
    File,
}

impl From<Kind> for ItemType {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Dataset => ItemType::Dataset,
            Kind::Dataverse => ItemType::Dataverse,
            Kind::File => ItemType::File,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search datasets, dataverses and files
    #[command(alias = "s")]
    Search {
        /// Search query string ('*' for everything)
        query: String,

        /// Number of results (1-100)
        #[arg(long, short = 'n', default_value_t = 10)]
        per_page: usize,

        /// Sort order
        #[arg(long, value_enum, default_value_t = SortField::Relevance)]
        sort: SortField,

        /// Restrict to one kind of item
        #[arg(long = "type", short = 't', value_enum)]
        kind: Option<Kind>,

        /// Institution or dataverse to search within
        #[arg(long, short = 'd')]
        dataverse: Option<String>,

        /// Geographic coverage: country
        #[arg(long)]
        country: Option<String>,

        /// Geographic coverage: province or state
        #[arg(long)]
        province: Option<String>,

        /// Geographic coverage: city
        #[arg(long)]
        city: Option<String>,
    },

    /// Show detailed metadata for a dataset
    #[command(alias = "m")]
    Metadata {
        /// DOI (doi:..., https://doi.org/...) or numeric dataset id
        identifier: String,
    },

    /// List the files in a dataset
    #[command(alias = "ls")]
    Files {
        /// DOI or numeric dataset id
        identifier: String,

        /// Maximum number of files to list
        #[arg(long, short = 'l', default_value_t = DEFAULT_FILE_LIMIT)]
        limit: u64,

        /// Number of files to skip
        #[arg(long, default_value_t = 0)]
        offset: u64,

        /// Filter by filename or file type substring
        #[arg(long, short = 'f')]
        file_type: Option<String>,
    },

    /// Show the content of a text data file
    File {
        /// Numeric file id from `files`
        file_id: String,

        /// Filename, used to reject binary formats
        #[arg(long, default_value = "file")]
        filename: String,
    },

    /// List known institution names and their dataverse ids
    Institutions {
        /// Only show entries containing this text
        filter: Option<String>,
    },

    /// Run the MCP server (the default when no command is given)
    Serve {
        /// Use the stdio transport
        #[arg(long, conflicts_with = "http")]
        stdio: bool,

        /// Use the streamable HTTP transport
        #[arg(long)]
        http: bool,

        /// HTTP bind address (overrides HOST)
        #[arg(long)]
        host: Option<String>,

        /// HTTP port (overrides PORT)
        #[arg(long, short)]
        port: Option<u16>,
    },
}

/// Print all available environment variables
fn print_env_vars() {
    println!("Borealis MCP - Environment Variables");
    println!();
    println!("Dataverse:");
    println!("  BOREALIS_API_KEY            API token sent as X-Dataverse-key (ignored if 10 characters or fewer)");
    println!("  BOREALIS__DATAVERSE__BASE_URL      API root (default: https://borealisdata.ca/api)");
    println!("  BOREALIS__DATAVERSE__TIMEOUT_SECS  Request timeout in seconds (default: 30)");
    println!();
    println!("Server:");
    println!("  MCP_TRANSPORT               stdio, http or auto (default: auto)");
    println!("  HOST                        HTTP bind address (default: 0.0.0.0)");
    println!("  PORT                        HTTP port (default: 8000)");
    println!("  AUTH_TOKENS                 Comma-separated bearer tokens for HTTP mode");
    println!();
    println!("Other Settings:");
    println!("  BOREALIS__LOGGING__LEVEL    Default log level (default: info)");
    println!("  RUST_LOG                    Rust logging filter (overrides everything else)");
    println!();
    println!("Example:");
    println!("  export BOREALIS_API_KEY=\"xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx\"");
    println!("  export AUTH_TOKENS=\"token-one,token-two\"");
    std::process::exit(0);
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.env {
        print_env_vars();
    }

    let config_path = cli.config.clone().or_else(find_config_file);
    let config = load_config(config_path.as_deref()).context("Failed to load configuration")?;

    init_tracing(&cli, &config);
    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    let client = Arc::new(DataverseClient::new(&config.dataverse)?);
    tracing::debug!(
        "Dataverse API at {} ({})",
        client.api_root(),
        if client.is_authenticated() {
            "authenticated"
        } else {
            "anonymous"
        }
    );

    match cli.command {
        Some(Commands::Search {
            query,
            per_page,
            sort,
            kind,
            dataverse,
            country,
            province,
            city,
        }) => {
            let mut request = SearchRequest::new(query)
                .per_page(per_page)
                .sort(sort.into());
            if let Some(kind) = kind {
                request = request.item_type(kind.into());
            }
            if let Some(dataverse) = dataverse {
                request = request.subtree(institutions::resolve(&dataverse));
            }
            if let Some(country) = country {
                request = request.country(country);
            }
            if let Some(province) = province {
                request = request.province(province);
            }
            if let Some(city) = city {
                request = request.city(city);
            }
            println!("{}", operations::search_datasets(&client, &request).await);
        }

        Some(Commands::Metadata { identifier }) => {
            println!(
                "{}",
                operations::get_dataset_metadata(&client, &identifier).await
            );
        }

        Some(Commands::Files {
            identifier,
            limit,
            offset,
            file_type,
        }) => {
            let text = operations::list_dataset_files(
                &client,
                &identifier,
                limit.max(1),
                offset,
                file_type.as_deref(),
            )
            .await;
            println!("{}", text);
        }

        Some(Commands::File { file_id, filename }) => {
            println!(
                "{}",
                operations::get_dataset_file(&client, &file_id, &filename).await
            );
        }

        Some(Commands::Institutions { filter }) => {
            let filter = filter.map(|f| f.to_lowercase());
            for (id, aliases) in institutions::all() {
                let matches = filter
                    .as_deref()
                    .map_or(true, |f| id.contains(f) || aliases.iter().any(|a| a.contains(f)));
                if matches {
                    println!("{:<16} {}", id, aliases.join(", "));
                }
            }
        }

        Some(Commands::Serve {
            stdio,
            http,
            host,
            port,
        }) => {
            let transport = if http {
                Transport::Http
            } else if stdio {
                Transport::Stdio
            } else {
                config.server.transport
            };
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            serve(client, &config, transport, &host, port).await?;
        }

        None => {
            let host = config.server.host.clone();
            serve(
                client,
                &config,
                config.server.transport,
                &host,
                config.server.port,
            )
            .await?;
        }
    }

    Ok(())
}

/// Logs go to stderr so the stdio transport keeps stdout to itself
fn init_tracing(cli: &Cli, config: &Config) {
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => config.logging.level.as_str(),
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("borealis_mcp={}", level)),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(
            cli.log_json
                .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)),
        )
        .with(
            (!cli.log_json)
                .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        )
        .init();
}

/// Pick a concrete transport: piped stdin means an MCP client launched us
fn resolve_transport(transport: Transport, stdin_is_terminal: bool) -> Transport {
    match transport {
        Transport::Auto if stdin_is_terminal => Transport::Http,
        Transport::Auto => Transport::Stdio,
        other => other,
    }
}

async fn serve(
    client: Arc<DataverseClient>,
    config: &Config,
    transport: Transport,
    host: &str,
    port: u16,
) -> Result<()> {
    let server = McpServer::new(client)?;

    match resolve_transport(transport, std::io::stdin().is_terminal()) {
        Transport::Http => {
            let public: SocketAddr = format!("{}:{}", host, port)
                .parse()
                .with_context(|| format!("Invalid HTTP address {}:{}", host, port))?;

            let (inner, mcp_handle) = server.run_http("127.0.0.1:0").await?;
            let auth = TokenAuth::new(config.auth.token_set());
            let (bound, gateway_handle) =
                gateway::start(public, &format!("http://{}", inner), auth).await?;
            tracing::info!(
                "Borealis MCP server running in HTTP mode on {} (MCP endpoint {})",
                bound,
                gateway::MCP_PATH
            );

            gateway_handle
                .await
                .map_err(|e| anyhow::anyhow!("Gateway task failed: {}", e))?;
            mcp_handle.abort();
        }
        _ => {
            tracing::info!("Running MCP server in stdio mode");
            server.run().await?;
        }
    }

    Ok(())
}
