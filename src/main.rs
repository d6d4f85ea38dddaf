//! CLI entry point for inkpost

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inkpost::commands::submit::SubmitArgs;
use inkpost::page::MergeStrategy;

#[derive(Parser)]
#[command(name = "inkpost")]
#[command(author = "Yukang Chen")]
#[command(version)]
#[command(about = "A server-rendered blog front-end with moderated comments", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Start the server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to (defaults to server.ip)
        #[arg(short, long)]
        ip: Option<String>,

        /// Render pages on first request instead of at startup
        #[arg(long)]
        lazy: bool,
    },

    /// List articles
    List,

    /// List approved comments of an article
    Comments {
        /// Article id
        post_id: String,
    },

    /// Submit a comment to a running server and show the reconciled thread
    Submit {
        /// Base URL of the running site (defaults to url)
        #[arg(long)]
        server: Option<String>,

        /// Article id
        #[arg(long)]
        post_id: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        /// Comment text
        #[arg(long)]
        comment: String,

        /// Merge strategy (defaults to comments.merge_strategy)
        #[arg(long, value_enum)]
        strategy: Option<MergeStrategy>,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "inkpost=debug,tower_http=debug,info"
    } else {
        "inkpost=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            inkpost::commands::init::init_site(&target_dir)?;
            println!("Initialized site in {:?}", target_dir);
        }

        Commands::Serve { port, ip, lazy } => {
            let blog = inkpost::Blog::new(&base_dir)?;
            let ip = ip.unwrap_or_else(|| blog.config.server.ip.clone());
            let port = port.unwrap_or(blog.config.server.port);

            tracing::info!("Starting server at http://{}:{}", ip, port);
            inkpost::server::start(&blog, &ip, port, !lazy).await?;
        }

        Commands::List => {
            let blog = inkpost::Blog::new(&base_dir)?;
            inkpost::commands::list::articles(&blog).await?;
        }

        Commands::Comments { post_id } => {
            let blog = inkpost::Blog::new(&base_dir)?;
            inkpost::commands::list::comments(&blog, &post_id).await?;
        }

        Commands::Submit {
            server,
            post_id,
            name,
            email,
            comment,
            strategy,
        } => {
            let blog = inkpost::Blog::new(&base_dir)?;
            let server = server.unwrap_or_else(|| blog.config.url.clone());
            inkpost::commands::submit::run(SubmitArgs {
                server: &server,
                post_id: &post_id,
                name: &name,
                email: &email,
                comment: &comment,
                strategy: strategy.unwrap_or(blog.config.comments.merge_strategy),
            })
            .await?;
        }

        Commands::Version => {
            println!("inkpost version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
