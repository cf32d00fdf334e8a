//! CLI entry point for wayko

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wayko_site::blog::FilterState;
use wayko_site::commands;
use wayko_site::Site;

#[derive(Parser)]
#[command(name = "wayko")]
#[command(author = "Franck Chevalier")]
#[command(version)]
#[command(about = "Static site generator for the Wayko security blog", long_about = None)]
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

    /// Create a new post or page
    New {
        /// Layout to use (post, draft, page)
        #[arg(short, long, default_value = "post")]
        layout: String,

        /// Title of the new post
        title: String,

        /// File name, relative to the collection (defaults to the slugified title)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Generate static files
    #[command(alias = "g")]
    Generate {
        /// Watch for file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Start a local server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Enable static mode (no file watching)
        #[arg(long)]
        r#static: bool,
    },

    /// Clean the public folder
    Clean,

    /// List site information
    List {
        /// Type of content to list (post, page, tag)
        #[arg(default_value = "post")]
        r#type: String,

        /// Only posts carrying this tag
        #[arg(short, long)]
        tag: Option<String>,

        /// Only posts whose title or description contains this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show one post by slug path
    Show {
        /// Slug path, e.g. `ctf/heap-overflow`
        slug: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "wayko_site=debug,info"
    } else {
        "wayko_site=info"
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
            commands::init::init_site(&target_dir)?;
            println!("Initialized site in {:?}", target_dir);
        }

        Commands::New {
            layout,
            title,
            path,
        } => {
            let site = Site::new(&base_dir)?;
            tracing::info!("Creating new {} with title: {}", layout, title);
            commands::new::create_post(&site, &title, &layout, path.as_deref())?;
        }

        Commands::Generate { watch } => {
            let site = Site::new(&base_dir)?;
            tracing::info!("Generating static files...");

            site.generate()?;
            println!("Generated successfully!");

            if watch {
                commands::generate::watch(&site)?;
            }
        }

        Commands::Server {
            port,
            ip,
            open,
            r#static,
        } => {
            let site = Site::new(&base_dir)?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            wayko_site::server::start(&site, &ip, port, !r#static, open).await?;
        }

        Commands::Clean => {
            let site = Site::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            site.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List {
            r#type,
            tag,
            search,
        } => {
            let site = Site::new(&base_dir)?;
            let mut filter = FilterState::from_query(tag.as_deref());
            if let Some(query) = search.as_deref() {
                filter.set_query(query);
            }
            commands::list::run(&site, &r#type, &filter)?;
        }

        Commands::Show { slug } => {
            let site = Site::new(&base_dir)?;
            commands::show::run(&site, &slug)?;
        }

        Commands::Version => {
            println!("wayko version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
