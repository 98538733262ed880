//! Meat Shop CLI - catalog, cart, checkout and product management.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! meatshop products list --category Beef
//!
//! # Fill the local cart and place an order
//! meatshop cart add 12 --qty 2
//! meatshop checkout submit --name "Ivan" --email ivan@example.ru --phone 89001234567
//!
//! # Manage products
//! meatshop admin create --file ribeye.yaml --image ribeye.jpg
//! ```
//!
//! # Commands
//!
//! - `products` - Browse the catalog
//! - `cart` - Inspect and change the local cart
//! - `checkout` - Preview and submit the order
//! - `admin` - Create, update, delete and list products

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use meatshop_core::ProductId;
use meatshop_storefront::StorefrontConfig;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "meatshop")]
#[command(author, version, about = "Meat Shop command-line client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Inspect and change the local cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Preview and submit the order
    Checkout {
        #[command(subcommand)]
        action: CheckoutAction,
    },
    /// Manage products
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products, optionally of one category
    List {
        /// Category name, or `all`
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show one product
    Show { id: ProductId },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add a product
    Add {
        id: ProductId,
        /// Units to add
        #[arg(short, long, default_value = "1")]
        qty: String,
    },
    /// Add one unit
    Inc { id: ProductId },
    /// Remove one unit, dropping the product at zero
    Dec { id: ProductId },
    /// Set the quantity
    Set { id: ProductId, value: String },
    /// Remove a product
    Remove { id: ProductId },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum CheckoutAction {
    /// Show item count and total
    Preview,
    /// Place the order
    Submit {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        phone: String,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// List products as the admin table shows them
    List {
        /// Search in name, article and description
        #[arg(short, long)]
        search: Option<String>,
        /// Category name, or `all`
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show one product, deleted or not
    Show { id: ProductId },
    /// Create a product from a YAML or JSON draft
    Create {
        #[arg(short, long)]
        file: PathBuf,
        /// Image to upload after saving
        #[arg(short, long)]
        image: Option<PathBuf>,
    },
    /// Update a product from a YAML or JSON draft
    Update {
        id: ProductId,
        #[arg(short, long)]
        file: PathBuf,
        /// Image to upload after saving
        #[arg(short, long)]
        image: Option<PathBuf>,
    },
    /// Delete a product
    Delete { id: ProductId },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::debug!("Sentry initialized");
    Some(guard)
}

/// Field set on log lines for errors already sent with `sentry::capture_error`.
const CAPTURED_EVENT_FIELD: &str = "sentry_event_id";

/// Filter tracing events to Sentry event types.
///
/// Only errors become events. Backend rejections are logged at `warn` and
/// stay breadcrumbs, and an error that was already captured is not sent twice.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR if metadata.fields().field(CAPTURED_EVENT_FIELD).is_none() => {
            sentry_tracing::EventFilter::Event
        }
        tracing::Level::ERROR
        | tracing::Level::WARN
        | tracing::Level::INFO
        | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        tracing::Level::TRACE => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "meatshop=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };
    let _sentry_guard = init_sentry(&config);

    if let Err(e) = run(cli, &config).await {
        e.report();
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &StorefrontConfig) -> Result<(), CommandError> {
    match cli.command {
        Commands::Products { action } => match action {
            ProductsAction::List { category } => {
                commands::products::list(config, category).await?;
            }
            ProductsAction::Show { id } => commands::products::show(config, id).await?,
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(config),
            CartAction::Add { id, qty } => commands::cart::add(config, id, &qty).await?,
            CartAction::Inc { id } => commands::cart::increment(config, id)?,
            CartAction::Dec { id } => commands::cart::decrement(config, id)?,
            CartAction::Set { id, value } => commands::cart::set(config, id, &value)?,
            CartAction::Remove { id } => commands::cart::remove(config, id)?,
            CartAction::Clear => commands::cart::clear(config)?,
        },
        Commands::Checkout { action } => match action {
            CheckoutAction::Preview => commands::checkout::preview(config),
            CheckoutAction::Submit { name, email, phone } => {
                commands::checkout::submit(config, name, email, phone).await?;
            }
        },
        Commands::Admin { action } => {
            let admin = commands::admin::Admin::from_env()?;
            match action {
                AdminAction::List { search, category } => {
                    admin.list(search.as_deref(), category.as_deref()).await?;
                }
                AdminAction::Show { id } => admin.show(id).await?,
                AdminAction::Create { file, image } => {
                    admin.save(None, &file, image.as_deref()).await?;
                }
                AdminAction::Update { id, file, image } => {
                    admin.save(Some(id), &file, image.as_deref()).await?;
                }
                AdminAction::Delete { id } => admin.delete(id).await?,
            }
        }
    }
    Ok(())
}
