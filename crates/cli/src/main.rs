//! RetroPost CLI - the postcard client.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! rp-cli templates --category priroda --search jezero
//!
//! # Render a postcard into ./out
//! rp-cli render --template 6 --text "Pozdrav s jezera" --message "Vidimo se!" --out out
//!
//! # Render and deliver a postcard
//! rp-cli send --template 1 --to ana@example.hr --to-name Ana --from Ivo -m "Pozdrav!"
//!
//! # Cart and checkout
//! rp-cli cart add --template 4 --render
//! rp-cli cart list
//! rp-cli checkout --name Ana --email ana@example.hr
//!
//! # Preferences
//! rp-cli prefs set --theme dark --language en
//! ```
//!
//! # Commands
//!
//! - `templates` - List the catalog
//! - `render` - Write the front and back faces to disk
//! - `send` - Render and deliver a postcard
//! - `contact` - Deliver a contact message
//! - `cart` - Manage the local cart
//! - `checkout` - Turn the cart into an order
//! - `orders` - Show order history
//! - `prefs` - Show or change theme and language
//!
//! Local state lives in `$RETROPOST_DATA_DIR/storage.json` (default
//! `.retropost/`). Delivery reads the server's environment variables.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use retropost_core::{Language, Template, Theme};
use retropost_server::dispatch::ContactRequest;

use commands::CustomizationArgs;
use store::LocalStore;

mod commands;
mod store;

#[derive(Parser)]
#[command(name = "rp-cli")]
#[command(author, version, about = "RetroPost postcard client")]
struct Cli {
    /// Language for messages and back-face labels (default: saved preference)
    #[arg(long, global = true)]
    language: Option<Language>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List postcard templates
    Templates {
        /// Category (`sve` for all)
        #[arg(short, long)]
        category: Option<String>,

        /// Search in names and descriptions
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Render a postcard to JPEG files
    Render {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        customization: CustomizationArgs,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
    /// Render and deliver a postcard
    Send {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        customization: CustomizationArgs,

        #[command(flatten)]
        addressing: AddressArgs,
    },
    /// Send a message to the RetroPost team
    Contact {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        subject: String,

        #[arg(long)]
        message: String,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order for everything in the cart
    Checkout {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        phone: Option<String>,
    },
    /// Order history
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Theme and language preferences
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Catalog template id
    #[arg(short, long)]
    template: Option<String>,

    /// Local JPEG or PNG to use instead of a template
    #[arg(short, long)]
    photo: Option<PathBuf>,
}

impl SourceArgs {
    fn resolve(&self) -> Result<Template, commands::postcard::SourceError> {
        commands::postcard::resolve(self.template.as_deref(), self.photo.as_deref())
    }
}

#[derive(clap::Args)]
struct AddressArgs {
    /// Recipient email
    #[arg(long)]
    to: String,

    /// Recipient name
    #[arg(long)]
    to_name: Option<String>,

    /// Your name
    #[arg(long)]
    from: String,
}

#[derive(Subcommand)]
enum CartAction {
    /// Add a postcard
    Add {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        customization: CustomizationArgs,

        /// Render the faces now and keep them with the item
        #[arg(long)]
        render: bool,
    },
    /// Show the cart
    List,
    /// Remove an item
    Remove { id: String },
    /// Set an item's quantity (0 removes it)
    Quantity { id: String, quantity: u32 },
    /// Empty the cart
    Clear,
    /// Show the cart total
    Total,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List orders
    List,
    /// Show one order
    Show { id: String },
}

#[derive(Subcommand)]
enum PrefsAction {
    /// Show preferences
    Show,
    /// Change preferences (language via the global `--language`)
    Set {
        #[arg(long)]
        theme: Option<Theme>,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout is for command output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> commands::CommandResult {
    let mut store = LocalStore::open(&LocalStore::data_dir());
    let requested_language = cli.language;
    let language = requested_language.unwrap_or(store.preferences().language);

    match cli.command {
        Commands::Templates { category, search } => {
            commands::templates::list(category.as_deref(), search.as_deref());
        }
        Commands::Render {
            source,
            customization,
            out,
        } => {
            let template = source.resolve()?;
            let customization = customization.into_customization();
            commands::postcard::render(&template, &customization, language, &out).await?;
        }
        Commands::Send {
            source,
            customization,
            addressing,
        } => {
            let template = source.resolve()?;
            let mut customization = customization.into_customization();
            customization.recipient_email = addressing.to;
            customization.recipient_name = addressing.to_name.unwrap_or_default();
            customization.sender_name = addressing.from;
            commands::postcard::send(&template, &customization, language).await?;
        }
        Commands::Contact {
            name,
            email,
            subject,
            message,
        } => {
            let request = ContactRequest {
                name,
                email,
                subject,
                message,
            };
            commands::contact::send(request, language).await?;
        }
        Commands::Cart { action } => match action {
            CartAction::Add {
                source,
                customization,
                render,
            } => {
                let template = source.resolve()?;
                let customization = customization.into_customization();
                let images = if render {
                    let pair =
                        commands::postcard::render_pair(&template, &customization, language).await?;
                    Some((pair.front, pair.back))
                } else {
                    None
                };
                commands::cart::add(&mut store, template, customization, images)?;
            }
            CartAction::List => commands::cart::list(&store, language),
            CartAction::Remove { id } => commands::cart::remove(&mut store, &id)?,
            CartAction::Quantity { id, quantity } => {
                commands::cart::quantity(&mut store, &id, quantity)?;
            }
            CartAction::Clear => commands::cart::clear(&mut store)?,
            CartAction::Total => commands::cart::total(&store),
        },
        Commands::Checkout { name, email, phone } => {
            commands::cart::checkout(&mut store, name, &email, phone, language)?;
        }
        Commands::Orders { action } => match action {
            OrdersAction::List => commands::cart::orders(&store),
            OrdersAction::Show { id } => commands::cart::show_order(&store, &id)?,
        },
        Commands::Prefs { action } => match action {
            PrefsAction::Show => commands::prefs::show(&store),
            PrefsAction::Set { theme } => {
                commands::prefs::set(&mut store, theme, requested_language)?;
            }
        },
    }
    Ok(())
}
