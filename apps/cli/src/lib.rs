//! # QuickCommerce CLI Library
//!
//! Argument parsing, startup and dispatch for the `quickcommerce` binary.
//!
//! ## Module Organization
//! ```text
//! quickcommerce_cli/
//! ├── lib.rs          ◄─── You are here (clap definitions, run)
//! ├── state/
//! │   ├── mod.rs      ◄─── AppState (cart store + backend)
//! │   └── config.rs   ◄─── AppConfig (env + defaults)
//! ├── commands/
//! │   ├── mod.rs      ◄─── Output, tables, argument parsers
//! │   ├── product.rs  ◄─── products list/show/search/categories
//! │   ├── cart.rs     ◄─── cart show/add/remove/set/clear
//! │   ├── checkout.rs ◄─── checkout
//! │   └── admin.rs    ◄─── admin dashboard, products, orders, reset
//! └── error.rs        ◄─── CliError with codes and hints
//! ```
//!
//! ## Usage
//! ```bash
//! quickcommerce products list --category Clothing --sort price-low
//! quickcommerce cart add 1 --quantity 2 --variant "Size=M,Color=Black"
//! quickcommerce checkout --first-name Ana --last-name Lopez \
//!     --email ana@example.com --phone 555-123-4567 \
//!     --address "1 Market St" --city "San Francisco" --state CA --zip 94105
//! quickcommerce admin order-status ORD-005 shipped
//! quickcommerce --json cart show
//! ```

pub mod commands;
pub mod error;
pub mod state;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use quickcommerce_core::{
    CheckoutForm, Money, OrderStatus, ProductDraft, ProductId, ProductPatch, VariantAxis,
    VariantSelection,
};
use quickcommerce_store::{ProductQuery, SortOrder};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use commands::{admin, cart, checkout, parse_money, parse_variant_axis, product, Output};
use error::{CliError, CliResult};
use state::{AppConfig, AppState};

// =============================================================================
// Arguments
// =============================================================================

#[derive(Debug, Parser)]
#[command(name = "quickcommerce")]
#[command(author, version, about = "QuickCommerce storefront: browse, cart, checkout, admin")]
pub struct Cli {
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Directory holding the cart and store data (overrides QUICKCOMMERCE_DATA_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Skip the simulated network latency
    #[arg(long, global = true)]
    pub no_latency: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Browse the catalog
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// View and change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order for everything in the cart
    Checkout(CheckoutArgs),
    /// Manage products and orders
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProductAction {
    /// List products, filtered and sorted
    List {
        /// Match against name, description and category
        #[arg(long)]
        search: Option<String>,

        #[arg(long)]
        category: Option<String>,

        /// Lowest price, inclusive
        #[arg(long, value_parser = parse_money)]
        min_price: Option<Money>,

        /// Highest price, inclusive
        #[arg(long, value_parser = parse_money)]
        max_price: Option<Money>,

        /// name, price-low, price-high or newest
        #[arg(long, default_value = "name")]
        sort: SortOrder,
    },
    /// Show one product with its options
    Show { id: ProductId },
    /// Search the catalog
    Search { query: String },
    /// List categories
    Categories,
}

#[derive(Debug, Subcommand)]
pub enum CartAction {
    /// Show the cart and its totals
    Show,
    /// Add a product
    Add {
        id: ProductId,

        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        quantity: i64,

        /// Options, e.g. "Size=M,Color=Black" (unset axes use the first option)
        #[arg(long)]
        variant: Option<VariantSelection>,
    },
    /// Remove a line
    Remove {
        id: ProductId,

        /// Needed when the product is in the cart with several selections
        #[arg(long)]
        variant: Option<VariantSelection>,
    },
    /// Set a line's quantity (0 removes it)
    Set {
        id: ProductId,

        #[arg(allow_negative_numbers = true)]
        quantity: i64,

        #[arg(long)]
        variant: Option<VariantSelection>,
    },
    /// Empty the cart
    Clear,
}

#[derive(Debug, Args)]
pub struct CheckoutArgs {
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub phone: String,
    /// Street address
    #[arg(long)]
    pub address: String,
    #[arg(long)]
    pub city: String,
    #[arg(long)]
    pub state: String,
    #[arg(long)]
    pub zip: String,
    #[arg(long, default_value = "USA")]
    pub country: String,
}

impl From<CheckoutArgs> for CheckoutForm {
    fn from(args: CheckoutArgs) -> Self {
        CheckoutForm {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            phone: args.phone,
            address: args.address,
            city: args.city,
            state: args.state,
            zip_code: args.zip,
            country: args.country,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum AdminAction {
    /// Revenue, order counts, recent orders and low stock
    Dashboard,
    /// Every product
    Products,
    /// Products running low
    LowStock {
        /// Report products with at most this many units (default 20)
        #[arg(long)]
        threshold: Option<u32>,
    },
    /// Orders, newest first
    Orders {
        /// pending, processing, shipped or delivered
        #[arg(long)]
        status: Option<OrderStatus>,
    },
    /// Show one order
    Order { id: String },
    /// Move an order to another status
    #[command(name = "order-status")]
    SetOrderStatus { id: String, status: OrderStatus },
    /// Add a product to the catalog
    CreateProduct(CreateProductArgs),
    /// Change fields of a product
    UpdateProduct(UpdateProductArgs),
    DeleteProduct { id: ProductId },
    DeleteOrder { id: String },
    /// Restore the seed catalog and orders
    Reset,
}

#[derive(Debug, Args)]
pub struct CreateProductArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, value_parser = parse_money)]
    pub price: Money,
    #[arg(long, default_value_t = 0)]
    pub stock: u32,
    #[arg(long)]
    pub category: String,
    /// Image URL; repeat for more
    #[arg(long = "image")]
    pub images: Vec<String>,
    /// Option axis, e.g. "Size=S|M|L"; repeat for more
    #[arg(long = "variant-axis", value_parser = parse_variant_axis)]
    pub variants: Vec<VariantAxis>,
}

impl From<CreateProductArgs> for ProductDraft {
    fn from(args: CreateProductArgs) -> Self {
        ProductDraft {
            name: args.name,
            description: args.description.unwrap_or_default(),
            price: args.price,
            images: args.images,
            stock: args.stock,
            category: args.category,
            variants: args.variants,
        }
    }
}

#[derive(Debug, Args)]
pub struct UpdateProductArgs {
    pub id: ProductId,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, value_parser = parse_money)]
    pub price: Option<Money>,
    #[arg(long)]
    pub stock: Option<u32>,
    #[arg(long)]
    pub category: Option<String>,
    /// Replaces all images; repeat for more
    #[arg(long = "image")]
    pub images: Option<Vec<String>>,
    /// Replaces all option axes; repeat for more
    #[arg(long = "variant-axis", value_parser = parse_variant_axis)]
    pub variants: Option<Vec<VariantAxis>>,
}

impl UpdateProductArgs {
    fn into_parts(self) -> (ProductId, ProductPatch) {
        let patch = ProductPatch {
            name: self.name,
            description: self.description,
            price: self.price,
            images: self.images,
            stock: self.stock,
            category: self.category,
            variants: self.variants,
        };
        (self.id, patch)
    }
}

// =============================================================================
// Run
// =============================================================================

/// Parses arguments, runs one command and reports the outcome.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Invocation                                        │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter, to stderr                     │
/// │     • Default: warn, quickcommerce crates at info (RUST_LOG overrides)  │
/// │                                                                         │
/// │  2. Build Configuration ──────────────────────────────────────────────► │
/// │     • Defaults, then QUICKCOMMERCE_* env, then --data-dir/--no-latency  │
/// │                                                                         │
/// │  3. Open State ───────────────────────────────────────────────────────► │
/// │     • Cart slot and service snapshots under the data directory          │
/// │                                                                         │
/// │  4. Dispatch ─────────────────────────────────────────────────────────► │
/// │     • stdout: text or --json                                            │
/// │     • stderr: cart notifications, errors with hints                     │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let json = cli.json;

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err, json);
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> CliResult<()> {
    let mut config = AppConfig::from_env();
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }
    if cli.no_latency {
        config.simulate_latency = false;
    }
    debug!(?config, "Configuration loaded");

    let mut state = AppState::open(config)?;
    let output = dispatch(&mut state, cli.command).await;

    for notification in state.take_notifications() {
        eprintln!("✓ {notification}");
    }
    output?.print(cli.json)
}

/// Routes a parsed command to its handler.
pub async fn dispatch(state: &mut AppState, command: Command) -> CliResult<Output> {
    match command {
        Command::Products { action } => match action {
            ProductAction::List {
                search,
                category,
                min_price,
                max_price,
                sort,
            } => {
                let query = ProductQuery {
                    search,
                    category,
                    min_price,
                    max_price,
                    sort,
                };
                product::list(state, query).await
            }
            ProductAction::Show { id } => product::show(state, &id).await,
            ProductAction::Search { query } => product::search(state, &query).await,
            ProductAction::Categories => product::categories(state).await,
        },

        Command::Cart { action } => match action {
            CartAction::Show => cart::show(state),
            CartAction::Add {
                id,
                quantity,
                variant,
            } => cart::add(state, &id, quantity, variant).await,
            CartAction::Remove { id, variant } => cart::remove(state, &id, variant),
            CartAction::Set {
                id,
                quantity,
                variant,
            } => cart::set(state, &id, quantity, variant),
            CartAction::Clear => cart::clear(state),
        },

        Command::Checkout(args) => {
            let form = CheckoutForm::from(args);
            checkout::checkout(state, &form).await
        }

        Command::Admin { action } => match action {
            AdminAction::Dashboard => admin::dashboard(state).await,
            AdminAction::Products => admin::products(state).await,
            AdminAction::LowStock { threshold } => admin::low_stock(state, threshold).await,
            AdminAction::Orders { status } => admin::orders(state, status).await,
            AdminAction::Order { id } => admin::order(state, &id).await,
            AdminAction::SetOrderStatus { id, status } => {
                admin::order_status(state, &id, status).await
            }
            AdminAction::CreateProduct(args) => {
                admin::create_product(state, ProductDraft::from(args)).await
            }
            AdminAction::UpdateProduct(args) => {
                let (id, patch) = args.into_parts();
                admin::update_product(state, &id, patch).await
            }
            AdminAction::DeleteProduct { id } => admin::delete_product(state, &id).await,
            AdminAction::DeleteOrder { id } => admin::delete_order(state, &id).await,
            AdminAction::Reset => {
                info!("Resetting store data");
                admin::reset(state).await
            }
        },
    }
}

/// Prints an error to stderr, with a hint when there is one.
fn report(err: &CliError, json: bool) {
    if json {
        match serde_json::to_string(err) {
            Ok(body) => eprintln!("{body}"),
            Err(_) => eprintln!("{err}"),
        }
        return;
    }

    eprintln!("error [{}]: {}", err.code.as_str(), err.message);
    if let Some(hint) = err.hint() {
        eprintln!("hint: {hint}");
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=quickcommerce=trace` - Show trace for quickcommerce crates only
/// - Default: warnings, plus info from the quickcommerce crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,quickcommerce=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
