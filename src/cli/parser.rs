use crate::export::{ExportData, ExportFormat};
use crate::models::order::{OrderStatus, PaymentType};
use crate::models::printer::ConnectionType;
use crate::models::product::ProductStatus;
use crate::models::role::Role;
use crate::models::table::TableStatus;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command-line interface definition for fastpos
/// Restaurant point of sale and back office on SQLite
#[derive(Parser)]
#[command(
    name = "fastpos",
    version = env!("CARGO_PKG_VERSION"),
    about = "A restaurant point-of-sale CLI: orders, receipts, kitchen printers and sales reports on SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init {
        /// Password of the default `admin` account created on an empty database
        #[arg(long = "admin-password", default_value = "admin")]
        admin_password: String,
    },

    /// Open a session
    Login {
        username: String,

        #[arg(long, short = 'p')]
        password: String,
    },

    /// Close the current session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,

        #[arg(long = "migrate", help = "Add missing fields to the configuration file")]
        migrate: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal audit log
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,

        #[arg(long, help = "Only the most recent N rows")]
        limit: Option<usize>,
    },

    /// Create a backup copy of the database
    Backup {
        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(long)]
        compress: bool,

        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Replace the database with a backup copy
    Restore {
        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Product categories
    #[command(subcommand)]
    Category(CategoryCmd),

    /// Menu products
    #[command(subcommand)]
    Product(ProductCmd),

    /// Dining tables
    #[command(subcommand)]
    Table(TableCmd),

    /// User accounts
    #[command(subcommand)]
    User(UserCmd),

    /// Order entry, payment and receipts
    #[command(subcommand)]
    Order(OrderCmd),

    /// Receipt and kitchen printers
    #[command(subcommand)]
    Printer(PrinterCmd),

    /// Ingredient stock (requires inventory to be enabled)
    #[command(subcommand)]
    Inventory(InventoryCmd),

    /// Restaurant settings
    #[command(subcommand)]
    Settings(SettingsCmd),

    /// Sales reports
    #[command(subcommand)]
    Report(ReportCmd),

    /// Export sales data
    Export {
        #[arg(long, value_enum, default_value = "orders")]
        data: ExportData,

        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(
            long,
            value_name = "RANGE",
            help = "Filter export by year/month/day or a custom range"
        )]
        range: Option<String>,

        #[arg(long, help = "Only orders paid this way (cash, card)")]
        payment: Option<String>,

        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum CategoryCmd {
    List,
    Add {
        name: String,
    },
    Rename {
        id: i64,
        name: String,
    },
    /// Products of the category become uncategorized
    Delete {
        id: i64,
    },
}

#[derive(Args)]
pub struct ProductFields {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub price: Option<f64>,

    #[arg(long)]
    pub cost: Option<f64>,

    #[arg(long, value_name = "CATEGORY_ID")]
    pub category: Option<i64>,

    #[arg(long, value_name = "PATH")]
    pub image: Option<String>,

    #[arg(long, value_enum)]
    pub status: Option<ProductStatus>,
}

#[derive(Subcommand)]
pub enum ProductCmd {
    List {
        #[arg(long, value_name = "CATEGORY_ID")]
        category: Option<i64>,

        #[arg(long, short = 's', help = "Case-insensitive name search")]
        search: Option<String>,

        #[arg(long, help = "Hide unavailable products")]
        available: bool,
    },
    Add {
        #[command(flatten)]
        fields: ProductFields,
    },
    Update {
        id: i64,

        #[command(flatten)]
        fields: ProductFields,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum TableCmd {
    List,
    /// Reset the floor to tables 1..=COUNT, all free
    Generate {
        count: i64,

        #[arg(long, help = "Proceed even with pending orders")]
        force: bool,
    },
    Status {
        number: i64,

        #[arg(value_enum)]
        status: TableStatus,
    },
}

#[derive(Subcommand)]
pub enum UserCmd {
    List,
    Add {
        username: String,

        #[arg(long, short = 'p')]
        password: String,

        #[arg(long, value_enum, default_value = "cashier")]
        role: Role,
    },
    Update {
        id: i64,

        #[arg(long)]
        username: Option<String>,

        #[arg(long, short = 'p')]
        password: Option<String>,

        #[arg(long, value_enum)]
        role: Option<Role>,
    },
    Delete {
        id: i64,
    },
    /// Change your own password
    Passwd {
        #[arg(long)]
        old: String,

        #[arg(long)]
        new: String,
    },
}

#[derive(Subcommand)]
pub enum OrderCmd {
    /// Send items to a table (creates or extends its pending order)
    Add {
        #[arg(long)]
        table: i64,

        #[arg(
            long = "item",
            short = 'i',
            value_name = "PRODUCT_ID[xQTY]",
            required = true
        )]
        items: Vec<String>,

        #[arg(long, value_enum, default_value = "cash")]
        payment: PaymentType,
    },
    /// Pending order of a table
    Show {
        #[arg(long)]
        table: i64,
    },
    /// Print the customer receipt, mark the order paid and free the table
    Pay {
        #[arg(long)]
        table: i64,

        #[arg(long, value_enum)]
        payment: Option<PaymentType>,

        #[arg(long, help = "Print the receipt to stdout instead of the printer")]
        preview: bool,
    },
    /// Reprint the receipt of an order
    Receipt {
        id: i64,

        #[arg(long)]
        preview: bool,
    },
    Cancel {
        id: i64,
    },
    List {
        #[arg(long, value_name = "RANGE")]
        range: Option<String>,

        #[arg(long)]
        payment: Option<String>,

        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },
    Items {
        id: i64,
    },
    /// Revenue per day
    Stats {
        #[arg(long, default_value_t = 7)]
        days: usize,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Pending,
    Paid,
    Cancelled,
}

impl From<StatusArg> for OrderStatus {
    fn from(s: StatusArg) -> Self {
        match s {
            StatusArg::Pending => OrderStatus::Pending,
            StatusArg::Paid => OrderStatus::Paid,
            StatusArg::Cancelled => OrderStatus::Cancelled,
        }
    }
}

#[derive(Subcommand)]
pub enum PrinterCmd {
    List,
    /// Look for USB device nodes and spooler queues
    Scan {
        #[arg(long, help = "Add printers that are not registered yet")]
        register: bool,
    },
    Add {
        #[arg(long)]
        name: String,

        #[arg(long, value_enum)]
        connection: ConnectionType,

        #[arg(long)]
        ip: Option<String>,

        #[arg(long)]
        port: Option<u16>,

        #[arg(long, value_name = "PATH", help = "Device node, e.g. /dev/usb/lp0")]
        device: Option<String>,

        #[arg(long = "vendor-id")]
        vendor_id: Option<String>,

        #[arg(long = "product-id")]
        product_id: Option<String>,

        #[arg(long, value_name = "A,B", help = "Comma-separated category names")]
        categories: Option<String>,
    },
    /// Route a category to a printer
    Assign {
        id: i64,
        category: String,
    },
    Unassign {
        id: i64,
        category: String,
    },
    Delete {
        id: i64,
    },
    /// Print a test page
    Test {
        id: i64,
    },
    /// Probe printers and store online/offline
    Check {
        id: Option<i64>,
    },
}

#[derive(Args)]
pub struct IngredientFields {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub quantity: Option<f64>,

    #[arg(long)]
    pub unit: Option<String>,

    #[arg(long = "min")]
    pub min_quantity: Option<f64>,

    #[arg(long)]
    pub cost: Option<f64>,

    #[arg(long, value_name = "PRODUCT_ID")]
    pub product: Option<i64>,
}

#[derive(Subcommand)]
pub enum InventoryCmd {
    List {
        #[arg(long, help = "Only ingredients at or below their minimum")]
        low: bool,
    },
    Add {
        #[command(flatten)]
        fields: IngredientFields,
    },
    Update {
        id: i64,

        #[command(flatten)]
        fields: IngredientFields,
    },
    /// Add (or with a negative value, remove) stock
    Adjust {
        id: i64,

        #[arg(allow_hyphen_values = true)]
        delta: f64,
    },
    Delete {
        id: i64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

#[derive(Subcommand)]
pub enum SettingsCmd {
    Show,
    Set {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        address: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long, value_name = "PATH")]
        logo: Option<String>,

        #[arg(long, help = "VAT percentage (0-100)")]
        vat: Option<f64>,

        #[arg(long)]
        currency: Option<String>,

        #[arg(long, value_enum)]
        inventory: Option<Toggle>,
    },
}

#[derive(Subcommand)]
pub enum ReportCmd {
    /// Orders, revenue, cost and profit
    Summary {
        #[arg(long, value_name = "RANGE")]
        range: Option<String>,
    },
    Daily {
        #[arg(long, value_name = "RANGE")]
        range: Option<String>,
    },
    Categories {
        #[arg(long, value_name = "RANGE")]
        range: Option<String>,
    },
}
