//! defectdojo - Command-line client for the DefectDojo products API
//!
//! Every required value can come from a flag or an environment variable.

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};
use defectdojo_cli::commands::{ProductAction, ProductCommand};
use defectdojo_cli::config::{process_env, Config, ProductFlags, ProductSettings};
use defectdojo_cli::error::DojoError;
use defectdojo_cli::format::OutputFormat;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "defectdojo",
    bin_name = "defectdojo",
    version,
    about = "Command-line client for the DefectDojo API",
    long_about = "Create DefectDojo products through the REST API v2. Connection settings may \
                  come from flags, DEFECTDOJO_* environment variables or a config file."
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Proxy URL (e.g., socks5://host:port) [env: DEFECTDOJO_PROXY]
    #[arg(long, global = true)]
    proxy: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Perform <sub_command> related to products in DefectDojo
    #[command(alias = "product", subcommand_value_name = "SUB_COMMAND")]
    Products {
        #[command(subcommand)]
        command: ProductsCommand,
    },
}

#[derive(Subcommand)]
enum ProductsCommand {
    /// Create product
    Create(ProductArgs),

    /// Create product only if it does not already exist
    CreateIfNotExists(ProductArgs),
}

impl ProductsCommand {
    fn into_parts(self) -> (ProductAction, ProductArgs) {
        match self {
            ProductsCommand::Create(args) => (ProductAction::Create, args),
            ProductsCommand::CreateIfNotExists(args) => (ProductAction::CreateIfNotExists, args),
        }
    }
}

#[derive(Args)]
struct ProductArgs {
    /// DefectDojo URL [env: DEFECTDOJO_URL]
    #[arg(long)]
    url: Option<String>,

    /// API v2 Key [env: DEFECTDOJO_API_KEY]
    #[arg(long = "api_key", alias = "api-key")]
    api_key: Option<String>,

    /// Name of the product to create [env: DEFECTDOJO_PRODUCT_NAME]
    #[arg(long)]
    name: Option<String>,

    /// Description of the product [env: DEFECTDOJO_PRODUCT_DESCRIPTION]
    #[arg(long)]
    description: Option<String>,

    /// Product type [env: DEFECTDOJO_PRODUCT_TYPE]
    #[arg(long = "prod_type", alias = "prod-type")]
    prod_type: Option<String>,

    /// Comma-separated list of product tags [env: DEFECTDOJO_PRODUCT_TAGS]
    #[arg(long)]
    tags: Option<String>,

    /// Print output in JSON format
    #[arg(long)]
    json: bool,
}

impl ProductArgs {
    fn into_flags(self, proxy: Option<String>) -> ProductFlags {
        ProductFlags {
            url: self.url,
            api_key: self.api_key,
            name: self.name,
            description: self.description,
            prod_type: self.prod_type,
            tags: self.tags,
            proxy,
        }
    }
}

/// Global options that take a value in the following argument.
const VALUE_FLAGS: [&str; 3] = ["--config", "-c", "--proxy"];

/// Returns the first positional argument after the binary name.
fn first_positional(args: &[String]) -> Option<&str> {
    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            rest.next();
        } else if !arg.starts_with('-') {
            return Some(arg.as_str());
        }
    }
    None
}

/// Help shown after an unknown sub_command: the `products` help when the
/// command line addressed `products`, otherwise the top-level help.
fn unknown_subcommand_help(args: &[String]) -> String {
    let mut command = Cli::command();
    command.build();

    let in_products = matches!(first_positional(args), Some("products" | "product"));
    let help = if in_products {
        command.find_subcommand_mut("products").map(|c| c.render_help().to_string())
    } else {
        None
    };
    help.unwrap_or_else(|| command.render_help().to_string())
}

/// Parses arguments; an unknown sub_command prints the relevant help and exits with 1.
fn parse_cli() -> Cli {
    let args: Vec<String> = std::env::args().collect();

    match Cli::try_parse_from(&args) {
        Ok(cli) => cli,
        Err(err) if err.kind() == ErrorKind::InvalidSubcommand => {
            let _ = err.print();
            eprintln!("\n{}", unknown_subcommand_help(&args));
            std::process::exit(1);
        }
        Err(err) => err.exit(),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Products { command } => {
            let (action, args) = command.into_parts();
            let format = OutputFormat::from_json_flag(args.json);

            let settings =
                ProductSettings::resolve(args.into_flags(cli.proxy), &config, &process_env)?;

            let cmd = ProductCommand::new(settings, format);
            let output = cmd.execute(action).await?;
            println!("{}", output);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = parse_cli();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", err);
        let code = err.downcast_ref::<DojoError>().map_or(1, DojoError::exit_code);
        std::process::exit(code);
    }
}
