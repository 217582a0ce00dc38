use clap::Parser;
use domain_geo::config::{Settings, DEFAULT_TIMEOUT_SECS};
use domain_geo::location::ProviderKind;
use domain_geo::lookup::DomainValidator;
use domain_geo::server::AppState;
use domain_geo::{logging, server};
use std::sync::Arc;

/// domaingeo — resolve a domain to an IP address and locate it.
///
/// Location data comes from public IP geolocation services, tried in order
/// until one answers.
///
/// Examples:
///   domaingeo example.com
///   domaingeo https://www.rust-lang.org/learn
///   domaingeo example.com --provider ipinfo --provider ipapi
///   domaingeo --serve --port 8080
#[derive(Parser)]
#[command(name = "domaingeo", version, about, long_about = None)]
struct Cli {
    /// Domain or http(s) URL to look up.
    #[arg(index = 1, required_unless_present = "serve")]
    input: Option<String>,

    /// Provider to query, in priority order. Repeat to build a chain.
    /// One of: ipapi, ipinfo, freegeoip. Defaults to all three in that order.
    #[arg(long = "provider", value_parser = parse_provider)]
    providers: Vec<ProviderKind>,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// User-Agent header sent to providers.
    #[arg(long)]
    user_agent: Option<String>,

    /// Debug logging (overridden by RUST_LOG).
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Run the HTTP API instead of a single lookup.
    #[arg(long)]
    serve: bool,

    /// Bind address for --serve.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port for --serve.
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

fn parse_provider(s: &str) -> Result<ProviderKind, String> {
    s.parse()
}

fn settings_from(cli: &Cli) -> Settings {
    let mut settings = Settings {
        timeout_secs: cli.timeout,
        ..Settings::default()
    };
    if !cli.providers.is_empty() {
        settings.providers = cli.providers.clone();
    }
    if let Some(ref ua) = cli.user_agent {
        settings.user_agent = ua.clone();
    }
    settings
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let settings = settings_from(&cli);
    let validator = DomainValidator::from_settings(&settings).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    if cli.serve {
        let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("Error: Cannot start runtime: {}", e);
            std::process::exit(1);
        });
        // Keep one handle out here so the validator is dropped after block_on.
        let state = Arc::new(AppState { validator });
        if let Err(e) = runtime.block_on(server::start(&cli.host, cli.port, state.clone())) {
            eprintln!("Server error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let input = cli.input.as_deref().unwrap_or_default();
    let record = validator.validate_domain(input).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    eprintln!("  {} → {}", record.normalized_domain, record.resolved_address);
    eprintln!("  {}", record.location.display_line());

    match serde_json::to_string_pretty(&record) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
