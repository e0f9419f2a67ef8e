use chrono::Utc;
use clap::{CommandFactory, Parser};
use log::debug;
use sslcheck::report::{write_error, write_json, write_text};
use sslcheck::{check_endpoint, logging, resolve, Config, OutputFormat, RawInput};
use std::io::{self, Write};
use std::process::exit;

/// Check a TLS endpoint's certificate and warn when it is expired or close to expiring.
#[derive(Parser, Debug)]
#[command(
    name = "sslcheck",
    version,
    about,
    override_usage = "sslcheck -i <ip address> -p <port> -d <domain name>"
)]
struct Cli {
    /// IP Address (may include :port)
    #[arg(short = 'i', long = "ip")]
    ip: Option<String>,

    /// Domain Name (may include https:// and :port)
    #[arg(short = 'd', long = "domain")]
    domain: Option<String>,

    /// Domain Name, when -d is not used
    #[arg(value_name = "DOMAIN")]
    target: Option<String>,

    /// Port Number [default: 443]
    #[arg(short = 'p', long = "port")]
    port: Option<String>,

    /// Verbose
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Print the report as JSON
    #[arg(long = "json")]
    json: bool,

    /// Report on the certificate without verifying the chain
    #[arg(short = 'k', long = "insecure")]
    insecure: bool,
}

impl Cli {
    /// The domain to check: `-d` first, then the positional argument.
    fn target_domain(&self) -> Option<String> {
        self.domain
            .iter()
            .chain(self.target.iter())
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
            .map(String::from)
    }
}

fn main() {
    let cli = Cli::parse();
    let config = Config::defaults().merge_with(Config::from_cli_args(
        cli.json,
        cli.insecure,
        cli.verbose,
    ));
    logging::init_logger(config.verbose());

    let domain = match cli.target_domain() {
        Some(domain) => domain,
        None => {
            let _ = Cli::command().print_help();
            exit(1);
        }
    };

    let raw = RawInput {
        ip: cli.ip,
        domain: Some(domain),
        port: cli.port,
    };
    exit(run(&raw, &config));
}

fn run(raw: &RawInput, config: &Config) -> i32 {
    let mut stdout = io::stdout().lock();

    let endpoint = match resolve(raw, config.timeout()) {
        Ok(endpoint) => endpoint,
        Err(err) => {
            let domain = raw.domain.as_deref().unwrap_or_default();
            let _ = write_error(&err, domain, &mut stdout);
            return err.exit_code();
        }
    };
    debug!("Endpoint: {:?}", endpoint);

    let report = match check_endpoint(&endpoint, config, Utc::now()) {
        Ok(report) => report,
        Err(err) => {
            debug!("Check failed: {:?}", err);
            let _ = write_error(&err, &endpoint.sni, &mut stdout);
            return err.exit_code();
        }
    };

    let written = match config.output() {
        OutputFormat::Text => write_text(&report, &mut stdout),
        OutputFormat::Json => write_json(&report, &mut stdout),
    };
    if let Err(e) = written.and_then(|_| stdout.flush()) {
        eprintln!("Failed to write report: {}", e);
        return 1;
    }
    report.exit_code()
}
