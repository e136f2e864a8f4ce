//! gpget CLI
//!
//! Entry point for the `gpget` command-line tool.

use clap::Parser;
use gpget::{
    logging, run, CliOverrides, Config, ExitCode, FetchTarget, GpgetError, GpgetResult,
    HttpConfig, HttpFetcher, SignatureEncoding, TargetSink, VerificationReport,
};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "gpget")]
#[command(about = "Retrieve a file and release it only if its OpenPGP signature verifies", version)]
struct Cli {
    /// URL to retrieve
    #[arg(value_name = "URL", conflicts_with = "url_flag")]
    url: Option<String>,

    /// URL to retrieve (alternative to the positional argument)
    #[arg(long = "url", value_name = "URL")]
    url_flag: Option<String>,

    /// Save the file under its remote name
    #[arg(short = 'O', long)]
    remote_name: bool,

    /// Directory or file to save verified content to (default: stdout)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Key ID (8 or 16 hex digits) expected to have signed the file
    #[arg(short = 'k', long)]
    key_id: Option<String>,

    /// Use a binary detached signature (<url>.sig)
    #[arg(short = 'b', long, conflicts_with_all = ["clearsign", "encoding"])]
    binary: bool,

    /// The file is clearsigned
    #[arg(short = 'c', long, conflicts_with = "encoding")]
    clearsign: bool,

    /// Signature encoding: binary, armored or clearsigned (default: armored)
    #[arg(long)]
    encoding: Option<SignatureEncoding>,

    /// Public keyring (default: ~/.gnupg/pubring.gpg)
    #[arg(long)]
    keyring: Option<PathBuf>,

    /// Config file (default: ~/.config/gpget/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// HTTP timeout in seconds (default: 30)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Print the verification report as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only report errors
    #[arg(short = 'q', long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn encoding(&self) -> Option<SignatureEncoding> {
        if self.binary {
            Some(SignatureEncoding::Binary)
        } else if self.clearsign {
            Some(SignatureEncoding::Clearsigned)
        } else {
            self.encoding
        }
    }

    fn into_overrides(self) -> CliOverrides {
        CliOverrides {
            encoding: self.encoding(),
            url: self.url.or(self.url_flag),
            key_id: self.key_id,
            keyring: self.keyring,
            config: self.config,
            output: self.output,
            remote_name: self.remote_name,
            timeout_secs: self.timeout,
            json: self.json,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    let quiet = cli.quiet;
    let code = match execute(cli) {
        Ok((report, json)) => {
            print_report(&report, json, quiet);
            ExitCode::Success
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };
    process::exit(code.as_i32());
}

fn execute(cli: Cli) -> GpgetResult<(VerificationReport, bool)> {
    let config = Config::load(cli.into_overrides())?;

    let http = HttpConfig {
        timeout: config.timeout,
        ..HttpConfig::default()
    };
    let fetcher = HttpFetcher::new(&http).map_err(|e| GpgetError::FetchTransport {
        target: FetchTarget::artifact(config.url.as_str()),
        reason: e.to_string(),
    })?;

    let mut sink = TargetSink::new(config.output.clone());
    let report = run(&config, &fetcher, &mut sink)?;
    Ok((report, config.json))
}

fn print_report(report: &VerificationReport, json: bool, quiet: bool) {
    if json {
        match serde_json::to_string(report) {
            Ok(line) => eprintln!("{}", line),
            Err(e) => eprintln!("Error serializing report: {}", e),
        }
    } else if !quiet {
        eprintln!("{}", report.to_human());
    }
}
