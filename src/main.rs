//! `check_storsafe` -- nagios/icinga check for FalconStor StorSafe appliances.
//!
//! Reads cache and cluster storage counters over SNMP (through `snmpget`) and reports them with
//! the usual nagios exit codes. Configuration and fetch failures exit with UNKNOWN (3) so they
//! can't be mistaken for a threshold breach.
//!
//! # Environment variables
//!
//! | Variable                  | Default   | Description                                   |
//! |---------------------------|-----------|-----------------------------------------------|
//! | `STORSAFE_SNMP_COMMUNITY` | `public`  | SNMP community, same as `--community`          |
//! | `STORSAFE_MIB`            | --        | MIB file passed to `snmpget -m`                |
//! | `STORSAFE_SNMPGET`        | `snmpget` | snmp client binary                             |
//! | `GENERATE_ICINGA_COMMAND` | --        | print an Icinga `CheckCommand` and exit        |
//! | `RUST_LOG`                | --        | overrides the stderr log filter                |

use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use check_storsafe::config_generator::print_icinga_command_if_env_and_exit;
use check_storsafe::{
    collect, evaluate, CheckError, CheckType, Report, Runner, ServiceState, SnmpGet, Thresholds,
};

#[derive(Debug, Parser)]
#[command(
    name = "check_storsafe",
    version,
    about = "Check FalconStor StorSafe cache and cluster storage over SNMP"
)]
struct Cli {
    /// Address of the StorSafe appliance
    #[arg(short = 'H', long)]
    host: String,

    /// One of UsedCache, AvailCache, TotalCache, AllCache, LocalCluster
    #[arg(short = 'c', long)]
    check_type: String,

    /// Warning threshold in percent of used cache
    #[arg(short = 'W', long, value_parser = parse_percentage)]
    warning: Option<f64>,

    /// Critical threshold in percent of used cache
    #[arg(short = 'C', long, value_parser = parse_percentage)]
    critical: Option<f64>,

    /// SNMP community string
    #[arg(short = 's', long, env = "STORSAFE_SNMP_COMMUNITY", default_value = "public")]
    community: String,

    /// MIB definition file passed to snmpget
    #[arg(short = 'm', long, env = "STORSAFE_MIB")]
    mib: Option<PathBuf>,

    /// SNMP protocol version
    #[arg(long, default_value = "2c", value_parser = ["1", "2c"])]
    snmp_version: String,

    /// Path of the snmpget binary
    #[arg(long, env = "STORSAFE_SNMPGET", default_value = "snmpget")]
    snmpget: PathBuf,

    /// Timeout in seconds for each SNMP request
    #[arg(short = 't', long)]
    timeout: Option<u32>,

    /// Number of SNMP retries
    #[arg(short = 'r', long)]
    retries: Option<u32>,

    /// Increase log verbosity on stderr, may be repeated
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_percentage(s: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(value) if (0.0..=100.0).contains(&value) => Ok(value),
        _ => Err(CheckError::InvalidThreshold(s.to_owned()).to_string()),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("check_storsafe={}", default).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cmd = Cli::command();
    if let Err(err) = print_icinga_command_if_env_and_exit("storsafe", "storsafe", &cmd) {
        eprintln!("{}", err);
        std::process::exit(ServiceState::Unknown.exit_code());
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            let err = CheckError::from(err);
            eprintln!("{}", err);
            std::process::exit(err.service_state().exit_code());
        }
    };

    init_logging(cli.verbose);

    Runner::<CheckError>::new()
        .on_error(CheckError::service_state)
        .safe_run(|| do_check(&cli))
        .print_and_exit()
}

fn do_check(cli: &Cli) -> Result<Report, CheckError> {
    // Configuration is validated before anything is queried.
    let check_type: CheckType = cli.check_type.parse()?;
    let thresholds = Thresholds::from_options(check_type, cli.warning, cli.critical)?;

    tracing::info!(host = %cli.host, %check_type, ?thresholds, "starting check");

    let snmp = SnmpGet::new(&cli.host, &cli.community)
        .with_binary(cli.snmpget.clone())
        .with_version(&cli.snmp_version)
        .with_mib(cli.mib.clone())
        .with_timeout(cli.timeout)
        .with_retries(cli.retries);

    let metrics = collect(&snmp, &check_type.required_metrics())?;
    evaluate(check_type, thresholds.as_ref(), &metrics)
}
