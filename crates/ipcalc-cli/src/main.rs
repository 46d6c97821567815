use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use ipcalc_cidr::{calculate, calculate_with_mask, parse_cidr, MaskPolicy, NetworkBlock};

mod batch;

use batch::{read_inputs, BatchProcessor, BatchResult};

/// IPv4 subnet calculator: masks, host ranges and subdivision
#[derive(Parser)]
#[command(name = "ipcalc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output format
    #[arg(
        short,
        long,
        value_enum,
        default_value = "human",
        global = true,
        env = "IPCALC_OUTPUT"
    )]
    output: OutputFormat,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Reject subnet masks that are not contiguous
    #[arg(long, global = true, env = "IPCALC_STRICT_MASK")]
    strict_mask: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every derived fact of a block and its subdivision
    Info(InfoArgs),
    /// List the child blocks of a subdivision
    Split(SplitArgs),
    /// Print the prefix length to subnet mask table
    Masks,
    /// Evaluate one CIDR per line from file or stdin
    Batch(BatchArgs),
}

#[derive(Parser)]
struct InfoArgs {
    /// CIDR notation (e.g. 192.168.1.0/24), or a bare address with --prefix or --mask
    #[arg(value_name = "TARGET")]
    target: String,

    /// Prefix length for a bare address
    #[arg(short, long, conflicts_with = "mask", allow_negative_numbers = true)]
    prefix: Option<i32>,

    /// Subnet mask for a bare address (e.g. 255.255.255.0)
    #[arg(short, long)]
    mask: Option<String>,

    /// Number of child blocks to show
    #[arg(
        short,
        long,
        default_value = "1",
        env = "IPCALC_SUBDIVISIONS",
        value_parser = clap::value_parser!(u32).range(1..=MAX_CHILDREN)
    )]
    subdivide: u32,
}

#[derive(Parser)]
struct SplitArgs {
    /// Block to split, in CIDR notation
    #[arg(value_name = "CIDR")]
    cidr: String,

    /// Number of child blocks
    #[arg(
        value_name = "COUNT",
        value_parser = clap::value_parser!(u32).range(1..=MAX_CHILDREN)
    )]
    count: u32,

    /// Treat COUNT as the number of extra prefix bits
    #[arg(long)]
    bits: bool,
}

#[derive(Parser)]
struct BatchArgs {
    /// Input file (use '-' for stdin)
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Number of worker threads (default: CPU cores)
    #[arg(short, long)]
    workers: Option<usize>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable table output
    Human,
    /// JSON output (pretty-printed)
    Json,
    /// JSON output (compact)
    JsonCompact,
    /// CSV output
    Csv,
}

/// Settings shared by every command
#[derive(Debug, Clone, Copy)]
struct CalcConfig {
    output: OutputFormat,
    mask_policy: MaskPolicy,
}

impl CalcConfig {
    fn from_cli(cli: &Cli) -> Self {
        Self {
            output: cli.output,
            mask_policy: if cli.strict_mask {
                MaskPolicy::Strict
            } else {
                MaskPolicy::Permissive
            },
        }
    }
}

#[derive(Serialize)]
struct InfoReport {
    block: NetworkBlock,
    subnets: Vec<NetworkBlock>,
}

#[derive(Serialize)]
struct MaskRow {
    prefix_length: u8,
    subnet_mask: Ipv4Addr,
    wildcard_mask: Ipv4Addr,
    addresses: u64,
    usable_hosts: u64,
}

#[derive(Serialize)]
struct BatchRow<'a> {
    input: &'a str,
    block: Option<&'a NetworkBlock>,
    error: Option<&'a str>,
}

/// Upper bound on child blocks requested from the command line
const MAX_CHILDREN: i64 = 1 << 16;

const SUBNET_HEADER: [&str; 7] = [
    "Network Address",
    "Prefix Length",
    "Subnet Mask",
    "Broadcast Address",
    "First Host",
    "Last Host",
    "Usable Hosts",
];

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = CalcConfig::from_cli(&cli);

    match cli.command {
        Commands::Info(args) => handle_info(args, &config)?,
        Commands::Split(args) => handle_split(args, &config)?,
        Commands::Masks => handle_masks(&config)?,
        Commands::Batch(args) => handle_batch(args, &config)?,
    }

    Ok(())
}

/// Install the stderr subscriber; `RUST_LOG` overrides the verbosity flags
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn resolve_block(args: &InfoArgs, config: &CalcConfig) -> Result<NetworkBlock> {
    let block = match (args.prefix, args.mask.as_deref()) {
        (Some(prefix_len), _) => calculate(&args.target, prefix_len)?,
        (None, Some(mask)) => calculate_with_mask(&args.target, mask, config.mask_policy)?,
        (None, None) => parse_cidr(&args.target)?,
    };
    Ok(block)
}

fn handle_info(args: InfoArgs, config: &CalcConfig) -> Result<()> {
    let block = resolve_block(&args, config)?;
    tracing::debug!(block = %block, "resolved block");

    let cidr = block.to_cidr_string();
    let count = args.subdivide;
    let subnets = block
        .subdivide(count)
        .with_context(|| format!("cannot subdivide {} into {}", cidr, count))?;

    let report = InfoReport { block, subnets };
    match config.output {
        OutputFormat::Human => print_info_human(&report),
        OutputFormat::Json => print_json(&report, true)?,
        OutputFormat::JsonCompact => print_json(&report, false)?,
        OutputFormat::Csv => print_subnets_csv(&report.subnets)?,
    }
    Ok(())
}

fn handle_split(args: SplitArgs, config: &CalcConfig) -> Result<()> {
    let block = parse_cidr(&args.cidr)?;

    let subnets = if args.bits {
        let extra_bits = u8::try_from(args.count)
            .context("extra prefix bits out of range")?;
        block.split(extra_bits)?
    } else {
        block.subdivide(args.count)?
    };

    match config.output {
        OutputFormat::Human => print_subnets_human(&subnets),
        OutputFormat::Json => print_json(&subnets, true)?,
        OutputFormat::JsonCompact => print_json(&subnets, false)?,
        OutputFormat::Csv => print_subnets_csv(&subnets)?,
    }
    Ok(())
}

fn handle_masks(config: &CalcConfig) -> Result<()> {
    let rows = mask_table()?;

    match config.output {
        OutputFormat::Human => {
            println!();
            println!("{}", "Subnet Masks".bold().cyan());
            println!("{}", "─".repeat(66).dimmed());
            println!(
                "{:>6}  {:<16} {:<16} {:>12} {:>12}",
                "Prefix".bold(),
                "Mask".bold(),
                "Wildcard".bold(),
                "Addresses".bold(),
                "Usable".bold()
            );
            for row in &rows {
                println!(
                    "{:>6}  {:<16} {:<16} {:>12} {:>12}",
                    format!("/{}", row.prefix_length),
                    row.subnet_mask.to_string(),
                    row.wildcard_mask.to_string(),
                    row.addresses,
                    row.usable_hosts
                );
            }
            println!();
        }
        OutputFormat::Json => print_json(&rows, true)?,
        OutputFormat::JsonCompact => print_json(&rows, false)?,
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            wtr.write_record([
                "prefix_length",
                "subnet_mask",
                "wildcard_mask",
                "addresses",
                "usable_hosts",
            ])?;
            for row in &rows {
                wtr.write_record([
                    row.prefix_length.to_string(),
                    row.subnet_mask.to_string(),
                    row.wildcard_mask.to_string(),
                    row.addresses.to_string(),
                    row.usable_hosts.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
    }
    Ok(())
}

fn mask_table() -> Result<Vec<MaskRow>> {
    (0..=32)
        .map(|prefix_len| {
            let block = NetworkBlock::new(Ipv4Addr::UNSPECIFIED, prefix_len)?;
            Ok(MaskRow {
                prefix_length: block.prefix_len(),
                subnet_mask: block.subnet_mask(),
                wildcard_mask: block.wildcard_mask(),
                addresses: block.subnet_size(),
                usable_hosts: block.usable_hosts(),
            })
        })
        .collect()
}

fn handle_batch(args: BatchArgs, config: &CalcConfig) -> Result<()> {
    let inputs = read_inputs(args.file.as_deref())?;
    let processor = BatchProcessor::new(args.workers)?;

    tracing::debug!(
        inputs = inputs.len(),
        workers = processor.thread_count(),
        "starting batch"
    );

    let results = processor.process(inputs);
    let failed = results.iter().filter(|r| r.result.is_err()).count();

    match config.output {
        OutputFormat::Human => print_batch_human(&results),
        OutputFormat::Json => print_json(&batch_rows(&results), true)?,
        OutputFormat::JsonCompact => print_json(&batch_rows(&results), false)?,
        OutputFormat::Csv => print_batch_csv(&results)?,
    }

    if failed > 0 {
        tracing::warn!("{} of {} inputs failed", failed, results.len());
    }
    Ok(())
}

fn batch_rows(results: &[BatchResult]) -> Vec<BatchRow<'_>> {
    results
        .iter()
        .map(|r| BatchRow {
            input: &r.input,
            block: r.result.as_ref().ok(),
            error: r.result.as_ref().err().map(String::as_str),
        })
        .collect()
}

fn subnet_row(block: &NetworkBlock) -> [String; 7] {
    [
        block.network().to_string(),
        block.prefix_len().to_string(),
        block.subnet_mask().to_string(),
        block.broadcast().to_string(),
        block.first_usable().to_string(),
        block.last_usable().to_string(),
        block.usable_hosts().to_string(),
    ]
}

fn print_info_human(report: &InfoReport) {
    let block = &report.block;

    println!();
    println!("{}", "Network Block".bold().cyan());
    println!("{}", "─".repeat(50).dimmed());
    println!("{:>18}: {}", "Address".bold(), block.address());
    println!("{:>18}: {}", "CIDR".bold(), block.to_cidr_string().green());
    println!("{:>18}: {}", "Subnet Mask".bold(), block.subnet_mask());
    println!("{:>18}: {}", "Wildcard Mask".bold(), block.wildcard_mask());
    println!("{:>18}: {}", "Network".bold(), block.network());
    println!("{:>18}: {}", "Broadcast".bold(), block.broadcast());
    println!("{:>18}: {}", "First Usable Host".bold(), block.first_usable());
    println!("{:>18}: {}", "Last Usable Host".bold(), block.last_usable());
    println!("{:>18}: {}", "Addresses".bold(), block.subnet_size());
    println!("{:>18}: {}", "Usable Hosts".bold(), block.usable_hosts());

    print_subnets_human(&report.subnets);
}

fn print_subnets_human(subnets: &[NetworkBlock]) {
    println!();
    println!("{}", "Subdivision".bold().cyan());
    println!("{}", "─".repeat(112).dimmed());
    let header = format!(
        "{:<16} {:>6} {:<16} {:<17} {:<16} {:<16} {:>12}",
        SUBNET_HEADER[0],
        "Prefix",
        SUBNET_HEADER[2],
        SUBNET_HEADER[3],
        SUBNET_HEADER[4],
        SUBNET_HEADER[5],
        SUBNET_HEADER[6]
    );
    println!("{}", header.bold());

    for subnet in subnets {
        let row = subnet_row(subnet);
        println!(
            "{:<16} {:>6} {:<16} {:<17} {:<16} {:<16} {:>12}",
            row[0], row[1], row[2], row[3], row[4], row[5], row[6]
        );
    }
    println!();
}

fn print_subnets_csv(subnets: &[NetworkBlock]) -> Result<()> {
    write_subnets_csv(std::io::stdout(), subnets)
}

fn write_subnets_csv<W: std::io::Write>(writer: W, subnets: &[NetworkBlock]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(SUBNET_HEADER)?;
    for subnet in subnets {
        wtr.write_record(subnet_row(subnet))?;
    }
    wtr.flush()?;
    Ok(())
}

fn print_batch_human(results: &[BatchResult]) {
    for r in results {
        match &r.result {
            Ok(block) => println!(
                "{} {:<20} {} ({} usable)",
                "✓".green(),
                r.input,
                block,
                block.usable_hosts()
            ),
            Err(e) => println!("{} {:<20} {}", "✗".red(), r.input, e.red()),
        }
    }
}

fn print_batch_csv(results: &[BatchResult]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());

    let mut header = vec!["Input"];
    header.extend(SUBNET_HEADER);
    header.push("Error");
    wtr.write_record(&header)?;

    for r in results {
        let mut record = vec![r.input.clone()];
        match &r.result {
            Ok(block) => {
                record.extend(subnet_row(block));
                record.push(String::new());
            }
            Err(e) => {
                record.extend(std::iter::repeat(String::new()).take(SUBNET_HEADER.len()));
                record.push(e.clone());
            }
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<()> {
    if pretty {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", serde_json::to_string(value)?);
    }
    Ok(())
}
