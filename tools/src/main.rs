use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use codec::CodecLimits;
use schema::SchemaSet;
use tagwire_tools::{
    decode_message_json, encode_message_json, format_decode_pretty, format_layout,
    inspect_packet, layout_report, load_schema_set, packet_dispatcher, DecodeOutput,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tagwire-tools",
    version,
    about = "tagwire schema inspection, encoding, and decoding tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show each message's wire layout and sizes.
    Layout {
        /// Schema JSON.
        #[arg(long)]
        schema: PathBuf,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
    /// Encode a JSON value as a message.
    Encode {
        /// Schema JSON.
        #[arg(long)]
        schema: PathBuf,
        /// Message name in the schema.
        #[arg(long)]
        message: String,
        /// Path to the JSON value.
        #[arg(long)]
        value: PathBuf,
        /// Where to write the packet bytes.
        #[arg(long)]
        out: PathBuf,
    },
    /// Decode a packet as a named message.
    Decode {
        /// Path to the packet bytes.
        packet_file: PathBuf,
        /// Schema JSON describing the packet contents.
        #[arg(long)]
        schema: PathBuf,
        /// Message name in the schema.
        #[arg(long)]
        message: String,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Identify packets by type tag and decode them.
    Inspect {
        /// Path to the packet bytes, or a directory of packets.
        packet_path: PathBuf,
        /// Schema JSON.
        #[arg(long)]
        schema: PathBuf,
        /// Sort inspected packets.
        #[arg(long, value_enum)]
        sort: Option<InspectSort>,
        /// Limit the number of inspected packets (after sorting).
        #[arg(long)]
        limit: Option<usize>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InspectSort {
    Size,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let limits = CodecLimits::default();
    match cli.command {
        Command::Layout { schema, format } => {
            let set = load_schema(&schema)?;
            let report = layout_report(&set);
            match format {
                OutputFormat::Json => {
                    let json = serde_json::to_string_pretty(&report).context("serialize json")?;
                    println!("{json}");
                }
                OutputFormat::Pretty => print!("{}", format_layout(&report)),
            }
        }
        Command::Encode {
            schema,
            message,
            value,
            out,
        } => {
            let set = load_schema(&schema)?;
            let contents = fs::read_to_string(&value)
                .with_context(|| format!("read value {}", value.display()))?;
            let json: serde_json::Value =
                serde_json::from_str(&contents).context("parse value json")?;
            let bytes = encode_message_json(&json, &set, &message, &limits)?;
            fs::write(&out, &bytes).with_context(|| format!("write packet {}", out.display()))?;
            println!("wrote {} bytes to {}", bytes.len(), out.display());
        }
        Command::Decode {
            packet_file,
            schema,
            message,
            format,
        } => {
            let bytes = fs::read(&packet_file)
                .with_context(|| format!("read packet {}", packet_file.display()))?;
            let set = load_schema(&schema)?;
            let output = decode_message_json(&bytes, &set, &message, &limits)?;
            print_output(&output, format)?;
        }
        Command::Inspect {
            packet_path,
            schema,
            sort,
            limit,
            format,
        } => {
            let set = load_schema(&schema)?;
            let mut dispatcher = packet_dispatcher(&set, &limits);
            if packet_path.is_dir() {
                let entries = collect_packet_entries(&packet_path)?;
                let mut entries = maybe_sort_entries(entries, sort);
                let limit = limit.or(sort.map(|InspectSort::Size| 10));
                if let Some(limit) = limit {
                    entries.truncate(limit);
                }
                for entry in entries {
                    let bytes = fs::read(&entry.path)
                        .with_context(|| format!("read packet {}", entry.path.display()))?;
                    println!("== {} ({} bytes) ==", entry.path.display(), entry.size);
                    match inspect_packet(&bytes, &set, &mut dispatcher) {
                        Ok(output) => print_output(&output, format)?,
                        Err(err) => println!("error: {err:#}"),
                    }
                }
            } else {
                let bytes = fs::read(&packet_path)
                    .with_context(|| format!("read packet {}", packet_path.display()))?;
                let output = inspect_packet(&bytes, &set, &mut dispatcher)?;
                print_output(&output, format)?;
            }
        }
    }
    Ok(())
}

fn load_schema(path: &Path) -> Result<SchemaSet> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read schema {}", path.display()))?;
    let set = load_schema_set(&contents).with_context(|| format!("load schema {}", path.display()))?;
    debug!(messages = set.len(), path = %path.display(), "loaded schema");
    Ok(set)
}

fn print_output(output: &DecodeOutput, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(output).context("serialize json")?;
            println!("{json}");
        }
        OutputFormat::Pretty => print!("{}", format_decode_pretty(output)),
    }
    Ok(())
}

struct PacketEntry {
    path: PathBuf,
    size: u64,
}

fn collect_packet_entries(dir: &Path) -> Result<Vec<PacketEntry>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let size = entry.metadata()?.len();
        entries.push(PacketEntry { path, size });
    }
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

fn maybe_sort_entries(
    mut entries: Vec<PacketEntry>,
    sort: Option<InspectSort>,
) -> Vec<PacketEntry> {
    match sort {
        Some(InspectSort::Size) => {
            entries.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
        }
        None => {}
    }
    entries
}
