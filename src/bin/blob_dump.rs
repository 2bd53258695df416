//! Blob Dump - inspeksi raw attribute buffer
//!
//! File di-mmap (zero-copy), lalu attribute tree dicetak rekursif sampai
//! `MAX_NESTING_DEPTH`. Dengan `--schema`, buffer juga di-decode terhadap
//! schema yang ditulis inline, misalnya `id:int32,msg:string?`
//! (`?` = optional).
//!
//! Usage:
//!   cargo run --release --bin blob_dump -- [OPTIONS] <FILE>

use std::fs::File;
use std::io;

use memmap2::Mmap;
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use uidl_runtime::config::MAX_NESTING_DEPTH;
use uidl_runtime::wire::{Attr, AttrReader};
use uidl_runtime::{CodecConfig, DecodeError, Decoder, Schema, SchemaBuildError, WireType, WireValue};

/// Dump configuration
struct DumpConfig {
    path: Option<String>,
    schema: Option<String>,
    max_message_size: usize,
    hex: bool,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            path: None,
            schema: None,
            max_message_size: CodecConfig::default().max_message_size,
            hex: false,
        }
    }
}

#[derive(Debug, Error)]
enum DumpError {
    #[error("no input file given (see --help)")]
    NoInput,

    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Decode(#[from] DecodeError),

    #[error("invalid schema: {0}")]
    Schema(#[from] SchemaBuildError),

    #[error("unknown field type `{0}` in --schema")]
    UnknownType(String),

    #[error("attribute at offset {0} nests deeper than {max} levels", max = MAX_NESTING_DEPTH)]
    TooDeep(usize),
}

const ALL_TYPES: [WireType; 10] = [
    WireType::Unspec,
    WireType::Array,
    WireType::Table,
    WireType::String,
    WireType::Int64,
    WireType::Int32,
    WireType::Int16,
    WireType::Int8,
    WireType::Bool,
    WireType::Double,
];

/// `name:type[?],...` → Schema
fn parse_schema(spec: &str) -> Result<Schema, DumpError> {
    let mut builder = Schema::builder("cli");
    for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (name, ty) = entry.split_once(':').unwrap_or((entry, "unspec"));
        let (ty, required) = match ty.strip_suffix('?') {
            Some(ty) => (ty, false),
            None => (ty, true),
        };
        let ty = ALL_TYPES
            .into_iter()
            .find(|candidate| candidate.name() == ty)
            .ok_or_else(|| DumpError::UnknownType(ty.to_string()))?;
        builder = builder.field(name.to_string(), ty, required);
    }
    Ok(builder.build()?)
}

fn print_attr(attr: &Attr<'_>, depth: usize, hex: bool) -> Result<(), DumpError> {
    if depth > MAX_NESTING_DEPTH {
        return Err(DumpError::TooDeep(attr.offset()));
    }

    let indent = "  ".repeat(depth);
    let name = if attr.name().is_empty() { "-" } else { attr.name() };
    let ty = attr.wire_type();

    match attr.value()? {
        WireValue::Table(table) => {
            println!("{indent}{name}: table ({} bytes) {{", table.len());
            for inner in table.iter() {
                print_attr(&inner?, depth + 1, hex)?;
            }
            println!("{indent}}}");
        }
        WireValue::Array(array) => {
            println!("{indent}{name}: array ({} bytes) [", array.len());
            for inner in array.iter() {
                print_attr(&inner?, depth + 1, hex)?;
            }
            println!("{indent}]");
        }
        WireValue::Unspec(bytes) => {
            println!("{indent}{name}: unspec ({} bytes){}", bytes.len(), hex_suffix(bytes.as_bytes(), hex));
        }
        WireValue::String(s) => println!("{indent}{name}: {ty} {s:?}"),
        value => println!("{indent}{name}: {ty} {}", scalar(&value)),
    }
    Ok(())
}

fn scalar(value: &WireValue<'_>) -> String {
    match value {
        WireValue::Double(v) => v.to_string(),
        other => other
            .as_i64()
            .map(|v| v.to_string())
            .unwrap_or_else(|| format!("{other:?}")),
    }
}

fn hex_suffix(bytes: &[u8], hex: bool) -> String {
    if !hex {
        return String::new();
    }
    let body: Vec<String> = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!(" = {}", body.join(" "))
}

fn run(config: DumpConfig) -> Result<(), DumpError> {
    let path = config.path.ok_or(DumpError::NoInput)?;
    let file = File::open(&path)?;
    let len = file.metadata()?.len();

    // Mmap dengan panjang 0 ditolak di beberapa platform
    let mmap = if len == 0 {
        None
    } else {
        // SAFETY: file hanya dibaca; kita tidak menjamin proses lain tidak
        // mengubahnya, sama seperti tool inspeksi lain
        Some(unsafe { Mmap::map(&file)? })
    };
    let bytes: &[u8] = mmap.as_deref().unwrap_or(&[]);
    info!(path = %path, bytes = bytes.len(), "loaded buffer");

    if bytes.len() > config.max_message_size {
        return Err(DecodeError::BufferMalformed {
            offset: config.max_message_size,
            reason: "message exceeds the configured maximum size",
        }
        .into());
    }

    let mut count = 0usize;
    for attr in AttrReader::new(bytes) {
        print_attr(&attr?, 0, config.hex)?;
        count += 1;
    }
    debug!(attributes = count, "top-level attributes");

    if let Some(spec) = config.schema {
        let schema = parse_schema(&spec)?;
        let record = Decoder::new(&schema)
            .with_config(CodecConfig::default().with_max_message_size(config.max_message_size))
            .decode(bytes)?;

        println!("\ndecoded against `{spec}`:");
        for field in schema.fields() {
            let state = if record.is_present(field.ordinal()) { "" } else { " (absent)" };
            match record.get_at(field.ordinal()) {
                Some(WireValue::String(s)) => println!("  {} = {s:?}{state}", field.name()),
                Some(value) if field.wire_type().is_opaque() => {
                    println!("  {} = <{} bytes>{state}", field.name(), value.as_opaque().map_or(0, <[u8]>::len))
                }
                Some(value) => println!("  {} = {}{state}", field.name(), scalar(value)),
                None => println!("  {} = -{state}", field.name()),
            }
        }
    }

    Ok(())
}

fn parse_args() -> DumpConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config = DumpConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--schema" | "-s" => {
                if i + 1 < args.len() {
                    config.schema = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--max-size" => {
                if i + 1 < args.len() {
                    config.max_message_size = args[i + 1].parse().unwrap_or(config.max_message_size);
                    i += 1;
                }
            }
            "--hex" | "-x" => {
                config.hex = true;
            }
            "--help" | "-h" => {
                println!("blob_dump - print a raw attribute buffer\n");
                println!("Usage: blob_dump [OPTIONS] <FILE>\n");
                println!("Options:");
                println!("  -s, --schema <SPEC>    Decode against name:type[?],... (e.g. id:int32,msg:string?)");
                println!("      --max-size <BYTES> Maximum message size (default: 1048576)");
                println!("  -x, --hex              Show unspec payloads as hex");
                println!("  -h, --help             Show this help");
                std::process::exit(0);
            }
            other => {
                config.path = Some(other.to_string());
            }
        }
        i += 1;
    }

    config
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let config = parse_args();

    if let Err(e) = run(config) {
        eprintln!("❌ blob_dump: {}", e);
        std::process::exit(1);
    }
}
