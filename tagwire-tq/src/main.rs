mod parser;

use tagwire::*;
use std::io::{self, Read, Write};
use anyhow::{Context, Result};
use structopt::StructOpt;
use std::str::from_utf8;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Decode and print tagwire records
#[derive(StructOpt)]
#[structopt(name = "tq")]
struct Opt {
    /// parse a textual representation and encode it into a binary record instead
    #[structopt(short, long)]
    encode: bool,
    /// declared field types, for instance `1:string,2:sint32`. Every field with a varint payload
    /// needs an entry.
    #[structopt(short, long, parse(try_from_str = parser::schema), default_value = "")]
    schema: Schema,
    /// read binary input as base64 text, or with --encode emit base64 text instead of raw bytes
    #[structopt(short, long)]
    base64: bool,
    /// log level for the codec if RUST_LOG is unset
    #[structopt(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let opt = Opt::from_args();
    init_logging(&opt.log_level)?;
    let mut buffer = Vec::new();
    io::stdin().read_to_end(&mut buffer).context("Failed to read stdin")?;
    debug!(bytes = buffer.len(), schema = %opt.schema, "read input");
    if opt.encode {
        encode(&buffer, &opt)
    } else {
        print(&buffer, &opt)
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("warn").add_directive(format!("tagwire={}", level).parse()?),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

fn print(buffer: &[u8], opt: &Opt) -> Result<()> {
    let raw;
    let buffer = if opt.base64 {
        let text = from_utf8(buffer).context("input is not utf-8")?;
        raw = base64::decode(text.trim()).context("input is not valid base64")?;
        &raw[..]
    } else {
        buffer
    };
    let mut record = Record::with_schema(opt.schema.clone());
    Decoder::decode(buffer, &mut record).context("Decoding error")?;
    println!("{}", &record);
    Ok(())
}

fn encode(buffer: &[u8], opt: &Opt) -> Result<()> {
    let string = from_utf8(buffer).context("input is not utf-8")?;
    let record = parser::parse(string, &opt.schema)?;
    let bytes = to_bytes(&record).context("Encoding error")?;
    let mut stdout = io::stdout();
    if opt.base64 {
        writeln!(stdout, "{}", base64::encode(&bytes))?;
    } else {
        stdout.write_all(&bytes).context("Failed to write stdout")?;
    }
    stdout.flush()?;
    Ok(())
}
