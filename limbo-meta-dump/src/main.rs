//! Print the NBT of an item definition as a client of the given version receives it.

use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use limbo_meta::{ItemDisplay, ItemMeta, ItemMetaConfig, ProtocolVersion, Text};

pub mod config;


#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Client protocol version, either a release name like `1.13` or a protocol id.
    #[arg(short = 'p', long, value_parser = parse_version)]
    protocol: ProtocolVersion,
    /// Display name of the item.
    #[arg(long)]
    name: Option<String>,
    /// A line of lore, can be repeated.
    #[arg(long)]
    lore: Vec<String>,
    /// Leather armor color.
    #[arg(long)]
    color: Option<i32>,
    /// Show the enchantment glint.
    #[arg(long)]
    enchanted: bool,
    /// Skull owner, `<uuid or i,i,i,i>;<texture>` or `<texture>`.
    #[arg(long)]
    skull_owner: Option<String>,
}

fn parse_version(s: &str) -> Result<ProtocolVersion, String> {
    ProtocolVersion::from_name(s)
        .or_else(|| s.parse().ok().map(ProtocolVersion))
        .ok_or_else(|| format!("unknown protocol version: {s}"))
}


pub fn main() -> ExitCode {

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = ItemMetaConfig {
        color: args.color,
        enchanted: args.enchanted,
        skull_owner: args.skull_owner,
    };

    let display = if args.name.is_none() && args.lore.is_empty() {
        ItemDisplay::Blank
    } else {
        ItemDisplay::Static {
            name: args.name.map(Text::from),
            lore: args.lore.into_iter().map(Text::from).collect(),
        }
    };

    let meta = match ItemMeta::from_config(&config, display) {
        Ok(meta) => meta,
        Err(e) => {
            error!("invalid item meta: {e}");
            return ExitCode::FAILURE;
        }
    };

    match meta.encode(args.protocol) {
        Ok(root) => println!("{root:#?}"),
        Err(e) => {
            error!("failed to encode item meta for {}: {e}", args.protocol);
            return ExitCode::FAILURE;
        }
    }

    if config::hex_dump() {

        let mut buf = Vec::new();
        if let Err(e) = meta.write_nbt(args.protocol, &mut buf) {
            error!("failed to write item meta for {}: {e}", args.protocol);
            return ExitCode::FAILURE;
        }

        for chunk in buf.chunks(16) {
            let line = chunk.iter().map(|b| format!("{b:02X}")).collect::<Vec<_>>().join(" ");
            println!("{line}");
        }

    }

    ExitCode::SUCCESS

}
