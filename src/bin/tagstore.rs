//! TagStore CLI
//!
//! Manipulates a region image file, and runs the allocation demo.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tagstore::{image, Handle, Result, StoreConfig, Tag, TagStore};
use tracing_subscriber::{fmt, EnvFilter};

/// TagStore CLI
#[derive(Parser, Debug)]
#[command(name = "tagstore")]
#[command(about = "Tagged record store over a fixed-size region")]
#[command(version)]
struct Args {
    /// Region image file
    #[arg(short, long, default_value = "./tagstore.img")]
    image: PathBuf,

    /// Compact tombstones when opening the image
    #[arg(long)]
    compact_on_open: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an empty region image
    Init {
        /// Region size in bytes (header included)
        #[arg(short, long, default_value = "6144")]
        capacity: usize,
    },

    /// Append a record
    Append {
        #[arg(short, long)]
        tag: Tag,

        /// Payload version
        #[arg(short = 'r', long = "record-version", default_value = "0")]
        record_version: u16,

        /// Payload (stored as UTF-8 bytes)
        data: String,
    },

    /// List records carrying a tag
    Find {
        #[arg(short, long)]
        tag: Tag,
    },

    /// Tombstone the first (or every) record carrying a tag
    Remove {
        #[arg(short, long)]
        tag: Tag,

        #[arg(short, long)]
        all: bool,
    },

    /// Verify the region and truncate any corrupt suffix
    Check,

    /// Compact tombstoned records
    Clean,

    /// Print region statistics and every entry
    Inspect,

    /// Run the in-memory allocation demo
    Demo {
        #[arg(short, long, default_value = "6144")]
        capacity: usize,

        #[arg(short, long, default_value = "128")]
        block_size: usize,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tagstore=debug"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();
    tracing::debug!("TagStore v{}", tagstore::VERSION);

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = StoreConfig::builder()
        .compact_on_open(args.compact_on_open)
        .build();

    match args.command {
        Commands::Init { capacity } => {
            let store = TagStore::reset(vec![0u8; capacity])?;
            image::save(&args.image, &store)?;
            println!("Initialized {} ({} bytes)", args.image.display(), capacity);
        }
        Commands::Append {
            tag,
            record_version,
            data,
        } => {
            let mut store = open(&args.image, &config)?;
            let handle = store.append_bytes(tag, record_version, data.as_bytes())?;
            image::save(&args.image, &store)?;
            println!("Appended tag {} at offset {}", tag, handle.offset());
        }
        Commands::Find { tag } => {
            let store = open(&args.image, &config)?;
            let mut count = 0;
            for found in store.find_all(tag)? {
                let payload = store.payload(found.handle)?;
                println!(
                    "offset={} version={} size={} data={:?}",
                    found.handle.offset(),
                    found.version,
                    found.payload_size,
                    String::from_utf8_lossy(payload)
                );
                count += 1;
            }
            println!("{} record(s) with tag {}", count, tag);
        }
        Commands::Remove { tag, all } => {
            let mut store = open(&args.image, &config)?;
            let handles: Vec<Handle> = store.find_all(tag)?.map(|f| f.handle).collect();
            let targets = if all { &handles[..] } else { &handles[..handles.len().min(1)] };
            for handle in targets {
                store.remove(*handle)?;
            }
            image::save(&args.image, &store)?;
            println!("Removed {} record(s) with tag {}", targets.len(), tag);
        }
        Commands::Check => {
            let bytes = image::load(&args.image)?;
            let mut store = TagStore::attach(bytes, &config)?;
            let outcome = store.check_and_repair();
            image::save(&args.image, &store)?;
            println!("{:?}", outcome);
        }
        Commands::Clean => {
            let mut store = open(&args.image, &config)?;
            let stats = store.clean();
            image::save(&args.image, &store)?;
            println!(
                "Removed {} tombstone(s), reclaimed {} bytes",
                stats.entries_removed, stats.bytes_reclaimed
            );
        }
        Commands::Inspect => {
            let store = open(&args.image, &config)?;
            let stats = store.stats();
            println!("{:#?}", stats);
            println!("digest=0x{:08x}", store.digest());
            for entry in store.entries() {
                println!(
                    "offset={:<6} tag={:<5} version={:<5} size={}",
                    entry.offset, entry.tag, entry.version, entry.payload_size
                );
            }
        }
        Commands::Demo {
            capacity,
            block_size,
        } => demo(capacity, block_size)?,
    }

    Ok(())
}

/// Load an image and bring it to a valid state
fn open(path: &Path, config: &StoreConfig) -> Result<TagStore<Vec<u8>>> {
    let bytes = image::load(path)?;
    let (store, report) = TagStore::initialize_with(bytes, config)?;
    tracing::debug!(?report, "Opened region image");
    Ok(store)
}

// =============================================================================
// Demo
// =============================================================================

const DEMO_RECORDS: usize = 24;

fn pattern(buffer_id: usize, index: usize) -> u8 {
    index.wrapping_mul(index).wrapping_add(buffer_id) as u8
}

fn pattern_fill(data: &mut [u8], buffer_id: usize) {
    for (i, byte) in data.iter_mut().enumerate() {
        *byte = pattern(buffer_id, i);
    }
}

fn pattern_check(data: &[u8], buffer_id: usize) -> bool {
    data.iter().enumerate().all(|(i, byte)| *byte == pattern(buffer_id, i))
}

fn demo(capacity: usize, block_size: usize) -> Result<()> {
    // Same tag for every record, checked through the returned handles
    let mut store = TagStore::reset(vec![0u8; capacity])?;
    let mut handles = Vec::with_capacity(DEMO_RECORDS);
    for i in 0..DEMO_RECORDS {
        match store.append(2, 0, block_size) {
            Ok(handle) => {
                pattern_fill(store.payload_mut(handle)?, i);
                handles.push(Some(handle));
            }
            Err(e) => {
                println!("# Failed to append {}: {}", i, e);
                handles.push(None);
            }
        }
    }
    for (i, handle) in handles.iter().enumerate() {
        match handle {
            Some(handle) if !pattern_check(store.payload(*handle)?, i) => {
                println!("# Error - Buffer {} failed pattern check", i)
            }
            Some(_) => {}
            None => println!("Skipping {}", i),
        }
    }

    // Invalidate the first half and compact
    for handle in handles.iter().take(DEMO_RECORDS / 2).flatten() {
        store.invalidate(*handle)?;
    }
    let stats = store.clean();
    let survivors: Vec<_> = store.find_all(2)?.collect();
    for (found, i) in survivors.iter().zip(DEMO_RECORDS / 2..) {
        if !pattern_check(store.payload(found.handle)?, i) {
            println!("# Error - Buffer {} failed pattern check after clean", i);
        }
    }
    println!(
        "Cleaned {} record(s); {} remain with tag 2",
        stats.entries_removed,
        survivors.len()
    );

    // One tag per record, checked through lookups
    let mut store = TagStore::reset(store.into_inner())?;
    for i in 0..DEMO_RECORDS {
        let tag = (i + 1) as Tag;
        match store.append(tag, 0, block_size) {
            Ok(handle) => pattern_fill(store.payload_mut(handle)?, tag as usize),
            Err(e) => println!("# Failed to append {}: {}", i, e),
        }
    }
    for i in 0..DEMO_RECORDS {
        let tag = (i + 1) as Tag;
        match store.find_next(tag, None)? {
            Some(found) if !pattern_check(store.payload(found.handle)?, tag as usize) => {
                println!("# Error - Buffer {} failed pattern check", i)
            }
            Some(_) => {}
            None => println!("# Failed to find {}", i),
        }
    }

    let stats = store.stats();
    println!(
        "Demo complete: {} live entries, {} of {} bytes used",
        stats.live_entries, stats.used, stats.entry_space
    );
    Ok(())
}
