mod utils;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use gptctl::confirm::StdinGate;
use gptctl::ops;
use gptctl::session::Session;

const DEFAULT_DEVICE: &str = "/dev/sda";

#[derive(Parser)]
#[clap(about = "Inspect and edit the GUID partition table of a block device")]
struct Options {
    #[clap(short, long, parse(from_occurrences))]
    pub verbose: u32,

    #[clap(
        long,
        parse(try_from_str = utils::parse_sector_size),
        default_value = "512",
        long_help = "Sector size assumed for image files; real block devices report their own."
    )]
    pub sector_size: u64,

    #[clap(subcommand)]
    pub subcommand: SubCommand,
}

#[derive(Parser)]
enum SubCommand {
    #[clap(about = "List partitions")]
    Dump(DumpOptions),

    #[clap(about = "Add a partition occupying a block range")]
    Add(AddOptions),

    #[clap(about = "Delete the partition at the given slot index")]
    Remove(RemoveOptions),
}

#[derive(Parser)]
struct DumpOptions {
    #[clap(parse(from_os_str))]
    pub device: Option<PathBuf>,
}

#[derive(Parser)]
struct AddOptions {
    #[clap(parse(try_from_str = utils::parse_lba), help = "First LBA of the new partition")]
    pub offset: u64,

    #[clap(parse(try_from_str = utils::parse_lba), help = "Partition size in blocks")]
    pub blocks: u64,

    pub name: String,

    #[clap(parse(from_os_str))]
    pub device: Option<PathBuf>,
}

#[derive(Parser)]
struct RemoveOptions {
    #[clap(help = "Zero-based slot index")]
    pub index: u32,

    #[clap(parse(from_os_str))]
    pub device: Option<PathBuf>,
}

fn device_path(device: &Option<PathBuf>) -> &Path {
    device.as_deref().unwrap_or_else(|| Path::new(DEFAULT_DEVICE))
}

fn main() -> anyhow::Result<()> {
    better_panic::install();
    let options = Options::parse();
    utils::setup_logging(options.verbose);

    match options.subcommand {
        SubCommand::Dump(o) => dump(&o, options.sector_size),
        SubCommand::Add(o) => add(&o, options.sector_size),
        SubCommand::Remove(o) => remove(&o, options.sector_size),
    }
}

fn dump(o: &DumpOptions, sector_size: u64) -> anyhow::Result<()> {
    let session = Session::open(device_path(&o.device), sector_size, None)
        .context("failed to open device")?;

    let rows = ops::dump(&session)?;

    println!(
        "{:<6} {:<10} {:<10} {:<10} {:<38} Name",
        "Index", "First", "Last", "Blocks", "Unique GUID"
    );
    for r in rows.iter() {
        println!(
            "{:<6} {:<10} {:<10} {:<10} {:<38} {}",
            r.index, r.first_lba, r.last_lba, r.blocks, r.guid, r.name
        );
    }
    println!("Total: {} partitions", rows.len());

    Ok(())
}

fn add(o: &AddOptions, sector_size: u64) -> anyhow::Result<()> {
    let mut gate = StdinGate;
    let mut session = Session::open(device_path(&o.device), sector_size, Some(&mut gate))
        .context("failed to open device")?;

    let added = ops::add(&mut session, o.offset, o.blocks, &o.name)?;
    println!(
        "add partition: name={} offset={:#x} blocks={:#x}",
        o.name, added.first_lba, added.blocks
    );

    Ok(())
}

fn remove(o: &RemoveOptions, sector_size: u64) -> anyhow::Result<()> {
    let mut gate = StdinGate;
    let mut session = Session::open(device_path(&o.device), sector_size, Some(&mut gate))
        .context("failed to open device")?;

    if let Some(removed) = ops::remove(&mut session, o.index)? {
        println!("remove partition: n={} name={}", removed.index, removed.name);
    }

    Ok(())
}
