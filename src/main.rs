mod collectors;
mod config;
mod layout;
mod led;
mod listing;
mod models;
mod sysfs;
mod topology;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use config::Config;
use led::LedState;
use topology::Topology;

#[derive(Parser, Debug)]
#[command(name = "encled", about = "SAS enclosure bay mapper and slot LED control", version = "0.1")]
struct Cli {
    /// Disable the reverse-video highlight on lit slots
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the bay layout of every enclosure, or one disk's status block
    Status {
        /// Enclosure filter: /dev/sgN, sgN or N
        enclosure: Option<String>,

        /// Disk filter: slot number, device name or identifier
        disk: Option<String>,

        /// Print a one-shot JSON snapshot of the topology and exit
        #[arg(long)]
        json: bool,
    },

    /// Switch slot indicator LEDs (needs root)
    Led {
        #[arg(value_enum)]
        mode: LedMode,

        /// Enclosure filter: /dev/sgN, sgN or N
        enclosure: Option<String>,

        /// Disk filter: slot number, device name or identifier
        disk: Option<String>,
    },

    /// Emit device lists for pool creation or fencing setups
    List {
        #[arg(value_enum)]
        kind: ListKind,

        /// Enclosure filter: /dev/sgN, sgN or N
        enclosure: Option<String>,

        /// Iteration order of the selected disks
        #[arg(long, value_enum, default_value_t = OrderArg::ByEnclosure)]
        order: OrderArg,

        /// 1-based index of the first populated slot to include
        #[arg(long)]
        first: Option<usize>,

        /// 1-based index of the last populated slot to include
        #[arg(long)]
        last: Option<usize>,

        /// Keep only disks whose reported capacity equals this string (e.g. 10.9TB)
        #[arg(long)]
        size: Option<String>,

        /// Devices per group line (pool-create)
        #[arg(long, default_value_t = 8)]
        group: usize,

        /// Group-type token prefixed to every group line (pool-create)
        #[arg(long, default_value = "raidz2")]
        prefix: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum LedMode {
    Locate,
    Fault,
    Off,
    /// Mirror storage-pool health onto the fault LEDs
    Auto,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum ListKind {
    PoolCreate,
    FenceList,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum OrderArg {
    ByEnclosure,
    BySlot,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = Config::load();
    let color = cfg.general.color && !cli.no_color;

    let mut topo = topology::scan(&cfg).context("scanning enclosure topology")?;

    match cli.command {
        Command::Status { enclosure, disk, json } => {
            run_status(&topo, enclosure.as_deref(), disk.as_deref(), json, color)
        }
        Command::Led { mode, enclosure, disk } => {
            run_led(&cfg, &mut topo, mode, enclosure.as_deref(), disk.as_deref())
        }
        Command::List { kind, enclosure, order, first, last, size, group, prefix } => {
            let order = match order {
                OrderArg::ByEnclosure => listing::Order::ByEnclosure,
                OrderArg::BySlot      => listing::Order::BySlot,
            };
            let disks =
                listing::select(&topo, enclosure.as_deref(), order, first, last, size.as_deref())?;
            match kind {
                ListKind::PoolCreate => print!("{}", listing::pool_create(&disks, group, &prefix)?),
                ListKind::FenceList  => println!("{}", listing::fence_list(&disks)),
            }
            Ok(())
        }
    }
}

/// Resolve a disk filter, honoring an optional enclosure filter. A filter
/// that matches nothing is a user-facing fatal.
fn find_disk(
    topo: &Topology,
    enclosure: Option<&str>,
    key: &str,
) -> Result<(String, models::enclosure::DiskId)> {
    let found = match enclosure {
        Some(enc_key) => {
            let enc = topo.enclosure(enc_key)?;
            enc.lookup(key).map(|id| (enc.id.clone(), id))
        }
        None => topo.find_disk(key),
    };
    match found {
        Some(hit) => Ok(hit),
        None => bail!("disk {} not found", key),
    }
}

fn run_status(
    topo: &Topology,
    enclosure: Option<&str>,
    disk: Option<&str>,
    json: bool,
    color: bool,
) -> Result<()> {
    if json {
        return run_json_snapshot(topo);
    }

    if let Some(key) = disk {
        let (enc_id, disk_id) = find_disk(topo, enclosure, key)?;
        print!("{}", layout::render_disk(topo.enclosures[&enc_id].get(disk_id), color));
        return Ok(());
    }

    if let Some(enc_key) = enclosure {
        let enc = topo.enclosure(enc_key)?;
        println!("{}  {}  ({} slots)\n", enc.id, enc.description, enc.slot_count);
        print!("{}", layout::render(enc, color));
        return Ok(());
    }

    print!("{}", layout::render_all(topo, color));
    Ok(())
}

fn run_led(
    cfg: &Config,
    topo: &mut Topology,
    mode: LedMode,
    enclosure: Option<&str>,
    disk: Option<&str>,
) -> Result<()> {
    if !nix::unistd::Uid::effective().is_root() {
        bail!("led control needs root: the slot attribute files are root-writable");
    }

    let state = match mode {
        LedMode::Locate => LedState::Locate,
        LedMode::Fault  => LedState::Fault,
        LedMode::Off    => LedState::Off,
        LedMode::Auto   => {
            let health =
                collectors::zpool::device_health(cfg).context("querying pool status")?;
            return led::apply_pool_health(topo, &health, &cfg.pool.healthy);
        }
    };

    if let Some(key) = disk {
        let (enc_id, disk_id) = find_disk(topo, enclosure, key)?;
        let enc = topo
            .enclosures
            .get_mut(&enc_id)
            .ok_or_else(|| anyhow::anyhow!("enclosure {} not found", enc_id))?;
        return led::apply(enc.get_mut(disk_id), state);
    }

    match enclosure {
        Some(enc_key) => {
            let enc_id = topo.enclosure_id(enc_key)?;
            led::apply_enclosure(topo, &enc_id, state)
        }
        None => led::apply_all(topo, state),
    }
}

fn run_json_snapshot(topo: &Topology) -> Result<()> {
    use serde_json::{json, Value};

    let enclosures: Vec<Value> = topo
        .ordered()
        .iter()
        .map(|enc| {
            let disks: Vec<Value> = enc
                .slots()
                .map(|d| {
                    json!({
                        "slot":      d.slot,
                        "address":   d.address,
                        "device":    d.device.text(),
                        "ident":     d.ident.text(),
                        "size":      d.size.text(),
                        "status":    d.status,
                        "locate":    d.locate,
                        "fault":     d.fault,
                    })
                })
                .collect();
            json!({
                "id":          enc.id,
                "description": enc.description,
                "slot_count":  enc.slot_count,
                "disks":       disks,
            })
        })
        .collect();

    let snapshot = json!({
        "encled_version": "0.1",
        "timestamp": chrono::Local::now().to_rfc3339(),
        "enclosures": enclosures,
    });

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
