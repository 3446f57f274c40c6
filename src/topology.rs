use crate::collectors::lsscsi::{DiskEntry, EnclosureEntry};
use crate::collectors::ses::SesSlot;
use crate::collectors::{lsscsi, ses};
use crate::config::Config;
use crate::models::disk::{normalize_status, Disk, Mapped};
use crate::models::enclosure::{DiskId, Enclosure};
use crate::sysfs::{self, SlotNaming};
use anyhow::{bail, Context, Result};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// The reconciled view of every enclosure on the system, keyed by
/// enclosure device node.
#[derive(Debug)]
pub struct Topology {
    pub enclosures: BTreeMap<String, Enclosure>,
}

impl Topology {
    /// Enclosures in ascending numeric-suffix order of their device node
    /// ("/dev/sg2" before "/dev/sg11", which a lexical sort would invert).
    pub fn ordered(&self) -> Vec<&Enclosure> {
        let mut encs: Vec<&Enclosure> = self.enclosures.values().collect();
        encs.sort_by_key(|e| e.numeric_suffix());
        encs
    }

    /// Find one enclosure by device node ("/dev/sg2"), short name ("sg2")
    /// or numeric suffix ("2").
    pub fn enclosure(&self, key: &str) -> Result<&Enclosure> {
        self.enclosure_id(key).map(|id| &self.enclosures[&id])
    }

    pub fn enclosure_id(&self, key: &str) -> Result<String> {
        for enc in self.enclosures.values() {
            let matches = enc.id == key
                || enc.id.ends_with(&format!("/{key}"))
                || key.parse::<u64>().map_or(false, |n| enc.numeric_suffix() == n);
            if matches {
                return Ok(enc.id.clone());
            }
        }
        bail!("enclosure {} not found", key)
    }

    /// Find one disk across all enclosures (numeric-suffix order, so a slot
    /// number hits the lowest-numbered enclosure first).
    pub fn find_disk(&self, key: &str) -> Option<(String, DiskId)> {
        for enc in self.ordered() {
            if let Some(id) = enc.lookup(key) {
                return Some((enc.id.clone(), id));
            }
        }
        None
    }
}

/// Full scan: listings, naming detection, SES dumps, reconciliation.
pub fn scan(cfg: &Config) -> Result<Topology> {
    let enclosures = lsscsi::enclosures(cfg).context("listing enclosure devices")?;
    if enclosures.is_empty() {
        bail!("no SCSI enclosures found");
    }
    let disks = lsscsi::disks(cfg).context("listing SAS disks")?;

    let root = Path::new(&cfg.general.sysfs_root);
    let first = sysfs::enclosure_dir(root, &enclosures[0].tuple)?;
    let naming = SlotNaming::detect(&first).context("probing slot naming convention")?;

    let mut dumps = HashMap::new();
    for enc in &enclosures {
        let slots = ses::dump(cfg, &enc.device)
            .with_context(|| format!("reading SES elements of {}", enc.device))?;
        dumps.insert(enc.device.clone(), slots);
    }

    reconcile(root, &naming, &enclosures, &disks, &dumps)
}

/// Join the three sources into one record per physical bay.
pub fn reconcile(
    root: &Path,
    naming: &SlotNaming,
    enclosures: &[EnclosureEntry],
    disks: &[DiskEntry],
    dumps: &HashMap<String, Vec<SesSlot>>,
) -> Result<Topology> {
    let by_address: HashMap<&str, &DiskEntry> =
        disks.iter().map(|d| (d.address.as_str(), d)).collect();

    let mut out = BTreeMap::new();
    for entry in enclosures {
        let dir = sysfs::enclosure_dir(root, &entry.tuple)?;
        let slot_count = sysfs::slot_count(&dir, naming)?;
        let mut enc =
            Enclosure::new(entry.device.clone(), entry.description.clone(), slot_count);

        let empty = Vec::new();
        for ses_slot in dumps.get(&entry.device).unwrap_or(&empty) {
            let path = sysfs::resolve_slot(&dir, naming, ses_slot.slot)
                .with_context(|| format!("enclosure {}", entry.device))?;

            let mut disk = Disk::new(ses_slot.slot, path);
            disk.fault = sysfs::read_attr(&disk.path, "fault")?.parse().unwrap_or(0);
            disk.locate = sysfs::read_attr(&disk.path, "locate")?.parse().unwrap_or(0);
            disk.status = normalize_status(&sysfs::read_attr(&disk.path, "status")?);

            if let Some(addr) = &ses_slot.address {
                disk.address = Some(addr.clone());
                let entry = by_address.get(addr.as_str());
                disk.device = Mapped::from_lookup(entry.map(|e| e.device.as_str()));
                disk.ident  = Mapped::from_lookup(entry.map(|e| e.ident.as_str()));
                disk.size   = Mapped::from_lookup(entry.map(|e| e.size.as_str()));
            }
            enc.insert(disk);
        }
        out.insert(entry.device.clone(), enc);
    }

    Ok(Topology { enclosures: out })
}
