use crate::models::disk::Disk;
use crate::sysfs;
use crate::topology::Topology;
use anyhow::Result;
use std::collections::HashMap;

/// Target indicator state. Locate and fault are mutually exclusive by
/// construction: every transition clears the opposing indicator first, so
/// the hardware never holds both longer than the gap between two writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedState {
    Locate,
    Fault,
    Off,
}

/// Write one slot's indicators through to sysfs, then mirror the result in
/// the record. No rollback: if the second write fails the slot stays
/// half-updated and the error names the file.
pub fn apply(disk: &mut Disk, state: LedState) -> Result<()> {
    match state {
        LedState::Locate => {
            set_fault(disk, 0)?;
            set_locate(disk, 1)
        }
        LedState::Fault => {
            set_locate(disk, 0)?;
            set_fault(disk, 1)
        }
        LedState::Off => {
            set_locate(disk, 0)?;
            set_fault(disk, 0)
        }
    }
}

fn set_fault(disk: &mut Disk, v: u8) -> Result<()> {
    sysfs::write_attr(&disk.path, "fault", if v == 0 { "0" } else { "1" })?;
    disk.fault = v;
    Ok(())
}

fn set_locate(disk: &mut Disk, v: u8) -> Result<()> {
    sysfs::write_attr(&disk.path, "locate", if v == 0 { "0" } else { "1" })?;
    disk.locate = v;
    Ok(())
}

/// Apply a state to every physical disk of one enclosure. Only the
/// canonical slot-keyed entries are visited — going through the
/// device-name/identifier aliases would rewrite each disk up to three
/// times.
pub fn apply_enclosure(topo: &mut Topology, enc_id: &str, state: LedState) -> Result<()> {
    let enc = topo
        .enclosures
        .get_mut(enc_id)
        .ok_or_else(|| anyhow::anyhow!("enclosure {} not found", enc_id))?;
    for id in enc.slot_ids() {
        apply(enc.get_mut(id), state)?;
    }
    Ok(())
}

/// Apply a state to every disk of every enclosure.
pub fn apply_all(topo: &mut Topology, state: LedState) -> Result<()> {
    let ids: Vec<String> = topo.enclosures.keys().cloned().collect();
    for id in ids {
        apply_enclosure(topo, &id, state)?;
    }
    Ok(())
}

/// Mirror storage-pool health onto the fault LEDs: unhealthy devices get
/// fault, healthy ones get off. Pool members that live outside any known
/// enclosure (boot disks, foreign vdevs) are warned about and skipped.
pub fn apply_pool_health(
    topo: &mut Topology,
    health: &HashMap<String, String>,
    healthy: &str,
) -> Result<()> {
    let mut devices: Vec<(&String, &String)> = health.iter().collect();
    devices.sort();

    for (ident, state) in devices {
        match topo.find_disk(ident) {
            None => eprintln!("warning: pool device {ident} not found in any enclosure, skipping"),
            Some((enc_id, disk_id)) => {
                let led = if state == healthy { LedState::Off } else { LedState::Fault };
                let enc = topo
                    .enclosures
                    .get_mut(&enc_id)
                    .ok_or_else(|| anyhow::anyhow!("enclosure {} not found", enc_id))?;
                apply(enc.get_mut(disk_id), led)?;
            }
        }
    }
    Ok(())
}
