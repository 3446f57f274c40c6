use crate::models::disk::Disk;
use std::collections::{BTreeMap, HashMap};

/// Index into an enclosure's disk arena.
pub type DiskId = usize;

/// One physical chassis. Disks live in an arena and the alias maps store
/// arena ids, so a write through any alias is visible through all of them.
#[derive(Debug)]
pub struct Enclosure {
    /// Enclosure device node, e.g. "/dev/sg2".
    pub id: String,
    pub description: String,
    pub slot_count: usize,
    disks:     Vec<Disk>,
    by_slot:   BTreeMap<u32, DiskId>,
    by_device: HashMap<String, DiskId>,
    by_ident:  HashMap<String, DiskId>,
}

impl Enclosure {
    pub fn new(id: String, description: String, slot_count: usize) -> Self {
        Self {
            id,
            description,
            slot_count,
            disks:     Vec::new(),
            by_slot:   BTreeMap::new(),
            by_device: HashMap::new(),
            by_ident:  HashMap::new(),
        }
    }

    /// File a disk under its slot key, and — when it carries an address —
    /// under its device-name and identifier keys as well.
    pub fn insert(&mut self, mut disk: Disk) -> DiskId {
        disk.enclosure = self.id.clone();
        let id = self.disks.len();
        self.by_slot.insert(disk.slot, id);
        if disk.address.is_some() {
            self.by_device.insert(disk.device.text().to_string(), id);
            self.by_ident.insert(disk.ident.text().to_string(), id);
        }
        self.disks.push(disk);
        id
    }

    pub fn get(&self, id: DiskId) -> &Disk {
        &self.disks[id]
    }

    pub fn get_mut(&mut self, id: DiskId) -> &mut Disk {
        &mut self.disks[id]
    }

    pub fn slot(&self, n: u32) -> Option<&Disk> {
        self.by_slot.get(&n).map(|&id| &self.disks[id])
    }

    /// Canonical iteration: slot order, each physical disk exactly once.
    pub fn slots(&self) -> impl Iterator<Item = &Disk> {
        self.by_slot.values().map(|&id| &self.disks[id])
    }

    /// Canonical ids in slot order, for mutation loops.
    pub fn slot_ids(&self) -> Vec<DiskId> {
        self.by_slot.values().copied().collect()
    }

    /// Look a disk up by slot number, device name ("/dev/sdf" or "sdf"),
    /// or identifier.
    pub fn lookup(&self, key: &str) -> Option<DiskId> {
        if let Ok(n) = key.parse::<u32>() {
            if let Some(&id) = self.by_slot.get(&n) {
                return Some(id);
            }
        }
        if let Some(&id) = self.by_device.get(key) {
            return Some(id);
        }
        if let Some(&id) = self.by_device.get(&format!("/dev/{key}")) {
            return Some(id);
        }
        self.by_ident.get(key).copied()
    }

    /// Trailing digits of the id, for display ordering ("/dev/sg11" → 11).
    pub fn numeric_suffix(&self) -> u64 {
        let digits: String = self
            .id
            .chars()
            .rev()
            .take_while(|c| c.is_ascii_digit())
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        digits.parse().unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::disk::{Disk, Mapped};
    use std::path::PathBuf;

    fn addressed_disk(slot: u32) -> Disk {
        let mut d = Disk::new(slot, PathBuf::new());
        d.address = Some(format!("5000c500a1b2c3{slot:02x}"));
        d.device = Mapped::Named(format!("/dev/sd{}", (b'a' + slot as u8) as char));
        d.ident = Mapped::Named(format!("35000c500a1b2c3{slot:02x}"));
        d.size = Mapped::Named("10.9TB".into());
        d.status = "OK".into();
        d
    }

    #[test]
    fn addressed_disk_reachable_under_three_keys() {
        let mut enc = Enclosure::new("/dev/sg2".into(), "test".into(), 24);
        let id = enc.insert(addressed_disk(4));

        assert_eq!(enc.lookup("4"), Some(id));
        assert_eq!(enc.lookup("/dev/sde"), Some(id));
        assert_eq!(enc.lookup("sde"), Some(id));
        assert_eq!(enc.lookup("35000c500a1b2c304"), Some(id));
        assert_eq!(enc.get(id).enclosure, "/dev/sg2");
    }

    #[test]
    fn addressless_disk_only_under_slot_key() {
        let mut enc = Enclosure::new("/dev/sg2".into(), "test".into(), 24);
        let id = enc.insert(Disk::new(7, PathBuf::new()));

        assert_eq!(enc.lookup("7"), Some(id));
        // The empty alias strings must not be registered.
        assert_eq!(enc.lookup(""), None);
    }

    #[test]
    fn mutation_via_one_alias_visible_via_all() {
        let mut enc = Enclosure::new("/dev/sg2".into(), "test".into(), 24);
        enc.insert(addressed_disk(4));

        let id = enc.lookup("/dev/sde").unwrap();
        enc.get_mut(id).fault = 1;
        let via_ident = enc.lookup("35000c500a1b2c304").unwrap();
        assert_eq!(enc.get(via_ident).fault, 1);
    }

    #[test]
    fn numeric_suffix_ordering_key() {
        let enc = Enclosure::new("/dev/sg11".into(), "t".into(), 24);
        assert_eq!(enc.numeric_suffix(), 11);
    }
}
