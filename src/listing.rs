use crate::models::disk::Disk;
use crate::topology::Topology;
use anyhow::{bail, Result};
use std::collections::BTreeSet;

/// Iteration order of the selected disks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Enclosure by enclosure (numeric-suffix order), slots ascending within.
    ByEnclosure,
    /// Slot by slot, visiting each enclosure in turn per slot number.
    BySlot,
}

/// Select the populated disks to emit: ordering, then size filter, then the
/// 1-based first/last range over what survived.
pub fn select<'a>(
    topo: &'a Topology,
    enclosure: Option<&str>,
    order: Order,
    first: Option<usize>,
    last: Option<usize>,
    size: Option<&str>,
) -> Result<Vec<&'a Disk>> {
    let encs: Vec<_> = match enclosure {
        Some(key) => vec![topo.enclosure(key)?],
        None => topo.ordered(),
    };

    let mut disks: Vec<&Disk> = Vec::new();
    match order {
        Order::ByEnclosure => {
            for enc in &encs {
                disks.extend(enc.slots().filter(|d| d.populated()));
            }
        }
        Order::BySlot => {
            let max = encs.iter().map(|e| e.slot_count as u32).max().unwrap_or(0);
            for n in 1..=max {
                for enc in &encs {
                    if let Some(d) = enc.slot(n) {
                        if d.populated() {
                            disks.push(d);
                        }
                    }
                }
            }
        }
    }

    if let Some(size) = size {
        disks.retain(|d| d.size.text() == size);
    }

    let start = first.unwrap_or(1).saturating_sub(1);
    let end = last.unwrap_or(disks.len()).min(disks.len());
    if start >= disks.len() {
        return Ok(Vec::new());
    }
    Ok(disks[start..end].to_vec())
}

/// Group-per-line output for pool creation: every line is the group token
/// followed by exactly `group` device identifiers. Mixed sizes and ragged
/// groups are configuration mistakes and fail before anything is printed.
pub fn pool_create(disks: &[&Disk], group: usize, prefix: &str) -> Result<String> {
    if disks.is_empty() {
        bail!("no matching disks");
    }
    let sizes: BTreeSet<&str> = disks.iter().map(|d| d.size.text()).collect();
    if sizes.len() > 1 {
        bail!(
            "selected disks differ in size ({}); narrow the selection with a size filter",
            sizes.into_iter().collect::<Vec<_>>().join(", ")
        );
    }
    if group == 0 || disks.len() % group != 0 {
        bail!("{} disks do not divide into groups of {}", disks.len(), group);
    }

    let mut out = String::new();
    for chunk in disks.chunks(group) {
        let ids: Vec<&str> = chunk.iter().map(|d| d.ident.text()).collect();
        out.push_str(&format!("{} {}\n", prefix, ids.join(" ")));
    }
    Ok(out)
}

/// Flat comma-joined identifier list for fencing setups.
pub fn fence_list(disks: &[&Disk]) -> String {
    let ids: Vec<&str> = disks.iter().map(|d| d.ident.text()).collect();
    ids.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::disk::{Disk, Mapped};
    use crate::models::enclosure::Enclosure;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn mk_disk(slot: u32, tag: &str, size: &str, status: &str) -> Disk {
        let mut d = Disk::new(slot, PathBuf::new());
        d.address = Some(format!("5000{tag}"));
        d.device = Mapped::Named(format!("/dev/sd{tag}"));
        d.ident = Mapped::Named(format!("id-{tag}"));
        d.size = Mapped::Named(size.into());
        d.status = status.into();
        d
    }

    /// One enclosure with `n` populated slots and one NI bay at the end.
    fn topo_with(n: u32) -> Topology {
        let mut enc = Enclosure::new("/dev/sg2".into(), "t".into(), 24);
        for slot in 1..=n {
            enc.insert(mk_disk(slot, &format!("s{slot}"), "10.9TB", "OK"));
        }
        let mut ni = Disk::new(n + 1, PathBuf::new());
        ni.status = "NI".into();
        enc.insert(ni);

        let mut enclosures = BTreeMap::new();
        enclosures.insert(enc.id.clone(), enc);
        Topology { enclosures }
    }

    #[test]
    fn range_filter_picks_third_through_fifth_populated_slot() {
        let topo = topo_with(10);
        let disks =
            select(&topo, None, Order::ByEnclosure, Some(3), Some(5), None).unwrap();
        assert_eq!(fence_list(&disks), "id-s3,id-s4,id-s5");
    }

    #[test]
    fn ni_bays_never_listed() {
        let topo = topo_with(4);
        let disks = select(&topo, None, Order::ByEnclosure, None, None, None).unwrap();
        assert_eq!(disks.len(), 4);
    }

    #[test]
    fn by_slot_order_interleaves_enclosures() {
        let mut enc_a = Enclosure::new("/dev/sg2".into(), "t".into(), 24);
        let mut enc_b = Enclosure::new("/dev/sg3".into(), "t".into(), 24);
        enc_a.insert(mk_disk(1, "a1", "10.9TB", "OK"));
        enc_a.insert(mk_disk(2, "a2", "10.9TB", "OK"));
        enc_b.insert(mk_disk(1, "b1", "10.9TB", "OK"));

        let mut enclosures = BTreeMap::new();
        enclosures.insert(enc_a.id.clone(), enc_a);
        enclosures.insert(enc_b.id.clone(), enc_b);
        let topo = Topology { enclosures };

        let disks = select(&topo, None, Order::BySlot, None, None, None).unwrap();
        assert_eq!(fence_list(&disks), "id-a1,id-b1,id-a2");
    }

    #[test]
    fn pool_create_rejects_ragged_groups() {
        let topo = topo_with(10);
        let disks = select(&topo, None, Order::ByEnclosure, None, None, None).unwrap();
        assert!(pool_create(&disks, 4, "raidz2").is_err());

        let out = pool_create(&disks, 5, "raidz2").unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "raidz2 id-s1 id-s2 id-s3 id-s4 id-s5");
        assert!(lines.iter().all(|l| l.split_whitespace().count() == 6));
    }

    #[test]
    fn pool_create_rejects_mixed_sizes() {
        let mut enc = Enclosure::new("/dev/sg2".into(), "t".into(), 24);
        enc.insert(mk_disk(1, "a", "10.9TB", "OK"));
        enc.insert(mk_disk(2, "b", "3.64TB", "OK"));
        let mut enclosures = BTreeMap::new();
        enclosures.insert(enc.id.clone(), enc);
        let topo = Topology { enclosures };

        let disks = select(&topo, None, Order::ByEnclosure, None, None, None).unwrap();
        let err = pool_create(&disks, 2, "mirror").unwrap_err();
        assert!(err.to_string().contains("differ in size"));
    }

    #[test]
    fn size_filter_is_exact_match() {
        let mut enc = Enclosure::new("/dev/sg2".into(), "t".into(), 24);
        enc.insert(mk_disk(1, "a", "10.9TB", "OK"));
        enc.insert(mk_disk(2, "b", "3.64TB", "OK"));
        let mut enclosures = BTreeMap::new();
        enclosures.insert(enc.id.clone(), enc);
        let topo = Topology { enclosures };

        let disks =
            select(&topo, None, Order::ByEnclosure, None, None, Some("3.64TB")).unwrap();
        assert_eq!(fence_list(&disks), "id-b");
    }
}
