use crate::collectors::normalize_sas;
use crate::config::Config;
use anyhow::{bail, Context, Result};
use std::process::Command;

/// One "Array device slot" element from an enclosure's SES dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SesSlot {
    /// 1-based slot number (SES reports 0-based).
    pub slot: u32,
    /// Normalized SAS address; None when the bay reported all zeros.
    pub address: Option<String>,
}

/// Run the additional-element-status dump for one enclosure device.
pub fn dump(cfg: &Config, device: &str) -> Result<Vec<SesSlot>> {
    let out = Command::new(&cfg.commands.sg_ses)
        .args(["-p", "aes", device])
        .output()
        .with_context(|| format!("{} not found", cfg.commands.sg_ses))?;
    if !out.status.success() {
        bail!("{} -p aes {} failed ({})", cfg.commands.sg_ses, device, out.status);
    }
    Ok(parse_dump(&String::from_utf8_lossy(&out.stdout)))
}

/// Walk the dump line by line. "Element type:" opens a section and only
/// "Array device slot" sections hold candidate disks; "Element index:"
/// delimits per-slot blocks. Within a block the first "device slot number"
/// and "SAS address" fields win.
pub fn parse_dump(text: &str) -> Vec<SesSlot> {
    let mut slots = Vec::new();
    let mut in_array = false;
    let mut open = false;
    let mut slot: Option<u32> = None;
    let mut address: Option<String> = None;

    for line in text.lines() {
        let t = line.trim();
        if let Some(rest) = t.strip_prefix("Element type:") {
            flush(&mut slots, &mut slot, &mut address);
            in_array = rest.trim().starts_with("Array device slot");
            open = false;
        } else if t.starts_with("Element index:") {
            flush(&mut slots, &mut slot, &mut address);
            open = in_array;
        } else if open {
            if slot.is_none() {
                if let Some(v) = field_after(t, "device slot number:") {
                    slot = v.parse().ok();
                }
            }
            if address.is_none() {
                if let Some(v) = t.strip_prefix("SAS address:") {
                    let norm = normalize_sas(v);
                    // all zeros = unpopulated bay, keep the slot addressless
                    if !norm.is_empty() {
                        address = Some(norm);
                    }
                }
            }
        }
    }
    flush(&mut slots, &mut slot, &mut address);
    slots
}

fn flush(slots: &mut Vec<SesSlot>, slot: &mut Option<u32>, address: &mut Option<String>) {
    if let Some(n) = slot.take() {
        slots.push(SesSlot { slot: n + 1, address: address.take() });
    }
    *address = None;
}

/// Value following `key` up to the next comma; SES lines pack several
/// comma-separated fields.
fn field_after<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let pos = line.find(key)?;
    line[pos + key.len()..].split(',').next().map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = "\
  MYVENDOR  MYENCL  rev 4.04
  Additional element status diagnostic page:
    generation code: 0x0
    additional element status descriptor list
      Element type: Array device slot
        Element index: 0  eiioe=1
          Transport protocol: SAS
          number of phys: 1, not all phys: 0, device slot number: 4
          phy index: 0
            SAS address: 0x5000c500a1b2c3d4
            attached SAS address: 0x500304800a1b2c3f
        Element index: 1  eiioe=1
          Transport protocol: SAS
          number of phys: 1, not all phys: 0, device slot number: 5
          phy index: 0
            SAS address: 0x0000000000000000
            attached SAS address: 0x500304800a1b2c3f
      Element type: SAS expander
        Element index: 0
          number of phys: 1, not all phys: 0, device slot number: 9
            SAS address: 0x500304800a1b2c3e
";

    #[test]
    fn array_slots_are_one_based_with_zero_address_dropped() {
        let slots = parse_dump(DUMP);
        assert_eq!(
            slots,
            vec![
                SesSlot { slot: 5, address: Some("5000c500a1b2c3d4".into()) },
                SesSlot { slot: 6, address: None },
            ]
        );
    }

    #[test]
    fn expander_sections_are_ignored() {
        let slots = parse_dump(DUMP);
        assert!(slots.iter().all(|s| s.address.as_deref() != Some("500304800a1b2c3e")));
    }

    #[test]
    fn empty_dump_yields_no_slots() {
        assert!(parse_dump("nothing of interest\n").is_empty());
    }
}
