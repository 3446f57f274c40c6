use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Slot directory naming convention of this machine's enclosure driver.
///
/// Some expanders expose bays as "7", some as "Slot 07"; some number from 0,
/// some from 1. Both quirks are probed once at startup and threaded through
/// as an immutable value instead of living in process-global state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotNaming {
    /// Literal prefix in front of the slot number ("", "Slot" or "Slot ").
    pub prefix: String,
    /// 1 when the driver numbers slots from 0, else 0. Subtracted from the
    /// 1-based slot number before building directory names.
    pub offset: u32,
}

impl SlotNaming {
    /// Probe one enclosure directory for prefixed entries and zero-padded
    /// "00" forms.
    pub fn detect(dir: &Path) -> Result<Self> {
        let mut prefix = String::new();
        let mut offset = 0;

        let entries =
            fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))?;
        for entry in entries {
            let name = entry?.file_name().to_string_lossy().into_owned();
            let (p, rest) = if let Some(r) = name.strip_prefix("Slot ") {
                ("Slot ", r)
            } else if let Some(r) = name.strip_prefix("Slot") {
                ("Slot", r)
            } else {
                ("", name.as_str())
            };
            if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
                continue;
            }
            if p.len() > prefix.len() {
                prefix = p.to_string();
            }
            if rest.parse::<u32>().unwrap_or(1) == 0 {
                offset = 1;
            }
        }

        Ok(Self { prefix, offset })
    }

    /// True when `name` is a slot directory under this convention.
    fn matches(&self, name: &str) -> bool {
        match name.strip_prefix(&self.prefix) {
            Some(rest) => !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()),
            None => false,
        }
    }
}

/// The enclosure's own sysfs directory ("look up enclosure root" sentinel).
pub fn enclosure_dir(root: &Path, tuple: &str) -> Result<PathBuf> {
    let dir = root.join(tuple);
    if dir.is_dir() {
        Ok(dir)
    } else {
        bail!("no sysfs entry for enclosure {} under {}", tuple, root.display())
    }
}

/// Number of bays: slot directories matching the naming convention.
pub fn slot_count(dir: &Path, naming: &SlotNaming) -> Result<usize> {
    let entries = fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))?;
    let mut count = 0;
    for entry in entries {
        let entry = entry?;
        if naming.matches(&entry.file_name().to_string_lossy()) && entry.path().is_dir() {
            count += 1;
        }
    }
    Ok(count)
}

/// Resolve the attribute directory of one 1-based slot.
///
/// Tries the bare number first, then the detected prefix with the number
/// zero-padded by up to 3 extra leading zeros. A candidate only wins if it
/// contains a `type` file. Exhausting every form is fatal: nothing else in
/// the program can work without the slot's attribute files.
pub fn resolve_slot(dir: &Path, naming: &SlotNaming, slot: u32) -> Result<PathBuf> {
    let n = slot.saturating_sub(naming.offset);

    let mut candidates = vec![n.to_string()];
    let digits = n.to_string().len();
    for extra in 0..4 {
        let width = digits + extra;
        candidates.push(format!("{}{:0width$}", naming.prefix, n));
    }

    for name in candidates {
        let path = dir.join(&name);
        if path.join("type").is_file() {
            return Ok(path);
        }
    }
    bail!("no slot directory for slot {} under {}", slot, dir.display())
}

pub fn read_attr(dir: &Path, name: &str) -> Result<String> {
    let path = dir.join(name);
    let text =
        fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    Ok(text.trim().to_string())
}

pub fn write_attr(dir: &Path, name: &str, value: &str) -> Result<()> {
    let path = dir.join(name);
    fs::write(&path, value).with_context(|| format!("writing {}", path.display()))
}
