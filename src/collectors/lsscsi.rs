use crate::collectors::normalize_sas;
use crate::config::Config;
use anyhow::{bail, Context, Result};
use std::process::Command;

/// One enclosure device from the generic SCSI listing.
#[derive(Debug, Clone)]
pub struct EnclosureEntry {
    /// SCSI tuple, brackets stripped: "0:0:32:0".
    pub tuple: String,
    /// Vendor/model text, best effort.
    pub description: String,
    /// Enclosure device node, e.g. "/dev/sg2".
    pub device: String,
}

/// One disk from the transport listing, keyed by normalized SAS address.
#[derive(Debug, Clone)]
pub struct DiskEntry {
    pub address: String,
    pub device:  String,
    pub ident:   String,
    pub size:    String,
}

/// Run the generic listing and keep the enclosure lines.
pub fn enclosures(cfg: &Config) -> Result<Vec<EnclosureEntry>> {
    let text = run(&cfg.commands.lsscsi, &["-g"])?;
    Ok(parse_enclosures(&text))
}

/// Run the transport+id+size listing and keep the SAS disk lines.
pub fn disks(cfg: &Config) -> Result<Vec<DiskEntry>> {
    let text = run(&cfg.commands.lsscsi, &["-t", "-i", "-s"])?;
    Ok(parse_disks(&text))
}

fn run(bin: &str, args: &[&str]) -> Result<String> {
    let out = Command::new(bin)
        .args(args)
        .output()
        .with_context(|| format!("{bin} not found"))?;
    if !out.status.success() {
        bail!("{} {} failed ({})", bin, args.join(" "), out.status);
    }
    Ok(String::from_utf8_lossy(&out.stdout).into_owned())
}

/// A line describes an enclosure iff its second field is the literal
/// (truncated) "enclosu". Malformed lines are skipped.
pub fn parse_enclosures(text: &str) -> Vec<EnclosureEntry> {
    text.lines()
        .filter_map(|line| {
            let f: Vec<&str> = line.split_whitespace().collect();
            if f.len() < 2 || f[1] != "enclosu" {
                return None;
            }
            let tuple = f[0].trim_matches(|c| c == '[' || c == ']').to_string();
            let device = (*f.last()?).to_string();
            let description = if f.len() > 3 {
                f[2..f.len() - 1]
                    .iter()
                    .filter(|s| **s != "-")
                    .copied()
                    .collect::<Vec<_>>()
                    .join(" ")
            } else {
                String::new()
            };
            Some(EnclosureEntry { tuple, description, device })
        })
        .collect()
}

/// Disk lines carry ≥5 fields with "disk" second and a "sas:"-prefixed
/// address third; device path, identifier and size are the last three.
pub fn parse_disks(text: &str) -> Vec<DiskEntry> {
    text.lines()
        .filter_map(|line| {
            let f: Vec<&str> = line.split_whitespace().collect();
            if f.len() < 5 || f[1] != "disk" || !f[2].starts_with("sas:") {
                return None;
            }
            let address = normalize_sas(&f[2]["sas:".len()..]);
            Some(DiskEntry {
                address,
                device: f[f.len() - 3].to_string(),
                ident:  f[f.len() - 2].to_string(),
                size:   f[f.len() - 1].to_string(),
            })
        })
        .collect()
}
