use crate::config::Config;
use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::process::Command;

/// Run `zpool status` and map device identifier → health keyword.
pub fn device_health(cfg: &Config) -> Result<HashMap<String, String>> {
    let out = Command::new(&cfg.commands.zpool)
        .arg("status")
        .output()
        .with_context(|| format!("{} not found", cfg.commands.zpool))?;
    if !out.status.success() {
        bail!("{} status failed ({})", cfg.commands.zpool, out.status);
    }
    Ok(parse_status(&String::from_utf8_lossy(&out.stdout)))
}

/// Leaf device lines of the config section sit under a fixed indent
/// (tab + 4 spaces) and carry name/state/read/write/cksum fields; pool and
/// vdev lines are indented less and fall through.
pub fn parse_status(text: &str) -> HashMap<String, String> {
    text.lines()
        .filter_map(|line| {
            line.strip_prefix("\t    ")?;
            let f: Vec<&str> = line.split_whitespace().collect();
            if f.len() < 5 {
                return None;
            }
            Some((f[0].to_string(), f[1].to_string()))
        })
        .collect()
}
