use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub commands: CommandsConfig,

    #[serde(default)]
    pub pool: PoolConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Root of the kernel enclosure class tree.
    pub sysfs_root: String,
    /// Reverse-video highlight for slots with a lit locate/fault LED.
    pub color: bool,
}

/// Names of the external binaries, overridable for odd install paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandsConfig {
    pub lsscsi: String,
    pub sg_ses: String,
    pub zpool:  String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Health keyword that means "leave the fault LED off" in auto mode.
    pub healthy: String,
}

// ── Defaults ─────────────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        Self {
            general:  GeneralConfig::default(),
            commands: CommandsConfig::default(),
            pool:     PoolConfig::default(),
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { sysfs_root: "/sys/class/enclosure".into(), color: true }
    }
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self { lsscsi: "lsscsi".into(), sg_ses: "sg_ses".into(), zpool: "zpool".into() }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { healthy: "ONLINE".into() }
    }
}

// ── Load / Save ───────────────────────────────────────────────────────

impl Config {
    pub fn load() -> Self {
        match try_load() {
            Ok(c)  => c,
            Err(_) => {
                // Write defaults on first run (best-effort)
                let _ = try_write_defaults();
                Config::default()
            }
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("encled").join("encled.toml"))
    }
}

fn try_load() -> Result<Config> {
    let path = Config::config_path().ok_or_else(|| anyhow::anyhow!("no config dir"))?;
    let text = fs::read_to_string(path)?;
    let cfg: Config = toml::from_str(&text)?;
    Ok(cfg)
}

fn try_write_defaults() -> Result<()> {
    let path = Config::config_path().ok_or_else(|| anyhow::anyhow!("no config dir"))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let text = toml::to_string_pretty(&Config::default())?;
    fs::write(path, format!("# encled configuration\n# Generated on first run — edit freely\n\n{}", text))?;
    Ok(())
}
