use std::path::PathBuf;

/// Result of joining a bay against the external device tables.
///
/// `Absent` means the bay reported no SAS address at all (nothing installed),
/// `Unknown` means an address was seen but the table had no entry for it.
/// The two print differently ("" vs "unknown") and must not be collapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mapped {
    Absent,
    Unknown,
    Named(String),
}

impl Mapped {
    pub fn text(&self) -> &str {
        match self {
            Mapped::Absent   => "",
            Mapped::Unknown  => "unknown",
            Mapped::Named(s) => s,
        }
    }

    pub fn from_lookup(value: Option<&str>) -> Self {
        match value {
            Some(v) => Mapped::Named(v.to_string()),
            None    => Mapped::Unknown,
        }
    }
}

/// One drive bay of an enclosure, rebuilt from scratch on every scan.
/// Only `fault` and `locate` are ever written back (through the LED path).
#[derive(Debug, Clone)]
pub struct Disk {
    /// 1-based slot number, stable for a given enclosure topology.
    pub slot: u32,
    /// Sysfs directory holding this slot's fault/locate/status/type files.
    pub path: PathBuf,
    /// SAS address reported by SES; None = unpopulated bay.
    pub address: Option<String>,
    pub device:  Mapped,
    pub ident:   Mapped,
    pub size:    Mapped,
    /// Free-text installation status; "not installed" is normalized to "NI".
    pub status: String,
    pub fault:  u8,
    pub locate: u8,
    /// Owning enclosure's device node, attached when the record is filed.
    pub enclosure: String,
}

impl Disk {
    pub fn new(slot: u32, path: PathBuf) -> Self {
        Self {
            slot,
            path,
            address:   None,
            device:    Mapped::Absent,
            ident:     Mapped::Absent,
            size:      Mapped::Absent,
            status:    String::new(),
            fault:     0,
            locate:    0,
            enclosure: String::new(),
        }
    }

    /// An externally flipped indicator can leave both bits set; any non-zero
    /// bit means the slot gets the highlighted rendering.
    pub fn is_lit(&self) -> bool {
        self.fault != 0 || self.locate != 0
    }

    /// A bay that holds an addressable, installed drive.
    pub fn populated(&self) -> bool {
        self.address.is_some() && self.status != "NI"
    }
}

/// Normalize the free-text status file content.
pub fn normalize_status(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "not installed" {
        "NI".to_string()
    } else {
        trimmed.to_string()
    }
}
