pub mod lsscsi;
pub mod ses;
pub mod zpool;

/// Normalize a SAS address for joining across sources: lowercase hex with
/// the "0x" prefix and leading zeros stripped. An all-zero address
/// normalizes to "" (unpopulated bay).
pub fn normalize_sas(raw: &str) -> String {
    let hex = raw.trim().to_ascii_lowercase();
    let hex = hex.strip_prefix("0x").unwrap_or(&hex);
    hex.trim_start_matches('0').to_string()
}

#[cfg(test)]
mod tests {
    use super::normalize_sas;

    #[test]
    fn sas_forms_join_consistently() {
        assert_eq!(normalize_sas("0x5000C500A1B2C3D4"), "5000c500a1b2c3d4");
        assert_eq!(normalize_sas("5000c500a1b2c3d4"), "5000c500a1b2c3d4");
        assert_eq!(normalize_sas("0x0000000000000000"), "");
    }
}
