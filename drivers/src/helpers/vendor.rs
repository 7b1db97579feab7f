/// T.35 vendor codes reported in the G.994.1 handshake.
const VENDORS: [(&str, &str); 17] = [
    ("ALCB", "Alcatel"),
    ("ANDV", "Analog Devices"),
    ("BDCM", "Broadcom"),
    ("CENT", "Centillium"),
    ("CNXT", "Conexant"),
    ("DRAY", "DrayTek"),
    ("GSPN", "Globespan"),
    ("IFTN", "Infineon"),
    ("IKNS", "Ikanos"),
    ("RETK", "Realtek"),
    ("META", "Metanoia"),
    ("MTIA", "Metanoia"),
    ("STMI", "STMicro"),
    ("TCCN", "TrendChip"),
    ("TCTN", "TrendChip"),
    ("TMMB", "Thomson"),
    ("TSTC", "Texas Instruments"),
];

/// Maps a vendor code to a readable name. Unknown codes are returned as-is, cut at the first NUL.
pub fn format_vendor(vendor: &str) -> String {
    if let Some((_, name)) = VENDORS.iter().find(|(code, _)| *code == vendor) {
        return name.to_string();
    }
    vendor.split('\0').next().unwrap_or_default().to_string()
}

/// Formats a two byte vendor specific chip version.
pub fn format_version(vendor: &str, version: &[u8]) -> String {
    let [a, b] = version else {
        return String::new();
    };
    let (a, b) = (*a, *b);
    if a == 0 && b == 0 {
        return String::new();
    }

    match vendor {
        "Infineon" if a & 0xf0 == 0x90 => format!(
            "{}.{}.{}.{} ({a}.{b})",
            a >> 4,
            ((a & 0xf) << 1) + (b >> 7),
            (b >> 4) & 0x7,
            b & 0xf
        ),
        "Infineon" => format!("{}.{}.{}.{} ({a}.{b})", a >> 4, a & 0xf, b >> 4, b & 0xf),
        "Broadcom" => format!("{}.{}.{} ({a}.{b})", a >> 4, ((a & 0xf) << 1) + (b >> 7), b & 0x7f),
        _ => format!("{a}.{b}"),
    }
}

/// Decodes hex digits with an optional `0x` prefix. Invalid input yields an empty vector.
pub fn parse_hex(input: &str) -> Vec<u8> {
    let input = input.trim();
    let input = input.strip_prefix("0x").unwrap_or(input);
    hex::decode(input).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn vendors() {
        assert_eq!(format_vendor("BDCM"), "Broadcom");
        assert_eq!(format_vendor("ABCD"), "ABCD");
        assert_eq!(format_vendor("AB\0\0"), "AB");
    }

    #[test]
    fn versions() {
        assert_eq!(format_version("Broadcom", &parse_hex("0xc21d")), "12.4.29 (194.29)");
        assert_eq!(format_version("Infineon", &[0x71, 0x23]), "7.1.2.3 (113.35)");
        assert_eq!(format_version("Infineon", &[0x92, 0xa3]), "9.5.2.3 (146.163)");
        assert_eq!(format_version("Other", &[1, 2]), "1.2");
        assert_eq!(format_version("Other", &[0, 0]), "");
        assert_eq!(format_version("Other", &[1]), "");
    }

    #[test]
    fn hex() {
        assert_eq!(parse_hex("0x0102"), vec![1, 2]);
        assert_eq!(parse_hex("ff"), vec![255]);
        assert_eq!(parse_hex("0xzz"), Vec::<u8>::new());
    }
}
