//! Conversions between command-line strings and the fixed-width name/GUID
//! encodings stored in the partition entry array.

use std::result;

use uuid::Uuid;

/// Transliterates GPT partition name code units to plain ASCII.
///
/// Every unit is masked to its low 7 bits; zero-valued units are skipped, not
/// treated as a terminator, so embedded padding anywhere in the 36-unit field
/// drops out of the result.
pub fn decode_name<I>(units: I) -> String
where
    I: IntoIterator<Item = u16>,
{
    let mut out = String::new();
    for x in units {
        let c = (x & 0x7f) as u8;
        if c == 0 {
            continue;
        }
        out.push(c as char);
    }

    out
}

/// Renders stored GUID bytes in the canonical mixed-endian text form:
/// the first three fields byte-reversed, the last two in stored order.
pub fn format_guid(guid: &[u8; 16]) -> String {
    format!(
        "{:02X}{:02X}{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}",
        guid[3], guid[2], guid[1], guid[0],
        guid[5], guid[4],
        guid[7], guid[6],
        guid[8], guid[9],
        guid[10], guid[11], guid[12], guid[13], guid[14], guid[15]
    )
}

/// Inverse of [`format_guid`]: canonical text form back to stored bytes.
pub fn parse_guid(s: &str) -> result::Result<[u8; 16], String> {
    // positions of each textual byte pair within the stored array
    const LAYOUT: [usize; 16] = [3, 2, 1, 0, 5, 4, 7, 6, 8, 9, 10, 11, 12, 13, 14, 15];

    if s.len() != 36 {
        return Err("GUID must be 36 characters long".to_owned());
    }

    let mut guid = [0u8; 16];
    let mut pairs = s.split('-').flat_map(|g| g.as_bytes().chunks(2));
    for &index in LAYOUT.iter() {
        let pair = pairs.next().ok_or_else(|| "truncated GUID".to_owned())?;
        let s = ::std::str::from_utf8(pair).map_err(|e| e.to_string())?;
        guid[index] = u8::from_str_radix(s, 16).map_err(|e| e.to_string())?;
    }

    Ok(guid)
}

/// Encodes a canonical UUID into the byte layout the entry array stores:
/// little-endian first three fields, remaining bytes verbatim.
pub fn encode_guid(uuid: &Uuid) -> [u8; 16] {
    let (d1, d2, d3, d4) = uuid.as_fields();

    let mut guid = [0u8; 16];
    guid[0..4].copy_from_slice(&d1.to_le_bytes());
    guid[4..6].copy_from_slice(&d2.to_le_bytes());
    guid[6..8].copy_from_slice(&d3.to_le_bytes());
    guid[8..16].copy_from_slice(d4);
    guid
}

/// Draws a fresh unique GUID from the process CSPRNG.
pub fn random_guid() -> [u8; 16] {
    encode_guid(&Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_decode_name_empty() {
        assert_eq!(decode_name([0u16; 36].iter().cloned()), "");
    }

    #[test]
    fn test_decode_name_skips_embedded_zeros() {
        let mut units = [0u16; 36];
        units[0] = b's' as u16;
        units[2] = b'y' as u16;
        units[7] = b's' as u16;
        assert_eq!(decode_name(units.iter().cloned()), "sys");
    }

    #[test]
    fn test_decode_name_masks_to_7_bits() {
        // 0xE9 -> 0x69 'i', 0x100 masks to zero and drops out
        assert_eq!(decode_name(vec![b'h' as u16, 0xE9, 0x100]), "hi");
    }

    #[test]
    fn test_format_guid() {
        let guid = [
            0xA2, 0xA0, 0xD0, 0xEB, 0xE5, 0xB9, 0x33, 0x44, 0x87, 0xC0, 0x68, 0xB6, 0xB7, 0x26,
            0x99, 0xC7,
        ];
        assert_eq!(format_guid(&guid), "EBD0A0A2-B9E5-4433-87C0-68B6B72699C7");
        assert_eq!(parse_guid(&format_guid(&guid)).unwrap(), guid);
    }

    #[test]
    fn test_parse_guid_roundtrip() {
        let s = "EBD0A0A2-B9E5-4433-87C0-68B6B72699C7";
        let guid = parse_guid(s).unwrap();
        assert_eq!(format_guid(&guid), s);

        assert!(parse_guid("not a guid").is_err());
        assert!(parse_guid("EBD0A0A2-B9E5-4433-87C0-68B6B72699XY").is_err());
    }

    #[test]
    fn test_encode_guid_matches_display_form() {
        let uuid = Uuid::from_str("EBD0A0A2-B9E5-4433-87C0-68B6B72699C7").unwrap();
        assert_eq!(
            format_guid(&encode_guid(&uuid)),
            "EBD0A0A2-B9E5-4433-87C0-68B6B72699C7"
        );
    }
}
