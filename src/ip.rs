//! Dotted-decimal IPv4 codec.

use crate::{Error, Result};

/// Parse a dotted-decimal IPv4 string into its big-endian `u32` value.
///
/// Exactly four parts are required and every part must be a decimal integer
/// in `0..=255`. Leading zeros are accepted (`"010"` is `10`).
pub fn parse_ip(ip: &str) -> Result<u32> {
    let mut value = 0u32;
    let mut parts = 0;

    for part in ip.split('.') {
        if parts == 4 {
            return Err(Error::InvalidAddress(format!(
                "`{}` has more than 4 parts",
                ip
            )));
        }

        let octet: u32 = part
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("`{}` is not a number in `{}`", part, ip)))?;
        if octet > 255 {
            return Err(Error::InvalidAddress(format!(
                "part `{}` should be less than 256",
                part
            )));
        }

        value = (value << 8) | octet;
        parts += 1;
    }

    if parts != 4 {
        return Err(Error::InvalidAddress(format!("`{}` does not have 4 parts", ip)));
    }

    Ok(value)
}

/// Format a `u32` as four dotted decimal groups.
pub fn format_ip(ip: u32) -> String {
    format!(
        "{}.{}.{}.{}",
        (ip >> 24) & 0xFF,
        (ip >> 16) & 0xFF,
        (ip >> 8) & 0xFF,
        ip & 0xFF
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_parse_ip() {
        assert_eq!(parse_ip("0.0.0.0").unwrap(), 0);
        assert_eq!(parse_ip("1.2.3.4").unwrap(), 0x01020304);
        assert_eq!(parse_ip("127.0.0.1").unwrap(), 0x7F000001);
        assert_eq!(parse_ip("255.255.255.255").unwrap(), u32::MAX);
    }

    #[test]
    fn test_parse_matches_std() {
        for ip in ["8.8.8.8", "118.113.138.53", "192.168.1.254", "10.0.0.1"] {
            let expected = u32::from(ip.parse::<Ipv4Addr>().unwrap());
            assert_eq!(parse_ip(ip).unwrap(), expected);
        }
    }

    #[test]
    fn test_parse_leading_zeros() {
        assert_eq!(parse_ip("010.001.000.009").unwrap(), parse_ip("10.1.0.9").unwrap());
    }

    #[test]
    fn test_parse_wrong_part_count() {
        for ip in ["", "1", "1.2.3", "1.2.3.4.5", "1.2.3.4."] {
            assert!(
                matches!(parse_ip(ip), Err(Error::InvalidAddress(_))),
                "{ip:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_out_of_range() {
        assert!(matches!(parse_ip("256.0.0.1"), Err(Error::InvalidAddress(_))));
        assert!(matches!(parse_ip("1.2.3.999"), Err(Error::InvalidAddress(_))));
    }

    #[test]
    fn test_parse_non_numeric() {
        for ip in ["a.b.c.d", "1.2.3.x", "1..3.4", "1.2.3.-4", " 1.2.3.4"] {
            assert!(
                matches!(parse_ip(ip), Err(Error::InvalidAddress(_))),
                "{ip:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_format_ip() {
        assert_eq!(format_ip(0), "0.0.0.0");
        assert_eq!(format_ip(0x7F000001), "127.0.0.1");
        assert_eq!(format_ip(u32::MAX), "255.255.255.255");
    }

    #[test]
    fn test_parse_format_round_trip() {
        for ip in ["0.0.0.0", "1.0.0.0", "8.8.4.4", "118.113.138.53", "255.255.255.255"] {
            assert_eq!(format_ip(parse_ip(ip).unwrap()), ip);
        }

        for value in [0u32, 1, 0x00FF_FFFF, 0x8000_0000, 0xDEAD_BEEF, u32::MAX] {
            assert_eq!(parse_ip(&format_ip(value)).unwrap(), value);
        }
    }
}
