//! Link-layer value types shared by the decoders and the flow tables

use std::fmt;
use std::str::FromStr;

/// Link-layer (MAC) address
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    pub const BROADCAST: MacAddr = MacAddr([0xff; 6]);
    pub const ZERO: MacAddr = MacAddr([0; 6]);

    /// Read a MAC address from the first six bytes of `bytes`
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let octets: [u8; 6] = bytes.get(..6)?.try_into().ok()?;
        Some(MacAddr(octets))
    }
}

impl fmt::Debug for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Error returned when a MAC address string cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseMacAddrError {
    #[error("invalid MAC address length")]
    Length,
    #[error("invalid MAC address format")]
    Format,
    #[error("invalid hex digit in MAC address")]
    Hex,
}

impl FromStr for MacAddr {
    type Err = ParseMacAddrError;

    /// Accepts "00:11:22:33:44:55", "00-11-22-33-44-55" and "001122334455"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let groups: Vec<&str> = match s.chars().find(|c| *c == ':' || *c == '-') {
            Some(sep) => s.split(sep).collect(),
            None if s.len() == 12 && s.is_ascii() => {
                (0..6).map(|i| &s[i * 2..i * 2 + 2]).collect()
            }
            None => return Err(ParseMacAddrError::Format),
        };

        if groups.len() != 6 {
            return Err(ParseMacAddrError::Length);
        }

        let mut octets = [0u8; 6];
        for (octet, group) in octets.iter_mut().zip(&groups) {
            if group.len() != 2 {
                return Err(ParseMacAddrError::Format);
            }
            *octet = u8::from_str_radix(group, 16).map_err(|_| ParseMacAddrError::Hex)?;
        }

        Ok(MacAddr(octets))
    }
}

/// EtherType values the classifier cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum EtherType {
    Ipv4 = 0x0800,
    Vlan = 0x8100,
}

impl EtherType {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x0800 => Some(EtherType::Ipv4),
            0x8100 => Some(EtherType::Vlan),
            _ => None,
        }
    }

    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mac_addr_parse_formats() {
        let expected = MacAddr([0xaa, 0xbb, 0xcc, 0x00, 0x11, 0x22]);
        assert_eq!("aa:bb:cc:00:11:22".parse::<MacAddr>(), Ok(expected));
        assert_eq!("AA-BB-CC-00-11-22".parse::<MacAddr>(), Ok(expected));
        assert_eq!("aabbcc001122".parse::<MacAddr>(), Ok(expected));
    }

    #[test]
    fn test_mac_addr_parse_errors() {
        assert_eq!(
            "00:11:22:33:44".parse::<MacAddr>(),
            Err(ParseMacAddrError::Length)
        );
        assert_eq!(
            "00:11:22:33:44:gg".parse::<MacAddr>(),
            Err(ParseMacAddrError::Hex)
        );
        assert_eq!(
            "00.11.22.33.44.55".parse::<MacAddr>(),
            Err(ParseMacAddrError::Format)
        );
        assert_eq!(
            "0:11:22:33:44:555".parse::<MacAddr>(),
            Err(ParseMacAddrError::Format)
        );
    }

    #[test]
    fn test_mac_addr_display() {
        let mac = MacAddr([0x00, 0x0a, 0x22, 0x33, 0x44, 0xff]);
        assert_eq!(mac.to_string(), "00:0a:22:33:44:ff");
    }

    #[test]
    fn test_mac_addr_from_slice() {
        assert_eq!(
            MacAddr::from_slice(&[1, 2, 3, 4, 5, 6, 7]),
            Some(MacAddr([1, 2, 3, 4, 5, 6]))
        );
        assert_eq!(MacAddr::from_slice(&[1, 2, 3]), None);
    }

    #[test]
    fn test_ethertype_from_u16() {
        assert_eq!(EtherType::from_u16(0x0800), Some(EtherType::Ipv4));
        assert_eq!(EtherType::from_u16(0x8100), Some(EtherType::Vlan));
        assert_eq!(EtherType::from_u16(0x0806), None);
        assert_eq!(EtherType::Ipv4.as_u16(), 0x0800);
    }
}
