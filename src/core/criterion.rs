//! Criterion decoders for fixed-width flow keys.
//!
//! Analysis plugins hash traffic into buckets keyed by a *criterion*: a
//! fixed-width binary encoding of one flow-identifying key (remote port,
//! remote address, or a composite of both). Agents ship these keys as
//! concatenated fixed-width instances with no per-item length prefix, so
//! every criterion declares its width up front and blobs are split by
//! arithmetic alone.
//!
//! ## Wire Format
//! ```text
//! Port:    [u16 big-endian]                            (2 bytes)
//! Address: [version(1)] [payload(16)]                  (17 bytes)
//! B / L:   [Port(2)] [Address(17)]                     (19 bytes)
//! ```
//!
//! IPv4 addresses occupy the first 4 payload bytes and waste the remaining
//! 12; the fixed width is what makes prefix-free splitting possible.
//!
//! Criteria are stateless `Copy` values, built once and shared freely.

use std::net::{Ipv4Addr, Ipv6Addr};

use crate::error::{ProtocolError, Result};

/// Traffic direction a criterion describes.
///
/// Inbound and outbound variants decode identically; the distinct wire
/// codes let one message carry both directions of the same logical field
/// without ambiguity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Inbound,
    Outbound,
}

/// One criterion to key flow statistics by.
///
/// A closed set of decoders sharing the capability surface
/// `{code, item_len, decode}`. Compound variants own their parts in wire
/// order and define the textual join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Criterion {
    /// Remote port of a TCP/UDP flow. Codes `'P'` / `'p'`.
    Port(Direction),
    /// Remote IPv4/IPv6 address. Codes `'I'` / `'i'`.
    Address(Direction),
    /// Port followed by address on the wire, displayed as `ip:port`.
    /// Codes `'B'` / `'b'`.
    AddressAndPort(Direction),
    /// Port followed by address, displayed as `ip->port` (local port
    /// syntax). Codes `'L'` / `'l'`.
    AddressAndLocalPort(Direction),
}

/// IPv4 version tag on the wire.
const ADDR_V4: u8 = 0x04;
/// IPv6 version tag on the wire.
const ADDR_V6: u8 = 0x06;

impl Criterion {
    /// Every criterion the protocol defines, in registry order.
    pub const ALL: [Criterion; 8] = [
        Criterion::Port(Direction::Inbound),
        Criterion::Port(Direction::Outbound),
        Criterion::Address(Direction::Inbound),
        Criterion::Address(Direction::Outbound),
        Criterion::AddressAndPort(Direction::Inbound),
        Criterion::AddressAndPort(Direction::Outbound),
        Criterion::AddressAndLocalPort(Direction::Inbound),
        Criterion::AddressAndLocalPort(Direction::Outbound),
    ];

    /// The one-byte wire code identifying this criterion.
    ///
    /// Uppercase codes are inbound, lowercase outbound.
    pub fn code(self) -> char {
        use Direction::*;
        match self {
            Criterion::Port(Inbound) => 'P',
            Criterion::Port(Outbound) => 'p',
            Criterion::Address(Inbound) => 'I',
            Criterion::Address(Outbound) => 'i',
            Criterion::AddressAndPort(Inbound) => 'B',
            Criterion::AddressAndPort(Outbound) => 'b',
            Criterion::AddressAndLocalPort(Inbound) => 'L',
            Criterion::AddressAndLocalPort(Outbound) => 'l',
        }
    }

    /// Resolve a wire code back to its criterion.
    pub fn from_code(code: char) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    /// Short human-readable label for logs.
    pub fn name(self) -> &'static str {
        use Direction::*;
        match self {
            Criterion::Port(Inbound) => "port",
            Criterion::Port(Outbound) => "port-out",
            Criterion::Address(Inbound) => "address",
            Criterion::Address(Outbound) => "address-out",
            Criterion::AddressAndPort(Inbound) => "address-and-port",
            Criterion::AddressAndPort(Outbound) => "address-and-port-out",
            Criterion::AddressAndLocalPort(Inbound) => "address-and-local-port",
            Criterion::AddressAndLocalPort(Outbound) => "address-and-local-port-out",
        }
    }

    /// Traffic direction of this criterion.
    pub fn direction(self) -> Direction {
        match self {
            Criterion::Port(d)
            | Criterion::Address(d)
            | Criterion::AddressAndPort(d)
            | Criterion::AddressAndLocalPort(d) => d,
        }
    }

    /// Fixed byte width of one encoded instance.
    pub fn item_len(self) -> usize {
        match self {
            Criterion::Port(_) => 2,
            Criterion::Address(_) => 17,
            // Compound width is the sum of its parts.
            compound => compound
                .parts()
                .map(|parts| parts.iter().map(|p| p.item_len()).sum())
                .unwrap_or(0),
        }
    }

    /// Parts of a compound criterion in wire order. `None` for primitives.
    fn parts(self) -> Option<[Criterion; 2]> {
        match self {
            Criterion::AddressAndPort(d) | Criterion::AddressAndLocalPort(d) => {
                Some([Criterion::Port(d), Criterion::Address(d)])
            }
            _ => None,
        }
    }

    /// Decode one fixed-width instance to its canonical string form.
    ///
    /// # Errors
    /// [`ProtocolError::TruncatedItem`] if `item` is not exactly
    /// [`item_len`](Self::item_len) bytes, [`ProtocolError::UnknownAddressVersion`]
    /// if an address version byte is neither 4 nor 6.
    pub fn decode(self, item: &[u8]) -> Result<String> {
        self.check_item_len(item)?;
        match self {
            Criterion::Port(_) => Ok(u16::from_be_bytes([item[0], item[1]]).to_string()),
            Criterion::Address(_) => decode_address(item),
            Criterion::AddressAndPort(_) | Criterion::AddressAndLocalPort(_) => {
                let decoded = self.decode_parts(item)?;
                // Wire order is port then address; display reverses it, and
                // IPv6 addresses get the customary square brackets.
                let (port, ip) = (&decoded[0], &decoded[1]);
                let join = if matches!(self, Criterion::AddressAndLocalPort(_)) {
                    "->"
                } else {
                    ":"
                };
                if ip.contains(':') {
                    Ok(format!("[{ip}]{join}{port}"))
                } else {
                    Ok(format!("{ip}{join}{port}"))
                }
            }
        }
    }

    /// Decode one instance into the ordered strings of its parts, unjoined.
    ///
    /// Primitive criteria yield a single element.
    pub fn decode_parts(self, item: &[u8]) -> Result<Vec<String>> {
        self.check_item_len(item)?;
        match self.parts() {
            Some(parts) => {
                let mut rest = item;
                let mut decoded = Vec::with_capacity(parts.len());
                for part in parts {
                    let (head, tail) = rest.split_at(part.item_len());
                    decoded.push(part.decode(head)?);
                    rest = tail;
                }
                Ok(decoded)
            }
            None => Ok(vec![self.decode(item)?]),
        }
    }

    /// Decode a blob of concatenated instances, one string per instance.
    ///
    /// # Errors
    /// [`ProtocolError::MalformedBlob`] if the blob length is not a
    /// multiple of the item width. A trailing partial item always means an
    /// upstream framing bug, never benign truncation.
    pub fn decode_multiple(self, data: &[u8]) -> Result<Vec<String>> {
        self.decode_raw_multiple(data)?
            .into_iter()
            .map(|item| self.decode(item))
            .collect()
    }

    /// Split a blob into the raw fixed-width instances as they sit on the
    /// wire, without string decoding.
    pub fn decode_raw_multiple(self, data: &[u8]) -> Result<Vec<&[u8]>> {
        let width = self.item_len();
        if data.len() % width != 0 {
            return Err(ProtocolError::MalformedBlob {
                criterion: self.code(),
                len: data.len(),
                item_len: width,
            });
        }
        Ok(data.chunks_exact(width).collect())
    }

    fn check_item_len(self, item: &[u8]) -> Result<()> {
        if item.len() != self.item_len() {
            return Err(ProtocolError::TruncatedItem {
                criterion: self.code(),
                len: item.len(),
                item_len: self.item_len(),
            });
        }
        Ok(())
    }
}

/// Decode a 17-byte wire address: version tag, then 16 payload bytes.
fn decode_address(item: &[u8]) -> Result<String> {
    match item[0] {
        ADDR_V4 => {
            let mut octets = [0u8; 4];
            octets.copy_from_slice(&item[1..5]);
            Ok(Ipv4Addr::from(octets).to_string())
        }
        ADDR_V6 => {
            let mut octets = [0u8; 16];
            octets.copy_from_slice(&item[1..17]);
            Ok(Ipv6Addr::from(octets).to_string())
        }
        version => Err(ProtocolError::UnknownAddressVersion(version)),
    }
}
