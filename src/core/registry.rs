//! Criterion registry keyed by wire code.
//!
//! Plugins never see `Criterion` values on the wire; they see one-byte
//! codes in configuration blobs and data headers. The registry is the
//! lookup seam between those codes and the decoders, built once at startup
//! and immutable afterwards, so it can be shared across tasks without
//! synchronization.

use std::collections::HashMap;

use tracing::debug;

use crate::core::criterion::Criterion;
use crate::error::{ProtocolError, Result};

/// Immutable map from one-byte wire code to its criterion decoder.
#[derive(Debug, Clone)]
pub struct CriterionRegistry {
    by_code: HashMap<char, Criterion>,
}

impl Default for CriterionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CriterionRegistry {
    /// Registry carrying every criterion the protocol defines.
    pub fn new() -> Self {
        Self::with_criteria(Criterion::ALL)
    }

    /// Registry restricted to an explicit criterion set.
    pub fn with_criteria(criteria: impl IntoIterator<Item = Criterion>) -> Self {
        let by_code: HashMap<char, Criterion> =
            criteria.into_iter().map(|c| (c.code(), c)).collect();
        debug!(registered = by_code.len(), "criterion registry built");
        Self { by_code }
    }

    /// Look up the criterion for a wire code.
    ///
    /// # Errors
    /// [`ProtocolError::UnknownCriterion`] for unregistered codes.
    pub fn get(&self, code: char) -> Result<Criterion> {
        self.by_code
            .get(&code)
            .copied()
            .ok_or(ProtocolError::UnknownCriterion(code))
    }

    /// Decode a blob of concatenated instances of the coded criterion.
    pub fn decode(&self, code: char, data: &[u8]) -> Result<Vec<String>> {
        self.get(code)?.decode_multiple(data)
    }

    /// Split a blob into raw fixed-width instances of the coded criterion.
    pub fn decode_raw<'a>(&self, code: char, data: &'a [u8]) -> Result<Vec<&'a [u8]>> {
        self.get(code)?.decode_raw_multiple(data)
    }

    /// Resolve a configuration blob listing active criterion codes.
    ///
    /// Plugin configuration carries the codes in effect as a plain byte
    /// sequence, one code per criterion.
    pub fn parse_codes(&self, blob: &[u8]) -> Result<Vec<Criterion>> {
        blob.iter().map(|&b| self.get(b as char)).collect()
    }

    /// Wire codes registered, in registry order.
    pub fn codes(&self) -> impl Iterator<Item = char> + '_ {
        Criterion::ALL
            .into_iter()
            .map(|c| c.code())
            .filter(|code| self.by_code.contains_key(code))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::core::criterion::Direction;

    #[test]
    fn test_default_registry_knows_all_codes() {
        let registry = CriterionRegistry::new();
        for criterion in Criterion::ALL {
            assert_eq!(registry.get(criterion.code()).unwrap(), criterion);
        }
    }

    #[test]
    fn test_unregistered_code_is_an_error() {
        let registry = CriterionRegistry::new();
        assert!(matches!(
            registry.get('Z'),
            Err(ProtocolError::UnknownCriterion('Z'))
        ));
        assert!(registry.decode('Z', &[]).is_err());
    }

    #[test]
    fn test_restricted_registry_hides_other_codes() {
        let registry =
            CriterionRegistry::with_criteria([Criterion::Address(Direction::Inbound)]);
        assert!(registry.get('I').is_ok());
        assert!(matches!(
            registry.get('P'),
            Err(ProtocolError::UnknownCriterion('P'))
        ));
    }

    #[test]
    fn test_decode_routes_to_the_coded_criterion() {
        let registry = CriterionRegistry::new();
        assert_eq!(
            registry.decode('P', &[0x00, 0x50, 0x01, 0xBB]).unwrap(),
            vec!["80", "443"]
        );
    }

    #[test]
    fn test_decode_raw_preserves_wire_bytes() {
        let registry = CriterionRegistry::new();
        let blob = [0x00, 0x50, 0x01, 0xBB];
        let raw = registry.decode_raw('p', &blob).unwrap();
        assert_eq!(raw, vec![&blob[0..2], &blob[2..4]]);
    }

    #[test]
    fn test_parse_codes_resolves_a_config_blob() {
        let registry = CriterionRegistry::new();
        let criteria = registry.parse_codes(b"IPb").unwrap();
        assert_eq!(
            criteria,
            vec![
                Criterion::Address(Direction::Inbound),
                Criterion::Port(Direction::Inbound),
                Criterion::AddressAndPort(Direction::Outbound),
            ]
        );
        assert!(registry.parse_codes(b"IX").is_err());
    }
}
