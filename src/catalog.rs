//! Per-mission record layout tables.
//!
//! A CEOS record layout is fixed per mission and per record type, so it is
//! expressed here as pure data: each field is a name, a relative offset,
//! an encoding, and a width. The decode logic in [`crate::record`] is the
//! same for every mission; only these tables vary.

use serde::Serialize;

use crate::{Error, Result};

/// How a fixed-width field's bytes are interpreted.
///
/// Decoding never changes the number of bytes consumed; the width is the
/// width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldEncoding {
    AsciiText,
    AsciiInteger,
    /// ASCII digits with a decimal point implied this many places from the
    /// right when no explicit point is present.
    AsciiFixedDecimal(u32),
    /// Big-endian binary integer of the declared width.
    BinaryInteger,
    /// Big-endian 8-byte raw bit pattern reinterpreted as f64.
    RawBitPatternFloat,
}

/// One scalar field of a record layout.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    /// Offset relative to the record start.
    pub offset: u64,
    pub encoding: FieldEncoding,
    pub width: u32,
}

impl FieldSpec {
    #[must_use]
    pub const fn new(name: &'static str, offset: u64, encoding: FieldEncoding, width: u32) -> Self {
        FieldSpec {
            name,
            offset,
            encoding,
            width,
        }
    }

    pub(crate) fn end(&self) -> u64 {
        self.offset + u64::from(self.width)
    }
}

/// A contiguous run of fixed-width values, grouped by band.
///
/// `groups` is the band count; each group is `rows * cols` elements of
/// `width` bytes, laid out group after group starting at `offset`.
#[derive(Debug, Clone, Copy)]
pub struct PayloadSpec {
    pub name: &'static str,
    pub offset: u64,
    /// [`FieldEncoding::BinaryInteger`] or [`FieldEncoding::RawBitPatternFloat`].
    pub encoding: FieldEncoding,
    /// Bytes per element.
    pub width: u32,
    pub groups: usize,
    pub rows: usize,
    pub cols: usize,
}

impl PayloadSpec {
    #[must_use]
    pub const fn new(
        name: &'static str,
        offset: u64,
        encoding: FieldEncoding,
        width: u32,
        groups: usize,
        rows: usize,
        cols: usize,
    ) -> Self {
        PayloadSpec {
            name,
            offset,
            encoding,
            width,
            groups,
            rows,
            cols,
        }
    }

    pub(crate) fn group_elems(&self) -> usize {
        self.rows * self.cols
    }

    pub(crate) fn group_bytes(&self) -> u64 {
        self.group_elems() as u64 * u64::from(self.width)
    }

    /// Relative offset of a group, `group` being 1-based.
    pub(crate) fn group_offset(&self, group: usize) -> u64 {
        self.offset + (group as u64 - 1) * self.group_bytes()
    }

    pub(crate) fn end(&self) -> u64 {
        self.offset + self.groups as u64 * self.group_bytes()
    }
}

/// A file descriptor locator: pointer to an auxiliary data region elsewhere
/// in the same physical file.
///
/// On the wire a locator is two consecutive right-justified ASCII integers
/// of `width` bytes each (region offset, then region length) followed by a
/// 4-character kind tag.
#[derive(Debug, Clone, Copy)]
pub struct LocatorSpec {
    pub name: &'static str,
    pub offset: u64,
    pub width: u32,
}

impl LocatorSpec {
    #[must_use]
    pub const fn new(name: &'static str, offset: u64, width: u32) -> Self {
        LocatorSpec {
            name,
            offset,
            width,
        }
    }

    pub(crate) fn end(&self) -> u64 {
        self.offset + 2 * u64::from(self.width) + 4
    }
}

/// Declares that records of `type_code` follow the declaring record,
/// repeated the number of times held by its `count_field`.
#[derive(Debug, Clone, Copy)]
pub struct Trailing {
    pub type_code: u16,
    pub count_field: &'static str,
}

/// Complete layout for one record type of one mission.
#[derive(Debug)]
pub struct RecordDefinition {
    pub name: &'static str,
    pub type_code: u16,
    pub fields: &'static [FieldSpec],
    pub payloads: &'static [PayloadSpec],
    pub locators: &'static [LocatorSpec],
    pub trailing: Option<Trailing>,
}

impl RecordDefinition {
    pub(crate) fn payload(&self, name: &str) -> Option<(usize, &PayloadSpec)> {
        self.payloads
            .iter()
            .enumerate()
            .find(|(_, p)| p.name == name)
    }

    pub(crate) fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub(crate) fn locator(&self, name: &str) -> Option<&LocatorSpec> {
        self.locators.iter().find(|l| l.name == name)
    }
}

/// The set of record layouts for one CEOS component file of one mission,
/// plus the sensor constants accessors validate against.
///
/// Catalogs are process-wide immutable statics; they are safe to share
/// across threads because they are never mutated.
#[derive(Debug)]
pub struct MissionCatalog {
    pub mission: &'static str,
    /// Valid band numbers are `1..=band_count`.
    pub band_count: usize,
    pub records: &'static [&'static RecordDefinition],
}

impl MissionCatalog {
    #[must_use]
    pub fn definition(&self, type_code: u16) -> Option<&'static RecordDefinition> {
        self.records
            .iter()
            .find(|d| d.type_code == type_code)
            .copied()
    }

    /// Reject a band number outside `1..=band_count`. No I/O is involved.
    pub fn check_band(&self, band: usize) -> Result<()> {
        if band == 0 || band > self.band_count {
            return Err(Error::BandRange {
                band,
                count: self.band_count,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static FIELDS: [FieldSpec; 1] = [FieldSpec {
        name: "scene_id",
        offset: 20,
        encoding: FieldEncoding::AsciiText,
        width: 16,
    }];

    static DEF: RecordDefinition = RecordDefinition {
        name: "scene_header",
        type_code: 0x120A,
        fields: &FIELDS,
        payloads: &[],
        locators: &[],
        trailing: None,
    };

    static CATALOG: MissionCatalog = MissionCatalog {
        mission: "test",
        band_count: 4,
        records: &[&DEF],
    };

    #[test]
    fn definition_lookup() {
        assert!(CATALOG.definition(0x120A).is_some());
        assert!(CATALOG.definition(0xBEEF).is_none());
    }

    #[test]
    fn band_bounds() {
        assert!(CATALOG.check_band(1).is_ok());
        assert!(CATALOG.check_band(4).is_ok());
        for band in [0, 5] {
            let err = CATALOG.check_band(band).unwrap_err();
            assert!(matches!(err, Error::BandRange { count: 4, .. }), "{err:?}");
        }
    }

    #[test]
    fn payload_group_addressing() {
        let p = PayloadSpec {
            name: "transformation_coefficients",
            offset: 1964,
            encoding: FieldEncoding::RawBitPatternFloat,
            width: 8,
            groups: 4,
            rows: 4,
            cols: 10,
        };
        assert_eq!(p.group_elems(), 40);
        assert_eq!(p.group_offset(1), 1964);
        assert_eq!(p.group_offset(2), 1964 + 40 * 8);
        assert_eq!(p.end(), 1964 + 4 * 40 * 8);
    }
}
