//! Per-mission field catalogs.
//!
//! These tables are the only mission-specific part of the crate: constant
//! mappings from logical field name to relative offset, encoding, and
//! width, plus the shapes of repeating payloads. Adding a mission means
//! adding a module like these, not adding code paths.

mod shared;

pub mod avnir2;
pub mod prism;

/// CEOS record type codes, taken from bytes 4..6 of the framing header.
///
/// The file descriptor code is common to every CEOS component file; the
/// others identify the leader's descriptive records and the trailer's
/// histogram tables.
pub const FILE_DESCRIPTOR: u16 = 0x3FC0;
pub const SCENE_HEADER: u16 = 0x120A;
pub const ANCILLARY_1: u16 = 0x1214;
pub const ANCILLARY_2: u16 = 0x1232;
pub const ANCILLARY_3: u16 = 0x121E;
pub const HISTOGRAM: u16 = 0x123C;
