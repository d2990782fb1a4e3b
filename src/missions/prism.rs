//! ALOS PRISM field catalogs.
//!
//! PRISM is the panchromatic stereo mapper on the same platform as
//! AVNIR-2. Its leader shares the AVNIR-2 layouts except that imagery is
//! split across 8 CCDs, so the per-band payload shapes differ; the decode
//! logic does not.

use crate::catalog::{
    FieldEncoding::RawBitPatternFloat, MissionCatalog, PayloadSpec, RecordDefinition,
};

use super::shared;
use super::ANCILLARY_1;

/// PRISM addresses its CCDs the way AVNIR-2 addresses bands.
pub const CCD_COUNT: usize = 8;

static ANCILLARY_1_PAYLOADS: [PayloadSpec; 1] = [PayloadSpec::new(
    "transformation_coefficients",
    1964,
    RawBitPatternFloat,
    8,
    CCD_COUNT,
    4,
    10,
)];

static ANCILLARY_1_DEF: RecordDefinition = RecordDefinition {
    name: "ancillary1",
    type_code: ANCILLARY_1,
    fields: &shared::ANCILLARY_1_FIELDS,
    payloads: &ANCILLARY_1_PAYLOADS,
    locators: &[],
    trailing: None,
};

/// Record layouts of a PRISM leader file.
pub static LEADER: MissionCatalog = MissionCatalog {
    mission: "PRISM",
    band_count: CCD_COUNT,
    records: &[
        &shared::LEADER_FDR,
        &shared::SCENE_HEADER_DEF,
        &ANCILLARY_1_DEF,
    ],
};
