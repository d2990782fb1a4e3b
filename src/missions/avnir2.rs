//! ALOS AVNIR-2 field catalogs.
//!
//! AVNIR-2 is a 4-band visible/near-infrared radiometer. Its leader file
//! carries a scene header and three ancillary records (map projection,
//! radiometric calibration, platform position); its trailer carries the
//! per-band histogram tables, counted by the trailer file descriptor.

use crate::catalog::{
    FieldEncoding::{AsciiFixedDecimal, AsciiInteger, AsciiText, BinaryInteger, RawBitPatternFloat},
    FieldSpec, MissionCatalog, PayloadSpec, RecordDefinition,
};

use super::shared;
use super::{ANCILLARY_1, ANCILLARY_2, ANCILLARY_3, HISTOGRAM};

pub const BAND_COUNT: usize = 4;

static ANCILLARY_1_PAYLOADS: [PayloadSpec; 1] = [
    // Per-band lat/lon/x/y transformation polynomials: 4 transforms of 10
    // coefficients each, as packed 8-byte bit patterns.
    PayloadSpec::new(
        "transformation_coefficients",
        1964,
        RawBitPatternFloat,
        8,
        BAND_COUNT,
        4,
        10,
    ),
];

static ANCILLARY_1_DEF: RecordDefinition = RecordDefinition {
    name: "ancillary1",
    type_code: ANCILLARY_1,
    fields: &shared::ANCILLARY_1_FIELDS,
    payloads: &ANCILLARY_1_PAYLOADS,
    locators: &[],
    trailing: None,
};

static ANCILLARY_2_FIELDS: [FieldSpec; 5] = [
    FieldSpec::new("sensor_operation_mode", 20, AsciiText, 4),
    FieldSpec::new("lower_limit_strength", 24, AsciiInteger, 4),
    FieldSpec::new("upper_limit_strength", 28, AsciiInteger, 4),
    FieldSpec::new("sensor_gains", 32, AsciiText, 4),
    FieldSpec::new("signal_processing_unit_temperature", 500, AsciiFixedDecimal(2), 8),
];

static ANCILLARY_2_PAYLOADS: [PayloadSpec; 4] = [
    PayloadSpec::new("detector_temperatures", 420, RawBitPatternFloat, 8, BAND_COUNT, 1, 1),
    PayloadSpec::new("detector_assembly_temperatures", 452, RawBitPatternFloat, 8, BAND_COUNT, 1, 1),
    PayloadSpec::new("absolute_gains", 820, RawBitPatternFloat, 8, BAND_COUNT, 1, 1),
    PayloadSpec::new("absolute_offsets", 852, RawBitPatternFloat, 8, BAND_COUNT, 1, 1),
];

static ANCILLARY_2_DEF: RecordDefinition = RecordDefinition {
    name: "ancillary2",
    type_code: ANCILLARY_2,
    fields: &ANCILLARY_2_FIELDS,
    payloads: &ANCILLARY_2_PAYLOADS,
    locators: &[],
    trailing: None,
};

/// Greatest number of platform position data points a record can carry;
/// the number actually populated is the `num_data_points` field.
pub const MAX_DATA_POINTS: usize = 28;

static ANCILLARY_3_FIELDS: [FieldSpec; 13] = [
    FieldSpec::new("num_data_points", 140, AsciiInteger, 4),
    FieldSpec::new("first_point_year", 144, AsciiInteger, 4),
    FieldSpec::new("first_point_month", 148, AsciiInteger, 4),
    FieldSpec::new("first_point_day", 152, AsciiInteger, 4),
    FieldSpec::new("first_point_total_days", 156, AsciiInteger, 8),
    FieldSpec::new("first_point_total_seconds", 164, AsciiFixedDecimal(3), 22),
    FieldSpec::new("interval_time", 186, AsciiFixedDecimal(3), 22),
    FieldSpec::new("reference_coordinate_system", 208, AsciiText, 64),
    FieldSpec::new("positional_error_flight", 272, AsciiFixedDecimal(6), 16),
    FieldSpec::new("positional_error_flight_vertical", 288, AsciiFixedDecimal(6), 16),
    FieldSpec::new("positional_error_radius", 304, AsciiFixedDecimal(6), 16),
    FieldSpec::new("velocity_error_flight", 320, AsciiFixedDecimal(6), 16),
    FieldSpec::new("velocity_error_radius", 336, AsciiFixedDecimal(6), 16),
];

static ANCILLARY_3_PAYLOADS: [PayloadSpec; 1] = [
    // One group per data point: a position row and a velocity row of
    // x/y/z each.
    PayloadSpec::new("platform_positions", 386, RawBitPatternFloat, 8, MAX_DATA_POINTS, 2, 3),
];

static ANCILLARY_3_DEF: RecordDefinition = RecordDefinition {
    name: "ancillary3",
    type_code: ANCILLARY_3,
    fields: &ANCILLARY_3_FIELDS,
    payloads: &ANCILLARY_3_PAYLOADS,
    locators: &[],
    trailing: None,
};

pub const HISTOGRAM_BINS: usize = 256;

static HISTOGRAM_FIELDS: [FieldSpec; 2] = [
    FieldSpec::new("table_sequence", 12, AsciiInteger, 4),
    FieldSpec::new("number_of_bins", 16, AsciiInteger, 4),
];

static HISTOGRAM_PAYLOADS: [PayloadSpec; 1] = [
    // All four bands' bins in file order, 32-bit big-endian each.
    PayloadSpec::new("histogram", 20, BinaryInteger, 4, BAND_COUNT, 1, HISTOGRAM_BINS),
];

static HISTOGRAM_DEF: RecordDefinition = RecordDefinition {
    name: "histogram",
    type_code: HISTOGRAM,
    fields: &HISTOGRAM_FIELDS,
    payloads: &HISTOGRAM_PAYLOADS,
    locators: &[],
    trailing: None,
};

/// Record layouts of an AVNIR-2 leader file.
pub static LEADER: MissionCatalog = MissionCatalog {
    mission: "AVNIR-2",
    band_count: BAND_COUNT,
    records: &[
        &shared::LEADER_FDR,
        &shared::SCENE_HEADER_DEF,
        &ANCILLARY_1_DEF,
        &ANCILLARY_2_DEF,
        &ANCILLARY_3_DEF,
    ],
};

/// Record layouts of an AVNIR-2 trailer file.
pub static TRAILER: MissionCatalog = MissionCatalog {
    mission: "AVNIR-2",
    band_count: BAND_COUNT,
    records: &[&shared::TRAILER_FDR, &HISTOGRAM_DEF],
};
