//! Record layouts the ALOS optical sensors have in common.
//!
//! AVNIR-2 and PRISM products share the file descriptor and scene header
//! layouts; they differ in band count and in the ancillary payload shapes.

use crate::catalog::{
    FieldEncoding::{AsciiFixedDecimal, AsciiInteger, AsciiText},
    FieldSpec, LocatorSpec, RecordDefinition, Trailing,
};

use super::{FILE_DESCRIPTOR, HISTOGRAM, SCENE_HEADER};

static FDR_FIELDS: [FieldSpec; 5] = [
    FieldSpec::new("ascii_code", 12, AsciiText, 2),
    FieldSpec::new("format_control_document", 16, AsciiText, 12),
    FieldSpec::new("file_number", 48, AsciiInteger, 4),
    FieldSpec::new("file_id", 52, AsciiText, 16),
    FieldSpec::new("record_sequence_type", 80, AsciiText, 4),
];

static FDR_LOCATORS: [LocatorSpec; 2] = [
    LocatorSpec::new("optical_black", 350, 6),
    // An alternate pixel-size locator layout at offset 414 appears in some
    // format revisions but is not confirmed by the format specification;
    // only the 462 layout is decoded.
    LocatorSpec::new("pixel_size", 462, 6),
];

pub(super) static LEADER_FDR: RecordDefinition = RecordDefinition {
    name: "leader_file_descriptor",
    type_code: FILE_DESCRIPTOR,
    fields: &FDR_FIELDS,
    payloads: &[],
    locators: &FDR_LOCATORS,
    trailing: None,
};

static TRAILER_FDR_FIELDS: [FieldSpec; 6] = [
    FieldSpec::new("ascii_code", 12, AsciiText, 2),
    FieldSpec::new("format_control_document", 16, AsciiText, 12),
    FieldSpec::new("file_number", 48, AsciiInteger, 4),
    FieldSpec::new("file_id", 52, AsciiText, 16),
    FieldSpec::new("record_sequence_type", 80, AsciiText, 4),
    FieldSpec::new("number_of_histogram_records", 180, AsciiInteger, 6),
];

pub(super) static TRAILER_FDR: RecordDefinition = RecordDefinition {
    name: "trailer_file_descriptor",
    type_code: FILE_DESCRIPTOR,
    fields: &TRAILER_FDR_FIELDS,
    payloads: &[],
    locators: &[],
    trailing: Some(Trailing {
        type_code: HISTOGRAM,
        count_field: "number_of_histogram_records",
    }),
};

static SCENE_HEADER_FIELDS: [FieldSpec; 13] = [
    FieldSpec::new("scene_id", 20, AsciiText, 16),
    FieldSpec::new("product_level", 48, AsciiText, 16),
    FieldSpec::new("processing_code", 64, AsciiText, 16),
    FieldSpec::new("scene_center_time", 192, AsciiText, 20),
    FieldSpec::new("map_projection_method", 212, AsciiText, 8),
    FieldSpec::new("scene_corner_ul_lat", 1132, AsciiFixedDecimal(6), 16),
    FieldSpec::new("scene_corner_ul_lon", 1148, AsciiFixedDecimal(6), 16),
    FieldSpec::new("scene_corner_ur_lat", 1164, AsciiFixedDecimal(6), 16),
    FieldSpec::new("scene_corner_ur_lon", 1180, AsciiFixedDecimal(6), 16),
    FieldSpec::new("scene_corner_ll_lat", 1196, AsciiFixedDecimal(6), 16),
    FieldSpec::new("scene_corner_ll_lon", 1212, AsciiFixedDecimal(6), 16),
    FieldSpec::new("scene_corner_lr_lat", 1228, AsciiFixedDecimal(6), 16),
    FieldSpec::new("scene_corner_lr_lon", 1244, AsciiFixedDecimal(6), 16),
];

pub(super) static SCENE_HEADER_DEF: RecordDefinition = RecordDefinition {
    name: "scene_header",
    type_code: SCENE_HEADER,
    fields: &SCENE_HEADER_FIELDS,
    payloads: &[],
    locators: &[],
    trailing: None,
};

pub(super) static ANCILLARY_1_FIELDS: [FieldSpec; 11] = [
    FieldSpec::new("pixels_per_line", 20, AsciiFixedDecimal(1), 16),
    FieldSpec::new("lines_per_scene", 36, AsciiFixedDecimal(1), 16),
    FieldSpec::new("pixel_size_x", 52, AsciiFixedDecimal(4), 16),
    FieldSpec::new("pixel_size_y", 68, AsciiFixedDecimal(4), 16),
    FieldSpec::new("image_skew", 84, AsciiFixedDecimal(4), 16),
    FieldSpec::new("reference_ellipsoid", 100, AsciiText, 16),
    FieldSpec::new("semimajor_axis", 116, AsciiFixedDecimal(3), 16),
    FieldSpec::new("semiminor_axis", 132, AsciiFixedDecimal(3), 16),
    FieldSpec::new("geodetic_datum", 148, AsciiText, 16),
    FieldSpec::new("utm_zone_number", 164, AsciiInteger, 12),
    FieldSpec::new("hemisphere", 176, AsciiInteger, 4),
];
