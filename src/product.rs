//! File-level readers for CEOS leader and trailer component files.
//!
//! These own the stream for one physical file, walk its record chain once
//! at open, and expose typed accessors over the decoded records. Whatever
//! opens the file owns it; dropping the reader closes the handle, parse
//! failure included.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::debug;

use crate::catalog::MissionCatalog;
use crate::chain::{ChainSummary, RecordChain};
use crate::missions::{ANCILLARY_1, ANCILLARY_2, ANCILLARY_3, FILE_DESCRIPTOR, HISTOGRAM, SCENE_HEADER};
use crate::record::{Locator, Record};
use crate::stream::ByteStream;
use crate::{Error, Result};

/// CEOS scene timestamps: `yyyyMMdd HHmmssSSS`.
const SCENE_TIME_FORMAT: &str = "%Y%m%d %H%M%S%3f";

fn find<'a>(chain: &'a RecordChain, type_code: u16, name: &'static str) -> Result<&'a Record> {
    chain.find(type_code).ok_or(Error::MissingRecord(name))
}

/// One platform position sample from the ancillary platform record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DataPoint {
    pub position: [f64; 3],
    pub velocity: [f64; 3],
}

/// A CEOS leader file: file descriptor, scene header, and the mission's
/// ancillary records.
pub struct LeaderFile<R>
where
    R: Read + Seek,
{
    stream: ByteStream<R>,
    catalog: &'static MissionCatalog,
    chain: RecordChain,
}

impl LeaderFile<BufReader<File>> {
    /// Open and parse the leader file at `path`.
    ///
    /// # Errors
    /// Any decode failure, wrapped in [`Error::Product`] identifying the
    /// file and the byte offset at which decoding failed.
    pub fn open<P>(path: P, catalog: &'static MissionCatalog) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let open = || {
            let file = File::open(path)?;
            Self::new(BufReader::new(file), catalog)
        };
        open().map_err(|err| Error::product(path.to_path_buf(), err))
    }
}

impl<R> LeaderFile<R>
where
    R: Read + Seek,
{
    /// Parse a leader file from an already-open stream.
    pub fn new(reader: R, catalog: &'static MissionCatalog) -> Result<Self> {
        let mut stream = ByteStream::new(reader)?;
        let chain = RecordChain::read(&mut stream, catalog)?;
        debug!(
            mission = catalog.mission,
            records = chain.entries.len(),
            "parsed leader file"
        );
        Ok(LeaderFile {
            stream,
            catalog,
            chain,
        })
    }

    #[must_use]
    pub fn catalog(&self) -> &'static MissionCatalog {
        self.catalog
    }

    #[must_use]
    pub fn chain(&self) -> &RecordChain {
        &self.chain
    }

    #[must_use]
    pub fn summary(&self) -> ChainSummary {
        self.chain.summary()
    }

    pub fn file_descriptor(&self) -> Result<&Record> {
        find(&self.chain, FILE_DESCRIPTOR, "file descriptor")
    }

    pub fn scene_header(&self) -> Result<&Record> {
        find(&self.chain, SCENE_HEADER, "scene header")
    }

    pub fn ancillary1(&self) -> Result<&Record> {
        find(&self.chain, ANCILLARY_1, "ancillary1")
    }

    pub fn ancillary2(&self) -> Result<&Record> {
        find(&self.chain, ANCILLARY_2, "ancillary2")
    }

    pub fn ancillary3(&self) -> Result<&Record> {
        find(&self.chain, ANCILLARY_3, "ancillary3")
    }

    /// Decode a locator field of the file descriptor.
    pub fn locator(&mut self, name: &str) -> Result<Locator> {
        let fdr = find(&self.chain, FILE_DESCRIPTOR, "file descriptor")?;
        fdr.file_descriptor().locator(&mut self.stream, name)
    }

    pub fn scene_id(&self) -> Result<&str> {
        self.scene_header()?.str_field("scene_id")
    }

    pub fn product_level(&self) -> Result<&str> {
        self.scene_header()?.str_field("product_level")
    }

    pub fn processing_code(&self) -> Result<&str> {
        self.scene_header()?.str_field("processing_code")
    }

    pub fn map_projection_method(&self) -> Result<&str> {
        self.scene_header()?.str_field("map_projection_method")
    }

    pub fn scene_center_time(&self) -> Result<NaiveDateTime> {
        let record = self.scene_header()?;
        let text = record.str_field("scene_center_time")?;
        NaiveDateTime::parse_from_str(text, SCENE_TIME_FORMAT).map_err(|_| Error::InvalidNumeric {
            offset: record.field_offset("scene_center_time").unwrap_or_default(),
            text: text.to_string(),
        })
    }

    /// Scene corner latitudes in UL, UR, LL, LR order.
    pub fn lat_corners(&self) -> Result<[f64; 4]> {
        let record = self.scene_header()?;
        Ok([
            record.float_field("scene_corner_ul_lat")?,
            record.float_field("scene_corner_ur_lat")?,
            record.float_field("scene_corner_ll_lat")?,
            record.float_field("scene_corner_lr_lat")?,
        ])
    }

    /// Scene corner longitudes in UL, UR, LL, LR order.
    pub fn lon_corners(&self) -> Result<[f64; 4]> {
        let record = self.scene_header()?;
        Ok([
            record.float_field("scene_corner_ul_lon")?,
            record.float_field("scene_corner_ur_lon")?,
            record.float_field("scene_corner_ll_lon")?,
            record.float_field("scene_corner_lr_lon")?,
        ])
    }

    pub fn pixels_per_line(&self) -> Result<f64> {
        self.ancillary1()?.float_field("pixels_per_line")
    }

    pub fn lines_per_scene(&self) -> Result<f64> {
        self.ancillary1()?.float_field("lines_per_scene")
    }

    /// Pixel size (x, y) in meters at scene center.
    pub fn pixel_size(&self) -> Result<(f64, f64)> {
        let record = self.ancillary1()?;
        Ok((
            record.float_field("pixel_size_x")?,
            record.float_field("pixel_size_y")?,
        ))
    }

    pub fn reference_ellipsoid(&self) -> Result<&str> {
        self.ancillary1()?.str_field("reference_ellipsoid")
    }

    pub fn semimajor_axis(&self) -> Result<f64> {
        self.ancillary1()?.float_field("semimajor_axis")
    }

    pub fn semiminor_axis(&self) -> Result<f64> {
        self.ancillary1()?.float_field("semiminor_axis")
    }

    /// Transformation polynomials for 1-based band number `band`:
    /// latitude, longitude, x, and y rows of 10 coefficients each.
    ///
    /// The band bound is checked against the mission's band count before
    /// any I/O; the payload is decoded once and cached on the record.
    pub fn transformation_coefficients(&mut self, band: usize) -> Result<[[f64; 10]; 4]> {
        self.catalog.check_band(band)?;
        let record = find(&self.chain, ANCILLARY_1, "ancillary1")?;
        let vals = record.float_payload(&mut self.stream, "transformation_coefficients", band)?;
        if vals.len() != 40 {
            return Err(Error::PayloadShape {
                name: "transformation_coefficients".to_string(),
            });
        }
        let mut out = [[0.0; 10]; 4];
        for (row, chunk) in out.iter_mut().zip(vals.chunks_exact(10)) {
            row.copy_from_slice(chunk);
        }
        Ok(out)
    }

    pub fn sensor_operation_mode(&self) -> Result<&str> {
        self.ancillary2()?.str_field("sensor_operation_mode")
    }

    /// One gain character per band, blank when not set.
    pub fn sensor_gains(&self) -> Result<&str> {
        self.ancillary2()?.str_field("sensor_gains")
    }

    pub fn lower_limit_strength(&self) -> Result<i64> {
        self.ancillary2()?.int_field("lower_limit_strength")
    }

    pub fn upper_limit_strength(&self) -> Result<i64> {
        self.ancillary2()?.int_field("upper_limit_strength")
    }

    pub fn signal_processing_unit_temperature(&self) -> Result<f64> {
        self.ancillary2()?
            .float_field("signal_processing_unit_temperature")
    }

    pub fn absolute_gain(&mut self, band: usize) -> Result<f64> {
        self.radiometric_scalar("absolute_gains", band)
    }

    pub fn absolute_offset(&mut self, band: usize) -> Result<f64> {
        self.radiometric_scalar("absolute_offsets", band)
    }

    pub fn detector_temperature(&mut self, band: usize) -> Result<f64> {
        self.radiometric_scalar("detector_temperatures", band)
    }

    pub fn detector_assembly_temperature(&mut self, band: usize) -> Result<f64> {
        self.radiometric_scalar("detector_assembly_temperatures", band)
    }

    fn radiometric_scalar(&mut self, name: &'static str, band: usize) -> Result<f64> {
        self.catalog.check_band(band)?;
        let record = find(&self.chain, ANCILLARY_2, "ancillary2")?;
        let vals = record.float_payload(&mut self.stream, name, band)?;
        vals.first().copied().ok_or_else(|| Error::PayloadShape {
            name: name.to_string(),
        })
    }

    /// Number of populated platform position samples.
    pub fn num_data_points(&self) -> Result<i64> {
        self.ancillary3()?.int_field("num_data_points")
    }

    /// Platform position sample for 1-based `index`, bounded by
    /// [`Self::num_data_points`].
    pub fn data_point(&mut self, index: usize) -> Result<DataPoint> {
        let count = usize::try_from(self.num_data_points()?).unwrap_or(0);
        if index == 0 || index > count {
            return Err(Error::IndexRange { index, count });
        }
        let record = find(&self.chain, ANCILLARY_3, "ancillary3")?;
        let vals = record.float_payload(&mut self.stream, "platform_positions", index)?;
        if vals.len() != 6 {
            return Err(Error::PayloadShape {
                name: "platform_positions".to_string(),
            });
        }
        Ok(DataPoint {
            position: [vals[0], vals[1], vals[2]],
            velocity: [vals[3], vals[4], vals[5]],
        })
    }
}

/// A CEOS trailer file: file descriptor plus the counted per-band
/// histogram records.
pub struct TrailerFile<R>
where
    R: Read + Seek,
{
    stream: ByteStream<R>,
    catalog: &'static MissionCatalog,
    chain: RecordChain,
}

impl TrailerFile<BufReader<File>> {
    /// Open and parse the trailer file at `path`.
    ///
    /// # Errors
    /// Any decode failure, wrapped in [`Error::Product`] identifying the
    /// file and the byte offset at which decoding failed.
    pub fn open<P>(path: P, catalog: &'static MissionCatalog) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let open = || {
            let file = File::open(path)?;
            Self::new(BufReader::new(file), catalog)
        };
        open().map_err(|err| Error::product(path.to_path_buf(), err))
    }
}

impl<R> TrailerFile<R>
where
    R: Read + Seek,
{
    /// Parse a trailer file from an already-open stream.
    pub fn new(reader: R, catalog: &'static MissionCatalog) -> Result<Self> {
        let mut stream = ByteStream::new(reader)?;
        let chain = RecordChain::read(&mut stream, catalog)?;
        debug!(
            mission = catalog.mission,
            records = chain.entries.len(),
            "parsed trailer file"
        );
        Ok(TrailerFile {
            stream,
            catalog,
            chain,
        })
    }

    #[must_use]
    pub fn chain(&self) -> &RecordChain {
        &self.chain
    }

    #[must_use]
    pub fn summary(&self) -> ChainSummary {
        self.chain.summary()
    }

    pub fn file_descriptor(&self) -> Result<&Record> {
        find(&self.chain, FILE_DESCRIPTOR, "file descriptor")
    }

    /// The histogram record count the file descriptor declared.
    pub fn histogram_count(&self) -> Result<i64> {
        self.file_descriptor()?
            .int_field("number_of_histogram_records")
    }

    /// The 256 histogram bins for 1-based band number `band`.
    ///
    /// The band bound is checked against the mission's band count before
    /// any I/O; bins are decoded once and cached on the record.
    pub fn histogram(&mut self, band: usize) -> Result<[i32; 256]> {
        self.catalog.check_band(band)?;
        let record = find(&self.chain, HISTOGRAM, "histogram")?;
        let vals = record.int_payload(&mut self.stream, "histogram", band)?;
        vals.try_into().map_err(|_| Error::PayloadShape {
            name: "histogram".to_string(),
        })
    }
}
