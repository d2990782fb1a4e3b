//! The positioned record view and its field decoding model.

use std::cell::OnceCell;
use std::collections::HashMap;
use std::fmt::Display;
use std::io::{Read, Seek};

use serde::Serialize;
use tracing::trace;

use crate::catalog::{FieldEncoding, PayloadSpec, RecordDefinition};
use crate::stream::ByteStream;
use crate::{Error, Result};

/// Length of the framing header common to every CEOS record.
pub const HEADER_LEN: u64 = 12;

/// The self-delimiting framing header at the start of every record:
/// record sequence number, type code, and the record's declared length.
///
/// Chain traversal trusts `length` unconditionally, so it is decoded even
/// for record types nothing else recognizes.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RecordHeader {
    pub sequence: u32,
    pub type_code: u16,
    pub length: i32,
}

impl RecordHeader {
    /// Read a header at the stream's current position.
    ///
    /// # Errors
    /// [`Error::Truncated`] if fewer than [`HEADER_LEN`] bytes remain.
    pub fn read<R>(stream: &mut ByteStream<R>) -> Result<RecordHeader>
    where
        R: Read + Seek,
    {
        let sequence = stream.read_bin_u32()?;
        let type_code = stream.read_bin_u16()?;
        stream.skip(2)?;
        let length = stream.read_bin_i32()?;
        Ok(RecordHeader {
            sequence,
            type_code,
            length,
        })
    }
}

/// A decoded scalar field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Int(i64),
    Float(f64),
}

/// A decoded repeating payload for one band.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Floats(Vec<f64>),
    Ints(Vec<i32>),
}

/// A record: a positioned view over the stream, decoded against one
/// [`RecordDefinition`].
///
/// Scalar fields are decoded eagerly at construction; construction either
/// yields a fully decoded record or fails, never something in between.
/// Payloads are decoded on first access and memoized per band; a failed
/// payload decode leaves its cache slot unset so a later retry is possible.
///
/// All addressing is `start + relative_offset`, so field access is
/// idempotent and order-independent as long as no other actor moves the
/// shared stream cursor.
#[derive(Debug)]
pub struct Record {
    start: u64,
    header: RecordHeader,
    definition: &'static RecordDefinition,
    fields: HashMap<&'static str, Value>,
    payload_cache: Vec<Vec<OnceCell<Payload>>>,
}

impl Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Record{{{} type=0x{:04X} start={} len={}}}",
            self.definition.name, self.header.type_code, self.start, self.header.length
        )
    }
}

impl Record {
    /// Decode a record against `definition`.
    ///
    /// With `start = Some(pos)` the stream is first positioned at `pos`
    /// (random access / re-read); with `None` the record starts at the
    /// stream's current cursor (sequential chain walk).
    ///
    /// # Errors
    /// [`Error::BadRecordLength`] if the declared length cannot contain the
    /// header, [`Error::FieldRange`] if any catalog field, payload, or
    /// locator extends past the declared length, and any decode error from
    /// the field reads.
    pub fn read<R>(
        stream: &mut ByteStream<R>,
        definition: &'static RecordDefinition,
        start: Option<u64>,
    ) -> Result<Record>
    where
        R: Read + Seek,
    {
        if let Some(pos) = start {
            stream.seek(pos)?;
        }
        let start = stream.position();
        let header = RecordHeader::read(stream)?;
        if i64::from(header.length) < HEADER_LEN as i64 {
            return Err(Error::BadRecordLength {
                offset: start,
                length: i64::from(header.length),
            });
        }
        let length = header.length as u64;

        // Nothing in this record may be addressed at or past the declared
        // length, catalogs included.
        for f in definition.fields {
            if f.end() > length {
                return Err(Error::FieldRange {
                    name: f.name.to_string(),
                    length: header.length,
                });
            }
        }
        for p in definition.payloads {
            if p.end() > length {
                return Err(Error::FieldRange {
                    name: p.name.to_string(),
                    length: header.length,
                });
            }
        }
        for l in definition.locators {
            if l.end() > length {
                return Err(Error::FieldRange {
                    name: l.name.to_string(),
                    length: header.length,
                });
            }
        }

        let mut fields = HashMap::with_capacity(definition.fields.len());
        for f in definition.fields {
            stream.seek(start + f.offset)?;
            let value = match f.encoding {
                FieldEncoding::AsciiText => Value::Text(stream.read_ascii_text(f.width as usize)?),
                FieldEncoding::AsciiInteger => Value::Int(stream.read_ascii_int(f.width as usize)?),
                FieldEncoding::AsciiFixedDecimal(frac) => {
                    Value::Float(stream.read_ascii_decimal(f.width as usize, frac)?)
                }
                FieldEncoding::BinaryInteger => Value::Int(stream.read_bin_int(f.width as usize)?),
                FieldEncoding::RawBitPatternFloat => {
                    let mut bits = [0u64; 1];
                    stream.read_raw_bit_floats(&mut bits)?;
                    Value::Float(f64::from_bits(bits[0]))
                }
            };
            fields.insert(f.name, value);
        }

        let payload_cache = definition
            .payloads
            .iter()
            .map(|p| (0..p.groups).map(|_| OnceCell::new()).collect())
            .collect();

        trace!(
            record = definition.name,
            type_code = header.type_code,
            start,
            length = header.length,
            "decoded record"
        );

        Ok(Record {
            start,
            header,
            definition,
            fields,
            payload_cache,
        })
    }

    #[must_use]
    pub fn start(&self) -> u64 {
        self.start
    }

    #[must_use]
    pub fn header(&self) -> &RecordHeader {
        &self.header
    }

    #[must_use]
    pub fn definition(&self) -> &'static RecordDefinition {
        self.definition
    }

    /// The sole addressing primitive: `start + relative_offset`.
    #[must_use]
    pub fn absolute_position(&self, relative: u64) -> u64 {
        self.start + relative
    }

    pub fn str_field(&self, name: &str) -> Result<&str> {
        match self.value(name)? {
            Value::Text(s) => Ok(s),
            _ => Err(Error::WrongFieldType {
                name: name.to_string(),
                expected: "text",
            }),
        }
    }

    pub fn int_field(&self, name: &str) -> Result<i64> {
        match self.value(name)? {
            Value::Int(n) => Ok(*n),
            _ => Err(Error::WrongFieldType {
                name: name.to_string(),
                expected: "an integer",
            }),
        }
    }

    pub fn float_field(&self, name: &str) -> Result<f64> {
        match self.value(name)? {
            Value::Float(v) => Ok(*v),
            Value::Int(n) => Ok(*n as f64),
            Value::Text(_) => Err(Error::WrongFieldType {
                name: name.to_string(),
                expected: "numeric",
            }),
        }
    }

    fn value(&self, name: &str) -> Result<&Value> {
        self.fields
            .get(name)
            .ok_or_else(|| Error::UnknownField(name.to_string()))
    }

    pub(crate) fn field_offset(&self, name: &str) -> Option<u64> {
        self.definition.field(name).map(|f| self.start + f.offset)
    }

    /// Float payload for 1-based band number `band`, memoized.
    ///
    /// The band bound is checked before any I/O is attempted.
    pub fn float_payload<R>(
        &self,
        stream: &mut ByteStream<R>,
        name: &str,
        band: usize,
    ) -> Result<&[f64]>
    where
        R: Read + Seek,
    {
        match self.payload(stream, name, band)? {
            Payload::Floats(v) => Ok(v),
            Payload::Ints(_) => Err(Error::WrongFieldType {
                name: name.to_string(),
                expected: "a float payload",
            }),
        }
    }

    /// Integer payload for 1-based band number `band`, memoized.
    pub fn int_payload<R>(
        &self,
        stream: &mut ByteStream<R>,
        name: &str,
        band: usize,
    ) -> Result<&[i32]>
    where
        R: Read + Seek,
    {
        match self.payload(stream, name, band)? {
            Payload::Ints(v) => Ok(v),
            Payload::Floats(_) => Err(Error::WrongFieldType {
                name: name.to_string(),
                expected: "an integer payload",
            }),
        }
    }

    fn payload<R>(&self, stream: &mut ByteStream<R>, name: &str, band: usize) -> Result<&Payload>
    where
        R: Read + Seek,
    {
        let (idx, spec) = self
            .definition
            .payload(name)
            .ok_or_else(|| Error::UnknownPayload(name.to_string()))?;
        if band == 0 || band > spec.groups {
            return Err(Error::BandRange {
                band,
                count: spec.groups,
            });
        }

        let slot = &self.payload_cache[idx][band - 1];
        match slot.get() {
            Some(payload) => Ok(payload),
            None => {
                // Decode fully before touching the slot; a failure here
                // leaves the cache unset and retryable.
                let payload = self.decode_payload(stream, spec, band)?;
                Ok(slot.get_or_init(|| payload))
            }
        }
    }

    fn decode_payload<R>(
        &self,
        stream: &mut ByteStream<R>,
        spec: &PayloadSpec,
        band: usize,
    ) -> Result<Payload>
    where
        R: Read + Seek,
    {
        stream.seek(self.absolute_position(spec.group_offset(band)))?;
        let n = spec.group_elems();
        match spec.encoding {
            FieldEncoding::RawBitPatternFloat => {
                let mut bits = vec![0u64; n];
                stream.read_raw_bit_floats(&mut bits)?;
                Ok(Payload::Floats(
                    bits.into_iter().map(f64::from_bits).collect(),
                ))
            }
            FieldEncoding::BinaryInteger => {
                let mut vals = Vec::with_capacity(n);
                for _ in 0..n {
                    vals.push(stream.read_bin_int(spec.width as usize)? as i32);
                }
                Ok(Payload::Ints(vals))
            }
            _ => Err(Error::PayloadShape {
                name: spec.name.to_string(),
            }),
        }
    }

    /// View this record as a file descriptor, exposing its locator fields.
    #[must_use]
    pub fn file_descriptor(&self) -> FileDescriptor<'_> {
        FileDescriptor { record: self }
    }
}

/// An offset/length pointer into an auxiliary data region of the same
/// physical file, decoded from a file descriptor record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Locator {
    pub position: u64,
    pub length: u64,
    pub kind: String,
}

/// The file descriptor specialization of [`Record`]: the first record of a
/// leader/image/trailer file, which describes the file's own structure.
pub struct FileDescriptor<'a> {
    record: &'a Record,
}

impl<'a> FileDescriptor<'a> {
    #[must_use]
    pub fn record(&self) -> &'a Record {
        self.record
    }

    /// Decode the named locator. Locators are small and idempotent to
    /// re-read, so they are not cached.
    pub fn locator<R>(&self, stream: &mut ByteStream<R>, name: &str) -> Result<Locator>
    where
        R: Read + Seek,
    {
        let spec = self
            .record
            .definition
            .locator(name)
            .ok_or_else(|| Error::UnknownLocator(name.to_string()))?;
        stream.seek(self.record.absolute_position(spec.offset))?;
        let position = read_unsigned(stream, spec.width as usize)?;
        let length = read_unsigned(stream, spec.width as usize)?;
        let kind = stream.read_ascii_text(4)?;
        Ok(Locator {
            position,
            length,
            kind,
        })
    }
}

fn read_unsigned<R>(stream: &mut ByteStream<R>, width: usize) -> Result<u64>
where
    R: Read + Seek,
{
    let offset = stream.position();
    let value = stream.read_ascii_int(width)?;
    u64::try_from(value).map_err(|_| Error::InvalidNumeric {
        offset,
        text: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FieldSpec, LocatorSpec};
    use std::cell::Cell;
    use std::io::{Cursor, SeekFrom};
    use std::rc::Rc;

    static FIELDS: [FieldSpec; 3] = [
        FieldSpec {
            name: "scene_id",
            offset: 12,
            encoding: FieldEncoding::AsciiText,
            width: 8,
        },
        FieldSpec {
            name: "line_count",
            offset: 20,
            encoding: FieldEncoding::AsciiInteger,
            width: 6,
        },
        FieldSpec {
            name: "pixel_size",
            offset: 26,
            encoding: FieldEncoding::AsciiFixedDecimal(2),
            width: 8,
        },
    ];

    static PAYLOADS: [PayloadSpec; 1] = [PayloadSpec {
        name: "coefficients",
        offset: 40,
        encoding: FieldEncoding::RawBitPatternFloat,
        width: 8,
        groups: 2,
        rows: 2,
        cols: 3,
    }];

    static LOCATORS: [LocatorSpec; 1] = [LocatorSpec {
        name: "optical_black",
        offset: 136,
        width: 6,
    }];

    static DEF: RecordDefinition = RecordDefinition {
        name: "test_record",
        type_code: 0x1214,
        fields: &FIELDS,
        payloads: &PAYLOADS,
        locators: &LOCATORS,
        trailing: None,
    };

    const REC_LEN: usize = 160;

    fn header_bytes(sequence: u32, type_code: u16, length: i32) -> Vec<u8> {
        let mut dat = Vec::new();
        dat.extend_from_slice(&sequence.to_be_bytes());
        dat.extend_from_slice(&type_code.to_be_bytes());
        dat.extend_from_slice(&[0x12, 0x12]);
        dat.extend_from_slice(&length.to_be_bytes());
        dat
    }

    fn record_bytes() -> Vec<u8> {
        let mut dat = vec![b' '; REC_LEN];
        dat[..12].copy_from_slice(&header_bytes(1, 0x1214, REC_LEN as i32));
        dat[12..20].copy_from_slice(b"SCENE123");
        dat[20..26].copy_from_slice(b"  7100");
        dat[26..34].copy_from_slice(b"    1250"); // implied point: 12.50
        for band in 0..2u64 {
            for k in 0..6u64 {
                let v = (100 * (band + 1) + k) as f64 + 0.5;
                let at = (40 + (band * 6 + k) * 8) as usize;
                dat[at..at + 8].copy_from_slice(&v.to_bits().to_be_bytes());
            }
        }
        dat[136..142].copy_from_slice(b"  4680");
        dat[142..148].copy_from_slice(b"  7100");
        dat[148..152].copy_from_slice(b"OBP ");
        dat
    }

    struct Counting<R> {
        inner: R,
        reads: Rc<Cell<usize>>,
    }

    impl<R: std::io::Read> std::io::Read for Counting<R> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.reads.set(self.reads.get() + 1);
            self.inner.read(buf)
        }
    }

    impl<R: std::io::Seek> std::io::Seek for Counting<R> {
        fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    fn counting_stream(dat: Vec<u8>) -> (ByteStream<Counting<Cursor<Vec<u8>>>>, Rc<Cell<usize>>) {
        let reads = Rc::new(Cell::new(0));
        let stream = ByteStream::new(Counting {
            inner: Cursor::new(dat),
            reads: Rc::clone(&reads),
        })
        .unwrap();
        (stream, reads)
    }

    #[test]
    fn absolute_position_is_start_plus_relative() {
        let mut dat = vec![0u8; 64];
        dat.extend(record_bytes());
        let mut stream = ByteStream::new(Cursor::new(dat)).unwrap();

        let record = Record::read(&mut stream, &DEF, Some(64)).unwrap();
        assert_eq!(record.start(), 64);
        assert_eq!(record.absolute_position(0), 64);
        for k in [1, 12, 159] {
            assert_eq!(record.absolute_position(k), 64 + k);
        }
    }

    #[test]
    fn scalar_fields_decode_eagerly() {
        let mut stream = ByteStream::new(Cursor::new(record_bytes())).unwrap();
        let record = Record::read(&mut stream, &DEF, None).unwrap();

        assert_eq!(record.header().sequence, 1);
        assert_eq!(record.header().type_code, 0x1214);
        assert_eq!(record.header().length, REC_LEN as i32);
        assert_eq!(record.str_field("scene_id").unwrap(), "SCENE123");
        assert_eq!(record.int_field("line_count").unwrap(), 7100);
        assert!((record.float_field("pixel_size").unwrap() - 12.5).abs() < 1e-9);
        assert!(matches!(
            record.str_field("nope").unwrap_err(),
            Error::UnknownField(_)
        ));
        assert!(matches!(
            record.int_field("scene_id").unwrap_err(),
            Error::WrongFieldType { .. }
        ));
    }

    #[test]
    fn construction_fails_when_field_is_past_declared_length() {
        let mut dat = record_bytes();
        // Declared length of 30 cuts off pixel_size (ends at 34)
        dat[8..12].copy_from_slice(&30i32.to_be_bytes());
        let mut stream = ByteStream::new(Cursor::new(dat)).unwrap();

        let err = Record::read(&mut stream, &DEF, None).unwrap_err();
        assert!(matches!(err, Error::FieldRange { length: 30, .. }), "{err:?}");
    }

    #[test]
    fn construction_fails_on_bad_length() {
        for length in [0, -1, 11] {
            let mut dat = record_bytes();
            dat[8..12].copy_from_slice(&(length as i32).to_be_bytes());
            let mut stream = ByteStream::new(Cursor::new(dat)).unwrap();
            let err = Record::read(&mut stream, &DEF, None).unwrap_err();
            assert!(
                matches!(err, Error::BadRecordLength { offset: 0, .. }),
                "length {length}: {err:?}"
            );
        }
    }

    #[test]
    fn payload_is_memoized() {
        let (mut stream, reads) = counting_stream(record_bytes());
        let record = Record::read(&mut stream, &DEF, None).unwrap();

        let first = record
            .float_payload(&mut stream, "coefficients", 2)
            .unwrap()
            .to_vec();
        assert_eq!(first.len(), 6);
        assert_eq!(first[0], 200.5);
        assert_eq!(first[5], 205.5);

        let before = reads.get();
        let second = record.float_payload(&mut stream, "coefficients", 2).unwrap();
        assert_eq!(second, &first[..]);
        assert_eq!(reads.get(), before, "second access must not touch the stream");
    }

    #[test]
    fn band_bounds_are_checked_before_io() {
        let (mut stream, reads) = counting_stream(record_bytes());
        let record = Record::read(&mut stream, &DEF, None).unwrap();

        let before = reads.get();
        for band in [0, 3] {
            let err = record
                .float_payload(&mut stream, "coefficients", band)
                .unwrap_err();
            assert!(matches!(err, Error::BandRange { count: 2, .. }), "{err:?}");
        }
        assert_eq!(reads.get(), before, "rejected bands must not read");
    }

    #[test]
    fn failed_payload_decode_leaves_cache_retryable() {
        // Declared length is fine, but the file itself ends mid-payload.
        let full = record_bytes();
        let truncated = full[..60].to_vec();
        let mut short_stream = ByteStream::new(Cursor::new(truncated)).unwrap();
        let record = Record::read(&mut short_stream, &DEF, None).unwrap();

        let err = record
            .float_payload(&mut short_stream, "coefficients", 1)
            .unwrap_err();
        assert!(matches!(err, Error::Truncated { .. }), "{err:?}");

        // A correctly-positioned retry against an intact stream succeeds.
        let mut stream = ByteStream::new(Cursor::new(full)).unwrap();
        let vals = record.float_payload(&mut stream, "coefficients", 1).unwrap();
        assert_eq!(vals[0], 100.5);
    }

    #[test]
    fn locator_decodes_offset_length_kind() {
        let mut stream = ByteStream::new(Cursor::new(record_bytes())).unwrap();
        let record = Record::read(&mut stream, &DEF, None).unwrap();

        let loc = record
            .file_descriptor()
            .locator(&mut stream, "optical_black")
            .unwrap();
        assert_eq!(
            loc,
            Locator {
                position: 4680,
                length: 7100,
                kind: "OBP".to_string(),
            }
        );
        assert!(matches!(
            record
                .file_descriptor()
                .locator(&mut stream, "nope")
                .unwrap_err(),
            Error::UnknownLocator(_)
        ));
    }
}
