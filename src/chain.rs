//! Record chain traversal.
//!
//! A CEOS leader/trailer file is an a-priori-unknown sequence of
//! heterogeneous, self-delimiting records. The walker discovers the
//! sequence from the framing headers alone: it always advances by a
//! record's declared length, whether or not the record type was
//! recognized, so traversal stays correct even when a mission catalog is
//! incomplete.

use std::collections::BTreeMap;
use std::io::{Read, Seek};

use serde::Serialize;
use tracing::{debug, trace};

use crate::catalog::{MissionCatalog, RecordDefinition};
use crate::record::{Record, RecordHeader, HEADER_LEN};
use crate::stream::ByteStream;
use crate::{Error, Result};

/// One record slot discovered during a walk.
#[derive(Debug)]
pub enum ChainEntry {
    /// A record type the catalog knows; fully decoded.
    Decoded(Record),
    /// A record type the catalog does not know; noted and skipped.
    Skipped { start: u64, header: RecordHeader },
}

impl ChainEntry {
    #[must_use]
    pub fn header(&self) -> &RecordHeader {
        match self {
            ChainEntry::Decoded(record) => record.header(),
            ChainEntry::Skipped { header, .. } => header,
        }
    }

    #[must_use]
    pub fn start(&self) -> u64 {
        match self {
            ChainEntry::Decoded(record) => record.start(),
            ChainEntry::Skipped { start, .. } => *start,
        }
    }
}

enum WalkState {
    AtHeader,
    Decode {
        start: u64,
        header: RecordHeader,
        definition: &'static RecordDefinition,
    },
    Skip {
        start: u64,
        header: RecordHeader,
    },
    Done,
}

/// When a decoded record declares trailing counted records, the walk reads
/// exactly that many of the counted type and then stops.
struct Counted {
    type_code: u16,
    remaining: i64,
}

/// The ordered, heterogeneous record sequence of one physical file.
#[derive(Debug)]
pub struct RecordChain {
    pub entries: Vec<ChainEntry>,
}

impl RecordChain {
    /// Walk the chain from the stream's current position until a
    /// terminator, EOF at a header boundary, or an exhausted trailing
    /// count.
    ///
    /// # Errors
    /// [`Error::Truncated`] when a header is cut off mid-read, and any
    /// decode error from a recognized record's fields; both abort the
    /// whole walk, since later records may depend on earlier values.
    pub fn read<R>(stream: &mut ByteStream<R>, catalog: &MissionCatalog) -> Result<RecordChain>
    where
        R: Read + Seek,
    {
        let file_len = stream.len()?;
        let mut entries = Vec::new();
        let mut counted: Option<Counted> = None;
        let mut state = WalkState::AtHeader;

        loop {
            state = match state {
                WalkState::AtHeader => {
                    let start = stream.position();
                    if counted.as_ref().is_some_and(|c| c.remaining <= 0) {
                        trace!("trailing count exhausted");
                        WalkState::Done
                    } else if start >= file_len {
                        WalkState::Done
                    } else if file_len - start < HEADER_LEN {
                        return Err(Error::Truncated {
                            offset: start,
                            wanted: HEADER_LEN as usize,
                        });
                    } else {
                        let header = RecordHeader::read(stream)?;
                        if header.length <= 0 {
                            trace!(start, length = header.length, "terminator record");
                            WalkState::Done
                        } else if (header.length as u64) < HEADER_LEN {
                            return Err(Error::BadRecordLength {
                                offset: start,
                                length: i64::from(header.length),
                            });
                        } else if let Some(definition) = catalog.definition(header.type_code) {
                            WalkState::Decode {
                                start,
                                header,
                                definition,
                            }
                        } else {
                            WalkState::Skip { start, header }
                        }
                    }
                }
                WalkState::Decode {
                    start,
                    header,
                    definition,
                } => {
                    let record = Record::read(stream, definition, Some(start))?;
                    if let Some(trailing) = definition.trailing {
                        let count = record.int_field(trailing.count_field)?;
                        if count < 0 {
                            return Err(Error::BadRecordLength {
                                offset: start,
                                length: count,
                            });
                        }
                        debug!(
                            record = definition.name,
                            type_code = trailing.type_code,
                            count,
                            "expecting counted trailing records"
                        );
                        counted = Some(Counted {
                            type_code: trailing.type_code,
                            remaining: count,
                        });
                    }
                    entries.push(ChainEntry::Decoded(record));
                    advance(stream, start, &header, &mut counted)?
                }
                WalkState::Skip { start, header } => {
                    debug!(
                        type_code = header.type_code,
                        start,
                        length = header.length,
                        "skipping unrecognized record"
                    );
                    entries.push(ChainEntry::Skipped { start, header });
                    advance(stream, start, &header, &mut counted)?
                }
                WalkState::Done => break,
            };
        }

        Ok(RecordChain { entries })
    }

    /// First decoded record with the given type code.
    #[must_use]
    pub fn find(&self, type_code: u16) -> Option<&Record> {
        self.find_all(type_code).next()
    }

    /// All decoded records with the given type code, in file order.
    pub fn find_all(&self, type_code: u16) -> impl Iterator<Item = &Record> {
        self.entries.iter().filter_map(move |e| match e {
            ChainEntry::Decoded(record) if record.header().type_code == type_code => Some(record),
            _ => None,
        })
    }

    #[must_use]
    pub fn summary(&self) -> ChainSummary {
        let mut type_counts: BTreeMap<u16, usize> = BTreeMap::new();
        let mut total_bytes = 0u64;
        let mut decoded = 0;
        for entry in &self.entries {
            *type_counts.entry(entry.header().type_code).or_default() += 1;
            total_bytes += entry.header().length as u64;
            if matches!(entry, ChainEntry::Decoded(_)) {
                decoded += 1;
            }
        }
        ChainSummary {
            records: self.entries.len(),
            decoded,
            skipped: self.entries.len() - decoded,
            total_bytes,
            type_counts,
        }
    }
}

/// Seek to the record's declared end and update any trailing count.
fn advance<R>(
    stream: &mut ByteStream<R>,
    start: u64,
    header: &RecordHeader,
    counted: &mut Option<Counted>,
) -> Result<WalkState>
where
    R: Read + Seek,
{
    stream.seek(start + header.length as u64)?;
    if let Some(c) = counted {
        if c.type_code == header.type_code {
            c.remaining -= 1;
        }
    }
    Ok(WalkState::AtHeader)
}

/// Per-file traversal totals, serializable for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct ChainSummary {
    pub records: usize,
    pub decoded: usize,
    pub skipped: usize,
    pub total_bytes: u64,
    pub type_counts: BTreeMap<u16, usize>,
}
