use std::io::{ErrorKind, Read, Seek, SeekFrom};

use crate::{Error, Result};

/// Positional decode primitives over a random-access byte source.
///
/// Every read advances the cursor by exactly the field's declared width,
/// whether or not the content parses. The stream has no notion of a
/// record; callers bound their reads within their own framing.
///
/// Not thread-safe: the cursor is shared, so a stream must be confined to
/// a single worker or guarded externally.
pub struct ByteStream<R>
where
    R: Read + Seek,
{
    inner: R,
    position: u64,
}

impl<R> ByteStream<R>
where
    R: Read + Seek,
{
    /// Wrap `inner`, with the cursor at its current position.
    ///
    /// # Errors
    /// Any [`std::io::Error`] querying the source position.
    pub fn new(mut inner: R) -> Result<Self> {
        let position = inner.stream_position()?;
        Ok(ByteStream { inner, position })
    }

    #[must_use]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Move the cursor to the absolute offset `pos`.
    pub fn seek(&mut self, pos: u64) -> Result<()> {
        self.inner.seek(SeekFrom::Start(pos))?;
        self.position = pos;
        Ok(())
    }

    pub fn skip(&mut self, n: u64) -> Result<()> {
        self.seek(self.position + n)
    }

    /// Total length of the underlying source. The cursor is unaffected.
    pub fn len(&mut self) -> Result<u64> {
        let end = self.inner.seek(SeekFrom::End(0))?;
        self.inner.seek(SeekFrom::Start(self.position))?;
        Ok(end)
    }

    pub fn is_empty(&mut self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        if let Err(err) = self.inner.read_exact(buf) {
            if err.kind() == ErrorKind::UnexpectedEof {
                return Err(Error::Truncated {
                    offset: self.position,
                    wanted: buf.len(),
                });
            }
            return Err(err.into());
        }
        self.position += buf.len() as u64;
        Ok(())
    }

    /// Read a fixed-width ASCII text field, trimmed of padding.
    pub fn read_ascii_text(&mut self, width: usize) -> Result<String> {
        let mut buf = vec![0u8; width];
        self.fill(&mut buf)?;
        let text = String::from_utf8_lossy(&buf);
        Ok(text.trim_matches([' ', '\0']).to_string())
    }

    /// Read a fixed-width ASCII integer field (right-justified, blank padded).
    pub fn read_ascii_int(&mut self, width: usize) -> Result<i64> {
        let offset = self.position;
        let text = self.read_ascii_text(width)?;
        parse_int(&text).ok_or(Error::InvalidNumeric { offset, text })
    }

    /// Read a fixed-width ASCII decimal field.
    ///
    /// When the field carries an explicit decimal point or exponent it is
    /// parsed as written; a digits-only field has a decimal point implied
    /// `implied_frac` places from the right.
    pub fn read_ascii_decimal(&mut self, width: usize, implied_frac: u32) -> Result<f64> {
        let offset = self.position;
        let text = self.read_ascii_text(width)?;
        if text.contains(['.', 'e', 'E']) {
            return text
                .parse::<f64>()
                .map_err(|_| Error::InvalidNumeric { offset, text });
        }
        match parse_int(&text) {
            Some(n) => Ok(n as f64 / 10f64.powi(implied_frac as i32)),
            None => Err(Error::InvalidNumeric { offset, text }),
        }
    }

    /// Read a big-endian binary integer of 1 to 8 bytes.
    pub fn read_bin_int(&mut self, width: usize) -> Result<i64> {
        debug_assert!((1..=8).contains(&width), "binary field width {width}");
        let mut buf = [0u8; 8];
        self.fill(&mut buf[8 - width..])?;
        Ok(i64::from_be_bytes(buf))
    }

    pub fn read_bin_u16(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.fill(&mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    pub fn read_bin_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    pub fn read_bin_i32(&mut self) -> Result<i32> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf)?;
        Ok(i32::from_be_bytes(buf))
    }

    /// Fill `out` with big-endian 8-byte raw bit patterns.
    ///
    /// This is the packed float encoding several missions use for
    /// coefficient tables; reinterpret each pattern with
    /// [`f64::from_bits`].
    pub fn read_raw_bit_floats(&mut self, out: &mut [u64]) -> Result<()> {
        let mut buf = [0u8; 8];
        for slot in out.iter_mut() {
            self.fill(&mut buf)?;
            *slot = u64::from_be_bytes(buf);
        }
        Ok(())
    }
}

fn parse_int(text: &str) -> Option<i64> {
    let text = text.strip_prefix('+').unwrap_or(text);
    text.parse::<i64>().ok()
}

/// Encode `value` as a right-justified, blank-padded ASCII integer field.
///
/// Values wider than `width` are written unpadded; decoding such a field
/// back would consume the declared width regardless.
#[must_use]
pub fn encode_ascii_int(value: i64, width: usize) -> String {
    format!("{value:>width$}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use test_case::test_case;

    fn stream(dat: &[u8]) -> ByteStream<Cursor<&[u8]>> {
        ByteStream::new(Cursor::new(dat)).unwrap()
    }

    #[test]
    fn ascii_text_trims_padding() {
        let mut s = stream(b"  O1B2  rest");
        let text = s.read_ascii_text(8).unwrap();
        assert_eq!(text, "O1B2");
        assert_eq!(s.position(), 8, "cursor must advance the full width");
    }

    #[test_case(b"     123", 123; "right justified")]
    #[test_case(b"    +123", 123; "explicit sign")]
    #[test_case(b"  -45   ", -45; "negative")]
    fn ascii_int(dat: &[u8; 8], expected: i64) {
        let mut s = stream(dat);
        assert_eq!(s.read_ascii_int(8).unwrap(), expected);
    }

    #[test]
    fn ascii_int_rejects_blank_and_garbage() {
        for dat in [&b"        "[..], &b"  12a4  "[..]] {
            let mut s = stream(dat);
            let err = s.read_ascii_int(8).unwrap_err();
            assert!(
                matches!(err, Error::InvalidNumeric { offset: 0, .. }),
                "got {err:?}"
            );
            assert_eq!(s.position(), 8, "cursor advances even on a parse error");
        }
    }

    #[test]
    fn ascii_decimal_explicit_point() {
        let mut s = stream(b"      12.500");
        let v = s.read_ascii_decimal(12, 3).unwrap();
        assert!((v - 12.5).abs() < 1e-9);
    }

    #[test]
    fn ascii_decimal_implied_point() {
        let mut s = stream(b"       12500");
        let v = s.read_ascii_decimal(12, 3).unwrap();
        assert!((v - 12.5).abs() < 1e-9);
    }

    #[test]
    fn bin_int_big_endian() {
        let mut s = stream(&[0x00, 0x00, 0x12, 0x34, 0xff]);
        assert_eq!(s.read_bin_int(4).unwrap(), 0x1234);
        assert_eq!(s.position(), 4);
    }

    #[test]
    fn raw_bit_floats() {
        let mut dat = Vec::new();
        dat.extend_from_slice(&123.4567f64.to_bits().to_be_bytes());
        dat.extend_from_slice(&(-9.25f64).to_bits().to_be_bytes());
        let mut s = stream(&dat);

        let mut bits = [0u64; 2];
        s.read_raw_bit_floats(&mut bits).unwrap();
        assert_eq!(f64::from_bits(bits[0]), 123.4567);
        assert_eq!(f64::from_bits(bits[1]), -9.25);
    }

    #[test]
    fn truncated_read_reports_offset() {
        let mut s = stream(b"abc");
        s.seek(1).unwrap();
        let err = s.read_ascii_text(8).unwrap_err();
        match err {
            Error::Truncated { offset, wanted } => {
                assert_eq!(offset, 1);
                assert_eq!(wanted, 8);
            }
            other => panic!("expected Truncated, got {other:?}"),
        }
    }

    #[test]
    fn seek_is_absolute() {
        let mut s = stream(b"0123456789");
        s.seek(4).unwrap();
        assert_eq!(s.read_ascii_int(2).unwrap(), 45);
        s.seek(4).unwrap();
        assert_eq!(s.read_ascii_int(2).unwrap(), 45, "re-reads are idempotent");
    }

    #[test]
    fn int_field_round_trip() {
        let padded = "     456";
        let mut s = stream(padded.as_bytes());
        let v = s.read_ascii_int(8).unwrap();
        assert_eq!(encode_ascii_int(v, 8), padded);
    }
}
