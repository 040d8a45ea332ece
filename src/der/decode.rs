//! Hand-rolled strict DER reader.
//!
//! `yasna`'s `BERReader` parses the more permissive BER grammar and does not
//! track byte offsets, so it cannot give the canonical-DER guarantees this
//! module promises (round-trip stability; rejection of non-minimal lengths,
//! indefinite-length forms, and trailing bytes). This cursor is modeled on
//! the byte-cursor parsers common in the pack's own certificate code (e.g.
//! `webpki`'s `signed_data`, `x509-parser`), specialised to DER only.

use super::{tag, DerError, DerErrorKind};
use chrono::{DateTime, NaiveDate, Utc};

type R<T> = Result<T, DerError>;

/// A cursor over a byte slice that decodes one DER value at a time,
/// reporting the offset of any failure relative to the slice it was built
/// from.
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Wraps `data` for decoding, starting at offset zero.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// True if every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos == self.data.len()
    }

    /// Current offset into the original slice. Useful when a caller wants to
    /// splice the raw bytes of a value it doesn't want to fully decode.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// The bytes not yet consumed.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Asserts no bytes remain; otherwise reports a [`DerErrorKind::NonCanonical`]
    /// trailing-data error at the current offset.
    pub fn finish(self) -> R<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.err(DerErrorKind::NonCanonical))
        }
    }

    fn err(&self, kind: DerErrorKind) -> DerError {
        DerError::new(kind, self.pos)
    }

    fn read_u8(&mut self) -> R<u8> {
        let b = *self
            .data
            .get(self.pos)
            .ok_or_else(|| self.err(DerErrorKind::Truncated))?;
        self.pos += 1;
        Ok(b)
    }

    /// Reads a DER length octet sequence, rejecting the indefinite form and
    /// any long-form encoding that could have been written in short form.
    fn read_length(&mut self) -> R<usize> {
        let first = self.read_u8()?;
        if first & 0x80 == 0 {
            return Ok(first as usize);
        }
        let num_bytes = (first & 0x7f) as usize;
        if num_bytes == 0 {
            return Err(self.err(DerErrorKind::InvalidLength));
        }
        if num_bytes > 8 {
            return Err(self.err(DerErrorKind::Overflow));
        }
        let leading_pos = self.pos;
        let mut value: u64 = 0;
        for _ in 0..num_bytes {
            let b = self.read_u8()?;
            value = (value << 8) | b as u64;
        }
        if self.data[leading_pos] == 0x00 {
            return Err(DerError::new(DerErrorKind::NonCanonical, leading_pos));
        }
        if value < 128 {
            return Err(DerError::new(DerErrorKind::NonCanonical, leading_pos - 1));
        }
        usize::try_from(value).map_err(|_| self.err(DerErrorKind::Overflow))
    }

    /// Reads one tag+length header matching `expected_tag` and returns the
    /// content bytes, advancing past them.
    fn read_tlv(&mut self, expected_tag: u8) -> R<&'a [u8]> {
        let tag_pos = self.pos;
        let got = self.read_u8()?;
        if got != expected_tag {
            return Err(DerError::new(DerErrorKind::UnexpectedTag, tag_pos));
        }
        let len = self.read_length()?;
        let start = self.pos;
        let end = start
            .checked_add(len)
            .ok_or_else(|| self.err(DerErrorKind::Overflow))?;
        if end > self.data.len() {
            return Err(DerError::new(DerErrorKind::Truncated, start));
        }
        self.pos = end;
        Ok(&self.data[start..end])
    }

    /// Peeks at the next tag byte without consuming anything.
    pub fn peek_tag(&self) -> R<u8> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or_else(|| self.err(DerErrorKind::Truncated))
    }

    /// Skips exactly one complete TLV, whatever its tag, advancing past it.
    fn skip_value(&mut self) -> R<()> {
        let _ = self.read_u8()?;
        let len = self.read_length()?;
        let end = self
            .pos
            .checked_add(len)
            .ok_or_else(|| self.err(DerErrorKind::Overflow))?;
        if end > self.data.len() {
            return Err(self.err(DerErrorKind::Truncated));
        }
        self.pos = end;
        Ok(())
    }

    /// Reads one complete TLV (tag, length, and content octets together),
    /// whatever its tag, and returns the whole span verbatim. Used to splice
    /// an already-encoded sub-value (e.g. a certificate's `subject` Name)
    /// straight into a new structure without re-deriving it.
    pub fn read_raw_tlv(&mut self) -> R<&'a [u8]> {
        let start = self.pos;
        self.skip_value()?;
        Ok(&self.data[start..self.pos])
    }

    /// Opens a `SEQUENCE`, returning a reader scoped to its content that the
    /// caller may consume partially — unlike [`Reader::read_sequence`],
    /// which requires the whole content to be read. Used when only a
    /// prefix of a structure's fields are of interest (e.g. pulling just
    /// the `subject` field out of a `TBSCertificate` without decoding its
    /// extensions).
    pub fn open_sequence(&mut self) -> R<Reader<'a>> {
        let content = self.read_tlv(tag::SEQUENCE)?;
        Ok(Reader::new(content))
    }

    fn read_constructed<T>(
        &mut self,
        expected_tag: u8,
        f: impl FnOnce(&mut Reader<'a>) -> R<T>,
    ) -> R<T> {
        let content = self.read_tlv(expected_tag)?;
        let mut inner = Reader::new(content);
        let value = f(&mut inner)?;
        inner.finish()?;
        Ok(value)
    }

    /// Reads a `SEQUENCE`, handing the caller a reader scoped to its content.
    /// Errors if the content has bytes left over after `f` returns.
    pub fn read_sequence<T>(&mut self, f: impl FnOnce(&mut Reader<'a>) -> R<T>) -> R<T> {
        self.read_constructed(tag::SEQUENCE, f)
    }

    /// Reads a `SET` (not `SET OF` — see [`Reader::read_set_of_raw`] for that),
    /// handing the caller a reader scoped to its content.
    pub fn read_set<T>(&mut self, f: impl FnOnce(&mut Reader<'a>) -> R<T>) -> R<T> {
        self.read_constructed(tag::SET, f)
    }

    /// Reads an explicit context tag `[n] EXPLICIT`.
    pub fn read_explicit<T>(&mut self, tag_number: u64, f: impl FnOnce(&mut Reader<'a>) -> R<T>) -> R<T> {
        let expected = tag::CONTEXT | tag::CONSTRUCTED | (tag_number as u8 & 0x1f);
        self.read_constructed(expected, f)
    }

    /// True if the very next TLV is the given explicit context tag, without
    /// consuming it. Used for `OPTIONAL` fields.
    pub fn peek_is_explicit(&self, tag_number: u64) -> bool {
        let expected = tag::CONTEXT | tag::CONSTRUCTED | (tag_number as u8 & 0x1f);
        self.peek_tag() == Ok(expected)
    }

    /// Reads a `BOOLEAN`.
    pub fn read_bool(&mut self) -> R<bool> {
        let pos = self.pos;
        let content = self.read_tlv(tag::BOOLEAN)?;
        if content.len() != 1 {
            return Err(DerError::new(DerErrorKind::InvalidLength, pos));
        }
        match content[0] {
            0x00 => Ok(false),
            0xff => Ok(true),
            _ => Err(DerError::new(DerErrorKind::NonCanonical, pos)),
        }
    }

    fn check_minimal_integer(&self, content: &[u8], pos: usize) -> R<()> {
        if content.is_empty() {
            return Err(DerError::new(DerErrorKind::InvalidLength, pos));
        }
        if content.len() > 1 {
            let redundant_zero = content[0] == 0x00 && content[1] & 0x80 == 0;
            let redundant_ff = content[0] == 0xff && content[1] & 0x80 != 0;
            if redundant_zero || redundant_ff {
                return Err(DerError::new(DerErrorKind::NonCanonical, pos));
            }
        }
        Ok(())
    }

    /// Reads an `INTEGER` that fits in an `i64`.
    pub fn read_integer_i64(&mut self) -> R<i64> {
        let pos = self.pos;
        let content = self.read_tlv(tag::INTEGER)?;
        self.check_minimal_integer(content, pos)?;
        if content.len() > 8 {
            return Err(DerError::new(DerErrorKind::Overflow, pos));
        }
        let mut value: i64 = if content[0] & 0x80 != 0 { -1 } else { 0 };
        for &b in content {
            value = (value << 8) | b as i64;
        }
        Ok(value)
    }

    /// Reads an `INTEGER`'s raw minimal two's-complement bytes, for values
    /// too large for `i64` (e.g. 20-byte certificate serial numbers).
    pub fn read_integer_bytes(&mut self) -> R<&'a [u8]> {
        let pos = self.pos;
        let content = self.read_tlv(tag::INTEGER)?;
        self.check_minimal_integer(content, pos)?;
        Ok(content)
    }

    /// Reads an `OCTET STRING`.
    pub fn read_octet_string(&mut self) -> R<&'a [u8]> {
        self.read_tlv(tag::OCTET_STRING)
    }

    /// Reads a `BIT STRING`, returning `(unused_bit_count, bytes)`.
    pub fn read_bit_string(&mut self) -> R<(u8, &'a [u8])> {
        let pos = self.pos;
        let content = self.read_tlv(tag::BIT_STRING)?;
        let (unused, rest) = content
            .split_first()
            .ok_or_else(|| DerError::new(DerErrorKind::Truncated, pos))?;
        if *unused > 7 {
            return Err(DerError::new(DerErrorKind::NonCanonical, pos));
        }
        if *unused > 0 {
            if let Some(&last) = rest.last() {
                let mask = (1u8 << *unused) - 1;
                if last & mask != 0 {
                    return Err(DerError::new(DerErrorKind::NonCanonical, pos));
                }
            }
        }
        Ok((*unused, rest))
    }

    /// Reads a `NULL`.
    pub fn read_null(&mut self) -> R<()> {
        let pos = self.pos;
        let content = self.read_tlv(tag::NULL)?;
        if !content.is_empty() {
            return Err(DerError::new(DerErrorKind::InvalidLength, pos));
        }
        Ok(())
    }

    /// Reads an `OBJECT IDENTIFIER` into its arc components.
    pub fn read_oid(&mut self) -> R<Vec<u64>> {
        let pos = self.pos;
        let content = self.read_tlv(tag::OBJECT_IDENTIFIER)?;
        if content.is_empty() {
            return Err(DerError::new(DerErrorKind::InvalidLength, pos));
        }
        let mut arcs = Vec::new();
        let first = content[0];
        arcs.push((first / 40) as u64);
        arcs.push((first % 40) as u64);
        let mut value: u64 = 0;
        let mut started = false;
        for &b in &content[1..] {
            if !started && b == 0x80 {
                return Err(DerError::new(DerErrorKind::NonCanonical, pos));
            }
            started = true;
            value = value
                .checked_shl(7)
                .ok_or_else(|| DerError::new(DerErrorKind::Overflow, pos))?
                | (b & 0x7f) as u64;
            if b & 0x80 == 0 {
                arcs.push(value);
                value = 0;
                started = false;
            }
        }
        if started {
            return Err(DerError::new(DerErrorKind::Truncated, pos));
        }
        Ok(arcs)
    }

    /// Reads a `UTF8String`.
    pub fn read_utf8_string(&mut self) -> R<String> {
        let pos = self.pos;
        let content = self.read_tlv(tag::UTF8_STRING)?;
        String::from_utf8(content.to_vec()).map_err(|_| DerError::new(DerErrorKind::NonCanonical, pos))
    }

    /// Reads an `IA5String` (7-bit ASCII only).
    pub fn read_ia5_string(&mut self) -> R<String> {
        let pos = self.pos;
        let content = self.read_tlv(tag::IA5_STRING)?;
        if !content.is_ascii() {
            return Err(DerError::new(DerErrorKind::NonCanonical, pos));
        }
        Ok(String::from_utf8_lossy(content).into_owned())
    }

    /// Reads a `PrintableString` (RFC 5280 Appendix B character set).
    pub fn read_printable_string(&mut self) -> R<String> {
        let pos = self.pos;
        let content = self.read_tlv(tag::PRINTABLE_STRING)?;
        for &b in content {
            let c = b as char;
            let ok = c.is_ascii_alphanumeric() || " '()+,-./:=?".contains(c);
            if !ok {
                return Err(DerError::new(DerErrorKind::NonCanonical, pos));
            }
        }
        Ok(String::from_utf8_lossy(content).into_owned())
    }

    /// Reads a `UTCTime` (`YYMMDDHHMMSSZ`, RFC 5280 §4.1.2.5.1).
    pub fn read_utc_time(&mut self) -> R<DateTime<Utc>> {
        let pos = self.pos;
        let content = self.read_tlv(tag::UTC_TIME)?;
        parse_utc_time(content).ok_or_else(|| DerError::new(DerErrorKind::NonCanonical, pos))
    }

    /// Reads a `GeneralizedTime` (`YYYYMMDDHHMMSSZ`, RFC 5280 §4.1.2.5.2).
    pub fn read_generalized_time(&mut self) -> R<DateTime<Utc>> {
        let pos = self.pos;
        let content = self.read_tlv(tag::GENERALIZED_TIME)?;
        parse_generalized_time(content).ok_or_else(|| DerError::new(DerErrorKind::NonCanonical, pos))
    }

    /// Reads the RFC 5280 `Time` CHOICE (whichever of `UTCTime` /
    /// `GeneralizedTime` is present).
    pub fn read_time(&mut self) -> R<DateTime<Utc>> {
        match self.peek_tag()? {
            t if t == tag::UTC_TIME => self.read_utc_time(),
            t if t == tag::GENERALIZED_TIME => self.read_generalized_time(),
            _ => Err(self.err(DerErrorKind::UnexpectedTag)),
        }
    }

    /// Reads a `SET OF`, decoding each element with `f` and checking that
    /// elements appear in canonical (sorted-by-DER-encoding) order.
    pub fn read_set_of_raw<T>(
        &mut self,
        mut f: impl FnMut(&mut Reader<'a>) -> R<T>,
    ) -> R<Vec<T>> {
        let pos = self.pos;
        let content = self.read_tlv(tag::SET)?;
        let mut cursor = Reader::new(content);
        let mut spans: Vec<&[u8]> = Vec::new();
        while !cursor.is_empty() {
            let start = cursor.pos;
            cursor.skip_value()?;
            spans.push(&content[start..cursor.pos]);
        }
        for pair in spans.windows(2) {
            if pair[0] > pair[1] {
                return Err(DerError::new(DerErrorKind::NonCanonical, pos));
            }
        }
        spans
            .into_iter()
            .map(|span| {
                let mut r = Reader::new(span);
                let v = f(&mut r)?;
                r.finish()?;
                Ok(v)
            })
            .collect()
    }
}

fn parse_utc_time(content: &[u8]) -> Option<DateTime<Utc>> {
    let s = std::str::from_utf8(content).ok()?;
    if s.len() != 13 || !s.ends_with('Z') {
        return None;
    }
    let digits = &s[..12];
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let yy: i32 = digits[0..2].parse().ok()?;
    let year = if yy < 50 { 2000 + yy } else { 1900 + yy };
    let month: u32 = digits[2..4].parse().ok()?;
    let day: u32 = digits[4..6].parse().ok()?;
    let hour: u32 = digits[6..8].parse().ok()?;
    let minute: u32 = digits[8..10].parse().ok()?;
    let second: u32 = digits[10..12].parse().ok()?;
    build_utc(year, month, day, hour, minute, second)
}

fn parse_generalized_time(content: &[u8]) -> Option<DateTime<Utc>> {
    let s = std::str::from_utf8(content).ok()?;
    if s.len() != 15 || !s.ends_with('Z') {
        return None;
    }
    let digits = &s[..14];
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = digits[0..4].parse().ok()?;
    let month: u32 = digits[4..6].parse().ok()?;
    let day: u32 = digits[6..8].parse().ok()?;
    let hour: u32 = digits[8..10].parse().ok()?;
    let minute: u32 = digits[10..12].parse().ok()?;
    let second: u32 = digits[12..14].parse().ok()?;
    build_utc(year, month, day, hour, minute, second)
}

fn build_utc(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Option<DateTime<Utc>> {
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = date.and_hms_opt(hour, minute, second)?;
    Some(DateTime::from_naive_utc_and_offset(time, Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utc_time_pivots_on_y2k() {
        let dt49 = parse_utc_time(b"491231235959Z").unwrap();
        assert_eq!(dt49.format("%Y").to_string(), "2049");
        let dt50 = parse_utc_time(b"500101000000Z").unwrap();
        assert_eq!(dt50.format("%Y").to_string(), "1950");
    }
}
