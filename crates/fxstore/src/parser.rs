//! Record log format parser using nom
//!
//! File format:
//! ```text
//! FXKV001\n
//! [version: u32]
//! [record_count: u32]
//! ...records...
//! ```
//!
//! Record format (all integers little-endian):
//! ```text
//! [tag: u8][key_len: u32][key: utf-8]
//!   tag 0 (remove): no payload
//!   tag 1 (int):    [i64]
//!   tag 2 (bool):   [u8: 0 | 1]
//!   tag 3 (string): [len: u32][utf-8]
//!   tag 4 (data):   [len: u32][bytes]
//! ```

use nom::{
    bytes::complete::tag,
    combinator::{map, map_res},
    error::{Error as NomError, ErrorKind},
    multi::length_data,
    number::complete::{le_i64, le_u32, le_u8},
    sequence::tuple,
    IResult,
};

use crate::value::RawValue;

/// Magic header for record log files
pub const FXKV_MAGIC: &[u8] = b"FXKV001\n";

/// Current on-disk format version
pub const FXKV_VERSION: u32 = 1;

/// Header length in bytes
pub const HEADER_LEN: usize = FXKV_MAGIC.len() + 8;

const TAG_REMOVE: u8 = 0;
const TAG_INT: u8 = 1;
const TAG_BOOL: u8 = 2;
const TAG_STRING: u8 = 3;
const TAG_DATA: u8 = 4;

type Res<'a, T> = IResult<&'a [u8], T>;

/// Record log file header
#[derive(Debug, Clone, PartialEq)]
pub struct LogHeader {
    /// File format version
    pub version: u32,
    /// Number of records as of the last clean close
    pub record_count: u32,
}

/// One mutation in the log
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// Key was set to a value
    Set {
        /// Entry key
        key: String,
        /// New value
        value: RawValue,
    },
    /// Key was removed
    Remove {
        /// Entry key
        key: String,
    },
}

/// Parse the record log header
pub fn parse_header(input: &[u8]) -> Res<'_, LogHeader> {
    map(
        tuple((tag(FXKV_MAGIC), le_u32, le_u32)),
        |(_, version, record_count)| LogHeader {
            version,
            record_count,
        },
    )(input)
}

/// Create a record log header
pub fn create_header(version: u32, record_count: u32) -> Vec<u8> {
    let mut header = Vec::with_capacity(HEADER_LEN);
    header.extend_from_slice(FXKV_MAGIC);
    header.extend_from_slice(&version.to_le_bytes());
    header.extend_from_slice(&record_count.to_le_bytes());
    header
}

fn utf8(input: &[u8]) -> Res<'_, String> {
    map_res(length_data(le_u32), |bytes: &[u8]| {
        String::from_utf8(bytes.to_vec())
    })(input)
}

fn bytes(input: &[u8]) -> Res<'_, Vec<u8>> {
    map(length_data(le_u32), |bytes: &[u8]| bytes.to_vec())(input)
}

fn flag(input: &[u8]) -> Res<'_, bool> {
    map_res(le_u8, |b| match b {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(ErrorKind::Verify),
    })(input)
}

fn record_tag(input: &[u8]) -> Res<'_, u8> {
    le_u8(input)
}

fn payload(kind: u8, input: &[u8]) -> Res<'_, RawValue> {
    match kind {
        TAG_INT => map(le_i64, RawValue::Int)(input),
        TAG_BOOL => map(flag, RawValue::Bool)(input),
        TAG_STRING => map(utf8, RawValue::String)(input),
        TAG_DATA => map(bytes, RawValue::Data)(input),
        _ => Err(nom::Err::Error(NomError::new(input, ErrorKind::Tag))),
    }
}

/// Parse a single record
pub fn parse_record(input: &[u8]) -> Res<'_, Record> {
    let (input, kind) = record_tag(input)?;
    let (input, key) = utf8(input)?;
    if kind == TAG_REMOVE {
        return Ok((input, Record::Remove { key }));
    }
    let (input, value) = payload(kind, input)?;
    Ok((input, Record::Set { key, value }))
}

/// Whether a record failed only because the input ended before the
/// lengths it declares
pub fn is_truncated(err: &nom::Err<NomError<&[u8]>>) -> bool {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => e.code == ErrorKind::Eof,
        nom::Err::Incomplete(_) => true,
    }
}

fn put_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(bytes);
}

/// Serialize a record for appending to the log
pub fn encode_record(record: &Record) -> Vec<u8> {
    let mut out = Vec::new();
    match record {
        Record::Remove { key } => {
            out.push(TAG_REMOVE);
            put_bytes(&mut out, key.as_bytes());
        }
        Record::Set { key, value } => {
            out.push(match value {
                RawValue::Int(_) => TAG_INT,
                RawValue::Bool(_) => TAG_BOOL,
                RawValue::String(_) => TAG_STRING,
                RawValue::Data(_) => TAG_DATA,
            });
            put_bytes(&mut out, key.as_bytes());
            match value {
                RawValue::Int(i) => out.extend_from_slice(&i.to_le_bytes()),
                RawValue::Bool(b) => out.push(u8::from(*b)),
                RawValue::String(s) => put_bytes(&mut out, s.as_bytes()),
                RawValue::Data(d) => put_bytes(&mut out, d),
            }
        }
    }
    out
}
