//! WOFF and WOFF2 unwrapping.
//!
//! Web fonts are rebuilt into a plain sfnt so the regular table parser can
//! read them. WOFF2 tables stored with a transform (`glyf`, `loca` and
//! sometimes `hmtx`) are dropped: metadata never needs them, and `name`,
//! `OS/2` and `post` are always stored untransformed.

use std::borrow::Cow;
use std::io::Read;

use brotli::Decompressor;
use flate2::read::ZlibDecoder;
use thiserror::Error;

const COLLECTION_FLAVOR: u32 = u32::from_be_bytes(*b"ttcf");
const WOFF_HEADER_LEN: usize = 44;
const WOFF2_HEADER_LEN: usize = 48;

/// Tags addressed by index in a WOFF2 table directory.
const WOFF2_KNOWN_TAGS: [[u8; 4]; 63] = [
    *b"cmap", *b"head", *b"hhea", *b"hmtx", *b"maxp", *b"name", *b"OS/2", *b"post",
    *b"cvt ", *b"fpgm", *b"glyf", *b"loca", *b"prep", *b"CFF ", *b"VORG", *b"EBDT",
    *b"EBLC", *b"gasp", *b"hdmx", *b"kern", *b"LTSH", *b"PCLT", *b"VDMX", *b"vhea",
    *b"vmtx", *b"BASE", *b"GDEF", *b"GPOS", *b"GSUB", *b"EBSC", *b"JSTF", *b"MATH",
    *b"CBDT", *b"CBLC", *b"COLR", *b"CPAL", *b"SVG ", *b"sbix", *b"acnt", *b"avar",
    *b"bdat", *b"bloc", *b"bsln", *b"cvar", *b"fdsc", *b"feat", *b"fmtx", *b"fvar",
    *b"gvar", *b"hsty", *b"just", *b"lcar", *b"mort", *b"morx", *b"opbd", *b"prop",
    *b"trak", *b"Zapf", *b"Silf", *b"Glat", *b"Gloc", *b"Feat", *b"Sill",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContainerError {
    #[error("{0} data ends early")]
    Truncated(&'static str),
    #[error("malformed {format} table directory: {message}")]
    Malformed {
        format: &'static str,
        message: String,
    },
    #[error("decompressing {format} data: {message}")]
    Decompress {
        format: &'static str,
        message: String,
    },
    #[error("WOFF2 collections are not supported")]
    Collection,
}

/// One sfnt table, decompressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub tag: [u8; 4],
    pub data: Vec<u8>,
}

/// Plain sfnt bytes for `data`: borrowed when it is not a web font.
pub fn unwrap_web_font(data: &[u8]) -> Result<Cow<'_, [u8]>, ContainerError> {
    match data.get(..4) {
        Some(b"wOFF") => {
            let (flavor, tables) = woff_tables(data)?;
            Ok(Cow::Owned(assemble_sfnt(flavor, tables)))
        }
        Some(b"wOF2") => {
            let (flavor, tables) = woff2_tables(data)?;
            Ok(Cow::Owned(assemble_sfnt(flavor, tables)))
        }
        _ => Ok(Cow::Borrowed(data)),
    }
}

/// Tables of a WOFF 1.0 file; each is zlib-compressed unless storing it
/// compressed would not have saved space.
pub fn woff_tables(data: &[u8]) -> Result<(u32, Vec<Table>), ContainerError> {
    const FORMAT: &str = "WOFF";

    let mut header = Cursor::new(data, FORMAT);
    header.skip(4)?;
    let flavor = header.u32()?;
    header.skip(4)?;
    let num_tables = header.u16()?;
    if data.len() < WOFF_HEADER_LEN {
        return Err(ContainerError::Truncated(FORMAT));
    }

    let mut dir = Cursor::at(data, WOFF_HEADER_LEN, FORMAT);
    let mut tables = Vec::with_capacity(num_tables as usize);
    for _ in 0..num_tables {
        let tag = dir.tag()?;
        let offset = dir.u32()? as usize;
        let comp_length = dir.u32()? as usize;
        let orig_length = dir.u32()? as usize;
        dir.skip(4)?;

        let stored = offset
            .checked_add(comp_length)
            .and_then(|end| data.get(offset..end))
            .ok_or(ContainerError::Truncated(FORMAT))?;

        let table = if comp_length == orig_length {
            stored.to_vec()
        } else if comp_length < orig_length {
            let mut out = Vec::with_capacity(orig_length);
            ZlibDecoder::new(stored)
                .read_to_end(&mut out)
                .map_err(|err| ContainerError::Decompress {
                    format: FORMAT,
                    message: err.to_string(),
                })?;
            if out.len() != orig_length {
                return Err(malformed(FORMAT, format!("{} inflates to the wrong size", tag_str(&tag))));
            }
            out
        } else {
            return Err(malformed(
                FORMAT,
                format!("{} is larger compressed than uncompressed", tag_str(&tag)),
            ));
        };

        tables.push(Table { tag, data: table });
    }

    Ok((flavor, tables))
}

struct Woff2Entry {
    tag: [u8; 4],
    stream_length: usize,
    transformed: bool,
}

/// Untransformed tables of a WOFF2 file.
pub fn woff2_tables(data: &[u8]) -> Result<(u32, Vec<Table>), ContainerError> {
    const FORMAT: &str = "WOFF2";

    let mut header = Cursor::new(data, FORMAT);
    header.skip(4)?;
    let flavor = header.u32()?;
    header.skip(4)?;
    let num_tables = header.u16()?;
    header.skip(6)?;
    let total_compressed = header.u32()? as usize;
    if data.len() < WOFF2_HEADER_LEN {
        return Err(ContainerError::Truncated(FORMAT));
    }
    if flavor == COLLECTION_FLAVOR {
        return Err(ContainerError::Collection);
    }

    let mut dir = Cursor::at(data, WOFF2_HEADER_LEN, FORMAT);
    let mut entries = Vec::with_capacity(num_tables as usize);
    for _ in 0..num_tables {
        let flags = dir.u8()?;
        let tag = match flags & 0x3f {
            0x3f => dir.tag()?,
            index => WOFF2_KNOWN_TAGS[index as usize],
        };
        let version = flags >> 6;
        // glyf and loca use version 3 for "no transform"; every other table uses 0
        let transformed = if &tag == b"glyf" || &tag == b"loca" {
            version != 3
        } else {
            version != 0
        };

        let orig_length = dir.base128()? as usize;
        let stream_length = if transformed {
            dir.base128()? as usize
        } else {
            orig_length
        };
        entries.push(Woff2Entry {
            tag,
            stream_length,
            transformed,
        });
    }

    let start = dir.pos;
    let compressed = start
        .checked_add(total_compressed)
        .and_then(|end| data.get(start..end))
        .ok_or(ContainerError::Truncated(FORMAT))?;

    let mut stream = Vec::new();
    Decompressor::new(compressed, 4096)
        .read_to_end(&mut stream)
        .map_err(|err| ContainerError::Decompress {
            format: FORMAT,
            message: err.to_string(),
        })?;

    let mut offset = 0usize;
    let mut tables = Vec::new();
    for entry in entries {
        let end = offset
            .checked_add(entry.stream_length)
            .filter(|end| *end <= stream.len())
            .ok_or(ContainerError::Truncated(FORMAT))?;
        if !entry.transformed {
            tables.push(Table {
                tag: entry.tag,
                data: stream[offset..end].to_vec(),
            });
        }
        offset = end;
    }

    Ok((flavor, tables))
}

/// Lay tables out as an sfnt: sorted directory, 4-byte aligned bodies.
/// Checksums are left at zero; nothing downstream verifies them.
pub fn assemble_sfnt(flavor: u32, mut tables: Vec<Table>) -> Vec<u8> {
    tables.sort_by(|a, b| a.tag.cmp(&b.tag));

    let num_tables = tables.len() as u16;
    let entry_selector = if num_tables == 0 {
        0
    } else {
        15 - num_tables.leading_zeros() as u16
    };
    let search_range = (1u16 << entry_selector) * 16;
    let range_shift = num_tables * 16 - search_range.min(num_tables * 16);

    let mut out = Vec::new();
    out.extend_from_slice(&flavor.to_be_bytes());
    for field in [num_tables, search_range, entry_selector, range_shift] {
        out.extend_from_slice(&field.to_be_bytes());
    }

    let dir_end = 12 + 16 * tables.len();
    let mut body = Vec::new();
    for table in &tables {
        let offset = dir_end + body.len();
        out.extend_from_slice(&table.tag);
        out.extend_from_slice(&0u32.to_be_bytes());
        out.extend_from_slice(&(offset as u32).to_be_bytes());
        out.extend_from_slice(&(table.data.len() as u32).to_be_bytes());
        body.extend_from_slice(&table.data);
        while body.len() % 4 != 0 {
            body.push(0);
        }
    }
    out.extend_from_slice(&body);
    out
}

fn malformed(format: &'static str, message: String) -> ContainerError {
    ContainerError::Malformed { format, message }
}

fn tag_str(tag: &[u8; 4]) -> Cow<'_, str> {
    String::from_utf8_lossy(tag)
}

/// Big-endian reader over a byte slice.
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
    format: &'static str,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8], format: &'static str) -> Self {
        Self::at(data, 0, format)
    }

    fn at(data: &'a [u8], pos: usize, format: &'static str) -> Self {
        Self { data, pos, format }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ContainerError> {
        let end = self.pos.checked_add(n).ok_or(ContainerError::Truncated(self.format))?;
        let bytes = self
            .data
            .get(self.pos..end)
            .ok_or(ContainerError::Truncated(self.format))?;
        self.pos = end;
        Ok(bytes)
    }

    fn skip(&mut self, n: usize) -> Result<(), ContainerError> {
        self.take(n).map(|_| ())
    }

    fn u8(&mut self) -> Result<u8, ContainerError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, ContainerError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, ContainerError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn tag(&mut self) -> Result<[u8; 4], ContainerError> {
        let b = self.take(4)?;
        Ok([b[0], b[1], b[2], b[3]])
    }

    /// WOFF2 `UIntBase128`: at most five bytes, no leading zero byte.
    fn base128(&mut self) -> Result<u32, ContainerError> {
        let mut value: u32 = 0;
        for i in 0..5 {
            let byte = self.u8()?;
            if i == 0 && byte == 0x80 {
                return Err(malformed(self.format, "UIntBase128 with leading zeros".into()));
            }
            if value & 0xFE00_0000 != 0 {
                return Err(malformed(self.format, "UIntBase128 overflows u32".into()));
            }
            value = (value << 7) | u32::from(byte & 0x7f);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(malformed(self.format, "UIntBase128 longer than five bytes".into()))
    }
}
