//! Binary persistence for a [`ReferenceGraph`].
//!
//! The stream is written in two passes so a cyclic graph never needs forward
//! references:
//!
//! ```text
//! Stream    := DocumentCount:u32 Document[DocumentCount] EdgeBlock[DocumentCount]
//! Document  := Subsystem:u8 Revision:u8 Name:CString Path:CString
//!              UnfoundCitation:CString* 0x00
//! EdgeBlock := EdgeCount:u32 TargetIndex:u32[EdgeCount]
//! ```
//!
//! Integers are little-endian. Strings are UTF-8 with NUL written as the
//! two-byte sequence `C0 80`, each terminated by a single `0x00`. Edge
//! targets are positions in the first pass. Citation text on edges and
//! parsed citations are not stored, so they come back empty.

use std::io::{self, BufReader, BufWriter, Read, Write};

use crate::document::Document;
use crate::error::Error;
use crate::graph::ReferenceGraph;
use crate::types::{DocIndex, DocumentId, Subsystem};

/// Largest capacity reserved up front from a count read off the wire.
const MAX_PREALLOCATION: usize = 1024;

/// Encode `graph` into a new buffer.
///
/// # Errors
///
/// Same as [`encode`].
pub fn to_bytes(graph: &ReferenceGraph) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();
    encode(graph, &mut bytes)?;
    return Ok(bytes);
}

/// Decode a graph from an in-memory buffer.
///
/// # Errors
///
/// Same as [`decode`].
pub fn from_bytes(bytes: &[u8]) -> Result<ReferenceGraph, Error> {
    return decode(bytes);
}

/// Write `graph` to `writer` in the two-pass layout.
///
/// # Errors
///
/// Returns `Error::CorruptStream` if the graph holds a dangling edge,
/// `Error::Unencodable` if a path is not valid Unicode or a count does not
/// fit in 32 bits, and `Error::Io` if the writer fails.
pub fn encode<W: Write>(graph: &ReferenceGraph, writer: W) -> Result<(), Error> {
    graph.validate()?;
    let mut out = BufWriter::new(writer);

    write_u32(&mut out, count_to_u32(graph.size(), "document count")?)?;
    for (_, doc) in graph.iter() {
        write_document(&mut out, doc)?;
    }
    for (_, doc) in graph.iter() {
        write_edge_block(&mut out, doc)?;
    }

    out.flush()?;
    return Ok(());
}

/// Read a graph written by [`encode`].
///
/// Either the whole stream decodes or nothing is returned.
///
/// # Errors
///
/// Returns `Error::CorruptStream` if the stream is truncated, has bytes after
/// the last edge block, holds an unknown subsystem, invalid text, or an edge
/// index outside the document list. Other read failures are `Error::Io`.
pub fn decode<R: Read>(reader: R) -> Result<ReferenceGraph, Error> {
    let mut input = StreamReader { inner: BufReader::new(reader), offset: 0 };

    let count = usize::try_from(input.read_u32("document count")?).map_err(|_err| return Error::CorruptStream {
        reason: "document count exceeds platform usize".to_string(),
    })?;

    // Pass 1: documents, in order. Position in this list is the edge index.
    let mut docs = Vec::with_capacity(count.min(MAX_PREALLOCATION));
    for i in 0..count {
        docs.push(input.read_document(i)?);
    }

    // Pass 2: one edge block per document, resolved against pass 1.
    let ids: Vec<DocumentId> = docs.iter().map(|d| return d.id().clone()).collect();
    for (i, doc) in docs.iter_mut().enumerate() {
        input.read_edge_block(i, doc, &ids)?;
    }

    input.expect_end()?;

    let mut graph = ReferenceGraph::default();
    for doc in docs {
        graph.add_document(doc);
    }
    return Ok(graph);
}

// ── Writing ──────────────────────────────────────────────────────────

/// Pass-1 record: identity, path, unfound citations, terminator.
///
/// # Errors
///
/// Returns `Error::Unencodable` for a non-Unicode path, or `Error::Io`.
fn write_document<W: Write>(out: &mut W, doc: &Document) -> Result<(), Error> {
    let id = doc.id();
    out.write_all(&[id.subsystem.ordinal(), id.revision])?;
    write_cstring(out, &id.name)?;

    let path = doc.path().to_str().ok_or_else(|| return Error::Unencodable {
        reason: format!("path is not valid Unicode: {}", doc.path().display()),
    })?;
    write_cstring(out, path)?;

    // An empty string would read back as the terminator.
    for citation in doc.unfound_citations().iter().filter(|c| return !c.is_empty()) {
        write_cstring(out, citation)?;
    }
    out.write_all(&[0])?;
    return Ok(());
}

/// Pass-2 record: edge count and target positions.
///
/// # Errors
///
/// Returns `Error::Unencodable` if a count or index exceeds 32 bits, or `Error::Io`.
fn write_edge_block<W: Write>(out: &mut W, doc: &Document) -> Result<(), Error> {
    write_u32(out, count_to_u32(doc.references().len(), "edge count")?)?;
    for edge in doc.references() {
        write_u32(out, count_to_u32(edge.target.0, "edge target index")?)?;
    }
    return Ok(());
}

/// Write text with NUL escaped as `C0 80`, then the `0x00` terminator.
fn write_cstring<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    for (i, part) in text.split('\0').enumerate() {
        if i > 0 {
            out.write_all(&[0xC0, 0x80])?;
        }
        out.write_all(part.as_bytes())?;
    }
    return out.write_all(&[0]);
}

/// Little-endian u32.
fn write_u32<W: Write>(out: &mut W, value: u32) -> io::Result<()> {
    return out.write_all(&value.to_le_bytes());
}

/// Narrow a count or index to the 32-bit wire width.
///
/// # Errors
///
/// Returns `Error::Unencodable` naming `what` if it does not fit.
fn count_to_u32(value: usize, what: &str) -> Result<u32, Error> {
    return u32::try_from(value).map_err(|_err| return Error::Unencodable {
        reason: format!("{what} {value} exceeds u32"),
    });
}

// ── Reading ──────────────────────────────────────────────────────────

/// Byte source that tracks its position for error messages and turns a
/// premature end of stream into `Error::CorruptStream`.
struct StreamReader<R> {
    /// Underlying buffered reader.
    inner: BufReader<R>,
    /// Bytes consumed so far.
    offset: u64,
}

impl<R: Read> StreamReader<R> {
    /// Fail unless the stream is exhausted.
    ///
    /// # Errors
    ///
    /// Returns `Error::CorruptStream` if any byte remains.
    fn expect_end(&mut self) -> Result<(), Error> {
        let mut probe = [0_u8; 1];
        let read = loop {
            match self.inner.read(&mut probe) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {},
                other => break other?,
            }
        };
        if read > 0 {
            return Err(self.corrupt("trailing bytes after the last edge block"));
        }
        return Ok(());
    }

    /// Build a `CorruptStream` error pinned to the current offset.
    fn corrupt(&self, what: &str) -> Error {
        return Error::CorruptStream { reason: format!("{what} at byte {}", self.offset) };
    }

    /// Read one byte.
    ///
    /// # Errors
    ///
    /// Returns `Error::CorruptStream` on end of stream, `Error::Io` otherwise.
    fn read_byte(&mut self, field: &str) -> Result<u8, Error> {
        let mut buf = [0_u8; 1];
        self.read_exact(&mut buf, field)?;
        let [byte] = buf;
        return Ok(byte);
    }

    /// Read a NUL-terminated string, undoing the `C0 80` escape.
    ///
    /// # Errors
    ///
    /// Returns `Error::CorruptStream` on end of stream or invalid text.
    fn read_cstring(&mut self, field: &str) -> Result<String, Error> {
        let start = self.offset;
        let mut bytes = Vec::new();
        loop {
            match self.read_byte(field)? {
                0 => break,
                0xC0 => match self.read_byte(field)? {
                    0x80 => bytes.push(0),
                    0 => {
                        // A lone lead byte; left in place so UTF-8 validation rejects it.
                        bytes.push(0xC0);
                        break;
                    },
                    next => bytes.extend_from_slice(&[0xC0, next]),
                },
                b => bytes.push(b),
            }
        }
        return String::from_utf8(bytes).map_err(|e| return Error::CorruptStream {
            reason: format!("{field} starting at byte {start} is not valid UTF-8: {e}"),
        });
    }

    /// Read one pass-1 document record.
    ///
    /// # Errors
    ///
    /// Returns `Error::CorruptStream` for an unknown subsystem or truncated record.
    fn read_document(&mut self, index: usize) -> Result<Document, Error> {
        let ordinal = self.read_byte("subsystem")?;
        let subsystem = Subsystem::from_ordinal(ordinal)
            .ok_or_else(|| return self.corrupt(&format!("document {index} has unknown subsystem {ordinal}")))?;
        let revision = self.read_byte("revision")?;
        let name = self.read_cstring("document name")?;
        let path = self.read_cstring("document path")?;

        let mut doc = Document::from_parts(DocumentId::new(subsystem, revision, name), path.into());
        loop {
            let citation = self.read_cstring("unfound citation")?;
            if citation.is_empty() {
                break;
            }
            doc.mark_unfound(&citation);
        }
        return Ok(doc);
    }

    /// Read one pass-2 edge block into `doc`, resolving indices against `ids`.
    ///
    /// # Errors
    ///
    /// Returns `Error::CorruptStream` for an index outside `ids`, a repeated
    /// target, or a truncated block.
    fn read_edge_block(&mut self, source: usize, doc: &mut Document, ids: &[DocumentId]) -> Result<(), Error> {
        let count = self.read_u32("edge count")?;
        for _ in 0..count {
            let raw = self.read_u32("edge target index")?;
            let target = usize::try_from(raw).map_err(|_err| return self.corrupt("edge index exceeds platform usize"))?;
            let Some(target_id) = ids.get(target) else {
                return Err(self.corrupt(&format!(
                    "document {source} has edge to index {target} but only {} documents exist",
                    ids.len()
                )));
            };
            if !doc.add_resolved_reference(DocIndex(target), target_id.clone(), "") {
                return Err(self.corrupt(&format!("document {source} repeats edge to index {target}")));
            }
        }
        return Ok(());
    }

    /// Fill `buf` completely.
    ///
    /// # Errors
    ///
    /// Returns `Error::CorruptStream` naming `field` if the stream ends first.
    fn read_exact(&mut self, buf: &mut [u8], field: &str) -> Result<(), Error> {
        match self.inner.read_exact(buf) {
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(self.corrupt(&format!("stream ended while reading {field}")));
            },
            Err(e) => return Err(Error::Io(e)),
            Ok(()) => {},
        }
        self.offset = self.offset.saturating_add(u64::try_from(buf.len()).unwrap_or(u64::MAX));
        return Ok(());
    }

    /// Read a little-endian u32.
    ///
    /// # Errors
    ///
    /// Returns `Error::CorruptStream` on end of stream.
    fn read_u32(&mut self, field: &str) -> Result<u32, Error> {
        let mut buf = [0_u8; 4];
        self.read_exact(&mut buf, field)?;
        return Ok(u32::from_le_bytes(buf));
    }
}
