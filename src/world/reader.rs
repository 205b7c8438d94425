//! Binary chunk format.
//!
//! A chunk buffer is a 24-byte header followed by the block id array and up to
//! three nibble arrays. Every multi-byte field, including the 16-bit words the
//! nibbles are packed into, is written in the producer's byte order; the
//! header's byte-order mark tells the reader which one that was.

use crate::utils::error::CorruptChunkError;
use crate::world::block::BlockId;
use crate::world::chunk::{
    Chunk, ChunkFlags, CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_VOLUME, CHUNK_WIDTH, MAX_LIGHT,
};
use crate::world::chunk_coord::ChunkCoord;

pub const MAGIC: [u8; 4] = *b"ICHK";
pub const BYTE_ORDER_MARK: u16 = 0x0102;
pub const FORMAT_VERSION: u16 = 1;
pub const HEADER_LEN: usize = 24;

const ID_BYTES: usize = CHUNK_VOLUME * 2;
const NIBBLE_BYTES: usize = CHUNK_VOLUME / 2;
const NIBBLES_PER_WORD: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    Big,
    Little,
}

impl ByteOrder {
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            Self::Big
        } else {
            Self::Little
        }
    }

    /// Identifies the producer's order from the mark's two raw bytes.
    fn detect(raw: [u8; 2]) -> Result<Self, CorruptChunkError> {
        if u16::from_be_bytes(raw) == BYTE_ORDER_MARK {
            Ok(Self::Big)
        } else if u16::from_le_bytes(raw) == BYTE_ORDER_MARK {
            Ok(Self::Little)
        } else {
            Err(CorruptChunkError::BadByteOrderMark(u16::from_be_bytes(raw)))
        }
    }

    #[inline]
    fn read_u16(self, bytes: &[u8]) -> u16 {
        let raw = [bytes[0], bytes[1]];
        match self {
            Self::Big => u16::from_be_bytes(raw),
            Self::Little => u16::from_le_bytes(raw),
        }
    }

    #[inline]
    fn read_i32(self, bytes: &[u8]) -> i32 {
        let raw = [bytes[0], bytes[1], bytes[2], bytes[3]];
        match self {
            Self::Big => i32::from_be_bytes(raw),
            Self::Little => i32::from_le_bytes(raw),
        }
    }

    #[inline]
    fn write_u16(self, out: &mut Vec<u8>, value: u16) {
        match self {
            Self::Big => out.extend_from_slice(&value.to_be_bytes()),
            Self::Little => out.extend_from_slice(&value.to_le_bytes()),
        }
    }

    fn write_i32(self, out: &mut Vec<u8>, value: i32) {
        match self {
            Self::Big => out.extend_from_slice(&value.to_be_bytes()),
            Self::Little => out.extend_from_slice(&value.to_le_bytes()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub order: ByteOrder,
    pub version: u16,
    pub dimensions: (u16, u16, u16),
    pub flags: ChunkFlags,
    pub position: ChunkCoord,
}

impl ChunkHeader {
    pub fn parse(buf: &[u8]) -> Result<Self, CorruptChunkError> {
        if buf.len() < HEADER_LEN {
            return Err(CorruptChunkError::TooShort {
                len: buf.len(),
                needed: HEADER_LEN,
            });
        }

        let magic = [buf[0], buf[1], buf[2], buf[3]];
        if magic != MAGIC {
            return Err(CorruptChunkError::BadMagic(magic));
        }

        let order = ByteOrder::detect([buf[4], buf[5]])?;
        let version = order.read_u16(&buf[6..]);
        if version != FORMAT_VERSION {
            return Err(CorruptChunkError::UnsupportedVersion(version));
        }

        let dimensions = (
            order.read_u16(&buf[8..]),
            order.read_u16(&buf[10..]),
            order.read_u16(&buf[12..]),
        );
        let expected = engine_dimensions();
        if dimensions != expected {
            return Err(CorruptChunkError::DimensionMismatch {
                found: dimensions,
                expected,
            });
        }

        let raw_flags = order.read_u16(&buf[14..]);
        let flags =
            ChunkFlags::from_bits(raw_flags).ok_or(CorruptChunkError::UnknownFlags(raw_flags))?;

        let position = ChunkCoord::new(order.read_i32(&buf[16..]), order.read_i32(&buf[20..]));

        Ok(Self {
            order,
            version,
            dimensions,
            flags,
            position,
        })
    }

    /// Total buffer length this header promises.
    pub fn expected_len(&self) -> usize {
        expected_len(self.flags)
    }
}

pub fn engine_dimensions() -> (u16, u16, u16) {
    (CHUNK_WIDTH as u16, CHUNK_DEPTH as u16, CHUNK_HEIGHT as u16)
}

pub fn expected_len(flags: ChunkFlags) -> usize {
    let nibble_arrays = if flags.contains(ChunkFlags::HAS_LIGHT) { 3 } else { 1 };
    HEADER_LEN + ID_BYTES + nibble_arrays * NIBBLE_BYTES
}

/// Decodes one chunk buffer. The result is identical whichever byte order
/// produced the buffer.
pub fn decode_chunk(buf: &[u8]) -> Result<Chunk, CorruptChunkError> {
    let header = ChunkHeader::parse(buf)?;
    let expected = header.expected_len();
    if buf.len() != expected {
        return Err(CorruptChunkError::LengthMismatch {
            expected,
            actual: buf.len(),
        });
    }

    let order = header.order;
    let body = &buf[HEADER_LEN..];
    let (id_bytes, rest) = body.split_at(ID_BYTES);
    let ids = id_bytes
        .chunks_exact(2)
        .map(|pair| BlockId(order.read_u16(pair)))
        .collect::<Vec<_>>();

    let (variant_bytes, rest) = rest.split_at(NIBBLE_BYTES);
    let variants = unpack_nibbles(variant_bytes, order);

    let (sky_light, block_light) = if header.flags.contains(ChunkFlags::HAS_LIGHT) {
        let (sky_bytes, block_bytes) = rest.split_at(NIBBLE_BYTES);
        (
            unpack_nibbles(sky_bytes, order),
            unpack_nibbles(block_bytes, order),
        )
    } else {
        (vec![MAX_LIGHT; CHUNK_VOLUME], vec![0; CHUNK_VOLUME])
    };

    Ok(Chunk::from_parts(
        header.position,
        header.flags,
        ids,
        variants,
        sky_light,
        block_light,
    ))
}

/// Serializes a chunk in the given byte order.
pub fn encode_chunk(chunk: &Chunk, order: ByteOrder) -> Vec<u8> {
    let mut out = Vec::with_capacity(expected_len(chunk.flags));
    out.extend_from_slice(&MAGIC);
    order.write_u16(&mut out, BYTE_ORDER_MARK);
    order.write_u16(&mut out, FORMAT_VERSION);
    let (width, depth, height) = engine_dimensions();
    order.write_u16(&mut out, width);
    order.write_u16(&mut out, depth);
    order.write_u16(&mut out, height);
    order.write_u16(&mut out, chunk.flags.bits());
    order.write_i32(&mut out, chunk.position.x());
    order.write_i32(&mut out, chunk.position.z());

    let (ids, variants, sky_light, block_light) = chunk.raw_parts();
    for id in ids {
        order.write_u16(&mut out, id.0);
    }
    pack_nibbles(&mut out, variants, order);
    if chunk.has_light() {
        pack_nibbles(&mut out, sky_light, order);
        pack_nibbles(&mut out, block_light, order);
    }
    out
}

fn unpack_nibbles(bytes: &[u8], order: ByteOrder) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() * 2);
    for pair in bytes.chunks_exact(2) {
        let word = order.read_u16(pair);
        for slot in 0..NIBBLES_PER_WORD {
            out.push(((word >> (slot * 4)) & 0x0F) as u8);
        }
    }
    out
}

fn pack_nibbles(out: &mut Vec<u8>, values: &[u8], order: ByteOrder) {
    for group in values.chunks_exact(NIBBLES_PER_WORD) {
        let word = group
            .iter()
            .enumerate()
            .fold(0u16, |word, (slot, &value)| {
                word | (((value & 0x0F) as u16) << (slot * 4))
            });
        order.write_u16(out, word);
    }
}
