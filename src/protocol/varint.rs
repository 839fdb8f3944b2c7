//! Variable-length integer encoding (LEB128-style).
//!
//! Каждый байт несёт 7 бит данных, старший бит означает продолжение,
//! младшие группы идут первыми:
//! - 0-127: 1 байт
//! - 128-16383: 2 байта
//! - до u64::MAX: 10 байт максимум
//!
//! Знаковые числа предварительно проходят zig-zag преобразование, поэтому
//! маленькие отрицательные значения занимают столько же байт, сколько
//! маленькие положительные.

use std::io::{Read, Write};

use byteorder::ReadBytesExt;
use msglib_error::{CodecError, MsgResult, ResultExt};

/// Максимальное кол-во байт для u64 в varint encoding.
pub const MAX_VARINT_LEN: usize = 10;

/// Zig-zag: 0 → 0, -1 → 1, 1 → 2, -2 → 3, ...
#[inline]
pub const fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Обратное zig-zag преобразование.
#[inline]
pub const fn zigzag_decode(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

/// Кодирует `value` в `buf` и возвращает кол-во занятых байт.
///
/// Буфер фиксированного размера позволяет протоколу собирать varint в
/// своём scratch-буфере и отдавать его приёмнику одним `write_all`.
pub fn put_uvarint(
    buf: &mut [u8; MAX_VARINT_LEN],
    mut value: u64,
) -> usize {
    let mut i = 0;
    while value >= 0x80 {
        buf[i] = (value as u8) | 0x80;
        value >>= 7;
        i += 1;
    }
    buf[i] = value as u8;
    i + 1
}

/// Кодирует знаковое значение (zig-zag) в `buf`.
pub fn put_varint(
    buf: &mut [u8; MAX_VARINT_LEN],
    value: i64,
) -> usize {
    put_uvarint(buf, zigzag_encode(value))
}

/// Записывает u64 в varint формате.
///
/// # Examples
/// ```
/// use msglib::protocol::varint::write_uvarint;
///
/// let mut buf = Vec::new();
/// write_uvarint(&mut buf, 127).unwrap();
/// assert_eq!(buf, vec![0x7F]);
///
/// let mut buf = Vec::new();
/// write_uvarint(&mut buf, 128).unwrap();
/// assert_eq!(buf, vec![0x80, 0x01]);
/// ```
pub fn write_uvarint<W: Write + ?Sized>(
    w: &mut W,
    value: u64,
) -> MsgResult<usize> {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let n = put_uvarint(&mut buf, value);
    w.write_all(&buf[..n])
        .context("Failed to write varint")?;
    Ok(n)
}

/// Записывает i64 в zig-zag varint формате.
pub fn write_varint<W: Write + ?Sized>(
    w: &mut W,
    value: i64,
) -> MsgResult<usize> {
    write_uvarint(w, zigzag_encode(value))
}

/// Читает u64 из varint формата.
///
/// # Errors
/// - `UnexpectedEof`, если поток кончился посреди числа
/// - [`CodecError::VarintOverflow`], если число не помещается в 64 бита
///
/// # Examples
/// ```
/// use msglib::protocol::varint::read_uvarint;
///
/// let mut data: &[u8] = &[0xAC, 0x02];
/// assert_eq!(read_uvarint(&mut data).unwrap(), 300);
/// ```
pub fn read_uvarint<R: Read + ?Sized>(r: &mut R) -> MsgResult<u64> {
    let mut result: u64 = 0;
    let mut shift = 0;

    for i in 0..MAX_VARINT_LEN {
        let byte = r.read_u8().context("Failed to read varint byte")?;

        if byte < 0x80 {
            // NOTE: десятый байт может нести только один значащий бит
            if i == MAX_VARINT_LEN - 1 && byte > 1 {
                return Err(CodecError::VarintOverflow.into());
            }
            return Ok(result | (u64::from(byte) << shift));
        }

        result |= u64::from(byte & 0x7F) << shift;
        shift += 7;
    }

    Err(CodecError::VarintOverflow.into())
}

/// Читает i64 из zig-zag varint формата.
pub fn read_varint<R: Read + ?Sized>(r: &mut R) -> MsgResult<i64> {
    read_uvarint(r).map(zigzag_decode)
}

/// Вычисляет размер varint для числа (без записи).
pub fn uvarint_size(mut value: u64) -> usize {
    let mut size = 1;
    while value >= 0x80 {
        value >>= 7;
        size += 1;
    }
    size
}
