//! Бинарная реализация [`Protocol`].
//!
//! Формат (бит-в-бит совпадает с реализациями на других языках):
//! - Int16/Int32/Int64: zig-zag varint;
//! - счётчики, id, теги: беззнаковый varint;
//! - Float32/Float64: 4/8 байт IEEE-754, little-endian;
//! - Bool: 1 байт, `0x01` = true, любое другое значение = false;
//! - Byte: 1 байт;
//! - Binary/String: varint длина + байты.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use msglib_error::{bail, ensure, CodecError, MsgResult, ResultExt};
use tracing::warn;

use super::{
    tags::TAG_MASK,
    varint::{put_uvarint, put_varint, read_uvarint, read_varint, MAX_VARINT_LEN},
    FieldMarker, ListMarker, MapMarker, Protocol, StructMarker, TypeTag,
};
use crate::config::CodecConfig;

/// Начальный размер буфера для коротких строк.
const READ_BUFFER_SIZE: usize = 32;

/// Бинарный протокол со scratch-буферами.
///
/// `write_buf` собирает varint перед записью, `read_buf` переиспользуется
/// при чтении строк и растёт по мере необходимости.
#[derive(Debug, Clone)]
pub struct BinaryProtocol {
    write_buf: [u8; MAX_VARINT_LEN],
    read_buf: Vec<u8>,
    max_binary_len: u64,
}

impl Default for BinaryProtocol {
    fn default() -> Self {
        Self::new()
    }
}

impl BinaryProtocol {
    pub fn new() -> Self {
        Self::with_config(&CodecConfig::default())
    }

    /// Протокол с лимитами из конфигурации.
    pub fn with_config(config: &CodecConfig) -> Self {
        Self {
            write_buf: [0u8; MAX_VARINT_LEN],
            read_buf: Vec::with_capacity(READ_BUFFER_SIZE),
            max_binary_len: config.max_binary_len,
        }
    }

    fn write_uvarint<W: Write + ?Sized>(
        &mut self,
        w: &mut W,
        value: u64,
    ) -> MsgResult<()> {
        let n = put_uvarint(&mut self.write_buf, value);
        w.write_all(&self.write_buf[..n])?;
        Ok(())
    }

    fn write_varint<W: Write + ?Sized>(
        &mut self,
        w: &mut W,
        value: i64,
    ) -> MsgResult<()> {
        let n = put_varint(&mut self.write_buf, value);
        w.write_all(&self.write_buf[..n])?;
        Ok(())
    }

    /// Читает префикс длины и проверяет его.
    ///
    /// Длина, которая при знаковой интерпретации отрицательна, — ошибка
    /// входа, а не повод для аллокации.
    fn read_length<R: Read + ?Sized>(
        &mut self,
        r: &mut R,
        what: &'static str,
    ) -> MsgResult<u64> {
        let raw = read_uvarint(r).with_context(|| format!("Failed to read {what} length"))?;
        let signed = raw as i64;
        ensure!(signed >= 0, CodecError::NegativeLength { length: signed });
        if raw > self.max_binary_len {
            warn!(what, size = raw, limit = self.max_binary_len, "length prefix rejected");
            bail!(CodecError::SizeLimit {
                what,
                size: raw,
                limit: self.max_binary_len,
            });
        }
        Ok(raw)
    }

    /// Читает ровно `len` байт в `buf`, не доверяя `len` при аллокации.
    fn read_exact_into<R: Read + ?Sized>(
        r: &mut R,
        len: u64,
        buf: &mut Vec<u8>,
    ) -> MsgResult<()> {
        let got = Read::take(&mut *r, len).read_to_end(buf)?;
        if (got as u64) < len {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("expected {len} bytes, got {got}"),
            )
            .into());
        }
        Ok(())
    }

    fn read_tag(
        code: u8,
        marker: &'static str,
    ) -> MsgResult<TypeTag> {
        TypeTag::from_code(code).with_context(|| format!("Failed to decode {marker} marker"))
    }

    /// Элементы с тегом `Null` не занимают байт, поэтому непустой контейнер
    /// с таким тегом не может быть корректным.
    fn check_elem_tag(
        tag: TypeTag,
        count: u64,
        marker: &'static str,
    ) -> MsgResult<()> {
        if tag == TypeTag::Null && count > 0 {
            return Err(CodecError::InvalidMarker {
                marker,
                reason: format!("{count} elements declared with Null element type"),
            }
            .into());
        }
        Ok(())
    }
}

impl Protocol for BinaryProtocol {
    fn read_struct_begin<R: Read + ?Sized>(
        &mut self,
        _r: &mut R,
    ) -> MsgResult<StructMarker> {
        Ok(StructMarker::default())
    }

    fn read_field_begin<R: Read + ?Sized>(
        &mut self,
        r: &mut R,
    ) -> MsgResult<FieldMarker> {
        let packed = read_uvarint(r).context("Failed to read field marker")?;
        let tag = Self::read_tag((packed & u64::from(TAG_MASK)) as u8, "field")?;
        let id = u32::try_from(packed >> 4).map_err(|_| CodecError::InvalidMarker {
            marker: "field",
            reason: format!("field id {} does not fit in 32 bits", packed >> 4),
        })?;
        Ok(FieldMarker::new("", tag, id))
    }

    fn read_map_begin<R: Read + ?Sized>(
        &mut self,
        r: &mut R,
    ) -> MsgResult<MapMarker> {
        let count = read_uvarint(r).context("Failed to read map count")?;
        let packed = self.read_byte(r).context("Failed to read map types")?;
        let key_tag = Self::read_tag(packed & TAG_MASK, "map")?;
        let value_tag = Self::read_tag(packed >> 4, "map")?;
        Self::check_elem_tag(key_tag, count, "map")?;
        Self::check_elem_tag(value_tag, count, "map")?;
        Ok(MapMarker {
            key_tag,
            value_tag,
            count,
        })
    }

    fn read_list_begin<R: Read + ?Sized>(
        &mut self,
        r: &mut R,
    ) -> MsgResult<ListMarker> {
        let packed = read_uvarint(r).context("Failed to read list marker")?;
        let elem_tag = Self::read_tag((packed & u64::from(TAG_MASK)) as u8, "list")?;
        let count = packed >> 4;
        Self::check_elem_tag(elem_tag, count, "list")?;
        Ok(ListMarker { elem_tag, count })
    }

    fn read_bool<R: Read + ?Sized>(
        &mut self,
        r: &mut R,
    ) -> MsgResult<bool> {
        Ok(self.read_byte(r)? == 1)
    }

    fn read_byte<R: Read + ?Sized>(
        &mut self,
        r: &mut R,
    ) -> MsgResult<u8> {
        Ok(r.read_u8()?)
    }

    fn read_i16<R: Read + ?Sized>(
        &mut self,
        r: &mut R,
    ) -> MsgResult<i16> {
        Ok(read_varint(r)? as i16)
    }

    fn read_i32<R: Read + ?Sized>(
        &mut self,
        r: &mut R,
    ) -> MsgResult<i32> {
        Ok(read_varint(r)? as i32)
    }

    fn read_i64<R: Read + ?Sized>(
        &mut self,
        r: &mut R,
    ) -> MsgResult<i64> {
        read_varint(r)
    }

    fn read_f32<R: Read + ?Sized>(
        &mut self,
        r: &mut R,
    ) -> MsgResult<f32> {
        Ok(r.read_f32::<LittleEndian>()?)
    }

    fn read_f64<R: Read + ?Sized>(
        &mut self,
        r: &mut R,
    ) -> MsgResult<f64> {
        Ok(r.read_f64::<LittleEndian>()?)
    }

    fn read_binary<R: Read + ?Sized>(
        &mut self,
        r: &mut R,
    ) -> MsgResult<Vec<u8>> {
        let len = self.read_length(r, "binary")?;
        let mut buf = Vec::new();
        if len > 0 {
            Self::read_exact_into(r, len, &mut buf).context("Failed to read binary")?;
        }
        Ok(buf)
    }

    fn read_string<R: Read + ?Sized>(
        &mut self,
        r: &mut R,
    ) -> MsgResult<String> {
        let len = self.read_length(r, "string")?;
        if len == 0 {
            return Ok(String::new());
        }
        self.read_buf.clear();
        Self::read_exact_into(r, len, &mut self.read_buf).context("Failed to read string")?;
        Ok(std::str::from_utf8(&self.read_buf)?.to_owned())
    }

    fn write_struct_begin<W: Write + ?Sized>(
        &mut self,
        _w: &mut W,
        _marker: &StructMarker,
    ) -> MsgResult<()> {
        Ok(())
    }

    fn write_field_begin<W: Write + ?Sized>(
        &mut self,
        w: &mut W,
        marker: &FieldMarker,
    ) -> MsgResult<()> {
        self.write_uvarint(w, marker.packed())
    }

    fn write_map_begin<W: Write + ?Sized>(
        &mut self,
        w: &mut W,
        marker: &MapMarker,
    ) -> MsgResult<()> {
        self.write_uvarint(w, marker.count)?;
        self.write_byte(w, marker.packed_tags())
    }

    fn write_list_begin<W: Write + ?Sized>(
        &mut self,
        w: &mut W,
        marker: &ListMarker,
    ) -> MsgResult<()> {
        if marker.count >> 60 != 0 {
            return Err(CodecError::SizeLimit {
                what: "list",
                size: marker.count,
                limit: (1 << 60) - 1,
            }
            .into());
        }
        self.write_uvarint(w, marker.packed())
    }

    fn write_bool<W: Write + ?Sized>(
        &mut self,
        w: &mut W,
        value: bool,
    ) -> MsgResult<()> {
        self.write_byte(w, u8::from(value))
    }

    fn write_byte<W: Write + ?Sized>(
        &mut self,
        w: &mut W,
        value: u8,
    ) -> MsgResult<()> {
        Ok(w.write_u8(value)?)
    }

    fn write_i16<W: Write + ?Sized>(
        &mut self,
        w: &mut W,
        value: i16,
    ) -> MsgResult<()> {
        self.write_varint(w, i64::from(value))
    }

    fn write_i32<W: Write + ?Sized>(
        &mut self,
        w: &mut W,
        value: i32,
    ) -> MsgResult<()> {
        self.write_varint(w, i64::from(value))
    }

    fn write_i64<W: Write + ?Sized>(
        &mut self,
        w: &mut W,
        value: i64,
    ) -> MsgResult<()> {
        self.write_varint(w, value)
    }

    fn write_f32<W: Write + ?Sized>(
        &mut self,
        w: &mut W,
        value: f32,
    ) -> MsgResult<()> {
        Ok(w.write_f32::<LittleEndian>(value)?)
    }

    fn write_f64<W: Write + ?Sized>(
        &mut self,
        w: &mut W,
        value: f64,
    ) -> MsgResult<()> {
        Ok(w.write_f64::<LittleEndian>(value)?)
    }

    fn write_binary<W: Write + ?Sized>(
        &mut self,
        w: &mut W,
        value: &[u8],
    ) -> MsgResult<()> {
        self.write_uvarint(w, value.len() as u64)?;
        w.write_all(value)?;
        Ok(())
    }
}
