//! Протокол: побайтовые примитивы кодирования.
//!
//! ## Архитектура
//!
//! [`Protocol`] описывает набор парных операций чтения/записи для каждого
//! тега и каждого маркера. Протокол ничего не знает о записях: он работает
//! поверх абстрактного приёмника ([`std::io::Write`]) или источника
//! ([`std::io::Read`]) байтов.
//!
//! Единственная реализация — [`BinaryProtocol`]:
//!
//! ```
//! use msglib::protocol::{BinaryProtocol, Protocol};
//!
//! let mut proto = BinaryProtocol::new();
//! let mut buf = Vec::new();
//! proto.write_i32(&mut buf, -2).unwrap();
//! assert_eq!(buf, vec![0x03]);
//!
//! let mut input = buf.as_slice();
//! assert_eq!(proto.read_i32(&mut input).unwrap(), -2);
//! ```
//!
//! ## Модули
//!
//! - [`tags`] — словарь типовых тегов
//! - [`varint`] — varint и zig-zag
//! - [`markers`] — маркеры полей и контейнеров
//! - [`binary`] — бинарная реализация протокола

pub mod binary;
pub mod markers;
pub mod tags;
pub mod varint;

use std::io::{Read, Write};

pub use binary::BinaryProtocol;
pub use markers::{FieldMarker, ListMarker, MapMarker, SetMarker, StructMarker};
use msglib_error::MsgResult;
pub use tags::TypeTag;

/// Набор примитивов чтения/записи.
///
/// Экземпляр протокола владеет scratch-буферами, поэтому один экземпляр
/// нельзя использовать из нескольких одновременных вызовов; повторное
/// использование в пределах одного потока допустимо и экономит аллокации.
pub trait Protocol {
    fn read_struct_begin<R: Read + ?Sized>(
        &mut self,
        r: &mut R,
    ) -> MsgResult<StructMarker>;

    fn read_struct_end<R: Read + ?Sized>(
        &mut self,
        _r: &mut R,
    ) -> MsgResult<()> {
        Ok(())
    }

    fn read_field_begin<R: Read + ?Sized>(
        &mut self,
        r: &mut R,
    ) -> MsgResult<FieldMarker>;

    fn read_map_begin<R: Read + ?Sized>(
        &mut self,
        r: &mut R,
    ) -> MsgResult<MapMarker>;

    fn read_list_begin<R: Read + ?Sized>(
        &mut self,
        r: &mut R,
    ) -> MsgResult<ListMarker>;

    /// Множество разделяет формат заголовка со списком.
    fn read_set_begin<R: Read + ?Sized>(
        &mut self,
        r: &mut R,
    ) -> MsgResult<SetMarker> {
        self.read_list_begin(r).map(SetMarker::from)
    }

    fn read_bool<R: Read + ?Sized>(
        &mut self,
        r: &mut R,
    ) -> MsgResult<bool>;

    fn read_byte<R: Read + ?Sized>(
        &mut self,
        r: &mut R,
    ) -> MsgResult<u8>;

    fn read_i16<R: Read + ?Sized>(
        &mut self,
        r: &mut R,
    ) -> MsgResult<i16>;

    fn read_i32<R: Read + ?Sized>(
        &mut self,
        r: &mut R,
    ) -> MsgResult<i32>;

    fn read_i64<R: Read + ?Sized>(
        &mut self,
        r: &mut R,
    ) -> MsgResult<i64>;

    fn read_f32<R: Read + ?Sized>(
        &mut self,
        r: &mut R,
    ) -> MsgResult<f32>;

    fn read_f64<R: Read + ?Sized>(
        &mut self,
        r: &mut R,
    ) -> MsgResult<f64>;

    fn read_binary<R: Read + ?Sized>(
        &mut self,
        r: &mut R,
    ) -> MsgResult<Vec<u8>>;

    fn read_string<R: Read + ?Sized>(
        &mut self,
        r: &mut R,
    ) -> MsgResult<String>;

    fn write_struct_begin<W: Write + ?Sized>(
        &mut self,
        w: &mut W,
        marker: &StructMarker,
    ) -> MsgResult<()>;

    fn write_struct_end<W: Write + ?Sized>(
        &mut self,
        _w: &mut W,
    ) -> MsgResult<()> {
        Ok(())
    }

    fn write_field_begin<W: Write + ?Sized>(
        &mut self,
        w: &mut W,
        marker: &FieldMarker,
    ) -> MsgResult<()>;

    /// Конец списка полей — маркер поля с id = 0 и тегом `Null`.
    fn write_field_stop<W: Write + ?Sized>(
        &mut self,
        w: &mut W,
    ) -> MsgResult<()> {
        self.write_field_begin(w, &FieldMarker::STOP)
    }

    fn write_map_begin<W: Write + ?Sized>(
        &mut self,
        w: &mut W,
        marker: &MapMarker,
    ) -> MsgResult<()>;

    fn write_list_begin<W: Write + ?Sized>(
        &mut self,
        w: &mut W,
        marker: &ListMarker,
    ) -> MsgResult<()>;

    fn write_set_begin<W: Write + ?Sized>(
        &mut self,
        w: &mut W,
        marker: &SetMarker,
    ) -> MsgResult<()> {
        self.write_list_begin(w, &ListMarker::from(*marker))
    }

    fn write_bool<W: Write + ?Sized>(
        &mut self,
        w: &mut W,
        value: bool,
    ) -> MsgResult<()>;

    fn write_byte<W: Write + ?Sized>(
        &mut self,
        w: &mut W,
        value: u8,
    ) -> MsgResult<()>;

    fn write_i16<W: Write + ?Sized>(
        &mut self,
        w: &mut W,
        value: i16,
    ) -> MsgResult<()>;

    fn write_i32<W: Write + ?Sized>(
        &mut self,
        w: &mut W,
        value: i32,
    ) -> MsgResult<()>;

    fn write_i64<W: Write + ?Sized>(
        &mut self,
        w: &mut W,
        value: i64,
    ) -> MsgResult<()>;

    fn write_f32<W: Write + ?Sized>(
        &mut self,
        w: &mut W,
        value: f32,
    ) -> MsgResult<()>;

    fn write_f64<W: Write + ?Sized>(
        &mut self,
        w: &mut W,
        value: f64,
    ) -> MsgResult<()>;

    fn write_binary<W: Write + ?Sized>(
        &mut self,
        w: &mut W,
        value: &[u8],
    ) -> MsgResult<()>;

    /// Строка — это `Binary` над UTF-8 представлением текста.
    fn write_string<W: Write + ?Sized>(
        &mut self,
        w: &mut W,
        value: &str,
    ) -> MsgResult<()> {
        self.write_binary(w, value.as_bytes())
    }
}
