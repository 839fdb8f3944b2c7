//! Кодек записей поверх [`Protocol`](crate::protocol::Protocol).
//!
//! ## Архитектура
//!
//! - [`value`] — трейт [`Wire`]: тег, пустое значение и чтение/запись
//!   одного значения для каждой поддерживаемой формы
//! - [`encode`] — [`Encoder`] и запись тела структуры
//! - [`decode`] — [`Decoder`] с лимитами и чтение тела структуры
//! - [`skip`] — пропуск значения по тегу
//!
//! Точки входа: [`serialize`]/[`deserialize`] для буферов в памяти и
//! [`encode_struct`]/[`decode_struct`] для произвольных потоков.
//!
//! ```
//! use msglib::record;
//!
//! record! {
//!     #[derive(Debug, Default, PartialEq)]
//!     pub struct Command {
//!         pub command: i32 => 1,
//!         pub data: Vec<u8> => 2,
//!     }
//! }
//!
//! let cmd = Command { command: 1, data: b"hello".to_vec() };
//! let bytes = msglib::serialize(&cmd).unwrap();
//! assert_eq!(bytes, [0x15, 0x02, 0x29, 0x05, b'h', b'e', b'l', b'l', b'o', 0x01]);
//! assert_eq!(msglib::deserialize::<Command>(&bytes).unwrap(), cmd);
//! ```

pub mod decode;
pub mod encode;
pub mod skip;
pub mod value;

use std::io::{Read, Write};

pub use decode::Decoder;
pub use encode::Encoder;
use msglib_error::MsgResult;
pub use skip::skip_value;
pub use value::Wire;

use crate::{
    config::CodecConfig,
    protocol::{BinaryProtocol, Protocol},
    schema::Record,
};

/// Кодирует запись в новый буфер.
pub fn serialize<T: Record>(value: &T) -> MsgResult<Vec<u8>> {
    serialize_with_config(value, &CodecConfig::default())
}

pub fn serialize_with_config<T: Record>(
    value: &T,
    config: &CodecConfig,
) -> MsgResult<Vec<u8>> {
    let mut buf = Vec::new();
    let mut proto = BinaryProtocol::with_config(config);
    encode_struct(&mut buf, &mut proto, value)?;
    Ok(buf)
}

/// Декодирует запись из буфера.
///
/// Длина буфера известна, поэтому заявленные счётчики контейнеров
/// дополнительно сверяются с оставшимися байтами.
pub fn deserialize<T: Record>(bytes: &[u8]) -> MsgResult<T> {
    deserialize_with_config(bytes, &CodecConfig::default())
}

pub fn deserialize_with_config<T: Record>(
    bytes: &[u8],
    config: &CodecConfig,
) -> MsgResult<T> {
    let mut input = bytes;
    let mut proto = BinaryProtocol::with_config(config);
    let mut dec =
        Decoder::new(&mut input, &mut proto, config.clone()).with_input_len(bytes.len() as u64);
    decode::read_record(&mut dec)
}

/// Кодирует запись в поток.
///
/// При ошибке в приёмнике может остаться частично записанное значение;
/// такой префикс не является корректным сообщением.
pub fn encode_struct<T, W, P>(
    writer: &mut W,
    proto: &mut P,
    value: &T,
) -> MsgResult<()>
where
    T: Record,
    W: Write + ?Sized,
    P: Protocol,
{
    let mut enc = Encoder::new(writer, proto);
    encode::write_record(&mut enc, value)
}

/// Декодирует одну запись из потока.
pub fn decode_struct<T, R, P>(
    reader: &mut R,
    proto: &mut P,
) -> MsgResult<T>
where
    T: Record,
    R: Read + ?Sized,
    P: Protocol,
{
    decode_struct_with_config(reader, proto, &CodecConfig::default())
}

pub fn decode_struct_with_config<T, R, P>(
    reader: &mut R,
    proto: &mut P,
    config: &CodecConfig,
) -> MsgResult<T>
where
    T: Record,
    R: Read + ?Sized,
    P: Protocol,
{
    let mut dec = Decoder::new(reader, proto, config.clone());
    decode::read_record(&mut dec)
}
