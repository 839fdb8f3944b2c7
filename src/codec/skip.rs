//! Пропуск значения по тегу без знания его статического типа.
//!
//! Потребляет ровно те байты, которые прочитало бы полное декодирование
//! значения с этим тегом. Это основа совместимости между версиями схем:
//! читатель игнорирует поля, о которых не знает.

use std::io::Read;

use msglib_error::MsgResult;

use super::Decoder;
use crate::{config::CodecConfig, protocol::{Protocol, TypeTag}};

/// Пропускает одно значение с тегом `tag` в рамках текущего декодирования.
pub(crate) fn skip<R, P>(
    dec: &mut Decoder<'_, R, P>,
    tag: TypeTag,
) -> MsgResult<()>
where
    R: Read + ?Sized,
    P: Protocol,
{
    match tag {
        TypeTag::Null => {}
        TypeTag::Bool => {
            dec.read_bool()?;
        }
        TypeTag::Byte => {
            dec.read_byte()?;
        }
        TypeTag::Int16 => {
            dec.read_i16()?;
        }
        TypeTag::Int32 => {
            dec.read_i32()?;
        }
        TypeTag::Int64 => {
            dec.read_i64()?;
        }
        TypeTag::Float32 => {
            dec.read_f32()?;
        }
        TypeTag::Float64 => {
            dec.read_f64()?;
        }
        TypeTag::Binary | TypeTag::String => {
            dec.read_binary()?;
        }
        TypeTag::Struct => dec.nested(|dec| {
            dec.read_struct_begin()?;
            loop {
                let marker = dec.read_field_begin()?;
                if marker.is_stop() {
                    break;
                }
                skip(dec, marker.tag)?;
            }
            dec.read_struct_end()
        })?,
        TypeTag::Map => {
            let marker = dec.read_map_begin()?;
            let count = dec.check_count(marker.count, 2, "map")?;
            dec.nested(|dec| {
                for _ in 0..count {
                    skip(dec, marker.key_tag)?;
                    skip(dec, marker.value_tag)?;
                }
                Ok(())
            })?;
        }
        TypeTag::List => {
            let marker = dec.read_list_begin()?;
            let count = dec.check_count(marker.count, 1, "list")?;
            skip_elements(dec, marker.elem_tag, count)?;
        }
        TypeTag::Set => {
            let marker = dec.read_set_begin()?;
            let count = dec.check_count(marker.count, 1, "set")?;
            skip_elements(dec, marker.elem_tag, count)?;
        }
    }
    Ok(())
}

fn skip_elements<R, P>(
    dec: &mut Decoder<'_, R, P>,
    elem_tag: TypeTag,
    count: usize,
) -> MsgResult<()>
where
    R: Read + ?Sized,
    P: Protocol,
{
    dec.nested(|dec| {
        for _ in 0..count {
            skip(dec, elem_tag)?;
        }
        Ok(())
    })
}

/// Пропускает одно значение с тегом `tag` из потока.
///
/// Используется, когда вызывающий сам разбирает поток маркер за маркером.
/// Лимиты берутся из [`CodecConfig::default`].
///
/// ```
/// use msglib::{codec::skip_value, protocol::{BinaryProtocol, TypeTag}};
///
/// // list<i32>[1, 2], затем ещё один байт
/// let data = [0x25u8, 0x02, 0x04, 0xFF];
/// let mut input = &data[..];
/// skip_value(&mut input, &mut BinaryProtocol::new(), TypeTag::List).unwrap();
/// assert_eq!(input, &[0xFF]);
/// ```
pub fn skip_value<R, P>(
    reader: &mut R,
    proto: &mut P,
    tag: TypeTag,
) -> MsgResult<()>
where
    R: Read + ?Sized,
    P: Protocol,
{
    let mut dec = Decoder::new(reader, proto, CodecConfig::default());
    skip(&mut dec, tag)
}

#[cfg(test)]
mod tests {
    use msglib_error::{CodecError, StatusCode};

    use super::*;
    use crate::protocol::BinaryProtocol;

    fn skip_all(
        data: &[u8],
        tag: TypeTag,
    ) -> MsgResult<usize> {
        let mut input = data;
        skip_value(&mut input, &mut BinaryProtocol::new(), tag)?;
        Ok(data.len() - input.len())
    }

    /// Тест проверяет, что пропуск скаляров потребляет ровно их байты.
    #[test]
    fn test_skip_scalars() {
        assert_eq!(skip_all(&[0x01, 0xAA], TypeTag::Bool).unwrap(), 1);
        assert_eq!(skip_all(&[0xAC, 0x02, 0xAA], TypeTag::Int64).unwrap(), 2);
        assert_eq!(skip_all(&[0u8; 5], TypeTag::Float32).unwrap(), 4);
        assert_eq!(skip_all(&[0u8; 9], TypeTag::Float64).unwrap(), 8);
        assert_eq!(skip_all(&[0x02, b'h', b'i', 0xAA], TypeTag::String).unwrap(), 3);
        assert_eq!(skip_all(&[0xAA], TypeTag::Null).unwrap(), 0);
    }

    /// Тест проверяет пропуск вложенной структуры с контейнерами.
    #[test]
    fn test_skip_nested_struct() {
        let data = [
            0x15, 0x02, // id 1, Int32 = 1
            0x2B, // id 2, Struct
            0x1A, 0x01, b'x', // id 1, String "x"
            0x01, // stop (inner)
            0x3C, 0x01, 0x5A, 0x01, b'k', 0x04, // id 3, map<string,i32>{"k": 2}
            0x01, // stop
            0xEE,
        ];
        assert_eq!(skip_all(&data, TypeTag::Struct).unwrap(), data.len() - 1);
    }

    #[test]
    fn test_skip_set_and_map() {
        let set = [0x2A, 0x01, b'a', 0x01, b'b'];
        assert_eq!(skip_all(&set, TypeTag::Set).unwrap(), set.len());

        let empty_map = [0x00, 0x5A];
        assert_eq!(skip_all(&empty_map, TypeTag::Map).unwrap(), 2);
    }

    #[test]
    fn test_skip_truncated() {
        let err = skip_all(&[0x35, 0x02], TypeTag::List).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UnexpectedEof);
    }

    /// Тест проверяет лимит глубины на глубоко вложенных списках.
    #[test]
    fn test_skip_depth_limit() {
        // list<list<...>> с одним элементом на каждом уровне
        let data = vec![0x1D; 100];
        let err = skip_all(&data, TypeTag::List).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CodecError>(),
            Some(CodecError::DepthLimit { max: 64, .. })
        ));
    }
}
