//! Отображение Rust-типов на теги протокола.
//!
//! | Тип | Тег |
//! |---|---|
//! | `bool` | Bool |
//! | `u8`, `i8` | Byte |
//! | `u16`, `i16` | Int16 |
//! | `u32`, `i32` | Int32 |
//! | `u64`, `i64` | Int64 |
//! | `f32` / `f64` | Float32 / Float64 |
//! | `String` | String |
//! | `Vec<u8>`, `Bytes` | Binary |
//! | `Vec<T>` | List |
//! | `HashMap<K, ()>`, `BTreeMap<K, ()>`, `HashSet<K>`, `BTreeSet<K>` | Set |
//! | `HashMap<K, V>`, `BTreeMap<K, V>` | Map |
//! | запись | Struct |
//! | `Option<T>`, `Box<T>` | тег `T` |
//!
//! Беззнаковые целые побитово переинтерпретируются в знаковую ширину
//! провода. Типы вне таблицы `Wire` не реализуют.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet},
    hash::{BuildHasher, Hash},
    io::{Read, Write},
};

use bytes::Bytes;
use msglib_error::{CodecError, MsgResult};

use super::{decode::expect_elem_tag, Decoder, Encoder};
use crate::protocol::{ListMarker, MapMarker, Protocol, SetMarker, TypeTag};

/// Значение, у которого есть форма на проводе.
pub trait Wire: Sized + Default {
    /// Тег, выведенный из статической формы типа.
    const TAG: TypeTag;

    /// Тип нулевого размера: словарь с такими значениями — множество.
    const ZERO_SIZED: bool = false;

    /// Сырой байт: последовательность таких элементов передаётся как Binary.
    const RAW_BYTE: bool = false;

    /// Нулевое/пустое значение; такие поля записи не передаются.
    fn is_empty_value(&self) -> bool;

    /// Записывает значение. `tag` — тег на проводе; для контейнеров он может
    /// отличаться от [`Wire::TAG`] (поле помечено `set`).
    fn encode<W: Write + ?Sized, P: Protocol>(
        &self,
        enc: &mut Encoder<'_, W, P>,
        tag: TypeTag,
    ) -> MsgResult<()>;

    fn decode<R: Read + ?Sized, P: Protocol>(
        dec: &mut Decoder<'_, R, P>,
        tag: TypeTag,
    ) -> MsgResult<Self>;

    fn as_byte(&self) -> Option<u8> {
        None
    }

    fn from_byte(_byte: u8) -> Option<Self> {
        None
    }

    /// Для значений словаря-множества: `Some(false)` исключает ключ.
    fn as_bool(&self) -> Option<bool> {
        None
    }

    /// Значение, которое получает ключ декодированного словаря-множества.
    fn membership() -> Self {
        Self::default()
    }
}

fn unexpected_tag<T>(
    type_name: &str,
    tag: TypeTag,
) -> MsgResult<T> {
    Err(CodecError::UnsupportedValue {
        type_name: type_name.to_string(),
        message: format!("cannot be represented as {tag}"),
    }
    .into())
}

////////////////////////////////////////////////////////////////////////////////
// Скаляры
////////////////////////////////////////////////////////////////////////////////

impl Wire for bool {
    const TAG: TypeTag = TypeTag::Bool;

    fn is_empty_value(&self) -> bool {
        !*self
    }

    fn encode<W: Write + ?Sized, P: Protocol>(
        &self,
        enc: &mut Encoder<'_, W, P>,
        _tag: TypeTag,
    ) -> MsgResult<()> {
        enc.write_bool(*self)
    }

    fn decode<R: Read + ?Sized, P: Protocol>(
        dec: &mut Decoder<'_, R, P>,
        _tag: TypeTag,
    ) -> MsgResult<Self> {
        dec.read_bool()
    }

    fn as_bool(&self) -> Option<bool> {
        Some(*self)
    }

    fn membership() -> Self {
        true
    }
}

impl Wire for u8 {
    const TAG: TypeTag = TypeTag::Byte;
    const RAW_BYTE: bool = true;

    fn is_empty_value(&self) -> bool {
        *self == 0
    }

    fn encode<W: Write + ?Sized, P: Protocol>(
        &self,
        enc: &mut Encoder<'_, W, P>,
        _tag: TypeTag,
    ) -> MsgResult<()> {
        enc.write_byte(*self)
    }

    fn decode<R: Read + ?Sized, P: Protocol>(
        dec: &mut Decoder<'_, R, P>,
        _tag: TypeTag,
    ) -> MsgResult<Self> {
        dec.read_byte()
    }

    fn as_byte(&self) -> Option<u8> {
        Some(*self)
    }

    fn from_byte(byte: u8) -> Option<Self> {
        Some(byte)
    }
}

impl Wire for i8 {
    const TAG: TypeTag = TypeTag::Byte;

    fn is_empty_value(&self) -> bool {
        *self == 0
    }

    fn encode<W: Write + ?Sized, P: Protocol>(
        &self,
        enc: &mut Encoder<'_, W, P>,
        _tag: TypeTag,
    ) -> MsgResult<()> {
        enc.write_byte(*self as u8)
    }

    fn decode<R: Read + ?Sized, P: Protocol>(
        dec: &mut Decoder<'_, R, P>,
        _tag: TypeTag,
    ) -> MsgResult<Self> {
        Ok(dec.read_byte()? as i8)
    }
}

/// Целые шириной 16/32/64 бита: zig-zag varint, беззнаковые через
/// переинтерпретацию в знаковый тип той же ширины.
macro_rules! impl_wire_int {
    ($($ty:ty => $tag:ident, $wire:ty, $write:ident, $read:ident;)*) => {
        $(
            impl Wire for $ty {
                const TAG: TypeTag = TypeTag::$tag;

                fn is_empty_value(&self) -> bool {
                    *self == 0
                }

                #[allow(clippy::unnecessary_cast)]
                fn encode<W: Write + ?Sized, P: Protocol>(
                    &self,
                    enc: &mut Encoder<'_, W, P>,
                    _tag: TypeTag,
                ) -> MsgResult<()> {
                    enc.$write(*self as $wire)
                }

                #[allow(clippy::unnecessary_cast)]
                fn decode<R: Read + ?Sized, P: Protocol>(
                    dec: &mut Decoder<'_, R, P>,
                    _tag: TypeTag,
                ) -> MsgResult<Self> {
                    Ok(dec.$read()? as $ty)
                }
            }
        )*
    };
}

impl_wire_int! {
    i16 => Int16, i16, write_i16, read_i16;
    u16 => Int16, i16, write_i16, read_i16;
    i32 => Int32, i32, write_i32, read_i32;
    u32 => Int32, i32, write_i32, read_i32;
    i64 => Int64, i64, write_i64, read_i64;
    u64 => Int64, i64, write_i64, read_i64;
}

impl Wire for f32 {
    const TAG: TypeTag = TypeTag::Float32;

    fn is_empty_value(&self) -> bool {
        *self == 0.0
    }

    fn encode<W: Write + ?Sized, P: Protocol>(
        &self,
        enc: &mut Encoder<'_, W, P>,
        _tag: TypeTag,
    ) -> MsgResult<()> {
        enc.write_f32(*self)
    }

    fn decode<R: Read + ?Sized, P: Protocol>(
        dec: &mut Decoder<'_, R, P>,
        _tag: TypeTag,
    ) -> MsgResult<Self> {
        dec.read_f32()
    }
}

impl Wire for f64 {
    const TAG: TypeTag = TypeTag::Float64;

    fn is_empty_value(&self) -> bool {
        *self == 0.0
    }

    fn encode<W: Write + ?Sized, P: Protocol>(
        &self,
        enc: &mut Encoder<'_, W, P>,
        _tag: TypeTag,
    ) -> MsgResult<()> {
        enc.write_f64(*self)
    }

    fn decode<R: Read + ?Sized, P: Protocol>(
        dec: &mut Decoder<'_, R, P>,
        _tag: TypeTag,
    ) -> MsgResult<Self> {
        dec.read_f64()
    }
}

impl Wire for String {
    const TAG: TypeTag = TypeTag::String;

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }

    fn encode<W: Write + ?Sized, P: Protocol>(
        &self,
        enc: &mut Encoder<'_, W, P>,
        _tag: TypeTag,
    ) -> MsgResult<()> {
        enc.write_string(self)
    }

    fn decode<R: Read + ?Sized, P: Protocol>(
        dec: &mut Decoder<'_, R, P>,
        _tag: TypeTag,
    ) -> MsgResult<Self> {
        dec.read_string()
    }
}

impl Wire for Bytes {
    const TAG: TypeTag = TypeTag::Binary;

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }

    fn encode<W: Write + ?Sized, P: Protocol>(
        &self,
        enc: &mut Encoder<'_, W, P>,
        _tag: TypeTag,
    ) -> MsgResult<()> {
        enc.write_binary(self)
    }

    fn decode<R: Read + ?Sized, P: Protocol>(
        dec: &mut Decoder<'_, R, P>,
        _tag: TypeTag,
    ) -> MsgResult<Self> {
        dec.read_binary().map(Bytes::from)
    }
}

/// Маркер членства во множестве: `HashMap<K, ()>` передаётся как Set.
/// Самостоятельного представления на проводе не имеет.
impl Wire for () {
    const TAG: TypeTag = TypeTag::Null;
    const ZERO_SIZED: bool = true;

    fn is_empty_value(&self) -> bool {
        true
    }

    fn encode<W: Write + ?Sized, P: Protocol>(
        &self,
        _enc: &mut Encoder<'_, W, P>,
        _tag: TypeTag,
    ) -> MsgResult<()> {
        Err(CodecError::UnsupportedType {
            type_name: "()".to_string(),
            reason: "unit has no wire representation outside a set".to_string(),
        }
        .into())
    }

    fn decode<R: Read + ?Sized, P: Protocol>(
        _dec: &mut Decoder<'_, R, P>,
        _tag: TypeTag,
    ) -> MsgResult<Self> {
        Err(CodecError::UnsupportedType {
            type_name: "()".to_string(),
            reason: "unit has no wire representation outside a set".to_string(),
        }
        .into())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Обёртки
////////////////////////////////////////////////////////////////////////////////

impl<T: Wire> Wire for Option<T> {
    const TAG: TypeTag = T::TAG;

    fn is_empty_value(&self) -> bool {
        self.is_none()
    }

    fn encode<W: Write + ?Sized, P: Protocol>(
        &self,
        enc: &mut Encoder<'_, W, P>,
        tag: TypeTag,
    ) -> MsgResult<()> {
        match self {
            Some(value) => value.encode(enc, tag),
            None => Err(CodecError::UnsupportedValue {
                type_name: std::any::type_name::<Self>().to_string(),
                message: "absent value inside a collection".to_string(),
            }
            .into()),
        }
    }

    fn decode<R: Read + ?Sized, P: Protocol>(
        dec: &mut Decoder<'_, R, P>,
        tag: TypeTag,
    ) -> MsgResult<Self> {
        T::decode(dec, tag).map(Some)
    }
}

impl<T: Wire> Wire for Box<T> {
    const TAG: TypeTag = T::TAG;

    fn is_empty_value(&self) -> bool {
        (**self).is_empty_value()
    }

    fn encode<W: Write + ?Sized, P: Protocol>(
        &self,
        enc: &mut Encoder<'_, W, P>,
        tag: TypeTag,
    ) -> MsgResult<()> {
        (**self).encode(enc, tag)
    }

    fn decode<R: Read + ?Sized, P: Protocol>(
        dec: &mut Decoder<'_, R, P>,
        tag: TypeTag,
    ) -> MsgResult<Self> {
        T::decode(dec, tag).map(Box::new)
    }

    fn as_bool(&self) -> Option<bool> {
        (**self).as_bool()
    }

    fn membership() -> Self {
        Box::new(T::membership())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Последовательности и множества
////////////////////////////////////////////////////////////////////////////////

/// Записывает заголовок списка или множества и элементы.
fn encode_elements<'v, T, I, W, P>(
    enc: &mut Encoder<'_, W, P>,
    tag: TypeTag,
    count: usize,
    items: I,
) -> MsgResult<()>
where
    T: Wire + 'v,
    I: IntoIterator<Item = &'v T>,
    W: Write + ?Sized,
    P: Protocol,
{
    let count = count as u64;
    match tag {
        TypeTag::List => enc.write_list_begin(&ListMarker {
            elem_tag: T::TAG,
            count,
        })?,
        TypeTag::Set => enc.write_set_begin(&SetMarker {
            elem_tag: T::TAG,
            count,
        })?,
        other => return unexpected_tag(std::any::type_name::<T>(), other),
    }
    for item in items {
        item.encode(enc, T::TAG)?;
    }
    Ok(())
}

/// Читает заголовок списка или множества и передаёт элементы в `sink`
/// вместе с допустимой ёмкостью для предварительного выделения.
fn decode_elements<T, R, P, F>(
    dec: &mut Decoder<'_, R, P>,
    tag: TypeTag,
    mut sink: F,
) -> MsgResult<()>
where
    T: Wire,
    R: Read + ?Sized,
    P: Protocol,
    F: FnMut(usize, T),
{
    let (container, elem_tag, count) = match tag {
        TypeTag::List => {
            let marker = dec.read_list_begin()?;
            ("list", marker.elem_tag, marker.count)
        }
        TypeTag::Set => {
            let marker = dec.read_set_begin()?;
            ("set", marker.elem_tag, marker.count)
        }
        other => return unexpected_tag(std::any::type_name::<T>(), other),
    };
    expect_elem_tag(container, T::TAG, elem_tag)?;
    let count = dec.check_count(count, 1, container)?;
    let capacity = dec.capacity(count);

    dec.nested(|dec| {
        for _ in 0..count {
            let item = T::decode(dec, T::TAG)?;
            sink(capacity, item);
        }
        Ok(())
    })
}

impl<T: Wire> Wire for Vec<T> {
    const TAG: TypeTag = if T::RAW_BYTE {
        TypeTag::Binary
    } else {
        TypeTag::List
    };

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }

    fn encode<W: Write + ?Sized, P: Protocol>(
        &self,
        enc: &mut Encoder<'_, W, P>,
        tag: TypeTag,
    ) -> MsgResult<()> {
        if tag == TypeTag::Binary {
            let bytes = self
                .iter()
                .map(T::as_byte)
                .collect::<Option<Vec<u8>>>();
            return match bytes {
                Some(bytes) => enc.write_binary(&bytes),
                None => unexpected_tag(std::any::type_name::<Self>(), tag),
            };
        }
        encode_elements(enc, tag, self.len(), self)
    }

    fn decode<R: Read + ?Sized, P: Protocol>(
        dec: &mut Decoder<'_, R, P>,
        tag: TypeTag,
    ) -> MsgResult<Self> {
        if tag == TypeTag::Binary {
            return dec
                .read_binary()?
                .into_iter()
                .map(T::from_byte)
                .collect::<Option<Vec<T>>>()
                .map_or_else(|| unexpected_tag(std::any::type_name::<Self>(), tag), Ok);
        }

        let mut out = Vec::new();
        decode_elements(dec, tag, |capacity, item| {
            if out.is_empty() {
                out.reserve(capacity);
            }
            out.push(item);
        })?;
        Ok(out)
    }
}

impl<K: Wire + Eq + Hash, S: BuildHasher + Default> Wire for HashSet<K, S> {
    const TAG: TypeTag = TypeTag::Set;

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }

    fn encode<W: Write + ?Sized, P: Protocol>(
        &self,
        enc: &mut Encoder<'_, W, P>,
        tag: TypeTag,
    ) -> MsgResult<()> {
        encode_elements(enc, tag, self.len(), self)
    }

    fn decode<R: Read + ?Sized, P: Protocol>(
        dec: &mut Decoder<'_, R, P>,
        tag: TypeTag,
    ) -> MsgResult<Self> {
        let mut out = Self::default();
        decode_elements(dec, tag, |_, item| {
            out.insert(item);
        })?;
        Ok(out)
    }
}

impl<K: Wire + Ord> Wire for BTreeSet<K> {
    const TAG: TypeTag = TypeTag::Set;

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }

    fn encode<W: Write + ?Sized, P: Protocol>(
        &self,
        enc: &mut Encoder<'_, W, P>,
        tag: TypeTag,
    ) -> MsgResult<()> {
        encode_elements(enc, tag, self.len(), self)
    }

    fn decode<R: Read + ?Sized, P: Protocol>(
        dec: &mut Decoder<'_, R, P>,
        tag: TypeTag,
    ) -> MsgResult<Self> {
        let mut out = Self::default();
        decode_elements(dec, tag, |_, item| {
            out.insert(item);
        })?;
        Ok(out)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Словари
////////////////////////////////////////////////////////////////////////////////

/// Записывает словарь как Map или, при теге Set, как множество ключей.
///
/// Для словаря-множества с булевыми значениями передаются только ключи со
/// значением `true`.
fn encode_entries<'v, K, V, I, W, P>(
    enc: &mut Encoder<'_, W, P>,
    tag: TypeTag,
    len: usize,
    entries: I,
) -> MsgResult<()>
where
    K: Wire + 'v,
    V: Wire + 'v,
    I: Iterator<Item = (&'v K, &'v V)> + Clone,
    W: Write + ?Sized,
    P: Protocol,
{
    match tag {
        TypeTag::Map => {
            enc.write_map_begin(&MapMarker {
                key_tag: K::TAG,
                value_tag: V::TAG,
                count: len as u64,
            })?;
            for (key, value) in entries {
                key.encode(enc, K::TAG)?;
                value.encode(enc, V::TAG)?;
            }
            Ok(())
        }
        TypeTag::Set => {
            let members = entries.filter(|(_, value)| value.as_bool().unwrap_or(true));
            enc.write_set_begin(&SetMarker {
                elem_tag: K::TAG,
                count: members.clone().count() as u64,
            })?;
            for (key, _) in members {
                key.encode(enc, K::TAG)?;
            }
            Ok(())
        }
        other => unexpected_tag(std::any::type_name::<K>(), other),
    }
}

/// Читает Map или множество ключей в `sink`.
fn decode_entries<K, V, R, P, F>(
    dec: &mut Decoder<'_, R, P>,
    tag: TypeTag,
    mut sink: F,
) -> MsgResult<()>
where
    K: Wire,
    V: Wire,
    R: Read + ?Sized,
    P: Protocol,
    F: FnMut(K, V),
{
    match tag {
        TypeTag::Map => {
            let marker = dec.read_map_begin()?;
            expect_elem_tag("map key", K::TAG, marker.key_tag)?;
            expect_elem_tag("map value", V::TAG, marker.value_tag)?;
            let count = dec.check_count(marker.count, 2, "map")?;

            dec.nested(|dec| {
                for _ in 0..count {
                    let key = K::decode(dec, K::TAG)?;
                    let value = V::decode(dec, V::TAG)?;
                    sink(key, value);
                }
                Ok(())
            })
        }
        TypeTag::Set => {
            decode_elements(dec, tag, |_, key: K| sink(key, V::membership()))
        }
        other => unexpected_tag(std::any::type_name::<K>(), other),
    }
}

impl<K, V, S> Wire for HashMap<K, V, S>
where
    K: Wire + Eq + Hash,
    V: Wire,
    S: BuildHasher + Default,
{
    const TAG: TypeTag = if V::ZERO_SIZED {
        TypeTag::Set
    } else {
        TypeTag::Map
    };

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }

    fn encode<W: Write + ?Sized, P: Protocol>(
        &self,
        enc: &mut Encoder<'_, W, P>,
        tag: TypeTag,
    ) -> MsgResult<()> {
        encode_entries(enc, tag, self.len(), self.iter())
    }

    fn decode<R: Read + ?Sized, P: Protocol>(
        dec: &mut Decoder<'_, R, P>,
        tag: TypeTag,
    ) -> MsgResult<Self> {
        let mut out = Self::default();
        decode_entries(dec, tag, |key, value| {
            out.insert(key, value);
        })?;
        Ok(out)
    }
}

impl<K, V> Wire for BTreeMap<K, V>
where
    K: Wire + Ord,
    V: Wire,
{
    const TAG: TypeTag = if V::ZERO_SIZED {
        TypeTag::Set
    } else {
        TypeTag::Map
    };

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }

    fn encode<W: Write + ?Sized, P: Protocol>(
        &self,
        enc: &mut Encoder<'_, W, P>,
        tag: TypeTag,
    ) -> MsgResult<()> {
        encode_entries(enc, tag, self.len(), self.iter())
    }

    fn decode<R: Read + ?Sized, P: Protocol>(
        dec: &mut Decoder<'_, R, P>,
        tag: TypeTag,
    ) -> MsgResult<Self> {
        let mut out = Self::default();
        decode_entries(dec, tag, |key, value| {
            out.insert(key, value);
        })?;
        Ok(out)
    }
}
