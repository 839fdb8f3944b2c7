//! Декодирование без схемы.
//!
//! Каждое значение на проводе несёт свой тег, поэтому сообщение можно
//! разобрать в дерево [`DynValue`], не зная типа записи. Используется
//! `msglib-cli inspect` и тестами, которые проверяют структуру байт.

use std::{fmt, io::Read};

use msglib_error::MsgResult;
use serde::Serialize;

use crate::{
    codec::Decoder,
    config::CodecConfig,
    protocol::{BinaryProtocol, Protocol, TypeTag},
};

/// Значение, восстановленное только по тегам провода.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum DynValue {
    Null,
    Bool(bool),
    Byte(u8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Binary(Vec<u8>),
    String(String),
    /// Поля в порядке появления на проводе.
    Struct(Vec<(u32, DynValue)>),
    Map {
        key_tag: TypeTag,
        value_tag: TypeTag,
        entries: Vec<(DynValue, DynValue)>,
    },
    List {
        elem_tag: TypeTag,
        items: Vec<DynValue>,
    },
    Set {
        elem_tag: TypeTag,
        items: Vec<DynValue>,
    },
}

impl DynValue {
    pub fn tag(&self) -> TypeTag {
        match self {
            DynValue::Null => TypeTag::Null,
            DynValue::Bool(_) => TypeTag::Bool,
            DynValue::Byte(_) => TypeTag::Byte,
            DynValue::Int16(_) => TypeTag::Int16,
            DynValue::Int32(_) => TypeTag::Int32,
            DynValue::Int64(_) => TypeTag::Int64,
            DynValue::Float32(_) => TypeTag::Float32,
            DynValue::Float64(_) => TypeTag::Float64,
            DynValue::Binary(_) => TypeTag::Binary,
            DynValue::String(_) => TypeTag::String,
            DynValue::Struct(_) => TypeTag::Struct,
            DynValue::Map { .. } => TypeTag::Map,
            DynValue::List { .. } => TypeTag::List,
            DynValue::Set { .. } => TypeTag::Set,
        }
    }

    /// Первое поле структуры с данным id.
    pub fn field(
        &self,
        id: u32,
    ) -> Option<&DynValue> {
        match self {
            DynValue::Struct(fields) => fields.iter().find(|(fid, _)| *fid == id).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Читает одно значение с тегом `tag`.
    pub fn read<R, P>(
        dec: &mut Decoder<'_, R, P>,
        tag: TypeTag,
    ) -> MsgResult<Self>
    where
        R: Read + ?Sized,
        P: Protocol,
    {
        let value = match tag {
            TypeTag::Null => DynValue::Null,
            TypeTag::Bool => DynValue::Bool(dec.read_bool()?),
            TypeTag::Byte => DynValue::Byte(dec.read_byte()?),
            TypeTag::Int16 => DynValue::Int16(dec.read_i16()?),
            TypeTag::Int32 => DynValue::Int32(dec.read_i32()?),
            TypeTag::Int64 => DynValue::Int64(dec.read_i64()?),
            TypeTag::Float32 => DynValue::Float32(dec.read_f32()?),
            TypeTag::Float64 => DynValue::Float64(dec.read_f64()?),
            TypeTag::Binary => DynValue::Binary(dec.read_binary()?),
            TypeTag::String => DynValue::String(dec.read_string()?),
            TypeTag::Struct => {
                let fields = dec.nested(|dec| {
                    dec.read_struct_begin()?;
                    let mut fields = Vec::new();
                    loop {
                        let marker = dec.read_field_begin()?;
                        if marker.is_stop() {
                            break;
                        }
                        fields.push((marker.id, Self::read(dec, marker.tag)?));
                    }
                    dec.read_struct_end()?;
                    Ok(fields)
                })?;
                DynValue::Struct(fields)
            }
            TypeTag::Map => {
                let marker = dec.read_map_begin()?;
                let count = dec.check_count(marker.count, 2, "map")?;
                let mut entries = Vec::with_capacity(dec.capacity(count));
                dec.nested(|dec| {
                    for _ in 0..count {
                        let key = Self::read(dec, marker.key_tag)?;
                        let value = Self::read(dec, marker.value_tag)?;
                        entries.push((key, value));
                    }
                    Ok(())
                })?;
                DynValue::Map {
                    key_tag: marker.key_tag,
                    value_tag: marker.value_tag,
                    entries,
                }
            }
            TypeTag::List | TypeTag::Set => {
                let marker = if tag == TypeTag::List {
                    dec.read_list_begin()?
                } else {
                    dec.read_set_begin()?.into()
                };
                let count = dec.check_count(marker.count, 1, tag.name())?;
                let mut items = Vec::with_capacity(dec.capacity(count));
                dec.nested(|dec| {
                    for _ in 0..count {
                        items.push(Self::read(dec, marker.elem_tag)?);
                    }
                    Ok(())
                })?;
                if tag == TypeTag::List {
                    DynValue::List {
                        elem_tag: marker.elem_tag,
                        items,
                    }
                } else {
                    DynValue::Set {
                        elem_tag: marker.elem_tag,
                        items,
                    }
                }
            }
        };
        Ok(value)
    }

    /// Многострочное представление с отступами.
    pub fn to_pretty_string(&self) -> String {
        let mut out = String::new();
        self.write_pretty(&mut out, 0);
        out
    }

    fn write_pretty(
        &self,
        out: &mut String,
        indent: usize,
    ) {
        let pad = "  ".repeat(indent);
        match self {
            DynValue::Struct(fields) => {
                out.push_str("struct {\n");
                for (id, value) in fields {
                    out.push_str(&format!("{pad}  #{id}: "));
                    value.write_pretty(out, indent + 1);
                    out.push('\n');
                }
                out.push_str(&format!("{pad}}}"));
            }
            DynValue::Map {
                key_tag,
                value_tag,
                entries,
            } => {
                out.push_str(&format!("map<{key_tag}, {value_tag}> {{\n"));
                for (key, value) in entries {
                    out.push_str(&format!("{pad}  "));
                    key.write_pretty(out, indent + 1);
                    out.push_str(" => ");
                    value.write_pretty(out, indent + 1);
                    out.push('\n');
                }
                out.push_str(&format!("{pad}}}"));
            }
            DynValue::List { elem_tag, items } | DynValue::Set { elem_tag, items } => {
                let kind = if matches!(self, DynValue::List { .. }) {
                    "list"
                } else {
                    "set"
                };
                out.push_str(&format!("{kind}<{elem_tag}> [\n"));
                for item in items {
                    out.push_str(&format!("{pad}  "));
                    item.write_pretty(out, indent + 1);
                    out.push('\n');
                }
                out.push_str(&format!("{pad}]"));
            }
            scalar => out.push_str(&scalar.to_string()),
        }
    }
}

impl fmt::Display for DynValue {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            DynValue::Null => write!(f, "null"),
            DynValue::Bool(v) => write!(f, "{v}"),
            DynValue::Byte(v) => write!(f, "{v}u8"),
            DynValue::Int16(v) => write!(f, "{v}i16"),
            DynValue::Int32(v) => write!(f, "{v}"),
            DynValue::Int64(v) => write!(f, "{v}i64"),
            DynValue::Float32(v) => write!(f, "{v}f32"),
            DynValue::Float64(v) => write!(f, "{v}"),
            DynValue::Binary(bytes) => {
                write!(f, "0x")?;
                for b in bytes {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
            DynValue::String(s) => write!(f, "{s:?}"),
            DynValue::Struct(fields) => {
                write!(f, "{{")?;
                for (i, (id, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "#{id}: {value}")?;
                }
                write!(f, "}}")
            }
            DynValue::Map { entries, .. } => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key} => {value}")?;
                }
                write!(f, "}}")
            }
            DynValue::List { items, .. } | DynValue::Set { items, .. } => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Разбирает сообщение (тело структуры) из буфера.
pub fn decode_dynamic(bytes: &[u8]) -> MsgResult<DynValue> {
    decode_dynamic_with_config(bytes, &CodecConfig::default())
}

pub fn decode_dynamic_with_config(
    bytes: &[u8],
    config: &CodecConfig,
) -> MsgResult<DynValue> {
    let mut input = bytes;
    let mut proto = BinaryProtocol::with_config(config);
    let mut dec =
        Decoder::new(&mut input, &mut proto, config.clone()).with_input_len(bytes.len() as u64);
    DynValue::read(&mut dec, TypeTag::Struct)
}
