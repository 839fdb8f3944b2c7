//! Схема записи: какие поля сериализуются, с какими id и тегами.
//!
//! ## Архитектура
//!
//! Rust не даёт интроспекции типов во время выполнения, поэтому описание
//! полей поставляет сам тип через трейт [`Record`]. Обычно реализация
//! генерируется макросом [`record!`](crate::record):
//!
//! ```
//! use msglib::record;
//!
//! record! {
//!     #[derive(Debug, Default, Clone, PartialEq)]
//!     pub struct Command {
//!         pub command: i32 => 1,
//!         pub data: Vec<u8> => 2,
//!         /// Без id: поле не сериализуется.
//!         pub local_only: String,
//!     }
//! }
//!
//! let schema = msglib::schema::schema_for::<Command>().unwrap();
//! assert_eq!(schema.len(), 2);
//! assert_eq!(schema.get(2).unwrap().name, "data");
//! ```
//!
//! [`Schema::build`] проверяет описание один раз; результат публикуется
//! в процессном кэше ([`cache`]) и больше не меняется.
//!
//! ## Модули
//!
//! - [`cache`] — процессный кэш схем
//! - `macros` — `record!` и `impl_wire_for_record!`

pub mod cache;
mod macros;

use std::io::{Read, Write};

pub use cache::{is_cached, schema_for};
use msglib_error::{MsgResult, SchemaError};
use rustc_hash::FxHashMap;

use crate::{
    codec::{Decoder, Encoder},
    protocol::{Protocol, TypeTag},
};

/// Описание поля, которое поставляет тип записи.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub id: u32,
    pub name: &'static str,
    /// Тег, выведенный из статической формы поля.
    pub tag: TypeTag,
    /// Поле помечено `set`: контейнер передаётся как множество.
    pub set: bool,
}

impl FieldSpec {
    pub const fn new(
        id: u32,
        name: &'static str,
        tag: TypeTag,
        set: bool,
    ) -> Self {
        Self { id, name, tag, set }
    }
}

/// Проверенное описание поля в кэше.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub id: u32,
    pub name: &'static str,
    /// Итоговый тег на проводе (с учётом `set`).
    pub tag: TypeTag,
    /// Позиция поля в объявлении типа.
    pub index: usize,
}

/// Тип, который кодируется как Struct.
///
/// Реализации диспетчеризуют по id поля; id, которого нет в
/// [`Record::fields`], никогда не передаётся в эти методы кодеком.
pub trait Record: Default + 'static {
    /// Имя типа для диагностики.
    const NAME: &'static str;

    /// Поля с id в порядке объявления.
    fn fields() -> Vec<FieldSpec>;

    fn is_field_empty(
        &self,
        id: u32,
    ) -> bool;

    fn encode_field<W: Write + ?Sized, P: Protocol>(
        &self,
        id: u32,
        enc: &mut Encoder<'_, W, P>,
        tag: TypeTag,
    ) -> MsgResult<()>;

    fn decode_field<R: Read + ?Sized, P: Protocol>(
        &mut self,
        id: u32,
        dec: &mut Decoder<'_, R, P>,
        tag: TypeTag,
    ) -> MsgResult<()>;
}

/// Неизменяемая схема записи: поля в порядке объявления плюс индекс по id.
#[derive(Debug, Clone)]
pub struct Schema {
    record: &'static str,
    fields: Vec<FieldDescriptor>,
    by_id: FxHashMap<u32, usize>,
}

impl Schema {
    /// Строит и проверяет схему типа `T`.
    ///
    /// # Errors
    /// [`SchemaError`], если id равен нулю или повторяется, `set` стоит на
    /// поле, которое не является контейнером, или у поля нет формы на
    /// проводе.
    pub fn build<T: Record>() -> MsgResult<Self> {
        let specs = T::fields();
        let mut fields = Vec::with_capacity(specs.len());
        let mut by_id = FxHashMap::default();

        for (index, spec) in specs.into_iter().enumerate() {
            if spec.id == 0 {
                return Err(SchemaError::InvalidFieldId {
                    record: T::NAME,
                    field: spec.name,
                }
                .into());
            }
            if spec.tag == TypeTag::Null {
                return Err(SchemaError::NullFieldTag {
                    record: T::NAME,
                    field: spec.name,
                }
                .into());
            }

            let tag = if spec.set {
                if !spec.tag.is_collection() {
                    return Err(SchemaError::InvalidSetOverride {
                        record: T::NAME,
                        field: spec.name,
                        found: spec.tag.name(),
                    }
                    .into());
                }
                TypeTag::Set
            } else {
                spec.tag
            };

            if let Some(&first) = by_id.get(&spec.id) {
                let first: &FieldDescriptor = &fields[first];
                return Err(SchemaError::DuplicateFieldId {
                    record: T::NAME,
                    field_id: spec.id,
                    first: first.name,
                    second: spec.name,
                }
                .into());
            }

            by_id.insert(spec.id, fields.len());
            fields.push(FieldDescriptor {
                id: spec.id,
                name: spec.name,
                tag,
                index,
            });
        }

        Ok(Self {
            record: T::NAME,
            fields,
            by_id,
        })
    }

    pub fn record_name(&self) -> &'static str {
        self.record
    }

    /// Поля в порядке объявления.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn get(
        &self,
        id: u32,
    ) -> Option<&FieldDescriptor> {
        self.by_id.get(&id).map(|&i| &self.fields[i])
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
