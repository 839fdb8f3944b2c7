//! Маркеры агрегатов: поле, словарь, список, множество, структура.
//!
//! Маркеры живут ровно один вызов чтения/записи и хранят только то, что
//! нужно упаковать в заголовок значения.

use super::tags::TypeTag;

/// Заголовок поля структуры.
///
/// На проводе: беззнаковый varint `(id << 4) | tag`. Имя поля не
/// передаётся и заполняется только на стороне кодирования (для
/// диагностики).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMarker {
    pub name: &'static str,
    pub tag: TypeTag,
    pub id: u32,
}

impl FieldMarker {
    pub fn new(
        name: &'static str,
        tag: TypeTag,
        id: u32,
    ) -> Self {
        Self { name, tag, id }
    }

    /// Маркер конца списка полей: тег `Null`, id = 0.
    pub const STOP: FieldMarker = FieldMarker {
        name: "",
        tag: TypeTag::Null,
        id: 0,
    };

    /// Является ли маркер концом списка полей.
    pub fn is_stop(&self) -> bool {
        self.tag == TypeTag::Null
    }

    /// Упакованное представление маркера.
    pub fn packed(&self) -> u64 {
        (u64::from(self.id) << 4) | u64::from(self.tag.code())
    }
}

/// Заголовок словаря: varint `count`, затем байт `(value_tag << 4) | key_tag`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapMarker {
    pub key_tag: TypeTag,
    pub value_tag: TypeTag,
    pub count: u64,
}

impl MapMarker {
    pub fn packed_tags(&self) -> u8 {
        (self.value_tag.code() << 4) | self.key_tag.code()
    }
}

/// Заголовок списка: varint `(count << 4) | elem_tag`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMarker {
    pub elem_tag: TypeTag,
    pub count: u64,
}

impl ListMarker {
    pub fn packed(&self) -> u64 {
        (self.count << 4) | u64::from(self.elem_tag.code())
    }
}

/// Заголовок множества. На проводе совпадает со списком; уникальность
/// элементов при декодировании не проверяется.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetMarker {
    pub elem_tag: TypeTag,
    pub count: u64,
}

impl From<SetMarker> for ListMarker {
    fn from(set: SetMarker) -> Self {
        ListMarker {
            elem_tag: set.elem_tag,
            count: set.count,
        }
    }
}

impl From<ListMarker> for SetMarker {
    fn from(list: ListMarker) -> Self {
        SetMarker {
            elem_tag: list.elem_tag,
            count: list.count,
        }
    }
}

/// Заголовок структуры. Зарезервирован под версионирование, в бинарном
/// формате не занимает ни одного байта.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StructMarker {
    pub name: &'static str,
}
