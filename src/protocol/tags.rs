//! Словарь типовых тегов протокола.
//!
//! Каждое значение на проводе сопровождается 4-битным тегом, упакованным в
//! маркер поля, словаря или списка. Благодаря этому декодер может
//! распознать (и при необходимости пропустить) значение, не зная
//! статического типа получателя.

use std::fmt;

use msglib_error::{CodecError, MsgResult};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::Serialize;

/// Маска тега внутри упакованного маркера.
pub const TAG_MASK: u8 = 0x0F;

/// Тип значения на проводе. Коды 1–14 фиксированы и совпадают у всех
/// реализаций протокола.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize)]
#[repr(u8)]
pub enum TypeTag {
    /// Отсутствие значения; вместе с id = 0 служит маркером конца полей.
    Null = 1,
    Bool = 2,
    Byte = 3,
    Int16 = 4,
    Int32 = 5,
    Int64 = 6,
    Float32 = 7,
    Float64 = 8,
    Binary = 9,
    String = 10,
    Struct = 11,
    Map = 12,
    List = 13,
    Set = 14,
}

impl TypeTag {
    /// Все теги в порядке их кодов.
    pub const ALL: [TypeTag; 14] = [
        TypeTag::Null,
        TypeTag::Bool,
        TypeTag::Byte,
        TypeTag::Int16,
        TypeTag::Int32,
        TypeTag::Int64,
        TypeTag::Float32,
        TypeTag::Float64,
        TypeTag::Binary,
        TypeTag::String,
        TypeTag::Struct,
        TypeTag::Map,
        TypeTag::List,
        TypeTag::Set,
    ];

    /// Числовой код тега.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Декодирует тег из младших 4 бит упакованного значения.
    pub fn from_code(code: u8) -> MsgResult<Self> {
        Self::try_from(code & TAG_MASK).map_err(|_| CodecError::UnknownTag { tag: code }.into())
    }

    /// Человекочитаемое имя тега (используется в сообщениях об ошибках).
    pub const fn name(self) -> &'static str {
        match self {
            TypeTag::Null => "Null",
            TypeTag::Bool => "Bool",
            TypeTag::Byte => "Byte",
            TypeTag::Int16 => "Int16",
            TypeTag::Int32 => "Int32",
            TypeTag::Int64 => "Int64",
            TypeTag::Float32 => "Float32",
            TypeTag::Float64 => "Float64",
            TypeTag::Binary => "Binary",
            TypeTag::String => "String",
            TypeTag::Struct => "Struct",
            TypeTag::Map => "Map",
            TypeTag::List => "List",
            TypeTag::Set => "Set",
        }
    }

    /// Скалярный тег: значение читается одним вызовом протокола.
    pub const fn is_scalar(self) -> bool {
        !matches!(
            self,
            TypeTag::Struct | TypeTag::Map | TypeTag::List | TypeTag::Set
        )
    }

    /// Тег контейнера (словарь, список или множество).
    pub const fn is_collection(self) -> bool {
        matches!(self, TypeTag::Map | TypeTag::List | TypeTag::Set)
    }

    /// Сравнение в const-контексте (`PartialEq` там недоступен).
    pub const fn same(
        self,
        other: TypeTag,
    ) -> bool {
        self as u8 == other as u8
    }
}

impl fmt::Display for TypeTag {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Тест проверяет, что коды тегов идут подряд от 1 до 14.
    #[test]
    fn test_codes_are_contiguous() {
        for (i, tag) in TypeTag::ALL.iter().enumerate() {
            assert_eq!(tag.code() as usize, i + 1);
            assert!(tag.code() <= TAG_MASK);
        }
    }

    #[test]
    fn test_from_code_masks_high_bits() {
        assert_eq!(TypeTag::from_code(0x35).unwrap(), TypeTag::Int32);
        assert_eq!(TypeTag::from_code(0x0E).unwrap(), TypeTag::Set);
    }

    /// Тест проверяет, что коды 0 и 15 не соответствуют тегам.
    #[test]
    fn test_from_code_rejects_unknown() {
        for code in [0u8, 15] {
            let err = TypeTag::from_code(code).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<CodecError>(),
                Some(CodecError::UnknownTag { .. })
            ));
        }
    }

    #[test]
    fn test_scalar_and_collection_split() {
        assert!(TypeTag::Binary.is_scalar());
        assert!(!TypeTag::Struct.is_scalar());
        assert!(TypeTag::Set.is_collection());
        assert!(!TypeTag::Struct.is_collection());
        assert!(TypeTag::Map.same(TypeTag::Map));
        assert!(!TypeTag::Map.same(TypeTag::Set));
    }
}
