//! Совместимость между версиями одной записи.
//!
//! Поля идентифицируются только по id: читатель пропускает неизвестные
//! id, отсутствующие поля остаются значениями по умолчанию, а смена
//! тега у знакомого id отвергается.

use std::collections::{BTreeMap, HashMap};

use msglib::{deserialize, record, serialize, CodecError, StatusCode};

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct UserV2 {
        pub id: i64 => 1,
        pub nickname: String => 2,
        pub email: String => 3,
    }
}

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct UserV1 {
        pub id: i64 => 1,
        pub email: String => 3,
    }
}

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Address {
        pub city: String => 1,
        pub zip: i32 => 2,
    }
}

record! {
    /// Новая версия: добавлены вложенная структура и контейнеры.
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct UserV3 {
        pub id: i64 => 1,
        pub nickname: String => 2,
        pub email: String => 3,
        pub address: Option<Address> => 4,
        pub tags: Vec<String> => 5,
        pub counters: BTreeMap<String, i64> => 6,
        pub roles: HashMap<String, bool> => 7 set,
    }
}

record! {
    /// Те же id, что у `UserV1`, но поле 3 стало числом.
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct UserRetyped {
        pub id: i64 => 1,
        pub email: i32 => 3,
    }
}

record! {
    /// Поля объявлены в другом порядке.
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct UserReordered {
        pub email: String => 3,
        pub nickname: String => 2,
        pub id: i64 => 1,
    }
}

fn sample_v2() -> UserV2 {
    UserV2 {
        id: 42,
        nickname: "neo".into(),
        email: "neo@example.com".into(),
    }
}

/// Тест проверяет, что читатель со схемой {1,3} пропускает поле 2.
#[test]
fn test_forward_compatibility_skips_unknown_field() {
    let bytes = serialize(&sample_v2()).unwrap();
    let old: UserV1 = deserialize(&bytes).unwrap();
    assert_eq!(
        old,
        UserV1 {
            id: 42,
            email: "neo@example.com".into(),
        }
    );
}

/// Тест проверяет, что отсутствующие на проводе поля остаются пустыми.
#[test]
fn test_backward_compatibility_defaults_missing_fields() {
    let old = UserV1 {
        id: 7,
        email: "old@example.com".into(),
    };
    let bytes = serialize(&old).unwrap();
    let new: UserV3 = deserialize(&bytes).unwrap();
    assert_eq!(new.id, 7);
    assert_eq!(new.email, "old@example.com");
    assert!(new.nickname.is_empty());
    assert!(new.address.is_none());
    assert!(new.tags.is_empty());
    assert!(new.roles.is_empty());
}

/// Тест проверяет пропуск неизвестных полей всех форм: структуры,
/// списка, словаря и множества.
#[test]
fn test_skip_unknown_aggregates() {
    let mut counters = BTreeMap::new();
    counters.insert("logins".to_string(), 12);
    let mut roles = HashMap::new();
    roles.insert("admin".to_string(), true);
    roles.insert("guest".to_string(), false);

    let v3 = UserV3 {
        id: 1,
        nickname: "trinity".into(),
        email: "t@example.com".into(),
        address: Some(Address {
            city: "Zion".into(),
            zip: 101,
        }),
        tags: vec!["a".into(), "b".into()],
        counters,
        roles,
    };
    let bytes = serialize(&v3).unwrap();

    let v2: UserV2 = deserialize(&bytes).unwrap();
    assert_eq!(
        v2,
        UserV2 {
            id: 1,
            nickname: "trinity".into(),
            email: "t@example.com".into(),
        }
    );

    let back: UserV3 = deserialize(&bytes).unwrap();
    assert_eq!(back.roles.len(), 1);
    assert_eq!(back.roles.get("admin"), Some(&true));
    assert_eq!(back.address, v3.address);
}

/// Тест проверяет отказ при смене тега у известного id.
#[test]
fn test_type_mismatch_is_rejected() {
    let bytes = serialize(&sample_v2()).unwrap();
    let err = deserialize::<UserRetyped>(&bytes).unwrap_err();

    assert_eq!(err.status_code(), StatusCode::TypeError);
    match err.downcast_ref::<CodecError>() {
        Some(CodecError::TagMismatch {
            record,
            field,
            field_id,
            expected,
            found,
        }) => {
            assert_eq!(*record, "UserRetyped");
            assert_eq!(*field, "email");
            assert_eq!(*field_id, 3);
            assert_eq!(*expected, "Int32");
            assert_eq!(*found, "String");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

/// Тест проверяет, что порядок объявления полей не влияет на чтение.
#[test]
fn test_declaration_order_is_irrelevant() {
    let bytes = serialize(&sample_v2()).unwrap();
    let reordered: UserReordered = deserialize(&bytes).unwrap();
    assert_eq!(reordered.id, 42);
    assert_eq!(reordered.nickname, "neo");
    assert_eq!(reordered.email, "neo@example.com");

    let back: UserV2 = deserialize(&serialize(&reordered).unwrap()).unwrap();
    assert_eq!(back, sample_v2());
}

/// Тест проверяет, что поле вне схемы не сериализуется.
#[test]
fn test_fields_without_id_are_transient() {
    record! {
        #[derive(Debug, Default)]
        struct WithCache {
            value: i32 => 1,
            cache: Vec<u8>,
        }
    }

    let value = WithCache {
        value: 5,
        cache: vec![1, 2, 3],
    };
    let bytes = serialize(&value).unwrap();
    assert_eq!(bytes, vec![0x15, 0x0A, 0x01]);

    let back: WithCache = deserialize(&bytes).unwrap();
    assert_eq!(back.value, 5);
    assert!(back.cache.is_empty());
}
