//! Процессный кэш схем.
//!
//! Схема строится при первом обращении к типу и живёт до конца процесса;
//! инвалидации нет, раскладка типов фиксирована на этапе компиляции.
//! Чтения идут под read-lock, построение сериализовано write-lock'ом с
//! повторной проверкой, поэтому каждая схема строится ровно один раз и
//! читатель никогда не видит частично построенную запись.

use std::{any::TypeId, sync::Arc};

use msglib_error::MsgResult;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::debug;

use super::{Record, Schema};

static CACHE: Lazy<RwLock<FxHashMap<TypeId, Arc<Schema>>>> =
    Lazy::new(|| RwLock::new(FxHashMap::default()));

/// Возвращает схему типа `T`, строя её при первом обращении.
///
/// Ошибка построения не кэшируется: она означает дефект в описании
/// типа и будет возвращаться при каждом вызове.
pub fn schema_for<T: Record>() -> MsgResult<Arc<Schema>> {
    let key = TypeId::of::<T>();

    if let Some(schema) = CACHE.read().get(&key) {
        return Ok(Arc::clone(schema));
    }

    let mut cache = CACHE.write();
    if let Some(schema) = cache.get(&key) {
        return Ok(Arc::clone(schema));
    }

    let schema = Arc::new(Schema::build::<T>()?);
    debug!(
        record = T::NAME,
        fields = schema.len(),
        "schema built and published"
    );
    cache.insert(key, Arc::clone(&schema));
    Ok(schema)
}

/// Есть ли схема типа `T` в кэше.
pub fn is_cached<T: Record>() -> bool {
    CACHE.read().contains_key(&TypeId::of::<T>())
}
