//! Декодирование записей.
//!
//! Декодер строит новое значение `T::default()` и отдаёт его только при
//! успехе, поэтому ошибка посреди потока не оставляет вызывающему
//! частично заполненную запись. Поля с неизвестным id пропускаются,
//! несовпадение тега у известного id всегда ошибка.

use std::io::{self, Read};

use msglib_error::{bail, ensure, CodecError, MsgResult};
use tracing::{trace, warn};

use super::skip;
use crate::{
    config::CodecConfig,
    protocol::{FieldMarker, ListMarker, MapMarker, Protocol, SetMarker, StructMarker, TypeTag},
    schema::{schema_for, Record},
};

/// Источник, считающий прочитанные байты.
struct CountingReader<'a, R: Read + ?Sized> {
    inner: &'a mut R,
    consumed: u64,
}

impl<R: Read + ?Sized> Read for CountingReader<'_, R> {
    fn read(
        &mut self,
        buf: &mut [u8],
    ) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.consumed += n as u64;
        Ok(n)
    }
}

/// Состояние одного вызова декодирования.
///
/// Хранит лимиты, текущую глубину вложенности и, если известна длина
/// входа, число оставшихся байт: заявленный счётчик, который не может
/// поместиться в остаток, отвергается до начала чтения элементов.
pub struct Decoder<'a, R: Read + ?Sized, P: Protocol> {
    reader: CountingReader<'a, R>,
    proto: &'a mut P,
    config: CodecConfig,
    depth: usize,
    input_len: Option<u64>,
}

impl<'a, R: Read + ?Sized, P: Protocol> Decoder<'a, R, P> {
    pub fn new(
        reader: &'a mut R,
        proto: &'a mut P,
        config: CodecConfig,
    ) -> Self {
        Self {
            reader: CountingReader {
                inner: reader,
                consumed: 0,
            },
            proto,
            config,
            depth: 0,
            input_len: None,
        }
    }

    /// Сообщает декодеру полную длину входа (для входа из памяти).
    pub fn with_input_len(
        mut self,
        len: u64,
    ) -> Self {
        self.input_len = Some(len);
        self
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Сколько байт прочитано с начала вызова.
    pub fn consumed(&self) -> u64 {
        self.reader.consumed
    }

    /// Сколько байт осталось во входе, если длина известна.
    pub fn remaining(&self) -> Option<u64> {
        self.input_len
            .map(|len| len.saturating_sub(self.reader.consumed))
    }

    /// Текущая глубина вложенности.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Выполняет `f` на один уровень вложенности глубже.
    ///
    /// Глубина восстанавливается и при ошибке внутри `f`, так что декодер
    /// можно использовать повторно после неудачного чтения.
    pub fn nested<T, F>(
        &mut self,
        f: F,
    ) -> MsgResult<T>
    where
        F: FnOnce(&mut Self) -> MsgResult<T>,
    {
        let depth = self.depth + 1;
        if depth > self.config.max_depth {
            warn!(depth, max = self.config.max_depth, "nesting depth limit reached");
            bail!(CodecError::DepthLimit {
                depth,
                max: self.config.max_depth,
            });
        }

        self.depth = depth;
        let result = f(self);
        self.depth = depth - 1;
        result
    }

    /// Проверяет заявленный счётчик элементов контейнера.
    ///
    /// `min_elem_size` — минимальный размер одного элемента на проводе
    /// (1 байт для списка, 2 для пары ключ-значение).
    pub fn check_count(
        &self,
        count: u64,
        min_elem_size: u64,
        what: &'static str,
    ) -> MsgResult<usize> {
        if count > self.config.max_collection_len {
            warn!(
                what,
                count,
                limit = self.config.max_collection_len,
                "declared count rejected"
            );
            bail!(CodecError::SizeLimit {
                what,
                size: count,
                limit: self.config.max_collection_len,
            });
        }
        if let Some(remaining) = self.remaining() {
            if count.saturating_mul(min_elem_size) > remaining {
                warn!(what, count, remaining, "declared count exceeds input");
                bail!(CodecError::CountExceedsInput { count, remaining });
            }
        }
        usize::try_from(count).map_err(|_| {
            CodecError::SizeLimit {
                what,
                size: count,
                limit: usize::MAX as u64,
            }
            .into()
        })
    }

    /// Ёмкость для предварительного выделения под `count` элементов.
    pub fn capacity(
        &self,
        count: usize,
    ) -> usize {
        count.min(self.config.preallocate_limit)
    }

    pub fn read_struct_begin(&mut self) -> MsgResult<StructMarker> {
        self.proto.read_struct_begin(&mut self.reader)
    }

    pub fn read_struct_end(&mut self) -> MsgResult<()> {
        self.proto.read_struct_end(&mut self.reader)
    }

    pub fn read_field_begin(&mut self) -> MsgResult<FieldMarker> {
        self.proto.read_field_begin(&mut self.reader)
    }

    pub fn read_map_begin(&mut self) -> MsgResult<MapMarker> {
        self.proto.read_map_begin(&mut self.reader)
    }

    pub fn read_list_begin(&mut self) -> MsgResult<ListMarker> {
        self.proto.read_list_begin(&mut self.reader)
    }

    pub fn read_set_begin(&mut self) -> MsgResult<SetMarker> {
        self.proto.read_set_begin(&mut self.reader)
    }

    pub fn read_bool(&mut self) -> MsgResult<bool> {
        self.proto.read_bool(&mut self.reader)
    }

    pub fn read_byte(&mut self) -> MsgResult<u8> {
        self.proto.read_byte(&mut self.reader)
    }

    pub fn read_i16(&mut self) -> MsgResult<i16> {
        self.proto.read_i16(&mut self.reader)
    }

    pub fn read_i32(&mut self) -> MsgResult<i32> {
        self.proto.read_i32(&mut self.reader)
    }

    pub fn read_i64(&mut self) -> MsgResult<i64> {
        self.proto.read_i64(&mut self.reader)
    }

    pub fn read_f32(&mut self) -> MsgResult<f32> {
        self.proto.read_f32(&mut self.reader)
    }

    pub fn read_f64(&mut self) -> MsgResult<f64> {
        self.proto.read_f64(&mut self.reader)
    }

    pub fn read_binary(&mut self) -> MsgResult<Vec<u8>> {
        self.proto.read_binary(&mut self.reader)
    }

    pub fn read_string(&mut self) -> MsgResult<String> {
        self.proto.read_string(&mut self.reader)
    }
}

/// Читает тело структуры в новое значение `T`.
pub fn read_record<T, R, P>(dec: &mut Decoder<'_, R, P>) -> MsgResult<T>
where
    T: Record,
    R: Read + ?Sized,
    P: Protocol,
{
    let schema = schema_for::<T>()?;

    dec.nested(|dec| {
        dec.read_struct_begin()?;

        let mut value = T::default();
        loop {
            let marker = dec.read_field_begin()?;
            if marker.is_stop() {
                break;
            }

            match schema.get(marker.id) {
                None => {
                    trace!(
                        record = T::NAME,
                        field_id = marker.id,
                        tag = %marker.tag,
                        "skipping unknown field"
                    );
                    skip::skip(dec, marker.tag)?;
                }
                Some(field) if field.tag != marker.tag => {
                    bail!(CodecError::TagMismatch {
                        record: T::NAME,
                        field: field.name,
                        field_id: field.id,
                        expected: field.tag.name(),
                        found: marker.tag.name(),
                    });
                }
                Some(field) => value.decode_field(field.id, dec, field.tag)?,
            }
        }

        dec.read_struct_end()?;
        Ok(value)
    })
}

/// Проверяет тег элементов контейнера против ожидаемого.
pub(crate) fn expect_elem_tag(
    container: &'static str,
    expected: TypeTag,
    found: TypeTag,
) -> MsgResult<()> {
    ensure!(
        expected == found,
        CodecError::ElementTagMismatch {
            container,
            expected: expected.name(),
            found: found.name(),
        }
    );
    Ok(())
}
