//! Кодирование записей.
//!
//! Поля пишутся в порядке объявления; поле с нулевым/пустым значением
//! пропускается целиком, это единственный способ передать значение по
//! умолчанию. После полей пишется маркер конца.

use std::io::Write;

use msglib_error::{MsgResult, ResultExt};

use crate::{
    protocol::{FieldMarker, ListMarker, MapMarker, Protocol, SetMarker, StructMarker},
    schema::{schema_for, Record},
};

/// Состояние одного вызова кодирования: приёмник и протокол.
pub struct Encoder<'a, W: Write + ?Sized, P: Protocol> {
    writer: &'a mut W,
    proto: &'a mut P,
}

impl<'a, W: Write + ?Sized, P: Protocol> Encoder<'a, W, P> {
    pub fn new(
        writer: &'a mut W,
        proto: &'a mut P,
    ) -> Self {
        Self { writer, proto }
    }

    pub fn write_struct_begin(
        &mut self,
        marker: &StructMarker,
    ) -> MsgResult<()> {
        self.proto.write_struct_begin(self.writer, marker)
    }

    pub fn write_struct_end(&mut self) -> MsgResult<()> {
        self.proto.write_struct_end(self.writer)
    }

    pub fn write_field_begin(
        &mut self,
        marker: &FieldMarker,
    ) -> MsgResult<()> {
        self.proto.write_field_begin(self.writer, marker)
    }

    pub fn write_field_stop(&mut self) -> MsgResult<()> {
        self.proto.write_field_stop(self.writer)
    }

    pub fn write_map_begin(
        &mut self,
        marker: &MapMarker,
    ) -> MsgResult<()> {
        self.proto.write_map_begin(self.writer, marker)
    }

    pub fn write_list_begin(
        &mut self,
        marker: &ListMarker,
    ) -> MsgResult<()> {
        self.proto.write_list_begin(self.writer, marker)
    }

    pub fn write_set_begin(
        &mut self,
        marker: &SetMarker,
    ) -> MsgResult<()> {
        self.proto.write_set_begin(self.writer, marker)
    }

    pub fn write_bool(
        &mut self,
        value: bool,
    ) -> MsgResult<()> {
        self.proto.write_bool(self.writer, value)
    }

    pub fn write_byte(
        &mut self,
        value: u8,
    ) -> MsgResult<()> {
        self.proto.write_byte(self.writer, value)
    }

    pub fn write_i16(
        &mut self,
        value: i16,
    ) -> MsgResult<()> {
        self.proto.write_i16(self.writer, value)
    }

    pub fn write_i32(
        &mut self,
        value: i32,
    ) -> MsgResult<()> {
        self.proto.write_i32(self.writer, value)
    }

    pub fn write_i64(
        &mut self,
        value: i64,
    ) -> MsgResult<()> {
        self.proto.write_i64(self.writer, value)
    }

    pub fn write_f32(
        &mut self,
        value: f32,
    ) -> MsgResult<()> {
        self.proto.write_f32(self.writer, value)
    }

    pub fn write_f64(
        &mut self,
        value: f64,
    ) -> MsgResult<()> {
        self.proto.write_f64(self.writer, value)
    }

    pub fn write_binary(
        &mut self,
        value: &[u8],
    ) -> MsgResult<()> {
        self.proto.write_binary(self.writer, value)
    }

    pub fn write_string(
        &mut self,
        value: &str,
    ) -> MsgResult<()> {
        self.proto.write_string(self.writer, value)
    }
}

/// Записывает тело структуры: поля по схеме `T` и маркер конца.
pub fn write_record<T, W, P>(
    enc: &mut Encoder<'_, W, P>,
    value: &T,
) -> MsgResult<()>
where
    T: Record,
    W: Write + ?Sized,
    P: Protocol,
{
    let schema = schema_for::<T>()?;

    enc.write_struct_begin(&StructMarker { name: T::NAME })?;
    for field in schema.fields() {
        if value.is_field_empty(field.id) {
            continue;
        }

        enc.write_field_begin(&FieldMarker::new(field.name, field.tag, field.id))?;
        value
            .encode_field(field.id, enc, field.tag)
            .with_context(|| format!("Failed to encode {}.{}", T::NAME, field.name))?;
    }
    enc.write_field_stop()?;
    enc.write_struct_end()
}
