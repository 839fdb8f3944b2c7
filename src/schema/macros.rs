/// Объявляет структуру-запись и генерирует для неё [`Record`] и [`Wire`].
///
/// Поле с `=> id` сериализуется под этим id; `=> id set` дополнительно
/// передаёт контейнер как множество (например, `HashMap<K, bool>`).
/// Поля без id не сериализуются и при декодировании остаются значением
/// по умолчанию. Тип обязан реализовать `Default`.
///
/// ```
/// use std::collections::HashMap;
///
/// use msglib::record;
///
/// record! {
///     #[derive(Debug, Default, PartialEq)]
///     pub struct Presence {
///         pub user: String => 1,
///         pub online: HashMap<String, bool> => 2 set,
///         pub cached: bool,
///     }
/// }
///
/// let mut online = HashMap::new();
/// online.insert("alice".to_string(), true);
/// let value = Presence { user: "bob".into(), online, cached: true };
///
/// let bytes = msglib::serialize(&value).unwrap();
/// let back: Presence = msglib::deserialize(&bytes).unwrap();
/// assert_eq!(back.user, "bob");
/// assert!(!back.cached);
/// ```
///
/// [`Record`]: crate::schema::Record
/// [`Wire`]: crate::codec::Wire
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $fname:ident : $fty:ty $(=> $id:literal $($set:ident)?)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $fname: $fty,
            )*
        }

        impl $crate::schema::Record for $name {
            const NAME: &'static str = ::core::stringify!($name);

            fn fields() -> ::std::vec::Vec<$crate::schema::FieldSpec> {
                #[allow(unused_mut)]
                let mut specs = ::std::vec::Vec::new();
                $($(
                    specs.push($crate::schema::FieldSpec::new(
                        $id,
                        ::core::stringify!($fname),
                        <$fty as $crate::codec::Wire>::TAG,
                        $crate::__record_set_flag!($($set)?),
                    ));
                )?)*
                specs
            }

            #[allow(unused_variables)]
            fn is_field_empty(
                &self,
                id: u32,
            ) -> bool {
                $($(
                    if id == $id {
                        return $crate::codec::Wire::is_empty_value(&self.$fname);
                    }
                )?)*
                true
            }

            #[allow(unused_variables)]
            fn encode_field<W: ::std::io::Write + ?Sized, P: $crate::protocol::Protocol>(
                &self,
                id: u32,
                enc: &mut $crate::codec::Encoder<'_, W, P>,
                tag: $crate::protocol::TypeTag,
            ) -> $crate::MsgResult<()> {
                $($(
                    if id == $id {
                        return $crate::codec::Wire::encode(&self.$fname, enc, tag);
                    }
                )?)*
                ::core::result::Result::Err($crate::StackError::from(
                    $crate::CodecError::UnknownField {
                        record: <Self as $crate::schema::Record>::NAME,
                        field_id: id,
                    },
                ))
            }

            #[allow(unused_variables)]
            fn decode_field<R: ::std::io::Read + ?Sized, P: $crate::protocol::Protocol>(
                &mut self,
                id: u32,
                dec: &mut $crate::codec::Decoder<'_, R, P>,
                tag: $crate::protocol::TypeTag,
            ) -> $crate::MsgResult<()> {
                $($(
                    if id == $id {
                        self.$fname = <$fty as $crate::codec::Wire>::decode(dec, tag)?;
                        return ::core::result::Result::Ok(());
                    }
                )?)*
                ::core::result::Result::Err($crate::StackError::from(
                    $crate::CodecError::UnknownField {
                        record: <Self as $crate::schema::Record>::NAME,
                        field_id: id,
                    },
                ))
            }
        }

        $crate::impl_wire_for_record!($name);
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __record_set_flag {
    () => {
        false
    };
    (set) => {
        true
    };
}

/// Реализует [`Wire`](crate::codec::Wire) для типа с ручной реализацией
/// [`Record`](crate::schema::Record), чтобы его можно было вкладывать в
/// другие записи и контейнеры.
#[macro_export]
macro_rules! impl_wire_for_record {
    ($name:ty) => {
        impl $crate::codec::Wire for $name {
            const TAG: $crate::protocol::TypeTag = $crate::protocol::TypeTag::Struct;

            fn is_empty_value(&self) -> bool {
                false
            }

            fn encode<W: ::std::io::Write + ?Sized, P: $crate::protocol::Protocol>(
                &self,
                enc: &mut $crate::codec::Encoder<'_, W, P>,
                _tag: $crate::protocol::TypeTag,
            ) -> $crate::MsgResult<()> {
                $crate::codec::encode::write_record(enc, self)
            }

            fn decode<R: ::std::io::Read + ?Sized, P: $crate::protocol::Protocol>(
                dec: &mut $crate::codec::Decoder<'_, R, P>,
                _tag: $crate::protocol::TypeTag,
            ) -> $crate::MsgResult<Self> {
                $crate::codec::decode::read_record(dec)
            }
        }
    };
}
