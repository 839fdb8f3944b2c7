/// Record codec: encoding, decoding and skipping of values.
pub mod codec;
/// Codec limits loaded from defaults and the environment.
pub mod config;
/// Schema-less decoding into a tag-driven value tree.
pub mod dynamic;
/// Logging setup for binaries (formatting, filters).
pub mod logging;
/// Wire protocol: tags, varints, markers and the binary implementation.
pub mod protocol;
/// Record trait, field schemas and the schema cache.
pub mod schema;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// Entry points for buffers and streams.
pub use codec::{
    decode_struct, decode_struct_with_config, deserialize, deserialize_with_config, encode_struct,
    serialize, serialize_with_config, skip_value, Decoder, Encoder, Wire,
};
/// Codec limits.
pub use config::CodecConfig;
/// Schema-less view of a message.
pub use dynamic::{decode_dynamic, DynValue};
/// Error types and result alias.
pub use msglib_error::{CodecError, ErrorExt, MsgResult, SchemaError, StackError, StatusCode};
/// Protocol and its binary implementation.
pub use protocol::{BinaryProtocol, Protocol, TypeTag};
/// Records and their schemas.
pub use schema::{schema_for, FieldDescriptor, FieldSpec, Record, Schema};
