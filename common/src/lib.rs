pub mod address;
pub mod api;
pub mod serializer;

pub use address::Address;
pub use serializer::Serializer;
