pub mod client;
pub mod decode;
pub mod error;
pub mod stream;

pub use client::OutletClient;
pub use decode::Utf8Decoder;
pub use error::ClientError;
pub use stream::ChatStream;
