// roomcast-api: async client for the tenant directory/calendar API.

pub mod client;
pub mod error;
pub mod token;
pub mod transport;
pub mod types;

pub use client::DirectoryClient;
pub use error::Error;
pub use token::TokenProvider;
pub use transport::TransportConfig;
pub use types::{Collection, DirectoryUser, EventRecord, RoomResource};
