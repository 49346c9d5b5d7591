pub mod defs;

pub use defs::{ApiResponse, CharacterField, Rating, TagPayload, TagResponse, UploadPayload, UploadResponse, WireTag};
