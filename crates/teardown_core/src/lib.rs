pub mod core_api;
pub mod document;
pub mod locate;
pub mod tag_codec;
