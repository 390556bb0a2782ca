pub mod entry;
pub mod hash;
pub mod media;
pub mod metadata;
