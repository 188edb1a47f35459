pub mod conversion;
pub mod downloads;
pub mod torrents;
