pub mod aria2;
pub mod ffmpeg;
pub mod torrent;
