use utoipa::OpenApi;
use crate::common::response::AvailabilityResponse;
use crate::infrastructure::aria2::DownloadView;
use crate::infrastructure::torrent::TorrentView;
use crate::modules::conversion::dto::{ConvertRequest, JobIdRequest};
use crate::modules::conversion::model::{ConversionJob, JobStatus};
use crate::modules::downloads::dto::{AddDownloadRequest, AddDownloadResponse, GidRequest};
use crate::modules::torrents::dto::{MagnetRequest, TorrentIdRequest};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::conversion::handler::ffmpeg_status,
        crate::modules::conversion::handler::convert,
        crate::modules::conversion::handler::queue,
        crate::modules::conversion::handler::cancel,
        crate::modules::conversion::handler::remove,
        crate::modules::downloads::handler::aria2_status,
        crate::modules::downloads::handler::add_download,
        crate::modules::downloads::handler::list_downloads,
        crate::modules::downloads::handler::pause_download,
        crate::modules::downloads::handler::resume_download,
        crate::modules::downloads::handler::remove_download,
        crate::modules::torrents::handler::list_torrents,
        crate::modules::torrents::handler::add_torrent,
        crate::modules::torrents::handler::remove_torrent,
        crate::modules::torrents::handler::pause_torrent,
        crate::modules::torrents::handler::resume_torrent,
    ),
    components(
        schemas(
            AvailabilityResponse,
            ConvertRequest, JobIdRequest, ConversionJob, JobStatus,
            AddDownloadRequest, AddDownloadResponse, GidRequest, DownloadView,
            MagnetRequest, TorrentIdRequest, TorrentView,
        )
    ),
    tags(
        (name = "Conversions", description = "Media transcoding jobs"),
        (name = "Downloads", description = "aria2 remote downloads"),
        (name = "Torrents", description = "Magnet link management")
    )
)]
pub struct ApiDoc;
