pub mod artifact_sink;
pub mod file_intake;
pub mod notification_center;

pub use artifact_sink::{ArtifactSink, DirectorySink, DownloadedArtifact, ARTIFACT_FILE_NAME};
pub use file_intake::{FileIntake, PreviewHandle};
pub use notification_center::NotificationCenter;
