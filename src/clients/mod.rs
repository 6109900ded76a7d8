pub mod watermark_client;

pub use watermark_client::{HealthStatus, WatermarkClient};
