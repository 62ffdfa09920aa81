pub mod post_lifecycle;
pub mod upload;

pub use post_lifecycle::PostLifecycleService;
pub use upload::{ReceivedUpload, UploadService};
