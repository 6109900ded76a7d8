pub mod notification;
pub mod outcome;
pub mod request_state;
pub mod selected_file;

pub use notification::{Notification, Severity};
pub use outcome::{escape_html, ExtractResponse, VerificationOutcome};
pub use request_state::RequestState;
pub use selected_file::SelectedFile;
