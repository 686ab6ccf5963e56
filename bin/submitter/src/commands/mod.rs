//! Subcommands for the submitter.

mod submit;
pub use submit::SubmitCommand;

mod status;
pub use status::StatusCommand;
