//! Game Server Hosting support for the UGS CLI
//!
//! Lists and downloads the files (logs, crash dumps) stored on game servers.

pub mod client;
pub mod error;
pub mod model;

pub use client::GshClient;
pub use error::{GshError, Result};
pub use model::{
    DEFAULT_FILE_LIMIT, FileServer, FilesListInput, FilesListRequest, ServerFile, parse_date,
    parse_server_id,
};
