pub mod ccd;
pub mod cloud_save;
pub mod config;
pub mod fetch;
pub mod gsh;
pub mod remote_config;
