//! Repository implementations

mod environment;
mod hosts_file;
mod secrets;

pub use environment::YamlEnvironmentRepository;
pub use hosts_file::TextHostRepository;
pub use secrets::collect_secret_files;
