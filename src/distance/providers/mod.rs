pub mod osrm;

pub use osrm::OsrmProvider;
