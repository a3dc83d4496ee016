pub mod deferred;
pub mod json_io;
pub mod transport;
