pub mod accel;
pub mod bench;
pub mod config;
pub mod consts;
pub mod error;
pub mod filters;
pub mod frame;
pub mod io;
pub mod quality;
