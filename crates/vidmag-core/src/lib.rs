pub mod analysis;
pub mod color;
pub mod consts;
pub mod container;
pub mod error;
pub mod frame;
pub mod io;
pub mod pipeline;
pub mod roi;
pub mod spatial;
pub mod temporal;
