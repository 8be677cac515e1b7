//! File-based inputs and outputs: the pix key directory loader and the
//! replay transport.

pub mod csv;
pub mod replay;
