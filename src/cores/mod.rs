//! Core implementations

pub mod io_core;
pub mod sampler_core;
pub mod tee;

pub use io_core::IoCore;
pub use sampler_core::SamplerCore;
pub use tee::Tee;
