pub mod dread_band;

pub use dread_band::DreadBand;
