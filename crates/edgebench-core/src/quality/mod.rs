pub mod psnr;

pub use psnr::{psnr, MseDivisor, PsnrConfig, QualityScore};
