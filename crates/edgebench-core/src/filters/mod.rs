pub mod convolution;
pub mod sobel;
