mod common;

use approx::assert_abs_diff_eq;
use edgebench_core::error::EdgeBenchError;
use edgebench_core::frame::GreyImage;
use edgebench_core::quality::psnr::{interior_squared_error, mean_squared_error};
use edgebench_core::quality::{psnr, MseDivisor, PsnrConfig, QualityScore};

use common::textured_image;

/// 4x4 frame with a single interior pixel offset by 16.
fn one_off_pair() -> (GreyImage, GreyImage) {
    let test = GreyImage::zeros(4).unwrap();
    let mut golden = GreyImage::zeros(4).unwrap();
    golden.set(1, 2, 16);
    (test, golden)
}

#[test]
fn test_identical_images() {
    let img = textured_image(16);
    let score = psnr(&img, &img, &PsnrConfig::default()).unwrap();
    assert_eq!(score, QualityScore::Identical);
    assert!(score.is_identical());
    assert!(score.decibels().is_none());
    assert!(score.meets(1000.0));
}

#[test]
fn test_known_value_full_frame() {
    // sum = 256, MSE = 256 / 16 = 16, PSNR = 10 log10(65536 / 16)
    let (test, golden) = one_off_pair();
    let score = psnr(&test, &golden, &PsnrConfig::default()).unwrap();
    let db = score.decibels().unwrap();
    assert_abs_diff_eq!(db, 10.0 * 4096f64.log10(), epsilon = 1e-9);
    assert_abs_diff_eq!(db, 36.1236, epsilon = 1e-4);
}

#[test]
fn test_known_value_interior_divisor() {
    // MSE = 256 / 4 = 64, PSNR = 10 log10(1024)
    let (test, golden) = one_off_pair();
    let config = PsnrConfig {
        divisor: MseDivisor::Interior,
        ..PsnrConfig::default()
    };
    let db = psnr(&test, &golden, &config).unwrap().decibels().unwrap();
    assert_abs_diff_eq!(db, 30.103, epsilon = 1e-3);
}

#[test]
fn test_peak_constant_override() {
    let (test, golden) = one_off_pair();
    let config = PsnrConfig {
        peak_squared: 255.0 * 255.0,
        ..PsnrConfig::default()
    };
    let db = psnr(&test, &golden, &config).unwrap().decibels().unwrap();
    assert_abs_diff_eq!(db, 10.0 * (65025.0f64 / 16.0).log10(), epsilon = 1e-9);
}

#[test]
fn test_symmetric() {
    let a = textured_image(16);
    let b = GreyImage::from_fn(16, |(r, c)| a.get(r, c).wrapping_add((r * c % 7) as u8)).unwrap();
    let config = PsnrConfig::default();
    assert_eq!(
        psnr(&a, &b, &config).unwrap(),
        psnr(&b, &a, &config).unwrap()
    );
}

#[test]
fn test_border_is_ignored() {
    let a = textured_image(8);
    let mut b = a.clone();
    for i in 0..8 {
        b.set(0, i, a.get(0, i) ^ 0xff);
        b.set(7, i, a.get(7, i) ^ 0xff);
        b.set(i, 0, a.get(i, 0) ^ 0xff);
        b.set(i, 7, a.get(i, 7) ^ 0xff);
    }
    assert_eq!(interior_squared_error(&a, &b).unwrap(), 0);
    assert!(psnr(&a, &b, &PsnrConfig::default()).unwrap().is_identical());
}

#[test]
fn test_larger_error_lowers_score() {
    let base = GreyImage::zeros(10).unwrap();
    let near = GreyImage::from_fn(10, |(r, c)| if r == 4 && c == 4 { 8 } else { 0 }).unwrap();
    let far = GreyImage::from_fn(10, |(r, c)| if r == 4 && c == 4 { 80 } else { 0 }).unwrap();
    let config = PsnrConfig::default();
    let near_db = psnr(&near, &base, &config).unwrap().decibels().unwrap();
    let far_db = psnr(&far, &base, &config).unwrap().decibels().unwrap();
    assert!(near_db > far_db);
}

#[test]
fn test_mse_divisors() {
    let (test, golden) = one_off_pair();
    assert_abs_diff_eq!(
        mean_squared_error(&test, &golden, MseDivisor::FullFrame).unwrap(),
        16.0
    );
    assert_abs_diff_eq!(
        mean_squared_error(&test, &golden, MseDivisor::Interior).unwrap(),
        64.0
    );
}

#[test]
fn test_dimension_mismatch() {
    let a = GreyImage::zeros(4).unwrap();
    let b = GreyImage::zeros(5).unwrap();
    let err = psnr(&a, &b, &PsnrConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        EdgeBenchError::DimensionMismatch { left: 4, right: 5 }
    ));
}

#[test]
fn test_score_display() {
    assert_eq!(QualityScore::Decibels(36.12359).to_string(), "36.1236 dB");
    assert_eq!(QualityScore::Identical.to_string(), "identical (infinite)");
}

#[test]
fn test_score_serializes() {
    let json = serde_json::to_string(&QualityScore::Decibels(30.0)).unwrap();
    let back: QualityScore = serde_json::from_str(&json).unwrap();
    assert_eq!(back, QualityScore::Decibels(30.0));
}

#[test]
fn test_small_peak_is_rejected() {
    let (test, golden) = one_off_pair();
    let config = PsnrConfig {
        peak_squared: 1.0,
        ..PsnrConfig::default()
    };
    assert!(matches!(
        psnr(&test, &golden, &config),
        Err(EdgeBenchError::Config(_))
    ));
}

#[test]
fn test_worst_case_score_is_non_negative() {
    let black = GreyImage::zeros(6).unwrap();
    let white = GreyImage::filled(6, 255).unwrap();
    let config = PsnrConfig {
        peak_squared: 255.0 * 255.0,
        divisor: MseDivisor::Interior,
    };
    let db = psnr(&black, &white, &config).unwrap().decibels().unwrap();
    assert_abs_diff_eq!(db, 0.0, epsilon = 1e-12);
}
