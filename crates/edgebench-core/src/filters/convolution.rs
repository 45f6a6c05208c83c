use crate::frame::GreyImage;

/// A 3x3 signed integer operator, indexed `[row][col]`.
pub type Operator = [[i32; 3]; 3];

/// Weighted sum of a 3x3 patch against an operator.
pub fn apply_operator(patch: &[[i32; 3]; 3], operator: &Operator) -> i32 {
    patch
        .iter()
        .flatten()
        .zip(operator.iter().flatten())
        .map(|(p, w)| p * w)
        .sum()
}

/// Convolve the 3x3 neighbourhood centred on `(row, col)` with `operator`.
///
/// The caller guarantees an interior coordinate
/// (`1 <= row, col <= side - 2`); filters enforce this through their
/// iteration range, so the check here is debug-only.
pub fn convolve3x3(image: &GreyImage, row: usize, col: usize, operator: &Operator) -> i32 {
    debug_assert!(
        image.interior().contains(&row) && image.interior().contains(&col),
        "convolve3x3 called on border pixel ({row}, {col})"
    );
    apply_operator(&image.neighborhood(row, col), operator)
}
