/// Pearson correlation coefficient over paired observations
///
/// Uses the single-pass sum form:
///
/// ```text
/// r = (n·Σxy − Σx·Σy) / sqrt((n·Σx² − (Σx)²) · (n·Σy² − (Σy)²))
/// ```
///
/// Returns 0.0 when the denominator is zero, which covers an empty input, a single
/// pair, and a series with no variance. Otherwise the result lies in [-1.0, 1.0] up
/// to floating point rounding.
pub fn pearson(pairs: &[(f64, f64)]) -> f64 {
    let n = pairs.len() as f64;

    let (sum_x, sum_y, sum_x_sq, sum_y_sq, sum_xy) = pairs.iter().fold(
        (0.0, 0.0, 0.0, 0.0, 0.0),
        |(sx, sy, sxx, syy, sxy), &(x, y)| (sx + x, sy + y, sxx + x * x, syy + y * y, sxy + x * y),
    );

    let numerator = n * sum_xy - sum_x * sum_y;
    let denominator =
        ((n * sum_x_sq - sum_x * sum_x) * (n * sum_y_sq - sum_y * sum_y)).sqrt();

    if denominator == 0.0 {
        return 0.0;
    }

    numerator / denominator
}
