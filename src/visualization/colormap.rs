use super::scene::Color;

// Viridis sampled at nine evenly spaced stops
const VIRIDIS: [[f32; 3]; 9] = [
    [0.267, 0.005, 0.329],
    [0.283, 0.141, 0.458],
    [0.254, 0.265, 0.530],
    [0.207, 0.372, 0.553],
    [0.164, 0.471, 0.558],
    [0.128, 0.567, 0.551],
    [0.135, 0.659, 0.518],
    [0.478, 0.821, 0.318],
    [0.993, 0.906, 0.144],
];

/// Map `t` in [0, 1] onto the viridis colormap (clamped)
pub fn viridis(t: f32) -> Color {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (VIRIDIS.len() - 1) as f32;
    let lo = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    let frac = scaled - lo as f32;
    let a = VIRIDIS[lo];
    let b = VIRIDIS[lo + 1];
    Color::new(
        a[0] + (b[0] - a[0]) * frac,
        a[1] + (b[1] - a[1]) * frac,
        a[2] + (b[2] - a[2]) * frac,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        let low = viridis(0.0);
        let high = viridis(1.0);
        assert_eq!((low.r, low.g, low.b), (0.267, 0.005, 0.329));
        assert_eq!((high.r, high.g, high.b), (0.993, 0.906, 0.144));
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        assert_eq!(viridis(-3.0), viridis(0.0));
        assert_eq!(viridis(7.0), viridis(1.0));
        assert_eq!(viridis(f32::NAN), viridis(0.0));
    }
}
