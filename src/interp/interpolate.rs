use crate::types::{Color, StyleValue};

/// Interpolation weight of `x` between the stop inputs `lo` and `hi`.
/// Base 1 is linear; any other positive base is exponential.
pub fn weight(base: f64, x: f64, lo: f64, hi: f64) -> f64 {
    let delta = hi - lo;
    if delta == 0.0 {
        return 0.0;
    }

    let y = x - lo;
    if base == 1.0 {
        y / delta
    } else {
        (base.powf(y) - 1.0) / (base.powf(delta) - 1.0)
    }
}

/// Sample a stop sequence at `x`. Stop inputs are assumed non-decreasing;
/// the result clamps to the first and last outputs.
pub fn sample(base: f64, x: f64, stops: &[(f64, StyleValue)]) -> StyleValue {
    let first = &stops[0];
    let last = &stops[stops.len() - 1];

    if x <= first.0 {
        return first.1.clone();
    }
    if x >= last.0 {
        return last.1.clone();
    }

    for i in 0..stops.len() - 1 {
        let (lo, ref below) = stops[i];
        let (hi, ref above) = stops[i + 1];

        if x >= lo && x < hi {
            if hi - lo == 0.0 {
                return above.clone();
            }
            return blend(below, above, weight(base, x, lo, hi));
        }
    }

    last.1.clone()
}

fn blend(below: &StyleValue, above: &StyleValue, t: f64) -> StyleValue {
    match (below, above) {
        (StyleValue::Number(below), StyleValue::Number(above)) => {
            StyleValue::Number(below + t * (above - below))
        }
        (StyleValue::Color(below), StyleValue::Color(above)) => {
            StyleValue::Color(Color::lerp(*below, *above, t))
        }
        _ => above.clone(),
    }
}
