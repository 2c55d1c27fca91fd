//! Output clamping with integral back-solve for anti-windup

/// Which output bound, if any, the raw output reached
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Saturation {
    None,
    Upper,
    Lower,
}

/// A clamped output, plus the replacement integral accumulator
/// when the integral term had to be capped
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Clamped {
    pub output: f64,
    pub saturation: Saturation,
    pub accumulated_error: Option<f64>,
}

/// Clamp `p + i + d` into `[output_min, output_max]`.
///
/// While saturated with a positive integral gain, an integral term that alone
/// would push past the bound is capped by back-solving
/// `accumulated_error = (bound - (p + d)) / gain_i`,
/// so that `gain_i * accumulated_error` exactly reproduces the bound.
/// A back-solved accumulator that would overflow is not applied.
///
/// Returns `None` when `p + i + d` is not a finite number, since a NaN or
/// infinite sum has no meaningful place relative to the bounds.
pub(crate) fn clamp_output(
    p_term: f64,
    i_term: f64,
    d_term: f64,
    gain_i: f64,
    output_min: f64,
    output_max: f64,
) -> Option<Clamped> {
    let raw_output = p_term + i_term + d_term;
    if !raw_output.is_finite() {
        return None;
    }
    let others = p_term + d_term;

    let (output, saturation, headroom) = if raw_output >= output_max {
        let headroom = output_max - others;
        let capped = (gain_i > 0.0 && i_term > headroom).then_some(headroom);
        (output_max, Saturation::Upper, capped)
    } else if raw_output <= output_min {
        let headroom = output_min - others;
        let capped = (gain_i > 0.0 && i_term < headroom).then_some(headroom);
        (output_min, Saturation::Lower, capped)
    } else {
        (raw_output, Saturation::None, None)
    };

    Some(Clamped {
        output,
        saturation,
        accumulated_error: headroom.map(|h| h / gain_i).filter(|a| a.is_finite()),
    })
}
