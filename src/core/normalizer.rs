use super::types::{InputMode, NormalizedShares, ShareEquivalent, ShareEquivalents};

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

fn clamp_pct(value: f64) -> f64 {
    finite_or_zero(value).clamp(0.0, 100.0)
}

fn amount_to_pct(amount: f64, base_value: f64) -> f64 {
    if base_value > 0.0 {
        clamp_pct(finite_or_zero(amount) / base_value * 100.0)
    } else {
        0.0
    }
}

/// Converts raw share inputs into percentages of the base value, each in
/// `0..=100`. The remainder is the clamped complement of the first two.
pub fn normalize(
    base_value: f64,
    input_mode: InputMode,
    initial_raw: f64,
    installment_raw: f64,
) -> NormalizedShares {
    let base_value = finite_or_zero(base_value);
    let (initial_pct, installment_pct) = match input_mode {
        InputMode::Percentage => (clamp_pct(initial_raw), clamp_pct(installment_raw)),
        InputMode::Absolute => (
            amount_to_pct(initial_raw, base_value),
            amount_to_pct(installment_raw, base_value),
        ),
    };
    let remainder_pct = clamp_pct(100.0 - (initial_pct + installment_pct));

    NormalizedShares {
        initial_pct,
        installment_pct,
        remainder_pct,
    }
}

/// Advisory over-allocation check: the first two shares take more than the
/// whole base value. Never blocks evaluation.
pub fn shares_exceed_base(
    base_value: f64,
    input_mode: InputMode,
    initial_raw: f64,
    installment_raw: f64,
) -> bool {
    match input_mode {
        InputMode::Percentage => clamp_pct(initial_raw) + clamp_pct(installment_raw) > 100.0,
        InputMode::Absolute => {
            finite_or_zero(initial_raw) + finite_or_zero(installment_raw)
                > finite_or_zero(base_value)
        }
    }
}

/// Each component expressed in the unit the user is not typing in.
///
/// In absolute mode the percentages are not clamped, so an over-allocated
/// scheme shows shares above 100%; a zero base value divides by one.
pub fn equivalents(
    base_value: f64,
    input_mode: InputMode,
    initial_raw: f64,
    installment_raw: f64,
    shares: NormalizedShares,
) -> ShareEquivalents {
    let base_value = finite_or_zero(base_value);
    let equivalent = |percent: f64, amount: f64| ShareEquivalent {
        percent: finite_or_zero(percent),
        amount: finite_or_zero(amount),
    };

    match input_mode {
        InputMode::Percentage => {
            let amount_of = |pct: f64| base_value * pct / 100.0;
            ShareEquivalents {
                initial: equivalent(shares.initial_pct, amount_of(shares.initial_pct)),
                installments: equivalent(
                    shares.installment_pct,
                    amount_of(shares.installment_pct),
                ),
                remainder: equivalent(shares.remainder_pct, amount_of(shares.remainder_pct)),
            }
        }
        InputMode::Absolute => {
            let initial = finite_or_zero(initial_raw);
            let installments = finite_or_zero(installment_raw);
            let divisor = if base_value != 0.0 { base_value } else { 1.0 };
            let allocated = initial + installments;
            ShareEquivalents {
                initial: equivalent(initial / divisor * 100.0, initial),
                installments: equivalent(installments / divisor * 100.0, installments),
                remainder: equivalent(
                    (100.0 - allocated / divisor * 100.0).max(0.0),
                    (base_value - allocated).max(0.0),
                ),
            }
        }
    }
}

/// Floors a raw installment count; negative or non-finite input becomes 0.
pub fn coerce_installment_count(raw: f64) -> u32 {
    if !raw.is_finite() || raw <= 0.0 {
        return 0;
    }
    let floored = raw.floor();
    if floored >= u32::MAX as f64 {
        u32::MAX
    } else {
        floored as u32
    }
}
