use super::normalizer::{equivalents, finite_or_zero, normalize, shares_exceed_base};
use super::types::{ComparisonResult, NpvResult, PaymentScheme, SchemeResult, SharedTerms};

fn clamp_fraction(value: f64) -> f64 {
    finite_or_zero(value).clamp(0.0, 1.0)
}

fn raw_monthly_rate(annual_rate_pct: f64) -> f64 {
    (1.0 + annual_rate_pct / 100.0).powf(1.0 / 12.0) - 1.0
}

/// Monthly rate `i` with `(1 + i)^12 = 1 + annual_rate_pct / 100`; 0 when
/// the conversion is not finite.
pub fn monthly_effective_rate(annual_rate_pct: f64) -> f64 {
    finite_or_zero(raw_monthly_rate(annual_rate_pct))
}

/// Present value of an initial payment at t = 0, `installment_count` equal
/// monthly installments at t = 1..=n and a remainder at t = n (or n + 1 when
/// deferred).
///
/// The remainder fraction is the complement of the first two, floored at 0;
/// shares above 100% are not renormalized. Every returned amount is finite.
pub fn compute_npv(
    base_value: f64,
    annual_rate_pct: f64,
    initial_pct: f64,
    installment_pct: f64,
    installment_count: u32,
    defer_remainder: bool,
) -> NpvResult {
    let base_value = finite_or_zero(base_value);
    let p1 = clamp_fraction(initial_pct / 100.0);
    let pm = clamp_fraction(installment_pct / 100.0);
    let pr = clamp_fraction(1.0 - (p1 + pm));
    let i = raw_monthly_rate(annual_rate_pct);
    let growth = 1.0 + i;

    let initial_payment = base_value * p1;
    let installment_pool = base_value * pm;
    let installment_payment = if installment_count > 0 {
        installment_pool / f64::from(installment_count)
    } else {
        0.0
    };

    let mut installments_pv = 0.0;
    let mut discount = 1.0;
    for _ in 0..installment_count {
        discount *= growth;
        installments_pv += installment_payment / discount;
    }

    let remainder_payment = base_value * pr.max(0.0);
    let remainder_period = installment_count.saturating_add(u32::from(defer_remainder));
    let remainder_pv = if remainder_period > 0 {
        remainder_payment / growth.powf(f64::from(remainder_period))
    } else {
        remainder_payment
    };

    let total_npv = initial_payment + installments_pv + remainder_pv;

    NpvResult {
        monthly_rate: finite_or_zero(i),
        initial_pct: finite_or_zero(initial_pct),
        installment_pct: finite_or_zero(installment_pct),
        initial_fraction: p1,
        installment_fraction: pm,
        remainder_fraction: pr,
        installment_count,
        initial_payment: finite_or_zero(initial_payment),
        installment_pool: finite_or_zero(installment_pool),
        installment_payment: finite_or_zero(installment_payment),
        installments_pv: finite_or_zero(installments_pv),
        remainder_payment: finite_or_zero(remainder_payment),
        remainder_period,
        remainder_pv: finite_or_zero(remainder_pv),
        total_npv: finite_or_zero(total_npv),
        shares_exceed_total: p1 + pm > 1.0,
    }
}

pub fn evaluate_scheme(terms: SharedTerms, scheme: PaymentScheme) -> SchemeResult {
    let shares = normalize(
        terms.base_value,
        scheme.input_mode,
        scheme.initial_raw,
        scheme.installment_raw,
    );
    let warning = shares_exceed_base(
        terms.base_value,
        scheme.input_mode,
        scheme.initial_raw,
        scheme.installment_raw,
    );
    if warning {
        tracing::warn!(
            scheme = scheme.kind.label(),
            initial = scheme.initial_raw,
            installments = scheme.installment_raw,
            "initial payment plus installments exceed the base value; remainder clamped to zero"
        );
    }

    let npv = compute_npv(
        terms.base_value,
        terms.annual_rate_pct,
        shares.initial_pct,
        shares.installment_pct,
        terms.installment_count,
        scheme.defer_remainder,
    );

    SchemeResult {
        kind: scheme.kind,
        input_mode: scheme.input_mode,
        defer_remainder: scheme.defer_remainder,
        shares,
        equivalents: equivalents(
            terms.base_value,
            scheme.input_mode,
            scheme.initial_raw,
            scheme.installment_raw,
            shares,
        ),
        warning,
        npv,
    }
}

/// Evaluates both schemes independently; a positive difference means the
/// traditional scheme has the larger present value.
pub fn compare_schemes(
    terms: SharedTerms,
    traditional: PaymentScheme,
    custom: PaymentScheme,
) -> ComparisonResult {
    let traditional = evaluate_scheme(terms, traditional);
    let custom = evaluate_scheme(terms, custom);
    let npv_difference = finite_or_zero(traditional.npv.total_npv - custom.npv.total_npv);
    tracing::debug!(
        traditional = traditional.npv.total_npv,
        custom = custom.npv.total_npv,
        difference = npv_difference,
        "compared payment schemes"
    );

    ComparisonResult {
        terms,
        monthly_rate: monthly_effective_rate(terms.annual_rate_pct),
        traditional,
        custom,
        npv_difference,
    }
}
