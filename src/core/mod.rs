mod engine;
mod field;
mod format;
mod normalizer;
mod types;

pub use engine::{compare_schemes, compute_npv, evaluate_scheme, monthly_effective_rate};
pub use field::{FieldKind, FieldState, MaskedField};
pub use format::{format_currency, format_percent, format_rate, parse_currency, parse_percent};
pub use normalizer::{coerce_installment_count, equivalents, normalize, shares_exceed_base};
pub use types::{
    ComparisonResult, InputMode, NormalizedShares, NpvResult, PaymentScheme, SchemeKind,
    SchemeResult, ShareEquivalent, ShareEquivalents, SharedTerms,
};
