use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    Percentage,
    Absolute,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemeKind {
    Traditional,
    Custom,
}

impl SchemeKind {
    pub fn label(self) -> &'static str {
        match self {
            SchemeKind::Traditional => "Traditional",
            SchemeKind::Custom => "Custom",
        }
    }
}

/// Terms shared by both schemes.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedTerms {
    pub base_value: f64,
    pub annual_rate_pct: f64,
    pub installment_count: u32,
}

/// One scheme's payment structure. Raw shares are percentages (0..=100) in
/// `Percentage` mode and currency amounts in `Absolute` mode.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PaymentScheme {
    pub kind: SchemeKind,
    pub input_mode: InputMode,
    pub initial_raw: f64,
    pub installment_raw: f64,
    pub defer_remainder: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedShares {
    pub initial_pct: f64,
    pub installment_pct: f64,
    pub remainder_pct: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareEquivalent {
    pub percent: f64,
    pub amount: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareEquivalents {
    pub initial: ShareEquivalent,
    pub installments: ShareEquivalent,
    pub remainder: ShareEquivalent,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NpvResult {
    pub monthly_rate: f64,
    pub initial_pct: f64,
    pub installment_pct: f64,
    pub initial_fraction: f64,
    pub installment_fraction: f64,
    pub remainder_fraction: f64,
    pub installment_count: u32,
    pub initial_payment: f64,
    pub installment_pool: f64,
    pub installment_payment: f64,
    pub installments_pv: f64,
    pub remainder_payment: f64,
    pub remainder_period: u32,
    pub remainder_pv: f64,
    pub total_npv: f64,
    pub shares_exceed_total: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemeResult {
    pub kind: SchemeKind,
    pub input_mode: InputMode,
    pub defer_remainder: bool,
    pub shares: NormalizedShares,
    pub equivalents: ShareEquivalents,
    pub warning: bool,
    pub npv: NpvResult,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub terms: SharedTerms,
    pub monthly_rate: f64,
    pub traditional: SchemeResult,
    pub custom: SchemeResult,
    pub npv_difference: f64,
}
