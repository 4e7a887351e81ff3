use std::fmt;

use serde::Serialize;

use crate::core::{
    ComparisonResult, InputMode, SchemeResult, ShareEquivalent, format_currency, format_percent,
    format_rate,
};

/// Values typed into one scheme's inputs, shown in the other unit next to
/// the fields. Absolute-mode percentages are not clamped here.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EnteredDisplay {
    initial: String,
    installments: String,
    remainder: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SchemeDisplay {
    label: &'static str,
    initial: String,
    installments: String,
    remainder: String,
    entered: EnteredDisplay,
    installment_payment: String,
    total_npv: String,
    warning: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ComparisonDisplay {
    base_value: String,
    annual_rate: String,
    monthly_rate: String,
    installment_count: u32,
    traditional: SchemeDisplay,
    custom: SchemeDisplay,
    npv_difference: String,
    verdict: &'static str,
}

fn share_line(percent: f64, amount: f64) -> String {
    format!("{} · {}", format_percent(percent), format_currency(amount))
}

fn entered_line(share: &ShareEquivalent) -> String {
    share_line(share.percent, share.amount)
}

fn warning_message(scheme: &SchemeResult) -> Option<String> {
    if !scheme.warning {
        return None;
    }
    let label = scheme.kind.label();
    Some(match scheme.input_mode {
        InputMode::Percentage => format!(
            "{label}: initial % plus installments % exceeds 100%; the remainder is clamped to zero."
        ),
        InputMode::Absolute => format!(
            "{label}: initial payment plus installments exceeds the base value; the remainder is clamped to zero."
        ),
    })
}

// Result rows use the clamped shares and the amounts the engine discounted.
fn scheme_display(scheme: &SchemeResult) -> SchemeDisplay {
    let shares = &scheme.shares;
    let npv = &scheme.npv;
    SchemeDisplay {
        label: scheme.kind.label(),
        initial: share_line(shares.initial_pct, npv.initial_payment),
        installments: share_line(shares.installment_pct, npv.installment_pool),
        remainder: share_line(shares.remainder_pct, npv.remainder_payment),
        entered: EnteredDisplay {
            initial: entered_line(&scheme.equivalents.initial),
            installments: entered_line(&scheme.equivalents.installments),
            remainder: entered_line(&scheme.equivalents.remainder),
        },
        installment_payment: format_currency(npv.installment_payment),
        total_npv: format_currency(npv.total_npv),
        warning: warning_message(scheme),
    }
}

fn verdict(npv_difference: f64) -> &'static str {
    if npv_difference > 0.0 {
        "Traditional has the higher present value"
    } else if npv_difference < 0.0 {
        "Custom has the higher present value"
    } else {
        "Both schemes have the same present value"
    }
}

pub(crate) fn build_display(comparison: &ComparisonResult) -> ComparisonDisplay {
    ComparisonDisplay {
        base_value: format_currency(comparison.terms.base_value),
        annual_rate: format_percent(comparison.terms.annual_rate_pct),
        monthly_rate: format_rate(comparison.monthly_rate),
        installment_count: comparison.terms.installment_count,
        traditional: scheme_display(&comparison.traditional),
        custom: scheme_display(&comparison.custom),
        npv_difference: format_currency(comparison.npv_difference),
        verdict: verdict(comparison.npv_difference),
    }
}

struct Report<'a> {
    comparison: &'a ComparisonResult,
    display: ComparisonDisplay,
}

fn write_scheme(
    f: &mut fmt::Formatter<'_>,
    scheme: &SchemeResult,
    display: &SchemeDisplay,
) -> fmt::Result {
    let mode = match scheme.input_mode {
        InputMode::Percentage => "percentages",
        InputMode::Absolute => "amounts",
    };
    let deferred = if scheme.defer_remainder {
        " (deferred)"
    } else {
        ""
    };
    writeln!(f, "{} (entered as {mode})", display.label)?;
    writeln!(f, "  Initial payment        {}", display.initial)?;
    writeln!(f, "  Installments           {}", display.installments)?;
    writeln!(f, "  Remainder              {}", display.remainder)?;
    writeln!(
        f,
        "  Remainder paid at      month {}{deferred}",
        scheme.npv.remainder_period
    )?;
    writeln!(f, "  Per installment        {}", display.installment_payment)?;
    writeln!(f, "  NPV                    {}", display.total_npv)?;
    if let Some(warning) = &display.warning {
        writeln!(f, "  Warning: {warning}")?;
    }
    Ok(())
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display = &self.display;
        writeln!(f, "Base value             {}", display.base_value)?;
        writeln!(f, "Annual discount rate   {}", display.annual_rate)?;
        writeln!(f, "Monthly effective rate {}", display.monthly_rate)?;
        writeln!(f, "Installments           {}", display.installment_count)?;
        writeln!(f)?;
        write_scheme(f, &self.comparison.traditional, &display.traditional)?;
        writeln!(f)?;
        write_scheme(f, &self.comparison.custom, &display.custom)?;
        writeln!(f)?;
        writeln!(
            f,
            "NPV difference (Traditional - Custom) {}",
            display.npv_difference
        )?;
        writeln!(f, "{}", display.verdict)
    }
}

/// Plain-text comparison for the command line.
pub(crate) fn render_report(comparison: &ComparisonResult) -> String {
    Report {
        comparison,
        display: build_display(comparison),
    }
    .to_string()
}
