use super::format::{format_currency, format_percent, parse_currency, parse_percent};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FieldKind {
    Currency,
    Percent,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FieldState {
    /// Showing the canonical formatted text.
    Idle,
    /// Showing exactly what the user typed.
    Editing,
}

/// Controlled text input bound to a numeric value. While editing, the text is
/// never reformatted; leaving the field restores the canonical rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedField {
    kind: FieldKind,
    state: FieldState,
    text: String,
    value: f64,
}

impl MaskedField {
    pub fn new(kind: FieldKind, value: f64) -> Self {
        Self {
            kind,
            state: FieldState::Idle,
            text: render(kind, value),
            value,
        }
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn state(&self) -> FieldState {
        self.state
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn focus(&mut self) {
        self.state = FieldState::Editing;
    }

    /// Records a keystroke. Returns the new value when the text changed it.
    pub fn input(&mut self, raw: &str) -> Option<f64> {
        self.state = FieldState::Editing;
        self.text = raw.to_string();
        let parsed = match self.kind {
            FieldKind::Currency => Some(parse_currency(raw)),
            FieldKind::Percent => parse_percent(raw),
        };
        if let Some(value) = parsed {
            self.value = value;
        }
        parsed
    }

    pub fn blur(&mut self) {
        self.state = FieldState::Idle;
        self.text = render(self.kind, self.value);
    }

    /// External update, e.g. a derived field. Does not clobber text the user
    /// is still typing.
    pub fn set_value(&mut self, value: f64) {
        self.value = value;
        if self.state == FieldState::Idle {
            self.text = render(self.kind, value);
        }
    }
}

fn render(kind: FieldKind, value: f64) -> String {
    match kind {
        FieldKind::Currency => format_currency(value),
        FieldKind::Percent => format_percent(value),
    }
}
