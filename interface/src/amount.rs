use crate::error::TokenOpError;

/// A validated, non-negative decimal amount, not yet scaled to base units.
///
/// Scaling waits until the mint's decimals are known, so the intent can be
/// validated before any network traffic. Parsing and scaling are pure and
/// float-free: `to_base_units` is exactly `floor(amount * 10^decimals)`
/// everywhere the result fits in a `u64`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Amount {
    units: String,
    frac: String,
    raw: String,
}

impl Amount {
    pub fn parse(raw: &str) -> Result<Self, TokenOpError> {
        let trimmed = raw.trim();
        let invalid = || TokenOpError::InvalidAmount(trimmed.to_string());

        if trimmed.is_empty() || trimmed.starts_with('-') || trimmed.starts_with('+') {
            return Err(invalid());
        }
        let (units, frac) = match trimmed.split_once('.') {
            Some((units, frac)) => (units, frac),
            None => (trimmed, ""),
        };
        if units.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !units.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        Ok(Self {
            units: units.to_string(),
            frac: frac.to_string(),
            raw: trimmed.to_string(),
        })
    }

    /// Scales to base units. Fractional digits beyond `decimals` are dropped,
    /// which is the floor for a non-negative amount.
    pub fn to_base_units(&self, decimals: u8) -> Result<u64, TokenOpError> {
        let invalid = || TokenOpError::InvalidAmount(self.raw.clone());

        let scale = 10u64
            .checked_pow(u32::from(decimals))
            .ok_or_else(invalid)?;
        let units: u64 = if self.units.is_empty() {
            0
        } else {
            self.units.parse().map_err(|_| invalid())?
        };
        let mut value = units.checked_mul(scale).ok_or_else(invalid)?;

        let kept = &self.frac[..self.frac.len().min(usize::from(decimals))];
        if !kept.is_empty() {
            let frac: u64 = kept.parse().map_err(|_| invalid())?;
            let pad = 10u64
                .checked_pow((usize::from(decimals) - kept.len()) as u32)
                .ok_or_else(invalid)?;
            value = value
                .checked_add(frac.checked_mul(pad).ok_or_else(invalid)?)
                .ok_or_else(invalid)?;
        }

        Ok(value)
    }
}

impl core::fmt::Display for Amount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Converts a raw decimal string to base units: `floor(amount * 10^decimals)`.
pub fn to_base_units(raw: &str, decimals: u8) -> Result<u64, TokenOpError> {
    Amount::parse(raw)?.to_base_units(decimals)
}

/// Renders a base-unit amount back as a decimal string for display.
pub fn format_base_units(value: u64, decimals: u8) -> String {
    let Some(scale) = 10u128.checked_pow(u32::from(decimals)) else {
        return value.to_string();
    };
    if decimals == 0 {
        return value.to_string();
    }
    let whole = u128::from(value) / scale;
    let frac = u128::from(value) % scale;
    let rendered = format!("{whole}.{frac:0width$}", width = usize::from(decimals));
    rendered
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}
