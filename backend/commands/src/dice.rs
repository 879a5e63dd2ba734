//! Dice parameter parsing and rolling.
//!
//! `NdM` rolls N dice with M sides. N is 1..=10 and M one of
//! [`ALLOWED_SIDES`]. No parameter means `1d6`; a bare `N` means `Nd6`.

use std::fmt;

use rand::Rng;
use thiserror::Error;

pub const ALLOWED_SIDES: [u32; 9] = [2, 3, 4, 6, 8, 10, 12, 20, 100];
pub const MAX_ROLLS: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("invalid dice count `{0}` (expected 1 to {MAX_ROLLS})")]
    Count(String),
    #[error("invalid dice sides `{0}` (expected one of 2, 3, 4, 6, 8, 10, 12, 20, 100)")]
    Sides(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceSpec {
    pub rolls: u32,
    pub sides: u32,
}

impl Default for DiceSpec {
    fn default() -> Self {
        Self { rolls: 1, sides: 6 }
    }
}

impl fmt::Display for DiceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.rolls, self.sides)
    }
}

impl DiceSpec {
    /// Parse `NdM`. Each part only needs a leading integer (`3x` reads as 3).
    pub fn parse(param: &str) -> Result<Self, DiceError> {
        let mut parts = param.split('d');
        let rolls_part = parts.next().unwrap_or_default();
        let sides_part = parts.next();

        let rolls = leading_int(rolls_part)
            .filter(|n| (1..=i64::from(MAX_ROLLS)).contains(n))
            .ok_or_else(|| DiceError::Count(rolls_part.to_string()))?;

        let sides = match sides_part {
            None => 6,
            Some(part) => leading_int(part)
                .filter(|n| ALLOWED_SIDES.iter().any(|s| i64::from(*s) == *n))
                .ok_or_else(|| DiceError::Sides(part.to_string()))?,
        };

        // Both values were range checked above.
        Ok(Self {
            rolls: rolls as u32,
            sides: sides as u32,
        })
    }

    /// Roll every die, results ascending.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<u32> {
        let mut results: Vec<u32> = (0..self.rolls)
            .map(|_| rng.gen_range(1..=self.sides))
            .collect();
        results.sort_unstable();
        results
    }
}

/// Integer at the start of `s`, with optional sign. `None` if there are no digits.
fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    rest[..digits].parse::<i64>().ok().map(|n| sign * n)
}

/// Result of a `dice` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiceOutcome {
    Rolled {
        spec: DiceSpec,
        results: Vec<u32>,
        /// Tokens after the dice parameter, echoed back.
        extra: Vec<String>,
    },
    Invalid(DiceError),
}

/// Parse `args` (first token is the dice parameter) and roll.
pub fn evaluate<R: Rng + ?Sized>(args: &[String], rng: &mut R) -> DiceOutcome {
    let (spec, extra) = match args.split_first() {
        None => (Ok(DiceSpec::default()), &[][..]),
        Some((param, rest)) => (DiceSpec::parse(param), rest),
    };
    match spec {
        Ok(spec) => DiceOutcome::Rolled {
            spec,
            results: spec.roll(rng),
            extra: extra.to_vec(),
        },
        Err(e) => DiceOutcome::Invalid(e),
    }
}
