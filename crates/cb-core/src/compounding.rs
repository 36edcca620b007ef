//! Compounding conventions.

/// How interest is compounded when turning a rate into a growth factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compounding {
    /// Simple interest: `1 + r·t`
    Simple,
    /// Compounded interest: `(1 + r/f)^(f·t)`
    Compounded,
    /// Continuously compounded: `e^(r·t)`
    Continuous,
    /// Simple interest up to the first period, compounded thereafter.
    SimpleThenCompounded,
}

impl std::fmt::Display for Compounding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Compounding::Simple => "simple",
            Compounding::Compounded => "compounded",
            Compounding::Continuous => "continuous",
            Compounding::SimpleThenCompounded => "simple-then-compounded",
        };
        f.write_str(s)
    }
}
