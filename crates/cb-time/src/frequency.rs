//! `Frequency`: how often coupons or compounding events recur.

/// Event / payment frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    /// No events; used with simple and continuous compounding.
    NoFrequency,
    /// Once (maturity only).
    Once,
    /// Once per year.
    Annual,
    /// Twice per year.
    Semiannual,
    /// Every fourth month.
    EveryFourthMonth,
    /// Four times per year.
    Quarterly,
    /// Every second month.
    Bimonthly,
    /// Twelve times per year.
    Monthly,
}

impl Frequency {
    /// Number of periods per year, `None` for `NoFrequency`.
    pub fn periods_per_year(&self) -> Option<u32> {
        match self {
            Frequency::NoFrequency => None,
            Frequency::Once => Some(0),
            Frequency::Annual => Some(1),
            Frequency::Semiannual => Some(2),
            Frequency::EveryFourthMonth => Some(3),
            Frequency::Quarterly => Some(4),
            Frequency::Bimonthly => Some(6),
            Frequency::Monthly => Some(12),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Frequency::NoFrequency => "No-Frequency",
            Frequency::Once => "Once",
            Frequency::Annual => "Annual",
            Frequency::Semiannual => "Semiannual",
            Frequency::EveryFourthMonth => "Every-Fourth-Month",
            Frequency::Quarterly => "Quarterly",
            Frequency::Bimonthly => "Bimonthly",
            Frequency::Monthly => "Monthly",
        };
        write!(f, "{s}")
    }
}
