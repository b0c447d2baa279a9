use std::fmt;

/// Named wildcard that can appear in an output path template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Placeholder {
    Date,
    Time,
    CompanyName,
    ProductName,
    BundleIdentifier,
    BundleVersion,
    BuildNumber,
    BuildTarget,
}

impl Placeholder {
    pub const ALL: [Placeholder; 8] = [
        Placeholder::Date,
        Placeholder::Time,
        Placeholder::CompanyName,
        Placeholder::ProductName,
        Placeholder::BundleIdentifier,
        Placeholder::BundleVersion,
        Placeholder::BuildNumber,
        Placeholder::BuildTarget,
    ];

    /// Literal token as written in a template, e.g. `<ProductName>`
    pub fn token(self) -> &'static str {
        match self {
            Placeholder::Date => "<Date>",
            Placeholder::Time => "<Time>",
            Placeholder::CompanyName => "<CompanyName>",
            Placeholder::ProductName => "<ProductName>",
            Placeholder::BundleIdentifier => "<BundleIdentifier>",
            Placeholder::BundleVersion => "<BundleVersion>",
            Placeholder::BuildNumber => "<BuildNumber>",
            Placeholder::BuildTarget => "<BuildTarget>",
        }
    }

    /// Look up a placeholder by its literal token
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.token() == token)
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
