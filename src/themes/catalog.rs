// Theme catalog — the fixed, domain-knowledge list of banking review themes.
//
// Seed keywords are never learned. They're matched against whatever a batch
// of reviews actually talks about (see matcher.rs), so a theme only shows up
// for a bank when its reviews share vocabulary with the seeds.

/// A named theme and its seed keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub seeds: &'static [&'static str],
}

/// The process-wide theme catalog, in priority order.
///
/// Order matters: catalog themes are discovered in this order, and the first
/// matching theme becomes a review's primary theme.
pub const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        name: "Account Access Problems",
        seeds: &[
            "login",
            "password",
            "account",
            "access",
            "unable",
            "cannot",
            "failed",
            "error",
            "otp",
            "verification",
            "authenticate",
            "locked",
            "blocked",
            "open account",
            "register",
            "sign up",
            "selfie",
            "verify",
        ],
    },
    CatalogEntry {
        name: "Transaction Speed & Reliability",
        seeds: &[
            "slow",
            "fast",
            "speed",
            "transaction",
            "transfer",
            "payment",
            "delay",
            "pending",
            "timeout",
            "failed transaction",
            "processing",
            "instant",
            "quick",
            "waiting",
            "hang",
            "freeze",
            "stuck",
        ],
    },
    CatalogEntry {
        name: "User Interface & Experience",
        seeds: &[
            "ui",
            "interface",
            "design",
            "user friendly",
            "easy",
            "simple",
            "beautiful",
            "ugly",
            "confusing",
            "layout",
            "navigation",
            "button",
            "screen",
            "display",
            "visual",
            "aesthetic",
            "intuitive",
        ],
    },
    CatalogEntry {
        name: "Customer Support Responsiveness",
        seeds: &[
            "support",
            "customer service",
            "help",
            "response",
            "reply",
            "contact",
            "assistance",
            "complaint",
            "no reply",
            "unresponsive",
            "email",
            "call",
            "service",
            "helpful",
            "ignore",
        ],
    },
    CatalogEntry {
        name: "Feature Requests",
        seeds: &[
            "feature",
            "add",
            "missing",
            "need",
            "want",
            "should have",
            "request",
            "suggestion",
            "improve",
            "enhance",
            "update",
            "new feature",
            "option",
            "functionality",
            "capability",
        ],
    },
    CatalogEntry {
        name: "Security & Trust",
        seeds: &[
            "security",
            "safe",
            "secure",
            "trust",
            "privacy",
            "data",
            "protection",
            "hack",
            "fraud",
            "scam",
            "reliable",
            "trustworthy",
        ],
    },
    CatalogEntry {
        name: "App Performance & Stability",
        seeds: &[
            "crash",
            "bug",
            "glitch",
            "error",
            "not working",
            "broken",
            "freeze",
            "lag",
            "performance",
            "stable",
            "reliable",
            "update",
            "version",
            "compatibility",
            "install",
        ],
    },
];

/// Look up a catalog entry by its exact name.
pub fn find(name: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|entry| entry.name == name)
}
