//! Fixed selector chains for Indeed's search page and result cards.
//!
//! Each chain is tried in order and the first match wins. The order is a
//! priority list reflecting which markup variant Indeed currently serves most
//! often; it is not learned or configured at runtime.

/// Landing page the search form is submitted from.
pub const SEARCH_URL: &str = "https://www.indeed.com/";

/// Origin prepended to relative job links.
pub const BASE_ORIGIN: &str = "https://www.indeed.com";

/// Ordered candidate selectors for one logical target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorChain {
    /// Human-readable target name, used in logs and errors.
    pub target: &'static str,
    pub selectors: &'static [&'static str],
}

impl SelectorChain {
    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.selectors.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    pub fn first(&self) -> Option<&'static str> {
        self.selectors.first().copied()
    }
}

// ---------------------------------------------------------------------------
// Search form
// ---------------------------------------------------------------------------

pub const KEYWORD_INPUT: SelectorChain = SelectorChain {
    target: "job title input",
    selectors: &[
        r#"input[id="text-input-what"]"#,
        r#"input[name="q"]"#,
        r#"input[data-testid="job-search-bar-keywords-input"]"#,
    ],
};

pub const LOCATION_INPUT: SelectorChain = SelectorChain {
    target: "location input",
    selectors: &[
        r#"input[id="text-input-where"]"#,
        r#"input[name="l"]"#,
        r#"input[data-testid="job-search-bar-location-input"]"#,
    ],
};

pub const SUBMIT_BUTTON: SelectorChain = SelectorChain {
    target: "search submit control",
    selectors: &[
        r#"button[type="submit"]"#,
        r#"button[data-testid="job-search-bar-submit"]"#,
    ],
};

/// Anti-bot interstitial widgets worth a single click.
pub const CHALLENGE: SelectorChain = SelectorChain {
    target: "challenge widget",
    selectors: &[
        r#"iframe[src*="challenges.cloudflare.com"]"#,
        r#"#challenge-stage input[type="checkbox"]"#,
        r#"div.cf-turnstile"#,
    ],
};

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

pub const JOB_CARDS: SelectorChain = SelectorChain {
    target: "job cards",
    selectors: &[
        "li.css-5lfssm",
        "div.job_seen_beacon",
        "div.slider_container",
        "[data-jk]",
        ".jobsearch-SerpJobCard",
        r#"[data-testid="job-tile"]"#,
        ".result",
    ],
};

pub const NEXT_PAGE: SelectorChain = SelectorChain {
    target: "next page control",
    selectors: &[
        r#"a[data-testid="pagination-page-next"]"#,
        r#"a[aria-label="Next Page"]"#,
        r#"a[aria-label="Next"]"#,
    ],
};

// ---------------------------------------------------------------------------
// Card fields
// ---------------------------------------------------------------------------

pub const TITLE: SelectorChain = SelectorChain {
    target: "title",
    selectors: &[
        "h2 span[title]",
        "h2 span",
        "h2 a span",
        "h2",
        r#"[data-testid="job-title"]"#,
        ".jobTitle",
    ],
};

pub const COMPANY: SelectorChain = SelectorChain {
    target: "company",
    selectors: &[
        r#"span[data-testid="company-name"]"#,
        r#"[data-testid="company-name"]"#,
        ".companyName",
        "span.companyName",
        "a .companyName",
    ],
};

pub const LOCATION: SelectorChain = SelectorChain {
    target: "location",
    selectors: &[
        r#"div[data-testid="text-location"]"#,
        r#"[data-testid="job-location"]"#,
        ".companyLocation",
        "span.companyLocation",
    ],
};

pub const LINK: SelectorChain = SelectorChain {
    target: "link",
    selectors: &[
        "a.jcs-JobTitle",
        "h2 a",
        "a[data-jk]",
        r#"a[href*="/viewjob"]"#,
    ],
};
