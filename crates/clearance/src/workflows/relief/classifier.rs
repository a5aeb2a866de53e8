//! Code-section taxonomies used by the history builder and the eligibility flows.
//!
//! Charge codes arrive as free text such as `11357(A) HS`, `HS 11359`,
//! `664/187 PC` or `23222(B)VC-POSS MARIJUANA`. Every predicate parses the text
//! into a [`ParsedCodeSection`] once and checks it against a fixed rule table, so
//! matching is case-normalized and independent of rule order.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// California code a section number belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statute {
    HealthAndSafety,
    Penal,
    BusinessAndProfessions,
    Vehicle,
    WelfareAndInstitutions,
}

impl Statute {
    fn from_abbreviation(value: &str) -> Option<Self> {
        match value {
            "HS" => Some(Self::HealthAndSafety),
            "PC" => Some(Self::Penal),
            "BP" => Some(Self::BusinessAndProfessions),
            "VC" => Some(Self::Vehicle),
            "WI" => Some(Self::WelfareAndInstitutions),
            _ => None,
        }
    }

    pub const fn abbreviation(self) -> &'static str {
        match self {
            Self::HealthAndSafety => "HS",
            Self::Penal => "PC",
            Self::BusinessAndProfessions => "BP",
            Self::Vehicle => "VC",
            Self::WelfareAndInstitutions => "WI",
        }
    }
}

/// Structured view of a charge code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCodeSection {
    pub statute: Statute,
    pub number: String,
    pub subsections: Vec<String>,
    pub attempted: bool,
}

static CODE_SECTION_PATTERN: OnceLock<Regex> = OnceLock::new();
static SUBSECTION_PATTERN: OnceLock<Regex> = OnceLock::new();

fn code_section_pattern() -> &'static Regex {
    CODE_SECTION_PATTERN.get_or_init(|| {
        Regex::new(concat!(
            r"^\s*(?:(?P<lead>HS|PC|BP|VC|WI)\s*)?",
            r"(?P<pre>664\s*[-/]\s*)?",
            r"(?P<number>\d+(?:\.\d+)?(?:[A-Z]\b)?)",
            r"(?P<subs>(?:\s*\(\s*[0-9A-Z]+\s*\))*)",
            r"\s*(?P<post>[-/]\s*664)?",
            r"(?:\s*\(\s*[0-9A-Z]+\s*\))*",
            r"\s*(?P<trail>HS|PC|BP|VC|WI)?",
        ))
        .expect("code section pattern compiles")
    })
}

fn subsection_pattern() -> &'static Regex {
    SUBSECTION_PATTERN.get_or_init(|| {
        Regex::new(r"\(\s*([0-9A-Z]+)\s*\)").expect("subsection pattern compiles")
    })
}

/// Parses a charge code. Returns `None` when no statute abbreviation can be found.
pub fn parse_code_section(code: &str) -> Option<ParsedCodeSection> {
    let normalized = code.trim().to_ascii_uppercase();
    let captures = code_section_pattern().captures(&normalized)?;

    let statute = captures
        .name("lead")
        .or_else(|| captures.name("trail"))
        .and_then(|abbreviation| Statute::from_abbreviation(abbreviation.as_str()))?;
    let number = captures.name("number")?.as_str().to_string();
    let subsections = captures
        .name("subs")
        .map(|subs| {
            subsection_pattern()
                .captures_iter(subs.as_str())
                .filter_map(|group| group.get(1).map(|m| m.as_str().to_string()))
                .collect()
        })
        .unwrap_or_default();
    let attempted = captures.name("pre").is_some() || captures.name("post").is_some();

    Some(ParsedCodeSection {
        statute,
        number,
        subsections,
        attempted,
    })
}

#[derive(Debug, Clone, Copy)]
struct SectionRule {
    statute: Statute,
    number: &'static str,
    subsections: &'static [&'static str],
    attempts: bool,
}

impl SectionRule {
    const fn new(statute: Statute, number: &'static str) -> Self {
        Self {
            statute,
            number,
            subsections: &[],
            attempts: false,
        }
    }

    const fn sub(mut self, subsections: &'static [&'static str]) -> Self {
        self.subsections = subsections;
        self
    }

    const fn with_attempts(mut self) -> Self {
        self.attempts = true;
        self
    }

    fn matches(&self, parsed: &ParsedCodeSection) -> bool {
        parsed.statute == self.statute
            && parsed.number == self.number
            && parsed.subsections.len() >= self.subsections.len()
            && self
                .subsections
                .iter()
                .zip(&parsed.subsections)
                .all(|(expected, actual)| *expected == actual.as_str())
            && (!parsed.attempted || self.attempts)
    }

    fn label(&self) -> String {
        let mut label = self.number.to_string();
        for subsection in self.subsections {
            label.push('(');
            label.push_str(subsection);
            label.push(')');
        }
        format!("{label} {}", self.statute.abbreviation())
    }
}

const fn hs(number: &'static str) -> SectionRule {
    SectionRule::new(Statute::HealthAndSafety, number)
}

const fn pc(number: &'static str) -> SectionRule {
    SectionRule::new(Statute::Penal, number)
}

const fn bp(number: &'static str) -> SectionRule {
    SectionRule::new(Statute::BusinessAndProfessions, number)
}

const fn vc(number: &'static str) -> SectionRule {
    SectionRule::new(Statute::Vehicle, number)
}

const QUALIFYING_RULES: &[SectionRule] = &[
    hs("11357").with_attempts(),
    hs("11358").with_attempts(),
    hs("11359").with_attempts(),
    hs("11360").with_attempts(),
];

const RELATED_RULES: &[SectionRule] = &[
    hs("11364"),
    hs("11365"),
    hs("11366"),
    hs("11366.5"),
    hs("11550"),
    bp("4060"),
    bp("4140"),
    bp("4149"),
    vc("23222").sub(&["B"]),
];

// PC 667(e)(2)(C)(iv)
const SEVERE_PRIOR_RULES: &[SectionRule] = &[
    pc("187").with_attempts(),
    pc("191.5"),
    pc("245").sub(&["D", "3"]),
    pc("261").sub(&["A", "2"]),
    pc("261").sub(&["A", "6"]),
    pc("264.1"),
    pc("269"),
    pc("286").sub(&["C"]),
    pc("286").sub(&["D"]),
    pc("288").sub(&["A"]),
    pc("288").sub(&["B"]),
    pc("288A").sub(&["C"]),
    pc("288A").sub(&["D"]),
    pc("288.5"),
    pc("289").sub(&["A"]),
    pc("653F").sub(&["B"]),
    pc("11418").sub(&["A", "1"]),
];

// Felonies that carry a life term when charged alongside PC 186.22(b).
const ENHANCEABLE_RULES: &[SectionRule] = &[
    pc("136.1"),
    pc("213").sub(&["A", "1", "A"]),
    pc("215"),
    pc("246"),
    pc("422"),
    pc("460").sub(&["A"]),
    pc("519"),
];

const GANG_ENHANCEMENT_RULES: &[SectionRule] = &[pc("186.22").sub(&["B"])];

// PC 290(c)
const REGISTRATION_RULES: &[SectionRule] = &[
    pc("220"),
    pc("243.4"),
    pc("261"),
    pc("262").sub(&["A", "1"]),
    pc("264.1"),
    pc("266"),
    pc("266C"),
    pc("266H").sub(&["B"]),
    pc("266I").sub(&["B"]),
    pc("266J"),
    pc("267"),
    pc("269"),
    pc("285"),
    pc("286"),
    pc("288"),
    pc("288A"),
    pc("288.2"),
    pc("288.3"),
    pc("288.4"),
    pc("288.5"),
    pc("288.7"),
    pc("289"),
    pc("290"),
    pc("311.1"),
    pc("311.2").sub(&["B"]),
    pc("311.2").sub(&["C"]),
    pc("311.2").sub(&["D"]),
    pc("311.3"),
    pc("311.4"),
    pc("311.10"),
    pc("311.11"),
    pc("314").sub(&["1"]),
    pc("647.6"),
    pc("653F").sub(&["C"]),
];

fn find_rule(
    rules: &'static [SectionRule],
    code: &str,
) -> Option<(&'static SectionRule, ParsedCodeSection)> {
    let parsed = parse_code_section(code)?;
    rules
        .iter()
        .find(|rule| rule.matches(&parsed))
        .map(|rule| (rule, parsed))
}

/// HS 11357-11360 (cannabis possession, cultivation, possession for sale, sale/transport).
pub fn is_qualifying_charge(code: &str) -> bool {
    find_rule(QUALIFYING_RULES, code).is_some()
}

/// Non-cannabis statutes that some jurisdictions relieve alongside a qualifying charge.
pub fn is_related_charge(code: &str) -> bool {
    find_rule(RELATED_RULES, code).is_some()
}

pub fn is_severe_prior(code: &str) -> bool {
    find_rule(SEVERE_PRIOR_RULES, code).is_some()
}

pub fn is_registration_offense(code: &str) -> bool {
    find_rule(REGISTRATION_RULES, code).is_some()
}

pub fn is_gang_enhancement(code: &str) -> bool {
    find_rule(GANG_ENHANCEMENT_RULES, code).is_some()
}

pub fn is_enhanceable_base(code: &str) -> bool {
    find_rule(ENHANCEABLE_RULES, code).is_some()
}

/// Whether a charge falls under a canonical qualifying section such as `11357`
/// or `11357(A)`. An invalid canonical label matches nothing.
pub fn matches_section(code: &str, canonical: &str) -> bool {
    QualifyingSection::parse(canonical).is_some_and(|section| section.matches(code))
}

/// Canonical label of the related statute a code matches, e.g. `23222(B) VC`.
pub fn related_section(code: &str) -> Option<String> {
    find_rule(RELATED_RULES, code).map(|(rule, _)| rule.label())
}

/// True when both codes name the same statute, section and leading subsections
/// of `reference`.
pub fn same_section(code: &str, reference: &str) -> bool {
    match (parse_code_section(code), parse_code_section(reference)) {
        (Some(actual), Some(expected)) => {
            actual.statute == expected.statute
                && actual.number == expected.number
                && expected
                    .subsections
                    .iter()
                    .zip(&actual.subsections)
                    .all(|(lhs, rhs)| lhs == rhs)
                && actual.subsections.len() >= expected.subsections.len()
        }
        _ => false,
    }
}

/// Canonical qualifying section such as `11357` or `11357(A)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifyingSection {
    number: String,
    subsection: Option<String>,
}

impl QualifyingSection {
    /// Parses a canonical label. Accepts `11357`, `11357(a)`, `11357 (A)`; rejects
    /// anything outside HS 11357-11360 or with more than one subsection.
    pub fn parse(label: &str) -> Option<Self> {
        let parsed = parse_code_section(&format!("{} HS", label.trim()))?;
        if parsed.attempted || parsed.subsections.len() > 1 {
            return None;
        }
        if !QUALIFYING_RULES.iter().any(|rule| rule.matches(&parsed)) {
            return None;
        }
        let subsection = parsed.subsections.into_iter().next();
        if subsection
            .as_deref()
            .is_some_and(|value| !value.chars().all(|c| c.is_ascii_alphabetic()))
        {
            return None;
        }

        Some(Self {
            number: parsed.number,
            subsection,
        })
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn subsection(&self) -> Option<&str> {
        self.subsection.as_deref()
    }

    /// A bare section matches every subsection of it; a lettered one only itself.
    pub fn matches(&self, code: &str) -> bool {
        match qualifying_section(code) {
            Some(found) => {
                found.number == self.number
                    && match &self.subsection {
                        Some(expected) => found.subsection.as_ref() == Some(expected),
                        None => true,
                    }
            }
            None => false,
        }
    }
}

impl fmt::Display for QualifyingSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subsection {
            Some(subsection) => write!(f, "{}({})", self.number, subsection),
            None => f.write_str(&self.number),
        }
    }
}

/// Extracts the qualifying section of a charge, keeping a leading lettered subsection.
pub fn qualifying_section(code: &str) -> Option<QualifyingSection> {
    let (_, parsed) = find_rule(QUALIFYING_RULES, code)?;
    let subsection = parsed
        .subsections
        .into_iter()
        .next()
        .filter(|value| value.chars().all(|c| c.is_ascii_alphabetic()));

    Some(QualifyingSection {
        number: parsed.number,
        subsection,
    })
}
