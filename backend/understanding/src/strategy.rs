//! Line-matching strategies for label text.
//!
//! Each strategy recognizes one structural dialect of `label: value` lines
//! emitted by vision models. Strategies only find the label token and its
//! delimiter at the start of a line; resolving the label to a field is the
//! extractor's job.

use once_cell::sync::Lazy;
use regex::Regex;

/// A line split into its label and the remainder after the delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabeledLine<'a> {
    pub label: &'a str,
    pub value: &'a str,
}

/// One structural dialect of labeled lines.
pub trait LineStrategy: Send + Sync {
    /// Short name used in debug logs.
    fn name(&self) -> &'static str;

    /// Split `line` into label and value if it carries this dialect's marker.
    fn attempt<'a>(&self, line: &'a str) -> Option<LabeledLine<'a>>;
}

// --- Compiled regexes ---

static NUMBERED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*\d{1,3}\s*[.)]\s*(?:\*\*)?\s*(?P<label>[^:*]+?)\s*(?:\*\*)?\s*:\s*(?:\*\*)?\s*(?P<value>.*)$",
    )
    .unwrap()
});

static BOLD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:[-*+•]\s+)?\*\*\s*(?P<label>[^:*]+?)\s*(?::\s*\*\*|\*\*\s*:)\s*(?P<value>.*)$",
    )
    .unwrap()
});

static COLON_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:[-*+•]\s+)?(?P<label>[A-Za-z][^:*]{0,60}?)\s*:\s*(?P<value>.*)$").unwrap()
});

fn capture<'a>(re: &Regex, line: &'a str) -> Option<LabeledLine<'a>> {
    let caps = re.captures(line)?;
    Some(LabeledLine {
        label: caps.name("label")?.as_str(),
        value: caps.name("value").map(|m| m.as_str()).unwrap_or(""),
    })
}

/// `1. Brand Name: Acme`, `2) **MRP:** ₹120`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NumberedStrategy;

impl LineStrategy for NumberedStrategy {
    fn name(&self) -> &'static str {
        "numbered"
    }

    fn attempt<'a>(&self, line: &'a str) -> Option<LabeledLine<'a>> {
        capture(&NUMBERED_RE, line)
    }
}

/// `**Brand Name:** Acme`, `- **Quantity**: 500 g`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoldStrategy;

impl LineStrategy for BoldStrategy {
    fn name(&self) -> &'static str {
        "bold"
    }

    fn attempt<'a>(&self, line: &'a str) -> Option<LabeledLine<'a>> {
        capture(&BOLD_RE, line)
    }
}

/// `Brand Name: Acme`, `* Quantity: 500 g`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ColonStrategy;

impl LineStrategy for ColonStrategy {
    fn name(&self) -> &'static str {
        "colon"
    }

    fn attempt<'a>(&self, line: &'a str) -> Option<LabeledLine<'a>> {
        capture(&COLON_RE, line)
    }
}

/// The built-in chain, highest priority first.
pub fn default_strategies() -> Vec<Box<dyn LineStrategy>> {
    vec![
        Box::new(NumberedStrategy),
        Box::new(BoldStrategy),
        Box::new(ColonStrategy),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split<'a>(s: &dyn LineStrategy, line: &'a str) -> Option<(&'a str, &'a str)> {
        s.attempt(line).map(|l| (l.label, l.value))
    }

    #[test]
    fn numbered_plain_and_bold() {
        assert_eq!(split(&NumberedStrategy, "1. Brand Name: Acme"), Some(("Brand Name", "Acme")));
        assert_eq!(split(&NumberedStrategy, "2) **MRP:** ₹120"), Some(("MRP", "₹120")));
        assert_eq!(split(&NumberedStrategy, "3. **Quantity**: 500 g"), Some(("Quantity", "500 g")));
        assert_eq!(split(&NumberedStrategy, "Brand Name: Acme"), None);
    }

    #[test]
    fn bold_with_colon_inside_or_outside() {
        assert_eq!(split(&BoldStrategy, "**Brand Name:** Acme"), Some(("Brand Name", "Acme")));
        assert_eq!(split(&BoldStrategy, "- **Brand Name**: Acme"), Some(("Brand Name", "Acme")));
        assert_eq!(
            split(&BoldStrategy, "* **MRP (Maximum Retail Price):** ₹45"),
            Some(("MRP (Maximum Retail Price)", "₹45"))
        );
        assert_eq!(split(&BoldStrategy, "**Product Summary**"), None);
    }

    #[test]
    fn colon_requires_leading_label() {
        assert_eq!(split(&ColonStrategy, "Quantity : 1 L"), Some(("Quantity", "1 L")));
        assert_eq!(split(&ColonStrategy, "- Date of Expiry: 12/2025"), Some(("Date of Expiry", "12/2025")));
        assert_eq!(split(&ColonStrategy, "* MRP: ₹45"), Some(("MRP", "₹45")));
        assert_eq!(split(&ColonStrategy, "* **MRP:** ₹45"), None);
        assert_eq!(split(&ColonStrategy, "500 g pack"), None);
    }

    #[test]
    fn colon_keeps_later_colons_in_value() {
        assert_eq!(split(&ColonStrategy, "Best Before: 10:30 01/2025"), Some(("Best Before", "10:30 01/2025")));
    }
}
