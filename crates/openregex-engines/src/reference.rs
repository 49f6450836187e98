//! Cheat sheets and showcase examples for the bundled engines.

use openregex_core::{CheatSheetEntry as E, CheatSheetSection, Example};

const CORE_MATCHING: &[E] = &[
    E::new(".", "Any character except a line break"),
    E::new("[abc]", "One of a, b or c"),
    E::new("[^abc]", "Any character except a, b or c"),
    E::new("[a-z]", "One character in the range a to z"),
    E::new("\\d", "Digit"),
    E::new("\\D", "Non-digit"),
    E::new("\\s", "Whitespace"),
    E::new("\\S", "Non-whitespace"),
    E::new("\\w", "Word character"),
    E::new("\\W", "Non-word character"),
    E::new("\\n", "Newline"),
    E::new("\\t", "Tab"),
];

const QUANTIFIERS: &[E] = &[
    E::new("?", "Zero or one"),
    E::new("*", "Zero or more"),
    E::new("+", "One or more"),
    E::new("{n}", "Exactly n"),
    E::new("{n,}", "n or more"),
    E::new("{n,m}", "Between n and m"),
    E::new("*?", "Zero or more, as few as possible"),
    E::new("+?", "One or more, as few as possible"),
];

const ANCHORS: &[E] = &[
    E::new("^", "Start of the text, or of a line in multiline mode"),
    E::new("$", "End of the text, or of a line in multiline mode"),
    E::new("\\b", "Word boundary"),
    E::new("\\B", "Not a word boundary"),
];

const RUST_GROUPING: &[E] = &[
    E::new("( )", "Capturing group"),
    E::new("(?: )", "Non-capturing group"),
    E::new("(?<name> )", "Named capturing group"),
    E::new("(?P<name> )", "Named capturing group, Python syntax"),
    E::new("|", "Either the expression before or after"),
    E::new("(?i)", "Inline flag: case-insensitive"),
    E::new("\\p{Greek}", "Character with a Unicode property"),
    E::new("\\A", "Start of the text only"),
    E::new("\\z", "End of the text only"),
];

const RUST_REGEX_SHEET: &[CheatSheetSection] = &[
    CheatSheetSection::new("Core Matching", CORE_MATCHING),
    CheatSheetSection::new("Quantifiers", QUANTIFIERS),
    CheatSheetSection::new("Anchors", ANCHORS),
    CheatSheetSection::new("Grouping and Logic", RUST_GROUPING),
];

const BACKTRACKING: &[E] = &[
    E::new("\\1, \\2, ...", "Backreference to a numbered group"),
    E::new("\\k<name>", "Backreference to a named group"),
    E::new("(?= )", "Positive lookahead"),
    E::new("(?! )", "Negative lookahead"),
    E::new("(?<= )", "Positive lookbehind"),
    E::new("(?<! )", "Negative lookbehind"),
    E::new("(?> )", "Atomic group, never backtracked into"),
    E::new("*+", "Possessive zero or more"),
];

const FANCY_REGEX_SHEET: &[CheatSheetSection] = &[
    CheatSheetSection::new("Core Matching", CORE_MATCHING),
    CheatSheetSection::new("Quantifiers", QUANTIFIERS),
    CheatSheetSection::new("Anchors", ANCHORS),
    CheatSheetSection::new("Grouping and Logic", RUST_GROUPING),
    CheatSheetSection::new("Backtracking Features", BACKTRACKING),
];

const ECMASCRIPT_GROUPING: &[E] = &[
    E::new("( )", "Capturing group"),
    E::new("(?: )", "Non-capturing group"),
    E::new("|", "Either the expression before or after"),
    E::new("\\1, \\2", "Backreference to a numbered group"),
    E::new("(?= )", "Positive lookahead"),
    E::new("(?! )", "Negative lookahead"),
];

const CXX_SHEET: &[CheatSheetSection] = &[
    CheatSheetSection::new("Core Matching", CORE_MATCHING),
    CheatSheetSection::new("Quantifiers", QUANTIFIERS),
    CheatSheetSection::new("Anchors", ANCHORS),
    CheatSheetSection::new("Grouping and Logic", ECMASCRIPT_GROUPING),
];

const JAVA_EXTRAS: &[E] = &[
    E::new("\\p{...}", "Character with a Unicode property, such as \\p{Ll}"),
    E::new("\\P{...}", "Character without a Unicode property"),
    E::new("\\A", "Start of the input"),
    E::new("\\Z", "End of the input, before a final line terminator"),
    E::new("\\z", "Absolute end of the input"),
    E::new("\\G", "End of the previous match"),
    E::new("(?<name> )", "Named capturing group"),
    E::new("\\k<name>", "Backreference to a named group"),
    E::new("(?> )", "Atomic group, never backtracked into"),
    E::new("++", "Possessive one or more"),
    E::new("?+", "Possessive zero or one"),
];

const JAVA_SHEET: &[CheatSheetSection] = &[
    CheatSheetSection::new("Core Matching", CORE_MATCHING),
    CheatSheetSection::new("Quantifiers", QUANTIFIERS),
    CheatSheetSection::new("Anchors", ANCHORS),
    CheatSheetSection::new("Grouping and Logic", ECMASCRIPT_GROUPING),
    CheatSheetSection::new("Java Extensions", JAVA_EXTRAS),
];

const JS_EXTRAS: &[E] = &[
    E::new("(?<name> )", "Named capturing group (ES2018)"),
    E::new("\\k<name>", "Backreference to a named group (ES2018)"),
    E::new("(?<= )", "Positive lookbehind (ES2018)"),
    E::new("(?<! )", "Negative lookbehind (ES2018)"),
];

const JS_FLAGS: &[E] = &[
    E::new("i", "Case-insensitive search"),
    E::new("m", "^ and $ match at line boundaries"),
    E::new("s", ". also matches line breaks (dotAll)"),
    E::new("u", "Treat the pattern as Unicode code points"),
];

const JS_SHEET: &[CheatSheetSection] = &[
    CheatSheetSection::new("Core Matching", CORE_MATCHING),
    CheatSheetSection::new("Quantifiers", QUANTIFIERS),
    CheatSheetSection::new("Anchors", ANCHORS),
    CheatSheetSection::new("Grouping and Logic", ECMASCRIPT_GROUPING),
    CheatSheetSection::new("ES2018 Additions", JS_EXTRAS),
    CheatSheetSection::new("Flags", JS_FLAGS),
];

const IP_PATTERN: &str = concat!(
    r"(?<IP>(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\.(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\.",
    r"(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\.(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d))",
    r"(/(\d{1,2}))?",
    r"(?:-(?<IP2>(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\.(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\.",
    r"(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\.(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)))?",
    r"(:(?<port>\d{1,5}))?",
);

const IP_TEXT: &str = "192.168.1.100
192.168.1.100:8080
127.0.0.1
192.168.1.0/24
192.168.1.1-192.168.1.255
192.168.1.1-192.168.1.255:80
192.168.1.0/24:80";

const DATE_EXAMPLE: Example = Example::new(
    r"(\d{4})-(\d{2})-(\d{2})",
    "Released 2024-03-18, patched 2024-04-02.",
);

const IP_EXAMPLE: Example = Example::new(IP_PATTERN, IP_TEXT);

/// Static reference data of one engine.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Reference {
    pub(crate) sheet: &'static [CheatSheetSection],
    pub(crate) example: Example,
}

pub(crate) const RUST_REGEX: Reference = Reference {
    sheet: RUST_REGEX_SHEET,
    example: IP_EXAMPLE,
};
pub(crate) const FANCY_REGEX: Reference = Reference {
    sheet: FANCY_REGEX_SHEET,
    example: IP_EXAMPLE,
};
pub(crate) const CXX: Reference = Reference {
    sheet: CXX_SHEET,
    example: DATE_EXAMPLE,
};
pub(crate) const JAVA: Reference = Reference {
    sheet: JAVA_SHEET,
    example: IP_EXAMPLE,
};
pub(crate) const JAVASCRIPT: Reference = Reference {
    sheet: JS_SHEET,
    example: IP_EXAMPLE,
};
