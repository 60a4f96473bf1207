//! Splitting a concatenated execution trace into per-test-method segments.
//!
//! The API returns one debug log for the whole run. Each test method's
//! execution is bracketed by `|EXECUTION_STARTED` and `|EXECUTION_FINISHED`
//! lines, and the first `|CODE_UNIT_STARTED|` line inside the bracket names the
//! `Class.method` being run.
//!
//! Splitting happens in two steps:
//! - [`split_segments`] walks the lines and yields finished [`Segment`]s
//! - [`classify`] decides where a segment belongs given the known test classes
//!
//! Blocks that name an unknown class (asynchronous work such as `@future` or
//! batch jobs) belong to whichever test ran just before them.

use regex::Regex;
use std::str::Lines;
use std::sync::LazyLock;

/// Marker ending the line that opens a segment.
pub const EXECUTION_STARTED: &str = "|EXECUTION_STARTED";
/// Marker ending the line that closes a segment.
pub const EXECUTION_FINISHED: &str = "|EXECUTION_FINISHED";

static CODE_UNIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\|CODE_UNIT_STARTED\|.+\|(.+)\.(.+)$").expect("code unit pattern is valid")
});

/// The test method a segment was produced by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CodeUnit {
    pub class_name: String,
    pub method_name: String,
}

impl CodeUnit {
    /// Extract `(class, method)` from a `CODE_UNIT_STARTED` line.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let caps = CODE_UNIT_RE.captures(line)?;
        Some(Self {
            class_name: caps[1].to_string(),
            method_name: caps[2].to_string(),
        })
    }
}

/// One bracketed block of the trace, markers included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// First code unit seen inside the block, if any.
    pub unit: Option<CodeUnit>,
    /// Block lines, each terminated by `\n`.
    pub text: String,
}

#[derive(Debug)]
enum State {
    Idle,
    Collecting {
        buffer: String,
        unit: Option<CodeUnit>,
    },
}

/// Iterator over finished segments of a trace.
///
/// Lines outside any bracket are skipped. A block still open at the end of
/// input is dropped.
#[derive(Debug)]
pub struct Segments<'a> {
    lines: Lines<'a>,
    state: State,
}

impl Iterator for Segments<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        for line in self.lines.by_ref() {
            if line.ends_with(EXECUTION_STARTED) {
                // Restart the text only; an identified unit lasts until the finish marker
                match &mut self.state {
                    State::Collecting { buffer, .. } => buffer.clear(),
                    State::Idle => {
                        self.state = State::Collecting {
                            buffer: String::new(),
                            unit: None,
                        };
                    }
                }
            }

            let State::Collecting { buffer, unit } = &mut self.state else {
                continue;
            };

            if unit.is_none() {
                *unit = CodeUnit::parse(line);
            }
            buffer.push_str(line);
            buffer.push('\n');

            if line.ends_with(EXECUTION_FINISHED) {
                if let State::Collecting { buffer, unit } =
                    std::mem::replace(&mut self.state, State::Idle)
                {
                    return Some(Segment { unit, text: buffer });
                }
            }
        }
        None
    }
}

/// Split `trace` into its per-method segments.
#[must_use]
pub fn split_segments(trace: &str) -> Segments<'_> {
    Segments {
        lines: trace.lines(),
        state: State::Idle,
    }
}

/// Where a finished segment should be attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentTarget {
    /// The segment's own test method.
    Method(CodeUnit),
    /// Append to the most recently attached test method.
    CarryToPrevious,
}

/// Route a segment: to its own method when the class is a known test class,
/// otherwise to the previous method.
pub fn classify(segment: &Segment, is_known_class: impl Fn(&str) -> bool) -> SegmentTarget {
    match &segment.unit {
        Some(unit) if is_known_class(&unit.class_name) => SegmentTarget::Method(unit.clone()),
        _ => SegmentTarget::CarryToPrevious,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK: &str = "\
10:00:00.000 (1)|EXECUTION_STARTED
10:00:00.001 (2)|CODE_UNIT_STARTED|[EXTERNAL]|01pxx000000001|InvoiceTest.testTotal
10:00:00.002 (3)|USER_DEBUG|[4]|DEBUG|hello
10:00:00.003 (4)|CODE_UNIT_FINISHED|InvoiceTest.testTotal
10:00:00.004 (5)|EXECUTION_FINISHED
";

    #[test]
    fn test_parse_code_unit() {
        let unit = CodeUnit::parse(
            "10:00:00.001 (2)|CODE_UNIT_STARTED|[EXTERNAL]|01pxx000000001|InvoiceTest.testTotal",
        )
        .unwrap();
        assert_eq!(unit.class_name, "InvoiceTest");
        assert_eq!(unit.method_name, "testTotal");
    }

    #[test]
    fn test_parse_code_unit_splits_on_last_dot() {
        let unit =
            CodeUnit::parse("t (2)|CODE_UNIT_STARTED|[EXTERNAL]|01p|acme.InvoiceTest.testTotal")
                .unwrap();
        assert_eq!(unit.class_name, "acme.InvoiceTest");
        assert_eq!(unit.method_name, "testTotal");
    }

    #[test]
    fn test_parse_ignores_other_events() {
        assert!(CodeUnit::parse("10:00 (3)|USER_DEBUG|[4]|DEBUG|a.b").is_none());
        assert!(CodeUnit::parse("10:00 (4)|CODE_UNIT_FINISHED|InvoiceTest.testTotal").is_none());
    }

    #[test]
    fn test_single_block() {
        let segments: Vec<Segment> = split_segments(BLOCK).collect();
        assert_eq!(segments.len(), 1);
        let unit = segments[0].unit.as_ref().unwrap();
        assert_eq!(unit.class_name, "InvoiceTest");
        assert_eq!(unit.method_name, "testTotal");
        assert_eq!(segments[0].text, BLOCK);
    }

    #[test]
    fn test_lines_outside_blocks_are_skipped() {
        let trace = format!("37.0 APEX_CODE,FINEST\n{BLOCK}trailing noise\n");
        let segments: Vec<Segment> = split_segments(&trace).collect();
        assert_eq!(segments.len(), 1);
        assert!(!segments[0].text.contains("APEX_CODE"));
        assert!(!segments[0].text.contains("trailing"));
    }

    #[test]
    fn test_first_unit_wins() {
        let trace = "\
a|EXECUTION_STARTED
b|CODE_UNIT_STARTED|[EXTERNAL]|01p|FirstTest.one
c|CODE_UNIT_STARTED|[EXTERNAL]|01p|SecondTest.two
d|EXECUTION_FINISHED
";
        let segment = split_segments(trace).next().unwrap();
        assert_eq!(segment.unit.unwrap().class_name, "FirstTest");
    }

    #[test]
    fn test_block_without_unit() {
        let trace = "a|EXECUTION_STARTED\nb|USER_DEBUG|x\nc|EXECUTION_FINISHED\n";
        let segment = split_segments(trace).next().unwrap();
        assert!(segment.unit.is_none());
        assert_eq!(segment.text, trace);
    }

    #[test]
    fn test_unfinished_block_is_dropped() {
        let trace = format!("{BLOCK}x|EXECUTION_STARTED\ny|CODE_UNIT_STARTED|[E]|01p|A.b\n");
        assert_eq!(split_segments(&trace).count(), 1);
    }

    #[test]
    fn test_restart_keeps_identified_unit() {
        let trace = "\
a|EXECUTION_STARTED
b|CODE_UNIT_STARTED|[EXTERNAL]|01p|First.run
c|EXECUTION_STARTED
d|CODE_UNIT_STARTED|[EXTERNAL]|01p|Second.run
e|EXECUTION_FINISHED
";
        let segments: Vec<Segment> = split_segments(trace).collect();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].unit.as_ref().unwrap().class_name, "First");
        assert!(segments[0].text.starts_with("c|EXECUTION_STARTED"));
        assert!(!segments[0].text.contains("b|"));
    }

    #[test]
    fn test_restart_before_unit_identifies_from_new_text() {
        let trace = "\
a|EXECUTION_STARTED
b|USER_DEBUG|[1]|DEBUG|setup
c|EXECUTION_STARTED
d|CODE_UNIT_STARTED|[EXTERNAL]|01p|Later.found
e|EXECUTION_FINISHED
";
        let segment = split_segments(trace).next().unwrap();
        assert_eq!(segment.unit.unwrap().method_name, "found");
        assert!(segment.text.starts_with("c|EXECUTION_STARTED"));
    }

    #[test]
    fn test_crlf_lines() {
        let trace = BLOCK.replace('\n', "\r\n");
        let segment = split_segments(&trace).next().unwrap();
        assert_eq!(segment.unit.unwrap().method_name, "testTotal");
    }

    #[test]
    fn test_classify() {
        let segment = split_segments(BLOCK).next().unwrap();
        assert_eq!(
            classify(&segment, |name| name == "InvoiceTest"),
            SegmentTarget::Method(CodeUnit {
                class_name: "InvoiceTest".to_string(),
                method_name: "testTotal".to_string(),
            })
        );
        assert_eq!(
            classify(&segment, |_| false),
            SegmentTarget::CarryToPrevious
        );

        let anonymous = Segment {
            unit: None,
            text: String::new(),
        };
        assert_eq!(
            classify(&anonymous, |_| true),
            SegmentTarget::CarryToPrevious
        );
    }
}
