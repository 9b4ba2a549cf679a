//! Codebook scanning state machine.
//!
//! The codebook is read one line at a time. A value/label entry may span
//! several physical lines and the document has no continuation marker, so a
//! line is only finalized once the following line has been seen: the parser
//! always works on the *previous* line and uses the current one as look-ahead.

use super::diagnostics::{Diagnostic, DiagnosticKind};
use super::rows;
use crate::constants::{DEFAULT_PAGE_HEADER, markers};

/// What the parser is collecting at the current line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserMode {
    Idle,
    Description,
    ValueTable,
}

/// Output of a single parser step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseEvent {
    /// A finalized value row for `field`
    Value {
        field: String,
        keys: Vec<String>,
        label: String,
        description: String,
        location: String,
    },
    Diagnostic(Diagnostic),
}

/// Explicit parser state for one pass over a codebook
#[derive(Debug, Clone)]
pub struct CodebookParser {
    page_header: String,
    line_no: usize,
    field: Option<String>,
    location: String,
    description: String,
    continue_description: bool,
    collecting: bool,
    add_row: bool,
    previous: String,
    previous_line_no: usize,
    span_row: String,
}

impl Default for CodebookParser {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_HEADER)
    }
}

impl CodebookParser {
    pub fn new(page_header: impl Into<String>) -> Self {
        Self {
            page_header: page_header.into(),
            line_no: 0,
            field: None,
            location: String::new(),
            description: String::new(),
            continue_description: false,
            collecting: false,
            add_row: false,
            previous: String::new(),
            previous_line_no: 0,
            span_row: String::new(),
        }
    }

    pub fn mode(&self) -> ParserMode {
        if self.collecting {
            ParserMode::ValueTable
        } else if self.continue_description {
            ParserMode::Description
        } else {
            ParserMode::Idle
        }
    }

    /// Field named by the most recent `Column:` line
    pub fn current_field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    #[cfg(test)]
    fn description(&self) -> &str {
        &self.description
    }

    /// Number of lines consumed so far
    pub fn lines_read(&self) -> usize {
        self.line_no
    }

    /// Advance over one raw codebook line
    pub fn step(&mut self, raw_line: &str) -> Vec<ParseEvent> {
        self.line_no += 1;
        let line = raw_line.trim();
        let mut events = Vec::new();

        if line.contains(markers::VALUE_TABLE_HEADER) {
            self.collecting = true;
            self.continue_description = false;
            self.remember(line);
            return events;
        }

        if rows::is_stop_marker(line) {
            self.collecting = false;
            return events;
        }

        if line.contains(markers::COLUMN) {
            match rows::field_context(line) {
                Some(context) => {
                    self.field = Some(context.name);
                    self.location = context.location;
                }
                None => events.push(self.diagnostic(
                    self.line_no,
                    DiagnosticKind::MalformedColumnLine {
                        text: line.to_string(),
                    },
                )),
            }
        }

        self.collect_description(line, &mut events);

        if self.collecting {
            self.collect_value_row(line, &mut events);
        }

        self.remember(line);
        events
    }

    /// Flush a row still waiting for look-ahead at end of input
    pub fn finish(&mut self) -> Vec<ParseEvent> {
        let mut events = Vec::new();
        if self.collecting {
            self.collect_value_row("", &mut events);
            self.collecting = false;
        }
        self.previous.clear();
        events
    }

    fn remember(&mut self, line: &str) {
        self.previous = line.to_string();
        self.previous_line_no = self.line_no;
    }

    fn collect_description(&mut self, line: &str, events: &mut Vec<ParseEvent>) {
        if self.continue_description {
            self.description.push(' ');
            self.description.push_str(line);

            // descriptions are followed by the value listing; anything that
            // opens with a colon is metadata leaking into the text
            if line.starts_with(':') {
                events.push(self.diagnostic(
                    self.line_no,
                    DiagnosticKind::DescriptionIntegrity {
                        text: line.to_string(),
                    },
                ));
            }
        } else if let Some((_, description)) = line.split_once(markers::DESCRIPTION) {
            self.description = description.trim().to_string();
            self.continue_description = true;
        }
    }

    fn collect_value_row(&mut self, line: &str, events: &mut Vec<ParseEvent>) {
        let previous = std::mem::take(&mut self.previous);
        let blank_row = previous.contains(markers::BLANK);

        if line.contains(self.page_header.as_str()) {
            self.collecting = false;
        }
        // BLANK is always the last answer listed and never spans lines
        if blank_row {
            self.collecting = false;
            self.add_row = true;
        }

        if rows::is_extraneous(&previous) {
            return;
        }

        let completes = rows::completes_row(&previous);
        let row = if self.add_row {
            self.add_row = false;
            if blank_row || previous.contains('=') {
                // '=' only shows up in note text continuing onto a second line
                self.span_row.clear();
                previous
            } else if completes {
                let span = std::mem::take(&mut self.span_row);
                format!("{} {}", span, previous)
            } else {
                if line.ends_with(':') {
                    // next field's metadata started before the row completed
                    self.collecting = false;
                } else {
                    self.span_row.push(' ');
                    self.span_row.push_str(&previous);
                    self.add_row = true;
                }
                return;
            }
        } else if !completes {
            self.span_row = previous;
            self.add_row = true;
            return;
        } else {
            previous
        };

        self.finalize_row(&row, events);
    }

    fn finalize_row(&mut self, row: &str, events: &mut Vec<ParseEvent>) {
        let value_row = rows::strip_stat_columns(row);
        let line = self.previous_line_no;

        if value_row.contains(markers::NUMBER_OF) {
            events.push(self.diagnostic(
                line,
                DiagnosticKind::SubRangeSkipped {
                    row: row.to_string(),
                },
            ));
            return;
        }

        let (Some(field), Some((key, label))) =
            (self.field.clone(), rows::split_value_label(value_row))
        else {
            events.push(self.diagnostic(
                line,
                DiagnosticKind::UnparseableRowSkipped {
                    row: row.to_string(),
                },
            ));
            return;
        };

        events.push(ParseEvent::Value {
            field,
            keys: rows::codebook_keys(&key),
            label,
            description: self.description.trim().to_string(),
            location: self.location.trim().to_string(),
        });
    }

    fn diagnostic(&self, line: usize, kind: DiagnosticKind) -> ParseEvent {
        ParseEvent::Diagnostic(Diagnostic::new(line, self.field.as_deref(), kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(parser: &mut CodebookParser, lines: &[&str]) -> Vec<ParseEvent> {
        let mut events: Vec<ParseEvent> = lines.iter().flat_map(|line| parser.step(line)).collect();
        events.extend(parser.finish());
        events
    }

    fn values(events: &[ParseEvent]) -> Vec<(String, Vec<String>, String)> {
        events
            .iter()
            .filter_map(|event| match event {
                ParseEvent::Value {
                    field, keys, label, ..
                } => Some((field.clone(), keys.clone(), label.clone())),
                ParseEvent::Diagnostic(_) => None,
            })
            .collect()
    }

    fn in_table(field: &str) -> CodebookParser {
        let mut parser = CodebookParser::default();
        parser.step(&format!("Column: 112 SAS Variable Name: {}", field));
        parser.step("Value Value Label Frequency Percentage Weighted");
        parser
    }

    #[test]
    fn test_header_enters_value_table_and_ends_description() {
        let mut parser = CodebookParser::default();
        parser.step("Description: Have you ever had a mammogram?");
        assert_eq!(parser.mode(), ParserMode::Description);

        parser.step("Value Value Label Frequency Percentage Weighted");
        assert_eq!(parser.mode(), ParserMode::ValueTable);
    }

    #[test]
    fn test_stop_marker_leaves_value_table() {
        let mut parser = in_table("HADMAM");
        parser.step("Type: Num");
        // " Type: " needs a leading space
        assert_eq!(parser.mode(), ParserMode::ValueTable);

        parser.step("Section Name: Women's Health Type: Num");
        assert_eq!(parser.mode(), ParserMode::Idle);
    }

    #[test]
    fn test_column_line_sets_field_context() {
        let mut parser = CodebookParser::default();
        parser.step("Column: 1-2 SAS Variable Name: _STATE");
        assert_eq!(parser.current_field(), Some("_STATE"));

        let events = parser.step("Column: 3-4");
        assert_eq!(parser.current_field(), Some("_STATE"));
        assert!(matches!(
            &events[..],
            [ParseEvent::Diagnostic(Diagnostic {
                kind: DiagnosticKind::MalformedColumnLine { .. },
                ..
            })]
        ));
    }

    #[test]
    fn test_single_line_value_row() {
        let mut parser = in_table("HADMAM");
        let events = run(&mut parser, &["1 Yes 120 12.34 11.98"]);

        assert_eq!(
            values(&events),
            vec![(
                "HADMAM".to_string(),
                vec!["1".to_string(), "01".to_string()],
                "Yes".to_string()
            )]
        );
    }

    #[test]
    fn test_row_is_finalized_on_following_line() {
        let mut parser = in_table("HADMAM");
        assert!(parser.step("1 Yes 120 12.34 11.98").is_empty());

        let events = parser.step("2 No 880 87.66 88.02");
        assert_eq!(values(&events).len(), 1);
        assert_eq!(values(&events)[0].2, "Yes");
    }

    #[test]
    fn test_span_row_is_concatenated() {
        let mut parser = in_table("CHECKUP1");
        let events = run(
            &mut parser,
            &["2 No, not in the", "past 12 months 80 8.00 7.55"],
        );

        let rows = values(&events);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].1, vec!["2", "02"]);
        assert_eq!(rows[0].2, "No, not in the past 12 months");
    }

    #[test]
    fn test_three_line_span_row() {
        let mut parser = in_table("LASTPAP2");
        let events = run(
            &mut parser,
            &[
                "3 Within the past 3 years (2 years but",
                "less than 3 years",
                "ago) 55 5.50 5.10",
                "4 Never 10 1.00 0.90",
            ],
        );

        let rows = values(&events);
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].2,
            "Within the past 3 years (2 years but less than 3 years ago)"
        );
        assert_eq!(rows[1].2, "Never");
    }

    #[test]
    fn test_blank_row_ends_collection() {
        let mut parser = in_table("HOWLONG");
        let events = run(
            &mut parser,
            &[
                "BLANK 40 4.00 3.90",
                "9 Refused 3 0.30 0.20",
                "8 Something else 3 0.30 0.20",
            ],
        );

        assert_eq!(
            values(&events),
            vec![(
                "HOWLONG".to_string(),
                vec![" ".to_string()],
                "Not asked or Missing".to_string()
            )]
        );
        assert_eq!(parser.mode(), ParserMode::Idle);
    }

    #[test]
    fn test_blank_row_discards_pending_span() {
        let mut parser = in_table("HOWLONG");
        let events = run(
            &mut parser,
            &[
                "5 Five or more years",
                "BLANK Not asked or Missing 40 4.00 3.90",
                "Weighted",
            ],
        );

        let rows = values(&events);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].1, vec![" "]);
    }

    #[test]
    fn test_go_to_is_truncated() {
        let mut parser = in_table("HADMAM");
        let events = run(
            &mut parser,
            &["2 No Go to Section 4.05 880 87.66 88.02"],
        );
        assert_eq!(values(&events)[0].2, "No");
    }

    #[test]
    fn test_skip_instruction_without_label_is_skipped() {
        let mut parser = in_table("HADMAM");
        let events = run(
            &mut parser,
            &["2 Go to Section 4 880 87.66 88.02", "3 Maybe 5 0.50 0.40"],
        );

        let rows = values(&events);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].2, "Maybe");
        assert!(events.iter().any(|event| matches!(
            event,
            ParseEvent::Diagnostic(Diagnostic {
                kind: DiagnosticKind::UnparseableRowSkipped { row },
                ..
            }) if row == "2 Go to Section 4 880 87.66 88.02"
        )));
    }

    #[test]
    fn test_equals_row_drops_pending_span() {
        let mut parser = in_table("WTKG3");
        let events = run(
            &mut parser,
            &[
                "1 Weight in",
                "Weight = kilograms times 100 50 5.00 4.90",
                "2 No 880 87.66 88.02",
            ],
        );

        assert_eq!(
            values(&events),
            vec![
                (
                    "WTKG3".to_string(),
                    vec!["Weight".to_string()],
                    "= kilograms times 100".to_string()
                ),
                (
                    "WTKG3".to_string(),
                    vec!["2".to_string(), "02".to_string()],
                    "No".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_equals_line_after_notes_starts_a_span() {
        let mut parser = in_table("MAXDRNKS");
        let events = run(
            &mut parser,
            &[
                "1 Yes 1 1.00 1.00",
                "Notes: value is capped",
                "X = 20 or X > 100",
                "2 No 1 1.00 1.00",
            ],
        );

        // the note text is joined with the next row; "2" never gets a label
        assert_eq!(
            values(&events),
            vec![
                (
                    "MAXDRNKS".to_string(),
                    vec!["1".to_string(), "01".to_string()],
                    "Yes".to_string()
                ),
                (
                    "MAXDRNKS".to_string(),
                    vec!["X".to_string(), "0X".to_string()],
                    "= 20 or X > 100 2 No".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_number_of_row_is_not_inserted() {
        let mut parser = in_table("CHILDREN");
        let events = run(
            &mut parser,
            &[
                "1 - 87 Number of children 300 30.00 28.50",
                "88 None 600 60.00 61.00",
            ],
        );

        let rows = values(&events);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].1, vec!["88"]);
        assert!(events.iter().any(|event| matches!(
            event,
            ParseEvent::Diagnostic(Diagnostic {
                kind: DiagnosticKind::SubRangeSkipped { .. },
                ..
            })
        )));
    }

    #[test]
    fn test_page_header_ends_collection() {
        let mut parser = in_table("MEDCOST");
        let events = run(
            &mut parser,
            &[
                "1 Yes 100 10.00 9.50",
                "BEHAVIORAL RISK FACTOR SURVEILLANCE SYSTEM",
                "2 No 900 90.00 90.50",
            ],
        );

        // the row before the break is still finalized
        let rows = values(&events);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].2, "Yes");
        assert_eq!(parser.mode(), ParserMode::Idle);
    }

    #[test]
    fn test_span_abandoned_when_next_field_starts() {
        let mut parser = in_table("DRVISITS");
        let events = run(
            &mut parser,
            &["1 - 76 Number of", "visits", "Label:"],
        );

        assert!(values(&events).is_empty());
        assert_eq!(parser.mode(), ParserMode::Idle);
    }

    #[test]
    fn test_extraneous_lines_are_skipped() {
        let mut parser = in_table("PSATIME");
        let events = run(
            &mut parser,
            &[
                "Percentage",
                "Notes: asked of men aged 40 and over",
                "1 Within the past year 50 5.00 4.80",
            ],
        );

        let rows = values(&events);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].2, "Within the past year");
    }

    #[test]
    fn test_multi_line_description_and_stamp() {
        let mut parser = CodebookParser::default();
        let events = run(
            &mut parser,
            &[
                "Column: 73 SAS Variable Name: HLTHPLN1",
                "Description: Do you have any kind of health care coverage,",
                "including health insurance?",
                "Value Value Label Frequency Percentage Weighted",
                "1 Yes 400 90.00 88.00",
            ],
        );

        match &events[..] {
            [ParseEvent::Value {
                description,
                location,
                ..
            }] => {
                assert_eq!(
                    description,
                    "Do you have any kind of health care coverage, including health insurance?"
                );
                assert_eq!(location, "73");
            }
            other => panic!("unexpected events: {:?}", other),
        }
    }

    #[test]
    fn test_description_integrity_warning_is_not_fatal() {
        let mut parser = CodebookParser::default();
        parser.step("Description: Income level");
        let events = parser.step(": stray metadata");

        assert!(matches!(
            &events[..],
            [ParseEvent::Diagnostic(Diagnostic {
                kind: DiagnosticKind::DescriptionIntegrity { .. },
                line: 2,
                ..
            })]
        ));
        assert_eq!(parser.description(), "Income level : stray metadata");
    }

    #[test]
    fn test_row_without_field_is_skipped() {
        let mut parser = CodebookParser::default();
        parser.step("Value Value Label Frequency Percentage Weighted");
        let events = run(&mut parser, &["1 Yes 120 12.34 11.98"]);

        assert!(values(&events).is_empty());
        assert_eq!(events.len(), 1);
    }
}
