//! Hand-rolled CSV codec for dictionary import/export
//!
//! Format: `abbreviation,meaning,description` header, one row per entry.
//! Fields containing a comma, quote, CR or LF are wrapped in double quotes
//! with inner quotes doubled. Blank lines are ignored on input.

use crate::error::{AbbrError, Result};

pub const HEADER: [&str; 3] = ["abbreviation", "meaning", "description"];

/// One parsed record with the 1-based line it started on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    pub line: usize,
    pub fields: Vec<String>,
}

impl CsvRow {
    /// True if every field matches the column names, in order, ignoring
    /// case. A missing `description` column is allowed.
    pub fn is_header(&self) -> bool {
        (2..=HEADER.len()).contains(&self.fields.len())
            && self
                .fields
                .iter()
                .zip(HEADER)
                .all(|(field, name)| field.trim().eq_ignore_ascii_case(name))
    }
}

/// Split CSV text into rows.
///
/// Accepts LF, CRLF and bare CR line endings and a missing final newline.
/// The only fatal error is a quoted field left open at end of input.
pub fn parse(text: &str) -> Result<Vec<CsvRow>> {
    let mut rows = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut at_field_start = true;
    let mut line = 1;
    let mut row_line = 1;

    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push('\n');
                }
                _ => field.push(ch),
            }
            continue;
        }

        match ch {
            '"' if at_field_start => {
                in_quotes = true;
                at_field_start = false;
            }
            ',' => {
                fields.push(std::mem::take(&mut field));
                at_field_start = true;
            }
            '\r' | '\n' => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                fields.push(std::mem::take(&mut field));
                push_row(&mut rows, std::mem::take(&mut fields), row_line);
                line += 1;
                row_line = line;
                at_field_start = true;
            }
            _ => {
                field.push(ch);
                at_field_start = false;
            }
        }
    }

    if in_quotes {
        return Err(AbbrError::Csv {
            line: row_line,
            message: "unterminated quoted field".to_string(),
        });
    }
    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        push_row(&mut rows, fields, row_line);
    }

    Ok(rows)
}

fn push_row(rows: &mut Vec<CsvRow>, fields: Vec<String>, line: usize) {
    let blank = fields.len() == 1 && fields[0].trim().is_empty();
    if !blank {
        rows.push(CsvRow { line, fields });
    }
}

/// Quote a field if it contains a delimiter, quote or line break
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render a header line followed by one line per `(abbreviation, meaning, description)`
pub fn write<'a, I>(rows: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str, &'a str)>,
{
    let mut out = HEADER.join(",");
    out.push('\n');
    for (abbreviation, meaning, description) in rows {
        out.push_str(&escape_field(abbreviation));
        out.push(',');
        out.push_str(&escape_field(meaning));
        out.push(',');
        out.push_str(&escape_field(description));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(rows: &[CsvRow]) -> Vec<Vec<&str>> {
        rows.iter()
            .map(|r| r.fields.iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn test_simple_rows() {
        let rows = parse("abbreviation,meaning,description\nAPI,Application Programming Interface,\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].is_header());
        assert_eq!(
            fields(&rows)[1],
            vec!["API", "Application Programming Interface", ""]
        );
        assert_eq!(rows[1].line, 2);
    }

    #[test]
    fn test_header_needs_every_column_name() {
        let row = |fields: &[&str]| CsvRow {
            line: 1,
            fields: fields.iter().map(|f| f.to_string()).collect(),
        };
        assert!(row(&["Abbreviation", " MEANING ", "description"]).is_header());
        assert!(row(&["abbreviation", "meaning"]).is_header());
        assert!(!row(&["ABBREVIATION", "The word itself", ""]).is_header());
        assert!(!row(&["abbreviation"]).is_header());
        assert!(!row(&["abbreviation", "meaning", "description", "extra"]).is_header());
    }

    #[test]
    fn test_quoted_fields() {
        let rows = parse("\"A,B\",\"say \"\"hi\"\"\",\"two\nlines\"\nNEXT,x").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(fields(&rows)[0], vec!["A,B", "say \"hi\"", "two\nlines"]);
        // second record starts on line 3 because the quoted newline consumed one
        assert_eq!(rows[1].line, 3);
        assert_eq!(fields(&rows)[1], vec!["NEXT", "x"]);
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let rows = parse("A,1\r\n\r\nB,2\r\n").unwrap();
        assert_eq!(fields(&rows), vec![vec!["A", "1"], vec!["B", "2"]]);
        assert_eq!(rows[1].line, 3);
    }

    #[test]
    fn test_no_trailing_newline() {
        let rows = parse("A,1").unwrap();
        assert_eq!(fields(&rows), vec![vec!["A", "1"]]);
    }

    #[test]
    fn test_trailing_empty_field_kept() {
        let rows = parse("A,1,").unwrap();
        assert_eq!(fields(&rows), vec![vec!["A", "1", ""]]);
    }

    #[test]
    fn test_unterminated_quote() {
        let err = parse("A,1\nB,\"open").unwrap_err();
        assert_eq!(
            err,
            AbbrError::Csv { line: 2, message: "unterminated quoted field".into() }
        );
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"x\""), "\"say \"\"x\"\"\"");
        assert_eq!(escape_field("l1\nl2"), "\"l1\nl2\"");
    }

    #[test]
    fn test_write_then_parse_preserves_awkward_fields() {
        let text = write(vec![("A,B", "quote \" inside", "multi\nline")]);
        assert!(text.starts_with("abbreviation,meaning,description\n"));

        let rows = parse(&text).unwrap();
        assert_eq!(fields(&rows)[1], vec!["A,B", "quote \" inside", "multi\nline"]);
    }
}
