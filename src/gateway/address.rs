use std::sync::LazyLock;

use regex::Regex;

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[0-9]+").expect("digit run pattern is valid"));

/// Street line split into the parts the processor expects
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedStreet {
    pub street: Option<String>,
    pub number: Option<String>,
}

/// Split a free-text address line into street name and house number.
///
/// House number is the first run of digits in the line, street is whatever is left once that run
/// is cut out. Lines with several numbers (`"12 Main St Apt 4"`) keep every run but the first in
/// the street part.
pub fn parse(line: Option<&str>) -> ParsedStreet {
    let Some(line) = line.filter(|line| !line.trim().is_empty()) else {
        return ParsedStreet::default();
    };
    match DIGIT_RUN.find(line) {
        Some(run) => {
            let street = format!("{}{}", &line[..run.start()], &line[run.end()..]);
            ParsedStreet {
                street: Some(street.trim().to_owned()),
                number: Some(run.as_str().to_owned()),
            }
        }
        None => ParsedStreet {
            street: Some(line.trim().to_owned()),
            number: None,
        },
    }
}
