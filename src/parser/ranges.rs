// Highlight line range parser
//
// Grammar accepted by the renderer's `--highlight-lines` flag:
//   spec  := item (';' item)*
//   item  := N | N '-' M

use crate::error::ShotError;
use nom::{
    character::complete::{char, digit1, multispace0},
    combinator::{all_consuming, map_res, opt},
    multi::separated_list1,
    sequence::{delimited, preceded},
    IResult,
};

/// Inclusive, 1-based line range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: u32,
    pub end: u32,
}

/// Wrap a parser to skip surrounding whitespace
fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn line_number(input: &str) -> IResult<&str, u32> {
    map_res(digit1, str::parse::<u32>)(input)
}

/// Parse a single item: `N` or `N-M`
fn line_range(input: &str) -> IResult<&str, LineRange> {
    let (input, start) = ws(line_number)(input)?;
    let (input, end) = opt(preceded(ws(char('-')), ws(line_number)))(input)?;
    Ok((
        input,
        LineRange {
            start,
            end: end.unwrap_or(start),
        },
    ))
}

/// Parse a `;`-separated list of ranges (may leave trailing input)
pub fn parse_line_ranges(input: &str) -> IResult<&str, Vec<LineRange>> {
    separated_list1(char(';'), line_range)(input)
}

/// Parse and validate a complete highlight spec
pub fn line_ranges(spec: &str) -> Result<Vec<LineRange>, ShotError> {
    let invalid = || ShotError::InvalidHighlightLines {
        spec: spec.to_string(),
    };

    let (_, ranges) = all_consuming(parse_line_ranges)(spec).map_err(|_| invalid())?;

    // Lines are 1-based and ranges must not run backwards
    if ranges.iter().any(|r| r.start == 0 || r.end < r.start) {
        return Err(invalid());
    }

    Ok(ranges)
}
