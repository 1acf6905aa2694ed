//! This module provides the parser for champion descriptors, utilizing the `pest` crate.
//! It defines the grammar for `.bb` files and functions to parse the input into a `Champion`.

use crate::{
    analyzer::analyze,
    types::{
        Champion, ExitRule, FinalSweepCost, GliderCost, Recurrence, StepError, SweepCost,
        MAX_DESCRIPTOR_SIZE,
    },
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::Pair,
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;
use std::collections::HashSet;

/// Derives a `PestParser` for the descriptor grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct DescriptorParser;

/// Parses the given input string into a `Champion`.
///
/// This is the main entry point for parsing champion descriptors. The parsed
/// recurrence is validated before being returned.
///
/// # Returns
///
/// * `Ok(Champion)` if the input is successfully parsed and validated.
/// * `Err(StepError::ParseError)` if there are any syntax errors or duplicate sections.
/// * `Err(StepError::ValidationError)` if a section is missing or the constants are unusable.
pub fn parse(input: &str) -> Result<Champion, StepError> {
    if input.len() > MAX_DESCRIPTOR_SIZE {
        return Err(StepError::ValidationError(format!(
            "Descriptor is {} bytes, the limit is {}",
            input.len(),
            MAX_DESCRIPTOR_SIZE
        )));
    }

    let root = DescriptorParser::parse(Rule::descriptor, input.trim())
        .map_err(|e| StepError::ParseError(e.into()))?
        .next()
        .ok_or_else(|| StepError::ValidationError("Empty descriptor".to_string()))?;

    let champion = parse_descriptor(root)?;

    analyze(&champion)?;

    Ok(champion)
}

/// Parses the sections of a `Pair<Rule::descriptor>` into a `Champion`.
fn parse_descriptor(pair: Pair<Rule>) -> Result<Champion, StepError> {
    let mut name: Option<String> = None;
    let mut program: Option<String> = None;
    let mut bootstrap: Option<u64> = None;
    let mut counter: Option<u64> = None;
    let mut multiplier: Option<u64> = None;
    let mut glider: Option<GliderCost> = None;
    let mut sweep: Option<SweepCost> = None;
    let mut exit_rule: Option<ExitRule> = None;
    let mut final_sweep: Option<FinalSweepCost> = None;
    let mut diagnostics: Option<usize> = None;
    let mut seen = HashSet::new();

    for p in pair.into_inner() {
        let rule = p.as_rule();

        check_unique_rule(rule, p.as_span(), &mut seen)?;

        match rule {
            Rule::name => name = Some(parse_text(p)),
            Rule::code => program = Some(parse_text(p)),
            Rule::bootstrap => bootstrap = Some(parse_numbers(p)?[0]),
            Rule::counter => counter = Some(parse_numbers(p)?[0]),
            Rule::multiplier => multiplier = Some(parse_numbers(p)?[0]),
            Rule::glider => {
                let values = parse_numbers(p)?;
                glider = Some(GliderCost {
                    per_counter: values[0],
                    first_offset: values[1],
                    offset: values.get(2).copied().unwrap_or(values[1]),
                });
            }
            Rule::sweep => {
                let values = parse_numbers(p)?;
                sweep = Some(SweepCost {
                    per_sweep: values[0],
                    first_base: values[1],
                    base: values.get(2).copied().unwrap_or(values[1]),
                });
            }
            Rule::exit => {
                let values = parse_numbers(p)?;
                exit_rule = Some(ExitRule {
                    factor: values[0],
                    divisor: values[1],
                    drop: values.get(2).copied().unwrap_or(0),
                });
            }
            Rule::final_sweep => final_sweep = Some(parse_final_sweep(p)?),
            Rule::diagnostics => {
                let span = p.as_span();
                let value = parse_numbers(p)?[0];
                diagnostics = Some(
                    usize::try_from(value)
                        .map_err(|_| parse_error("Diagnostic bound is too large", span))?,
                );
            }
            _ => {} // EOI
        }
    }

    let name = check_required_rule(name, "name")?;
    let recurrence = Recurrence {
        bootstrap: check_required_rule(bootstrap, "bootstrap")?,
        counter: check_required_rule(counter, "counter")?,
        multiplier: check_required_rule(multiplier, "multiplier")?,
        glider: check_required_rule(glider, "glider")?,
        sweep: check_required_rule(sweep, "sweep")?,
        exit_rule: check_required_rule(exit_rule, "exit")?,
        final_sweep: check_required_rule(final_sweep, "final")?,
    };

    Ok(Champion {
        name,
        program,
        recurrence,
        diagnostics: diagnostics.unwrap_or(0),
    })
}

/// Parses a `Pair<Rule::final_sweep>`.
///
/// The `+ offset` inside the parentheses is optional, so the closing `+ exit`
/// is always the last number.
fn parse_final_sweep(pair: Pair<Rule>) -> Result<FinalSweepCost, StepError> {
    let values = parse_numbers(pair)?;
    let (offset, exit) = match values.len() {
        4 => (values[2], values[3]),
        _ => (0, values[2]),
    };

    Ok(FinalSweepCost {
        entry: values[0],
        per_sweep: values[1],
        offset,
        exit,
    })
}

/// Collects the `number` tokens of a section in order.
fn parse_numbers(pair: Pair<Rule>) -> Result<Vec<u64>, StepError> {
    pair.into_inner()
        .filter(|p| p.as_rule() == Rule::number)
        .map(|p| {
            p.as_str().parse::<u64>().map_err(|_| {
                parse_error(&format!("Number out of range: {}", p.as_str()), p.as_span())
            })
        })
        .collect()
}

/// Extracts the trimmed free text of a `name` or `program` section.
fn parse_text(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .next()
        .map(|p| p.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Creates a `StepError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> StepError {
    StepError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

/// Checks if a given section has already been declared.
fn check_unique_rule(rule: Rule, span: Span, seen: &mut HashSet<Rule>) -> Result<(), StepError> {
    if rule == Rule::EOI {
        return Ok(());
    }

    if !seen.insert(rule) {
        return Err(parse_error(
            &format!("Duplicate \"{}:\" declaration", section_keyword(rule)),
            span,
        ));
    }

    Ok(())
}

/// Checks if a required section is present, returning an `Err` if it's missing.
fn check_required_rule<T>(value: Option<T>, keyword: &str) -> Result<T, StepError> {
    value.ok_or_else(|| StepError::ValidationError(format!("Missing '{keyword}' section")))
}

/// Returns the keyword a section is written with.
fn section_keyword(rule: Rule) -> &'static str {
    match rule {
        Rule::code => "program",
        Rule::final_sweep => "final",
        Rule::name => "name",
        Rule::bootstrap => "bootstrap",
        Rule::counter => "counter",
        Rule::multiplier => "multiplier",
        Rule::glider => "glider",
        Rule::sweep => "sweep",
        Rule::exit => "exit",
        Rule::diagnostics => "diagnostics",
        _ => "?",
    }
}
