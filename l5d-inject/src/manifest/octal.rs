//! YAML 1.1 octal integers.
//!
//! The Kubernetes API server reads manifests as YAML 1.1, where a plain
//! `0644` is the octal integer 420. `serde_yaml` follows YAML 1.2, reads the
//! same scalar as the string `"0644"` and writes it back quoted, which would
//! turn a `defaultMode` into a string. Plain leading-zero scalars are turned
//! back into integers before a workload is re-encoded. Quoted ones stay
//! strings.
//!
//! The decoded tree no longer knows how a scalar was written, so the style
//! is recovered from the document text. Occurrences of a literal are matched
//! to tree values in document order. When the counts disagree (aliases,
//! block scalars) a literal is converted only if it never appears quoted.

use std::collections::HashMap;

use serde_yaml::{Mapping, Value};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Style {
    Plain,
    Quoted,
}

/// Replaces string values that were plain YAML 1.1 octal scalars in `raw`
/// with the integers they denote. Keys are left alone.
pub fn restore_octal_integers(object: &mut Mapping, raw: &str) {
    let mut found = Vec::new();
    for value in object.values_mut() {
        collect_octal_strings(value, &mut found);
    }

    let mut by_literal: HashMap<String, Vec<&mut Value>> = HashMap::new();
    for value in found {
        let Value::String(literal) = &*value else { continue };
        let literal = literal.clone();
        by_literal.entry(literal).or_default().push(value);
    }

    for (literal, values) in by_literal {
        let Some(number) = parse_octal(&literal) else { continue };
        let styles = source_styles(raw, &literal);
        let never_quoted = !styles.is_empty() && styles.iter().all(|style| *style == Style::Plain);
        let in_order = styles.len() == values.len();

        for (position, value) in values.into_iter().enumerate() {
            let plain = if in_order {
                styles.get(position) == Some(&Style::Plain)
            } else {
                never_quoted
            };
            if plain {
                *value = Value::Number(number.into());
            }
        }
    }
}

fn collect_octal_strings<'a>(value: &'a mut Value, found: &mut Vec<&'a mut Value>) {
    if matches!(&*value, Value::String(literal) if is_octal_literal(literal)) {
        found.push(value);
        return;
    }
    match value {
        Value::Sequence(items) => {
            for item in items {
                collect_octal_strings(item, found);
            }
        }
        Value::Mapping(mapping) => {
            for item in mapping.values_mut() {
                collect_octal_strings(item, found);
            }
        }
        Value::Tagged(tagged) => collect_octal_strings(&mut tagged.value, found),
        _ => {}
    }
}

/// `[-+]?0[0-7_]+`, the YAML 1.1 octal integer form.
fn is_octal_literal(literal: &str) -> bool {
    let digits = literal.strip_prefix(['-', '+']).unwrap_or(literal);
    digits.len() > 1
        && digits.starts_with('0')
        && digits.bytes().all(|byte| matches!(byte, b'0'..=b'7' | b'_'))
}

fn parse_octal(literal: &str) -> Option<i64> {
    let (sign, digits) = literal
        .strip_prefix('-')
        .map_or_else(|| (1, literal.strip_prefix('+').unwrap_or(literal)), |digits| (-1, digits));
    let digits: String = digits.chars().filter(|c| *c != '_').collect();
    i64::from_str_radix(&digits, 8).ok().map(|number| sign * number)
}

/// How each value-position occurrence of `literal` is written in `raw`, in
/// document order.
fn source_styles(raw: &str, literal: &str) -> Vec<Style> {
    raw.lines()
        .map(strip_comment)
        .flat_map(|line| {
            line.match_indices(literal).filter_map(move |(start, _)| style_at(line, start, literal))
        })
        .collect()
}

fn style_at(line: &str, start: usize, literal: &str) -> Option<Style> {
    let (before, rest) = line.split_at(start);
    let after = rest.strip_prefix(literal)?;

    for quote in ['\'', '"'] {
        if let (Some(before), Some(after)) = (before.strip_suffix(quote), after.strip_prefix(quote)) {
            return (follows_indicator(before) && ends_scalar(after)).then_some(Style::Quoted);
        }
    }
    (follows_indicator(before) && ends_scalar(after)).then_some(Style::Plain)
}

/// A value starts after `: `, `- `, or a flow indicator.
fn follows_indicator(before: &str) -> bool {
    let trimmed = before.trim_end();
    if trimmed.ends_with([',', '[', '{']) {
        return true;
    }
    if trimmed.len() == before.len() {
        return false;
    }
    if trimmed.ends_with(':') {
        return true;
    }
    trimmed
        .strip_suffix('-')
        .is_some_and(|rest| rest.is_empty() || rest.ends_with(char::is_whitespace))
}

fn ends_scalar(after: &str) -> bool {
    let after = after.trim_start();
    after.is_empty() || after.starts_with([',', ']', '}'])
}

fn strip_comment(line: &str) -> &str {
    let mut quote = None;
    let mut previous = ' ';
    for (position, c) in line.char_indices() {
        match quote {
            Some(open) if c == open => quote = None,
            Some(_) => {}
            None if c == '#' && previous.is_whitespace() => return &line[..position],
            None if matches!(c, '\'' | '"')
                && (previous.is_whitespace() || matches!(previous, ':' | ',' | '[' | '{')) =>
            {
                quote = Some(c);
            }
            None => {}
        }
        previous = c;
    }
    line
}
