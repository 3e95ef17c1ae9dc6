//! Rule listings for `quarry rules` and rule reports for `quarry test`.

use std::io::Write;

use quarry_core::{Rule, RuleError, RuleSet};

use super::write_line;
use crate::errors::AppError;

/// Writes every rule as an indented block, in declaration order.
///
/// ```text
/// no-eval
///   severity: error
///   message: avoid eval
///   patterns:
///     - call(identifier("eval"), ...)
///   tags: security
/// ```
///
/// The `tags` line is omitted for untagged rules.
pub(crate) fn write_rules<W: Write>(out: &mut W, rules: &RuleSet) -> Result<(), AppError> {
    for rule in rules {
        write_rule(out, rule)?;
    }
    out.flush()?;
    Ok(())
}

fn write_rule<W: Write>(out: &mut W, rule: &Rule) -> Result<(), AppError> {
    write_line(out, rule.id())?;
    write_line(out, &format!("  severity: {}", rule.severity()))?;
    write_line(out, &format!("  message: {}", rule.message()))?;
    write_line(out, "  patterns:")?;
    for pattern in rule.patterns() {
        write_line(out, &format!("    - {}", pattern.source()))?;
    }
    if !rule.tags().is_empty() {
        write_line(out, &format!("  tags: {}", rule.tags().join(", ")))?;
    }
    Ok(())
}

/// Writes one `error:` line per problem, then a summary line.
///
/// ```text
/// error: rule 'no-eval' has no patterns
/// 2 rules checked, 1 error
/// ```
pub(crate) fn write_rule_problems<W: Write>(
    out: &mut W,
    checked: usize,
    problems: &[RuleError],
) -> Result<(), AppError> {
    for problem in problems {
        write_line(out, &format!("error: {problem}"))?;
    }
    write_line(
        out,
        &format!(
            "{checked} {} checked, {} {}",
            plural(checked, "rule"),
            problems.len(),
            plural(problems.len(), "error")
        ),
    )?;
    out.flush()?;
    Ok(())
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        noun.to_owned()
    } else {
        format!("{noun}s")
    }
}
