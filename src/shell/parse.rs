use super::ast::{parser, Command, Pipeline};
use super::env::Env;
use crate::error::ParseError;

/// Turn one input line into a pipeline ready for execution. `None` means the
/// line was blank or was consumed as a variable assignment.
pub fn parse_line(line: &str, env: &mut Env) -> Result<Option<Pipeline>, ParseError> {
    if let Some(eq) = assignment_position(line) {
        let name = &line[..eq];
        if !is_valid_name(name) {
            return Err(ParseError::InvalidVariableName(name.to_owned()));
        }
        env.set(name, &line[eq + 1..]);
        return Ok(None);
    }

    let mut stages: Vec<Command> = parser::pipeline(line)?
        .into_iter()
        .filter(|stage| !stage.is_empty())
        .collect();

    if stages.is_empty() {
        return Ok(None);
    }

    for stage in &mut stages {
        substitute(stage, env);
    }

    Ok(Some(Pipeline { stages }))
}

/// A line is an assignment when the text before its first `=` could be a
/// variable name: no whitespace, no pipe. `echo a=b` stays a pipeline.
/// Everything after the first `=` is the value, further `=` included.
fn assignment_position(line: &str) -> Option<usize> {
    let eq = line.find('=')?;
    let before = &line[..eq];
    if before.chars().any(|c| matches!(c, ' ' | '\t' | '|')) {
        None
    } else {
        Some(eq)
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphabetic() || c == '_')
}

/// A `$NAME` argument is replaced wholesale, once, with the stored value or
/// the empty string when unset. Redirection paths are left untouched.
fn substitute(stage: &mut Command, env: &Env) {
    for arg in &mut stage.args {
        if let Some(name) = arg.strip_prefix('$') {
            *arg = env.get(name).unwrap_or("").to_owned();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(pipeline: &Pipeline, stage: usize) -> Vec<&str> {
        pipeline.stages[stage]
            .args
            .iter()
            .map(String::as_str)
            .collect()
    }

    #[test]
    fn assignment_sets_variable_and_yields_no_pipeline() {
        let mut env = Env::new();
        let parsed = parse_line("X=1", &mut env).unwrap();
        assert!(parsed.is_none());
        assert_eq!(env.get("X"), Some("1"));
    }

    #[test]
    fn assignment_value_may_contain_anything() {
        let mut env = Env::new();
        assert!(parse_line("A=b=c", &mut env).unwrap().is_none());
        assert_eq!(env.get("A"), Some("b=c"));

        assert!(parse_line("B=one two | three", &mut env).unwrap().is_none());
        assert_eq!(env.get("B"), Some("one two | three"));

        assert!(parse_line("C=", &mut env).unwrap().is_none());
        assert_eq!(env.get("C"), Some(""));
    }

    #[test]
    fn assignment_overwrites() {
        let mut env = Env::new();
        parse_line("X=1", &mut env).unwrap();
        parse_line("X=2", &mut env).unwrap();
        assert_eq!(env.get("X"), Some("2"));
    }

    #[test]
    fn invalid_names_are_rejected_and_store_untouched() {
        for line in ["X1=2", "FOO-BAR=x", "9=y", "=z", "A B=c"] {
            let mut env = Env::new();
            match parse_line(line, &mut env) {
                Err(ParseError::InvalidVariableName(_)) => {}
                // a space before `=` demotes the line to a pipeline
                Ok(Some(_)) if line == "A B=c" => {}
                other => panic!("{line:?} parsed as {other:?}"),
            }
            assert_eq!(env.get("X1"), None);
            assert_eq!(env.get("FOO-BAR"), None);
            assert_eq!(env.get("9"), None);
            assert_eq!(env.get(""), None);
        }
    }

    #[test]
    fn underscore_names_are_valid() {
        let mut env = Env::new();
        assert!(parse_line("_private=ok", &mut env).unwrap().is_none());
        assert_eq!(env.get("_private"), Some("ok"));
    }

    #[test]
    fn blank_lines_yield_no_pipeline() {
        let mut env = Env::new();
        assert!(parse_line("", &mut env).unwrap().is_none());
        assert!(parse_line("   ", &mut env).unwrap().is_none());
        assert!(parse_line(" \t ", &mut env).unwrap().is_none());
    }

    #[test]
    fn equals_inside_an_argument_stays_a_pipeline() {
        let mut env = Env::new();
        let pipeline = parse_line("echo a=b", &mut env).unwrap().unwrap();
        assert_eq!(args(&pipeline, 0), ["echo", "a=b"]);
        assert_eq!(env.get("a"), None);
    }

    #[test]
    fn unset_variable_substitutes_to_empty() {
        let mut env = Env::new();
        let pipeline = parse_line("echo $FOO", &mut env).unwrap().unwrap();
        assert_eq!(args(&pipeline, 0), ["echo", ""]);
    }

    #[test]
    fn assignment_then_substitution_round_trips() {
        let mut env = Env::new();
        parse_line("X=1", &mut env).unwrap();
        let pipeline = parse_line("echo $X", &mut env).unwrap().unwrap();
        assert_eq!(args(&pipeline, 0), ["echo", "1"]);
    }

    #[test]
    fn substitution_is_whole_token_only() {
        let mut env = Env::new();
        parse_line("X=1", &mut env).unwrap();
        let pipeline = parse_line("echo a$X $Xb", &mut env).unwrap().unwrap();
        // no partial substitution inside a token; $Xb is the (unset) name Xb
        assert_eq!(args(&pipeline, 0), ["echo", "a$X", ""]);
    }

    #[test]
    fn substitution_is_not_recursive() {
        let mut env = Env::new();
        parse_line("A=$B", &mut env).unwrap();
        parse_line("B=2", &mut env).unwrap();
        let pipeline = parse_line("echo $A", &mut env).unwrap().unwrap();
        assert_eq!(args(&pipeline, 0), ["echo", "$B"]);
    }

    #[test]
    fn redirection_paths_are_never_substituted() {
        let mut env = Env::new();
        parse_line("F=real.txt", &mut env).unwrap();
        let pipeline = parse_line("cat < $F > $F", &mut env).unwrap().unwrap();
        assert_eq!(pipeline.stages[0].input.as_deref(), Some("$F"));
        assert_eq!(pipeline.stages[0].output.as_deref(), Some("$F"));
    }

    #[test]
    fn three_stage_pipeline_keeps_source_order() {
        let mut env = Env::new();
        let pipeline = parse_line("cmd1 | cmd2 | cmd3", &mut env).unwrap().unwrap();
        assert_eq!(pipeline.stages.len(), 3);
        assert_eq!(args(&pipeline, 0), ["cmd1"]);
        assert_eq!(args(&pipeline, 1), ["cmd2"]);
        assert_eq!(args(&pipeline, 2), ["cmd3"]);
    }

    #[test]
    fn empty_stages_are_dropped() {
        let mut env = Env::new();
        let pipeline = parse_line("a || b", &mut env).unwrap().unwrap();
        assert_eq!(pipeline.stages.len(), 2);

        let pipeline = parse_line("| a", &mut env).unwrap().unwrap();
        assert_eq!(pipeline.stages.len(), 1);
        assert_eq!(args(&pipeline, 0), ["a"]);
    }

    #[test]
    fn redirection_tokens_are_excluded_from_argv() {
        let mut env = Env::new();
        let pipeline = parse_line("ls > out.txt", &mut env).unwrap().unwrap();
        assert_eq!(args(&pipeline, 0), ["ls"]);
        assert_eq!(pipeline.stages[0].output.as_deref(), Some("out.txt"));
        assert!(!pipeline.stages[0].append);
    }

    #[test]
    fn malformed_redirection_is_a_syntax_error() {
        let mut env = Env::new();
        assert!(matches!(
            parse_line("echo >", &mut env),
            Err(ParseError::Syntax(_))
        ));
        assert!(matches!(
            parse_line("> out.txt", &mut env),
            Err(ParseError::Syntax(_))
        ));
    }
}
