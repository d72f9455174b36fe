//! Command evaluation engine.
//!
//! Walks a parsed [`Command`] tree against an immutable [`Snapshot`],
//! recording pending changes and printed output in an [`ExecutionContext`].
//! Nothing is edited here; the caller applies the collected changes once the
//! whole tree has finished.

use regex::Regex;
use tracing::{trace, warn};

use crate::command::Command;
use crate::error::SamError;
use crate::exec_context::{Evaluation, ExecutionContext};
use crate::host::ShellFilter;
use crate::region::{Change, Region};
use crate::snapshot::Snapshot;

/// Evaluate `command` over `region` of `snapshot`. Top-level entry point.
///
/// Fails on the first fatal error (for example an address with no match), in
/// which case nothing that was recorded should be applied. Pipe failures are
/// not fatal; they are collected in [`Evaluation::pipe_failures`].
pub fn evaluate(
    command: &Command,
    snapshot: &Snapshot,
    region: Region,
    shell: &dyn ShellFilter,
) -> Result<Evaluation, SamError> {
    let mut ctx = ExecutionContext::new(snapshot, shell);
    execute(command, &mut ctx, region)?;
    Ok(ctx.finish())
}

/// Execute one command on `region`, returning the text it printed.
pub(crate) fn execute(
    command: &Command,
    ctx: &mut ExecutionContext,
    region: Region,
) -> Result<String, SamError> {
    trace!(command = command.name(), %region, "execute");
    match command {
        Command::Addressed { addr, sub } => {
            let target = addr.resolve(ctx.snapshot, region)?;
            execute(sub, ctx, target)
        }
        Command::Print => {
            let text = ctx.text(region);
            ctx.output.push_str(text);
            ctx.output.push('\n');
            Ok(text.to_string())
        }
        Command::Delete => {
            ctx.record(Change::replace(region, ""));
            Ok(String::new())
        }
        Command::Change(text) => {
            ctx.record(Change::replace(region, text.as_str()));
            Ok(String::new())
        }
        Command::Append(text) => {
            ctx.record(Change::insert(region.end, text.as_str()));
            Ok(String::new())
        }
        Command::Insert(text) => {
            ctx.record(Change::insert(region.start, text.as_str()));
            Ok(String::new())
        }
        Command::Pipe(cmd) => {
            let input = ctx.text(region);
            match ctx.shell.run(cmd, input) {
                Ok(replacement) => ctx.record(Change::replace(region, replacement)),
                Err(err) => {
                    warn!(%region, "{err}");
                    ctx.pipe_failures.push(err);
                }
            }
            Ok(String::new())
        }
        Command::Extract {
            pattern,
            sub,
            inverse,
        } => {
            let matches = find_matches(pattern, ctx.text(region), region);
            let targets = if *inverse {
                gaps(region, &matches)
            } else {
                matches
            };
            let mut printed = String::new();
            for target in targets {
                printed.push_str(&execute(sub, ctx, target)?);
            }
            Ok(printed)
        }
        Command::Guard {
            pattern,
            sub,
            inverse,
        } => {
            if pattern.is_match(ctx.text(region)) != *inverse {
                execute(sub, ctx, region)
            } else {
                Ok(String::new())
            }
        }
        Command::Group(cmds) => {
            let mut printed = String::new();
            for cmd in cmds {
                printed.push_str(&execute(cmd, ctx, region)?);
            }
            Ok(printed)
        }
    }
}

/// Successive non-overlapping matches of `pattern` in `text`, the contents of `region`.
///
/// An empty match moves the scan on by one character so the loop always ends.
/// An empty match right where the previous match ended is skipped.
fn find_matches(pattern: &Regex, text: &str, region: Region) -> Vec<Region> {
    let mut found = Vec::new();
    let mut cursor = 0;
    let mut prev_end = None;
    while cursor <= text.len() {
        let Some(m) = pattern.find_at(text, cursor) else {
            break;
        };
        if !(m.is_empty() && prev_end == Some(m.start())) {
            found.push(Region::new(m.start(), m.end()).offset_by(region.start));
        }
        prev_end = Some(m.end());
        cursor = if m.is_empty() {
            match text[m.end()..].chars().next() {
                Some(ch) => m.end() + ch.len_utf8(),
                None => break,
            }
        } else {
            m.end()
        };
    }
    found
}

/// The stretches of `region` between `matches`, including before the first
/// and after the last. Empty stretches are skipped, except that with no
/// matches at all the whole region is the single gap.
fn gaps(region: Region, matches: &[Region]) -> Vec<Region> {
    if matches.is_empty() {
        return vec![region];
    }
    let mut found = Vec::new();
    let mut last_end = region.start;
    for m in matches {
        found.push(Region::new(last_end, m.start));
        last_end = m.end;
    }
    found.push(Region::new(last_end, region.end));
    found.retain(|gap| !gap.is_empty());
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::apply_changes;
    use crate::host::mock::MockShell;
    use crate::parser::{compile_pattern, parse};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn eval(input: &str, text: &str) -> Evaluation {
        let snapshot = Snapshot::new(text);
        let command = parse(input).unwrap();
        evaluate(&command, &snapshot, snapshot.whole(), &MockShell::default()).unwrap()
    }

    fn edit(input: &str, text: &str) -> String {
        apply_changes(text, &eval(input, text).changes).unwrap()
    }

    fn printed(input: &str, text: &str) -> String {
        eval(input, text).output
    }

    // --- Simple commands ---

    #[test]
    fn test_delete_whole_buffer() {
        assert_eq!(edit(",d", "line one\nline two\n"), "");
    }

    #[test]
    fn test_print_appends_newline() {
        let evaluation = eval("p", "abc");
        assert_eq!(evaluation.output, "abc\n");
        assert!(evaluation.changes.is_empty());
    }

    #[test]
    fn test_change_append_insert() {
        assert_eq!(edit("2c/TWO\n/", "one\ntwo\nthree\n"), "one\nTWO\nthree\n");
        assert_eq!(edit("2a/after\n/", "one\ntwo\n"), "one\ntwo\nafter\n");
        assert_eq!(edit("2i/before\n/", "one\ntwo\n"), "one\nbefore\ntwo\n");
    }

    #[test]
    fn test_append_and_insert_are_zero_width() {
        let evaluation = eval("/b/{i/[/ a/]/}", "abc");
        assert_eq!(
            evaluation.changes,
            vec![Change::insert(1, "["), Change::insert(2, "]")]
        );
        assert_eq!(edit("/b/{i/[/ a/]/}", "abc"), "a[b]c");
    }

    // --- Extract ---

    #[test]
    fn test_extract_change() {
        assert_eq!(edit(",x/foo/c/bar/", "foo foo foo"), "bar bar bar");
    }

    #[test]
    fn test_extract_prints_each_match_in_order() {
        assert_eq!(printed("x/[0-9]+/", "a1 b22 c333"), "1\n22\n333\n");
    }

    #[test]
    fn test_extract_without_matches() {
        let evaluation = eval("x/TODO/p", "nothing to see\n");
        assert!(evaluation.output.is_empty());
        assert!(evaluation.changes.is_empty());
    }

    #[test]
    fn test_extract_composes() {
        let text = "ab1 ab2\ncd3 ab4\n";
        assert_eq!(printed("x/.*\\n/{x/ab[0-9]/p}", text), "ab1\nab2\nab4\n");
        assert_eq!(printed("x/.*\\n/x/ab[0-9]/", text), "ab1\nab2\nab4\n");
    }

    #[test]
    fn test_nested_extract_sees_only_its_match() {
        // The inner anchor matches at the start of each outer match, not the buffer.
        assert_eq!(printed(r"x/\w+/x/^./", "hello world"), "h\nw\n");
    }

    #[test]
    fn test_comment_lines_removed_with_newline() {
        let text = "# one\nkeep a\n# two\nkeep b\n";
        assert_eq!(edit(r"x/^#.*\n/d", text), "keep a\nkeep b\n");
    }

    #[test]
    fn test_dot_star_stops_before_newline() {
        // `.` never matches `\n`, so each line break survives.
        let text = "# one\nkeep a\n# two\nkeep b\n";
        assert_eq!(edit("x/^#.*/d", text), "\nkeep a\n\nkeep b\n");
    }

    #[test]
    fn test_empty_matches_terminate() {
        let evaluation = eval("x/a*/i/-/", "baab");
        // empty at 0, "aa" at 1..3, empty at 4; the empty match at 3 touches "aa"
        assert_eq!(
            evaluation.changes,
            vec![
                Change::insert(0, "-"),
                Change::insert(1, "-"),
                Change::insert(4, "-"),
            ]
        );
    }

    #[test]
    fn test_empty_match_after_match_is_skipped() {
        assert_eq!(printed("x/.*/", "ab\ncd"), "ab\ncd\n");
        assert_eq!(printed("x/b*/", "abbc"), "\nbb\n\n");
    }

    #[test]
    fn test_empty_matches_step_over_multibyte() {
        let evaluation = eval("x/x*/i/-/", "éé");
        assert_eq!(evaluation.changes.len(), 3);
        assert_eq!(
            apply_changes("éé", &evaluation.changes).unwrap(),
            "-é-é-"
        );
    }

    // --- Extract inverse ---

    #[test]
    fn test_y_visits_gaps() {
        assert_eq!(printed("y/,/", "a,bb,,c"), "a\nbb\nc\n");
    }

    #[test]
    fn test_y_with_no_matches_uses_whole_region() {
        assert_eq!(printed("y/,/", "abc"), "abc\n");
        assert_eq!(printed("y/,/", ""), "\n");
    }

    #[test]
    fn test_y_change() {
        assert_eq!(edit("y/ /c/w/", "one two  three"), "w w  w");
    }

    #[rstest]
    #[case("a,bb,,c", ",")]
    #[case(",lead and trail,", ",")]
    #[case("no separators", ",")]
    #[case("aaa bbb", "a+")]
    #[case("x1y22z", r"\d+")]
    fn test_matches_and_gaps_partition_region(#[case] text: &str, #[case] re: &str) {
        let snapshot = Snapshot::new(text);
        let region = snapshot.whole();
        let pattern = compile_pattern(re, 0).unwrap();
        let matches = find_matches(&pattern, text, region);
        let mut pieces: Vec<Region> = matches.clone();
        pieces.extend(gaps(region, &matches));
        pieces.retain(|r| !r.is_empty());
        pieces.sort_by_key(|r| r.start);
        let mut cursor = region.start;
        for piece in &pieces {
            assert_eq!(piece.start, cursor, "pieces: {pieces:?}");
            cursor = piece.end;
        }
        assert_eq!(cursor, region.end);
    }

    // --- Guard ---

    #[test]
    fn test_guard_without_match_is_noop() {
        let evaluation = eval("g/error/d", "all good\n");
        assert!(evaluation.changes.is_empty());
        assert!(evaluation.output.is_empty());
    }

    #[test]
    fn test_guard_acts_on_whole_region() {
        assert_eq!(edit("g/error/d", "an error here\n"), "");
    }

    #[test]
    fn test_guard_per_line() {
        let text = "ok 1\nerror 2\nok 3\nerror 4\n";
        assert_eq!(edit(r"x/.*\n/g/error/d", text), "ok 1\nok 3\n");
        assert_eq!(edit(r"x/.*\n/v/error/d", text), "error 2\nerror 4\n");
    }

    // --- Group ---

    #[test]
    fn test_group_members_read_pristine_snapshot() {
        // Both members see "abc", neither sees the other's edit.
        let evaluation = eval("{i/</ a/>/ p}", "abc");
        assert_eq!(evaluation.output, "abc\n");
        assert_eq!(apply_changes("abc", &evaluation.changes).unwrap(), "<abc>");
    }

    #[test]
    fn test_group_concatenates_printed_text() {
        let snapshot = Snapshot::new("ab");
        let command = parse("{p p}").unwrap();
        let shell = MockShell::default();
        let mut ctx = ExecutionContext::new(&snapshot, &shell);
        let text = execute(&command, &mut ctx, snapshot.whole()).unwrap();
        assert_eq!(text, "abab");
        assert_eq!(ctx.output, "ab\nab\n");
    }

    #[test]
    fn test_overlapping_group_edits_surface_as_internal_error() {
        let evaluation = eval("{c/A/ d}", "abc");
        let err = apply_changes("abc", &evaluation.changes).unwrap_err();
        assert!(err.is_internal());
    }

    // --- Addresses under nesting ---

    #[test]
    fn test_dot_inside_extract_is_the_match() {
        assert_eq!(printed("x/b+/.p", "abbc"), "bb\n");
    }

    #[test]
    fn test_end_inside_extract_is_end_of_buffer() {
        assert_eq!(edit("x/o/$a/!/", "foo"), "foo!!");
    }

    #[test]
    fn test_line_address_inside_extract_is_absolute() {
        assert_eq!(printed("x/b/1p", "a\nb\n"), "a\n\n");
    }

    #[test]
    fn test_forward_address_searches_from_match() {
        assert_eq!(printed("x/a/ /b/p", "a1b2a3b4"), "b\nb\n");
    }

    #[test]
    fn test_no_match_address_aborts() {
        let snapshot = Snapshot::new("abc");
        let command = parse("{d /zzz/d}").unwrap();
        let err = evaluate(&command, &snapshot, snapshot.whole(), &MockShell::default())
            .unwrap_err();
        assert!(matches!(err, SamError::NoMatch { .. }));
    }

    // --- Pipe ---

    #[test]
    fn test_pipe_replaces_region() {
        assert_eq!(edit("x/[a-z]+/|upper", "ab 12 cd"), "AB 12 CD");
    }

    #[test]
    fn test_pipe_failure_skips_only_that_occurrence() {
        let snapshot = Snapshot::new("one FAIL two");
        let command = parse(r"x/\S+/|upper").unwrap();
        let shell = MockShell::default();
        let evaluation = evaluate(&command, &snapshot, snapshot.whole(), &shell).unwrap();
        assert_eq!(shell.calls.borrow().len(), 3);
        assert_eq!(evaluation.pipe_failures.len(), 1);
        assert_eq!(
            evaluation.apply(&snapshot).unwrap(),
            "ONE FAIL TWO"
        );
    }

    #[test]
    fn test_pipe_receives_region_text() {
        let snapshot = Snapshot::new("a\nb\n");
        let shell = MockShell::default();
        let command = parse("2|sort").unwrap();
        evaluate(&command, &snapshot, snapshot.whole(), &shell).unwrap();
        assert_eq!(
            shell.calls.borrow().as_slice(),
            &[("sort".to_string(), "b\n".to_string())]
        );
    }

    // --- Sub-regions ---

    #[test]
    fn test_evaluate_on_subregion() {
        let snapshot = Snapshot::new("foo foo foo");
        let command = parse("x/foo/c/X/").unwrap();
        let evaluation = evaluate(
            &command,
            &snapshot,
            Region::new(4, 11),
            &MockShell::default(),
        )
        .unwrap();
        assert_eq!(evaluation.apply(&snapshot).unwrap(), "foo X X");
    }

    #[test]
    fn test_rendered_command_behaves_the_same() {
        let text = "x = 1\ny = 22\n# note\n";
        let input = r"x/^[a-z] = \d+\n/{g/22/c/y = 0\n/ v/2/a/# one\n/}";
        let rendered = parse(input).unwrap().to_string();
        assert_eq!(edit(input, text), edit(&rendered, text));
    }
}
