//! Lint: detect key-hint text (`[X]`) rendered without a click target.
//!
//! Every `[X]`-style hint drawn in a `render.rs` must also be tappable, which
//! means it goes through `push_clickable()` or the `push_choice()` helper.
//! A plain `cl.push(Line::from(" [X] ..."))` shows the hint but ignores taps,
//! which breaks the game on touch screens.

use std::fs;
use std::path::Path;

/// Calls that register a click target for the line they render.
const CLICKABLE_CALLS: &[&str] = &["push_clickable(", "push_choice("];

/// Whether `s` contains a one-character key hint like `[X]`, `[1]`, `[-]`.
fn contains_bracket_key(s: &str) -> bool {
    s.as_bytes().windows(3).any(|w| {
        w[0] == b'['
            && w[2] == b']'
            && (w[1].is_ascii_alphanumeric() || b"-=!~|\\".contains(&w[1]))
    })
}

/// Lines that render a key hint through a non-clickable `push(`.
fn find_bracket_key_in_push(source: &str) -> Vec<(usize, String)> {
    source
        .lines()
        .enumerate()
        .filter_map(|(i, line)| {
            let trimmed = line.trim();
            if trimmed.starts_with("//") || !contains_bracket_key(line) {
                return None;
            }
            let clickable = CLICKABLE_CALLS.iter().any(|c| line.contains(c));
            (line.contains(".push(") && !clickable).then(|| (i + 1, trimmed.to_string()))
        })
        .collect()
}

fn visit_render_files(dir: &Path, violations: &mut Vec<(String, usize, String)>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for path in entries.flatten().map(|e| e.path()) {
        if path.is_dir() {
            visit_render_files(&path, violations);
        } else if path.file_name().is_some_and(|n| n == "render.rs") {
            let Ok(source) = fs::read_to_string(&path) else {
                continue;
            };
            for (line_num, line) in find_bracket_key_in_push(&source) {
                violations.push((path.display().to_string(), line_num, line));
            }
        }
    }
}

#[test]
fn no_bracket_keys_in_non_clickable_push() {
    let src_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
    let mut violations = Vec::new();
    visit_render_files(&src_dir, &mut violations);

    if !violations.is_empty() {
        let mut msg = String::from(
            "Found key hints [X] in non-clickable push() calls.\n\
             Use push_clickable() or push_choice() instead.\n\n",
        );
        for (file, line_num, line) in &violations {
            msg.push_str(&format!("  {}:{}: {}\n", file, line_num, line));
        }
        panic!("{}", msg);
    }
}

#[test]
fn render_files_are_scanned() {
    let render = Path::new(env!("CARGO_MANIFEST_DIR")).join("src/clicker/render.rs");
    assert!(render.exists(), "lint would silently pass without {:?}", render);
}

#[test]
fn detects_bracket_key_in_push() {
    let source = r#"cl.push(Line::from(" [X] チームを変更"));"#;
    assert_eq!(find_bracket_key_in_push(source).len(), 1);
}

#[test]
fn allows_clickable_helpers() {
    let source = r#"
        cl.push_clickable(Line::from(" [A] クリックドローン"), BUY_BONUS_BASE);
        push_choice(&mut cl, 'y', "[Y] はい".into(), style, CONFIRM_CHANGE_TEAM);
    "#;
    assert!(find_bracket_key_in_push(source).is_empty());
}

#[test]
fn ignores_comments() {
    let source = r#"// cl.push(Line::from(" [X] チームを変更"));"#;
    assert!(find_bracket_key_in_push(source).is_empty());
}

#[test]
fn bracket_key_detection() {
    assert!(contains_bracket_key("[X]"));
    assert!(contains_bracket_key("[1]"));
    assert!(contains_bracket_key("[-]"));
    assert!(!contains_bracket_key("[]"));
    assert!(!contains_bracket_key("[Enter]"));
    assert!(!contains_bracket_key("[{}]"));
    assert!(!contains_bracket_key("ab"));
}
