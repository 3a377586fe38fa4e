use super::*;

fn strings(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

#[test]
fn quoted_text_is_one_token() {
    let p = parse_line(r#"TITLE "Hello World" <"#);
    assert_eq!(p.args, strings(&["TITLE", "Hello World", "<"]));
    assert!(p.options.is_empty());
}

#[test]
fn options_are_split_from_positionals() {
    let p = parse_line("BLUR pixels:12 DARK");
    assert_eq!(p.args, strings(&["BLUR", "DARK"]));
    assert_eq!(p.option("pixels"), Some("12"));
    assert_eq!(p.options.len(), 1);
}

#[test]
fn brackets_are_kept_in_token() {
    assert_eq!(
        tokenize("alice [happy face] +"),
        strings(&["alice", "[happy face]", "+"])
    );
}

#[test]
fn empty_or_unclosed_delimiters_fall_back_to_plain_runs() {
    assert_eq!(tokenize(r#""" x"#), strings(&[r#""""#, "x"]));
    assert_eq!(tokenize(r#""open quote"#), strings(&[r#""open"#, "quote"]));
    assert_eq!(tokenize("[] [a"), strings(&["[]", "[a"]));
}

#[test]
fn empty_key_option_is_dropped() {
    let p = parse_line("DARK :0.3 amount:0.7");
    assert_eq!(p.args, strings(&["DARK"]));
    assert_eq!(p.option("amount"), Some("0.7"));
    assert_eq!(p.options.len(), 1);
}

#[test]
fn option_splits_at_first_colon_only() {
    let p = parse_line("x key:a:b");
    assert_eq!(p.option("key"), Some("a:b"));
}

#[test]
fn later_duplicate_option_wins() {
    let p = parse_line("DARK amount:0.1 amount:0.9");
    assert_eq!(p.option("amount"), Some("0.9"));
}

#[test]
fn unicode_tokens_survive() {
    let p = parse_line("TITLE \"Café ночь\" v");
    assert_eq!(p.args, strings(&["TITLE", "Café ночь", "v"]));
}

#[test]
fn source_lines_skip_comments_and_blanks() {
    let src = "\n  DARK\r\n%% a comment\n\nBLUR & TITLE \"x\"\n   \nZOOM %% trailing";
    let lines: Vec<&str> = source_lines(src).collect();
    assert_eq!(lines, vec!["DARK", "BLUR ", " TITLE \"x\""]);
}

#[test]
fn command_and_rest_accessors() {
    let p = parse_line("BLUR DARK SAT");
    assert_eq!(p.command(), Some("BLUR"));
    assert_eq!(p.rest(), &strings(&["DARK", "SAT"])[..]);
    assert_eq!(ParsedLine::default().rest().len(), 0);
}
