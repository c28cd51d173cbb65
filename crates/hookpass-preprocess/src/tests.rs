//! Extended tests for the line marker filter
//!
//! These run the filter over preprocessor output shaped like what GCC and
//! Clang emit for small C translation units.

use super::*;
use pretty_assertions::assert_eq;

fn filter_for(project: &str) -> LineMarkerFilter {
    LineMarkerFilter::new(Boundary::new(project))
}

fn text(output: &FilterOutput) -> Vec<&str> {
    output
        .lines
        .iter()
        .map(|line| std::str::from_utf8(line).unwrap())
        .collect()
}

/// Foreign system header collapses to one angle-bracket include
#[test]
fn test_system_header_collapse() {
    let mut input = vec![
        r#"# 1 "/p/a.c""#.to_string(),
        r#"# 1 "/usr/include/stdio.h" 1 3"#.to_string(),
    ];
    for i in 0..50 {
        input.push(format!("extern int stdio_decl_{};", i));
    }
    input.push(r#"# 10 "/p/a.c" 2"#.to_string());
    input.push("int main(void) {".to_string());
    input.push("  return 0;".to_string());
    input.push("}".to_string());

    let output = filter_for("/p").filter(input.iter().map(String::as_bytes));

    assert_eq!(
        text(&output),
        vec!["#include </usr/include/stdio.h>", "int main(void) {", "  return 0;", "}"]
    );
    assert_eq!(text(&output).iter().filter(|l| l.starts_with("#include")).count(), 1);
    assert!(!text(&output).iter().any(|l| l.contains("stdio_decl")));
    assert_eq!(output.final_state, FilterState::default());
}

/// Same header without the system flag uses the quote form
#[test]
fn test_user_header_collapse() {
    let input = r#"# 1 "/p/a.c"
# 1 "/opt/lib/include/lib.h" 1
int lib_fn(void);
# 2 "/p/a.c" 2
int x;"#;

    let output = filter_for("/p").filter_str(input);
    assert_eq!(text(&output), vec!["#include \"/opt/lib/include/lib.h\"", "int x;"]);
}

/// Pseudo-headers are elided without an include line
#[test]
fn test_pseudo_header_elided_silently() {
    let input = r#"# 1 "/p/a.c"
# 1 "<built-in>"
# 1 "<command-line>"
# 1 "/usr/include/stdc-predef.h" 1 3 4
# 17 "/usr/include/stdc-predef.h" 3 4
#define __STDC_IEC_559__ 1
# 1 "<command-line>" 2
# 1 "/p/a.c"
int a;"#;

    let output = filter_for("/p").filter_str(input);
    assert_eq!(text(&output), vec!["int a;"]);
    assert_eq!(output.final_state.elision_depth, 0);
}

/// Nested includes inside a foreign header stay hidden
#[test]
fn test_nested_foreign_headers() {
    let input = r#"# 1 "/p/main.c"
# 1 "/usr/include/stdlib.h" 1 3 4
# 1 "/usr/include/bits/types.h" 1 3 4
typedef long __time_t;
# 2 "/usr/include/stdlib.h" 2 3 4
extern void *malloc(unsigned long);
# 1 "/usr/include/bits/stdlib-float.h" 1 3 4
extern double atof(const char *);
# 3 "/usr/include/stdlib.h" 2 3 4
# 2 "/p/main.c" 2
# 1 "/usr/include/string.h" 1 3 4
extern unsigned long strlen(const char *);
# 3 "/p/main.c" 2
void run(void) { }"#;

    let output = filter_for("/p").filter_str(input);
    assert_eq!(
        text(&output),
        vec![
            "#include </usr/include/stdlib.h>",
            "#include </usr/include/string.h>",
            "void run(void) { }",
        ]
    );
    assert_eq!(output.final_state.elision_depth, 0);
}

/// Project headers are collapsed too unless expansion is enabled
#[test]
fn test_project_header_expansion() {
    let input = r#"# 1 "src/a.c"
# 1 "src/util.h" 1
static inline int twice(int x) { return 2 * x; }
# 2 "src/a.c" 2
int y = 1;"#;

    let collapsed = filter_for("/p").filter_str(input);
    assert_eq!(text(&collapsed), vec!["#include \"src/util.h\"", "int y = 1;"]);

    let expanded = LineMarkerFilter::new(Boundary::new("/p").with_expand_headers(true))
        .filter_str(input);
    assert_eq!(
        text(&expanded),
        vec!["static inline int twice(int x) { return 2 * x; }", "int y = 1;"]
    );
}

/// Filtering output that carries no markers changes nothing
#[test]
fn test_filter_is_idempotent() {
    let input = r#"# 1 "/p/a.c"
# 1 "/usr/include/stdio.h" 1 3 4
int printf(const char *, ...);
# 2 "/p/a.c" 2

int main(void) {
  #pragma unroll
  return 0;
}"#;

    let filter = filter_for("/p");
    let once = filter.filter_str(input);
    let twice = filter.filter(once.lines.iter().map(Vec::as_slice));
    assert_eq!(once.lines, twice.lines);
}

/// Balanced marker streams always return to depth zero
#[test]
fn test_balanced_streams_end_at_zero() {
    let filter = filter_for("/p");
    for depth in 1..6 {
        let mut lines = vec![r#"# 1 "/p/a.c""#.to_string()];
        for level in 0..depth {
            lines.push(format!(r#"# 1 "/usr/include/h{}.h" 1 3"#, level));
            lines.push(format!("int decl_{};", level));
        }
        for _ in 0..depth {
            lines.push(r#"# 9 "/usr/include/back.h" 2 3"#.to_string());
        }
        lines.push("int tail;".to_string());

        let output = filter.filter(lines.iter().map(String::as_bytes));
        assert_eq!(output.final_state.elision_depth, 0);
        assert_eq!(text(&output).last(), Some(&"int tail;"));
    }
}

/// Unbalanced input reports the depth it stopped at
#[test]
fn test_unbalanced_stream() {
    let input = r#"# 1 "/usr/include/stdio.h" 1 3
int hidden;"#;
    let output = filter_for("/p").filter_str(input);
    assert_eq!(text(&output), vec!["#include </usr/include/stdio.h>"]);
    assert_eq!(output.final_state.elision_depth, 1);
}

/// Project lines keep bytes that are not valid UTF-8
#[test]
fn test_non_utf8_project_line_is_copied_verbatim() {
    let mut input = Vec::new();
    input.extend_from_slice(b"# 1 \"/p/a.c\"\n");
    input.extend_from_slice(b"# 1 \"/usr/include/string.h\" 1 3 4\n");
    input.extend_from_slice(b"extern char *strdup(const char *);\n");
    input.extend_from_slice(b"# 2 \"/p/a.c\" 2\n");
    input.extend_from_slice(b"const char *s = \"caf\xE9\";\n");

    let output = filter_for("/p").filter_bytes(&input);
    assert_eq!(
        output.lines,
        vec![
            b"#include </usr/include/string.h>".to_vec(),
            b"const char *s = \"caf\xE9\";".to_vec(),
        ]
    );

    let mut written = Vec::new();
    output.write_to(&mut written).unwrap();
    assert_eq!(
        written,
        b"#include </usr/include/string.h>\nconst char *s = \"caf\xE9\";\n".to_vec()
    );
}
