//! Canonical identifier derivation for LaTeX variable fragments
//!
//! Two fragments a reader would consider the same variable (`x_1` and
//! `x_{1}`, `{v}` and `v`, `\color{red} v` and `v`) must map to the same
//! canonical string, because canonical names are the keys of the variable
//! store and the listener registry.
//!
//! The scan is a small state machine over the fragment's characters with
//! four buffers (main symbol, subscript, superscript, trailing tokens),
//! a brace-nesting depth and an in-command flag. Canonicalization is pure
//! and idempotent.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// `\color{...}` wrapper (the argument is the color name)
    static ref COLOR_PATTERN: Regex = Regex::new(r"\\color\{\w*\}").unwrap();
    /// `\textcolor{...}` wrapper, first argument only
    static ref TEXTCOLOR_PATTERN: Regex = Regex::new(r"\\textcolor\{\w*\}").unwrap();
}

/// Canonical form of a variable fragment: `x_1`, `x_{ 1 }` and `{x_1}`
/// all become `x_{1}`.
pub fn canonical_name(fragment: &str) -> String {
    canonicalize(fragment, false)
}

/// Loose canonical form: single-token subscripts/superscripts keep the
/// bracket-free spelling (`x_1` stays `x_1`), so both spellings can be
/// recognized as aliases of one variable.
pub fn canonical_name_loose(fragment: &str) -> String {
    canonicalize(fragment, true)
}

/// Alias set for a defined variable name: the canonical form plus, when it
/// differs, the loose form.
pub fn variable_aliases(fragment: &str) -> Vec<String> {
    let strict = canonical_name(fragment);
    let loose = canonical_name_loose(fragment);
    if loose == strict {
        vec![strict]
    } else {
        vec![strict, loose]
    }
}

fn canonicalize(fragment: &str, loose: bool) -> String {
    let fragment = fragment.trim();

    // Unwrap one layer of grouping. Deeper layers unwrap on recursion.
    if fragment.len() >= 2 && fragment.starts_with('{') && fragment.ends_with('}') {
        return canonicalize(&fragment[1..fragment.len() - 1], false);
    }

    // Strip decorative color wrappers, keeping the wrapped content.
    if COLOR_PATTERN.is_match(fragment) {
        return canonicalize(&COLOR_PATTERN.replace_all(fragment, " "), false);
    }
    if TEXTCOLOR_PATTERN.is_match(fragment) {
        return canonicalize(&TEXTCOLOR_PATTERN.replace_all(fragment, " "), false);
    }

    scan_fragment(fragment, loose)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Main,
    Sub,
    Sup,
    After,
}

fn scan_fragment(fragment: &str, loose: bool) -> String {
    let fragment = fragment.trim();

    let mut mode = Mode::Main;
    let mut depth: i32 = 0;
    let mut prev_backslash = false;
    let mut in_command = false;

    let mut main = String::new();
    let mut sub = String::new();
    let mut sup = String::new();
    let mut after = String::new();

    for c in fragment.chars() {
        let mut write_c = true;

        if c == '\\' {
            if !prev_backslash && depth == 0 {
                in_command = true;
            }
            prev_backslash = !prev_backslash;
        } else {
            prev_backslash = false;
        }
        if c == ' ' && depth == 0 {
            in_command = false;
        }

        if !prev_backslash {
            if c == '_' && depth == 0 && mode == Mode::Main {
                mode = Mode::Sub;
                write_c = false;
            }
            if c == '^' && depth == 0 && mode == Mode::Main {
                mode = Mode::Sup;
                write_c = false;
            }
            if c == '{' {
                depth += 1;
            }
            if c == '}' {
                depth -= 1;
                if depth == 0 {
                    in_command = false;
                }
            }
        }

        // A space after the core symbol starts the trailing part; so does
        // a command once the main buffer already holds content.
        if mode == Mode::Main && c == ' ' && depth == 0 {
            mode = Mode::After;
            write_c = false;
        }
        if mode == Mode::Main && c == '\\' && depth == 0 && !main.is_empty() {
            mode = Mode::After;
        }

        if write_c {
            match mode {
                Mode::Main => main.push(c),
                Mode::Sub => sub.push(c),
                Mode::Sup => sup.push(c),
                Mode::After => after.push(c),
            }
            // Unless inside a group or an open command, scripts end after
            // a single emitted character.
            if (mode == Mode::Sub || mode == Mode::Sup) && depth == 0 && !in_command {
                mode = Mode::Main;
            }
        }
    }

    if sup.starts_with('{') && sup.ends_with('}') && sup.len() >= 2 {
        sup = sup[1..sup.len() - 1].to_string();
    }
    if sub.starts_with('{') && sub.ends_with('}') && sub.len() >= 2 {
        sub = sub[1..sub.len() - 1].to_string();
    }

    let sub_trimmed = sub.trim();
    let subpart = if sub.is_empty() {
        String::new()
    } else if loose && !sub_trimmed.contains(' ') {
        format!("_{}", sub_trimmed)
    } else {
        format!("_{{{}}}", sub_trimmed)
    };

    let sup_trimmed = sup.trim();
    let suppart = if sup.is_empty() {
        String::new()
    } else if loose && !sup_trimmed.contains(' ') {
        format!("^{}", sup_trimmed)
    } else {
        format!("^{{{}}}", sup_trimmed)
    };

    let processed_after = if after.is_empty() {
        String::new()
    } else {
        format!(" {}", scan_fragment(&after, false))
    };

    format!("{}{}{}{}", main, subpart, suppart, processed_after)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscript_forms_are_equivalent() {
        assert_eq!(canonical_name("x_1"), canonical_name("x_{1}"));
        assert_eq!(canonical_name("x_1"), "x_{1}");
        assert_eq!(canonical_name("x_{ 1 }"), "x_{1}");
    }

    #[test]
    fn test_idempotence() {
        let fragments = [
            "x_1",
            "x_{1}",
            "\\alpha",
            "\\alpha_{ij}",
            "y^2",
            "y^{2}",
            "{v}",
            "a b",
            "m_{\\text{tot}}",
        ];
        for fragment in fragments {
            let once = canonical_name(fragment);
            let twice = canonical_name(&once);
            assert_eq!(once, twice, "not idempotent for {:?}", fragment);
        }
    }

    #[test]
    fn test_group_unwrapping() {
        assert_eq!(canonical_name("{x_1}"), "x_{1}");
        assert_eq!(canonical_name("{{x_1}}"), "x_{1}");
        assert_eq!(canonical_name("  {v}  "), "v");
    }

    #[test]
    fn test_color_wrappers_are_stripped() {
        assert_eq!(canonical_name("\\color{red} x_1"), "x_{1}");
        assert_eq!(canonical_name("\\textcolor{blue}{x_1}"), "x_{1}");
        assert_eq!(canonical_name("x_1"), canonical_name("\\color{teal} x_1"));
    }

    #[test]
    fn test_superscript() {
        assert_eq!(canonical_name("y^2"), "y^{2}");
        assert_eq!(canonical_name("y^{2}"), "y^{2}");
        assert_eq!(canonical_name("y_1^2"), "y_{1}^{2}");
    }

    #[test]
    fn test_command_symbols() {
        assert_eq!(canonical_name("\\alpha"), "\\alpha");
        assert_eq!(canonical_name("\\alpha_1"), "\\alpha_{1}");
        assert_eq!(canonical_name("\\alpha_{max}"), "\\alpha_{max}");
    }

    #[test]
    fn test_trailing_tokens() {
        assert_eq!(canonical_name("a b"), "a b");
        assert_eq!(canonical_name("a  b"), "a b");
        assert_eq!(canonical_name("a_1 b_2"), "a_{1} b_{2}");
    }

    #[test]
    fn test_loose_mode() {
        assert_eq!(canonical_name_loose("x_1"), "x_1");
        assert_eq!(canonical_name_loose("x_{1}"), "x_1");
        assert_eq!(canonical_name_loose("y^2"), "y^2");
        // Multi-token scripts keep their braces even in loose mode
        assert_eq!(canonical_name_loose("x_{a b}"), "x_{a b}");
    }

    #[test]
    fn test_aliases() {
        assert_eq!(variable_aliases("x_1"), vec!["x_{1}", "x_1"]);
        // Both forms coincide for a plain symbol
        assert_eq!(variable_aliases("v"), vec!["v"]);
    }

    #[test]
    fn test_empty_fragment() {
        assert_eq!(canonical_name(""), "");
        assert_eq!(canonical_name("   "), "");
    }
}
