use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

/// Start marker followed by the opening of the wrapper idiom. Captures the marker name and the
/// declared variable.
static WRAPPER_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"//__UNWRAPSTART__\(([^)]+)\)\s*var\s+([^\s=]+)\s*=\s*\(function\s*\(\s*\)\s*\{\s*")
        .expect("valid regex")
});

/// `return X; })();`, the end marker, and `module.exports = X;`. Captures the returned
/// expression, the marker name, and the exported expression.
static WRAPPER_CLOSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"return(?:\s*\(\s*|\s+)([^\s;)]+)\s*\)?\s*;?\s*\}\s*\)\s*\(\s*\)\s*;\s*",
        r"//__UNWRAPEND__\(([^)]+)\)\s*module\.exports\s*=\s*([^\s;]+)\s*;?",
    ))
    .expect("valid regex")
});

static DECLARE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"__DECLARE__\s*\(\s*['"]([^'"]+)['"]\s*\)"#)
        .expect("valid regex")
});

/// Strips the module wrapper around every marked class and turns member placeholders into
/// `this.name` references.
pub fn unwrap(text: &str) -> String {
    rewrite_declarations(&strip_wrappers(text))
}

/// Removes the wrapper opening and the wrapper closing of each marked class.
///
/// The two halves are rewritten independently. An opening goes when the declared variable is
/// the marked class. A closing goes, together with its export, when the returned and exported
/// expressions are the marked class.
pub fn strip_wrappers(text: &str) -> String {
    let opened = WRAPPER_OPEN.replace_all(text, |open: &Captures| {
        if open[1] == open[2] {
            String::new()
        } else {
            debug!(marker = &open[1], var = &open[2], "wrapper does not declare the marked class");
            open[0].to_string()
        }
    });

    WRAPPER_CLOSE
        .replace_all(&opened, |close: &Captures| {
            if close[1] == close[2] && close[3] == close[2] {
                String::new()
            } else {
                debug!(
                    class = &close[2],
                    returned = &close[1],
                    exported = &close[3],
                    "wrapper does not return the marked class"
                );
                close[0].to_string()
            }
        })
        .into_owned()
}

/// Rewrites every `__DECLARE__('name')` to `this.name`.
pub fn rewrite_declarations(text: &str) -> String {
    DECLARE.replace_all(text, "this.$1").into_owned()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const WRAPPED: &str = "//__UNWRAPSTART__(Counter)\nvar Counter = (function () {\n  /** @constructor */\n  function Counter() {\n/** @type {number} */\n__DECLARE__('count');\n}\n    return Counter;\n})();//__UNWRAPEND__(Counter)\n\nmodule.exports = Counter;\n";

    #[test]
    fn strips_the_wrapper_idiom() {
        let out = unwrap(WRAPPED);

        assert_eq!(
            out,
            "/** @constructor */\n  function Counter() {\n/** @type {number} */\nthis.count;\n}\n    \n"
        );
        assert!(!out.contains("(function () {"));
        assert!(!out.contains("})();"));
        assert!(!out.contains("module.exports"));
    }

    #[test]
    fn mismatched_variable_keeps_only_the_opening() {
        let text = WRAPPED.replace("var Counter", "var Other");
        assert_eq!(
            strip_wrappers(&text),
            "//__UNWRAPSTART__(Counter)\nvar Other = (function () {\n  /** @constructor */\n  function Counter() {\n\
             /** @type {number} */\n__DECLARE__('count');\n}\n    \n"
        );
    }

    #[test]
    fn mismatched_export_keeps_only_the_closing() {
        let text = WRAPPED.replace("module.exports = Counter", "module.exports = Other");
        assert_eq!(
            strip_wrappers(&text),
            "/** @constructor */\n  function Counter() {\n/** @type {number} */\n__DECLARE__('count');\n}\n    \
             return Counter;\n})();//__UNWRAPEND__(Counter)\n\nmodule.exports = Other;\n"
        );
    }

    #[test]
    fn unpaired_opening_is_stripped() {
        let text = "//__UNWRAPSTART__(X)\nvar X = (function () {\n    function X() {}\n    return X;\n}());\nexports.X = X;\n";
        assert_eq!(
            strip_wrappers(text),
            "function X() {}\n    return X;\n}());\nexports.X = X;\n"
        );
    }

    #[test]
    fn unmarked_wrappers_are_left_alone() {
        let text = "var A = (function () {\n    function A() {}\n    return A;\n})();\nmodule.exports = A;\n";
        assert_eq!(strip_wrappers(text), text);
    }

    #[test]
    fn parenthesized_returns_are_accepted() {
        let text = "//__UNWRAPSTART__(A)\nvar A = (function () {\nfunction A() {}\nreturn (A);\n})();\n//__UNWRAPEND__(A)\nmodule.exports = A";
        assert_eq!(strip_wrappers(text), "function A() {}\n");
    }

    #[test]
    fn every_placeholder_is_rewritten() {
        assert_eq!(
            rewrite_declarations("__DECLARE__('a'); __DECLARE__ ( \"b\" );\n__DECLARE__(  'c'  )"),
            "this.a; this.b;\nthis.c"
        );
    }
}
