#[cfg(feature = "json_schema")]
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;

/// Decides whether an entry name is selected by a search.
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum NamePattern {
    /// Glob pattern: `*` matches any run of characters (possibly empty), `?`
    /// exactly one character, everything else itself.
    Glob {
        /// The pattern text.
        pattern: String,
        /// Compare characters without regard to case.
        ignore_case: bool,
    },

    /// Exact name; case handling follows the backend's policy.
    Exact(String),
}

impl NamePattern {
    /// A case-sensitive glob.
    pub fn glob(pattern: &str) -> Self {
        NamePattern::Glob {
            pattern: pattern.to_string(),
            ignore_case: false,
        }
    }

    /// An exact-name matcher.
    pub fn exact(name: &str) -> Self {
        NamePattern::Exact(name.to_string())
    }

    /// Returns the pattern with case folding toggled. Exact patterns are left
    /// alone.
    pub fn ignoring_case(self, ignore: bool) -> Self {
        match self {
            NamePattern::Glob { pattern, .. } => NamePattern::Glob {
                pattern,
                ignore_case: ignore,
            },
            exact => exact,
        }
    }

    /// Tests `name` against the pattern. `case_sensitive` is the backend's
    /// policy and only applies to exact matches.
    pub fn matches(&self, name: &str, case_sensitive: bool) -> bool {
        match self {
            NamePattern::Glob {
                pattern,
                ignore_case,
            } => {
                if *ignore_case {
                    glob_match(&pattern.to_lowercase(), &name.to_lowercase())
                } else {
                    glob_match(pattern, name)
                }
            }
            NamePattern::Exact(exact) => {
                if case_sensitive {
                    exact == name
                } else {
                    exact.to_lowercase() == name.to_lowercase()
                }
            }
        }
    }
}

/// Iterative wildcard match with single-star backtracking.
fn glob_match(pattern: &str, name: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let n: Vec<char> = name.chars().collect();
    let (mut pi, mut ni) = (0, 0);
    // Position of the last `*` seen and the name index it was tried at.
    let mut star: Option<(usize, usize)> = None;

    while ni < n.len() {
        if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ni));
            pi += 1;
        } else if pi < p.len() && (p[pi] == '?' || p[pi] == n[ni]) {
            pi += 1;
            ni += 1;
        } else if let Some((star_pi, star_ni)) = star {
            pi = star_pi + 1;
            ni = star_ni + 1;
            star = Some((star_pi, star_ni + 1));
        } else {
            return false;
        }
    }

    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_matches_any_run() {
        let pat = NamePattern::glob("*.txt");
        assert!(pat.matches("a.txt", true));
        assert!(pat.matches(".txt", true));
        assert!(pat.matches("a.b.txt", true));
        assert!(!pat.matches("a.txt.bak", true));
        assert!(!pat.matches("a.TXT", true));
    }

    #[test]
    fn lone_star_matches_everything() {
        let pat = NamePattern::glob("*");
        assert!(pat.matches("", true));
        assert!(pat.matches("anything.at.all", true));
    }

    #[test]
    fn question_mark_is_one_char() {
        let pat = NamePattern::glob("file?.rs");
        assert!(pat.matches("file1.rs", true));
        assert!(!pat.matches("file.rs", true));
        assert!(!pat.matches("file12.rs", true));
    }

    #[test]
    fn backtracks_over_multiple_stars() {
        let pat = NamePattern::glob("*a*b*c");
        assert!(pat.matches("xxaxxbxxc", true));
        assert!(pat.matches("abc", true));
        assert!(!pat.matches("acb", true));
    }

    #[test]
    fn ignore_case_is_caller_selected() {
        let pat = NamePattern::glob("*.TXT").ignoring_case(true);
        assert!(pat.matches("a.txt", true));
        let pat = NamePattern::glob("*.TXT");
        assert!(!pat.matches("a.txt", true));
    }

    #[test]
    fn exact_follows_backend_case_policy() {
        let pat = NamePattern::exact("Data");
        assert!(pat.matches("Data", true));
        assert!(!pat.matches("data", true));
        assert!(pat.matches("data", false));
        assert!(!NamePattern::exact("d*").matches("data", true));
    }
}
