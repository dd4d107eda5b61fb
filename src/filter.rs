//! Label filtering in two stages.
//!
//! 1. Server-side: exact label names sent as the `labels` query parameter.
//!    Upstream ORs them.
//! 2. Client-side, per normalized issue: include, then exclude. Terms match
//!    as case-insensitive substrings of any label.
//!
//! Exclude is checked last, so it wins when both an include and an exclude
//! term match the same issue.

/// Label filter configuration for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelFilter {
    /// Exact names passed to the API (any-match upstream).
    pub server: Vec<String>,
    /// Keep only issues where one of these is a substring of some label.
    pub include: Vec<String>,
    /// Drop issues where one of these is a substring of some label.
    pub exclude: Vec<String>,
}

/// Outcome of the client-side stage for one issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    /// No include term matched; exclude was not evaluated.
    MissingInclude,
    /// An exclude term matched.
    Excluded,
}

impl LabelFilter {
    /// Value for the `labels` query parameter, if any server labels are set.
    pub fn server_param(&self) -> Option<String> {
        if self.server.is_empty() {
            None
        } else {
            Some(self.server.join(","))
        }
    }

    /// Whether the client-side stage can drop anything.
    pub fn is_local_active(&self) -> bool {
        !self.include.is_empty() || !self.exclude.is_empty()
    }

    pub fn verdict(&self, labels: &[String]) -> Verdict {
        if !self.include.is_empty() && !any_term_matches(&self.include, labels) {
            return Verdict::MissingInclude;
        }
        if any_term_matches(&self.exclude, labels) {
            return Verdict::Excluded;
        }
        Verdict::Keep
    }
}

fn any_term_matches(terms: &[String], labels: &[String]) -> bool {
    let labels: Vec<String> = labels.iter().map(|l| l.to_lowercase()).collect();
    terms.iter().any(|term| {
        let term = term.to_lowercase();
        labels.iter().any(|label| label.contains(&term))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn kept(f: &LabelFilter, labels: &[String]) -> bool {
        f.verdict(labels) == Verdict::Keep
    }

    fn filter(include: &[&str], exclude: &[&str]) -> LabelFilter {
        LabelFilter {
            server: Vec::new(),
            include: labels(include),
            exclude: labels(exclude),
        }
    }

    #[test]
    fn test_exclude_wins_over_include() {
        let f = filter(&["bug"], &["wontfix"]);
        assert_eq!(f.verdict(&labels(&["Bug", "wontfix"])), Verdict::Excluded);
        assert_eq!(f.verdict(&labels(&["Bug"])), Verdict::Keep);
    }

    #[test]
    fn test_include_is_case_insensitive_substring() {
        let f = filter(&["PRIORITY"], &[]);
        assert!(kept(&f, &labels(&["priority::high"])));
        assert!(!kept(&f, &labels(&["severity::high"])));
    }

    #[test]
    fn test_unlabelled_issue_never_satisfies_include() {
        let f = filter(&["bug"], &[]);
        assert_eq!(f.verdict(&[]), Verdict::MissingInclude);
    }

    #[test]
    fn test_include_miss_short_circuits_exclude() {
        let f = filter(&["bug"], &["docs"]);
        assert_eq!(f.verdict(&labels(&["docs"])), Verdict::MissingInclude);
    }

    #[test]
    fn test_exclude_only() {
        let f = filter(&[], &["duplicate"]);
        assert!(kept(&f, &[]));
        assert!(kept(&f, &labels(&["bug"])));
        assert!(!kept(&f, &labels(&["Duplicate of #3"])));
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let f = LabelFilter::default();
        assert!(!f.is_local_active());
        assert!(kept(&f, &[]));
        assert_eq!(f.server_param(), None);
    }

    #[test]
    fn test_server_param_joins_with_commas() {
        let f = LabelFilter {
            server: labels(&["bug", "enhancement"]),
            ..Default::default()
        };
        assert_eq!(f.server_param().as_deref(), Some("bug,enhancement"));
    }
}
