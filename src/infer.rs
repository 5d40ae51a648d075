//! Clarification defaults inferred from captured text.
//!
//! A fixed heuristic, not a classifier: each field is decided by an ordered
//! list of patterns where the first match wins. Every suggestion is a
//! default for the user to accept or override; nothing here writes.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use uuid::Uuid;

use crate::model::{Context, Energy, Project, ProjectStatus};

/// Minimum share of the captured text's tokens that must appear in a
/// project title before the project is suggested.
pub const PROJECT_MATCH_THRESHOLD: f64 = 0.3;

/// Duration suggested when nothing in the text hints otherwise.
pub const DEFAULT_DURATION_MINUTES: u32 = 30;

const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "about", "that", "this", "from", "into", "are", "was", "has",
    "its", "our", "but", "not", "can", "you", "all",
];

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("static pattern is valid")
}

static AT_TAG: LazyLock<Regex> = LazyLock::new(|| pattern(r"@(\w+)"));

static CONTEXT_RULES: LazyLock<Vec<(Regex, Context)>> = LazyLock::new(|| {
    vec![
        (pattern(r"(?i)\b(call|phone|ring|dial)\b"), Context::Calls),
        (
            pattern(
                r"(?i)\b(email|slack|message|text|reply|respond|browse|code|fix|debug|implement|deploy|write|draft|research|review)\b",
            ),
            Context::Computer,
        ),
        (
            pattern(r"(?i)\b(buy|pick.?up|grocery|store|shop|purchase|errand)\b"),
            Context::Errands,
        ),
        (
            pattern(r"(?i)\b(home|garden|clean|laundry|repair)\b"),
            Context::Home,
        ),
        (
            pattern(r"(?i)\b(meeting|agenda|in.person|office)\b"),
            Context::Office,
        ),
    ]
});

static ENERGY_RULES: LazyLock<Vec<(Regex, Energy)>> = LazyLock::new(|| {
    vec![
        (
            pattern(r"(?i)\b(quick|simple|easy|routine|minor|small|check|confirm|remind)\b"),
            Energy::Low,
        ),
        (
            pattern(
                r"(?i)\b(plan|design|think|research|write|create|complex|strategy|decide|analyze|evaluate|draft)\b",
            ),
            Energy::High,
        ),
    ]
});

static HOURS: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)(\d+)\s*h(?:ours?|rs?)?\b"));
static MINUTES: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)(\d+)\s*min"));
static HALF_HOUR: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)half.?hour"));

static DURATION_RULES: LazyLock<Vec<(Regex, u32)>> = LazyLock::new(|| {
    vec![
        (pattern(r"(?i)\b(quick|brief|ping)\b"), 15),
        (pattern(r"(?i)\b(call|email|message)\b"), 15),
        (pattern(r"(?i)\b(meeting|sync|standup)\b"), 30),
        (pattern(r"(?i)\b(review|write|research|draft)\b"), 60),
    ]
});

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| pattern(r"[^\w\s]"));

/// Suggested defaults for clarifying one inbox item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub context: Context,
    pub energy: Energy,
    pub time_estimate: u32,
    /// The captured text, trimmed, as a starting title.
    pub next_action_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectMatch>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectMatch {
    pub id: Uuid,
    pub title: String,
    /// Fraction of the captured text's tokens found in the title.
    pub score: f64,
}

/// Infer every default at once.
pub fn suggest(content: &str, projects: &[Project]) -> Suggestion {
    Suggestion {
        context: infer_context(content),
        energy: infer_energy(content),
        time_estimate: infer_duration(content),
        next_action_title: content.trim().to_string(),
        project: infer_project(content, projects),
    }
}

/// An explicit, valid `@tag` wins; otherwise keyword rules in priority
/// order; otherwise `@computer`.
///
/// Only the first `@word` is considered, and it must match a tag exactly:
/// `@Errands` is not a tag and falls through to the keyword rules.
pub fn infer_context(content: &str) -> Context {
    let explicit = AT_TAG.captures(content).and_then(|c| {
        Context::ALL
            .into_iter()
            .find(|context| context.tag()[1..] == c[1])
    });
    if let Some(tag) = explicit {
        return tag;
    }
    first_match(&CONTEXT_RULES, content).unwrap_or(Context::Computer)
}

/// Low-effort words first, then high-effort words, otherwise medium.
pub fn infer_energy(content: &str) -> Energy {
    first_match(&ENERGY_RULES, content).unwrap_or(Energy::Medium)
}

/// Explicit hours, then explicit minutes, then "half hour", then keyword
/// buckets, then [`DEFAULT_DURATION_MINUTES`]. An explicit zero is ignored,
/// so the result is always positive.
pub fn infer_duration(content: &str) -> u32 {
    if let Some(hours) = captured_number(&HOURS, content).filter(|&h| h > 0) {
        return hours.saturating_mul(60);
    }
    if let Some(minutes) = captured_number(&MINUTES, content).filter(|&m| m > 0) {
        return minutes;
    }
    if HALF_HOUR.is_match(content) {
        return 30;
    }
    first_match(&DURATION_RULES, content).unwrap_or(DEFAULT_DURATION_MINUTES)
}

/// Suggest the active or stalled project whose title best overlaps the
/// captured text. Ties keep the first project in collection order.
pub fn infer_project(content: &str, projects: &[Project]) -> Option<ProjectMatch> {
    let content_tokens = tokenize(content);
    if content_tokens.is_empty() {
        return None;
    }

    let mut best: Option<(&Project, f64)> = None;
    for project in projects
        .iter()
        .filter(|p| matches!(p.status, ProjectStatus::Active | ProjectStatus::Stalled))
    {
        let title_tokens = tokenize(&project.title);
        let shared = content_tokens.intersection(&title_tokens).count();
        if shared == 0 {
            continue;
        }
        #[allow(clippy::cast_precision_loss)]
        let score = shared as f64 / content_tokens.len() as f64;
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((project, score));
        }
    }

    best.filter(|&(_, score)| score >= PROJECT_MATCH_THRESHOLD)
        .map(|(project, score)| ProjectMatch {
            id: project.id,
            title: project.title.clone(),
            score,
        })
}

/// Distinct lowercase words of three or more characters, minus stop words.
pub fn tokenize(text: &str) -> BTreeSet<String> {
    NON_WORD
        .replace_all(&text.to_lowercase(), "")
        .split_whitespace()
        .filter(|t| t.chars().count() >= 3 && !STOP_WORDS.contains(t))
        .map(String::from)
        .collect()
}

fn first_match<T: Copy>(rules: &[(Regex, T)], content: &str) -> Option<T> {
    rules
        .iter()
        .find(|(re, _)| re.is_match(content))
        .map(|&(_, value)| value)
}

fn captured_number(re: &Regex, content: &str) -> Option<u32> {
    re.captures(content).and_then(|c| c[1].parse::<u32>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;

    use crate::model::NewProject;

    fn project(title: &str) -> Project {
        Project::new(
            NewProject {
                title: title.into(),
                outcome_statement: String::new(),
                review_interval: None,
                notes: None,
            },
            Timestamp::UNIX_EPOCH,
        )
    }

    #[test]
    fn explicit_tag_overrides_keywords() {
        assert_eq!(infer_context("Call the plumber @errands"), Context::Errands);
        assert_eq!(infer_context("@errands email the team"), Context::Errands);
    }

    #[test]
    fn unknown_tag_falls_through_to_keywords() {
        assert_eq!(infer_context("@garage buy screws"), Context::Errands);
    }

    #[test]
    fn tags_are_case_sensitive() {
        assert_eq!(infer_context("@Errands email the team"), Context::Computer);
        assert_eq!(infer_context("@HOME"), Context::Home);
        assert_eq!(infer_context("@Calls later"), Context::Computer);
    }

    #[test]
    fn context_rules_in_priority_order() {
        assert_eq!(infer_context("phone the bank and email them"), Context::Calls);
        assert_eq!(infer_context("debug the login page"), Context::Computer);
        assert_eq!(infer_context("pick up dry cleaning"), Context::Errands);
        assert_eq!(infer_context("fix garden fence"), Context::Computer);
        assert_eq!(infer_context("Laundry"), Context::Home);
        assert_eq!(infer_context("prep for the office party"), Context::Office);
        assert_eq!(infer_context("ponder life"), Context::Computer);
    }

    #[test]
    fn keywords_match_whole_words_only() {
        // "recall" must not trigger the calls rule.
        assert_eq!(infer_context("recall the shopping list"), Context::Computer);
    }

    #[test]
    fn energy_levels() {
        assert_eq!(infer_energy("quick check on the server"), Energy::Low);
        assert_eq!(infer_energy("Design the strategy"), Energy::High);
        assert_eq!(infer_energy("quick plan"), Energy::Low);
        assert_eq!(infer_energy("mow lawn"), Energy::Medium);
    }

    #[test]
    fn explicit_durations() {
        assert_eq!(infer_duration("workshop 2h"), 120);
        assert_eq!(infer_duration("workshop 3 hours"), 180);
        assert_eq!(infer_duration("stretch 1 hour"), 60);
        assert_eq!(infer_duration("tidy desk 20 min"), 20);
        assert_eq!(infer_duration("tidy desk 45minutes"), 45);
        assert_eq!(infer_duration("half an hour? no, half-hour"), 30);
    }

    #[test]
    fn explicit_zero_is_ignored() {
        assert_eq!(infer_duration("stretch 0 min"), DEFAULT_DURATION_MINUTES);
        assert_eq!(infer_duration("0h quick ping"), 15);
        assert!(infer_duration("email 0 minutes") > 0);
    }

    #[test]
    fn keyword_durations() {
        assert_eq!(infer_duration("ping Alex"), 15);
        assert_eq!(infer_duration("email the landlord"), 15);
        assert_eq!(infer_duration("team standup notes"), 30);
        assert_eq!(infer_duration("draft the report"), 60);
        assert_eq!(infer_duration("something vague"), DEFAULT_DURATION_MINUTES);
    }

    #[test]
    fn hour_suffix_needs_word_boundary() {
        // "2 hammers" is a quantity, not a duration.
        assert_eq!(infer_duration("buy 2 hammers"), DEFAULT_DURATION_MINUTES);
    }

    #[test]
    fn call_with_hours() {
        let suggestion = suggest("Call John about the proposal, 2h", &[]);
        assert_eq!(suggestion.context, Context::Calls);
        assert_eq!(suggestion.time_estimate, 120);
        assert_eq!(suggestion.next_action_title, "Call John about the proposal, 2h");
        assert!(suggestion.project.is_none());
    }

    #[test]
    fn tokenize_drops_short_and_stop_words() {
        let tokens = tokenize("Fix the redesign bug, on the website!");
        let expected: BTreeSet<String> = ["fix", "redesign", "bug", "website"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(tokens, expected);
    }

    #[test]
    fn project_match_by_overlap() {
        let site = project("Website Redesign");
        let found = infer_project("Fix the redesign bug on the website", &[site.clone()]).unwrap();
        assert_eq!(found.id, site.id);
        assert!(found.score >= PROJECT_MATCH_THRESHOLD);
        assert!((found.score - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn weak_overlap_is_not_suggested() {
        let site = project("Website");
        let text = "website copy needs fresh photos and testimonials";
        assert!(infer_project(text, &[site]).is_none());
    }

    #[test]
    fn only_active_or_stalled_projects_match() {
        let someday = project("Website Redesign").with_status(
            ProjectStatus::Someday,
            Timestamp::UNIX_EPOCH,
        );
        let stalled = project("Website Redesign").with_status(
            ProjectStatus::Stalled,
            Timestamp::UNIX_EPOCH,
        );
        let found = infer_project("redesign website", &[someday, stalled.clone()]).unwrap();
        assert_eq!(found.id, stalled.id);
    }

    #[test]
    fn ties_keep_first_project() {
        let first = project("Garden shed");
        let second = project("Shed painting");
        let found = infer_project("shed", &[first.clone(), second]).unwrap();
        assert_eq!(found.id, first.id);
    }

    #[test]
    fn higher_overlap_wins() {
        let weak = project("Kitchen");
        let strong = project("Kitchen renovation");
        let found = infer_project("kitchen renovation quotes", &[weak, strong.clone()]).unwrap();
        assert_eq!(found.id, strong.id);
    }

    #[test]
    fn empty_text_suggests_defaults() {
        let suggestion = suggest("   ", &[project("Anything")]);
        assert_eq!(suggestion.context, Context::Computer);
        assert_eq!(suggestion.energy, Energy::Medium);
        assert_eq!(suggestion.time_estimate, DEFAULT_DURATION_MINUTES);
        assert!(suggestion.project.is_none());
    }
}
