/// Search phrases fetched on every run, in display order.
pub const KEYWORDS: &[&str] = &[
    "Affair Relationship Stories",
    "Reddit Update",
    "Reddit Relationship Advice",
    "Reddit Relationship",
    "Reddit Cheating",
    "AITA Update",
    "Open Marriage",
    "Open Relationship",
    "X BF Caught",
    "Stories Cheat",
    "X GF Reddit",
    "AskReddit Surviving Infidelity",
    "GurlCan Reddit",
    "Cheating Story Actually Happened",
    "Cheating Story Real",
    "True Cheating Story",
    "Reddit Cheating Story",
    "R/Surviving Infidelity",
    "Surviving Infidelity",
    "Reddit Marriage",
    "Wife Cheated I Can't Forgive",
    "Reddit AP",
    "Exposed Wife",
    "Cheat Exposed",
];

/// The built-in keyword list as owned strings.
pub fn default_keywords() -> Vec<String> {
    KEYWORDS.iter().map(|k| k.to_string()).collect()
}
