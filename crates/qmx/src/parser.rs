//! # 📄 THE ACHIEVEMENT TEXT PARSER
//!
//! *Previously, on Questmatch...*
//!
//! 🎬 COLD OPEN — INT. BROWSER DEVTOOLS — 3:47 AM
//!
//! The page had no structure. No delimiters. No classes, no ids, no hope.
//! Just text, collapsed to one visual line per newline, stretching into
//! the darkness like a CVS receipt. Somewhere in there: achievement names.
//! Also in there: copyright footers, privacy links, and a header that
//! lies about being data.
//!
//! "It's just text," they said. "Split on newlines," they said.
//! (Narrator: the newlines were load-bearing, and also liars.)
//!
//! 🚀 This module is the lookahead state machine that reads that text and
//! recovers structured achievement records anyway. It exploits the fixed
//! 2–3 line cadence Steam's rendering produces: `name / description /
//! status` for achievements with a status line, `name / description` for
//! locked ones without. The description-length/keyword heuristic is the
//! bouncer that keeps trailing boilerplate from cosplaying as data.
//!
//! ## Knowledge Graph 🧠
//! - Input: post-normalized page text (one semantic unit per line) from `sources`
//! - Output: ordered `Vec<Achievement>`, or a typed [`PageRejection`]
//! - "empty list" and "not an achievements page" are DIFFERENT answers —
//!   that's the whole reason `PageRejection` exists instead of null-as-sentinel
//! - Marker scan: `memchr::memmem` — SIMD substring search, same crate the
//!   rest of this workspace reaches for when it needs to find bytes fast
//!
//! 📜 Ancient proverb: "He who parses scraped text with a regex, maintains
//! the regex forever."

use memchr::memmem;

use crate::common::Achievement;

// 🏁 The section marker that proves we're looking at an achievements page.
// The trailing \n is part of the contract: the marker is a full visual line.
const SECTION_MARKER: &str = "Personal Achievements\n";

// 💀 Steam's way of saying "no" while returning HTTP 200.
const ERROR_BANNER: &str = "An error was encountered while processing your request";

// 🏁 Terminal markers — either one means the useful part of the page is over.
const HIDDEN_REMAINING: &str = "hidden achievements remaining";
const VALVE_FOOTER: &str = "Valve Corporation. All rights reserved.";

// 🧹 Words that out a "description" as footer boilerplate. Case-insensitive.
const BOILERPLATE_WORDS: [&str; 5] = ["copyright", "valve", "steam", "privacy", "legal"];

// 📏 A real description is longer than this. A nav link is not.
const MIN_DESCRIPTION_LEN: usize = 10;

/// 💀 Why a page was rejected outright — as opposed to parsing to an empty list.
///
/// Two variants, two distinct failure stories:
/// - [`MissingMarker`](PageRejection::MissingMarker): the section marker never
///   appeared. Not an achievements page. Could be a login wall, a 404 in a
///   trench coat, or a profile that redirected somewhere weird.
/// - [`ErrorBanner`](PageRejection::ErrorBanner): the marker was there, but so
///   was Steam's error banner. The page exists and is also an apology.
///
/// Callers recover locally: a rejected game is simply excluded from vector
/// building. Nobody panics. Nobody throws. We are professionals here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRejection {
    /// 🏁 `"Personal Achievements"` never showed up. Wrong page, wrong life.
    MissingMarker,
    /// 💀 Steam's error banner appeared inside the achievements section.
    ErrorBanner,
}

impl std::fmt::Display for PageRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageRejection::MissingMarker => {
                write!(f, "page has no 'Personal Achievements' section marker")
            }
            PageRejection::ErrorBanner => {
                write!(f, "page shows Steam's error banner inside the achievements section")
            }
        }
    }
}

impl std::error::Error for PageRejection {}

/// 📄 Parse one scraped achievements page into ordered achievement records.
///
/// # Contract 📜
/// - Input is post-normalized text: markup stripped, whitespace collapsed so
///   semantically distinct visual lines are newline-separated. That hygiene
///   is the source's job (see `sources::steam`). We parse what we're given.
/// - `Err(PageRejection)` when the marker is missing or the error banner
///   appears during the scan. `Ok(vec![])` is a SUCCESS — a valid page with
///   nothing on it. These are not the same thing and never will be.
/// - The scan ends early and cleanly at either terminal marker: a following
///   line containing `"hidden achievements remaining"`, or a current line
///   containing the Valve copyright footer.
/// - If the text ends mid-record, the trailing candidate is dropped, not
///   guessed at. We'd rather lose one achievement than invent one.
///
/// # The lookahead dance 💃
/// At a non-blank candidate line `L`, classify with up to two lines ahead:
/// 1. `L+2` starts with `"Unlocked"` → unlocked achievement, consume 3 lines
/// 2. `L+2` is a progress counter (`37/50`, exactly one slash, digits both
///    sides) → locked-with-progress, consume 3 lines
/// 3. otherwise, if `L+1` looks like a real description (long enough, no
///    boilerplate words) → locked-without-progress, consume 2 lines
/// 4. otherwise `L` was noise — consume 1 line, emit nothing
///
/// Note the deliberate asymmetry in step 2: a malformed counter like
/// `37/50/20` does NOT advance three lines. It falls through to step 3 and
/// lets the description heuristic decide. One bad status line should not
/// eat a whole record's worth of text.
pub fn parse_achievements_page(raw: &str) -> Result<Vec<Achievement>, PageRejection> {
    // 🔍 memmem::find — let the SIMD machinery earn its keep on the big haystack.
    let marker_at = memmem::find(raw.as_bytes(), SECTION_MARKER.as_bytes())
        .ok_or(PageRejection::MissingMarker)?;
    let section = &raw[marker_at + SECTION_MARKER.len()..];

    let lines: Vec<&str> = section.split('\n').collect();
    let mut achievements = Vec::new();

    // ⏭️ Line 0 after the marker is a header artifact ("x of y achievements
    // earned" or similar). It auditioned as data once. It did not get the part.
    let mut i = 1usize;

    while i < lines.len() {
        let line = lines[i].trim();

        // 💤 Blank lines carry no information and consume no lookahead.
        if line.is_empty() {
            i += 1;
            continue;
        }

        // 💀 Error banner mid-scan: the whole page is a lie. Reject it.
        if line.contains(ERROR_BANNER) {
            return Err(PageRejection::ErrorBanner);
        }

        // 🏁 Terminal: the hidden-achievements notice. Usually spotted one line
        // early (the count line announces it), but blank-line skipping can land
        // the cursor straight on it, so both positions terminate the scan.
        if line.contains(HIDDEN_REMAINING)
            || (i + 1 < lines.len() && lines[i + 1].trim().contains(HIDDEN_REMAINING))
        {
            return Ok(achievements);
        }

        // 🏁 Terminal: the Valve footer. Past this point there is only legal text.
        if line.contains(VALVE_FOOTER) {
            return Ok(achievements);
        }

        // ⚠️ A lone trailing name with nothing after it is noise, not a record.
        if i + 1 >= lines.len() {
            i += 1;
            continue;
        }

        let description = lines[i + 1].trim();
        let status = if i + 2 < lines.len() {
            Some(lines[i + 2].trim())
        } else {
            None
        };

        match status {
            // ✅ "Unlocked 5 Jun @ 9:12pm" — the happy path, three lines consumed.
            Some(s) if s.starts_with("Unlocked") => {
                achievements.push(Achievement::new(line, true));
                i += 3;
            }
            // 🔒 "37/50" — locked, but the player is trying. Three lines consumed.
            Some(s) if is_progress_counter(s) => {
                achievements.push(Achievement::new(line, false));
                i += 3;
            }
            // 🔒 No status line matched. If the description line holds up under
            // the noise filter, this is a locked achievement without progress.
            _ => {
                if is_plausible_description(description) {
                    achievements.push(Achievement::new(line, false));
                    i += 2;
                } else {
                    // 🗑️ Candidate was noise. Advance one line and forget it happened.
                    i += 1;
                }
            }
        }
    }

    Ok(achievements)
}

/// 🔢 Is this line a `current/total` progress counter?
///
/// Exactly one `/`, and both sides are non-empty runs of decimal digits.
/// `37/50` yes. `37/50/20` no. `n/a` no. `/50` no. The bar is low but firm.
fn is_progress_counter(line: &str) -> bool {
    let mut parts = line.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(current), Some(total), None) => {
            let current = current.trim();
            let total = total.trim();
            !current.is_empty()
                && !total.is_empty()
                && current.chars().all(|c| c.is_ascii_digit())
                && total.chars().all(|c| c.is_ascii_digit())
        }
        _ => false,
    }
}

/// 🧹 Does this line read like an achievement description rather than footer junk?
///
/// Long enough to say something, and free of the words that only ever appear
/// in the legal basement of the page. This filter is what keeps "Copyright
/// Valve Corp." from going down in history as a locked achievement.
fn is_plausible_description(line: &str) -> bool {
    if line.len() <= MIN_DESCRIPTION_LEN {
        return false;
    }
    let lowered = line.to_lowercase();
    !BOILERPLATE_WORDS.iter().any(|word| lowered.contains(word))
}

// ============================================================
//  🧪 Tests — "trust but verify" is for diplomats.
//  Parsers say "trust nothing, the input was scraped."
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// 🏗️ Builds a page: intro junk, the marker, a header artifact line,
    /// then the given body lines. The shape every real page has.
    fn page(body_lines: &[&str]) -> String {
        let mut text = String::from("SomeGame\nStats\nPersonal Achievements\n");
        text.push_str("12 of 40 (30%) achievements earned:\n");
        text.push_str(&body_lines.join("\n"));
        text.push('\n');
        text
    }

    #[test]
    fn the_one_where_a_markerless_page_gets_rejected() {
        // 🧪 No marker, no deal. Login walls and 404s all land here.
        let result = parse_achievements_page("Sign In\nto continue\nsomething something");
        assert_eq!(result, Err(PageRejection::MissingMarker));
    }

    #[test]
    fn the_one_where_the_error_banner_rejects_the_whole_page() {
        // 🧪 Marker present, banner present after it. HTTP 200, emotionally 500.
        let text = page(&[
            "An error was encountered while processing your request:",
            "Try again later",
        ]);
        assert_eq!(parse_achievements_page(&text), Err(PageRejection::ErrorBanner));
    }

    #[test]
    fn the_one_where_an_unlocked_achievement_is_detected() {
        // 🧪 The canonical 3-line cadence: name / description / "Unlocked <date>"
        let text = page(&[
            "First Blood",
            "Win your first match against a real opponent",
            "Unlocked 5 Jun @ 9:12pm",
        ]);
        let parsed = parse_achievements_page(&text).expect("valid page must parse");
        assert_eq!(parsed, vec![Achievement::new("First Blood", true)]);
    }

    #[test]
    fn the_one_where_a_progress_counter_means_locked() {
        // 🧪 "37/50" — a locked achievement with visible effort
        let text = page(&[
            "Completionist",
            "Collect every artifact scattered across the map",
            "37/50",
        ]);
        let parsed = parse_achievements_page(&text).expect("valid page must parse");
        assert_eq!(parsed, vec![Achievement::new("Completionist", false)]);
    }

    #[test]
    fn the_one_where_two_slashes_do_not_make_a_progress_counter() {
        // 🧪 "37/50/20" is not a counter. It falls through to the description
        // heuristic, which accepts the (perfectly plausible) description line —
        // so the record survives as locked and the bogus line becomes the next
        // candidate instead of being silently swallowed.
        let text = page(&[
            "Completionist",
            "Collect every artifact scattered across the map",
            "37/50/20",
        ]);
        let parsed = parse_achievements_page(&text).expect("valid page must parse");
        assert_eq!(parsed, vec![Achievement::new("Completionist", false)]);
    }

    #[test]
    fn the_one_where_boilerplate_gets_bounced_at_the_door() {
        // 🧪 "Copyright Valve Corp." is many things. A description is not one.
        let text = page(&["Trailing Junk", "Copyright Valve Corp."]);
        let parsed = parse_achievements_page(&text).expect("valid page must parse");
        assert!(parsed.is_empty(), "boilerplate pair must not become an achievement");
    }

    #[test]
    fn the_one_where_a_long_clean_description_is_kept_as_locked() {
        // 🧪 Two-line cadence, no status line anywhere: locked without progress.
        let text = page(&[
            "Night Owl",
            "A suitably long non-boilerplate description text",
        ]);
        let parsed = parse_achievements_page(&text).expect("valid page must parse");
        assert_eq!(parsed, vec![Achievement::new("Night Owl", false)]);
    }

    #[test]
    fn the_one_where_hidden_achievements_end_the_scan() {
        // 🧪 The "N hidden achievements remaining" line on the FOLLOWING line
        // terminates cleanly — everything before it is kept, nothing after.
        let text = page(&[
            "Speedrunner",
            "Finish the campaign in under two hours",
            "Unlocked 1 Feb @ 4:44am",
            "",
            "3 hidden achievements remaining",
            "Fake Name",
            "Fake description that would otherwise look plausible",
        ]);
        let parsed = parse_achievements_page(&text).expect("valid page must parse");
        assert_eq!(parsed, vec![Achievement::new("Speedrunner", true)]);
    }

    #[test]
    fn the_one_where_the_valve_footer_ends_the_scan() {
        // 🧪 The copyright footer is the end of the useful universe.
        let text = page(&[
            "Pacifist",
            "Complete a level without dealing any damage",
            "Unlocked 9 Mar @ 1:01pm",
            "© 2024 Valve Corporation. All rights reserved.",
            "Privacy Policy",
        ]);
        let parsed = parse_achievements_page(&text).expect("valid page must parse");
        assert_eq!(parsed, vec![Achievement::new("Pacifist", true)]);
    }

    #[test]
    fn the_one_where_an_empty_section_is_success_not_failure() {
        // 🧪 Marker present, nothing after the header. Ok(vec![]), NOT a rejection.
        // This distinction is the entire reason PageRejection exists.
        let text = "Stats\nPersonal Achievements\n0 of 40 achievements earned\n";
        let parsed = parse_achievements_page(text).expect("empty section must still parse");
        assert!(parsed.is_empty());
    }

    #[test]
    fn the_one_where_a_trailing_lone_name_is_dropped() {
        // 🧪 Text ends mid-record: a name with no description after it.
        // We drop it. Guessing is for horoscopes.
        let mut text = page(&[
            "Complete Achievement",
            "A description long enough to pass every filter here",
            "Unlocked 2 Jan @ 2:22pm",
        ]);
        text.push_str("Orphaned Name");
        let parsed = parse_achievements_page(&text).expect("valid page must parse");
        assert_eq!(parsed, vec![Achievement::new("Complete Achievement", true)]);
    }

    #[test]
    fn the_one_where_blank_lines_change_nothing() {
        // 🧪 Blank lines are skipped without consuming lookahead — the cadence
        // detection must survive vertical whitespace sprinkled by the scraper.
        let text = page(&[
            "",
            "Gold Hoarder",
            "Accumulate one million coins across all play sessions",
            "Unlocked 7 Jul @ 7:07pm",
            "",
            "",
            "Iron Will",
            "Survive for ten consecutive nights on the hardest difficulty",
            "4/10",
        ]);
        let parsed = parse_achievements_page(&text).expect("valid page must parse");
        assert_eq!(
            parsed,
            vec![
                Achievement::new("Gold Hoarder", true),
                Achievement::new("Iron Will", false),
            ]
        );
    }

    #[test]
    fn the_one_where_a_full_page_parses_in_order() {
        // 🧪 The integration cut: mixed cadences, noise, and a footer,
        // in one page. Order of output must match order on the page.
        let text = page(&[
            "First Blood",
            "Win your first match against a real opponent",
            "Unlocked 5 Jun @ 9:12pm",
            "Completionist",
            "Collect every artifact scattered across the map",
            "37/50",
            "Night Owl",
            "Play between the haunted hours of 3am and 4am",
            "x",
            "© 2024 Valve Corporation. All rights reserved.",
        ]);
        let parsed = parse_achievements_page(&text).expect("valid page must parse");
        assert_eq!(
            parsed,
            vec![
                Achievement::new("First Blood", true),
                Achievement::new("Completionist", false),
                Achievement::new("Night Owl", false),
            ]
        );
    }

    #[test]
    fn the_one_where_progress_counters_are_strict() {
        // 🧪 Unit-level paranoia for the counter check.
        assert!(is_progress_counter("37/50"));
        assert!(is_progress_counter(" 1/100 "));
        assert!(!is_progress_counter("37/50/20"), "two slashes is not a counter");
        assert!(!is_progress_counter("n/a"));
        assert!(!is_progress_counter("/50"));
        assert!(!is_progress_counter("37/"));
        assert!(!is_progress_counter("37"));
    }
}
