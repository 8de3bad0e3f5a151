//! # 📡 THE STEAM SOURCE
//!
//! *Previously, on Questmatch...*
//!
//! 🎬 COLD OPEN — INT. APARTMENT — 3:47 AM
//!
//! The API key application sits unanswered. Week three. The achievement
//! data is RIGHT THERE, rendered into public profile pages, visible to any
//! browser, guarded by nothing but markup. Our hero opens devtools. Our
//! hero closes devtools. Our hero opens a terminal.
//!
//! "I'll just scrape it," they whispered. "Politely," they added, because
//! somewhere a rate limiter was listening.
//!
//! 🚀 This module fetches one profile's per-game achievements page over
//! plain HTTP, decides whether the page is usable at all, and flattens the
//! markup into the one-visual-line-per-newline text the parser expects.
//! It accepts redirects. It accepts rejection. It does not accept cookies,
//! emotionally or otherwise.
//!
//! ## Knowledge Graph 🧠
//! - URL shape: `{base_url}/profiles/{player}/stats/{game}/achievements`
//! - Unavailability tells: redirected off an `/achievements` URL, non-200,
//!   "profile is private", "has not yet set up their game stats" — all of
//!   these are `Ok(None)`, and so are transport errors, because one dead
//!   game fetch must never kill the other sixty-seven
//! - Normalization: tags stripped (script/style contents dropped whole),
//!   the common five entities decoded, each text node trimmed and emitted
//!   as one line — the textual skeleton the lookahead parser feeds on
//!
//! ⚠️ NOTE: If you are reading this at 3am because every fetch returns
//! None, check the profile's privacy settings before blaming the code.
//! The code forgives you in advance.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, trace};

use crate::common::GameId;
use crate::sources::AchievementSource;

// 🎭 A browser costume. Steam serves different pages to things that don't
// look like browsers, and "different" here means "worse".
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

// 💀 Body substrings that mean "nothing for you here", lowercase for matching.
const PRIVATE_PROFILE: &str = "profile is private";
const NO_GAME_STATS: &str = "this user has not yet set up their game stats";

// 📡 SteamSourceConfig — "It's just a public page", she said, before the 429s began.
// Lives here and not in app_config because configs should live near the thing
// they configure. Wild concept, I know. Next up: socks living near feet.
#[derive(Debug, Deserialize, Clone)]
pub struct SteamSourceConfig {
    /// 📡 Community base URL. The default is the real site; tests point this
    /// at a wiremock server and nobody gets rate limited.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// ⏱️ Per-request timeout in seconds. 30 by inheritance from the scripts
    /// that came before us. They knew things. Mostly about slow responses.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// 🎭 Override the browser costume if you must. The default fits fine.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "https://steamcommunity.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// 📡 The real source — fetches achievement pages from Steam Community.
///
/// Holds one [`reqwest::Client`] for its whole life: connection pooling is
/// the difference between 68 handshakes and a handful, and the handshake
/// tax is real when you're fetching a whole monitored catalog per run.
#[derive(Debug)]
pub(crate) struct SteamSource {
    config: SteamSourceConfig,
    client: reqwest::Client,
}

impl SteamSource {
    /// 🚀 Construct the source: build the HTTP client with the timeout and
    /// costume from config.
    ///
    /// 💀 This is the one place Steam-related failure is a real error —
    /// if the CLIENT can't even be built, the source is structurally broken
    /// and nobody downstream should pretend otherwise.
    pub(crate) fn new(config: SteamSourceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .context("💀 Failed to build the HTTP client for the Steam source. \
                      This is pre-network failure — check the timeout/user-agent config.")?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl AchievementSource for SteamSource {
    /// 📄 Fetch one game's achievements page; `Ok(None)` for every flavor of
    /// "nothing usable", including transport errors.
    ///
    /// 📜 "He who turns one dead fetch into a pipeline error, recommends
    /// nothing to no one."
    async fn fetch(&self, player_id: &str, game_id: GameId) -> Result<Option<String>> {
        let url = format!(
            "{}/profiles/{}/stats/{}/achievements",
            self.config.base_url, player_id, game_id
        );
        trace!(game_id, %url, "📡 fetching achievements page");

        // 🕸️ Transport errors are per-game sadness, not structural failure.
        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(err) => {
                debug!(game_id, error = %err, "📡 fetch failed, recording as unavailable");
                return Ok(None);
            }
        };

        // 🔀 Steam redirects unusable requests back to the profile root.
        // If the FINAL url lost its "/achievements" suffix, we were bounced.
        if !response.url().as_str().contains("achievements") {
            debug!(game_id, "🔀 redirected away from achievements, unavailable");
            return Ok(None);
        }

        if !response.status().is_success() {
            debug!(game_id, status = %response.status(), "📡 non-200, unavailable");
            return Ok(None);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                debug!(game_id, error = %err, "📡 body read failed, unavailable");
                return Ok(None);
            }
        };

        // 🔒 The page loaded fine and is also a locked door.
        let lowered = body.to_lowercase();
        if lowered.contains(PRIVATE_PROFILE) || lowered.contains(NO_GAME_STATS) {
            debug!(game_id, "🔒 private profile or unowned game, unavailable");
            return Ok(None);
        }

        Ok(Some(normalize_page_text(&body)))
    }
}

/// 🧹 Flatten an HTML page into parser-ready text: one trimmed text node
/// per line, tags gone, script/style contents dropped wholesale.
///
/// This is the load-bearing hygiene step. The parser's entire lookahead
/// cadence assumes "one semantic unit per line", and this function is where
/// that promise gets manufactured. Inside a text node, whitespace runs
/// collapse to single spaces so `Personal Achievements` stays one line with
/// one space, no matter how the markup felt about indentation that day.
pub(crate) fn normalize_page_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len() / 4);
    let mut rest = html;

    while let Some(lt) = rest.find('<') {
        push_text_node(&rest[..lt], &mut out);

        let after_lt = &rest[lt + 1..];
        let Some(gt) = after_lt.find('>') else {
            // ⚠️ Unterminated tag at EOF — the page was cut off. Drop the tail.
            rest = "";
            break;
        };
        let tag_body = &after_lt[..gt];
        rest = &after_lt[gt + 1..];

        // 🗑️ script/style: their "text" is code, not content. Skip the whole block.
        if !tag_body.starts_with('/') {
            let tag_name = tag_body
                .split(|c: char| c.is_ascii_whitespace() || c == '/' || c == '>')
                .next()
                .unwrap_or("");
            if tag_name.eq_ignore_ascii_case("script") || tag_name.eq_ignore_ascii_case("style") {
                let closing = if tag_name.eq_ignore_ascii_case("script") {
                    "</script"
                } else {
                    "</style"
                };
                rest = match find_ascii_ci(rest, closing) {
                    Some(at) => {
                        let tail = &rest[at..];
                        match tail.find('>') {
                            Some(close_gt) => &tail[close_gt + 1..],
                            None => "",
                        }
                    }
                    // 💀 No closing tag. The rest of the page is javascript now.
                    None => "",
                };
            }
        }
    }
    push_text_node(rest, &mut out);
    out
}

/// 🧹 Emit one text node as one line: decode entities, collapse internal
/// whitespace, trim, skip if nothing survives.
fn push_text_node(node: &str, out: &mut String) {
    if node.trim().is_empty() {
        return;
    }
    let decoded = decode_entities(node);
    let mut first = true;
    let mut line = String::with_capacity(decoded.len());
    for word in decoded.split_whitespace() {
        if !first {
            line.push(' ');
        }
        line.push_str(word);
        first = false;
    }
    if !line.is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&line);
    }
}

/// 🔣 The five entities that actually show up in achievement text. A full
/// entity table is someone else's dissertation; `&amp;` goes last so it
/// can't manufacture new entities out of the other replacements.
fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// 🔍 ASCII-case-insensitive substring search. The needle is ASCII (it's a
/// tag name we wrote), so the returned offset is always a char boundary.
fn find_ascii_ci(haystack: &str, needle: &str) -> Option<usize> {
    let haystack = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}

// ============================================================
//  🧪 Tests — wiremock plays Steam. Steam is not consulted.
// ============================================================
