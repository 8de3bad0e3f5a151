//! 📊 progress.rs — "Are we there yet?" — every scrape, every time, forever.
//!
//! 🚀 This module answers the age-old question: "how many profile pages
//! have we politely asked for?" With cold hard numbers, a progress bar,
//! and a table so comfy it has lumbar support.
//!
//! ⚠️  Warning: Watching this progress bar will not make Steam respond
//! faster. Neither will refreshing it. We've tried. Science says no.
//!
//! 🦆 The duck has nothing to do with this module. It's just vibing.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::NOTHING};
use indicatif::{ProgressBar, ProgressStyle};

/// 🔢 Formats a number with commas for the 3 people in the audience who like
/// readability. "1000000" → "1,000,000" — you're welcome, eyes.
pub(crate) fn format_number(n: u64) -> String {
    let s = n.to_string();
    // -- 🧵 pre-allocate like we know what we're doing (we do, we read the book)
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// ⏱️ Formats a Duration into MM:SS or HH:MM:SS.
/// If a 68-page scrape shows HH:MM:SS, the delay config needs a conversation.
pub(crate) fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        // -- 🔄 long haul scrape. order pizza. plural.
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        // -- ✅ quick run. you have time for coffee. maybe.
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// 📊 The brains behind the fetch-stage display. Tracks pages, outcomes,
/// rates, and your sanity.
///
/// Uses a sliding 5-second window for rate calculations so spikes don't
/// scare you. (Your heart rate is not our responsibility.)
///
/// # Ancient Proverb
/// "He who scrapes sixty-eight pages without a progress bar, scrapes alone
/// and in darkness."
pub(crate) struct FetchProgress {
    /// 🏷️ which player are we even scraping? a name to display in the UI
    player_label: String,
    /// 📏 total monitored games — known up front, unlike some pipelines we
    /// could name, so the ETA is actually honest here
    total_games: u64,
    /// 📄 pages fetched so far (usable or not) — each one a tiny victory
    fetched: u64,
    /// ✅ pages that came back with text the parser can chew on
    usable: u64,
    /// 🔒 pages that came back as None — private, unowned, or unlucky
    unavailable: u64,
    /// 🎨 the actual terminal progress bar (indicatif does the heavy lifting here)
    progress_bar: ProgressBar,
    /// 🔄 sliding window of (timestamp, fetched) for rate calculation
    /// VecDeque because we pop from the front — linked list but make it cache-friendly-ish
    rate_samples: VecDeque<(Instant, u64)>,
    /// ⏱️ when did this whole adventure start? hopefully not too long ago.
    start_time: Instant,
}

impl std::fmt::Debug for FetchProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // -- 🎭 custom Debug impl because ProgressBar is a diva and doesn't derive Debug
        f.debug_struct("FetchProgress")
            .field("player_label", &self.player_label)
            .field("total_games", &self.total_games)
            .field("fetched", &self.fetched)
            .field("usable", &self.usable)
            .field("unavailable", &self.unavailable)
            .finish()
    }
}

impl FetchProgress {
    /// 🚀 Spin up a new FetchProgress for one player's monitored catalog.
    ///
    /// `total_games` is exactly the monitored-games list length — the one
    /// luxury of a fixed catalog is that the denominator never lies.
    pub(crate) fn new(player_label: String, total_games: u64) -> Self {
        // -- 🎨 build the progress bar — cyan because it's classy, blue because it's calm
        let progress_bar = ProgressBar::new(total_games);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg}\n| [{bar:40.cyan/blue}]")
                .unwrap() // -- 🐛 safe unwrap: template string is hardcoded and valid, I checked, twice
                .progress_chars("=>-"),
        );

        let start_time = Instant::now();

        // -- 🔄 seed the rate window with t=0 so we don't divide by zero like animals
        let mut rate_samples = VecDeque::new();
        rate_samples.push_back((start_time, 0u64));

        Self {
            player_label,
            total_games,
            fetched: 0,
            usable: 0,
            unavailable: 0,
            progress_bar,
            rate_samples,
            start_time,
        }
    }

    /// 🔄 Record one completed fetch — usable or not — and redraw.
    ///
    /// Call this after every page, in whatever order the fetches finish.
    /// The fold downstream doesn't care about order and neither do we.
    pub(crate) fn record(&mut self, was_usable: bool) {
        self.fetched += 1;
        if was_usable {
            self.usable += 1;
        } else {
            self.unavailable += 1;
        }

        // -- 📊 crunch the numbers, render the glory
        let games_per_sec = self.calculate_rate();
        self.render(games_per_sec);
        self.progress_bar.set_position(self.fetched);
    }

    /// ✅ Mark the progress bar done. Ring the bell. We made it.
    /// (Or every profile was private. Same bar position either way.)
    pub(crate) fn finish(&self) {
        self.progress_bar.finish();
    }

    /// 📈 Current fetch throughput over a 5-second sliding window.
    ///
    /// Sliding window keeps the displayed rate from looking like a
    /// seismograph when the rate limiter takes a personal interest in us.
    fn calculate_rate(&mut self) -> f64 {
        let now = Instant::now();
        // 🔄 evict samples older than 5 seconds from the front of the queue
        // -- like a bouncer at a club, but for data points
        let window = Duration::from_secs(5);
        while let Some(&(timestamp, _)) = self.rate_samples.front() {
            if now.duration_since(timestamp) > window {
                self.rate_samples.pop_front();
            } else {
                // ✅ this sample is fresh enough, and so are all the ones behind it
                break;
            }
        }

        // -- 📦 push the current moment into the window — the present is always relevant
        self.rate_samples.push_back((now, self.fetched));

        // 📊 compare now vs oldest sample in window to get the delta
        if let Some(&(oldest_time, oldest_fetched)) = self.rate_samples.front() {
            let elapsed = now.duration_since(oldest_time).as_secs_f64();
            if elapsed > 0.0 {
                let delta = self.fetched.saturating_sub(oldest_fetched);
                return delta as f64 / elapsed;
            }
        }

        // -- 💤 not enough elapsed time yet — return zero and maintain composure
        0.0
    }

    /// 🎨 Render the full progress display as a comfy-table message on the bar.
    ///
    /// Layout (3 rows x 2 cols):
    /// ```text
    /// | player: <label>
    /// | [=====>----------]
    ///   <games/s>     <fetched / total>
    ///   <usable>      <unavailable>
    ///   <elapsed>     <remaining>
    /// ```
    ///
    /// If you're reading this comment at 3am during an incident, I'm so sorry.
    /// At least the table looks nice.
    fn render(&self, games_per_sec: f64) {
        let percent = if self.total_games > 0 {
            (self.fetched as f64 / self.total_games as f64) * 100.0
        } else {
            0.0
        };

        // ⏱️ time stats
        let elapsed = self.start_time.elapsed();
        let elapsed_fmt = format_duration(elapsed);
        let remaining = if percent > 0.0 {
            // 🔮 linear extrapolation — assumes the future looks like the past
            // -- (historically a bad assumption, but fine for a fixed catalog)
            let total_estimated = elapsed.as_secs_f64() / (percent / 100.0);
            let remaining_secs = total_estimated - elapsed.as_secs_f64();
            if remaining_secs > 0.0 {
                format_duration(Duration::from_secs_f64(remaining_secs))
            } else {
                // ✅ done or basically done — show a friendly placeholder
                "--:--".to_string()
            }
        } else {
            // -- ⚠️  nothing fetched yet means no ETA — we're flying blind, captain
            "--:--".to_string()
        };

        let pages_progress = format!(
            "{} / {} pages",
            format_number(self.fetched),
            format_number(self.total_games)
        );

        // 🍽️ build the comfy table — two columns, right-aligned, no borders (preset: NOTHING)
        // -- NOTHING preset because we're minimalists. and also the borders looked bad.
        let mut table = Table::new();
        table.load_preset(NOTHING);
        table.set_content_arrangement(ContentArrangement::Dynamic);

        // 🚀 row 1: throughput and cumulative progress
        table.add_row(vec![
            Cell::new(format!("{:.2} pages/s", games_per_sec)).set_alignment(CellAlignment::Right),
            Cell::new(pages_progress).set_alignment(CellAlignment::Right),
        ]);
        // 📦 row 2: the outcome split — how many pages actually said something
        table.add_row(vec![
            Cell::new(format!("{} usable", format_number(self.usable)))
                .set_alignment(CellAlignment::Right),
            Cell::new(format!("{} unavailable", format_number(self.unavailable)))
                .set_alignment(CellAlignment::Right),
        ]);
        // ⏱️ row 3: time elapsed and estimated time remaining
        table.add_row(vec![
            Cell::new(format!("{} elapsed", elapsed_fmt)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{} remaining", remaining)).set_alignment(CellAlignment::Right),
        ]);

        // -- 🎨 slam it all into the progress bar message
        // indicatif will handle the terminal magic (cursor positioning, redraw, etc.)
        self.progress_bar
            .set_message(format!("player: {}\n{}", self.player_label, table));
    }
}
