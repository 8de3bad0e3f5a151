//! 🚀 qmx-cli — the front door, the bouncer, the maitre d' of questmatch.
//!
//! 🎬 *[narrator voice]* "It all started with a simple main() function..."
//! 📦 This binary crate is the thin CLI wrapper that loads config,
//! sets up logging, runs one recommendation pass, and prints the
//! leaderboard. Like a manager, but one who formats tables nicely. 🦆

use anyhow::{Context, Result};
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::UTF8_FULL};
use tracing::error;
use tracing_subscriber::EnvFilter;

use qmx::RankedGame;

/// 🚀 main() — where it all begins. The genesis. The big bang.
/// The "I pressed F5 and held my breath" moment.
///
/// 🔧 Steps:
/// 1. Init tracing (so we can see what goes wrong, and when)
/// 2. Parse args (player id required, config path optional)
/// 3. Load config (the moment of truth)
/// 4. Run the thing (send it and pray 🙏)
/// 5. Print the table, or handle errors (cry)
#[tokio::main]
async fn main() -> Result<()> {
    // 📡 Set up tracing — because println! debugging is a lifestyle choice
    // we're trying to move past, like flip phones and cargo shorts
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 🎯 Grab the args like catching Pokémon — gotta get at least 1
    let args: Vec<String> = std::env::args().collect();
    let Some(player_id) = args.get(1) else {
        eprintln!("usage: qmx <player-id> [config.toml]");
        eprintln!("       (the player id is the numeric Steam profile id)");
        std::process::exit(2);
    };
    let path_arg = match args.get(2) {
        Some(s) => s.clone(),
        None => "qmx.toml".to_string(), // 🔧 default: the ol' reliable
    };

    // 🔒 Validate the config file exists before we get too emotionally attached
    let config_file = std::path::Path::new(&path_arg);
    let config_file_path_which_is_validated_to_exist = match config_file.try_exists()
        .context(format!("💀 Configuration file may not exist, couldn't find it. Double check that it exists, or maybe, it's an issue with pwd/cwd and relative paths. In that case, use an absolute path, to be absolutely certain, you are not messing this up. Was checking here: '{}'", config_file.display()))
    /* ? */ ? // ⚠️ Unwrap this, maybe — like unwrapping a gift that might be socks
    {
        true => Some(config_file),  // ✅ Found it! Better than finding my car keys
        false => None               // 💤 Not there. Env vars only. Living dangerously.
    };

    // 🔧 Load the config — this is the moment where we find out if the TOML is valid
    // or if someone put a tab where a space should be (looking at you, Kevin)
    let app_config = qmx::load_config(config_file_path_which_is_validated_to_exist)
        .context("💀 In qmx-cli, main, we couldn't load the config file, take a look at the file, make sure it's correct. Make sure you didn't forget something obvious, dumas")
    /* ? */ ?;

    // 🚀 SEND IT. No take-backs. Sixty-eight pages of no take-backs.
    let result = qmx::run(app_config, player_id).await;

    match result {
        Ok(ranking) => print_ranking(player_id, &ranking),
        // 💀 Error handling: the part where we find out what went wrong
        // and print it in a way that's helpful at 3am
        Err(err) => {
            error!("💀 error: {}", err);
            // -- 🧅 peel the onion of sadness, one tear-jerking layer at a time
            let mut the_vibes_are_giving_connection_issues = false;
            for cause in err.chain().skip(1) {
                error!("⚠️  cause: {}", cause);
                // -- 🕵️ sniff the cause like a truffle pig hunting for connection problems
                let cause_str = cause.to_string();
                if cause_str.contains("error sending request")
                    || cause_str.contains("connection refused")
                    || cause_str.contains("Connection refused")
                    || cause_str.contains("tcp connect error")
                    || cause_str.contains("dns error")
                {
                    the_vibes_are_giving_connection_issues = true;
                }
            }

            // -- 📡 if it smells like a connection problem, it's probably a connection problem
            // -- like when your wifi icon has full bars but nothing loads
            if the_vibes_are_giving_connection_issues {
                error!(
                    "🔧 hint: looks like the community site isn't reachable. \
                    Check your network, or if you pointed base_url somewhere local \
                    for testing, make sure that server is actually running. \
                    Even mock servers need a nudge sometimes. ☕"
                );
            }

            // 🗑️ Exit with prejudice. Process exitus maximus.
            std::process::exit(1);
        }
    }

    // ✅ If we got here, everything worked. Pop the champagne. 🍾
    // (or at least close the terminal tab with a sense of accomplishment)
    Ok(())
}

/// 🏆 Print the final leaderboard as a comfy table, or break the news gently
/// when the fallback (an empty ranking) came back instead.
fn print_ranking(player_id: &str, ranking: &[RankedGame]) {
    if ranking.is_empty() {
        // 💤 The documented fallback: no usable signal, no recommendations.
        // Not an error. Just an empty leaderboard and a shrug.
        println!(
            "No recommendations for player {player_id} — no usable achievement \
             data came back. Private profile? Empty library? The mystery is yours."
        );
        return;
    }

    // 🍽️ Full borders this time — the progress table is a minimalist, but the
    // final answer gets to dress up.
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["rank", "game id", "score"]);
    for (position, game) in ranking.iter().enumerate() {
        table.add_row(vec![
            Cell::new(position + 1).set_alignment(CellAlignment::Right),
            Cell::new(game.game_id).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.4}", game.score)).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("recommendations for player {player_id}:\n{table}");
}
