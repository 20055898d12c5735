use std::{env, env::VarError};

/// There's no real CLI for the bot, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // We don't expect any CLI args, so always print the help
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // DEPOT_DISCORD_BOT_TOKEN is deliberately absent
    const DISPLAY_ENVS: [&str; 13] = [
        "RUST_LOG",
        "DEPOT_LOG_CHANNEL_ID",
        "DEPOT_SHOP_OWNER",
        "DEPOT_TOWN",
        "DEPOT_CHEST_X",
        "DEPOT_CHEST_Z",
        "DEPOT_DATABASE_URL",
        "DEPOT_AUTO_DEPOSITS",
        "DEPOT_POLL_INTERVAL",
        "DEPOT_PAUSED_POLL_INTERVAL",
        "DEPOT_EARTHMC_API_URL",
        "DEPOT_EARTHMC_MAP_URL",
        "DEPOT_HTTP_TIMEOUT",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
