//! Plain-text pages wrapped in a minimal HTML shell.

use mining_economy::{AccountRecord, Catalog};

/// Delay before redirect pages navigate, in milliseconds.
pub const REDIRECT_DELAY_MS: u32 = 3000;

/// Longer delay for the login hint.
pub const HINT_DELAY_MS: u32 = 5000;

/// Page titles.
pub mod titles {
    /// Home page.
    pub const HOME: &str = "Mining Game - Home";
    /// Login page.
    pub const LOGIN: &str = "Mining Game - Login";
    /// Logout page.
    pub const LOGOUT: &str = "Mining Game - Logout";
    /// Mine page.
    pub const MINE: &str = "Mining Game - Mine";
    /// Scoreboard page.
    pub const SCOREBOARD: &str = "Mining Game - Scoreboard";
    /// Shop pages.
    pub const SHOP: &str = "Mining Game - Shop";
    /// Error page.
    pub const ERROR: &str = "Mining Game - Error";
}

/// Renders `message` as preformatted text.
pub fn page(title: &str, message: &str) -> String {
    format!(
        r#"<html>
<head>
	<meta name="color-scheme" content="light dark">
	<title>{}</title>
</head>
<body>
	<pre style="word-wrap: break-word; white-space: pre-wrap;" id="dataContainer">{}</pre>
</body>
</html>
"#,
        escape(title),
        escape(message)
    )
}

/// Renders `message` and navigates to `target` after `delay_ms`.
pub fn redirect_page(title: &str, message: &str, target: &str, delay_ms: u32) -> String {
    format!(
        r#"<html>
<head>
	<meta name="color-scheme" content="light dark">
	<title>{}</title>
</head>
<script>
	setTimeout(() => {{
		location.href = "{}";
	}}, {});
</script>
<body>
	<pre style="word-wrap: break-word; white-space: pre-wrap;" id="dataContainer">{}</pre>
</body>
</html>
"#,
        escape(title),
        escape(target),
        delay_ms,
        escape(message)
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&#39;"),
            '"' => out.push_str("&#34;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Greeting for a logged-in account.
pub fn home_text(record: &AccountRecord) -> String {
    let currency = if record.diamond > 0 {
        format!(
            "You have {} gold and {} diamond(s).",
            record.gold, record.diamond
        )
    } else {
        format!("You have {} gold.", record.gold)
    };

    format!(
        "Welcome back, {}!\n{}\n\n\
         Start out by going to /mine\n\
         You can also visit the shop at /shop\n\
         Access the scoreboard at /scoreboard\n\n\
         Logout using /logout\n",
        record.name, currency
    )
}

/// Greeting for an anonymous caller.
pub const WELCOME_TEXT: &str = "Hello, there!\nLogin using /login?username=yourname";

/// Result text of a mining action.
pub fn mine_text(total_gold: u64, gold_mined: u64, found_diamond: bool) -> String {
    let mut message = format!("You have {total_gold} gold in total.\nYou mined {gold_mined} gold!");
    if found_diamond {
        message.push_str("\nYou found a diamond!");
    }
    message
}

/// Ranked list of accounts; expects them already sorted.
pub fn scoreboard_text(scores: &[AccountRecord]) -> String {
    scores
        .iter()
        .enumerate()
        .map(|(rank, record)| format!("{}. {}: {} gold\n", rank + 1, record.name, record.gold))
        .collect()
}

/// The shop listing for `record`. Upgrades are only shown to accounts
/// holding diamonds.
pub fn shop_text(record: &AccountRecord, catalog: &Catalog) -> String {
    let tools: String = catalog
        .tools()
        .iter()
        .enumerate()
        .map(|(offset, tool)| {
            let owned = if record.has_tool(tool) {
                " | ALREADY OWN"
            } else {
                ""
            };
            format!(
                "[{}] - {}: {} gold | {}-{} range{}\n",
                offset + 1,
                tool.name(),
                tool.price(),
                tool.min_yield(),
                tool.max_yield(),
                owned
            )
        })
        .collect();

    let (diamonds, upgrades) = if record.diamond > 0 {
        let first = catalog.first_upgrade_index();
        let listing: String = catalog
            .upgrades()
            .iter()
            .enumerate()
            .map(|(offset, upgrade)| {
                let owned = if record.has_upgrade(upgrade.id()) {
                    " | ALREADY OWN"
                } else {
                    ""
                };
                format!(
                    "[{}] - {}: {} diamond{}\n  • {}\n",
                    first + offset,
                    upgrade.name(),
                    upgrade.price(),
                    owned,
                    upgrade.description()
                )
            })
            .collect();
        (
            format!("You also have {} diamond(s) available.\n", record.diamond),
            format!("Upgrades:\n{listing}"),
        )
    } else {
        (String::new(), String::new())
    };

    format!(
        "Welcome to the shop!\n\
         Here you can buy items to help you mine more gold.\n\n\
         Your current pickaxe: {}.\n\n\
         You have {} gold available.\n\
         {}\n\
         Buy items using '/shop/<item number>'\n\n\
         Pickaxes:\n{}\n\n{}\n",
        record.equipped_tool.name(),
        record.gold,
        diamonds,
        tools,
        upgrades
    )
}
