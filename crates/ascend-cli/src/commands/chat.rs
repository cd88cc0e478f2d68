use std::borrow::Cow::{self, Borrowed, Owned};
use std::time::Duration;

use anyhow::Result;
use ascend_application::AssistantAdapter;
use ascend_core::assistant::{AssistantMode, ChatMessage, ChatRole, Citation};
use ascend_core::catalog::ProductId;
use ascend_core::settings::format_price;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio::time::timeout;

use crate::app::AppContext;

const REPLY_TIMEOUT: Duration = Duration::from_secs(60);

const COMMANDS: &[&str] = &[
    "/add",
    "/qty",
    "/remove",
    "/cart",
    "/checkout",
    "/describe",
    "/share",
    "/lang",
    "/theme",
    "/voice",
    "/help",
    "/quit",
];

/// Completion, highlighting and hints for slash commands.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with('/') || line.contains(' ') {
            return Ok((0, vec![]));
        }

        let candidates = self
            .commands
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.clone(),
                replacement: cmd.clone(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// A parsed REPL line.
#[derive(Debug, PartialEq)]
enum Input {
    Add(ProductId),
    Quantity(ProductId, i64),
    Remove(ProductId),
    Cart,
    Checkout,
    Describe(ProductId),
    Share(ProductId),
    ToggleLanguage,
    ToggleTheme,
    ToggleVoice,
    Help,
    Quit,
    Message(String),
    Invalid(String),
}

fn parse_input(line: &str) -> Input {
    let Some(command) = line.strip_prefix('/') else {
        return Input::Message(line.to_string());
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    let id = |idx: usize| args.get(idx).and_then(|s| s.parse::<ProductId>().ok());

    match (name, args.len()) {
        ("add", 1) => id(0).map(Input::Add),
        ("remove", 1) => id(0).map(Input::Remove),
        ("describe", 1) => id(0).map(Input::Describe),
        ("share", 1) => id(0).map(Input::Share),
        ("qty", 2) => id(0)
            .zip(args[1].parse::<i64>().ok())
            .map(|(id, delta)| Input::Quantity(id, delta)),
        ("cart", 0) => Some(Input::Cart),
        ("checkout", 0) => Some(Input::Checkout),
        ("lang", 0) => Some(Input::ToggleLanguage),
        ("theme", 0) => Some(Input::ToggleTheme),
        ("voice", 0) => Some(Input::ToggleVoice),
        ("help", 0) => Some(Input::Help),
        ("quit" | "exit", 0) => Some(Input::Quit),
        _ => None,
    }
    .unwrap_or_else(|| Input::Invalid(line.to_string()))
}

pub async fn run(ctx: &AppContext) -> Result<()> {
    let adapter = ctx.assistant()?;
    let storefront = &ctx.storefront;

    let products = storefront.products().await;
    adapter.initialize(&products).await?;

    let language = storefront.settings().current().await.language;
    println!("{}", "=== ASCEND Assistant ===".bright_magenta().bold());
    println!(
        "{}",
        "Ask anything, or type /help for cart commands. /quit exits.".bright_black()
    );
    println!();
    for message in adapter.open_chat(language).await {
        print_message(&message);
    }

    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                match parse_input(trimmed) {
                    Input::Quit => {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                    input => {
                        if let Err(e) = handle(ctx, &adapter, input).await {
                            eprintln!("{}", format!("Error: {e}").red());
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type '/quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {err:?}").red());
                break;
            }
        }
    }

    adapter.shutdown().await;
    Ok(())
}

async fn handle(ctx: &AppContext, adapter: &AssistantAdapter, input: Input) -> Result<()> {
    let storefront = &ctx.storefront;

    match input {
        Input::Message(text) => {
            let reply = match timeout(REPLY_TIMEOUT, adapter.send_text(&text)).await {
                Ok(reply) => reply?,
                Err(_) => {
                    println!("{}", "The assistant took too long to answer.".yellow());
                    return Ok(());
                }
            };
            print_reply(&reply.text, &reply.citations);
        }
        Input::Add(id) => {
            storefront.add_to_cart(id).await?;
            print_cart(ctx).await;
        }
        Input::Quantity(id, delta) => {
            storefront.update_quantity(id, delta).await;
            print_cart(ctx).await;
        }
        Input::Remove(id) => {
            storefront.remove_item(id).await;
            print_cart(ctx).await;
        }
        Input::Cart => print_cart(ctx).await,
        Input::Checkout => {
            let summary = storefront.order_summary().await;
            if summary.is_empty() {
                println!("{}", "Your cart is empty.".bright_black());
                return Ok(());
            }
            println!("{summary}");
            match storefront.checkout_link().await {
                Some(link) => println!("{}", link.bright_blue().underline()),
                None => println!(
                    "{}",
                    "No checkout number configured (set checkout.phone in config.toml).".yellow()
                ),
            }
        }
        Input::Describe(id) => {
            let Some(product) = storefront.product(id).await else {
                println!("{}", format!("No product with id {id}").yellow());
                return Ok(());
            };
            let description = adapter
                .generate_product_description(&product.name, &product.category)
                .await;
            println!("{}", description.bright_blue());
        }
        Input::Share(id) => {
            let Some(product) = storefront.product(id).await else {
                println!("{}", format!("No product with id {id}").yellow());
                return Ok(());
            };
            match storefront.share(&product) {
                Some(ticket) => println!("{}", ticket.url().bright_blue().underline()),
                None => println!("{}", "A share is already in progress.".yellow()),
            }
        }
        Input::ToggleLanguage => {
            let language = storefront.settings().toggle_language().await;
            println!("{}", format!("Language: {language}").bright_black());
        }
        Input::ToggleTheme => {
            let theme = storefront.settings().toggle_theme().await;
            println!("{}", format!("Theme: {theme}").bright_black());
        }
        Input::ToggleVoice => {
            if adapter.mode().await == AssistantMode::VoiceActive {
                adapter.stop_voice().await;
                println!("{}", "Voice mode off.".bright_black());
            } else {
                adapter.start_voice().await?;
                println!(
                    "{}",
                    "Voice mode on. Speak to the assistant; /voice again stops.".bright_magenta()
                );
            }
        }
        Input::Help => print_help(),
        Input::Invalid(line) => {
            println!("{}", format!("Unknown command: {line}").bright_black());
        }
        Input::Quit => {}
    }

    Ok(())
}

fn print_message(message: &ChatMessage) {
    match message.role {
        ChatRole::User => println!("{}", format!("> {}", message.text).green()),
        ChatRole::Model => print_reply(&message.text, &message.citations),
    }
}

fn print_reply(text: &str, citations: &[Citation]) {
    for line in text.lines() {
        println!("{}", line.bright_blue());
    }
    for citation in citations {
        println!(
            "  {} {}",
            format!("[{}]", citation.title).bright_magenta(),
            citation.uri.bright_black()
        );
    }
    println!();
}

async fn print_cart(ctx: &AppContext) {
    let storefront = &ctx.storefront;
    let cart = storefront.cart().await;
    if cart.is_empty() {
        println!("{}", "Your cart is empty.".bright_black());
        return;
    }

    let settings = storefront.settings().current().await;
    let currency = settings.effective_currency();
    let rate = storefront.options().yer_rate;

    for line in cart.lines() {
        println!(
            "{:>4}  {} x {}  {}",
            line.product_id().to_string().bright_black(),
            line.quantity(),
            line.product.display_name(settings.language),
            format_price(line.line_total(), currency, rate).green()
        );
    }
    println!(
        "{} ({} items): {}",
        "Subtotal".bold(),
        cart.item_count(),
        format_price(cart.subtotal(), currency, rate).green().bold()
    );
}

fn print_help() {
    let rows = [
        ("/add <id>", "add a product to the cart"),
        ("/qty <id> <delta>", "change a line quantity, e.g. /qty 2 -1"),
        ("/remove <id>", "drop a line from the cart"),
        ("/cart", "show the cart"),
        ("/checkout", "print the order summary and WhatsApp link"),
        ("/describe <id>", "write a short product description"),
        ("/share <id>", "print a share link"),
        ("/lang", "toggle English and Arabic"),
        ("/theme", "toggle light and dark"),
        ("/voice", "start or stop live voice chat"),
        ("/quit", "leave the chat"),
    ];
    for (usage, what) in rows {
        println!("  {:<20} {}", usage.bright_cyan(), what.bright_black());
    }
}
