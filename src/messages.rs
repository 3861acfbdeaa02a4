use crate::synth::{RandomSource, ThreadRandom};
use crate::ui::rgb;

/// A waiting line with the color it is shown in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColoredMessage {
    pub text: &'static str,
    pub color: (u8, u8, u8),
}

const fn msg(text: &'static str, color: (u8, u8, u8)) -> ColoredMessage {
    ColoredMessage { text, color }
}

static WAITING_MESSAGES: &[ColoredMessage] = &[
    msg("🔮 Consulting the model oracle...", rgb::DEEP_PURPLE),
    msg("🧠 Warming up the neurons...", rgb::SUCCESS_GREEN),
    msg("✨ Sprinkling a little temperature on it...", rgb::CORAL),
    msg("📡 Tuning into the response frequency...", rgb::NEON_CYAN),
    msg("🧪 Distilling an answer...", rgb::ELECTRIC_YELLOW),
    msg("🌌 Sampling from the idea cosmos...", rgb::ELECTRIC_PURPLE),
    msg("🎨 Composing a reply...", rgb::CORAL),
    msg("🔭 Looking for the right words...", rgb::NEON_CYAN),
    msg("🧩 Assembling the pieces...", rgb::SUCCESS_GREEN),
    msg("⏳ Letting the tokens settle...", rgb::DIM_WHITE),
];

static SEARCH_WAITING_MESSAGES: &[ColoredMessage] = &[
    msg("🔍 Searching the web...", rgb::NEON_CYAN),
    msg("🌐 Crawling through the index...", rgb::SUCCESS_GREEN),
    msg("📚 Flipping through results...", rgb::ELECTRIC_YELLOW),
    msg("🛰️ Pinging the search satellites...", rgb::DEEP_PURPLE),
];

fn pick(
    rng: &dyn RandomSource,
    messages: &'static [ColoredMessage],
    fallback: ColoredMessage,
) -> ColoredMessage {
    messages
        .get(rng.pick_index(messages.len()))
        .copied()
        .unwrap_or(fallback)
}

/// Line shown while a chat reply is pending
pub fn get_waiting_message() -> ColoredMessage {
    pick(
        &ThreadRandom,
        WAITING_MESSAGES,
        msg("Generating a response...", rgb::ELECTRIC_YELLOW),
    )
}

/// Line shown while a search is running
pub fn get_search_waiting_message() -> ColoredMessage {
    pick(
        &ThreadRandom,
        SEARCH_WAITING_MESSAGES,
        msg("Searching...", rgb::NEON_CYAN),
    )
}
