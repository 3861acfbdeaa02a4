use ai_studio::models::ModelId;
use ai_studio::synth::templates::{
    ACKNOWLEDGMENT, CODE_LEAD_IN, CODE_SNIPPETS, CREATIVE, ECHO_TEMPLATES, ELABORATION, GREETING,
    HELP_OFFER, PARAGRAPH_BREAK, PRECISE, WEATHER_DISCLAIMER,
};
use ai_studio::synth::{
    DEFAULT_RESPONSE_DELAY, GenerationParams, ResponseSynthesizer, SeededRandom,
};
use std::collections::HashSet;

use test_utils::{instant_synthesizer, neutral_params};

fn unseeded_instant() -> ResponseSynthesizer {
    ResponseSynthesizer::new().with_delay(ai_studio::synth::NoDelay)
}

#[test]
fn test_greeting_ignores_parameters() {
    let synth = unseeded_instant();
    for (model, temperature, max_tokens) in [
        ("gemini-pro", 0.1, 50),
        ("gpt-4o", 1.9, 1000),
        ("unknown-model", 1.0, 700),
    ] {
        let params = GenerationParams::new(model, temperature, max_tokens);
        assert_eq!(synth.compose("HELLO there", &params), GREETING);
    }
}

#[test]
fn test_keyword_priority() {
    let synth = instant_synthesizer(1);
    let params = neutral_params("gemini-pro");
    assert_eq!(synth.compose("hello, show me some code", &params), GREETING);
    assert_eq!(synth.compose("Can you HELP with weather?", &params), HELP_OFFER);
    assert_eq!(synth.compose("thanks for the weather report", &params), ACKNOWLEDGMENT);
    assert_eq!(synth.compose("weather and programming", &params), WEATHER_DISCLAIMER);
}

#[test]
fn test_short_greeting_keyword_matches_inside_words() {
    let synth = instant_synthesizer(0);
    assert_eq!(synth.compose("Is this code fast?", &neutral_params("claude-3")), GREETING);
}

#[test]
fn test_code_reply_contains_exactly_one_snippet() {
    let synth = unseeded_instant();
    let params = neutral_params("gemini-pro");
    for _ in 0..20 {
        let reply = synth.compose("Write some Code for me", &params);
        assert!(reply.starts_with(CODE_LEAD_IN));
        let hits = CODE_SNIPPETS.iter().filter(|s| reply.contains(*s)).count();
        assert_eq!(hits, 1);
    }
}

#[test]
fn test_generic_reply_quotes_prompt() {
    let synth = unseeded_instant();
    let prompt = "Explain Rust lifetimes";
    let reply = synth.compose(prompt, &neutral_params("gpt-4o"));
    assert!(reply.contains(&format!("\"{prompt}\"")));
}

#[test]
fn test_model_flavor() {
    let synth = instant_synthesizer(0);
    let ultra = synth.compose("quantum foam", &neutral_params("gemini-ultra"));
    assert!(ultra.ends_with(&format!("{PARAGRAPH_BREAK}{}", ModelId::GeminiUltra.flavor())));

    let unknown = synth.compose("quantum foam", &neutral_params("mystery-9"));
    for model in ModelId::ALL {
        assert!(!unknown.contains(model.flavor()));
    }
    assert_eq!(unknown, ECHO_TEMPLATES[0].render("quantum foam"));
}

#[test]
fn test_length_and_temperature_modifiers() {
    let synth = instant_synthesizer(2);

    let long = synth.compose("tides", &GenerationParams::new("gemini-pro", 1.0, 900));
    assert!(long.contains(ELABORATION));
    let short = synth.compose("tides", &GenerationParams::new("gemini-pro", 1.0, 100));
    assert!(!short.contains(ELABORATION));

    let hot = synth.compose("tides", &GenerationParams::new("gemini-pro", 1.8, 250));
    assert!(hot.contains(CREATIVE) && !hot.contains(PRECISE));
    let cold = synth.compose("tides", &GenerationParams::new("gemini-pro", 0.2, 250));
    assert!(cold.contains(PRECISE) && !cold.contains(CREATIVE));
    let neutral = synth.compose("tides", &GenerationParams::new("gemini-pro", 1.0, 250));
    assert!(!neutral.contains(PRECISE) && !neutral.contains(CREATIVE));
}

#[test]
fn test_modifier_order() {
    let synth = instant_synthesizer(4);
    let reply = synth.compose("tides", &GenerationParams::new("claude-3", 1.8, 900));
    let expected = [
        ECHO_TEMPLATES[4].render("tides"),
        ModelId::Claude3.flavor().to_string(),
        ELABORATION.to_string(),
        CREATIVE.to_string(),
    ]
    .join(PARAGRAPH_BREAK);
    assert_eq!(reply, expected);
}

#[test]
fn test_repeated_calls_stay_in_output_set() {
    let synth = unseeded_instant();
    let params = GenerationParams::new("gemini-ultra", 1.8, 900);
    let prompt = "tell me about tides";

    let allowed: HashSet<String> = ECHO_TEMPLATES
        .iter()
        .map(|t| {
            [
                t.render(prompt),
                ModelId::GeminiUltra.flavor().to_string(),
                ELABORATION.to_string(),
                CREATIVE.to_string(),
            ]
            .join(PARAGRAPH_BREAK)
        })
        .collect();

    for _ in 0..50 {
        assert!(allowed.contains(&synth.compose(prompt, &params)));
    }
}

#[test]
fn test_seeded_synthesizers_agree() {
    let a = ResponseSynthesizer::new().with_random(SeededRandom::new(42));
    let b = ResponseSynthesizer::new().with_random(SeededRandom::new(42));
    let params = neutral_params("gemini-pro");
    for prompt in ["tides", "volcanoes", "some code please", "galaxies"] {
        assert_eq!(a.compose(prompt, &params), b.compose(prompt, &params));
    }
}

#[test]
fn test_empty_prompt_gets_generic_reply() {
    let synth = instant_synthesizer(0);
    assert_eq!(
        synth.compose("", &neutral_params("none")),
        ECHO_TEMPLATES[0].render("")
    );
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_calls_are_independent() {
    let synth = ResponseSynthesizer::new();
    let params = neutral_params("gemini-pro");
    let prompts = ["hello", "help", "thanks", "weather", "code"];

    let start = tokio::time::Instant::now();
    let replies = futures::future::join_all(prompts.iter().map(|p| synth.respond(p, &params))).await;

    assert!(start.elapsed() >= DEFAULT_RESPONSE_DELAY);
    assert!(start.elapsed() < DEFAULT_RESPONSE_DELAY * 2);
    assert_eq!(replies[0], GREETING);
    assert_eq!(replies[1], HELP_OFFER);
    assert_eq!(replies[2], ACKNOWLEDGMENT);
    assert_eq!(replies[3], WEATHER_DISCLAIMER);
    assert!(replies[4].starts_with(CODE_LEAD_IN));
}

#[tokio::test(start_paused = true)]
async fn test_configured_latency_is_honoured() {
    let synth = ResponseSynthesizer::new().with_latency(std::time::Duration::from_millis(300));
    let start = tokio::time::Instant::now();
    let reply = synth.synthesize("thank you", "gpt-4o", 1.0, 250).await;
    assert_eq!(reply, ACKNOWLEDGMENT);
    assert!(start.elapsed() >= std::time::Duration::from_millis(300));
    assert!(start.elapsed() < DEFAULT_RESPONSE_DELAY);
}
