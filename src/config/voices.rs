//! Voice catalogue offered by the speech service.
//!
//! The service maps each id onto one of its upstream voices; the client only needs the id to
//! send and enough metadata to let users pick one.

/// Display metadata for a service voice.
#[derive(Debug, Clone, Copy)]
pub struct Voice {
    pub name: &'static str,
    pub gender: &'static str,
    pub accent: &'static str,
}

/// All voices as a compile-time constant slice (sorted by id for binary search).
const VOICES: &[(&str, Voice)] = &[
    ("anna", Voice { name: "Anna", gender: "female", accent: "German" }),
    ("carmen", Voice { name: "Carmen", gender: "female", accent: "Spanish" }),
    ("chloe", Voice { name: "Chloe", gender: "female", accent: "Australian" }),
    ("emily", Voice { name: "Emily", gender: "female", accent: "American" }),
    ("james", Voice { name: "James", gender: "male", accent: "American" }),
    ("jihyun", Voice { name: "지현", gender: "female", accent: "Korean" }),
    ("marie", Voice { name: "Marie", gender: "female", accent: "French" }),
    ("misaki", Voice { name: "美咲", gender: "female", accent: "Japanese" }),
    ("oliver", Voice { name: "Oliver", gender: "male", accent: "British" }),
    ("sophia", Voice { name: "Sophia", gender: "female", accent: "British" }),
    ("xiaoxue", Voice { name: "小雪", gender: "female", accent: "Mandarin" }),
    ("yunyang", Voice { name: "云扬", gender: "male", accent: "Mandarin" }),
];

/// Voice used when none is requested.
pub const DEFAULT_VOICE: &str = "emily";

/// Get voice metadata by id using binary search O(log n).
pub fn get_voice(id: &str) -> Option<&'static Voice> {
    VOICES.binary_search_by_key(&id, |(n, _)| n).ok().map(|idx| &VOICES[idx].1)
}

/// Print all available voices grouped by accent.
pub fn print_voices() {
    println!("═══════════════════════════════════════════════════════════════════");
    println!("  {} Voices", VOICES.len());
    println!("═══════════════════════════════════════════════════════════════════");

    let accents = ["American", "British", "Australian", "Mandarin", "Japanese", "German", "French", "Korean", "Spanish"];

    for accent in &accents {
        println!("\n── {} ──", accent);
        println!("{:<10} {:<8} GENDER", "VOICE", "NAME");
        println!("{}", "─".repeat(40));

        for (id, voice) in VOICES.iter().filter(|(_, v)| v.accent == *accent) {
            println!("{:<10} {:<8} {}", id, voice.name, voice.gender);
        }
    }

    println!("\n{}\n", "─".repeat(70));
    println!("Default: {}", DEFAULT_VOICE);
    println!();
    println!("Usage:");
    println!("  ./tts-client generate --voice sophia --text \"Hello there\"");
}

/// Print detailed information about a specific voice.
pub fn print_voice_info(id: &str) -> anyhow::Result<()> {
    let voice = get_voice(id).ok_or_else(|| anyhow::anyhow!("Voice '{}' not found. Run with --list-voices to see available voices", id))?;

    println!();
    println!("Voice: {}", id);
    println!("{}", "─".repeat(40));
    println!("Name:      {}", voice.name);
    println!("Gender:    {}", voice.gender);
    println!("Accent:    {}", voice.accent);
    println!();
    println!("Usage:");
    println!("  ./tts-client generate --voice {} --text \"Hello there\"", id);
    println!();

    Ok(())
}
