//! Reference audio catalog.

use crate::models::AudioContent;

fn item(
    id: &str,
    title: &str,
    artist: &str,
    duration: &str,
    cover_seed: &str,
    category: &str,
    is_favorite: bool,
) -> AudioContent {
    AudioContent {
        id: id.to_string(),
        title: title.to_string(),
        artist: artist.to_string(),
        duration_label: duration.to_string(),
        cover_art_url: format!("https://picsum.photos/seed/{}/400/400", cover_seed),
        category: category.to_string(),
        audio_url: "#".to_string(),
        is_favorite,
    }
}

/// The eight built-in audio sessions, in display order.
pub fn default_catalog() -> Vec<AudioContent> {
    vec![
        item("audio001", "Morning Dew Meditation", "Serene Voices", "15:30", "audio1", "Stress Relief", true),
        item("audio002", "Deep Sleep Waves", "Calm Collective", "45:10", "audio2", "Sleep", false),
        item("audio003", "Focus Flow Beta", "MindSharp", "30:00", "audio3", "Focus", false),
        item("audio004", "Anxiety Release Ambient", "Peaceful Mind", "22:00", "audio4", "Stress Relief", false),
        item("audio005", "Ocean Dreams Lullaby", "Nature Sounds", "60:00", "audio5", "Sleep", true),
        item("audio006", "Energizing Morning Mix", "Uplift Beats", "10:00", "audio6", "Energy", false),
        item(
            "audio007",
            "Kid's Bedtime Story: The Magical Forest",
            "Story Teller",
            "12:15",
            "kids1",
            "Kids Bedtime",
            false,
        ),
        item(
            "audio008",
            "Kid's Calming Music: Gentle Clouds",
            "Childhood Melodies",
            "20:00",
            "kids2",
            "Kids Calming",
            false,
        ),
    ]
}

/// Browse categories offered by the app, `"All"` first.
pub const CATEGORIES: &[&str] = &[
    "All",
    "Stress Relief",
    "Sleep",
    "Focus",
    "Energy",
    "Meditation",
    "Kids Bedtime",
    "Kids Calming",
];
