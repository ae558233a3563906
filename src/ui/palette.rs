// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Button colors.
//!
//! Configured colors replace the default palette entirely. Buttons beyond
//! the palette, or with a color that does not parse, get a random color.

use std::str::FromStr;

use rand::Rng;
use ratatui::style::Color;

/// Palette used when no colors are configured
pub const DEFAULT_COLORS: [&str; 6] = [
    "green",
    "rgb(200, 0, 0)",
    "blue",
    "yellow",
    "purple",
    "orange",
];

/// Random channel range; avoids near-black and near-white buttons
const RANDOM_CHANNEL_MIN: u8 = 30;
const RANDOM_CHANNEL_MAX: u8 = 226;

/// Parse a color name, `rgb(r, g, b)` or `#rrggbb`
pub fn parse_color(text: &str) -> Option<Color> {
    let text = text.trim();
    let lower = text.to_ascii_lowercase();

    if let Some(inner) = lower
        .strip_prefix("rgb(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let channels: Vec<u8> = inner
            .split(',')
            .map(|part| part.trim().parse::<u8>())
            .collect::<Result<_, _>>()
            .ok()?;
        return match channels.as_slice() {
            [r, g, b] => Some(Color::Rgb(*r, *g, *b)),
            _ => None,
        };
    }

    // Names the terminal palette lacks
    match lower.as_str() {
        "purple" => return Some(Color::Rgb(128, 0, 128)),
        "orange" => return Some(Color::Rgb(255, 165, 0)),
        "gold" => return Some(Color::Rgb(255, 215, 0)),
        _ => {}
    }

    Color::from_str(&lower).ok()
}

/// A random color with every channel in 30..=226
pub fn random_color<R: Rng>(rng: &mut R) -> Color {
    Color::Rgb(
        rng.gen_range(RANDOM_CHANNEL_MIN..=RANDOM_CHANNEL_MAX),
        rng.gen_range(RANDOM_CHANNEL_MIN..=RANDOM_CHANNEL_MAX),
        rng.gen_range(RANDOM_CHANNEL_MIN..=RANDOM_CHANNEL_MAX),
    )
}

/// Colors for `count` buttons
pub fn button_colors(count: usize, configured: &[String]) -> Vec<Color> {
    button_colors_with(count, configured, &mut rand::thread_rng())
}

/// Colors for `count` buttons, drawing fallbacks from `rng`
pub fn button_colors_with<R: Rng>(
    count: usize,
    configured: &[String],
    rng: &mut R,
) -> Vec<Color> {
    let palette: Vec<&str> = if configured.is_empty() {
        DEFAULT_COLORS.to_vec()
    } else {
        configured.iter().map(String::as_str).collect()
    };

    (0..count)
        .map(|index| match palette.get(index) {
            Some(text) => parse_color(text).unwrap_or_else(|| {
                tracing::warn!(button = index, color = *text, "unrecognized color");
                random_color(rng)
            }),
            None => random_color(rng),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn in_random_range(color: Color) -> bool {
        match color {
            Color::Rgb(r, g, b) => [r, g, b]
                .iter()
                .all(|c| (RANDOM_CHANNEL_MIN..=RANDOM_CHANNEL_MAX).contains(c)),
            _ => false,
        }
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(parse_color("green"), Some(Color::Green));
        assert_eq!(parse_color("rgb(200, 0, 0)"), Some(Color::Rgb(200, 0, 0)));
        assert_eq!(parse_color("RGB(1,2,3)"), Some(Color::Rgb(1, 2, 3)));
        assert_eq!(parse_color("#ff8000"), Some(Color::Rgb(255, 128, 0)));
        assert_eq!(parse_color("purple"), Some(Color::Rgb(128, 0, 128)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_color("rgb(300, 0, 0)"), None);
        assert_eq!(parse_color("rgb(1, 2)"), None);
        assert_eq!(parse_color("not-a-color"), None);
    }

    #[test]
    fn test_default_palette() {
        let colors = button_colors(4, &[]);
        assert_eq!(
            colors,
            vec![
                Color::Green,
                Color::Rgb(200, 0, 0),
                Color::Blue,
                Color::Yellow
            ]
        );
    }

    #[test]
    fn test_random_fallback_beyond_palette() {
        let mut rng = StdRng::seed_from_u64(3);
        let colors = button_colors_with(9, &[], &mut rng);
        assert_eq!(colors.len(), 9);
        assert_eq!(colors[5], Color::Rgb(255, 165, 0));
        assert!(colors[6..].iter().all(|c| in_random_range(*c)));
    }

    #[test]
    fn test_configured_replaces_defaults() {
        let mut rng = StdRng::seed_from_u64(3);
        let configured = vec!["#000000".to_string(), "bogus".to_string()];
        let colors = button_colors_with(3, &configured, &mut rng);

        assert_eq!(colors[0], Color::Rgb(0, 0, 0));
        assert!(in_random_range(colors[1]));
        assert!(in_random_range(colors[2]));
    }
}
