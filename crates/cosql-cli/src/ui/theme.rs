use cosql_core::Tone;
use crossterm::style::Color;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeTokens {
    pub header: Option<Color>,
    pub text: Option<Color>,
    pub marker: Option<Color>,
    pub fetching: Option<Color>,
    pub content: Option<Color>,
    pub prompt: Option<Color>,
    pub error: Option<Color>,
}

pub fn build_theme(no_color: bool) -> ThemeTokens {
    if no_color {
        return monochrome_theme();
    }
    default_theme()
}

pub fn color_for_tone(tokens: &ThemeTokens, tone: Tone) -> Option<Color> {
    match tone {
        Tone::Plain => None,
        Tone::Header => tokens.header,
        Tone::Text => tokens.text,
        Tone::Marker => tokens.marker,
        Tone::Fetching => tokens.fetching,
        Tone::Content => tokens.content,
        Tone::Prompt => tokens.prompt,
        Tone::Error => tokens.error,
    }
}

fn default_theme() -> ThemeTokens {
    ThemeTokens {
        header: Some(Color::White),
        text: Some(Color::Green),
        marker: Some(Color::Red),
        fetching: Some(Color::Cyan),
        content: Some(Color::Yellow),
        prompt: Some(Color::Green),
        error: Some(Color::Red),
    }
}

fn monochrome_theme() -> ThemeTokens {
    ThemeTokens {
        header: None,
        text: None,
        marker: None,
        fetching: None,
        content: None,
        prompt: None,
        error: None,
    }
}
