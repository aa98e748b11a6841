use ratatui::style::Color;
use strum_macros::Display;
use strum_macros::EnumIter;
use strum_macros::EnumString;
use strum_macros::EnumVariantNames;

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString, EnumVariantNames, EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    pub fn from_dark_mode(dark_mode: bool) -> ThemeMode {
        if dark_mode {
            return ThemeMode::Dark;
        }
        return ThemeMode::Light;
    }

    pub fn palette(self) -> Palette {
        match self {
            ThemeMode::Dark => Palette {
                text: Color::Gray,
                text_strong: Color::White,
                text_muted: Color::DarkGray,
                background: Color::Black,
                accent: Color::Cyan,
                user: Color::LightBlue,
                error: Color::LightRed,
                code: Color::Yellow,
                border: Color::DarkGray,
                bar: Color::Cyan,
            },
            ThemeMode::Light => Palette {
                text: Color::Black,
                text_strong: Color::Black,
                text_muted: Color::Gray,
                background: Color::White,
                accent: Color::Blue,
                user: Color::Indexed(55),
                error: Color::Red,
                code: Color::Magenta,
                border: Color::Gray,
                bar: Color::Indexed(63),
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub text: Color,
    pub text_strong: Color,
    pub text_muted: Color,
    pub background: Color,
    pub accent: Color,
    pub user: Color,
    pub error: Color,
    pub code: Color,
    pub border: Color,
    pub bar: Color,
}
