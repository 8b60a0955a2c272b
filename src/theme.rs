use crate::task::TaskStatus;
use ratatui::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ThemeName {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub text: Color,
    pub background: Color,
    pub tint: Color,
    pub icon: Color,
    pub card_background: Color,
    pub card_border: Color,
    columns: [Color; TaskStatus::COUNT],
}

impl Theme {
    pub fn light() -> Self {
        Self {
            text: Color::Rgb(0x2D, 0x37, 0x48),
            background: Color::Rgb(0xF7, 0xFA, 0xFC),
            tint: Color::Rgb(0x4C, 0x51, 0xBF),
            icon: Color::Rgb(0x71, 0x80, 0x96),
            card_background: Color::Rgb(0xFF, 0xFF, 0xFF),
            card_border: Color::Rgb(0xE2, 0xE8, 0xF0),
            columns: [
                Color::Rgb(0xEB, 0xF8, 0xFF),
                Color::Rgb(0xF0, 0xFF, 0xF4),
                Color::Rgb(0xFA, 0xF5, 0xFF),
                Color::Rgb(0xFF, 0xF5, 0xF5),
                Color::Rgb(0xFF, 0xFF, 0xF0),
            ],
        }
    }

    pub fn dark() -> Self {
        Self {
            text: Color::Rgb(0xF7, 0xFA, 0xFC),
            background: Color::Rgb(0x1A, 0x20, 0x2C),
            tint: Color::Rgb(0x66, 0x7E, 0xEA),
            icon: Color::Rgb(0xA0, 0xAE, 0xC0),
            card_background: Color::Rgb(0x2D, 0x37, 0x48),
            card_border: Color::Rgb(0x4A, 0x55, 0x68),
            columns: [
                Color::Rgb(0x2A, 0x43, 0x65),
                Color::Rgb(0x27, 0x67, 0x49),
                Color::Rgb(0x44, 0x33, 0x7A),
                Color::Rgb(0x74, 0x2A, 0x2A),
                Color::Rgb(0x74, 0x42, 0x10),
            ],
        }
    }

    pub fn column(&self, status: TaskStatus) -> Color {
        self.columns[status.index()]
    }
}

impl From<ThemeName> for Theme {
    fn from(name: ThemeName) -> Self {
        match name {
            ThemeName::Light => Theme::light(),
            ThemeName::Dark => Theme::dark(),
        }
    }
}
