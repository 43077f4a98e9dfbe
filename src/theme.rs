use std::str::FromStr;

use tuirealm::ratatui::style::Color;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum ThemeMode {
    Light,
    #[default]
    Dark,
}

impl ThemeMode {
    pub const ALL: [Self; 2] = [Self::Light, Self::Dark];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub const fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub const fn from_dark_flag(dark: bool) -> Self {
        if dark { Self::Dark } else { Self::Light }
    }
}

impl FromStr for ThemeMode {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" | "day" => Ok(Self::Light),
            "dark" | "night" => Ok(Self::Dark),
            _ => Err(()),
        }
    }
}

/// Reads the terminal's advertised background from `COLORFGBG`. Only consulted
/// when no saved preference exists; an explicit toggle is sticky afterwards.
pub fn detect_host_preference() -> Option<ThemeMode> {
    let raw = std::env::var("COLORFGBG").ok()?;
    host_preference_from_colorfgbg(&raw)
}

fn host_preference_from_colorfgbg(raw: &str) -> Option<ThemeMode> {
    let background = raw.rsplit(';').next()?.trim();
    let code: u8 = background.parse().ok()?;
    // xterm convention: background 7 or 15 means a light terminal
    Some(match code {
        7 | 15 => ThemeMode::Light,
        _ => ThemeMode::Dark,
    })
}

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub base: BasePalette,
    pub header: HeaderPalette,
    pub task: TaskPalette,
    pub interactive: InteractivePalette,
}

#[derive(Debug, Clone, Copy)]
pub struct BasePalette {
    pub canvas: Color,
    pub surface: Color,
    pub text: Color,
    pub text_muted: Color,
    pub accent: Color,
    pub border: Color,
}

#[derive(Debug, Clone, Copy)]
pub struct HeaderPalette {
    pub title: Color,
    pub subtitle: Color,
    pub progress_track: Color,
}

#[derive(Debug, Clone, Copy)]
pub struct TaskPalette {
    pub completed_text: Color,
    pub checkmark: Color,
    pub swipe_hint: Color,
    pub danger: Color,
}

#[derive(Debug, Clone, Copy)]
pub struct InteractivePalette {
    pub focus: Color,
    pub selected_bg: Color,
    pub button_fg: Color,
    pub placeholder: Color,
}

impl Theme {
    pub fn from_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Dark => Self {
                base: BasePalette {
                    canvas: Color::Rgb(10, 11, 30),
                    surface: Color::Rgb(30, 27, 75),
                    text: Color::Rgb(241, 245, 249),
                    text_muted: Color::Rgb(148, 163, 184),
                    accent: Color::Rgb(59, 130, 246),
                    border: Color::Rgb(76, 29, 149),
                },
                header: HeaderPalette {
                    title: Color::Rgb(255, 255, 255),
                    subtitle: Color::Rgb(199, 210, 254),
                    progress_track: Color::Rgb(49, 46, 129),
                },
                task: TaskPalette {
                    completed_text: Color::Rgb(100, 116, 139),
                    checkmark: Color::Rgb(255, 255, 255),
                    swipe_hint: Color::Rgb(100, 116, 139),
                    danger: Color::Rgb(239, 68, 68),
                },
                interactive: InteractivePalette {
                    focus: Color::Rgb(59, 130, 246),
                    selected_bg: Color::Rgb(49, 46, 129),
                    button_fg: Color::Rgb(255, 255, 255),
                    placeholder: Color::Rgb(100, 116, 139),
                },
            },
            ThemeMode::Light => Self {
                base: BasePalette {
                    canvas: Color::Rgb(240, 244, 255),
                    surface: Color::Rgb(255, 255, 255),
                    text: Color::Rgb(30, 41, 59),
                    text_muted: Color::Rgb(100, 116, 139),
                    accent: Color::Rgb(99, 102, 241),
                    border: Color::Rgb(199, 210, 254),
                },
                header: HeaderPalette {
                    title: Color::Rgb(30, 41, 59),
                    subtitle: Color::Rgb(100, 116, 139),
                    progress_track: Color::Rgb(224, 231, 255),
                },
                task: TaskPalette {
                    completed_text: Color::Rgb(148, 163, 184),
                    checkmark: Color::Rgb(255, 255, 255),
                    swipe_hint: Color::Rgb(148, 163, 184),
                    danger: Color::Rgb(239, 68, 68),
                },
                interactive: InteractivePalette {
                    focus: Color::Rgb(99, 102, 241),
                    selected_bg: Color::Rgb(224, 231, 255),
                    button_fg: Color::Rgb(255, 255, 255),
                    placeholder: Color::Rgb(148, 163, 184),
                },
            },
        }
    }

    /// Blends `color` toward the canvas. `strength` 1 keeps the color,
    /// 0 dissolves it entirely; non-RGB colors are returned unchanged.
    pub fn fade(&self, color: Color, strength: f32) -> Color {
        let (Color::Rgb(r, g, b), Color::Rgb(cr, cg, cb)) = (color, self.base.canvas) else {
            return color;
        };
        let k = strength.clamp(0.0, 1.0);
        let mix = |fg: u8, bg: u8| -> u8 {
            (bg as f32 + (fg as f32 - bg as f32) * k).round().clamp(0.0, 255.0) as u8
        };
        Color::Rgb(mix(r, cr), mix(g, cg), mix(b, cb))
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_mode(ThemeMode::Dark)
    }
}
