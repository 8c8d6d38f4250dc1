// Option resolution and serialization into the renderer's flag vocabulary

use crate::config::{ShadowDefaults, StoredDefaults};
use crate::error::ShotError;
use crate::parser::line_ranges;
use crate::quote;
use serde::Serialize;

/// Tri-state boolean override.
///
/// `Unset` falls through to the next tier; `Off` is an explicit `false` that
/// must win over an `On` default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Toggle {
    #[default]
    Unset,
    On,
    Off,
}

impl Toggle {
    pub fn is_set(self) -> bool {
        self != Toggle::Unset
    }

    /// Value of this toggle, or `None` when unset
    pub fn value(self) -> Option<bool> {
        match self {
            Toggle::Unset => None,
            Toggle::On => Some(true),
            Toggle::Off => Some(false),
        }
    }

    /// This toggle if set, else `lower`
    pub fn or(self, lower: Toggle) -> Toggle {
        if self.is_set() {
            self
        } else {
            lower
        }
    }

    pub fn resolve(self, default: bool) -> bool {
        self.value().unwrap_or(default)
    }
}

impl From<bool> for Toggle {
    fn from(value: bool) -> Self {
        if value {
            Toggle::On
        } else {
            Toggle::Off
        }
    }
}

impl From<Option<bool>> for Toggle {
    fn from(value: Option<bool>) -> Self {
        value.map(Toggle::from).unwrap_or_default()
    }
}

/// Drop shadow settings; every subfield is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Shadow {
    pub blur_radius: Option<i64>,
    pub color: Option<String>,
    pub offset_x: Option<i64>,
    pub offset_y: Option<i64>,
}

impl Shadow {
    /// Field-wise merge: `self` wins where set
    fn or(&self, lower: &ShadowDefaults) -> Shadow {
        Shadow {
            blur_radius: self.blur_radius.or(lower.blur_radius),
            color: self.color.clone().or_else(|| lower.color.clone()),
            offset_x: self.offset_x.or(lower.offset_x),
            offset_y: self.offset_y.or(lower.offset_y),
        }
    }
}

/// Fully resolved options for one render
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderOptions {
    pub show_line_numbers: bool,
    pub show_window_controls: bool,
    pub rounded_corners: bool,
    pub background_color: String,
    pub theme: Option<String>,
    pub highlight_lines: Option<String>,
    pub language: Option<String>,
    pub shadow: Shadow,
}

impl RenderOptions {
    /// Options with nothing overridden
    pub fn from_defaults(defaults: &StoredDefaults) -> Self {
        Self {
            show_line_numbers: defaults.line_numbers,
            show_window_controls: defaults.window_controls,
            rounded_corners: defaults.round_corners,
            background_color: defaults.background.clone(),
            theme: defaults.theme.clone(),
            highlight_lines: None,
            language: None,
            shadow: Shadow::default().or(&defaults.shadow),
        }
    }
}

/// Partial options supplied by a caller or collected from prompts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OptionOverrides {
    pub show_line_numbers: Toggle,
    pub show_window_controls: Toggle,
    pub rounded_corners: Toggle,
    pub background_color: Option<String>,
    pub theme: Option<String>,
    pub highlight_lines: Option<String>,
    pub language: Option<String>,
    pub shadow: Shadow,
}

/// Merge the three tiers field by field: `overrides` > `prompted` > `defaults`.
///
/// A highlight spec from either upper tier is validated before it is accepted.
pub fn resolve(
    defaults: &StoredDefaults,
    overrides: &OptionOverrides,
    prompted: &OptionOverrides,
) -> Result<RenderOptions, ShotError> {
    let pick = |high: &Option<String>, mid: &Option<String>| high.clone().or_else(|| mid.clone());

    let highlight_lines = pick(&overrides.highlight_lines, &prompted.highlight_lines);
    if let Some(spec) = &highlight_lines {
        line_ranges(spec)?;
    }

    let shadow_upper = Shadow {
        blur_radius: overrides.shadow.blur_radius.or(prompted.shadow.blur_radius),
        color: pick(&overrides.shadow.color, &prompted.shadow.color),
        offset_x: overrides.shadow.offset_x.or(prompted.shadow.offset_x),
        offset_y: overrides.shadow.offset_y.or(prompted.shadow.offset_y),
    };

    let options = RenderOptions {
        show_line_numbers: overrides
            .show_line_numbers
            .or(prompted.show_line_numbers)
            .resolve(defaults.line_numbers),
        show_window_controls: overrides
            .show_window_controls
            .or(prompted.show_window_controls)
            .resolve(defaults.window_controls),
        rounded_corners: overrides
            .rounded_corners
            .or(prompted.rounded_corners)
            .resolve(defaults.round_corners),
        background_color: pick(&overrides.background_color, &prompted.background_color)
            .unwrap_or_else(|| defaults.background.clone()),
        theme: pick(&overrides.theme, &prompted.theme).or_else(|| defaults.theme.clone()),
        highlight_lines,
        language: pick(&overrides.language, &prompted.language),
        shadow: shadow_upper.or(&defaults.shadow),
    };

    tracing::debug!(?options, "resolved render options");
    Ok(options)
}

// =============================================================================
// Serialization
// =============================================================================

pub const NO_LINE_NUMBER: &str = "--no-line-number";
pub const NO_WINDOW_CONTROLS: &str = "--no-window-controls";
pub const NO_ROUND_CORNER: &str = "--no-round-corner";
pub const BACKGROUND: &str = "--background";
pub const THEME: &str = "--theme";
pub const HIGHLIGHT_LINES: &str = "--highlight-lines";
pub const LANGUAGE: &str = "--language";
pub const SHADOW_BLUR_RADIUS: &str = "--shadow-blur-radius";
pub const SHADOW_COLOR: &str = "--shadow-color";
pub const SHADOW_OFFSET_X: &str = "--shadow-offset-x";
pub const SHADOW_OFFSET_Y: &str = "--shadow-offset-y";

/// One renderer flag, with or without a value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Flag {
    Switch { name: &'static str },
    Text { name: &'static str, value: String },
    Number { name: &'static str, value: i64 },
}

impl Flag {
    /// Shell token form, e.g. `--theme 'Nord'`
    pub fn token(&self) -> String {
        match self {
            Flag::Switch { name } => name.to_string(),
            Flag::Text { name, value } => format!("{} {}", name, quote::single(value)),
            Flag::Number { name, value } => format!("{} {}", name, value),
        }
    }

    /// Discrete argv entries, unquoted
    pub fn args(&self) -> Vec<String> {
        match self {
            Flag::Switch { name } => vec![name.to_string()],
            Flag::Text { name, value } => vec![name.to_string(), value.clone()],
            Flag::Number { name, value } => vec![name.to_string(), value.to_string()],
        }
    }
}

/// Flags for `options`, in table order. Fields carrying no information are omitted.
pub fn flags(options: &RenderOptions) -> Vec<Flag> {
    let mut flags = Vec::new();

    // The renderer draws all three by default; flags only turn them off
    if !options.show_line_numbers {
        flags.push(Flag::Switch { name: NO_LINE_NUMBER });
    }
    if !options.show_window_controls {
        flags.push(Flag::Switch {
            name: NO_WINDOW_CONTROLS,
        });
    }
    if !options.rounded_corners {
        flags.push(Flag::Switch { name: NO_ROUND_CORNER });
    }

    flags.push(Flag::Text {
        name: BACKGROUND,
        value: options.background_color.clone(),
    });

    let text = |name, value: &Option<String>| {
        value.as_ref().map(|v| Flag::Text {
            name,
            value: v.clone(),
        })
    };
    let number = |name, value: Option<i64>| value.map(|v| Flag::Number { name, value: v });

    flags.extend(text(THEME, &options.theme));
    flags.extend(text(HIGHLIGHT_LINES, &options.highlight_lines));
    flags.extend(text(LANGUAGE, &options.language));
    flags.extend(number(SHADOW_BLUR_RADIUS, options.shadow.blur_radius));
    flags.extend(text(SHADOW_COLOR, &options.shadow.color));
    flags.extend(number(SHADOW_OFFSET_X, options.shadow.offset_x));
    flags.extend(number(SHADOW_OFFSET_Y, options.shadow.offset_y));

    flags
}

/// Serialize `options` to shell tokens
pub fn serialize(options: &RenderOptions) -> Vec<String> {
    flags(options).iter().map(Flag::token).collect()
}
