use serde::{Deserialize, Serialize};

/// Numbered color codes understood by the consuming canvas renderer. The
/// codes themselves are the wire format; the names are what they resolve to.
pub const PALETTE: [(&str, &str); 6] = [
    ("1", "red"),
    ("2", "orange"),
    ("3", "yellow"),
    ("4", "green"),
    ("5", "cyan"),
    ("6", "purple"),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub signal_color: String,
    pub group_color: String,
    pub spoke_color: String,
    pub flow_color: String,
}

impl Theme {
    pub fn canvas_default() -> Self {
        Self {
            signal_color: "4".to_string(),
            group_color: "6".to_string(),
            spoke_color: "3".to_string(),
            flow_color: "4".to_string(),
        }
    }

    /// Accepts a classifier-supplied color tag when it names a palette entry;
    /// anything else falls back to the signal color.
    pub fn resolve_card_color(&self, tag: Option<&str>) -> String {
        match tag {
            Some(tag) if PALETTE.iter().any(|(code, _)| *code == tag) => tag.to_string(),
            _ => self.signal_color.clone(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::canvas_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tags_fall_back_to_signal_color() {
        let theme = Theme::canvas_default();
        assert_eq!(theme.resolve_card_color(Some("2")), "2");
        assert_eq!(theme.resolve_card_color(Some("9")), "4");
        assert_eq!(theme.resolve_card_color(Some("#ff0000")), "4");
        assert_eq!(theme.resolve_card_color(None), "4");
    }
}
