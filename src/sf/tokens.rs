//! Compile-time token tables for the shared `sf` vocabulary.
//!
//! Element dispatch in the hot property/style parsing paths goes through a
//! perfect-hash map into a small token enum instead of repeated byte-string
//! comparisons. The tables are built at compile time and only ever read.

use crate::style::StyleKind;
use phf::{Map, phf_map};

/// Tokens for property-map children and their value elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum SfToken {
    // Property elements
    Alignment,
    Baseline,
    Bold,
    Capitalization,
    FontColor,
    FontName,
    FontSize,
    Geometry,
    Italic,
    LineSpacing,
    Outline,
    ParagraphFill,
    Strikethru,
    Tabs,
    Underline,
    // Value elements
    Color,
    Number,
    String,
    Tabstop,
}

static SF_TOKENS: Map<&'static str, SfToken> = phf_map! {
    "sf:alignment" => SfToken::Alignment,
    "sf:baseline" => SfToken::Baseline,
    "sf:bold" => SfToken::Bold,
    "sf:capitalization" => SfToken::Capitalization,
    "sf:fontColor" => SfToken::FontColor,
    "sf:fontName" => SfToken::FontName,
    "sf:fontSize" => SfToken::FontSize,
    "sf:geometry" => SfToken::Geometry,
    "sf:italic" => SfToken::Italic,
    "sf:lineSpacing" => SfToken::LineSpacing,
    "sf:outline" => SfToken::Outline,
    "sf:paragraphFill" => SfToken::ParagraphFill,
    "sf:strikethru" => SfToken::Strikethru,
    "sf:tabs" => SfToken::Tabs,
    "sf:underline" => SfToken::Underline,
    "sf:color" => SfToken::Color,
    "sf:number" => SfToken::Number,
    "sf:string" => SfToken::String,
    "sf:tabstop" => SfToken::Tabstop,
};

/// Look up a property/value token by qualified element name.
pub fn token(name: &[u8]) -> Option<SfToken> {
    std::str::from_utf8(name)
        .ok()
        .and_then(|name| SF_TOKENS.get(name).copied())
}

static STYLE_ELEMENTS: Map<&'static str, StyleKind> = phf_map! {
    "sf:characterstyle" => StyleKind::Character,
    "sf:paragraphstyle" => StyleKind::Paragraph,
    "sf:layoutstyle" => StyleKind::Layout,
    "sf:liststyle" => StyleKind::List,
    "sf:graphic-style" => StyleKind::Graphic,
    "sf:cell-style" => StyleKind::Cell,
    "sf:vector-style" => StyleKind::Vector,
    "sf:placeholder-style" => StyleKind::Placeholder,
    "sf:slide-style" => StyleKind::Slide,
    "sf:tabular-style" => StyleKind::Tabular,
    "sf:connection-style" => StyleKind::Connection,
};

/// Classify a style definition or reference element.
///
/// Returns the style kind and whether the element is a `-ref`.
pub fn style_kind(name: &[u8]) -> Option<(StyleKind, bool)> {
    let name = std::str::from_utf8(name).ok()?;
    if let Some(kind) = STYLE_ELEMENTS.get(name) {
        return Some((*kind, false));
    }
    let base = name.strip_suffix("-ref")?;
    STYLE_ELEMENTS.get(base).map(|kind| (*kind, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_tokens() {
        assert_eq!(token(b"sf:bold"), Some(SfToken::Bold));
        assert_eq!(token(b"sf:fontSize"), Some(SfToken::FontSize));
        assert_eq!(token(b"sf:unknown"), None);
    }

    #[test]
    fn test_style_kinds() {
        assert_eq!(
            style_kind(b"sf:graphic-style"),
            Some((StyleKind::Graphic, false))
        );
        assert_eq!(
            style_kind(b"sf:graphic-style-ref"),
            Some((StyleKind::Graphic, true))
        );
        assert_eq!(
            style_kind(b"sf:characterstyle-ref"),
            Some((StyleKind::Character, true))
        );
        assert_eq!(style_kind(b"sf:not-a-style"), None);
    }
}
