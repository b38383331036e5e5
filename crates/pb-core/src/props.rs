//! Typed views over the open `props` bag, one struct per built-in component.
//!
//! Each struct names the props its renderer understands; everything else
//! lands in `extra` so unknown keys survive for forward compatibility.
//! Enum-valued props accept exactly the documented spellings (case
//! insensitive) and fall back to their default otherwise.

use crate::links::{UrlUse, is_safe_url};
use crate::model::{ComponentType, Props};
use crate::units::Length;
use serde_json::Value;

/// Keys every component accepts; never reported as `extra`.
pub const UNIVERSAL_KEYS: [&str; 3] = ["className", "styleJson", "childOrder"];

// ─── Enumerated prop values ──────────────────────────────────────────────

macro_rules! prop_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $text:literal),+ $(,)? } default $default:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                #[doc = $text]
                $variant,
            )+
        }

        impl Default for $name {
            fn default() -> Self {
                Self::DEFAULT
            }
        }

        impl $name {
            pub const DEFAULT: Self = Self::$default;
            pub const VALUES: &'static [&'static str] = &[$($text),+];

            pub fn parse(s: &str) -> Option<Self> {
                let s = s.trim();
                $(
                    if s.eq_ignore_ascii_case($text) {
                        return Some(Self::$variant);
                    }
                )+
                None
            }

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }

            fn from_prop(props: &Props, key: &str) -> Self {
                props
                    .get(key)
                    .and_then(Value::as_str)
                    .and_then(Self::parse)
                    .unwrap_or(Self::DEFAULT)
            }
        }
    };
}

prop_enum! {
    /// Horizontal alignment (section, text).
    Align { Left => "left", Center => "center", Right => "right" } default Left
}

prop_enum! {
    /// Main-axis distribution for rows and columns.
    Justify { Start => "start", Center => "center", Between => "between", End => "end" } default Start
}

prop_enum! {
    /// Cross-axis alignment for rows and columns.
    CrossAlign { Start => "start", Center => "center", End => "end" } default Start
}

prop_enum! {
    /// Element tag for text nodes.
    TextTag {
        H1 => "h1", H2 => "h2", H3 => "h3", H4 => "h4", H5 => "h5", H6 => "h6",
        P => "p", Span => "span", Div => "div",
    } default P
}

prop_enum! {
    ButtonSize { Sm => "sm", Md => "md", Lg => "lg" } default Md
}

prop_enum! {
    BadgeVariant {
        Default => "default", Secondary => "secondary",
        Destructive => "destructive", Outline => "outline",
    } default Default
}

prop_enum! {
    AlertVariant {
        Info => "info", Success => "success", Warning => "warning", Destructive => "destructive",
    } default Info
}

prop_enum! {
    Orientation { Horizontal => "horizontal", Vertical => "vertical" } default Horizontal
}

// ─── Per-component props ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SectionProps {
    pub background: Option<String>,
    pub padding: Option<Length>,
    pub max_width: Option<Length>,
    pub align: Align,
    pub extra: Props,
}

/// Shared by `row` and `column`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlexProps {
    pub gap: Option<Length>,
    pub padding: Option<Length>,
    pub justify: Justify,
    pub align: CrossAlign,
    pub extra: Props,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextProps {
    pub tag: TextTag,
    pub content: Option<String>,
    pub font_size: Option<Length>,
    pub color: Option<String>,
    pub weight: Option<String>,
    pub align: Align,
    pub extra: Props,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageProps {
    pub src: Option<String>,
    pub alt: Option<String>,
    pub width: Option<Length>,
    pub height: Option<Length>,
    pub rounded: bool,
    pub extra: Props,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ButtonProps {
    pub label: Option<String>,
    pub href: Option<String>,
    pub size: ButtonSize,
    pub rounded: bool,
    pub extra: Props,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CardProps {
    pub title: Option<String>,
    pub description: Option<String>,
    pub padding: Option<Length>,
    pub extra: Props,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BadgeProps {
    pub text: Option<String>,
    pub variant: BadgeVariant,
    pub extra: Props,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AvatarProps {
    pub src: Option<String>,
    pub alt: Option<String>,
    pub size: Option<Length>,
    /// Avatars are circular unless `rounded: false`.
    pub rounded: bool,
    pub extra: Props,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlertProps {
    pub variant: AlertVariant,
    pub title: Option<String>,
    pub description: Option<String>,
    pub extra: Props,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeparatorProps {
    pub orientation: Orientation,
    pub thickness: Option<Length>,
    pub color: Option<String>,
    pub extra: Props,
}

/// The typed props of one node, tagged by component type.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentProps {
    Section(SectionProps),
    Row(FlexProps),
    Column(FlexProps),
    Text(TextProps),
    Image(ImageProps),
    Button(ButtonProps),
    Card(CardProps),
    Badge(BadgeProps),
    Avatar(AvatarProps),
    Alert(AlertProps),
    Separator(SeparatorProps),
    /// Extension or unrecognised type; the raw bag is kept as-is.
    Unknown(Props),
}

impl ComponentProps {
    pub fn parse(component: &ComponentType, props: &Props) -> Self {
        match component {
            ComponentType::Section => Self::Section(SectionProps {
                background: string_prop(props, "background"),
                padding: length_prop(props, "padding"),
                max_width: length_prop(props, "maxWidth"),
                align: Align::from_prop(props, "align"),
                extra: extra(props, &["background", "padding", "maxWidth", "align"]),
            }),
            ComponentType::Row => Self::Row(FlexProps::from_props(props)),
            ComponentType::Column => Self::Column(FlexProps::from_props(props)),
            ComponentType::Text => Self::Text(TextProps {
                tag: TextTag::from_prop(props, "tag"),
                content: string_prop(props, "content"),
                font_size: length_prop(props, "fontSize"),
                color: string_prop(props, "color"),
                weight: string_prop(props, "weight"),
                align: Align::from_prop(props, "align"),
                extra: extra(
                    props,
                    &["tag", "content", "fontSize", "color", "weight", "align"],
                ),
            }),
            ComponentType::Image => Self::Image(ImageProps {
                src: url_prop(props, "src", UrlUse::Media),
                alt: string_prop(props, "alt"),
                width: length_prop(props, "width"),
                height: length_prop(props, "height"),
                rounded: bool_prop(props, "rounded").unwrap_or(false),
                extra: extra(props, &["src", "alt", "width", "height", "rounded"]),
            }),
            ComponentType::Button => Self::Button(ButtonProps {
                label: string_prop(props, "label"),
                href: url_prop(props, "href", UrlUse::Link),
                size: ButtonSize::from_prop(props, "size"),
                rounded: bool_prop(props, "rounded").unwrap_or(false),
                extra: extra(props, &["label", "href", "size", "rounded"]),
            }),
            ComponentType::Card => Self::Card(CardProps {
                title: string_prop(props, "title"),
                description: string_prop(props, "description"),
                padding: length_prop(props, "padding"),
                extra: extra(props, &["title", "description", "padding"]),
            }),
            ComponentType::Badge => Self::Badge(BadgeProps {
                text: string_prop(props, "text"),
                variant: BadgeVariant::from_prop(props, "variant"),
                extra: extra(props, &["text", "variant"]),
            }),
            ComponentType::Avatar => Self::Avatar(AvatarProps {
                src: url_prop(props, "src", UrlUse::Media),
                alt: string_prop(props, "alt"),
                size: length_prop(props, "size"),
                rounded: bool_prop(props, "rounded").unwrap_or(true),
                extra: extra(props, &["src", "alt", "size", "rounded"]),
            }),
            ComponentType::Alert => Self::Alert(AlertProps {
                variant: AlertVariant::from_prop(props, "variant"),
                title: string_prop(props, "title"),
                description: string_prop(props, "description"),
                extra: extra(props, &["variant", "title", "description"]),
            }),
            ComponentType::Separator => Self::Separator(SeparatorProps {
                orientation: Orientation::from_prop(props, "orientation"),
                thickness: length_prop(props, "thickness"),
                color: string_prop(props, "color"),
                extra: extra(props, &["orientation", "thickness", "color"]),
            }),
            ComponentType::Preview | ComponentType::Other(_) => Self::Unknown(props.clone()),
        }
    }

    /// Keys this component did not recognise.
    pub fn extra(&self) -> &Props {
        match self {
            Self::Section(p) => &p.extra,
            Self::Row(p) | Self::Column(p) => &p.extra,
            Self::Text(p) => &p.extra,
            Self::Image(p) => &p.extra,
            Self::Button(p) => &p.extra,
            Self::Card(p) => &p.extra,
            Self::Badge(p) => &p.extra,
            Self::Avatar(p) => &p.extra,
            Self::Alert(p) => &p.extra,
            Self::Separator(p) => &p.extra,
            Self::Unknown(raw) => raw,
        }
    }
}

impl FlexProps {
    fn from_props(props: &Props) -> Self {
        Self {
            gap: length_prop(props, "gap"),
            padding: length_prop(props, "padding"),
            justify: Justify::from_prop(props, "justify"),
            align: CrossAlign::from_prop(props, "align"),
            extra: extra(props, &["gap", "padding", "justify", "align"]),
        }
    }
}

// ─── Prop readers ────────────────────────────────────────────────────────

/// Strings are kept (blank → absent); numbers and booleans are stringified.
pub fn string_prop(props: &Props, key: &str) -> Option<String> {
    match props.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A string prop that passes the URL allow-list; anything else is absent.
pub fn url_prop(props: &Props, key: &str, usage: UrlUse) -> Option<String> {
    let raw = string_prop(props, key)?;
    if is_safe_url(&raw, usage) {
        Some(raw)
    } else {
        log::debug!("dropping `{key}`: not an allowed {} URL", usage.as_str());
        None
    }
}

pub fn length_prop(props: &Props, key: &str) -> Option<Length> {
    props.get(key).and_then(Length::from_value)
}

/// JSON booleans or the strings `"true"` / `"false"`.
pub fn bool_prop(props: &Props, key: &str) -> Option<bool> {
    match props.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

fn extra(props: &Props, known: &[&str]) -> Props {
    props
        .iter()
        .filter(|(k, _)| !known.contains(&k.as_str()) && !UNIVERSAL_KEYS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: serde_json::Value) -> Props {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn enum_values_are_exact_sets() {
        assert_eq!(Align::VALUES, &["left", "center", "right"]);
        assert_eq!(Justify::VALUES, &["start", "center", "between", "end"]);
        assert_eq!(CrossAlign::VALUES, &["start", "center", "end"]);
        assert_eq!(
            TextTag::VALUES,
            &["h1", "h2", "h3", "h4", "h5", "h6", "p", "span", "div"]
        );
        assert_eq!(ButtonSize::VALUES, &["sm", "md", "lg"]);
        assert_eq!(
            BadgeVariant::VALUES,
            &["default", "secondary", "destructive", "outline"]
        );
        assert_eq!(
            AlertVariant::VALUES,
            &["info", "success", "warning", "destructive"]
        );
        assert_eq!(Orientation::VALUES, &["horizontal", "vertical"]);
    }

    #[test]
    fn button_size_defaults_to_medium() {
        let ComponentProps::Button(b) = ComponentProps::parse(&ComponentType::Button, &Props::new())
        else {
            panic!("expected button props");
        };
        assert_eq!(b.size, ButtonSize::Md);
        assert!(!b.rounded);
    }

    #[test]
    fn invalid_enum_value_falls_back_to_default() {
        let p = props(json!({"justify": "space-around", "align": "CENTER"}));
        let ComponentProps::Row(flex) = ComponentProps::parse(&ComponentType::Row, &p) else {
            panic!("expected row props");
        };
        assert_eq!(flex.justify, Justify::Start);
        assert_eq!(flex.align, CrossAlign::Center);
    }

    #[test]
    fn text_props_are_typed() {
        let p = props(json!({
            "tag": "h2", "content": "Hello", "fontSize": "32px",
            "color": "#111", "weight": 700, "align": "center"
        }));
        let ComponentProps::Text(t) = ComponentProps::parse(&ComponentType::Text, &p) else {
            panic!("expected text props");
        };
        assert_eq!(t.tag, TextTag::H2);
        assert_eq!(t.content.as_deref(), Some("Hello"));
        assert_eq!(t.font_size, Some(Length::Px(32.0)));
        assert_eq!(t.weight.as_deref(), Some("700"));
        assert_eq!(t.align, Align::Center);
        assert!(t.extra.is_empty());
    }

    #[test]
    fn unknown_keys_land_in_extra() {
        let p = props(json!({
            "title": "Plan", "ribbon": "new", "className": "x", "styleJson": "{}"
        }));
        let parsed = ComponentProps::parse(&ComponentType::Card, &p);
        assert_eq!(parsed.extra().len(), 1);
        assert_eq!(parsed.extra()["ribbon"], "new");
    }

    #[test]
    fn avatar_is_rounded_unless_disabled() {
        let ComponentProps::Avatar(a) =
            ComponentProps::parse(&ComponentType::Avatar, &props(json!({"rounded": "false"})))
        else {
            panic!("expected avatar props");
        };
        assert!(!a.rounded);
        let ComponentProps::Avatar(a) = ComponentProps::parse(&ComponentType::Avatar, &Props::new())
        else {
            panic!("expected avatar props");
        };
        assert!(a.rounded);
    }

    #[test]
    fn script_urls_are_dropped() {
        let p = props(json!({"href": "javascript:alert(1)", "label": "Go"}));
        let ComponentProps::Button(b) = ComponentProps::parse(&ComponentType::Button, &p) else {
            panic!("expected button props");
        };
        assert_eq!(b.href, None);
        assert_eq!(b.label.as_deref(), Some("Go"));

        let p = props(json!({"src": "data:image/gif;base64,R0lGOD"}));
        let ComponentProps::Image(i) = ComponentProps::parse(&ComponentType::Image, &p) else {
            panic!("expected image props");
        };
        assert_eq!(i.src.as_deref(), Some("data:image/gif;base64,R0lGOD"));
    }

    #[test]
    fn extension_types_keep_raw_bag() {
        let p = props(json!({"slides": 3}));
        let parsed = ComponentProps::parse(&ComponentType::Other("carousel".into()), &p);
        assert_eq!(parsed, ComponentProps::Unknown(p));
    }

    #[test]
    fn blank_strings_are_absent() {
        let p = props(json!({"title": "  ", "description": "ok"}));
        assert_eq!(string_prop(&p, "title"), None);
        assert_eq!(string_prop(&p, "description").as_deref(), Some("ok"));
    }
}
