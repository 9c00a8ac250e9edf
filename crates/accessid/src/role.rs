//! Element roles used as the role segment of identifiers.

use std::fmt;

/// The role of a decorated element.
///
/// Roles render as short lowercase words (`button`, `textfield`, ...). Any
/// other string can be used as a role directly; this enum covers the common
/// ones so call sites agree on spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum ElementRole {
    /// A generic element with no specific role.
    #[default]
    Element,

    /// A window or top-level container.
    Window,

    /// A dialog or sheet.
    Dialog,

    /// A push button.
    Button,

    /// A toggle or checkbox.
    Toggle,

    /// A single-line text input field.
    TextField,

    /// A multi-line text editing area.
    TextEditor,

    /// A static text label.
    Label,

    /// A hyperlink.
    Link,

    /// An image.
    Image,

    /// A slider.
    Slider,

    /// A stepper for numeric input.
    Stepper,

    /// A picker / dropdown.
    Picker,

    /// A list of items.
    List,

    /// An item within a list.
    ListItem,

    /// A table/grid cell.
    Cell,

    /// A menu.
    Menu,

    /// A menu item.
    MenuItem,

    /// A toolbar.
    Toolbar,

    /// A tab.
    Tab,

    /// A navigation container.
    Navigation,

    /// A group or section.
    Group,

    /// An alert.
    Alert,

    /// A generic container.
    Container,
}

impl ElementRole {
    /// The role segment for this role.
    pub fn as_str(self) -> &'static str {
        match self {
            ElementRole::Element => "element",
            ElementRole::Window => "window",
            ElementRole::Dialog => "dialog",
            ElementRole::Button => "button",
            ElementRole::Toggle => "toggle",
            ElementRole::TextField => "textfield",
            ElementRole::TextEditor => "texteditor",
            ElementRole::Label => "label",
            ElementRole::Link => "link",
            ElementRole::Image => "image",
            ElementRole::Slider => "slider",
            ElementRole::Stepper => "stepper",
            ElementRole::Picker => "picker",
            ElementRole::List => "list",
            ElementRole::ListItem => "listitem",
            ElementRole::Cell => "cell",
            ElementRole::Menu => "menu",
            ElementRole::MenuItem => "menuitem",
            ElementRole::Toolbar => "toolbar",
            ElementRole::Tab => "tab",
            ElementRole::Navigation => "navigation",
            ElementRole::Group => "group",
            ElementRole::Alert => "alert",
            ElementRole::Container => "container",
        }
    }
}

impl fmt::Display for ElementRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ElementRole> for String {
    fn from(role: ElementRole) -> Self {
        role.as_str().to_string()
    }
}
