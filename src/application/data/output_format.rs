use clap::ValueEnum;

/// Textual rendering of a forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum TextStyle {
    /// Box-drawing connectors, like `tree`.
    #[default]
    Tree,
    /// Two spaces per level.
    Indent,
}

/// What `parse` prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Tree,
    Indent,
    /// One resolved path per line.
    Paths,
    Json,
}

impl From<TextStyle> for OutputFormat {
    fn from(style: TextStyle) -> Self {
        match style {
            TextStyle::Tree => OutputFormat::Tree,
            TextStyle::Indent => OutputFormat::Indent,
        }
    }
}
