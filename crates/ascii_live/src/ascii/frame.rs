/// One rendered frame: `height` rows of `width` glyphs, each row followed by a
/// line break.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextFrame {
    pub width: u32,
    pub height: u32,
    text: String,
}

impl TextFrame {
    pub(crate) fn new(width: u32, height: u32, text: String) -> Self {
        Self { width, height, text }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn rows(&self) -> impl Iterator<Item = &str> + '_ {
        self.text.lines()
    }

    pub fn into_string(self) -> String {
        self.text
    }
}
