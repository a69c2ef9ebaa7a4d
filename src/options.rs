#[derive(Clone, Debug)]
pub struct ConvertOptions {
    /// Tables nested deeper than this inside cells are dropped with a warning.
    pub max_nesting_depth: usize,
    pub embed_images: bool,
    /// Wrap runs of three or more dots in a numbered placeholder span.
    pub include_placeholder_markers: bool,
    /// Rewrite look-alike fill-in marks (`…`, `. .`, `./.`, tabs, ...) to
    /// `...` before placeholders are detected. Off by default: it alters text.
    pub normalize_placeholders: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            max_nesting_depth: 16,
            embed_images: true,
            include_placeholder_markers: true,
            normalize_placeholders: false,
        }
    }
}
