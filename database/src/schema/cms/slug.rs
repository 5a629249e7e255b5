/// Derives a URL-safe slug from a title: transliterated to ASCII,
/// lowercased, with runs of whitespace, `-` and `_` collapsed into a single
/// `-`. Other punctuation is dropped. `@` reads as "at".
pub fn slugify(title: &str) -> String {
    let ascii = deunicode::deunicode(title).replace('@', "-at-");
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_separator = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c.to_ascii_lowercase());
        } else if c == '-' || c == '_' || c.is_whitespace() {
            pending_separator = true;
        }
    }

    slug
}
