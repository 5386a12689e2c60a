//! Slug derivation for notes submitted without an explicit slug.

/// Maximum length of a note slug, in characters.
pub const SLUG_MAX_LENGTH: usize = 100;

/// Derive a URL slug from a note title.
///
/// Cyrillic letters are transliterated, the result is lowercased, runs of
/// whitespace, `-` and `_` collapse to a single `-`, anything else outside
/// `[a-z0-9]` is dropped, and the slug is cut to [`SLUG_MAX_LENGTH`].
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for ch in title.chars().flat_map(char::to_lowercase) {
        if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_dash = !slug.is_empty();
            continue;
        }

        let piece = match transliterate(ch) {
            Some(latin) => latin,
            None if ch.is_ascii_alphanumeric() => {
                push_piece(&mut slug, &mut pending_dash, ch.encode_utf8(&mut [0; 4]));
                continue;
            }
            None => continue,
        };
        push_piece(&mut slug, &mut pending_dash, piece);
    }

    truncate_chars(&slug, SLUG_MAX_LENGTH)
        .trim_end_matches('-')
        .to_string()
}

/// True if `slug` only holds ASCII letters, digits, `-` and `_`.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn push_piece(slug: &mut String, pending_dash: &mut bool, piece: &str) {
    if piece.is_empty() {
        return;
    }
    if *pending_dash {
        slug.push('-');
        *pending_dash = false;
    }
    slug.push_str(piece);
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn transliterate(ch: char) -> Option<&'static str> {
    let latin = match ch {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "j",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' | 'ь' => "",
        'ы' => "y",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    };
    Some(latin)
}
