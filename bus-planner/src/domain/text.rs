//! Text normalisation for loosely-typed record fields.
//!
//! Repository records carry free-text tags ("Ida", " VUELTA ", "Interna")
//! and area names with or without accents. They are normalised once at the
//! repository boundary so comparisons elsewhere are plain equality.

/// Trim, lowercase, strip common Latin diacritics and collapse whitespace.
///
/// # Examples
///
/// ```
/// use bus_planner::domain::normalize;
///
/// assert_eq!(normalize("  Circulación "), "circulacion");
/// assert_eq!(normalize("San  Joaquín"), "san joaquin");
/// assert_eq!(normalize("PEÑA"), "pena");
/// ```
pub fn normalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for word in s.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        for c in word.chars().flat_map(char::to_lowercase) {
            out.push(fold_accent(c));
        }
    }
    out
}

/// Normalise an optional field, mapping blank strings to `None`.
pub fn normalize_opt(s: Option<&str>) -> Option<String> {
    let n = normalize(s?);
    if n.is_empty() { None } else { Some(n) }
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}
