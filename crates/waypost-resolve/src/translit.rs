//! Script-insensitive token normalization.
//!
//! Zone names and customer addresses arrive in a mix of Cyrillic and Latin
//! scripts. Matching works on normalized token sets: lowercased, punctuation
//! and administrative stopwords stripped, each token expanded with its
//! transliteration variants in both directions so that a name and its
//! transliteration share a token.

use std::collections::HashSet;

/// Administrative noise words that carry no settlement identity.
const STOPWORDS: &[&str] = &[
    // Latin script
    "g", "gor", "gorod", "city", "obl", "oblast", "region", "r-n", "rn", "raion", "rayon",
    "district", "pos", "poselok", "der", "derevnya", "village", "settlement", "ul", "ulitsa",
    "street", "dom", "house",
    // Cyrillic script
    "г", "гор", "город", "обл", "область", "р-н", "район", "пос", "посёлок", "поселок", "дер",
    "деревня", "респ", "республика", "край", "округ", "ул", "улица", "дом",
];

/// Lowercases, strips punctuation and stopwords, and expands every remaining
/// token with its transliteration variants.
#[must_use]
pub fn normalized_tokens(text: &str) -> HashSet<String> {
    let lowered = text.to_lowercase();
    let mut tokens = HashSet::new();
    for raw in lowered.split(|c: char| !(c.is_alphanumeric() || c == '-')) {
        let token = raw.trim_matches('-');
        if token.is_empty() || is_stopword(token) {
            continue;
        }
        expand_variants(token, &mut tokens);
        for part in token.split('-') {
            if !part.is_empty() && !is_stopword(part) {
                expand_variants(part, &mut tokens);
            }
        }
    }
    tokens
}

/// `true` when the two normalized token sets share at least one token.
#[must_use]
pub fn share_token(a: &HashSet<String>, b: &HashSet<String>) -> bool {
    !a.is_disjoint(b)
}

/// Canonical Latin slug of a settlement name: lowercased, transliterated,
/// word-joined with `-`. Used as the static city table key.
#[must_use]
pub fn canonical_slug(text: &str) -> String {
    slug_with(text, cyrillic_to_latin)
}

/// Slug of the Cyrillic reading of the name, catching Latin spellings that
/// differ from the canonical transliteration (e.g. "Himki" vs "Khimki").
#[must_use]
pub fn roundtrip_slug(text: &str) -> String {
    slug_with(text, |part| cyrillic_to_latin(&latin_to_cyrillic(part)))
}

fn slug_with(text: &str, transform: impl Fn(&str) -> String) -> String {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(transform)
        .collect::<Vec<_>>()
        .join("-")
}

fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token)
}

fn expand_variants(token: &str, out: &mut HashSet<String>) {
    out.insert(token.to_owned());
    out.insert(cyrillic_to_latin(token));
    let cyrillized = latin_to_cyrillic(token);
    out.insert(cyrillic_to_latin(&cyrillized));
    out.insert(cyrillized);
}

/// Transliterates Cyrillic characters to Latin; everything else passes
/// through unchanged. Input is assumed lowercased.
#[must_use]
pub fn cyrillic_to_latin(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    for c in token.chars() {
        match latin_of(c) {
            Some(mapped) => out.push_str(mapped),
            None => out.push(c),
        }
    }
    out
}

fn latin_of(c: char) -> Option<&'static str> {
    Some(match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' | 'э' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "y",
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
        'х' => "kh",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shch",
        'ъ' | 'ь' => "",
        'ы' => "y",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    })
}

/// Transliterates Latin characters to Cyrillic, greedily consuming standard
/// digraphs first. Input is assumed lowercased.
#[must_use]
pub fn latin_to_cyrillic(token: &str) -> String {
    const DIGRAPHS: &[(&str, char)] = &[
        ("shch", 'щ'),
        ("sch", 'щ'),
        ("yo", 'ё'),
        ("zh", 'ж'),
        ("kh", 'х'),
        ("ts", 'ц'),
        ("ch", 'ч'),
        ("sh", 'ш'),
        ("yu", 'ю'),
        ("ya", 'я'),
    ];

    let mut out = String::new();
    let mut rest = token;
    'scan: while !rest.is_empty() {
        for &(seq, cyr) in DIGRAPHS {
            if let Some(tail) = rest.strip_prefix(seq) {
                out.push(cyr);
                rest = tail;
                continue 'scan;
            }
        }
        let mut chars = rest.chars();
        let Some(c) = chars.next() else { break };
        out.push(cyrillic_of(c));
        rest = chars.as_str();
    }
    out
}

fn cyrillic_of(c: char) -> char {
    match c {
        'a' => 'а',
        'b' => 'б',
        'c' => 'ц',
        'd' => 'д',
        'e' => 'е',
        'f' => 'ф',
        'g' => 'г',
        'h' => 'х',
        'i' => 'и',
        'j' => 'й',
        'k' | 'q' | 'x' => 'к',
        'l' => 'л',
        'm' => 'м',
        'n' => 'н',
        'o' => 'о',
        'p' => 'п',
        'r' => 'р',
        's' => 'с',
        't' => 'т',
        'u' => 'у',
        'v' | 'w' => 'в',
        'y' => 'ы',
        'z' => 'з',
        _ => c,
    }
}
