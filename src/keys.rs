//! Key Derivation
//!
//! Turns producer inputs into fixed-length SHA-256 cache keys.
//!
//! Every key starts with a producer tag and each input is length-prefixed,
//! so `("ab", "c")` and `("a", "bc")` never meet, and a quote key can never
//! equal a copy key built from the same text.

use std::fmt;

use sha2::{Digest, Sha256};

// == Key Kind ==
/// Producer category a key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Quote,
    Copy,
    Background,
    Render,
    /// Raw content digest of a binary payload
    Content,
}

impl KeyKind {
    fn tag(self) -> &'static [u8] {
        match self {
            KeyKind::Quote => b"quote/v1",
            KeyKind::Copy => b"copy/v1",
            KeyKind::Background => b"background/v1",
            KeyKind::Render => b"render/v1",
            KeyKind::Content => b"content/v1",
        }
    }
}

// == Cache Key ==
/// 64 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 characters, enough to tell keys apart in logs.
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// == Key Builder ==
/// Feeds tagged, length-prefixed fields into a SHA-256 digest.
pub struct KeyBuilder {
    hasher: Sha256,
}

impl KeyBuilder {
    pub fn new(kind: KeyKind) -> Self {
        let mut builder = Self {
            hasher: Sha256::new(),
        };
        builder.field(kind.tag());
        builder
    }

    fn field(&mut self, data: &[u8]) {
        self.hasher.update((data.len() as u64).to_le_bytes());
        self.hasher.update(data);
    }

    pub fn text(mut self, value: &str) -> Self {
        self.field(value.as_bytes());
        self
    }

    pub fn bytes(mut self, value: &[u8]) -> Self {
        self.field(value);
        self
    }

    pub fn number(mut self, value: u64) -> Self {
        self.field(&value.to_le_bytes());
        self
    }

    /// Writes the list length, then each item.
    pub fn list<S: AsRef<str>>(mut self, items: &[S]) -> Self {
        self.field(&(items.len() as u64).to_le_bytes());
        for item in items {
            self.field(item.as_ref().as_bytes());
        }
        self
    }

    pub fn finish(self) -> CacheKey {
        CacheKey(hex::encode(self.hasher.finalize()))
    }
}

// == Normalization ==
/// Trims, lower-cases and collapses inner whitespace.
pub fn normalize_text(value: &str) -> String {
    value
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalizes each keyword and drops the blank ones. Order is kept.
pub fn normalize_keywords<S: AsRef<str>>(keywords: &[S]) -> Vec<String> {
    keywords
        .iter()
        .map(|k| normalize_text(k.as_ref()))
        .filter(|k| !k.is_empty())
        .collect()
}

// == Producer Keys ==
pub fn quote_key(topic: &str) -> CacheKey {
    KeyBuilder::new(KeyKind::Quote)
        .text(&normalize_text(topic))
        .finish()
}

pub fn copy_key(quote: &str, author: &str, topic: &str) -> CacheKey {
    KeyBuilder::new(KeyKind::Copy)
        .text(quote)
        .text(author)
        .text(&normalize_text(topic))
        .finish()
}

pub fn background_key<S: AsRef<str>>(keywords: &[S], width: u32, height: u32) -> CacheKey {
    KeyBuilder::new(KeyKind::Background)
        .list(&normalize_keywords(keywords))
        .number(u64::from(width))
        .number(u64::from(height))
        .finish()
}

/// Digest of the bytes themselves, whatever path produced them.
pub fn content_digest(data: &[u8]) -> CacheKey {
    KeyBuilder::new(KeyKind::Content).bytes(data).finish()
}

pub fn render_key(quote: &str, author: &str, style: &str, background: &[u8], canvas: u32) -> CacheKey {
    KeyBuilder::new(KeyKind::Render)
        .text(quote)
        .text(author)
        .text(style)
        .text(content_digest(background).as_str())
        .number(u64::from(canvas))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_key_shape() {
        let key = quote_key("hustle");
        assert_eq!(key.as_str().len(), 64);
        assert!(key.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(key.short().len(), 12);
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(quote_key("hustle"), quote_key("hustle"));
        assert_eq!(
            copy_key("Work hard.", "Anon", "hustle"),
            copy_key("Work hard.", "Anon", "hustle")
        );
    }

    #[test]
    fn test_stable_across_processes() {
        // Pinned digest: changes here invalidate every cached key
        let expected = {
            let mut hasher = Sha256::new();
            hasher.update(8u64.to_le_bytes());
            hasher.update(b"quote/v1");
            hasher.update(6u64.to_le_bytes());
            hasher.update(b"hustle");
            hex::encode(hasher.finalize())
        };
        assert_eq!(quote_key("hustle").as_str(), expected);
    }

    #[test]
    fn test_topic_normalization() {
        assert_eq!(quote_key("Hustle Culture"), quote_key("  hustle   culture "));
        assert_ne!(quote_key("hustle culture"), quote_key("hustle-culture"));
    }

    #[test]
    fn test_quote_text_is_case_sensitive() {
        assert_ne!(
            copy_key("Work hard.", "Anon", "x"),
            copy_key("work hard.", "Anon", "x")
        );
    }

    #[test]
    fn test_field_boundaries_do_not_collide() {
        assert_ne!(copy_key("ab", "c", "t"), copy_key("a", "bc", "t"));
        assert_ne!(
            background_key(&["ab", "c"], 10, 10),
            background_key(&["a", "bc"], 10, 10)
        );
    }

    #[test]
    fn test_kinds_are_separated() {
        let quote = KeyBuilder::new(KeyKind::Quote).text("same").finish();
        let copy = KeyBuilder::new(KeyKind::Copy).text("same").finish();
        assert_ne!(quote, copy);
    }

    #[test]
    fn test_background_key_normalizes_keywords() {
        assert_eq!(
            background_key(&["Ocean", " ", "Calm  Waves"], 1080, 1080),
            background_key(&["ocean", "calm waves"], 1080, 1080)
        );
        assert_ne!(
            background_key(&["ocean", "forest"], 1080, 1080),
            background_key(&["forest", "ocean"], 1080, 1080)
        );
        assert_ne!(
            background_key(&["ocean"], 1080, 1080),
            background_key(&["ocean"], 1080, 1920)
        );
    }

    #[test]
    fn test_render_key_hashes_content() {
        let a = vec![1u8, 2, 3];
        let same_bytes = a.clone();
        let other = vec![1u8, 2, 4];

        assert_eq!(
            render_key("q", "a", "midnight-aura", &a, 1080),
            render_key("q", "a", "midnight-aura", &same_bytes, 1080)
        );
        assert_ne!(
            render_key("q", "a", "midnight-aura", &a, 1080),
            render_key("q", "a", "midnight-aura", &other, 1080)
        );
        assert_ne!(
            render_key("q", "a", "midnight-aura", &a, 1080),
            render_key("q", "a", "cyber-hustle", &a, 1080)
        );
    }

    #[test]
    fn test_one_character_difference() {
        assert_ne!(quote_key("hustle"), quote_key("hustlf"));
        assert_ne!(content_digest(b"abc"), content_digest(b"abd"));
    }

    #[test]
    fn test_no_collisions_in_large_corpus() {
        let mut seen = HashSet::new();
        for i in 0..10_000u32 {
            let topic = format!("topic {i}");
            assert!(seen.insert(quote_key(&topic)), "collision at {topic}");
            assert!(
                seen.insert(copy_key(&format!("quote {i}"), "author", &topic)),
                "collision at copy {i}"
            );
            assert!(
                seen.insert(content_digest(&i.to_le_bytes())),
                "collision at content {i}"
            );
        }
        assert_eq!(seen.len(), 30_000);
    }
}
