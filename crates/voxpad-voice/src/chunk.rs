//! Sentence-sized chunking of input text for TTS.
//!
//! Kokoro works best on sentence-length input. The chunker splits text at
//! sentence boundaries and packs sentences into chunks of at most
//! [`MAX_CHUNK_CHARS`] bytes; each chunk becomes one ordered audio
//! segment. Oversized sentences are split at clause punctuation, and as a
//! last resort at word boundaries.

/// Maximum length per TTS chunk, in bytes.
///
/// Roughly 2–3 sentences — well within the model's comfort zone.
const MAX_CHUNK_CHARS: usize = 400;

/// Split text into TTS-ready chunks, preserving order.
///
/// Whitespace-only input yields no chunks.
#[must_use]
pub fn split_into_chunks(text: &str) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    // Short text — single chunk.
    if text.len() <= MAX_CHUNK_CHARS {
        return vec![text.to_string()];
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();

    for sentence in split_sentences(text) {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            continue;
        }

        // Flush the running chunk if this sentence would overflow it.
        if !current.is_empty() && current.len() + 1 + sentence.len() > MAX_CHUNK_CHARS {
            chunks.push(std::mem::take(&mut current));
        }

        // A single oversized sentence is split at clause boundaries.
        if sentence.len() > MAX_CHUNK_CHARS {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            chunks.extend(split_long_sentence(sentence));
            continue;
        }

        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(sentence);
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Split text at sentence-final punctuation, keeping the punctuation.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        current.push(c);
        if matches!(c, '.' | '!' | '?' | '\n') {
            let s = current.trim();
            if !s.is_empty() {
                sentences.push(s.to_string());
            }
            current.clear();
        }
    }
    let s = current.trim();
    if !s.is_empty() {
        sentences.push(s.to_string());
    }

    sentences
}

/// Split an oversized sentence at clause punctuation (commas, semicolons,
/// colons, dashes), falling back to word-boundary splits.
fn split_long_sentence(sentence: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();

    for c in sentence.chars() {
        current.push(c);
        if matches!(c, ',' | ';' | ':') && current.len() >= MAX_CHUNK_CHARS / 2 {
            parts.push(std::mem::take(&mut current).trim().to_string());
        }
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }

    // Clause splitting may still leave an oversized run (no punctuation).
    parts
        .into_iter()
        .flat_map(|part| {
            if part.len() > MAX_CHUNK_CHARS {
                hard_split(&part)
            } else {
                vec![part]
            }
        })
        .collect()
}

/// Word-boundary split for punctuation-free runs of text.
fn hard_split(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > MAX_CHUNK_CHARS {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
