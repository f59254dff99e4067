// Turns `[word]` tokens in a description line into Markdown links.
// The URL for each distinct token is asked for once, then every
// occurrence of that token in the line is rewritten.

use anyhow::Result;

use crate::prompt::Prompter;

/// Bracketed tokens in `text`, in order of first appearance, without
/// duplicates. Each `[` is paired with the first `]` after it and scanning
/// resumes after that `]`. An unclosed `[` ends the scan.
pub fn find_references(text: &str) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find('[') {
        let after = &rest[start + 1..];
        let Some(end) = after.find(']') else {
            break;
        };
        let word = &after[..end];
        if !words.iter().any(|w| w == word) {
            words.push(word.to_string());
        }
        rest = &after[end + 1..];
    }

    words
}

/// Rewrite every `[word]` in `text` to `[word](url)` using the given pairs.
pub fn apply_links(text: &str, links: &[(String, String)]) -> String {
    links.iter().fold(text.to_string(), |acc, (word, url)| {
        acc.replace(&format!("[{word}]"), &format!("[{word}]({url})"))
    })
}

/// Link all references in `text`, asking `lookup` for each token's URL.
pub fn link_with<F>(text: &str, mut lookup: F) -> Result<String>
where
    F: FnMut(&str) -> Result<String>,
{
    let words = find_references(text);
    if words.is_empty() {
        return Ok(text.to_string());
    }

    let mut links = Vec::with_capacity(words.len());
    for word in words {
        let url = lookup(&word)?;
        links.push((word, url));
    }
    Ok(apply_links(text, &links))
}

/// Interactive variant: prompts for one URL per distinct token.
pub fn link_references(text: &str, prompter: &mut dyn Prompter) -> Result<String> {
    let mut announced = false;
    link_with(text, |word| {
        if !announced {
            println!("\nEnter URLs for references:");
            announced = true;
        }
        prompter.input(&format!("URL for '{word}'"))
    })
}
