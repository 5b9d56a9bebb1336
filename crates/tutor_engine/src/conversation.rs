//! Canned replies for input that carries no mathematics.

use regex::Regex;
use std::sync::LazyLock;

use crate::solution::{Category, Solution, Step};

pub const EMPTY_INPUT_REPLY: &str = "Silakan masukkan soal matematika yang ingin diselesaikan.";

const DEFAULT_REPLY: &str =
    "Halo! Saya adalah AI matematika. Silakan tanyakan soal matematika yang ingin Anda selesaikan.";

static GREETING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:halo|hai|hello|hi)\b").expect("valid regex literal"));

static THANKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:terima kasih|makasih|thanks|thank you)\b").expect("valid regex literal")
});

static CAPABILITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:bisa|mampu|can you)\b").expect("valid regex literal"));

/// Checked in order; the first pattern found in the message picks the reply.
fn reply_text(message: &str) -> &'static str {
    if GREETING.is_match(message) {
        "Halo! Saya adalah AI matematika yang siap membantu Anda menyelesaikan soal-soal matematika. Silakan tanyakan soal matematika apa saja!"
    } else if THANKS.is_match(message) {
        "Sama-sama! Senang bisa membantu. Jika ada soal matematika lain, silakan tanyakan saja."
    } else if CAPABILITY.is_match(message) {
        "Ya, saya bisa membantu menyelesaikan berbagai jenis soal matematika seperti aritmatika, aljabar, trigonometri, kalkulus, geometri, dan fisika. Silakan coba!"
    } else {
        DEFAULT_REPLY
    }
}

/// Conversational solution for `original`. Steps never carry a result.
pub fn reply(original: &str) -> Solution {
    let message = original.trim();
    if message.is_empty() {
        return Solution::new(
            original,
            EMPTY_INPUT_REPLY,
            vec![Step::new("Input kosong", "Tidak ada input yang diberikan")],
            Category::Conversation,
        );
    }
    Solution::new(
        original,
        reply_text(message),
        vec![Step::new(message, "Percakapan dengan tutor")],
        Category::Conversation,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_thanks_and_capability() {
        assert!(reply("Halo").final_answer().starts_with("Halo! Saya adalah AI matematika yang siap"));
        assert!(reply("terima kasih ya").final_answer().starts_with("Sama-sama!"));
        assert!(reply("apakah kamu bisa integral?").final_answer().starts_with("Ya, saya bisa"));
        assert_eq!(reply("apa kabar").final_answer(), DEFAULT_REPLY);
    }

    #[test]
    fn greeting_wins_over_thanks() {
        assert!(reply("hai, terima kasih").final_answer().contains("siap membantu"));
    }

    #[test]
    fn words_inside_other_words_do_not_match() {
        // "chain" contains "hai"
        assert_eq!(reply("jelaskan chain rule").final_answer(), DEFAULT_REPLY);
    }

    #[test]
    fn steps_have_no_result() {
        for message in ["Halo", "", "   ", "apa kabar"] {
            let sol = reply(message);
            assert_eq!(sol.category(), Category::Conversation);
            assert!(sol.steps().iter().all(|s| s.result().is_none()));
        }
    }

    #[test]
    fn empty_input_prompts_for_a_problem() {
        let sol = reply("  ");
        assert_eq!(sol.final_answer(), EMPTY_INPUT_REPLY);
        assert_eq!(sol.steps()[0].text(), "Input kosong");
    }
}
