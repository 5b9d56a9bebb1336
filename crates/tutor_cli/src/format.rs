use tutor_engine::Solution;

/// Plain-text rendering of a solution for the terminal.
pub fn render(solution: &Solution, show_steps: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!("Kategori: {}\n", solution.category()));
    if show_steps && !solution.steps().is_empty() {
        out.push_str("Langkah:\n");
        for (i, step) in solution.steps().iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, step.text()));
            out.push_str(&format!("   {}\n", step.explanation()));
            if let Some(result) = step.result() {
                out.push_str(&format!("   -> {}\n", result));
            }
        }
    }
    out.push_str(&format!("Jawaban: {}", solution.final_answer()));
    out
}
