//! The instruction sent with each slide.

/// Build the keyword instruction for one slide.
pub fn build_prompt(slide_text: &str, max_keywords: usize) -> String {
    let examples: Vec<String> = (1..=max_keywords.max(1))
        .map(|i| format!("\"word{}\"", i))
        .collect();

    format!(
        "Read this slide content carefully. Do NOT guess keywords from the subject area.\n\
         \n\
         Extract exactly {n} UNIQUE, IMPORTANT study keywords that:\n\
         1. Appear literally in this slide's text\n\
         2. Are key concepts a student would highlight while studying\n\
         3. Are NOT common or generic words (like 'python', 'language', 'program', 'code')\n\
         4. Are NOT repeated in your answer\n\
         5. Focus on technical terms, specific concepts, or important details\n\
         \n\
         Slide content: {text}\n\
         \n\
         Return ONLY JSON in this format: {{\"keywords\": [{examples}]}}",
        n = max_keywords,
        text = slide_text,
        examples = examples.join(", "),
    )
}
